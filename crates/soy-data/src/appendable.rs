/*
 * appendable.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Output sinks that can advise the renderer to pause.
//!
//! A sink accepts text like any writer, but also exposes a *soft limit*:
//! once reached, the renderer stops at the next opportunity and returns
//! [`RenderResult::Limited`](crate::RenderResult::Limited) even though more
//! could technically be written. Writing past the soft limit is allowed; it
//! is advice, not a capacity error.

use std::fmt;
use std::io::{self, Write};

/// An appendable text sink with a backpressure hint.
pub trait AdvisingAppendable {
    /// Append a string to the sink.
    fn append(&mut self, s: &str) -> io::Result<()>;

    /// Append a single character to the sink.
    fn append_char(&mut self, c: char) -> io::Result<()> {
        let mut buf = [0u8; 4];
        self.append(c.encode_utf8(&mut buf))
    }

    /// Whether the sink would like the renderer to stop writing for now.
    fn soft_limit_reached(&self) -> bool;
}

impl<T: AdvisingAppendable + ?Sized> AdvisingAppendable for &mut T {
    fn append(&mut self, s: &str) -> io::Result<()> {
        (**self).append(s)
    }

    fn append_char(&mut self, c: char) -> io::Result<()> {
        (**self).append_char(c)
    }

    fn soft_limit_reached(&self) -> bool {
        (**self).soft_limit_reached()
    }
}

impl<T: AdvisingAppendable + ?Sized> AdvisingAppendable for Box<T> {
    fn append(&mut self, s: &str) -> io::Result<()> {
        (**self).append(s)
    }

    fn append_char(&mut self, c: char) -> io::Result<()> {
        (**self).append_char(c)
    }

    fn soft_limit_reached(&self) -> bool {
        (**self).soft_limit_reached()
    }
}

/// In-memory growable buffer that never reports a soft limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBuffer {
    buf: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Return the buffered text and leave the buffer empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.buf)
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

impl AdvisingAppendable for OutputBuffer {
    fn append(&mut self, s: &str) -> io::Result<()> {
        self.buf.push_str(s);
        Ok(())
    }

    fn append_char(&mut self, c: char) -> io::Result<()> {
        self.buf.push(c);
        Ok(())
    }

    fn soft_limit_reached(&self) -> bool {
        false
    }
}

impl fmt::Display for OutputBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}

/// In-memory buffer that reports its soft limit once it holds `limit` bytes.
///
/// The owner drains the buffer with [`LimitedBuffer::drain`] to relieve the
/// backpressure, then resumes the render.
#[derive(Debug, Clone)]
pub struct LimitedBuffer {
    buf: String,
    limit: usize,
}

impl LimitedBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            buf: String::new(),
            limit,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Remove and return everything buffered so far.
    pub fn drain(&mut self) -> String {
        std::mem::take(&mut self.buf)
    }
}

impl AdvisingAppendable for LimitedBuffer {
    fn append(&mut self, s: &str) -> io::Result<()> {
        self.buf.push_str(s);
        Ok(())
    }

    fn soft_limit_reached(&self) -> bool {
        self.buf.len() >= self.limit
    }
}

/// Adapts an [`io::Write`] into an advising sink.
///
/// Text is staged in memory; once `soft_limit` bytes are staged the sink
/// advises the renderer to stop until [`AdvisingWriter::flush`] pushes the
/// staged bytes to the underlying writer.
pub struct AdvisingWriter<W: Write> {
    inner: W,
    pending: Vec<u8>,
    soft_limit: usize,
}

impl<W: Write> AdvisingWriter<W> {
    pub fn new(inner: W, soft_limit: usize) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            soft_limit,
        }
    }

    /// Number of staged bytes not yet written to the underlying writer.
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    /// Write all staged bytes through and flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            self.inner.write_all(&self.pending)?;
            tracing::trace!(bytes = self.pending.len(), "Flushed advising writer");
            self.pending.clear();
        }
        self.inner.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Flush staged bytes and return the underlying writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> AdvisingAppendable for AdvisingWriter<W> {
    fn append(&mut self, s: &str) -> io::Result<()> {
        self.pending.extend_from_slice(s.as_bytes());
        Ok(())
    }

    fn soft_limit_reached(&self) -> bool {
        self.pending.len() >= self.soft_limit
    }
}
