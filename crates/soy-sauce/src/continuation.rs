/*
 * continuation.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Handles for renders that may stop before they are finished.
//!
//! Every render call returns a continuation carrying the [`RenderResult`] of
//! the step just taken. A continuation that is not `Done` can be resumed
//! exactly once with `continue_render`, which runs the next step and returns
//! a fresh continuation. The in-flight state moves into the new
//! continuation, so resuming a stale handle fails with `AlreadyResumed`
//! instead of rendering twice.

use crate::context::RenderContext;
use crate::error::{RenderErrorKind, SauceResult};
use crate::template::CompiledTemplate;
use soy_data::{AdvisingAppendable, ContentKind, OutputBuffer, RenderResult, SanitizedContent};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// State carried from one step of a render to the next.
struct Inflight<W> {
    template: Box<dyn CompiledTemplate>,
    context: Arc<RenderContext>,
    out: W,
    name: String,
}

/// A render writing to a caller-owned sink.
pub struct WriteContinuation<W> {
    result: RenderResult,
    state: Option<Inflight<W>>,
}

impl<W: AdvisingAppendable> WriteContinuation<W> {
    pub(crate) fn start(
        name: &str,
        template: Box<dyn CompiledTemplate>,
        context: Arc<RenderContext>,
        out: W,
    ) -> SauceResult<Self> {
        tracing::debug!(template = name, "Starting render");
        Self::step(Inflight {
            template,
            context,
            out,
            name: name.to_string(),
        })
    }

    fn step(mut inflight: Inflight<W>) -> SauceResult<Self> {
        let result = inflight
            .template
            .render(&mut inflight.out, &inflight.context)?;
        tracing::trace!(template = %inflight.name, %result, "Render step finished");
        Ok(Self {
            result,
            state: Some(inflight),
        })
    }

    /// Why the last step stopped.
    pub fn result(&self) -> &RenderResult {
        &self.result
    }

    /// Run the next step of a render that is not `Done`.
    ///
    /// May be called at most once per continuation.
    pub fn continue_render(&mut self) -> SauceResult<WriteContinuation<W>> {
        if self.result.is_done() {
            return Err(RenderErrorKind::AlreadyDone.into());
        }
        let inflight = self
            .state
            .take()
            .ok_or(RenderErrorKind::AlreadyResumed)?;
        tracing::debug!(template = %inflight.name, after = %self.result, "Continuing render");
        Self::step(inflight)
    }

    /// The sink, unless the state already moved to a later continuation.
    pub fn sink(&self) -> Option<&W> {
        self.state.as_ref().map(|inflight| &inflight.out)
    }

    pub fn sink_mut(&mut self) -> Option<&mut W> {
        self.state.as_mut().map(|inflight| &mut inflight.out)
    }

    pub fn into_sink(self) -> Option<W> {
        self.state.map(|inflight| inflight.out)
    }
}

impl<W> fmt::Debug for WriteContinuation<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteContinuation")
            .field("result", &self.result)
            .field("resumable", &self.state.is_some())
            .finish()
    }
}

/// Converts the complete output of a buffered render into a value.
pub trait RenderedValue: Sized {
    fn from_rendered(text: String, kind: Option<ContentKind>) -> Self;
}

impl RenderedValue for String {
    fn from_rendered(text: String, _kind: Option<ContentKind>) -> Self {
        text
    }
}

impl RenderedValue for SanitizedContent {
    fn from_rendered(text: String, kind: Option<ContentKind>) -> Self {
        SanitizedContent::ordain_as_safe(text, kind.unwrap_or(ContentKind::Text))
    }
}

/// A render into an internal buffer that produces a `T` once `Done`.
///
/// The buffer never asks to pause, so results are only ever `Done` or
/// `Detach` unless a template reports `Limited` on its own.
pub struct Continuation<T> {
    inner: WriteContinuation<OutputBuffer>,
    kind: Option<ContentKind>,
    _value: PhantomData<fn() -> T>,
}

impl<T: RenderedValue> Continuation<T> {
    pub(crate) fn new(inner: WriteContinuation<OutputBuffer>, kind: Option<ContentKind>) -> Self {
        Self {
            inner,
            kind,
            _value: PhantomData,
        }
    }

    pub fn result(&self) -> &RenderResult {
        self.inner.result()
    }

    /// Run the next step; see [`WriteContinuation::continue_render`].
    pub fn continue_render(&mut self) -> SauceResult<Continuation<T>> {
        Ok(Continuation::new(self.inner.continue_render()?, self.kind))
    }

    /// The rendered value. Fails unless the render is `Done`.
    pub fn get(&self) -> SauceResult<T> {
        if !self.inner.result().is_done() {
            return Err(RenderErrorKind::NotDone {
                result: self.inner.result().to_string(),
            }
            .into());
        }
        let text = self
            .inner
            .sink()
            .map(|buffer| buffer.as_str().to_string())
            .unwrap_or_default();
        Ok(T::from_rendered(text, self.kind))
    }
}

impl<T> fmt::Debug for Continuation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Continuation")
            .field("result", &self.inner.result)
            .field("kind", &self.kind)
            .finish()
    }
}
