/*
 * render_result.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The outcome of a single render step.
//!
//! Every call into a compiled template runs until it either finishes, the
//! output sink asks it to stop, or it needs a value that has not been
//! resolved yet. The caller decides what to wait for based on the variant.

use crate::provider::DeferredCell;
use std::fmt;
use std::sync::Arc;

/// Identifies the value a detached render is waiting on.
///
/// Handles compare by identity: two handles are equal when they refer to the
/// same [`Deferred`](crate::Deferred) cell.
#[derive(Clone)]
pub struct PendingHandle {
    cell: Arc<DeferredCell>,
}

impl PendingHandle {
    pub(crate) fn new(cell: Arc<DeferredCell>) -> Self {
        Self { cell }
    }

    /// Whether the awaited value has been completed (successfully or not).
    pub fn is_ready(&self) -> bool {
        self.cell.is_ready()
    }

    /// The diagnostic label of the awaited value.
    pub fn label(&self) -> &str {
        self.cell.label()
    }
}

impl PartialEq for PendingHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl Eq for PendingHandle {}

impl fmt::Debug for PendingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingHandle")
            .field("label", &self.label())
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl fmt::Display for PendingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one render step.
///
/// `Done` and `Limited` carry nothing; `Detach` carries exactly one handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderResult {
    /// Rendering finished; the owning continuation must not be resumed.
    Done,

    /// The sink reported its soft limit; resume once it can take more data.
    Limited,

    /// Rendering is blocked on a value that is not resolved yet.
    Detach(PendingHandle),
}

impl RenderResult {
    /// Shorthand for [`RenderResult::Detach`].
    pub fn detach(pending: PendingHandle) -> Self {
        RenderResult::Detach(pending)
    }

    pub fn is_done(&self) -> bool {
        matches!(self, RenderResult::Done)
    }

    pub fn is_limited(&self) -> bool {
        matches!(self, RenderResult::Limited)
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, RenderResult::Detach(_))
    }

    /// The awaited value, if this is a `Detach`.
    pub fn pending(&self) -> Option<&PendingHandle> {
        match self {
            RenderResult::Detach(handle) => Some(handle),
            _ => None,
        }
    }
}

impl fmt::Display for RenderResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderResult::Done => f.write_str("DONE"),
            RenderResult::Limited => f.write_str("LIMITED"),
            RenderResult::Detach(handle) => write!(f, "DETACH({handle})"),
        }
    }
}
