/*
 * provider.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Lazily resolved values.
//!
//! A [`SoyValueProvider`] is either a value that is already present or a
//! [`Deferred`] cell that some external producer completes later. Asking a
//! pending provider for its status never blocks: it reports
//! [`RenderResult::Detach`] and the render returns control to its caller.

use crate::appendable::AdvisingAppendable;
use crate::content_kind::SanitizedContent;
use crate::error::{DataError, DataResult};
use crate::render_result::{PendingHandle, RenderResult};
use crate::value::{SoyRecord, SoyValue};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// Shared provider for the absent value.
///
/// Its status is always `Done`, it resolves to [`SoyValue::Null`] and it
/// renders as the literal text `null`.
pub static NULL_PROVIDER: SoyValueProvider = SoyValueProvider::Resolved(SoyValue::Null);

pub(crate) struct DeferredCell {
    label: String,
    value: OnceCell<Result<SoyValue, String>>,
}

impl DeferredCell {
    pub(crate) fn is_ready(&self) -> bool {
        self.value.get().is_some()
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }
}

/// A one-shot, thread-safe cell completed from outside the render.
///
/// Clones share the same cell. The first call to [`Deferred::set`] or
/// [`Deferred::fail`] wins; later calls are ignored and return `false`.
#[derive(Clone)]
pub struct Deferred {
    cell: Arc<DeferredCell>,
}

impl Deferred {
    pub fn new() -> Self {
        Self::named("deferred")
    }

    /// Create a pending cell with a label used in diagnostics.
    pub fn named(label: impl Into<String>) -> Self {
        Self {
            cell: Arc::new(DeferredCell {
                label: label.into(),
                value: OnceCell::new(),
            }),
        }
    }

    /// Create a cell that is already complete.
    pub fn resolved(label: impl Into<String>, value: impl Into<SoyValue>) -> Self {
        let deferred = Self::named(label);
        deferred.set(value);
        deferred
    }

    /// Complete the cell with a value.
    pub fn set(&self, value: impl Into<SoyValue>) -> bool {
        let stored = self.cell.value.set(Ok(value.into())).is_ok();
        if stored {
            tracing::trace!(label = %self.cell.label, "Deferred value resolved");
        }
        stored
    }

    /// Complete the cell with a failure; resolving it will return an error.
    pub fn fail(&self, message: impl Into<String>) -> bool {
        let stored = self.cell.value.set(Err(message.into())).is_ok();
        if stored {
            tracing::trace!(label = %self.cell.label, "Deferred value failed");
        }
        stored
    }

    pub fn is_ready(&self) -> bool {
        self.cell.is_ready()
    }

    pub fn label(&self) -> &str {
        &self.cell.label
    }

    /// A handle identifying this cell, for use in [`RenderResult::Detach`].
    pub fn handle(&self) -> PendingHandle {
        PendingHandle::new(Arc::clone(&self.cell))
    }

    fn get(&self) -> DataResult<&SoyValue> {
        match self.cell.value.get() {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(DataError::Failed {
                handle: self.cell.label.clone(),
                message: message.clone(),
            }),
            None => Err(DataError::NotResolved {
                handle: self.cell.label.clone(),
            }),
        }
    }
}

impl Default for Deferred {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("label", &self.cell.label)
            .field("value", &self.cell.value.get())
            .finish()
    }
}

/// A value that is either present now or will be present later.
#[derive(Debug, Clone)]
pub enum SoyValueProvider {
    Resolved(SoyValue),
    Deferred(Deferred),
}

impl SoyValueProvider {
    pub fn deferred(deferred: Deferred) -> Self {
        SoyValueProvider::Deferred(deferred)
    }

    /// `Done` when the value can be resolved, otherwise `Detach` naming this
    /// provider's cell. Has no side effects.
    pub fn status(&self) -> RenderResult {
        match self {
            SoyValueProvider::Resolved(_) => RenderResult::Done,
            SoyValueProvider::Deferred(d) if d.is_ready() => RenderResult::Done,
            SoyValueProvider::Deferred(d) => RenderResult::Detach(d.handle()),
        }
    }

    /// The value, or an error if it is still pending or failed.
    pub fn resolve(&self) -> DataResult<&SoyValue> {
        match self {
            SoyValueProvider::Resolved(value) => Ok(value),
            SoyValueProvider::Deferred(d) => d.get(),
        }
    }

    /// Write the value's text once it is resolved.
    ///
    /// Returns `Detach` without writing anything while the value is pending.
    /// A resolved value is always written in full; afterwards `Limited` is
    /// reported if the sink hit its soft limit and more output is still to
    /// come (`is_last` is false).
    pub fn render_and_resolve(
        &self,
        out: &mut dyn AdvisingAppendable,
        is_last: bool,
    ) -> DataResult<RenderResult> {
        let status = self.status();
        if !status.is_done() {
            return Ok(status);
        }
        out.append(&self.resolve()?.coerce_to_string())?;
        if !is_last && out.soft_limit_reached() {
            return Ok(RenderResult::Limited);
        }
        Ok(RenderResult::Done)
    }

    /// Whether this is the shared null provider or resolves to null.
    pub fn is_null(&self) -> bool {
        matches!(self, SoyValueProvider::Resolved(SoyValue::Null))
    }
}

impl Default for SoyValueProvider {
    fn default() -> Self {
        NULL_PROVIDER.clone()
    }
}

impl PartialEq for SoyValueProvider {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SoyValueProvider::Resolved(a), SoyValueProvider::Resolved(b)) => a == b,
            (SoyValueProvider::Deferred(a), SoyValueProvider::Deferred(b)) => {
                a.handle() == b.handle()
            }
            _ => false,
        }
    }
}

macro_rules! resolved_provider_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for SoyValueProvider {
                fn from(value: $ty) -> Self {
                    SoyValueProvider::Resolved(SoyValue::from(value))
                }
            }
        )*
    };
}

resolved_provider_from!(&str, String, bool, i32, i64, f64, SanitizedContent, SoyRecord);

impl From<SoyValue> for SoyValueProvider {
    fn from(value: SoyValue) -> Self {
        SoyValueProvider::Resolved(value)
    }
}

impl From<Deferred> for SoyValueProvider {
    fn from(deferred: Deferred) -> Self {
        SoyValueProvider::Deferred(deferred)
    }
}

/// Look up a record field, using [`NULL_PROVIDER`] for missing or null fields.
pub fn get_field_provider<'a>(record: &'a SoyRecord, field: &str) -> &'a SoyValueProvider {
    match record.get(field) {
        Some(provider) if !provider.is_null() => provider,
        _ => &NULL_PROVIDER,
    }
}

/// Look up a list item, using [`NULL_PROVIDER`] when the index is out of range.
pub fn get_list_item(list: &[SoyValueProvider], index: i64) -> &SoyValueProvider {
    usize::try_from(index)
        .ok()
        .and_then(|i| list.get(i))
        .unwrap_or(&NULL_PROVIDER)
}

/// Text for an optional value; a missing value renders as `null`.
pub fn coerce_to_string(value: Option<&SoyValue>) -> String {
    value.map_or_else(|| "null".to_string(), SoyValue::coerce_to_string)
}
