/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Data model shared by the Soy rendering runtime.
//!
//! This crate holds everything a compiled template touches while it writes
//! output, independent of how templates are selected or configured:
//!
//! - [`RenderResult`]: the tri-state outcome of one render step
//!   (`Done`, `Limited`, `Detach`)
//! - [`AdvisingAppendable`]: an output sink that can ask the renderer to pause
//! - [`SoyValue`] and [`SoyRecord`]: template data
//! - [`SoyValueProvider`]: a value that may not be resolved yet, backed by a
//!   [`Deferred`] cell that is completed from outside the render
//! - [`ContentKind`] and [`SanitizedContent`]: declared output classifications
//!
//! # Example
//!
//! ```ignore
//! use soy_data::{Deferred, OutputBuffer, RenderResult, SoyValue, SoyValueProvider};
//!
//! let deferred = Deferred::named("greeting");
//! let provider = SoyValueProvider::deferred(deferred.clone());
//! let mut out = OutputBuffer::new();
//!
//! // Not available yet: nothing is written and the render detaches.
//! assert!(provider.render_and_resolve(&mut out, true)?.is_detached());
//!
//! deferred.set(SoyValue::from("hello"));
//! assert_eq!(provider.render_and_resolve(&mut out, true)?, RenderResult::Done);
//! assert_eq!(out.as_str(), "hello");
//! ```

pub mod appendable;
pub mod content_kind;
pub mod convert;
pub mod error;
pub mod provider;
pub mod render_result;
pub mod value;

pub use appendable::{AdvisingAppendable, AdvisingWriter, LimitedBuffer, OutputBuffer};
pub use content_kind::{ContentKind, SanitizedContent};
pub use convert::{JsonValueConverter, ValueConverter};
pub use error::{DataError, DataResult};
pub use provider::{
    Deferred, NULL_PROVIDER, SoyValueProvider, coerce_to_string, get_field_provider,
    get_list_item,
};
pub use render_result::{PendingHandle, RenderResult};
pub use value::{SoyRecord, SoyValue};
