/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Localized messages for the Soy template runtime.
//!
//! A translated message is a list of [`SoyMsgPart`]s: raw text, named
//! placeholders, and `plural`/`select` constructs whose cases are themselves
//! part lists. Rendering walks the structure that applies to the supplied
//! placeholder values and writes the result to an
//! [`AdvisingAppendable`](soy_data::AdvisingAppendable).
//!
//! # Example
//!
//! ```ignore
//! use soy_msgs::{render_msg, Placeholders, SoyMsg, SoyMsgPart};
//!
//! let msg = SoyMsg::new(1, Some("en"), vec![
//!     SoyMsgPart::raw("Hello, "),
//!     SoyMsgPart::placeholder("name"),
//! ]);
//! let mut placeholders = Placeholders::new();
//! placeholders.insert("name".to_string(), "World".into());
//!
//! let mut out = soy_data::OutputBuffer::new();
//! render_msg(&msg, &placeholders, &mut out)?;
//! assert_eq!(out.as_str(), "Hello, World");
//! ```

pub mod bundle;
pub mod error;
pub mod part;
pub mod plural;
pub mod render;

pub use bundle::{SoyMsg, SoyMsgBundle};
pub use error::{MsgError, MsgResult};
pub use part::{PluralCaseSpec, SoyMsgPart};
pub use plural::{PluralCategory, plural_category};
pub use render::{PlaceholderValue, Placeholders, render_msg};
