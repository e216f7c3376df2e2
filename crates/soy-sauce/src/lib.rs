/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Resumable rendering of compiled Soy templates.
//!
//! Templates render in steps. Each step writes as much as it can and then
//! reports a [`RenderResult`]:
//!
//! - `Done`: the output is complete
//! - `Limited`: the sink asked for a pause; resume once it has drained
//! - `Detach`: a value is still pending; resume once it is ready
//!
//! Resuming continues exactly where the previous step stopped, so the
//! concatenated output of all steps equals an uninterrupted render.
//!
//! The crate provides:
//!
//! - [`SoySauce`] and [`Renderer`]: configure and start renders
//! - [`WriteContinuation`] and [`Continuation`]: resume them
//! - [`CompiledTemplates`] and [`DelTemplateSelector`]: template lookup and
//!   delegate selection by active package and variant
//! - [`RenderContext`]: the immutable per-render environment
//! - [`TemplateProgram`]: templates written as instruction lists
//!
//! # Example
//!
//! ```ignore
//! use soy_sauce::{CompiledTemplates, SoySauce, TemplateMetadata, TemplateProgram};
//! use soy_data::ContentKind;
//!
//! let templates = CompiledTemplates::builder()
//!     .template(
//!         "ns.hello",
//!         TemplateMetadata::new().with_content_kind(ContentKind::Html),
//!         TemplateProgram::builder("ns.hello")
//!             .text("Hello, ")
//!             .print_param("name")
//!             .build(),
//!     )
//!     .build()?;
//!
//! let sauce = SoySauce::new(templates);
//! let continuation = sauce
//!     .render_template("ns.hello")?
//!     .set_data_json(&serde_json::json!({"name": "World"}))?
//!     .render_to_string()?;
//! assert_eq!(continuation.get()?, "Hello, World");
//! ```

pub mod context;
pub mod continuation;
pub mod directives;
pub mod error;
pub mod escaping;
pub mod options;
pub mod program;
pub mod registry;
pub mod renaming;
pub mod renderer;
pub mod selector;
pub mod template;

pub use context::{DEFAULT_LOCALE, RenderContext, RenderContextBuilder, ResolvedCallee};
pub use continuation::{Continuation, RenderedValue, WriteContinuation};
pub use directives::{
    EscapeHtml, FnDirective, FnFunction, Id, NoAutoescape, PrintDirective, PrintDirectives,
    SoyFunction, SoyFunctions, builtin_print_directives, escape_html,
};
pub use error::{RenderError, RenderErrorKind, SauceResult, SourcePosition, TemplateFrame};
pub use escaping::apply_escapers;
pub use options::RenderOptions;
pub use program::{CallData, DelCall, Instruction, ProgramBuilder, TemplateProgram, ValueRef};
pub use registry::{CompiledTemplates, CompiledTemplatesBuilder, TemplateEntry};
pub use renaming::RenamingMap;
pub use renderer::{PreparedRenderer, Renderer, SoySauce, SoySauceBuilder, enforce_content_kind};
pub use selector::{DelTemplateSelector, DelTemplateSelectorView};
pub use template::{
    CompiledTemplate, DelTemplateMetadata, EmptyTemplate, TemplateFactory, TemplateMetadata,
};

pub use soy_data::{
    AdvisingAppendable, ContentKind, Deferred, NULL_PROVIDER, OutputBuffer, RenderResult,
    SanitizedContent, SoyRecord, SoyValue, SoyValueProvider,
};
