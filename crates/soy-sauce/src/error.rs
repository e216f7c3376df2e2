/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for template selection and rendering.
//!
//! A [`RenderError`] pairs the underlying [`RenderErrorKind`] with the chain
//! of template frames the error passed through on its way out, innermost
//! first. Each template that propagates an error appends its own frame.

use soy_data::{ContentKind, DataError};
use soy_msgs::MsgError;
use std::fmt;
use thiserror::Error;

/// What went wrong.
#[derive(Debug, Error)]
pub enum RenderErrorKind {
    /// `continue_render` was called a second time on the same continuation.
    #[error("continue_render() has already been called on this continuation")]
    AlreadyResumed,

    /// `continue_render` was called on a finished render.
    #[error("Render is already done; there is nothing to continue")]
    AlreadyDone,

    /// A value was requested from a render that has not finished.
    #[error("Render is not done yet (last result: {result})")]
    NotDone { result: String },

    /// No delegate implementation matched and the call does not allow an empty default.
    #[error(
        "Found no active impl for delegate call to '{name}' (variant '{variant}') and allowemptydefault was not set"
    )]
    NoActiveDelegate { name: String, variant: String },

    /// More than one active package implements the same delegate.
    #[error(
        "For delegate template '{name}' (variant '{variant}'), found active implementations with equal priority in delegate packages {packages:?}"
    )]
    ConflictingDelegates {
        name: String,
        variant: String,
        packages: Vec<String>,
    },

    /// Two implementations registered for the same delegate, package and variant.
    #[error(
        "Found multiple deltemplates with the same name ({name}), variant ('{variant}') and package ({package})"
    )]
    DuplicateDelegate {
        name: String,
        variant: String,
        package: String,
    },

    /// Two templates registered under one name.
    #[error("Template registered more than once: {name}")]
    DuplicateTemplate { name: String },

    /// A content kind was expected but the template declares none.
    #[error(
        "Cannot render a non strict template '{template}' as '{expected}'"
    )]
    NonStrictTemplate {
        template: String,
        expected: ContentKind,
    },

    /// The template declares a different content kind than the caller expects.
    #[error(
        "Expected template '{template}' to be kind=\"{expected}\" but was kind=\"{actual}\""
    )]
    ContentKindMismatch {
        template: String,
        expected: ContentKind,
        actual: ContentKind,
    },

    /// `render_strict` was used on a template without a declared kind.
    #[error("Cannot render non strict template '{template}' as sanitized content")]
    StrictRequired { template: String },

    #[error("Unknown template: {name}")]
    UnknownTemplate { name: String },

    #[error("Unknown print directive: {name}")]
    UnknownPrintDirective { name: String },

    #[error("Unknown function: {name}")]
    UnknownFunction { name: String },

    /// A message id is in neither the active nor the default bundle and the
    /// template carries no source text for it.
    #[error("No message with id {id} in any bundle")]
    MissingMessage { id: u64 },

    #[error(transparent)]
    Message(#[from] MsgError),

    #[error(transparent)]
    Data(DataError),

    /// The output sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Render options could not be parsed.
    #[error("Invalid render options: {0}")]
    Options(#[from] serde_json::Error),

    /// A directive or function rejected its input.
    #[error("Evaluation error: {message}")]
    Evaluation { message: String },
}

impl From<DataError> for RenderErrorKind {
    fn from(err: DataError) -> Self {
        match err {
            DataError::Io(io) => RenderErrorKind::Io(io),
            other => RenderErrorKind::Data(other),
        }
    }
}

/// A source position inside a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

impl SourcePosition {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// One template the error passed through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFrame {
    pub template: String,
    pub position: Option<SourcePosition>,
}

impl fmt::Display for TemplateFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(f, "{}:{}", self.template, position),
            None => f.write_str(&self.template),
        }
    }
}

/// An error raised while preparing or running a render.
#[derive(Debug)]
pub struct RenderError {
    kind: RenderErrorKind,
    frames: Vec<TemplateFrame>,
}

impl RenderError {
    pub fn new(kind: RenderErrorKind) -> Self {
        Self {
            kind,
            frames: Vec::new(),
        }
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::new(RenderErrorKind::Evaluation {
            message: message.into(),
        })
    }

    pub fn kind(&self) -> &RenderErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> RenderErrorKind {
        self.kind
    }

    /// Template frames, innermost first.
    pub fn frames(&self) -> &[TemplateFrame] {
        &self.frames
    }

    /// Record that the error propagated out of `template`.
    pub fn with_frame(
        mut self,
        template: impl Into<String>,
        position: Option<SourcePosition>,
    ) -> Self {
        self.frames.push(TemplateFrame {
            template: template.into(),
            position,
        });
        self
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for frame in &self.frames {
            write!(f, "\n  at {frame}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}

impl From<RenderErrorKind> for RenderError {
    fn from(kind: RenderErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<DataError> for RenderError {
    fn from(err: DataError) -> Self {
        Self::new(err.into())
    }
}

impl From<MsgError> for RenderError {
    fn from(err: MsgError) -> Self {
        Self::new(err.into())
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.into())
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.into())
    }
}

/// Result type for rendering operations.
pub type SauceResult<T> = Result<T, RenderError>;
