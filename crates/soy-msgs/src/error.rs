/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for message rendering.

use thiserror::Error;

/// Errors that can occur while rendering a message.
#[derive(Debug, Error)]
pub enum MsgError {
    /// No value was supplied for a placeholder.
    #[error("No value provided for placeholder: '{name}'")]
    MissingPlaceholder { name: String },

    /// No value was supplied for a plural variable.
    #[error("No value provided for plural: '{name}'")]
    MissingPlural { name: String },

    /// No value was supplied for a select variable.
    #[error("No value provided for select: '{name}'")]
    MissingSelect { name: String },

    /// A value was supplied but has the wrong type for how it is used.
    #[error("Value for '{name}' must be {expected}")]
    WrongValueType { name: String, expected: &'static str },

    /// The select value matched no case and there is no default case.
    #[error("No case of select '{name}' matches '{value}'")]
    NoSelectCase { name: String, value: String },

    /// The plural value matched no case and there is no `other` case.
    #[error("No case of plural '{name}' matches {value}")]
    NoPluralCase { name: String, value: i64 },

    /// A part appeared somewhere it is not allowed.
    #[error("Unexpected {part} part in {context}")]
    UnexpectedPart {
        part: &'static str,
        context: &'static str,
    },

    /// Subtracting the plural offset from the value overflowed.
    #[error("Plural '{name}' value {value} is out of range for offset {offset}")]
    PluralOutOfRange { name: String, value: i64, offset: i64 },

    /// A plural case label could not be parsed.
    #[error("Invalid plural case: '{spec}'")]
    InvalidPluralCase { spec: String },

    /// The output sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for message operations.
pub type MsgResult<T> = Result<T, MsgError>;
