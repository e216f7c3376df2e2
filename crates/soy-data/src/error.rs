/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for value resolution and conversion.

use thiserror::Error;

/// Errors that can occur while resolving or converting template data.
#[derive(Debug, Error)]
pub enum DataError {
    /// `resolve()` was called on a provider whose value is still pending.
    #[error("Value is not resolved yet: {handle}")]
    NotResolved { handle: String },

    /// The deferred value was completed with a failure.
    #[error("Deferred value '{handle}' failed: {message}")]
    Failed { handle: String, message: String },

    /// Input data could not be converted into a template value.
    #[error("Cannot convert value: {message}")]
    Conversion { message: String },

    /// The output sink failed while a value was being written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for data operations.
pub type DataResult<T> = Result<T, DataError>;
