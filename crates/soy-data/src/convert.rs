/*
 * convert.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Conversion from host data into template values.

use crate::error::{DataError, DataResult};
use crate::provider::SoyValueProvider;
use crate::value::{SoyRecord, SoyValue};
use serde_json::Value as JsonValue;

/// Converts caller-supplied data into [`SoyValue`]s.
pub trait ValueConverter: Send + Sync {
    /// Convert an arbitrary value.
    fn convert(&self, value: &JsonValue) -> DataResult<SoyValue>;

    /// Convert a value that must be a record (a JSON object).
    fn convert_record(&self, value: &JsonValue) -> DataResult<SoyRecord> {
        match self.convert(value)? {
            SoyValue::Record(record) => Ok(record),
            other => Err(DataError::Conversion {
                message: format!(
                    "expected an object for a template record, found {}",
                    describe(&other)
                ),
            }),
        }
    }
}

/// The default converter for `serde_json` values.
///
/// - numbers that fit in `i64` become integers, all others floats
/// - arrays become lists and objects become records, recursively
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonValueConverter;

impl ValueConverter for JsonValueConverter {
    fn convert(&self, value: &JsonValue) -> DataResult<SoyValue> {
        Ok(match value {
            JsonValue::Null => SoyValue::Null,
            JsonValue::Bool(b) => SoyValue::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => SoyValue::Integer(i),
                None => SoyValue::Float(n.as_f64().ok_or_else(|| DataError::Conversion {
                    message: format!("number {n} is not representable"),
                })?),
            },
            JsonValue::String(s) => SoyValue::String(s.clone()),
            JsonValue::Array(items) => SoyValue::List(
                items
                    .iter()
                    .map(|item| self.convert(item).map(SoyValueProvider::from))
                    .collect::<DataResult<Vec<_>>>()?,
            ),
            JsonValue::Object(fields) => {
                let mut record = SoyRecord::new();
                for (name, field) in fields {
                    record.insert(name.clone(), self.convert(field)?);
                }
                SoyValue::Record(record)
            }
        })
    }
}

fn describe(value: &SoyValue) -> &'static str {
    match value {
        SoyValue::Null => "null",
        SoyValue::Bool(_) => "a boolean",
        SoyValue::Integer(_) | SoyValue::Float(_) => "a number",
        SoyValue::String(_) | SoyValue::Sanitized(_) => "a string",
        SoyValue::List(_) => "a list",
        SoyValue::Record(_) => "a record",
    }
}
