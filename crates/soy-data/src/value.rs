/*
 * value.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template values and records.
//!
//! Collections hold [`SoyValueProvider`]s rather than plain values so that
//! individual fields and list items can be resolved lazily.

use crate::content_kind::{ContentKind, SanitizedContent};
use crate::provider::SoyValueProvider;
use indexmap::IndexMap;

/// A value visible to template code.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SoyValue {
    /// The absent value.
    #[default]
    Null,

    Bool(bool),

    Integer(i64),

    Float(f64),

    String(String),

    /// A list of (possibly lazy) items.
    List(Vec<SoyValueProvider>),

    /// A record of (possibly lazy) named fields.
    Record(SoyRecord),

    /// A string tagged with a content kind.
    Sanitized(SanitizedContent),
}

impl SoyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SoyValue::Null)
    }

    /// The content kind this value is known to be safe as, if any.
    pub fn content_kind(&self) -> Option<ContentKind> {
        match self {
            SoyValue::Sanitized(content) => Some(content.kind()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SoyValue::String(s) => Some(s),
            SoyValue::Sanitized(content) => Some(content.content()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SoyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Soy truthiness: null, false, zero, NaN and the empty string are falsy.
    pub fn coerce_to_bool(&self) -> bool {
        match self {
            SoyValue::Null => false,
            SoyValue::Bool(b) => *b,
            SoyValue::Integer(i) => *i != 0,
            SoyValue::Float(f) => *f != 0.0 && !f.is_nan(),
            SoyValue::String(s) => !s.is_empty(),
            SoyValue::Sanitized(content) => !content.content().is_empty(),
            SoyValue::List(_) | SoyValue::Record(_) => true,
        }
    }

    /// Render this value as text for output.
    ///
    /// - Null: `null`
    /// - Bool: `true` / `false`
    /// - Float: shortest representation, `1` rather than `1.0`
    /// - List: `[a, b]`
    /// - Record: `{k: v, ...}`
    /// - Items and fields that are still pending render as `null`
    pub fn coerce_to_string(&self) -> String {
        match self {
            SoyValue::Null => "null".to_string(),
            SoyValue::Bool(b) => b.to_string(),
            SoyValue::Integer(i) => i.to_string(),
            SoyValue::Float(f) => format_float(*f),
            SoyValue::String(s) => s.clone(),
            SoyValue::Sanitized(content) => content.content().to_string(),
            SoyValue::List(items) => {
                let parts: Vec<String> = items.iter().map(render_nested).collect();
                format!("[{}]", parts.join(", "))
            }
            SoyValue::Record(record) => {
                let parts: Vec<String> = record
                    .iter()
                    .map(|(k, v)| format!("{k}: {}", render_nested(v)))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
        }
    }
}

fn render_nested(provider: &SoyValueProvider) -> String {
    provider
        .resolve()
        .map_or_else(|_| "null".to_string(), SoyValue::coerce_to_string)
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        f.to_string()
    }
}

impl From<&str> for SoyValue {
    fn from(s: &str) -> Self {
        SoyValue::String(s.to_string())
    }
}

impl From<String> for SoyValue {
    fn from(s: String) -> Self {
        SoyValue::String(s)
    }
}

impl From<bool> for SoyValue {
    fn from(b: bool) -> Self {
        SoyValue::Bool(b)
    }
}

impl From<i64> for SoyValue {
    fn from(i: i64) -> Self {
        SoyValue::Integer(i)
    }
}

impl From<i32> for SoyValue {
    fn from(i: i32) -> Self {
        SoyValue::Integer(i64::from(i))
    }
}

impl From<f64> for SoyValue {
    fn from(f: f64) -> Self {
        SoyValue::Float(f)
    }
}

impl From<SanitizedContent> for SoyValue {
    fn from(content: SanitizedContent) -> Self {
        SoyValue::Sanitized(content)
    }
}

impl From<SoyRecord> for SoyValue {
    fn from(record: SoyRecord) -> Self {
        SoyValue::Record(record)
    }
}

/// An ordered record of named, possibly lazy, fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SoyRecord {
    fields: IndexMap<String, SoyValueProvider>,
}

impl SoyRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous provider for the same name.
    pub fn insert(&mut self, name: impl Into<String>, provider: impl Into<SoyValueProvider>) {
        self.fields.insert(name.into(), provider.into());
    }

    /// Builder-style [`SoyRecord::insert`].
    pub fn with(mut self, name: impl Into<String>, provider: impl Into<SoyValueProvider>) -> Self {
        self.insert(name, provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<&SoyValueProvider> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SoyValueProvider)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<SoyValueProvider>> FromIterator<(K, V)> for SoyRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = SoyRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}
