/*
 * directives.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Print directives and plugin functions.
//!
//! Both are looked up by name through the [`RenderContext`](crate::RenderContext)
//! and must be shareable across renders.

use crate::error::SauceResult;
use soy_data::{ContentKind, SanitizedContent, SoyValue};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Transforms a printed value, e.g. `|escapeHtml`.
pub trait PrintDirective: Send + Sync {
    /// Name including the leading `|`.
    fn name(&self) -> &str;

    fn apply(&self, value: SoyValue, args: &[SoyValue]) -> SauceResult<SoyValue>;
}

/// A function callable from template expressions.
pub trait SoyFunction: Send + Sync {
    fn name(&self) -> &str;

    fn call(&self, args: &[SoyValue]) -> SauceResult<SoyValue>;
}

pub type PrintDirectives = HashMap<String, Arc<dyn PrintDirective>>;
pub type SoyFunctions = HashMap<String, Arc<dyn SoyFunction>>;

/// `|escapeHtml`: escapes text for HTML unless it already is HTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscapeHtml;

impl PrintDirective for EscapeHtml {
    fn name(&self) -> &str {
        "|escapeHtml"
    }

    fn apply(&self, value: SoyValue, _args: &[SoyValue]) -> SauceResult<SoyValue> {
        if value.content_kind() == Some(ContentKind::Html) {
            return Ok(value);
        }
        Ok(SoyValue::Sanitized(SanitizedContent::ordain_as_safe(
            escape_html(&value.coerce_to_string()),
            ContentKind::Html,
        )))
    }
}

/// `|noAutoescape`: prints the value as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAutoescape;

impl PrintDirective for NoAutoescape {
    fn name(&self) -> &str {
        "|noAutoescape"
    }

    fn apply(&self, value: SoyValue, _args: &[SoyValue]) -> SauceResult<SoyValue> {
        Ok(value)
    }
}

/// `|id`: identity, used where a directive is required syntactically.
#[derive(Debug, Clone, Copy, Default)]
pub struct Id;

impl PrintDirective for Id {
    fn name(&self) -> &str {
        "|id"
    }

    fn apply(&self, value: SoyValue, _args: &[SoyValue]) -> SauceResult<SoyValue> {
        Ok(value)
    }
}

type DirectiveFn = dyn Fn(SoyValue, &[SoyValue]) -> SauceResult<SoyValue> + Send + Sync;

/// A print directive backed by a closure.
pub struct FnDirective {
    name: String,
    apply: Box<DirectiveFn>,
}

impl FnDirective {
    pub fn new<F>(name: impl Into<String>, apply: F) -> Self
    where
        F: Fn(SoyValue, &[SoyValue]) -> SauceResult<SoyValue> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            apply: Box::new(apply),
        }
    }
}

impl PrintDirective for FnDirective {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, value: SoyValue, args: &[SoyValue]) -> SauceResult<SoyValue> {
        (self.apply)(value, args)
    }
}

impl fmt::Debug for FnDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnDirective").field("name", &self.name).finish()
    }
}

type FunctionFn = dyn Fn(&[SoyValue]) -> SauceResult<SoyValue> + Send + Sync;

/// A plugin function backed by a closure.
pub struct FnFunction {
    name: String,
    call: Box<FunctionFn>,
}

impl FnFunction {
    pub fn new<F>(name: impl Into<String>, call: F) -> Self
    where
        F: Fn(&[SoyValue]) -> SauceResult<SoyValue> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            call: Box::new(call),
        }
    }
}

impl SoyFunction for FnFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, args: &[SoyValue]) -> SauceResult<SoyValue> {
        (self.call)(args)
    }
}

impl fmt::Debug for FnFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFunction").field("name", &self.name).finish()
    }
}

/// The directives every renderer knows about.
pub fn builtin_print_directives() -> PrintDirectives {
    let directives: [Arc<dyn PrintDirective>; 3] =
        [Arc::new(EscapeHtml), Arc::new(NoAutoescape), Arc::new(Id)];
    directives
        .into_iter()
        .map(|directive| (directive.name().to_string(), directive))
        .collect()
}

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
