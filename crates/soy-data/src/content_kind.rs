/*
 * content_kind.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Content kinds and sanitized content.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared output classification of a strict template.
///
/// Non-strict templates have no kind; that is modelled as
/// `Option<ContentKind>` wherever it matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentKind {
    Html,
    Js,
    Css,
    Uri,
    TrustedResourceUri,
    Attributes,
    Text,
}

impl ContentKind {
    pub const ALL: [ContentKind; 7] = [
        ContentKind::Html,
        ContentKind::Js,
        ContentKind::Css,
        ContentKind::Uri,
        ContentKind::TrustedResourceUri,
        ContentKind::Attributes,
        ContentKind::Text,
    ];

    /// The upper-case name used in diagnostics and configuration.
    pub fn name(self) -> &'static str {
        match self {
            ContentKind::Html => "HTML",
            ContentKind::Js => "JS",
            ContentKind::Css => "CSS",
            ContentKind::Uri => "URI",
            ContentKind::TrustedResourceUri => "TRUSTED_RESOURCE_URI",
            ContentKind::Attributes => "ATTRIBUTES",
            ContentKind::Text => "TEXT",
        }
    }

    /// The value written in a template's `kind="..."` attribute.
    pub fn attribute_value(self) -> &'static str {
        match self {
            ContentKind::Html => "html",
            ContentKind::Js => "js",
            ContentKind::Css => "css",
            ContentKind::Uri => "uri",
            ContentKind::TrustedResourceUri => "trusted_resource_uri",
            ContentKind::Attributes => "attributes",
            ContentKind::Text => "text",
        }
    }

    /// Parse either the upper-case name or the attribute value.
    pub fn parse(s: &str) -> Option<ContentKind> {
        ContentKind::ALL
            .into_iter()
            .find(|k| k.name() == s || k.attribute_value() == s)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A string tagged with the content kind it is known to be safe as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SanitizedContent {
    content: String,
    kind: ContentKind,
}

impl SanitizedContent {
    /// Tag `content` as safe for `kind` without inspecting it.
    ///
    /// Only the renderer itself should call this, on output produced by a
    /// template that declared `kind`.
    pub fn ordain_as_safe(content: impl Into<String>, kind: ContentKind) -> Self {
        Self {
            content: content.into(),
            kind,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

impl fmt::Display for SanitizedContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}
