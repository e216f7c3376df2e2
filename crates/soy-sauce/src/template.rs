/*
 * template.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The contract between the runtime and compiled templates.

use crate::context::RenderContext;
use crate::error::SauceResult;
use soy_data::{AdvisingAppendable, ContentKind, RenderResult, SoyRecord};
use std::collections::BTreeSet;
use std::sync::Arc;

/// A template instance bound to its parameters, able to render in steps.
///
/// `render` writes as much output as it can and reports why it stopped.
/// After `Limited` or `Detach` the caller calls `render` again with the same
/// sink and context, and the template resumes exactly where it left off, so
/// the concatenation of all writes equals a single uninterrupted render.
/// Calling `render` again after `Done` is not supported.
pub trait CompiledTemplate: Send {
    fn render(
        &mut self,
        out: &mut dyn AdvisingAppendable,
        context: &RenderContext,
    ) -> SauceResult<RenderResult>;
}

/// Creates template instances from parameters and injected data.
pub trait TemplateFactory: Send + Sync {
    fn create(&self, params: Arc<SoyRecord>, ij: Arc<SoyRecord>) -> Box<dyn CompiledTemplate>;
}

impl<F> TemplateFactory for F
where
    F: Fn(Arc<SoyRecord>, Arc<SoyRecord>) -> Box<dyn CompiledTemplate> + Send + Sync,
{
    fn create(&self, params: Arc<SoyRecord>, ij: Arc<SoyRecord>) -> Box<dyn CompiledTemplate> {
        self(params, ij)
    }
}

/// Identifies one implementation of a delegate template.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DelTemplateMetadata {
    pub name: String,
    /// Empty for the default implementation.
    pub package: String,
    /// Empty when the implementation has no variant.
    pub variant: String,
}

impl DelTemplateMetadata {
    pub fn new(
        name: impl Into<String>,
        package: impl Into<String>,
        variant: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            variant: variant.into(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.package.is_empty()
    }
}

/// Static facts about a compiled template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateMetadata {
    /// The declared output kind; `None` for non-strict templates.
    pub content_kind: Option<ContentKind>,
    /// Names of templates reached through basic calls.
    pub callees: BTreeSet<String>,
    /// Names of delegate templates reached through delegate calls.
    pub del_callees: BTreeSet<String>,
    /// Injected data keys read directly by this template.
    pub injected_params: BTreeSet<String>,
    /// Set when this template implements a delegate.
    pub deltemplate: Option<DelTemplateMetadata>,
}

impl TemplateMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_kind(mut self, kind: ContentKind) -> Self {
        self.content_kind = Some(kind);
        self
    }

    pub fn with_callee(mut self, name: impl Into<String>) -> Self {
        self.callees.insert(name.into());
        self
    }

    pub fn with_del_callee(mut self, name: impl Into<String>) -> Self {
        self.del_callees.insert(name.into());
        self
    }

    pub fn with_injected_param(mut self, name: impl Into<String>) -> Self {
        self.injected_params.insert(name.into());
        self
    }

    pub fn with_deltemplate(mut self, deltemplate: DelTemplateMetadata) -> Self {
        self.deltemplate = Some(deltemplate);
        self
    }
}

/// A template that writes nothing.
///
/// Stands in for a delegate call that found no implementation but allows an
/// empty default.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyTemplate;

impl CompiledTemplate for EmptyTemplate {
    fn render(
        &mut self,
        _out: &mut dyn AdvisingAppendable,
        _context: &RenderContext,
    ) -> SauceResult<RenderResult> {
        Ok(RenderResult::Done)
    }
}
