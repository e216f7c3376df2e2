/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Per-render environment handed to every template.
//!
//! A [`RenderContext`] is built once when a render is prepared and then only
//! read. Templates receive it by reference on every `render` call, so nested
//! calls, delegate selection, directives and messages all see the same
//! configuration.

use crate::directives::{PrintDirective, PrintDirectives, SoyFunction, SoyFunctions};
use crate::error::{RenderErrorKind, SauceResult};
use crate::registry::{CompiledTemplates, TemplateEntry};
use crate::renaming::{self, RenamingMap};
use crate::selector::DelTemplateSelectorView;
use crate::template::{CompiledTemplate, EmptyTemplate};
use soy_data::{ContentKind, JsonValueConverter, SoyRecord, ValueConverter};
use soy_msgs::{SoyMsg, SoyMsgBundle};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Locale used when neither bundle carries one.
pub const DEFAULT_LOCALE: &str = "en";

/// The template chosen for a call, ready to render.
pub struct ResolvedCallee {
    pub template: Box<dyn CompiledTemplate>,
    /// Declared kind of the chosen template; `Text` for the empty default.
    pub content_kind: Option<ContentKind>,
    /// Registered name of the chosen template; empty for the empty default.
    pub name: String,
}

impl fmt::Debug for ResolvedCallee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCallee")
            .field("name", &self.name)
            .field("content_kind", &self.content_kind)
            .finish_non_exhaustive()
    }
}

/// Everything a template may consult while rendering.
#[derive(Clone)]
pub struct RenderContext {
    templates: Arc<CompiledTemplates>,
    selector: DelTemplateSelectorView<Arc<TemplateEntry>>,
    functions: Arc<SoyFunctions>,
    print_directives: Arc<PrintDirectives>,
    converter: Arc<dyn ValueConverter>,
    css_renaming_map: Option<Arc<dyn RenamingMap>>,
    xid_renaming_map: Option<Arc<dyn RenamingMap>>,
    msg_bundle: Arc<SoyMsgBundle>,
    default_msg_bundle: Arc<SoyMsgBundle>,
}

impl RenderContext {
    pub fn builder(templates: Arc<CompiledTemplates>) -> RenderContextBuilder {
        RenderContextBuilder::new(templates)
    }

    pub fn templates(&self) -> &CompiledTemplates {
        &self.templates
    }

    pub fn active_delegate_packages(&self) -> &BTreeSet<String> {
        self.selector.active_packages()
    }

    /// Instantiate a template for a basic call.
    pub fn create_template(
        &self,
        name: &str,
        params: Arc<SoyRecord>,
        ij: Arc<SoyRecord>,
    ) -> SauceResult<Box<dyn CompiledTemplate>> {
        Ok(self.templates.template(name)?.create(params, ij))
    }

    /// Resolve a delegate call against the active packages.
    ///
    /// When nothing matches, `allow_empty_default` yields a template that
    /// writes nothing; otherwise the call fails.
    pub fn select_del_template(
        &self,
        name: &str,
        variant: &str,
        allow_empty_default: bool,
        params: Arc<SoyRecord>,
        ij: Arc<SoyRecord>,
    ) -> SauceResult<ResolvedCallee> {
        match self.selector.select(name, variant) {
            Some(entry) => {
                tracing::debug!(
                    delegate = name,
                    variant,
                    selected = entry.name(),
                    "Selected delegate implementation"
                );
                Ok(ResolvedCallee {
                    template: entry.create(params, ij),
                    content_kind: entry.content_kind(),
                    name: entry.name().to_string(),
                })
            }
            None if allow_empty_default => {
                tracing::debug!(
                    delegate = name,
                    variant,
                    "No delegate implementation, rendering empty default"
                );
                Ok(ResolvedCallee {
                    template: Box::new(EmptyTemplate),
                    content_kind: Some(ContentKind::Text),
                    name: String::new(),
                })
            }
            None => Err(RenderErrorKind::NoActiveDelegate {
                name: name.to_string(),
                variant: variant.to_string(),
            }
            .into()),
        }
    }

    pub fn print_directive(&self, name: &str) -> SauceResult<&dyn PrintDirective> {
        self.print_directives
            .get(name)
            .map(|directive| directive.as_ref())
            .ok_or_else(|| {
                RenderErrorKind::UnknownPrintDirective {
                    name: name.to_string(),
                }
                .into()
            })
    }

    /// Look up several directives at once, keeping them shareable.
    pub fn print_directives(&self, names: &[String]) -> SauceResult<Vec<Arc<dyn PrintDirective>>> {
        names
            .iter()
            .map(|name| {
                self.print_directives.get(name).cloned().ok_or_else(|| {
                    RenderErrorKind::UnknownPrintDirective { name: name.clone() }.into()
                })
            })
            .collect()
    }

    pub fn function(&self, name: &str) -> SauceResult<&dyn SoyFunction> {
        self.functions
            .get(name)
            .map(|function| function.as_ref())
            .ok_or_else(|| {
                RenderErrorKind::UnknownFunction {
                    name: name.to_string(),
                }
                .into()
            })
    }

    pub fn converter(&self) -> &dyn ValueConverter {
        self.converter.as_ref()
    }

    pub fn rename_css(&self, selector: &str) -> String {
        renaming::rename(self.css_renaming_map.as_deref(), selector)
    }

    pub fn rename_xid(&self, xid: &str) -> String {
        renaming::rename(self.xid_renaming_map.as_deref(), xid)
    }

    /// A message from the active bundle, else from the default bundle.
    pub fn soy_msg(&self, id: u64) -> Option<&SoyMsg> {
        self.msg_bundle
            .msg(id)
            .or_else(|| self.default_msg_bundle.msg(id))
    }

    /// Locale of the active bundle, else of the default bundle.
    pub fn locale(&self) -> &str {
        self.msg_bundle
            .locale()
            .or_else(|| self.default_msg_bundle.locale())
            .unwrap_or(DEFAULT_LOCALE)
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("templates", &self.templates.len())
            .field("active_delegate_packages", self.selector.active_packages())
            .field("locale", &self.locale())
            .finish_non_exhaustive()
    }
}

/// Assembles a [`RenderContext`].
pub struct RenderContextBuilder {
    templates: Arc<CompiledTemplates>,
    active_packages: BTreeSet<String>,
    functions: Arc<SoyFunctions>,
    print_directives: Arc<PrintDirectives>,
    converter: Arc<dyn ValueConverter>,
    css_renaming_map: Option<Arc<dyn RenamingMap>>,
    xid_renaming_map: Option<Arc<dyn RenamingMap>>,
    msg_bundle: Arc<SoyMsgBundle>,
    default_msg_bundle: Arc<SoyMsgBundle>,
}

impl RenderContextBuilder {
    pub fn new(templates: Arc<CompiledTemplates>) -> Self {
        Self {
            templates,
            active_packages: BTreeSet::new(),
            functions: Arc::new(SoyFunctions::new()),
            print_directives: Arc::new(crate::directives::builtin_print_directives()),
            converter: Arc::new(JsonValueConverter),
            css_renaming_map: None,
            xid_renaming_map: None,
            msg_bundle: Arc::new(SoyMsgBundle::empty()),
            default_msg_bundle: Arc::new(SoyMsgBundle::empty()),
        }
    }

    pub fn active_delegate_packages(mut self, packages: BTreeSet<String>) -> Self {
        self.active_packages = packages;
        self
    }

    pub fn functions(mut self, functions: Arc<SoyFunctions>) -> Self {
        self.functions = functions;
        self
    }

    pub fn print_directives(mut self, directives: Arc<PrintDirectives>) -> Self {
        self.print_directives = directives;
        self
    }

    pub fn converter(mut self, converter: Arc<dyn ValueConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn css_renaming_map(mut self, map: Option<Arc<dyn RenamingMap>>) -> Self {
        self.css_renaming_map = map;
        self
    }

    pub fn xid_renaming_map(mut self, map: Option<Arc<dyn RenamingMap>>) -> Self {
        self.xid_renaming_map = map;
        self
    }

    pub fn msg_bundle(mut self, bundle: Arc<SoyMsgBundle>) -> Self {
        self.msg_bundle = bundle;
        self
    }

    pub fn default_msg_bundle(mut self, bundle: Arc<SoyMsgBundle>) -> Self {
        self.default_msg_bundle = bundle;
        self
    }

    /// Freeze the configuration.
    ///
    /// Fails if the active packages make any delegate ambiguous.
    pub fn build(self) -> SauceResult<RenderContext> {
        let selector = DelTemplateSelectorView::new(
            Arc::clone(self.templates.selector()),
            self.active_packages,
        )?;
        Ok(RenderContext {
            templates: self.templates,
            selector,
            functions: self.functions,
            print_directives: self.print_directives,
            converter: self.converter,
            css_renaming_map: self.css_renaming_map,
            xid_renaming_map: self.xid_renaming_map,
            msg_bundle: self.msg_bundle,
            default_msg_bundle: self.default_msg_bundle,
        })
    }
}
