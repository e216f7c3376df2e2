/*
 * renderer.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Entry points: the [`SoySauce`] engine and per-render [`Renderer`]s.
//!
//! A `Renderer` collects per-render configuration and is consumed by
//! [`Renderer::prepare`], which freezes that configuration into a
//! [`RenderContext`]. The resulting [`PreparedRenderer`] can start any
//! number of independent renders of the same template.

use crate::context::{DEFAULT_LOCALE, RenderContext};
use crate::continuation::{Continuation, WriteContinuation};
use crate::directives::{PrintDirective, PrintDirectives, SoyFunction, SoyFunctions};
use crate::error::{RenderErrorKind, SauceResult};
use crate::options::RenderOptions;
use crate::registry::{CompiledTemplates, TemplateEntry};
use crate::renaming::RenamingMap;
use soy_data::{
    AdvisingAppendable, ContentKind, JsonValueConverter, OutputBuffer, SanitizedContent,
    SoyRecord, ValueConverter,
};
use soy_msgs::SoyMsgBundle;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Check a template's declared kind against the kind the caller expects.
///
/// `Text` accepts any template. Otherwise the template must be strict and
/// declare exactly `expected`.
pub fn enforce_content_kind(
    template: &str,
    expected: ContentKind,
    declared: Option<ContentKind>,
) -> SauceResult<()> {
    if expected == ContentKind::Text {
        return Ok(());
    }
    match declared {
        None => Err(RenderErrorKind::NonStrictTemplate {
            template: template.to_string(),
            expected,
        }
        .into()),
        Some(actual) if actual != expected => Err(RenderErrorKind::ContentKindMismatch {
            template: template.to_string(),
            expected,
            actual,
        }
        .into()),
        Some(_) => Ok(()),
    }
}

/// The engine: compiled templates plus the plugins shared by all renders.
#[derive(Clone)]
pub struct SoySauce {
    templates: Arc<CompiledTemplates>,
    functions: Arc<SoyFunctions>,
    print_directives: Arc<PrintDirectives>,
    converter: Arc<dyn ValueConverter>,
    default_msg_bundle: Arc<SoyMsgBundle>,
}

impl SoySauce {
    /// An engine with the built-in print directives and no functions.
    pub fn new(templates: CompiledTemplates) -> Self {
        Self::builder(templates).build()
    }

    pub fn builder(templates: CompiledTemplates) -> SoySauceBuilder {
        SoySauceBuilder {
            templates,
            functions: SoyFunctions::new(),
            print_directives: crate::directives::builtin_print_directives(),
            converter: Arc::new(JsonValueConverter),
            default_msg_bundle: SoyMsgBundle::empty(),
        }
    }

    pub fn templates(&self) -> &CompiledTemplates {
        &self.templates
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains(name)
    }

    /// Injected data keys that rendering `name` may read.
    pub fn transitive_ij_params(&self, name: &str) -> SauceResult<BTreeSet<String>> {
        self.templates.transitive_ij_params(name)
    }

    /// Start configuring a render of `name`.
    pub fn render_template(&self, name: &str) -> SauceResult<Renderer> {
        let template = Arc::clone(self.templates.template(name)?);
        Ok(Renderer {
            sauce: self.clone(),
            template,
            data: SoyRecord::new(),
            ij: SoyRecord::new(),
            active_packages: BTreeSet::new(),
            msg_bundle: SoyMsgBundle::empty(),
            css_renaming_map: None,
            xid_renaming_map: None,
            expected_content_kind: ContentKind::Html,
            content_kind_explicitly_set: false,
        })
    }
}

impl fmt::Debug for SoySauce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoySauce")
            .field("templates", &self.templates.len())
            .field("functions", &self.functions.len())
            .field("print_directives", &self.print_directives.len())
            .finish_non_exhaustive()
    }
}

/// Configures a [`SoySauce`].
pub struct SoySauceBuilder {
    templates: CompiledTemplates,
    functions: SoyFunctions,
    print_directives: PrintDirectives,
    converter: Arc<dyn ValueConverter>,
    default_msg_bundle: SoyMsgBundle,
}

impl SoySauceBuilder {
    pub fn function(mut self, function: impl SoyFunction + 'static) -> Self {
        self.functions
            .insert(function.name().to_string(), Arc::new(function));
        self
    }

    /// Register a directive; replaces a built-in of the same name.
    pub fn print_directive(mut self, directive: impl PrintDirective + 'static) -> Self {
        self.print_directives
            .insert(directive.name().to_string(), Arc::new(directive));
        self
    }

    pub fn converter(mut self, converter: impl ValueConverter + 'static) -> Self {
        self.converter = Arc::new(converter);
        self
    }

    /// Messages used when the per-render bundle lacks an id, typically the
    /// source-language messages. Re-tagged as English for plural rules.
    pub fn default_msg_bundle(mut self, bundle: SoyMsgBundle) -> Self {
        self.default_msg_bundle = bundle;
        self
    }

    pub fn build(self) -> SoySauce {
        SoySauce {
            templates: Arc::new(self.templates),
            functions: Arc::new(self.functions),
            print_directives: Arc::new(self.print_directives),
            converter: self.converter,
            default_msg_bundle: Arc::new(self.default_msg_bundle.with_locale(DEFAULT_LOCALE)),
        }
    }
}

/// Per-render configuration for one template.
pub struct Renderer {
    sauce: SoySauce,
    template: Arc<TemplateEntry>,
    data: SoyRecord,
    ij: SoyRecord,
    active_packages: BTreeSet<String>,
    msg_bundle: SoyMsgBundle,
    css_renaming_map: Option<Arc<dyn RenamingMap>>,
    xid_renaming_map: Option<Arc<dyn RenamingMap>>,
    expected_content_kind: ContentKind,
    content_kind_explicitly_set: bool,
}

impl Renderer {
    pub fn set_data(mut self, data: SoyRecord) -> Self {
        self.data = data;
        self
    }

    /// Set the template parameters from a JSON object.
    pub fn set_data_json(mut self, data: &serde_json::Value) -> SauceResult<Self> {
        self.data = self.sauce.converter.convert_record(data)?;
        Ok(self)
    }

    pub fn set_ij(mut self, ij: SoyRecord) -> Self {
        self.ij = ij;
        self
    }

    /// Set the injected data from a JSON object.
    pub fn set_ij_json(mut self, ij: &serde_json::Value) -> SauceResult<Self> {
        self.ij = self.sauce.converter.convert_record(ij)?;
        Ok(self)
    }

    pub fn set_active_delegate_package_names<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active_packages = packages.into_iter().map(Into::into).collect();
        self
    }

    /// Messages for this render. An empty bundle means every message comes
    /// from the engine's default bundle.
    pub fn set_msg_bundle(mut self, bundle: SoyMsgBundle) -> Self {
        self.msg_bundle = bundle;
        self
    }

    pub fn set_css_renaming_map(mut self, map: impl RenamingMap + 'static) -> Self {
        self.css_renaming_map = Some(Arc::new(map));
        self
    }

    pub fn set_xid_renaming_map(mut self, map: impl RenamingMap + 'static) -> Self {
        self.xid_renaming_map = Some(Arc::new(map));
        self
    }

    /// Require the template to declare `kind`. `Text` accepts any template.
    pub fn set_expected_content_kind(mut self, kind: ContentKind) -> Self {
        self.expected_content_kind = kind;
        self.content_kind_explicitly_set = true;
        self
    }

    /// Apply every setting present in `options`.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        if let Some(kind) = options.expected_content_kind {
            self = self.set_expected_content_kind(kind);
        }
        if let Some(packages) = options.active_delegate_packages {
            self.active_packages = packages;
        }
        if let Some(map) = options.css_renaming_map {
            self = self.set_css_renaming_map(map);
        }
        if let Some(map) = options.xid_renaming_map {
            self = self.set_xid_renaming_map(map);
        }
        self
    }

    /// Freeze the configuration.
    ///
    /// Fails if the active packages make a delegate ambiguous.
    pub fn prepare(self) -> SauceResult<PreparedRenderer> {
        tracing::debug!(
            template = self.template.name(),
            active_packages = ?self.active_packages,
            "Preparing render"
        );
        let context = RenderContext::builder(Arc::clone(&self.sauce.templates))
            .active_delegate_packages(self.active_packages)
            .functions(Arc::clone(&self.sauce.functions))
            .print_directives(Arc::clone(&self.sauce.print_directives))
            .converter(Arc::clone(&self.sauce.converter))
            .css_renaming_map(self.css_renaming_map)
            .xid_renaming_map(self.xid_renaming_map)
            .msg_bundle(Arc::new(self.msg_bundle))
            .default_msg_bundle(Arc::clone(&self.sauce.default_msg_bundle))
            .build()?;

        Ok(PreparedRenderer {
            template: self.template,
            data: Arc::new(self.data),
            ij: Arc::new(self.ij),
            context: Arc::new(context),
            expected_content_kind: self.expected_content_kind,
            content_kind_explicitly_set: self.content_kind_explicitly_set,
        })
    }

    /// Prepare and render once into `out`.
    pub fn render<W: AdvisingAppendable>(self, out: W) -> SauceResult<WriteContinuation<W>> {
        self.prepare()?.render(out)
    }

    /// Prepare and render once into a string.
    pub fn render_to_string(self) -> SauceResult<Continuation<String>> {
        self.prepare()?.render_to_string()
    }

    /// Prepare and render once as sanitized content.
    pub fn render_strict(self) -> SauceResult<Continuation<SanitizedContent>> {
        self.prepare()?.render_strict()
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("template", &self.template.name())
            .field("active_packages", &self.active_packages)
            .field("expected_content_kind", &self.expected_content_kind)
            .finish_non_exhaustive()
    }
}

/// A frozen render configuration. Each call starts an independent render.
#[derive(Clone)]
pub struct PreparedRenderer {
    template: Arc<TemplateEntry>,
    data: Arc<SoyRecord>,
    ij: Arc<SoyRecord>,
    context: Arc<RenderContext>,
    expected_content_kind: ContentKind,
    content_kind_explicitly_set: bool,
}

impl PreparedRenderer {
    pub fn template_name(&self) -> &str {
        self.template.name()
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Render into a caller-owned sink, which may ask for pauses.
    pub fn render<W: AdvisingAppendable>(&self, out: W) -> SauceResult<WriteContinuation<W>> {
        self.check_content_kind()?;
        self.start(out)
    }

    /// Render into a string.
    pub fn render_to_string(&self) -> SauceResult<Continuation<String>> {
        self.check_content_kind()?;
        Ok(Continuation::new(self.start(OutputBuffer::new())?, None))
    }

    /// Render a strict template into content tagged with the expected kind.
    pub fn render_strict(&self) -> SauceResult<Continuation<SanitizedContent>> {
        if self.template.content_kind().is_none() {
            return Err(RenderErrorKind::StrictRequired {
                template: self.template.name().to_string(),
            }
            .into());
        }
        enforce_content_kind(
            self.template.name(),
            self.expected_content_kind,
            self.template.content_kind(),
        )?;
        Ok(Continuation::new(
            self.start(OutputBuffer::new())?,
            Some(self.expected_content_kind),
        ))
    }

    fn check_content_kind(&self) -> SauceResult<()> {
        if self.content_kind_explicitly_set || self.template.content_kind().is_some() {
            enforce_content_kind(
                self.template.name(),
                self.expected_content_kind,
                self.template.content_kind(),
            )?;
        }
        Ok(())
    }

    fn start<W: AdvisingAppendable>(&self, out: W) -> SauceResult<WriteContinuation<W>> {
        let template = self
            .template
            .create(Arc::clone(&self.data), Arc::clone(&self.ij));
        WriteContinuation::start(
            self.template.name(),
            template,
            Arc::clone(&self.context),
            out,
        )
    }
}

impl fmt::Debug for PreparedRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedRenderer")
            .field("template", &self.template.name())
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
