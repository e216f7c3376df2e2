/*
 * registry.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The set of compiled templates available to a renderer.

use crate::error::{RenderError, RenderErrorKind, SauceResult};
use crate::selector::DelTemplateSelector;
use crate::template::{CompiledTemplate, TemplateFactory, TemplateMetadata};
use once_cell::sync::OnceCell;
use soy_data::{ContentKind, SoyRecord};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// One registered template: its factory plus static metadata.
pub struct TemplateEntry {
    name: String,
    factory: Arc<dyn TemplateFactory>,
    metadata: TemplateMetadata,
    transitive_ij: OnceCell<BTreeSet<String>>,
}

impl TemplateEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata(&self) -> &TemplateMetadata {
        &self.metadata
    }

    pub fn content_kind(&self) -> Option<ContentKind> {
        self.metadata.content_kind
    }

    /// Instantiate the template for one render.
    pub fn create(&self, params: Arc<SoyRecord>, ij: Arc<SoyRecord>) -> Box<dyn CompiledTemplate> {
        self.factory.create(params, ij)
    }
}

impl fmt::Debug for TemplateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateEntry")
            .field("name", &self.name)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Collects templates before they are frozen into [`CompiledTemplates`].
#[derive(Default)]
pub struct CompiledTemplatesBuilder {
    entries: Vec<TemplateEntry>,
}

impl CompiledTemplatesBuilder {
    /// Register a template.
    ///
    /// A template whose metadata carries a delegate descriptor is also
    /// registered as an implementation of that delegate.
    pub fn template(
        mut self,
        name: impl Into<String>,
        metadata: TemplateMetadata,
        factory: impl TemplateFactory + 'static,
    ) -> Self {
        self.entries.push(TemplateEntry {
            name: name.into(),
            factory: Arc::new(factory),
            metadata,
            transitive_ij: OnceCell::new(),
        });
        self
    }

    pub fn build(self) -> SauceResult<CompiledTemplates> {
        let mut templates = HashMap::new();
        let mut selector = DelTemplateSelector::new();

        for entry in self.entries {
            let entry = Arc::new(entry);
            if let Some(del) = &entry.metadata.deltemplate {
                selector.add(&del.name, &del.package, &del.variant, Arc::clone(&entry))?;
            }
            if templates
                .insert(entry.name.clone(), Arc::clone(&entry))
                .is_some()
            {
                return Err(RenderErrorKind::DuplicateTemplate {
                    name: entry.name.clone(),
                }
                .into());
            }
        }

        tracing::debug!(
            templates = templates.len(),
            "Compiled template registry built"
        );
        Ok(CompiledTemplates {
            templates,
            selector: Arc::new(selector),
        })
    }
}

/// Immutable registry of templates and delegate implementations.
#[derive(Debug)]
pub struct CompiledTemplates {
    templates: HashMap<String, Arc<TemplateEntry>>,
    selector: Arc<DelTemplateSelector<Arc<TemplateEntry>>>,
}

impl CompiledTemplates {
    pub fn builder() -> CompiledTemplatesBuilder {
        CompiledTemplatesBuilder::default()
    }

    pub fn template(&self, name: &str) -> SauceResult<&Arc<TemplateEntry>> {
        self.templates.get(name).ok_or_else(|| {
            RenderErrorKind::UnknownTemplate {
                name: name.to_string(),
            }
            .into()
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// The declared content kind of `name`, `None` if it is not strict.
    pub fn content_kind(&self, name: &str) -> SauceResult<Option<ContentKind>> {
        Ok(self.template(name)?.content_kind())
    }

    pub(crate) fn selector(&self) -> &Arc<DelTemplateSelector<Arc<TemplateEntry>>> {
        &self.selector
    }

    /// Every injected data key that `name` or anything it may call reads.
    ///
    /// Delegate calls count every implementation, since which one runs is
    /// only known at render time. The result is cached per template.
    pub fn transitive_ij_params(&self, name: &str) -> SauceResult<BTreeSet<String>> {
        let entry = self.template(name)?;
        entry
            .transitive_ij
            .get_or_try_init(|| {
                let mut visited = HashSet::new();
                let mut params = BTreeSet::new();
                self.collect_ij_params(entry, &mut visited, &mut params)?;
                Ok::<_, RenderError>(params)
            })
            .cloned()
    }

    fn collect_ij_params<'a>(
        &'a self,
        entry: &'a TemplateEntry,
        visited: &mut HashSet<&'a str>,
        params: &mut BTreeSet<String>,
    ) -> SauceResult<()> {
        if !visited.insert(entry.name.as_str()) {
            return Ok(());
        }
        if let Some(cached) = entry.transitive_ij.get() {
            params.extend(cached.iter().cloned());
            return Ok(());
        }

        params.extend(entry.metadata.injected_params.iter().cloned());
        for callee in &entry.metadata.callees {
            self.collect_ij_params(self.template(callee)?, visited, params)?;
        }
        for del_callee in &entry.metadata.del_callees {
            for implementation in self.selector.all_implementations(del_callee) {
                self.collect_ij_params(implementation, visited, params)?;
            }
        }
        Ok(())
    }
}
