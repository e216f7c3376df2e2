/*
 * selector.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Delegate template selection.
//!
//! Implementations of a delegate are grouped by `(name, variant)`. Each
//! group holds at most one default implementation (no package) and any
//! number of package implementations. A [`DelTemplateSelectorView`] binds
//! the registry to the set of packages active for one render and resolves
//! calls in this order:
//!
//! 1. the active package implementation of `(name, variant)`
//! 2. the active package implementation of `(name, "")`
//! 3. the default implementation of `(name, variant)`
//! 4. the default implementation of `(name, "")`
//!
//! Steps 2 and 4 only apply when `variant` is non-empty.

use crate::error::{RenderErrorKind, SauceResult};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

#[derive(Debug)]
struct Group<T> {
    default: Option<T>,
    /// Package implementations in registration order.
    packages: Vec<(String, T)>,
}

impl<T> Default for Group<T> {
    fn default() -> Self {
        Self {
            default: None,
            packages: Vec::new(),
        }
    }
}

impl<T> Group<T> {
    fn active(&self, active: &BTreeSet<String>) -> Option<&T> {
        self.packages
            .iter()
            .find(|(package, _)| active.contains(package))
            .map(|(_, value)| value)
    }

    fn active_packages(&self, active: &BTreeSet<String>) -> Vec<String> {
        self.packages
            .iter()
            .filter(|(package, _)| active.contains(package))
            .map(|(package, _)| package.clone())
            .collect()
    }

    fn values(&self) -> impl Iterator<Item = &T> {
        self.default
            .iter()
            .chain(self.packages.iter().map(|(_, value)| value))
    }
}

/// Registry of delegate implementations keyed by name and variant.
#[derive(Debug)]
pub struct DelTemplateSelector<T> {
    // name -> variant -> group
    groups: BTreeMap<String, BTreeMap<String, Group<T>>>,
}

impl<T> Default for DelTemplateSelector<T> {
    fn default() -> Self {
        Self {
            groups: BTreeMap::new(),
        }
    }
}

impl<T> DelTemplateSelector<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an implementation. An empty `package` registers the default.
    ///
    /// Fails when the same `(name, package, variant)` is already registered.
    pub fn add(&mut self, name: &str, package: &str, variant: &str, value: T) -> SauceResult<()> {
        let group = self
            .groups
            .entry(name.to_string())
            .or_default()
            .entry(variant.to_string())
            .or_default();

        let duplicate = if package.is_empty() {
            group.default.is_some()
        } else {
            group.packages.iter().any(|(existing, _)| existing == package)
        };
        if duplicate {
            return Err(RenderErrorKind::DuplicateDelegate {
                name: name.to_string(),
                variant: variant.to_string(),
                package: package.to_string(),
            }
            .into());
        }

        if package.is_empty() {
            group.default = Some(value);
        } else {
            group.packages.push((package.to_string(), value));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Whether any implementation of `name` is registered.
    pub fn has_delegate(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// Every implementation of `name`, across all variants and packages.
    pub fn all_implementations<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a T> + 'a {
        self.groups
            .get(name)
            .into_iter()
            .flat_map(|variants| variants.values())
            .flat_map(Group::values)
    }

    fn group(&self, name: &str, variant: &str) -> Option<&Group<T>> {
        self.groups.get(name).and_then(|variants| variants.get(variant))
    }
}

/// A selector bound to the set of packages active for one render.
#[derive(Debug)]
pub struct DelTemplateSelectorView<T> {
    selector: Arc<DelTemplateSelector<T>>,
    active: BTreeSet<String>,
}

impl<T> Clone for DelTemplateSelectorView<T> {
    fn clone(&self) -> Self {
        Self {
            selector: Arc::clone(&self.selector),
            active: self.active.clone(),
        }
    }
}

impl<T> DelTemplateSelectorView<T> {
    /// Bind `selector` to `active` packages.
    ///
    /// Fails if two active packages implement the same `(name, variant)`,
    /// since neither can be preferred.
    pub fn new(selector: Arc<DelTemplateSelector<T>>, active: BTreeSet<String>) -> SauceResult<Self> {
        for (name, variants) in &selector.groups {
            for (variant, group) in variants {
                let packages = group.active_packages(&active);
                if packages.len() > 1 {
                    return Err(RenderErrorKind::ConflictingDelegates {
                        name: name.clone(),
                        variant: variant.clone(),
                        packages,
                    }
                    .into());
                }
            }
        }
        Ok(Self { selector, active })
    }

    pub fn active_packages(&self) -> &BTreeSet<String> {
        &self.active
    }

    /// Resolve a delegate call; `None` when nothing applies.
    pub fn select(&self, name: &str, variant: &str) -> Option<&T> {
        let exact = self.selector.group(name, variant);
        let fallback = if variant.is_empty() {
            None
        } else {
            self.selector.group(name, "")
        };

        exact
            .and_then(|group| group.active(&self.active))
            .or_else(|| fallback.and_then(|group| group.active(&self.active)))
            .or_else(|| exact.and_then(|group| group.default.as_ref()))
            .or_else(|| fallback.and_then(|group| group.default.as_ref()))
    }
}
