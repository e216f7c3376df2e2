/*
 * renaming.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! CSS class and XID renaming.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Maps a source name to its renamed form.
///
/// A name the map does not know is printed unchanged.
pub trait RenamingMap: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

impl<S: BuildHasher + Send + Sync> RenamingMap for HashMap<String, String, S> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl RenamingMap for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

/// Rename `key`, falling back to `key` itself.
pub(crate) fn rename(map: Option<&dyn RenamingMap>, key: &str) -> String {
    map.and_then(|map| map.get(key))
        .unwrap_or_else(|| key.to_string())
}
