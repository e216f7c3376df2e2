/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Per-render configuration that can be loaded from JSON.
//!
//! Field names are camelCase in JSON:
//!
//! ```json
//! {
//!   "expectedContentKind": "HTML",
//!   "activeDelegatePackages": ["SecretFeature"],
//!   "cssRenamingMap": { "button": "a" },
//!   "xidRenamingMap": { "main-id": "b" }
//! }
//! ```

use crate::error::SauceResult;
use serde::{Deserialize, Serialize};
use soy_data::ContentKind;
use std::collections::{BTreeMap, BTreeSet};

/// Settings applied to a [`Renderer`](crate::Renderer) in one go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    /// Content kind the caller requires; enforced against the template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_content_kind: Option<ContentKind>,

    /// Delegate packages active for the render. An empty list deactivates
    /// every package; an absent one leaves the renderer's setting alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_delegate_packages: Option<BTreeSet<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_renaming_map: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xid_renaming_map: Option<BTreeMap<String, String>>,
}

impl RenderOptions {
    pub fn from_json_str(json: &str) -> SauceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_value(value: serde_json::Value) -> SauceResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}
