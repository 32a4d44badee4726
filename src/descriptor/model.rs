//! The effective model persisted by the cache
//!
//! Deliberately a lightweight value type holding only the fields downstream
//! consumers need, not the builder's full merged descriptor graph.

use super::coordinate::{Coordinate, PluginKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The fully merged and interpolated build configuration for one descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveModel {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub packaging: String,

    /// Plugins declared in `[build.plugins]` across the inheritance chain
    #[serde(default)]
    pub plugins: Vec<PluginKey>,

    /// Plugin-management entries across the inheritance chain
    #[serde(default)]
    pub plugin_management: Vec<PluginKey>,
}

impl EffectiveModel {
    /// The coordinate this model was built for
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(&self.group, &self.artifact, &self.version)
    }

    /// Distinct plugin keys from both declared plugins and plugin management
    pub fn distinct_plugins(&self) -> BTreeSet<PluginKey> {
        self.plugins
            .iter()
            .chain(self.plugin_management.iter())
            .cloned()
            .collect()
    }
}
