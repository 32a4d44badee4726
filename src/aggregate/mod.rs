//! Plugin usage aggregation
//!
//! Accumulates plugin-to-repository associations from effective models and
//! finalizes them into the bidirectional index used for reporting.

use crate::descriptor::{EffectiveModel, PluginKey};
use crate::error::DescantResult;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Accumulates plugin usage across one scan run
#[derive(Debug, Default)]
pub struct PluginAggregator {
    repos_per_plugin: BTreeMap<PluginKey, BTreeSet<String>>,
    repositories: BTreeSet<String>,
}

impl PluginAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a repository as scanned.
    ///
    /// Registered repositories appear in the final report even when no
    /// descriptor or plugin was found for them.
    pub fn register_repository(&mut self, repo_id: impl Into<String>) {
        self.repositories.insert(repo_id.into());
    }

    /// Record one effective model for a repository.
    ///
    /// Every distinct plugin key among the model's declared plugins and
    /// plugin-management entries gains the repository in its usage set.
    pub fn record(&mut self, repo_id: &str, model: &EffectiveModel) {
        self.repositories.insert(repo_id.to_string());
        for key in model.distinct_plugins() {
            self.repos_per_plugin
                .entry(key)
                .or_default()
                .insert(repo_id.to_string());
        }
    }

    /// Number of repositories registered so far
    pub fn repository_count(&self) -> usize {
        self.repositories.len()
    }

    /// Produce the final bidirectional index and popularity ranking
    pub fn finalize(self) -> PluginReport {
        // Completeness: every scanned repository gets an entry up front
        let mut plugins_per_repo: BTreeMap<String, Vec<String>> = self
            .repositories
            .iter()
            .map(|repo| (repo.clone(), Vec::new()))
            .collect();

        // Exact transpose of repos_per_plugin
        for (plugin, repos) in &self.repos_per_plugin {
            for repo in repos {
                plugins_per_repo
                    .entry(repo.clone())
                    .or_default()
                    .push(plugin.to_string());
            }
        }
        for plugins in plugins_per_repo.values_mut() {
            plugins.sort();
        }

        let mut ranking: Vec<PluginUsage> = self
            .repos_per_plugin
            .iter()
            .map(|(plugin, repos)| PluginUsage {
                plugin: plugin.to_string(),
                repositories: repos.len(),
            })
            .collect();
        // Descending by usage; name order within a tie is incidental
        ranking.sort_by(|a, b| {
            b.repositories
                .cmp(&a.repositories)
                .then_with(|| a.plugin.cmp(&b.plugin))
        });

        PluginReport {
            repositories_scanned: self.repositories.len(),
            plugins_per_repo,
            ranking,
        }
    }
}

/// One plugin's popularity entry
#[derive(Debug, Clone, Serialize)]
pub struct PluginUsage {
    pub plugin: String,
    pub repositories: usize,
}

/// The finalized scan output
#[derive(Debug)]
pub struct PluginReport {
    /// Repository id → sorted plugin keys; every scanned repository present
    pub plugins_per_repo: BTreeMap<String, Vec<String>>,

    /// Plugins by descending repository count
    pub ranking: Vec<PluginUsage>,

    /// Total repositories registered during the scan
    pub repositories_scanned: usize,
}

impl PluginReport {
    /// Serialize the repository → plugin-keys mapping as JSON
    pub fn to_json(&self) -> DescantResult<String> {
        Ok(serde_json::to_string_pretty(&self.plugins_per_repo)?)
    }

    /// Write the JSON report to a file
    pub fn write_to(&self, path: &Path) -> DescantResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)
            .map_err(|e| crate::error::DescantError::io(format!("writing report {}", path.display()), e))
    }
}
