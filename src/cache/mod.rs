//! Durable effective-model cache
//!
//! Memoizes the expensive inheritance resolution per descriptor file. Cache
//! keys are descriptor paths relative to the scan root, mirrored as `.json`
//! entries under the cache root. Build failures are cached as tombstones so
//! known-bad descriptors are not re-attempted on later runs.
//!
//! | Entry | Lookup result |
//! |----------|----------------------------------|
//! | resolved | the stored model |
//! | failed | `None`, builder not re-invoked |
//! | corrupt | `None`, builder not re-invoked |

use crate::builder::{ModelBuildRequest, ModelBuilder, ValidationLevel};
use crate::descriptor::EffectiveModel;
use crate::error::{DescantError, DescantResult};
use crate::resolver::{DescriptorResolver, ResolverSettings};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// One durable cache entry
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum CacheEntry {
    /// A successfully built effective model
    Resolved {
        model: EffectiveModel,
        cached_at: DateTime<Utc>,
    },

    /// A tombstone for a build that failed; never retried until the entry
    /// is removed externally
    Failed {
        reason: String,
        cached_at: DateTime<Utc>,
    },
}

/// Per-descriptor-file cache over the model builder
pub struct EffectiveModelCache {
    cache_root: PathBuf,
    scan_root: PathBuf,
    resolver_settings: ResolverSettings,
    system_properties: BTreeMap<String, String>,
    builder: Box<dyn ModelBuilder>,
}

impl EffectiveModelCache {
    /// Create a cache rooted at `cache_root`, keyed relative to `scan_root`
    pub fn new(
        cache_root: impl Into<PathBuf>,
        scan_root: impl Into<PathBuf>,
        resolver_settings: ResolverSettings,
        system_properties: BTreeMap<String, String>,
        builder: Box<dyn ModelBuilder>,
    ) -> Self {
        Self {
            cache_root: cache_root.into(),
            scan_root: scan_root.into(),
            resolver_settings,
            system_properties,
            builder,
        }
    }

    /// Get the effective model for a descriptor file, consulting the
    /// durable cache first.
    ///
    /// Returns `None` when the descriptor does not exist on disk or when a
    /// prior (or current) build failed. A cache hit never re-invokes the
    /// builder.
    pub fn effective_model(&self, descriptor_path: &Path) -> DescantResult<Option<EffectiveModel>> {
        let entry_path = self.entry_path(descriptor_path);

        if entry_path.is_file() {
            debug!("Cache hit: {}", entry_path.display());
            return Ok(self.read_entry(&entry_path));
        }

        if !descriptor_path.is_file() {
            // Nothing to remember
            return Ok(None);
        }

        let outcome = self.build(descriptor_path);
        let entry = match &outcome {
            Ok(model) => CacheEntry::Resolved {
                model: model.clone(),
                cached_at: Utc::now(),
            },
            Err(err) => {
                warn!(
                    "Model build failed for {}: {}",
                    descriptor_path.display(),
                    err
                );
                CacheEntry::Failed {
                    reason: err.to_string(),
                    cached_at: Utc::now(),
                }
            }
        };

        // Persist unconditionally once a build was attempted, success or
        // failure, so the outcome is never recomputed on a later run
        if let Err(write_err) = self.write_entry(&entry_path, &entry) {
            warn!(
                "Failed to persist cache entry {}: {}",
                entry_path.display(),
                write_err
            );
        }

        Ok(outcome.ok())
    }

    /// The durable location mirroring a descriptor's relative path
    fn entry_path(&self, descriptor_path: &Path) -> PathBuf {
        let relative: PathBuf = match descriptor_path.strip_prefix(&self.scan_root) {
            Ok(rel) => rel.to_path_buf(),
            // Outside the scan root: mirror the normal components only
            Err(_) => descriptor_path
                .components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .collect(),
        };
        let mut path = self.cache_root.join(relative);
        path.set_extension("json");
        path
    }

    fn build(&self, descriptor_path: &Path) -> DescantResult<EffectiveModel> {
        let base_dir = descriptor_path.parent().ok_or_else(|| {
            DescantError::Internal(format!(
                "descriptor path has no parent directory: {}",
                descriptor_path.display()
            ))
        })?;

        // Fresh resolver per build: local and ancestor lookups must be
        // rooted at the descriptor's own directory
        let resolver = DescriptorResolver::new(base_dir, self.resolver_settings.clone());

        self.builder.build(ModelBuildRequest {
            descriptor_path,
            resolver,
            system_properties: &self.system_properties,
            validation: ValidationLevel::Minimal,
            process_plugins: true,
        })
    }

    fn read_entry(&self, entry_path: &Path) -> Option<EffectiveModel> {
        let content = match std::fs::read(entry_path) {
            Ok(content) => content,
            Err(err) => {
                warn!("Unreadable cache entry {}: {}", entry_path.display(), err);
                return None;
            }
        };

        match serde_json::from_slice::<CacheEntry>(&content) {
            Ok(CacheEntry::Resolved { model, .. }) => Some(model),
            Ok(CacheEntry::Failed { reason, .. }) => {
                debug!(
                    "Cached failure for {}: {}",
                    entry_path.display(),
                    reason
                );
                None
            }
            Err(err) => {
                warn!("Corrupt cache entry {}: {}", entry_path.display(), err);
                None
            }
        }
    }

    /// Write an entry atomically (temp file + rename) so concurrent readers
    /// never observe a torn entry.
    fn write_entry(&self, entry_path: &Path, entry: &CacheEntry) -> DescantResult<()> {
        if let Some(parent) = entry_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DescantError::DirCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let content = serde_json::to_vec_pretty(entry)?;
        let temp_path = entry_path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).map_err(|e| DescantError::CacheEntryWrite {
            path: temp_path.clone(),
            source: e,
        })?;
        std::fs::rename(&temp_path, entry_path).map_err(|e| DescantError::CacheEntryWrite {
            path: entry_path.to_path_buf(),
            source: e,
        })?;

        debug!("Cached {}", entry_path.display());
        Ok(())
    }
}
