//! Configuration schema for Descant
//!
//! Configuration is stored at `~/.config/descant/config.toml`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Corpus scan settings
    pub scan: ScanConfig,

    /// Remote descriptor repository settings
    pub remote: RemoteConfig,

    /// Durable effective-model cache settings
    pub cache: CacheConfig,

    /// System-wide property values handed to the model builder.
    ///
    /// These take precedence over properties declared in descriptors.
    pub properties: BTreeMap<String, String>,
}

/// Corpus scan settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File name of build descriptors within repository directories
    pub descriptor_filename: String,

    /// Default corpus root (overridden by `scan --path`)
    pub corpus_dir: Option<PathBuf>,

    /// How many directory levels above a descriptor's own directory the
    /// resolver searches for sibling module trees
    pub ancestor_depth: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            descriptor_filename: "descriptor.toml".to_string(),
            corpus_dir: None,
            ancestor_depth: 1,
        }
    }
}

/// Remote descriptor repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Whether the remote fallback tier is consulted at all.
    ///
    /// When disabled, unresolvable coordinates degrade straight to
    /// synthetic placeholder descriptors.
    pub enabled: bool,

    /// Base URL of the remote descriptor repository
    pub base_url: String,

    /// File extension of remote descriptor documents
    pub descriptor_ext: String,

    /// File name of the per-artifact version-metadata document
    pub metadata_filename: String,

    /// Connect timeout per HTTP request, in seconds
    pub connect_timeout_secs: u64,

    /// Overall timeout per HTTP request, in seconds
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://registry.descant.dev/descriptors".to_string(),
            descriptor_ext: "toml".to_string(),
            metadata_filename: "metadata.xml".to_string(),
            connect_timeout_secs: 5,
            timeout_secs: 10,
        }
    }
}

/// Durable cache settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory override (defaults to the platform state dir)
    pub dir: Option<PathBuf>,
}
