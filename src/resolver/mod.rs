//! Descriptor resolution
//!
//! Locates the descriptor document for a coordinate by searching:
//! 1. Local: `<base_dir>/<group-path>/<artifact>/<version>/<filename>`
//! 2. Ancestor: the same layout up to `ancestor_depth` levels above
//! 3. Remote: HTTP fetch with latest-version retry and synthetic fallback
//!
//! The base directory is the directory owning the *requesting* descriptor,
//! so a fresh resolver is constructed per model build.

pub mod remote;

pub use remote::RemoteRepository;

use crate::config::Config;
use crate::descriptor::{synthetic_descriptor, Coordinate};
use crate::error::{DescantError, DescantResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Resolver settings shared by every per-descriptor resolver instance
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    /// File name of descriptors within the corpus layout
    pub descriptor_filename: String,

    /// How many directory levels above the base to search
    pub ancestor_depth: usize,

    /// Remote fallback tier; `None` degrades straight to placeholders
    pub remote: Option<RemoteRepository>,
}

impl ResolverSettings {
    /// Derive settings from configuration; `offline` forces the remote
    /// tier off regardless of configuration.
    pub fn from_config(config: &Config, offline: bool) -> Self {
        let remote = (config.remote.enabled && !offline)
            .then(|| RemoteRepository::new(&config.remote));
        Self {
            descriptor_filename: config.scan.descriptor_filename.clone(),
            ancestor_depth: config.scan.ancestor_depth,
            remote,
        }
    }
}

/// Resolves coordinates to descriptor sources, scoped to one base directory
#[derive(Debug)]
pub struct DescriptorResolver {
    base_dir: PathBuf,
    settings: ResolverSettings,
}

impl DescriptorResolver {
    /// Create a resolver rooted at `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>, settings: ResolverSettings) -> Self {
        Self {
            base_dir: base_dir.into(),
            settings,
        }
    }

    /// Resolve a coordinate to a readable descriptor source.
    ///
    /// Placeholder versions are normalized to the `LATEST` sentinel before
    /// any tier is consulted. The only hard failure is a malformed
    /// coordinate; missing descriptors degrade tier by tier down to the
    /// synthetic placeholder.
    pub fn resolve(&self, coordinate: &Coordinate) -> DescantResult<DescriptorSource> {
        let coordinate = coordinate.normalized();
        coordinate.validate()?;

        // 1. Local: relative to the requesting descriptor's own directory
        if let Some(path) = self.find_in(&self.base_dir, &coordinate) {
            info!("Found local descriptor: {}", path.display());
            return Ok(DescriptorSource::Local(path));
        }

        // 2. Ancestors: sibling module trees one or more levels up
        let mut dir = self.base_dir.as_path();
        for level in 1..=self.settings.ancestor_depth {
            let Some(parent) = dir.parent() else { break };
            dir = parent;
            if let Some(path) = self.find_in(dir, &coordinate) {
                info!(
                    "Found descriptor {} level(s) up: {}",
                    level,
                    path.display()
                );
                return Ok(DescriptorSource::Local(path));
            }
        }

        // 3. Remote, or a placeholder when the remote tier is disabled
        match &self.settings.remote {
            Some(repository) => Ok(DescriptorSource::Remote {
                coordinate,
                repository: repository.clone(),
            }),
            None => {
                debug!("Remote tier disabled, synthesizing {}", coordinate);
                let content = synthetic_descriptor(&coordinate);
                Ok(DescriptorSource::Synthetic { coordinate, content })
            }
        }
    }

    /// The directory this resolver searches first
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn find_in(&self, root: &Path, coordinate: &Coordinate) -> Option<PathBuf> {
        let path = root
            .join(coordinate.group_path())
            .join(&coordinate.artifact)
            .join(&coordinate.version)
            .join(&self.settings.descriptor_filename);
        path.is_file().then_some(path)
    }
}

/// A lazily-readable descriptor document
///
/// Reads are idempotent; the model builder may request the content more
/// than once. Remote sources re-fetch on every read.
#[derive(Debug)]
pub enum DescriptorSource {
    /// A descriptor file already on disk
    Local(PathBuf),

    /// A descriptor served by the remote repository, fetched at read time
    Remote {
        coordinate: Coordinate,
        repository: RemoteRepository,
    },

    /// A synthesized minimal placeholder
    Synthetic {
        coordinate: Coordinate,
        content: String,
    },
}

impl DescriptorSource {
    /// Read the descriptor content
    pub fn read(&self) -> DescantResult<String> {
        match self {
            Self::Local(path) => std::fs::read_to_string(path)
                .map_err(|e| DescantError::io(format!("reading descriptor {}", path.display()), e)),
            Self::Remote {
                coordinate,
                repository,
            } => Ok(repository.fetch_or_placeholder(coordinate)),
            Self::Synthetic { content, .. } => Ok(content.clone()),
        }
    }

    /// Human-readable location for traces and error messages
    pub fn location(&self) -> String {
        match self {
            Self::Local(path) => path.display().to_string(),
            Self::Remote {
                coordinate,
                repository,
            } => repository.descriptor_url(coordinate),
            Self::Synthetic { coordinate, .. } => format!("synthetic:{}", coordinate),
        }
    }
}
