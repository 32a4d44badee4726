//! Error types for Descant
//!
//! All modules use `DescantResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Descant operations
pub type DescantResult<T> = Result<T, DescantError>;

/// All errors that can occur in Descant
#[derive(Error, Debug)]
pub enum DescantError {
    // Coordinate errors
    #[error("Unresolvable coordinate {coordinate}: {reason}")]
    UnresolvableCoordinate { coordinate: String, reason: String },

    // Descriptor errors
    #[error("Invalid descriptor at {location}: {reason}")]
    DescriptorInvalid { location: String, reason: String },

    // Model builder errors
    #[error("Effective model build failed for {path}: {reason}")]
    ModelBuild { path: PathBuf, reason: String },

    #[error("Parent chain exceeds maximum depth of {max} at {coordinate}")]
    ParentChainTooDeep { coordinate: String, max: usize },

    // Remote repository errors
    #[error("Remote fetch failed for {url}: {reason}")]
    RemoteFetch { url: String, reason: String },

    #[error("No latest version published for {coordinate}")]
    NoLatestVersion { coordinate: String },

    // Cache errors
    #[error("Failed to write cache entry {path}: {source}")]
    CacheEntryWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Scan errors
    #[error("Corpus directory not found: {0}")]
    CorpusNotFound(PathBuf),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create directory {path}: {source}")]
    DirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl DescantError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an unresolvable-coordinate error
    pub fn unresolvable(coordinate: impl ToString, reason: impl Into<String>) -> Self {
        Self::UnresolvableCoordinate {
            coordinate: coordinate.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a remote fetch error
    pub fn remote(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RemoteFetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Whether the resolver is allowed to degrade past this error.
    ///
    /// Remote failures fall through to the latest-version retry and then the
    /// synthetic placeholder; malformed coordinates never do.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            Self::RemoteFetch { .. } | Self::NoLatestVersion { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CorpusNotFound(_) => {
                Some("Pass the corpus root with --path or set scan.corpus_dir")
            }
            Self::ConfigInvalid { .. } => Some("Run: descant config show"),
            _ => None,
        }
    }
}
