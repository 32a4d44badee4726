//! Build descriptor parsing
//!
//! Each component is described by a `descriptor.toml` declaring its
//! coordinate, an optional parent, free-form properties, and build plugins.

pub mod coordinate;
pub mod model;

pub use coordinate::{Coordinate, PluginKey, LATEST_VERSION};
pub use model::EffectiveModel;

use crate::error::{DescantError, DescantResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Parsed descriptor document, before inheritance and interpolation
#[derive(Debug, Clone, Deserialize)]
pub struct RawDescriptor {
    /// Component identity
    pub project: ProjectSection,

    /// Free-form property values referenced as `${key}`
    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    /// Build plugin declarations
    #[serde(default)]
    pub build: BuildSection,
}

/// The `[project]` section
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
    /// Group id; may be omitted and inherited from the parent
    #[serde(default)]
    pub group: Option<String>,

    /// Artifact id (always required)
    pub artifact: String,

    /// Version; may be omitted and inherited from the parent
    #[serde(default)]
    pub version: Option<String>,

    /// Package type marker ("lib" when omitted, "parent" for aggregators)
    #[serde(default)]
    pub packaging: Option<String>,

    /// Parent coordinate to inherit from
    #[serde(default)]
    pub parent: Option<ParentRef>,
}

/// The `[project.parent]` sub-table
#[derive(Debug, Clone, Deserialize)]
pub struct ParentRef {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl ParentRef {
    /// The parent's coordinate
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(&self.group, &self.artifact, &self.version)
    }
}

/// The `[build]` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildSection {
    /// Plugins declared for this component
    #[serde(default)]
    pub plugins: Vec<PluginDecl>,

    /// Managed plugin entries applied to the whole inheritance chain
    #[serde(default, rename = "plugin-management")]
    pub plugin_management: Vec<PluginDecl>,
}

/// One `[[build.plugins]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct PluginDecl {
    pub group: String,
    pub artifact: String,

    #[serde(default)]
    pub version: Option<String>,
}

impl PluginDecl {
    /// The `group:artifact` identity the aggregator indexes by
    pub fn key(&self) -> PluginKey {
        PluginKey::new(&self.group, &self.artifact)
    }
}

impl RawDescriptor {
    /// Parse a descriptor from a TOML string.
    ///
    /// `location` is included in error messages (a path or URL).
    pub fn parse(content: &str, location: &str) -> DescantResult<Self> {
        toml::from_str(content).map_err(|e| DescantError::DescriptorInvalid {
            location: location.to_string(),
            reason: e.to_string(),
        })
    }

    /// Parse a descriptor from a file on disk
    pub fn from_file(path: &Path) -> DescantResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DescantError::io(format!("reading descriptor {}", path.display()), e))?;
        Self::parse(&content, &path.display().to_string())
    }
}

/// Build the minimal placeholder document for an unresolvable coordinate.
///
/// Contains exactly the requested coordinate plus a package-type marker, no
/// dependencies or plugins. Pure string construction — must never fail, so
/// the model builder always receives a parseable document.
pub fn synthetic_descriptor(coordinate: &Coordinate) -> String {
    format!(
        "[project]\ngroup = \"{}\"\nartifact = \"{}\"\nversion = \"{}\"\npackaging = \"parent\"\n",
        coordinate.group, coordinate.artifact, coordinate.version
    )
}
