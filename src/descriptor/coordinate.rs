//! Descriptor coordinates and plugin keys

use crate::error::{DescantError, DescantResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel version substituted for placeholder version tokens.
///
/// The resolver has no access to the owning descriptor's interpolated
/// properties at lookup time, so `${...}` versions are approximated by the
/// latest published version.
pub const LATEST_VERSION: &str = "LATEST";

/// The `(group, artifact, version)` triple identifying a descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl Coordinate {
    /// Create a new coordinate
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        }
    }

    /// Normalize a placeholder version (`${...}`) to the `LATEST` sentinel
    pub fn normalized(&self) -> Self {
        if self.version.contains("${") {
            Self {
                group: self.group.clone(),
                artifact: self.artifact.clone(),
                version: LATEST_VERSION.to_string(),
            }
        } else {
            self.clone()
        }
    }

    /// Reject coordinates that cannot map to a filesystem or URL path.
    ///
    /// Components must be non-empty and restricted to alphanumerics, dots,
    /// hyphens, and underscores, and must not form a traversal segment.
    pub fn validate(&self) -> DescantResult<()> {
        self.check_component("group", &self.group)?;
        self.check_component("artifact", &self.artifact)?;
        self.check_component("version", &self.version)?;
        Ok(())
    }

    fn check_component(&self, field: &str, value: &str) -> DescantResult<()> {
        if value.trim().is_empty() {
            return Err(DescantError::unresolvable(
                self,
                format!("empty {}", field),
            ));
        }
        if value == ".." {
            return Err(DescantError::unresolvable(
                self,
                format!("{} is a traversal segment", field),
            ));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
        {
            return Err(DescantError::unresolvable(
                self,
                format!("{} contains unsupported characters: '{}'", field, value),
            ));
        }
        Ok(())
    }

    /// The group id with dots mapped to path separators
    pub fn group_path(&self) -> String {
        self.group.replace('.', "/")
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

/// A build plugin identity, the unit the aggregator indexes by
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PluginKey {
    pub group: String,
    pub artifact: String,
}

impl PluginKey {
    /// Create a new plugin key
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
        }
    }
}

impl fmt::Display for PluginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_display() {
        let c = Coordinate::new("org.example", "widget", "1.2.0");
        assert_eq!(c.to_string(), "org.example:widget:1.2.0");
    }

    #[test]
    fn placeholder_version_normalizes_to_latest() {
        let c = Coordinate::new("g", "a", "${revision}");
        assert_eq!(c.normalized().version, LATEST_VERSION);
    }

    #[test]
    fn concrete_version_unchanged_by_normalize() {
        let c = Coordinate::new("g", "a", "2.5");
        assert_eq!(c.normalized(), c);
    }

    #[test]
    fn validate_accepts_typical_coordinates() {
        assert!(Coordinate::new("org.example.core", "widget-api", "1.0-M2").validate().is_ok());
        assert!(Coordinate::new("io.x", "a_b", LATEST_VERSION).validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_components() {
        assert!(Coordinate::new("", "a", "1").validate().is_err());
        assert!(Coordinate::new("g", "  ", "1").validate().is_err());
        assert!(Coordinate::new("g", "a", "").validate().is_err());
    }

    #[test]
    fn validate_rejects_path_characters() {
        assert!(Coordinate::new("g", "a/b", "1").validate().is_err());
        assert!(Coordinate::new("g", "a", "1\\2").validate().is_err());
        assert!(Coordinate::new("g", "..", "1").validate().is_err());
    }

    #[test]
    fn validate_rejects_unresolved_placeholder_group() {
        assert!(Coordinate::new("${group}", "a", "1").validate().is_err());
    }

    #[test]
    fn group_path_maps_dots() {
        let c = Coordinate::new("org.example.core", "widget", "1.0");
        assert_eq!(c.group_path(), "org/example/core");
    }

    #[test]
    fn plugin_key_display_and_order() {
        let a = PluginKey::new("org.x", "plugin-a");
        let b = PluginKey::new("org.x", "plugin-b");
        assert_eq!(a.to_string(), "org.x:plugin-a");
        assert!(a < b);
    }
}
