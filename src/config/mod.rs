//! Configuration management for Descant

pub mod schema;

pub use schema::Config;

use crate::error::{DescantError, DescantResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// File name of project-local configuration overlays
pub const LOCAL_CONFIG_FILENAME: &str = ".descant.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// The config file path this manager reads and writes
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("descant")
            .join("config.toml")
    }

    /// Get the state directory path
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("descant")
    }

    /// Get the durable effective-model cache directory path
    pub fn cache_dir() -> PathBuf {
        Self::state_dir().join("effective-models")
    }

    /// Load configuration, creating default if not exists
    pub async fn load(&self) -> DescantResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> DescantResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| DescantError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| DescantError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load configuration with an optional project-local overlay merged on top
    pub async fn load_merged(&self, local_path: Option<&Path>) -> DescantResult<Config> {
        let Some(local_path) = local_path else {
            return self.load().await;
        };

        let mut base = if self.config_path.exists() {
            self.read_value(&self.config_path).await?
        } else {
            toml::Value::Table(toml::map::Map::new())
        };
        let overlay = self.read_value(local_path).await?;

        merge_values(&mut base, overlay);

        base.try_into().map_err(|e: toml::de::Error| DescantError::ConfigInvalid {
            path: local_path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    async fn read_value(&self, path: &Path) -> DescantResult<toml::Value> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| DescantError::io(format!("reading config from {}", path.display()), e))?;
        content.parse().map_err(|e: toml::de::Error| DescantError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> DescantResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            DescantError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> DescantResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DescantError::DirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Find a project-local `.descant.toml`, walking up from `start`
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        let mut dir = Some(start);
        while let Some(current) = dir {
            let candidate = current.join(LOCAL_CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            dir = current.parent();
        }
        None
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge `overlay` into `base`, table-by-table; overlay scalars win
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base_slot, overlay_value) => *base_slot = overlay_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("config.toml"));
        let config = manager.load().await.unwrap();
        assert_eq!(config.scan.descriptor_filename, "descriptor.toml");
    }

    #[tokio::test]
    async fn save_and_reload() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("nested").join("config.toml"));

        let mut config = Config::default();
        config.scan.ancestor_depth = 3;
        manager.save(&config).await.unwrap();

        let loaded = manager.load().await.unwrap();
        assert_eq!(loaded.scan.ancestor_depth, 3);
    }

    #[tokio::test]
    async fn invalid_toml_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "scan = 12").unwrap();

        let manager = ConfigManager::with_path(path);
        assert!(manager.load().await.is_err());
    }

    #[tokio::test]
    async fn local_overlay_wins_per_key() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("config.toml");
        std::fs::write(
            &global,
            "[scan]\nancestor_depth = 2\ndescriptor_filename = \"build.toml\"\n",
        )
        .unwrap();

        let local = temp.path().join(LOCAL_CONFIG_FILENAME);
        std::fs::write(&local, "[scan]\nancestor_depth = 5\n").unwrap();

        let manager = ConfigManager::with_path(global);
        let merged = manager.load_merged(Some(&local)).await.unwrap();

        assert_eq!(merged.scan.ancestor_depth, 5);
        assert_eq!(merged.scan.descriptor_filename, "build.toml");
    }

    #[tokio::test]
    async fn local_overlay_without_global() {
        let temp = TempDir::new().unwrap();
        let local = temp.path().join(LOCAL_CONFIG_FILENAME);
        std::fs::write(&local, "[remote]\nenabled = false\n").unwrap();

        let manager = ConfigManager::with_path(temp.path().join("missing.toml"));
        let merged = manager.load_merged(Some(&local)).await.unwrap();

        assert!(!merged.remote.enabled);
        assert_eq!(merged.scan.ancestor_depth, 1);
    }

    #[test]
    fn find_local_config_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp.path().join(LOCAL_CONFIG_FILENAME), "").unwrap();

        let found = ConfigManager::find_local_config(&nested).unwrap();
        assert_eq!(found, temp.path().join(LOCAL_CONFIG_FILENAME));
    }

    #[test]
    fn find_local_config_none() {
        let temp = TempDir::new().unwrap();
        // Search from a directory tree that contains no overlay file
        let nested = temp.path().join("only");
        std::fs::create_dir_all(&nested).unwrap();
        assert!(ConfigManager::find_local_config(&nested)
            .map(|p| !p.starts_with(temp.path()))
            .unwrap_or(true));
    }
}
