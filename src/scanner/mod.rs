//! Repository tree scanning
//!
//! Walks each repository depth-first, obtaining effective models through
//! the cache and feeding them to the aggregator. A failing subtree is
//! logged and never aborts its siblings.

use crate::aggregate::PluginAggregator;
use crate::cache::EffectiveModelCache;
use crate::error::{DescantError, DescantResult};
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Path-delimiter convention of the corpus layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PathStyle {
    /// Forward-slash delimited paths
    Linux,
    /// Backslash delimited paths
    Windows,
}

impl PathStyle {
    fn delimiter(self) -> char {
        match self {
            Self::Linux => '/',
            Self::Windows => '\\',
        }
    }
}

/// Derive a repository identifier from the last two path segments.
///
/// The corpus layout is `<base>/<org>/<repo>`, so the identifier is
/// `org/repo` regardless of the delimiter convention.
pub fn repository_id(path: &Path, style: PathStyle) -> String {
    let raw = path.display().to_string();
    let segments: Vec<&str> = raw
        .split(style.delimiter())
        .filter(|s| !s.is_empty())
        .collect();

    match segments.as_slice() {
        [.., org, repo] => format!("{}/{}", org, repo),
        [only] => (*only).to_string(),
        [] => raw.clone(),
    }
}

/// Enumerate the corpus's two-level `<org>/<repo>` layout
pub fn discover_repositories(
    base: &Path,
    style: PathStyle,
) -> DescantResult<Vec<(String, PathBuf)>> {
    if !base.is_dir() {
        return Err(DescantError::CorpusNotFound(base.to_path_buf()));
    }

    let mut repositories = Vec::new();
    for org_dir in subdirectories(base)? {
        for repo_dir in subdirectories(&org_dir)? {
            repositories.push((repository_id(&repo_dir, style), repo_dir));
        }
    }
    Ok(repositories)
}

fn subdirectories(dir: &Path) -> DescantResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| DescantError::io(format!("listing {}", dir.display()), e))?;

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            path.is_dir().then_some(path)
        })
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// Scans repository trees through the effective-model cache
pub struct RepositoryScanner<'a> {
    cache: &'a EffectiveModelCache,
    descriptor_filename: String,
}

impl<'a> RepositoryScanner<'a> {
    /// Create a scanner over the given cache
    pub fn new(cache: &'a EffectiveModelCache, descriptor_filename: impl Into<String>) -> Self {
        Self {
            cache,
            descriptor_filename: descriptor_filename.into(),
        }
    }

    /// Scan one repository tree.
    ///
    /// Returns true iff at least one descriptor resolved anywhere under
    /// `root`. Every resolved model is recorded with the aggregator under
    /// `repo_id`.
    pub fn scan(&self, root: &Path, repo_id: &str, aggregator: &mut PluginAggregator) -> bool {
        self.visit(root, repo_id, aggregator)
    }

    fn visit(&self, dir: &Path, repo_id: &str, aggregator: &mut PluginAggregator) -> bool {
        let mut found = false;

        let descriptor_path = dir.join(&self.descriptor_filename);
        match self.cache.effective_model(&descriptor_path) {
            Ok(Some(model)) => {
                debug!(
                    "{}: {} declares {} plugin(s)",
                    repo_id,
                    model.coordinate(),
                    model.distinct_plugins().len()
                );
                aggregator.record(repo_id, &model);
                found = true;
            }
            Ok(None) => {}
            Err(err) => {
                warn!("Skipping descriptor {}: {}", descriptor_path.display(), err);
            }
        }

        let subdirs = match subdirectories(dir) {
            Ok(subdirs) => subdirs,
            Err(err) => {
                warn!("Skipping subtree {}: {}", dir.display(), err);
                return found;
            }
        };

        for subdir in subdirs {
            // Each subtree's success is independent of its siblings'
            found = self.visit(&subdir, repo_id, aggregator) || found;
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DescriptorModelBuilder;
    use crate::resolver::ResolverSettings;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn offline_settings() -> ResolverSettings {
        ResolverSettings {
            descriptor_filename: "descriptor.toml".to_string(),
            ancestor_depth: 1,
            remote: None,
        }
    }

    fn cache_for(temp: &TempDir) -> EffectiveModelCache {
        EffectiveModelCache::new(
            temp.path().join("cache"),
            temp.path().join("corpus"),
            offline_settings(),
            BTreeMap::new(),
            Box::new(DescriptorModelBuilder),
        )
    }

    fn write_descriptor(dir: &Path, artifact: &str, plugin: Option<&str>) {
        std::fs::create_dir_all(dir).unwrap();
        let mut content = format!(
            "[project]\ngroup = \"org.example\"\nartifact = \"{}\"\nversion = \"1.0\"\n",
            artifact
        );
        if let Some(plugin) = plugin {
            content.push_str(&format!(
                "\n[[build.plugins]]\ngroup = \"org.x\"\nartifact = \"{}\"\n",
                plugin
            ));
        }
        std::fs::write(dir.join("descriptor.toml"), content).unwrap();
    }

    #[test]
    fn repository_id_linux_style() {
        let path = Path::new("/corpus/acme/widget");
        assert_eq!(repository_id(path, PathStyle::Linux), "acme/widget");
    }

    #[test]
    fn repository_id_windows_style() {
        let path = Path::new("C:\\corpus\\acme\\widget");
        assert_eq!(repository_id(path, PathStyle::Windows), "acme/widget");
    }

    #[test]
    fn repository_id_short_path() {
        assert_eq!(repository_id(Path::new("widget"), PathStyle::Linux), "widget");
    }

    #[test]
    fn scan_finds_nested_descriptors() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("corpus").join("acme").join("widget");
        write_descriptor(&repo, "widget", Some("plugin-root"));
        write_descriptor(&repo.join("modules").join("api"), "widget-api", Some("plugin-api"));

        let cache = cache_for(&temp);
        let scanner = RepositoryScanner::new(&cache, "descriptor.toml");
        let mut aggregator = PluginAggregator::new();

        let found = scanner.scan(&repo, "acme/widget", &mut aggregator);
        assert!(found);

        let report = aggregator.finalize();
        let plugins = &report.plugins_per_repo["acme/widget"];
        assert!(plugins.contains(&"org.x:plugin-root".to_string()));
        assert!(plugins.contains(&"org.x:plugin-api".to_string()));
    }

    #[test]
    fn scan_without_descriptors_returns_false() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("corpus").join("acme").join("empty");
        std::fs::create_dir_all(repo.join("src").join("deep")).unwrap();

        let cache = cache_for(&temp);
        let scanner = RepositoryScanner::new(&cache, "descriptor.toml");
        let mut aggregator = PluginAggregator::new();

        assert!(!scanner.scan(&repo, "acme/empty", &mut aggregator));
    }

    #[test]
    fn broken_descriptor_does_not_abort_siblings() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("corpus").join("acme").join("mixed");

        let broken_dir = repo.join("broken");
        std::fs::create_dir_all(&broken_dir).unwrap();
        std::fs::write(broken_dir.join("descriptor.toml"), "not toml {{{").unwrap();

        write_descriptor(&repo.join("healthy"), "healthy", Some("plugin-a"));

        let cache = cache_for(&temp);
        let scanner = RepositoryScanner::new(&cache, "descriptor.toml");
        let mut aggregator = PluginAggregator::new();

        // The broken sibling is tombstoned; the healthy one still counts
        assert!(scanner.scan(&repo, "acme/mixed", &mut aggregator));
        let report = aggregator.finalize();
        assert_eq!(
            report.plugins_per_repo["acme/mixed"],
            vec!["org.x:plugin-a".to_string()]
        );
    }

    #[test]
    fn discover_two_level_layout() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("corpus");
        std::fs::create_dir_all(base.join("acme").join("widget")).unwrap();
        std::fs::create_dir_all(base.join("acme").join("gadget")).unwrap();
        std::fs::create_dir_all(base.join("zeta").join("tool")).unwrap();
        // Loose files at either level are ignored
        std::fs::write(base.join("README"), "").unwrap();

        let repos = discover_repositories(&base, PathStyle::Linux).unwrap();
        let ids: Vec<&str> = repos.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["acme/gadget", "acme/widget", "zeta/tool"]);
    }

    #[test]
    fn discover_missing_base_errors() {
        let temp = TempDir::new().unwrap();
        let err = discover_repositories(&temp.path().join("absent"), PathStyle::Linux).unwrap_err();
        assert!(matches!(err, DescantError::CorpusNotFound(_)));
    }
}
