//! Integration tests for Descant

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn descant() -> Command {
        cargo_bin_cmd!("descant")
    }

    /// A command isolated from the user's real configuration
    fn descant_in(dir: &Path) -> Command {
        let mut cmd = descant();
        cmd.current_dir(dir)
            .args(["--no-local", "--config"])
            .arg(dir.join("config.toml"));
        cmd
    }

    fn write_descriptor(dir: &Path, group: &str, artifact: &str, plugin: Option<(&str, &str)>) {
        std::fs::create_dir_all(dir).unwrap();
        let mut content = format!(
            "[project]\ngroup = \"{}\"\nartifact = \"{}\"\nversion = \"1.0\"\n",
            group, artifact
        );
        if let Some((plugin_group, plugin_artifact)) = plugin {
            content.push_str(&format!(
                "\n[[build.plugins]]\ngroup = \"{}\"\nartifact = \"{}\"\n",
                plugin_group, plugin_artifact
            ));
        }
        std::fs::write(dir.join("descriptor.toml"), content).unwrap();
    }

    #[test]
    fn help_displays() {
        descant()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("plugin-usage aggregator"));
    }

    #[test]
    fn version_displays() {
        descant()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("descant"));
    }

    #[test]
    fn scan_requires_path_style() {
        descant()
            .arg("scan")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Usage"));
    }

    #[test]
    fn scan_rejects_unknown_path_style() {
        descant()
            .args(["scan", "macos"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid value"));
    }

    #[test]
    fn scan_missing_corpus_fails_with_hint() {
        let temp = TempDir::new().unwrap();
        descant_in(temp.path())
            .args(["scan", "linux", "--offline", "--path", "does-not-exist"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Corpus directory not found"));
    }

    #[test]
    fn scan_reports_plugins_and_empty_repositories() {
        let temp = TempDir::new().unwrap();
        let corpus = temp.path().join("corpus");

        // Repository with a descriptor declaring one plugin
        write_descriptor(
            &corpus.join("acme").join("alpha"),
            "org.example",
            "alpha",
            Some(("org.x", "plugin-a")),
        );
        // Repository with no descriptor anywhere in its tree
        std::fs::create_dir_all(corpus.join("acme").join("beta").join("src")).unwrap();

        descant_in(temp.path())
            .args(["scan", "linux", "--offline"])
            .args(["--path", "corpus", "--cache-dir", "cache", "--output", "plugins.json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("org.x:plugin-a [1/2]"));

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(temp.path().join("plugins.json")).unwrap())
                .unwrap();
        assert_eq!(report["acme/alpha"], serde_json::json!(["org.x:plugin-a"]));
        assert_eq!(report["acme/beta"], serde_json::json!([]));
    }

    #[test]
    fn scan_aggregates_across_repositories() {
        let temp = TempDir::new().unwrap();
        let corpus = temp.path().join("corpus");
        write_descriptor(
            &corpus.join("acme").join("alpha"),
            "org.example",
            "alpha",
            Some(("org.x", "shared")),
        );
        write_descriptor(
            &corpus.join("zeta").join("gamma"),
            "org.example",
            "gamma",
            Some(("org.x", "shared")),
        );

        descant_in(temp.path())
            .args(["scan", "linux", "--offline"])
            .args(["--path", "corpus", "--cache-dir", "cache"])
            .assert()
            .success()
            .stdout(predicate::str::contains("org.x:shared [2/2]"));
    }

    #[test]
    fn second_scan_reuses_cache() {
        let temp = TempDir::new().unwrap();
        let corpus = temp.path().join("corpus");
        write_descriptor(
            &corpus.join("acme").join("alpha"),
            "org.example",
            "alpha",
            Some(("org.x", "plugin-a")),
        );

        let run = |out: &str| {
            descant_in(temp.path())
                .args(["scan", "linux", "--offline"])
                .args(["--path", "corpus", "--cache-dir", "cache", "--output", out])
                .assert()
                .success();
        };
        run("first.json");

        // Entry mirrors the descriptor's relative path under the cache root
        let entry = temp
            .path()
            .join("cache")
            .join("acme")
            .join("alpha")
            .join("descriptor.json");
        assert!(entry.is_file());

        run("second.json");
        let first = std::fs::read_to_string(temp.path().join("first.json")).unwrap();
        let second = std::fs::read_to_string(temp.path().join("second.json")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn cache_info_reports_missing_cache() {
        let temp = TempDir::new().unwrap();
        descant_in(temp.path())
            .args(["cache", "info"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cache at").or(predicate::str::contains("entries")));
    }

    #[test]
    fn config_path_displays() {
        let temp = TempDir::new().unwrap();
        descant_in(temp.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_displays_defaults() {
        let temp = TempDir::new().unwrap();
        descant_in(temp.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[scan]"))
            .stdout(predicate::str::contains("descriptor.toml"));
    }

    #[test]
    fn local_config_overrides_descriptor_filename() {
        let temp = TempDir::new().unwrap();
        let corpus = temp.path().join("corpus");
        let repo = corpus.join("acme").join("alpha");
        std::fs::create_dir_all(&repo).unwrap();
        // Descriptor under a non-default file name, selected via .descant.toml
        std::fs::write(
            repo.join("build-meta.toml"),
            "[project]\ngroup = \"g\"\nartifact = \"alpha\"\nversion = \"1\"\n\n[[build.plugins]]\ngroup = \"org.x\"\nartifact = \"plugin-a\"\n",
        )
        .unwrap();
        std::fs::write(
            temp.path().join(".descant.toml"),
            "[scan]\ndescriptor_filename = \"build-meta.toml\"\n",
        )
        .unwrap();

        descant()
            .current_dir(temp.path())
            .args(["--config"])
            .arg(temp.path().join("config.toml"))
            .args(["scan", "linux", "--offline", "--path", "corpus", "--cache-dir", "cache"])
            .assert()
            .success()
            .stdout(predicate::str::contains("org.x:plugin-a [1/1]"));
    }
}
