//! Scan command - resolve descriptors across a corpus and report plugin usage

use crate::aggregate::{PluginAggregator, PluginReport};
use crate::builder::DescriptorModelBuilder;
use crate::cache::EffectiveModelCache;
use crate::cli::args::ScanArgs;
use crate::config::{Config, ConfigManager};
use crate::error::{DescantError, DescantResult};
use crate::resolver::ResolverSettings;
use crate::scanner::{discover_repositories, RepositoryScanner};
use crate::ui::{self, ScanProgress, UiContext};
use std::path::PathBuf;
use tracing::info;

/// Execute the scan command
pub async fn execute(args: ScanArgs, config: &Config) -> DescantResult<()> {
    let ctx = UiContext::detect();

    let base: PathBuf = args
        .path
        .clone()
        .or_else(|| config.scan.corpus_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    if !base.is_dir() {
        return Err(DescantError::CorpusNotFound(base));
    }

    let cache_root = args
        .cache_dir
        .clone()
        .or_else(|| config.cache.dir.clone())
        .unwrap_or_else(ConfigManager::cache_dir);
    std::fs::create_dir_all(&cache_root).map_err(|e| DescantError::DirCreate {
        path: cache_root.clone(),
        source: e,
    })?;

    let cache = EffectiveModelCache::new(
        &cache_root,
        &base,
        ResolverSettings::from_config(config, args.offline),
        config.properties.clone(),
        Box::new(DescriptorModelBuilder),
    );
    let scanner = RepositoryScanner::new(&cache, &config.scan.descriptor_filename);

    let repositories = discover_repositories(&base, args.path_style)?;
    info!(
        "Scanning {} repositories under {}",
        repositories.len(),
        base.display()
    );

    let mut aggregator = PluginAggregator::new();
    let mut progress = ScanProgress::new(&ctx, repositories.len() as u64);
    let mut with_descriptors = 0usize;

    for (repo_id, repo_dir) in &repositories {
        progress.advance(repo_id);
        aggregator.register_repository(repo_id.clone());
        if scanner.scan(repo_dir, repo_id, &mut aggregator) {
            with_descriptors += 1;
        }
    }
    progress.finish();

    let total = repositories.len();
    let report = aggregator.finalize();
    print_ranking(&report);
    report.write_to(&args.output)?;

    ui::step_ok_detail(
        &ctx,
        &format!(
            "Scanned {} repositories, {} with descriptors, {} distinct plugins",
            total,
            with_descriptors,
            report.ranking.len()
        ),
        &args.output.display().to_string(),
    );

    Ok(())
}

fn print_ranking(report: &PluginReport) {
    if report.ranking.is_empty() {
        return;
    }
    println!("\nPlugins:");
    for usage in &report.ranking {
        println!(
            "  {} [{}/{}]",
            usage.plugin, usage.repositories, report.repositories_scanned
        );
    }
}
