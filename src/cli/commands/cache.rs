//! Cache command - manage the durable effective-model cache

use crate::cli::args::{CacheAction, CacheArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{DescantError, DescantResult};
use crate::ui::{self, UiContext};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> DescantResult<()> {
    let cache_root = config
        .cache
        .dir
        .clone()
        .unwrap_or_else(ConfigManager::cache_dir);

    match args.action {
        CacheAction::Info => info(&cache_root),
        CacheAction::Clear { yes } => {
            let ctx = UiContext::detect().with_auto_yes(yes);
            clear(&cache_root, &ctx).await
        }
    }
}

fn info(cache_root: &Path) -> DescantResult<()> {
    if !cache_root.is_dir() {
        println!("No cache at {}", cache_root.display());
        return Ok(());
    }

    let (entries, bytes) = measure(cache_root)?;
    println!("Cache: {}", cache_root.display());
    println!("  {} entries, {} KiB", entries, bytes / 1024);
    Ok(())
}

async fn clear(cache_root: &Path, ctx: &UiContext) -> DescantResult<()> {
    if !cache_root.is_dir() {
        println!("No cache at {}", cache_root.display());
        return Ok(());
    }

    let confirmed = ui::confirm(
        ctx,
        &format!("Delete all cached models under {}?", cache_root.display()),
        false,
    )
    .await?;
    if !confirmed {
        println!("Aborted.");
        return Ok(());
    }

    debug!("Removing {}", cache_root.display());
    std::fs::remove_dir_all(cache_root)
        .map_err(|e| DescantError::io(format!("clearing cache {}", cache_root.display()), e))?;

    ui::step_ok(ctx, "Cache cleared");
    Ok(())
}

/// Count entry files and their total size under the cache root
fn measure(dir: &Path) -> DescantResult<(usize, u64)> {
    let mut entries = 0usize;
    let mut bytes = 0u64;
    let mut pending: Vec<PathBuf> = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let listing = std::fs::read_dir(&current)
            .map_err(|e| DescantError::io(format!("listing {}", current.display()), e))?;
        for entry in listing.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if let Ok(metadata) = entry.metadata() {
                entries += 1;
                bytes += metadata.len();
            }
        }
    }

    Ok((entries, bytes))
}
