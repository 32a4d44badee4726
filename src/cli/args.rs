//! CLI argument definitions using clap derive

use crate::scanner::PathStyle;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Descant - build-descriptor resolver and plugin-usage aggregator
///
/// Scans a corpus of repositories, computes each repository's effective
/// build descriptor, and reports which build plugins each repository uses.
#[derive(Parser, Debug)]
#[command(name = "descant")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DESCANT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .descant.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a repository corpus and report plugin usage
    Scan(ScanArgs),

    /// Manage the durable effective-model cache
    Cache(CacheArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the scan command
#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Path-delimiter convention of the corpus layout
    #[arg(value_enum)]
    pub path_style: PathStyle,

    /// Corpus root directory (defaults to scan.corpus_dir, then cwd)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Report output file
    #[arg(short, long, default_value = "plugins.json")]
    pub output: PathBuf,

    /// Cache directory override
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Skip the remote fallback tier entirely
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show cache location and size
    Info,

    /// Delete all cached effective models
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}
