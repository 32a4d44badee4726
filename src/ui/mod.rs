//! Terminal output helpers
//!
//! Interactive detection, step messages, confirmation prompts, and the scan
//! progress bar, each with a plain-text fallback for CI.

use crate::error::{DescantError, DescantResult};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;

/// UI context that determines output behavior
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Whether running in an interactive terminal
    interactive: bool,
    /// Whether --yes flag was passed (auto-approve prompts)
    auto_yes: bool,
}

impl UiContext {
    /// Detect the current environment
    pub fn detect() -> Self {
        Self {
            interactive: detect_interactive(),
            auto_yes: false,
        }
    }

    /// Create a non-interactive context (for testing or explicit CI mode)
    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            auto_yes: false,
        }
    }

    /// Set auto-yes mode (bypass prompts with defaults)
    pub fn with_auto_yes(mut self, yes: bool) -> Self {
        self.auto_yes = yes;
        self
    }

    /// Check if we're in an interactive terminal
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Check if prompts should be auto-approved
    pub fn auto_yes(&self) -> bool {
        self.auto_yes
    }

    /// Check if we should use fancy output (spinners, colors)
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }
}

/// Detect if running in an interactive environment
fn detect_interactive() -> bool {
    if !std::io::stdout().is_terminal() || !std::io::stdin().is_terminal() {
        return false;
    }

    let ci_vars = [
        "CI",
        "GITHUB_ACTIONS",
        "GITLAB_CI",
        "CIRCLECI",
        "TRAVIS",
        "JENKINS_URL",
        "BUILDKITE",
    ];
    ci_vars.iter().all(|var| std::env::var(var).is_err())
}

/// Print a success step message
pub fn step_ok(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        println!("{} {}", style("✓").green(), message);
    } else {
        println!("{} {}", style("[OK]").green(), message);
    }
}

/// Print a success step message with a dimmed detail suffix
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.use_fancy_output() {
        println!("{} {} {}", style("✓").green(), message, style(detail).dim());
    } else {
        println!("{} {} ({})", style("[OK]").green(), message, detail);
    }
}

/// Print a warning step message with a hint
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    if ctx.use_fancy_output() {
        println!("{} {}", style("!").yellow(), message);
        println!("  {}", style(hint).dim());
    } else {
        println!("{} {} ({})", style("[WARN]").yellow(), message, hint);
    }
}

/// Prompt for confirmation, returns default if non-interactive or auto-yes
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> DescantResult<bool> {
    // Auto-yes mode bypasses prompts
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }

    // Non-interactive mode returns default
    if !ctx.is_interactive() {
        return Ok(default);
    }

    // Run blocking cliclack prompt in spawn_blocking
    let message = message.to_string();
    let result = tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| DescantError::User(format!("Prompt task failed: {}", e)))?;

    result.map_err(|e| DescantError::User(format!("Prompt failed: {}", e)))
}

/// Progress across repositories, with per-repository plain output in CI
pub struct ScanProgress {
    bar: Option<ProgressBar>,
    total: u64,
    position: u64,
}

impl ScanProgress {
    /// Create a progress indicator for `total` repositories
    pub fn new(ctx: &UiContext, total: u64) -> Self {
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("  {spinner:.cyan} Scanning  {bar:20.cyan/dim} {pos}/{len} {msg:.dim}  {elapsed:.dim}")
                    .unwrap()
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                    .progress_chars("━╸─"),
            );
            bar.enable_steady_tick(std::time::Duration::from_millis(120));
            Some(bar)
        } else {
            println!("Scanning {} repositories...", total);
            None
        };
        Self {
            bar,
            total,
            position: 0,
        }
    }

    /// Advance to the next repository
    pub fn advance(&mut self, repo_id: &str) {
        self.position += 1;
        if let Some(ref bar) = self.bar {
            bar.set_message(repo_id.to_string());
            bar.inc(1);
        } else {
            println!("  {}/{} {}", self.position, self.total, repo_id);
        }
    }

    /// Clear the progress display
    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
