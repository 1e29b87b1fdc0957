//! # Output Configuration
//!
//! Controls how keyport decorates its human-readable messages.
//!
//! Color and emoji are used only when the terminal supports them and the
//! user has not opted out:
//! - `--color=never|always|auto`
//! - `NO_COLOR` (any value, see https://no-color.org/)
//! - `CLICOLOR=0` / `CLICOLOR_FORCE=1`
//! - `TERM=dumb`
//!
//! Without color, every emoji marker has a bracketed plain-text stand-in
//! such as `[OK]`, so logs and CI output stay greppable.

use crate::import::{ImportReport, Strategy};
use console::style;
use std::env;

/// Output decoration settings for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Resolve the `--color` flag against the environment.
    ///
    /// Unknown values behave like `auto`.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_ascii_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };
        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stdout().features().colors_supported()
    }

    /// Apply this configuration to the `console` crate's global switches,
    /// which also govern the `dialoguer` prompt.
    pub fn apply(self) {
        console::set_colors_enabled(self.use_color);
        console::set_colors_enabled_stderr(self.use_color);
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Pick the emoji or its plain-text alternative.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Success line printed after an import.
pub fn import_summary(config: &OutputConfig, report: &ImportReport) -> String {
    let verb = match report.strategy {
        Strategy::CreateFresh => "Imported into new directory",
        Strategy::MergeInPlace => "Merged into",
        Strategy::ReplaceDestructive => "Replaced contents of",
    };
    let destination = if config.use_color {
        style(&report.destination).bold().to_string()
    } else {
        report.destination.clone()
    };
    format!(
        "{} {} {} ({} keys, {} directories)",
        emoji(config, "✅", "[OK]"),
        verb,
        destination,
        report.stats.leaves,
        report.stats.directories
    )
}

/// Line printed when the operator answers "no".
pub fn import_cancelled(config: &OutputConfig) -> String {
    format!("{} Import cancelled", emoji(config, "⚠️ ", "[WARN]"))
}

/// Line printed after an export written to a file.
pub fn export_written(config: &OutputConfig, directory: &str, file: &std::path::Path) -> String {
    format!(
        "{} Exported {} to {}",
        emoji(config, "📦", "[OK]"),
        directory,
        file.display()
    )
}

/// Header printed above a `tree` listing.
pub fn tree_header(config: &OutputConfig, directory: &str) -> String {
    format!("{} Keys under {}", emoji(config, "🌳", "[TREE]"), directory)
}
