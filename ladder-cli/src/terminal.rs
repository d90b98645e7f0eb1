// ============================================================================
// ladder-cli/src/terminal.rs
// ============================================================================
//
// TERMINAL OUTPUT: UI Components and Styling
//
// Human-facing output of the CLI: section headers, label/value status lines,
// success and error lines, and the rendition progress bar. Diagnostics go
// through `log`; this module is only for what the user is meant to read.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Display;
use std::time::Duration;

// ============================================================================
// STYLING CONSTANTS
// ============================================================================

pub mod styling {
    pub const SUCCESS_SYMBOL: &str = "✓";
    pub const ERROR_SYMBOL: &str = "✗";
    pub const WARNING_SYMBOL: &str = "!";

    pub const SECTION_PREFIX: &str = "===== ";
    pub const SECTION_SUFFIX: &str = " =====";

    pub const STATUS_INDENT: &str = "  ";
}

use styling::*;

// ============================================================================
// UI COMPONENTS
// ============================================================================

/// Print a section header with vertical spacing
pub fn print_section(title: &str) {
    println!();
    println!(
        "{}",
        style(format!("{SECTION_PREFIX}{title}{SECTION_SUFFIX}")).cyan().bold()
    );
}

/// Print an indented `label: value` line with aligned values
pub fn print_status<T: Display>(label: &str, value: T) {
    println!(
        "{STATUS_INDENT}{:<14} {}",
        style(format!("{label}:")).dim(),
        value
    );
}

pub fn print_success(message: &str) {
    println!("{} {}", style(SUCCESS_SYMBOL).green().bold(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", style(WARNING_SYMBOL).yellow().bold(), style(message).yellow());
}

/// Print an error to stderr
pub fn print_error(message: &str) {
    eprintln!("{} {} {}", style(ERROR_SYMBOL).red().bold(), style("Error:").red().bold(), message);
}

/// Progress bar counting finished renditions. The total is set once known.
pub fn create_progress_bar(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(0);
    let bar_style = ProgressStyle::default_bar()
        .template("{spinner:.green} Renditions [{bar:30.cyan/blue}] {pos}/{len} ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>.");
    pb.set_style(bar_style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
