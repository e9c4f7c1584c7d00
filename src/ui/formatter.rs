//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from user interaction.

use std::path::{Path, PathBuf};

use console::style;

use crate::preflight::PreflightIssue;
use crate::process::ToolCommand;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Print a preflight issue as a warning on stderr.
pub fn display_issue(issue: &PreflightIssue) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), issue);
}

/// Print a command line that is about to run, in cyan.
pub fn display_command(command: &ToolCommand) {
    println!("  {}", style(command).cyan());
}

/// Lines listing the artifacts of a release below their directory.
pub fn format_artifacts(dir: &Path, files: &[PathBuf]) -> Vec<String> {
    std::iter::once(format!("Created the following files in {}", dir.display()))
        .chain(files.iter().map(|f| format!("\t{}", f.display())))
        .chain(std::iter::once("Review them".to_string()))
        .collect()
}

/// Show the artifacts created for a release.
pub fn display_artifacts(dir: &Path, files: &[PathBuf]) {
    for line in format_artifacts(dir, files) {
        println!("{}", line);
    }
}
