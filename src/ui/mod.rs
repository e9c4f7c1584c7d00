//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Interactive prompts and user input handling

use std::io::{self, BufRead, Write};

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_artifacts, display_command, display_error, display_issue, display_status,
    display_success,
};

/// True for "y" or "yes" in any case, ignoring surrounding whitespace.
pub fn is_affirmative(reply: &str) -> bool {
    let response = reply.trim().to_lowercase();
    response == "y" || response == "yes"
}

/// Prompts user to confirm an action with a yes/no prompt.
///
/// Displays the given prompt and accepts "y" or "yes" (case-insensitive) as confirmation.
/// Default is "no" if user presses Enter or stdin is closed.
///
/// # Arguments
/// * `prompt` - The prompt message to display (without the "(y/N): " suffix)
pub fn confirm_action(prompt: &str) -> io::Result<bool> {
    print!("\n{} (y/N): ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;

    Ok(is_affirmative(&input))
}
