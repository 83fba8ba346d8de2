//! Terminal output for the CLI
//!
//! [`formatter`] renders plans, warnings and mutation records. This module
//! owns the one interactive step: confirming a plan before it is applied.

use std::io::{self, Write};

use anyhow::Result;

pub mod formatter;

pub use formatter::{
    display_error, display_mutation, display_planned_targets, display_proposed_update,
    display_release_window, display_status, display_success, display_warning,
};

/// Ask before touching any file. Anything but `y`/`yes` declines, so a
/// closed stdin never applies a plan.
pub fn confirm_action(prompt: &str) -> Result<bool> {
    let mut stdout = io::stdout();
    write!(stdout, "\n{} [y/N] ", prompt)?;
    stdout.flush()?;

    let mut answer = String::new();
    if io::stdin().read_line(&mut answer)? == 0 {
        return Ok(false);
    }
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
