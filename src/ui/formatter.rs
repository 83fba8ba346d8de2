//! Styled terminal output. Warnings and errors go to stderr, everything
//! else to stdout.

use console::style;

use crate::audit::MutationRecord;
use crate::document::ReplaceStrategy;
use crate::domain::Release;
use crate::warning::UpdateWarning;

pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Progress line for steps that are neither a success nor a problem.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display an update warning to the user.
pub fn display_warning(warning: &UpdateWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Display the releases selected for this update.
///
/// Shows up to 10 releases, newest first, with a count of the rest.
pub fn display_release_window(releases: &[Release], app: &str) {
    println!("\n{}", style(format!("New releases of '{}'", app)).bold());

    for (i, release) in releases.iter().take(10).enumerate() {
        let marker = if release.is_prerelease() { " (prerelease)" } else { "" };
        println!(
            "  {}. {} {}{}",
            i + 1,
            release.tag,
            style(release.published_at.format("%Y-%m-%d")).dim(),
            marker
        );
    }

    if releases.len() > 10 {
        println!("  ... and {} more releases", releases.len() - 10);
    }
}

/// Display the proposed version change.
pub fn display_proposed_update(old_version: &str, new_version: &str) {
    println!("\n{}", style("Proposed Update:").bold());
    println!("  From: {}", style(old_version).red());
    println!("  To:   {}", style(new_version).green());
}

/// Display one applied (or previewed) value change.
pub fn display_mutation(record: &MutationRecord) {
    let icon = match record.strategy {
        ReplaceStrategy::Exact => style("✓").green(),
        ReplaceStrategy::Drift => style("!").yellow(),
        ReplaceStrategy::Unchanged => style("=").dim(),
    };
    println!("  {} {}", icon, record);
}

/// Display the planned edits before they are applied.
pub fn display_planned_targets(lines: &[String]) {
    println!("\n{}", style("Files to update:").bold());
    for line in lines {
        println!("  - {}", line);
    }
}
