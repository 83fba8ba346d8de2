//! Change-request body assembly under a hard size ceiling
//!
//! The fullest body is tried first. When it is too long, content is dropped
//! in a fixed order: the execution log, then release descriptions from the
//! oldest release backwards, and finally the text is truncated with a marker.
//! Sizes are counted in characters.

use crate::domain::Release;

/// Appended to a hard-truncated body
pub const TRUNCATION_MARKER: &str = "\n\n---\n_Body truncated._";

/// Characters reserved at the end of a truncated body
const TRUNCATION_HEADROOM: usize = 50;

/// Everything that can go into a body
#[derive(Debug, Clone, Copy)]
pub struct BodyInput<'a> {
    pub title: &'a str,
    pub risk_summary: Option<&'a str>,
    /// Newest first
    pub releases: &'a [Release],
    /// Already-rendered execution log
    pub log: &'a str,
}

/// Build the body, never longer than `size_limit` characters
pub fn assemble(input: &BodyInput<'_>, size_limit: usize) -> String {
    let mut keep: Vec<bool> = input
        .releases
        .iter()
        .map(|release| release.description().is_some())
        .collect();

    if !input.log.trim().is_empty() {
        let full = render(input, true, &keep);
        if fits(&full, size_limit) {
            return full;
        }
    }

    let mut body = render(input, false, &keep);
    if fits(&body, size_limit) {
        return body;
    }

    for index in (0..keep.len()).rev() {
        if !keep[index] {
            continue;
        }
        keep[index] = false;
        body = render(input, false, &keep);
        if fits(&body, size_limit) {
            return body;
        }
    }

    truncate(&body, size_limit)
}

fn fits(text: &str, size_limit: usize) -> bool {
    text.chars().count() <= size_limit
}

fn render(input: &BodyInput<'_>, with_log: bool, keep_description: &[bool]) -> String {
    let mut out = format!("## {}\n", input.title);

    if let Some(summary) = input.risk_summary.map(str::trim).filter(|s| !s.is_empty()) {
        out.push('\n');
        out.push_str(summary);
        out.push('\n');
    }

    if !input.releases.is_empty() {
        out.push_str("\n### Releases\n");
        for (release, keep) in input.releases.iter().zip(keep_description) {
            out.push_str(&format!(
                "\n#### [{}]({}) - {}\n",
                release.title(),
                release.url,
                release.published_at.format("%Y-%m-%d")
            ));
            if let Some(description) = release.description().filter(|_| *keep) {
                out.push('\n');
                out.push_str(description);
                out.push('\n');
            }
        }
    }

    if with_log {
        out.push_str("\n<details>\n<summary>Execution log</summary>\n\n```text\n");
        out.push_str(input.log.trim_end());
        out.push_str("\n```\n\n</details>\n");
    }

    out
}

/// Cut to `size_limit - 50` characters plus the marker. Limits too small
/// to hold the marker get a plain cut.
fn truncate(text: &str, size_limit: usize) -> String {
    let marker_len = TRUNCATION_MARKER.chars().count();
    if size_limit < marker_len {
        return text.chars().take(size_limit).collect();
    }
    let mut out: String = text
        .chars()
        .take(size_limit.saturating_sub(TRUNCATION_HEADROOM))
        .collect();
    out.push_str(TRUNCATION_MARKER);
    out
}
