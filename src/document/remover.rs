use super::line::is_blank;
use super::locator::find_block;
use super::Document;
use crate::error::Result;

/// Result of a block removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Lines `start_line..start_line + line_count` were deleted (0-based)
    Removed { start_line: usize, line_count: usize },
    /// No list item matched; the document is unchanged
    NotFound,
}

impl RemovalOutcome {
    pub fn is_removed(&self) -> bool {
        matches!(self, RemovalOutcome::Removed { .. })
    }
}

/// Delete the list item whose `field` equals `value`.
///
/// The item runs from its `- ` marker line through its deeper-indented
/// lines. A run of three or more blank lines left at the deletion point is
/// collapsed to one; all other lines keep their exact bytes.
pub fn remove_block(doc: &Document, field: &str, value: &str) -> Result<(Document, RemovalOutcome)> {
    let Some(block) = find_block(doc, field, value)? else {
        return Ok((doc.clone(), RemovalOutcome::NotFound));
    };

    let mut updated = doc.clone();
    updated.remove_range(block.start, block.end);
    collapse_blank_run(&mut updated, block.start);

    Ok((
        updated,
        RemovalOutcome::Removed {
            start_line: block.start,
            line_count: block.len(),
        },
    ))
}

fn collapse_blank_run(doc: &mut Document, at: usize) {
    let mut first = at;
    while first > 0 && is_blank(doc.line(first - 1)) {
        first -= 1;
    }
    let mut last = at;
    while last < doc.len() && is_blank(doc.line(last)) {
        last += 1;
    }
    if last - first >= 3 {
        doc.remove_range(first + 1, last);
    }
}
