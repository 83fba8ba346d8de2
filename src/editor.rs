//! Read-modify-write of a single file
//!
//! Plans are computed elsewhere; this module applies one plan or one block
//! removal to a file through a [DocumentStore], logging the decision. On any
//! error nothing is written.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::audit::{LogSink, MutationRecord};
use crate::document::{remove_block, set_value, Document, MutationPlan, RemovalOutcome, ReplaceStrategy};
use crate::error::Result;
use crate::store::DocumentStore;

/// Options shared by every edit in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditOptions {
    /// Compute and log the change without writing it
    pub dry_run: bool,
}

/// Apply one planned value change to its file
pub fn apply_plan(
    store: &dyn DocumentStore,
    plan: &MutationPlan,
    options: &EditOptions,
    log: &mut dyn LogSink,
) -> Result<MutationRecord> {
    let target = &plan.target;
    let text = store.read(&target.file)?;
    let doc = Document::parse(&text);

    let (updated, change) = set_value(
        &doc,
        &target.locator(),
        &plan.old_raw_value,
        &plan.new_value,
        target.mode,
    )?;

    let record = MutationRecord {
        file: target.file.clone(),
        path: target.path.clone(),
        line: change.line + 1,
        old_value: change.old_value,
        new_value: change.new_value,
        strategy: change.strategy,
    };

    match record.strategy {
        ReplaceStrategy::Unchanged => {
            debug!(location = %target, "value already current, skipping write");
        }
        ReplaceStrategy::Drift => {
            warn!(
                location = %target,
                expected = %plan.old_raw_value,
                found = %record.old_value,
                "value drifted from expected version"
            );
        }
        ReplaceStrategy::Exact => {}
    }

    if record.strategy != ReplaceStrategy::Unchanged && !options.dry_run {
        store.write(&target.file, &updated.text())?;
        info!(location = %target, line = record.line, "updated value");
    }

    log.record(with_dry_run_prefix(record.to_string(), options));
    Ok(record)
}

/// Remove the list item whose `field` equals `value` from a file, if present
pub fn remove_block_from_file(
    store: &dyn DocumentStore,
    file: &Path,
    field: &str,
    value: &str,
    options: &EditOptions,
    log: &mut dyn LogSink,
) -> Result<RemovalOutcome> {
    if !store.exists(file) {
        debug!(file = %file.display(), "prune file is missing; nothing to remove");
        return Ok(RemovalOutcome::NotFound);
    }
    let text = store.read(file)?;
    let (updated, outcome) = remove_block(&Document::parse(&text), field, value)?;

    if let RemovalOutcome::Removed { start_line, line_count } = outcome {
        if !options.dry_run {
            store.write(file, &updated.text())?;
            info!(file = %file.display(), start_line = start_line + 1, line_count, "removed block");
        }
        log.record(with_dry_run_prefix(
            format!(
                "{}:{} removed block {}: {} ({} lines)",
                file.display(),
                start_line + 1,
                field,
                value,
                line_count
            ),
            options,
        ));
    } else {
        debug!(file = %file.display(), field, value, "no block to remove");
    }

    Ok(outcome)
}

fn with_dry_run_prefix(line: String, options: &EditOptions) -> String {
    if options.dry_run {
        format!("[dry-run] {}", line)
    } else {
        line
    }
}
