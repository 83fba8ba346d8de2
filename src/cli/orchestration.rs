//! Main workflow orchestration logic
//!
//! The update runs in two phases. [plan_update] reads the target files and
//! the release list and decides every change without writing anything.
//! [run_update] then applies the plan and renders the change-request body.
//! Keeping prompts out of this module lets the workflow be driven
//! programmatically and tested over an in-memory store.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::analyzer::{apply_lag, filter_stable, select_relevant, sort_newest_first};
use crate::audit::{ExecutionLog, LogSink, MutationRecord};
use crate::body::{assemble, BodyInput};
use crate::config::{Config, PruneRule};
use crate::document::mutator::version_part;
use crate::document::{get_value, Document, MutationPlan, RemovalOutcome, ReplaceStrategy, Target};
use crate::domain::release::parse_release_list;
use crate::domain::{normalize, NormalizedVersion, Release};
use crate::editor::{apply_plan, remove_block_from_file, EditOptions};
use crate::error::BumpError;
use crate::store::DocumentStore;
use crate::warning::UpdateWarning;

/// Arguments for the update workflow
///
/// Mirrors the CLI Args but in a format suitable for orchestration logic.
/// This decoupling allows the workflow to be called programmatically
/// without depending on clap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateWorkflowArgs {
    /// Path to custom config file
    pub config_path: Option<String>,

    /// JSON release list, newest first
    pub releases_path: PathBuf,

    /// Optional risk summary text to include in the body
    pub risk_summary_path: Option<PathBuf>,

    /// Where to write the body; stdout when absent
    pub body_out: Option<PathBuf>,

    /// Skip confirmation prompts
    pub force: bool,

    /// Preview mode - don't write any file
    pub dry_run: bool,
}

/// Everything decided before the first write
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdatePlan {
    /// Current version as found (raw)
    pub current_version: Option<String>,
    /// Newest selected version (normalized)
    pub new_version: Option<String>,
    /// Releases newer than the current version, newest first
    pub window: Vec<Release>,
    pub mutations: Vec<MutationPlan>,
    pub prunes: Vec<PruneRule>,
    pub warnings: Vec<UpdateWarning>,
}

impl UpdatePlan {
    pub fn has_changes(&self) -> bool {
        !self.mutations.is_empty() || !self.prunes.is_empty()
    }

    /// One line per planned edit, for display
    pub fn describe(&self) -> Vec<String> {
        let updates = self
            .mutations
            .iter()
            .map(|m| format!("{}: {} -> {}", m.target, m.old_raw_value, m.new_value));
        let removals = self.prunes.iter().map(|rule| {
            format!(
                "{}: remove block {}: {} if present",
                rule.file.display(),
                rule.field,
                rule.value
            )
        });
        updates.chain(removals).collect()
    }
}

/// Result of a completed update workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    pub new_version: Option<String>,

    /// One record per applied (or previewed) value change
    pub records: Vec<MutationRecord>,

    /// Number of list-item blocks deleted
    pub removed_blocks: usize,

    pub warnings: Vec<UpdateWarning>,

    /// Change-request body, when there is a new version to describe
    pub body: Option<String>,

    /// Whether files were left untouched
    pub dry_run: bool,
}

/// Read the JSON release list
pub fn load_releases(path: &Path) -> Result<Vec<Release>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read release list '{}'", path.display()))?;
    let releases = parse_release_list(&json)
        .with_context(|| format!("Invalid release list '{}'", path.display()))?;
    Ok(releases)
}

/// Read the optional risk summary text
pub fn load_risk_summary(path: Option<&Path>) -> Result<Option<String>> {
    path.map(|path| {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read risk summary '{}'", path.display()))
    })
    .transpose()
}

/// Decide every change for one application without writing anything.
///
/// Missing files and keys become warnings. An ambiguous key aborts planning
/// so nothing is guessed.
pub fn plan_update(config: &Config, releases: Vec<Release>, store: &dyn DocumentStore) -> Result<UpdatePlan> {
    let app = &config.app;
    let mut plan = UpdatePlan {
        prunes: config.prune.clone(),
        ..Default::default()
    };

    let mut releases = releases;
    if app.sort_releases {
        sort_newest_first(&mut releases);
    }
    if !app.allow_prerelease {
        releases = filter_stable(&releases);
    }
    if let Some(lag) = app.lag {
        releases = apply_lag(&releases, lag.count, lag.granularity);
        debug!(count = lag.count, granularity = %lag.granularity, remaining = releases.len(), "applied lag");
    }

    let mut found: Vec<(&Target, String)> = Vec::new();
    for target in &config.targets {
        match read_target(store, target) {
            Ok(value) => found.push((target, value)),
            Err(BumpError::FileNotFound(file)) => {
                push_warning(&mut plan.warnings, UpdateWarning::TargetMissing { file });
            }
            Err(BumpError::NotFound { .. }) => push_warning(
                &mut plan.warnings,
                UpdateWarning::KeyMissing {
                    file: target.file.clone(),
                    path: target.path.clone(),
                },
            ),
            Err(e) => return Err(e).with_context(|| format!("Cannot read target {}", target)),
        }
    }

    let current_raw = app.current_version.clone().or_else(|| {
        found
            .first()
            .map(|(target, value)| version_part(value, target.mode).to_string())
    });
    let Some(current_raw) = current_raw else {
        debug!("no current version available; nothing to compare against");
        return Ok(plan);
    };
    plan.current_version = Some(current_raw.clone());

    let Some(current) = parse_version(&current_raw) else {
        push_warning(
            &mut plan.warnings,
            UpdateWarning::MalformedCurrentVersion { raw: current_raw },
        );
        return Ok(plan);
    };

    if releases.is_empty() {
        push_warning(
            &mut plan.warnings,
            UpdateWarning::NoReleases {
                app: app.name.clone(),
            },
        );
        return Ok(plan);
    }

    let window = select_relevant(&releases, &current_raw, app.max_releases);
    let newest = match window.iter().find_map(Release::version) {
        Some(newest) if newest > current => newest,
        _ => {
            push_warning(
                &mut plan.warnings,
                UpdateWarning::UpToDate {
                    current: current_raw,
                },
            );
            return Ok(plan);
        }
    };
    info!(current = %current, newest = %newest, releases = window.len(), "found newer releases");
    plan.new_version = Some(newest.to_string());
    plan.window = window;

    for (target, value) in found {
        let part = version_part(&value, target.mode);
        let Some(found_version) = parse_version(part) else {
            push_warning(
                &mut plan.warnings,
                UpdateWarning::MalformedCurrentVersion { raw: value.clone() },
            );
            continue;
        };
        if found_version != current {
            push_warning(
                &mut plan.warnings,
                UpdateWarning::ValueDrift {
                    file: target.file.clone(),
                    path: target.path.clone(),
                    expected: current_raw.clone(),
                    found: part.to_string(),
                },
            );
        }
        if found_version >= newest {
            debug!(location = %target, "already at or past the newest release");
            continue;
        }
        plan.mutations.push(MutationPlan {
            target: target.clone(),
            old_raw_value: part.to_string(),
            new_value: styled_like(part, &newest),
        });
    }

    Ok(plan)
}

/// Apply a plan, sending every decision to `log`.
///
/// Targets that disappeared since planning become warnings; ambiguity and
/// I/O failures abort.
pub fn apply_update(
    plan: &UpdatePlan,
    store: &dyn DocumentStore,
    options: &EditOptions,
    log: &mut dyn LogSink,
) -> Result<WorkflowResult> {
    for warning in &plan.warnings {
        log.record(format!("warning: {}", warning));
    }

    let mut warnings = plan.warnings.clone();
    let mut records = Vec::new();
    for mutation in &plan.mutations {
        let target = &mutation.target;
        match apply_plan(store, mutation, options, log) {
            Ok(record) => {
                if record.strategy == ReplaceStrategy::Drift {
                    let warning = UpdateWarning::ValueDrift {
                        file: record.file.clone(),
                        path: record.path.clone(),
                        expected: mutation.old_raw_value.clone(),
                        found: record.old_value.clone(),
                    };
                    note(&mut warnings, log, warning);
                }
                records.push(record);
            }
            Err(BumpError::FileNotFound(file)) => {
                note(&mut warnings, log, UpdateWarning::TargetMissing { file });
            }
            Err(BumpError::NotFound { .. }) => {
                let warning = UpdateWarning::KeyMissing {
                    file: target.file.clone(),
                    path: target.path.clone(),
                };
                note(&mut warnings, log, warning);
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to update {}", target)),
        }
    }

    let mut removed_blocks = 0;
    for rule in &plan.prunes {
        let outcome = match remove_block_from_file(store, &rule.file, &rule.field, &rule.value, options, log) {
            Ok(outcome) => outcome,
            Err(e) if e.is_recoverable() => RemovalOutcome::NotFound,
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to prune '{}'", rule.file.display()))
            }
        };
        match outcome {
            RemovalOutcome::Removed { .. } => removed_blocks += 1,
            RemovalOutcome::NotFound => {
                let warning = UpdateWarning::BlockNotPresent {
                    file: rule.file.clone(),
                    field: rule.field.clone(),
                    value: rule.value.clone(),
                };
                note(&mut warnings, log, warning);
            }
        }
    }

    Ok(WorkflowResult {
        new_version: plan.new_version.clone(),
        records,
        removed_blocks,
        warnings,
        body: None,
        dry_run: options.dry_run,
    })
}

/// Apply a plan and build the change-request body from its execution log
pub fn run_update(
    config: &Config,
    plan: &UpdatePlan,
    store: &dyn DocumentStore,
    options: &EditOptions,
    risk_summary: Option<&str>,
) -> Result<WorkflowResult> {
    let mut log = ExecutionLog::new();
    let mut result = apply_update(plan, store, options, &mut log)?;
    result.body = render_body(config, plan, risk_summary, &log);
    Ok(result)
}

/// Body for the planned update, or `None` when there is no new version
pub fn render_body(
    config: &Config,
    plan: &UpdatePlan,
    risk_summary: Option<&str>,
    log: &ExecutionLog,
) -> Option<String> {
    let old = plan.current_version.as_deref()?;
    let new = plan.new_version.as_deref()?;
    let title = config.body.render_title(&config.app.name, old, new);
    let rendered_log = log.render();
    let input = BodyInput {
        title: &title,
        risk_summary,
        releases: &plan.window,
        log: &rendered_log,
    };
    Some(assemble(&input, config.body.size_limit))
}

fn read_target(store: &dyn DocumentStore, target: &Target) -> crate::error::Result<String> {
    let text = store.read(&target.file)?;
    get_value(&Document::parse(&text), &target.locator())
}

/// A normalized version that starts with a digit
fn parse_version(raw: &str) -> Option<NormalizedVersion> {
    normalize(raw).filter(|v| v.as_str().starts_with(|c: char| c.is_ascii_digit()))
}

/// Format `new` the way `current` is written, keeping a leading `v`
fn styled_like(current: &str, new: &NormalizedVersion) -> String {
    match current.chars().next() {
        Some(prefix @ ('v' | 'V')) => format!("{}{}", prefix, new),
        _ => new.to_string(),
    }
}

fn push_warning(warnings: &mut Vec<UpdateWarning>, warning: UpdateWarning) {
    warn!("{}", warning);
    warnings.push(warning);
}

fn note(warnings: &mut Vec<UpdateWarning>, log: &mut dyn LogSink, warning: UpdateWarning) {
    log.record(format!("warning: {}", warning));
    push_warning(warnings, warning);
}
