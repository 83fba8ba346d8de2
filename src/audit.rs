//! Audit trail of mutation decisions
//!
//! Every rewrite or removal the editor decides on is turned into a line and
//! handed to a [LogSink]. [ExecutionLog] keeps those lines so they can be
//! rendered into the change-request body.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::document::ReplaceStrategy;

/// One value rewrite decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationRecord {
    pub file: PathBuf,
    pub path: String,
    /// 1-based line number
    pub line: usize,
    pub old_value: String,
    pub new_value: String,
    pub strategy: ReplaceStrategy,
}

impl fmt::Display for MutationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.strategy {
            ReplaceStrategy::Unchanged => write!(
                f,
                "{}:{} {} already '{}'",
                self.file.display(),
                self.line,
                self.path,
                self.new_value
            ),
            strategy => write!(
                f,
                "{}:{} {} '{}' -> '{}' ({})",
                self.file.display(),
                self.line,
                self.path,
                self.old_value,
                self.new_value,
                strategy
            ),
        }
    }
}

/// Receives human-readable execution log lines
pub trait LogSink {
    fn record(&mut self, line: String);
}

/// Collects log lines in order and mirrors each one as a `tracing` event
#[derive(Debug, Clone, Default)]
pub struct ExecutionLog {
    lines: Vec<String>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Log lines joined with newlines
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl LogSink for ExecutionLog {
    fn record(&mut self, line: String) {
        info!(target: "version_bump::audit", "{}", line);
        self.lines.push(line);
    }
}
