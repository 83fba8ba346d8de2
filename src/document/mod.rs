//! Text-preserving configuration editing
//!
//! Documents are edited as lines of text, never parsed and re-serialized,
//! so comments, key order and formatting outside the edited value survive
//! untouched.
//!
//! - [`locator`] finds the line holding a key, by dotted path or inside a list-item block
//! - [`mutator`] rewrites the value span of that line
//! - [`remover`] deletes a whole list-item block

pub mod line;
pub mod locator;
pub mod mutator;
pub mod remover;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use locator::{get_value, locate, Locator};
pub use mutator::{set_value, ReplaceStrategy, ValueChange};
pub use remover::{remove_block, RemovalOutcome};

/// A configuration file as an ordered list of lines.
///
/// Each stored line keeps its own terminator, so [`Document::text`] returns
/// the original bytes exactly when nothing was edited.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    pub fn parse(text: &str) -> Self {
        Document {
            lines: text.split_inclusive('\n').map(str::to_string).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line content without its terminator
    pub fn line(&self, index: usize) -> &str {
        self.lines
            .get(index)
            .map_or("", |line| line.trim_end_matches(['\n', '\r']))
    }

    /// Iterate over line contents without terminators
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.len()).map(move |index| self.line(index))
    }

    pub fn text(&self) -> String {
        self.lines.concat()
    }

    /// Replace a line's content, keeping its original terminator
    pub(crate) fn replace_content(&mut self, index: usize, content: &str) {
        if let Some(line) = self.lines.get_mut(index) {
            let body_len = line.trim_end_matches(['\n', '\r']).len();
            let terminator = line[body_len..].to_string();
            *line = format!("{}{}", content, terminator);
        }
    }

    pub(crate) fn remove_range(&mut self, start: usize, end: usize) {
        let end = end.min(self.lines.len());
        if start < end {
            self.lines.drain(start..end);
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            f.write_str(line)?;
        }
        Ok(())
    }
}

/// How the existing value is replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueMode {
    /// Replace the whole value
    #[default]
    Plain,
    /// `name:version` values: replace only the part after the last colon
    Composite,
}

/// Restricts a lookup to the list item whose `field` equals `value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockScope {
    pub field: String,
    pub value: String,
}

impl BlockScope {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        BlockScope {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for BlockScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field, self.value)
    }
}

/// One location inside one configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub file: PathBuf,
    /// Dotted key path, e.g. `image.tag` or `apps.2.version`
    pub path: String,
    #[serde(default)]
    pub scope: Option<BlockScope>,
    #[serde(default)]
    pub mode: ValueMode,
}

impl Target {
    pub fn new(file: impl Into<PathBuf>, path: impl Into<String>) -> Self {
        Target {
            file: file.into(),
            path: path.into(),
            scope: None,
            mode: ValueMode::Plain,
        }
    }

    pub fn with_scope(mut self, scope: BlockScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_mode(mut self, mode: ValueMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn locator(&self) -> Locator {
        let locator = Locator::path(&self.path);
        match &self.scope {
            Some(scope) => locator.within(scope.clone()),
            None => locator,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.path)?;
        if let Some(scope) = &self.scope {
            write!(f, " [{}]", scope)?;
        }
        Ok(())
    }
}

/// A planned change, computed before anything is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationPlan {
    pub target: Target,
    pub old_raw_value: String,
    pub new_value: String,
}
