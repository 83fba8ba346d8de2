use std::fmt;

use serde::Serialize;

use super::line::KeyLine;
use super::locator::{locate, Locator};
use super::{Document, ValueMode};
use crate::error::{BumpError, Result};

/// How a value was replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplaceStrategy {
    /// The expected old value was found and replaced
    Exact,
    /// The value had drifted from the expected old value and was replaced anyway
    Drift,
    /// The value already read as the new value; nothing was rewritten
    Unchanged,
}

impl fmt::Display for ReplaceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplaceStrategy::Exact => write!(f, "exact"),
            ReplaceStrategy::Drift => write!(f, "drift"),
            ReplaceStrategy::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// A single value rewrite on one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueChange {
    /// 0-based line index
    pub line: usize,
    /// Value found in the document before the change
    pub old_value: String,
    /// Value written (with any composite prefix reattached)
    pub new_value: String,
    pub strategy: ReplaceStrategy,
}

/// Replace the value at `locator` with `new_value`.
///
/// Only the value span of the located line changes; indentation, list
/// marker, quotes and trailing comments are kept. In composite mode a
/// `name:version` value keeps everything up to its last colon.
///
/// If the current value is not `old_value` the replacement still happens on
/// the same line and is reported as [`ReplaceStrategy::Drift`]. The input
/// document is never modified; on error no new document is produced.
pub fn set_value(
    doc: &Document,
    locator: &Locator,
    old_value: &str,
    new_value: &str,
    mode: ValueMode,
) -> Result<(Document, ValueChange)> {
    let index = locate(doc, locator)?;
    let line = doc.line(index);
    let parsed = KeyLine::parse(line).ok_or_else(|| BumpError::not_found(locator.to_string()))?;
    let current = parsed.value(line);

    let replacement = match mode {
        ValueMode::Plain => new_value.to_string(),
        ValueMode::Composite => composite_value(current, new_value),
    };

    let strategy = if replacement == current {
        ReplaceStrategy::Unchanged
    } else if matches_old(current, old_value, mode) {
        ReplaceStrategy::Exact
    } else {
        ReplaceStrategy::Drift
    };

    let mut updated = doc.clone();
    if strategy != ReplaceStrategy::Unchanged {
        updated.replace_content(index, &parsed.splice(line, &replacement));
    }

    Ok((
        updated,
        ValueChange {
            line: index,
            old_value: current.to_string(),
            new_value: replacement,
            strategy,
        },
    ))
}

/// Version part of a value: the text after the last colon in composite mode
pub fn version_part(value: &str, mode: ValueMode) -> &str {
    match (mode, value.rsplit_once(':')) {
        (ValueMode::Composite, Some((_, version))) => version,
        _ => value,
    }
}

fn composite_value(current: &str, new_value: &str) -> String {
    match current.rfind(':') {
        Some(colon) => {
            let prefix = &current[..=colon];
            if new_value.starts_with(prefix) {
                new_value.to_string()
            } else {
                format!("{}{}", prefix, new_value)
            }
        }
        None => new_value.to_string(),
    }
}

fn matches_old(current: &str, old_value: &str, mode: ValueMode) -> bool {
    current == old_value || version_part(current, mode) == old_value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{get_value, BlockScope};
    use pretty_assertions::assert_eq;

    fn apply(text: &str, path: &str, old: &str, new: &str, mode: ValueMode) -> (String, ValueChange) {
        let doc = Document::parse(text);
        let (updated, change) = set_value(&doc, &Locator::path(path), old, new, mode).unwrap();
        (updated.text(), change)
    }

    #[test]
    fn test_composite_keeps_prefix_and_comment() {
        let (text, change) = apply(
            "image: busybox:1.35 # pinned\n",
            "image",
            "1.35",
            "1.37.0",
            ValueMode::Composite,
        );
        assert_eq!(text, "image: busybox:1.37.0 # pinned\n");
        assert_eq!(change.old_value, "busybox:1.35");
        assert_eq!(change.new_value, "busybox:1.37.0");
        assert_eq!(change.strategy, ReplaceStrategy::Exact);
    }

    #[test]
    fn test_composite_with_registry_port() {
        let (text, _) = apply(
            "image: registry.local:5000/app:1.0\n",
            "image",
            "1.0",
            "1.1",
            ValueMode::Composite,
        );
        assert_eq!(text, "image: registry.local:5000/app:1.1\n");
    }

    #[test]
    fn test_composite_new_value_with_same_prefix() {
        let (text, _) = apply(
            "image: busybox:1.35\n",
            "image",
            "busybox:1.35",
            "busybox:1.36",
            ValueMode::Composite,
        );
        assert_eq!(text, "image: busybox:1.36\n");
    }

    #[test]
    fn test_composite_without_colon_is_plain() {
        let (text, _) = apply("tag: 1.35\n", "tag", "1.35", "1.36", ValueMode::Composite);
        assert_eq!(text, "tag: 1.36\n");
    }

    #[test]
    fn test_plain_preserves_everything_else() {
        let input = "\
# header comment
image:
  repository: busybox   # upstream
  tag: \"1.35\"  # pinned
  pullPolicy: IfNotPresent
";
        let (text, change) = apply(input, "image.tag", "1.35", "1.36.1", ValueMode::Plain);
        assert_eq!(
            text,
            "\
# header comment
image:
  repository: busybox   # upstream
  tag: \"1.36.1\"  # pinned
  pullPolicy: IfNotPresent
"
        );
        assert_eq!(change.line, 3);
    }

    #[test]
    fn test_list_marker_and_crlf_preserved() {
        let input = "apps:\r\n  - version: v1.0.0\r\n    name: web\r\n";
        let (text, _) = apply(input, "apps.0.version", "v1.0.0", "v1.1.0", ValueMode::Plain);
        assert_eq!(text, "apps:\r\n  - version: v1.1.0\r\n    name: web\r\n");
    }

    #[test]
    fn test_replacement_text_is_literal() {
        let (text, _) = apply("tag: 1.0\n", "tag", "1.0", "$1-${2}", ValueMode::Plain);
        assert_eq!(text, "tag: $1-${2}\n");
    }

    #[test]
    fn test_drift_replaces_current_value() {
        let (text, change) = apply("tag: 1.36\n", "tag", "1.35", "1.37", ValueMode::Plain);
        assert_eq!(text, "tag: 1.37\n");
        assert_eq!(change.strategy, ReplaceStrategy::Drift);
        assert_eq!(change.old_value, "1.36");
    }

    #[test]
    fn test_drift_never_touches_other_keys() {
        let input = "tag: 1.36\nother: 1.35\n";
        let (text, change) = apply(input, "tag", "1.35", "1.37", ValueMode::Plain);
        assert_eq!(text, "tag: 1.37\nother: 1.35\n");
        assert_eq!(change.strategy, ReplaceStrategy::Drift);
    }

    #[test]
    fn test_unchanged_when_already_new() {
        let (text, change) = apply("tag: 1.37 # x\n", "tag", "1.35", "1.37", ValueMode::Plain);
        assert_eq!(text, "tag: 1.37 # x\n");
        assert_eq!(change.strategy, ReplaceStrategy::Unchanged);
    }

    #[test]
    fn test_idempotent() {
        let input = "image:\n  name: busybox:1.35 # pinned\n";
        let doc = Document::parse(input);
        let locator = Locator::path("image.name");
        let (once, _) = set_value(&doc, &locator, "1.35", "1.37.0", ValueMode::Composite).unwrap();
        let (twice, change) =
            set_value(&once, &locator, "1.35", "1.37.0", ValueMode::Composite).unwrap();
        assert_eq!(once, twice);
        assert_eq!(change.strategy, ReplaceStrategy::Unchanged);
    }

    #[test]
    fn test_round_trip_reads_back_new_value() {
        let input = "service:\n  port: 8080\nimage:\n  tag: '1.35'\n";
        let doc = Document::parse(input);
        for (path, new) in [("service.port", "9090"), ("image.tag", "2.0.0-rc.1")] {
            let locator = Locator::path(path);
            let current = get_value(&doc, &locator).unwrap();
            let (updated, _) = set_value(&doc, &locator, &current, new, ValueMode::Plain).unwrap();
            assert_eq!(get_value(&updated, &locator).unwrap(), new);
        }
    }

    #[test]
    fn test_fills_key_without_value() {
        let locator = Locator::path("image.tag");
        for (input, expected) in [
            ("image:\n  tag:\n", "image:\n  tag: 1.37.0\n"),
            ("image:\n  tag: # set later\n", "image:\n  tag: 1.37.0 # set later\n"),
        ] {
            let doc = Document::parse(input);
            let (updated, change) = set_value(&doc, &locator, "", "1.37.0", ValueMode::Plain).unwrap();
            assert_eq!(updated.text(), expected);
            assert_eq!(change.strategy, ReplaceStrategy::Exact);
            assert_eq!(get_value(&updated, &locator).unwrap(), "1.37.0");
        }
    }

    #[test]
    fn test_scoped_block_update() {
        let input = "\
- name: web
  image: org/web:1.0
- name: worker
  image: org/worker:1.0
";
        let doc = Document::parse(input);
        let locator = Locator::path("image").within(BlockScope::new("name", "worker"));
        let (updated, change) =
            set_value(&doc, &locator, "1.0", "1.2", ValueMode::Composite).unwrap();
        assert_eq!(
            updated.text(),
            "\
- name: web
  image: org/web:1.0
- name: worker
  image: org/worker:1.2
"
        );
        assert_eq!(change.line, 3);
    }

    #[test]
    fn test_missing_key_leaves_document_untouched() {
        let doc = Document::parse("image:\n  tag: 1.0\n");
        let err = set_value(&doc, &Locator::path("image.digest"), "x", "y", ValueMode::Plain)
            .unwrap_err();
        assert!(matches!(err, BumpError::NotFound { .. }));
        assert_eq!(doc.text(), "image:\n  tag: 1.0\n");
    }

    #[test]
    fn test_version_part() {
        assert_eq!(version_part("busybox:1.35", ValueMode::Composite), "1.35");
        assert_eq!(version_part("busybox:1.35", ValueMode::Plain), "busybox:1.35");
        assert_eq!(version_part("1.35", ValueMode::Composite), "1.35");
    }
}
