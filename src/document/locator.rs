//! Finding the line that holds a key
//!
//! A dotted path is resolved with an indentation-based line walk. When the
//! document also parses as YAML, the parsed value at the path must agree with
//! the line the walk found. If the walk cannot be trusted (duplicate keys,
//! irregular indentation, templated files), the path's final key is matched
//! anywhere in the document instead, and only a unique hit is accepted.

use std::fmt;
use std::ops::Range;

use serde_yaml::Value;
use tracing::debug;

use super::line::{content_col, indent_of, is_blank, is_significant, list_marker, unquote, KeyLine};
use super::{BlockScope, Document};
use crate::error::{BumpError, Result};

/// Where to look for a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    segments: Vec<String>,
    scope: Option<BlockScope>,
}

impl Locator {
    /// Locate by dotted path (`image.tag`, `apps.2.version`)
    pub fn path(path: &str) -> Self {
        Locator {
            segments: path
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
            scope: None,
        }
    }

    /// Locate a single key whose name may itself contain dots
    pub fn key(key: impl Into<String>) -> Self {
        Locator {
            segments: vec![key.into()],
            scope: None,
        }
    }

    /// Restrict the lookup to the list item matching `scope`
    pub fn within(mut self, scope: BlockScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn scope(&self) -> Option<&BlockScope> {
        self.scope.as_ref()
    }

    /// The key name of the final segment
    pub fn leaf(&self) -> Option<&str> {
        self.segments
            .last()
            .map(String::as_str)
            .filter(|segment| segment.parse::<usize>().is_err())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))?;
        if let Some(scope) = &self.scope {
            write!(f, " in block {}", scope)?;
        }
        Ok(())
    }
}

/// Return the 0-based index of the line holding the located key
pub fn locate(doc: &Document, locator: &Locator) -> Result<usize> {
    let Some(leaf) = locator.leaf() else {
        return Err(BumpError::not_found(format!(
            "{} (path must end at a key)",
            locator
        )));
    };

    match locator.scope() {
        Some(scope) => locate_in_block(doc, leaf, scope),
        None => locate_path(doc, locator, leaf),
    }
}

/// Read the current value at the located key, without quotes
pub fn get_value(doc: &Document, locator: &Locator) -> Result<String> {
    let index = locate(doc, locator)?;
    let line = doc.line(index);
    let parsed = KeyLine::parse(line).ok_or_else(|| BumpError::not_found(locator.to_string()))?;
    Ok(parsed.value(line).to_string())
}

fn locate_in_block(doc: &Document, leaf: &str, scope: &BlockScope) -> Result<usize> {
    let block = find_block(doc, &scope.field, &scope.value)?
        .ok_or_else(|| BumpError::not_found(format!("block {}", scope)))?;

    block
        .clone()
        .find(|&index| KeyLine::parse_key(doc.line(index), leaf).is_some())
        .ok_or_else(|| BumpError::not_found(format!("{} in block {}", leaf, scope)))
}

/// Outcome of the structural line walk
#[derive(Debug, Clone, PartialEq, Eq)]
enum Walk {
    Found(usize),
    Absent,
    Unreliable(String),
}

/// What the YAML parser says about the path
#[derive(Debug, Clone, PartialEq)]
enum Parsed {
    Unparsed,
    Missing,
    NonScalar,
    Scalar(Value),
}

fn locate_path(doc: &Document, locator: &Locator, leaf: &str) -> Result<usize> {
    let walk = walk_path(doc, locator.segments());
    let parsed = parse_path(&doc.text(), locator.segments());

    match (walk, parsed) {
        (Walk::Found(index), Parsed::Scalar(expected)) => {
            let line = doc.line(index);
            if line_agrees(line, &expected) {
                Ok(index)
            } else {
                Err(BumpError::ambiguous(
                    locator.to_string(),
                    format!(
                        "line {} does not hold the value the parsed document has at this path",
                        index + 1
                    ),
                ))
            }
        }
        (Walk::Found(index), Parsed::Unparsed) => Ok(index),
        (Walk::Found(index), Parsed::NonScalar) => Err(BumpError::ambiguous(
            locator.to_string(),
            format!("line {} opens a nested structure, not a scalar", index + 1),
        )),
        (Walk::Found(index), Parsed::Missing) => Err(BumpError::ambiguous(
            locator.to_string(),
            format!(
                "line {} matched but the parsed document has no such path",
                index + 1
            ),
        )),
        (_, Parsed::Missing) | (_, Parsed::NonScalar) => {
            Err(BumpError::not_found(locator.to_string()))
        }
        (Walk::Absent, Parsed::Unparsed) => {
            debug!(path = %locator, "document does not parse; falling back to key match");
            fallback(doc, locator, leaf, None)
        }
        (Walk::Absent, Parsed::Scalar(expected)) => {
            debug!(path = %locator, "line walk missed a path the parser found; falling back to key match");
            fallback(doc, locator, leaf, Some(&expected))
        }
        (Walk::Unreliable(reason), parsed) => {
            debug!(path = %locator, %reason, "line walk unreliable; falling back to key match");
            let expected = match &parsed {
                Parsed::Scalar(value) => Some(value),
                _ => None,
            };
            fallback(doc, locator, leaf, expected)
        }
    }
}

/// Match the final key anywhere in the document; only a unique hit counts
fn fallback(doc: &Document, locator: &Locator, leaf: &str, expected: Option<&Value>) -> Result<usize> {
    let candidates: Vec<usize> = doc
        .lines()
        .enumerate()
        .filter(|(_, line)| KeyLine::parse_key(line, leaf).is_some())
        .map(|(index, _)| index)
        .collect();

    match candidates.as_slice() {
        [] => Err(BumpError::not_found(locator.to_string())),
        [index] => match expected {
            Some(value) if !line_agrees(doc.line(*index), value) => Err(BumpError::ambiguous(
                locator.to_string(),
                format!(
                    "only key match is line {}, which does not hold the parsed value",
                    index + 1
                ),
            )),
            _ => Ok(*index),
        },
        many => Err(BumpError::ambiguous(
            locator.to_string(),
            format!(
                "{} candidate lines ({})",
                many.len(),
                many.iter()
                    .map(|index| (index + 1).to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        )),
    }
}

fn walk_path(doc: &Document, segments: &[String]) -> Walk {
    let mut span = 0..doc.len();

    for (depth, segment) in segments.iter().enumerate() {
        let last = depth + 1 == segments.len();

        if let Ok(position) = segment.parse::<usize>() {
            let Some(items) = list_items(doc, span.clone()) else {
                return Walk::Unreliable(format!("no list where '{}' expects one", segment));
            };
            match items.get(position) {
                Some(item) => span = item.clone(),
                None => return Walk::Absent,
            }
            continue;
        }

        let Some(column) = child_column(doc, span.clone()) else {
            return Walk::Absent;
        };
        let matches: Vec<usize> = span
            .clone()
            .filter(|&index| {
                KeyLine::parse_key(doc.line(index), segment)
                    .is_some_and(|parsed| parsed.key_col == column)
            })
            .collect();

        match matches.as_slice() {
            [] => return Walk::Absent,
            [index] if last => return Walk::Found(*index),
            [index] => span = child_span(doc, *index, span.end),
            _ => return Walk::Unreliable(format!("duplicate key '{}'", segment)),
        }
    }

    Walk::Absent
}

/// Content column of the first significant line in `span`
fn child_column(doc: &Document, span: Range<usize>) -> Option<usize> {
    span.map(|index| doc.line(index))
        .find(|line| is_significant(line))
        .map(content_col)
}

/// Lines nested under the key on line `index`
fn child_span(doc: &Document, index: usize, limit: usize) -> Range<usize> {
    let Some(parent) = KeyLine::parse(doc.line(index)) else {
        return index + 1..index + 1;
    };
    let column = parent.key_col;

    let end = (index + 1..limit)
        .find(|&next| {
            let line = doc.line(next);
            if !is_significant(line) {
                return false;
            }
            let indent = indent_of(line);
            // A sequence may sit at the same column as its parent key.
            indent < column || (indent == column && list_marker(line).is_none())
        })
        .unwrap_or(limit);

    index + 1..end
}

/// Split `span` into list items; `None` if it does not start with a list
fn list_items(doc: &Document, span: Range<usize>) -> Option<Vec<Range<usize>>> {
    let first = span.clone().find(|&index| is_significant(doc.line(index)))?;
    let column = list_marker(doc.line(first))?.indent;

    let mut items = Vec::new();
    let mut current = first;
    for index in first + 1..span.end {
        let line = doc.line(index);
        if !is_significant(line) {
            continue;
        }
        let indent = indent_of(line);
        if indent == column && list_marker(line).is_some() {
            items.push(current..index);
            current = index;
        } else if indent <= column {
            items.push(current..index);
            return Some(items);
        }
    }
    items.push(current..span.end);
    Some(items)
}

fn parse_path(text: &str, segments: &[String]) -> Parsed {
    let Ok(root) = serde_yaml::from_str::<Value>(text) else {
        return Parsed::Unparsed;
    };

    let mut current = &root;
    for segment in segments {
        let next = match current {
            Value::Mapping(map) => map.get(segment.as_str()),
            Value::Sequence(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|position| items.get(position)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return Parsed::Missing,
        }
    }

    match current {
        Value::Mapping(_) | Value::Sequence(_) | Value::Tagged(_) => Parsed::NonScalar,
        scalar => Parsed::Scalar(scalar.clone()),
    }
}

/// Whether the value text on `line` reads as the parsed scalar
fn line_agrees(line: &str, expected: &Value) -> bool {
    let Some(parsed) = KeyLine::parse(line) else {
        return false;
    };
    let text = parsed.value(line);

    match expected {
        Value::String(value) => value == text,
        Value::Number(number) => {
            number.to_string() == text
                || text
                    .parse::<f64>()
                    .ok()
                    .zip(number.as_f64())
                    .is_some_and(|(left, right)| left == right)
        }
        Value::Bool(flag) => text.eq_ignore_ascii_case(if *flag { "true" } else { "false" }),
        Value::Null => matches!(text, "" | "~" | "null" | "Null" | "NULL"),
        _ => false,
    }
}

/// The list-item block containing the unique `field: value` line.
///
/// Returns `Ok(None)` when no line matches or the line is not inside a list
/// item, and `AmbiguousMatch` when several lines match.
pub(crate) fn find_block(doc: &Document, field: &str, value: &str) -> Result<Option<Range<usize>>> {
    let wanted = unquote(value);
    let matches: Vec<usize> = doc
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            KeyLine::parse_key(line, field).is_some_and(|parsed| unquote(parsed.value(line)) == wanted)
        })
        .map(|(index, _)| index)
        .collect();

    match matches.as_slice() {
        [] => Ok(None),
        [index] => Ok(enclosing_item(doc, *index).map(|start| start..block_end(doc, start))),
        many => Err(BumpError::ambiguous(
            format!("{}: {}", field, wanted),
            format!("{} blocks match", many.len()),
        )),
    }
}

/// Nearest list-item marker line that contains line `index`
fn enclosing_item(doc: &Document, index: usize) -> Option<usize> {
    let line = doc.line(index);
    if list_marker(line).is_some() {
        return Some(index);
    }

    let mut column = indent_of(line);
    for above in (0..index).rev() {
        let candidate = doc.line(above);
        if !is_significant(candidate) {
            continue;
        }
        let indent = indent_of(candidate);
        if list_marker(candidate).is_some() {
            if indent < column {
                return Some(above);
            }
        } else if indent < column {
            column = indent;
        }
        if column == 0 && list_marker(candidate).is_none() {
            return None;
        }
    }
    None
}

/// End (exclusive) of the block opened by the list marker on line `start`.
///
/// The block runs until the next non-blank line indented at or left of the
/// marker. Trailing blank lines are not part of the block.
pub(crate) fn block_end(doc: &Document, start: usize) -> usize {
    let column = indent_of(doc.line(start));

    let mut end = (start + 1..doc.len())
        .find(|&index| {
            let line = doc.line(index);
            !is_blank(line) && indent_of(line) <= column
        })
        .unwrap_or(doc.len());

    while end > start + 1 && is_blank(doc.line(end - 1)) {
        end -= 1;
    }
    end
}
