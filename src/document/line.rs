//! Line-level primitives: indentation, list markers and `key: value` spans

use once_cell::sync::Lazy;
use regex::Regex;

/// `key:` with an optional list marker and a bare, single- or double-quoted key
static KEY_LINE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r#"^[ \t]*(?:-[ \t]+)?(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^\s:#"'\-{}\[\],][^:#]*?|-[^\s:#][^:#]*?))[ \t]*:(?:[ \t]+|$)"#,
    )
    .ok()
});

/// Number of leading spaces or tabs
pub fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Lines that carry structure (not blank, not a comment)
pub fn is_significant(line: &str) -> bool {
    !is_blank(line) && !is_comment(line)
}

/// A `- ` list-item marker at the start of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker {
    /// Column of the dash
    pub indent: usize,
    /// Column where the item content starts
    pub content_col: usize,
}

/// Detect a list-item marker: a dash followed by whitespace or end of line
pub fn list_marker(line: &str) -> Option<ListMarker> {
    let indent = indent_of(line);
    let rest = line[indent..].strip_prefix('-')?;
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    let padding = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    Some(ListMarker {
        indent,
        content_col: indent + 1 + padding,
    })
}

/// Column where a line's content begins, past any list marker
pub fn content_col(line: &str) -> usize {
    list_marker(line).map_or_else(|| indent_of(line), |marker| marker.content_col)
}

/// Byte spans of a `key: value` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLine {
    pub key: String,
    /// Column of the key (after indentation and any list marker)
    pub key_col: usize,
    /// Start of the value, inside any quotes
    pub value_start: usize,
    /// End of the value, before any closing quote
    pub value_end: usize,
    /// Quote character wrapping the value
    pub quote: Option<char>,
}

impl KeyLine {
    /// Parse a line as `key: value`, tolerating a leading list marker,
    /// quoted keys and a trailing comment.
    pub fn parse(line: &str) -> Option<KeyLine> {
        let captures = KEY_LINE.as_ref()?.captures(line)?;
        let key_match = captures
            .name("dq")
            .or_else(|| captures.name("sq"))
            .or_else(|| captures.name("bare"))?;
        let quoted_key = captures.name("bare").is_none();
        let key_col = key_match.start() - usize::from(quoted_key);
        let after_colon = captures.get(0)?.end();

        let (value_start, value_end, quote) = value_span(line, after_colon);
        Some(KeyLine {
            key: key_match.as_str().to_string(),
            key_col,
            value_start,
            value_end,
            quote,
        })
    }

    /// Parse and require a specific key
    pub fn parse_key(line: &str, key: &str) -> Option<KeyLine> {
        KeyLine::parse(line).filter(|parsed| parsed.key == key)
    }

    /// The value text, without quotes
    pub fn value<'a>(&self, line: &'a str) -> &'a str {
        &line[self.value_start..self.value_end]
    }

    /// Rebuild `line` with the value span replaced by `new_value`.
    ///
    /// Everything outside the span is copied as-is, and `new_value` is
    /// inserted literally. Filling an empty value adds the separating
    /// spaces YAML needs after the colon and before a trailing comment.
    pub fn splice(&self, line: &str, new_value: &str) -> String {
        let head = &line[..self.value_start];
        let tail = &line[self.value_end..];
        let filling = self.value_start == self.value_end && self.quote.is_none() && !new_value.is_empty();

        let mut rebuilt = String::with_capacity(line.len() + new_value.len() + 2);
        rebuilt.push_str(head);
        if filling && !head.ends_with([' ', '\t']) {
            rebuilt.push(' ');
        }
        rebuilt.push_str(new_value);
        if filling && tail.starts_with('#') {
            rebuilt.push(' ');
        }
        rebuilt.push_str(tail);
        rebuilt
    }
}

/// Locate the value after `from`: a quoted string up to its closing quote,
/// or plain text up to a ` #` comment, minus trailing whitespace and a
/// single trailing comma.
fn value_span(line: &str, from: usize) -> (usize, usize, Option<char>) {
    let rest = &line[from..];

    if let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') {
        if let Some(close) = closing_quote(&rest[1..], quote) {
            let start = from + 1;
            return (start, start + close, Some(quote));
        }
    }

    let comment = rest
        .char_indices()
        .find(|&(i, c)| c == '#' && (i == 0 || rest[..i].ends_with([' ', '\t'])))
        .map_or(rest.len(), |(i, _)| i);
    let mut value = rest[..comment].trim_end();
    if let Some(stripped) = value.strip_suffix(',') {
        value = stripped.trim_end();
    }
    (from, from + value.len(), None)
}

/// Byte offset of the closing quote in `text` (which starts after the opening quote)
fn closing_quote(text: &str, quote: char) -> Option<usize> {
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if quote == '"' && c == '\\' {
            chars.next();
            continue;
        }
        if c == quote {
            // YAML escapes a single quote by doubling it.
            if quote == '\'' && chars.peek().is_some_and(|&(_, next)| next == '\'') {
                chars.next();
                continue;
            }
            return Some(i);
        }
    }
    None
}

/// Strip one layer of matching quotes from a value
pub fn unquote(value: &str) -> &str {
    let trimmed = value.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_of() {
        assert_eq!(indent_of("    key: v"), 4);
        assert_eq!(indent_of("\t- x"), 1);
        assert_eq!(indent_of("key"), 0);
    }

    #[test]
    fn test_list_marker() {
        assert_eq!(
            list_marker("  - name: web"),
            Some(ListMarker { indent: 2, content_col: 4 })
        );
        assert_eq!(list_marker("-"), Some(ListMarker { indent: 0, content_col: 1 }));
        assert_eq!(list_marker("  -1.5"), None);
        assert_eq!(list_marker("  --- "), None);
        assert_eq!(list_marker("  name: x"), None);
    }

    #[test]
    fn test_content_col() {
        assert_eq!(content_col("  - name: web"), 4);
        assert_eq!(content_col("    image: x"), 4);
    }

    #[test]
    fn test_key_line_plain() {
        let line = "  tag: 1.35";
        let parsed = KeyLine::parse(line).unwrap();
        assert_eq!(parsed.key, "tag");
        assert_eq!(parsed.key_col, 2);
        assert_eq!(parsed.value(line), "1.35");
        assert_eq!(parsed.quote, None);
    }

    #[test]
    fn test_key_line_list_marker_and_comment() {
        let line = "  - image: busybox:1.35   # pinned";
        let parsed = KeyLine::parse(line).unwrap();
        assert_eq!(parsed.key, "image");
        assert_eq!(parsed.key_col, 4);
        assert_eq!(parsed.value(line), "busybox:1.35");
    }

    #[test]
    fn test_key_line_quoted_value() {
        let line = r#"version: "v1.2.3" # keep quotes"#;
        let parsed = KeyLine::parse(line).unwrap();
        assert_eq!(parsed.value(line), "v1.2.3");
        assert_eq!(parsed.quote, Some('"'));
        assert_eq!(parsed.splice(line, "v1.3.0"), r#"version: "v1.3.0" # keep quotes"#);
    }

    #[test]
    fn test_key_line_single_quoted_with_escape() {
        let line = "note: 'it''s 1.0'";
        let parsed = KeyLine::parse(line).unwrap();
        assert_eq!(parsed.value(line), "it''s 1.0");
    }

    #[test]
    fn test_key_line_json_style() {
        let line = r#"    "image": "busybox:1.35","#;
        let parsed = KeyLine::parse(line).unwrap();
        assert_eq!(parsed.key, "image");
        assert_eq!(parsed.key_col, 4);
        assert_eq!(parsed.value(line), "busybox:1.35");

        let numeric = r#"  "replicas": 3,"#;
        let parsed = KeyLine::parse(numeric).unwrap();
        assert_eq!(parsed.value(numeric), "3");
        assert_eq!(parsed.splice(numeric, "4"), r#"  "replicas": 4,"#);
    }

    #[test]
    fn test_key_line_empty_value() {
        let line = "image:";
        let parsed = KeyLine::parse(line).unwrap();
        assert_eq!(parsed.value(line), "");

        let commented = "image: # set later";
        let parsed = KeyLine::parse(commented).unwrap();
        assert_eq!(parsed.value(commented), "");
    }

    #[test]
    fn test_key_line_hash_inside_value() {
        let line = "url: http://x/#anchor";
        let parsed = KeyLine::parse(line).unwrap();
        assert_eq!(parsed.value(line), "http://x/#anchor");
    }

    #[test]
    fn test_key_line_rejects_non_keys() {
        assert!(KeyLine::parse("- busybox:1.35").is_none());
        assert!(KeyLine::parse("# tag: 1.0").is_none());
        assert!(KeyLine::parse("just text").is_none());
        assert!(KeyLine::parse("{").is_none());
    }

    #[test]
    fn test_key_line_dotted_key() {
        let line = "  app.kubernetes.io/version: 1.0";
        assert_eq!(KeyLine::parse(line).unwrap().key, "app.kubernetes.io/version");
    }

    #[test]
    fn test_parse_key_filters() {
        assert!(KeyLine::parse_key("tag: 1", "tag").is_some());
        assert!(KeyLine::parse_key("tagline: 1", "tag").is_none());
    }

    #[test]
    fn test_splice_is_literal() {
        let line = "tag: 1.0";
        let parsed = KeyLine::parse(line).unwrap();
        assert_eq!(parsed.splice(line, "$1.2"), "tag: $1.2");
    }

    #[test]
    fn test_key_line_pattern_compiles_once() {
        assert!(KEY_LINE.is_some());
        let first = KEY_LINE.as_ref().map(|re| re as *const Regex);
        let again = KEY_LINE.as_ref().map(|re| re as *const Regex);
        assert_eq!(first, again);
    }

    #[test]
    fn test_splice_fills_empty_value() {
        let line = "  tag:";
        assert_eq!(KeyLine::parse(line).unwrap().splice(line, "1.0"), "  tag: 1.0");

        let line = "  tag: # set later";
        assert_eq!(
            KeyLine::parse(line).unwrap().splice(line, "1.0"),
            "  tag: 1.0 # set later"
        );

        let line = "  tag: \"\"";
        assert_eq!(KeyLine::parse(line).unwrap().splice(line, "1.0"), "  tag: \"1.0\"");
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"a/b\""), "a/b");
        assert_eq!(unquote("'x'"), "x");
        assert_eq!(unquote(" plain "), "plain");
        assert_eq!(unquote("\"half"), "\"half");
    }
}
