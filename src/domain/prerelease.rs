//! Pre-release labels and their precedence rules
//!
//! A label is everything after the first hyphen of a normalized version
//! (`beta.1` in `1.2.0-beta.1`). Labels order segment by segment, following
//! semver precedence rules but tolerant of
//! non-semver tags.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{BumpError, Result};

/// Well-known pre-release markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreReleaseMarker {
    Alpha,
    Beta,
    ReleaseCandidate,
    Next,
    Canary,
    Pre,
}

impl PreReleaseMarker {
    /// All recognised markers
    pub const ALL: [PreReleaseMarker; 6] = [
        PreReleaseMarker::Alpha,
        PreReleaseMarker::Beta,
        PreReleaseMarker::ReleaseCandidate,
        PreReleaseMarker::Next,
        PreReleaseMarker::Canary,
        PreReleaseMarker::Pre,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PreReleaseMarker::Alpha => "alpha",
            PreReleaseMarker::Beta => "beta",
            PreReleaseMarker::ReleaseCandidate => "rc",
            PreReleaseMarker::Next => "next",
            PreReleaseMarker::Canary => "canary",
            PreReleaseMarker::Pre => "pre",
        }
    }
}

impl FromStr for PreReleaseMarker {
    type Err = BumpError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.to_lowercase();
        PreReleaseMarker::ALL
            .iter()
            .copied()
            .find(|marker| marker.as_str() == lowered)
            .ok_or_else(|| BumpError::malformed(format!("unknown pre-release marker '{}'", s)))
    }
}

impl fmt::Display for PreReleaseMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static MARKER: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)-(alpha|beta|rc|next|canary|pre)\d*(?:[.+\-]|$)").ok());

/// Find the marker that makes `version` a pre-release, if any.
///
/// The marker must follow a hyphen and form its own delimited segment,
/// optionally followed by digits (`-rc1`). `1.0.0-preview` is not a
/// pre-release; `1.0.0-pre.2` is.
pub fn detect_marker(version: &str) -> Option<PreReleaseMarker> {
    let captures = MARKER.as_ref()?.captures(version)?;
    captures.get(1)?.as_str().parse().ok()
}

/// One dot-separated piece of a pre-release label
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Numeric(u64),
    Text(&'a str),
}

impl<'a> Segment<'a> {
    fn parse(raw: &'a str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            // Digit runs too long for u64 saturate; they still sort after smaller numbers.
            Segment::Numeric(raw.parse().unwrap_or(u64::MAX))
        } else {
            Segment::Text(raw)
        }
    }
}

impl Ord for Segment<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Segment::Numeric(a), Segment::Numeric(b)) => a.cmp(b),
            (Segment::Numeric(_), Segment::Text(_)) => Ordering::Less,
            (Segment::Text(_), Segment::Numeric(_)) => Ordering::Greater,
            (Segment::Text(a), Segment::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Segment<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two non-empty pre-release labels segment by segment.
///
/// The label that runs out of segments first is the lesser one.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    let left = a.split('.').map(Segment::parse);
    let right = b.split('.').map(Segment::parse);
    left.cmp(right)
}
