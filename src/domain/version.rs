use std::cmp::Ordering;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::prerelease::{self, PreReleaseMarker};

/// Canonical form of a version tag
///
/// Holds the text left after registry prefixes and a leading `v` are
/// stripped (`myrepo/app:v1.2.0-beta.1` -> `1.2.0-beta.1`). Numeric
/// versions compare with [`compare`], so `1.2` equals `1.2.0`. A version
/// without a numeric core (`latest`, `nightly`) only equals the same text.
#[derive(Debug, Clone)]
pub struct NormalizedVersion(String);

impl NormalizedVersion {
    /// Normalize a raw tag; see [`normalize`]
    pub fn parse(raw: &str) -> Option<Self> {
        normalize(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Text before the first hyphen
    pub fn core(&self) -> &str {
        split_core(&self.0).0
    }

    /// Text after the first hyphen, if any
    pub fn prerelease(&self) -> Option<&str> {
        split_core(&self.0).1
    }

    /// Integer components of the core; non-numeric components read as 0
    pub fn core_components(&self) -> Vec<u64> {
        core_components(self.core())
    }

    pub fn is_prerelease(&self) -> bool {
        is_prerelease(&self.0)
    }

    /// True if the core starts with a digit (`1.2`, `10`), false for `latest`
    pub fn has_numeric_core(&self) -> bool {
        self.core().starts_with(|c: char| c.is_ascii_digit())
    }

    pub fn prerelease_marker(&self) -> Option<PreReleaseMarker> {
        prerelease::detect_marker(&self.0)
    }
}

impl PartialEq for NormalizedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NormalizedVersion {}

impl PartialOrd for NormalizedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NormalizedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let ordering = compare(&self.0, &other.0);
        if ordering == Ordering::Equal && !(self.has_numeric_core() && other.has_numeric_core()) {
            // Non-numeric cores all read as 0; fall back to the text.
            return self.0.cmp(&other.0);
        }
        ordering
    }
}

impl fmt::Display for NormalizedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static DOTTED_RUN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)+").ok());

/// Normalize a raw version string.
///
/// If the input contains a dotted number run (`1.2`, `10.0.3`), everything
/// from the start of that run onward is kept. Otherwise a single leading `v`
/// is removed. Empty input (or a bare `v`) yields `None`.
///
/// # Example
/// ```
/// use version_bump::domain::version::normalize;
///
/// assert_eq!(normalize("myrepo/app:1.0.0").unwrap().as_str(), "1.0.0");
/// assert_eq!(normalize("v1.2.0-beta.1").unwrap().as_str(), "1.2.0-beta.1");
/// assert_eq!(normalize("vlatest").unwrap().as_str(), "latest");
/// assert!(normalize("").is_none());
/// ```
pub fn normalize(raw: &str) -> Option<NormalizedVersion> {
    if raw.is_empty() {
        return None;
    }

    let dotted = DOTTED_RUN
        .as_ref()
        .and_then(|re| re.find(raw).map(|m| m.start()));

    let normalized = match dotted {
        Some(start) => &raw[start..],
        None => raw.strip_prefix('v').unwrap_or(raw),
    };

    if normalized.is_empty() {
        None
    } else {
        Some(NormalizedVersion(normalized.to_string()))
    }
}

/// True if a normalized version carries a recognised pre-release marker
pub fn is_prerelease(version: &str) -> bool {
    prerelease::detect_marker(version).is_some()
}

fn split_core(version: &str) -> (&str, Option<&str>) {
    match version.split_once('-') {
        Some((core, label)) => (core, Some(label)),
        None => (version, None),
    }
}

fn core_components(core: &str) -> Vec<u64> {
    core.split('.')
        .map(|component| {
            let digits: &str = component
                .find(|c: char| !c.is_ascii_digit())
                .map_or(component, |end| &component[..end]);
            digits.parse().unwrap_or(0)
        })
        .collect()
}

/// Total ordering over normalized version text.
///
/// Cores compare component-wise with missing components read as `0`. With
/// equal cores a release beats any pre-release, and two pre-release labels
/// compare segment by segment.
pub fn compare(a: &str, b: &str) -> Ordering {
    let (core_a, label_a) = split_core(a);
    let (core_b, label_b) = split_core(b);

    let components_a = core_components(core_a);
    let components_b = core_components(core_b);
    let width = components_a.len().max(components_b.len());

    for index in 0..width {
        let left = components_a.get(index).copied().unwrap_or(0);
        let right = components_b.get(index).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => continue,
            decided => return decided,
        }
    }

    // An empty label after a trailing hyphen counts as no label.
    let label_a = label_a.filter(|label| !label.is_empty());
    let label_b = label_b.filter(|label| !label.is_empty());

    match (label_a, label_b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => prerelease::compare_labels(left, right),
    }
}

/// Granularity used when grouping versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Major,
    #[default]
    Minor,
    Patch,
}

impl Granularity {
    /// Number of leading core components that identify a group
    pub fn width(&self) -> usize {
        match self {
            Granularity::Major => 1,
            Granularity::Minor => 2,
            Granularity::Patch => 3,
        }
    }

    /// Group key of a version at this granularity, padded with zeros
    pub fn group_key(&self, version: &NormalizedVersion) -> Vec<u64> {
        let components = version.core_components();
        (0..self.width())
            .map(|index| components.get(index).copied().unwrap_or(0))
            .collect()
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Major => write!(f, "major"),
            Granularity::Minor => write!(f, "minor"),
            Granularity::Patch => write!(f, "patch"),
        }
    }
}
