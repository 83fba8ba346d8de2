use std::cmp::Ordering;

use tracing::debug;

use crate::domain::{compare, normalize, Release};

/// Releases strictly newer than `current_version`, newest first.
///
/// Walks `releases` (newest to oldest) and stops at the first release whose
/// tag equals the current version (numerically for numeric versions, by
/// text otherwise), or once `max_count` releases have been
/// collected. If `current_version` does not normalize, only the count bound
/// applies.
pub fn select_relevant(releases: &[Release], current_version: &str, max_count: usize) -> Vec<Release> {
    let current = normalize(current_version);
    if current.is_none() {
        debug!(current_version, "current version does not normalize; only the count bound applies");
    }

    let mut selected = Vec::new();
    for release in releases {
        if selected.len() >= max_count {
            break;
        }
        if let (Some(current), Some(version)) = (current.as_ref(), release.version()) {
            if version == *current {
                break;
            }
        }
        selected.push(release.clone());
    }
    selected
}

/// Drop releases whose tag carries a pre-release marker
pub fn filter_stable(releases: &[Release]) -> Vec<Release> {
    releases
        .iter()
        .filter(|release| !release.is_prerelease())
        .cloned()
        .collect()
}

/// Sort an unordered release list newest first.
///
/// Releases whose tags do not normalize sort last, in their original order.
pub fn sort_newest_first(releases: &mut [Release]) {
    releases.sort_by(|a, b| match (a.version(), b.version()) {
        (Some(left), Some(right)) => compare(right.as_str(), left.as_str()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
