use crate::domain::{Granularity, Release};

/// Keep only the version group `lag_count` steps behind the newest.
///
/// Releases are grouped by the leading core components for `granularity`
/// (`minor` groups `1.10.0` and `1.10.2` together). Groups are ordered by
/// first appearance, so with newest-first input group 0 is the newest.
/// If there is no group at `lag_count` the input is returned unfiltered.
pub fn apply_lag(releases: &[Release], lag_count: usize, granularity: Granularity) -> Vec<Release> {
    let keyed: Vec<(Option<Vec<u64>>, &Release)> = releases
        .iter()
        .map(|release| (release.version().map(|v| granularity.group_key(&v)), release))
        .collect();

    let mut groups: Vec<&Vec<u64>> = Vec::new();
    for key in keyed.iter().filter_map(|(key, _)| key.as_ref()) {
        if !groups.contains(&key) {
            groups.push(key);
        }
    }

    let Some(wanted) = groups.get(lag_count) else {
        return releases.to_vec();
    };

    keyed
        .iter()
        .filter(|(key, _)| key.as_ref() == Some(*wanted))
        .map(|(_, release)| (*release).clone())
        .collect()
}
