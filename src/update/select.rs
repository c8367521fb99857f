use crate::update::index::Release;

/// Pick the release to install from the index candidates.
///
/// Candidates are sorted by version descending and walked in order: a
/// prerelease is skipped unless `preview` is set, in which case the first
/// candidate reached is taken outright, prerelease or not. Returns `None`
/// when the list is empty or every candidate was a skipped prerelease —
/// callers report that separately from "already on the selected version".
pub fn select_release(mut candidates: Vec<Release>, preview: bool) -> Option<Release> {
    candidates.sort_by(|a, b| b.version.cmp(&a.version));

    for candidate in candidates {
        if candidate.prerelease {
            if preview {
                return Some(candidate);
            }
            continue;
        }

        return Some(candidate);
    }

    None
}
