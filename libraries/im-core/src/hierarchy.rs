//! Materialized path arithmetic for the group tree
//!
//! A group path is the dot separated list of ancestor ids ending in the
//! group's own id. Nothing here touches storage.

/// Separator between path segments
pub const PATH_SEP: char = '.';

pub fn compute_path(parent_path: &str, self_id: &str) -> String {
    if parent_path.is_empty() {
        self_id.to_string()
    } else {
        format!("{parent_path}{PATH_SEP}{self_id}")
    }
}

/// Number of segments, 0 for an empty path
pub fn compute_depth(path: &str) -> i64 {
    if path.is_empty() {
        0
    } else {
        path.split(PATH_SEP).count() as i64
    }
}

/// Every segment of `path` other than `self_id`
pub fn resolve_ancestor_ids(path: &str, self_id: &str) -> Vec<String> {
    path.split(PATH_SEP)
        .filter(|s| !s.is_empty() && *s != self_id)
        .map(str::to_string)
        .collect()
}

/// Whether `ancestor_id` is a whole segment of `candidate_path`
pub fn is_descendant(candidate_path: &str, ancestor_id: &str) -> bool {
    !ancestor_id.is_empty() && candidate_path.split(PATH_SEP).any(|s| s == ancestor_id)
}

/// Rewrite a descendant path after the subtree root moved from `old_prefix` to `new_prefix`
///
/// Returns `None` when `path` is not inside the subtree rooted at `old_prefix`.
pub fn rebase_path(path: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    if path == old_prefix {
        return Some(new_prefix.to_string());
    }
    let rest = path.strip_prefix(old_prefix)?.strip_prefix(PATH_SEP)?;
    Some(compute_path(new_prefix, rest))
}
