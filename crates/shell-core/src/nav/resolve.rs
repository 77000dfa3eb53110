//! Active path resolution
//!
//! Maps the current location to the nearest registered navigation entry by
//! walking up path segments, and answers whether a group's subtree holds the
//! active entry.

use std::collections::HashSet;
use url::Url;

use super::index::NavigationIndex;
use super::path::{normalize_path, parent_path, ROOT};

/// Resolve the active entry id for `location` by backtracking.
///
/// `/a/b/c` is tried first, then `/a/b`, `/a` and finally `/`. Resolution
/// stops at the root.
pub fn resolve_active(
    location: &str,
    index: &NavigationIndex,
    base: Option<&Url>,
) -> Option<String> {
    let normalized = normalize_path(location, base)?;
    let mut path = normalized.as_str();

    loop {
        if let Some(id) = index.id_for_path(path) {
            tracing::trace!(location, matched = path, id, "resolved active navigation entry");
            return Some(id.to_string());
        }
        if path == ROOT {
            return None;
        }
        path = parent_path(path);
    }
}

/// Whether `active` is a child of `group_id` or lies anywhere below it.
pub fn subtree_contains_active(
    index: &NavigationIndex,
    group_id: &str,
    active: Option<&str>,
) -> bool {
    let Some(active) = active.filter(|id| !id.is_empty()) else {
        return false;
    };

    let mut visited = HashSet::new();
    let mut stack = vec![group_id];
    while let Some(parent) = stack.pop() {
        if !visited.insert(parent) {
            continue;
        }
        for child in index.children(parent) {
            if child.id == active {
                return true;
            }
            if index.has_children(&child.id) {
                stack.push(child.id.as_str());
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NavigationEntry;

    fn index(entries: &[NavigationEntry]) -> NavigationIndex {
        NavigationIndex::build(entries, None)
    }

    #[test]
    fn backtracks_to_nearest_registered_ancestor() {
        let idx = index(&[
            NavigationEntry::new("A", "Root").with_href("/"),
            NavigationEntry::new("B", "Group"),
            NavigationEntry::new("C", "Deep").with_href("/a/b"),
        ]);

        assert_eq!(resolve_active("/a/b/c?x=1", &idx, None).as_deref(), Some("C"));
        assert_eq!(resolve_active("/a/b", &idx, None).as_deref(), Some("C"));
        assert_eq!(resolve_active("/a", &idx, None).as_deref(), Some("A"));
    }

    #[test]
    fn empty_location_matches_root_entry() {
        let idx = index(&[NavigationEntry::new("root", "Root").with_href("/")]);

        assert_eq!(resolve_active("", &idx, None).as_deref(), Some("root"));
        assert_eq!(resolve_active("?", &idx, None).as_deref(), Some("root"));
        assert_eq!(resolve_active("/", &idx, None).as_deref(), Some("root"));
    }

    #[test]
    fn unparseable_location_resolves_to_nothing() {
        let idx = index(&[NavigationEntry::new("root", "Root").with_href("/")]);

        assert_eq!(resolve_active("http://[::1", &idx, None), None);
    }

    #[test]
    fn no_root_entry_means_no_match() {
        let idx = index(&[NavigationEntry::new("x", "X").with_href("/x")]);

        assert_eq!(resolve_active("/y/z", &idx, None), None);
    }

    #[test]
    fn subtree_check_finds_direct_and_nested_children() {
        let idx = index(&[
            NavigationEntry::new("users", "Users"),
            NavigationEntry::new("users-details", "Details")
                .with_href("/users/details")
                .with_parent("users"),
            NavigationEntry::new("users-details-edit", "Edit")
                .with_href("/users/details/edit")
                .with_parent("users-details"),
            NavigationEntry::new("settings", "Settings"),
            NavigationEntry::new("settings-general", "General")
                .with_href("/settings/general")
                .with_parent("settings"),
        ]);

        assert!(subtree_contains_active(&idx, "users", Some("users-details")));
        assert!(subtree_contains_active(&idx, "users", Some("users-details-edit")));
        assert!(subtree_contains_active(&idx, "users-details", Some("users-details-edit")));
        assert!(!subtree_contains_active(&idx, "settings", Some("users-details-edit")));
        assert!(!subtree_contains_active(&idx, "users", None));
        assert!(!subtree_contains_active(&idx, "users", Some("")));
    }

    #[test]
    fn subtree_check_terminates_on_cyclic_index() {
        // Validation rejects cycles at set time; the index itself must still
        // be safe to walk.
        let idx = index(&[
            NavigationEntry::new("a", "A").with_parent("b"),
            NavigationEntry::new("b", "B").with_parent("a"),
        ]);

        assert!(!subtree_contains_active(&idx, "a", Some("zzz")));
        assert!(subtree_contains_active(&idx, "a", Some("b")));
    }
}
