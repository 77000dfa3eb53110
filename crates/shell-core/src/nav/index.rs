//! Navigation index
//!
//! Derived lookups over a navigation snapshot, rebuilt wholesale whenever the
//! snapshot changes.

use std::collections::HashMap;
use url::Url;

use super::path::{normalize_path, path_key};
use crate::types::NavigationEntry;

/// Parent key of root entries.
pub const ROOT_PARENT: &str = "";

/// Children-by-parent and id-by-path lookups for one navigation snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationIndex {
    children: HashMap<String, Vec<NavigationEntry>>,
    href_to_id: HashMap<String, String>,
}

impl NavigationIndex {
    /// Build the index for `entries`.
    ///
    /// Children keep snapshot order among equal `order` values. Href keys are
    /// normalized against `base`; on a collision the earlier entry keeps the
    /// path.
    pub fn build(entries: &[NavigationEntry], base: Option<&Url>) -> Self {
        let mut children: HashMap<String, Vec<NavigationEntry>> = HashMap::new();
        for entry in entries {
            children
                .entry(entry.parent_key().to_string())
                .or_default()
                .push(entry.clone());
        }
        for siblings in children.values_mut() {
            // sort_by_key is stable
            siblings.sort_by_key(|entry| entry.order);
        }

        let mut href_to_id = HashMap::new();
        for entry in entries.iter().filter(|entry| entry.has_href()) {
            let Some(path) = entry
                .href
                .as_deref()
                .and_then(|href| normalize_path(href, base))
            else {
                continue;
            };
            let key = path_key(&path);
            if let Some(existing) = href_to_id.get(&key) {
                tracing::warn!(
                    path = %path,
                    kept = %existing,
                    ignored = %entry.id,
                    "duplicate navigation href"
                );
                continue;
            }
            href_to_id.insert(key, entry.id.clone());
        }

        Self {
            children,
            href_to_id,
        }
    }

    /// Ordered children of `parent_id` (`""` for roots).
    pub fn children(&self, parent_id: &str) -> &[NavigationEntry] {
        self.children
            .get(parent_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Ordered root entries.
    pub fn roots(&self) -> &[NavigationEntry] {
        self.children(ROOT_PARENT)
    }

    /// Whether `id` has at least one child.
    pub fn has_children(&self, id: &str) -> bool {
        self.children.contains_key(id)
    }

    /// Entry id registered for an already normalized path.
    pub fn id_for_path(&self, normalized: &str) -> Option<&str> {
        self.href_to_id
            .get(&path_key(normalized))
            .map(String::as_str)
    }

    /// Number of registered hrefs.
    pub fn href_count(&self) -> usize {
        self.href_to_id.len()
    }

    /// Whether the index holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, parent: Option<&str>, order: i32) -> NavigationEntry {
        let entry = NavigationEntry::new(id, id.to_uppercase()).with_order(order);
        match parent {
            Some(parent) => entry.with_parent(parent),
            None => entry,
        }
    }

    #[test]
    fn groups_children_by_parent_sorted_by_order() {
        let entries = vec![
            entry("settings", None, 20),
            entry("dashboard", None, 0),
            entry("users", None, 10),
            entry("users-create", Some("users"), 10),
            entry("users-list", Some("users"), 0),
        ];

        let index = NavigationIndex::build(&entries, None);

        let roots: Vec<&str> = index.roots().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(roots, vec!["dashboard", "users", "settings"]);
        let users: Vec<&str> = index.children("users").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(users, vec!["users-list", "users-create"]);
        assert!(index.has_children("users"));
        assert!(!index.has_children("dashboard"));
        assert!(index.children("missing").is_empty());
    }

    #[test]
    fn equal_order_keeps_snapshot_sequence() {
        let entries = vec![entry("b", None, 1), entry("a", None, 1), entry("c", None, 0)];

        let index = NavigationIndex::build(&entries, None);

        let roots: Vec<&str> = index.roots().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(roots, vec!["c", "b", "a"]);
    }

    #[test]
    fn blank_parent_counts_as_root() {
        let entries = vec![entry("a", Some(""), 0), entry("b", Some("   "), 1)];

        let index = NavigationIndex::build(&entries, None);

        assert_eq!(index.roots().len(), 2);
    }

    #[test]
    fn href_map_uses_normalized_paths() {
        let entries = vec![
            NavigationEntry::new("home", "Home").with_href("/"),
            NavigationEntry::new("group", "Group"),
            NavigationEntry::new("blank", "Blank").with_href("  "),
            NavigationEntry::new("users", "Users").with_href("/Users/?tab=all"),
        ];

        let index = NavigationIndex::build(&entries, None);

        assert_eq!(index.href_count(), 2);
        assert_eq!(index.id_for_path("/"), Some("home"));
        assert_eq!(index.id_for_path("/users"), Some("users"));
        assert_eq!(index.id_for_path("/USERS"), Some("users"));
    }

    #[test]
    fn duplicate_href_keeps_first_entry() {
        let entries = vec![
            NavigationEntry::new("first", "First").with_href("/a"),
            NavigationEntry::new("second", "Second").with_href("/a/"),
        ];

        let index = NavigationIndex::build(&entries, None);

        assert_eq!(index.id_for_path("/a"), Some("first"));
    }
}
