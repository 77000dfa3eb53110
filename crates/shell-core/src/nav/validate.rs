//! Navigation snapshot validation
//!
//! A snapshot must form a forest: ids are unique and following `parent_id`
//! links from any entry never revisits an entry. Parents that name no entry
//! are allowed; such entries are simply unreachable from the roots.

use std::collections::{HashMap, HashSet};

use crate::errors::{LayoutError, LayoutResult};
use crate::types::NavigationEntry;

/// Check that `entries` form a forest.
pub fn validate_navigation(entries: &[NavigationEntry]) -> LayoutResult<()> {
    let mut parents: HashMap<&str, &str> = HashMap::with_capacity(entries.len());
    for entry in entries {
        if parents.insert(entry.id.as_str(), entry.parent_key()).is_some() {
            return Err(LayoutError::invalid_argument(
                "items",
                format!("duplicate navigation id `{}`", entry.id),
            ));
        }
    }

    // Ids already proven to reach a root (or a dangling parent).
    let mut acyclic: HashSet<&str> = HashSet::with_capacity(entries.len());
    for entry in entries {
        let mut chain: HashSet<&str> = HashSet::new();
        let mut current = entry.id.as_str();
        loop {
            if acyclic.contains(current) {
                break;
            }
            if !chain.insert(current) {
                return Err(LayoutError::invalid_argument(
                    "items",
                    format!("navigation id `{}` leads into a parent cycle", entry.id),
                ));
            }
            match parents.get(current) {
                Some(&parent) if !parent.is_empty() => current = parent,
                _ => break,
            }
        }
        acyclic.extend(chain);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn accepts_forest_and_dangling_parent() {
        let entries = vec![
            NavigationEntry::new("a", "A"),
            NavigationEntry::new("b", "B").with_parent("a"),
            NavigationEntry::new("c", "C").with_parent("b"),
            NavigationEntry::new("orphan", "Orphan").with_parent("missing"),
        ];

        assert!(validate_navigation(&entries).is_ok());
        assert!(validate_navigation(&[]).is_ok());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let entries = vec![NavigationEntry::new("a", "A"), NavigationEntry::new("a", "Again")];

        assert_matches!(
            validate_navigation(&entries),
            Err(LayoutError::InvalidArgument { name, .. }) if name == "items"
        );
    }

    #[test]
    fn rejects_self_parent() {
        let entries = vec![NavigationEntry::new("a", "A").with_parent("a")];

        assert!(validate_navigation(&entries).is_err());
    }

    #[test]
    fn rejects_longer_cycle() {
        let entries = vec![
            NavigationEntry::new("root", "Root"),
            NavigationEntry::new("a", "A").with_parent("c"),
            NavigationEntry::new("b", "B").with_parent("a"),
            NavigationEntry::new("c", "C").with_parent("b"),
        ];

        let err = validate_navigation(&entries).unwrap_err();
        assert!(err.to_string().contains("parent cycle"));
    }
}
