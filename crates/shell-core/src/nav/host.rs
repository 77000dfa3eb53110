//! Navigation host
//!
//! Non-rendering side of a navigation view: keeps a [`NavigationIndex`] in
//! step with the record, tracks the current location and produces a
//! renderable [`NavNode`] forest.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Weak};
use url::Url;

use super::index::{NavigationIndex, ROOT_PARENT};
use super::resolve::{resolve_active, subtree_contains_active};
use crate::notify::Subscription;
use crate::state::LayoutRecord;

/// One node of the rendered navigation forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavNode {
    /// Entry with children
    Group {
        /// Entry id
        id: String,
        /// Display text
        text: String,
        /// Icon name
        icon: Option<String>,
        /// Whether the active entry lies below this group
        expanded: bool,
        /// Rendered children, in display order
        children: Vec<NavNode>,
    },
    /// Childless entry with a target
    Link {
        /// Entry id
        id: String,
        /// Display text
        text: String,
        /// Target as given by the entry
        href: String,
        /// Icon name
        icon: Option<String>,
        /// Whether this is the active entry
        active: bool,
    },
}

impl NavNode {
    /// Entry id of the node.
    pub fn id(&self) -> &str {
        match self {
            NavNode::Group { id, .. } | NavNode::Link { id, .. } => id,
        }
    }
}

struct HostView {
    index: NavigationIndex,
    location: String,
    active: Option<String>,
    revision: u64,
}

struct HostShared {
    record: LayoutRecord,
    base: Option<Url>,
    view: Mutex<HostView>,
}

impl HostShared {
    fn rebuild(&self) {
        let navigation = self.record.navigation();
        let index = NavigationIndex::build(&navigation, self.base.as_ref());
        let mut view = self.view.lock();
        view.active = resolve_active(&view.location, &index, self.base.as_ref());
        view.index = index;
        view.revision += 1;
    }
}

/// Keeps navigation expansion and active state for one view.
///
/// Dropping the host unsubscribes it from the record.
pub struct NavigationHost {
    shared: Arc<HostShared>,
    _subscription: Subscription,
}

impl NavigationHost {
    /// Attach to `record`, resolving locations against `base`.
    ///
    /// The initial location is the root.
    pub fn attach(record: &LayoutRecord, base: Option<Url>) -> Self {
        let shared = Arc::new(HostShared {
            record: record.clone(),
            base,
            view: Mutex::new(HostView {
                index: NavigationIndex::default(),
                location: String::new(),
                active: None,
                revision: 0,
            }),
        });
        shared.rebuild();

        let weak: Weak<HostShared> = Arc::downgrade(&shared);
        let subscription = record.subscribe_changed(move || {
            if let Some(shared) = weak.upgrade() {
                shared.rebuild();
            }
        });

        Self {
            shared,
            _subscription: subscription,
        }
    }

    /// Record a navigation event and re-resolve the active entry.
    pub fn set_location(&self, location: impl Into<String>) {
        let location = location.into();
        let mut view = self.shared.view.lock();
        view.active = resolve_active(&location, &view.index, self.shared.base.as_ref());
        view.location = location;
        view.revision += 1;
    }

    /// Last location passed to [`set_location`](Self::set_location).
    pub fn location(&self) -> String {
        self.shared.view.lock().location.clone()
    }

    /// Id of the active entry, if any.
    pub fn active_id(&self) -> Option<String> {
        self.shared.view.lock().active.clone()
    }

    /// Counter bumped whenever the rendered tree may have changed.
    pub fn revision(&self) -> u64 {
        self.shared.view.lock().revision
    }

    /// Whether the active entry lies below `group_id`.
    pub fn is_expanded(&self, group_id: &str) -> bool {
        let view = self.shared.view.lock();
        subtree_contains_active(&view.index, group_id, view.active.as_deref())
    }

    /// Renderable navigation forest.
    pub fn tree(&self) -> Vec<NavNode> {
        let view = self.shared.view.lock();
        let mut visited = HashSet::new();
        render_level(&view, ROOT_PARENT, &mut visited)
    }
}

fn render_level<'a>(
    view: &'a HostView,
    parent_id: &str,
    visited: &mut HashSet<&'a str>,
) -> Vec<NavNode> {
    let mut nodes = Vec::new();
    for entry in view.index.children(parent_id) {
        if !visited.insert(entry.id.as_str()) {
            continue;
        }
        if view.index.has_children(&entry.id) {
            nodes.push(NavNode::Group {
                id: entry.id.clone(),
                text: entry.text.clone(),
                icon: entry.icon.clone(),
                expanded: subtree_contains_active(&view.index, &entry.id, view.active.as_deref()),
                children: render_level(view, &entry.id, visited),
            });
        } else if let Some(href) = entry.href.as_ref().filter(|_| entry.has_href()) {
            nodes.push(NavNode::Link {
                id: entry.id.clone(),
                text: entry.text.clone(),
                href: href.clone(),
                icon: entry.icon.clone(),
                active: view.active.as_deref() == Some(entry.id.as_str()),
            });
        }
    }
    nodes
}

impl fmt::Debug for NavigationHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.shared.view.lock();
        f.debug_struct("NavigationHost")
            .field("location", &view.location)
            .field("active", &view.active)
            .field("revision", &view.revision)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NavigationEntry;

    fn sample_record() -> LayoutRecord {
        let record = LayoutRecord::new();
        record
            .set_navigation(vec![
                NavigationEntry::new("home", "Home").with_href("/").with_order(0),
                NavigationEntry::new("users", "Users").with_icon("people").with_order(1),
                NavigationEntry::new("users-list", "List")
                    .with_href("/users")
                    .with_parent("users"),
                NavigationEntry::new("users-create", "Create")
                    .with_href("/users/create")
                    .with_parent("users")
                    .with_order(1),
                NavigationEntry::new("placeholder", "Soon").with_order(2),
            ])
            .expect("valid navigation");
        record
    }

    #[test]
    fn tree_omits_childless_entries_without_href() {
        let record = sample_record();
        let host = NavigationHost::attach(&record, None);

        let ids: Vec<_> = host.tree().iter().map(|n| n.id().to_string()).collect();
        assert_eq!(ids, vec!["home", "users"]);
    }

    #[test]
    fn group_expands_for_active_child() {
        let record = sample_record();
        let host = NavigationHost::attach(&record, None);

        host.set_location("/users/create/step-2?draft=1");

        assert_eq!(host.location(), "/users/create/step-2?draft=1");
        assert_eq!(host.active_id().as_deref(), Some("users-create"));
        assert!(host.is_expanded("users"));
        match &host.tree()[1] {
            NavNode::Group {
                expanded, children, ..
            } => {
                assert!(*expanded);
                assert_eq!(
                    children[1],
                    NavNode::Link {
                        id: "users-create".into(),
                        text: "Create".into(),
                        href: "/users/create".into(),
                        icon: None,
                        active: true,
                    }
                );
            }
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn root_location_collapses_groups() {
        let record = sample_record();
        let host = NavigationHost::attach(&record, None);

        host.set_location("/");

        assert_eq!(host.active_id().as_deref(), Some("home"));
        assert!(!host.is_expanded("users"));
    }

    #[test]
    fn rebuilds_when_navigation_changes() {
        let record = sample_record();
        let host = NavigationHost::attach(&record, None);
        host.set_location("/reports/daily");
        assert_eq!(host.active_id().as_deref(), Some("home"));
        let before = host.revision();

        record
            .set_navigation(vec![NavigationEntry::new("reports", "Reports").with_href("/reports")])
            .expect("valid navigation");

        assert_eq!(host.active_id().as_deref(), Some("reports"));
        assert!(host.revision() > before);
    }

    #[test]
    fn dropping_host_unsubscribes() {
        let record = sample_record();
        let baseline = record.bus().listener_count();

        let host = NavigationHost::attach(&record, None);
        assert_eq!(record.bus().listener_count(), baseline + 1);

        drop(host);
        assert_eq!(record.bus().listener_count(), baseline);
    }
}
