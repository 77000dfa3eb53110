//! Navigation
//!
//! Path normalization, the per-snapshot index, active-entry resolution and
//! the host that ties them to a [`LayoutRecord`](crate::state::LayoutRecord).

pub mod host;
pub mod index;
pub mod path;
pub mod resolve;
pub mod validate;

pub use host::{NavNode, NavigationHost};
pub use index::{NavigationIndex, ROOT_PARENT};
pub use path::{normalize_path, parent_path, ROOT};
pub use resolve::{resolve_active, subtree_contains_active};
pub use validate::validate_navigation;
