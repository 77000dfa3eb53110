//! Layout data types
//!
//! Navigation entries, profile menu entries and the theme mode. Entries are
//! plain immutable values; the record stores them as shared snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Navigation
// ============================================================================

/// An item displayed inside the navigation bar or sidebar.
///
/// Entries form a forest through `parent_id`. An entry without a parent (or
/// with a blank one) is a root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavigationEntry {
    /// Unique identifier within one navigation snapshot
    pub id: String,
    /// Label shown for the entry
    pub text: String,
    /// Target location; groups usually have none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Icon name rendered next to the label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Identifier of the parent entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Sort key among siblings
    #[serde(default)]
    pub order: i32,
}

impl NavigationEntry {
    /// Create a root entry with no link, icon or ordering.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            href: None,
            icon: None,
            parent_id: None,
            order: 0,
        }
    }

    /// Set the target location.
    #[must_use]
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    /// Set the icon name.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Attach the entry under `parent_id`.
    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Set the sort key.
    #[must_use]
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Parent key used by the navigation index: `""` for roots.
    pub fn parent_key(&self) -> &str {
        match self.parent_id.as_deref() {
            Some(parent) if !parent.trim().is_empty() => parent,
            _ => "",
        }
    }

    /// Whether the entry has a non-blank href.
    pub fn has_href(&self) -> bool {
        self.href
            .as_deref()
            .is_some_and(|href| !href.trim().is_empty())
    }
}

// ============================================================================
// Profile Menu
// ============================================================================

/// An action offered in the user's profile menu.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileMenuEntry {
    /// Identifier of the menu item
    pub id: String,
    /// Label shown for the menu item
    pub text: String,
    /// Icon name rendered next to the label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Sort key
    #[serde(default)]
    pub order: i32,
}

impl ProfileMenuEntry {
    /// Create a menu entry without icon or ordering.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            icon: None,
            order: 0,
        }
    }

    /// Set the icon name.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the sort key.
    #[must_use]
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}

// ============================================================================
// Theme
// ============================================================================

/// Theme modes supported by the shell.
///
/// Ordinals are fixed; persisted forms use the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ThemeMode {
    /// Follow the operating system preference
    System = 0,
    /// Force the light theme
    Light = 1,
    /// Force the dark theme
    #[default]
    Dark = 2,
}

impl ThemeMode {
    /// All modes in ordinal order.
    pub const ALL: [ThemeMode; 3] = [ThemeMode::System, ThemeMode::Light, ThemeMode::Dark];

    /// Fixed ordinal of this mode.
    pub fn as_ordinal(self) -> u8 {
        self as u8
    }

    /// Mode for a fixed ordinal.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(Self::System),
            1 => Some(Self::Light),
            2 => Some(Self::Dark),
            _ => None,
        }
    }

    /// Next mode of the toggle cycle `System → Light → Dark → System`.
    pub fn next(self) -> Self {
        match self {
            Self::System => Self::Light,
            Self::Light => Self::Dark,
            Self::Dark => Self::System,
        }
    }

    /// Symbolic name used for persistence.
    pub fn name(self) -> &'static str {
        match self {
            Self::System => "System",
            Self::Light => "Light",
            Self::Dark => "Dark",
        }
    }

    /// Human-readable label for theme pickers.
    pub fn label(self) -> &'static str {
        match self {
            Self::System => "System Theme",
            Self::Light => "Light Theme",
            Self::Dark => "Dark Theme",
        }
    }

    /// Whether the dark palette applies, given the platform preference used
    /// by [`ThemeMode::System`].
    pub fn is_dark(self, system_prefers_dark: bool) -> bool {
        match self {
            Self::Light => false,
            Self::Dark => true,
            Self::System => system_prefers_dark,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a theme name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme mode `{0}`")]
pub struct ParseThemeModeError(pub String);

impl FromStr for ThemeMode {
    type Err = ParseThemeModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseThemeModeError(s.to_string()))
    }
}
