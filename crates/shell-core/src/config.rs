//! Layout configuration
//!
//! Declarative layout content loaded from TOML:
//!
//! ```toml
//! theme = "Light"
//!
//! [header]
//! title = "Console"
//! subtitle = "Administration"
//!
//! [footer]
//! left = "v1.2.0"
//!
//! [[navigation]]
//! id = "home"
//! text = "Home"
//! href = "/"
//! ```
//!
//! A missing `[header]` table uses the default title; a `[header]` table
//! without `title` is rejected.

use futures::future::{self, Ready};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{LayoutError, LayoutResult};
use crate::nav::validate_navigation;
use crate::state::{LayoutRecord, DEFAULT_TITLE};
use crate::types::{NavigationEntry, ProfileMenuEntry, ThemeMode};

/// `[header]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderConfig {
    /// Header title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Header subtitle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            title: Some(DEFAULT_TITLE.to_string()),
            subtitle: None,
        }
    }
}

/// `[footer]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterConfig {
    /// Left footer text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    /// Center footer text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<String>,
    /// Right footer text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
}

/// `[profile]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Display name of the signed-in user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Avatar URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Complete layout configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Initial theme mode; the record keeps its current mode when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeMode>,
    /// Initial sidebar state; the record keeps its current state when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidebar_open: Option<bool>,
    /// Header texts
    pub header: HeaderConfig,
    /// Footer texts
    pub footer: FooterConfig,
    /// Profile fields
    pub profile: ProfileConfig,
    /// Navigation entries
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub navigation: Vec<NavigationEntry>,
    /// Profile menu entries
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub profile_menu: Vec<ProfileMenuEntry>,
}

impl LayoutConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> LayoutResult<Self> {
        toml::from_str(content)
            .map_err(|e| LayoutError::config(format!("invalid layout TOML: {e}")))
    }

    /// Load and parse a TOML file.
    pub fn load_from_file(path: &Path) -> LayoutResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LayoutError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> LayoutResult<String> {
        toml::to_string(self).map_err(|e| LayoutError::config(format!("cannot encode layout: {e}")))
    }

    /// Check the configuration without touching any record.
    pub fn validate(&self) -> LayoutResult<()> {
        if self.header.title.is_none() {
            return Err(LayoutError::invalid_argument(
                "title",
                "[header] is present but has no title",
            ));
        }
        validate_navigation(&self.navigation)
    }

    /// Validate, then write every configured value into `record`.
    pub fn apply(&self, record: &LayoutRecord) -> LayoutResult<()> {
        self.validate()?;

        let title = self.header.title.as_deref().unwrap_or(DEFAULT_TITLE);
        record.set_header(title, self.header.subtitle.as_deref());
        record.set_footer(
            self.footer.left.as_deref(),
            self.footer.center.as_deref(),
            self.footer.right.as_deref(),
        );
        record.set_profile(
            self.profile.display_name.as_deref(),
            self.profile.image_url.as_deref(),
        );
        record.set_navigation(self.navigation.iter().cloned())?;
        record.set_profile_menu(self.profile_menu.iter().cloned());
        if let Some(mode) = self.theme {
            record.set_theme_mode(mode);
        }
        if let Some(open) = self.sidebar_open {
            record.set_sidebar_open(open);
        }

        tracing::debug!(
            navigation = self.navigation.len(),
            profile_menu = self.profile_menu.len(),
            "applied layout configuration"
        );
        Ok(())
    }

    /// Setup hook applying this configuration on every attempt.
    pub fn into_setup(
        self,
    ) -> impl Fn(LayoutRecord) -> Ready<LayoutResult<()>> + Send + Sync + 'static {
        move |record| future::ready(self.apply(&record))
    }
}
