//! # Shell Store - File-backed preferences
//!
//! [`JsonPreferenceStore`] keeps the theme and sidebar preferences in one JSON
//! object file:
//!
//! ```json
//! { "shell.ui.themeMode": "Light", "shell.ui.sidebarOpen": false }
//! ```
//!
//! Keys carry a configurable prefix so several shells can share one file.
//! Values that cannot be interpreted read as absent; a file that is not a JSON
//! object is a [`StoreError::Serialization`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use serde_json::{Map, Value};
use shell_core::{SidebarStateStore, StoreError, ThemeMode, ThemeModeStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Default key prefix.
pub const DEFAULT_PREFIX: &str = "shell.ui.";

/// Key suffix of the theme mode.
pub const THEME_MODE_KEY: &str = "themeMode";

/// Key suffix of the sidebar flag.
pub const SIDEBAR_OPEN_KEY: &str = "sidebarOpen";

/// Directory under the user config dir used by [`StoreConfig::default_location`].
pub const APP_DIR: &str = "shell-ui";

/// File name used by [`StoreConfig::default_location`].
pub const FILE_NAME: &str = "preferences.json";

/// Configuration for a [`JsonPreferenceStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Path to the preference file
    pub path: PathBuf,
    /// Prefix of every key written by the store
    pub prefix: String,
}

impl StoreConfig {
    /// Config for `path` with the default prefix.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    /// Replace the key prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// `<config dir>/shell-ui/preferences.json`.
    pub fn default_location() -> Result<Self, StoreError> {
        let dir = dirs::config_dir()
            .ok_or_else(|| StoreError::unavailable("no user configuration directory"))?;
        Ok(Self::new(dir.join(APP_DIR).join(FILE_NAME)))
    }

    /// Full theme key.
    pub fn theme_key(&self) -> String {
        format!("{}{THEME_MODE_KEY}", self.prefix)
    }

    /// Full sidebar key.
    pub fn sidebar_key(&self) -> String {
        format!("{}{SIDEBAR_OPEN_KEY}", self.prefix)
    }
}

/// Theme and sidebar preferences in a JSON file.
///
/// Writes are serialized and replace the file through a temporary sibling, so
/// readers see either the old or the new content.
#[derive(Debug)]
pub struct JsonPreferenceStore {
    config: StoreConfig,
    write_lock: async_lock::Mutex<()>,
}

impl JsonPreferenceStore {
    /// Store using `config`.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            write_lock: async_lock::Mutex::new(()),
        }
    }

    /// Store at the default location.
    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Self::new(StoreConfig::default_location()?))
    }

    /// Configuration in use.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    async fn read_map(&self) -> Result<Map<String, Value>, StoreError> {
        let bytes = match fs::read(&self.config.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => {
                return Err(StoreError::io(format!(
                    "failed to read {}: {err}",
                    self.config.path.display()
                )))
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StoreError::serialization(format!(
                "{} does not hold a JSON object",
                self.config.path.display()
            ))),
            Err(err) => Err(StoreError::serialization(format!(
                "invalid JSON in {}: {err}",
                self.config.path.display()
            ))),
        }
    }

    async fn read_value(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.read_map().await?.remove(key))
    }

    async fn write_value(&self, key: String, value: Value) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut map = match self.read_map().await {
            Ok(map) => map,
            Err(StoreError::Serialization { message }) => {
                tracing::warn!(%message, "replacing unreadable preference file");
                Map::new()
            }
            Err(err) => return Err(err),
        };
        map.insert(key, value);

        let encoded = serde_json::to_vec_pretty(&Value::Object(map))
            .map_err(|e| StoreError::serialization(format!("cannot encode preferences: {e}")))?;
        write_atomic(&self.config.path, &encoded).await
    }
}

async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(|e| {
            StoreError::io(format!("failed to create {}: {e}", parent.display()))
        })?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(|e| StoreError::io(format!("failed to create temp file: {e}")))?;
    file.write_all(data)
        .await
        .map_err(|e| StoreError::io(format!("failed to write preferences: {e}")))?;
    file.sync_all()
        .await
        .map_err(|e| StoreError::io(format!("failed to sync preferences: {e}")))?;
    drop(file);

    fs::rename(&temp_path, path)
        .await
        .map_err(|e| StoreError::io(format!("failed to rename temp file: {e}")))
}

#[async_trait]
impl ThemeModeStore for JsonPreferenceStore {
    async fn load(&self) -> Result<Option<ThemeMode>, StoreError> {
        let key = self.config.theme_key();
        let mode = match self.read_value(&key).await? {
            Some(Value::String(name)) => name.parse::<ThemeMode>().ok(),
            Some(Value::Number(ordinal)) => ordinal
                .as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .and_then(ThemeMode::from_ordinal),
            _ => None,
        };
        if mode.is_none() {
            tracing::trace!(key = %key, "no usable theme preference");
        }
        Ok(mode)
    }

    async fn save(&self, mode: ThemeMode) -> Result<(), StoreError> {
        self.write_value(self.config.theme_key(), Value::String(mode.name().to_string()))
            .await
    }
}

#[async_trait]
impl SidebarStateStore for JsonPreferenceStore {
    async fn load(&self) -> Result<Option<bool>, StoreError> {
        match self.read_value(&self.config.sidebar_key()).await? {
            Some(Value::Bool(open)) => Ok(Some(open)),
            _ => Ok(None),
        }
    }

    async fn save(&self, open: bool) -> Result<(), StoreError> {
        self.write_value(self.config.sidebar_key(), Value::Bool(open)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_use_prefix() {
        let config = StoreConfig::new("prefs.json");
        assert_eq!(config.theme_key(), "shell.ui.themeMode");
        assert_eq!(config.sidebar_key(), "shell.ui.sidebarOpen");

        let custom = config.with_prefix("rw.testapp.ui.");
        assert_eq!(custom.theme_key(), "rw.testapp.ui.themeMode");
    }

    #[test]
    fn default_location_ends_with_app_file() {
        if let Ok(config) = StoreConfig::default_location() {
            assert!(config.path.ends_with(Path::new(APP_DIR).join(FILE_NAME)));
        }
    }

    #[test]
    fn open_default_uses_default_location_and_prefix() {
        match StoreConfig::default_location() {
            Ok(expected) => {
                let store = JsonPreferenceStore::open_default().expect("config dir available");
                assert_eq!(store.config(), &expected);
                assert_eq!(store.config().prefix, DEFAULT_PREFIX);
            }
            Err(_) => assert!(matches!(
                JsonPreferenceStore::open_default(),
                Err(StoreError::Unavailable { .. })
            )),
        }
    }
}
