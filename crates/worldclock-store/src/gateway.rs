//! Typed reads and writes of the persisted preferences.
//!
//! [`PersistenceGateway`] is the only reader and writer of the preference
//! keys. Values are JSON-encoded strings under namespaced keys.
//!
//! # Key Patterns
//!
//! | Key | Shape | Default when absent or malformed |
//! |-----|-------|----------------------------------|
//! | `{ns}.clockTheme` | string | `"midnight"` |
//! | `{ns}.customTimezones` | array of entries | `[]` |
//! | `{ns}.visibleTimezones` | array of ids | `None` (caller shows all) |
//! | `{ns}.customThemes` | array of palettes | `[]` |

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use worldclock_types::{EntryId, ThemePalette, TimezoneEntry};

use crate::error::StoreError;
use crate::kv::KeyValueStore;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "worldclock";

/// Theme applied when no theme name has been persisted.
pub const DEFAULT_THEME_NAME: &str = "midnight";

/// The fully-qualified storage keys for one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// Active theme name.
    pub active_theme: String,
    /// Custom timezone entries.
    pub custom_timezones: String,
    /// Ids of visible entries.
    pub visible_timezones: String,
    /// User-saved palettes.
    pub custom_themes: String,
}

impl StorageKeys {
    /// Build the keys for `namespace`. An empty namespace yields bare keys.
    pub fn new(namespace: &str) -> Self {
        let key = |name: &str| {
            if namespace.is_empty() {
                name.to_owned()
            } else {
                format!("{namespace}.{name}")
            }
        };
        Self {
            active_theme: key("clockTheme"),
            custom_timezones: key("customTimezones"),
            visible_timezones: key("visibleTimezones"),
            custom_themes: key("customThemes"),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

/// Reads and writes preferences through a [`KeyValueStore`].
pub struct PersistenceGateway {
    store: Box<dyn KeyValueStore>,
    keys: StorageKeys,
}

impl core::fmt::Debug for PersistenceGateway {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PersistenceGateway")
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

impl PersistenceGateway {
    /// Wrap `store`, namespacing every key under `namespace`.
    pub fn new(store: Box<dyn KeyValueStore>, namespace: &str) -> Self {
        Self {
            store,
            keys: StorageKeys::new(namespace),
        }
    }

    /// The keys this gateway reads and writes.
    pub const fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    // =========================================================================
    // Custom timezone entries
    // =========================================================================

    /// Persist the custom entries in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if encoding or the write fails.
    pub fn save_custom_entries(&mut self, entries: &[TimezoneEntry]) -> Result<(), StoreError> {
        let key = self.keys.custom_timezones.clone();
        self.save_json(&key, entries)
    }

    /// Load the custom entries, or an empty list if absent or malformed.
    pub fn load_custom_entries(&self) -> Vec<TimezoneEntry> {
        self.load_json(&self.keys.custom_timezones).unwrap_or_default()
    }

    // =========================================================================
    // Visible ids
    // =========================================================================

    /// Persist the ids of the visible entries.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if encoding or the write fails.
    pub fn save_visible_ids(&mut self, ids: &[EntryId]) -> Result<(), StoreError> {
        let key = self.keys.visible_timezones.clone();
        self.save_json(&key, ids)
    }

    /// Load the visible ids.
    ///
    /// `None` means nothing usable is stored and the caller should fall back
    /// to "everything visible"; `Some(vec![])` is a deliberate empty selection.
    pub fn load_visible_ids(&self) -> Option<Vec<EntryId>> {
        self.load_json(&self.keys.visible_timezones)
    }

    // =========================================================================
    // Themes
    // =========================================================================

    /// Persist the name of the active theme.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if encoding or the write fails.
    pub fn save_active_theme_name(&mut self, name: &str) -> Result<(), StoreError> {
        let key = self.keys.active_theme.clone();
        self.save_json(&key, name)
    }

    /// Load the active theme name, or [`DEFAULT_THEME_NAME`].
    pub fn load_active_theme_name(&self) -> String {
        self.load_json(&self.keys.active_theme)
            .unwrap_or_else(|| DEFAULT_THEME_NAME.to_owned())
    }

    /// Persist the user-saved palettes in list order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if encoding or the write fails.
    pub fn save_custom_palettes(&mut self, palettes: &[ThemePalette]) -> Result<(), StoreError> {
        let key = self.keys.custom_themes.clone();
        self.save_json(&key, palettes)
    }

    /// Load the user-saved palettes, or an empty list if absent or malformed.
    pub fn load_custom_palettes(&self) -> Vec<ThemePalette> {
        self.load_json(&self.keys.custom_themes).unwrap_or_default()
    }

    // =========================================================================
    // Generic JSON get/set
    // =========================================================================

    fn save_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, json)?;
        debug!(key, "preference saved");
        Ok(())
    }

    /// Read and decode `key`. Read failures and corrupt values are logged
    /// and reported as absent.
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "preference read failed, using default");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "stored preference is corrupt, using default");
                None
            }
        }
    }
}
