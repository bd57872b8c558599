//! Stable string identifiers for timezone entries.
//!
//! Built-in entries carry static slugs such as `"new-york"`. Custom entries
//! are identified as `custom-<creation timestamp in ms>`, so the two id
//! spaces never overlap as long as built-in slugs avoid the [`CUSTOM_PREFIX`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Prefix reserved for user-created entries.
pub const CUSTOM_PREFIX: &str = "custom-";

/// Unique, stable identifier of a timezone entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct EntryId(String);

impl EntryId {
    /// Wrap an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the identifier of a custom entry created at `timestamp_ms`.
    pub fn custom(timestamp_ms: i64) -> Self {
        Self(format!("{CUSTOM_PREFIX}{timestamp_ms}"))
    }

    /// Whether this id lives in the custom (user-created) id space.
    pub fn is_custom(&self) -> bool {
        self.0.starts_with(CUSTOM_PREFIX)
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for EntryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for EntryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for EntryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
