//! Timezone entries and the user-supplied draft used to create them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::color::HexColor;
use crate::ids::EntryId;

/// Flag shown for custom entries created without one.
pub const DEFAULT_FLAG: &str = "\u{1f310}";

/// Accent color used for custom entries created without one.
pub const DEFAULT_ACCENT: &str = "#60a5fa";

/// A single timezone's display configuration.
///
/// The JSON field names (`timezone`, `flag`, `color`) are the persisted
/// format and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TimezoneEntry {
    /// Unique, stable identifier.
    pub id: EntryId,
    /// IANA zone identifier, e.g. `Asia/Tokyo`.
    #[serde(rename = "timezone")]
    pub timezone_name: String,
    /// Flag emoji shown next to the city name.
    #[serde(rename = "flag")]
    pub display_flag: String,
    /// City label.
    pub city: String,
    /// Country label.
    pub country: String,
    /// Accent color of the clock card.
    #[serde(rename = "color")]
    pub accent_color: HexColor,
}

impl TimezoneEntry {
    /// Whether this is a user-created entry.
    pub fn is_custom(&self) -> bool {
        self.id.is_custom()
    }

    /// `"City, Country"` label used in log lines.
    pub fn label(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }
}

/// Raw input of the "add timezone" form, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EntryDraft {
    /// City label (required).
    pub city: String,
    /// Country label (required).
    pub country: String,
    /// IANA zone identifier (required, must resolve).
    pub zone_name: String,
    /// Optional flag emoji.
    #[serde(default)]
    pub flag: Option<String>,
    /// Optional `#rrggbb` accent color.
    #[serde(default)]
    pub color: Option<String>,
}

impl EntryDraft {
    /// Names of the required fields that are blank.
    pub fn blank_fields(&self) -> Vec<&'static str> {
        [
            ("city", self.city.as_str()),
            ("country", self.country.as_str()),
            ("zone_name", self.zone_name.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}
