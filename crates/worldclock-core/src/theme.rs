//! Color theme presets, user-saved palettes, and the active palette.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{debug, info, warn};
use worldclock_store::DEFAULT_THEME_NAME;
use worldclock_types::{ColorRole, HexColor, ThemePalette};

/// Errors returned by theme operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThemeError {
    /// A palette to be saved was rejected.
    #[error("validation failed: {reason}")]
    Validation {
        /// Why the palette was rejected.
        reason: String,
    },

    /// No custom palette at the given index.
    #[error("theme index {index} out of range (have {len})")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of custom palettes.
        len: usize,
    },

    /// No preset or custom palette has the given name.
    #[error("unknown theme: {0}")]
    UnknownTheme(String),
}

/// How the UI refers to a palette: by name, or by custom-list index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ThemeRef {
    /// A preset or custom palette name.
    Name(String),
    /// Position in the custom palette list.
    Index(usize),
}

/// Preset colors, in [`ColorRole::ALL`] order.
const PRESETS: [(&str, [&str; 12]); 5] = [
    (
        "midnight",
        [
            "#0f0f23", "#1a1a2e", "#16213e", "#eaeaea", "#a0a0b8", "#ff6b9d", "#c084fc", "#60a5fa",
            "#22d3ee", "#34d399", "#fbbf24", "#fb923c",
        ],
    ),
    (
        "sunset",
        [
            "#1f0f1a", "#2d1520", "#3d1c2a", "#fff1e6", "#d4a5a5", "#ff7eb3", "#d291ff", "#7aa2ff",
            "#5ee7df", "#8fd694", "#ffd166", "#ff8c42",
        ],
    ),
    (
        "ocean",
        [
            "#0a1929", "#0f2a44", "#133a5e", "#e3f2fd", "#90caf9", "#f48fb1", "#b39ddb", "#4fc3f7",
            "#4dd0e1", "#4db6ac", "#ffe082", "#ffab91",
        ],
    ),
    (
        "forest",
        [
            "#0d1f14", "#14301f", "#1c4029", "#e8f5e9", "#a5d6a7", "#f06292", "#ba68c8", "#64b5f6",
            "#4dd0e1", "#81c784", "#fff176", "#ffb74d",
        ],
    ),
    (
        "daylight",
        [
            "#f8fafc", "#ffffff", "#e2e8f0", "#0f172a", "#475569", "#db2777", "#9333ea", "#2563eb",
            "#0891b2", "#059669", "#ca8a04", "#ea580c",
        ],
    ),
];

/// The compiled-in presets, in panel order.
pub fn preset_palettes() -> Vec<ThemePalette> {
    PRESETS
        .iter()
        .map(|(name, hexes)| ThemePalette {
            name: (*name).to_owned(),
            colors: ColorRole::ALL
                .into_iter()
                .zip(hexes.iter())
                .filter_map(|(role, hex)| HexColor::parse(hex).ok().map(|c| (role, c)))
                .collect(),
        })
        .collect()
}

/// Presets, user-saved palettes, and the palette currently applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeStore {
    presets: Vec<ThemePalette>,
    custom: Vec<ThemePalette>,
    active: ThemePalette,
}

impl ThemeStore {
    /// Create a store with `custom` palettes and the default preset active.
    ///
    /// Stored palettes are kept exactly as given so list indices match
    /// storage. One missing a role or holding a malformed color is logged;
    /// when applied, its gaps are filled from the default preset.
    pub fn new(custom: Vec<ThemePalette>) -> Self {
        let presets = preset_palettes();
        for (index, palette) in custom.iter().enumerate() {
            if !palette.is_complete() {
                warn!(name = %palette.name, index, "stored theme is incomplete");
            }
        }
        let active = default_palette(&presets);
        Self {
            presets,
            custom,
            active,
        }
    }

    /// Activate the palette named `name`, or the default preset if no
    /// palette has that name.
    pub fn restore_active(&mut self, name: &str) {
        if let Some(palette) = self.find(name) {
            self.active = self.filled(palette);
        } else {
            warn!(name, fallback = DEFAULT_THEME_NAME, "stored theme not found");
            self.active = default_palette(&self.presets);
        }
    }

    /// Look up a palette by name, presets first, then custom palettes in
    /// list order.
    pub fn find(&self, name: &str) -> Option<&ThemePalette> {
        self.presets
            .iter()
            .chain(self.custom.iter())
            .find(|p| p.name == name)
    }

    /// Validate and append a custom palette. Returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::Validation`] if the name is blank, a role is
    /// missing, or a color is not `#rrggbb`.
    pub fn save(
        &mut self,
        name: &str,
        colors: &BTreeMap<ColorRole, String>,
    ) -> Result<usize, ThemeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ThemeError::Validation {
                reason: "theme name is blank".to_owned(),
            });
        }

        let mut parsed = BTreeMap::new();
        let mut missing = Vec::new();
        for role in ColorRole::ALL {
            match colors.get(&role) {
                Some(raw) => {
                    let color = HexColor::parse(raw).map_err(|e| ThemeError::Validation {
                        reason: format!("{}: {e}", role.css_var()),
                    })?;
                    parsed.insert(role, color);
                }
                None => missing.push(role.css_var()),
            }
        }
        if !missing.is_empty() {
            return Err(ThemeError::Validation {
                reason: format!("missing colors: {}", missing.join(", ")),
            });
        }

        if self.find(name).is_some() {
            debug!(name, "saving theme with a name already in use");
        }
        self.custom.push(ThemePalette {
            name: name.to_owned(),
            colors: parsed,
        });
        let index = self.custom.len().saturating_sub(1);
        info!(name, index, "theme saved");
        Ok(index)
    }

    /// Remove the custom palette at `index` and return it. The active
    /// palette is left as it is.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::IndexOutOfRange`] if there is no such palette.
    pub fn delete(&mut self, index: usize) -> Result<ThemePalette, ThemeError> {
        if index >= self.custom.len() {
            return Err(ThemeError::IndexOutOfRange {
                index,
                len: self.custom.len(),
            });
        }
        let removed = self.custom.remove(index);
        info!(name = %removed.name, index, "theme deleted");
        Ok(removed)
    }

    /// Make the referenced palette active and return it. Roles the stored
    /// palette lacks take the default preset's colors.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::UnknownTheme`] for an unmatched name and
    /// [`ThemeError::IndexOutOfRange`] for a bad index.
    pub fn apply(&mut self, theme: &ThemeRef) -> Result<&ThemePalette, ThemeError> {
        let stored = match theme {
            ThemeRef::Name(name) => self
                .find(name)
                .ok_or_else(|| ThemeError::UnknownTheme(name.clone()))?,
            ThemeRef::Index(index) => self.custom.get(*index).ok_or(ThemeError::IndexOutOfRange {
                index: *index,
                len: self.custom.len(),
            })?,
        };
        let palette = self.filled(stored);
        info!(name = %palette.name, "theme applied");
        self.active = palette;
        Ok(&self.active)
    }

    /// The palette currently applied.
    pub const fn active(&self) -> &ThemePalette {
        &self.active
    }

    /// Name of the palette currently applied.
    pub fn active_name(&self) -> &str {
        &self.active.name
    }

    /// The compiled-in presets.
    pub fn presets(&self) -> &[ThemePalette] {
        &self.presets
    }

    /// The user-saved palettes, in list order.
    pub fn custom(&self) -> &[ThemePalette] {
        &self.custom
    }

    /// `palette` with every missing or malformed role taken from the
    /// default preset.
    fn filled(&self, palette: &ThemePalette) -> ThemePalette {
        let mut filled = palette.clone();
        let gaps: Vec<ColorRole> = palette
            .missing_roles()
            .into_iter()
            .chain(palette.invalid_roles())
            .collect();
        if gaps.is_empty() {
            return filled;
        }
        let fallback = default_palette(&self.presets);
        for role in &gaps {
            if let Some(color) = fallback.color(*role) {
                filled.colors.insert(*role, color.clone());
            }
        }
        debug!(name = %palette.name, filled = gaps.len(), "theme gaps filled from default");
        filled
    }
}

fn default_palette(presets: &[ThemePalette]) -> ThemePalette {
    presets
        .iter()
        .find(|p| p.name == DEFAULT_THEME_NAME)
        .cloned()
        .unwrap_or_else(|| ThemePalette {
            name: DEFAULT_THEME_NAME.to_owned(),
            colors: BTreeMap::new(),
        })
}
