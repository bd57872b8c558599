//! Color palettes for the clock page.
//!
//! A palette maps each of the twelve [`ColorRole`]s to a [`HexColor`]. The
//! role names serialize in camelCase (`bgPrimary`, `accentPink`, ...), which
//! is the persisted format of saved custom themes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::color::HexColor;

/// The fixed set of semantic color roles a palette assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum ColorRole {
    /// Page background.
    BgPrimary,
    /// Card background.
    BgSecondary,
    /// Inset/control background.
    BgTertiary,
    /// Main text.
    TextPrimary,
    /// Muted text.
    TextSecondary,
    /// Pink accent (also the first gradient overlay).
    AccentPink,
    /// Purple accent (also the second gradient overlay).
    AccentPurple,
    /// Blue accent (also the third gradient overlay).
    AccentBlue,
    /// Cyan accent.
    AccentCyan,
    /// Green accent.
    AccentGreen,
    /// Yellow accent.
    AccentYellow,
    /// Orange accent.
    AccentOrange,
}

impl ColorRole {
    /// Every role, in panel order.
    pub const ALL: [Self; 12] = [
        Self::BgPrimary,
        Self::BgSecondary,
        Self::BgTertiary,
        Self::TextPrimary,
        Self::TextSecondary,
        Self::AccentPink,
        Self::AccentPurple,
        Self::AccentBlue,
        Self::AccentCyan,
        Self::AccentGreen,
        Self::AccentYellow,
        Self::AccentOrange,
    ];

    /// Name of the CSS custom property this role drives.
    pub const fn css_var(self) -> &'static str {
        match self {
            Self::BgPrimary => "--bg-primary",
            Self::BgSecondary => "--bg-secondary",
            Self::BgTertiary => "--bg-tertiary",
            Self::TextPrimary => "--text-primary",
            Self::TextSecondary => "--text-secondary",
            Self::AccentPink => "--accent-pink",
            Self::AccentPurple => "--accent-purple",
            Self::AccentBlue => "--accent-blue",
            Self::AccentCyan => "--accent-cyan",
            Self::AccentGreen => "--accent-green",
            Self::AccentYellow => "--accent-yellow",
            Self::AccentOrange => "--accent-orange",
        }
    }
}

/// Gradient overlays derived from the accent colors: `(role, alpha, css var)`.
pub const GRADIENT_OVERLAYS: [(ColorRole, f64, &str); 3] = [
    (ColorRole::AccentPink, 0.15, "--gradient-overlay-1"),
    (ColorRole::AccentPurple, 0.15, "--gradient-overlay-2"),
    (ColorRole::AccentBlue, 0.1, "--gradient-overlay-3"),
];

/// A named palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ThemePalette {
    /// Display name (not necessarily unique for custom palettes).
    pub name: String,
    /// Color per role.
    pub colors: BTreeMap<ColorRole, HexColor>,
}

impl ThemePalette {
    /// Look up the color assigned to `role`.
    pub fn color(&self, role: ColorRole) -> Option<&HexColor> {
        self.colors.get(&role)
    }

    /// Roles that have no color assigned.
    pub fn missing_roles(&self) -> Vec<ColorRole> {
        ColorRole::ALL
            .into_iter()
            .filter(|role| !self.colors.contains_key(role))
            .collect()
    }

    /// Roles whose assigned value is not a valid `#rrggbb` color.
    pub fn invalid_roles(&self) -> Vec<ColorRole> {
        self.colors
            .iter()
            .filter(|(_, color)| !color.is_valid())
            .map(|(role, _)| *role)
            .collect()
    }

    /// Whether every role is assigned a valid color.
    pub fn is_complete(&self) -> bool {
        self.missing_roles().is_empty() && self.invalid_roles().is_empty()
    }

    /// CSS custom property assignments, one per role.
    pub fn css_variables(&self) -> Vec<(&'static str, String)> {
        let mut vars: Vec<(&'static str, String)> = ColorRole::ALL
            .into_iter()
            .filter_map(|role| {
                self.color(role)
                    .map(|color| (role.css_var(), color.as_str().to_owned()))
            })
            .collect();
        vars.extend(GRADIENT_OVERLAYS.iter().filter_map(|(role, alpha, var)| {
            self.color(*role)
                .and_then(|color| color.to_rgba(*alpha))
                .map(|rgba| (*var, rgba))
        }));
        vars
    }
}
