//! Validated `#rrggbb` colors.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Errors produced when parsing a color string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    /// The string is not of the form `#rrggbb`.
    #[error("invalid hex color {value:?}: expected #rrggbb")]
    InvalidHex {
        /// The rejected input.
        value: String,
    },
}

/// An RGB color in lowercase `#rrggbb` notation.
///
/// Deserialization does not validate; values read from storage are checked
/// with [`HexColor::is_valid`] at the point where they are accepted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct HexColor(String);

impl HexColor {
    /// Parse and normalize a `#rrggbb` string.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::InvalidHex`] for anything that is not a `#`
    /// followed by exactly six hex digits.
    pub fn parse(value: &str) -> Result<Self, ColorError> {
        let trimmed = value.trim();
        if split_channels(trimmed).is_some() {
            Ok(Self(trimmed.to_ascii_lowercase()))
        } else {
            Err(ColorError::InvalidHex {
                value: value.to_owned(),
            })
        }
    }

    /// Whether the wrapped string is a well-formed `#rrggbb` color.
    pub fn is_valid(&self) -> bool {
        split_channels(&self.0).is_some()
    }

    /// Borrow the color string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Red, green and blue channels, or `None` if the value is malformed.
    pub fn channels(&self) -> Option<(u8, u8, u8)> {
        split_channels(&self.0)
    }

    /// Render as a CSS `rgba(r, g, b, alpha)` string.
    pub fn to_rgba(&self, alpha: f64) -> Option<String> {
        let (r, g, b) = self.channels()?;
        Some(format!("rgba({r}, {g}, {b}, {alpha})"))
    }
}

impl core::fmt::Display for HexColor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

fn split_channels(value: &str) -> Option<(u8, u8, u8)> {
    let digits = value.strip_prefix('#')?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(digits.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(digits.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(digits.get(4..6)?, 16).ok()?;
    Some((r, g, b))
}
