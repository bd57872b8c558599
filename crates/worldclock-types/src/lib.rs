//! Shared type definitions for the world clock state manager.
//!
//! This crate is the single source of truth for the data exchanged between
//! the clock core, the preference store, and the browser rendering layer.
//! Types flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Stable entry identifiers and the `custom-` id space
//! - [`color`] -- Validated `#rrggbb` colors
//! - [`entry`] -- Timezone entries and the add-timezone draft
//! - [`theme`] -- Color roles and named palettes
//! - [`face`] -- Local date and time readings and per-tick clock faces

pub mod color;
pub mod entry;
pub mod face;
pub mod ids;
pub mod theme;

// Re-export all public types at crate root for convenience.
pub use color::{ColorError, HexColor};
pub use entry::{DEFAULT_ACCENT, DEFAULT_FLAG, EntryDraft, TimezoneEntry};
pub use face::{ClockFace, DayPhase, LocalDate, LocalTime, Period};
pub use ids::{CUSTOM_PREFIX, EntryId};
pub use theme::{ColorRole, GRADIENT_OVERLAYS, ThemePalette};
