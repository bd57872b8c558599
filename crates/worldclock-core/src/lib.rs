//! Timezone registry, visibility, tick cycle, and themes for the world clock.
//!
//! This crate owns the state behind a page of analog/digital clocks: which
//! timezones exist, which are shown, what time it is in each, and which
//! color palette is applied. Rendering is delegated to a [`RenderSink`].
//!
//! ```text
//! PersistenceGateway --hydrate--> TimezoneRegistry + VisibilitySet + ThemeStore
//!                                         |
//!            ClockTicker --every tick--> TimeSource --> ClockFace --> RenderSink
//! ```
//!
//! # Modules
//!
//! - [`app`] -- [`ClockApp`], the owned state object and its event handlers.
//! - [`clock`] -- The [`Clock`] trait and per-zone local time resolution.
//! - [`config`] -- Configuration loading from `worldclock-config.yaml` into
//!   strongly-typed structs.
//! - [`registry`] -- Built-in and custom timezone entries.
//! - [`sink`] -- The [`RenderSink`] trait.
//! - [`theme`] -- Theme presets and user-saved palettes.
//! - [`ticker`] -- The periodic recompute pass and the preview offset.
//! - [`visibility`] -- The visible subset of entries.
//!
//! [`ClockApp`]: app::ClockApp
//! [`Clock`]: clock::Clock
//! [`RenderSink`]: sink::RenderSink

pub mod app;
pub mod clock;
pub mod config;
pub mod registry;
pub mod sink;
pub mod theme;
pub mod ticker;
pub mod visibility;

pub use app::{AppError, ClockApp, EventOutcome, UiEvent};
pub use clock::{Clock, FixedClock, SystemClock, TimeError, TimeSource};
pub use config::{AppConfig, ConfigError};
pub use registry::{RegistryError, TimezoneRegistry};
pub use sink::{NoOpSink, RecordingSink, RenderSink};
pub use theme::{ThemeError, ThemeRef, ThemeStore};
pub use ticker::{ClockTicker, GlobalOffset, TickSummary, TickerError};
pub use visibility::{VisibilityError, VisibilitySet};
