//! The owned application state and its event handlers.
//!
//! [`ClockApp`] replaces ambient page state with one object that has an
//! explicit lifecycle:
//!
//! 1. [`ClockApp::init`] hydrates entries, visibility and themes from the
//!    [`PersistenceGateway`], reconciles stale stored ids, announces the
//!    layout and theme to the sink, and renders a first pass.
//! 2. [`ClockApp::start`] arms the ticker; the driver awaits
//!    [`ClockApp::wait_for_tick`] and calls [`ClockApp::run_pass`].
//! 3. [`ClockApp::handle`] applies a [`UiEvent`] to completion: mutate,
//!    persist, notify the sink, and re-render.
//! 4. [`ClockApp::teardown`] stops the ticker.
//!
//! Persistence failures are logged and never undo an in-memory change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use worldclock_store::PersistenceGateway;
use worldclock_types::{ColorRole, EntryDraft, EntryId};

use crate::clock::{Clock, TimeSource};
use crate::config::AppConfig;
use crate::registry::{RegistryError, TimezoneRegistry};
use crate::sink::RenderSink;
use crate::theme::{ThemeError, ThemeRef, ThemeStore};
use crate::ticker::{ClockTicker, GlobalOffset, TickSummary, TickerError};
use crate::visibility::{VisibilityError, VisibilitySet};

/// Errors surfaced to the UI by [`ClockApp`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    /// A registry operation failed.
    #[error("registry error: {source}")]
    Registry {
        /// The underlying registry error.
        #[from]
        source: RegistryError,
    },

    /// A visibility change failed.
    #[error("visibility error: {source}")]
    Visibility {
        /// The underlying visibility error.
        #[from]
        source: VisibilityError,
    },

    /// A theme operation failed.
    #[error("theme error: {source}")]
    Theme {
        /// The underlying theme error.
        #[from]
        source: ThemeError,
    },

    /// The ticker could not be configured.
    #[error("ticker error: {source}")]
    Ticker {
        /// The underlying ticker error.
        #[from]
        source: TickerError,
    },

    /// The event carried a value outside its allowed range.
    #[error("invalid event: {reason}")]
    InvalidEvent {
        /// Why the event was rejected.
        reason: String,
    },
}

/// An input event from the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// Add a custom timezone from the form fields.
    AddTimezone(EntryDraft),
    /// Remove a custom timezone.
    RemoveTimezone {
        /// Entry to remove.
        id: EntryId,
    },
    /// Flip one entry's visibility.
    ToggleVisibility {
        /// Entry to flip.
        id: EntryId,
    },
    /// Show every entry.
    SelectAll,
    /// Hide every entry.
    DeselectAll,
    /// Rewind (`-1`), forward (`+1`) or reset (`0`) the preview offset.
    ShiftOffset {
        /// Step to apply.
        delta: i32,
    },
    /// Save the current color inputs as a custom palette.
    SaveTheme {
        /// Palette name.
        name: String,
        /// Color per role.
        colors: BTreeMap<ColorRole, String>,
    },
    /// Delete a custom palette.
    DeleteTheme {
        /// Position in the custom list.
        index: usize,
    },
    /// Apply a preset or custom palette.
    ApplyTheme {
        /// Name or custom-list index.
        theme: ThemeRef,
    },
}

/// What a handled event did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EventOutcome {
    /// A custom entry was added and made visible.
    Added {
        /// The new entry's id.
        id: EntryId,
    },
    /// A custom entry was removed.
    Removed {
        /// The removed entry's id.
        id: EntryId,
    },
    /// An entry's visibility changed.
    VisibilityChanged {
        /// The entry.
        id: EntryId,
        /// Its new visibility.
        visible: bool,
    },
    /// The visible set was replaced wholesale.
    SelectionChanged {
        /// Number of visible entries.
        visible: usize,
    },
    /// The preview offset changed.
    OffsetChanged {
        /// The new offset.
        offset: GlobalOffset,
        /// Human-readable form of the offset.
        description: String,
    },
    /// A custom palette was saved.
    ThemeSaved {
        /// Its index in the custom list.
        index: usize,
    },
    /// A custom palette was deleted.
    ThemeDeleted {
        /// Name of the deleted palette.
        name: String,
    },
    /// A palette was applied.
    ThemeApplied {
        /// Name of the applied palette.
        name: String,
    },
    /// The event was accepted but changed nothing.
    Ignored {
        /// Why nothing changed.
        reason: String,
    },
}

/// The world clock's complete state, owned by the entry point.
#[derive(Debug)]
pub struct ClockApp<S: RenderSink> {
    registry: TimezoneRegistry,
    visibility: VisibilitySet,
    themes: ThemeStore,
    ticker: ClockTicker,
    time: TimeSource,
    gateway: PersistenceGateway,
    sink: S,
}

impl<S: RenderSink> ClockApp<S> {
    /// Hydrate state from `gateway` and render the first frame.
    ///
    /// Stored visible ids that no longer match an entry are dropped and the
    /// reconciled set is written back. Stored custom entries are never
    /// rewritten here. The ticker is left stopped.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Registry`] if the configured built-ins are
    /// invalid, or [`AppError::Ticker`] if the tick interval is zero.
    pub fn init(
        config: &AppConfig,
        gateway: PersistenceGateway,
        clock: Box<dyn Clock>,
        sink: S,
    ) -> Result<Self, AppError> {
        let mut registry = TimezoneRegistry::new(config.clock.builtin_zones.clone())?;
        let ticker = ClockTicker::new(config.clock.tick_interval_ms)?;

        let stored_entries = gateway.load_custom_entries();
        let stored_count = stored_entries.len();
        let restored = registry.restore_custom(stored_entries);
        let skipped = stored_count.saturating_sub(restored);

        let (visibility, dropped) = gateway.load_visible_ids().map_or_else(
            || (VisibilitySet::all_of(&registry), 0),
            |ids| VisibilitySet::from_ids(ids, &registry),
        );

        let mut themes = ThemeStore::new(gateway.load_custom_palettes());
        themes.restore_active(&gateway.load_active_theme_name());

        let mut app = Self {
            registry,
            visibility,
            themes,
            ticker,
            time: TimeSource::new(clock),
            gateway,
            sink,
        };

        if dropped > 0 {
            app.persist_visibility();
        }

        info!(
            entries = app.registry.len(),
            custom = restored,
            custom_skipped = skipped,
            visible = app.visibility.len(),
            stale_visible_dropped = dropped,
            theme = app.themes.active_name(),
            "world clock initialized"
        );

        app.sink.theme_changed(app.themes.active());
        app.refresh();
        Ok(app)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Arm the periodic trigger. Must be called within a tokio runtime.
    pub fn start(&mut self) {
        self.ticker.start();
    }

    /// Stop the periodic trigger. Safe to call more than once.
    pub fn teardown(&mut self) {
        self.ticker.stop();
        info!(passes = self.ticker.passes(), "world clock torn down");
    }

    /// Whether the periodic trigger is armed.
    pub const fn is_running(&self) -> bool {
        self.ticker.is_running()
    }

    /// Wait for the next trigger; pends forever after teardown.
    pub async fn wait_for_tick(&mut self) {
        self.ticker.wait().await;
    }

    /// Recompute and render every visible entry.
    pub fn run_pass(&mut self) -> TickSummary {
        let visibility = &self.visibility;
        let visible = self
            .registry
            .list()
            .iter()
            .filter(|e| visibility.is_visible(&e.id));
        self.ticker.run_pass(&self.time, visible, &mut self.sink)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The timezone registry.
    pub const fn registry(&self) -> &TimezoneRegistry {
        &self.registry
    }

    /// The visible subset.
    pub const fn visibility(&self) -> &VisibilitySet {
        &self.visibility
    }

    /// The theme store.
    pub const fn themes(&self) -> &ThemeStore {
        &self.themes
    }

    /// The current preview offset.
    pub const fn offset(&self) -> GlobalOffset {
        self.ticker.offset()
    }

    /// The render sink.
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// The render sink, mutably.
    pub const fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Apply one UI event to completion.
    ///
    /// # Errors
    ///
    /// Returns an [`AppError`] if the event is rejected; state is unchanged
    /// in that case.
    pub fn handle(&mut self, event: UiEvent) -> Result<EventOutcome, AppError> {
        match event {
            UiEvent::AddTimezone(draft) => self.add_timezone(&draft),
            UiEvent::RemoveTimezone { id } => self.remove_timezone(&id),
            UiEvent::ToggleVisibility { id } => self.toggle_visibility(&id),
            UiEvent::SelectAll => Ok(self.select_all()),
            UiEvent::DeselectAll => Ok(self.deselect_all()),
            UiEvent::ShiftOffset { delta } => self.shift_offset(delta),
            UiEvent::SaveTheme { name, colors } => self.save_theme(&name, &colors),
            UiEvent::DeleteTheme { index } => self.delete_theme(index),
            UiEvent::ApplyTheme { theme } => self.apply_theme(&theme),
        }
    }

    /// Add a custom entry; it is visible immediately.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Registry`] if the draft is invalid.
    pub fn add_timezone(&mut self, draft: &EntryDraft) -> Result<EventOutcome, AppError> {
        let id = self.registry.add(draft, self.time.now_ms())?;
        self.visibility.set_visible(&self.registry, &id, true)?;
        self.persist_entries();
        self.persist_visibility();
        self.refresh();
        Ok(EventOutcome::Added { id })
    }

    /// Remove a custom entry from the registry and the visible set.
    /// Removing a built-in is a logged no-op.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Registry`] if no entry has `id`.
    pub fn remove_timezone(&mut self, id: &EntryId) -> Result<EventOutcome, AppError> {
        match self.registry.remove(id) {
            Ok(_) => {}
            Err(RegistryError::ProtectedEntry(id)) => {
                warn!(id = %id, "ignoring removal of a built-in timezone");
                return Ok(EventOutcome::Ignored {
                    reason: format!("{id} is built-in"),
                });
            }
            Err(e) => return Err(e.into()),
        }
        self.visibility.remove(id);
        self.persist_entries();
        self.persist_visibility();
        self.refresh();
        Ok(EventOutcome::Removed { id: id.clone() })
    }

    /// Flip one entry's visibility.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Visibility`] if no entry has `id`.
    pub fn toggle_visibility(&mut self, id: &EntryId) -> Result<EventOutcome, AppError> {
        let visible = self.visibility.toggle(&self.registry, id)?;
        self.persist_visibility();
        self.refresh();
        Ok(EventOutcome::VisibilityChanged {
            id: id.clone(),
            visible,
        })
    }

    /// Show every entry.
    pub fn select_all(&mut self) -> EventOutcome {
        self.visibility.select_all(&self.registry);
        self.persist_visibility();
        self.refresh();
        EventOutcome::SelectionChanged {
            visible: self.visibility.len(),
        }
    }

    /// Hide every entry.
    pub fn deselect_all(&mut self) -> EventOutcome {
        self.visibility.deselect_all();
        self.persist_visibility();
        self.refresh();
        EventOutcome::SelectionChanged { visible: 0 }
    }

    /// Rewind (`-1`), forward (`+1`) or reset (`0`) the preview offset and
    /// re-render at once.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidEvent`] for any other `delta`.
    pub fn shift_offset(&mut self, delta: i32) -> Result<EventOutcome, AppError> {
        if !matches!(delta, -1..=1) {
            return Err(AppError::InvalidEvent {
                reason: format!("offset step must be -1, 0 or +1, got {delta}"),
            });
        }
        let visibility = &self.visibility;
        let visible = self
            .registry
            .list()
            .iter()
            .filter(|e| visibility.is_visible(&e.id));
        let summary = self
            .ticker
            .shift_offset(delta, &self.time, visible, &mut self.sink);
        Ok(EventOutcome::OffsetChanged {
            offset: summary.offset,
            description: summary.offset.describe(),
        })
    }

    /// Save a custom palette.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Theme`] if the palette is invalid.
    pub fn save_theme(
        &mut self,
        name: &str,
        colors: &BTreeMap<ColorRole, String>,
    ) -> Result<EventOutcome, AppError> {
        let index = self.themes.save(name, colors)?;
        self.persist_palettes();
        Ok(EventOutcome::ThemeSaved { index })
    }

    /// Delete a custom palette.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Theme`] if `index` is out of range.
    pub fn delete_theme(&mut self, index: usize) -> Result<EventOutcome, AppError> {
        let removed = self.themes.delete(index)?;
        self.persist_palettes();
        Ok(EventOutcome::ThemeDeleted { name: removed.name })
    }

    /// Apply a palette and remember it for the next session.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Theme`] if the palette does not exist.
    pub fn apply_theme(&mut self, theme: &ThemeRef) -> Result<EventOutcome, AppError> {
        let palette = self.themes.apply(theme)?;
        self.sink.theme_changed(palette);
        let name = palette.name.clone();
        if let Err(e) = self.gateway.save_active_theme_name(&name) {
            error!(error = %e, "failed to persist active theme");
        }
        Ok(EventOutcome::ThemeApplied { name })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Announce the layout, then fill every visible card.
    fn refresh(&mut self) {
        let visible = self.visibility.ordered_ids(&self.registry);
        self.sink.layout_changed(self.registry.list(), &visible);
        self.run_pass();
    }

    fn persist_entries(&mut self) {
        if let Err(e) = self
            .gateway
            .save_custom_entries(self.registry.custom_entries())
        {
            error!(error = %e, "failed to persist custom timezones");
        }
    }

    fn persist_visibility(&mut self) {
        let ids = self.visibility.ordered_ids(&self.registry);
        if let Err(e) = self.gateway.save_visible_ids(&ids) {
            error!(error = %e, "failed to persist visible timezones");
        }
    }

    fn persist_palettes(&mut self) {
        if let Err(e) = self.gateway.save_custom_palettes(self.themes.custom()) {
            error!(error = %e, "failed to persist custom themes");
        }
    }
}
