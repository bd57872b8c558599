//! The ordered collection of timezone entries.
//!
//! Built-in entries come first, in configuration order, and can never be
//! removed. Custom entries follow in creation order and carry ids from the
//! `custom-` space so they can never collide with a built-in.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};
use worldclock_types::{
    DEFAULT_ACCENT, DEFAULT_FLAG, EntryDraft, EntryId, HexColor, TimezoneEntry,
};

use crate::clock;

/// Errors returned by registry mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The add-timezone input was rejected.
    #[error("validation failed: {reason}")]
    Validation {
        /// Why the input was rejected.
        reason: String,
    },

    /// No entry has the given id.
    #[error("entry not found: {0}")]
    NotFound(EntryId),

    /// The entry is built-in and cannot be removed.
    #[error("built-in entry cannot be removed: {0}")]
    ProtectedEntry(EntryId),

    /// A built-in entry uses an id from the custom id space.
    #[error("built-in entry {0} uses the reserved custom- prefix")]
    ReservedId(EntryId),

    /// Two built-in entries share an id.
    #[error("duplicate entry id: {0}")]
    DuplicateId(EntryId),

    /// No custom id at or after the creation timestamp is free.
    #[error("no free custom id at or after timestamp {created_at_ms}")]
    IdSpaceExhausted {
        /// The creation timestamp the search started from.
        created_at_ms: i64,
    },
}

/// Ordered timezone entries: built-ins, then customs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimezoneRegistry {
    entries: Vec<TimezoneEntry>,
    builtin_count: usize,
}

impl TimezoneRegistry {
    /// Create a registry holding only `builtins`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Validation`] for a blank field, an unknown
    /// zone or a malformed color, [`RegistryError::ReservedId`] for an id in
    /// the custom space, and [`RegistryError::DuplicateId`] for a repeated id.
    pub fn new(builtins: Vec<TimezoneEntry>) -> Result<Self, RegistryError> {
        let mut seen = BTreeSet::new();
        for entry in &builtins {
            if entry.is_custom() {
                return Err(RegistryError::ReservedId(entry.id.clone()));
            }
            if !seen.insert(entry.id.clone()) {
                return Err(RegistryError::DuplicateId(entry.id.clone()));
            }
            validate_entry(entry)?;
        }
        let builtin_count = builtins.len();
        debug!(builtin_count, "timezone registry created");
        Ok(Self {
            entries: builtins,
            builtin_count,
        })
    }

    /// Every entry in display order.
    pub fn list(&self) -> &[TimezoneEntry] {
        &self.entries
    }

    /// The built-in entries, in configuration order.
    pub fn builtin_entries(&self) -> &[TimezoneEntry] {
        self.entries.get(..self.builtin_count).unwrap_or_default()
    }

    /// The custom entries, in creation order.
    pub fn custom_entries(&self) -> &[TimezoneEntry] {
        self.entries.get(self.builtin_count..).unwrap_or_default()
    }

    /// Ids of every entry in display order.
    pub fn ids(&self) -> Vec<EntryId> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }

    /// Look up an entry by id.
    pub fn find_by_id(&self, id: &EntryId) -> Option<&TimezoneEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    /// Whether an entry with `id` exists.
    pub fn contains(&self, id: &EntryId) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate `draft` and append it as a custom entry.
    ///
    /// The id is derived from `created_at_ms`; if that id is taken, the
    /// timestamp is bumped until it is free. A missing flag or color gets
    /// the default. Duplicate city/country pairs are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Validation`] if a required field is blank,
    /// the zone does not resolve, or the color is malformed, and
    /// [`RegistryError::IdSpaceExhausted`] if no id is free. The registry is
    /// unchanged on error.
    pub fn add(
        &mut self,
        draft: &EntryDraft,
        created_at_ms: i64,
    ) -> Result<EntryId, RegistryError> {
        let blank = draft.blank_fields();
        if !blank.is_empty() {
            return Err(RegistryError::Validation {
                reason: format!("required fields are blank: {}", blank.join(", ")),
            });
        }

        let zone_name = draft.zone_name.trim();
        if !clock::is_known_zone(zone_name) {
            return Err(RegistryError::Validation {
                reason: format!("unknown timezone: {zone_name}"),
            });
        }

        let accent_color = match draft.color.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                HexColor::parse(raw).map_err(|e| RegistryError::Validation {
                    reason: e.to_string(),
                })?
            }
            _ => HexColor::parse(DEFAULT_ACCENT).map_err(|e| RegistryError::Validation {
                reason: e.to_string(),
            })?,
        };

        let display_flag = draft
            .flag
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_FLAG)
            .to_owned();

        let id = self.free_custom_id(created_at_ms)?;
        let entry = TimezoneEntry {
            id: id.clone(),
            timezone_name: zone_name.to_owned(),
            display_flag,
            city: draft.city.trim().to_owned(),
            country: draft.country.trim().to_owned(),
            accent_color,
        };

        if self
            .entries
            .iter()
            .any(|e| e.city == entry.city && e.country == entry.country)
        {
            debug!(label = %entry.label(), "adding entry with a duplicate city and country");
        }

        info!(id = %id, zone = %entry.timezone_name, label = %entry.label(), "timezone added");
        self.entries.push(entry);
        Ok(id)
    }

    /// Remove the custom entry `id` and return it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ProtectedEntry`] for a built-in and
    /// [`RegistryError::NotFound`] for an unknown id.
    pub fn remove(&mut self, id: &EntryId) -> Result<TimezoneEntry, RegistryError> {
        let pos = self
            .entries
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        if pos < self.builtin_count {
            return Err(RegistryError::ProtectedEntry(id.clone()));
        }
        let removed = self.entries.remove(pos);
        info!(id = %id, label = %removed.label(), "timezone removed");
        Ok(removed)
    }

    /// Append previously persisted custom entries.
    ///
    /// Entries that are not in the custom id space or collide with an
    /// existing id are skipped with a warning. Entries whose zone, color or
    /// labels no longer validate are kept as stored and logged; a zone that
    /// does not resolve fails per pass in the ticker. Returns the number
    /// restored.
    pub fn restore_custom(&mut self, entries: Vec<TimezoneEntry>) -> usize {
        let mut restored: usize = 0;
        for entry in entries {
            if !entry.is_custom() {
                warn!(id = %entry.id, "skipping stored entry outside the custom id space");
                continue;
            }
            if self.contains(&entry.id) {
                warn!(id = %entry.id, "skipping stored entry with a duplicate id");
                continue;
            }
            if let Err(e) = validate_entry(&entry) {
                warn!(
                    id = %entry.id,
                    error = %e,
                    "keeping stored entry that no longer validates"
                );
            }
            self.entries.push(entry);
            restored = restored.saturating_add(1);
        }
        if restored > 0 {
            debug!(restored, "custom timezones restored");
        }
        restored
    }

    fn free_custom_id(&self, created_at_ms: i64) -> Result<EntryId, RegistryError> {
        let mut stamp = created_at_ms;
        loop {
            let id = EntryId::custom(stamp);
            if !self.contains(&id) {
                return Ok(id);
            }
            stamp = stamp
                .checked_add(1)
                .ok_or(RegistryError::IdSpaceExhausted { created_at_ms })?;
        }
    }
}

fn validate_entry(entry: &TimezoneEntry) -> Result<(), RegistryError> {
    let blank: Vec<&str> = [
        ("id", entry.id.as_str()),
        ("city", entry.city.as_str()),
        ("country", entry.country.as_str()),
        ("timezone", entry.timezone_name.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect();
    if !blank.is_empty() {
        return Err(RegistryError::Validation {
            reason: format!("entry {} has blank fields: {}", entry.id, blank.join(", ")),
        });
    }
    if !clock::is_known_zone(&entry.timezone_name) {
        return Err(RegistryError::Validation {
            reason: format!("unknown timezone: {}", entry.timezone_name),
        });
    }
    if !entry.accent_color.is_valid() {
        return Err(RegistryError::Validation {
            reason: format!("invalid color {} on entry {}", entry.accent_color, entry.id),
        });
    }
    Ok(())
}
