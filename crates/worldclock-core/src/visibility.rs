//! Which registry entries are shown.
//!
//! The set only ever holds ids that exist in the registry: every constructor
//! and mutation takes the registry, and [`VisibilitySet::prune`] drops ids
//! whose entry has gone away.

use std::collections::BTreeSet;

use tracing::debug;
use worldclock_types::EntryId;

use crate::registry::TimezoneRegistry;

/// Errors returned by visibility changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VisibilityError {
    /// The id does not name a registry entry.
    #[error("entry not found: {0}")]
    NotFound(EntryId),
}

/// The subset of registry ids currently shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilitySet {
    ids: BTreeSet<EntryId>,
}

impl VisibilitySet {
    /// Every entry in `registry` visible.
    pub fn all_of(registry: &TimezoneRegistry) -> Self {
        Self {
            ids: registry.list().iter().map(|e| e.id.clone()).collect(),
        }
    }

    /// Nothing visible.
    pub const fn empty() -> Self {
        Self {
            ids: BTreeSet::new(),
        }
    }

    /// Build from stored ids, dropping any that are not in `registry`.
    /// Returns the set and the number of ids dropped.
    pub fn from_ids(
        ids: impl IntoIterator<Item = EntryId>,
        registry: &TimezoneRegistry,
    ) -> (Self, usize) {
        let mut dropped: usize = 0;
        let ids = ids
            .into_iter()
            .filter(|id| {
                let known = registry.contains(id);
                if !known {
                    debug!(id = %id, "dropping stale visible id");
                    dropped = dropped.saturating_add(1);
                }
                known
            })
            .collect();
        (Self { ids }, dropped)
    }

    /// Whether `id` is shown.
    pub fn is_visible(&self, id: &EntryId) -> bool {
        self.ids.contains(id)
    }

    /// Show or hide `id`. Returns whether the set changed.
    ///
    /// # Errors
    ///
    /// Returns [`VisibilityError::NotFound`] if `id` is not in `registry`.
    pub fn set_visible(
        &mut self,
        registry: &TimezoneRegistry,
        id: &EntryId,
        visible: bool,
    ) -> Result<bool, VisibilityError> {
        if !registry.contains(id) {
            return Err(VisibilityError::NotFound(id.clone()));
        }
        Ok(if visible {
            self.ids.insert(id.clone())
        } else {
            self.ids.remove(id)
        })
    }

    /// Flip `id` and return its new visibility.
    ///
    /// # Errors
    ///
    /// Returns [`VisibilityError::NotFound`] if `id` is not in `registry`.
    pub fn toggle(
        &mut self,
        registry: &TimezoneRegistry,
        id: &EntryId,
    ) -> Result<bool, VisibilityError> {
        let visible = !self.is_visible(id);
        self.set_visible(registry, id, visible)?;
        Ok(visible)
    }

    /// Show every entry in `registry`.
    pub fn select_all(&mut self, registry: &TimezoneRegistry) {
        *self = Self::all_of(registry);
    }

    /// Hide everything.
    pub fn deselect_all(&mut self) {
        self.ids.clear();
    }

    /// Forget `id`, e.g. after its entry was removed.
    pub fn remove(&mut self, id: &EntryId) -> bool {
        self.ids.remove(id)
    }

    /// Drop ids no longer in `registry`. Returns how many were dropped.
    pub fn prune(&mut self, registry: &TimezoneRegistry) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| registry.contains(id));
        before.saturating_sub(self.ids.len())
    }

    /// Visible ids in registry display order.
    pub fn ordered_ids(&self, registry: &TimezoneRegistry) -> Vec<EntryId> {
        registry
            .list()
            .iter()
            .filter(|e| self.ids.contains(&e.id))
            .map(|e| e.id.clone())
            .collect()
    }

    /// Number of visible entries.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
