// 🧩 Collection State - the three mutable stores and their invariants
//
// Pure, in-memory mutations. Persistence and confirmation live one level up
// in `Collection`; everything here either fully applies or changes nothing.
//
// Invariants kept by these operations:
// - keys are unique across canonical, extra and slot namespaces
// - every slot key resolves to exactly one parent
// - deleting an extra cascades to its record, its slots and their records
// - deleting a slot touches only its own record and its parent's list

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::roster::{ExtraEntry, ExtraRoster};
use crate::slots::{slot_key, SlotRegistry};
use crate::store::CollectionStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionState {
    pub records: CollectionStore,
    pub slots: SlotRegistry,
    pub extras: ExtraRoster,
}

impl CollectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Is `key` taken in any namespace
    pub fn key_exists(&self, catalog: &Catalog, key: &str) -> bool {
        catalog.contains_key(key)
            || self.extras.contains_key(key)
            || self.slots.is_slot(key)
            || self.records.get(key).is_some()
    }

    /// Is `key` a roster entry (canonical or extra) that slots can hang off
    pub fn is_roster_key(&self, catalog: &Catalog, key: &str) -> bool {
        catalog.contains_key(key) || self.extras.contains_key(key)
    }

    /// Register a new slot under `parent`
    ///
    /// `suffix` is the clock reading; on a collision with any existing key
    /// the suffix is bumped until free rather than overwriting.
    pub fn add_slot(&mut self, catalog: &Catalog, parent: &str, suffix: i64) -> String {
        let mut candidate = suffix;
        loop {
            let key = slot_key(parent, &candidate.to_string());
            if !self.key_exists(catalog, &key) {
                self.slots.register(parent, candidate.to_string());
                debug!(parent, key = %key, "slot added");
                return key;
            }
            candidate += 1;
        }
    }

    /// Remove one slot and its record. `None` when `key` is not a slot.
    pub fn remove_slot(&mut self, key: &str) -> Option<String> {
        let parent = self.slots.unregister(key)?;
        self.records.delete(key);
        debug!(key, parent = %parent, "slot removed");
        Some(parent)
    }

    /// Swap a slot's record with its parent's. `None` when `key` is not a slot.
    pub fn promote(&mut self, key: &str) -> Option<String> {
        let parent = self.slots.parent_of(key)?.to_string();
        self.records.swap(&parent, key);
        debug!(key, parent = %parent, "slot promoted");
        Some(parent)
    }

    /// Add an extra entry; `false` if its key is already taken
    pub fn add_extra(&mut self, catalog: &Catalog, entry: ExtraEntry) -> bool {
        if self.key_exists(catalog, &entry.key) {
            return false;
        }
        debug!(key = %entry.key, sort_id = entry.sort_id, "extra entry added");
        self.extras.push(entry);
        true
    }

    /// Delete an extra entry with its whole subtree. `None` if absent.
    pub fn delete_extra(&mut self, key: &str) -> Option<ExtraEntry> {
        let entry = self.extras.remove(key)?;
        self.records.delete(key);
        for slot in self.slots.remove_parent(key) {
            self.records.delete(&slot);
        }
        debug!(key, "extra entry deleted");
        Some(entry)
    }

    /// Same visible state (default records count as absent, extras
    /// compare in the sort-id order the view lays them out in)
    pub fn equivalent(&self, other: &CollectionState) -> bool {
        self.records.equivalent(&other.records)
            && self.slots == other.slots
            && self.extras.sorted() == other.extras.sorted()
    }
}
