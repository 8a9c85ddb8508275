// ➕ Extra Roster - user-added entries merged into the canonical roster
// Ordered by insertion; each carries a user-chosen sort id that decides
// where it sits in the view (not required unique or contiguous).

use serde::{Deserialize, Serialize};

use crate::catalog::{display_id, ReferenceEntry};

/// A user-added roster entry
///
/// Field names match the persisted `extras` slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraEntry {
    pub key: String,
    pub name: String,
    /// User-chosen sort id
    #[serde(rename = "apiId")]
    pub sort_id: u32,
    pub display_id: String,
    #[serde(default)]
    pub is_trainer: bool,
    /// Default image supplied when the entry was added
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_image: Option<String>,
}

impl ExtraEntry {
    /// Manual entry: key is `<id>-<name lowercased, spaces → '-'>`
    pub fn manual(name: &str, sort_id: u32, is_trainer: bool) -> Self {
        let slug = name.trim().to_lowercase().replace(' ', "-");

        ExtraEntry {
            key: format!("{}-{}", sort_id, slug),
            name: name.trim().to_string(),
            sort_id,
            display_id: display_id(sort_id),
            is_trainer,
            card_image: None,
        }
    }

    /// Entry picked from a reference list: key is `<id>-<name lowercased>`
    pub fn from_reference(entry: &ReferenceEntry) -> Self {
        ExtraEntry {
            key: format!("{}-{}", entry.id, entry.name.to_lowercase()),
            name: entry.name.to_string(),
            sort_id: entry.id,
            display_id: display_id(entry.id),
            is_trainer: false,
            card_image: None,
        }
    }

    /// Builder pattern: attach a default image (empty = none)
    pub fn with_card_image(mut self, url: Option<String>) -> Self {
        self.card_image = url.filter(|u| !u.trim().is_empty());
        self
    }
}

/// User-added entries in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtraRoster {
    entries: Vec<ExtraEntry>,
}

impl ExtraRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ExtraEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ExtraEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Append; key uniqueness is checked by the caller against every namespace
    pub fn push(&mut self, entry: ExtraEntry) {
        self.entries.push(entry);
    }

    /// Remove by key, returning the entry if it existed
    pub fn remove(&mut self, key: &str) -> Option<ExtraEntry> {
        let pos = self.entries.iter().position(|e| e.key == key)?;
        Some(self.entries.remove(pos))
    }

    /// Entries ordered by sort id; ties keep insertion order
    pub fn sorted(&self) -> Vec<&ExtraEntry> {
        let mut sorted: Vec<&ExtraEntry> = self.entries.iter().collect();
        sorted.sort_by_key(|e| e.sort_id);
        sorted
    }
}
