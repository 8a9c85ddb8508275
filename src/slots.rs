// 🗂️ Slot Registry - duplicate copies of roster entries
//
// parent key → ordered list of slot suffix ids
// The full slot key is derived: `<parent>_slot_<suffix>`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const SLOT_INFIX: &str = "_slot_";

/// Derive the full key for a slot suffix under a parent
pub fn slot_key(parent: &str, suffix: &str) -> String {
    format!("{}{}{}", parent, SLOT_INFIX, suffix)
}

/// Recover the suffix of `key` if it was derived from `parent`
pub fn slot_suffix<'a>(parent: &str, key: &'a str) -> Option<&'a str> {
    key.strip_prefix(parent)?
        .strip_prefix(SLOT_INFIX)
        .filter(|suffix| !suffix.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotRegistry {
    slots: BTreeMap<String, Vec<String>>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Suffix ids under a parent, in registration order
    pub fn suffixes(&self, parent: &str) -> &[String] {
        self.slots.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Full slot keys under a parent, in registration order
    pub fn slot_keys(&self, parent: &str) -> Vec<String> {
        self.suffixes(parent)
            .iter()
            .map(|suffix| slot_key(parent, suffix))
            .collect()
    }

    /// Every (parent, suffixes) pair
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.slots.iter()
    }

    /// Reverse lookup: which parent owns this slot key
    pub fn parent_of(&self, key: &str) -> Option<&str> {
        self.slots
            .iter()
            .find(|(parent, suffixes)| {
                slot_suffix(parent, key).is_some_and(|s| suffixes.iter().any(|x| x == s))
            })
            .map(|(parent, _)| parent.as_str())
    }

    pub fn is_slot(&self, key: &str) -> bool {
        self.parent_of(key).is_some()
    }

    /// Append a suffix under a parent
    pub fn register(&mut self, parent: &str, suffix: String) {
        self.slots.entry(parent.to_string()).or_default().push(suffix);
    }

    /// Remove one slot key; empty parent lists are dropped
    ///
    /// Returns the parent it was removed from, or `None` when the key is
    /// not a registered slot.
    pub fn unregister(&mut self, key: &str) -> Option<String> {
        let parent = self.parent_of(key)?.to_string();
        let suffix = slot_suffix(&parent, key)?.to_string();

        if let Some(list) = self.slots.get_mut(&parent) {
            list.retain(|s| *s != suffix);
            if list.is_empty() {
                self.slots.remove(&parent);
            }
        }

        Some(parent)
    }

    /// Drop a parent's whole subtree, returning the removed slot keys
    pub fn remove_parent(&mut self, parent: &str) -> Vec<String> {
        self.slots
            .remove(parent)
            .unwrap_or_default()
            .iter()
            .map(|suffix| slot_key(parent, suffix))
            .collect()
    }
}
