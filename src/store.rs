// 💾 Collection Store - key → BinderRecord
//
// Lookups are total: a missing record reads as the default record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::record::{BinderRecord, RecordPatch};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionStore {
    records: BTreeMap<String, BinderRecord>,
}

impl CollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&BinderRecord> {
        self.records.get(key)
    }

    /// Record for `key`, or the default record when none exists
    pub fn get_or_default(&self, key: &str) -> BinderRecord {
        self.records.get(key).cloned().unwrap_or_default()
    }

    pub fn is_owned(&self, key: &str) -> bool {
        self.records.get(key).is_some_and(|r| r.owned)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BinderRecord)> {
        self.records.iter()
    }

    /// Merge a partial update into the record for `key`
    pub fn upsert(&mut self, key: &str, patch: &RecordPatch) -> &BinderRecord {
        let merged = BinderRecord::merge(self.records.get(key), patch);
        self.records.insert(key.to_string(), merged);
        &self.records[key]
    }

    /// Flip ownership, creating a fresh record if needed; returns the new flag
    pub fn toggle_owned(&mut self, key: &str) -> bool {
        let record = self.records.entry(key.to_string()).or_default();
        record.owned = !record.owned;
        record.owned
    }

    pub fn insert(&mut self, key: &str, record: BinderRecord) {
        self.records.insert(key.to_string(), record);
    }

    /// Idempotent delete
    pub fn delete(&mut self, key: &str) -> Option<BinderRecord> {
        self.records.remove(key)
    }

    /// Exchange records between two keys in place
    ///
    /// An absent side removes the destination instead of fabricating one.
    pub fn swap(&mut self, a: &str, b: &str) {
        let rec_a = self.records.remove(a);
        let rec_b = self.records.remove(b);

        if let Some(rec) = rec_b {
            self.records.insert(a.to_string(), rec);
        }
        if let Some(rec) = rec_a {
            self.records.insert(b.to_string(), rec);
        }
    }

    /// Same visible contents: records equal to the default count as absent
    pub fn equivalent(&self, other: &CollectionStore) -> bool {
        let meaningful = |store: &CollectionStore| -> BTreeMap<String, BinderRecord> {
            store
                .records
                .iter()
                .filter(|(_, r)| !r.is_default())
                .map(|(k, r)| (k.clone(), r.clone()))
                .collect()
        };

        meaningful(self) == meaningful(other)
    }

    /// Sum of every record's parsed valuation
    pub fn total_value(&self) -> f64 {
        self.records.values().map(|r| r.value.amount()).sum()
    }
}
