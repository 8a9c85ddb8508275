// 🖼️ View Engine - ordered projection of the whole collection
//
// Pure function of (catalog, extras, slots, records, filters, sort mode).
// Recomputed wholesale on any change; never fails.
//
// Pipeline:
// 1. canonical items (in range) + extras sorted by sort id
// 2. drop trainers when trainers are hidden
// 3. stable sort by sort id, non-trainer before trainer on ties
// 4. optional stable re-sort by parsed valuation
// 5. optional slot expansion after each base entry (rarity-ranked)
// 6. predicate pass: search, ownership, rarity (canonical entries exempt
//    from rarity)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::Catalog;
use crate::filter::{FilterSettings, SortMode};
use crate::record::{BinderRecord, Rarity};
use crate::state::CollectionState;

pub const CARD_BACK_URL: &str = "https://tcg.pokemon.com/assets/img/global/tcg-card-back-2x.jpg";
const SET_IMAGE_BASE: &str = "https://images.pokemontcg.io/sv3pt5";

// ============================================================================
// ENTRY CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryCategory {
    /// Canonical catalog entry
    Base,
    /// User-added extra entry
    Manual,
    /// Duplicate slot under a parent
    Slot,
}

impl EntryCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryCategory::Base => "Base",
            EntryCategory::Manual => "Manual",
            EntryCategory::Slot => "Slot",
        }
    }

    /// Manual and Slot rows shape the roster and must survive a backup
    pub fn is_structural(&self) -> bool {
        matches!(self, EntryCategory::Manual | EntryCategory::Slot)
    }
}

impl fmt::Display for EntryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Base" => Ok(EntryCategory::Base),
            "Manual" => Ok(EntryCategory::Manual),
            "Slot" => Ok(EntryCategory::Slot),
            other => Err(other.to_string()),
        }
    }
}

// ============================================================================
// VIEW ENTRY
// ============================================================================

/// Which image a view entry resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Ideal,
    Dream,
    FanArt,
    Primary,
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImage {
    pub url: String,
    pub kind: ImageKind,
}

/// Roster item (or slot) joined with its record. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewEntry {
    pub key: String,
    /// Roster name (slots: parent name + " (Slot)")
    pub name: String,
    pub sort_id: u32,
    pub display_id: String,
    pub category: EntryCategory,
    pub parent_key: Option<String>,
    pub is_trainer: bool,
    pub is_base: bool,
    pub card_image: Option<String>,
    /// The record, or the default record when none exists
    pub record: BinderRecord,
}

impl ViewEntry {
    /// Record name override, else roster name
    pub fn display_name(&self) -> &str {
        self.record.name_override().unwrap_or(&self.name)
    }

    pub fn is_owned(&self) -> bool {
        self.record.owned
    }

    pub fn rarity(&self) -> Rarity {
        self.record.rarity
    }

    pub fn amount(&self) -> f64 {
        self.record.value.amount()
    }

    /// Image the grid shows for this entry under the current preferences
    pub fn display_image(&self, filters: &FilterSettings) -> ResolvedImage {
        let r = &self.record;
        let pick = |url: &str, kind| ResolvedImage {
            url: url.to_string(),
            kind,
        };

        if self.is_base && filters.base_set_art && self.sort_id <= 151 {
            return pick(&format!("{}/{}_hires.png", SET_IMAGE_BASE, self.sort_id), ImageKind::Default);
        }

        if !r.ideal_url.is_empty() && filters.show_ideal {
            pick(&r.ideal_url, ImageKind::Ideal)
        } else if !r.dream_url.is_empty() && filters.show_dream {
            pick(&r.dream_url, ImageKind::Dream)
        } else if !r.fan_art_url.is_empty() && filters.show_fan_art {
            pick(&r.fan_art_url, ImageKind::FanArt)
        } else if !r.url.is_empty() {
            pick(&r.url, ImageKind::Primary)
        } else if !r.ideal_url.is_empty() {
            pick(&r.ideal_url, ImageKind::Ideal)
        } else if !r.dream_url.is_empty() {
            pick(&r.dream_url, ImageKind::Dream)
        } else if !r.fan_art_url.is_empty() {
            pick(&r.fan_art_url, ImageKind::FanArt)
        } else {
            pick(&self.default_image(), ImageKind::Default)
        }
    }

    /// Fallback artwork when the user has attached nothing
    pub fn default_image(&self) -> String {
        if let Some(image) = &self.card_image {
            return image.clone();
        }
        if self.is_trainer {
            return CARD_BACK_URL.to_string();
        }
        if self.is_base && self.sort_id <= 151 {
            return format!("{}/{}.png", SET_IMAGE_BASE, self.sort_id);
        }
        CARD_BACK_URL.to_string()
    }

    fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&query)
            || self.display_name().to_lowercase().contains(&query)
            || self.display_id.contains(&query)
    }
}

// ============================================================================
// STATS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewStats {
    pub total: usize,
    pub owned: usize,
    /// Rounded owned/total percentage
    pub percentage: u32,
    /// Sum of every record's valuation, visible or not
    pub total_value: f64,
}

// ============================================================================
// VIEW ENGINE
// ============================================================================

pub struct ViewEngine<'a> {
    catalog: &'a Catalog,
    state: &'a CollectionState,
}

impl<'a> ViewEngine<'a> {
    pub fn new(catalog: &'a Catalog, state: &'a CollectionState) -> Self {
        ViewEngine { catalog, state }
    }

    /// Full pipeline: ordered, expanded and filtered
    pub fn build(&self, filters: &FilterSettings, sort: SortMode) -> Vec<ViewEntry> {
        let mut entries = self.roster(filters, sort);
        entries.retain(|entry| Self::passes(entry, filters));
        entries
    }

    /// Steps 1-5: ordered and slot-expanded, no predicate pass
    pub fn roster(&self, filters: &FilterSettings, sort: SortMode) -> Vec<ViewEntry> {
        let mut base = self.base_sequence(filters);

        if !filters.show_trainers {
            base.retain(|e| !e.is_trainer);
        }

        // Stable: equal (sort id, trainer) pairs keep definition order
        base.sort_by_key(|e| (e.sort_id, e.is_trainer));

        match sort {
            SortMode::Dex => {}
            SortMode::ValueHigh => base.sort_by(|a, b| b.amount().total_cmp(&a.amount())),
            SortMode::ValueLow => base.sort_by(|a, b| a.amount().total_cmp(&b.amount())),
        }

        if !filters.show_slots {
            return base;
        }

        let mut expanded = Vec::with_capacity(base.len());
        for entry in base {
            let mut slots = self.slots_for(&entry);
            if filters.rank_slots_by_rarity {
                slots.sort_by_key(|s| s.rarity().rank());
            }
            expanded.push(entry);
            expanded.extend(slots);
        }
        expanded
    }

    /// Step 6 predicate
    pub fn passes(entry: &ViewEntry, filters: &FilterSettings) -> bool {
        if !entry.matches_search(&filters.search) {
            return false;
        }

        let owned = entry.is_owned();
        if owned && !filters.show_owned {
            return false;
        }
        if !owned && !filters.show_missing {
            return false;
        }

        // Canonical entries always pass the rarity checkboxes
        if entry.category == EntryCategory::Base {
            return true;
        }

        filters.shows_rarity(entry.rarity())
    }

    /// Stats over a built view plus the whole store's value
    pub fn stats(&self, entries: &[ViewEntry]) -> ViewStats {
        let total = entries.len();
        let owned = entries.iter().filter(|e| e.is_owned()).count();
        let percentage = if total > 0 {
            ((owned as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };

        ViewStats {
            total,
            owned,
            percentage,
            total_value: self.state.records.total_value(),
        }
    }

    /// Look up a single entry (roster item or slot) by key
    pub fn entry(&self, key: &str) -> Option<ViewEntry> {
        if let Some(parent) = self.state.slots.parent_of(key) {
            let parent_entry = self.roster_entry(parent)?;
            return Some(self.slot_entry(&parent_entry, key.to_string()));
        }
        self.roster_entry(key)
    }

    fn roster_entry(&self, key: &str) -> Option<ViewEntry> {
        if let Some(item) = self.catalog.get(key) {
            return Some(self.canonical_entry(item));
        }
        self.state.extras.get(key).map(|extra| self.extra_entry(extra))
    }

    fn base_sequence(&self, filters: &FilterSettings) -> Vec<ViewEntry> {
        let canonical = self
            .catalog
            .items()
            .iter()
            .filter(|item| filters.in_range(item.id))
            .map(|item| self.canonical_entry(item));

        let extras = self
            .state
            .extras
            .sorted()
            .into_iter()
            .filter(|extra| filters.in_range(extra.sort_id))
            .map(|extra| self.extra_entry(extra));

        canonical.chain(extras).collect()
    }

    fn canonical_entry(&self, item: &crate::catalog::CatalogItem) -> ViewEntry {
        let key = item.key();
        ViewEntry {
            record: self.state.records.get_or_default(&key),
            key,
            name: item.name.clone(),
            sort_id: item.id,
            display_id: item.display_id(),
            category: EntryCategory::Base,
            parent_key: None,
            is_trainer: item.is_trainer,
            is_base: item.is_base,
            card_image: None,
        }
    }

    fn extra_entry(&self, extra: &crate::roster::ExtraEntry) -> ViewEntry {
        ViewEntry {
            key: extra.key.clone(),
            name: extra.name.clone(),
            sort_id: extra.sort_id,
            display_id: extra.display_id.clone(),
            category: EntryCategory::Manual,
            parent_key: None,
            is_trainer: extra.is_trainer,
            is_base: false,
            card_image: extra.card_image.clone(),
            record: self.state.records.get_or_default(&extra.key),
        }
    }

    fn slots_for(&self, parent: &ViewEntry) -> Vec<ViewEntry> {
        self.state
            .slots
            .slot_keys(&parent.key)
            .into_iter()
            .map(|key| self.slot_entry(parent, key))
            .collect()
    }

    fn slot_entry(&self, parent: &ViewEntry, key: String) -> ViewEntry {
        ViewEntry {
            record: self.state.records.get_or_default(&key),
            key,
            name: format!("{} (Slot)", parent.name),
            sort_id: parent.sort_id,
            display_id: parent.display_id.clone(),
            category: EntryCategory::Slot,
            parent_key: Some(parent.key.clone()),
            is_trainer: parent.is_trainer,
            is_base: false,
            card_image: parent.card_image.clone(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
