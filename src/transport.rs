// 📦 Transport - backup and restore
//
// Two formats:
// - tabular CSV backup covering records, extras and slots
// - whole-store JSON snapshot covering records only
//
// Imports are parse-then-swap: the caller only sees a fully built result,
// so any parse failure leaves prior state untouched.

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::catalog::{display_id, Catalog};
use crate::error::TransportError;
use crate::filter::{FilterSettings, SortMode};
use crate::record::{BinderRecord, Rarity, Valuation};
use crate::roster::ExtraEntry;
use crate::slots::slot_suffix;
use crate::state::CollectionState;
use crate::store::CollectionStore;
use crate::view::{EntryCategory, ViewEngine};

pub const CSV_HEADERS: [&str; 14] = [
    "SystemKey", "Name", "ApiId", "DisplayId", "Category", "ParentKey", "Owned", "Value",
    "ImageURL", "FanArtURL", "CardType", "DreamURL", "IdealURL", "IsTrainer",
];

/// Rows shorter than this are skipped, not fatal
pub const MIN_COLUMNS: usize = 9;

// ============================================================================
// IMPORT MODE
// ============================================================================

/// What a CSV import replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportMode {
    /// Records, extras and slots are all replaced by the file's contents
    #[default]
    FullReplace,
    /// Only records are replaced; extras and slots are kept as they are
    RecordsOnly,
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::FullReplace => write!(f, "full-replace"),
            ImportMode::RecordsOnly => write!(f, "records-only"),
        }
    }
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full-replace" => Ok(ImportMode::FullReplace),
            "records-only" => Ok(ImportMode::RecordsOnly),
            other => Err(format!("Unknown import mode: {}", other)),
        }
    }
}

// ============================================================================
// CSV EXPORT
// ============================================================================

fn flag(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// Serialize the collection to the tabular backup format
///
/// One row per entry that carries data, plus every Manual and Slot entry
/// even when empty so the roster shape survives. Built from the unfiltered
/// roster in registration order regardless of the current view settings.
pub fn export_csv(catalog: &Catalog, state: &CollectionState) -> Result<String, TransportError> {
    let mut filters = FilterSettings::unfiltered();
    filters.rank_slots_by_rarity = false;
    let entries = ViewEngine::new(catalog, state).roster(&filters, SortMode::Dex);

    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;

    let mut rows = 0;
    for entry in &entries {
        let r = &entry.record;
        if r.is_default() && !entry.category.is_structural() {
            continue;
        }

        let sort_id = entry.sort_id.to_string();
        writer.write_record([
            entry.key.as_str(),
            entry.display_name(),
            sort_id.as_str(),
            entry.display_id.as_str(),
            entry.category.as_str(),
            entry.parent_key.as_deref().unwrap_or(""),
            flag(r.owned),
            r.value.text(),
            r.url.as_str(),
            r.fan_art_url.as_str(),
            r.rarity.as_str(),
            r.dream_url.as_str(),
            r.ideal_url.as_str(),
            flag(entry.is_trainer),
        ])?;
        rows += 1;
    }

    let bytes = writer.into_inner().map_err(|e| TransportError::Io(e.into_error()))?;
    info!(rows, "collection exported to CSV");
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// ============================================================================
// CSV IMPORT
// ============================================================================

/// One validated data row
#[derive(Debug, Clone)]
struct ImportRow {
    key: String,
    name: String,
    sort_id: u32,
    display_id: String,
    category: EntryCategory,
    parent_key: String,
    owned: bool,
    value: String,
    url: String,
    fan_art_url: String,
    rarity: Rarity,
    dream_url: String,
    ideal_url: String,
    is_trainer: bool,
}

impl ImportRow {
    fn parse(record: &StringRecord) -> Result<Self, TransportError> {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let field = |i: usize| record.get(i).unwrap_or("").to_string();

        let category = match field(4).trim() {
            "" => EntryCategory::Base,
            other => other.parse::<EntryCategory>().map_err(|category| TransportError::UnknownCategory {
                line,
                category,
            })?,
        };

        let raw_id = field(2);
        let sort_id = match raw_id.trim().parse::<u32>() {
            Ok(id) => id,
            // Only Manual rows need their id to place them in the roster
            Err(_) if category != EntryCategory::Manual => 0,
            Err(_) => return Err(TransportError::InvalidId { line, value: raw_id }),
        };

        let key = field(0);
        let parent_key = field(5);
        if category == EntryCategory::Slot
            && !parent_key.is_empty()
            && slot_suffix(&parent_key, &key).is_none()
        {
            return Err(TransportError::SlotKeyMismatch {
                line,
                key,
                parent: parent_key,
            });
        }

        Ok(ImportRow {
            key,
            name: field(1),
            sort_id,
            display_id: field(3),
            category,
            parent_key,
            owned: field(6).trim().eq_ignore_ascii_case("true"),
            value: field(7),
            url: field(8),
            fan_art_url: field(9),
            rarity: Rarity::from_label(&field(10)),
            dream_url: field(11),
            ideal_url: field(12),
            is_trainer: field(13).trim().eq_ignore_ascii_case("true"),
        })
    }

    fn has_data(&self) -> bool {
        self.owned
            || !self.value.is_empty()
            || !self.url.is_empty()
            || !self.fan_art_url.is_empty()
            || !self.dream_url.is_empty()
            || !self.ideal_url.is_empty()
            || !self.rarity.is_standard()
    }
}

/// Parse a tabular backup into a brand new state
///
/// The header row is mandatory and discarded. Short rows are skipped;
/// anything else malformed fails the whole import.
pub fn import_csv(catalog: &Catalog, text: &str) -> Result<CollectionState, TransportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    match records.next() {
        Some(header) => {
            header?;
        }
        None => return Err(TransportError::MissingHeader),
    }

    let mut rows = Vec::new();
    let mut skipped = 0;
    for result in records {
        let record = result?;
        if record.len() < MIN_COLUMNS {
            debug!(
                line = record.position().map(|p| p.line()).unwrap_or(0),
                columns = record.len(),
                "skipping short CSV row"
            );
            skipped += 1;
            continue;
        }
        rows.push(ImportRow::parse(&record)?);
    }

    let mut state = CollectionState::new();

    // Roster shape first, so slot names can resolve their parents
    for row in &rows {
        match row.category {
            EntryCategory::Manual => {
                if state.extras.contains_key(&row.key) {
                    warn!(key = %row.key, "duplicate manual entry in backup, keeping first");
                    continue;
                }
                let display = if row.display_id.is_empty() {
                    display_id(row.sort_id)
                } else {
                    row.display_id.clone()
                };
                state.extras.push(ExtraEntry {
                    key: row.key.clone(),
                    name: row.name.clone(),
                    sort_id: row.sort_id,
                    display_id: display,
                    is_trainer: row.is_trainer,
                    card_image: None,
                });
            }
            EntryCategory::Slot if !row.parent_key.is_empty() => {
                if state.slots.is_slot(&row.key) {
                    continue;
                }
                if let Some(suffix) = slot_suffix(&row.parent_key, &row.key) {
                    state.slots.register(&row.parent_key, suffix.to_string());
                }
            }
            _ => {}
        }
    }

    for row in &rows {
        let default_name = roster_name(catalog, &state, row);
        let name_override = if !row.name.is_empty() && default_name.as_deref() != Some(row.name.as_str()) {
            row.name.clone()
        } else {
            String::new()
        };

        if !row.has_data() && name_override.is_empty() {
            continue;
        }

        state.records.insert(
            &row.key,
            BinderRecord {
                name: name_override,
                owned: row.owned,
                value: Valuation::new(row.value.clone()),
                url: row.url.clone(),
                fan_art_url: row.fan_art_url.clone(),
                dream_url: row.dream_url.clone(),
                ideal_url: row.ideal_url.clone(),
                rarity: row.rarity,
            },
        );
    }

    info!(
        rows = rows.len(),
        skipped,
        records = state.records.len(),
        extras = state.extras.len(),
        "CSV backup parsed"
    );
    Ok(state)
}

/// The name a row would display without any override
fn roster_name(catalog: &Catalog, state: &CollectionState, row: &ImportRow) -> Option<String> {
    let lookup = |key: &str| -> Option<String> {
        catalog
            .get(key)
            .map(|item| item.name.clone())
            .or_else(|| state.extras.get(key).map(|e| e.name.clone()))
    };

    match row.category {
        EntryCategory::Slot => lookup(&row.parent_key).map(|name| format!("{} (Slot)", name)),
        _ => lookup(&row.key),
    }
}

// ============================================================================
// JSON SNAPSHOT
// ============================================================================

/// Whole-store snapshot: key → record
pub fn export_snapshot(store: &CollectionStore) -> Result<String, TransportError> {
    Ok(serde_json::to_string_pretty(store)?)
}

/// Parse a snapshot; a malformed payload fails as a whole
pub fn import_snapshot(text: &str) -> Result<CollectionStore, TransportError> {
    let store: CollectionStore = serde_json::from_str(text)?;
    info!(records = store.len(), "snapshot parsed");
    Ok(store)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ImageField, RecordPatch};
    use pretty_assertions::assert_eq;

    fn catalog() -> Catalog {
        Catalog::from_names(1, &["One", "Two", "Three"])
    }

    #[test]
    fn test_export_skips_empty_canonical_rows() {
        let catalog = catalog();
        let mut state = CollectionState::new();
        state.records.toggle_owned("1");

        let csv = export_csv(&catalog, &state).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("SystemKey,Name,ApiId"));
        assert_eq!(lines[1], "1,One,1,001,Base,,TRUE,,,,standard,,,FALSE");
    }

    #[test]
    fn test_export_keeps_structural_rows() {
        let catalog = catalog();
        let mut state = CollectionState::new();
        state.add_extra(&catalog, ExtraEntry::manual("Custom", 150, false));
        let slot = state.add_slot(&catalog, "2", 77);

        let csv = export_csv(&catalog, &state).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], format!("{},Two (Slot),2,002,Slot,2,FALSE,,,,standard,,,FALSE", slot));
        assert_eq!(lines[2], "150-custom,Custom,150,150,Manual,,FALSE,,,,standard,,,FALSE");
    }

    #[test]
    fn test_export_quotes_embedded_quotes_and_commas() {
        let catalog = catalog();
        let mut state = CollectionState::new();
        state.records.upsert("3", &RecordPatch::new().with_value("£1,200").with_name("The \"Best\""));

        let csv = export_csv(&catalog, &state).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("\"The \"\"Best\"\"\""));
        assert!(row.contains("\"£1,200\""));
    }

    #[test]
    fn test_round_trip() {
        let catalog = catalog();
        let mut state = CollectionState::new();
        state.add_extra(&catalog, ExtraEntry::manual("Coach", 2, true));
        state.add_extra(&catalog, ExtraEntry::manual("Custom", 150, false));
        let a = state.add_slot(&catalog, "2", 10);
        let b = state.add_slot(&catalog, "2", 11);
        let c = state.add_slot(&catalog, "150-custom", 12);

        state.records.upsert("1", &RecordPatch::new().with_name("Uno").with_value("1,5"));
        state.records.upsert(&a, &RecordPatch::new().with_rarity(Rarity::Vmax).with_owned(true));
        state.records.upsert(
            &c,
            &RecordPatch::new()
                .with_image(ImageField::Ideal, "https://img/\"i\".png")
                .with_image(ImageField::Dream, "d")
                .with_image(ImageField::FanArt, "f"),
        );
        state.records.toggle_owned("150-custom");
        let _ = b;

        let csv = export_csv(&catalog, &state).unwrap();
        let restored = import_csv(&catalog, &csv).unwrap();

        assert_eq!(restored.extras, state.extras);
        assert_eq!(restored.slots, state.slots);
        assert_eq!(restored.records, state.records);
    }

    #[test]
    fn test_import_scenario() {
        let catalog = catalog();
        let csv = "SystemKey,Name,ApiId,DisplayId,Category,ParentKey,Owned,Value,ImageURL,FanArtURL,CardType,DreamURL,IdealURL,IsTrainer\n\
                   1,One,1,001,Base,,TRUE,,,,standard,,,FALSE\n\
                   2_slot_99,Two (Slot),2,002,Slot,2,TRUE,,,,standard,,,FALSE\n\
                   150-custom,Custom,150,150,Manual,,FALSE,,,,standard,,,FALSE\n";

        let state = import_csv(&catalog, csv).unwrap();

        let owned: Vec<&String> = state.records.iter().filter(|(_, r)| r.owned).map(|(k, _)| k).collect();
        assert_eq!(owned, vec!["1", "2_slot_99"]);
        assert_eq!(state.extras.get("150-custom").unwrap().sort_id, 150);
        assert_eq!(state.slots.suffixes("2"), &["99".to_string()]);
        // Empty structural rows create no records
        assert!(state.records.get("150-custom").is_none());
        assert!(state.records.get("2_slot_99").unwrap().name.is_empty());
    }

    #[test]
    fn test_import_skips_short_rows() {
        let catalog = catalog();
        let csv = "header\n1,One,1\n\n3,Three,3,003,Base,,TRUE,,\n";
        let state = import_csv(&catalog, csv).unwrap();
        assert_eq!(state.records.len(), 1);
        assert!(state.records.is_owned("3"));
    }

    #[test]
    fn test_import_requires_header() {
        let catalog = catalog();
        assert!(matches!(import_csv(&catalog, ""), Err(TransportError::MissingHeader)));
    }

    #[test]
    fn test_import_header_only_is_empty_state() {
        let catalog = catalog();
        let state = import_csv(&catalog, &CSV_HEADERS.join(",")).unwrap();
        assert_eq!(state, CollectionState::new());
    }

    #[test]
    fn test_import_rejects_bad_manual_id() {
        let catalog = catalog();
        let csv = "h\nx-custom,Custom,abc,abc,Manual,,FALSE,,,,standard,,,FALSE\n";
        assert!(matches!(
            import_csv(&catalog, csv),
            Err(TransportError::InvalidId { .. })
        ));
    }

    #[test]
    fn test_import_rejects_unknown_category() {
        let catalog = catalog();
        let csv = "h\n1,One,1,001,Bogus,,TRUE,,,,standard,,,FALSE\n";
        assert!(matches!(
            import_csv(&catalog, csv),
            Err(TransportError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_import_rejects_foreign_slot_key() {
        let catalog = catalog();
        let csv = "h\n3_slot_1,Two (Slot),2,002,Slot,2,TRUE,,,,standard,,,FALSE\n";
        assert!(matches!(
            import_csv(&catalog, csv),
            Err(TransportError::SlotKeyMismatch { .. })
        ));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut store = CollectionStore::new();
        store.upsert("1", &RecordPatch::new().with_owned(true).with_value("4"));
        store.upsert("2_slot_5", &RecordPatch::new().with_rarity(Rarity::Ex));

        let json = export_snapshot(&store).unwrap();
        assert_eq!(import_snapshot(&json).unwrap(), store);
    }

    #[test]
    fn test_snapshot_malformed() {
        assert!(import_snapshot("{\"1\": {\"owned\": \"yes\"}}").is_err());
        assert!(import_snapshot("[1, 2]").is_err());
    }

    #[test]
    fn test_import_mode_parse() {
        assert_eq!("records-only".parse::<ImportMode>().unwrap(), ImportMode::RecordsOnly);
        assert_eq!(ImportMode::default().to_string(), "full-replace");
    }
}
