// 🎛️ Collection - the top-level controller
//
// Owns the catalog, the three mutable stores and the persistence gateway.
// Every mutation is built on a copy, flushed to the gateway, and only then
// swapped in, so storage never lags what callers can observe.
//
// Destructive actions (delete extra, remove slot, promote, clear-all) go
// through stage() → confirm().

use chrono::Utc;
use tracing::{info, warn};

use crate::catalog::{find_reference, Catalog};
use crate::error::{CollectionError, CollectionResult};
use crate::filter::{FilterFlag, FilterSettings, SortMode};
use crate::persistence::{self, PersistenceGateway};
use crate::record::{BinderRecord, RecordPatch};
use crate::roster::ExtraEntry;
use crate::source::ByteSource;
use crate::state::CollectionState;
use crate::transport::{self, ImportMode};
use crate::view::{ViewEngine, ViewEntry, ViewStats};

// ============================================================================
// PENDING ACTIONS
// ============================================================================

/// A destructive action waiting for confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    DeleteExtra(String),
    RemoveSlot(String),
    PromoteSlot(String),
    ClearAll,
}

impl PendingAction {
    /// Prompt shown before the action runs
    pub fn message(&self, state: &CollectionState) -> String {
        match self {
            PendingAction::DeleteExtra(key) => {
                let name = state.extras.get(key).map(|e| e.name.as_str()).unwrap_or(key);
                format!("Remove {} from your collection?", name)
            }
            PendingAction::RemoveSlot(_) => "Delete this extra slot permanently?".to_string(),
            PendingAction::PromoteSlot(_) => {
                "Promote this card to the Main Entry? The current Main card will move to this slot."
                    .to_string()
            }
            PendingAction::ClearAll => {
                "WARNING: This will permanently delete all your collected cards, custom slots, \
                 and manual entries. Start a fresh collection?"
                    .to_string()
            }
        }
    }
}

/// What changed in a commit, so only those slots are rewritten
#[derive(Debug, Clone, Copy, Default)]
struct Dirty {
    records: bool,
    slots: bool,
    extras: bool,
}

impl Dirty {
    const RECORDS: Dirty = Dirty { records: true, slots: false, extras: false };
    const ALL: Dirty = Dirty { records: true, slots: true, extras: true };
}

/// Counts reported after a successful import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub mode: ImportMode,
    pub records: usize,
    pub extras: usize,
    pub slot_parents: usize,
}

// ============================================================================
// COLLECTION
// ============================================================================

pub struct Collection {
    catalog: Catalog,
    state: CollectionState,
    gateway: Box<dyn PersistenceGateway>,
    filters: FilterSettings,
    sort: SortMode,
    grid_columns: u8,
    import_mode: ImportMode,
    selected: Option<String>,
    pending: Option<PendingAction>,
    clock: Box<dyn Fn() -> i64 + Send>,
}

impl Collection {
    /// Load persisted state through the gateway
    pub fn open(catalog: Catalog, gateway: Box<dyn PersistenceGateway>) -> CollectionResult<Self> {
        let state = persistence::load_state(gateway.as_ref())?;
        let grid_columns = persistence::load_grid_columns(gateway.as_ref())?;

        info!(
            records = state.records.len(),
            extras = state.extras.len(),
            "collection loaded"
        );

        Ok(Collection {
            catalog,
            state,
            gateway,
            filters: FilterSettings::default(),
            sort: SortMode::Dex,
            grid_columns,
            import_mode: ImportMode::default(),
            selected: None,
            pending: None,
            clock: Box::new(|| Utc::now().timestamp_millis()),
        })
    }

    /// Builder pattern: initial filters
    pub fn with_filters(mut self, filters: FilterSettings) -> Self {
        self.filters = filters;
        self
    }

    /// Builder pattern: import semantics
    pub fn with_import_mode(mut self, mode: ImportMode) -> Self {
        self.import_mode = mode;
        self
    }

    /// Builder pattern: clock used for slot suffixes (millis)
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &CollectionState {
        &self.state
    }

    pub fn filters(&self) -> &FilterSettings {
        &self.filters
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort
    }

    pub fn grid_columns(&self) -> u8 {
        self.grid_columns
    }

    pub fn import_mode(&self) -> ImportMode {
        self.import_mode
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    fn engine(&self) -> ViewEngine<'_> {
        ViewEngine::new(&self.catalog, &self.state)
    }

    // ========================================================================
    // VIEW
    // ========================================================================

    /// Current view under the active filters and sort mode
    pub fn view(&self) -> Vec<ViewEntry> {
        self.engine().build(&self.filters, self.sort)
    }

    pub fn stats(&self) -> ViewStats {
        let engine = self.engine();
        let view = engine.build(&self.filters, self.sort);
        engine.stats(&view)
    }

    pub fn entry(&self, key: &str) -> Option<ViewEntry> {
        self.engine().entry(key)
    }

    /// Remember an entry as selected; unknown keys clear the selection
    pub fn select(&mut self, key: &str) -> Option<ViewEntry> {
        let entry = self.entry(key);
        self.selected = entry.as_ref().map(|e| e.key.clone());
        entry
    }

    // ========================================================================
    // COMMIT
    // ========================================================================

    fn commit(&mut self, next: CollectionState, dirty: Dirty) -> CollectionResult<()> {
        let gateway = self.gateway.as_mut();
        if dirty.records {
            persistence::save_records(gateway, &next.records)?;
        }
        if dirty.slots {
            persistence::save_slots(gateway, &next.slots)?;
        }
        if dirty.extras {
            persistence::save_extras(gateway, &next.extras)?;
        }
        self.state = next;
        Ok(())
    }

    // ========================================================================
    // RECORD MUTATIONS
    // ========================================================================

    fn require_entry(&self, key: &str) -> CollectionResult<ViewEntry> {
        self.entry(key)
            .ok_or_else(|| CollectionError::NotRosterEntry(key.to_string()))
    }

    /// Flip ownership of a roster or slot key; returns the new flag
    pub fn toggle_owned(&mut self, key: &str) -> CollectionResult<bool> {
        self.require_entry(key)?;
        let mut next = self.state.clone();
        let owned = next.records.toggle_owned(key);
        self.commit(next, Dirty::RECORDS)?;
        info!(key, owned, "ownership toggled");
        Ok(owned)
    }

    /// Merge a partial record into `key`.
    /// A name equal to the roster name is stored as no override.
    pub fn save_record(&mut self, key: &str, patch: &RecordPatch) -> CollectionResult<BinderRecord> {
        let entry = self.require_entry(key)?;
        let mut patch = patch.clone();
        if patch.name.as_deref() == Some(entry.name.as_str()) {
            patch.name = Some(String::new());
        }

        let mut next = self.state.clone();
        let saved = next.records.upsert(key, &patch).clone();
        self.commit(next, Dirty::RECORDS)?;
        info!(key, "record saved");
        Ok(saved)
    }

    // ========================================================================
    // ROSTER MUTATIONS
    // ========================================================================

    /// Add a duplicate slot; a slot key adds a sibling under its parent.
    /// The new slot becomes the selection.
    pub fn add_slot(&mut self, key: &str) -> CollectionResult<String> {
        let parent = match self.state.slots.parent_of(key) {
            Some(parent) => parent.to_string(),
            None if self.state.is_roster_key(&self.catalog, key) => key.to_string(),
            None => return Err(CollectionError::NotRosterEntry(key.to_string())),
        };

        let mut next = self.state.clone();
        let slot = next.add_slot(&self.catalog, &parent, (self.clock)());
        self.commit(next, Dirty { slots: true, ..Default::default() })?;

        info!(parent = %parent, slot = %slot, "extra slot added");
        self.selected = Some(slot.clone());
        Ok(slot)
    }

    /// Add a manually described entry
    pub fn add_extra_manual(
        &mut self,
        name: &str,
        sort_id: Option<u32>,
        is_trainer: bool,
        card_image: Option<String>,
    ) -> CollectionResult<ExtraEntry> {
        let sort_id = match sort_id {
            Some(id) if !name.trim().is_empty() => id,
            _ => return Err(CollectionError::MissingManualFields),
        };
        let entry = ExtraEntry::manual(name, sort_id, is_trainer).with_card_image(card_image);
        self.add_extra(entry)
    }

    /// Add an entry picked from a later generation's dex list
    pub fn add_extra_from_dex(&mut self, id: u32, card_image: Option<String>) -> CollectionResult<ExtraEntry> {
        let reference = find_reference(id).ok_or(CollectionError::UnknownReference(id))?;
        let entry = ExtraEntry::from_reference(&reference).with_card_image(card_image);
        self.add_extra(entry)
    }

    fn add_extra(&mut self, entry: ExtraEntry) -> CollectionResult<ExtraEntry> {
        let mut next = self.state.clone();
        if !next.add_extra(&self.catalog, entry.clone()) {
            return Err(CollectionError::DuplicateKey(entry.key));
        }
        self.commit(next, Dirty { extras: true, ..Default::default() })?;
        info!(key = %entry.key, "{} added", entry.name);
        Ok(entry)
    }

    // ========================================================================
    // CONFIRMATION
    // ========================================================================

    /// Stage a destructive action; returns the confirmation prompt
    pub fn stage(&mut self, action: PendingAction) -> String {
        let message = action.message(&self.state);
        self.pending = Some(action);
        message
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Run the staged action; false when its target no longer exists
    pub fn confirm(&mut self) -> CollectionResult<bool> {
        let action = self.pending.take().ok_or(CollectionError::NothingPending)?;

        match &action {
            PendingAction::DeleteExtra(key) => self.delete_extra(key),
            PendingAction::RemoveSlot(key) => self.remove_slot(key),
            PendingAction::PromoteSlot(key) => self.promote_slot(key),
            PendingAction::ClearAll => self.clear_all(),
        }
    }

    fn remove_slot(&mut self, key: &str) -> CollectionResult<bool> {
        let mut next = self.state.clone();
        if next.remove_slot(key).is_none() {
            warn!(key, "remove requested for unknown slot");
            return Ok(false);
        }
        self.commit(next, Dirty { records: true, slots: true, extras: false })?;
        self.deselect(key);
        info!(key, "slot removed");
        Ok(true)
    }

    fn promote_slot(&mut self, key: &str) -> CollectionResult<bool> {
        let mut next = self.state.clone();
        if next.promote(key).is_none() {
            warn!(key, "promote requested for unknown slot");
            return Ok(false);
        }
        self.commit(next, Dirty::RECORDS)?;
        info!(key, "entries swapped");
        Ok(true)
    }

    fn delete_extra(&mut self, key: &str) -> CollectionResult<bool> {
        let mut next = self.state.clone();
        if next.delete_extra(key).is_none() {
            warn!(key, "delete requested for unknown extra");
            return Ok(false);
        }
        self.commit(next, Dirty::ALL)?;
        self.deselect(key);
        info!(key, "entry removed");
        Ok(true)
    }

    fn clear_all(&mut self) -> CollectionResult<bool> {
        persistence::clear_state(self.gateway.as_mut())?;
        self.state = CollectionState::new();
        self.selected = None;
        info!("data cleared");
        Ok(true)
    }

    fn deselect(&mut self, key: &str) {
        let gone = self
            .selected
            .as_deref()
            .is_some_and(|selected| selected == key || self.entry(selected).is_none());
        if gone {
            self.selected = None;
        }
    }

    // ========================================================================
    // SETTINGS
    // ========================================================================

    pub fn set_filters(&mut self, filters: FilterSettings) {
        self.filters = filters;
    }

    pub fn set_filter(&mut self, flag: FilterFlag, value: bool) {
        self.filters.set_flag(flag, value);
    }

    pub fn toggle_filter(&mut self, flag: FilterFlag) {
        self.filters.toggle(flag);
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.filters.search = query.into();
    }

    pub fn set_sort_mode(&mut self, sort: SortMode) {
        self.sort = sort;
    }

    /// Persisted display column count (0 = auto)
    pub fn set_grid_columns(&mut self, columns: u8) -> CollectionResult<()> {
        persistence::save_grid_columns(self.gateway.as_mut(), columns)?;
        self.grid_columns = columns;
        Ok(())
    }

    // ========================================================================
    // BACKUP / RESTORE
    // ========================================================================

    pub fn export_csv(&self) -> CollectionResult<String> {
        Ok(transport::export_csv(&self.catalog, &self.state)?)
    }

    /// Replace state from a tabular backup per the configured import mode
    ///
    /// Any parse failure returns before anything is touched.
    pub fn import_csv(&mut self, text: &str) -> CollectionResult<ImportSummary> {
        let parsed = transport::import_csv(&self.catalog, text)?;

        let (next, dirty) = match self.import_mode {
            ImportMode::FullReplace => (parsed, Dirty::ALL),
            ImportMode::RecordsOnly => {
                let mut next = self.state.clone();
                next.records = parsed.records;
                (next, Dirty::RECORDS)
            }
        };
        self.commit(next, dirty)?;
        self.selected = None;

        let summary = ImportSummary {
            mode: self.import_mode,
            records: self.state.records.len(),
            extras: self.state.extras.len(),
            slot_parents: self.state.slots.iter().count(),
        };
        info!(?summary, "collection imported");
        Ok(summary)
    }

    pub fn export_snapshot(&self) -> CollectionResult<String> {
        Ok(transport::export_snapshot(&self.state.records)?)
    }

    /// Replace the record store only from a JSON snapshot
    pub fn import_snapshot(&mut self, text: &str) -> CollectionResult<usize> {
        let records = transport::import_snapshot(text)?;
        let mut next = self.state.clone();
        next.records = records;
        self.commit(next, Dirty::RECORDS)?;
        Ok(self.state.records.len())
    }

    /// Await the whole payload, then import it
    pub async fn import_csv_from(&mut self, source: &dyn ByteSource) -> CollectionResult<ImportSummary> {
        let text = source
            .read_text()
            .await
            .map_err(|e| CollectionError::Transport(e.into()))?;
        self.import_csv(&text)
    }

    pub async fn import_snapshot_from(&mut self, source: &dyn ByteSource) -> CollectionResult<usize> {
        let text = source
            .read_text()
            .await
            .map_err(|e| CollectionError::Transport(e.into()))?;
        self.import_snapshot(&text)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryGateway, SLOT_RECORDS};
    use crate::record::Rarity;
    use crate::source::BytesSource;

    fn open() -> Collection {
        let catalog = Catalog::from_names(1, &["One", "Two", "Three"]);
        Collection::open(catalog, Box::new(MemoryGateway::new()))
            .unwrap()
            .with_clock(|| 1_000)
    }

    fn keys(collection: &Collection) -> Vec<String> {
        collection.view().into_iter().map(|e| e.key).collect()
    }

    #[test]
    fn test_stage_requires_confirm() {
        let mut c = open();
        let slot = c.add_slot("2").unwrap();

        let prompt = c.stage(PendingAction::RemoveSlot(slot.clone()));
        assert_eq!(prompt, "Delete this extra slot permanently?");
        assert!(c.state().slots.is_slot(&slot));

        c.cancel();
        assert!(c.confirm().is_err());
        assert!(c.state().slots.is_slot(&slot));

        c.stage(PendingAction::RemoveSlot(slot.clone()));
        c.confirm().unwrap();
        assert!(!c.state().slots.is_slot(&slot));
    }

    #[test]
    fn test_add_slot_selects_and_uses_clock() {
        let mut c = open();
        let slot = c.add_slot("2").unwrap();
        assert_eq!(slot, "2_slot_1000");
        assert_eq!(c.selected(), Some("2_slot_1000"));

        // Same clock reading → bumped suffix
        let sibling = c.add_slot(&slot).unwrap();
        assert_eq!(sibling, "2_slot_1001");
    }

    #[test]
    fn test_add_slot_rejects_unknown_parent() {
        let mut c = open();
        assert!(matches!(c.add_slot("999"), Err(CollectionError::NotRosterEntry(_))));
    }

    #[test]
    fn test_record_mutations_reject_unknown_keys() {
        let mut c = open();
        let before = c.state().clone();

        assert!(matches!(c.toggle_owned("999"), Err(CollectionError::NotRosterEntry(_))));
        assert!(matches!(
            c.save_record("2_slot_42", &RecordPatch::new().with_owned(true)),
            Err(CollectionError::NotRosterEntry(_))
        ));
        assert_eq!(*c.state(), before);
    }

    #[test]
    fn test_roster_name_is_not_an_override() {
        let mut c = open();
        let saved = c.save_record("1", &RecordPatch::new().with_name("One")).unwrap();
        assert_eq!(saved.name, "");
        assert!(c.state().records.get("1").unwrap().is_default());

        let slot = c.add_slot("1").unwrap();
        let saved = c.save_record(&slot, &RecordPatch::new().with_name("One (Slot)")).unwrap();
        assert_eq!(saved.name, "");

        // A real override is still kept
        let saved = c.save_record("2", &RecordPatch::new().with_name("Shiny Two")).unwrap();
        assert_eq!(saved.name, "Shiny Two");
    }

    #[test]
    fn test_confirm_reports_missing_target() {
        let mut c = open();
        c.stage(PendingAction::RemoveSlot("1".to_string()));
        assert!(!c.confirm().unwrap());

        c.stage(PendingAction::PromoteSlot("2_slot_7".to_string()));
        assert!(!c.confirm().unwrap());

        c.stage(PendingAction::DeleteExtra("1".to_string()));
        assert!(!c.confirm().unwrap());

        let slot = c.add_slot("3").unwrap();
        c.stage(PendingAction::RemoveSlot(slot));
        assert!(c.confirm().unwrap());
    }

    #[test]
    fn test_manual_extra_validation() {
        let mut c = open();
        assert!(matches!(
            c.add_extra_manual("", Some(5), false, None),
            Err(CollectionError::MissingManualFields)
        ));
        assert!(matches!(
            c.add_extra_manual("Named", None, false, None),
            Err(CollectionError::MissingManualFields)
        ));

        c.add_extra_manual("Custom", Some(150), false, None).unwrap();
        assert!(matches!(
            c.add_extra_manual("Custom", Some(150), false, None),
            Err(CollectionError::DuplicateKey(_))
        ));
    }

    #[test]
    fn test_add_from_dex() {
        let mut c = open();
        let entry = c.add_extra_from_dex(152, None).unwrap();
        assert_eq!(entry.key, "152-chikorita");
        assert!(matches!(c.add_extra_from_dex(1, None), Err(CollectionError::UnknownReference(1))));
    }

    #[test]
    fn test_value_sort_scenario() {
        let mut c = open();
        c.save_record("3", &RecordPatch::new().with_value("12.50")).unwrap();
        c.set_sort_mode(SortMode::ValueHigh);
        assert_eq!(keys(&c), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_mutations_are_persisted_before_return() {
        let catalog = Catalog::from_names(1, &["One", "Two", "Three"]);
        let mut c = Collection::open(catalog, Box::new(MemoryGateway::new())).unwrap();
        c.toggle_owned("1").unwrap();

        let raw = c.export_snapshot().unwrap();
        let stored = crate::persistence::load_state(c.gateway.as_ref()).unwrap();
        assert_eq!(stored, *c.state());
        assert!(c.gateway.get(SLOT_RECORDS).unwrap().is_some());
        assert!(raw.contains("\"owned\": true"));
    }

    #[test]
    fn test_promote_through_confirmation() {
        let mut c = open();
        let slot = c.add_slot("1").unwrap();
        c.save_record(&slot, &RecordPatch::new().with_rarity(Rarity::Mega)).unwrap();

        c.stage(PendingAction::PromoteSlot(slot.clone()));
        c.confirm().unwrap();

        assert_eq!(c.state().records.get("1").unwrap().rarity, Rarity::Mega);
        assert!(c.state().records.get(&slot).is_none());
    }

    #[test]
    fn test_delete_extra_clears_selection() {
        let mut c = open();
        c.add_extra_manual("Custom", Some(150), false, None).unwrap();
        let slot = c.add_slot("150-custom").unwrap();
        assert_eq!(c.selected(), Some(slot.as_str()));

        let prompt = c.stage(PendingAction::DeleteExtra("150-custom".to_string()));
        assert_eq!(prompt, "Remove Custom from your collection?");
        c.confirm().unwrap();

        assert_eq!(c.selected(), None);
        assert!(c.state().slots.is_empty());
    }

    #[test]
    fn test_failed_import_leaves_state() {
        let mut c = open();
        c.toggle_owned("1").unwrap();
        let before = c.state().clone();

        let bad = "h\n1,One,1,001,Nope,,TRUE,,,,standard,,,FALSE\n";
        assert!(c.import_csv(bad).is_err());
        assert_eq!(*c.state(), before);

        assert!(c.import_snapshot("{oops").is_err());
        assert_eq!(*c.state(), before);
    }

    #[test]
    fn test_records_only_import_keeps_roster() {
        let mut c = open().with_import_mode(ImportMode::RecordsOnly);
        c.add_extra_manual("Keep", Some(50), false, None).unwrap();

        let csv = "h\n2,Two,2,002,Base,,TRUE,,,,standard,,,FALSE\n";
        let summary = c.import_csv(csv).unwrap();

        assert_eq!(summary.mode, ImportMode::RecordsOnly);
        assert!(c.state().extras.contains_key("50-keep"));
        assert!(c.state().records.is_owned("2"));
    }

    #[test]
    fn test_snapshot_replaces_records_only() {
        let mut c = open();
        c.add_extra_manual("Keep", Some(50), false, None).unwrap();
        c.toggle_owned("1").unwrap();

        let count = c.import_snapshot(r#"{"3": {"owned": true, "cardType": "GX"}}"#).unwrap();

        assert_eq!(count, 1);
        assert!(!c.state().records.is_owned("1"));
        assert_eq!(c.state().records.get("3").unwrap().rarity, Rarity::Gx);
        assert!(c.state().extras.contains_key("50-keep"));
    }

    #[test]
    fn test_grid_columns_persist() {
        let mut c = open();
        c.set_grid_columns(6).unwrap();
        assert_eq!(c.grid_columns(), 6);
        assert_eq!(crate::persistence::load_grid_columns(c.gateway.as_ref()).unwrap(), 6);
    }

    #[tokio::test]
    async fn test_import_from_byte_source() {
        let mut c = open();
        let source = BytesSource::new("h\n1,One,1,001,Base,,TRUE,,,,standard,,,FALSE\n");
        c.import_csv_from(&source).await.unwrap();
        assert!(c.state().records.is_owned("1"));
    }
}
