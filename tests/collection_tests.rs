// Integration tests for the collection controller
// Backups, restore, confirmation and reload through a real SQLite file

use anyhow::Result;
use dexbinder::{
    Catalog, Collection, CollectionError, EntryCategory, FilterFlag, ImportMode, PendingAction, Rarity,
    RecordPatch, SortMode, SqliteGateway, TransportError,
};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use tempfile::TempDir;

/// Setup test environment
fn setup() -> Result<(TempDir, Collection)> {
    let temp_dir = TempDir::new()?;
    let collection = open_at(&temp_dir.path().join("collection.db"))?;
    Ok((temp_dir, collection))
}

fn open_at(path: &Path) -> Result<Collection> {
    let gateway = SqliteGateway::open(path)?;
    let tick = AtomicI64::new(1_700_000_000_000);
    Ok(Collection::open(Catalog::gen1(), Box::new(gateway))?
        .with_clock(move || tick.fetch_add(1, Ordering::SeqCst)))
}

fn keys(collection: &Collection) -> Vec<String> {
    collection.view().into_iter().map(|e| e.key).collect()
}

#[test]
fn test_backup_restore_after_clear() -> Result<()> {
    let (_dir, mut c) = setup()?;

    c.toggle_owned("1")?;
    let slot = c.add_slot("2")?;
    c.toggle_owned(&slot)?;
    c.add_extra_manual("Custom", Some(150), false, None)?;

    let backup = c.export_csv()?;

    c.stage(PendingAction::ClearAll);
    c.confirm()?;
    assert!(c.state().records.is_empty());
    assert!(c.state().slots.is_empty());
    assert!(c.state().extras.is_empty());

    c.import_csv(&backup)?;

    assert!(c.state().records.is_owned("1"));
    assert!(c.state().records.is_owned(&slot));
    assert!(c.state().extras.contains_key("150-custom"));
    let suffix = slot.trim_start_matches("2_slot_").to_string();
    assert_eq!(c.state().slots.suffixes("2"), &[suffix]);
    Ok(())
}

#[test]
fn test_full_round_trip_is_equivalent() -> Result<()> {
    let (_dir, mut c) = setup()?;

    c.save_record("25", &RecordPatch::new().with_value("$12.50").with_rarity(Rarity::Ex))?;
    c.save_record("6", &RecordPatch::new().with_name("Shiny Charizard"))?;
    let first = c.add_slot("6")?;
    let second = c.add_slot("6")?;
    c.save_record(&second, &RecordPatch::new().with_rarity(Rarity::Mega).with_owned(true))?;
    c.save_record(&first, &RecordPatch::new().with_rarity(Rarity::Gx))?;
    c.add_extra_from_dex(197, None)?;
    c.add_extra_manual("Professor Oak", Some(0), true, None)?;
    c.add_extra_manual("Mid Binder", Some(80), false, None)?;

    let before = c.state().clone();
    let backup = c.export_csv()?;
    c.import_csv(&backup)?;

    assert!(c.state().equivalent(&before));
    // Registration order survives, not rarity order
    assert_eq!(c.state().slots.slot_keys("6"), vec![first, second]);
    Ok(())
}

#[test]
fn test_roster_name_survives_round_trip() -> Result<()> {
    let (_dir, mut c) = setup()?;
    c.save_record("1", &RecordPatch::new().with_name("Bulbasaur").with_owned(false))?;
    c.save_record("4", &RecordPatch::new().with_name("Charmander").with_owned(true))?;
    let before = c.state().clone();

    let backup = c.export_csv()?;
    c.import_csv(&backup)?;

    assert!(c.state().equivalent(&before));
    assert_eq!(c.entry("4").map(|e| e.display_name().to_string()), Some("Charmander".to_string()));
    Ok(())
}

#[test]
fn test_unknown_key_leaves_backup_intact() -> Result<()> {
    let (_dir, mut c) = setup()?;
    c.toggle_owned("25")?;
    let before = c.state().clone();

    assert!(matches!(c.toggle_owned("999"), Err(CollectionError::NotRosterEntry(_))));
    assert!(matches!(
        c.save_record("999", &RecordPatch::new().with_value("5")),
        Err(CollectionError::NotRosterEntry(_))
    ));
    assert_eq!(*c.state(), before);

    let backup = c.export_csv()?;
    c.import_csv(&backup)?;
    assert!(c.state().equivalent(&before));
    Ok(())
}

#[test]
fn test_value_high_ordering() -> Result<()> {
    let (_dir, mut c) = setup()?;
    c.save_record("3", &RecordPatch::new().with_value("12.50"))?;
    c.save_record("7", &RecordPatch::new().with_value("100"))?;
    c.set_sort_mode(SortMode::ValueHigh);

    let view = keys(&c);
    assert_eq!(&view[..3], &["7", "3", "1"]);
    assert_eq!(view.len(), 151);
    Ok(())
}

#[test]
fn test_import_failure_leaves_everything_untouched() -> Result<()> {
    let (dir, mut c) = setup()?;
    c.toggle_owned("4")?;
    c.add_extra_manual("Keep Me", Some(20), false, None)?;
    let before = c.state().clone();

    let bad = "SystemKey,Name,ApiId,DisplayId,Category,ParentKey,Owned,Value,ImageURL\n\
               1,Bulbasaur,1,001,Mystery,,TRUE,,\n";
    let err = c.import_csv(bad).unwrap_err();
    assert!(matches!(
        err,
        CollectionError::Transport(TransportError::UnknownCategory { .. })
    ));
    assert_eq!(*c.state(), before);

    // Nothing reached the database either
    drop(c);
    let reopened = open_at(&dir.path().join("collection.db"))?;
    assert_eq!(*reopened.state(), before);
    Ok(())
}

#[test]
fn test_empty_import_is_missing_header() -> Result<()> {
    let (_dir, mut c) = setup()?;
    assert!(matches!(
        c.import_csv(""),
        Err(CollectionError::Transport(TransportError::MissingHeader))
    ));
    Ok(())
}

#[test]
fn test_state_reloads_from_disk() -> Result<()> {
    let (dir, mut c) = setup()?;
    c.toggle_owned("150")?;
    let slot = c.add_slot("150")?;
    c.add_extra_from_dex(384, None)?;
    c.set_grid_columns(5)?;
    let before = c.state().clone();
    drop(c);

    let reopened = open_at(&dir.path().join("collection.db"))?;
    assert_eq!(*reopened.state(), before);
    assert_eq!(reopened.grid_columns(), 5);
    assert!(reopened.state().slots.is_slot(&slot));
    assert!(reopened.state().extras.contains_key("384-rayquaza"));
    Ok(())
}

#[test]
fn test_snapshot_round_trip_keeps_roster() -> Result<()> {
    let (_dir, mut c) = setup()?;
    c.add_extra_manual("Custom", Some(150), false, None)?;
    c.toggle_owned("1")?;
    let snapshot = c.export_snapshot()?;

    c.toggle_owned("1")?;
    c.toggle_owned("2")?;
    c.import_snapshot(&snapshot)?;

    assert!(c.state().records.is_owned("1"));
    assert!(!c.state().records.is_owned("2"));
    assert!(c.state().extras.contains_key("150-custom"));
    Ok(())
}

#[test]
fn test_cancelled_clear_keeps_data() -> Result<()> {
    let (_dir, mut c) = setup()?;
    c.toggle_owned("1")?;

    let prompt = c.stage(PendingAction::ClearAll);
    assert!(prompt.starts_with("WARNING"));
    c.cancel();

    assert!(c.pending().is_none());
    assert!(c.state().records.is_owned("1"));
    Ok(())
}

#[test]
fn test_remove_slot_restores_prior_state() -> Result<()> {
    let (_dir, mut c) = setup()?;
    c.toggle_owned("9")?;
    let before = c.state().clone();

    let slot = c.add_slot("9")?;
    c.save_record(&slot, &RecordPatch::new().with_value("3"))?;
    c.stage(PendingAction::RemoveSlot(slot));
    c.confirm()?;

    assert_eq!(*c.state(), before);
    Ok(())
}

#[test]
fn test_rarity_filter_spares_base_entries() -> Result<()> {
    let (_dir, mut c) = setup()?;
    c.save_record("1", &RecordPatch::new().with_rarity(Rarity::Gx))?;
    let slot = c.add_slot("1")?;
    c.save_record(&slot, &RecordPatch::new().with_rarity(Rarity::Gx))?;
    c.add_extra_manual("Custom", Some(1), false, None)?;

    c.set_filter(FilterFlag::Rarity(Rarity::Gx), false);
    c.set_filter(FilterFlag::Rarity(Rarity::Standard), false);

    let view = c.view();
    assert!(view.iter().any(|e| e.key == "1"));
    assert!(view.iter().all(|e| e.category == EntryCategory::Base));
    Ok(())
}

#[test]
fn test_records_only_mode_from_config() -> Result<()> {
    let (_dir, c) = setup()?;
    let mut c = c.with_import_mode(ImportMode::RecordsOnly);
    c.add_extra_manual("Stays", Some(30), false, None)?;
    let slot = c.add_slot("5")?;

    let backup = "SystemKey,Name,ApiId,DisplayId,Category,ParentKey,Owned,Value,ImageURL\n\
                  5,Charmeleon,5,005,Base,,TRUE,1.00,\n";
    c.import_csv(backup)?;

    assert!(c.state().records.is_owned("5"));
    assert!(c.state().extras.contains_key("30-stays"));
    assert!(c.state().slots.is_slot(&slot));
    Ok(())
}
