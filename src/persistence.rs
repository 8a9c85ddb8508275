// 🗄️ Persistence Gateway - opaque named string slots
//
// The collection is persisted as four independent slots. Absence of a slot
// always means "empty / default", never an error.

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::error::PersistenceError;
use crate::roster::ExtraRoster;
use crate::slots::SlotRegistry;
use crate::state::CollectionState;
use crate::store::CollectionStore;

pub const SLOT_RECORDS: &str = "binder";
pub const SLOT_REGISTRY: &str = "slots";
pub const SLOT_EXTRAS: &str = "extras";
pub const SLOT_GRID_COLUMNS: &str = "gridColumns";

// ============================================================================
// GATEWAY TRAIT
// ============================================================================

/// Get/set/remove over named string values
pub trait PersistenceGateway: Send {
    fn get(&self, slot: &str) -> Result<Option<String>, PersistenceError>;

    fn set(&mut self, slot: &str, value: &str) -> Result<(), PersistenceError>;

    fn remove(&mut self, slot: &str) -> Result<(), PersistenceError>;
}

/// In-memory gateway for tests and embedding
#[derive(Debug, Default, Clone)]
pub struct MemoryGateway {
    slots: HashMap<String, String>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceGateway for MemoryGateway {
    fn get(&self, slot: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.slots.get(slot).cloned())
    }

    fn set(&mut self, slot: &str, value: &str) -> Result<(), PersistenceError> {
        self.slots.insert(slot.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, slot: &str) -> Result<(), PersistenceError> {
        self.slots.remove(slot);
        Ok(())
    }
}

/// SQLite-backed gateway: one row per slot
pub struct SqliteGateway {
    conn: Connection,
}

impl SqliteGateway {
    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path)?;
        setup_database(&conn)?;
        Ok(SqliteGateway { conn })
    }

    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;
        Ok(SqliteGateway { conn })
    }
}

pub fn setup_database(conn: &Connection) -> Result<(), PersistenceError> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_slots (
            name TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    Ok(())
}

impl PersistenceGateway for SqliteGateway {
    fn get(&self, slot: &str) -> Result<Option<String>, PersistenceError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_slots WHERE name = ?1",
                params![slot],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, slot: &str, value: &str) -> Result<(), PersistenceError> {
        self.conn.execute(
            "INSERT INTO kv_slots (name, value) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
            params![slot, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, slot: &str) -> Result<(), PersistenceError> {
        self.conn
            .execute("DELETE FROM kv_slots WHERE name = ?1", params![slot])?;
        Ok(())
    }
}

// ============================================================================
// TYPED SLOT ACCESS
// ============================================================================

fn load_json<T: DeserializeOwned + Default>(
    gateway: &dyn PersistenceGateway,
    slot: &'static str,
) -> Result<T, PersistenceError> {
    match gateway.get(slot)? {
        Some(raw) if !raw.trim().is_empty() => {
            serde_json::from_str(&raw).map_err(|source| PersistenceError::Decode { slot, source })
        }
        _ => Ok(T::default()),
    }
}

fn save_json<T: Serialize>(
    gateway: &mut dyn PersistenceGateway,
    slot: &'static str,
    value: &T,
) -> Result<(), PersistenceError> {
    let raw = serde_json::to_string(value).map_err(|source| PersistenceError::Encode { slot, source })?;
    gateway.set(slot, &raw)
}

pub fn load_state(gateway: &dyn PersistenceGateway) -> Result<CollectionState, PersistenceError> {
    Ok(CollectionState {
        records: load_json::<CollectionStore>(gateway, SLOT_RECORDS)?,
        slots: load_json::<SlotRegistry>(gateway, SLOT_REGISTRY)?,
        extras: load_json::<ExtraRoster>(gateway, SLOT_EXTRAS)?,
    })
}

pub fn save_records(gateway: &mut dyn PersistenceGateway, records: &CollectionStore) -> Result<(), PersistenceError> {
    save_json(gateway, SLOT_RECORDS, records)
}

pub fn save_slots(gateway: &mut dyn PersistenceGateway, slots: &SlotRegistry) -> Result<(), PersistenceError> {
    save_json(gateway, SLOT_REGISTRY, slots)
}

pub fn save_extras(gateway: &mut dyn PersistenceGateway, extras: &ExtraRoster) -> Result<(), PersistenceError> {
    save_json(gateway, SLOT_EXTRAS, extras)
}

/// Grid column count; 0 (auto) when absent or unreadable
pub fn load_grid_columns(gateway: &dyn PersistenceGateway) -> Result<u8, PersistenceError> {
    Ok(gateway
        .get(SLOT_GRID_COLUMNS)?
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(0))
}

pub fn save_grid_columns(gateway: &mut dyn PersistenceGateway, columns: u8) -> Result<(), PersistenceError> {
    gateway.set(SLOT_GRID_COLUMNS, &columns.to_string())
}

/// Drop the three collection slots (grid columns is a display preference)
pub fn clear_state(gateway: &mut dyn PersistenceGateway) -> Result<(), PersistenceError> {
    gateway.remove(SLOT_RECORDS)?;
    gateway.remove(SLOT_REGISTRY)?;
    gateway.remove(SLOT_EXTRAS)?;
    Ok(())
}
