// ⚠️ Error types
//
// Parse errors abort one operation and leave state untouched.
// Lookup misses are never errors; they resolve to defaults.

use thiserror::Error;

/// Malformed backup payloads
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Error parsing CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Error parsing CSV: missing header row")]
    MissingHeader,

    #[error("Error parsing CSV: unknown category '{category}' on line {line}")]
    UnknownCategory { line: u64, category: String },

    #[error("Error parsing CSV: invalid id '{value}' on line {line}")]
    InvalidId { line: u64, value: String },

    #[error("Error parsing CSV: slot key '{key}' does not belong to parent '{parent}' on line {line}")]
    SlotKeyMismatch {
        line: u64,
        key: String,
        parent: String,
    },

    #[error("Error parsing snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Error reading backup: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistence substrate failures
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored slot '{slot}' is not valid: {source}")]
    Decode {
        slot: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode slot '{slot}': {source}")]
    Encode {
        slot: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Controller-level failures
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("Key already exists: {0}")]
    DuplicateKey(String),

    #[error("Entry name and id are both required")]
    MissingManualFields,

    #[error("No dex entry with id {0}")]
    UnknownReference(u32),

    #[error("Not a roster entry: {0}")]
    NotRosterEntry(String),

    #[error("Nothing to confirm")]
    NothingPending,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type CollectionResult<T> = std::result::Result<T, CollectionError>;
