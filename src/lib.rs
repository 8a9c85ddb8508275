// Dexbinder - Core Library
// Collection engine used by the CLI and the integration tests

pub mod catalog;
pub mod collection;
pub mod config;
pub mod error;
pub mod filter;
pub mod persistence;
pub mod record;
pub mod roster;
pub mod slots;
pub mod source;
pub mod state;
pub mod store;
pub mod transport;
pub mod view;

// Re-export commonly used types
pub use catalog::{
    Catalog, CatalogItem, ReferenceEntry,
    display_id, find_reference, reference_list,
};
pub use collection::{Collection, ImportSummary, PendingAction};
pub use config::{Config, DexbinderPaths, load_config, load_config_from, save_config};
pub use error::{CollectionError, CollectionResult, PersistenceError, TransportError};
pub use filter::{FilterFlag, FilterSettings, SortMode};
pub use persistence::{
    MemoryGateway, PersistenceGateway, SqliteGateway,
    SLOT_EXTRAS, SLOT_GRID_COLUMNS, SLOT_RECORDS, SLOT_REGISTRY,
};
pub use record::{BinderRecord, ImageField, Rarity, RecordPatch, Valuation};
pub use roster::{ExtraEntry, ExtraRoster};
pub use slots::{slot_key, SlotRegistry};
pub use source::{paste_into, ByteSource, BytesSource, ClipboardSource, FileSource};
pub use state::CollectionState;
pub use store::CollectionStore;
pub use transport::{export_csv, import_csv, ImportMode, CSV_HEADERS};
pub use view::{EntryCategory, ImageKind, ResolvedImage, ViewEngine, ViewEntry, ViewStats, CARD_BACK_URL};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
