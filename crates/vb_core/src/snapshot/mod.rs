//! Serialization collaborators: the flat database form, a key/value store
//! abstraction, and snapshot export/import. No file I/O happens here.

pub mod database;
pub mod export;
pub mod import;
pub mod store;

pub use database::Database;
pub use export::{build_snapshot, default_export_filename, ExportMeta, ExportSnapshot, SNAPSHOT_FORMAT_V1};
pub use import::{extract_dump, import_export_json, ImportSummary, KeyStats};
pub use store::{KeyValueStore, MemoryStore};

use crate::config::SnapshotConfig;
use crate::engine::{Clock, Scorebook};
use crate::error::Result;

/// Read the scorebook stored under the configured database key.
/// A missing key yields an empty scorebook.
pub fn load_scorebook<S, C>(store: &S, config: &SnapshotConfig, clock: C) -> Result<Scorebook<C>>
where
    S: KeyValueStore + ?Sized,
    C: Clock,
{
    match store.get(&config.db_key) {
        Some(value) => Database::from_value(value)?.into_scorebook(clock),
        None => Ok(Scorebook::with_clock(clock)),
    }
}

/// Write the scorebook under the configured database key.
pub fn save_scorebook<S, C>(store: &mut S, config: &SnapshotConfig, book: &Scorebook<C>) -> Result<()>
where
    S: KeyValueStore + ?Sized,
    C: Clock,
{
    let value = Database::from_scorebook(book).to_value()?;
    store.set(&config.db_key, value)
}
