//! Record store contracts and backends.
//!
//! # Responsibility
//! - Define the `{load_all, append}` capability shared by every backend.
//! - Keep storage representation details (JSON arrays, delimited columns)
//!   behind that contract.
//!
//! # Invariants
//! - `load_all` never fails; read errors are logged and yield an empty list.
//! - `append` validates before writing and reports write failures.
//! - Records come back with `id` set and `famous_tracks` normalized.

use crate::config::{ArchiveConfig, BackendKind};
use crate::db::DbError;
use crate::model::artist::{ArtistId, ArtistRecord, ArtistValidationError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod document_store;
pub mod sqlite_store;

pub use document_store::JsonDocumentStore;
pub use sqlite_store::SqliteArtistStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for record persistence and strict reads.
#[derive(Debug)]
pub enum StoreError {
    Validation(ArtistValidationError),
    Db(DbError),
    Io(std::io::Error),
    Serialization(serde_json::Error),
    /// A migration target already holds records.
    TargetNotEmpty { backend: &'static str, count: usize },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "invalid artist document: {err}"),
            Self::TargetNotEmpty { backend, count } => write!(
                f,
                "{backend} store already holds {count} records; refusing to migrate into it"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::TargetNotEmpty { .. } => None,
        }
    }
}

impl From<ArtistValidationError> for StoreError {
    fn from(value: ArtistValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Durable list of artist records.
pub trait RecordStore {
    /// Short backend name used in log lines.
    fn backend_name(&self) -> &'static str;

    /// Reads every record, surfacing failures.
    ///
    /// A backing store that does not exist yet is not a failure; it reads as
    /// an empty list.
    fn try_load_all(&self) -> StoreResult<Vec<ArtistRecord>>;

    /// Appends one record and returns its key.
    fn append(&self, record: &ArtistRecord) -> StoreResult<ArtistId>;

    /// Reads every record; failures are logged and read as an empty list.
    fn load_all(&self) -> Vec<ArtistRecord> {
        match self.try_load_all() {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    "event=store_load module=store status=error backend={} error={err}",
                    self.backend_name()
                );
                Vec::new()
            }
        }
    }
}

impl<T: RecordStore + ?Sized> RecordStore for Box<T> {
    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }

    fn try_load_all(&self) -> StoreResult<Vec<ArtistRecord>> {
        (**self).try_load_all()
    }

    fn append(&self, record: &ArtistRecord) -> StoreResult<ArtistId> {
        (**self).append(record)
    }
}

/// Opens the backend selected by `config`.
pub fn open_record_store(config: &ArchiveConfig) -> StoreResult<Box<dyn RecordStore>> {
    let store: Box<dyn RecordStore> = match config.backend {
        BackendKind::Document => Box::new(JsonDocumentStore::new(config.document_path())),
        BackendKind::Relational => Box::new(SqliteArtistStore::open(config.database_path())?),
    };
    info!(
        "event=store_open module=store status=ok backend={}",
        store.backend_name()
    );
    Ok(store)
}

/// Re-derives the selected record from a fresh record list by key.
pub fn select_artist(records: &[ArtistRecord], id: ArtistId) -> Option<&ArtistRecord> {
    records.iter().find(|record| record.id == Some(id))
}

/// Copies every record from `from` into `to`, in read order.
///
/// Reads strictly: a broken source aborts the copy instead of migrating
/// nothing. A target that already holds records is refused, so running the
/// migration again never duplicates the archive. Returns the number of
/// records appended.
pub fn migrate_records(from: &dyn RecordStore, to: &dyn RecordStore) -> StoreResult<usize> {
    let existing = to.try_load_all()?.len();
    if existing > 0 {
        return Err(StoreError::TargetNotEmpty {
            backend: to.backend_name(),
            count: existing,
        });
    }

    let records = from.try_load_all()?;
    info!(
        "event=store_migrate module=store status=start from={} to={} count={}",
        from.backend_name(),
        to.backend_name(),
        records.len()
    );

    for record in &records {
        to.append(record)?;
    }

    info!(
        "event=store_migrate module=store status=ok from={} to={} count={}",
        from.backend_name(),
        to.backend_name(),
        records.len()
    );
    Ok(records.len())
}
