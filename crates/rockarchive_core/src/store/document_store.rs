//! JSON document backend.
//!
//! # Responsibility
//! - Persist the whole record list as one pretty-printed JSON array.
//!
//! # Invariants
//! - `append` is load-all, push, write-all; concurrent writers race and the
//!   last writer wins.
//! - A corrupt file is never overwritten by `append`.
//! - Keys are 1-based file positions and are not written to the file.

use super::{RecordStore, StoreError, StoreResult};
use crate::model::artist::{ArtistId, ArtistRecord};
use log::info;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const DOCUMENT_INDENT: &[u8] = b"    ";

/// Record store over a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonDocumentStore {
    path: PathBuf,
}

impl JsonDocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_records(&self) -> StoreResult<Vec<ArtistRecord>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let records: Vec<ArtistRecord> = serde_json::from_str(&raw)?;
        Ok(records)
    }

    fn write_records(&self, records: &[ArtistRecord]) -> StoreResult<()> {
        if let Some(parent) = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut buffer = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(
            &mut buffer,
            PrettyFormatter::with_indent(DOCUMENT_INDENT),
        );
        records
            .serialize(&mut serializer)
            .map_err(StoreError::Serialization)?;
        std::fs::write(&self.path, buffer)?;
        Ok(())
    }
}

impl RecordStore for JsonDocumentStore {
    fn backend_name(&self) -> &'static str {
        "document"
    }

    fn try_load_all(&self) -> StoreResult<Vec<ArtistRecord>> {
        let records = self
            .read_records()?
            .into_iter()
            .enumerate()
            .map(|(index, record)| ArtistRecord {
                id: Some(position_key(index)),
                ..record.normalized()
            })
            .collect();
        Ok(records)
    }

    fn append(&self, record: &ArtistRecord) -> StoreResult<ArtistId> {
        record.validate()?;

        let mut records = self.read_records()?;
        records.push(ArtistRecord {
            id: None,
            ..record.normalized()
        });
        self.write_records(&records)?;

        let id = position_key(records.len() - 1);
        info!(
            "event=store_append module=store status=ok backend=document id={id} total={}",
            records.len()
        );
        Ok(id)
    }
}

fn position_key(index: usize) -> ArtistId {
    ArtistId(index as i64 + 1)
}

#[cfg(test)]
mod tests {
    use super::JsonDocumentStore;
    use crate::model::artist::{ArtistId, ArtistRecord};
    use crate::store::RecordStore;

    #[test]
    fn written_file_keeps_non_ascii_and_omits_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDocumentStore::new(dir.path().join("artists.json"));

        store.append(&ArtistRecord::new("Raïna Raï")).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("Raïna Raï"));
        assert!(!raw.contains("\"id\""));
        assert!(raw.contains("\n        \"name\""));
        assert!(raw.contains("\"image\": null"));
    }

    #[test]
    fn keys_follow_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDocumentStore::new(dir.path().join("artists.json"));

        assert_eq!(store.append(&ArtistRecord::new("First")).unwrap(), ArtistId(1));
        assert_eq!(store.append(&ArtistRecord::new("Second")).unwrap(), ArtistId(2));

        let ids: Vec<_> = store.load_all().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![Some(ArtistId(1)), Some(ArtistId(2))]);
    }
}
