//! SQLite backend over the `artists` table.
//!
//! # Responsibility
//! - Map records to rows, flattening `famous_tracks` into one text column.
//!
//! # Invariants
//! - `append` is a single INSERT; SQLite serializes concurrent writers.
//! - `try_load_all` returns rows in insertion (`id`) order.
//! - NULL text columns read back as empty strings.

use super::{RecordStore, StoreResult};
use crate::db::{open_db, open_db_in_memory};
use crate::model::artist::{parse_track_list, tracks_to_column, ArtistId, ArtistRecord};
use log::info;
use rusqlite::{params, Connection, Row};
use std::path::Path;

const ARTIST_SELECT_SQL: &str = "SELECT
    id,
    name,
    genre,
    origin,
    era,
    bio,
    famous_tracks,
    image
FROM artists";

/// SQLite-backed record store.
pub struct SqliteArtistStore {
    conn: Connection,
}

impl SqliteArtistStore {
    /// Opens (creating if needed) the database file with the schema applied.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a throwaway in-memory store.
    pub fn in_memory() -> StoreResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps an existing connection. The caller is responsible for the schema.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl RecordStore for SqliteArtistStore {
    fn backend_name(&self) -> &'static str {
        "relational"
    }

    fn try_load_all(&self) -> StoreResult<Vec<ArtistRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ARTIST_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_artist_row(row)?);
        }

        Ok(records)
    }

    fn append(&self, record: &ArtistRecord) -> StoreResult<ArtistId> {
        record.validate()?;

        self.conn.execute(
            "INSERT INTO artists (
                name,
                genre,
                origin,
                era,
                bio,
                famous_tracks,
                image
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                record.name.as_str(),
                record.genre.as_str(),
                record.origin.as_str(),
                record.era.as_str(),
                record.bio.as_str(),
                tracks_to_column(&record.famous_tracks),
                record.image.as_deref(),
            ],
        )?;

        let id = ArtistId(self.conn.last_insert_rowid());
        info!("event=store_append module=store status=ok backend=relational id={id}");
        Ok(id)
    }
}

fn parse_artist_row(row: &Row<'_>) -> rusqlite::Result<ArtistRecord> {
    let tracks: Option<String> = row.get("famous_tracks")?;

    Ok(ArtistRecord {
        id: Some(ArtistId(row.get("id")?)),
        name: row.get("name")?,
        genre: text_or_empty(row, "genre")?,
        origin: text_or_empty(row, "origin")?,
        era: text_or_empty(row, "era")?,
        bio: text_or_empty(row, "bio")?,
        famous_tracks: tracks.as_deref().map(parse_track_list).unwrap_or_default(),
        image: row.get("image")?,
    })
}

fn text_or_empty(row: &Row<'_>, column: &str) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(column)?.unwrap_or_default())
}
