//! Artist record model.
//!
//! # Responsibility
//! - Define the canonical band profile persisted by every record store.
//! - Convert track lists between their in-memory and delimited forms.
//!
//! # Invariants
//! - `name` is never blank once a record passes `validate()`.
//! - `famous_tracks` round-trips to the same trimmed sequence in every backend.
//!   Entries that are blank after trimming are dropped on write, so
//!   `["A", "  ", "B"]` reads back as `["A", "B"]` from either store.
//! - `image` is a bare filename relative to the asset folder; it may dangle.

use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Separator used when a track list is flattened into one text column.
pub const TRACK_DELIMITER: &str = ", ";

/// Durable key of a record.
///
/// Relational rows use their autoincrement `id`. Document records use their
/// 1-based position in the file, which is stable because records are
/// append-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtistId(pub i64);

impl Display for ArtistId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One band profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRecord {
    /// Assigned by the store on read; never written to the document file.
    #[serde(skip)]
    pub id: Option<ArtistId>,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub genre: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub origin: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub era: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub bio: String,
    #[serde(default, deserialize_with = "null_as_empty_tracks")]
    pub famous_tracks: Vec<String>,
    /// `None` means "render the placeholder".
    #[serde(default)]
    pub image: Option<String>,
}

/// Validation failure for records about to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtistValidationError {
    /// `name` is empty or whitespace only.
    EmptyName,
}

impl Display for ArtistValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "artist name is required"),
        }
    }
}

impl Error for ArtistValidationError {}

impl ArtistRecord {
    /// Creates a record with only a name; every optional field is empty.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Checks the invariants required before persistence.
    pub fn validate(&self) -> Result<(), ArtistValidationError> {
        if self.name.trim().is_empty() {
            return Err(ArtistValidationError::EmptyName);
        }
        Ok(())
    }

    /// Returns a copy with the track list in canonical form.
    pub fn normalized(&self) -> Self {
        Self {
            famous_tracks: normalize_tracks(&self.famous_tracks),
            ..self.clone()
        }
    }
}

/// Trims every track and drops the ones that end up empty.
///
/// Both stores apply this on write; blank entries are not preserved.
pub fn normalize_tracks<S: AsRef<str>>(tracks: &[S]) -> Vec<String> {
    tracks
        .iter()
        .map(|track| track.as_ref().trim())
        .filter(|track| !track.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits comma separated user input (or a stored column) into tracks.
pub fn parse_track_list(input: &str) -> Vec<String> {
    normalize_tracks(&input.split(',').collect::<Vec<_>>())
}

/// Flattens a track list into its single-column representation.
pub fn tracks_to_column<S: AsRef<str>>(tracks: &[S]) -> String {
    normalize_tracks(tracks).join(TRACK_DELIMITER)
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_empty_tracks<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::{parse_track_list, tracks_to_column, ArtistRecord, ArtistValidationError};

    #[test]
    fn validate_rejects_blank_name() {
        assert_eq!(
            ArtistRecord::new("   ").validate(),
            Err(ArtistValidationError::EmptyName)
        );
        assert!(ArtistRecord::new("Taknara").validate().is_ok());
    }

    #[test]
    fn parse_track_list_trims_and_skips_empty_entries() {
        assert_eq!(
            parse_track_list(" Song A ,, Song B,"),
            vec!["Song A".to_string(), "Song B".to_string()]
        );
        assert!(parse_track_list("").is_empty());
    }

    #[test]
    fn tracks_to_column_uses_comma_space() {
        assert_eq!(tracks_to_column(&["Song A", " Song B "]), "Song A, Song B");
    }

    #[test]
    fn deserialize_tolerates_missing_and_null_fields() {
        let record: ArtistRecord =
            serde_json::from_str(r#"{"name":"Taknara","genre":null,"image":null}"#).unwrap();
        assert_eq!(record.name, "Taknara");
        assert_eq!(record.genre, "");
        assert!(record.famous_tracks.is_empty());
        assert_eq!(record.image, None);
        assert_eq!(record.id, None);
    }
}
