//! Archive use-case service.
//!
//! # Responsibility
//! - Curator flow: validate, save the image, append the record.
//! - Browse flow: list records, select one by key.
//! - Ask flow: one context blob per interaction, focus resolved by key.
//!
//! # Invariants
//! - Nothing is written (image or record) for a record without a name.
//! - Selection is always re-derived from a fresh `load_all()` by `ArtistId`.

use crate::assets::{AssetError, AssetStore, ImageUpload};
use crate::chat::{ChatPipeline, GenerationService};
use crate::context::{build_focus_context, build_global_context};
use crate::model::artist::{parse_track_list, ArtistId, ArtistRecord, ArtistValidationError};
use crate::store::{select_artist, RecordStore, StoreError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Form input for a new record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewArtist {
    pub name: String,
    pub genre: String,
    pub origin: String,
    pub era: String,
    pub bio: String,
    /// Comma separated, as typed by the curator.
    pub tracks: String,
}

#[derive(Debug)]
pub enum CuratorError {
    Validation(ArtistValidationError),
    Asset(AssetError),
    Store(StoreError),
}

impl Display for CuratorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Asset(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "save error: {err}"),
        }
    }
}

impl Error for CuratorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Asset(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ArtistValidationError> for CuratorError {
    fn from(value: ArtistValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<AssetError> for CuratorError {
    fn from(value: AssetError) -> Self {
        Self::Asset(value)
    }
}

impl From<StoreError> for CuratorError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(err) => Self::Validation(err),
            other => Self::Store(other),
        }
    }
}

/// Archive service over one record store and the asset folder.
pub struct ArchiveService<S: RecordStore> {
    store: S,
    assets: AssetStore,
}

impl<S: RecordStore> ArchiveService<S> {
    pub fn new(store: S, assets: AssetStore) -> Self {
        Self { store, assets }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    /// Lists every record; read failures yield an empty list.
    pub fn list_artists(&self) -> Vec<ArtistRecord> {
        self.store.load_all()
    }

    /// Loads every record and returns the one with key `id`.
    pub fn get_artist(&self, id: ArtistId) -> Option<ArtistRecord> {
        select_artist(&self.store.load_all(), id).cloned()
    }

    /// Builds the archive-wide context blob from a fresh read.
    pub fn global_context(&self) -> String {
        build_global_context(&self.store.load_all())
    }

    /// Adds a record from curator input, saving `image` first when present.
    ///
    /// # Errors
    /// - `Validation` for a blank name; nothing is written in that case.
    /// - `Asset` when the image cannot be written; the record is not appended.
    /// - `Store` when the append fails.
    pub fn add_artist(
        &self,
        input: &NewArtist,
        image: Option<&ImageUpload>,
    ) -> Result<ArtistId, CuratorError> {
        let mut record = ArtistRecord {
            id: None,
            name: input.name.trim().to_string(),
            genre: input.genre.clone(),
            origin: input.origin.clone(),
            era: input.era.clone(),
            bio: input.bio.clone(),
            famous_tracks: parse_track_list(&input.tracks),
            image: None,
        };
        record.validate()?;

        record.image = self.assets.save_image(image, &record.name)?;
        let id = self.store.append(&record)?;

        info!(
            "event=artist_add module=service status=ok id={id} tracks={} has_image={}",
            record.famous_tracks.len(),
            record.image.is_some()
        );
        Ok(id)
    }

    /// Runs one ask interaction: read all, build context once, resolve focus.
    ///
    /// The focused record is embedded as its own profile block. An unknown
    /// `focus` key is ignored rather than reported.
    pub fn ask<G: GenerationService>(
        &self,
        pipeline: &ChatPipeline<G>,
        api_key: &str,
        question: &str,
        focus: Option<ArtistId>,
    ) -> String {
        let records = self.store.load_all();
        let context = build_global_context(&records);
        let focus_profile = focus
            .and_then(|id| select_artist(&records, id))
            .map(build_focus_context);

        pipeline.ask(api_key, &context, question, focus_profile.as_deref())
    }
}
