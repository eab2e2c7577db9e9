//! Core of the band archive: record stores, context assembly, chat and assets.
//! Presentation layers call into this crate and render what it returns.

pub mod assets;
pub mod chat;
pub mod config;
pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use assets::{AssetError, AssetStore, ImageRef, ImageUpload, PLACEHOLDER_IMAGE_URL};
pub use chat::{
    ChatPipeline, GeminiService, GenerationService, ServiceError, AI_ERROR_PREFIX,
    MISSING_API_KEY_WARNING,
};
pub use config::{load_config, ArchiveConfig, BackendKind, ConfigError};
pub use context::{build_focus_context, build_global_context, EMPTY_CONTEXT, PROFILE_DELIMITER};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::artist::{ArtistId, ArtistRecord, ArtistValidationError};
pub use service::archive_service::{ArchiveService, CuratorError, NewArtist};
pub use store::{
    migrate_records, open_record_store, select_artist, JsonDocumentStore, RecordStore,
    SqliteArtistStore, StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
