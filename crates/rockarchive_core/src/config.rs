//! Archive configuration.
//!
//! # Responsibility
//! - Describe where records, images and logs live and which backend is active.
//! - Load overrides from an optional TOML file; every field has a default.
//!
//! # Invariants
//! - The API key is never part of the configuration.

use log::info;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_GENERATION_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GENERATION_MODEL: &str = "gemini-2.5-flash";

/// Which record store implementation backs the archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// One JSON array rewritten on every append.
    Document,
    /// A SQLite `artists` table.
    #[default]
    Relational,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Relational => "relational",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GENERATION_BASE_URL.to_string(),
            model: DEFAULT_GENERATION_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub data_dir: PathBuf,
    pub images_dir: PathBuf,
    pub backend: BackendKind,
    pub document_file: String,
    pub database_file: String,
    /// Falls back to `default_log_level()` when unset.
    pub log_level: Option<String>,
    pub generation: GenerationConfig,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            images_dir: PathBuf::from("images"),
            backend: BackendKind::default(),
            document_file: "artists.json".to_string(),
            database_file: "rock_archive.db".to_string(),
            log_level: None,
            generation: GenerationConfig::default(),
        }
    }
}

impl ArchiveConfig {
    pub fn document_path(&self) -> PathBuf {
        self.data_dir.join(&self.document_file)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// Loads configuration from `path`, or returns defaults when `path` is `None`.
///
/// # Errors
/// - An explicit path that cannot be read or parsed is an error; it is never
///   silently replaced by defaults.
pub fn load_config(path: Option<&Path>) -> ConfigResult<ArchiveConfig> {
    let Some(path) = path else {
        return Ok(ArchiveConfig::default());
    };

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        "event=config_load module=config status=ok path={} backend={}",
        path.display(),
        config.backend.as_str()
    );
    Ok(config)
}

fn parse_config(raw: &str) -> Result<ArchiveConfig, toml::de::Error> {
    toml::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::{load_config, parse_config, ArchiveConfig, BackendKind, ConfigError};
    use std::path::{Path, PathBuf};

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(parse_config("").unwrap(), ArchiveConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let config = parse_config(
            r#"
            backend = "document"
            data_dir = "/srv/archive"

            [generation]
            model = "gemini-2.0-flash"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend, BackendKind::Document);
        assert_eq!(config.data_dir, PathBuf::from("/srv/archive"));
        assert_eq!(config.document_path(), PathBuf::from("/srv/archive/artists.json"));
        assert_eq!(config.generation.model, "gemini-2.0-flash");
        assert_eq!(
            config.generation.base_url,
            super::DEFAULT_GENERATION_BASE_URL
        );
        assert_eq!(config.images_dir, PathBuf::from("images"));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(parse_config(r#"backend = "spreadsheet""#).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn no_path_yields_defaults() {
        assert_eq!(load_config(None).unwrap(), ArchiveConfig::default());
    }
}
