//! Image asset folder.
//!
//! # Responsibility
//! - Persist uploaded images under a filename derived from the record name.
//! - Resolve record image references to a file or the placeholder.
//!
//! # Invariants
//! - Records store the bare filename, never a path.
//! - Derived filenames collide silently; the later write wins.
//! - A dangling reference resolves to the placeholder, not an error.

use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://placehold.co/400x400/202020/FFFFFF/png?text=Vinyl";

/// An uploaded file as received from the interactive surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original file name; only its extension is kept.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Reads an image from disk, keeping its file name for the extension.
    pub fn from_path(path: impl AsRef<Path>) -> AssetResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| AssetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { file_name, bytes })
    }
}

/// What the display layer should render for a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    File(PathBuf),
    Placeholder(&'static str),
}

pub type AssetResult<T> = Result<T, AssetError>;

#[derive(Debug)]
pub enum AssetError {
    Read { path: PathBuf, source: std::io::Error },
    Write { path: PathBuf, source: std::io::Error },
}

impl Display for AssetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read image `{}`: {source}", path.display())
            }
            Self::Write { path, source } => {
                write!(f, "failed to save image `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for AssetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
        }
    }
}

/// Flat folder of record images.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the asset folder when absent.
    pub fn ensure_root(&self) -> AssetResult<()> {
        std::fs::create_dir_all(&self.root).map_err(|source| AssetError::Write {
            path: self.root.clone(),
            source,
        })
    }

    /// Writes `upload` under a name derived from `record_name`.
    ///
    /// Returns `Ok(None)` without touching the filesystem when there is no
    /// upload, otherwise the stored filename.
    pub fn save_image(
        &self,
        upload: Option<&ImageUpload>,
        record_name: &str,
    ) -> AssetResult<Option<String>> {
        let Some(upload) = upload else {
            return Ok(None);
        };

        let file_name = derive_image_name(record_name, &upload.file_name);
        let path = self.root.join(&file_name);
        self.ensure_root()?;
        std::fs::write(&path, &upload.bytes).map_err(|source| AssetError::Write {
            path: path.clone(),
            source,
        })?;

        info!(
            "event=image_save module=assets status=ok bytes={} file={file_name}",
            upload.bytes.len()
        );
        Ok(Some(file_name))
    }

    /// Resolves a record's image reference.
    pub fn resolve_image(&self, image: Option<&str>) -> ImageRef {
        match image.filter(|name| !name.is_empty()) {
            Some(name) => {
                let path = self.root.join(name);
                if path.is_file() {
                    ImageRef::File(path)
                } else {
                    debug!("event=image_resolve module=assets status=dangling file={name}");
                    ImageRef::Placeholder(PLACEHOLDER_IMAGE_URL)
                }
            }
            None => ImageRef::Placeholder(PLACEHOLDER_IMAGE_URL),
        }
    }
}

/// Derives the stored filename: spaces (and path separators) become `_`,
/// then the source file's extension is appended.
pub fn derive_image_name(record_name: &str, source_file_name: &str) -> String {
    let stem: String = record_name
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    format!("{stem}{}", source_extension(source_file_name))
}

fn source_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
