//! Collection storage for Sharebox.
//!
//! Each regular account owns one directory below the storage root:
//! ```text
//! {base_path}/
//! ├── alice/
//! │   └── a/b/video.mp4
//! ├── bob/
//! │   └── song.mp3
//! └── ...
//! ```
//! Every path supplied by a client is confined with [`resolve`] before any
//! filesystem access.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use super::lister::{self, FileEntry};
use super::resolver::{resolve, validate_directory};
use crate::{Result, ShareboxError};

/// Storage service for per-account collections.
#[derive(Debug, Clone)]
pub struct CollectionStorage {
    /// Directory holding one sub-directory per regular account.
    base_path: PathBuf,
}

impl CollectionStorage {
    /// Create a new CollectionStorage with the given base path.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Root of the collection stored under `directory`.
    ///
    /// The directory must be a safe relative path.
    pub fn collection_root(&self, directory: &str) -> Result<PathBuf> {
        let relative = validate_directory(directory)
            .map_err(|_| ShareboxError::Validation(format!("unsafe directory: {directory}")))?;
        Ok(self.base_path.join(relative))
    }

    /// Create the collection directory if it doesn't exist.
    pub fn ensure_collection(&self, directory: &str) -> Result<PathBuf> {
        let root = self.collection_root(directory)?;
        if !root.exists() {
            fs::create_dir_all(&root)?;
            info!(directory, "created collection directory");
        }
        Ok(root)
    }

    /// Resolve a requested path inside a collection.
    pub fn resolve(&self, directory: &str, requested: &str) -> Result<PathBuf> {
        let root = self.collection_root(directory)?;
        Ok(resolve(&root, requested)?)
    }

    /// List a collection. Blocking; call from a blocking context.
    pub fn list(&self, directory: &str) -> Result<Vec<FileEntry>> {
        let root = self.collection_root(directory)?;
        Ok(lister::list(&root))
    }

    /// Describe a single file in a collection.
    pub fn entry(&self, directory: &str, requested: &str) -> Result<FileEntry> {
        let root = self.collection_root(directory)?;
        Ok(lister::describe(&root, requested)?)
    }

    /// Delete a file from a collection.
    pub fn delete(&self, directory: &str, requested: &str) -> Result<()> {
        let path = self.resolve(directory, requested)?;

        match fs::remove_file(&path) {
            Ok(()) => {
                info!(directory, path = requested, "deleted file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ShareboxError::NotFound("file".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
