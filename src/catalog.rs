//! Remote collection catalog.
//!
//! A drive-sync job writes a JSON listing of each user's remote folder:
//!
//! ```json
//! {
//!   "alice": [
//!     { "name": "clip.mp4", "id": "1AbC", "size": 5000, "link": "https://..." }
//!   ]
//! }
//! ```
//!
//! `size` may be a byte count or an already formatted string. Entries are
//! classified the same way as local files. Keys are matched against account
//! usernames exactly, the same way login does.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::file::{classify, extension_of, format_size, Category};
use crate::{Result, ShareboxError};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSize {
    Bytes(u64),
    Display(String),
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    name: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    size: Option<RawSize>,
    #[serde(default)]
    link: String,
    #[serde(default)]
    preview_link: Option<String>,
}

/// A file held by the remote drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteFile {
    /// File name.
    pub name: String,
    /// Remote file ID.
    pub id: String,
    /// Download link.
    pub download_url: String,
    /// Inline preview link. Falls back to the download link.
    pub preview_url: String,
    /// Size in bytes, when the listing reported one.
    pub size_bytes: Option<u64>,
    /// Human-readable size.
    pub size_display: String,
    /// Preview category.
    pub category: Category,
}

impl RemoteFile {
    fn from_raw(raw: RawEntry) -> Self {
        let (size_bytes, size_display) = match raw.size {
            Some(RawSize::Bytes(bytes)) => (Some(bytes), format_size(bytes)),
            Some(RawSize::Display(display)) => (None, display),
            None => (None, format_size(0)),
        };
        let category = classify(&extension_of(&raw.name));
        let preview_url = raw
            .preview_link
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| raw.link.clone());

        Self {
            name: raw.name,
            id: raw.id,
            download_url: raw.link,
            preview_url,
            size_bytes,
            size_display,
            category,
        }
    }
}

/// One user's remote files, sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteCollection {
    /// Username as written in the catalog.
    pub username: String,
    /// Files sorted by name.
    pub files: Vec<RemoteFile>,
}

/// All remote collections keyed by username.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    collections: BTreeMap<String, RemoteCollection>,
}

impl Catalog {
    /// Parse a catalog from its JSON text.
    pub fn parse(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<RawEntry>> = serde_json::from_str(json)
            .map_err(|e| ShareboxError::Validation(format!("malformed catalog: {e}")))?;

        let collections = raw
            .into_iter()
            .map(|(username, entries)| {
                let mut files: Vec<RemoteFile> =
                    entries.into_iter().map(RemoteFile::from_raw).collect();
                files.sort_by(|a, b| a.name.cmp(&b.name));
                let collection = RemoteCollection {
                    username: username.clone(),
                    files,
                };
                (username, collection)
            })
            .collect();

        Ok(Self { collections })
    }

    /// Collection for a username. Usernames are case-sensitive.
    pub fn get(&self, username: &str) -> Option<&RemoteCollection> {
        self.collections.get(username)
    }

    /// All collections ordered by username.
    pub fn collections(&self) -> impl Iterator<Item = &RemoteCollection> {
        self.collections.values()
    }

    /// Number of users in the catalog.
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

/// Load the catalog file.
///
/// A missing or malformed file is logged and yields an empty catalog.
pub fn load(path: impl AsRef<Path>) -> Catalog {
    let path = path.as_ref();

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to read catalog");
            return Catalog::default();
        }
    };

    match Catalog::parse(&content) {
        Ok(catalog) => {
            info!(path = %path.display(), users = catalog.len(), "catalog loaded");
            catalog
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to parse catalog");
            Catalog::default()
        }
    }
}
