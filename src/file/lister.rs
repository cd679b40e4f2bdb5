//! Recursive listing of a collection directory.

use std::path::Path;

use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use super::category::{classify, extension_of, format_size, Category};
use super::resolver::{resolve, to_slash_path, ResolveError};

/// A regular file inside a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Final path component.
    pub name: String,
    /// Path relative to the collection root, forward slashes.
    pub relative_path: String,
    /// Lower-cased extension, possibly empty.
    pub extension: String,
    /// Preview category.
    pub category: Category,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Human-readable size.
    pub size_display: String,
}

impl FileEntry {
    fn new(name: String, relative_path: String, size_bytes: u64) -> Self {
        let extension = extension_of(&name);
        let category = classify(&extension);
        Self {
            name,
            relative_path,
            extension,
            category,
            size_bytes,
            size_display: format_size(size_bytes),
        }
    }
}

/// List every regular file below `root`, sorted by relative path.
///
/// A missing or non-directory root yields an empty list. Symlinks are not
/// followed. Unreadable entries and entries whose path is not valid UTF-8
/// are skipped, since neither could be requested back by path.
pub fn list(root: &Path) -> Vec<FileEntry> {
    if !root.is_dir() {
        debug!(root = %root.display(), "collection root missing, empty listing");
        return Vec::new();
    }

    let mut entries = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).min_depth(1) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = match entry.path().strip_prefix(root) {
            Ok(p) => p,
            Err(_) => continue,
        };

        let (Some(name), Some(_)) = (entry.file_name().to_str(), relative.to_str()) else {
            debug!(path = %entry.path().display(), "skipping entry with non-UTF-8 path");
            continue;
        };
        let name = name.to_string();

        let size_bytes = match entry.metadata() {
            Ok(m) => m.len(),
            Err(e) => {
                debug!(path = %entry.path().display(), error = %e, "skipping entry without metadata");
                continue;
            }
        };

        entries.push(FileEntry::new(name, to_slash_path(relative), size_bytes));
    }

    entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    entries
}

/// Describe a single file inside `root`.
///
/// The path goes through [`resolve`] first, so the same rejections apply.
pub fn describe(root: &Path, requested: &str) -> Result<FileEntry, ResolveError> {
    let path = resolve(root, requested)?;
    let not_found = || ResolveError::NotFound(requested.to_string());

    let canonical_root = root.canonicalize().map_err(|_| not_found())?;
    let relative = path.strip_prefix(&canonical_root).map_err(|_| not_found())?;
    let size_bytes = std::fs::metadata(&path).map_err(|_| not_found())?.len();
    if relative.to_str().is_none() {
        return Err(not_found());
    }
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(not_found)?;

    Ok(FileEntry::new(name, to_slash_path(relative), size_bytes))
}
