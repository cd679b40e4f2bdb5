//! Confinement of caller-supplied paths to a collection root.
//!
//! Every operation that touches a file inside a collection goes through
//! [`resolve`] first.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::ShareboxError;

/// Path resolution errors. Both variants carry the requested path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The path is absolute or climbs out of the root.
    #[error("path escapes collection root: {0}")]
    PathTraversal(String),

    /// The path stays inside the root but names no regular file.
    #[error("file not found: {0}")]
    NotFound(String),
}

impl From<ResolveError> for ShareboxError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::PathTraversal(path) => ShareboxError::PathTraversal(path),
            ResolveError::NotFound(path) => {
                debug!(path, "requested file not found");
                ShareboxError::NotFound("file".to_string())
            }
        }
    }
}

/// Normalize a relative request path without touching the filesystem.
///
/// `.` segments and empty segments are dropped and `..` pops the previous
/// segment. Absolute paths, drive or volume prefixes, backslashes, NUL bytes,
/// climbing above the root and paths that normalize to the root itself are
/// all rejected.
pub fn normalize(requested: &str) -> Result<PathBuf, ResolveError> {
    let traversal = || ResolveError::PathTraversal(requested.to_string());

    if requested.starts_with('/') || requested.contains('\\') || requested.contains('\0') {
        return Err(traversal());
    }

    let bytes = requested.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return Err(traversal());
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in requested.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(traversal());
                }
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Err(traversal());
    }

    let normalized: PathBuf = segments.iter().collect();

    // Anything other than plain names here means the platform parsed a
    // prefix or root we did not anticipate.
    if !normalized
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return Err(traversal());
    }

    Ok(normalized)
}

/// Resolve `requested` against `root` and return the canonical file path.
///
/// The result is guaranteed to be a regular file strictly below the
/// canonical root. Symlinks pointing outside the root are rejected as
/// traversal.
pub fn resolve(root: &Path, requested: &str) -> Result<PathBuf, ResolveError> {
    let relative = normalize(requested)?;
    let not_found = || ResolveError::NotFound(requested.to_string());

    let canonical_root = root.canonicalize().map_err(|_| not_found())?;
    let candidate = canonical_root.join(relative);
    let canonical = candidate.canonicalize().map_err(|_| not_found())?;

    if canonical == canonical_root || !canonical.starts_with(&canonical_root) {
        return Err(ResolveError::PathTraversal(requested.to_string()));
    }

    let metadata = std::fs::metadata(&canonical).map_err(|_| not_found())?;
    if !metadata.is_file() {
        return Err(not_found());
    }

    Ok(canonical)
}

/// Validate a storage directory name given to a new account.
///
/// The directory must itself be a safe relative path so that the
/// collection root always lands inside the storage root.
pub fn validate_directory(directory: &str) -> Result<PathBuf, ResolveError> {
    let normalized = normalize(directory)?;
    if directory.split('/').any(|s| s == "..") {
        return Err(ResolveError::PathTraversal(directory.to_string()));
    }
    Ok(normalized)
}

/// Forward-slash form of a relative path, independent of the platform.
pub fn to_slash_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
