//! File collection module for Sharebox.
//!
//! This module provides:
//! - Extension-based classification and size formatting
//! - Confinement of requested paths to a collection root
//! - Recursive collection listings
//! - Per-account collection storage

mod category;
mod lister;
mod resolver;
mod storage;

pub use category::{classify, extension_of, format_size, Category};
pub use lister::{describe, list, FileEntry};
pub use resolver::{normalize, resolve, to_slash_path, validate_directory, ResolveError};
pub use storage::CollectionStorage;
