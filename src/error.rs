//! Error types for Sharebox.

use thiserror::Error;

use crate::auth::PasswordError;

/// Common error type for Sharebox.
#[derive(Error, Debug)]
pub enum ShareboxError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Login failed. Never says whether the username exists.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// No authenticated session.
    #[error("authentication required")]
    Unauthenticated,

    /// Authenticated, but not allowed to perform the operation.
    #[error("access denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// A requested path escaped its collection root.
    ///
    /// Callers outside the server must see this exactly like `NotFound`.
    #[error("path escapes collection root: {0}")]
    PathTraversal(String),

    /// Username is already taken.
    #[error("username already exists: {0}")]
    DuplicateUsername(String),

    /// A regular account's directory equals, contains or sits inside
    /// another regular account's directory.
    #[error("directory overlaps another account's collection: {0}")]
    DirectoryConflict(String),

    /// Refused to delete the only remaining admin account.
    #[error("cannot delete the last admin account")]
    LastAdmin,

    /// A regular account was created without a storage directory.
    #[error("a directory is required for non-admin accounts")]
    MissingDirectory,

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Password hashing or policy error.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for ShareboxError {
    fn from(e: sqlx::Error) -> Self {
        ShareboxError::Database(e.to_string())
    }
}

/// Result type alias for Sharebox operations.
pub type Result<T> = std::result::Result<T, ShareboxError>;
