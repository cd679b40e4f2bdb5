//! Response DTOs for Web API.

use serde::Serialize;

use crate::db::{Account, AccountRole};
use crate::file::FileEntry;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Account information in responses. Never includes the password hash.
#[derive(Debug, Serialize)]
pub struct AccountInfo {
    /// Account ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Display name.
    pub display_name: String,
    /// Account role.
    pub role: AccountRole,
    /// Collection directory (absent for admins).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<&Account> for AccountInfo {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            display_name: account.display_name.clone(),
            role: account.role,
            directory: account.collection_directory().map(str::to_string),
            created_at: account.created_at.clone(),
        }
    }
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Session token (JWT). Also set as a cookie.
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
    /// The logged-in account.
    pub account: AccountInfo,
}

/// A collection listing.
#[derive(Debug, Serialize)]
pub struct CollectionResponse {
    /// Owner of the collection.
    pub account_id: i64,
    /// Owner's username.
    pub username: String,
    /// Owner's display name.
    pub display_name: String,
    /// Files sorted by relative path.
    pub files: Vec<FileEntry>,
}

impl CollectionResponse {
    /// Build a listing for an account.
    pub fn new(account: &Account, files: Vec<FileEntry>) -> Self {
        Self {
            account_id: account.id,
            username: account.username.clone(),
            display_name: account.display_name.clone(),
            files,
        }
    }
}

/// Preview metadata for a single file.
#[derive(Debug, Serialize)]
pub struct FileViewResponse {
    /// File metadata.
    #[serde(flatten)]
    pub file: FileEntry,
    /// Whether a browser can show the file inline.
    pub previewable: bool,
    /// URL of the inline stream.
    pub stream_url: String,
    /// URL of the attachment download, when the caller may download.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}
