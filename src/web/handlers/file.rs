//! File handlers for a regular account's own collection.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Response},
    Json,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::catalog::RemoteCollection;
use crate::db::Account;
use crate::file::{CollectionStorage, FileEntry};
use crate::web::dto::{ApiResponse, CollectionResponse, FileViewResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::SessionToken;
use crate::{Result, ShareboxError};

/// How a streamed file is presented to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Shown in the page.
    Inline,
    /// Saved to disk.
    Attachment,
}

impl Disposition {
    fn as_str(&self) -> &'static str {
        match self {
            Disposition::Inline => "inline",
            Disposition::Attachment => "attachment",
        }
    }
}

/// Build a Content-Disposition header value safely.
///
/// Filenames with non-ASCII characters or quoting hazards get an RFC 5987
/// `filename*` parameter next to a sanitized ASCII fallback.
pub fn content_disposition_header(disposition: Disposition, filename: &str) -> String {
    let kind = disposition.as_str();

    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("{kind}; filename=\"{filename}\"");
    }

    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            c => c,
        })
        .collect();
    let encoded = urlencoding::encode(filename);

    format!("{kind}; filename=\"{sanitized}\"; filename*=UTF-8''{encoded}")
}

/// Percent-encode each segment of a relative path for use in a URL.
pub fn encode_path(relative: &str) -> String {
    relative
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// The caller's own regular account.
pub(crate) async fn own_account(state: &AppState, session: &SessionToken) -> Result<Account> {
    let session = session.0.as_ref();
    let account_id = session.map(|s| s.account_id).unwrap_or_default();
    state
        .access()
        .authorize_own_files(session, account_id)
        .await
}

/// Directory of a regular account.
pub(crate) fn collection_directory(account: &Account) -> Result<&str> {
    account
        .collection_directory()
        .ok_or_else(|| ShareboxError::Forbidden("admin accounts have no collection".to_string()))
}

/// List a collection on the blocking pool.
pub(crate) async fn list_collection(
    storage: &CollectionStorage,
    account: &Account,
) -> Result<Vec<FileEntry>> {
    let storage = storage.clone();
    let directory = collection_directory(account)?.to_string();

    tokio::task::spawn_blocking(move || storage.list(&directory))
        .await
        .map_err(|e| ShareboxError::Io(std::io::Error::other(e)))?
}

/// Describe a file on the blocking pool.
pub(crate) async fn describe_file(
    storage: &CollectionStorage,
    account: &Account,
    requested: String,
) -> Result<FileEntry> {
    let storage = storage.clone();
    let directory = collection_directory(account)?.to_string();

    tokio::task::spawn_blocking(move || storage.entry(&directory, &requested))
        .await
        .map_err(|e| ShareboxError::Io(std::io::Error::other(e)))?
}

/// Resolve a requested path on the blocking pool.
pub(crate) async fn resolve_file(
    storage: &CollectionStorage,
    account: &Account,
    requested: String,
) -> Result<PathBuf> {
    let storage = storage.clone();
    let directory = collection_directory(account)?.to_string();

    tokio::task::spawn_blocking(move || storage.resolve(&directory, &requested))
        .await
        .map_err(|e| ShareboxError::Io(std::io::Error::other(e)))?
}

/// Delete a file on the blocking pool.
pub(crate) async fn delete_file(
    storage: &CollectionStorage,
    account: &Account,
    requested: String,
) -> Result<()> {
    let storage = storage.clone();
    let directory = collection_directory(account)?.to_string();

    tokio::task::spawn_blocking(move || storage.delete(&directory, &requested))
        .await
        .map_err(|e| ShareboxError::Io(std::io::Error::other(e)))?
}

/// Stream a resolved file.
pub(crate) async fn stream_file(
    path: PathBuf,
    filename: &str,
    disposition: Disposition,
) -> std::result::Result<Response<Body>, ApiError> {
    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ApiError::from(ShareboxError::NotFound("file".to_string()))
        } else {
            ApiError::from(ShareboxError::Io(e))
        }
    })?;
    let size = file
        .metadata()
        .await
        .map_err(|e| ApiError::from(ShareboxError::Io(e)))?
        .len();

    let content_type = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .to_string();

    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(disposition, filename),
        )
        .header(header::CONTENT_LENGTH, size)
        .header(header::X_CONTENT_TYPE_OPTIONS, "nosniff")
        .body(body)
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// Resolve, describe and stream a file from an account's collection.
pub(crate) async fn serve_file(
    storage: &CollectionStorage,
    account: &Account,
    requested: String,
    disposition: Disposition,
) -> std::result::Result<Response<Body>, ApiError> {
    let path = resolve_file(storage, account, requested.clone()).await?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    tracing::debug!(account_id = account.id, path = %requested, "serving file");
    stream_file(path, &filename, disposition).await
}

/// GET /api/files - List the caller's collection.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    session: SessionToken,
) -> std::result::Result<Json<ApiResponse<CollectionResponse>>, ApiError> {
    let account = own_account(&state, &session).await?;
    let files = list_collection(&state.storage, &account).await?;

    Ok(Json(ApiResponse::new(CollectionResponse::new(
        &account, files,
    ))))
}

/// GET /api/view/*path - Preview metadata for one file.
pub async fn view_file(
    State(state): State<Arc<AppState>>,
    session: SessionToken,
    Path(path): Path<String>,
) -> std::result::Result<Json<ApiResponse<FileViewResponse>>, ApiError> {
    let account = own_account(&state, &session).await?;
    let file = describe_file(&state.storage, &account, path).await?;

    let encoded = encode_path(&file.relative_path);
    let response = FileViewResponse {
        previewable: file.category.is_previewable(),
        stream_url: format!("/api/stream/{encoded}"),
        download_url: Some(format!("/api/download/{encoded}")),
        file,
    };

    Ok(Json(ApiResponse::new(response)))
}

/// GET /api/stream/*path - Inline stream of one file.
pub async fn stream_own_file(
    State(state): State<Arc<AppState>>,
    session: SessionToken,
    Path(path): Path<String>,
) -> std::result::Result<Response<Body>, ApiError> {
    let account = own_account(&state, &session).await?;
    serve_file(&state.storage, &account, path, Disposition::Inline).await
}

/// GET /api/download/*path - Attachment download of one file.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    session: SessionToken,
    Path(path): Path<String>,
) -> std::result::Result<Response<Body>, ApiError> {
    let account = own_account(&state, &session).await?;
    serve_file(&state.storage, &account, path, Disposition::Attachment).await
}

/// GET /api/remote - The caller's files in the remote drive catalog.
pub async fn remote_files(
    State(state): State<Arc<AppState>>,
    session: SessionToken,
) -> std::result::Result<Json<ApiResponse<RemoteCollection>>, ApiError> {
    let account = own_account(&state, &session).await?;

    let collection = state
        .catalog
        .get(&account.username)
        .cloned()
        .unwrap_or_else(|| RemoteCollection {
            username: account.username.clone(),
            files: Vec::new(),
        });

    Ok(Json(ApiResponse::new(collection)))
}
