//! Admin handlers for Web API.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Response, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::db::{AccountRepository, AccountRole, NewAccount};
use crate::web::dto::{
    AccountInfo, ApiResponse, CollectionResponse, CreateAccountRequest, FileViewResponse,
    ResetPasswordRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::file::{
    delete_file, describe_file, encode_path, list_collection, serve_file, Disposition,
};
use crate::web::handlers::AppState;
use crate::web::middleware::SessionToken;

// ============================================================================
// Account Management
// ============================================================================

/// GET /api/admin/accounts - List all accounts.
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    SessionToken(session): SessionToken,
) -> Result<Json<ApiResponse<Vec<AccountInfo>>>, ApiError> {
    state.access().authorize_admin(session.as_ref()).await?;

    let accounts = AccountRepository::new(state.db.pool()).list_all().await?;
    let accounts = accounts.iter().map(AccountInfo::from).collect();

    Ok(Json(ApiResponse::new(accounts)))
}

/// POST /api/admin/accounts - Create an account.
///
/// Regular accounts get their collection directory created; failing to
/// create it does not fail the request.
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    SessionToken(session): SessionToken,
    ValidatedJson(req): ValidatedJson<CreateAccountRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AccountInfo>>), ApiError> {
    let admin = state.access().authorize_admin(session.as_ref()).await?;

    let role = AccountRole::from_admin_flag(req.is_admin);
    let mut new_account = NewAccount::new(
        req.username,
        req.password,
        req.directory.unwrap_or_default(),
    )
    .with_role(role);
    if let Some(display_name) = req.display_name.filter(|n| !n.trim().is_empty()) {
        new_account = new_account.with_display_name(display_name);
    }

    let account = AccountRepository::new(state.db.pool())
        .create(&new_account)
        .await?;

    if let Some(directory) = account.collection_directory() {
        if let Err(e) = state.storage.ensure_collection(directory) {
            tracing::warn!(
                account_id = account.id,
                directory,
                error = %e,
                "failed to create collection directory"
            );
        }
    }

    tracing::info!(
        admin_id = admin.id,
        account_id = account.id,
        username = %account.username,
        role = account.role.as_str(),
        "account created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(AccountInfo::from(&account))),
    ))
}

/// PUT /api/admin/accounts/:id/password - Reset an account's password.
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    SessionToken(session): SessionToken,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let admin = state.access().authorize_admin(session.as_ref()).await?;

    AccountRepository::new(state.db.pool())
        .reset_password(id, &req.password)
        .await?;

    tracing::info!(admin_id = admin.id, account_id = id, "password reset");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/admin/accounts/:id - Delete an account.
///
/// The last remaining admin cannot be deleted. Files on disk are kept.
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    SessionToken(session): SessionToken,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<AccountInfo>>, ApiError> {
    let admin = state.access().authorize_admin(session.as_ref()).await?;

    let deleted = AccountRepository::new(state.db.pool()).delete(id).await?;

    tracing::info!(
        admin_id = admin.id,
        account_id = deleted.id,
        username = %deleted.username,
        "account deleted"
    );

    Ok(Json(ApiResponse::new(AccountInfo::from(&deleted))))
}

// ============================================================================
// Collection Management
// ============================================================================

/// GET /api/admin/accounts/:id/files - List a regular account's collection.
pub async fn account_files(
    State(state): State<Arc<AppState>>,
    SessionToken(session): SessionToken,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<CollectionResponse>>, ApiError> {
    let target = state
        .access()
        .authorize_admin_view_any(session.as_ref(), id)
        .await?;
    let files = list_collection(&state.storage, &target).await?;

    Ok(Json(ApiResponse::new(CollectionResponse::new(
        &target, files,
    ))))
}

/// DELETE /api/admin/accounts/:id/files/*path - Delete a file from a collection.
pub async fn delete_account_file(
    State(state): State<Arc<AppState>>,
    SessionToken(session): SessionToken,
    Path((id, path)): Path<(i64, String)>,
) -> Result<StatusCode, ApiError> {
    let access = state.access();
    let admin = access.authorize_admin(session.as_ref()).await?;
    let target = access.authorize_admin_view_any(session.as_ref(), id).await?;

    if let Err(e) = delete_file(&state.storage, &target, path.clone()).await {
        tracing::warn!(
            admin_id = admin.id,
            account_id = target.id,
            path = %path,
            error = %e,
            "file deletion failed"
        );
        return Err(e.into());
    }

    tracing::info!(
        admin_id = admin.id,
        account_id = target.id,
        path = %path,
        "file deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/accounts/:id/view/*path - Preview metadata as an admin.
///
/// Admins view collections but are not offered downloads.
pub async fn view_account_file(
    State(state): State<Arc<AppState>>,
    SessionToken(session): SessionToken,
    Path((id, path)): Path<(i64, String)>,
) -> Result<Json<ApiResponse<FileViewResponse>>, ApiError> {
    let target = state
        .access()
        .authorize_admin_view_any(session.as_ref(), id)
        .await?;
    let file = describe_file(&state.storage, &target, path).await?;

    let response = FileViewResponse {
        previewable: file.category.is_previewable(),
        stream_url: format!(
            "/api/admin/accounts/{}/stream/{}",
            target.id,
            encode_path(&file.relative_path)
        ),
        download_url: None,
        file,
    };

    Ok(Json(ApiResponse::new(response)))
}

/// GET /api/admin/accounts/:id/stream/*path - Inline stream as an admin.
pub async fn stream_account_file(
    State(state): State<Arc<AppState>>,
    SessionToken(session): SessionToken,
    Path((id, path)): Path<(i64, String)>,
) -> Result<Response<Body>, ApiError> {
    let target = state
        .access()
        .authorize_admin_view_any(session.as_ref(), id)
        .await?;

    serve_file(&state.storage, &target, path, Disposition::Inline).await
}
