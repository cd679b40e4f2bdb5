//! Authentication handlers.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::auth::Principal;
use crate::web::dto::{AccountInfo, ApiResponse, LoginRequest, LoginResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::SessionToken;
use crate::ShareboxError;

/// POST /api/auth/login - Log in and open a session.
///
/// The token is returned in the body and set as the session cookie. A
/// session the request already carried is revoked once the new one is open.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    SessionToken(mut previous): SessionToken,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResponse>>), ApiError> {
    let access = state.access();
    let session = access.login(&req.username, &req.password).await?;
    access.logout(&mut previous).await?;

    let account = match access.resolve(Some(&session)).await? {
        Principal::Authenticated(account) => account,
        Principal::Anonymous => return Err(ShareboxError::InvalidCredentials.into()),
    };

    let token = state.jwt.issue(&session)?;
    let jar = jar.add(state.jwt.session_cookie(token.clone()));

    let response = LoginResponse {
        token,
        expires_in: state.jwt.expiry_secs,
        account: AccountInfo::from(&account),
    };

    Ok((jar, Json(ApiResponse::new(response))))
}

/// POST /api/auth/logout - End the session.
///
/// Succeeds with or without a session. The token stops working for every
/// client holding a copy of it.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    SessionToken(mut session): SessionToken,
) -> Result<(CookieJar, Json<ApiResponse<()>>), ApiError> {
    state.access().logout(&mut session).await?;

    let jar = if jar.get(&state.jwt.cookie_name).is_some() {
        jar.add(state.jwt.removal_cookie())
    } else {
        jar
    };

    Ok((jar, Json(ApiResponse::new(()))))
}

/// GET /api/auth/me - Current account.
pub async fn me(
    State(state): State<Arc<AppState>>,
    SessionToken(session): SessionToken,
) -> Result<Json<ApiResponse<AccountInfo>>, ApiError> {
    match state.access().resolve(session.as_ref()).await? {
        Principal::Authenticated(account) => {
            Ok(Json(ApiResponse::new(AccountInfo::from(&account))))
        }
        Principal::Anonymous => Err(ShareboxError::Unauthenticated.into()),
    }
}
