//! Session token middleware.
//!
//! A session travels as a signed JWT, either in the session cookie or in an
//! `Authorization: Bearer` header.

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, SET_COOKIE},
        request::Parts,
        HeaderValue, Request, StatusCode,
    },
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::Session;
use crate::config::SessionConfig;
use crate::web::error::ApiError;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (account ID).
    pub sub: i64,
    /// Admin flag at login time.
    pub admin: bool,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
    /// JWT ID. Names the server-side session record.
    pub jti: String,
}

/// Signing and transport settings for session tokens.
#[derive(Clone)]
pub struct JwtState {
    /// Encoding key for JWT signing.
    pub encoding_key: EncodingKey,
    /// Decoding key for JWT verification.
    pub decoding_key: DecodingKey,
    /// Validation settings.
    pub validation: Validation,
    /// Token lifetime in seconds.
    pub expiry_secs: u64,
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Mark the cookie `Secure`.
    pub secure_cookie: bool,
}

impl JwtState {
    /// Create a new JWT state from a secret key.
    pub fn new(secret: &str, expiry_secs: u64) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry_secs,
            cookie_name: "sharebox_session".to_string(),
            secure_cookie: false,
        }
    }

    /// Create a JWT state from the session configuration.
    pub fn from_config(config: &SessionConfig) -> Self {
        let mut state = Self::new(&config.secret, config.expiry_secs);
        state.cookie_name = config.cookie_name.clone();
        state.secure_cookie = config.secure_cookie;
        state
    }

    /// Sign a token for a session.
    pub fn issue(&self, session: &Session) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = SessionClaims {
            sub: session.account_id,
            admin: session.is_admin,
            iat: now,
            exp: now + self.expiry_secs,
            jti: session.id.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to create session")
        })
    }

    /// Verify a token and return the session it carries.
    ///
    /// Only the signature and expiry are checked here. Whether the session
    /// is still live is up to the access controller.
    pub fn verify(&self, token: &str) -> Option<Session> {
        match decode::<SessionClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(Session {
                id: data.claims.jti,
                account_id: data.claims.sub,
                is_admin: data.claims.admin,
            }),
            Err(e) => {
                tracing::debug!("JWT validation failed: {}", e);
                None
            }
        }
    }

    /// Cookie carrying a freshly issued token.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .build()
    }

    /// Cookie that clears the session cookie in the browser.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.cookie_name.clone(), ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        cookie.make_removal();
        cookie
    }

    fn token_from_parts(&self, parts: &Parts) -> Option<String> {
        let bearer = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string());

        bearer.or_else(|| {
            CookieJar::from_headers(&parts.headers)
                .get(&self.cookie_name)
                .map(|c| c.value().to_string())
        })
    }
}

/// Extractor for the request's session.
///
/// Never rejects: a missing, malformed or expired token yields `None`, and
/// the access controller decides what that means.
#[derive(Debug, Clone)]
pub struct SessionToken(pub Option<Session>);

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            // Get JWT state from extensions (set by middleware)
            let jwt_state = parts
                .extensions
                .get::<Arc<JwtState>>()
                .ok_or_else(|| ApiError::internal("JWT state not configured"))?;

            let session = jwt_state
                .token_from_parts(parts)
                .and_then(|token| jwt_state.verify(&token));

            Ok(SessionToken(session))
        })
    }
}

/// Middleware function to inject JWT state into request extensions.
///
/// When a request carrying a session cookie ends in 401, the cookie is
/// cleared so the browser stops presenting a dead session.
pub async fn jwt_auth(
    jwt_state: Arc<JwtState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let had_cookie = CookieJar::from_headers(request.headers())
        .get(&jwt_state.cookie_name)
        .is_some();
    let removal = jwt_state.removal_cookie().to_string();

    request.extensions_mut().insert(jwt_state);
    let mut response = next.run(request).await;

    if had_cookie && response.status() == StatusCode::UNAUTHORIZED {
        if let Ok(value) = HeaderValue::from_str(&removal) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    response
}
