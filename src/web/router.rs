//! Router configuration for Web API.

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    account_files, create_account, delete_account, delete_account_file, download_file,
    list_accounts, list_files, login, logout, me, remote_files, reset_password,
    stream_account_file, stream_own_file, view_account_file, view_file, AppState,
};
use super::middleware::{create_cors_layer, jwt_auth};

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    // Auth routes
    let auth_routes = Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me));

    // Own collection routes
    let file_routes = Router::new()
        .route("/files", get(list_files))
        .route("/view/*path", get(view_file))
        .route("/stream/*path", get(stream_own_file))
        .route("/download/*path", get(download_file))
        .route("/remote", get(remote_files));

    // Admin routes
    let admin_routes = Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/:id", delete(delete_account))
        .route("/accounts/:id/password", put(reset_password))
        .route("/accounts/:id/files", get(account_files))
        .route("/accounts/:id/files/*path", delete(delete_account_file))
        .route("/accounts/:id/view/*path", get(view_account_file))
        .route("/accounts/:id/stream/*path", get(stream_account_file));

    // API routes
    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(file_routes)
        .nest("/admin", admin_routes);

    // Clone jwt state for the middleware closure
    let jwt_state = app_state.jwt.clone();

    // Build the main router with middleware
    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::CollectionStorage;
    use crate::web::middleware::JwtState;
    use crate::Database;

    #[test]
    fn test_create_health_router() {
        let _router = create_health_router();
        // Should not panic
    }

    #[tokio::test]
    async fn test_create_router() {
        let temp = tempfile::tempdir().unwrap();
        let db = Database::open_in_memory().await.unwrap();
        let storage = CollectionStorage::new(temp.path()).unwrap();
        let jwt = Arc::new(JwtState::new("test-secret", 600));
        let state = Arc::new(AppState::new(db, storage, jwt));

        let _router = create_router(state, &[]);
    }
}
