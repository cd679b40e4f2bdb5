//! Test helpers for Web API tests.
//!
//! Builds a router over an in-memory database and a temporary collection
//! root seeded with one admin and one regular account.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderValue;
use axum_test::{TestRequest, TestResponse, TestServer};
use serde_json::{json, Value};
use tempfile::TempDir;

use sharebox::web::create_router;
use sharebox::{
    Account, AccountRepository, AppState, Catalog, CollectionStorage, Database, JwtState,
    NewAccount,
};

/// Secret used to sign test session tokens.
pub const TEST_SECRET: &str = "test-secret-key-for-testing-only";

/// Name of the session cookie.
pub const COOKIE_NAME: &str = "sharebox_session";

/// Size of the seeded video file.
pub const VIDEO_SIZE: usize = 5000;

/// A running test application.
pub struct TestApp {
    /// The test server.
    pub server: TestServer,
    /// The database behind the server.
    pub db: Database,
    /// Collection root. Dropped with the app.
    pub storage_dir: TempDir,
    /// Seeded admin account (`root` / `pw1`).
    pub root: Account,
    /// Seeded regular account (`alice` / `pw2`, directory `alice`).
    pub alice: Account,
}

impl TestApp {
    /// Collection root of the app.
    pub fn storage_path(&self) -> &Path {
        self.storage_dir.path()
    }

    /// Log in and return the session token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .server
            .post("/api/auth/login")
            .json(&json!({ "username": username, "password": password }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        body["data"]["token"]
            .as_str()
            .expect("login response carries a token")
            .to_string()
    }

    /// Create a regular account directly in the database.
    pub async fn create_regular(&self, username: &str, password: &str, directory: &str) -> Account {
        AccountRepository::new(self.db.pool())
            .create(&NewAccount::new(username, password, directory))
            .await
            .unwrap()
    }

    /// Write a file into a collection.
    pub fn write_file(&self, directory: &str, relative: &str, contents: &[u8]) {
        let path = self.storage_path().join(directory).join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }
}

/// Create a test app with `root` (admin) and `alice` (regular) seeded.
///
/// Alice's collection contains `a/b/video.mp4` of `VIDEO_SIZE` bytes.
pub async fn create_test_app() -> TestApp {
    create_test_app_with_catalog(Catalog::default()).await
}

/// Same as [`create_test_app`], with a remote catalog attached.
pub async fn create_test_app_with_catalog(catalog: Catalog) -> TestApp {
    let storage_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let storage = CollectionStorage::new(storage_dir.path()).expect("Failed to create storage");

    let repo = AccountRepository::new(db.pool());
    let root = repo
        .create(&NewAccount::admin("root", "pw1"))
        .await
        .expect("Failed to create admin");
    let alice = repo
        .create(&NewAccount::new("alice", "pw2", "alice").with_display_name("Alice"))
        .await
        .expect("Failed to create alice");

    storage.ensure_collection("alice").unwrap();

    let jwt = Arc::new(JwtState::new(TEST_SECRET, 600));
    let state = Arc::new(AppState::new(db.clone(), storage, jwt).with_catalog(catalog));
    let router = create_router(state, &[]);
    let server = TestServer::new(router).expect("Failed to create test server");

    let app = TestApp {
        server,
        db,
        storage_dir,
        root,
        alice,
    };
    app.write_file("alice", "a/b/video.mp4", &vec![7u8; VIDEO_SIZE]);
    app
}

/// Authenticate a request with a bearer token.
pub fn bearer(request: TestRequest, token: &str) -> TestRequest {
    request.add_header(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    )
}

/// Authenticate a request with the session cookie.
pub fn with_cookie(request: TestRequest, token: &str) -> TestRequest {
    request.add_header(
        COOKIE,
        HeaderValue::from_str(&format!("{COOKIE_NAME}={token}")).unwrap(),
    )
}

/// Error code of an error response.
pub fn error_code(response: &TestResponse) -> String {
    let body: Value = response.json();
    body["error"]["code"].as_str().unwrap_or_default().to_string()
}
