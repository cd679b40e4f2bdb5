//! Web API Collection Tests
//!
//! Integration tests for listing, previewing, streaming and downloading
//! files from the caller's own collection.

mod common;

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use serde_json::Value;

use common::{bearer, create_test_app, create_test_app_with_catalog, error_code, VIDEO_SIZE};
use sharebox::Catalog;

// ============================================================================
// Listing Tests
// ============================================================================

#[tokio::test]
async fn test_list_own_files() {
    let app = create_test_app().await;
    let token = app.login("alice", "pw2").await;

    let response = bearer(app.server.get("/api/files"), &token).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["username"], "alice");

    let files = body["data"]["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "video.mp4");
    assert_eq!(files[0]["relative_path"], "a/b/video.mp4");
    assert_eq!(files[0]["extension"], "mp4");
    assert_eq!(files[0]["category"], "video");
    assert_eq!(files[0]["size_bytes"], VIDEO_SIZE as u64);
    assert_eq!(files[0]["size_display"], "4.9 KB");
}

#[tokio::test]
async fn test_list_sorted_and_classified() {
    let app = create_test_app().await;
    app.write_file("alice", "z.txt", b"notes");
    app.write_file("alice", "Photos/Cat.JPG", b"jpeg");
    app.write_file("alice", "music/song.ogg", b"ogg");
    let token = app.login("alice", "pw2").await;

    let response = bearer(app.server.get("/api/files"), &token).await;

    let body: Value = response.json();
    let files = body["data"]["files"].as_array().unwrap();
    let paths: Vec<&str> = files
        .iter()
        .map(|f| f["relative_path"].as_str().unwrap())
        .collect();
    assert_eq!(
        paths,
        vec!["Photos/Cat.JPG", "a/b/video.mp4", "music/song.ogg", "z.txt"]
    );

    let categories: Vec<&str> = files
        .iter()
        .map(|f| f["category"].as_str().unwrap())
        .collect();
    assert_eq!(categories, vec!["image", "video", "audio", "other"]);
}

#[tokio::test]
async fn test_list_empty_when_directory_missing() {
    let app = create_test_app().await;
    app.create_regular("bob", "pw3", "bob").await;
    let token = app.login("bob", "pw3").await;

    let response = bearer(app.server.get("/api/files"), &token).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["files"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_list_requires_session() {
    let app = create_test_app().await;

    let response = app.server.get("/api/files").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_has_no_own_collection() {
    let app = create_test_app().await;
    let token = app.login("root", "pw1").await;

    let response = bearer(app.server.get("/api/files"), &token).await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(error_code(&response), "FORBIDDEN");
}

// ============================================================================
// View / Stream / Download Tests
// ============================================================================

#[tokio::test]
async fn test_view_file() {
    let app = create_test_app().await;
    let token = app.login("alice", "pw2").await;

    let response = bearer(app.server.get("/api/view/a/b/video.mp4"), &token).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["name"], "video.mp4");
    assert_eq!(body["data"]["category"], "video");
    assert_eq!(body["data"]["previewable"], true);
    assert_eq!(body["data"]["stream_url"], "/api/stream/a/b/video.mp4");
    assert_eq!(body["data"]["download_url"], "/api/download/a/b/video.mp4");
}

#[tokio::test]
async fn test_view_non_previewable_file() {
    let app = create_test_app().await;
    app.write_file("alice", "notes.txt", b"hello");
    let token = app.login("alice", "pw2").await;

    let response = bearer(app.server.get("/api/view/notes.txt"), &token).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["category"], "other");
    assert_eq!(body["data"]["previewable"], false);
}

#[tokio::test]
async fn test_stream_file_inline() {
    let app = create_test_app().await;
    let token = app.login("alice", "pw2").await;

    let response = bearer(app.server.get("/api/stream/a/b/video.mp4"), &token).await;

    response.assert_status_ok();
    assert_eq!(response.header(CONTENT_TYPE), "video/mp4");
    assert_eq!(
        response.header(CONTENT_DISPOSITION),
        "inline; filename=\"video.mp4\""
    );
    assert_eq!(response.as_bytes().len(), VIDEO_SIZE);
}

#[tokio::test]
async fn test_download_file_attachment() {
    let app = create_test_app().await;
    let token = app.login("alice", "pw2").await;

    let response = bearer(app.server.get("/api/download/a/b/video.mp4"), &token).await;

    response.assert_status_ok();
    assert_eq!(
        response.header(CONTENT_DISPOSITION),
        "attachment; filename=\"video.mp4\""
    );
    assert_eq!(response.as_bytes().len(), VIDEO_SIZE);
}

#[tokio::test]
async fn test_download_encoded_filename() {
    let app = create_test_app().await;
    app.write_file("alice", "my songs/track 1.mp3", b"mp3");
    let token = app.login("alice", "pw2").await;

    let response = bearer(
        app.server.get("/api/download/my%20songs/track%201.mp3"),
        &token,
    )
    .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "mp3");
}

#[tokio::test]
async fn test_download_missing_file() {
    let app = create_test_app().await;
    let token = app.login("alice", "pw2").await;

    let response = bearer(app.server.get("/api/download/a/nope.mp4"), &token).await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_directory_is_not_found() {
    let app = create_test_app().await;
    let token = app.login("alice", "pw2").await;

    let response = bearer(app.server.get("/api/download/a/b"), &token).await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Confinement Tests
// ============================================================================

#[tokio::test]
async fn test_traversal_looks_like_missing_file() {
    let app = create_test_app().await;
    std::fs::write(app.storage_path().join("secret.txt"), b"secret").unwrap();
    app.create_regular("bob", "pw3", "bob").await;
    app.write_file("bob", "private.mp3", b"bob's");
    let token = app.login("alice", "pw2").await;

    let traversal = bearer(
        app.server.get("/api/download/..%2Fbob%2Fprivate.mp3"),
        &token,
    )
    .await;
    let outside = bearer(app.server.get("/api/download/..%2Fsecret.txt"), &token).await;
    let missing = bearer(app.server.get("/api/download/a/nope.mp4"), &token).await;

    assert_eq!(traversal.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(outside.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(traversal.text(), missing.text());
    assert_eq!(outside.text(), missing.text());
}

#[tokio::test]
async fn test_traversal_rejected_whether_or_not_target_exists() {
    let app = create_test_app().await;
    let token = app.login("alice", "pw2").await;
    let path = "/api/stream/..%2Froot%2Fsecret.txt";

    let before = bearer(app.server.get(path), &token).await;
    app.write_file("root", "secret.txt", b"secret");
    let after = bearer(app.server.get(path), &token).await;

    assert_eq!(before.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(after.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(before.text(), after.text());
}

#[tokio::test]
async fn test_traversal_on_view_and_stream() {
    let app = create_test_app().await;
    std::fs::write(app.storage_path().join("secret.txt"), b"secret").unwrap();
    let token = app.login("alice", "pw2").await;

    for path in [
        "/api/view/..%2Fsecret.txt",
        "/api/stream/..%2Fsecret.txt",
        "/api/stream/a/..%2F..%2Fsecret.txt",
        "/api/stream/a%5C..%5C..%5Csecret.txt",
    ] {
        let response = bearer(app.server.get(path), &token).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn test_dot_segments_inside_root_are_allowed() {
    let app = create_test_app().await;
    let token = app.login("alice", "pw2").await;

    let response = bearer(
        app.server.get("/api/stream/a%2Fx%2F..%2Fb%2Fvideo.mp4"),
        &token,
    )
    .await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().len(), VIDEO_SIZE);
}

// ============================================================================
// Remote Catalog Tests
// ============================================================================

#[tokio::test]
async fn test_remote_files_empty_without_catalog() {
    let app = create_test_app().await;
    let token = app.login("alice", "pw2").await;

    let response = bearer(app.server.get("/api/remote"), &token).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["files"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_remote_files_from_catalog() {
    let catalog = Catalog::parse(
        r#"{
            "alice": [
                { "name": "song.mp3", "id": "2", "size": 2048, "link": "https://drive/2" },
                { "name": "clip.mp4", "id": "1", "size": "12.0 MB", "link": "https://drive/1",
                  "preview_link": "https://drive/1/preview" }
            ],
            "bob": [
                { "name": "private.pdf", "id": "3", "size": 10, "link": "https://drive/3" }
            ]
        }"#,
    )
    .unwrap();
    let app = create_test_app_with_catalog(catalog).await;
    let token = app.login("alice", "pw2").await;

    let response = bearer(app.server.get("/api/remote"), &token).await;

    response.assert_status_ok();
    let body: Value = response.json();
    let files = body["data"]["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["name"], "clip.mp4");
    assert_eq!(files[0]["category"], "video");
    assert_eq!(files[0]["size_display"], "12.0 MB");
    assert_eq!(files[0]["preview_url"], "https://drive/1/preview");
    assert_eq!(files[1]["name"], "song.mp3");
    assert_eq!(files[1]["size_display"], "2.0 KB");
    assert_eq!(files[1]["preview_url"], "https://drive/2");
    assert!(!response.text().contains("private.pdf"));
}

#[tokio::test]
async fn test_remote_files_match_username_exactly() {
    let catalog = Catalog::parse(
        r#"{
            "alice": [
                { "name": "private.pdf", "id": "3", "size": 10, "link": "https://drive/3" }
            ]
        }"#,
    )
    .unwrap();
    let app = create_test_app_with_catalog(catalog).await;
    app.create_regular("ALICE", "pw9", "ALICE_dir").await;
    let token = app.login("ALICE", "pw9").await;

    let response = bearer(app.server.get("/api/remote"), &token).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["username"], "ALICE");
    assert_eq!(body["data"]["files"].as_array().unwrap().len(), 0);
    assert!(!response.text().contains("private.pdf"));
}
