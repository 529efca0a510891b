//! HTTP-level integration tests for template upload, placeholder metadata,
//! and document generation.
//!
//! Each test builds the app once and clones the router per request so every
//! call shares the same storage directory.

mod common;

use std::io::{Cursor, Read, Write};

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use common::{body_bytes, body_json, delete_auth, get_auth, post_json, post_json_auth, put_json_auth};
use sqlx::PgPool;
use tower::ServiceExt;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

/// Create an activated user directly in the database, log in via the API,
/// and return (id, access token).
async fn create_and_login(
    pool: &PgPool,
    app: &Router,
    username: &str,
    is_admin: bool,
) -> (i64, String) {
    let user = common::create_user(pool, username, is_admin).await;
    let body = serde_json::json!({ "username": username, "password": common::TEST_PASSWORD });
    let response = post_json(app.clone(), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    (user.id, json["access_token"].as_str().unwrap().to_string())
}

/// Create a root folder and return its id.
async fn create_folder(app: &Router, token: &str, name: &str) -> i64 {
    let body = serde_json::json!({ "name": name, "parent_id": null });
    let response = post_json_auth(app.clone(), "/api/v1/folders", token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_i64().unwrap()
}

/// Build a minimal DOCX archive whose document body holds the given
/// `<w:t>` runs.
fn build_docx(body_runs: &str) -> Vec<u8> {
    let document = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><w:document><w:body><w:p><w:r>{body_runs}</w:r></w:p></w:body></w:document>"
    );
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(document.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

/// Read `word/document.xml` back out of generated DOCX bytes.
fn document_xml(docx: &[u8]) -> String {
    let mut archive = ZipArchive::new(Cursor::new(docx)).unwrap();
    let mut file = archive.by_name("word/document.xml").unwrap();
    let mut xml = String::new();
    file.read_to_string(&mut xml).unwrap();
    xml
}

/// POST a multipart template upload.
async fn upload(
    app: &Router,
    token: &str,
    folder_id: i64,
    filename: &str,
    data: &[u8],
) -> Response<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"folder_id\"\r\n\r\n{folder_id}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/templates")
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Upload a template and return its id.
async fn upload_ok(app: &Router, token: &str, folder_id: i64, filename: &str, data: &[u8]) -> i64 {
    let response = upload(app, token, folder_id, filename, data).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

/// A valid upload stores the template and reports its metadata.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_upload_template(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let (_id, token) = create_and_login(&pool, &app, "admin", true).await;
    let folder = create_folder(&app, &token, "Contracts").await;
    let docx = build_docx("<w:t>Hello {{name}}</w:t>");

    let response = upload(&app, &token, folder, "Act of acceptance.docx", &docx).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Act of acceptance");
    assert_eq!(json["data"]["original_filename"], "Act of acceptance.docx");
    assert_eq!(json["data"]["size_bytes"], docx.len() as i64);

    // The template shows up in the folder listing.
    let response =
        get_auth(app.clone(), &format!("/api/v1/folders/{folder}/templates"), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

/// Non-DOCX filenames are rejected.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_upload_rejects_non_docx(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let (_id, token) = create_and_login(&pool, &app, "admin", true).await;
    let folder = create_folder(&app, &token, "Contracts").await;

    let response = upload(&app, &token, folder, "notes.txt", b"plain text").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Corrupt archives are rejected before anything is stored.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_upload_rejects_corrupt_archive(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let (_id, token) = create_and_login(&pool, &app, "admin", true).await;
    let folder = create_folder(&app, &token, "Contracts").await;

    let response = upload(&app, &token, folder, "broken.docx", b"not a zip at all").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Uploading requires the `upload` level on the folder.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_upload_requires_permission(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let (_admin_id, admin_token) = create_and_login(&pool, &app, "admin", true).await;
    let (user_id, user_token) = create_and_login(&pool, &app, "uploader", false).await;
    let folder = create_folder(&app, &admin_token, "Contracts").await;
    let docx = build_docx("<w:t>{{x}}</w:t>");

    let response = upload(&app, &user_token, folder, "act.docx", &docx).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A `view` grant is still not enough.
    let body = serde_json::json!({ "user_id": user_id, "level": "view" });
    put_json_auth(
        app.clone(),
        &format!("/api/v1/folders/{folder}/permissions"),
        &admin_token,
        body,
    )
    .await;
    let response = upload(&app, &user_token, folder, "act.docx", &docx).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = serde_json::json!({ "user_id": user_id, "level": "upload" });
    put_json_auth(
        app.clone(),
        &format!("/api/v1/folders/{folder}/permissions"),
        &admin_token,
        body,
    )
    .await;
    let response = upload(&app, &user_token, folder, "act.docx", &docx).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

/// Duplicate template names within one folder are rejected with 409.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_upload_duplicate_name(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let (_id, token) = create_and_login(&pool, &app, "admin", true).await;
    let folder = create_folder(&app, &token, "Contracts").await;
    let docx = build_docx("<w:t>{{x}}</w:t>");

    upload_ok(&app, &token, folder, "act.docx", &docx).await;
    let response = upload(&app, &token, folder, "act.docx", &docx).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Fields and descriptions
// ---------------------------------------------------------------------------

/// The fields endpoint lists placeholders in order of first appearance,
/// with descriptions once they are set.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_fields_and_descriptions(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let (_id, token) = create_and_login(&pool, &app, "admin", true).await;
    let folder = create_folder(&app, &token, "Contracts").await;
    let docx = build_docx("<w:t>{{customer}} owes {{amount}} as of {{date}}</w:t>");
    let template = upload_ok(&app, &token, folder, "act.docx", &docx).await;

    let response =
        get_auth(app.clone(), &format!("/api/v1/templates/{template}/fields"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let fields = json["data"].as_array().unwrap();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0]["placeholder"], "customer");
    assert_eq!(fields[1]["placeholder"], "amount");
    assert!(fields[1]["description"].is_null());

    let body = serde_json::json!({ "placeholder": "amount", "description": "Contract sum, BYN" });
    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/templates/{template}/placeholders"),
        &token,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response =
        get_auth(app.clone(), &format!("/api/v1/templates/{template}/fields"), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][1]["description"], "Contract sum, BYN");
}

/// Describing a placeholder the template does not contain is a 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_describe_unknown_placeholder(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let (_id, token) = create_and_login(&pool, &app, "admin", true).await;
    let folder = create_folder(&app, &token, "Contracts").await;
    let docx = build_docx("<w:t>{{customer}}</w:t>");
    let template = upload_ok(&app, &token, folder, "act.docx", &docx).await;

    let body = serde_json::json!({ "placeholder": "ghost", "description": "nope" });
    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/templates/{template}/placeholders"),
        &token,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Download, generation, deletion
// ---------------------------------------------------------------------------

/// Download returns the stored bytes unchanged, with an attachment header.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_download_roundtrip(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let (_id, token) = create_and_login(&pool, &app, "admin", true).await;
    let folder = create_folder(&app, &token, "Contracts").await;
    let docx = build_docx("<w:t>{{x}}</w:t>");
    let template = upload_ok(&app, &token, folder, "act.docx", &docx).await;

    let response =
        get_auth(app.clone(), &format!("/api/v1/templates/{template}/download"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("attachment"));
    assert!(disposition.contains("act.docx"));
    assert_eq!(body_bytes(response).await, docx);
}

/// Single-document generation substitutes the provided values.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_generate_single_document(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let (_id, token) = create_and_login(&pool, &app, "admin", true).await;
    let folder = create_folder(&app, &token, "Contracts").await;
    let docx = build_docx("<w:t>Dear {{customer}}, sum: {{amount}}</w:t>");
    let template = upload_ok(&app, &token, folder, "act.docx", &docx).await;

    let body = serde_json::json!({
        "values": { "customer": "ООО «Ромашка»", "amount": "1200,50" },
        "output_format": "docx",
    });
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/templates/{template}/generate"),
        &token,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let generated = body_bytes(response).await;

    let xml = document_xml(&generated);
    assert!(xml.contains("Dear ООО «Ромашка», sum: 1200,50"));
    assert!(!xml.contains("{{customer}}"));
}

/// Deleting a template removes the row; later fetches are 404.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_template(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let (_id, token) = create_and_login(&pool, &app, "admin", true).await;
    let folder = create_folder(&app, &token, "Contracts").await;
    let docx = build_docx("<w:t>{{x}}</w:t>");
    let template = upload_ok(&app, &token, folder, "act.docx", &docx).await;

    let response = delete_auth(app.clone(), &format!("/api/v1/templates/{template}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app.clone(), &format!("/api/v1/templates/{template}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
