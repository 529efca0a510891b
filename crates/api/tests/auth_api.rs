//! HTTP-level integration tests for authentication and admin user
//! management: registration, login, refresh rotation, lockout, and RBAC.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, patch_json_auth, post_json};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Register a user via the API and return the created user JSON.
async fn register_user(app: axum::Router, username: &str) -> serde_json::Value {
    let body = serde_json::json!({
        "username": username,
        "email": format!("{username}@test.com"),
        "password": common::TEST_PASSWORD,
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Log in via the API and return the JSON response containing
/// `access_token`, `refresh_token`, and `user` info.
async fn login_user(app: axum::Router, username: &str, password: &str) -> serde_json::Value {
    let body = serde_json::json!({ "username": username, "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

/// Register a user and log in, returning the access token. Only works for
/// the first account in a fresh database, which is activated on creation.
async fn register_and_login(pool: &PgPool, username: &str) -> String {
    let app = common::build_test_app(pool.clone()).await;
    register_user(app, username).await;
    let app = common::build_test_app(pool.clone()).await;
    let json = login_user(app, username, common::TEST_PASSWORD).await;
    json["access_token"].as_str().unwrap().to_string()
}

/// Create an activated user directly in the database and log in,
/// returning the user row and access token.
async fn create_and_login(
    pool: &PgPool,
    username: &str,
    is_admin: bool,
) -> (contracts_db::models::user::User, String) {
    let user = common::create_user(pool, username, is_admin).await;
    let app = common::build_test_app(pool.clone()).await;
    let json = login_user(app, username, common::TEST_PASSWORD).await;
    (user, json["access_token"].as_str().unwrap().to_string())
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// The very first registered account becomes an active administrator;
/// later accounts are plain users waiting for activation.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_first_user_is_admin(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let first = register_user(app, "alice").await;
    assert_eq!(first["data"]["is_admin"], true);
    assert_eq!(first["data"]["is_active"], true);

    let app = common::build_test_app(pool).await;
    let second = register_user(app, "bob").await;
    assert_eq!(second["data"]["is_admin"], false);
    assert_eq!(second["data"]["is_active"], false);
}

/// A freshly registered (non-first) account cannot log in until an admin
/// activates it.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_registration_requires_activation(pool: PgPool) {
    let admin_token = register_and_login(&pool, "admin").await;

    let app = common::build_test_app(pool.clone()).await;
    let bob = register_user(app, "bob").await;
    let bob_id = bob["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone()).await;
    let body = serde_json::json!({ "username": "bob", "password": common::TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone()).await;
    let response = patch_json_auth(
        app,
        &format!("/api/v1/admin/users/{bob_id}"),
        &admin_token,
        serde_json::json!({ "is_active": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool).await;
    let json = login_user(app, "bob", common::TEST_PASSWORD).await;
    assert_eq!(json["user"]["username"], "bob");
}

/// Registering a duplicate username returns 409.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_duplicate_username(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    register_user(app, "alice").await;

    let app = common::build_test_app(pool).await;
    let body = serde_json::json!({
        "username": "alice",
        "email": "other@test.com",
        "password": common::TEST_PASSWORD,
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// A too-short password is rejected with 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_weak_password(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let body = serde_json::json!({
        "username": "weak",
        "email": "weak@test.com",
        "password": "short",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Successful login returns tokens and user info.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_success(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    register_user(app, "loginuser").await;

    let app = common::build_test_app(pool).await;
    let json = login_user(app, "loginuser", common::TEST_PASSWORD).await;

    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert!(json["expires_in"].is_number());
    assert_eq!(json["user"]["username"], "loginuser");
    assert_eq!(json["user"]["is_admin"], true);
}

/// Login with an incorrect password returns 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    register_user(app, "wrongpw").await;

    let app = common::build_test_app(pool).await;
    let body = serde_json::json!({ "username": "wrongpw", "password": "incorrect_password" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Login with a nonexistent username returns 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_nonexistent_user(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let body = serde_json::json!({ "username": "ghost", "password": "whatever" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Five failed attempts lock the account; further logins return 403
/// even with the correct password.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_account_lockout(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    register_user(app, "locked").await;

    for _ in 0..5 {
        let app = common::build_test_app(pool.clone()).await;
        let body = serde_json::json!({ "username": "locked", "password": "bad_password" });
        let response = post_json(app, "/api/v1/auth/login", body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let app = common::build_test_app(pool).await;
    let body = serde_json::json!({ "username": "locked", "password": common::TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Refresh and logout
// ---------------------------------------------------------------------------

/// A valid refresh token returns new tokens; the used token is rotated
/// out and cannot be replayed.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_refresh_rotation(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    register_user(app, "refresher").await;

    let app = common::build_test_app(pool.clone()).await;
    let login_json = login_user(app, "refresher", common::TEST_PASSWORD).await;
    let refresh_token = login_json["refresh_token"].as_str().unwrap();

    let app = common::build_test_app(pool.clone()).await;
    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app, "/api/v1/auth/refresh", body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let refreshed = body_json(response).await;
    assert!(refreshed["access_token"].is_string());
    assert_ne!(refreshed["refresh_token"], login_json["refresh_token"]);

    // Replaying the old token fails.
    let app = common::build_test_app(pool).await;
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Logout revokes every session of the user.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_logout_revokes_sessions(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    register_user(app, "bye").await;

    let app = common::build_test_app(pool.clone()).await;
    let login_json = login_user(app, "bye", common::TEST_PASSWORD).await;
    let access = login_json["access_token"].as_str().unwrap();
    let refresh = login_json["refresh_token"].as_str().unwrap();

    let app = common::build_test_app(pool.clone()).await;
    let response =
        common::post_json_auth(app, "/api/v1/auth/logout", access, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool).await;
    let body = serde_json::json!({ "refresh_token": refresh });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// GET /auth/me returns the caller's profile.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_me(pool: PgPool) {
    let token = register_and_login(&pool, "myself").await;

    let app = common::build_test_app(pool).await;
    let response = get_auth(app, "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "myself");
}

/// A request without a bearer token is rejected with 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_missing_token(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let response = common::get(app, "/api/v1/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Admin user management
// ---------------------------------------------------------------------------

/// Non-admins cannot list users; admins can.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_users_rbac(pool: PgPool) {
    let admin_token = register_and_login(&pool, "admin").await;
    let (_plain, user_token) = create_and_login(&pool, "plain", false).await;

    let app = common::build_test_app(pool.clone()).await;
    let response = get_auth(app, "/api/v1/admin/users", &user_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool).await;
    let response = get_auth(app, "/api/v1/admin/users", &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

/// Promoting a user flips is_admin and shows up in the action log.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_promote_user(pool: PgPool) {
    let admin_token = register_and_login(&pool, "admin").await;
    let promotee = common::create_user(&pool, "promotee", false).await;
    let promotee_id = promotee.id;

    let app = common::build_test_app(pool.clone()).await;
    let response = patch_json_auth(
        app,
        &format!("/api/v1/admin/users/{promotee_id}"),
        &admin_token,
        serde_json::json!({ "is_admin": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_admin"], true);

    let app = common::build_test_app(pool).await;
    let response = get_auth(app, "/api/v1/admin/logs?action=user_promote", &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let logs = body_json(response).await;
    assert_eq!(logs["data"]["total"], 1);
}

/// An admin cannot demote or deactivate their own account.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_cannot_demote_self(pool: PgPool) {
    let admin_token = register_and_login(&pool, "admin").await;

    let app = common::build_test_app(pool.clone()).await;
    let response = get_auth(app, "/api/v1/auth/me", &admin_token).await;
    let me = body_json(response).await;
    let admin_id = me["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool).await;
    let response = patch_json_auth(
        app,
        &format!("/api/v1/admin/users/{admin_id}"),
        &admin_token,
        serde_json::json!({ "is_admin": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
