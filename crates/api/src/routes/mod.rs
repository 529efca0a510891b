pub mod admin;
pub mod auth;
pub mod folders;
pub mod generation;
pub mod health;
pub mod settings;
pub mod templates;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                         register (public; first user is admin)
/// /auth/login                            login (public)
/// /auth/refresh                          refresh (public)
/// /auth/logout                           logout (requires auth)
/// /auth/me                               current user (requires auth)
///
/// /admin/users                           list users (admin only)
/// /admin/users/{id}                      fetch, update flags (admin only)
/// /admin/logs                            query the action log (admin only)
///
/// /folders                               tree (visible part), create
/// /folders/{id}                          fetch, rename (PATCH), delete (DELETE)
/// /folders/{id}/permissions              list, grant (PUT)
/// /folders/{id}/permissions/{user_id}    revoke (DELETE)
/// /folders/{id}/templates                list templates in folder
///
/// /templates                             list all (admin only), upload (multipart)
/// /templates/{id}                        metadata, delete
/// /templates/{id}/download               original DOCX
/// /templates/{id}/fields                 placeholders with descriptions
/// /templates/{id}/placeholders           stored descriptions, set description (PUT)
/// /templates/{id}/placeholders/{name}    remove description (DELETE)
/// /templates/{id}/generate               fill with explicit values (POST)
///
/// /generation/analyze                    summarize uploaded XLSX (multipart)
/// /generation/column-values              distinct values of a column (multipart)
/// /generation/validate-mapping           check mapping vs template (multipart)
/// /generation/generate                   batch run, returns ZIP (multipart)
///
/// /settings                              list active (admin only)
/// /settings/{key}                        fetch, upsert (PUT, admin), deactivate (DELETE, admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (register, login, refresh, logout, me).
        .nest("/auth", auth::router())
        // Admin routes (user management + action log).
        .nest("/admin", admin::router())
        // Folder tree and per-folder permissions.
        .nest("/folders", folders::router())
        // Template upload, download, and placeholder metadata.
        .nest("/templates", templates::router())
        // Batch generation from Excel workbooks.
        .nest("/generation", generation::router())
        // Application settings.
        .nest("/settings", settings::router())
}
