//! Route definitions for the `/templates` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::templates;
use crate::state::AppState;

/// Routes mounted at `/templates`.
///
/// ```text
/// GET    /                            -> list all templates (admin only)
/// POST   /                            -> upload (multipart, upload level)
/// GET    /{id}                        -> metadata (view level)
/// DELETE /{id}                        -> delete (delete level or own upload)
/// GET    /{id}/download               -> original DOCX (view level)
/// GET    /{id}/fields                 -> placeholders + descriptions (view level)
/// GET    /{id}/placeholders           -> stored descriptions (view level)
/// PUT    /{id}/placeholders           -> set description (upload level)
/// DELETE /{id}/placeholders/{name}    -> remove description (upload level)
/// POST   /{id}/generate               -> fill with explicit values (view level)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(templates::list_all).post(templates::upload))
        .route("/{id}", get(templates::get).delete(templates::delete))
        .route("/{id}/download", get(templates::download))
        .route("/{id}/fields", get(templates::fields))
        .route(
            "/{id}/placeholders",
            get(templates::list_placeholders).put(templates::upsert_placeholder),
        )
        .route(
            "/{id}/placeholders/{name}",
            delete(templates::delete_placeholder),
        )
        .route("/{id}/generate", post(templates::generate_one))
}
