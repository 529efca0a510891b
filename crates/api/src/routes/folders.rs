//! Route definitions for the `/folders` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::folders;
use crate::state::AppState;

/// Routes mounted at `/folders`.
///
/// ```text
/// GET    /                            -> visible folder tree
/// POST   /                            -> create folder
/// GET    /{id}                        -> fetch one folder (view level)
/// PATCH  /{id}                        -> rename (manage level)
/// DELETE /{id}                        -> delete subtree (delete level)
/// GET    /{id}/permissions            -> list grants (manage level)
/// PUT    /{id}/permissions            -> grant/replace (manage level)
/// DELETE /{id}/permissions/{user_id}  -> revoke (manage level)
/// GET    /{id}/templates              -> templates in folder (view level)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(folders::list_tree).post(folders::create))
        .route(
            "/{id}",
            get(folders::get)
                .patch(folders::rename)
                .delete(folders::delete),
        )
        .route(
            "/{id}/permissions",
            get(folders::list_permissions).put(folders::grant_permission),
        )
        .route(
            "/{id}/permissions/{user_id}",
            delete(folders::revoke_permission),
        )
        .route("/{id}/templates", get(folders::list_templates))
}
