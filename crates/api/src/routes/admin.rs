//! Route definitions for the `/admin` resource (admin only).

use axum::routing::get;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET   /users      -> list users
/// GET   /users/{id} -> fetch one user
/// PATCH /users/{id} -> update email/admin/active flags
/// GET   /logs       -> query the action log
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route(
            "/users/{id}",
            get(admin::get_user).patch(admin::update_user),
        )
        .route("/logs", get(admin::query_logs))
}
