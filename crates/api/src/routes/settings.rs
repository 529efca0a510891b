//! Route definitions for the `/settings` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::settings;
use crate::state::AppState;

/// Routes mounted at `/settings`.
///
/// ```text
/// GET    /       -> active settings (admin only)
/// GET    /{key}  -> one active setting (any authenticated user)
/// PUT    /{key}  -> create or replace (admin only)
/// DELETE /{key}  -> deactivate (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(settings::list_active)).route(
        "/{key}",
        get(settings::get)
            .put(settings::upsert)
            .delete(settings::deactivate),
    )
}
