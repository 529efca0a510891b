//! Role-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests that do not meet
//! the minimum requirement. Use these in route handlers to enforce
//! authorization at the type level. Per-folder permission checks live in
//! [`crate::access`]; these extractors only gate the admin flag.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use contracts_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires an administrator account. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     // user is guaranteed to be an admin here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(AppError::Core(CoreError::Forbidden(
                "Administrator access required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}
