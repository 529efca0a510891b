//! Handlers for `/admin` endpoints: user management and the action log.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use contracts_core::audit::{actions, targets};
use contracts_core::error::CoreError;
use contracts_core::types::DbId;
use contracts_db::models::action_log::{ActionLog, ActionLogQuery};
use contracts_db::models::user::{UpdateUser, User, UserResponse};
use contracts_db::repositories::{ActionLogRepo, SessionRepo, UserRepo};

use crate::access::record_action;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Verify that a user exists, returning the full row.
async fn ensure_user_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "User", id }))
}

// ---------------------------------------------------------------------------
// GET /admin/users
// ---------------------------------------------------------------------------

/// List every account, newest first.
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;
    let data = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// GET /admin/users/{id}
// ---------------------------------------------------------------------------

/// Fetch one account.
pub async fn get_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = ensure_user_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: user.into() }))
}

// ---------------------------------------------------------------------------
// PATCH /admin/users/{id}
// ---------------------------------------------------------------------------

/// Update a user's email, admin flag, or active flag.
///
/// Deactivating an account also revokes every live session so the user is
/// logged out everywhere at once.
pub async fn update_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let before = ensure_user_exists(&state.pool, id).await?;

    // An admin demoting or deactivating themselves is almost always a
    // mistake; require another admin to do it.
    if id == admin.user_id && (input.is_admin == Some(false) || input.is_active == Some(false)) {
        return Err(AppError::Core(CoreError::Validation(
            "Administrators cannot demote or deactivate their own account".into(),
        )));
    }

    let updated = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    if before.is_active && !updated.is_active {
        SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    }

    let action = if !before.is_active && updated.is_active {
        Some(actions::USER_ACTIVATE)
    } else if before.is_active && !updated.is_active {
        Some(actions::USER_DEACTIVATE)
    } else if before.is_admin != updated.is_admin {
        Some(actions::USER_PROMOTE)
    } else {
        None
    };
    if let Some(action) = action {
        record_action(
            &state.pool,
            Some(admin.user_id),
            &admin.username,
            action,
            Some(targets::USER),
            Some(id),
            Some(json!({ "username": updated.username })),
        )
        .await;
    }

    Ok(Json(DataResponse {
        data: updated.into(),
    }))
}

// ---------------------------------------------------------------------------
// GET /admin/logs
// ---------------------------------------------------------------------------

/// Paginated action log page.
#[derive(Debug, Serialize)]
pub struct LogPage {
    pub entries: Vec<ActionLog>,
    pub total: i64,
}

/// Query the action log with optional filters and pagination.
pub async fn query_logs(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ActionLogQuery>,
) -> AppResult<Json<DataResponse<LogPage>>> {
    let entries = ActionLogRepo::query(&state.pool, &params).await?;
    let total = ActionLogRepo::count(&state.pool, &params).await?;
    Ok(Json(DataResponse {
        data: LogPage { entries, total },
    }))
}
