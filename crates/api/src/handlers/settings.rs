//! Handlers for application settings. Single-key reads are open to any
//! authenticated user; the full listing and all writes are admin only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use contracts_core::audit::{actions, targets};
use contracts_core::error::CoreError;
use contracts_db::models::setting::{Setting, UpsertSetting};
use contracts_db::repositories::SettingRepo;

use crate::access::record_action;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /settings -- all active settings (admin only).
pub async fn list_active(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Setting>>>> {
    let settings = SettingRepo::list_active(&state.pool).await?;
    Ok(Json(DataResponse { data: settings }))
}

/// GET /settings/{key} -- one active setting.
pub async fn get(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<DataResponse<Setting>>> {
    let setting = SettingRepo::find_active(&state.pool, &key)
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;
    Ok(Json(DataResponse { data: setting }))
}

/// PUT /settings/{key} -- create or replace a setting (admin only).
/// Upserting a deactivated key brings it back.
pub async fn upsert(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(input): Json<UpsertSetting>,
) -> AppResult<Json<DataResponse<Setting>>> {
    let key = key.trim();
    if key.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Setting key must not be empty".into(),
        )));
    }

    let setting = SettingRepo::upsert(
        &state.pool,
        key,
        &input.value,
        input.description.as_deref(),
        admin.user_id,
    )
    .await?;

    record_action(
        &state.pool,
        Some(admin.user_id),
        &admin.username,
        actions::SETTING_CHANGE,
        Some(targets::SETTING),
        Some(setting.id),
        Some(json!({ "key": setting.key })),
    )
    .await;

    Ok(Json(DataResponse { data: setting }))
}

/// DELETE /settings/{key} -- deactivate a setting (admin only). The row is
/// kept for history; only `is_active` flips.
pub async fn deactivate(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<StatusCode> {
    let deactivated = SettingRepo::deactivate(&state.pool, &key, admin.user_id).await?;
    if !deactivated {
        return Err(AppError::Database(sqlx::Error::RowNotFound));
    }

    record_action(
        &state.pool,
        Some(admin.user_id),
        &admin.username,
        actions::SETTING_CHANGE,
        Some(targets::SETTING),
        None,
        Some(json!({ "key": key, "deactivated": true })),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
