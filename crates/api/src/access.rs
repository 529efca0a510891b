//! Per-folder permission checks and action logging helpers.
//!
//! Administrators bypass permission rows entirely. For everyone else, a
//! grant on a folder covers its whole subtree; when several ancestors carry
//! grants, the strongest one wins.

use sqlx::PgPool;

use contracts_core::error::CoreError;
use contracts_core::permissions::PermissionLevel;
use contracts_core::types::DbId;
use contracts_db::models::action_log::CreateActionLog;
use contracts_db::models::folder::Folder;
use contracts_db::repositories::{ActionLogRepo, FolderRepo, PermissionRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// Load a folder or fail with 404.
pub async fn ensure_folder_exists(pool: &PgPool, id: DbId) -> AppResult<Folder> {
    FolderRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Folder", id }))
}

/// The strongest permission level `user` holds on `folder_id`, considering
/// grants on the folder itself and on every ancestor. `None` means the
/// folder is invisible to the user.
pub async fn effective_level(
    pool: &PgPool,
    user: &AuthUser,
    folder_id: DbId,
) -> AppResult<Option<PermissionLevel>> {
    if user.is_admin {
        return Ok(Some(PermissionLevel::Manage));
    }

    let chain = FolderRepo::ancestor_ids(pool, folder_id).await?;
    let mut strongest: Option<PermissionLevel> = None;
    for id in chain {
        if let Some(grant) = PermissionRepo::find(pool, user.user_id, id).await? {
            if let Some(level) = PermissionLevel::parse(&grant.level) {
                strongest = Some(strongest.map_or(level, |s| s.max(level)));
            }
        }
    }
    Ok(strongest)
}

/// Reject with 403 unless `user` holds at least `required` on the folder.
/// The folder must exist; a missing folder is a 404.
pub async fn require_folder_access(
    pool: &PgPool,
    user: &AuthUser,
    folder_id: DbId,
    required: PermissionLevel,
) -> AppResult<()> {
    ensure_folder_exists(pool, folder_id).await?;

    match effective_level(pool, user, folder_id).await? {
        Some(level) if level.allows(required) => Ok(()),
        _ => Err(AppError::Core(CoreError::Forbidden(format!(
            "{required} access to this folder required"
        )))),
    }
}

/// Write an action log entry. Failures are logged and swallowed so audit
/// trouble never fails the user-facing operation.
pub async fn record_action(
    pool: &PgPool,
    user_id: Option<DbId>,
    username: &str,
    action: &str,
    target_type: Option<&str>,
    target_id: Option<DbId>,
    details: Option<serde_json::Value>,
) {
    let entry = CreateActionLog {
        user_id,
        username: username.to_string(),
        action: action.to_string(),
        target_type: target_type.map(str::to_string),
        target_id,
        details,
        ip_address: None,
    };
    if let Err(err) = ActionLogRepo::create(pool, &entry).await {
        tracing::error!(error = %err, action, "Failed to write action log entry");
    }
}
