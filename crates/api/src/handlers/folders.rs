//! Handlers for the `/folders` resource: the folder tree and its permissions.

use std::collections::HashSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use contracts_core::audit::{actions, targets};
use contracts_core::error::CoreError;
use contracts_core::permissions::PermissionLevel;
use contracts_core::types::DbId;
use contracts_db::models::folder::{CreateFolder, Folder, FolderNode};
use contracts_db::models::permission::{GrantPermission, Permission};
use contracts_db::repositories::{FolderRepo, PermissionRepo, TemplateRepo, UserRepo};

use crate::access::{record_action, require_folder_access};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /folders
// ---------------------------------------------------------------------------

/// Return the folder tree visible to the caller.
///
/// Administrators see everything. Other users see the subtrees of folders
/// they hold a grant on; a subtree whose parent is invisible is returned
/// as a root.
pub async fn list_tree(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<FolderNode>>>> {
    let folders = FolderRepo::list_all(&state.pool).await?;

    let visible: HashSet<DbId> = if user.is_admin {
        folders.iter().map(|f| f.id).collect()
    } else {
        let grants = PermissionRepo::list_by_user(&state.pool, user.user_id).await?;
        let mut visible = HashSet::new();
        for grant in grants {
            for id in FolderRepo::subtree_ids(&state.pool, grant.folder_id).await? {
                visible.insert(id);
            }
        }
        visible
    };

    Ok(Json(DataResponse {
        data: build_tree(&folders, &visible),
    }))
}

/// Assemble [`FolderNode`] trees from a flat folder list, keeping only
/// visible folders. Input is ordered by name, and the order is preserved.
fn build_tree(folders: &[Folder], visible: &HashSet<DbId>) -> Vec<FolderNode> {
    fn children_of(
        folders: &[Folder],
        visible: &HashSet<DbId>,
        parent: Option<DbId>,
    ) -> Vec<FolderNode> {
        folders
            .iter()
            .filter(|f| f.parent_id == parent && visible.contains(&f.id))
            .map(|f| FolderNode {
                folder: f.clone(),
                children: children_of(folders, visible, Some(f.id)),
            })
            .collect()
    }

    // Roots: visible folders whose parent is missing or invisible.
    folders
        .iter()
        .filter(|f| {
            visible.contains(&f.id)
                && !f.parent_id.is_some_and(|p| visible.contains(&p))
        })
        .map(|f| FolderNode {
            folder: f.clone(),
            children: children_of(folders, visible, Some(f.id)),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// POST /folders
// ---------------------------------------------------------------------------

/// Create a folder. Root folders are admin-only; subfolders require the
/// `manage` level on the parent.
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateFolder>,
) -> AppResult<(StatusCode, Json<DataResponse<Folder>>)> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Folder name must not be empty".into(),
        )));
    }

    match input.parent_id {
        Some(parent_id) => {
            require_folder_access(&state.pool, &user, parent_id, PermissionLevel::Manage).await?;
        }
        None => {
            if !user.is_admin {
                return Err(AppError::Core(CoreError::Forbidden(
                    "Only administrators can create root folders".into(),
                )));
            }
        }
    }

    let folder = FolderRepo::create(
        &state.pool,
        &CreateFolder {
            name,
            parent_id: input.parent_id,
        },
        user.user_id,
    )
    .await?;

    // The creator keeps access even if their grant on the parent is later
    // revoked, and the grant is visible in the permission listing.
    if !user.is_admin {
        PermissionRepo::upsert(
            &state.pool,
            user.user_id,
            folder.id,
            PermissionLevel::Manage.as_str(),
            user.user_id,
        )
        .await?;
    }

    record_action(
        &state.pool,
        Some(user.user_id),
        &user.username,
        actions::FOLDER_CREATE,
        Some(targets::FOLDER),
        Some(folder.id),
        Some(json!({ "name": folder.name, "parent_id": folder.parent_id })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: folder })))
}

// ---------------------------------------------------------------------------
// GET /folders/{id}
// ---------------------------------------------------------------------------

/// Fetch one folder (`view` level).
pub async fn get(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Folder>>> {
    require_folder_access(&state.pool, &user, id, PermissionLevel::View).await?;
    let folder = crate::access::ensure_folder_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: folder }))
}

// ---------------------------------------------------------------------------
// PATCH /folders/{id}
// ---------------------------------------------------------------------------

/// Request body for folder rename.
#[derive(Debug, Deserialize)]
pub struct RenameFolder {
    pub name: String,
}

/// Rename a folder. Requires the `manage` level.
pub async fn rename(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RenameFolder>,
) -> AppResult<Json<DataResponse<Folder>>> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Folder name must not be empty".into(),
        )));
    }

    require_folder_access(&state.pool, &user, id, PermissionLevel::Manage).await?;

    let folder = FolderRepo::rename(&state.pool, id, &name)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Folder", id }))?;

    Ok(Json(DataResponse { data: folder }))
}

// ---------------------------------------------------------------------------
// DELETE /folders/{id}
// ---------------------------------------------------------------------------

/// Delete a folder and its whole subtree, including stored template files.
/// Requires the `delete` level.
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    require_folder_access(&state.pool, &user, id, PermissionLevel::Delete).await?;

    // Collect stored file paths before the cascade removes the rows.
    let mut file_paths = Vec::new();
    for folder_id in FolderRepo::subtree_ids(&state.pool, id).await? {
        for template in TemplateRepo::list_by_folder(&state.pool, folder_id).await? {
            file_paths.push(template.file_path);
        }
    }

    let deleted = FolderRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound { entity: "Folder", id }));
    }

    // Best-effort file cleanup; orphaned files are not worth failing over.
    for path in file_paths {
        let absolute = state.config.storage_dir.join(&path);
        if let Err(err) = tokio::fs::remove_file(&absolute).await {
            tracing::warn!(path, error = %err, "Failed to remove stored template file");
        }
    }

    record_action(
        &state.pool,
        Some(user.user_id),
        &user.username,
        actions::FOLDER_DELETE,
        Some(targets::FOLDER),
        Some(id),
        None,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

/// GET /folders/{id}/permissions -- list grants on a folder (`manage` level).
pub async fn list_permissions(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Permission>>>> {
    require_folder_access(&state.pool, &user, id, PermissionLevel::Manage).await?;
    let grants = PermissionRepo::list_by_folder(&state.pool, id).await?;
    Ok(Json(DataResponse { data: grants }))
}

/// PUT /folders/{id}/permissions -- grant or replace a user's level on a
/// folder (`manage` level).
pub async fn grant_permission(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<GrantPermission>,
) -> AppResult<Json<DataResponse<Permission>>> {
    require_folder_access(&state.pool, &user, id, PermissionLevel::Manage).await?;

    let level = PermissionLevel::parse(&input.level).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Unknown permission level: {}",
            input.level
        )))
    })?;

    let target = UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "User",
                id: input.user_id,
            })
        })?;
    if !target.is_active {
        return Err(AppError::Core(CoreError::Validation(
            "Cannot grant permissions to a deactivated account".into(),
        )));
    }

    let grant =
        PermissionRepo::upsert(&state.pool, input.user_id, id, level.as_str(), user.user_id)
            .await?;

    record_action(
        &state.pool,
        Some(user.user_id),
        &user.username,
        actions::PERMISSION_GRANT,
        Some(targets::PERMISSION),
        Some(grant.id),
        Some(json!({
            "folder_id": id,
            "user_id": input.user_id,
            "level": level.as_str(),
        })),
    )
    .await;

    Ok(Json(DataResponse { data: grant }))
}

/// DELETE /folders/{id}/permissions/{user_id} -- revoke a grant
/// (`manage` level).
pub async fn revoke_permission(
    user: AuthUser,
    State(state): State<AppState>,
    Path((id, target_user_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    require_folder_access(&state.pool, &user, id, PermissionLevel::Manage).await?;

    let revoked = PermissionRepo::revoke(&state.pool, target_user_id, id).await?;
    if !revoked {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Permission",
            id: target_user_id,
        }));
    }

    record_action(
        &state.pool,
        Some(user.user_id),
        &user.username,
        actions::PERMISSION_REVOKE,
        Some(targets::PERMISSION),
        Some(id),
        Some(json!({ "folder_id": id, "user_id": target_user_id })),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// GET /folders/{id}/templates
// ---------------------------------------------------------------------------

/// List templates inside a folder (`view` level).
pub async fn list_templates(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<contracts_db::models::template::Template>>>> {
    require_folder_access(&state.pool, &user, id, PermissionLevel::View).await?;
    let templates = TemplateRepo::list_by_folder(&state.pool, id).await?;
    Ok(Json(DataResponse { data: templates }))
}
