//! Folder permission model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use contracts_core::types::{DbId, Timestamp};

/// A permission grant: one user's access level on one folder.
/// `level` holds a [`contracts_core::permissions::PermissionLevel`] string.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Permission {
    pub id: DbId,
    pub user_id: DbId,
    pub folder_id: DbId,
    pub level: String,
    pub granted_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for granting (or re-granting) a permission.
#[derive(Debug, Deserialize)]
pub struct GrantPermission {
    pub user_id: DbId,
    pub level: String,
}
