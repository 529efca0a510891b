//! Repository for the `permissions` table.

use sqlx::PgPool;

use contracts_core::types::DbId;

use crate::models::permission::Permission;

const COLUMNS: &str = "id, user_id, folder_id, level, granted_by, created_at";

/// Provides grant/revoke/lookup operations for folder permissions.
pub struct PermissionRepo;

impl PermissionRepo {
    /// Grant a permission, replacing any existing grant for the same
    /// user/folder pair.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        folder_id: DbId,
        level: &str,
        granted_by: DbId,
    ) -> Result<Permission, sqlx::Error> {
        let query = format!(
            "INSERT INTO permissions (user_id, folder_id, level, granted_by)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_permissions_user_folder
             DO UPDATE SET level = EXCLUDED.level, granted_by = EXCLUDED.granted_by
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Permission>(&query)
            .bind(user_id)
            .bind(folder_id)
            .bind(level)
            .bind(granted_by)
            .fetch_one(pool)
            .await
    }

    /// Find one user's grant on one folder.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        folder_id: DbId,
    ) -> Result<Option<Permission>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM permissions WHERE user_id = $1 AND folder_id = $2");
        sqlx::query_as::<_, Permission>(&query)
            .bind(user_id)
            .bind(folder_id)
            .fetch_optional(pool)
            .await
    }

    /// All grants on one folder.
    pub async fn list_by_folder(
        pool: &PgPool,
        folder_id: DbId,
    ) -> Result<Vec<Permission>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM permissions WHERE folder_id = $1 ORDER BY created_at");
        sqlx::query_as::<_, Permission>(&query)
            .bind(folder_id)
            .fetch_all(pool)
            .await
    }

    /// All grants held by one user.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Permission>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM permissions WHERE user_id = $1 ORDER BY folder_id");
        sqlx::query_as::<_, Permission>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Revoke a grant. Returns `true` if a row was deleted.
    pub async fn revoke(
        pool: &PgPool,
        user_id: DbId,
        folder_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM permissions WHERE user_id = $1 AND folder_id = $2")
            .bind(user_id)
            .bind(folder_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
