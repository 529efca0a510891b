//! Repository for the `folders` table.

use sqlx::PgPool;

use contracts_core::types::DbId;

use crate::models::folder::{CreateFolder, Folder};

const COLUMNS: &str = "id, name, parent_id, created_by, created_at";

/// Provides CRUD operations for the folder tree.
pub struct FolderRepo;

impl FolderRepo {
    /// Insert a new folder, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateFolder,
        created_by: DbId,
    ) -> Result<Folder, sqlx::Error> {
        let query = format!(
            "INSERT INTO folders (name, parent_id, created_by)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Folder>(&query)
            .bind(&input.name)
            .bind(input.parent_id)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a folder by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Folder>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM folders WHERE id = $1");
        sqlx::query_as::<_, Folder>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every folder, parents before children within a name ordering.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Folder>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM folders ORDER BY parent_id NULLS FIRST, name");
        sqlx::query_as::<_, Folder>(&query).fetch_all(pool).await
    }

    /// Rename a folder. Returns the updated row, or `None` if it does not exist.
    pub async fn rename(
        pool: &PgPool,
        id: DbId,
        name: &str,
    ) -> Result<Option<Folder>, sqlx::Error> {
        let query = format!("UPDATE folders SET name = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Folder>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Delete a folder. Children and templates go with it via cascade.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// IDs of the folder and all its descendants.
    pub async fn subtree_ids(pool: &PgPool, id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "WITH RECURSIVE subtree AS (
                SELECT id FROM folders WHERE id = $1
                UNION ALL
                SELECT f.id FROM folders f JOIN subtree s ON f.parent_id = s.id
             )
             SELECT id FROM subtree",
        )
        .bind(id)
        .fetch_all(pool)
        .await
    }

    /// IDs of the folder and all its ancestors up to the root.
    /// Permissions granted on an ancestor apply to the whole subtree.
    pub async fn ancestor_ids(pool: &PgPool, id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "WITH RECURSIVE chain AS (
                SELECT id, parent_id FROM folders WHERE id = $1
                UNION ALL
                SELECT f.id, f.parent_id FROM folders f JOIN chain c ON f.id = c.parent_id
             )
             SELECT id FROM chain",
        )
        .bind(id)
        .fetch_all(pool)
        .await
    }
}
