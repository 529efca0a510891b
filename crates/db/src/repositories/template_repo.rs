//! Repository for the `templates` table.

use sqlx::PgPool;

use contracts_core::types::DbId;

use crate::models::template::{CreateTemplate, Template};

const COLUMNS: &str = "id, folder_id, name, original_filename, file_path, \
                       size_bytes, uploaded_by, created_at, updated_at";

/// Provides CRUD operations for templates.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a new template row, returning it.
    pub async fn create(pool: &PgPool, input: &CreateTemplate) -> Result<Template, sqlx::Error> {
        let query = format!(
            "INSERT INTO templates (folder_id, name, original_filename, file_path, size_bytes, uploaded_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(input.folder_id)
            .bind(&input.name)
            .bind(&input.original_filename)
            .bind(&input.file_path)
            .bind(input.size_bytes)
            .bind(input.uploaded_by)
            .fetch_one(pool)
            .await
    }

    /// Find a template by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = $1");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List templates in one folder, newest first.
    pub async fn list_by_folder(
        pool: &PgPool,
        folder_id: DbId,
    ) -> Result<Vec<Template>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM templates WHERE folder_id = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, Template>(&query)
            .bind(folder_id)
            .fetch_all(pool)
            .await
    }

    /// List all templates, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates ORDER BY created_at DESC");
        sqlx::query_as::<_, Template>(&query).fetch_all(pool).await
    }

    /// Delete a template row. Returns the deleted row so the caller can
    /// remove the file afterwards.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("DELETE FROM templates WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
