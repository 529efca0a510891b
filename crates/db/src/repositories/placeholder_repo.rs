//! Repository for the `placeholder_descriptions` table.

use sqlx::PgPool;

use contracts_core::types::DbId;

use crate::models::placeholder::PlaceholderDescription;

const COLUMNS: &str = "id, template_id, placeholder, description, updated_at";

/// Provides upsert/list operations for placeholder descriptions.
pub struct PlaceholderRepo;

impl PlaceholderRepo {
    /// Create or replace the description of one placeholder.
    pub async fn upsert(
        pool: &PgPool,
        template_id: DbId,
        placeholder: &str,
        description: &str,
    ) -> Result<PlaceholderDescription, sqlx::Error> {
        let query = format!(
            "INSERT INTO placeholder_descriptions (template_id, placeholder, description)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_placeholder_descriptions_template_name
             DO UPDATE SET description = EXCLUDED.description, updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PlaceholderDescription>(&query)
            .bind(template_id)
            .bind(placeholder)
            .bind(description)
            .fetch_one(pool)
            .await
    }

    /// All descriptions for one template, in placeholder order.
    pub async fn list_by_template(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Vec<PlaceholderDescription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM placeholder_descriptions WHERE template_id = $1 ORDER BY placeholder"
        );
        sqlx::query_as::<_, PlaceholderDescription>(&query)
            .bind(template_id)
            .fetch_all(pool)
            .await
    }

    /// Remove one description. Returns `true` if a row was deleted.
    pub async fn delete(
        pool: &PgPool,
        template_id: DbId,
        placeholder: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM placeholder_descriptions WHERE template_id = $1 AND placeholder = $2",
        )
        .bind(template_id)
        .bind(placeholder)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
