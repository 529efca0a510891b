//! Repository for the `settings` table.

use sqlx::PgPool;

use contracts_core::types::DbId;

use crate::models::setting::Setting;

const COLUMNS: &str =
    "id, key, value, description, is_active, updated_by, created_at, updated_at";

/// Provides key/value setting storage.
pub struct SettingRepo;

impl SettingRepo {
    /// Create or replace a setting by key. Re-upserting a deactivated key
    /// reactivates it.
    pub async fn upsert(
        pool: &PgPool,
        key: &str,
        value: &str,
        description: Option<&str>,
        updated_by: DbId,
    ) -> Result<Setting, sqlx::Error> {
        let query = format!(
            "INSERT INTO settings (key, value, description, updated_by)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_settings_key
             DO UPDATE SET
                value = EXCLUDED.value,
                description = COALESCE(EXCLUDED.description, settings.description),
                is_active = TRUE,
                updated_by = EXCLUDED.updated_by,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Setting>(&query)
            .bind(key)
            .bind(value)
            .bind(description)
            .bind(updated_by)
            .fetch_one(pool)
            .await
    }

    /// Find an active setting by key.
    pub async fn find_active(pool: &PgPool, key: &str) -> Result<Option<Setting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM settings WHERE key = $1 AND is_active = TRUE");
        sqlx::query_as::<_, Setting>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// List all active settings ordered by key.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Setting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM settings WHERE is_active = TRUE ORDER BY key");
        sqlx::query_as::<_, Setting>(&query).fetch_all(pool).await
    }

    /// Deactivate a setting, keeping the row for history.
    ///
    /// Returns `true` if an active setting was deactivated.
    pub async fn deactivate(pool: &PgPool, key: &str, updated_by: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE settings SET is_active = FALSE, updated_by = $2, updated_at = NOW()
             WHERE key = $1 AND is_active = TRUE",
        )
        .bind(key)
        .bind(updated_by)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
