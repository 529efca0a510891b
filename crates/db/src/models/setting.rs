//! Application setting model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use contracts_core::types::{DbId, Timestamp};

/// A key/value application setting. Settings are never hard-deleted;
/// deactivating keeps history while hiding the entry from clients.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Setting {
    pub id: DbId,
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating or replacing a setting; the key comes from the URL.
#[derive(Debug, Deserialize)]
pub struct UpsertSetting {
    pub value: String,
    pub description: Option<String>,
}
