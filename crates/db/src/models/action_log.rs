//! Action log model and query DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use contracts_core::types::{DbId, Timestamp};

/// One audit trail entry. `username` is denormalized so the entry stays
/// readable after the user row is deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActionLog {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub username: String,
    pub action: String,
    pub target_type: Option<String>,
    pub target_id: Option<DbId>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for recording an action.
#[derive(Debug)]
pub struct CreateActionLog {
    pub user_id: Option<DbId>,
    pub username: String,
    pub action: String,
    pub target_type: Option<String>,
    pub target_id: Option<DbId>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
}

/// Filter and pagination parameters for log queries.
#[derive(Debug, Default, Deserialize)]
pub struct ActionLogQuery {
    pub user_id: Option<DbId>,
    pub action: Option<String>,
    pub target_type: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
