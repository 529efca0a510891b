//! Document template model and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use contracts_core::types::{DbId, Timestamp};

/// A stored DOCX template. `file_path` is relative to the storage root.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Template {
    pub id: DbId,
    pub folder_id: DbId,
    pub name: String,
    pub original_filename: String,
    #[serde(skip_serializing)]
    pub file_path: String,
    pub size_bytes: i64,
    pub uploaded_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering an uploaded template.
#[derive(Debug)]
pub struct CreateTemplate {
    pub folder_id: DbId,
    pub name: String,
    pub original_filename: String,
    pub file_path: String,
    pub size_bytes: i64,
    pub uploaded_by: Option<DbId>,
}
