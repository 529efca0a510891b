//! Placeholder description model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use contracts_core::types::{DbId, Timestamp};

/// A human-readable description of one placeholder in one template,
/// shown next to the field when operators fill templates by hand.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlaceholderDescription {
    pub id: DbId,
    pub template_id: DbId,
    pub placeholder: String,
    pub description: String,
    pub updated_at: Timestamp,
}

/// DTO for setting a placeholder description.
#[derive(Debug, Deserialize)]
pub struct UpsertPlaceholderDescription {
    pub placeholder: String,
    pub description: String,
}
