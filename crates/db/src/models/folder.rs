//! Folder tree model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use contracts_core::types::{DbId, Timestamp};

/// A folder row. Folders form a tree via `parent_id`; root folders have
/// `parent_id = NULL`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Folder {
    pub id: DbId,
    pub name: String,
    pub parent_id: Option<DbId>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for creating a folder.
#[derive(Debug, Deserialize)]
pub struct CreateFolder {
    pub name: String,
    pub parent_id: Option<DbId>,
}

/// A folder with its subtree, for tree responses.
#[derive(Debug, Serialize)]
pub struct FolderNode {
    #[serde(flatten)]
    pub folder: Folder,
    pub children: Vec<FolderNode>,
}
