//! Repository structs with static async methods, one per table.
//!
//! Repositories take a `&PgPool` and return `Result<_, sqlx::Error>`;
//! error classification happens at the API layer.

pub mod action_log_repo;
pub mod folder_repo;
pub mod permission_repo;
pub mod placeholder_repo;
pub mod session_repo;
pub mod setting_repo;
pub mod template_repo;
pub mod user_repo;

pub use action_log_repo::ActionLogRepo;
pub use folder_repo::FolderRepo;
pub use permission_repo::PermissionRepo;
pub use placeholder_repo::PlaceholderRepo;
pub use session_repo::SessionRepo;
pub use setting_repo::SettingRepo;
pub use template_repo::TemplateRepo;
pub use user_repo::UserRepo;
