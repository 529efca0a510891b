//! Action log constants.
//!
//! This module lives in `core` (zero internal deps) so it can be used by both
//! the API/repository layer and any future worker or CLI tooling.

// ---------------------------------------------------------------------------
// Action type constants
// ---------------------------------------------------------------------------

/// Known action types for action log entries.
pub mod actions {
    pub const LOGIN: &str = "login";
    pub const LOGOUT: &str = "logout";
    pub const REGISTER: &str = "register";
    pub const UPLOAD: &str = "upload";
    pub const DOWNLOAD: &str = "download";
    pub const DELETE: &str = "delete";
    pub const GENERATE: &str = "generate";
    pub const FOLDER_CREATE: &str = "folder_create";
    pub const FOLDER_DELETE: &str = "folder_delete";
    pub const PERMISSION_GRANT: &str = "permission_grant";
    pub const PERMISSION_REVOKE: &str = "permission_revoke";
    pub const SETTING_CHANGE: &str = "setting_change";
    pub const USER_ACTIVATE: &str = "user_activate";
    pub const USER_DEACTIVATE: &str = "user_deactivate";
    pub const USER_PROMOTE: &str = "user_promote";
}

// ---------------------------------------------------------------------------
// Target type constants
// ---------------------------------------------------------------------------

/// Known target types for action log entries.
pub mod targets {
    pub const USER: &str = "user";
    pub const FOLDER: &str = "folder";
    pub const TEMPLATE: &str = "template";
    pub const SETTING: &str = "setting";
    pub const PERMISSION: &str = "permission";
}
