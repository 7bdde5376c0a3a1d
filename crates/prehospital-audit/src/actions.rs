//! Action and resource names written to the activity log.

pub const LOGIN: &str = "login";
pub const LOGIN_FAILED: &str = "login_failed";
pub const LOGIN_LOCKED: &str = "login_locked";
pub const FORM_CREATE: &str = "form_create";
pub const FORM_UPDATE: &str = "form_update";
pub const FORM_DELETE: &str = "form_delete";
pub const USER_CREATE: &str = "user_create";

pub const RESOURCE_SESSION: &str = "session";
pub const RESOURCE_FORM: &str = "form";
pub const RESOURCE_USER: &str = "user";
