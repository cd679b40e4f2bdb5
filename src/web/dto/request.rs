//! Request DTOs for Web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{no_control_chars, no_whitespace, not_empty_trimmed};

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username.
    #[serde(default)]
    pub username: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

/// Account creation request (admin only).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    /// Username.
    #[validate(
        length(min = 1, max = 64, message = "Username must be 1-64 characters"),
        custom(function = "no_whitespace")
    )]
    pub username: String,
    /// Initial password.
    #[validate(length(
        min = 1,
        max = 128,
        message = "Password must be 1-128 characters"
    ))]
    pub password: String,
    /// Display name. Defaults to the username.
    #[serde(default)]
    #[validate(
        length(max = 100, message = "Display name must be at most 100 characters"),
        custom(function = "no_control_chars")
    )]
    pub display_name: Option<String>,
    /// Collection directory. Required unless `is_admin`.
    #[serde(default)]
    #[validate(
        length(max = 255, message = "Directory must be at most 255 characters"),
        custom(function = "not_empty_trimmed"),
        custom(function = "no_control_chars")
    )]
    pub directory: Option<String>,
    /// Create an admin account.
    #[serde(default)]
    pub is_admin: bool,
}

/// Password reset request (admin only).
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    /// New password.
    #[validate(length(
        min = 1,
        max = 128,
        message = "Password must be 1-128 characters"
    ))]
    pub password: String,
}
