/// Credential management
///
/// Handles user registration, password verification and the user listing.

mod manager;
mod password;

pub use manager::CredentialStore;

use crate::db::user::UserSummary;
use serde::{Deserialize, Serialize};

/// Registration / user creation request
///
/// Both fields are optional at the wire level so a missing field is
/// reported as a validation error rather than a JSON rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Response for a newly stored user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreatedResponse {
    pub success: bool,
    pub message: String,
    pub id: i64,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user_id: i64,
    pub message: String,
}

/// User listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListUsersResponse {
    pub success: bool,
    pub users: Vec<UserSummary>,
}
