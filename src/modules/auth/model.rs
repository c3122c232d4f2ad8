use serde::Serialize;
use utoipa::ToSchema;

use sipkl_models::accounts::{Department, Role};

pub use sipkl_models::requests::{LoginRequest, RegisterRequest};

/// Same text for an unknown identifier and a wrong password.
pub const INVALID_CREDENTIALS: &str = "Identifier or password is incorrect";

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub session_token: String,
    pub role: Role,
    pub department: Department,
}
