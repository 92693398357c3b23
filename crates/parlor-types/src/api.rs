use serde::{Deserialize, Serialize};

// -- Admin --

/// Body of `POST /admin/update_user/{user_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}
