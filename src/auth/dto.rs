use serde::{Deserialize, Serialize};

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login outcome. `status` is the string `"true"` or `"false"`; `userId` is
/// only present on success.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub status: &'static str,
}

impl LoginResponse {
    pub fn accepted(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            status: "true",
        }
    }

    pub fn rejected() -> Self {
        Self {
            user_id: None,
            status: "false",
        }
    }
}
