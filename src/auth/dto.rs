use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo_types::User;

/// Request body for user registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public part of the user returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        PublicUser {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

/// Response returned after registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisteredResponse {
    pub message: String,
    pub user: PublicUser,
}

/// Response returned after login. `token_type` is always `"bearer"` and is
/// serialized as `type`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "type")]
    pub token_type: String,
    pub token: String,
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_wire_shape() {
        let user_id = Uuid::new_v4();
        let body = LoginResponse {
            token_type: "bearer".into(),
            token: format!("token_00ff_{user_id}"),
            user: PublicUser {
                id: user_id,
                email: "a@b.c".into(),
            },
        };
        let json: serde_json::Value = serde_json::to_value(&body).unwrap();
        assert_eq!(json["type"], "bearer");
        assert_eq!(json["token"], format!("token_00ff_{user_id}"));
        assert_eq!(json["user"]["email"], "a@b.c");
        assert!(json.get("token_type").is_none());
    }
}
