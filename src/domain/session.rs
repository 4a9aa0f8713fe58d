use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Anonymous,
    Personnel,
    Admin,
}

impl UserRole {
    pub fn landing_page(&self) -> &'static str {
        match self {
            UserRole::Admin => "/admin_overview",
            UserRole::Personnel => "/personnel_overview",
            UserRole::Anonymous => "/",
        }
    }
}

/// Estado de sesión del proceso; lo posee el controlador de sesión.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    pub user_id: Option<String>,
    pub role: UserRole,
}

impl SessionState {
    pub fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Result of a successful hosted-auth call.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub uid: String,
    pub id_token: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthForm {
    #[default]
    SignIn,
    SignUp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
}
