use serde::{Deserialize, Serialize};

use crate::domain::alert::AlertStatus;

#[derive(Debug, Clone, Serialize)]
pub struct ProcessFrameRequest {
    pub image: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    #[serde(rename = "idToken")]
    pub id_token: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub redirect_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertStatusUpdate {
    pub status: AlertStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordRequest<'a> {
    pub password: &'a str,
}

// --- Acciones del servidor local ---

#[derive(Debug, Clone, Deserialize)]
pub struct NavigateRequest {
    pub location: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterRequest {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DialogAnswer {
    /// `None` = cerrar con la ✕.
    pub confirmed: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordChangeForm {
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesUpdate {
    pub dark_mode: Option<bool>,
    pub language: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguagePreferenceRequest {
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}
