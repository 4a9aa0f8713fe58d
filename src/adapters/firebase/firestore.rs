use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::debug;

use super::FirebaseSettings;
use crate::application::ports::ProfileStorePort;
use crate::domain::{
    errors::{DomainError, DomainResult},
    session::{AuthSession, UserProfile, UserRole},
};

/// Perfiles de usuario en `users/{uid}` vía la API REST de Firestore.
pub struct FirestoreProfiles {
    client: Client,
    settings: FirebaseSettings,
}

impl FirestoreProfiles {
    pub fn new(client: Client, settings: FirebaseSettings) -> Self {
        Self { client, settings }
    }

    fn user_url(&self, uid: &str) -> String {
        format!("{}/users/{}", self.settings.documents_root(), uid)
    }
}

fn network(e: reqwest::Error) -> DomainError {
    DomainError::Network(e.to_string())
}

fn profile_fields(profile: &UserProfile) -> Value {
    let string = |s: &str| json!({ "stringValue": s });
    let role = match profile.role {
        UserRole::Admin => "admin",
        UserRole::Personnel => "personnel",
        UserRole::Anonymous => "anonymous",
    };
    json!({
        "fields": {
            "firstName": string(&profile.first_name),
            "lastName": string(&profile.last_name),
            "email": string(&profile.email),
            "role": string(role),
        }
    })
}

/// Rol del documento; `None` si falta el campo o no se reconoce.
fn role_from_document(doc: &Value) -> Option<UserRole> {
    let raw = doc.pointer("/fields/role/stringValue")?.as_str()?;
    serde_json::from_value(Value::String(raw.to_string())).ok()
}

#[async_trait]
impl ProfileStorePort for FirestoreProfiles {
    async fn write_profile(&self, auth: &AuthSession, profile: &UserProfile) -> DomainResult<()> {
        let resp = self
            .client
            .patch(self.user_url(&auth.uid))
            .bearer_auth(&auth.id_token)
            .json(&profile_fields(profile))
            .send()
            .await
            .map_err(network)?;
        if !resp.status().is_success() {
            return Err(DomainError::Http(resp.status().as_u16()));
        }
        debug!("profile written for {}", auth.uid);
        Ok(())
    }

    async fn read_role(&self, auth: &AuthSession) -> DomainResult<Option<UserRole>> {
        let resp = self
            .client
            .get(self.user_url(&auth.uid))
            .bearer_auth(&auth.id_token)
            .send()
            .await
            .map_err(network)?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if !s.is_success() => Err(DomainError::Http(s.as_u16())),
            _ => {
                let doc: Value = resp.json().await.map_err(network)?;
                Ok(role_from_document(&doc))
            }
        }
    }
}
