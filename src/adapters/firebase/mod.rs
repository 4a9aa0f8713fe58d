//! REST del servicio alojado: Identity Toolkit (auth) y Firestore (documentos).

pub mod change_feed;
pub mod firestore;
pub mod identity;

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::info;

use crate::domain::session::AuthSession;

/// Se renueva el token cuando le queda menos que esto.
const REFRESH_MARGIN: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
pub struct FirebaseSettings {
    pub api_key: String,
    pub project_id: String,
    pub app_id: String,
    pub identity_url: String,
    pub token_url: String,
    pub firestore_url: String,
}

impl FirebaseSettings {
    /// Raíz de los documentos de la aplicación.
    pub fn documents_root(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/artifacts/{}/public/data",
            self.firestore_url.trim_end_matches('/'),
            self.project_id,
            self.app_id
        )
    }
}

#[derive(Clone)]
struct HostedSession {
    auth: AuthSession,
    refresh_token: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    user_id: String,
    #[serde(default)]
    expires_in: String,
}

/// `expiresIn` llega como texto en segundos; una hora si no se entiende.
pub(crate) fn expires_in(raw: &str) -> Duration {
    Duration::from_secs(raw.trim().parse().unwrap_or(3600))
}

/// Sesión del proveedor compartida entre identidad, perfiles y el feed de cambios.
/// Guarda también el refresh token para renovar el ID token antes de que caduque.
#[derive(Default)]
pub struct SessionToken(RwLock<Option<HostedSession>>);

impl SessionToken {
    pub fn set(&self, auth: AuthSession, refresh_token: String, lifetime: Duration) {
        let hosted = HostedSession { auth, refresh_token, expires_at: Instant::now() + lifetime };
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Some(hosted);
    }

    pub fn clear(&self) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn get(&self) -> Option<AuthSession> {
        self.hosted().map(|h| h.auth)
    }

    fn hosted(&self) -> Option<HostedSession> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Sesión vigente, renovada si está a punto de caducar.
    pub async fn current(&self, client: &Client, settings: &FirebaseSettings) -> anyhow::Result<Option<AuthSession>> {
        let Some(hosted) = self.hosted() else { return Ok(None) };
        if hosted.expires_at.saturating_duration_since(Instant::now()) > REFRESH_MARGIN {
            return Ok(Some(hosted.auth));
        }
        self.refresh(client, settings).await
    }

    /// Canjea el refresh token por un ID token nuevo. `None` si no hay sesión
    /// o si la sesión cambió mientras tanto.
    pub async fn refresh(&self, client: &Client, settings: &FirebaseSettings) -> anyhow::Result<Option<AuthSession>> {
        let Some(hosted) = self.hosted() else { return Ok(None) };
        let url = format!("{}/token?key={}", settings.token_url.trim_end_matches('/'), settings.api_key);
        let body: RefreshResponse = client
            .post(url)
            .form(&[("grant_type", "refresh_token"), ("refresh_token", hosted.refresh_token.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut slot = self.0.write().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some(now) if now.refresh_token == hosted.refresh_token => {}
            _ => return Ok(None),
        }
        let auth = AuthSession { uid: body.user_id, id_token: body.id_token };
        *slot = Some(HostedSession {
            auth: auth.clone(),
            refresh_token: body.refresh_token,
            expires_at: Instant::now() + expires_in(&body.expires_in),
        });
        info!("🔑 ID token renewed for {}", auth.uid);
        Ok(Some(auth))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Form, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    async fn token_server() -> FirebaseSettings {
        let app = Router::new().route(
            "/v1/token",
            post(|Form(form): Form<HashMap<String, String>>| async move {
                let next = format!("{}+", form["refresh_token"]);
                Json(json!({
                    "id_token": format!("id-{next}"),
                    "refresh_token": next,
                    "user_id": "u1",
                    "expires_in": "3600"
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        FirebaseSettings {
            api_key: "key".into(),
            project_id: "proj".into(),
            app_id: "app".into(),
            identity_url: format!("http://{addr}/v1"),
            token_url: format!("http://{addr}/v1"),
            firestore_url: format!("http://{addr}/v1"),
        }
    }

    fn auth() -> AuthSession {
        AuthSession { uid: "u1".into(), id_token: "id-r".into() }
    }

    #[test]
    fn lifetime_text_falls_back_to_an_hour() {
        assert_eq!(expires_in("1800"), Duration::from_secs(1800));
        assert_eq!(expires_in(""), Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn fresh_token_is_used_as_is() {
        let settings = token_server().await;
        let token = SessionToken::default();
        token.set(auth(), "r".into(), Duration::from_secs(3600));
        let current = token.current(&Client::new(), &settings).await.unwrap();
        assert_eq!(current.map(|s| s.id_token), Some("id-r".to_string()));
    }

    #[tokio::test]
    async fn expiring_token_is_renewed_with_the_refresh_token() {
        let settings = token_server().await;
        let token = SessionToken::default();
        token.set(auth(), "r".into(), Duration::from_secs(60));

        let current = token.current(&Client::new(), &settings).await.unwrap();
        assert_eq!(current.map(|s| s.id_token), Some("id-r+".to_string()));
        assert_eq!(token.get().map(|s| s.id_token), Some("id-r+".to_string()));

        token.refresh(&Client::new(), &settings).await.unwrap();
        assert_eq!(token.get().map(|s| s.id_token), Some("id-r++".to_string()));
    }

    #[tokio::test]
    async fn signed_out_session_is_not_refreshed() {
        let settings = token_server().await;
        let token = SessionToken::default();
        assert!(token.refresh(&Client::new(), &settings).await.unwrap().is_none());
        assert!(token.current(&Client::new(), &settings).await.unwrap().is_none());
    }
}
