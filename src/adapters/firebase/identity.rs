use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{expires_in, ErrorEnvelope, FirebaseSettings, SessionToken};
use crate::application::ports::IdentityPort;
use crate::domain::{
    errors::{AuthFailure, DomainError, DomainResult},
    session::AuthSession,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    id_token: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_in: String,
}

/// Identity Toolkit: alta y acceso con email/contraseña.
pub struct FirebaseIdentity {
    client: Client,
    settings: FirebaseSettings,
    token: Arc<SessionToken>,
}

impl FirebaseIdentity {
    pub fn new(client: Client, settings: FirebaseSettings, token: Arc<SessionToken>) -> Self {
        Self { client, settings, token }
    }

    async fn password_call(&self, method: &str, email: &str, password: &str) -> DomainResult<AuthSession> {
        let url = format!(
            "{}/accounts:{}?key={}",
            self.settings.identity_url.trim_end_matches('/'),
            method,
            self.settings.api_key
        );
        let resp = self
            .client
            .post(url)
            .json(&PasswordRequest { email, password, return_secure_token: true })
            .send()
            .await
            .map_err(|e| DomainError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let code = resp
                .json::<ErrorEnvelope>()
                .await
                .map(|env| error_code(&env.error.message).to_string())
                .unwrap_or_else(|_| format!("HTTP_{status}"));
            debug!("accounts:{} failed with {}", method, code);
            return Err(DomainError::Auth(classify(&code)));
        }

        let body: PasswordResponse = resp.json().await.map_err(|e| DomainError::Network(e.to_string()))?;
        let session = AuthSession { uid: body.local_id, id_token: body.id_token };
        self.token.set(session.clone(), body.refresh_token, expires_in(&body.expires_in));
        Ok(session)
    }
}

/// `"WEAK_PASSWORD : Password should be..."` → `"WEAK_PASSWORD"`.
fn error_code(message: &str) -> &str {
    message.split(" : ").next().unwrap_or(message).trim()
}

fn classify(code: &str) -> AuthFailure {
    match code {
        "EMAIL_EXISTS" => AuthFailure::EmailInUse,
        "INVALID_LOGIN_CREDENTIALS" => AuthFailure::InvalidCredential,
        other => AuthFailure::Other(other.to_string()),
    }
}

#[async_trait]
impl IdentityPort for FirebaseIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> DomainResult<AuthSession> {
        self.password_call("signUp", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> DomainResult<AuthSession> {
        self.password_call("signInWithPassword", email, password).await
    }

    async fn sign_out(&self) -> DomainResult<()> {
        self.token.clear();
        info!("🔒 Hosted session dropped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    fn settings(url: String) -> FirebaseSettings {
        FirebaseSettings {
            api_key: "key".into(),
            project_id: "proj".into(),
            app_id: "app".into(),
            identity_url: url.clone(),
            token_url: url.clone(),
            firestore_url: url,
        }
    }

    #[test]
    fn codes_are_split_and_classified() {
        assert_eq!(error_code("WEAK_PASSWORD : Password should be at least 6 characters"), "WEAK_PASSWORD");
        assert_eq!(classify(error_code("EMAIL_EXISTS")), AuthFailure::EmailInUse);
        assert_eq!(classify("INVALID_LOGIN_CREDENTIALS"), AuthFailure::InvalidCredential);
        assert_eq!(classify("USER_DISABLED"), AuthFailure::Other("USER_DISABLED".into()));
    }

    #[tokio::test]
    async fn sign_in_stores_token_and_sign_out_drops_it() {
        let app = Router::new().route(
            "/v1/:method",
            post(|Path(method): Path<String>, Json(body): Json<Value>| async move {
                match (method.as_str(), body["email"].as_str()) {
                    ("accounts:signInWithPassword", Some("ok@mall.test")) => {
                        (StatusCode::OK, Json(json!({"localId":"u1","idToken":"t1","refreshToken":"r1","expiresIn":"3600"})))
                    }
                    _ => (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"error":{"code":400,"message":"EMAIL_EXISTS"}})),
                    ),
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let token = Arc::new(SessionToken::default());
        let identity = FirebaseIdentity::new(Client::new(), settings(format!("http://{addr}/v1")), token.clone());

        let session = identity.sign_in("ok@mall.test", "pw").await.unwrap();
        assert_eq!(session.uid, "u1");
        assert_eq!(token.get().map(|s| s.id_token), Some("t1".to_string()));

        let err = identity.sign_up("dup@mall.test", "pw").await.unwrap_err();
        assert!(matches!(err, DomainError::Auth(AuthFailure::EmailInUse)));

        identity.sign_out().await.unwrap();
        assert!(token.get().is_none());
    }
}
