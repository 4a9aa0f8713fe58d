use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::application::dto::{
    AlertStatusUpdate, ChangePasswordRequest, LoginRequest, LoginResponse, ProcessFrameRequest,
};
use crate::application::ports::{BackendPort, RecognitionPort};
use crate::domain::{
    alert::{AlertRecord, AlertStatus},
    camera::{CameraDraft, CameraRecord},
    detection::{FrameOutcome, RecognitionReply},
    errors::{DomainError, DomainResult},
    status::{ActivityLogEntry, HealthReport, SystemStatus, ThreatConfig},
};

const PROCESS_FRAME: &str = "/process_frame";

/// Cliente REST del backend de reconocimiento y del panel.
/// Mantiene la cookie de sesión que emite `/login`.
pub struct HttpBackend {
    client: Client,
    base: String,
}

impl HttpBackend {
    pub fn new(base: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().cookie_store(true).timeout(timeout).build()?;
        Ok(Self { client, base: base.trim_end_matches('/').to_string() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn send(&self, req: RequestBuilder) -> DomainResult<Response> {
        let resp = req.send().await.map_err(network)?;
        if !resp.status().is_success() {
            return Err(DomainError::Http(resp.status().as_u16()));
        }
        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> DomainResult<T> {
        let resp = self.send(self.client.get(self.url(path))).await?;
        resp.json::<T>().await.map_err(network)
    }

    /// Mutaciones: sólo importa el código de estado.
    async fn execute(&self, req: RequestBuilder) -> DomainResult<()> {
        let resp = self.send(req).await?;
        debug!("{} -> {}", resp.url(), resp.status());
        Ok(())
    }
}

fn network(e: reqwest::Error) -> DomainError {
    DomainError::Network(e.to_string())
}

/// Ruta (con query) de la URL final si el backend redirigió.
fn redirect_target(final_url: &reqwest::Url) -> Option<String> {
    if final_url.path().ends_with(PROCESS_FRAME) {
        return None;
    }
    let mut location = final_url.path().to_string();
    if let Some(query) = final_url.query() {
        location.push('?');
        location.push_str(query);
    }
    Some(location)
}

#[async_trait]
impl RecognitionPort for HttpBackend {
    async fn process_frame(&self, image: String) -> DomainResult<FrameOutcome> {
        let resp = self
            .client
            .post(self.url(PROCESS_FRAME))
            .json(&ProcessFrameRequest { image })
            .send()
            .await
            .map_err(network)?;

        if let Some(location) = redirect_target(resp.url()) {
            return Ok(FrameOutcome::Redirect(location));
        }

        let status = resp.status();
        let reply = resp.json::<RecognitionReply>().await;
        match reply {
            Ok(RecognitionReply { error: Some(msg), .. }) => Err(DomainError::Backend(msg)),
            Ok(_) if !status.is_success() => Err(DomainError::Http(status.as_u16())),
            Ok(reply) => Ok(FrameOutcome::Recognized { results: reply.results, alarm: reply.alarm }),
            Err(_) if !status.is_success() => Err(DomainError::Http(status.as_u16())),
            Err(e) => Err(network(e)),
        }
    }
}

#[async_trait]
impl BackendPort for HttpBackend {
    async fn system_status(&self) -> DomainResult<SystemStatus> {
        self.get_json("/api/system_status").await
    }

    async fn recent_alerts(&self, limit: usize) -> DomainResult<Vec<AlertRecord>> {
        self.get_json(&format!("/api/recent_alerts?limit={limit}")).await
    }

    async fn alerts(&self) -> DomainResult<Vec<AlertRecord>> {
        self.get_json("/api/alerts").await
    }

    async fn set_alert_status(&self, id: &str, status: AlertStatus) -> DomainResult<()> {
        let req = self.client.put(self.url(&format!("/api/alert/{id}"))).json(&AlertStatusUpdate { status });
        self.execute(req).await
    }

    async fn cameras(&self) -> DomainResult<Vec<CameraRecord>> {
        self.get_json("/api/cameras").await
    }

    async fn add_camera(&self, draft: &CameraDraft) -> DomainResult<()> {
        self.execute(self.client.post(self.url("/api/cameras")).json(draft)).await
    }

    async fn update_camera(&self, id: &str, draft: &CameraDraft) -> DomainResult<()> {
        self.execute(self.client.put(self.url(&format!("/api/cameras/{id}"))).json(draft)).await
    }

    async fn delete_camera(&self, id: &str) -> DomainResult<()> {
        self.execute(self.client.delete(self.url(&format!("/api/cameras/{id}")))).await
    }

    async fn activate_camera(&self, id: &str) -> DomainResult<()> {
        self.execute(self.client.post(self.url(&format!("/api/cameras/{id}/activate")))).await
    }

    async fn threat_config(&self) -> DomainResult<ThreatConfig> {
        self.get_json("/api/threat_config").await
    }

    async fn activity_logs(&self) -> DomainResult<Vec<ActivityLogEntry>> {
        self.get_json("/api/activity_logs").await
    }

    async fn health(&self) -> DomainResult<HealthReport> {
        self.get_json("/api/health").await
    }

    async fn change_password(&self, password: &str) -> DomainResult<()> {
        let req = self.client.post(self.url("/api/change_password")).json(&ChangePasswordRequest { password });
        self.execute(req).await
    }

    async fn login(&self, id_token: &str) -> DomainResult<String> {
        let req = self.client.post(self.url("/login")).json(&LoginRequest { id_token });
        let resp = self.send(req).await?;
        let body: LoginResponse = resp.json().await.map_err(network)?;
        Ok(body.redirect_url)
    }
}
