use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::{
    alert::{AlertRecord, AlertStatus},
    camera::{CameraDraft, CameraRecord, FrameSize},
    detection::FrameOutcome,
    errors::DomainResult,
    preferences::Preferences,
    session::{AuthSession, UserProfile, UserRole},
    status::{ActivityLogEntry, HealthReport, SystemStatus, ThreatConfig},
};

#[async_trait]
pub trait RecognitionPort: Send + Sync {
    /// Envía un frame (data URL JPEG) al backend de reconocimiento.
    async fn process_frame(&self, image: String) -> DomainResult<FrameOutcome>;
}

/// Endpoints REST del backend del panel.
#[async_trait]
pub trait BackendPort: Send + Sync {
    async fn system_status(&self) -> DomainResult<SystemStatus>;
    async fn recent_alerts(&self, limit: usize) -> DomainResult<Vec<AlertRecord>>;
    async fn alerts(&self) -> DomainResult<Vec<AlertRecord>>;
    async fn set_alert_status(&self, id: &str, status: AlertStatus) -> DomainResult<()>;
    async fn cameras(&self) -> DomainResult<Vec<CameraRecord>>;
    async fn add_camera(&self, draft: &CameraDraft) -> DomainResult<()>;
    async fn update_camera(&self, id: &str, draft: &CameraDraft) -> DomainResult<()>;
    async fn delete_camera(&self, id: &str) -> DomainResult<()>;
    async fn activate_camera(&self, id: &str) -> DomainResult<()>;
    async fn threat_config(&self) -> DomainResult<ThreatConfig>;
    async fn activity_logs(&self) -> DomainResult<Vec<ActivityLogEntry>>;
    async fn health(&self) -> DomainResult<HealthReport>;
    async fn change_password(&self, password: &str) -> DomainResult<()>;
    /// Intercambia el token del proveedor de identidad por una sesión del servidor.
    async fn login(&self, id_token: &str) -> DomainResult<String>;
}

/// Servicio de autenticación alojado.
#[async_trait]
pub trait IdentityPort: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> DomainResult<AuthSession>;
    async fn sign_in(&self, email: &str, password: &str) -> DomainResult<AuthSession>;
    async fn sign_out(&self) -> DomainResult<()>;
}

#[async_trait]
pub trait ProfileStorePort: Send + Sync {
    async fn write_profile(&self, auth: &AuthSession, profile: &UserProfile) -> DomainResult<()>;
    async fn read_role(&self, auth: &AuthSession) -> DomainResult<Option<UserRole>>;
}

/// Colecciones/documentos cuyos cambios disparan un refresco.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Alerts,
    Cameras,
    ActivityLogs,
    SystemStatus,
    ThreatConfig,
}

pub trait ChangeFeedPort: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<Topic>;
}

#[async_trait]
pub trait FrameSourcePort: Send + Sync {
    /// Abre el dispositivo; un error equivale a permiso denegado.
    async fn open(&self) -> DomainResult<FrameSize>;
    async fn grab_jpeg(&self) -> DomainResult<Vec<u8>>;
}

pub trait AlarmSoundPort: Send + Sync {
    fn play(&self) -> DomainResult<()>;
    /// Detiene y rebobina; no hace nada si no está sonando.
    fn stop(&self);
    fn is_playing(&self) -> bool;
}

pub trait PreferenceStorePort: Send + Sync {
    fn load(&self) -> DomainResult<Preferences>;
    fn save(&self, prefs: &Preferences) -> DomainResult<()>;
}
