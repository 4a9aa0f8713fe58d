//! Fakes en memoria de los puertos, compartidos por los tests.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::application::ports::{
    AlarmSoundPort, BackendPort, ChangeFeedPort, FrameSourcePort, IdentityPort, PreferenceStorePort, ProfileStorePort,
    RecognitionPort, Topic,
};
use crate::domain::{
    alert::{AlertRecord, AlertStatus, ThreatLevel},
    camera::{CameraDraft, CameraRecord, FrameSize},
    detection::{DetectionResult, FrameOutcome},
    errors::{AuthFailure, DomainError, DomainResult},
    preferences::Preferences,
    session::{AuthSession, UserProfile, UserRole},
    status::{ActivityLogEntry, HealthReport, SystemStatus, ThreatConfig},
};

pub fn detection(x: f32, name: &str) -> DetectionResult {
    DetectionResult { bbox: [x, x, x + 50.0, x + 80.0], name: name.into(), distance: Some(0.5) }
}

pub fn alert(id: &str, level: ThreatLevel, status: AlertStatus) -> AlertRecord {
    AlertRecord {
        id: id.into(),
        timestamp: None,
        camera: "Entrance".into(),
        detections: vec!["gun".into()],
        threat_level: level,
        status,
    }
}

pub fn camera(id: &str, is_default: bool) -> CameraRecord {
    CameraRecord {
        id: id.into(),
        name: format!("Camera {id}"),
        rtsp_url: Some(format!("rtsp://10.0.0.1/{id}")),
        source: None,
        status: Some("active".into()),
        is_default,
    }
}

pub fn status(active: u64, total: u64) -> SystemStatus {
    SystemStatus {
        status: "running".into(),
        threat_level: "Medium".into(),
        alerts_today: 2,
        cameras_active: format!("{active}/{total}"),
        active_cameras: active,
        total_cameras: total,
        total_detections: None,
        last_object_detected: None,
    }
}

// --- Backend ---

#[derive(Default)]
pub struct BackendState {
    pub status: Option<SystemStatus>,
    pub alerts: Vec<AlertRecord>,
    pub cameras: Vec<CameraRecord>,
    pub threat: ThreatConfig,
    pub logs: Vec<ActivityLogEntry>,
    pub health: Option<HealthReport>,
    pub login_redirect: String,
}

#[derive(Default)]
pub struct FakeBackend {
    pub state: Mutex<BackendState>,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with<F: FnOnce(&mut BackendState)>(self: &Arc<Self>, f: F) -> Arc<Self> {
        f(&mut self.state.lock().unwrap());
        self.clone()
    }

    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn heal(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls().iter().filter(|c| c.split(' ').next() == Some(op)).count()
    }

    fn record(&self, op: &'static str, detail: String) -> DomainResult<()> {
        let call = if detail.is_empty() { op.to_string() } else { format!("{op} {detail}") };
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(op) {
            return Err(DomainError::Http(500));
        }
        Ok(())
    }
}

#[async_trait]
impl BackendPort for FakeBackend {
    async fn system_status(&self) -> DomainResult<SystemStatus> {
        self.record("system_status", String::new())?;
        self.state.lock().unwrap().status.clone().ok_or(DomainError::Http(404))
    }

    async fn recent_alerts(&self, limit: usize) -> DomainResult<Vec<AlertRecord>> {
        self.record("recent_alerts", limit.to_string())?;
        Ok(self.state.lock().unwrap().alerts.iter().take(limit).cloned().collect())
    }

    async fn alerts(&self) -> DomainResult<Vec<AlertRecord>> {
        self.record("alerts", String::new())?;
        Ok(self.state.lock().unwrap().alerts.clone())
    }

    async fn set_alert_status(&self, id: &str, status: AlertStatus) -> DomainResult<()> {
        self.record("set_alert_status", format!("{id} {}", status.as_str()))?;
        let mut state = self.state.lock().unwrap();
        match state.alerts.iter_mut().find(|a| a.id == id) {
            Some(alert) => {
                alert.status = status;
                Ok(())
            }
            None => Err(DomainError::Http(404)),
        }
    }

    async fn cameras(&self) -> DomainResult<Vec<CameraRecord>> {
        self.record("cameras", String::new())?;
        Ok(self.state.lock().unwrap().cameras.clone())
    }

    async fn add_camera(&self, draft: &CameraDraft) -> DomainResult<()> {
        self.record("add_camera", draft.name.clone())?;
        let mut state = self.state.lock().unwrap();
        let id = format!("cam{}", state.cameras.len() + 1);
        state.cameras.push(CameraRecord {
            id,
            name: draft.name.clone(),
            rtsp_url: Some(draft.rtsp_url.clone()),
            source: None,
            status: None,
            is_default: false,
        });
        Ok(())
    }

    async fn update_camera(&self, id: &str, draft: &CameraDraft) -> DomainResult<()> {
        self.record("update_camera", format!("{id} {}", draft.name))?;
        let mut state = self.state.lock().unwrap();
        let camera = state.cameras.iter_mut().find(|c| c.id == id).ok_or(DomainError::Http(404))?;
        camera.name = draft.name.clone();
        camera.rtsp_url = Some(draft.rtsp_url.clone());
        Ok(())
    }

    async fn delete_camera(&self, id: &str) -> DomainResult<()> {
        self.record("delete_camera", id.to_string())?;
        self.state.lock().unwrap().cameras.retain(|c| c.id != id);
        Ok(())
    }

    async fn activate_camera(&self, id: &str) -> DomainResult<()> {
        self.record("activate_camera", id.to_string())?;
        for camera in self.state.lock().unwrap().cameras.iter_mut() {
            camera.is_default = camera.id == id;
        }
        Ok(())
    }

    async fn threat_config(&self) -> DomainResult<ThreatConfig> {
        self.record("threat_config", String::new())?;
        Ok(self.state.lock().unwrap().threat.clone())
    }

    async fn activity_logs(&self) -> DomainResult<Vec<ActivityLogEntry>> {
        self.record("activity_logs", String::new())?;
        Ok(self.state.lock().unwrap().logs.clone())
    }

    async fn health(&self) -> DomainResult<HealthReport> {
        self.record("health", String::new())?;
        self.state.lock().unwrap().health.clone().ok_or(DomainError::Http(503))
    }

    async fn change_password(&self, password: &str) -> DomainResult<()> {
        self.record("change_password", password.len().to_string())
    }

    async fn login(&self, id_token: &str) -> DomainResult<String> {
        self.record("login", id_token.to_string())?;
        Ok(self.state.lock().unwrap().login_redirect.clone())
    }
}

// --- Sonido ---

#[derive(Default)]
pub struct FakeSound {
    playing: AtomicBool,
    plays: AtomicUsize,
    stops: AtomicUsize,
}

impl FakeSound {
    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl AlarmSoundPort for FakeSound {
    fn play(&self) -> DomainResult<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        if self.playing.swap(false, Ordering::SeqCst) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

// --- Captura y reconocimiento ---

#[derive(Clone, Default)]
pub struct FakeRecognizer {
    queue: Arc<Mutex<VecDeque<DomainResult<FrameOutcome>>>>,
    sent: Arc<Mutex<Vec<String>>>,
    delay: Duration,
}

impl FakeRecognizer {
    pub fn with(outcomes: Vec<DomainResult<FrameOutcome>>) -> Self {
        Self { queue: Arc::new(Mutex::new(outcomes.into())), ..Self::default() }
    }

    /// Each reply takes `delay` to arrive.
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecognitionPort for FakeRecognizer {
    async fn process_frame(&self, image: String) -> DomainResult<FrameOutcome> {
        self.sent.lock().unwrap().push(image);
        let reply = self
            .queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(FrameOutcome::Recognized { results: Vec::new(), alarm: false }));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        reply
    }
}

#[derive(Clone)]
pub struct FakeFrames {
    size: Option<FrameSize>,
    opens: Arc<AtomicUsize>,
}

impl FakeFrames {
    pub fn ready(width: u32, height: u32) -> Self {
        Self { size: Some(FrameSize { width, height }), opens: Arc::default() }
    }

    pub fn denied() -> Self {
        Self { size: None, opens: Arc::default() }
    }

    pub fn open_calls(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrameSourcePort for FakeFrames {
    async fn open(&self) -> DomainResult<FrameSize> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.size.ok_or_else(|| DomainError::OperationFailed("permission denied".into()))
    }

    async fn grab_jpeg(&self) -> DomainResult<Vec<u8>> {
        Ok(vec![0xFF, 0xD8, 0xFF, 0xD9])
    }
}

// --- Identidad y perfiles ---

#[derive(Default)]
pub struct FakeIdentity {
    pub sign_up_error: Mutex<Option<AuthFailure>>,
    pub sign_in_error: Mutex<Option<AuthFailure>>,
    pub signed_out: AtomicBool,
}

impl FakeIdentity {
    fn session(email: &str) -> AuthSession {
        AuthSession { uid: format!("uid-{email}"), id_token: format!("token-{email}") }
    }
}

#[async_trait]
impl IdentityPort for FakeIdentity {
    async fn sign_up(&self, email: &str, _password: &str) -> DomainResult<AuthSession> {
        match self.sign_up_error.lock().unwrap().clone() {
            Some(failure) => Err(DomainError::Auth(failure)),
            None => Ok(Self::session(email)),
        }
    }

    async fn sign_in(&self, email: &str, _password: &str) -> DomainResult<AuthSession> {
        match self.sign_in_error.lock().unwrap().clone() {
            Some(failure) => Err(DomainError::Auth(failure)),
            None => Ok(Self::session(email)),
        }
    }

    async fn sign_out(&self) -> DomainResult<()> {
        self.signed_out.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeProfiles {
    pub written: Mutex<Vec<(String, UserProfile)>>,
    pub role: Mutex<Option<UserRole>>,
}

#[async_trait]
impl ProfileStorePort for FakeProfiles {
    async fn write_profile(&self, auth: &AuthSession, profile: &UserProfile) -> DomainResult<()> {
        self.written.lock().unwrap().push((auth.uid.clone(), profile.clone()));
        Ok(())
    }

    async fn read_role(&self, _auth: &AuthSession) -> DomainResult<Option<UserRole>> {
        Ok(*self.role.lock().unwrap())
    }
}

#[derive(Default)]
pub struct MemoryPrefs {
    pub saved: Mutex<Option<Preferences>>,
}

impl PreferenceStorePort for MemoryPrefs {
    fn load(&self) -> DomainResult<Preferences> {
        Ok(self.saved.lock().unwrap().clone().unwrap_or_default())
    }

    fn save(&self, prefs: &Preferences) -> DomainResult<()> {
        *self.saved.lock().unwrap() = Some(prefs.clone());
        Ok(())
    }
}

// --- Avisos de cambios ---

pub struct FakeFeed {
    pub tx: broadcast::Sender<Topic>,
}

impl FakeFeed {
    pub fn new() -> Arc<Self> {
        let (tx, _) = broadcast::channel(16);
        Arc::new(Self { tx })
    }
}

impl ChangeFeedPort for FakeFeed {
    fn subscribe(&self) -> broadcast::Receiver<Topic> {
        self.tx.subscribe()
    }
}
