use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use base64::{prelude::BASE64_STANDARD, Engine};
use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::application::poll::{PollSchedule, PollTask, Refresh, RefreshGate};
use crate::application::ports::{AlarmSoundPort, FrameSourcePort, RecognitionPort};
use crate::application::render::{render_alarm_indicator, render_alert_log, render_overlay, render_status_line};
use crate::application::view_store::ViewStore;
use crate::domain::{
    camera::FrameSize,
    detection::FrameOutcome,
    errors::DomainResult,
    view::Region,
};

/// 5 FPS hacia el backend.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CaptureState {
    Idle,
    CameraRequested,
    CameraReady,
    Capturing,
    Awaiting,
    Rendering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmTransition {
    Raised,
    Held,
    Cleared,
    Quiet,
}

/// Detecta los flancos de la señal de alarma.
#[derive(Debug, Default)]
pub struct AlarmLatch {
    active: bool,
}

impl AlarmLatch {
    pub fn observe(&mut self, alarm: bool) -> AlarmTransition {
        let transition = match (self.active, alarm) {
            (false, true) => AlarmTransition::Raised,
            (true, true) => AlarmTransition::Held,
            (true, false) => AlarmTransition::Cleared,
            (false, false) => AlarmTransition::Quiet,
        };
        self.active = alarm;
        transition
    }

    /// Returns whether the alarm was active.
    pub fn reset(&mut self) -> bool {
        std::mem::take(&mut self.active)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Debug, Clone)]
pub struct AlertLogEntry {
    pub kind: String,
    pub message: String,
    pub at: DateTime<Local>,
}

/// Registro local de alertas, más reciente primero.
#[derive(Debug, Default)]
pub struct AlertLog {
    entries: VecDeque<AlertLogEntry>,
}

impl AlertLog {
    pub const CAPACITY: usize = 5;

    pub fn push(&mut self, kind: &str, message: &str) {
        self.entries.push_front(AlertLogEntry {
            kind: kind.to_string(),
            message: message.to_string(),
            at: Local::now(),
        });
        self.entries.truncate(Self::CAPACITY);
    }

    pub fn iter(&self) -> impl Iterator<Item = &AlertLogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

struct CaptureInner {
    state: CaptureState,
    /// Sube en cada `teardown`; un tick de una época anterior no escribe nada.
    epoch: u64,
    camera_attempted: bool,
    frame: Option<FrameSize>,
    latch: AlarmLatch,
    log: AlertLog,
}

/// Bucle de captura: frame → backend → cajas + alarma.
pub struct CaptureLoop {
    source: Arc<dyn FrameSourcePort>,
    recognizer: Arc<dyn RecognitionPort>,
    sound: Arc<dyn AlarmSoundPort>,
    views: Arc<ViewStore>,
    inner: Mutex<CaptureInner>,
    gate: RefreshGate,
    period: Duration,
}

impl CaptureLoop {
    pub fn new(
        source: Arc<dyn FrameSourcePort>,
        recognizer: Arc<dyn RecognitionPort>,
        sound: Arc<dyn AlarmSoundPort>,
        views: Arc<ViewStore>,
        period: Duration,
    ) -> Self {
        Self {
            source,
            recognizer,
            sound,
            views,
            inner: Mutex::new(CaptureInner {
                state: CaptureState::Idle,
                epoch: 0,
                camera_attempted: false,
                frame: None,
                latch: AlarmLatch::default(),
                log: AlertLog::default(),
            }),
            gate: RefreshGate::default(),
            period,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CaptureInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> CaptureState {
        self.lock().state
    }

    pub fn alarm_active(&self) -> bool {
        self.lock().latch.is_active()
    }

    pub fn alert_log_len(&self) -> usize {
        self.lock().log.len()
    }

    /// Arranca el bucle como tarea gestionada.
    pub fn spawn(self: &Arc<Self>) -> PollTask {
        PollTask::spawn(self.clone(), PollSchedule::every(self.period), None)
    }

    /// Vuelve a `Idle` al desmontar la página: para el sonido y limpia el estado.
    pub fn teardown(&self) {
        let mut inner = self.lock();
        inner.epoch += 1;
        inner.state = CaptureState::Idle;
        inner.camera_attempted = false;
        inner.frame = None;
        inner.latch.reset();
        inner.log.clear();
        self.sound.stop();
    }

    /// Idle → CameraRequested → CameraReady, o de vuelta a Idle si se deniega.
    pub async fn start_camera(&self) -> bool {
        let epoch = {
            let mut inner = self.lock();
            inner.state = CaptureState::CameraRequested;
            inner.camera_attempted = true;
            inner.epoch
        };
        let opened = self.source.open().await;

        let mut inner = self.lock();
        if inner.epoch != epoch {
            debug!("camera opened after teardown, discarding");
            return false;
        }
        match opened {
            Ok(size) => {
                inner.frame = Some(size);
                inner.state = CaptureState::CameraReady;
                drop(inner);
                info!("📷 Camera ready at {}x{}", size.width, size.height);
                self.views
                    .replace(Region::CaptureStatus, render_status_line("Camera Ready. Processing frames..."));
                true
            }
            Err(e) => {
                inner.state = CaptureState::Idle;
                drop(inner);
                error!("❌ Error accessing camera: {}", e);
                self.views
                    .replace(Region::CaptureStatus, render_status_line("Error: Could not access camera."));
                false
            }
        }
    }

    /// Un tick: captura, envía y pinta. Cada tick es un intento independiente.
    pub async fn tick(&self) {
        let (state, attempted) = {
            let inner = self.lock();
            (inner.state, inner.camera_attempted)
        };
        match state {
            CaptureState::Idle if !attempted => {
                if !self.start_camera().await {
                    return;
                }
            }
            CaptureState::CameraReady => {}
            _ => return,
        }

        let epoch = {
            let mut inner = self.lock();
            if inner.state != CaptureState::CameraReady {
                return;
            }
            inner.state = CaptureState::Capturing;
            inner.epoch
        };
        let jpeg = match self.source.grab_jpeg().await {
            Ok(jpeg) => jpeg,
            Err(e) => {
                warn!("Error capturando frame: {}", e);
                let mut inner = self.lock();
                if inner.epoch == epoch {
                    inner.state = CaptureState::CameraReady;
                }
                return;
            }
        };
        let image = format!("data:image/jpeg;base64,{}", BASE64_STANDARD.encode(jpeg));

        {
            let mut inner = self.lock();
            if inner.epoch != epoch {
                return;
            }
            inner.state = CaptureState::Awaiting;
        }
        let outcome = self.recognizer.process_frame(image).await;

        {
            let mut inner = self.lock();
            if inner.epoch != epoch {
                debug!("stale frame reply after teardown, dropped");
                return;
            }
            inner.state = CaptureState::Rendering;
        }
        self.apply(outcome);

        let mut inner = self.lock();
        if inner.epoch == epoch && inner.state == CaptureState::Rendering {
            inner.state = CaptureState::CameraReady;
        }
    }

    pub fn apply(&self, outcome: DomainResult<FrameOutcome>) {
        match outcome {
            Ok(FrameOutcome::Redirect(location)) => {
                info!("↪️ Backend redirected to {}, following", location);
                self.views.navigate(&location);
            }
            Ok(FrameOutcome::Recognized { results, alarm }) => {
                let mut inner = self.lock();
                let frame = inner.frame.unwrap_or(FrameSize { width: 0, height: 0 });
                self.views.replace(Region::VideoOverlay, render_overlay(&results, frame));
                if results.is_empty() {
                    self.views.replace(Region::CaptureStatus, render_status_line("No faces detected."));
                }

                match inner.latch.observe(alarm) {
                    AlarmTransition::Raised => {
                        self.views.replace(Region::AlarmIndicator, render_alarm_indicator(true));
                        if !self.sound.is_playing() {
                            if let Err(e) = self.sound.play() {
                                error!("❌ Error playing sound: {}", e);
                            }
                        }
                    }
                    AlarmTransition::Held => {}
                    AlarmTransition::Cleared => {
                        self.views.replace(Region::AlarmIndicator, render_alarm_indicator(false));
                        self.sound.stop();
                    }
                    AlarmTransition::Quiet => {
                        self.views.replace(Region::AlarmIndicator, render_alarm_indicator(false));
                    }
                }

                if alarm {
                    inner.log.push("danger", "Unknown person detected!");
                    self.views.replace(Region::AlertLog, render_alert_log(inner.log.iter()));
                }
            }
            Err(e) => {
                error!("❌ Frame request failed: {}", e);
                let mut inner = self.lock();
                let frame = inner.frame.unwrap_or(FrameSize { width: 0, height: 0 });
                self.views.replace(Region::VideoOverlay, render_overlay(&[], frame));
                self.views.replace(Region::CaptureStatus, render_status_line(&e.status_text()));
                self.views.replace(Region::AlarmIndicator, render_alarm_indicator(false));
                if inner.latch.reset() || self.sound.is_playing() {
                    self.sound.stop();
                }
            }
        }
    }
}

#[async_trait]
impl Refresh for CaptureLoop {
    fn name(&self) -> &'static str {
        "capture"
    }

    async fn refresh(&self) {
        let Some(_guard) = self.gate.try_enter() else { return };
        self.tick().await;
    }
}
