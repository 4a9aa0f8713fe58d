use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, warn};

use super::ControllerContext;
use crate::application::poll::{Refresh, RefreshGate};
use crate::application::ports::AlarmSoundPort;
use crate::application::render::render_recent_alerts;
use crate::domain::{alert::ThreatLevel, view::Region};

pub const EVERY: Duration = Duration::from_secs(3);
pub const LIMIT: usize = 5;

/// Alertas recientes; avisa una sola vez por cada alerta High nueva.
pub struct RecentAlertsController {
    ctx: ControllerContext,
    sound: Arc<dyn AlarmSoundPort>,
    seen: Mutex<HashSet<String>>,
    gate: RefreshGate,
}

impl RecentAlertsController {
    pub fn new(ctx: ControllerContext, sound: Arc<dyn AlarmSoundPort>) -> Self {
        Self { ctx, sound, seen: Mutex::new(HashSet::new()), gate: RefreshGate::default() }
    }

    async fn load(&self) {
        let alerts = match self.ctx.api.recent_alerts(LIMIT).await {
            Ok(alerts) => alerts,
            Err(e) => {
                error!("❌ Error fetching recent alerts: {}", e);
                return;
            }
        };
        if !self.ctx.views.replace(Region::RecentAlerts, render_recent_alerts(&alerts)) {
            return;
        }

        let fresh: Vec<&str> = {
            let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
            alerts
                .iter()
                .filter(|a| a.threat_level == ThreatLevel::High)
                .filter(|a| seen.insert(a.id.clone()))
                .map(|a| a.id.as_str())
                .collect()
        };
        for id in fresh {
            warn!("🚨 High-priority alert {}", id);
            if let Err(e) = self.sound.play() {
                error!("❌ Error playing alert sound: {}", e);
            }
            self.ctx.notifier.show_modal(
                "High-Priority Alert!",
                "A new threat has been detected. Please check the alerts page.",
                "warning",
            );
        }
    }
}

#[async_trait]
impl Refresh for RecentAlertsController {
    fn name(&self) -> &'static str {
        "recent_alerts"
    }

    async fn refresh(&self) {
        let Some(_guard) = self.gate.try_enter() else { return };
        self.load().await;
    }
}
