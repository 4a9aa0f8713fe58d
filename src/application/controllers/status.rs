use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use super::ControllerContext;
use crate::application::poll::{Refresh, RefreshGate};
use crate::application::render::render_system_status;

pub const EVERY: Duration = Duration::from_secs(5);

pub struct StatusController {
    ctx: ControllerContext,
    gate: RefreshGate,
}

impl StatusController {
    pub fn new(ctx: ControllerContext) -> Self {
        Self { ctx, gate: RefreshGate::default() }
    }

    async fn load(&self) {
        match self.ctx.api.system_status().await {
            Ok(status) => {
                debug!("status: {} ({})", status.status, status.threat_level);
                for (region, view) in render_system_status(&status) {
                    self.ctx.views.replace(region, view);
                }
            }
            // Sólo se registra; el panel conserva el último valor.
            Err(e) => error!("❌ Error fetching system status: {}", e),
        }
    }
}

#[async_trait]
impl Refresh for StatusController {
    fn name(&self) -> &'static str {
        "status"
    }

    async fn refresh(&self) {
        let Some(_guard) = self.gate.try_enter() else { return };
        self.load().await;
    }
}
