use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::ControllerContext;
use crate::application::poll::{Refresh, RefreshGate};
use crate::application::render::render_health;
use crate::domain::view::Region;

pub const EVERY: Duration = Duration::from_secs(30);

/// Indicador de salud global; vive en todas las páginas.
pub struct HealthController {
    ctx: ControllerContext,
    gate: RefreshGate,
}

impl HealthController {
    pub fn new(ctx: ControllerContext) -> Self {
        Self { ctx, gate: RefreshGate::default() }
    }
}

#[async_trait]
impl Refresh for HealthController {
    fn name(&self) -> &'static str {
        "health"
    }

    async fn refresh(&self) {
        let Some(_guard) = self.gate.try_enter() else { return };
        let view = match self.ctx.api.health().await {
            Ok(report) => {
                debug!("health: {}", report.status);
                render_health(Some(&report))
            }
            Err(e) => {
                warn!("⚠️ Health check failed: {}", e);
                render_health(None)
            }
        };
        self.ctx.views.replace(Region::HealthIndicator, view);
    }
}
