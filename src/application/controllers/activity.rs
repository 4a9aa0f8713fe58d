use async_trait::async_trait;
use tracing::{debug, error};

use super::ControllerContext;
use crate::application::poll::{Refresh, RefreshGate};
use crate::application::render::render_activity_log;
use crate::domain::view::Region;

pub struct ActivityController {
    ctx: ControllerContext,
    gate: RefreshGate,
}

impl ActivityController {
    pub fn new(ctx: ControllerContext) -> Self {
        Self { ctx, gate: RefreshGate::default() }
    }
}

#[async_trait]
impl Refresh for ActivityController {
    fn name(&self) -> &'static str {
        "activity_log"
    }

    async fn refresh(&self) {
        let Some(_guard) = self.gate.try_enter() else { return };
        match self.ctx.api.activity_logs().await {
            Ok(logs) => {
                debug!("{} activity log entries", logs.len());
                let (body, counter) = render_activity_log(&logs);
                self.ctx.views.replace(Region::ActivityLog, body);
                self.ctx.views.replace(Region::LogCounter, counter);
            }
            Err(e) => {
                error!("❌ Error loading activity logs: {}", e);
                self.ctx.fail("Failed to load activity logs. Please refresh the page.");
            }
        }
    }
}
