use async_trait::async_trait;
use tracing::{error, info};

use super::ControllerContext;
use crate::application::poll::{Refresh, RefreshGate};
use crate::application::render::render_threat_panel;
use crate::domain::view::Region;

pub struct ThreatController {
    ctx: ControllerContext,
    gate: RefreshGate,
}

impl ThreatController {
    pub fn new(ctx: ControllerContext) -> Self {
        Self { ctx, gate: RefreshGate::default() }
    }
}

#[async_trait]
impl Refresh for ThreatController {
    fn name(&self) -> &'static str {
        "threat_config"
    }

    async fn refresh(&self) {
        let Some(_guard) = self.gate.try_enter() else { return };
        match self.ctx.api.threat_config().await {
            Ok(config) => {
                info!("🛡️ Threat level: {}", config.effective_level());
                self.ctx.views.replace(Region::ThreatPanel, render_threat_panel(&config));
            }
            Err(e) => error!("❌ Error loading threat configuration: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::controllers::support::context;
    use crate::application::testing::FakeBackend;
    use crate::domain::{status::ThreatConfig, view::Page};

    #[tokio::test]
    async fn falls_back_through_level_fields() {
        let api = FakeBackend::new().with(|s| {
            s.threat = ThreatConfig { threat_level: None, level: Some("High".into()), monitored_objects: vec![] }
        });
        let ctx = context(api.clone(), Page::AdminThreatConfig);
        let ctl = ThreatController::new(ctx.clone());
        ctl.refresh().await;
        let panel = ctx.views.get(Region::ThreatPanel).unwrap();
        assert!(panel.find_all(&|e| e.has_class("level-high")).len() == 1);

        api.state.lock().unwrap().threat = ThreatConfig::default();
        ctl.refresh().await;
        let panel = ctx.views.get(Region::ThreatPanel).unwrap();
        assert_eq!(panel.find_all(&|e| e.has_class("level-low")).len(), 1);

        api.state.lock().unwrap().threat.threat_level = Some("Severe".into());
        ctl.refresh().await;
        let text = ctx.views.get(Region::ThreatPanel).unwrap().text_content();
        assert!(text.ends_with("Unknown threat level"));
    }

    #[tokio::test]
    async fn failures_leave_no_dialog() {
        let api = FakeBackend::new();
        api.fail("threat_config");
        let ctx = context(api, Page::AdminThreatConfig);
        ThreatController::new(ctx.clone()).refresh().await;
        assert!(ctx.notifier.open_dialogs().is_empty());
    }
}
