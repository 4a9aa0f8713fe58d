use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tracing::{error, info};

use super::ControllerContext;
use crate::application::poll::{Refresh, RefreshGate};
use crate::application::render::{render_alert_filters, render_alert_list};
use crate::domain::{
    alert::{AlertFilter, AlertRecord, AlertStatus},
    view::Region,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertsMode {
    /// Filtros y acciones de verificar/descartar.
    Admin,
    /// Sólo lectura.
    Personnel,
}

pub struct AlertsController {
    ctx: ControllerContext,
    mode: AlertsMode,
    filter: Mutex<AlertFilter>,
    /// Última lista cargada; los filtros se aplican sobre ella.
    loaded: Mutex<Vec<AlertRecord>>,
    gate: RefreshGate,
}

impl AlertsController {
    pub fn new(ctx: ControllerContext, mode: AlertsMode) -> Self {
        Self {
            ctx,
            mode,
            filter: Mutex::new(AlertFilter::default()),
            loaded: Mutex::new(Vec::new()),
            gate: RefreshGate::default(),
        }
    }

    pub fn filter(&self) -> AlertFilter {
        *self.filter.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Recarga tras una acción: espera a la carga en vuelo en lugar de saltarla.
    pub async fn reload(&self) {
        let _guard = self.gate.enter().await;
        self.load().await;
    }

    async fn load(&self) {
        match self.ctx.api.alerts().await {
            Ok(alerts) => {
                self.render(&alerts);
                *self.loaded.lock().unwrap_or_else(PoisonError::into_inner) = alerts;
            }
            Err(e) => {
                error!("❌ Error loading alerts: {}", e);
                self.ctx.fail("Failed to load alerts. Please refresh the page.");
            }
        }
    }

    fn render(&self, alerts: &[AlertRecord]) {
        let filter = match self.mode {
            AlertsMode::Admin => Some(self.filter()),
            AlertsMode::Personnel => None,
        };
        let view = render_alert_list(alerts, filter);
        self.ctx.views.replace(Region::AlertList, view.list);
        self.ctx.views.replace(Region::AlertCounter, view.counter);
        if let Some(filter) = filter {
            self.ctx.views.replace(Region::AlertFilters, render_alert_filters(filter));
        }
    }

    /// Cambia el filtro y repinta la lista ya cargada, sin volver a pedirla.
    pub fn set_filter(&self, filter: AlertFilter) {
        *self.filter.lock().unwrap_or_else(PoisonError::into_inner) = filter;
        let alerts = self.loaded.lock().unwrap_or_else(PoisonError::into_inner).clone();
        self.render(&alerts);
    }

    pub async fn verify(&self, id: &str) {
        match self.ctx.api.set_alert_status(id, AlertStatus::Verified).await {
            Ok(()) => {
                info!("✅ Alert {} verified", id);
                self.ctx.succeed("Alert Verified", "The alert has been marked as verified.");
                self.reload().await;
            }
            Err(e) => {
                error!("❌ Error verifying alert {}: {}", id, e);
                self.ctx.fail("Failed to verify alert. Please try again.");
            }
        }
    }

    /// Abre la confirmación; el descarte sólo ocurre si se responde "Yes".
    pub fn request_dismiss(self: &Arc<Self>, id: &str) {
        let this = self.clone();
        let id = id.to_string();
        self.ctx.notifier.confirm(
            "Confirm Dismissal",
            "Are you sure you want to dismiss this alert?",
            move |confirmed| {
                if confirmed {
                    tokio::spawn(async move { this.dismiss(&id).await });
                }
            },
        );
    }

    pub async fn dismiss(&self, id: &str) {
        match self.ctx.api.set_alert_status(id, AlertStatus::Dismissed).await {
            Ok(()) => {
                info!("🗑️ Alert {} dismissed", id);
                self.ctx.succeed("Alert Dismissed", "The alert has been dismissed.");
                self.reload().await;
            }
            Err(e) => {
                error!("❌ Error dismissing alert {}: {}", id, e);
                self.ctx.fail("Failed to dismiss alert. Please try again.");
            }
        }
    }
}

#[async_trait]
impl Refresh for AlertsController {
    fn name(&self) -> &'static str {
        match self.mode {
            AlertsMode::Admin => "admin_alerts",
            AlertsMode::Personnel => "personnel_alerts",
        }
    }

    async fn refresh(&self) {
        let Some(_guard) = self.gate.try_enter() else { return };
        self.load().await;
    }
}
