use std::sync::Arc;

use crate::application::services::DashboardService;

/// Estado compartido para los manejadores HTTP de Axum.
#[derive(Clone)]
pub struct HttpState {
    /// Enrutador de páginas y controladores del panel.
    pub dashboard: Arc<DashboardService>,
}
