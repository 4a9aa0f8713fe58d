//! Un controlador por región: carga un endpoint y reemplaza su vista.

pub mod activity;
pub mod alerts;
pub mod cameras;
pub mod health;
pub mod recent;
pub mod status;
pub mod threat;

use std::sync::Arc;

use crate::application::notify::Notifier;
use crate::application::ports::BackendPort;
use crate::application::view_store::ViewStore;

/// Lo que todo controlador necesita para hablar con el backend y pintar.
#[derive(Clone)]
pub struct ControllerContext {
    pub api: Arc<dyn BackendPort>,
    pub views: Arc<ViewStore>,
    pub notifier: Arc<Notifier>,
}

impl ControllerContext {
    pub fn new(api: Arc<dyn BackendPort>, views: Arc<ViewStore>) -> Self {
        let notifier = Arc::new(Notifier::new(views.clone()));
        Self { api, views, notifier }
    }

    pub(crate) fn fail(&self, message: &str) {
        self.notifier.show_modal("Error", message, "error");
    }

    pub(crate) fn succeed(&self, title: &str, message: &str) {
        self.notifier.show_modal(title, message, "success");
    }
}

#[cfg(test)]
pub(crate) mod support {
    use super::*;
    use crate::domain::view::Page;

    pub fn context(api: Arc<dyn BackendPort>, page: Page) -> ControllerContext {
        let views = Arc::new(ViewStore::new());
        views.mount(page);
        ControllerContext::new(api, views)
    }

    /// Deja correr las tareas lanzadas desde callbacks de diálogo.
    pub async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }
}
