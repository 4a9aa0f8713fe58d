use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tracing::{debug, error, info};

use super::ControllerContext;
use crate::application::poll::{Refresh, RefreshGate};
use crate::application::render::{render_camera_editor, render_camera_table};
use crate::domain::{
    camera::{CameraDraft, CameraRecord},
    view::Region,
};

#[derive(Default)]
struct CameraState {
    cameras: Vec<CameraRecord>,
    editing: Option<String>,
}

/// Gestión de cámaras: tabla, alta, edición, borrado y activación.
pub struct CamerasController {
    ctx: ControllerContext,
    state: Mutex<CameraState>,
    gate: RefreshGate,
}

impl CamerasController {
    pub fn new(ctx: ControllerContext) -> Self {
        Self { ctx, state: Mutex::new(CameraState::default()), gate: RefreshGate::default() }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, CameraState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn editing(&self) -> Option<String> {
        self.state().editing.clone()
    }

    pub async fn reload(&self) {
        let _guard = self.gate.enter().await;
        self.load().await;
    }

    async fn load(&self) {
        match self.ctx.api.cameras().await {
            Ok(cameras) => {
                self.ctx.views.replace(Region::CameraTable, render_camera_table(&cameras));
                self.state().cameras = cameras;
            }
            Err(e) => {
                error!("❌ Error loading cameras: {}", e);
                self.ctx.fail("Failed to load cameras. Please refresh the page.");
            }
        }
    }

    /// La cámara por defecto no se activa ni se borra: sus botones van deshabilitados.
    fn is_default(&self, id: &str) -> bool {
        self.state().cameras.iter().any(|c| c.id == id && c.is_default)
    }

    pub async fn add(&self, draft: CameraDraft) {
        match self.ctx.api.add_camera(&draft).await {
            Ok(()) => {
                info!("📷 Camera '{}' added", draft.name);
                self.ctx.succeed("Success", "New camera added successfully.");
                self.reload().await;
            }
            Err(e) => {
                error!("❌ Error adding camera: {}", e);
                self.ctx.fail("Failed to add camera. Please try again.");
            }
        }
    }

    /// Abre el editor con los datos de la cámara. Devuelve `false` si no existe.
    pub fn begin_edit(&self, id: &str) -> bool {
        let camera = {
            let mut state = self.state();
            let Some(camera) = state.cameras.iter().find(|c| c.id == id).cloned() else {
                debug!("camera {} not in table, edit ignored", id);
                return false;
            };
            state.editing = Some(camera.id.clone());
            camera
        };
        self.ctx.views.replace(Region::CameraEditor, render_camera_editor(Some(&camera)));
        true
    }

    pub fn cancel_edit(&self) {
        self.state().editing = None;
        self.ctx.views.replace(Region::CameraEditor, render_camera_editor(None));
    }

    pub async fn submit_edit(&self, draft: CameraDraft) {
        let Some(id) = self.editing() else { return };
        match self.ctx.api.update_camera(&id, &draft).await {
            Ok(()) => {
                info!("✏️ Camera {} updated", id);
                self.ctx.succeed("Success", "Camera details updated successfully.");
                self.cancel_edit();
                self.reload().await;
            }
            Err(e) => {
                error!("❌ Error updating camera {}: {}", id, e);
                self.ctx.fail("Failed to update camera. Please try again.");
            }
        }
    }

    pub async fn activate(&self, id: &str) {
        if self.is_default(id) {
            return;
        }
        match self.ctx.api.activate_camera(id).await {
            Ok(()) => {
                info!("▶️ Camera {} activated", id);
                self.ctx.succeed("Success", "Camera activated successfully.");
                self.reload().await;
            }
            Err(e) => {
                error!("❌ Error activating camera {}: {}", id, e);
                self.ctx.fail("Failed to activate camera.");
            }
        }
    }

    pub fn request_delete(self: &Arc<Self>, id: &str) {
        if self.is_default(id) {
            return;
        }
        let this = self.clone();
        let id = id.to_string();
        self.ctx.notifier.confirm(
            "Confirm Deletion",
            "Are you sure you want to delete this camera?",
            move |confirmed| {
                if confirmed {
                    tokio::spawn(async move { this.delete(&id).await });
                }
            },
        );
    }

    pub async fn delete(&self, id: &str) {
        match self.ctx.api.delete_camera(id).await {
            Ok(()) => {
                info!("🗑️ Camera {} deleted", id);
                self.ctx.succeed("Success", "Camera deleted successfully.");
                self.reload().await;
            }
            Err(e) => {
                error!("❌ Error deleting camera {}: {}", id, e);
                self.ctx.fail("Failed to delete camera.");
            }
        }
    }
}

#[async_trait]
impl Refresh for CamerasController {
    fn name(&self) -> &'static str {
        "cameras"
    }

    async fn refresh(&self) {
        let Some(_guard) = self.gate.try_enter() else { return };
        self.load().await;
    }
}
