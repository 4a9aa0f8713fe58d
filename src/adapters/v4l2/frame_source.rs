use std::sync::{mpsc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{error, info};

use super::capture::{CaptureConfig, V4l2Capture};
use crate::application::ports::FrameSourcePort;
use crate::domain::{
    camera::FrameSize,
    errors::{DomainError, DomainResult},
};

type Grab = oneshot::Sender<DomainResult<Vec<u8>>>;

/// Fuente de frames V4L2. El dispositivo vive en un hilo dedicado
/// y atiende peticiones de captura por canal.
pub struct V4l2FrameSource {
    cfg: CaptureConfig,
    worker: Mutex<Option<(mpsc::Sender<Grab>, FrameSize)>>,
}

impl V4l2FrameSource {
    pub fn new(cfg: CaptureConfig) -> Self {
        Self { cfg, worker: Mutex::new(None) }
    }

    fn sender(&self) -> Option<mpsc::Sender<Grab>> {
        self.worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|(tx, _)| tx.clone())
    }
}

#[async_trait]
impl FrameSourcePort for V4l2FrameSource {
    async fn open(&self) -> DomainResult<FrameSize> {
        if let Some((_, size)) = self.worker.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
            return Ok(*size);
        }

        let (ready_tx, ready_rx) = oneshot::channel();
        let (grab_tx, grab_rx) = mpsc::channel::<Grab>();
        let cfg = self.cfg.clone();

        std::thread::spawn(move || {
            let mut capture = match V4l2Capture::open(&cfg) {
                Ok(capture) => capture,
                Err(e) => {
                    let _ = ready_tx.send(Err(DomainError::OperationFailed(e.to_string())));
                    return;
                }
            };
            let (width, height) = capture.size();
            let _ = ready_tx.send(Ok(FrameSize { width, height }));
            info!("Capture worker: hilo de captura iniciado en {}", cfg.camera_path);

            // Termina cuando se sueltan todos los emisores
            while let Ok(reply) = grab_rx.recv() {
                let frame = capture
                    .next_jpeg()
                    .map_err(|e| DomainError::OperationFailed(e.to_string()));
                let _ = reply.send(frame);
            }
            info!("Capture worker: hilo de captura terminado");
        });

        let size = ready_rx
            .await
            .map_err(|_| DomainError::OperationFailed("capture worker died".into()))?
            .inspect_err(|e| error!("❌ No se pudo abrir {}: {}", self.cfg.camera_path, e))?;
        *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some((grab_tx, size));
        Ok(size)
    }

    async fn grab_jpeg(&self) -> DomainResult<Vec<u8>> {
        let tx = self
            .sender()
            .ok_or_else(|| DomainError::InvalidInput("camera not open".into()))?;
        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(reply_tx)
            .map_err(|_| DomainError::OperationFailed("capture worker stopped".into()))?;
        reply_rx
            .await
            .map_err(|_| DomainError::OperationFailed("capture worker stopped".into()))?
    }
}
