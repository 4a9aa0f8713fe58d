use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::info;

use crate::adapters::v4l2::capture::encode_jpeg;
use crate::application::ports::FrameSourcePort;
use crate::domain::{
    camera::FrameSize,
    errors::{DomainError, DomainResult},
};

/// Repite una imagen fija como si fuera la cámara. Útil sin hardware.
pub struct StillImageSource {
    path: PathBuf,
    frame: Mutex<Option<Vec<u8>>>,
}

impl StillImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), frame: Mutex::new(None) }
    }
}

#[async_trait]
impl FrameSourcePort for StillImageSource {
    async fn open(&self) -> DomainResult<FrameSize> {
        let path = self.path.clone();
        let (jpeg, size) = tokio::task::spawn_blocking(move || {
            let rgb = image::open(&path)?.to_rgb8();
            let size = FrameSize { width: rgb.width(), height: rgb.height() };
            Ok::<_, anyhow::Error>((encode_jpeg(&rgb)?, size))
        })
        .await
        .map_err(|e| DomainError::OperationFailed(e.to_string()))?
        .map_err(|e| DomainError::OperationFailed(format!("{}: {e}", self.path.display())))?;

        info!("🖼️ Still frame source {} ({}x{})", self.path.display(), size.width, size.height);
        *self.frame.lock().unwrap_or_else(PoisonError::into_inner) = Some(jpeg);
        Ok(size)
    }

    async fn grab_jpeg(&self) -> DomainResult<Vec<u8>> {
        self.frame
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| DomainError::InvalidInput("camera not open".into()))
    }
}

/// Sin cámara configurada: se comporta como un permiso denegado.
pub struct NoCamera;

#[async_trait]
impl FrameSourcePort for NoCamera {
    async fn open(&self) -> DomainResult<FrameSize> {
        Err(DomainError::NotFound("no frame source configured".into()))
    }

    async fn grab_jpeg(&self) -> DomainResult<Vec<u8>> {
        Err(DomainError::NotFound("no frame source configured".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn still_image_reports_native_size() {
        let path = std::env::temp_dir().join(format!("still-{}.png", uuid::Uuid::new_v4()));
        image::RgbImage::new(32, 24).save(&path).unwrap();

        let source = StillImageSource::new(&path);
        assert!(source.grab_jpeg().await.is_err());
        let size = source.open().await.unwrap();
        assert_eq!((size.width, size.height), (32, 24));
        assert_eq!(&source.grab_jpeg().await.unwrap()[..2], &[0xFF, 0xD8]);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn missing_camera_fails_open() {
        assert!(NoCamera.open().await.is_err());
    }
}
