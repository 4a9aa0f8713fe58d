// src/domain/camera.rs
use serde::{Deserialize, Serialize};

/// Dimensiones del frame que entrega la fuente de captura local.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

/// Cámara registrada en el backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CameraRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "rtspUrl", default)]
    pub rtsp_url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

impl CameraRecord {
    pub fn display_source(&self) -> &str {
        self.rtsp_url
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.source.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or("N/A")
    }

    pub fn status_or_default(&self) -> &str {
        self.status.as_deref().filter(|s| !s.is_empty()).unwrap_or("active")
    }
}

/// Payload for adding or editing a camera.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CameraDraft {
    pub name: String,
    #[serde(rename = "rtspUrl")]
    pub rtsp_url: String,
}
