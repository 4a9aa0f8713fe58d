use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{anyhow, Context};
use tracing::{info, warn};

use crate::adapters::firebase::FirebaseSettings;
use crate::adapters::v4l2::capture::CaptureConfig;

/// Origen de los frames de la cámara local.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameSourceSpec {
    V4l2(String),
    File(PathBuf),
    None,
}

impl FromStr for FrameSourceSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("v4l2", path)) if !path.is_empty() => Ok(Self::V4l2(path.to_string())),
            Some(("file", path)) if !path.is_empty() => Ok(Self::File(PathBuf::from(path))),
            None if s == "none" => Ok(Self::None),
            _ => Err(format!("expected v4l2:<device>, file:<path> or none, got '{s}'")),
        }
    }
}

pub struct Config {
    pub port: u16,
    pub backend_url: String,
    pub http_timeout: Duration,
    pub frame_source: FrameSourceSpec,
    pub fourcc: String,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub frame_interval: Duration,
    pub alarm_sound: PathBuf,
    pub prefs_path: PathBuf,
    pub static_dir: PathBuf,
    pub change_poll: Duration,
    pub firebase: FirebaseSettings,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self {
            port: try_load("DASHBOARD_PORT", "8090")?,
            backend_url: try_load("DASHBOARD_BACKEND_URL", "http://127.0.0.1:5000")?,
            http_timeout: Duration::from_secs(try_load("DASHBOARD_HTTP_TIMEOUT_SECS", "30")?),
            frame_source: try_load("DASHBOARD_FRAME_SOURCE", "v4l2:/dev/video0")?,
            fourcc: try_load("DASHBOARD_CAMERA_FOURCC", "MJPG")?,
            width: try_load("DASHBOARD_CAMERA_WIDTH", "640")?,
            height: try_load("DASHBOARD_CAMERA_HEIGHT", "480")?,
            fps: try_load("DASHBOARD_CAMERA_FPS", "30")?,
            frame_interval: Duration::from_millis(try_load("DASHBOARD_FRAME_INTERVAL_MS", "200")?),
            alarm_sound: try_load("DASHBOARD_ALARM_SOUND", "static/alarm.wav")?,
            prefs_path: try_load("DASHBOARD_PREFS_PATH", "dashboard_prefs.json")?,
            static_dir: try_load("DASHBOARD_STATIC_DIR", "static")?,
            change_poll: Duration::from_secs(try_load("DASHBOARD_CHANGE_POLL_SECS", "5")?),
            firebase: FirebaseSettings {
                api_key: require("FIREBASE_API_KEY")?,
                project_id: require("FIREBASE_PROJECT_ID")?,
                app_id: try_load("FIREBASE_APP_ID", "default-app-id")?,
                identity_url: try_load("FIREBASE_IDENTITY_URL", "https://identitytoolkit.googleapis.com/v1")?,
                token_url: try_load("FIREBASE_TOKEN_URL", "https://securetoken.googleapis.com/v1")?,
                firestore_url: try_load("FIREBASE_FIRESTORE_URL", "https://firestore.googleapis.com/v1")?,
            },
        })
    }

    pub fn capture(&self, camera_path: &str) -> CaptureConfig {
        CaptureConfig {
            camera_path: camera_path.to_string(),
            fourcc: self.fourcc.clone(),
            width: self.width,
            height: self.height,
            fps: self.fps,
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            anyhow!("Environment misconfigured: {key}: {e}")
        })
}

fn require(key: &str) -> anyhow::Result<String> {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("{key} must be set"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_source_specs_parse() {
        assert_eq!("v4l2:/dev/video2".parse(), Ok(FrameSourceSpec::V4l2("/dev/video2".into())));
        assert_eq!("file:demo.jpg".parse(), Ok(FrameSourceSpec::File("demo.jpg".into())));
        assert_eq!("none".parse(), Ok(FrameSourceSpec::None));
        assert!("v4l2:".parse::<FrameSourceSpec>().is_err());
        assert!("usb".parse::<FrameSourceSpec>().is_err());
    }

    #[test]
    fn defaults_parse_into_their_types() {
        let port: u16 = try_load("DASHBOARD_TEST_UNSET_PORT", "8090").unwrap();
        assert_eq!(port, 8090);
        assert!(try_load::<u16>("DASHBOARD_TEST_UNSET_PORT", "eighty").is_err());
        assert!(require("DASHBOARD_TEST_UNSET_KEY").is_err());
    }
}
