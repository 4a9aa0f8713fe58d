use serde::{Deserialize, Serialize};

use super::alert::{DocTimestamp, ThreatLevel};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemStatus {
    pub status: String,
    pub threat_level: String,
    pub alerts_today: u64,
    pub cameras_active: String,
    pub active_cameras: u64,
    pub total_cameras: u64,
    #[serde(default)]
    pub total_detections: Option<u64>,
    #[serde(default)]
    pub last_object_detected: Option<String>,
}

impl SystemStatus {
    pub fn is_running(&self) -> bool {
        self.status == "running"
    }

    pub fn all_cameras_active(&self) -> bool {
        self.active_cameras == self.total_cameras
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ThreatConfig {
    #[serde(default)]
    pub threat_level: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub monitored_objects: Vec<String>,
}

impl ThreatConfig {
    /// `threat_level`, then `level`, then `Low`.
    pub fn effective_level(&self) -> &str {
        self.threat_level
            .as_deref()
            .filter(|l| !l.is_empty())
            .or(self.level.as_deref().filter(|l| !l.is_empty()))
            .unwrap_or("Low")
    }

    pub fn description(&self) -> &'static str {
        ThreatLevel::parse(self.effective_level())
            .map(|l| l.description())
            .unwrap_or("Unknown threat level")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LogDetections {
    List(Vec<String>),
    Text(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActivityLogEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DocTimestamp>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub camera: Option<String>,
    #[serde(default)]
    pub detections: Option<LogDetections>,
    #[serde(rename = "threatLevel", default)]
    pub threat_level: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ActivityLogEntry {
    pub fn detections_text(&self) -> String {
        match &self.detections {
            Some(LogDetections::List(items)) => items.join(", "),
            Some(LogDetections::Text(text)) if !text.is_empty() => text.clone(),
            _ => "N/A".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthReport {
    pub status: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threat_level_prefers_threat_level_then_level() {
        let cfg: ThreatConfig = serde_json::from_str(r#"{"level":"High"}"#).unwrap();
        assert_eq!(cfg.effective_level(), "High");

        let cfg: ThreatConfig = serde_json::from_str(r#"{"threat_level":"Medium","level":"High"}"#).unwrap();
        assert_eq!(cfg.effective_level(), "Medium");

        let cfg = ThreatConfig::default();
        assert_eq!(cfg.effective_level(), "Low");
        assert!(cfg.description().starts_with("System is detecting basic violations"));

        let odd = ThreatConfig { threat_level: Some("Severe".into()), ..Default::default() };
        assert_eq!(odd.description(), "Unknown threat level");
    }

    #[test]
    fn log_detections_accept_list_or_text() {
        let listed: ActivityLogEntry = serde_json::from_str(r#"{"detections":["gun","knife"]}"#).unwrap();
        assert_eq!(listed.detections_text(), "gun, knife");

        let text: ActivityLogEntry = serde_json::from_str(r#"{"detections":"person"}"#).unwrap();
        assert_eq!(text.detections_text(), "person");

        assert_eq!(ActivityLogEntry::default().detections_text(), "N/A");
    }
}
