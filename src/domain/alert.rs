use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
}

impl ThreatLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Low" => Some(Self::Low),
            "Medium" => Some(Self::Medium),
            "High" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "System is detecting basic violations like missing masks or improper face coverings.",
            Self::Medium => "System is in normal monitoring mode with standard threat detection.",
            Self::High => "System has detected weapons, dangerous items, or other high-priority security threats.",
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Unverified,
    Verified,
    Dismissed,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unverified => "unverified",
            Self::Verified => "verified",
            Self::Dismissed => "dismissed",
        }
    }
}

impl FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unverified" => Ok(Self::Unverified),
            "verified" => Ok(Self::Verified),
            "dismissed" => Ok(Self::Dismissed),
            other => Err(format!("unknown alert status: {other}")),
        }
    }
}

/// Filtro de la lista de alertas del administrador.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertFilter {
    All,
    Only(AlertStatus),
}

impl Default for AlertFilter {
    fn default() -> Self {
        AlertFilter::Only(AlertStatus::Unverified)
    }
}

impl AlertFilter {
    pub fn matches(&self, alert: &AlertRecord) -> bool {
        match self {
            AlertFilter::All => true,
            AlertFilter::Only(status) => alert.status == *status,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertFilter::All => "all",
            AlertFilter::Only(status) => status.as_str(),
        }
    }
}

impl FromStr for AlertFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(AlertFilter::All);
        }
        s.parse().map(AlertFilter::Only)
    }
}

/// Marca de tiempo en el formato del almacén de documentos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocTimestamp {
    pub seconds: i64,
    #[serde(default)]
    pub nanoseconds: u32,
}

impl DocTimestamp {
    pub fn to_local(&self) -> Option<DateTime<Local>> {
        Local.timestamp_opt(self.seconds, self.nanoseconds).single()
    }
}

/// Renders an optional timestamp, `N/A` when missing or out of range.
pub fn format_time(ts: Option<&DocTimestamp>) -> String {
    ts.and_then(DocTimestamp::to_local)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn format_date_time(ts: Option<&DocTimestamp>) -> String {
    ts.and_then(DocTimestamp::to_local)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    #[serde(default)]
    pub timestamp: Option<DocTimestamp>,
    pub camera: String,
    #[serde(default)]
    pub detections: Vec<String>,
    #[serde(rename = "threatLevel")]
    pub threat_level: ThreatLevel,
    pub status: AlertStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(id: &str, status: AlertStatus) -> AlertRecord {
        AlertRecord {
            id: id.into(),
            timestamp: None,
            camera: "Lobby".into(),
            detections: vec!["knife".into()],
            threat_level: ThreatLevel::High,
            status,
        }
    }

    #[test]
    fn filter_defaults_to_unverified() {
        let filter = AlertFilter::default();
        assert!(filter.matches(&alert("a", AlertStatus::Unverified)));
        assert!(!filter.matches(&alert("b", AlertStatus::Verified)));
        assert!(AlertFilter::All.matches(&alert("c", AlertStatus::Dismissed)));
    }

    #[test]
    fn filter_parses_from_button_tags() {
        assert_eq!("all".parse::<AlertFilter>().unwrap(), AlertFilter::All);
        assert_eq!(
            "dismissed".parse::<AlertFilter>().unwrap(),
            AlertFilter::Only(AlertStatus::Dismissed)
        );
        assert!("archived".parse::<AlertFilter>().is_err());
    }

    #[test]
    fn record_parses_backend_shape() {
        let raw = r#"{"id":"x1","timestamp":{"seconds":1700000000,"nanoseconds":5},
            "camera":"Gate","detections":["gun","person"],"threatLevel":"High","status":"unverified"}"#;
        let rec: AlertRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(rec.threat_level, ThreatLevel::High);
        assert_eq!(rec.timestamp.unwrap().seconds, 1_700_000_000);
        assert_ne!(format_time(rec.timestamp.as_ref()), "N/A");
        assert_eq!(format_time(None), "N/A");
    }
}
