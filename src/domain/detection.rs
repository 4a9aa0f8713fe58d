use serde::{Deserialize, Serialize};

/// Nombre que el backend asigna a una cara no reconocida.
pub const UNKNOWN_NAME: &str = "Unknown";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionResult {
    #[serde(rename = "box")]
    pub bbox: [f32; 4], // x1, y1, x2, y2 in source-frame pixels
    pub name: String,
    #[serde(default)]
    pub distance: Option<f32>,
}

impl DetectionResult {
    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN_NAME
    }

    pub fn label(&self) -> String {
        let distance = self.distance.map(|d| format!("{d:.2}")).unwrap_or_default();
        format!("{} {}", self.name, distance)
    }
}

/// Cuerpo de respuesta de `/process_frame`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognitionReply {
    #[serde(default)]
    pub results: Vec<DetectionResult>,
    #[serde(default)]
    pub alarm: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Recognized { results: Vec<DetectionResult>, alarm: bool },
    /// The backend redirected instead of answering, usually an expired session.
    Redirect(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_formats_distance_with_two_decimals() {
        let det = DetectionResult { bbox: [0.0; 4], name: "Ada".into(), distance: Some(0.41234) };
        assert_eq!(det.label(), "Ada 0.41");

        let unknown = DetectionResult { bbox: [0.0; 4], name: UNKNOWN_NAME.into(), distance: None };
        assert_eq!(unknown.label(), "Unknown ");
        assert!(unknown.is_unknown());
    }

    #[test]
    fn reply_parses_box_field_and_null_distance() {
        let reply: RecognitionReply = serde_json::from_str(
            r#"{"results":[{"box":[10,20,110,220],"name":"Unknown","distance":null}],"alarm":true}"#,
        )
        .unwrap();
        assert!(reply.alarm);
        assert_eq!(reply.results[0].bbox, [10.0, 20.0, 110.0, 220.0]);
        assert_eq!(reply.results[0].distance, None);
        assert!(reply.error.is_none());
    }
}
