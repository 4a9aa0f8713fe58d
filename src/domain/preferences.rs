use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEZONE: &str = "Africa/Lagos";

/// Preferencias de presentación persistidas localmente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub dark_mode: bool,
    pub theme: String,
    pub language: String,
    pub timezone: String,
    pub language_preference: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_mode: false,
            theme: "light-mode".to_string(),
            language: "en".to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            language_preference: "en".to_string(),
        }
    }
}

impl Preferences {
    pub fn set_dark_mode(&mut self, on: bool) {
        self.dark_mode = on;
        self.theme = if on { "dark-mode" } else { "light-mode" }.to_string();
    }

    pub fn is_dark(&self) -> bool {
        self.dark_mode || self.theme == "dark-mode"
    }
}

pub fn translate(lang: &str, key: &str) -> Option<&'static str> {
    match (lang, key) {
        ("en", "title") => Some("AI-BASED SURVEILLANCE SYSTEM"),
        ("en", "dark_mode") => Some("Dark Mode"),
        ("fr", "title") => Some("SYSTÈME DE SURVEILLANCE BASÉ SUR L'IA"),
        ("fr", "dark_mode") => Some("Mode Sombre"),
        _ => None,
    }
}
