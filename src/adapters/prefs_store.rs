use std::path::PathBuf;

use tracing::{debug, warn};

use crate::application::ports::PreferenceStorePort;
use crate::domain::{
    errors::{DomainError, DomainResult},
    preferences::Preferences,
};

/// Preferencias en un fichero JSON.
pub struct JsonPreferenceStore {
    path: PathBuf,
}

impl JsonPreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PreferenceStorePort for JsonPreferenceStore {
    fn load(&self) -> DomainResult<Preferences> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no preferences at {}, using defaults", self.path.display());
                return Ok(Preferences::default());
            }
            Err(e) => return Err(DomainError::OperationFailed(e.to_string())),
        };
        serde_json::from_str(&raw).or_else(|e| {
            warn!("⚠️ Preferencias corruptas en {}: {}", self.path.display(), e);
            Ok(Preferences::default())
        })
    }

    fn save(&self, prefs: &Preferences) -> DomainResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| DomainError::OperationFailed(e.to_string()))?;
        }
        let raw = serde_json::to_string_pretty(prefs).map_err(|e| DomainError::InvalidInput(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| DomainError::OperationFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_and_reloads() {
        let dir = std::env::temp_dir().join(format!("prefs-{}", uuid::Uuid::new_v4()));
        let store = JsonPreferenceStore::new(dir.join("nested/prefs.json"));
        assert_eq!(store.load().unwrap(), Preferences::default());

        let mut prefs = Preferences::default();
        prefs.set_dark_mode(true);
        prefs.language_preference = "fr".into();
        store.save(&prefs).unwrap();
        assert_eq!(store.load().unwrap(), prefs);

        std::fs::write(dir.join("nested/prefs.json"), "{not json").unwrap();
        assert_eq!(store.load().unwrap(), Preferences::default());
        let _ = std::fs::remove_dir_all(dir);
    }
}
