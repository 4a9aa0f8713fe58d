use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info};

use crate::application::dto::PreferencesUpdate;
use crate::application::notify::Notifier;
use crate::application::poll::Refresh;
use crate::application::ports::PreferenceStorePort;
use crate::application::render::{render_chrome, render_clock, render_settings};
use crate::application::view_store::ViewStore;
use crate::domain::{preferences::Preferences, view::Region};

/// El reloj se repinta cada segundo.
pub const CLOCK_EVERY: Duration = Duration::from_secs(1);

/// Tema, idioma y zona horaria; persistidos en el almacén local.
pub struct PreferencesController {
    store: Arc<dyn PreferenceStorePort>,
    views: Arc<ViewStore>,
    notifier: Arc<Notifier>,
    current: Mutex<Preferences>,
}

impl PreferencesController {
    pub fn new(store: Arc<dyn PreferenceStorePort>, views: Arc<ViewStore>, notifier: Arc<Notifier>) -> Self {
        let current = store.load().unwrap_or_else(|e| {
            error!("❌ Error loading preferences, using defaults: {}", e);
            Preferences::default()
        });
        Self { store, views, notifier, current: Mutex::new(current) }
    }

    pub fn current(&self) -> Preferences {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Pinta el marco y, si está montado, el panel de ajustes.
    pub fn render(&self) {
        let prefs = self.current();
        self.views.replace(Region::Chrome, render_chrome(&prefs));
        self.views.replace(Region::Clock, render_clock(Utc::now(), &prefs.timezone));
        self.views.replace(Region::SettingsPanel, render_settings(&prefs));
    }

    pub fn render_clock(&self) {
        let timezone = self.current.lock().unwrap_or_else(PoisonError::into_inner).timezone.clone();
        self.views.replace(Region::Clock, render_clock(Utc::now(), &timezone));
    }

    fn persist(&self, prefs: &Preferences) -> bool {
        match self.store.save(prefs) {
            Ok(()) => true,
            Err(e) => {
                error!("❌ Error saving preferences: {}", e);
                false
            }
        }
    }

    pub fn update(&self, update: PreferencesUpdate) -> Preferences {
        let prefs = {
            let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(dark) = update.dark_mode {
                current.set_dark_mode(dark);
            }
            if let Some(language) = update.language.filter(|l| !l.is_empty()) {
                current.language = language;
            }
            if let Some(timezone) = update.timezone.filter(|t| !t.is_empty()) {
                current.timezone = timezone;
            }
            current.clone()
        };
        self.persist(&prefs);
        info!(
            "🎨 Preferences updated (theme {}, language {}, timezone {})",
            prefs.theme, prefs.language, prefs.timezone
        );
        self.render();
        prefs
    }

    pub fn save_language_preference(&self, language: &str) {
        let prefs = {
            let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            current.language_preference = language.to_string();
            current.clone()
        };
        if self.persist(&prefs) {
            info!("🌐 Applying language: {}", language);
            self.notifier.show_modal("Success", "Language preference saved.", "success");
        }
        self.render();
    }
}

#[async_trait]
impl Refresh for PreferencesController {
    fn name(&self) -> &'static str {
        "clock"
    }

    async fn refresh(&self) {
        self.render_clock();
    }
}
