use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info};

use crate::application::ports::AlarmSoundPort;
use crate::domain::errors::{DomainError, DomainResult};

/// Sonido de alarma reproducido con un reproductor externo (`aplay` por defecto).
pub struct AplayAlarm {
    player: String,
    args: Vec<String>,
    child: Mutex<Option<Child>>,
}

impl AplayAlarm {
    pub fn new(sound_file: impl Into<PathBuf>) -> Self {
        let file = sound_file.into().to_string_lossy().to_string();
        Self::with_player("aplay", vec!["-q".to_string(), file])
    }

    pub fn with_player(player: &str, args: Vec<String>) -> Self {
        Self { player: player.to_string(), args, child: Mutex::new(None) }
    }

    fn child(&self) -> MutexGuard<'_, Option<Child>> {
        self.child.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Limpia el proceso si ya terminó. Devuelve si sigue sonando.
fn still_running(slot: &mut Option<Child>) -> bool {
    let Some(child) = slot.as_mut() else { return false };
    match child.try_wait() {
        Ok(None) => true,
        Ok(Some(_)) => {
            *slot = None;
            false
        }
        Err(e) => {
            error!("❌ Error polling alarm player: {}", e);
            *slot = None;
            false
        }
    }
}

impl AlarmSoundPort for AplayAlarm {
    fn play(&self) -> DomainResult<()> {
        let mut slot = self.child();
        if still_running(&mut slot) {
            return Ok(());
        }
        let child = Command::new(&self.player)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| DomainError::OperationFailed(format!("{}: {e}", self.player)))?;
        info!("🔊 Alarm sound started (pid {})", child.id());
        *slot = Some(child);
        Ok(())
    }

    fn stop(&self) {
        let Some(mut child) = self.child().take() else { return };
        if let Err(e) = child.kill() {
            debug!("alarm player already gone: {}", e);
        }
        let _ = child.wait();
        info!("🔇 Alarm sound stopped");
    }

    fn is_playing(&self) -> bool {
        still_running(&mut self.child())
    }
}

impl Drop for AplayAlarm {
    fn drop(&mut self) {
        self.stop();
    }
}
