use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::application::render::{render_message, render_modals};
use crate::application::view_store::ViewStore;
use crate::domain::view::Region;

/// Mensajes en línea desaparecen tras este tiempo.
pub const MESSAGE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogKind {
    Notice,
    Confirm,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dialog {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: DialogKind,
    pub tone: String,
}

type ConfirmCallback = Box<dyn FnOnce(bool) + Send>;

struct OpenDialog {
    dialog: Dialog,
    on_answer: Option<ConfirmCallback>,
}

/// Toasts y diálogos. Sin cola: cada llamada abre un nodo independiente.
pub struct Notifier {
    views: Arc<ViewStore>,
    open: Mutex<BTreeMap<u128, OpenDialog>>,
    seq: Mutex<u128>,
    /// Último mensaje mostrado por región; sólo ese se desvanece.
    shown: Arc<Mutex<HashMap<Region, u64>>>,
}

impl Notifier {
    pub fn new(views: Arc<ViewStore>) -> Self {
        Self {
            views,
            open: Mutex::new(BTreeMap::new()),
            seq: Mutex::new(0),
            shown: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn show_modal(&self, title: &str, message: &str, tone: &str) -> Uuid {
        self.open_dialog(title, message, tone, DialogKind::Notice, None)
    }

    /// `on_answer` recibe `true` (Yes) o `false` (No). Cerrar con ✕ no lo invoca.
    pub fn confirm<F>(&self, title: &str, message: &str, on_answer: F) -> Uuid
    where
        F: FnOnce(bool) + Send + 'static,
    {
        self.open_dialog(title, message, "confirm", DialogKind::Confirm, Some(Box::new(on_answer)))
    }

    fn open_dialog(
        &self,
        title: &str,
        message: &str,
        tone: &str,
        kind: DialogKind,
        on_answer: Option<ConfirmCallback>,
    ) -> Uuid {
        let dialog = Dialog {
            id: Uuid::new_v4(),
            title: title.to_string(),
            message: message.to_string(),
            kind,
            tone: tone.to_string(),
        };
        let id = dialog.id;
        let key = {
            let mut seq = self.seq.lock().unwrap_or_else(PoisonError::into_inner);
            *seq += 1;
            *seq
        };
        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, OpenDialog { dialog, on_answer });
        self.render();
        id
    }

    /// Responde a un diálogo. `None` = botón cerrar/OK.
    /// Devuelve `false` si el diálogo ya no existe.
    pub fn answer(&self, id: Uuid, confirmed: Option<bool>) -> bool {
        let removed = {
            let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
            let key = open.iter().find(|(_, d)| d.dialog.id == id).map(|(k, _)| *k);
            key.and_then(|k| open.remove(&k))
        };
        let Some(open) = removed else {
            debug!("dialog {id} already closed");
            return false;
        };
        self.render();
        if let (Some(answer), Some(callback)) = (confirmed, open.on_answer) {
            callback(answer);
        }
        true
    }

    /// Tecla Escape: cierra todo sin invocar callbacks.
    pub fn close_all(&self) {
        self.open.lock().unwrap_or_else(PoisonError::into_inner).clear();
        self.render();
    }

    pub fn open_dialogs(&self) -> Vec<Dialog> {
        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|d| d.dialog.clone())
            .collect()
    }

    fn render(&self) {
        let dialogs = self.open_dialogs();
        self.views.replace(Region::Modals, render_modals(&dialogs));
    }

    /// Inline message in `region` that fades out after [`MESSAGE_TTL`].
    pub fn show_message(&self, region: Region, text: &str) {
        if !self.views.replace(region, render_message(text, true)) {
            return;
        }
        let generation = {
            let mut shown = self.shown.lock().unwrap_or_else(PoisonError::into_inner);
            let slot = shown.entry(region).or_insert(0);
            *slot += 1;
            *slot
        };
        let views = self.views.clone();
        let shown = self.shown.clone();
        let text = text.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(MESSAGE_TTL).await;
            let current = shown.lock().unwrap_or_else(PoisonError::into_inner).get(&region).copied();
            if current == Some(generation) {
                views.replace(region, render_message(&text, false));
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::view::Page;
    use std::sync::atomic::{AtomicU8, Ordering};

    fn notifier() -> (Arc<ViewStore>, Notifier) {
        let views = Arc::new(ViewStore::new());
        let notifier = Notifier::new(views.clone());
        (views, notifier)
    }

    #[test]
    fn dialogs_stack_independently() {
        let (views, n) = notifier();
        let first = n.show_modal("Error", "Failed to load alerts. Please refresh the page.", "error");
        n.show_modal("Success", "Camera deleted successfully.", "success");
        assert_eq!(views.get(Region::Modals).unwrap().find_all(&|e| e.has_class("custom-modal")).len(), 2);

        assert!(n.answer(first, None));
        assert!(!n.answer(first, None));
        let remaining = n.open_dialogs();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "Success");
    }

    #[test]
    fn confirm_invokes_callback_with_answer_only_once() {
        let (_, n) = notifier();
        let seen = Arc::new(AtomicU8::new(0));
        let flag = seen.clone();
        let id = n.confirm("Confirm Dismissal", "Are you sure?", move |yes| {
            flag.store(if yes { 1 } else { 2 }, Ordering::SeqCst);
        });
        assert!(n.answer(id, Some(false)));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert!(!n.answer(id, Some(true)));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn closing_a_confirm_skips_the_callback() {
        let (_, n) = notifier();
        let seen = Arc::new(AtomicU8::new(0));
        let flag = seen.clone();
        let id = n.confirm("Confirm Deletion", "Delete?", move |_| flag.store(9, Ordering::SeqCst));
        n.answer(id, None);
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert!(n.open_dialogs().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn inline_message_fades_after_ttl() {
        let (views, n) = notifier();
        views.mount(Page::Login);
        n.show_message(Region::SignUpMessage, "Unable to create User");
        let shown = views.get(Region::SignUpMessage).unwrap();
        assert_eq!(shown.style["opacity"], "1");

        tokio::time::sleep(MESSAGE_TTL + Duration::from_millis(10)).await;
        let faded = views.get(Region::SignUpMessage).unwrap();
        assert_eq!(faded.style["opacity"], "0");
        assert_eq!(faded.text_content(), "Unable to create User");
    }

    #[tokio::test(start_paused = true)]
    async fn newer_message_is_not_overwritten_by_an_older_fade() {
        let (views, n) = notifier();
        views.mount(Page::Login);
        n.show_message(Region::SignInMessage, "Incorrect Email or Password");
        tokio::time::sleep(Duration::from_secs(3)).await;
        n.show_message(Region::SignInMessage, "Account does not Exist");

        tokio::time::sleep(Duration::from_secs(3)).await;
        let shown = views.get(Region::SignInMessage).unwrap();
        assert_eq!(shown.text_content(), "Account does not Exist");
        assert_eq!(shown.style["opacity"], "1");

        tokio::time::sleep(Duration::from_secs(3)).await;
        let faded = views.get(Region::SignInMessage).unwrap();
        assert_eq!(faded.text_content(), "Account does not Exist");
        assert_eq!(faded.style["opacity"], "0");
    }
}
