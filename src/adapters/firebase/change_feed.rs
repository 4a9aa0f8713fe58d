use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::{FirebaseSettings, SessionToken};
use crate::application::ports::{ChangeFeedPort, Topic};

/// Dónde vive cada tema dentro de la raíz de la aplicación.
fn topic_path(topic: Topic) -> &'static str {
    match topic {
        Topic::Alerts => "alerts",
        Topic::Cameras => "cameras",
        Topic::ActivityLogs => "activity_logs",
        Topic::SystemStatus => "system_status/current",
        Topic::ThreatConfig => "settings/threat_config",
    }
}

const TOPICS: [Topic; 5] = [Topic::Alerts, Topic::Cameras, Topic::ActivityLogs, Topic::SystemStatus, Topic::ThreatConfig];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentStamp {
    #[serde(default)]
    name: String,
    #[serde(default)]
    update_time: String,
}

#[derive(Debug, Default, Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<DocumentStamp>,
}

/// Huella de un documento o colección: nombres y `updateTime`.
fn fingerprint(stamps: &[DocumentStamp]) -> u64 {
    let mut pairs: Vec<(&str, &str)> = stamps.iter().map(|d| (d.name.as_str(), d.update_time.as_str())).collect();
    pairs.sort_unstable();
    let mut hasher = DefaultHasher::new();
    pairs.hash(&mut hasher);
    hasher.finish()
}

/// Recuerda la última huella por tema. La primera observación no cuenta como cambio.
#[derive(Default)]
struct Watcher {
    seen: HashMap<Topic, u64>,
}

impl Watcher {
    fn observe(&mut self, topic: Topic, print: u64) -> bool {
        match self.seen.insert(topic, print) {
            Some(previous) => previous != print,
            None => false,
        }
    }
}

/// Sustituto por sondeo de los listeners en tiempo real:
/// consulta las huellas periódicamente y publica el tema que cambió.
pub struct FirestoreChangeFeed {
    client: Client,
    settings: FirebaseSettings,
    root: String,
    token: Arc<SessionToken>,
    tx: broadcast::Sender<Topic>,
    every: Duration,
}

impl FirestoreChangeFeed {
    pub fn new(client: Client, settings: &FirebaseSettings, token: Arc<SessionToken>, every: Duration) -> Self {
        let (tx, _) = broadcast::channel(32);
        Self { client, settings: settings.clone(), root: settings.documents_root(), token, tx, every }
    }

    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let feed = self.clone();
        tokio::spawn(async move {
            info!("📡 Change feed polling every {:?}", feed.every);
            let mut watcher = Watcher::default();
            let mut ticker = tokio::time::interval(feed.every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                feed.poll_once(&mut watcher).await;
            }
        })
    }

    async fn poll_once(&self, watcher: &mut Watcher) {
        let session = match self.token.current(&self.client, &self.settings).await {
            Ok(Some(session)) => session,
            Ok(None) => return,
            Err(e) => {
                warn!("⚠️ Change feed could not renew the ID token: {}", e);
                return;
            }
        };
        for topic in TOPICS {
            match self.stamp(topic, &session.id_token).await {
                Ok(print) => {
                    if watcher.observe(topic, print) {
                        debug!("change on {:?}", topic);
                        let _ = self.tx.send(topic);
                    }
                }
                Err(e) if is_unauthorized(&e) => {
                    warn!("⚠️ Change feed token rejected, renewing");
                    if let Err(e) = self.token.refresh(&self.client, &self.settings).await {
                        warn!("⚠️ Change feed could not renew the ID token: {}", e);
                    }
                    return;
                }
                Err(e) => warn!("⚠️ Change feed {:?} skipped: {}", topic, e),
            }
        }
    }

    async fn stamp(&self, topic: Topic, token: &str) -> anyhow::Result<u64> {
        let path = topic_path(topic);
        let url = format!("{}/{}", self.root, path);
        let resp = self.client.get(url).bearer_auth(token).send().await?.error_for_status()?;
        // Rutas de colección tienen un número impar de segmentos
        let stamps = if path.split('/').count() % 2 == 1 {
            resp.json::<DocumentList>().await?.documents
        } else {
            vec![resp.json::<DocumentStamp>().await?]
        };
        Ok(fingerprint(&stamps))
    }
}

fn is_unauthorized(err: &anyhow::Error) -> bool {
    err.downcast_ref::<reqwest::Error>().and_then(reqwest::Error::status) == Some(StatusCode::UNAUTHORIZED)
}

impl ChangeFeedPort for FirestoreChangeFeed {
    fn subscribe(&self) -> broadcast::Receiver<Topic> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(name: &str, t: &str) -> DocumentStamp {
        DocumentStamp { name: name.into(), update_time: t.into() }
    }

    #[test]
    fn fingerprint_ignores_order_but_not_updates() {
        let a = [stamp("a", "1"), stamp("b", "1")];
        let b = [stamp("b", "1"), stamp("a", "1")];
        let c = [stamp("a", "1"), stamp("b", "2")];
        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_ne!(fingerprint(&a), fingerprint(&c));
        assert_ne!(fingerprint(&a), fingerprint(&a[..1]));
    }

    #[test]
    fn first_observation_is_not_a_change() {
        let mut watcher = Watcher::default();
        assert!(!watcher.observe(Topic::Alerts, 1));
        assert!(!watcher.observe(Topic::Alerts, 1));
        assert!(watcher.observe(Topic::Alerts, 2));
        assert!(!watcher.observe(Topic::Cameras, 2));
    }

    #[tokio::test]
    async fn rejected_token_is_renewed_and_polling_resumes() {
        use crate::domain::session::AuthSession;
        use axum::{
            extract::Path,
            http::{HeaderMap, StatusCode},
            routing::{get, post},
            Json, Router,
        };
        use serde_json::json;

        let app = Router::new()
            .route(
                "/v1/token",
                post(|| async {
                    Json(json!({"id_token":"fresh","refresh_token":"r2","user_id":"u1","expires_in":"3600"}))
                }),
            )
            .route(
                "/v1/*path",
                get(|Path(path): Path<String>, headers: HeaderMap| async move {
                    if headers["authorization"] != "Bearer fresh" {
                        return (StatusCode::UNAUTHORIZED, Json(json!({})));
                    }
                    let stamp = json!({"name": path, "updateTime": "2024-01-01T00:00:00Z"});
                    if path.ends_with("current") || path.ends_with("threat_config") {
                        (StatusCode::OK, Json(stamp))
                    } else {
                        (StatusCode::OK, Json(json!({"documents": [stamp]})))
                    }
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let url = format!("http://{addr}/v1");
        let settings = FirebaseSettings {
            api_key: "key".into(),
            project_id: "proj".into(),
            app_id: "app".into(),
            identity_url: url.clone(),
            token_url: url.clone(),
            firestore_url: url,
        };
        let token = Arc::new(SessionToken::default());
        token.set(
            AuthSession { uid: "u1".into(), id_token: "expired".into() },
            "r1".into(),
            Duration::from_secs(3600),
        );
        let feed = FirestoreChangeFeed::new(Client::new(), &settings, token.clone(), Duration::from_secs(5));
        let mut watcher = Watcher::default();

        feed.poll_once(&mut watcher).await;
        assert_eq!(token.get().map(|s| s.id_token), Some("fresh".to_string()));
        assert!(watcher.seen.is_empty());

        feed.poll_once(&mut watcher).await;
        assert_eq!(watcher.seen.len(), TOPICS.len());
    }

    #[test]
    fn empty_collection_parses() {
        let list: DocumentList = serde_json::from_str("{}").unwrap();
        assert!(list.documents.is_empty());
    }
}
