mod adapters;
mod application;
mod config;
mod domain;

use std::sync::Arc;

use tower_http::services::ServeDir;

use crate::adapters::{
    audio::player::AplayAlarm,
    backend::client::HttpBackend,
    firebase::{change_feed::FirestoreChangeFeed, firestore::FirestoreProfiles, identity::FirebaseIdentity, SessionToken},
    http::{router, state::HttpState},
    prefs_store::JsonPreferenceStore,
    still_frames::{NoCamera, StillImageSource},
    v4l2::frame_source::V4l2FrameSource,
};
use crate::application::{
    ports::{ChangeFeedPort, FrameSourcePort},
    services::{DashboardService, ServiceDeps},
};
use crate::config::{Config, FrameSourceSpec};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logs (RUST_LOG=info por defecto)
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cfg = Config::load()?;
    tracing::info!("🔧 Inicializando adaptadores de infraestructura...");

    // 2. Adaptadores
    let backend = Arc::new(HttpBackend::new(&cfg.backend_url, cfg.http_timeout)?);
    let hosted = reqwest::Client::builder().timeout(cfg.http_timeout).build()?;
    let token = Arc::new(SessionToken::default());
    let identity = Arc::new(FirebaseIdentity::new(hosted.clone(), cfg.firebase.clone(), token.clone()));
    let profiles = Arc::new(FirestoreProfiles::new(hosted.clone(), cfg.firebase.clone()));
    let feed = Arc::new(FirestoreChangeFeed::new(hosted, &cfg.firebase, token, cfg.change_poll));

    let frames: Arc<dyn FrameSourcePort> = match &cfg.frame_source {
        FrameSourceSpec::V4l2(path) => Arc::new(V4l2FrameSource::new(cfg.capture(path))),
        FrameSourceSpec::File(path) => Arc::new(StillImageSource::new(path)),
        FrameSourceSpec::None => Arc::new(NoCamera),
    };

    // 3. Servicio del panel
    let dashboard = Arc::new(DashboardService::new(ServiceDeps {
        api: backend.clone(),
        recognizer: backend,
        identity,
        profiles,
        frames,
        sound: Arc::new(AplayAlarm::new(&cfg.alarm_sound)),
        prefs: Arc::new(JsonPreferenceStore::new(&cfg.prefs_path)),
        feed: Some(feed.clone() as Arc<dyn ChangeFeedPort>),
        frame_interval: cfg.frame_interval,
    }));
    let _feed_task = feed.spawn();
    let _router_task = dashboard.start();

    // 4. Router HTTP y estáticos
    let app = router(HttpState { dashboard: dashboard.clone() })
        .fallback_service(ServeDir::new(&cfg.static_dir));

    // 5. Servidor
    let addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!("🚀 Panel de vigilancia en http://{}", addr);
    tracing::info!("🎯 Backend de reconocimiento: {}", cfg.backend_url);
    tracing::info!("📂 Archivos estáticos servidos desde '{}'", cfg.static_dir.display());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    dashboard.shutdown();
    Ok(())
}
