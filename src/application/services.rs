use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::application::{
    capture_loop::CaptureLoop,
    controllers::{
        activity::ActivityController,
        alerts::{AlertsController, AlertsMode},
        cameras::CamerasController,
        health::{self, HealthController},
        recent::{self, RecentAlertsController},
        status::{self, StatusController},
        threat::ThreatController,
        ControllerContext,
    },
    notify::Notifier,
    poll::{PollSchedule, PollTask, Refresh},
    ports::{
        AlarmSoundPort, BackendPort, ChangeFeedPort, FrameSourcePort, IdentityPort, PreferenceStorePort,
        ProfileStorePort, RecognitionPort, Topic,
    },
    preferences::{PreferencesController, CLOCK_EVERY},
    session::SessionController,
    view_store::{ViewEvent, ViewStore},
};
use crate::domain::{session::UserRole, view::Page};

/// Puertos de infraestructura que necesita el panel.
pub struct ServiceDeps {
    pub api: Arc<dyn BackendPort>,
    pub recognizer: Arc<dyn RecognitionPort>,
    pub identity: Arc<dyn IdentityPort>,
    pub profiles: Arc<dyn ProfileStorePort>,
    pub frames: Arc<dyn FrameSourcePort>,
    pub sound: Arc<dyn AlarmSoundPort>,
    pub prefs: Arc<dyn PreferenceStorePort>,
    pub feed: Option<Arc<dyn ChangeFeedPort>>,
    pub frame_interval: Duration,
}

/// Enrutador de páginas: monta la página pedida y arranca/para
/// las tareas de sus controladores.
pub struct DashboardService {
    pub views: Arc<ViewStore>,
    pub notifier: Arc<Notifier>,
    pub session: Arc<SessionController>,
    pub prefs: Arc<PreferencesController>,
    pub admin_alerts: Arc<AlertsController>,
    pub personnel_alerts: Arc<AlertsController>,
    pub cameras: Arc<CamerasController>,
    status: Arc<StatusController>,
    recent: Arc<RecentAlertsController>,
    threat: Arc<ThreatController>,
    activity: Arc<ActivityController>,
    health: Arc<HealthController>,
    capture: Arc<CaptureLoop>,
    feed: Option<Arc<dyn ChangeFeedPort>>,
    page_tasks: Mutex<Vec<PollTask>>,
    global_tasks: Mutex<Vec<PollTask>>,
    mounted_at: Mutex<String>,
}

impl DashboardService {
    pub fn new(deps: ServiceDeps) -> Self {
        let views = Arc::new(ViewStore::new());
        let ctx = ControllerContext::new(deps.api.clone(), views.clone());
        let notifier = ctx.notifier.clone();
        Self {
            session: Arc::new(SessionController::new(
                deps.identity,
                deps.profiles,
                deps.api.clone(),
                views.clone(),
                notifier.clone(),
            )),
            prefs: Arc::new(PreferencesController::new(deps.prefs, views.clone(), notifier.clone())),
            admin_alerts: Arc::new(AlertsController::new(ctx.clone(), AlertsMode::Admin)),
            personnel_alerts: Arc::new(AlertsController::new(ctx.clone(), AlertsMode::Personnel)),
            cameras: Arc::new(CamerasController::new(ctx.clone())),
            status: Arc::new(StatusController::new(ctx.clone())),
            recent: Arc::new(RecentAlertsController::new(ctx.clone(), deps.sound.clone())),
            threat: Arc::new(ThreatController::new(ctx.clone())),
            activity: Arc::new(ActivityController::new(ctx.clone())),
            health: Arc::new(HealthController::new(ctx)),
            capture: Arc::new(CaptureLoop::new(
                deps.frames,
                deps.recognizer,
                deps.sound,
                views.clone(),
                deps.frame_interval,
            )),
            feed: deps.feed,
            page_tasks: Mutex::new(Vec::new()),
            global_tasks: Mutex::new(Vec::new()),
            mounted_at: Mutex::new(String::new()),
            views,
            notifier,
        }
    }

    fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
        m.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arranca el sondeo de salud y el reloj, monta la página actual y escucha navegaciones.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        *Self::lock(&self.global_tasks) = vec![
            PollTask::spawn(self.health.clone(), PollSchedule::every(health::EVERY), None),
            PollTask::spawn(self.prefs.clone(), PollSchedule::every(CLOCK_EVERY), None),
        ];
        let rx = self.views.subscribe();
        self.open(&self.views.location());
        info!("🧭 Page router started");
        tokio::spawn(route(self.clone(), rx))
    }

    pub fn shutdown(&self) {
        self.stop_page_tasks();
        for task in Self::lock(&self.global_tasks).drain(..) {
            task.stop();
        }
    }

    /// Resuelve `location` aplicando la guarda de sesión y monta la página.
    pub fn open(&self, location: &str) {
        let Some(page) = Page::from_path(location) else {
            warn!("⚠️ Unknown location '{}', staying on {:?}", location, self.views.page());
            return;
        };

        let state = self.session.session();
        let allowed = match page {
            Page::Login => true,
            _ if !state.is_signed_in() => false,
            p if p.is_admin_only() => state.role == UserRole::Admin,
            _ => true,
        };
        if !allowed {
            let target = if state.is_signed_in() { state.role.landing_page() } else { "/" };
            info!("🔒 {} not allowed, redirecting to {}", location, target);
            self.views.navigate(target);
            return;
        }

        *Self::lock(&self.mounted_at) = location.to_string();
        self.mount(page);
    }

    fn mount(&self, page: Page) {
        self.stop_page_tasks();
        self.capture.teardown();
        self.notifier.close_all();
        self.views.mount(page);
        self.prefs.render();
        info!("📄 Mounted {:?}", page);

        let mut tasks = Vec::new();
        match page {
            Page::Login => self.session.render_forms(),
            Page::AdminOverview | Page::PersonnelOverview => {
                tasks.push(self.poll(
                    self.status.clone(),
                    PollSchedule::every(status::EVERY).with_topics(&[Topic::SystemStatus]),
                ));
                tasks.push(self.poll(
                    self.recent.clone(),
                    PollSchedule::every(recent::EVERY).with_topics(&[Topic::Alerts]),
                ));
                tasks.push(self.capture.spawn());
            }
            Page::AdminAlerts => {
                tasks.push(self.poll(self.admin_alerts.clone(), PollSchedule::on_change(&[Topic::Alerts])));
            }
            Page::PersonnelAlerts => {
                tasks.push(self.poll(self.personnel_alerts.clone(), PollSchedule::on_change(&[Topic::Alerts])));
            }
            Page::AdminCameras => {
                tasks.push(self.poll(self.cameras.clone(), PollSchedule::on_change(&[Topic::Cameras])));
            }
            Page::AdminThreatConfig => {
                tasks.push(self.poll(self.threat.clone(), PollSchedule::on_change(&[Topic::ThreatConfig])));
            }
            Page::AdminActivityLog => {
                tasks.push(self.poll(self.activity.clone(), PollSchedule::on_change(&[Topic::ActivityLogs])));
            }
            Page::AdminSettings | Page::PersonnelSettings => {}
        }
        *Self::lock(&self.page_tasks) = tasks;
    }

    fn poll(&self, target: Arc<dyn Refresh>, schedule: PollSchedule) -> PollTask {
        let feed = if schedule.topics.is_empty() { None } else { self.feed.as_ref().map(|f| f.subscribe()) };
        PollTask::spawn(target, schedule, feed)
    }

    fn stop_page_tasks(&self) {
        for task in Self::lock(&self.page_tasks).drain(..) {
            task.stop();
        }
    }

    pub fn running(&self) -> Vec<&'static str> {
        Self::lock(&self.page_tasks).iter().map(PollTask::name).collect()
    }

    fn mounted_at(&self) -> String {
        Self::lock(&self.mounted_at).clone()
    }
}

async fn route(service: Arc<DashboardService>, mut rx: broadcast::Receiver<ViewEvent>) {
    loop {
        match rx.recv().await {
            Ok(ViewEvent::Navigated { location }) => service.open(&location),
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("⚠️ Page router lagged by {} view events", n);
                let location = service.views.location();
                if location != service.mounted_at() {
                    service.open(&location);
                }
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{
        status, FakeBackend, FakeFeed, FakeFrames, FakeIdentity, FakeProfiles, FakeRecognizer, FakeSound, MemoryPrefs,
    };
    use crate::domain::{session::Credentials, view::Region};

    fn service(role: Option<UserRole>) -> (Arc<FakeBackend>, Arc<DashboardService>) {
        service_with_feed(role, None)
    }

    fn service_with_feed(
        role: Option<UserRole>,
        feed: Option<Arc<dyn ChangeFeedPort>>,
    ) -> (Arc<FakeBackend>, Arc<DashboardService>) {
        let api = FakeBackend::new().with(|s| s.login_redirect = "/admin_overview".into());
        let profiles = Arc::new(FakeProfiles::default());
        *profiles.role.lock().unwrap() = role;
        let svc = DashboardService::new(ServiceDeps {
            api: api.clone(),
            recognizer: Arc::new(FakeRecognizer::default()),
            identity: Arc::new(FakeIdentity::default()),
            profiles,
            frames: Arc::new(FakeFrames::ready(640, 480)),
            sound: Arc::new(FakeSound::default()),
            prefs: Arc::new(MemoryPrefs::default()),
            feed,
            frame_interval: Duration::from_millis(200),
        });
        (api, Arc::new(svc))
    }

    async fn sign_in(svc: &DashboardService) {
        svc.session
            .sign_in(Credentials { email: "ops@mall.test".into(), password: "secret1".into() })
            .await;
    }

    #[tokio::test]
    async fn anonymous_visitors_are_sent_to_login() {
        let (_, svc) = service(None);
        svc.open("/admin_alerts");
        assert_eq!(svc.views.page(), Page::Login);
        assert_eq!(svc.views.location(), "/");
        assert!(svc.running().is_empty());
    }

    #[tokio::test]
    async fn personnel_cannot_open_admin_pages() {
        let (_, svc) = service(Some(UserRole::Personnel));
        sign_in(&svc).await;
        svc.open("/admin_camera_management");
        assert_eq!(svc.views.location(), "/personnel_overview");
        svc.open("/personnel_alerts");
        assert_eq!(svc.views.page(), Page::PersonnelAlerts);
        svc.shutdown();
    }

    #[tokio::test]
    async fn mounting_swaps_page_tasks() {
        let (_, svc) = service(Some(UserRole::Admin));
        sign_in(&svc).await;

        svc.open("/admin_overview");
        assert_eq!(svc.running(), vec!["status", "recent_alerts", "capture"]);
        assert!(svc.views.is_mounted(Region::VideoOverlay));

        svc.open("/admin_alerts.html");
        assert_eq!(svc.running(), vec!["admin_alerts"]);
        assert!(!svc.views.is_mounted(Region::VideoOverlay));
        svc.shutdown();
        assert!(svc.running().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn overview_refreshes_on_status_and_alert_changes() {
        let feed = FakeFeed::new();
        let (api, svc) = service_with_feed(Some(UserRole::Admin), Some(feed.clone()));
        api.with(|s| s.status = Some(status(1, 1)));
        sign_in(&svc).await;

        svc.open("/admin_overview");
        assert_eq!(feed.tx.receiver_count(), 2);
        tokio::time::sleep(Duration::from_millis(50)).await;
        let (statuses, recents) = (api.count("system_status"), api.count("recent_alerts"));

        feed.tx.send(Topic::SystemStatus).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(api.count("system_status"), statuses + 1);
        assert_eq!(api.count("recent_alerts"), recents);

        feed.tx.send(Topic::Alerts).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(api.count("recent_alerts"), recents + 1);
        svc.shutdown();
    }

    #[tokio::test]
    async fn router_follows_navigation_events() {
        let (api, svc) = service(Some(UserRole::Admin));
        let router = svc.start();
        sign_in(&svc).await;
        svc.views.navigate("/admin_activity_log");
        for _ in 0..50 {
            tokio::task::yield_now().await;
        }
        assert_eq!(svc.views.page(), Page::AdminActivityLog);
        assert!(api.count("activity_logs") >= 1);
        assert!(api.count("health") >= 1);
        assert!(svc.views.get(Region::Clock).unwrap().text_content().contains(':'));
        svc.shutdown();
        router.abort();
    }
}
