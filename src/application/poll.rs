use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, watch, Mutex, MutexGuard};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::application::ports::Topic;

/// Un controlador que sabe refrescar su región.
#[async_trait]
pub trait Refresh: Send + Sync + 'static {
    fn name(&self) -> &'static str;
    /// Refresco programado: se omite si ya hay uno en vuelo.
    async fn refresh(&self);
}

/// Serializa las cargas de un controlador.
/// Los ticks usan `try_enter` (se saltan si hay petición en vuelo);
/// las recargas tras una acción esperan con `enter`.
#[derive(Default)]
pub struct RefreshGate(Mutex<()>);

impl RefreshGate {
    pub fn try_enter(&self) -> Option<MutexGuard<'_, ()>> {
        self.0.try_lock().ok()
    }

    pub async fn enter(&self) -> MutexGuard<'_, ()> {
        self.0.lock().await
    }
}

#[derive(Debug, Clone, Default)]
pub struct PollSchedule {
    pub every: Option<Duration>,
    pub topics: Vec<Topic>,
}

impl PollSchedule {
    pub fn every(period: Duration) -> Self {
        Self { every: Some(period), topics: Vec::new() }
    }

    pub fn on_change(topics: &[Topic]) -> Self {
        Self { every: None, topics: topics.to_vec() }
    }

    pub fn with_topics(mut self, topics: &[Topic]) -> Self {
        self.topics.extend_from_slice(topics);
        self
    }
}

/// Tarea gestionada de un controlador, con arranque y parada explícitos.
pub struct PollTask {
    name: &'static str,
    stop: watch::Sender<bool>,
}

impl PollTask {
    pub fn spawn(
        target: Arc<dyn Refresh>,
        schedule: PollSchedule,
        feed: Option<broadcast::Receiver<Topic>>,
    ) -> Self {
        let (stop, stop_rx) = watch::channel(false);
        let name = target.name();
        tokio::spawn(run(target, schedule, feed, stop_rx));
        info!("▶️ poll task '{}' started", name);
        Self { name, stop }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Pide la parada. Una petición en vuelo termina normalmente.
    pub fn stop(self) {
        let _ = self.stop.send(true);
        info!("⏹️ poll task '{}' stopping", self.name);
    }
}

async fn run(
    target: Arc<dyn Refresh>,
    schedule: PollSchedule,
    mut feed: Option<broadcast::Receiver<Topic>>,
    mut stop: watch::Receiver<bool>,
) {
    target.refresh().await;

    let mut ticker = schedule.every.map(|period| {
        let mut t = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        t.set_missed_tick_behavior(MissedTickBehavior::Skip);
        t
    });

    loop {
        tokio::select! {
            _ = stop.changed() => break,
            _ = tick(&mut ticker) => {
                target.refresh().await;
            }
            topic = next_topic(&mut feed, &schedule.topics) => {
                debug!("'{}' notified by {:?}", target.name(), topic);
                target.refresh().await;
            }
        }
    }
    debug!("poll task '{}' finished", target.name());
}

async fn tick(ticker: &mut Option<tokio::time::Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Espera el siguiente aviso relevante; agrupa los que llegaron en ráfaga.
async fn next_topic(feed: &mut Option<broadcast::Receiver<Topic>>, wanted: &[Topic]) -> Option<Topic> {
    let Some(rx) = feed.as_mut() else {
        return std::future::pending().await;
    };
    if wanted.is_empty() {
        return std::future::pending().await;
    }
    loop {
        match rx.recv().await {
            Ok(topic) if wanted.contains(&topic) => {
                while let Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) = rx.try_recv() {}
                return Some(topic);
            }
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(_)) => return None,
            Err(broadcast::error::RecvError::Closed) => {
                *feed = None;
                return std::future::pending().await;
            }
        }
    }
}
