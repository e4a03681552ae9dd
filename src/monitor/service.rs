//! Monitor Service
//!
//! Runs a [`LineMonitor`] on a tokio task. Producers push samples into a
//! bounded queue; the worker applies them one at a time and forwards every
//! crossing to each subscriber's bounded channel.
//!
//! Delivery awaits channel capacity instead of dropping, so a slow
//! subscriber slows the worker and, once the sample queue fills, the
//! producers. Subscribers that hang up are pruned.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::core::sample::PlayerSample;
use crate::monitor::events::CrossingEvent;
use crate::monitor::line_monitor::LineMonitor;

/// A sample waiting in the service queue.
#[derive(Debug, Clone)]
pub struct SampleEnvelope {
    /// Decoded sample
    pub sample: PlayerSample,
    /// Server world time at receipt
    pub server_world_time: i64,
}

/// Service errors.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The service has stopped.
    #[error("Monitor service is closed")]
    Closed,

    /// The sample queue is full (non-blocking submit only).
    #[error("Sample queue is full")]
    QueueFull,

    /// The worker task panicked or was cancelled.
    #[error("Worker failed: {0}")]
    Worker(String),
}

type Subscribers = Arc<RwLock<Vec<mpsc::Sender<CrossingEvent>>>>;

/// Entry point for spawning the service.
pub struct MonitorService;

impl MonitorService {
    /// Spawn the worker on the current tokio runtime.
    ///
    /// Queue sizes and the sweep interval come from the monitor's config.
    pub fn spawn(monitor: Arc<LineMonitor>) -> MonitorHandle {
        let config = monitor.config().clone();
        let (sample_tx, sample_rx) = mpsc::channel(config.sample_queue_capacity.max(1));
        let (shutdown_tx, _) = broadcast::channel(1);
        let subscribers: Subscribers = Arc::new(RwLock::new(Vec::new()));

        let worker = tokio::spawn(Self::run_worker(
            monitor.clone(),
            sample_rx,
            subscribers.clone(),
            shutdown_tx.subscribe(),
            config.sweep_interval.max(Duration::from_millis(1)),
        ));

        info!(
            queue = config.sample_queue_capacity,
            sweep_interval_ms = config.sweep_interval.as_millis() as u64,
            "Monitor service started"
        );

        MonitorHandle {
            monitor,
            samples: sample_tx,
            subscribers,
            subscriber_capacity: config.subscriber_capacity.max(1),
            shutdown_tx,
            worker,
        }
    }

    async fn run_worker(
        monitor: Arc<LineMonitor>,
        mut samples: mpsc::Receiver<SampleEnvelope>,
        subscribers: Subscribers,
        mut shutdown_rx: broadcast::Receiver<()>,
        sweep_interval: Duration,
    ) {
        let mut sweep = interval(sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick fires immediately
        sweep.tick().await;

        loop {
            tokio::select! {
                received = samples.recv() => {
                    match received {
                        Some(envelope) => Self::process(&monitor, &subscribers, envelope).await,
                        None => break,
                    }
                }
                _ = sweep.tick() => {
                    monitor.sweep_expired_riders();
                    debug!(riders = monitor.rider_count(), "Swept expired riders");
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    samples.close();
                    while let Some(envelope) = samples.recv().await {
                        Self::process(&monitor, &subscribers, envelope).await;
                    }
                    break;
                }
            }
        }

        info!("Monitor service stopped");
    }

    async fn process(monitor: &LineMonitor, subscribers: &Subscribers, envelope: SampleEnvelope) {
        let events = monitor.update_rider_status(envelope.sample, envelope.server_world_time);
        if events.is_empty() {
            return;
        }

        let mut hung_up = false;
        {
            let subscribers = subscribers.read().await;
            for event in &events {
                for subscriber in subscribers.iter() {
                    if subscriber.send(event.clone()).await.is_err() {
                        hung_up = true;
                    }
                }
            }
        }

        if hung_up {
            let mut subscribers = subscribers.write().await;
            let before = subscribers.len();
            subscribers.retain(|s| !s.is_closed());
            debug!(removed = before - subscribers.len(), "Pruned closed subscribers");
        }
    }
}

/// Handle to a running [`MonitorService`].
pub struct MonitorHandle {
    monitor: Arc<LineMonitor>,
    samples: mpsc::Sender<SampleEnvelope>,
    subscribers: Subscribers,
    subscriber_capacity: usize,
    shutdown_tx: broadcast::Sender<()>,
    worker: JoinHandle<()>,
}

impl MonitorHandle {
    /// The monitor the service drives (for marker registration and queries).
    pub fn monitor(&self) -> &Arc<LineMonitor> {
        &self.monitor
    }

    /// Queue a sample, waiting for room if the queue is full.
    pub async fn submit(&self, sample: PlayerSample, server_world_time: i64) -> Result<(), ServiceError> {
        self.samples
            .send(SampleEnvelope { sample, server_world_time })
            .await
            .map_err(|_| ServiceError::Closed)
    }

    /// Queue a sample without waiting.
    pub fn try_submit(&self, sample: PlayerSample, server_world_time: i64) -> Result<(), ServiceError> {
        self.samples
            .try_send(SampleEnvelope { sample, server_world_time })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => ServiceError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => ServiceError::Closed,
            })
    }

    /// Receive every crossing produced from now on, in order.
    pub async fn subscribe(&self) -> mpsc::Receiver<CrossingEvent> {
        let (tx, rx) = mpsc::channel(self.subscriber_capacity);
        self.subscribers.write().await.push(tx);
        rx
    }

    /// Number of live subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Stop accepting samples, process what is queued, then stop the worker.
    pub async fn shutdown(self) -> Result<(), ServiceError> {
        if self.shutdown_tx.send(()).is_err() {
            warn!("Monitor worker already stopped");
        }
        drop(self.samples);
        self.worker.await.map_err(|e| ServiceError::Worker(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{MarkerId, RiderId, RoadTime};
    use crate::monitor::config::MonitorConfig;

    fn monitor_with(config: MonitorConfig) -> Arc<LineMonitor> {
        let monitor = LineMonitor::new(config);
        monitor.add_line(MarkerId(1), "line 1", 1, 1, 0.1).unwrap();
        monitor.add_line(MarkerId(2), "line 2", 1, 1, 0.2).unwrap();
        monitor.add_line(MarkerId(3), "line 3", 1, 1, 0.3).unwrap();
        Arc::new(monitor)
    }

    fn rider(id: u64, fraction: f64) -> PlayerSample {
        PlayerSample::at(RiderId(id), 1, 1, RoadTime::from_fraction(fraction).unwrap())
    }

    #[tokio::test]
    async fn test_subscriber_receives_crossings() {
        let handle = MonitorService::spawn(monitor_with(MonitorConfig::default()));
        let mut rx = handle.subscribe().await;

        handle.submit(rider(1, 0.05), 100).await.unwrap();
        handle.submit(rider(1, 0.35), 130).await.unwrap();

        let ids: Vec<_> = [
            rx.recv().await.unwrap(),
            rx.recv().await.unwrap(),
            rx.recv().await.unwrap(),
        ]
        .iter()
        .map(|e| e.marker_id.0)
        .collect();
        assert_eq!(ids, vec![1, 2, 3]);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_every_subscriber_gets_everything() {
        let handle = MonitorService::spawn(monitor_with(MonitorConfig::default()));
        let mut a = handle.subscribe().await;
        let mut b = handle.subscribe().await;

        handle.submit(rider(1, 0.05), 0).await.unwrap();
        handle.submit(rider(2, 0.15), 0).await.unwrap();
        handle.submit(rider(1, 0.25), 1).await.unwrap();
        handle.submit(rider(2, 0.35), 1).await.unwrap();
        handle.shutdown().await.unwrap();

        let mut seen_a = Vec::new();
        while let Some(e) = a.recv().await {
            seen_a.push((e.rider_id.0, e.marker_id.0));
        }
        let mut seen_b = Vec::new();
        while let Some(e) = b.recv().await {
            seen_b.push((e.rider_id.0, e.marker_id.0));
        }

        assert_eq!(seen_a, vec![(1, 1), (1, 2), (2, 2), (2, 3)]);
        assert_eq!(seen_a, seen_b);
    }

    #[tokio::test]
    async fn test_slow_subscriber_loses_nothing() {
        let config = MonitorConfig {
            subscriber_capacity: 1,
            ..MonitorConfig::default()
        };
        let handle = MonitorService::spawn(monitor_with(config));
        let mut rx = handle.subscribe().await;

        handle.submit(rider(1, 0.05), 0).await.unwrap();
        handle.submit(rider(1, 0.35), 1).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(rx.recv().await.unwrap().marker_id.0);
        }
        assert_eq!(ids, vec![1, 2, 3]);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_subscriber_is_pruned() {
        let handle = MonitorService::spawn(monitor_with(MonitorConfig::default()));
        let dropped = handle.subscribe().await;
        let mut kept = handle.subscribe().await;
        drop(dropped);
        assert_eq!(handle.subscriber_count().await, 2);

        handle.submit(rider(1, 0.05), 0).await.unwrap();
        handle.submit(rider(1, 0.15), 1).await.unwrap();

        assert_eq!(kept.recv().await.unwrap().marker_id, MarkerId(1));

        // Samples are processed in order, so the prune is done by the next event
        handle.submit(rider(1, 0.25), 2).await.unwrap();
        assert_eq!(kept.recv().await.unwrap().marker_id, MarkerId(2));
        assert_eq!(handle.subscriber_count().await, 1);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_drains_queue() {
        let handle = MonitorService::spawn(monitor_with(MonitorConfig::default()));
        let mut rx = handle.subscribe().await;

        for (t, f) in [0.05, 0.15, 0.25, 0.35].iter().enumerate() {
            handle.submit(rider(7, *f), t as i64).await.unwrap();
        }
        handle.shutdown().await.unwrap();

        let mut count = 0;
        while rx.recv().await.is_some() {
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_periodic_sweep_expires_riders() {
        let config = MonitorConfig {
            rider_timeout: Duration::from_millis(30),
            sweep_interval: Duration::from_millis(20),
            ..MonitorConfig::default()
        };
        let handle = MonitorService::spawn(monitor_with(config));

        handle.submit(rider(1, 0.05), 0).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(!handle.monitor().is_tracking(RiderId(1)));
        assert_eq!(handle.monitor().rider_count(), 0);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_try_submit() {
        let handle = MonitorService::spawn(monitor_with(MonitorConfig::default()));
        handle.try_submit(rider(1, 0.05), 0).unwrap();
        handle.shutdown().await.unwrap();
    }
}
