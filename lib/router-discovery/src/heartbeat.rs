//! Periodic self-registration of a service instance

use crate::DiscoveryClient;
use router_api::RegisterRequest;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Time between two registrations
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);

/// Outcome counters of a heartbeat loop
#[derive(Debug, Default)]
pub struct HeartbeatStats {
    successes: AtomicU64,
    failures: AtomicU64,
}

impl HeartbeatStats {
    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    /// Failed attempts; these are never surfaced any other way
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

/// Handle to a running heartbeat loop.
///
/// The loop registers once immediately and then once per interval until
/// [`Heartbeat::stop`] is called or the handle is dropped. Failed attempts
/// are logged and counted, then the loop waits for the next tick.
pub struct Heartbeat {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    stats: Arc<HeartbeatStats>,
}

impl Heartbeat {
    /// Spawn the heartbeat loop on the current tokio runtime
    pub fn start(client: DiscoveryClient, registration: RegisterRequest, interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let stats = Arc::new(HeartbeatStats::default());

        info!(
            "Starting heartbeat for {} at {}:{} every {:?}",
            registration.name, registration.host, registration.port, interval
        );

        let task = tokio::spawn(run(
            client,
            registration,
            interval,
            stats.clone(),
            shutdown_rx,
        ));

        Self {
            shutdown: Some(shutdown_tx),
            task: Some(task),
            stats,
        }
    }

    pub fn stats(&self) -> &HeartbeatStats {
        &self.stats
    }

    /// Stop the loop and wait for it to exit
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Heartbeat task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run(
    client: DiscoveryClient,
    registration: RegisterRequest,
    interval: Duration,
    stats: Arc<HeartbeatStats>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        // A slow registry call must not delay shutdown either
        tokio::select! {
            _ = &mut shutdown => break,
            result = client.register(&registration) => match result {
                Ok(()) => {
                    stats.successes.fetch_add(1, Ordering::Relaxed);
                    debug!("Heartbeat sent for {}", registration.name);
                }
                Err(e) => {
                    stats.failures.fetch_add(1, Ordering::Relaxed);
                    warn!("Failed to register {}: {}", registration.name, e);
                }
            },
        }
    }

    info!("Heartbeat for {} stopped", registration.name);
}
