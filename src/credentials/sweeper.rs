//! Periodic cooldown sweep.
//!
//! # Responsibilities
//! - Periodically reset credentials whose cooldown has elapsed
//! - Stop cleanly when asked
//!
//! The store also sweeps lazily before every selection; this task keeps the
//! persisted state and the active-credential gauge current while idle.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;

use crate::credentials::store::KeyStore;
use crate::lifecycle::Shutdown;

pub struct CooldownSweeper {
    store: Arc<KeyStore>,
    interval: Duration,
}

impl CooldownSweeper {
    pub fn new(store: Arc<KeyStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Spawn the sweep loop on the current runtime.
    pub fn start(self) -> SweeperHandle {
        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();
        let task = tokio::spawn(self.run(rx));
        SweeperHandle { shutdown, task }
    }

    async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Cooldown sweeper starting");

        let mut ticker = time::interval(self.interval);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let reset = self.store.sweep_expired(self.store.now_ms());
                    tracing::debug!(reset, active = self.store.active_count(), "Cooldown sweep complete");
                }
                _ = shutdown.recv() => {
                    tracing::info!("Cooldown sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

/// Owner of a running sweeper task.
pub struct SweeperHandle {
    shutdown: Shutdown,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the task and wait for it to exit.
    pub async fn stop(self) {
        self.shutdown.trigger();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Cooldown sweeper task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::clock::ManualClock;
    use crate::credentials::store::StoreOptions;

    #[tokio::test(start_paused = true)]
    async fn test_periodic_sweep_resets_after_cooldown() {
        let clock = Arc::new(ManualClock::new(0));
        let store = Arc::new(KeyStore::new(
            ["k1"],
            StoreOptions {
                cooldown: Duration::from_secs(60),
                clock: clock.clone(),
                ..StoreOptions::default()
            },
        ));
        store.mark_expired(&"k1".into(), "quota");

        let handle = CooldownSweeper::new(store.clone(), Duration::from_secs(60)).start();

        // A tick before the cooldown changes nothing
        clock.advance(Duration::from_secs(30));
        time::sleep(Duration::from_secs(61)).await;
        assert_eq!(store.active_count(), 0);

        clock.advance(Duration::from_secs(30));
        for _ in 0..3 {
            if store.active_count() == 1 {
                break;
            }
            time::sleep(Duration::from_secs(60)).await;
        }
        assert_eq!(store.active_count(), 1);

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_stop_ends_task() {
        let store = Arc::new(KeyStore::new(["k1"], StoreOptions::default()));
        let handle = CooldownSweeper::new(store, Duration::from_secs(3600)).start();
        assert!(!handle.is_finished());
        handle.stop().await;
    }
}
