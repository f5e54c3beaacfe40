//! # Expiry Sweeper
//!
//! Background loop that periodically cancels registrations whose hold has
//! lapsed. One sweep may run at a time; overlapping ticks are skipped rather
//! than queued. Errors are logged and the loop continues.

use crate::config::TeesheetConfig;
use crate::registration::lifecycle::RegistrationLifecycle;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// Periodic sweep over expired registrations.
pub struct ExpirySweeper {
    lifecycle: Arc<RegistrationLifecycle>,
    interval: Duration,
    running: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
}

impl ExpirySweeper {
    pub fn new(lifecycle: Arc<RegistrationLifecycle>, config: &TeesheetConfig) -> Self {
        Self {
            lifecycle,
            interval: Duration::from_secs(config.sweep_interval_seconds),
            running: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signal the loop to stop after its current tick.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run the sweep loop until [`stop`](Self::stop) is called.
    #[instrument(skip(self))]
    pub async fn run(&self) {
        info!(
            interval_seconds = self.interval.as_secs(),
            "Expiry sweeper started"
        );

        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                info!("Expiry sweeper stopping");
                break;
            }

            self.sweep_once().await;

            tokio::time::sleep(self.interval).await;
        }
    }

    /// One sweep pass. Skipped if a pass is already in flight.
    pub async fn sweep_once(&self) {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Previous sweep still in flight; skipping tick");
            return;
        }

        match self.lifecycle.clean_up_expired(Utc::now()).await {
            Ok(0) => debug!("No expired registrations"),
            Ok(cancelled) => info!(cancelled, "Expired registrations cleaned up"),
            Err(e) => error!(error = %e, "Expiry sweep failed"),
        }

        self.running.store(false, Ordering::SeqCst);
    }
}
