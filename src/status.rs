//! Simulated online status
//!
//! Every check interval the assistant is reported offline with a small
//! probability, then back online after a short random delay. This is purely
//! cosmetic and says nothing about the real channel health.

use crate::config::Settings;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant};
use tracing::{debug, info};

/// Parameters of the status simulation
#[derive(Debug, Clone, PartialEq)]
pub struct StatusConfig {
    /// Time between checks
    pub check_interval: Duration,
    /// Chance of going offline at each check, in [0, 1]
    pub offline_probability: f64,
    /// Shortest offline period
    pub offline_min: Duration,
    /// Longest offline period
    pub offline_max: Duration,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(30),
            offline_probability: 0.05,
            offline_min: Duration::from_millis(1000),
            offline_max: Duration::from_millis(3000),
        }
    }
}

impl From<&Settings> for StatusConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            check_interval: Duration::from_secs(settings.status_check_interval_secs),
            offline_probability: settings.offline_probability,
            offline_min: Duration::from_millis(settings.offline_min_ms),
            offline_max: Duration::from_millis(settings.offline_max_ms),
        }
    }
}

impl StatusConfig {
    /// Decide one check: `Some(offline period)` if the status flips offline
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Duration> {
        if rng.gen_range(0.0..1.0) >= self.offline_probability {
            return None;
        }

        let min = self.offline_min.as_millis() as u64;
        let max = (self.offline_max.as_millis() as u64).max(min);
        Some(Duration::from_millis(rng.gen_range(min..=max)))
    }
}

/// Background task publishing simulated online flags
///
/// `true` means online. The task is aborted when the simulator is dropped,
/// which also cancels a pending flip back online.
pub struct StatusSimulator {
    handle: JoinHandle<()>,
}

impl StatusSimulator {
    /// Start the simulation, sending status changes to `tx`
    pub fn spawn(config: StatusConfig, tx: mpsc::UnboundedSender<bool>) -> Self {
        Self::spawn_with_rng(config, StdRng::from_entropy(), tx)
    }

    /// Start the simulation with a caller-provided random source
    pub fn spawn_with_rng(
        config: StatusConfig,
        mut rng: StdRng,
        tx: mpsc::UnboundedSender<bool>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + config.check_interval, config.check_interval);

            loop {
                ticker.tick().await;

                let Some(offline_for) = config.roll(&mut rng) else {
                    debug!("Status check: staying online");
                    continue;
                };

                info!("Simulated status: offline for {:?}", offline_for);
                if tx.send(false).is_err() {
                    break;
                }
                sleep(offline_for).await;
                info!("Simulated status: back online");
                if tx.send(true).is_err() {
                    break;
                }
            }
        });

        Self { handle }
    }

    /// Whether the background task has stopped
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for StatusSimulator {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
