//! Background monitor keeping the database liveness flag current.
//!
//! The monitor pings the pool on a fixed interval and flips the shared
//! [`LivenessFlag`]. Storage adapters read the flag on every call to choose
//! between PostgreSQL and the in-process fallback store.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::domain::ports::{DatabaseLiveness, LivenessFlag};

use super::pool::DbPool;

/// Default interval between probes.
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(5);

/// Something that can confirm the database answers queries.
#[async_trait]
pub trait ConnectionProbe: Send + Sync + 'static {
    /// Succeed when a round trip to the database completes.
    async fn probe(&self) -> Result<(), String>;
}

#[async_trait]
impl ConnectionProbe for DbPool {
    async fn probe(&self) -> Result<(), String> {
        self.ping().await.map_err(|err| err.to_string())
    }
}

/// Periodically probes the database and records the result.
pub struct PoolLivenessMonitor<P> {
    probe: P,
    flag: LivenessFlag,
    interval: Duration,
}

impl<P: ConnectionProbe> PoolLivenessMonitor<P> {
    /// Create a monitor writing to `flag`.
    pub fn new(probe: P, flag: LivenessFlag) -> Self {
        Self {
            probe,
            flag,
            interval: DEFAULT_PROBE_INTERVAL,
        }
    }

    /// Override the probe interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run one probe, update the flag and log transitions.
    ///
    /// Returns the new connectivity state.
    pub async fn check_once(&self) -> bool {
        match self.probe.probe().await {
            Ok(()) => {
                if !self.flag.set(true) {
                    info!("database connected; new admissions are stored in PostgreSQL");
                    warn!(
                        "admissions accepted while the database was unreachable remain in the \
                         fallback store and are not copied to PostgreSQL"
                    );
                }
                true
            }
            Err(error) => {
                if self.flag.set(false) {
                    warn!(%error, "database unreachable; switching to the fallback store");
                } else {
                    debug!(%error, "database still unreachable");
                }
                false
            }
        }
    }

    /// Spawn the probe loop as a background tokio task.
    ///
    /// Returns a handle that can be used to abort the task.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.check_once().await;
            }
        })
    }

    /// Current state of the flag this monitor writes.
    pub fn is_connected(&self) -> bool {
        self.flag.is_connected()
    }
}
