//! The bridge itself: owns the working sensor set, the poll schedule, and
//! the change-gated hub writer.
//!
//! One instance is created by the host driver and handed every heartbeat;
//! there is no ambient global state.

use chrono::Utc;
use log::{debug, info};

use crate::config::{Config, DiscoveryMode};
use crate::discovery::{self, SensorScanner};
use crate::error::Result;
use crate::hub::DeviceStore;
use crate::poll::{self, CycleReport};
use crate::reader::SensorReader;
use crate::registry::{SensorId, SensorRegistry};
use crate::scheduler::PollScheduler;
use crate::sync::DeviceSync;

pub struct FloraBridge<S> {
    sensors: Vec<SensorId>,
    scheduler: PollScheduler,
    sync: DeviceSync<S>,
}

impl<S: DeviceStore> FloraBridge<S> {
    /// Build the bridge: resolve the working sensor set (scan + reconcile in
    /// auto mode, the configured list in manual mode), create any missing
    /// hub records, and arm the schedule.
    pub async fn start(config: &Config, scanner: &dyn SensorScanner, store: S) -> Result<Self> {
        let scheduler = PollScheduler::new(config.interval_minutes);
        info!(
            "Using polling interval of {} minutes",
            scheduler.interval_minutes()
        );

        let sensors = match config.discovery_mode {
            DiscoveryMode::Auto => {
                let mut registry = SensorRegistry::open(&config.registry_path)?;
                debug!(
                    "Registry cache {} holds {} sensor(s)",
                    registry.path().display(),
                    registry.len()
                );
                discovery::reconcile(&mut registry, scanner).await
            }
            DiscoveryMode::Manual => {
                // Session-only list; the scan cache stays untouched.
                info!(
                    "Manual mode: using {} configured sensor(s)",
                    config.manual_identities.len()
                );
                config.manual_identities.clone()
            }
        };

        let mut sync = DeviceSync::new(store);
        sync.ensure_channels(&sensors).await?;

        debug!("Next update at {}", scheduler.next_due());
        Ok(Self {
            sensors,
            scheduler,
            sync,
        })
    }

    pub fn sensors(&self) -> &[SensorId] {
        &self.sensors
    }

    pub fn next_due(&self) -> chrono::DateTime<Utc> {
        self.scheduler.next_due()
    }

    /// Heartbeat entry point: runs one poll cycle when due.
    ///
    /// Returns `None` when nothing was due. The schedule is advanced before
    /// the cycle starts, so even a cycle that fails every sensor waits a
    /// full interval before the next attempt.
    pub async fn on_tick(&mut self, reader: &dyn SensorReader) -> Option<CycleReport> {
        let now = Utc::now();
        debug!("Heartbeat at {}", now);
        if !self.scheduler.on_tick(now) {
            return None;
        }
        debug!("Next update at {}", self.scheduler.next_due());
        Some(poll::run_cycle(reader, &mut self.sync, &self.sensors, false).await)
    }

    /// Manual trigger: poll immediately, independent of the schedule.
    ///
    /// Does the same bookkeeping a due tick would: the next automatic poll
    /// moves to one full interval from now.
    pub async fn poll_now(&mut self, reader: &dyn SensorReader) -> CycleReport {
        self.scheduler.advance(Utc::now());
        poll::run_cycle(reader, &mut self.sync, &self.sensors, false).await
    }
}
