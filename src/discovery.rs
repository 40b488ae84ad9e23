//! Sensor discovery: bounded scan sweep plus registry reconciliation.
//!
//! Discovery only adds. A sensor that does not answer a sweep may simply be
//! out of range, so it is never dropped from the registry here.

use async_trait::async_trait;
use log::{error, info, warn};
use std::time::Duration;

use crate::registry::{SensorId, SensorRegistry};

/// How long a discovery sweep is allowed to run.
pub const SCAN_TIMEOUT: Duration = Duration::from_secs(3);

/// Result of one discovery sweep.
///
/// A transport failure (adapter unavailable, permission denied, timeout) is
/// reported here, never raised past the scanner boundary, so a previously
/// known sensor set stays usable.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// Sweep completed; every currently reachable sensor. May be empty.
    Found(Vec<SensorId>),
    /// Sweep could not complete.
    Failed(String),
}

/// Bounded-duration discovery sweep over the wireless transport.
#[async_trait]
pub trait SensorScanner: Send + Sync {
    async fn scan(&self, timeout: Duration) -> ScanOutcome;
}

/// Run one sweep and merge the result into the registry.
///
/// New identities are appended and the registry is persisted; a persistence
/// failure is logged and retried on the next discovery event, with the
/// previously persisted state intact. Returns the working sensor set.
pub async fn reconcile(registry: &mut SensorRegistry, scanner: &dyn SensorScanner) -> Vec<SensorId> {
    info!("Scanning for plant sensors");
    let discovered = match scanner.scan(SCAN_TIMEOUT).await {
        ScanOutcome::Found(ids) => {
            info!("Discovery sweep found {} sensor(s)", ids.len());
            ids
        }
        ScanOutcome::Failed(reason) => {
            warn!(
                "Discovery sweep failed ({}); keeping {} known sensor(s)",
                reason,
                registry.len()
            );
            Vec::new()
        }
    };

    let added = registry.merge(&discovered);
    for id in &added {
        info!("Found new sensor: {}", id);
    }
    if !added.is_empty()
        && let Err(e) = registry.persist()
    {
        error!("{}", e);
    }

    registry.identities().to_vec()
}
