//! One complete poll cycle over every known sensor.
//!
//! Sensors are read sequentially, in registry order; the BLE transport only
//! supports one active connection at a time. A sensor that fails to answer
//! is logged and skipped; it never aborts the rest of the batch.

use log::{debug, info, warn};

use crate::channels;
use crate::hub::DeviceStore;
use crate::reader::SensorReader;
use crate::registry::SensorId;
use crate::sync::{DeviceSync, SyncOutcome};

/// Tally of what one poll cycle did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Sensors read successfully.
    pub polled: usize,
    /// Sensors skipped because the read failed.
    pub failed: usize,
    /// Hub writes performed (changed channels only, unless forced).
    pub written: usize,
}

/// Read every sensor in `sensors` and forward each channel value to the
/// change-gated hub writer.
///
/// `force` is passed through to every update, bypassing change gating.
pub async fn run_cycle<S: DeviceStore>(
    reader: &dyn SensorReader,
    sync: &mut DeviceSync<S>,
    sensors: &[SensorId],
    force: bool,
) -> CycleReport {
    let mut report = CycleReport::default();

    for (index, id) in sensors.iter().enumerate() {
        info!("Polling sensor {}", id);
        let reading = match reader.read(id).await {
            Ok(reading) => reading,
            Err(e) => {
                warn!("Skipping sensor {} for this cycle: {}", id, e);
                report.failed += 1;
                continue;
            }
        };

        if let Some(firmware) = &reading.firmware {
            debug!("Sensor {} firmware: {}", id, firmware);
        }
        debug!(
            "Sensor {} readings: moisture {}%, {}°C, {} lux, {} µS/cm, battery {}%",
            id,
            reading.moisture,
            reading.temperature,
            reading.light,
            reading.conductivity,
            reading.battery
        );

        for (kind, slot) in channels::slots_for(index).iter() {
            match sync
                .update(slot, &reading.value_for(kind), reading.battery, force)
                .await
            {
                Ok(SyncOutcome::Written) => report.written += 1,
                Ok(_) => {}
                Err(e) => warn!("Failed to sync slot {}: {}", slot, e),
            }
        }
        report.polled += 1;
    }

    report
}
