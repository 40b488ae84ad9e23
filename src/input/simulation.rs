//! Simulated BLE transport for development without a Bluetooth adapter.
//!
//! The scanner reports a fixed identity set; the reader drifts each
//! sensor's values a little on every poll so change gating has something
//! to do.

use async_trait::async_trait;
use parking_lot::RwLock;
use rand::Rng;
use std::collections::HashMap;
use std::time::Duration;

use crate::discovery::{ScanOutcome, SensorScanner};
use crate::error::{BridgeError, Result};
use crate::reader::SensorReader;
use crate::reading::Reading;
use crate::registry::SensorId;

const SIMULATED_FIRMWARE: &str = "3.2.4";

/// Scanner that always finds the same set of sensors.
pub struct SimulatedScanner {
    identities: Vec<SensorId>,
}

impl SimulatedScanner {
    pub fn new(identities: Vec<SensorId>) -> Self {
        Self { identities }
    }

    /// Two fake flower-care sensors, enough to exercise discovery.
    pub fn with_defaults() -> Self {
        Self::new(vec![
            SensorId::from("C4:7C:8D:6A:2E:01"),
            SensorId::from("C4:7C:8D:6A:2E:02"),
        ])
    }
}

#[async_trait]
impl SensorScanner for SimulatedScanner {
    async fn scan(&self, timeout: Duration) -> ScanOutcome {
        // A real sweep takes the full timeout; keep a hint of that.
        tokio::time::sleep(timeout.min(Duration::from_millis(50))).await;
        ScanOutcome::Found(self.identities.clone())
    }
}

/// Reader that returns plausible, slowly drifting readings.
pub struct SimulatedReader {
    state: RwLock<HashMap<SensorId, Reading>>,
}

impl SimulatedReader {
    pub fn new(identities: &[SensorId]) -> Self {
        let state = identities
            .iter()
            .map(|id| (id.clone(), Self::baseline()))
            .collect();
        Self {
            state: RwLock::new(state),
        }
    }

    fn baseline() -> Reading {
        let mut rng = rand::thread_rng();
        Reading {
            moisture: rng.gen_range(15.0..45.0_f64).round(),
            temperature: (rng.gen_range(16.0..26.0_f64) * 10.0).round() / 10.0,
            light: rng.gen_range(200..8000),
            conductivity: rng.gen_range(100..600),
            battery: rng.gen_range(60..100),
            firmware: Some(SIMULATED_FIRMWARE.to_string()),
        }
    }

    fn drift(reading: &mut Reading) {
        let mut rng = rand::thread_rng();
        reading.moisture = (reading.moisture + rng.gen_range(-2.0..=2.0_f64))
            .clamp(0.0, 100.0)
            .round();
        reading.temperature = ((reading.temperature + rng.gen_range(-0.5..=0.5_f64))
            .clamp(-10.0, 50.0)
            * 10.0)
            .round()
            / 10.0;
        reading.light = reading.light.saturating_add_signed(rng.gen_range(-200..=200));
        reading.conductivity = reading
            .conductivity
            .saturating_add_signed(rng.gen_range(-10..=10));
        // Batteries only go one way.
        if rng.gen_ratio(1, 20) {
            reading.battery = reading.battery.saturating_sub(1);
        }
    }
}

#[async_trait]
impl SensorReader for SimulatedReader {
    async fn read(&self, id: &SensorId) -> Result<Reading> {
        let mut state = self.state.write();
        let reading = state
            .get_mut(id)
            .ok_or_else(|| BridgeError::SensorUnreachable {
                identity: id.to_string(),
                reason: "not part of the simulation".into(),
            })?;
        Self::drift(reading);
        Ok(reading.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scanner_reports_configured_identities() {
        let scanner = SimulatedScanner::with_defaults();
        match scanner.scan(Duration::from_secs(3)).await {
            ScanOutcome::Found(ids) => assert_eq!(ids.len(), 2),
            ScanOutcome::Failed(reason) => panic!("unexpected failure: {}", reason),
        }
    }

    #[tokio::test]
    async fn test_reader_returns_plausible_values() {
        let id = SensorId::from("AA:BB");
        let reader = SimulatedReader::new(std::slice::from_ref(&id));
        let reading = reader.read(&id).await.unwrap();
        assert!((0.0..=100.0).contains(&reading.moisture));
        assert!((-10.0..=50.0).contains(&reading.temperature));
        assert!(reading.battery <= 100);
        assert_eq!(reading.firmware.as_deref(), Some(SIMULATED_FIRMWARE));
    }

    #[tokio::test]
    async fn test_unknown_sensor_is_unreachable() {
        let reader = SimulatedReader::new(&[]);
        assert!(reader.read(&SensorId::from("AA:BB")).await.is_err());
    }
}
