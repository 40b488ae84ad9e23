//! Boundary to the wireless transport that reads one sensor.

use async_trait::async_trait;

use crate::error::Result;
use crate::reading::Reading;
use crate::registry::SensorId;

/// Connects to one sensor and takes a full measurement set.
///
/// The transport's own timeout behavior applies; the bridge treats any
/// failure as opaque (`BridgeError::SensorUnreachable` or a transport
/// error) and skips the sensor for the current cycle only.
#[async_trait]
pub trait SensorReader: Send + Sync {
    async fn read(&self, id: &SensorId) -> Result<Reading>;
}
