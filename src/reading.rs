//! One measurement set taken from a sensor during a poll cycle.

use crate::channels::ChannelKind;

/// Values read from a single sensor in one connection.
///
/// Readings are transient: they are rendered into hub writes and dropped.
/// The hub owns persistence and display.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Soil moisture in percent.
    pub moisture: f64,
    /// Air temperature in degrees Celsius.
    pub temperature: f64,
    /// Sunlight intensity in lux.
    pub light: u32,
    /// Soil fertility (conductivity) in µS/cm.
    pub conductivity: u32,
    /// Battery level in percent.
    pub battery: u8,
    /// Firmware version reported by the sensor, when the transport exposes it.
    pub firmware: Option<String>,
}

impl Reading {
    /// Render the value for one channel as the hub's plain-decimal string.
    pub fn value_for(&self, kind: ChannelKind) -> String {
        match kind {
            ChannelKind::Moisture => format_decimal(self.moisture),
            ChannelKind::Temperature => format_decimal(self.temperature),
            ChannelKind::Light => self.light.to_string(),
            ChannelKind::Fertility => self.conductivity.to_string(),
        }
    }
}

/// Plain decimal: whole numbers render without a trailing ".0".
fn format_decimal(value: f64) -> String {
    format!("{}", value)
}
