//! Stable mapping from sensor index to hub channel slots.
//!
//! Each sensor exposes four measurement channels. Slot numbers are a pure
//! function of the sensor's position in the registry, so they stay stable
//! across restarts as long as registry order is stable (which it is: the
//! registry is append-only).

/// Slot of the poll switch, created once and independent of any sensor.
pub const CONTROL_SLOT: u16 = 1;

/// First slot used by sensor channels; sensor `i` occupies
/// `SLOT_BASE + i*4 ..= SLOT_BASE + i*4 + 3`.
const SLOT_BASE: u16 = 2;

/// One of the four measurement channels a sensor exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Moisture,
    Temperature,
    Light,
    Fertility,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 4] = [
        ChannelKind::Moisture,
        ChannelKind::Temperature,
        ChannelKind::Light,
        ChannelKind::Fertility,
    ];

    fn offset(self) -> u16 {
        match self {
            ChannelKind::Moisture => 0,
            ChannelKind::Temperature => 1,
            ChannelKind::Light => 2,
            ChannelKind::Fertility => 3,
        }
    }

    /// Human-readable channel name, used in hub record names.
    pub fn label(self) -> &'static str {
        match self {
            ChannelKind::Moisture => "Moisture",
            ChannelKind::Temperature => "Temperature",
            ChannelKind::Light => "Light",
            ChannelKind::Fertility => "Fertility",
        }
    }

    /// Device type name the hub understands for this channel.
    pub fn hub_type(self) -> &'static str {
        match self {
            ChannelKind::Moisture => "Humidity",
            ChannelKind::Temperature => "Temperature",
            ChannelKind::Light => "Illumination",
            ChannelKind::Fertility => "Custom",
        }
    }
}

/// The four slots assigned to one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSlots {
    base: u16,
}

impl ChannelSlots {
    pub fn slot(self, kind: ChannelKind) -> u16 {
        self.base + kind.offset()
    }

    /// Iterate the channels in slot order.
    pub fn iter(self) -> impl Iterator<Item = (ChannelKind, u16)> {
        ChannelKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.slot(kind)))
    }
}

/// Slot assignment for the sensor at registry position `index`.
pub fn slots_for(index: usize) -> ChannelSlots {
    ChannelSlots {
        base: SLOT_BASE + (index as u16) * 4,
    }
}

/// Total number of hub records expected for `sensor_count` sensors,
/// including the control slot.
pub fn channel_count(sensor_count: usize) -> usize {
    1 + sensor_count * 4
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_first_sensor_occupies_slots_2_to_5() {
        let slots = slots_for(0);
        assert_eq!(slots.slot(ChannelKind::Moisture), 2);
        assert_eq!(slots.slot(ChannelKind::Temperature), 3);
        assert_eq!(slots.slot(ChannelKind::Light), 4);
        assert_eq!(slots.slot(ChannelKind::Fertility), 5);
    }

    #[test]
    fn test_mapping_is_stable() {
        assert_eq!(slots_for(3), slots_for(3));
        assert_eq!(slots_for(3).slot(ChannelKind::Light), slots_for(3).slot(ChannelKind::Light));
    }

    #[test]
    fn test_slots_never_overlap() {
        let mut seen = HashSet::new();
        seen.insert(CONTROL_SLOT);
        for index in 0..16 {
            for (_, slot) in slots_for(index).iter() {
                assert!(seen.insert(slot), "slot {} assigned twice", slot);
            }
        }
    }

    #[test]
    fn test_iter_matches_slot_lookup() {
        let slots = slots_for(2);
        let collected: Vec<_> = slots.iter().collect();
        assert_eq!(collected.len(), 4);
        for (kind, slot) in collected {
            assert_eq!(slots.slot(kind), slot);
        }
    }

    #[test]
    fn test_channel_count() {
        assert_eq!(channel_count(0), 1);
        assert_eq!(channel_count(1), 5);
        assert_eq!(channel_count(3), 13);
    }
}
