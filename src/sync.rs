//! Change-gated writes into the device hub.
//!
//! The hub UI redraws and re-logs on every write, so unchanged values are
//! never rewritten: one write per changed channel per poll cycle, at most.

use log::{debug, info};

use crate::channels::{self, CONTROL_SLOT};
use crate::error::Result;
use crate::hub::{ChannelValue, DeviceStore};
use crate::registry::SensorId;

/// What happened to one channel during an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Value differed (or the write was forced) and was written.
    Written,
    /// Stored value already matches; nothing written.
    Unchanged,
    /// No hub record exists for this slot yet; nothing written.
    MissingSlot,
}

/// Wraps a [`DeviceStore`] with update suppression.
pub struct DeviceSync<S> {
    store: S,
}

impl<S: DeviceStore> DeviceSync<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Write `value` to `slot` unless the stored value already matches.
    ///
    /// A slot without a hub record is skipped: channels are created once per
    /// new sensor index by [`ensure_channels`](Self::ensure_channels), never
    /// during a poll.
    pub async fn update(
        &mut self,
        slot: u16,
        value: &str,
        battery: u8,
        force: bool,
    ) -> Result<SyncOutcome> {
        if !self.store.exists(slot).await {
            debug!("Slot {} has no hub record yet; skipping update", slot);
            return Ok(SyncOutcome::MissingSlot);
        }

        let next = ChannelValue::text(value);
        let unchanged = self
            .store
            .current_value(slot)
            .await
            .is_some_and(|current| current == next);
        if unchanged && !force {
            return Ok(SyncOutcome::Unchanged);
        }

        self.store.write(slot, next, battery).await?;
        info!("Updated slot {} to '{}' (battery {}%)", slot, value, battery);
        Ok(SyncOutcome::Written)
    }

    /// Create any missing hub records: the poll switch plus four channels
    /// per sensor. Safe to call on every startup; existing records are left
    /// alone.
    pub async fn ensure_channels(&mut self, sensors: &[SensorId]) -> Result<()> {
        if !self.store.exists(CONTROL_SLOT).await {
            info!("Creating the poll switch; flip it to poll the sensors");
            self.store
                .create(CONTROL_SLOT, "Update plant sensors", "Switch")
                .await?;
        }

        for (index, id) in sensors.iter().enumerate() {
            let slots = channels::slots_for(index);
            for (kind, slot) in slots.iter() {
                if self.store.exists(slot).await {
                    continue;
                }
                let name = format!("#{} {}", index, kind.label());
                debug!("Creating hub record {} ('{}') for sensor {}", slot, name, id);
                self.store.create(slot, &name, kind.hub_type()).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::MemoryStore;

    async fn sync_with_channel() -> DeviceSync<MemoryStore> {
        let mut store = MemoryStore::new();
        store.create(2, "#0 Moisture", "Humidity").await.unwrap();
        DeviceSync::new(store)
    }

    #[tokio::test]
    async fn test_missing_slot_is_a_noop() {
        let mut sync = DeviceSync::new(MemoryStore::new());
        let outcome = sync.update(2, "25", 80, false).await.unwrap();
        assert_eq!(outcome, SyncOutcome::MissingSlot);
        assert_eq!(sync.store().writes(), 0);
    }

    #[tokio::test]
    async fn test_first_write_goes_through() {
        let mut sync = sync_with_channel().await;
        let outcome = sync.update(2, "25", 80, false).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Written);
        assert_eq!(sync.store().writes(), 1);
    }

    #[tokio::test]
    async fn test_unchanged_value_is_suppressed() {
        let mut sync = sync_with_channel().await;
        sync.update(2, "25", 80, false).await.unwrap();

        let outcome = sync.update(2, "25", 80, false).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Unchanged);
        assert_eq!(sync.store().writes(), 1);
    }

    #[tokio::test]
    async fn test_changed_value_writes_exactly_once() {
        let mut sync = sync_with_channel().await;
        sync.update(2, "25", 80, false).await.unwrap();

        let outcome = sync.update(2, "26", 80, false).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Written);
        assert_eq!(sync.store().writes(), 2);
    }

    #[tokio::test]
    async fn test_force_writes_regardless_of_equality() {
        let mut sync = sync_with_channel().await;
        sync.update(2, "25", 80, false).await.unwrap();

        let outcome = sync.update(2, "25", 80, true).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Written);
        assert_eq!(sync.store().writes(), 2);
    }

    #[tokio::test]
    async fn test_battery_change_alone_does_not_write() {
        // Gating is on the channel value; battery rides along with it.
        let mut sync = sync_with_channel().await;
        sync.update(2, "25", 80, false).await.unwrap();

        let outcome = sync.update(2, "25", 70, false).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Unchanged);
        assert_eq!(sync.store().writes(), 1);
    }

    #[tokio::test]
    async fn test_ensure_channels_creates_switch_and_four_per_sensor() {
        let mut sync = DeviceSync::new(MemoryStore::new());
        let sensors = vec![SensorId::from("AA:BB"), SensorId::from("CC:DD")];
        sync.ensure_channels(&sensors).await.unwrap();

        assert_eq!(sync.store().len(), crate::channels::channel_count(2));
        assert_eq!(sync.store().record(1).unwrap().device_type, "Switch");
        assert_eq!(sync.store().record(2).unwrap().name, "#0 Moisture");
        assert_eq!(sync.store().record(9).unwrap().name, "#1 Fertility");
        assert_eq!(sync.store().record(9).unwrap().device_type, "Custom");
    }

    #[tokio::test]
    async fn test_ensure_channels_is_idempotent() {
        let mut sync = DeviceSync::new(MemoryStore::new());
        let sensors = vec![SensorId::from("AA:BB")];
        sync.ensure_channels(&sensors).await.unwrap();
        sync.ensure_channels(&sensors).await.unwrap();
        assert_eq!(sync.store().len(), crate::channels::channel_count(1));
    }
}
