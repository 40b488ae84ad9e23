//! Boundary to the external device hub that stores channel records.
//!
//! The bridge never assumes how the hub stores records; everything goes
//! through the [`DeviceStore`] capability trait. A missing slot means "not
//! yet created", not an error.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::{BridgeError, Result};

/// Value held by one hub record: a numeric flag plus the string rendering
/// shown in the hub UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelValue {
    pub numeric: i32,
    pub text: String,
}

impl ChannelValue {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            numeric: 0,
            text: text.into(),
        }
    }
}

/// Device record operations the hub exposes to the bridge.
#[async_trait]
pub trait DeviceStore: Send + Sync {
    async fn exists(&self, slot: u16) -> bool;

    /// Create the record for `slot`. Called once per new channel, never per
    /// poll.
    async fn create(&mut self, slot: u16, name: &str, device_type: &str) -> Result<()>;

    /// Currently stored value, or `None` when the record has never been
    /// written.
    async fn current_value(&self, slot: u16) -> Option<ChannelValue>;

    async fn write(&mut self, slot: u16, value: ChannelValue, battery: u8) -> Result<()>;
}

/// One record in the in-memory hub.
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    pub name: String,
    pub device_type: String,
    pub value: Option<ChannelValue>,
    pub battery: Option<u8>,
}

/// In-memory hub, used by the simulated setup and by tests.
///
/// Counts writes so change gating is observable from the outside.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<u16, DeviceRecord>,
    writes: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of write calls accepted since creation.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, slot: u16) -> Option<&DeviceRecord> {
        self.records.get(&slot)
    }
}

#[async_trait]
impl DeviceStore for MemoryStore {
    async fn exists(&self, slot: u16) -> bool {
        self.records.contains_key(&slot)
    }

    async fn create(&mut self, slot: u16, name: &str, device_type: &str) -> Result<()> {
        if self.records.contains_key(&slot) {
            return Err(BridgeError::HubCreate {
                slot,
                reason: "slot already exists".into(),
            });
        }
        self.records.insert(
            slot,
            DeviceRecord {
                name: name.to_string(),
                device_type: device_type.to_string(),
                value: None,
                battery: None,
            },
        );
        Ok(())
    }

    async fn current_value(&self, slot: u16) -> Option<ChannelValue> {
        self.records.get(&slot).and_then(|r| r.value.clone())
    }

    async fn write(&mut self, slot: u16, value: ChannelValue, battery: u8) -> Result<()> {
        let record = self.records.get_mut(&slot).ok_or(BridgeError::HubWrite {
            slot,
            reason: "no such slot".into(),
        })?;
        record.value = Some(value);
        record.battery = Some(battery);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_write_then_read_back() {
        let mut store = MemoryStore::new();
        store.create(2, "#0 Moisture", "Humidity").await.unwrap();
        assert!(store.exists(2).await);
        assert_eq!(store.current_value(2).await, None);

        store.write(2, ChannelValue::text("25"), 80).await.unwrap();
        assert_eq!(store.current_value(2).await, Some(ChannelValue::text("25")));
        assert_eq!(store.record(2).unwrap().battery, Some(80));
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_write_to_missing_slot_fails() {
        let mut store = MemoryStore::new();
        let err = store.write(9, ChannelValue::text("1"), 50).await;
        assert!(err.is_err());
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_double_create_fails() {
        let mut store = MemoryStore::new();
        store.create(1, "switch", "Switch").await.unwrap();
        assert!(store.create(1, "switch", "Switch").await.is_err());
    }
}
