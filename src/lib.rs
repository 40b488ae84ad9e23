//! Flora Bridge library.
//!
//! Polls battery-powered BLE plant sensors on a fixed interval, reconciles
//! discovered sensors against a persistent cache, maps each sensor to a
//! stable set of hub channel slots, and pushes readings into the device hub
//! only when values change.

pub mod bridge;
pub mod channels;
pub mod config;
pub mod discovery;
pub mod error;
pub mod hub;
pub mod input;
pub mod instance_lock;
pub mod poll;
pub mod reader;
pub mod reading;
pub mod registry;
pub mod scheduler;
pub mod sync;
