//! Typed configuration, built from CLI arguments and environment variables.

use clap::{Parser, ValueEnum};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BridgeError, Result};
use crate::registry::{SensorId, SensorRegistry};

/// Load environment variables from a `.env` file next to the binary.
///
/// Real environment variables take precedence over file entries.
pub fn load_dotenv() {
    let Ok(content) = fs::read_to_string(Path::new(".env")) else {
        return;
    };

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim().trim_matches('"').trim_matches('\''));
        if std::env::var(key).is_err() {
            // SAFETY: called from main before the async runtime starts.
            unsafe { std::env::set_var(key, value) };
        }
    }
}

/// How the working sensor set is determined at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiscoveryMode {
    /// Scan for sensors and merge the result into the persistent registry.
    Auto,
    /// Use the configured identity list for this session; the scan cache is
    /// neither consulted nor rewritten.
    Manual,
}

#[derive(Debug, Parser)]
#[command(
    name = "flora-bridge",
    about = "Polls BLE plant sensors and mirrors readings into a device hub"
)]
pub struct Cli {
    /// How to find sensors: scan automatically, or take --sensors as given.
    #[arg(long, value_enum, default_value = "auto", env = "FLORA_DISCOVERY_MODE")]
    pub mode: DiscoveryMode,

    /// Comma-separated sensor MAC addresses (required in manual mode).
    #[arg(long, default_value = "", env = "FLORA_SENSORS")]
    pub sensors: String,

    /// Requested poll interval in minutes; clamped to 60..=1440.
    #[arg(long, default_value_t = 60, env = "FLORA_POLL_INTERVAL")]
    pub interval: i64,

    /// Heartbeat period in seconds (how often the schedule is checked).
    #[arg(long, default_value_t = 20, env = "FLORA_HEARTBEAT")]
    pub heartbeat: u64,

    /// Sensor registry cache file; defaults to the platform data directory.
    #[arg(long, env = "FLORA_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Enable debug logging and the startup config dump.
    #[arg(long, env = "FLORA_DEBUG")]
    pub debug: bool,
}

/// Validated bridge configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub discovery_mode: DiscoveryMode,
    pub manual_identities: Vec<SensorId>,
    pub interval_minutes: i64,
    pub heartbeat_secs: u64,
    pub registry_path: PathBuf,
    pub debug: bool,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let manual_identities = parse_identity_csv(&cli.sensors);
        if cli.mode == DiscoveryMode::Manual && manual_identities.is_empty() {
            return Err(BridgeError::InvalidConfig(
                "manual mode requires a non-empty --sensors list".into(),
            ));
        }
        if cli.heartbeat == 0 {
            return Err(BridgeError::InvalidConfig(
                "heartbeat period must be at least 1 second".into(),
            ));
        }

        Ok(Self {
            discovery_mode: cli.mode,
            manual_identities,
            interval_minutes: cli.interval,
            heartbeat_secs: cli.heartbeat,
            registry_path: cli.registry.unwrap_or_else(SensorRegistry::default_path),
            debug: cli.debug,
        })
    }

    /// Log every configuration field, for debug mode startups.
    pub fn dump(&self) {
        debug!("Configuration:");
        debug!("  discovery mode: {:?}", self.discovery_mode);
        debug!(
            "  manual sensors: [{}]",
            self.manual_identities
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        debug!("  requested interval: {} minutes", self.interval_minutes);
        debug!("  heartbeat: {} seconds", self.heartbeat_secs);
        debug!("  registry cache: {}", self.registry_path.display());
    }
}

/// Parse a comma-separated identity list: entries are trimmed and
/// uppercased, empty entries and repeats are dropped.
pub fn parse_identity_csv(raw: &str) -> Vec<SensorId> {
    let mut identities: Vec<SensorId> = Vec::new();
    for part in raw.split(',') {
        let token = part.trim();
        if token.is_empty() {
            continue;
        }
        let id = SensorId::new(token.to_uppercase());
        if !identities.contains(&id) {
            identities.push(id);
        }
    }
    identities
}
