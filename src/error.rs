use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum BridgeError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to load sensor registry from {path}: {source}")]
    RegistryLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to persist sensor registry to {path}: {source}")]
    RegistryPersist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sensor {identity} unreachable: {reason}")]
    SensorUnreachable { identity: String, reason: String },

    #[error("hub rejected write to slot {slot}: {reason}")]
    HubWrite { slot: u16, reason: String },

    #[error("hub rejected creation of slot {slot}: {reason}")]
    HubCreate { slot: u16, reason: String },

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
