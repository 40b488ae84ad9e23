//! Persistent cache of known sensor identities.
//!
//! The registry is the single source of truth for "which sensors exist".
//! Discovery only ever appends to it; a sensor that stops answering scans is
//! kept so it can be polled again when it comes back into range. Removal is
//! a manual operation (delete or edit the cache file).

use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{BridgeError, Result};

/// Hardware address of one sensor (e.g. "C4:7C:8D:6A:2E:01").
///
/// The token is opaque to the bridge: equality is exact-string, and the
/// registry keeps identities in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorId(String);

impl SensorId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SensorId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Ordered, duplicate-free set of known sensors, backed by a JSON file.
#[derive(Debug)]
pub struct SensorRegistry {
    path: PathBuf,
    identities: Vec<SensorId>,
}

impl SensorRegistry {
    /// Open the registry at `path`, loading any previously persisted
    /// identities.
    ///
    /// A missing file is a first run, not an error. A corrupt file is logged
    /// and treated as empty; the next persist overwrites it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let identities = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(ids) => ids,
                Err(e) => {
                    warn!(
                        "Sensor registry {} is corrupt ({}); starting with an empty set",
                        path.display(),
                        e
                    );
                    Vec::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => {
                return Err(BridgeError::RegistryLoad {
                    path: path.clone(),
                    source,
                });
            }
        };
        Ok(Self { path, identities })
    }

    /// Default cache location under the platform data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flora-bridge")
            .join("sensors.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Known identities, in discovery order.
    pub fn identities(&self) -> &[SensorId] {
        &self.identities
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Append every identity in `discovered` that is not already known,
    /// preserving existing order. Returns the newly appended identities;
    /// an empty return means the registry is unchanged.
    pub fn merge(&mut self, discovered: &[SensorId]) -> Vec<SensorId> {
        let mut added = Vec::new();
        for id in discovered {
            if !self.identities.contains(id) {
                self.identities.push(id.clone());
                added.push(id.clone());
            }
        }
        added
    }

    /// Durably store the full identity sequence, replacing prior contents.
    ///
    /// Writes to a sibling temp file and renames it into place, so a crash
    /// mid-write leaves either the old or the new set, never a torn file.
    pub fn persist(&self) -> Result<()> {
        let persist_err = |source| BridgeError::RegistryPersist {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(persist_err)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let raw = serde_json::to_string_pretty(&self.identities)?;
        fs::write(&tmp, raw).map_err(persist_err)?;
        fs::rename(&tmp, &self.path).map_err(persist_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "flora-registry-{}-{}.json",
            std::process::id(),
            name
        ))
    }

    fn ids(raw: &[&str]) -> Vec<SensorId> {
        raw.iter().map(|s| SensorId::from(*s)).collect()
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let path = temp_path("missing");
        let _ = fs::remove_file(&path);
        let registry = SensorRegistry::open(&path).unwrap();
        assert!(registry.is_empty());
    }

    fn open_fresh(name: &str) -> SensorRegistry {
        let path = temp_path(name);
        let _ = fs::remove_file(&path);
        SensorRegistry::open(path).unwrap()
    }

    #[test]
    fn test_merge_appends_in_discovery_order() {
        let mut registry = open_fresh("order");
        let added = registry.merge(&ids(&["AA:BB", "CC:DD"]));
        assert_eq!(added, ids(&["AA:BB", "CC:DD"]));

        // New identities land after existing ones.
        let added = registry.merge(&ids(&["EE:FF", "AA:BB"]));
        assert_eq!(added, ids(&["EE:FF"]));
        assert_eq!(registry.identities(), ids(&["AA:BB", "CC:DD", "EE:FF"]));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut registry = open_fresh("idempotent");
        let discovered = ids(&["AA:BB", "CC:DD"]);
        assert_eq!(registry.merge(&discovered).len(), 2);
        assert!(registry.merge(&discovered).is_empty());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_merge_drops_duplicates_within_sweep() {
        let mut registry = open_fresh("dups");
        let added = registry.merge(&ids(&["AA:BB", "AA:BB"]));
        assert_eq!(added, ids(&["AA:BB"]));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_persist_round_trips() {
        let path = temp_path("roundtrip");
        let _ = fs::remove_file(&path);

        let mut registry = SensorRegistry::open(&path).unwrap();
        registry.merge(&ids(&["AA:BB", "CC:DD"]));
        registry.persist().unwrap();

        let reopened = SensorRegistry::open(&path).unwrap();
        assert_eq!(reopened.identities(), ids(&["AA:BB", "CC:DD"]));

        // No temp file left behind after a successful persist.
        assert!(!path.with_extension("json.tmp").exists());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_recovers_as_empty() {
        let path = temp_path("corrupt");
        fs::write(&path, "not json at all").unwrap();
        let registry = SensorRegistry::open(&path).unwrap();
        assert!(registry.is_empty());
        let _ = fs::remove_file(&path);
    }
}
