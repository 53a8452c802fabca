//! Save/load of the progression snapshot
//!
//! Features:
//! - One flat JSON record under a fixed key
//! - Legacy field names (`money`, `upgrades`) accepted on load
//! - Missing or malformed records fall back to defaults, never an error

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::platform::KeyValueStore;
use crate::progression::Upgrades;

/// Storage key for the progression record
pub const SAVE_KEY: &str = "flightGameSave";

/// Persisted progression record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressSnapshot {
    #[serde(alias = "money")]
    pub balance: u64,
    #[serde(rename = "upgradeLevel", alias = "upgrades")]
    pub upgrade_level: Upgrades,
}

impl ProgressSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Read the saved snapshot. Absent, unreadable and malformed records all
/// yield `None` so the caller starts from defaults.
pub fn load_progress(store: &dyn KeyValueStore) -> Option<ProgressSnapshot> {
    let json = match store.get_item(SAVE_KEY) {
        Ok(Some(json)) => json,
        Ok(None) => return None,
        Err(err) => {
            log::warn!("Failed to read saved progress: {err}");
            return None;
        }
    };

    match ProgressSnapshot::from_json(&json) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            log::warn!("Ignoring malformed saved progress: {err}");
            None
        }
    }
}

/// Write the snapshot under [`SAVE_KEY`]
pub fn save_progress(store: &mut dyn KeyValueStore, snapshot: &ProgressSnapshot) -> Result<()> {
    let json = snapshot.to_json()?;
    store.set_item(SAVE_KEY, &json)?;
    log::debug!("Progress saved (balance {})", snapshot.balance);
    Ok(())
}
