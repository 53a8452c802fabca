//! Game settings and preferences
//!
//! Persisted separately from progression in the key-value store.

use serde::{Deserialize, Serialize};

use crate::platform::KeyValueStore;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Re-roll the whole world when flying again (otherwise the old layout stays)
    pub regenerate_world_on_restart: bool,
    /// "+10" labels over collected items
    pub floating_text: bool,
    /// Glider trail
    pub trails: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            regenerate_world_on_restart: true,
            floating_text: true,
            trails: true,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "paperGlideSettings";

    /// Load settings, falling back to defaults on missing or malformed data
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    settings
                }
                Err(err) => {
                    log::warn!("Ignoring malformed settings: {err}");
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(err) => {
                log::warn!("Failed to read settings: {err}");
                Self::default()
            }
        }
    }

    /// Save settings
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        let result = serde_json::to_string(self)
            .map_err(crate::Error::from)
            .and_then(|json| store.set_item(Self::STORAGE_KEY, &json));
        match result {
            Ok(()) => log::info!("Settings saved"),
            Err(err) => log::warn!("Failed to save settings: {err}"),
        }
    }
}
