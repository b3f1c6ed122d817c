//! Player settings and preferences
//!
//! Persisted in LocalStorage on the web; read from an optional
//! `settings.json` next to the binary on native.

use serde::{Deserialize, Serialize};

use crate::consts::LOOK_SENSITIVITY;
use crate::error::Result;
use crate::sim::SessionConfig;

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Background music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Cue and loop volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Controls ===
    /// Radians of view rotation per pointer pixel
    pub mouse_sensitivity: f32,

    // === HUD ===
    /// Show the stats overlay at start (toggled in-game with C)
    pub show_stats: bool,

    /// Fixed spike-field seed; a fresh one is drawn per session when unset
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            music_volume: 0.7,
            sfx_volume: 1.0,

            mouse_sensitivity: LOOK_SENSITIVITY,

            show_stats: false,

            seed: None,
        }
    }
}

impl Settings {
    /// Parse settings JSON. Missing fields take their defaults; volumes are clamped.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn sanitized(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        if !(self.mouse_sensitivity.is_finite() && self.mouse_sensitivity > 0.0) {
            self.mouse_sensitivity = LOOK_SENSITIVITY;
        }
        self
    }

    /// Effective music volume
    pub fn music_gain(&self) -> f32 {
        self.master_volume * self.music_volume
    }

    /// Effective cue/loop volume
    pub fn sfx_gain(&self) -> f32 {
        self.master_volume * self.sfx_volume
    }

    /// Session start parameters. `fresh_seed` is used unless a seed is pinned.
    pub fn session_config(&self, fresh_seed: u64) -> SessionConfig {
        SessionConfig {
            seed: self.seed.unwrap_or(fresh_seed),
            ..SessionConfig::default()
        }
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "monolith_walk_settings";

    #[cfg(target_arch = "wasm32")]
    fn storage() -> Result<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| crate::Error::SettingsStorage("LocalStorage unavailable".into()))
    }

    /// Load settings from LocalStorage, falling back to defaults
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let stored = Self::storage().and_then(|storage| {
            storage
                .get_item(Self::STORAGE_KEY)
                .map_err(|_| crate::Error::SettingsStorage("read failed".into()))
        });

        match stored {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring stored settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("{}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> Result<()> {
        let json = self.to_json()?;
        Self::storage()?
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|_| crate::Error::SettingsStorage("write failed".into()))?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Native settings file
    #[cfg(not(target_arch = "wasm32"))]
    const SETTINGS_FILE: &'static str = "settings.json";

    /// Load `settings.json` if present, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        match std::fs::read_to_string(Self::SETTINGS_FILE) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", Self::SETTINGS_FILE);
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring {}: {}", Self::SETTINGS_FILE, e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(Self::SETTINGS_FILE, json)
            .map_err(|e| crate::Error::SettingsStorage(e.to_string()))?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{"music_volume": 0.25}"#).unwrap();
        assert_eq!(settings.music_volume, 0.25);
        assert_eq!(settings.master_volume, Settings::default().master_volume);
        assert_eq!(settings.mouse_sensitivity, LOOK_SENSITIVITY);
        assert_eq!(settings.seed, None);
    }

    #[test]
    fn test_volumes_clamped() {
        let settings =
            Settings::from_json(r#"{"master_volume": 3.0, "sfx_volume": -1.0}"#).unwrap();
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.sfx_volume, 0.0);
        assert_eq!(settings.sfx_gain(), 0.0);
    }

    #[test]
    fn test_bad_sensitivity_reset() {
        let settings = Settings::from_json(r#"{"mouse_sensitivity": 0.0}"#).unwrap();
        assert_eq!(settings.mouse_sensitivity, LOOK_SENSITIVITY);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let err = Settings::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::SettingsParse(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings {
            seed: Some(99),
            show_stats: true,
            ..Settings::default()
        };
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_session_config_seed() {
        let settings = Settings::default();
        assert_eq!(settings.session_config(7).seed, 7);
        assert_eq!(settings.session_config(7).start_phase, 0.0);

        let pinned = Settings {
            seed: Some(3),
            ..Settings::default()
        };
        assert_eq!(pinned.session_config(7).seed, 3);
    }
}
