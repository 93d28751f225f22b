//! Game settings and preferences
//!
//! Stored as JSON. Missing fields fall back to their defaults so older
//! settings files keep loading.

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::platform::KeyBindings;

/// Errors loading or saving settings
#[derive(Debug)]
pub enum SettingsError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "settings file: {e}"),
            Self::Json(e) => write!(f, "settings JSON: {e}"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

impl From<io::Error> for SettingsError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,

    // === Display ===
    /// Pixels per tile
    pub scale: f32,
    /// Largest viewport in pixels; smaller levels use their own size
    pub max_width: f32,
    pub max_height: f32,

    // === Input ===
    pub keys: KeyBindings,

    // === Progression ===
    /// Level index a new game starts at
    pub start_level: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,

            scale: 50.0,
            max_width: 1006.0,
            max_height: 506.0,

            keys: KeyBindings::default(),

            start_level: 0,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults if the file is missing or bad
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load_from(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings ({e})");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved");
        Ok(())
    }
}
