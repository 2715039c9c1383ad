//! Simulation settings with persistence
//!
//! Settings are read from `~/.config/momentum/settings.toml` unless a path is
//! given on the command line. Every section is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use momentum_core::TimeConfig;
use momentum_game::movement::MovementConfig;
use momentum_game::stamina::StaminaConfig;

use crate::script::InputScript;

/// Errors reading or writing a settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Everything the simulation binary can be tuned with
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumSettings {
    pub movement: MovementConfig,
    pub stamina: StaminaConfig,
    pub time: TimeConfig,
    pub simulation: SimulationSettings,
}

/// Headless run parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Simulated seconds to run
    pub duration: f32,
    /// Host frame rate feeding the fixed-step clock
    pub frame_rate: f32,
    /// Where to write the per-tick JSON trace, if anywhere
    pub trace_path: Option<PathBuf>,
    /// Input commands to play back
    pub script: InputScript,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            duration: 12.0,
            frame_rate: 144.0,
            trace_path: None,
            script: InputScript::default(),
        }
    }
}

impl MomentumSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("momentum"))
    }

    /// Get the default settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Parse settings from TOML text
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, SettingsError> {
        toml::from_str(content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings from an explicit file. Any failure is an error.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml(&content, path)?;
        info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Load settings from the config directory, or return defaults if missing or broken
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Write these settings to the config directory
    pub fn save(&self) -> Result<PathBuf, SettingsError> {
        let dir = Self::config_dir().ok_or(SettingsError::NoConfigDir)?;
        let path = dir.join("settings.toml");

        // Create config directory if it doesn't exist
        fs::create_dir_all(&dir).map_err(|source| SettingsError::Write {
            path: dir.clone(),
            source,
        })?;

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content).map_err(|source| SettingsError::Write {
            path: path.clone(),
            source,
        })?;
        info!("Saved settings to {:?}", path);
        Ok(path)
    }
}
