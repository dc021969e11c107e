//! Runner settings with persistence
//!
//! Settings are read from the path given on the command line, otherwise
//! from `~/.config/tessera/settings.toml`, otherwise defaults are used.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tessera_scene::WorldConfig;
use tracing::{info, warn, Level};

/// All runner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Maximum log level: trace, debug, info, warn or error
    pub log_level: String,
    /// Number of frames to simulate
    pub frames: u32,
    /// Raw seconds fed to the world per frame
    pub delta: f32,
    /// Run the render pass after every tick
    pub render: bool,
    pub world: WorldConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            frames: 120,
            delta: 1.0 / 60.0,
            render: true,
            world: WorldConfig::default(),
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tessera"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from `path`, or from the config directory. A missing,
    /// unreadable, or malformed file falls back to defaults with a warning.
    pub fn load(path: Option<&Path>) -> Self {
        if let Some(path) = path {
            if !path.exists() {
                warn!("Settings file {:?} does not exist, using defaults", path);
                return Self::default();
            }
            return Self::load_from(path);
        }

        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        Self::load_from(&path)
    }

    fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings {:?}: {}, using defaults", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Save settings to the config directory
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        let path = dir.join("settings.toml");

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(path)
    }

    /// Parsed log level, falling back to `INFO`
    pub fn level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }
}
