use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default location, relative to the working directory.
pub const CONFIG_FILE: &str = "rocket.toml";
/// Overrides [`CONFIG_FILE`] when set.
pub const CONFIG_ENV: &str = "ROCKET_CONFIG";

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub tuning: Tuning,
    pub physics: PhysicsConfig,
    pub input: InputConfig,
    pub debug: DebugConfig,
    pub audio: AudioConfig,
}

/// Controller tunables.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct Tuning {
    /// Acceleration along the nose while thrusting, px/s².
    pub main_thrust: f32,
    /// Turn rate, degrees per second.
    pub rcs_thrust: f32,
    /// Seconds between the end of a run and the next scene load.
    pub load_level_delay: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            main_thrust: 620.0,
            rcs_thrust: 150.0,
            load_level_delay: 2.0,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration, px/s².
    pub gravity: f32,
    pub restitution: f32,
    pub friction: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 260.0,
            restitution: 0.2,
            friction: 0.6,
            linear_damping: 0.05,
            angular_damping: 1.5,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeviceSetting {
    #[default]
    Auto,
    Keyboard,
    Touch,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct InputConfig {
    pub device: DeviceSetting,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DebugConfig {
    /// `L` skips a level, `C` toggles collisions. Unset means "debug builds only".
    pub keys: Option<bool>,
}

impl DebugConfig {
    pub fn keys_enabled(&self) -> bool {
        self.keys.unwrap_or(cfg!(debug_assertions))
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub dir: PathBuf,
    pub volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets/audio"),
            volume: 0.8,
        }
    }
}

impl GameConfig {
    /// Loads from `ROCKET_CONFIG` or `rocket.toml`, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> Result<Self> {
        let path = env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

        if !path.exists() {
            info!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let config = Self::from_path(&path)?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| GameError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| GameError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!(?config, "Config validated");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        positive("tuning.main_thrust", self.tuning.main_thrust)?;
        positive("tuning.rcs_thrust", self.tuning.rcs_thrust)?;
        non_negative("tuning.load_level_delay", self.tuning.load_level_delay)?;
        non_negative("physics.gravity", self.physics.gravity)?;
        non_negative("physics.linear_damping", self.physics.linear_damping)?;
        non_negative("physics.angular_damping", self.physics.angular_damping)?;
        unit("physics.restitution", self.physics.restitution)?;
        unit("physics.friction", self.physics.friction)?;
        unit("audio.volume", self.audio.volume)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GameError::InvalidConfig {
            field,
            reason: format!("{value} must be greater than zero"),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GameError::InvalidConfig {
            field,
            reason: format!("{value} must not be negative"),
        })
    }
}

fn unit(field: &'static str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GameError::InvalidConfig {
            field,
            reason: format!("{value} must be within 0..=1"),
        })
    }
}
