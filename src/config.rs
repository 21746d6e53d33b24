//! Tunable constants of the pad, loaded from TOML
//!
//! Every section has sensible defaults so a missing or partial file still
//! yields a working pad. The loader mirrors the session files of the
//! persistence layer: a missing file falls back to defaults with a warning,
//! a broken file is an error.

use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = "webpad";
const CONFIG_FILE: &str = "config.toml";

/// Complete pad configuration
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct PadConfig {
    pub haptics: HapticSettings,
    pub geometry: GeometrySettings,
    pub sensing: SensingSettings,
    pub scheduler: SchedulerSettings,
    pub debug: DebugSettings,
}

/// Vibration switches and pulse lengths, in milliseconds
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct HapticSettings {
    /// Click when a joystick or knob crosses into another sector
    pub vibrate_on_octant_boundary: bool,
    /// Keep vibrating while a control is forced past its limit
    pub vibrate_on_pad_boundary: bool,
    /// Scale the saturation pulse by how far past the limit the finger is
    pub vibrate_proportionally_to_distance: bool,
    /// Touching a control
    pub enter_ms: u64,
    /// Crossing a sector boundary
    pub octant_ms: u64,
    pub saturation_pulse_ms: u64,
    pub saturation_pause_ms: u64,
    /// Pressing or releasing a thumbstick button
    pub thumb_ms: u64,
    /// Any D-pad state change
    pub dpad_ms: u64,
}

impl Default for HapticSettings {
    fn default() -> Self {
        Self {
            vibrate_on_octant_boundary: true,
            vibrate_on_pad_boundary: true,
            vibrate_proportionally_to_distance: true,
            enter_ms: 40,
            octant_ms: 20,
            saturation_pulse_ms: 10,
            saturation_pause_ms: 10,
            thumb_ms: 35,
            dpad_ms: 35,
        }
    }
}

impl HapticSettings {
    pub fn enter(&self) -> Duration {
        Duration::from_millis(self.enter_ms)
    }

    pub fn octant(&self) -> Duration {
        Duration::from_millis(self.octant_ms)
    }

    pub fn thumb(&self) -> Duration {
        Duration::from_millis(self.thumb_ms)
    }

    pub fn dpad(&self) -> Duration {
        Duration::from_millis(self.dpad_ms)
    }

    pub fn saturation_pause(&self) -> Duration {
        Duration::from_millis(self.saturation_pause_ms)
    }

    /// Saturation pulse, optionally scaled by `distance` (1.0 = exactly at the limit)
    pub fn saturation_pulse(&self, distance: f32) -> Duration {
        let base = self.saturation_pulse_ms as f32;
        let millis = if self.vibrate_proportionally_to_distance {
            base * distance.max(0.0)
        } else {
            base
        };
        Duration::from_micros((millis * 1000.0).round() as u64)
    }
}

/// Hitbox proportions
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GeometrySettings {
    /// Length of a D-pad leg hitbox, from border towards center, relative to the pad
    pub dpad_leg_length: f32,
    /// Width of a D-pad leg hitbox, across its length, relative to the pad
    pub dpad_leg_width: f32,
    /// Pixels added left and right of a button's visible area
    pub button_overshoot_width: f32,
    /// Pixels added above and below a button's visible area
    pub button_overshoot_height: f32,
}

impl Default for GeometrySettings {
    fn default() -> Self {
        Self {
            dpad_leg_length: 0.4,
            dpad_leg_width: 0.5,
            button_overshoot_width: 7.0,
            button_overshoot_height: 7.0,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SensingSettings {
    /// Scales raw accelerometer readings (m/s²) before centering
    pub acceleration_constant: f32,
    /// Analog buttons multiply their simulated force by this and saturate.
    /// The dead zone, relative to the hitbox, is `1 - 1 / k`.
    pub analog_deadzone_constant: f32,
    /// Number of haptic sectors in one knob revolution
    pub knob_sectors: u16,
}

impl Default for SensingSettings {
    fn default() -> Self {
        Self {
            acceleration_constant: 0.025,
            analog_deadzone_constant: 1.10,
            knob_sectors: 16,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Haptic ticks per second, usually the display refresh rate
    pub tick_hz: u32,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self { tick_hz: 60 }
    }
}

impl SchedulerSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_hz.max(1) as f64)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct DebugSettings {
    /// Log a hex dump of the state buffer on every push
    pub log_state_dumps: bool,
}

impl PadConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| eyre!("Failed to parse pad config: {}", e))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| eyre!("Failed to serialize pad config: {}", e))
    }

    /// `<config dir>/webpad/config.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push(CONFIG_DIR);
            path.push(CONFIG_FILE);
            path
        })
    }

    /// Loads `path`, or the default location when `path` is `None`.
    ///
    /// A missing file is not an error, the defaults are used instead.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => {
                warn!("No config directory available, using default pad config");
                return Ok(Self::default());
            }
        };

        if !tokio::fs::try_exists(&path)
            .await
            .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?
        {
            warn!(
                "Config file {} does not exist, using default pad config",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded pad config from {}", path.display());
        debug!("Pad config: {:?}", config);
        Ok(config)
    }

    /// Writes the config, creating parent directories as needed
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
        }
        tokio::fs::write(path, self.to_toml_string()?)
            .await
            .map_err(|e| eyre!("Failed to write config file: {}", e))?;
        info!("Saved pad config to {}", path.display());
        Ok(())
    }
}
