//! Tunables for normalization, synthesis and polling.
//!
//! Everything has a default, so `Config::default()` is a complete configuration.
//! Hosts that want to tweak values can load a TOML file:
//!
//! ```toml
//! accuracy = 3
//! accepted_categories = ["gamepad", "joystick", "wheel"]
//!
//! [normalize]
//! directinput_noise_floor = 0.05
//! evdev_noise_floor = 0.0
//!
//! [synth]
//! split_directinput_z = true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metadata::DeviceCategory;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Decimal places values are rounded to before comparison and storage.
    /// `None` keeps full float precision.
    pub accuracy: Option<u32>,
    pub normalize: NormalizeConfig,
    pub synth: SynthConfig,
    /// Device categories the registry accepts during initialization.
    pub accepted_categories: Vec<DeviceCategory>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accuracy: None,
            normalize: NormalizeConfig::default(),
            synth: SynthConfig::default(),
            accepted_categories: vec![DeviceCategory::Gamepad, DeviceCategory::Joystick],
        }
    }
}

/// Per-platform normalization constants.
///
/// The noise floors differ per platform: DirectInput axes jitter visibly around
/// center, evdev drivers already filter with `flat`/`fuzz`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    pub directinput_noise_floor: f32,
    pub evdev_noise_floor: f32,
    pub iokit_noise_floor: f32,
    pub xinput_left_thumb_deadzone: i16,
    pub xinput_right_thumb_deadzone: i16,
    pub xinput_trigger_threshold: u8,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            directinput_noise_floor: 0.05,
            evdev_noise_floor: 0.0,
            iokit_noise_floor: 0.0,
            // XINPUT_GAMEPAD_*_THUMB_DEADZONE / XINPUT_GAMEPAD_TRIGGER_THRESHOLD
            xinput_left_thumb_deadzone: 7849,
            xinput_right_thumb_deadzone: 8689,
            xinput_trigger_threshold: 30,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Split DirectInput's shared Z axis into left (Z) and right trigger axes.
    pub split_directinput_z: bool,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            split_directinput_z: true,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let n = &self.normalize;
        for (name, floor) in [
            ("directinput_noise_floor", n.directinput_noise_floor),
            ("evdev_noise_floor", n.evdev_noise_floor),
            ("iokit_noise_floor", n.iokit_noise_floor),
        ] {
            if !(0.0..1.0).contains(&floor) {
                return Err(Error::Config(format!("{name} must be in [0, 1), got {floor}")));
            }
        }
        if n.xinput_left_thumb_deadzone < 0 || n.xinput_right_thumb_deadzone < 0 {
            return Err(Error::Config("xinput deadzones must not be negative".into()));
        }
        if matches!(self.accuracy, Some(places) if places > 9) {
            return Err(Error::Config("accuracy is limited to 9 decimal places".into()));
        }
        Ok(())
    }
}
