//! DirectInput classification.
//!
//! `native_code` is the object's offset in the `DIJOYSTATE2` data format
//! (`DIJOFS_X`, `DIJOFS_POV(n)`, `DIJOFS_BUTTON(n)`, ...). Axis deadzones use
//! DirectInput's `DIPROP_DEADZONE` units (`0..=10000` of the half range).
//!
//! Buttons are raw state bytes (high bit = pressed); POVs are hundredths of a
//! degree with `0xFFFF` for centered. The shared Z axis carries the left trigger
//! on its positive half and the right trigger on its negative half.

use crate::component::{ids, ComponentId, ComponentRegistry, ComponentType};
use crate::config::Config;

use super::{Classified, HatDecode, NativeComponentDescriptor, NativeKind, Platform, Role, Rule, Synthesizer};

pub const DIJOFS_X: i32 = 0;
pub const DIJOFS_Y: i32 = 4;
pub const DIJOFS_Z: i32 = 8;
pub const DIJOFS_RX: i32 = 12;
pub const DIJOFS_RY: i32 = 16;
pub const DIJOFS_RZ: i32 = 20;
pub const DIJOFS_SLIDER0: i32 = 24;
pub const DIJOFS_SLIDER1: i32 = 28;
pub const DIJOFS_POV0: i32 = 32;
pub const DIJOFS_BUTTON0: i32 = 48;

/// `DIJOFS_POV(n)`
pub const fn dijofs_pov(n: i32) -> i32 {
    DIJOFS_POV0 + 4 * n
}

/// `DIJOFS_BUTTON(n)`
pub const fn dijofs_button(n: i32) -> i32 {
    DIJOFS_BUTTON0 + n
}

/// Full scale of `DIPROP_DEADZONE`.
const DEADZONE_SCALE: f32 = 10_000.0;

#[derive(Debug, Clone)]
pub struct DirectInputSynthesizer {
    noise_floor: f32,
    split_z: bool,
}

impl DirectInputSynthesizer {
    pub fn new(config: &Config) -> Self {
        Self {
            noise_floor: config.normalize.directinput_noise_floor,
            split_z: config.synth.split_directinput_z,
        }
    }

    fn axis_id(code: i32) -> Option<ComponentId> {
        Some(match code {
            DIJOFS_X => ids::X,
            DIJOFS_Y => ids::Y,
            DIJOFS_Z => ids::Z,
            DIJOFS_RX => ids::RX,
            DIJOFS_RY => ids::RY,
            DIJOFS_RZ => ids::RZ,
            DIJOFS_SLIDER0 => ids::SLIDER,
            DIJOFS_SLIDER1 => ids::DIAL,
            _ => return None,
        })
    }
}

impl Synthesizer for DirectInputSynthesizer {
    fn platform(&self) -> Platform {
        Platform::DirectInput
    }

    fn classify(&self, native: &NativeComponentDescriptor, registry: &ComponentRegistry) -> Classified {
        let code = native.native_code;
        match native.kind {
            NativeKind::Axis => {
                let id = Self::axis_id(code)
                    .unwrap_or_else(|| registry.vendor(ComponentType::Axis, &native.display_name));
                if native.relative {
                    return Classified {
                        id,
                        role: Role::Value(Rule::Relative),
                    };
                }
                let rule = Rule::Axis {
                    min: native.min,
                    max: native.max,
                    deadzone: (native.deadzone.clamp(0, 10_000) as f32) / DEADZONE_SCALE,
                    noise_floor: self.noise_floor,
                };
                let role = if code == DIJOFS_Z && self.split_z {
                    Role::SplitTrigger(rule)
                } else {
                    Role::Value(rule)
                };
                Classified { id, role }
            }
            NativeKind::Pov => {
                let id = if code == DIJOFS_POV0 {
                    ids::POV
                } else {
                    registry.vendor(ComponentType::Pov, &native.display_name)
                };
                Classified {
                    id,
                    role: Role::Hat(HatDecode::Angle),
                }
            }
            NativeKind::Button => {
                let id = code
                    .checked_sub(DIJOFS_BUTTON0)
                    .and_then(|n| u32::try_from(n).ok())
                    .and_then(ids::button)
                    .unwrap_or_else(|| registry.vendor(ComponentType::Button, &native.display_name));
                Classified {
                    id,
                    role: Role::Value(Rule::HighBitButton),
                }
            }
            NativeKind::Key => Classified {
                id: registry.vendor(ComponentType::Key, &native.display_name),
                role: Role::Value(Rule::HighBitButton),
            },
        }
    }
}
