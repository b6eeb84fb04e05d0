//! Linux evdev classification.
//!
//! `native_code` is the kernel event code: `ABS_*` for absolute axes, `REL_*`
//! for relative axes, `BTN_*`/`KEY_*` for buttons and keys. Hats arrive as
//! `ABS_HATnX`/`ABS_HATnY` pairs and are split into D-Pad buttons; on the
//! vertical half a positive value is Up, on the horizontal half a negative
//! value is Right.

use crate::component::{ids, remap, ComponentId, ComponentRegistry, ComponentType};
use crate::config::Config;
use crate::normalize::evdev_deadzone_ratio;

use super::{Classified, HatAxis, NativeComponentDescriptor, NativeKind, Platform, Role, Rule, Synthesizer};

pub const ABS_X: i32 = 0x00;
pub const ABS_Y: i32 = 0x01;
pub const ABS_Z: i32 = 0x02;
pub const ABS_RX: i32 = 0x03;
pub const ABS_RY: i32 = 0x04;
pub const ABS_RZ: i32 = 0x05;
pub const ABS_THROTTLE: i32 = 0x06;
pub const ABS_RUDDER: i32 = 0x07;
pub const ABS_WHEEL: i32 = 0x08;
pub const ABS_GAS: i32 = 0x09;
pub const ABS_BRAKE: i32 = 0x0a;
pub const ABS_HAT0X: i32 = 0x10;
pub const ABS_HAT0Y: i32 = 0x11;
pub const ABS_HAT3Y: i32 = 0x17;
pub const ABS_MAX: i32 = 0x3f;

pub const REL_X: i32 = 0x00;
pub const REL_Y: i32 = 0x01;
pub const REL_WHEEL: i32 = 0x08;

pub const BTN_MISC: i32 = 0x100;
pub const BTN_JOYSTICK: i32 = 0x120;
pub const BTN_DEAD: i32 = 0x12f;
pub const BTN_SOUTH: i32 = 0x130;
pub const BTN_EAST: i32 = 0x131;
pub const BTN_NORTH: i32 = 0x133;
pub const BTN_WEST: i32 = 0x134;
pub const BTN_TL: i32 = 0x136;
pub const BTN_TR: i32 = 0x137;
pub const BTN_SELECT: i32 = 0x13a;
pub const BTN_START: i32 = 0x13b;
pub const BTN_MODE: i32 = 0x13c;
pub const BTN_THUMBL: i32 = 0x13d;
pub const BTN_THUMBR: i32 = 0x13e;
pub const BTN_DPAD_UP: i32 = 0x220;
pub const BTN_DPAD_DOWN: i32 = 0x221;
pub const BTN_DPAD_LEFT: i32 = 0x222;
pub const BTN_DPAD_RIGHT: i32 = 0x223;
pub const KEY_MAX: i32 = 0x2ff;

#[derive(Debug, Clone)]
pub struct EvdevSynthesizer {
    noise_floor: f32,
}

impl EvdevSynthesizer {
    pub fn new(config: &Config) -> Self {
        Self {
            noise_floor: config.normalize.evdev_noise_floor,
        }
    }

    fn absolute_axis(code: i32) -> Option<ComponentId> {
        Some(match code {
            ABS_X => ids::X,
            ABS_Y => ids::Y,
            ABS_Z => ids::Z,
            ABS_RX => ids::RX,
            ABS_RY => ids::RY,
            ABS_RZ => ids::RZ,
            ABS_THROTTLE => ids::THROTTLE,
            ABS_RUDDER => ids::RUDDER,
            ABS_WHEEL => ids::WHEEL,
            ABS_GAS => ids::RIGHT_TRIGGER,
            ABS_BRAKE => ids::LEFT_TRIGGER,
            _ => return None,
        })
    }

    fn gamepad_button(code: i32) -> Option<ComponentId> {
        Some(match code {
            BTN_SOUTH => ids::A,
            BTN_EAST => ids::B,
            BTN_NORTH => ids::BUTTON_X,
            BTN_WEST => ids::BUTTON_Y,
            BTN_TL => ids::LEFT_SHOULDER,
            BTN_TR => ids::RIGHT_SHOULDER,
            BTN_SELECT => ids::BACK,
            BTN_START => ids::START,
            BTN_MODE => ids::GUIDE,
            BTN_THUMBL => ids::LEFT_THUMB,
            BTN_THUMBR => ids::RIGHT_THUMB,
            BTN_DPAD_UP => ids::DPAD_UP,
            BTN_DPAD_DOWN => ids::DPAD_DOWN,
            BTN_DPAD_LEFT => ids::DPAD_LEFT,
            BTN_DPAD_RIGHT => ids::DPAD_RIGHT,
            _ => return None,
        })
    }

    fn classify_hat(native: &NativeComponentDescriptor, registry: &ComponentRegistry) -> Classified {
        let offset = (native.native_code - ABS_HAT0X) as u32;
        let hat = offset / 2;
        let axis = if offset % 2 == 0 {
            HatAxis::Horizontal
        } else {
            HatAxis::Vertical
        };
        let id = match (hat, axis) {
            (0, HatAxis::Horizontal) => ids::POV_X,
            (0, HatAxis::Vertical) => ids::POV_Y,
            _ => registry.vendor(ComponentType::Pov, &native.display_name),
        };
        Classified {
            id,
            role: Role::HatAxis {
                hat,
                axis,
                min: native.min,
                max: native.max,
            },
        }
    }
}

impl Synthesizer for EvdevSynthesizer {
    fn platform(&self) -> Platform {
        Platform::Evdev
    }

    fn classify(&self, native: &NativeComponentDescriptor, registry: &ComponentRegistry) -> Classified {
        let code = native.native_code;
        match native.kind {
            NativeKind::Axis if native.relative => {
                let id = match code {
                    REL_X => ids::X,
                    REL_Y => ids::Y,
                    REL_WHEEL => ids::WHEEL,
                    _ => registry.vendor(ComponentType::Axis, &native.display_name),
                };
                Classified {
                    id,
                    role: Role::Value(Rule::Relative),
                }
            }
            NativeKind::Axis | NativeKind::Pov if (ABS_HAT0X..=ABS_HAT3Y).contains(&code) => {
                Self::classify_hat(native, registry)
            }
            NativeKind::Axis | NativeKind::Pov => {
                let rule = Rule::Axis {
                    min: native.min,
                    max: native.max,
                    deadzone: evdev_deadzone_ratio(native.deadzone, native.min, native.max),
                    noise_floor: self.noise_floor,
                };
                let id = match Self::absolute_axis(code) {
                    Some(id) => id,
                    None if (0..=ABS_MAX).contains(&code) => {
                        registry.vendor(ComponentType::Axis, &native.display_name)
                    }
                    None => registry.vendor(ComponentType::Unknown, &native.display_name),
                };
                Classified {
                    id,
                    role: Role::Value(rule),
                }
            }
            NativeKind::Button | NativeKind::Key => {
                let id = if let Some(id) = Self::gamepad_button(code) {
                    id
                } else if (BTN_JOYSTICK..=BTN_DEAD).contains(&code) {
                    // Joystick buttons keep their kernel name on the generic slot.
                    match ids::button((code - BTN_JOYSTICK) as u32) {
                        Some(base) => remap(&base, native.display_name.clone()),
                        None => registry.vendor(ComponentType::Button, &native.display_name),
                    }
                } else if code < BTN_MISC && code >= 0 {
                    registry.vendor(ComponentType::Key, &native.display_name)
                } else if code <= KEY_MAX && code >= 0 {
                    registry.vendor(ComponentType::Button, &native.display_name)
                } else {
                    registry.vendor(ComponentType::Unknown, &native.display_name)
                };
                Classified {
                    id,
                    role: Role::Value(Rule::Binary),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{DeviceRef, MAX_DEFAULT_ID};
    use crate::synth::prepare_virtual_components;
    use uuid::Uuid;

    fn synth() -> EvdevSynthesizer {
        EvdevSynthesizer::new(&Config::default())
    }

    #[test]
    fn test_gamepad_codes() {
        let registry = ComponentRegistry::new();
        let s = synth();
        let south = s.classify(&NativeComponentDescriptor::button(BTN_SOUTH, "BTN_SOUTH"), &registry);
        assert_eq!(south.id, ids::A);
        let stick = s.classify(
            &NativeComponentDescriptor::axis(ABS_RY, -32768, 32767, "ABS_RY"),
            &registry,
        );
        assert_eq!(stick.id, ids::RY);
    }

    #[test]
    fn test_joystick_buttons_are_remapped() {
        let registry = ComponentRegistry::new();
        let trigger = synth().classify(
            &NativeComponentDescriptor::button(BTN_JOYSTICK, "Trigger"),
            &registry,
        );
        assert_eq!(trigger.id, ids::A);
        assert_eq!(trigger.id.name(), "Trigger");
    }

    #[test]
    fn test_misses_get_fresh_ids() {
        let registry = ComponentRegistry::new();
        let s = synth();
        let key = s.classify(&NativeComponentDescriptor::key(30, "KEY_A"), &registry);
        assert_eq!(key.id.kind(), ComponentType::Key);
        assert!(key.id.numeric_id() > MAX_DEFAULT_ID);

        let odd = s.classify(&NativeComponentDescriptor::axis(0x50, 0, 10, "???"), &registry);
        assert_eq!(odd.id.kind(), ComponentType::Unknown);
        assert!(odd.id.numeric_id() > MAX_DEFAULT_ID);
    }

    #[test]
    fn test_flat_becomes_deadzone() {
        let registry = ComponentRegistry::new();
        let native = vec![NativeComponentDescriptor::axis(ABS_X, -100, 100, "ABS_X").with_deadzone(40)];
        let layout = prepare_virtual_components(&synth(), DeviceRef(Uuid::nil()), &native, &registry);
        // ratio = 40 / 400 = 0.1
        assert_eq!(layout.redistribute_polled_values(&[5.0]), vec![0.0]);
        assert_eq!(layout.redistribute_polled_values(&[100.0]), vec![1.0]);
    }

    #[test]
    fn test_relative_axis_is_not_clamped() {
        let registry = ComponentRegistry::new();
        let native = vec![NativeComponentDescriptor::axis(REL_X, 0, 0, "REL_X").relative()];
        let layout = prepare_virtual_components(&synth(), DeviceRef(Uuid::nil()), &native, &registry);
        assert!(layout.components()[0].is_relative());
        assert_eq!(layout.redistribute_polled_values(&[-42.0]), vec![-42.0]);
    }

    #[test]
    fn test_hat_pair_shares_one_dpad() {
        let registry = ComponentRegistry::new();
        let native = vec![
            NativeComponentDescriptor::axis(ABS_HAT0X, -1, 1, "ABS_HAT0X"),
            NativeComponentDescriptor::axis(ABS_HAT0Y, -1, 1, "ABS_HAT0Y"),
        ];
        let layout = prepare_virtual_components(&synth(), DeviceRef(Uuid::nil()), &native, &registry);
        assert_eq!(layout.components().len(), 6);

        let down_left = layout.redistribute_polled_values(&[1.0, -1.0]);
        // [hat x, hat y, up, down, left, right]
        assert_eq!(down_left, vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0]);
    }
}
