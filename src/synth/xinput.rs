//! XInput classification.
//!
//! XInput has no enumeration: every controller exposes the same fixed report
//! (`XINPUT_GAMEPAD`). [`native_layout`] describes it as native descriptors;
//! axis codes are positions in the report, button codes are `wButtons` masks.
//! The D-Pad already arrives as four buttons, so no hat is synthesized.

use crate::component::{ids, ComponentId, ComponentRegistry, ComponentType};
use crate::config::Config;

use super::{Classified, NativeComponentDescriptor, NativeKind, Platform, Role, Rule, Synthesizer};

pub const LEFT_THUMB_X: i32 = 0;
pub const LEFT_THUMB_Y: i32 = 1;
pub const RIGHT_THUMB_X: i32 = 2;
pub const RIGHT_THUMB_Y: i32 = 3;
pub const LEFT_TRIGGER: i32 = 4;
pub const RIGHT_TRIGGER: i32 = 5;

pub const GAMEPAD_DPAD_UP: i32 = 0x0001;
pub const GAMEPAD_DPAD_DOWN: i32 = 0x0002;
pub const GAMEPAD_DPAD_LEFT: i32 = 0x0004;
pub const GAMEPAD_DPAD_RIGHT: i32 = 0x0008;
pub const GAMEPAD_START: i32 = 0x0010;
pub const GAMEPAD_BACK: i32 = 0x0020;
pub const GAMEPAD_LEFT_THUMB: i32 = 0x0040;
pub const GAMEPAD_RIGHT_THUMB: i32 = 0x0080;
pub const GAMEPAD_LEFT_SHOULDER: i32 = 0x0100;
pub const GAMEPAD_RIGHT_SHOULDER: i32 = 0x0200;
pub const GAMEPAD_GUIDE: i32 = 0x0400;
pub const GAMEPAD_A: i32 = 0x1000;
pub const GAMEPAD_B: i32 = 0x2000;
pub const GAMEPAD_X: i32 = 0x4000;
pub const GAMEPAD_Y: i32 = 0x8000;

/// `wButtons` masks in report order.
pub const BUTTON_MASKS: [(i32, &str); 15] = [
    (GAMEPAD_DPAD_UP, "DPAD_UP"),
    (GAMEPAD_DPAD_DOWN, "DPAD_DOWN"),
    (GAMEPAD_DPAD_LEFT, "DPAD_LEFT"),
    (GAMEPAD_DPAD_RIGHT, "DPAD_RIGHT"),
    (GAMEPAD_START, "START"),
    (GAMEPAD_BACK, "BACK"),
    (GAMEPAD_LEFT_THUMB, "LEFT_THUMB"),
    (GAMEPAD_RIGHT_THUMB, "RIGHT_THUMB"),
    (GAMEPAD_LEFT_SHOULDER, "LEFT_SHOULDER"),
    (GAMEPAD_RIGHT_SHOULDER, "RIGHT_SHOULDER"),
    (GAMEPAD_GUIDE, "GUIDE"),
    (GAMEPAD_A, "A"),
    (GAMEPAD_B, "B"),
    (GAMEPAD_X, "X"),
    (GAMEPAD_Y, "Y"),
];

/// Native descriptors of one XInput controller: six axes, then every button mask.
pub fn native_layout() -> Vec<NativeComponentDescriptor> {
    let mut layout = vec![
        NativeComponentDescriptor::axis(LEFT_THUMB_X, i16::MIN as i64, i16::MAX as i64, "sThumbLX"),
        NativeComponentDescriptor::axis(LEFT_THUMB_Y, i16::MIN as i64, i16::MAX as i64, "sThumbLY"),
        NativeComponentDescriptor::axis(RIGHT_THUMB_X, i16::MIN as i64, i16::MAX as i64, "sThumbRX"),
        NativeComponentDescriptor::axis(RIGHT_THUMB_Y, i16::MIN as i64, i16::MAX as i64, "sThumbRY"),
        NativeComponentDescriptor::axis(LEFT_TRIGGER, 0, 255, "bLeftTrigger"),
        NativeComponentDescriptor::axis(RIGHT_TRIGGER, 0, 255, "bRightTrigger"),
    ];
    layout.extend(
        BUTTON_MASKS
            .iter()
            .map(|&(mask, name)| NativeComponentDescriptor::button(mask, name)),
    );
    layout
}

/// Flattens one `XINPUT_GAMEPAD` report into the raw vector matching [`native_layout`].
pub fn raw_sample(lx: i16, ly: i16, rx: i16, ry: i16, lt: u8, rt: u8, buttons: u16) -> Vec<f32> {
    let mut raw = Vec::with_capacity(6 + BUTTON_MASKS.len());
    raw.extend([lx as f32, ly as f32, rx as f32, ry as f32, lt as f32, rt as f32]);
    raw.extend(BUTTON_MASKS.iter().map(|&(mask, _)| {
        if buttons as i32 & mask != 0 {
            1.0
        } else {
            0.0
        }
    }));
    raw
}

#[derive(Debug, Clone)]
pub struct XInputSynthesizer {
    left_deadzone: i16,
    right_deadzone: i16,
    trigger_threshold: u8,
}

impl XInputSynthesizer {
    pub fn new(config: &Config) -> Self {
        Self {
            left_deadzone: config.normalize.xinput_left_thumb_deadzone,
            right_deadzone: config.normalize.xinput_right_thumb_deadzone,
            trigger_threshold: config.normalize.xinput_trigger_threshold,
        }
    }

    fn button_id(mask: i32) -> Option<ComponentId> {
        Some(match mask {
            GAMEPAD_DPAD_UP => ids::DPAD_UP,
            GAMEPAD_DPAD_DOWN => ids::DPAD_DOWN,
            GAMEPAD_DPAD_LEFT => ids::DPAD_LEFT,
            GAMEPAD_DPAD_RIGHT => ids::DPAD_RIGHT,
            GAMEPAD_START => ids::START,
            GAMEPAD_BACK => ids::BACK,
            GAMEPAD_LEFT_THUMB => ids::LEFT_THUMB,
            GAMEPAD_RIGHT_THUMB => ids::RIGHT_THUMB,
            GAMEPAD_LEFT_SHOULDER => ids::LEFT_SHOULDER,
            GAMEPAD_RIGHT_SHOULDER => ids::RIGHT_SHOULDER,
            GAMEPAD_GUIDE => ids::GUIDE,
            GAMEPAD_A => ids::A,
            GAMEPAD_B => ids::B,
            GAMEPAD_X => ids::BUTTON_X,
            GAMEPAD_Y => ids::BUTTON_Y,
            _ => return None,
        })
    }
}

impl Synthesizer for XInputSynthesizer {
    fn platform(&self) -> Platform {
        Platform::XInput
    }

    fn classify(&self, native: &NativeComponentDescriptor, registry: &ComponentRegistry) -> Classified {
        match native.kind {
            NativeKind::Axis => {
                let (id, rule) = match native.native_code {
                    LEFT_THUMB_X => (ids::X, Rule::SignedStick { deadzone: self.left_deadzone }),
                    LEFT_THUMB_Y => (ids::Y, Rule::SignedStick { deadzone: self.left_deadzone }),
                    RIGHT_THUMB_X => (ids::RX, Rule::SignedStick { deadzone: self.right_deadzone }),
                    RIGHT_THUMB_Y => (ids::RY, Rule::SignedStick { deadzone: self.right_deadzone }),
                    LEFT_TRIGGER => (ids::LEFT_TRIGGER, Rule::Trigger { threshold: self.trigger_threshold }),
                    RIGHT_TRIGGER => (ids::RIGHT_TRIGGER, Rule::Trigger { threshold: self.trigger_threshold }),
                    _ if native.relative => (
                        registry.vendor(ComponentType::Unknown, &native.display_name),
                        Rule::Relative,
                    ),
                    _ => (
                        registry.vendor(ComponentType::Unknown, &native.display_name),
                        Rule::Axis {
                            min: native.min,
                            max: native.max,
                            deadzone: 0.0,
                            noise_floor: 0.0,
                        },
                    ),
                };
                Classified {
                    id,
                    role: Role::Value(rule),
                }
            }
            NativeKind::Button | NativeKind::Key | NativeKind::Pov => {
                let id = Self::button_id(native.native_code)
                    .unwrap_or_else(|| registry.vendor(ComponentType::Unknown, &native.display_name));
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
    use crate::component::DeviceRef;
    use crate::synth::prepare_virtual_components;
    use uuid::Uuid;

    fn layout() -> crate::synth::VirtualLayout {
        let registry = ComponentRegistry::new();
        let s = XInputSynthesizer::new(&Config::default());
        prepare_virtual_components(&s, DeviceRef(Uuid::nil()), &native_layout(), &registry)
    }

    #[test]
    fn test_fixed_layout_is_all_well_known() {
        let layout = layout();
        assert_eq!(layout.components().len(), 21);
        assert!(layout.components().iter().all(|c| c.id().is_well_known()));
        assert!(layout.index_of(&ids::POV).is_none());
    }

    #[test]
    fn test_sticks_triggers_and_buttons() {
        let layout = layout();
        let raw = raw_sample(i16::MAX, 5_000, i16::MIN, 0, 255, 10, (GAMEPAD_A | GAMEPAD_DPAD_LEFT) as u16);
        let values = layout.redistribute_polled_values(&raw);

        let at = |id: ComponentId| values[layout.index_of(&id).expect("slot")];
        assert_eq!(at(ids::X), 1.0);
        // Inside the left stick deadzone.
        assert_eq!(at(ids::Y), 0.0);
        assert_eq!(at(ids::RX), -1.0);
        assert_eq!(at(ids::LEFT_TRIGGER), 1.0);
        // Below the trigger threshold.
        assert_eq!(at(ids::RIGHT_TRIGGER), 0.0);
        assert_eq!(at(ids::A), 1.0);
        assert_eq!(at(ids::DPAD_LEFT), 1.0);
        assert_eq!(at(ids::B), 0.0);
    }

    #[test]
    fn test_raw_sample_high_mask() {
        let raw = raw_sample(0, 0, 0, 0, 0, 0, 0x8000);
        assert_eq!(raw.len(), 21);
        assert_eq!(raw[20], 1.0);
        assert_eq!(raw[6..20].iter().sum::<f32>(), 0.0);
    }

    #[test]
    fn test_unknown_axis_is_normalized_over_its_range() {
        let registry = ComponentRegistry::new();
        let s = XInputSynthesizer::new(&Config::default());
        let native = vec![
            NativeComponentDescriptor::axis(42, 0, 100, "Extra"),
            NativeComponentDescriptor::axis(43, 0, 0, "Wheel").relative(),
        ];
        let layout = prepare_virtual_components(&s, DeviceRef(Uuid::nil()), &native, &registry);
        assert_eq!(layout.redistribute_polled_values(&[1e20, 7.0]), vec![1.0, 7.0]);
        assert_eq!(layout.redistribute_polled_values(&[50.0, -3.0]), vec![0.0, -3.0]);
    }
}
