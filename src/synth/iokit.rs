//! macOS IOKit HID classification.
//!
//! `native_code` packs the element's HID usage as `(usage_page << 16) | usage`
//! (see [`usage`]). Hat switches report one of eight logical positions starting
//! at the element's logical minimum; any other value is the null (centered) state.

use crate::component::{ids, ComponentId, ComponentRegistry, ComponentType};
use crate::config::Config;
use crate::normalize::evdev_deadzone_ratio;

use super::{Classified, HatDecode, NativeComponentDescriptor, NativeKind, Platform, Role, Rule, Synthesizer};

pub const PAGE_GENERIC_DESKTOP: u16 = 0x01;
pub const PAGE_SIMULATION: u16 = 0x02;
pub const PAGE_KEYBOARD: u16 = 0x07;
pub const PAGE_BUTTON: u16 = 0x09;

pub const GD_X: u16 = 0x30;
pub const GD_Y: u16 = 0x31;
pub const GD_Z: u16 = 0x32;
pub const GD_RX: u16 = 0x33;
pub const GD_RY: u16 = 0x34;
pub const GD_RZ: u16 = 0x35;
pub const GD_SLIDER: u16 = 0x36;
pub const GD_DIAL: u16 = 0x37;
pub const GD_WHEEL: u16 = 0x38;
pub const GD_HAT_SWITCH: u16 = 0x39;
pub const GD_DPAD_UP: u16 = 0x90;
pub const GD_DPAD_DOWN: u16 = 0x91;
pub const GD_DPAD_RIGHT: u16 = 0x92;
pub const GD_DPAD_LEFT: u16 = 0x93;

pub const SIM_RUDDER: u16 = 0xBA;
pub const SIM_THROTTLE: u16 = 0xBB;
pub const SIM_ACCELERATOR: u16 = 0xC4;
pub const SIM_BRAKE: u16 = 0xC5;

/// Packs a HID usage into a `native_code`.
pub const fn usage(page: u16, usage: u16) -> i32 {
    ((page as i32) << 16) | usage as i32
}

#[derive(Debug, Clone)]
pub struct IoKitSynthesizer {
    noise_floor: f32,
}

impl IoKitSynthesizer {
    pub fn new(config: &Config) -> Self {
        Self {
            noise_floor: config.normalize.iokit_noise_floor,
        }
    }

    fn well_known(page: u16, u: u16) -> Option<ComponentId> {
        Some(match (page, u) {
            (PAGE_GENERIC_DESKTOP, GD_X) => ids::X,
            (PAGE_GENERIC_DESKTOP, GD_Y) => ids::Y,
            (PAGE_GENERIC_DESKTOP, GD_Z) => ids::Z,
            (PAGE_GENERIC_DESKTOP, GD_RX) => ids::RX,
            (PAGE_GENERIC_DESKTOP, GD_RY) => ids::RY,
            (PAGE_GENERIC_DESKTOP, GD_RZ) => ids::RZ,
            (PAGE_GENERIC_DESKTOP, GD_SLIDER) => ids::SLIDER,
            (PAGE_GENERIC_DESKTOP, GD_DIAL) => ids::DIAL,
            (PAGE_GENERIC_DESKTOP, GD_WHEEL) => ids::WHEEL,
            (PAGE_GENERIC_DESKTOP, GD_HAT_SWITCH) => ids::POV,
            (PAGE_GENERIC_DESKTOP, GD_DPAD_UP) => ids::DPAD_UP,
            (PAGE_GENERIC_DESKTOP, GD_DPAD_DOWN) => ids::DPAD_DOWN,
            (PAGE_GENERIC_DESKTOP, GD_DPAD_RIGHT) => ids::DPAD_RIGHT,
            (PAGE_GENERIC_DESKTOP, GD_DPAD_LEFT) => ids::DPAD_LEFT,
            (PAGE_SIMULATION, SIM_RUDDER) => ids::RUDDER,
            (PAGE_SIMULATION, SIM_THROTTLE) => ids::THROTTLE,
            (PAGE_SIMULATION, SIM_ACCELERATOR) => ids::RIGHT_TRIGGER,
            (PAGE_SIMULATION, SIM_BRAKE) => ids::LEFT_TRIGGER,
            // HID buttons are 1-based.
            (PAGE_BUTTON, n) if n >= 1 => return ids::button(n as u32 - 1),
            _ => return None,
        })
    }

    fn fallback_kind(page: u16, kind: NativeKind) -> ComponentType {
        match (page, kind) {
            (PAGE_KEYBOARD, _) => ComponentType::Key,
            (PAGE_GENERIC_DESKTOP | PAGE_SIMULATION | PAGE_BUTTON, NativeKind::Axis) => {
                ComponentType::Axis
            }
            (PAGE_GENERIC_DESKTOP | PAGE_SIMULATION | PAGE_BUTTON, NativeKind::Button) => {
                ComponentType::Button
            }
            _ => ComponentType::Unknown,
        }
    }
}

impl Synthesizer for IoKitSynthesizer {
    fn platform(&self) -> Platform {
        Platform::IoKit
    }

    fn classify(&self, native: &NativeComponentDescriptor, registry: &ComponentRegistry) -> Classified {
        let page = (native.native_code >> 16) as u16;
        let u = (native.native_code & 0xFFFF) as u16;
        let is_hat =
            (page == PAGE_GENERIC_DESKTOP && u == GD_HAT_SWITCH) || native.kind == NativeKind::Pov;

        let id = match Self::well_known(page, u) {
            Some(id) if !is_hat || id == ids::POV => id,
            _ if is_hat => registry.vendor(ComponentType::Pov, &native.display_name),
            _ => registry.vendor(Self::fallback_kind(page, native.kind), &native.display_name),
        };

        let role = if is_hat {
            Role::Hat(HatDecode::Position { min: native.min })
        } else {
            match native.kind {
                NativeKind::Axis if native.relative => Role::Value(Rule::Relative),
                NativeKind::Axis => Role::Value(Rule::Axis {
                    min: native.min,
                    max: native.max,
                    deadzone: evdev_deadzone_ratio(native.deadzone, native.min, native.max),
                    noise_floor: self.noise_floor,
                }),
                _ => Role::Value(Rule::Binary),
            }
        };

        Classified { id, role }
    }
}
