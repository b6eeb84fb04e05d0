//! Virtual component synthesis.
//!
//! Native APIs disagree on the shape of a gamepad. This module reconciles them
//! into one canonical component list per device:
//!
//! - **Hats → D-Pad buttons.** DirectInput reports a POV angle, IOKit a hat
//!   position, evdev two `ABS_HAT0X`/`ABS_HAT0Y` axes. Each hat gets four appended
//!   Button components (`D-Pad Up/Down/Left/Right` for the first hat, vendor
//!   buttons for any further hats). At poll time the native hat slot is zeroed and
//!   the direction is written into those buttons.
//! - **Shared Z split.** DirectInput folds both triggers into one signed Z axis.
//!   A `Right Trigger` axis is appended; negative Z moves into it as `abs(z)`.
//! - **Vendor fallback.** Native objects with no well-known role keep a vendor
//!   identity from [`ComponentRegistry::vendor`].
//!
//! [`prepare_virtual_components`] fixes the component order once per device and
//! returns a [`VirtualLayout`]. [`VirtualLayout::redistribute_polled_values`] is
//! then applied to every raw poll vector. Both are pure with respect to their
//! inputs; all platform policy is captured in the layout's routing plan.

pub mod directinput;
pub mod evdev;
pub mod iokit;
pub mod xinput;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::component::{ids, Component, ComponentId, ComponentRegistry, ComponentType, DeviceRef};
use crate::config::Config;
use crate::normalize::{
    apply_deadzone, normalize_axis, normalize_binary, normalize_button, normalize_iokit_hat,
    normalize_pov, normalize_signed, normalize_trigger, noise_floor, PovToken,
};

pub use directinput::DirectInputSynthesizer;
pub use evdev::EvdevSynthesizer;
pub use iokit::IoKitSynthesizer;
pub use xinput::XInputSynthesizer;

/// Native API a device was enumerated through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    DirectInput,
    XInput,
    Evdev,
    IoKit,
}

impl Platform {
    /// Default platform for the build target.
    pub fn current() -> Platform {
        if cfg!(target_os = "windows") {
            Platform::DirectInput
        } else if cfg!(target_os = "macos") {
            Platform::IoKit
        } else {
            Platform::Evdev
        }
    }

    /// Builds this platform's synthesizer with the given tunables.
    pub fn synthesizer(self, config: &Config) -> Box<dyn Synthesizer> {
        match self {
            Platform::DirectInput => Box::new(DirectInputSynthesizer::new(config)),
            Platform::XInput => Box::new(XInputSynthesizer::new(config)),
            Platform::Evdev => Box::new(EvdevSynthesizer::new(config)),
            Platform::IoKit => Box::new(IoKitSynthesizer::new(config)),
        }
    }
}

/// Native object category as reported during enumeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeKind {
    Axis,
    Button,
    Pov,
    Key,
}

/// One native object, as produced by a backend's enumeration pass.
///
/// `native_code` is platform specific: an evdev `ABS_*`/`BTN_*` code, a
/// DirectInput `DIJOFS_*` offset, an IOKit `(usage_page << 16) | usage`, or an
/// XInput layout code (see [`xinput`]).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeComponentDescriptor {
    pub kind: NativeKind,
    pub native_code: i32,
    pub min: i64,
    pub max: i64,
    /// Raw-unit deadzone (evdev `flat`, IOKit) or DirectInput `0..=10000` ratio units.
    pub deadzone: i64,
    pub relative: bool,
    pub display_name: String,
}

impl NativeComponentDescriptor {
    pub fn axis(native_code: i32, min: i64, max: i64, display_name: impl Into<String>) -> Self {
        Self {
            kind: NativeKind::Axis,
            native_code,
            min,
            max,
            deadzone: 0,
            relative: false,
            display_name: display_name.into(),
        }
    }

    pub fn button(native_code: i32, display_name: impl Into<String>) -> Self {
        Self {
            kind: NativeKind::Button,
            native_code,
            min: 0,
            max: 1,
            deadzone: 0,
            relative: false,
            display_name: display_name.into(),
        }
    }

    pub fn key(native_code: i32, display_name: impl Into<String>) -> Self {
        Self {
            kind: NativeKind::Key,
            ..Self::button(native_code, display_name)
        }
    }

    pub fn pov(native_code: i32, min: i64, max: i64, display_name: impl Into<String>) -> Self {
        Self {
            kind: NativeKind::Pov,
            ..Self::axis(native_code, min, max, display_name)
        }
    }

    pub fn with_deadzone(mut self, deadzone: i64) -> Self {
        self.deadzone = deadzone;
        self
    }

    pub fn relative(mut self) -> Self {
        self.relative = true;
        self
    }
}

/// Conversion from one raw sample to one canonical value.
#[derive(Clone, Debug, PartialEq)]
pub enum Rule {
    /// Linear range scaling, then deadzone ratio, then platform noise floor.
    Axis {
        min: i64,
        max: i64,
        deadzone: f32,
        noise_floor: f32,
    },
    /// Delta axis: native units pass through unclamped.
    Relative,
    /// DirectInput button byte (high bit).
    HighBitButton,
    /// Any non-zero sample is pressed.
    Binary,
    /// XInput-style signed 16-bit stick.
    SignedStick { deadzone: i16 },
    /// XInput-style trigger byte.
    Trigger { threshold: u8 },
}

impl Rule {
    pub fn apply(&self, raw: f32) -> f32 {
        if raw.is_nan() {
            return 0.0;
        }
        match *self {
            Rule::Axis {
                min,
                max,
                deadzone,
                noise_floor: floor,
            } => noise_floor(
                apply_deadzone(normalize_axis(raw as f64, min, max), deadzone),
                floor,
            ),
            Rule::Relative => raw,
            Rule::HighBitButton => normalize_button(raw.clamp(0.0, 255.0) as u8),
            Rule::Binary => normalize_binary(raw as f64),
            Rule::SignedStick { deadzone } => normalize_signed(
                raw.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16,
                deadzone,
            ),
            Rule::Trigger { threshold } => {
                normalize_trigger(raw.round().clamp(0.0, 255.0) as u8, threshold)
            }
        }
    }
}

/// How a hat sample decodes into a direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HatDecode {
    /// Hundredths of a degree clockwise from north, `0xFFFF` centered.
    Angle,
    /// Eight logical positions starting at `min`, anything else centered.
    Position { min: i64 },
}

impl HatDecode {
    fn decode(self, raw: f32) -> PovToken {
        if !raw.is_finite() {
            return PovToken::Centered;
        }
        match self {
            HatDecode::Angle => normalize_pov(raw.round() as i64),
            HatDecode::Position { min } => normalize_iokit_hat(raw.round() as i64, min),
        }
    }
}

/// Which half of a split (two-axis) hat a native axis carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HatAxis {
    /// Left/right. Negative is Right.
    Horizontal,
    /// Up/down. Positive is Up.
    Vertical,
}

/// Canonical role a platform assigns to one native descriptor.
#[derive(Clone, Debug, PartialEq)]
pub enum Role {
    /// Plain 1:1 value.
    Value(Rule),
    /// Single-value hat, expanded into four buttons.
    Hat(HatDecode),
    /// One half of a split hat. Halves with the same `hat` share their buttons.
    HatAxis {
        hat: u32,
        axis: HatAxis,
        min: i64,
        max: i64,
    },
    /// Signed axis whose negative half is split into an appended `Right Trigger`.
    SplitTrigger(Rule),
}

/// Result of classifying one native descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct Classified {
    pub id: ComponentId,
    pub role: Role,
}

/// Per-platform classification policy.
pub trait Synthesizer: Send + Sync {
    fn platform(&self) -> Platform;

    /// Picks the canonical identity and value role for one native descriptor.
    ///
    /// Misses must still yield an identity (vendor or `Unknown`); never fails.
    fn classify(&self, native: &NativeComponentDescriptor, registry: &ComponentRegistry) -> Classified;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct DpadSlots {
    up: usize,
    down: usize,
    left: usize,
    right: usize,
}

#[derive(Clone, Debug, PartialEq)]
enum Route {
    Direct {
        slot: usize,
        rule: Rule,
    },
    Hat {
        slot: usize,
        decode: HatDecode,
        dpad: DpadSlots,
    },
    HatAxis {
        slot: usize,
        axis: HatAxis,
        min: i64,
        max: i64,
        dpad: DpadSlots,
    },
    Split {
        slot: usize,
        negative_slot: usize,
        rule: Rule,
    },
}

/// Fixed canonical layout of one device plus the plan that fills it.
#[derive(Clone, Debug)]
pub struct VirtualLayout {
    platform: Platform,
    components: Vec<Component>,
    routes: Vec<Route>,
}

impl VirtualLayout {
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Canonical components in their fixed order: native objects first (in
    /// enumeration order), then synthesized ones.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Number of native samples one raw poll vector is expected to carry.
    pub fn native_count(&self) -> usize {
        self.routes.len()
    }

    /// Position of `id` in the canonical order.
    pub fn index_of(&self, id: &ComponentId) -> Option<usize> {
        self.components.iter().position(|c| c.id() == id)
    }

    /// Expands one raw native vector into the canonical vector.
    ///
    /// The result always has `components().len()` entries. Missing native
    /// samples leave their canonical slots at `0.0`; surplus samples are ignored.
    pub fn redistribute_polled_values(&self, raw: &[f32]) -> Vec<f32> {
        let mut out = vec![0.0f32; self.components.len()];

        for (route, &sample) in self.routes.iter().zip(raw) {
            match route {
                Route::Direct { slot, rule } => out[*slot] = rule.apply(sample),
                Route::Hat { slot, decode, dpad } => {
                    out[*slot] = 0.0;
                    let (up, down, left, right) = decode.decode(sample).directions();
                    out[dpad.up] = bit(up);
                    out[dpad.down] = bit(down);
                    out[dpad.left] = bit(left);
                    out[dpad.right] = bit(right);
                }
                Route::HatAxis {
                    slot,
                    axis,
                    min,
                    max,
                    dpad,
                } => {
                    out[*slot] = 0.0;
                    let v = if sample.is_nan() {
                        0.0
                    } else {
                        normalize_axis(sample as f64, *min, *max)
                    };
                    match axis {
                        HatAxis::Vertical => {
                            out[dpad.up] = bit(v > 0.5);
                            out[dpad.down] = bit(v < -0.5);
                        }
                        HatAxis::Horizontal => {
                            out[dpad.left] = bit(v > 0.5);
                            out[dpad.right] = bit(v < -0.5);
                        }
                    }
                }
                Route::Split {
                    slot,
                    negative_slot,
                    rule,
                } => {
                    let v = rule.apply(sample);
                    if v < 0.0 {
                        out[*slot] = 0.0;
                        out[*negative_slot] = -v;
                    } else {
                        out[*slot] = v;
                        out[*negative_slot] = 0.0;
                    }
                }
            }
        }

        out
    }
}

#[inline]
fn bit(on: bool) -> f32 {
    if on {
        1.0
    } else {
        0.0
    }
}

/// Hat grouping key: angle hats are one group each, split hats group by hat number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum HatGroup {
    Angle(usize),
    Split(u32),
}

/// Builds the fixed canonical layout for one device.
///
/// Called once per device before its first poll.
pub fn prepare_virtual_components(
    synthesizer: &dyn Synthesizer,
    device: DeviceRef,
    native: &[NativeComponentDescriptor],
    registry: &ComponentRegistry,
) -> VirtualLayout {
    let mut components = Vec::with_capacity(native.len() + 4);
    let mut used: HashSet<ComponentId> = HashSet::new();
    let mut roles = Vec::with_capacity(native.len());

    for (index, desc) in native.iter().enumerate() {
        let Classified { id, role } = synthesizer.classify(desc, registry);
        let id = unique_id(id, desc, index, &used, registry);
        used.insert(id.clone());
        components.push(Component::new(device, id, desc.relative));
        roles.push(role);
    }

    // Appended hats, in order of first appearance.
    let mut hat_groups: Vec<(HatGroup, DpadSlots)> = Vec::new();
    let mut routes = Vec::with_capacity(native.len());
    let mut trigger_slot: Option<usize> = None;

    for (slot, role) in roles.into_iter().enumerate() {
        let route = match role {
            Role::Value(rule) => Route::Direct { slot, rule },
            Role::Hat(decode) => {
                let group = HatGroup::Angle(slot);
                let dpad = dpad_for(
                    group,
                    &native[slot].display_name,
                    device,
                    &mut hat_groups,
                    &mut components,
                    &mut used,
                    registry,
                );
                Route::Hat { slot, decode, dpad }
            }
            Role::HatAxis { hat, axis, min, max } => {
                let group = HatGroup::Split(hat);
                let dpad = dpad_for(
                    group,
                    &format!("Hat {hat}"),
                    device,
                    &mut hat_groups,
                    &mut components,
                    &mut used,
                    registry,
                );
                Route::HatAxis {
                    slot,
                    axis,
                    min,
                    max,
                    dpad,
                }
            }
            Role::SplitTrigger(rule) => match trigger_slot {
                None if !used.contains(&ids::RIGHT_TRIGGER) => {
                    let negative_slot = components.len();
                    components.push(Component::new(device, ids::RIGHT_TRIGGER, false));
                    used.insert(ids::RIGHT_TRIGGER);
                    trigger_slot = Some(negative_slot);
                    Route::Split {
                        slot,
                        negative_slot,
                        rule,
                    }
                }
                // Right trigger already present natively (or split once): keep Z whole.
                _ => Route::Direct { slot, rule },
            },
        };
        routes.push(route);
    }

    tracing::debug!(
        device = %device,
        platform = ?synthesizer.platform(),
        native = native.len(),
        canonical = components.len(),
        hats = hat_groups.len(),
        "prepared virtual components"
    );

    VirtualLayout {
        platform: synthesizer.platform(),
        components,
        routes,
    }
}

/// Keeps identities unique within one device; later duplicates fall back to vendor ids.
fn unique_id(
    id: ComponentId,
    desc: &NativeComponentDescriptor,
    index: usize,
    used: &HashSet<ComponentId>,
    registry: &ComponentRegistry,
) -> ComponentId {
    if !used.contains(&id) {
        return id;
    }
    let by_name = registry.vendor(id.kind(), &desc.display_name);
    if !used.contains(&by_name) {
        return by_name;
    }
    registry.vendor(id.kind(), &format!("{} #{index}", desc.display_name))
}

#[allow(clippy::too_many_arguments)]
fn dpad_for(
    group: HatGroup,
    hat_name: &str,
    device: DeviceRef,
    hat_groups: &mut Vec<(HatGroup, DpadSlots)>,
    components: &mut Vec<Component>,
    used: &mut HashSet<ComponentId>,
    registry: &ComponentRegistry,
) -> DpadSlots {
    if let Some((_, dpad)) = hat_groups.iter().find(|(g, _)| *g == group) {
        return *dpad;
    }

    let well_known = [ids::DPAD_UP, ids::DPAD_DOWN, ids::DPAD_LEFT, ids::DPAD_RIGHT];
    let use_well_known = hat_groups.is_empty() && well_known.iter().all(|id| !used.contains(id));
    let buttons: [ComponentId; 4] = if use_well_known {
        well_known
    } else {
        ["Up", "Down", "Left", "Right"].map(|dir| {
            let id = registry.vendor(ComponentType::Button, &format!("{hat_name} {dir}"));
            if used.contains(&id) {
                // Two hats sharing a display name.
                registry.vendor(
                    ComponentType::Button,
                    &format!("{hat_name} #{} {dir}", hat_groups.len()),
                )
            } else {
                id
            }
        })
    };

    let first = components.len();
    for id in buttons {
        used.insert(id.clone());
        components.push(Component::new(device, id, false));
    }
    let dpad = DpadSlots {
        up: first,
        down: first + 1,
        left: first + 2,
        right: first + 3,
    };
    hat_groups.push((group, dpad));
    dpad
}
