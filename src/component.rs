//! Canonical component identities.
//!
//! Every control a device exposes is described by a [`ComponentId`]: a
//! `(type, numeric_id, name)` triple. Identity is the `(type, numeric_id)` pair;
//! the name is cosmetic and ignored by `==`/`Hash`, so the same physical control
//! compares equal across platforms even when each backend labels it differently.
//!
//! ## Id space
//! - `0..=MAX_DEFAULT_ID` is reserved for the well-known cross-platform table in
//!   [`ids`] (stick axes, triggers, face/shoulder buttons, generic buttons, D-Pad).
//! - Ids above [`MAX_DEFAULT_ID`] come from [`allocate_id`]: a process-wide,
//!   monotonically increasing counter. They are never recycled.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Highest numeric id reserved for well-known identities.
pub const MAX_DEFAULT_ID: u32 = 255;

static NEXT_ID: AtomicU32 = AtomicU32::new(MAX_DEFAULT_ID + 1);

/// Returns a fresh numeric id, strictly greater than [`MAX_DEFAULT_ID`] and than
/// every id previously returned in this process.
///
/// The counter never wraps back into the reserved range: once the id space is
/// exhausted every call returns `u32::MAX`.
pub fn allocate_id() -> u32 {
    next_id(&NEXT_ID)
}

fn next_id(counter: &AtomicU32) -> u32 {
    match counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |id| id.checked_add(1)) {
        Ok(id) => id,
        Err(id) => {
            tracing::error!(id, "component id space exhausted");
            id
        }
    }
}

/// Category of a canonical component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    Axis,
    Button,
    Key,
    /// Directional hat. Never carries a value of its own on a prepared device;
    /// its state is expanded into four D-Pad buttons.
    Pov,
    Unknown,
}

impl ComponentType {
    #[inline]
    pub fn is_axis(self) -> bool {
        matches!(self, ComponentType::Axis)
    }

    /// Buttons and keys are both two-state controls.
    #[inline]
    pub fn is_button(self) -> bool {
        matches!(self, ComponentType::Button | ComponentType::Key)
    }

    #[inline]
    pub fn is_pov(self) -> bool {
        matches!(self, ComponentType::Pov)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComponentType::Axis => "axis",
            ComponentType::Button => "button",
            ComponentType::Key => "key",
            ComponentType::Pov => "pov",
            ComponentType::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Canonical identity of a component.
///
/// Equality and hashing only consider `kind` and `numeric_id`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComponentId {
    kind: ComponentType,
    numeric_id: u32,
    name: Cow<'static, str>,
}

impl ComponentId {
    /// Builds an identity with a static name. Used for the well-known table.
    pub const fn new_static(kind: ComponentType, numeric_id: u32, name: &'static str) -> Self {
        Self {
            kind,
            numeric_id,
            name: Cow::Borrowed(name),
        }
    }

    pub fn new(kind: ComponentType, numeric_id: u32, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            numeric_id,
            name: name.into(),
        }
    }

    /// Builds a vendor identity with a freshly allocated id.
    pub fn vendor(kind: ComponentType, name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(kind, allocate_id(), name)
    }

    #[inline]
    pub fn kind(&self) -> ComponentType {
        self.kind
    }

    #[inline]
    pub fn numeric_id(&self) -> u32 {
        self.numeric_id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` for identities in the reserved well-known range.
    #[inline]
    pub fn is_well_known(&self) -> bool {
        self.numeric_id <= MAX_DEFAULT_ID
    }
}

impl PartialEq for ComponentId {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.numeric_id == other.numeric_id
    }
}

impl Eq for ComponentId {}

impl Hash for ComponentId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.numeric_id.hash(state);
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} #{})", self.name, self.kind, self.numeric_id)
    }
}

/// Same identity as `base`, different display name.
///
/// Used when a platform control lands on a well-known slot, e.g. native button
/// index 0 presented as `A`.
pub fn remap(base: &ComponentId, new_name: impl Into<Cow<'static, str>>) -> ComponentId {
    ComponentId::new(base.kind, base.numeric_id, new_name)
}

/// Looks up `(kind, numeric_id)` in the well-known table and returns it under `name`.
///
/// Returns `None` when the pair is not a well-known identity.
pub fn well_known(
    kind: ComponentType,
    numeric_id: u32,
    name: impl Into<Cow<'static, str>>,
) -> Option<ComponentId> {
    ids::lookup(kind, numeric_id).map(|base| remap(&base, name))
}

/// The well-known identity table.
pub mod ids {
    use super::{ComponentId, ComponentType};

    pub const X: ComponentId = ComponentId::new_static(ComponentType::Axis, 0, "X");
    pub const Y: ComponentId = ComponentId::new_static(ComponentType::Axis, 1, "Y");
    pub const Z: ComponentId = ComponentId::new_static(ComponentType::Axis, 2, "Z");
    pub const RX: ComponentId = ComponentId::new_static(ComponentType::Axis, 3, "Rx");
    pub const RY: ComponentId = ComponentId::new_static(ComponentType::Axis, 4, "Ry");
    pub const RZ: ComponentId = ComponentId::new_static(ComponentType::Axis, 5, "Rz");
    pub const SLIDER: ComponentId = ComponentId::new_static(ComponentType::Axis, 6, "Slider");
    pub const DIAL: ComponentId = ComponentId::new_static(ComponentType::Axis, 7, "Dial");
    pub const WHEEL: ComponentId = ComponentId::new_static(ComponentType::Axis, 8, "Wheel");
    pub const LEFT_TRIGGER: ComponentId =
        ComponentId::new_static(ComponentType::Axis, 9, "Left Trigger");
    pub const RIGHT_TRIGGER: ComponentId =
        ComponentId::new_static(ComponentType::Axis, 10, "Right Trigger");
    pub const RUDDER: ComponentId = ComponentId::new_static(ComponentType::Axis, 11, "Rudder");
    pub const THROTTLE: ComponentId = ComponentId::new_static(ComponentType::Axis, 12, "Throttle");

    /// Angle-style hat (DirectInput POV, IOKit hat switch).
    pub const POV: ComponentId = ComponentId::new_static(ComponentType::Pov, 16, "Pov");
    /// Left/right half of an evdev split hat.
    pub const POV_X: ComponentId = ComponentId::new_static(ComponentType::Pov, 17, "Pov X");
    /// Up/down half of an evdev split hat.
    pub const POV_Y: ComponentId = ComponentId::new_static(ComponentType::Pov, 18, "Pov Y");

    /// First id of the generic button block.
    pub const BUTTON_BASE: u32 = 32;
    /// Number of generic button slots (`Button 0` ..= `Button 127`).
    pub const MAX_BUTTONS: u32 = 128;

    pub const A: ComponentId = ComponentId::new_static(ComponentType::Button, BUTTON_BASE, "A");
    pub const B: ComponentId = ComponentId::new_static(ComponentType::Button, BUTTON_BASE + 1, "B");
    pub const BUTTON_X: ComponentId =
        ComponentId::new_static(ComponentType::Button, BUTTON_BASE + 2, "X");
    pub const BUTTON_Y: ComponentId =
        ComponentId::new_static(ComponentType::Button, BUTTON_BASE + 3, "Y");
    pub const LEFT_SHOULDER: ComponentId =
        ComponentId::new_static(ComponentType::Button, BUTTON_BASE + 4, "Left Shoulder");
    pub const RIGHT_SHOULDER: ComponentId =
        ComponentId::new_static(ComponentType::Button, BUTTON_BASE + 5, "Right Shoulder");
    pub const BACK: ComponentId =
        ComponentId::new_static(ComponentType::Button, BUTTON_BASE + 6, "Back");
    pub const START: ComponentId =
        ComponentId::new_static(ComponentType::Button, BUTTON_BASE + 7, "Start");
    pub const LEFT_THUMB: ComponentId =
        ComponentId::new_static(ComponentType::Button, BUTTON_BASE + 8, "Left Thumb");
    pub const RIGHT_THUMB: ComponentId =
        ComponentId::new_static(ComponentType::Button, BUTTON_BASE + 9, "Right Thumb");
    pub const GUIDE: ComponentId =
        ComponentId::new_static(ComponentType::Button, BUTTON_BASE + 10, "Guide");

    pub const DPAD_UP: ComponentId = ComponentId::new_static(ComponentType::Button, 200, "D-Pad Up");
    pub const DPAD_DOWN: ComponentId =
        ComponentId::new_static(ComponentType::Button, 201, "D-Pad Down");
    pub const DPAD_LEFT: ComponentId =
        ComponentId::new_static(ComponentType::Button, 202, "D-Pad Left");
    pub const DPAD_RIGHT: ComponentId =
        ComponentId::new_static(ComponentType::Button, 203, "D-Pad Right");

    /// Named entries. Generic buttons past the named ones are produced by [`button`].
    pub const NAMED: &[ComponentId] = &[
        X,
        Y,
        Z,
        RX,
        RY,
        RZ,
        SLIDER,
        DIAL,
        WHEEL,
        LEFT_TRIGGER,
        RIGHT_TRIGGER,
        RUDDER,
        THROTTLE,
        POV,
        POV_X,
        POV_Y,
        A,
        B,
        BUTTON_X,
        BUTTON_Y,
        LEFT_SHOULDER,
        RIGHT_SHOULDER,
        BACK,
        START,
        LEFT_THUMB,
        RIGHT_THUMB,
        GUIDE,
        DPAD_UP,
        DPAD_DOWN,
        DPAD_LEFT,
        DPAD_RIGHT,
    ];

    /// Generic button `index`, or `None` past [`MAX_BUTTONS`].
    ///
    /// The first few indices come back under their gamepad names (`A`, `B`, ...).
    pub fn button(index: u32) -> Option<ComponentId> {
        if index >= MAX_BUTTONS {
            return None;
        }
        let numeric_id = BUTTON_BASE + index;
        Some(
            NAMED
                .iter()
                .find(|id| id.kind() == ComponentType::Button && id.numeric_id() == numeric_id)
                .cloned()
                .unwrap_or_else(|| {
                    ComponentId::new(ComponentType::Button, numeric_id, format!("Button {index}"))
                }),
        )
    }

    /// Finds the well-known identity for `(kind, numeric_id)`.
    pub fn lookup(kind: ComponentType, numeric_id: u32) -> Option<ComponentId> {
        if let Some(id) = NAMED
            .iter()
            .find(|id| id.kind() == kind && id.numeric_id() == numeric_id)
        {
            return Some(id.clone());
        }
        if kind == ComponentType::Button && numeric_id >= BUTTON_BASE {
            return button(numeric_id - BUTTON_BASE);
        }
        None
    }
}

/// Indexed set of known identities.
///
/// Pre-populated with the well-known table. Backends register vendor identities
/// through [`ComponentRegistry::vendor`], which interns by `(type, name)` so that
/// two devices of the same model share their vendor ids.
#[derive(Debug)]
pub struct ComponentRegistry {
    inner: RwLock<RegistryInner>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    by_id: HashMap<u32, ComponentId>,
    by_name: HashMap<String, ComponentId>,
    vendor: HashMap<(ComponentType, String), ComponentId>,
}

impl RegistryInner {
    fn insert(&mut self, id: ComponentId) {
        self.by_name.entry(id.name().to_owned()).or_insert_with(|| id.clone());
        self.by_id.entry(id.numeric_id()).or_insert(id);
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry {
    pub fn new() -> Self {
        let mut inner = RegistryInner::default();
        for id in ids::NAMED {
            inner.insert(id.clone());
        }
        for index in 0..ids::MAX_BUTTONS {
            if let Some(id) = ids::button(index) {
                inner.insert(id.clone());
                // Named buttons stay findable under their generic label too.
                inner
                    .by_name
                    .entry(format!("Button {index}"))
                    .or_insert(id);
            }
        }
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Adds `id` to the index. Existing entries win.
    pub fn register(&self, id: ComponentId) {
        self.inner.write().insert(id);
    }

    /// Returns the vendor identity for `(kind, name)`, allocating one on first use.
    pub fn vendor(&self, kind: ComponentType, name: &str) -> ComponentId {
        let key = (kind, name.to_owned());
        if let Some(id) = self.inner.read().vendor.get(&key) {
            return id.clone();
        }

        let mut inner = self.inner.write();
        if let Some(id) = inner.vendor.get(&key) {
            return id.clone();
        }
        let id = ComponentId::vendor(kind, name.to_owned());
        tracing::debug!(kind = %kind, name, numeric_id = id.numeric_id(), "allocated vendor component id");
        inner.vendor.insert(key, id.clone());
        inner.insert(id.clone());
        id
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<ComponentId> {
        self.inner.read().by_name.get(name).cloned()
    }

    pub fn lookup_by_id(&self, numeric_id: u32) -> Option<ComponentId> {
        self.inner.read().by_id.get(&numeric_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reference from a component back to its owning device (the device instance id).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceRef(pub Uuid);

impl fmt::Display for DeviceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A canonical component attached to a device.
///
/// `relative` marks delta-reporting axes (mouse style); their raw values are
/// passed through without range clamping.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Component {
    device: DeviceRef,
    id: ComponentId,
    relative: bool,
}

impl Component {
    pub fn new(device: DeviceRef, id: ComponentId, relative: bool) -> Self {
        Self {
            device,
            id,
            relative,
        }
    }

    #[inline]
    pub fn device(&self) -> DeviceRef {
        self.device
    }

    #[inline]
    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    #[inline]
    pub fn kind(&self) -> ComponentType {
        self.id.kind()
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.id.name()
    }

    #[inline]
    pub fn is_relative(&self) -> bool {
        self.relative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_ignores_name() {
        let a = ids::A;
        let renamed = remap(&a, "Cross");
        assert_eq!(a, renamed);
        assert_eq!(renamed.name(), "Cross");

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&renamed));
    }

    #[test]
    fn test_type_is_part_of_identity() {
        let axis = ComponentId::new(ComponentType::Axis, 40, "same");
        let button = ComponentId::new(ComponentType::Button, 40, "same");
        assert_ne!(axis, button);
    }

    #[test]
    fn test_allocate_id_is_above_reserved_range_and_increasing() {
        let first = allocate_id();
        let second = allocate_id();
        assert!(first > MAX_DEFAULT_ID);
        assert!(second > first);
    }

    #[test]
    fn test_id_counter_saturates_instead_of_wrapping() {
        let counter = AtomicU32::new(u32::MAX - 1);
        assert_eq!(next_id(&counter), u32::MAX - 1);
        assert_eq!(next_id(&counter), u32::MAX);
        assert_eq!(next_id(&counter), u32::MAX);
        assert!(next_id(&counter) > MAX_DEFAULT_ID);
    }

    #[test]
    fn test_well_known_table_stays_in_reserved_range() {
        for id in ids::NAMED {
            assert!(id.is_well_known(), "{id} outside reserved range");
        }
        let last = ids::button(ids::MAX_BUTTONS - 1).expect("last generic button");
        assert!(last.numeric_id() <= MAX_DEFAULT_ID);
        assert!(ids::button(ids::MAX_BUTTONS).is_none());
    }

    #[test]
    fn test_button_zero_is_a() {
        let b0 = ids::button(0).expect("button 0");
        assert_eq!(b0, ids::A);
        assert_eq!(b0.name(), "A");
        assert_eq!(ids::button(20).expect("button 20").name(), "Button 20");
    }

    #[test]
    fn test_well_known_constructor() {
        let up = well_known(ComponentType::Button, 200, "Hat Up").expect("dpad up");
        assert_eq!(up, ids::DPAD_UP);
        assert_eq!(up.name(), "Hat Up");
        assert!(well_known(ComponentType::Axis, 200, "nope").is_none());
        assert!(well_known(ComponentType::Key, 0, "nope").is_none());
    }

    #[test]
    fn test_registry_lookup() {
        let registry = ComponentRegistry::new();
        assert_eq!(registry.lookup_by_name("A"), Some(ids::A));
        assert_eq!(registry.lookup_by_name("Button 0"), Some(ids::A));
        assert_eq!(registry.lookup_by_id(ids::RZ.numeric_id()), Some(ids::RZ));
        assert_eq!(registry.lookup_by_name("Flux Capacitor"), None);
        assert_eq!(registry.lookup_by_id(MAX_DEFAULT_ID + 100_000), None);
    }

    #[test]
    fn test_vendor_ids_are_interned() {
        let registry = ComponentRegistry::new();
        let first = registry.vendor(ComponentType::Button, "Paddle 1");
        let again = registry.vendor(ComponentType::Button, "Paddle 1");
        let other = registry.vendor(ComponentType::Button, "Paddle 2");
        let as_key = registry.vendor(ComponentType::Key, "Paddle 1");

        assert_eq!(first, again);
        assert!(first.numeric_id() > MAX_DEFAULT_ID);
        assert_ne!(first, other);
        assert_ne!(first, as_key);
        assert_eq!(registry.lookup_by_name("Paddle 2"), Some(other.clone()));
        assert_eq!(registry.lookup_by_id(other.numeric_id()), Some(other));
    }

    #[test]
    fn test_type_predicates() {
        assert!(ComponentType::Axis.is_axis());
        assert!(ComponentType::Key.is_button());
        assert!(!ComponentType::Pov.is_axis());
        assert!(ComponentType::Pov.is_pov());
        assert!(!ComponentType::Unknown.is_button());
    }
}
