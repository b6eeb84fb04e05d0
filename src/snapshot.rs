//! Per-frame snapshot of device states.
//!
//! [`Snapshot`] is an **owned**, read-only view of all device states at a point
//! in time (typically "this frame"). It is produced by
//! [`DeviceRegistry::snapshot`](crate::manager::DeviceRegistry::snapshot) and is
//! cheap to clone for fan-out to multiple consumers.
//!
//! # Semantics
//! - Keys are device instance ids.
//! - Values are [`DeviceState`] maps of axis/button values keyed by component name.
//! - A snapshot does **not** poll devices; it reflects the last-known values.
//!
//! # Examples
//! ```no_run
//! use unipad::Snapshot;
//!
//! fn print_axes(snap: &Snapshot) {
//!     for (dev, state) in snap.iter() {
//!         let x = state.get_axis("X");
//!         let y = state.get_axis("Y");
//!         println!("{dev}: X={x:.2} Y={y:.2} A={}", state.get_button("A"));
//!     }
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::component::Component;

/// Current axis/button values of one device.
#[derive(Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    pub axes: HashMap<String, f32>,
    pub buttons: HashMap<String, bool>,
}

impl DeviceState {
    /// Builds a state from a device's components and their current values.
    ///
    /// Components of other types (`Pov`, `Unknown`) are left out.
    pub fn from_values(components: &[Component], values: &[f32]) -> Self {
        let mut state = DeviceState::default();
        for (component, &value) in components.iter().zip(values) {
            let kind = component.kind();
            if kind.is_axis() {
                state.axes.insert(component.name().to_owned(), value);
            } else if kind.is_button() {
                state.buttons.insert(component.name().to_owned(), value != 0.0);
            }
        }
        state
    }

    /// Gets the value of a named axis (0.0 if missing).
    pub fn get_axis(&self, name: &str) -> f32 {
        self.axes.get(name).copied().unwrap_or(0.0)
    }

    /// Gets the state of a named button (false if missing).
    pub fn get_button(&self, name: &str) -> bool {
        self.buttons.get(name).copied().unwrap_or(false)
    }
}

/// Owned snapshot of current device states (`instance_id → DeviceState`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot(pub HashMap<Uuid, DeviceState>);

impl Snapshot {
    /// Get the state for a specific device.
    #[inline]
    pub fn get(&self, instance_id: &Uuid) -> Option<&DeviceState> {
        self.0.get(instance_id)
    }

    /// Iterate `(instance_id, state)` pairs.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&Uuid, &DeviceState)> {
        self.0.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the snapshot and return the inner map.
    #[inline]
    pub fn into_inner(self) -> HashMap<Uuid, DeviceState> {
        self.0
    }
}
