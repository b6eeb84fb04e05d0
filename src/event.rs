//! Change events.
//!
//! A poll produces one [`ComponentEvent`] per canonical component whose value
//! changed, carrying both the previous and the new value.
//!
//! ## Value conventions
//! - **Axes:** normalized to `[-1.0, 1.0]`. Triggers use `[0.0, 1.0]`.
//! - **Buttons/keys:** `0.0` released, `1.0` pressed.
//! - **Hats** never appear here; they are reported through their four D-Pad buttons.
//!
//! ### Relative axes
//! Delta axes (mouse style, see [`Component::is_relative`]) keep the native
//! units reported by the OS and are not clamped.

use std::time::Instant;

use crate::component::{Component, ComponentType, DeviceRef};

/// Value change of one canonical component, captured during [`InputDevice::poll`](crate::device::InputDevice::poll).
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentEvent {
    /// Capture time (monotonic). Every event from one poll shares it.
    pub at: Instant,
    pub component: Component,
    pub old_value: f32,
    pub new_value: f32,
}

impl ComponentEvent {
    #[inline]
    pub fn device(&self) -> DeviceRef {
        self.component.device()
    }

    #[inline]
    pub fn kind(&self) -> ComponentType {
        self.component.kind()
    }

    #[inline]
    pub fn is_axis(&self) -> bool {
        self.kind().is_axis()
    }

    #[inline]
    pub fn is_button(&self) -> bool {
        self.kind().is_button()
    }

    /// Button went from released to pressed.
    pub fn is_press(&self) -> bool {
        self.is_button() && self.old_value == 0.0 && self.new_value != 0.0
    }

    /// Button went from pressed to released.
    pub fn is_release(&self) -> bool {
        self.is_button() && self.old_value != 0.0 && self.new_value == 0.0
    }
}
