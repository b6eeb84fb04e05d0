//! Platform-agnostic input device.
//!
//! An [`InputDevice`] owns the canonical component list of one physical
//! device, its current values, and the native handle it polls. The handle is
//! an opaque capability object ([`NativeDeviceHandle`]); everything behind it
//! (FFI, struct marshaling, handle tables) belongs to the backend.
//!
//! # Lifecycle
//! `Created → Prepared → Polling → Closed`. Components are attached exactly
//! once; [`InputDevice::close`] is reachable from every state and idempotent.
//!
//! # Poll cycle
//! 1. Read one raw vector from the native handle.
//! 2. Expand it with the device's [`VirtualLayout`].
//! 3. Round each value to the configured accuracy.
//! 4. Store every changed value, then hand the change events to listeners.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentId, ComponentRegistry};
use crate::error::{Error, Result};
use crate::event::ComponentEvent;
use crate::eventbus::{EventFilter, InputEventBus, InputListener, ListenerId};
use crate::metadata::DeviceInfo;
use crate::normalize::round_to;
use crate::synth::{prepare_virtual_components, NativeComponentDescriptor, Synthesizer, VirtualLayout};

/// Operations the core needs from a native device.
pub trait NativeDeviceHandle: Send {
    /// One raw sample per native component, in enumeration order.
    fn poll_raw(&mut self) -> Result<Vec<f32>>;

    /// Forwards a clamped rumble command. Must not block on completion.
    fn send_rumble(&mut self, command: RumbleCommand) -> Result<()>;

    /// Releases native resources. Called exactly once.
    fn release(&mut self);
}

/// Motor intensities in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RumbleCommand {
    pub left: f32,
    pub right: f32,
}

impl RumbleCommand {
    /// Clamps both motors into `[0, 1]`; NaN becomes `0`.
    pub fn clamped(left: f32, right: f32) -> Self {
        fn clamp(v: f32) -> f32 {
            if v.is_nan() {
                0.0
            } else {
                v.clamp(0.0, 1.0)
            }
        }
        Self {
            left: clamp(left),
            right: clamp(right),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifecycle {
    Created,
    Prepared,
    Polling,
    Closed,
}

pub struct InputDevice {
    info: DeviceInfo,
    handle: Box<dyn NativeDeviceHandle>,
    layout: Option<VirtualLayout>,
    values: Vec<f32>,
    accuracy: Option<u32>,
    state: Lifecycle,
    bus: InputEventBus,
}

impl InputDevice {
    pub fn new(info: DeviceInfo, handle: Box<dyn NativeDeviceHandle>) -> Self {
        Self {
            info,
            handle,
            layout: None,
            values: Vec::new(),
            accuracy: None,
            state: Lifecycle::Created,
            bus: InputEventBus::new(),
        }
    }

    #[inline]
    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    #[inline]
    pub fn state(&self) -> Lifecycle {
        self.state
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.state == Lifecycle::Closed
    }

    /// Decimal places values are rounded to. `None` keeps full precision.
    #[inline]
    pub fn accuracy(&self) -> Option<u32> {
        self.accuracy
    }

    pub fn set_accuracy(&mut self, places: Option<u32>) {
        self.accuracy = places;
    }

    /// Attaches the canonical components. Allowed once, before the first poll.
    pub fn add_components(&mut self, layout: VirtualLayout) -> Result<()> {
        match self.state {
            Lifecycle::Created => {}
            Lifecycle::Closed => return Err(Error::Closed),
            Lifecycle::Prepared | Lifecycle::Polling => return Err(Error::AlreadyPrepared),
        }
        self.values = vec![0.0; layout.components().len()];
        self.layout = Some(layout);
        self.state = Lifecycle::Prepared;
        Ok(())
    }

    /// Classifies `native` with `synthesizer` and attaches the result.
    pub fn prepare(
        &mut self,
        synthesizer: &dyn Synthesizer,
        native: &[NativeComponentDescriptor],
        registry: &ComponentRegistry,
    ) -> Result<&[Component]> {
        match self.state {
            Lifecycle::Created => {}
            Lifecycle::Closed => return Err(Error::Closed),
            Lifecycle::Prepared | Lifecycle::Polling => return Err(Error::AlreadyPrepared),
        }
        let layout = prepare_virtual_components(synthesizer, self.info.device_ref(), native, registry);
        self.add_components(layout)?;
        Ok(self.components())
    }

    /// Canonical components in their fixed order. Empty until prepared.
    pub fn components(&self) -> &[Component] {
        self.layout
            .as_ref()
            .map(|l| l.components())
            .unwrap_or(&[])
    }

    pub fn layout(&self) -> Option<&VirtualLayout> {
        self.layout.as_ref()
    }

    /// Current values, index-aligned with [`InputDevice::components`].
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Current value of `id`, or `None` if the device has no such component.
    pub fn value(&self, id: &ComponentId) -> Option<f32> {
        let index = self.layout.as_ref()?.index_of(id)?;
        self.values.get(index).copied()
    }

    /// `true` iff any component currently holds a non-zero value.
    pub fn has_input_data(&self) -> bool {
        self.values.iter().any(|&v| v != 0.0)
    }

    /// Polls the native handle and returns the change events of this tick.
    ///
    /// A failing native read keeps the last-known values and yields no events;
    /// a short raw vector leaves the missing slots at zero.
    pub fn poll(&mut self) -> Result<Vec<ComponentEvent>> {
        let layout = match self.state {
            Lifecycle::Closed => return Err(Error::Closed),
            Lifecycle::Created => return Err(Error::NotPrepared),
            Lifecycle::Prepared | Lifecycle::Polling => {
                self.layout.as_ref().ok_or(Error::NotPrepared)?
            }
        };
        self.state = Lifecycle::Polling;

        let raw = match self.handle.poll_raw() {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(
                    device = %self.info.instance_name,
                    error = %err,
                    "native poll failed; keeping last values"
                );
                return Ok(Vec::new());
            }
        };
        if raw.len() < layout.native_count() {
            tracing::debug!(
                device = %self.info.instance_name,
                expected = layout.native_count(),
                got = raw.len(),
                "short poll vector"
            );
        }

        let canonical = layout.redistribute_polled_values(&raw);
        let at = Instant::now();
        let mut events = Vec::new();

        for ((component, slot), value) in layout
            .components()
            .iter()
            .zip(self.values.iter_mut())
            .zip(canonical)
        {
            let new_value = round_to(value, self.accuracy);
            if new_value != *slot {
                events.push(ComponentEvent {
                    at,
                    component: component.clone(),
                    old_value: *slot,
                    new_value,
                });
                *slot = new_value;
            }
        }

        self.bus.emit_all(&events);
        Ok(events)
    }

    /// Clamps intensities to `[0, 1]` and forwards them to the native handle.
    pub fn rumble(&mut self, left: f32, right: f32) -> Result<()> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        let command = RumbleCommand::clamped(left, right);
        self.handle.send_rumble(command).map_err(|err| {
            tracing::warn!(device = %self.info.instance_name, error = %err, "rumble not delivered");
            err
        })
    }

    /// Registers a listener for this device's change events.
    pub fn add_listener(
        &mut self,
        listener: impl InputListener + 'static,
        filter: EventFilter,
    ) -> ListenerId {
        self.bus.add_listener(listener, filter, None)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.bus.remove_listener(id)
    }

    pub fn listeners_mut(&mut self) -> &mut InputEventBus {
        &mut self.bus
    }

    /// Releases the native handle. Further calls are no-ops.
    pub fn close(&mut self) {
        if self.is_closed() {
            return;
        }
        self.handle.release();
        self.state = Lifecycle::Closed;
        tracing::debug!(device = %self.info.instance_name, "device closed");
    }
}

impl Drop for InputDevice {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for InputDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputDevice")
            .field("instance_name", &self.info.instance_name)
            .field("instance_id", &self.info.instance_id)
            .field("state", &self.state)
            .field("components", &self.components().len())
            .finish()
    }
}
