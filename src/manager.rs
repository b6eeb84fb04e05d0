//! Device registry and lifecycle.
//!
//! [`DeviceRegistry`] owns one backend session: it enumerates accepted devices,
//! prepares their canonical layouts, polls them on the host's schedule, reacts
//! to hot-plug notifications, and releases every native handle on close.
//!
//! There is no internal thread. The host loop calls [`DeviceRegistry::poll_all`]
//! (or polls individual devices) at its own cadence.

use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::backends::{NativeDeviceDescriptor, NativeInputBackend};
use crate::component::{ComponentRegistry, DeviceRef};
use crate::config::Config;
use crate::device::InputDevice;
use crate::error::{Error, Result};
use crate::event::ComponentEvent;
use crate::eventbus::{EventFilter, InputEventBus, InputListener, ListenerId};
use crate::snapshot::{DeviceState, Snapshot};
use crate::synth::Synthesizer;

/// Device handle shared between the registry and the host.
///
/// The mutex serializes polls of one device.
pub type SharedDevice = Arc<Mutex<InputDevice>>;

/// Connect/disconnect notifications.
pub trait DeviceListener: Send {
    fn on_connected(&mut self, device: &InputDevice);
    fn on_disconnected(&mut self, device: &InputDevice);
}

pub struct DeviceRegistry {
    backend: Box<dyn NativeInputBackend>,
    synthesizer: Box<dyn Synthesizer>,
    config: Config,
    components: Arc<ComponentRegistry>,
    /// Tracked devices keyed by instance id, so lookups never take a device lock.
    devices: Vec<(Uuid, SharedDevice)>,
    device_listeners: Vec<Box<dyn DeviceListener>>,
    bus: InputEventBus,
    closed: bool,
}

impl DeviceRegistry {
    pub fn new(backend: Box<dyn NativeInputBackend>, config: Config) -> Self {
        Self::with_components(backend, config, Arc::new(ComponentRegistry::new()))
    }

    /// Shares a component registry with other sessions, so vendor ids stay
    /// consistent across platforms enumerated side by side.
    pub fn with_components(
        backend: Box<dyn NativeInputBackend>,
        config: Config,
        components: Arc<ComponentRegistry>,
    ) -> Self {
        let synthesizer = backend.platform().synthesizer(&config);
        Self {
            backend,
            synthesizer,
            config,
            components,
            devices: Vec::new(),
            device_listeners: Vec::new(),
            bus: InputEventBus::new(),
            closed: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn component_registry(&self) -> &Arc<ComponentRegistry> {
        &self.components
    }

    /// Enumerates the backend and opens every accepted device.
    ///
    /// Devices whose native open or preparation fails are skipped; the rest of
    /// the enumeration continues. Returns how many devices were added.
    pub fn initialize(&mut self) -> Result<usize> {
        self.ensure_open()?;
        let found = self.backend.enumerate()?;
        tracing::debug!(count = found.len(), platform = ?self.backend.platform(), "enumerated devices");

        let mut added = 0;
        for descriptor in found {
            match self.attach(&descriptor) {
                Ok(Some(_)) => added += 1,
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(
                        device = %descriptor.info.instance_name,
                        error = %err,
                        "skipping device"
                    );
                }
            }
        }
        tracing::info!(added, total = self.devices.len(), "device registry initialized");
        Ok(added)
    }

    /// Native layer reports a new device.
    ///
    /// Returns `Ok(None)` when the device's category is not accepted, and the
    /// existing handle when the device is already tracked.
    pub fn device_connected(&mut self, descriptor: NativeDeviceDescriptor) -> Result<Option<SharedDevice>> {
        self.ensure_open()?;
        let device = self.attach(&descriptor)?;
        if device.is_some() {
            tracing::info!(device = %descriptor.info.instance_name, "device connected");
        }
        Ok(device)
    }

    /// Native layer reports a device is gone. Closes it and notifies listeners.
    pub fn device_disconnected(&mut self, instance_id: Uuid) -> Result<()> {
        self.ensure_open()?;
        let index = self
            .position(instance_id)
            .ok_or(Error::DeviceNotFound(instance_id))?;
        let (_, shared) = self.devices.remove(index);
        let mut device = shared.lock();
        device.close();
        for listener in self.device_listeners.iter_mut() {
            listener.on_disconnected(&device);
        }
        tracing::info!(device = %device.info().instance_name, "device disconnected");
        Ok(())
    }

    fn attach(&mut self, descriptor: &NativeDeviceDescriptor) -> Result<Option<SharedDevice>> {
        let info = &descriptor.info;
        if !self.config.accepted_categories.contains(&info.category) {
            tracing::debug!(
                device = %info.instance_name,
                category = ?info.category,
                "category not accepted"
            );
            return Ok(None);
        }
        if let Some(index) = self.position(info.instance_id) {
            tracing::debug!(device = %info.instance_name, "device already tracked");
            return Ok(Some(self.devices[index].1.clone()));
        }

        let handle = self.backend.open(descriptor)?;
        let mut device = InputDevice::new(info.clone(), handle);
        device.set_accuracy(self.config.accuracy);
        device.prepare(self.synthesizer.as_ref(), &descriptor.components, &self.components)?;
        tracing::debug!(
            device = %info.instance_name,
            components = device.components().len(),
            "device prepared"
        );

        for listener in self.device_listeners.iter_mut() {
            listener.on_connected(&device);
        }
        let shared = Arc::new(Mutex::new(device));
        self.devices.push((info.instance_id, shared.clone()));
        Ok(Some(shared))
    }

    fn position(&self, instance_id: Uuid) -> Option<usize> {
        self.devices.iter().position(|(id, _)| *id == instance_id)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::Closed)
        } else {
            Ok(())
        }
    }

    /// Tracked devices in connection order.
    pub fn devices(&self) -> impl Iterator<Item = &SharedDevice> + '_ {
        self.devices.iter().map(|(_, shared)| shared)
    }

    pub fn device(&self, instance_id: Uuid) -> Option<SharedDevice> {
        self.position(instance_id).map(|i| self.devices[i].1.clone())
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn add_device_listener(&mut self, listener: impl DeviceListener + 'static) {
        self.device_listeners.push(Box::new(listener));
    }

    /// Registers a listener for change events from every device (or only
    /// `device` when tagged).
    pub fn add_listener(
        &mut self,
        listener: impl InputListener + 'static,
        filter: EventFilter,
        device: Option<DeviceRef>,
    ) -> ListenerId {
        self.bus.add_listener(listener, filter, device)
    }

    pub fn listeners_mut(&mut self) -> &mut InputEventBus {
        &mut self.bus
    }

    /// Polls every device once and returns all change events of this tick.
    pub fn poll_all(&mut self) -> Vec<ComponentEvent> {
        let mut events = Vec::new();
        for (_, shared) in &self.devices {
            let mut device = shared.lock();
            match device.poll() {
                Ok(batch) => events.extend(batch),
                Err(err) => {
                    tracing::debug!(device = %device.info().instance_name, error = %err, "poll skipped");
                }
            }
        }
        self.bus.emit_all(&events);
        events
    }

    /// Last-known values of every device. Does not poll.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(
            self.devices
                .iter()
                .map(|(id, shared)| {
                    let device = shared.lock();
                    (
                        *id,
                        DeviceState::from_values(device.components(), device.values()),
                    )
                })
                .collect(),
        )
    }

    /// Closes every device and clears the registry. Further calls are no-ops.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let count = self.devices.len();
        for (_, shared) in self.devices.drain(..) {
            let mut device = shared.lock();
            device.close();
            for listener in self.device_listeners.iter_mut() {
                listener.on_disconnected(&device);
            }
        }
        tracing::info!(devices = count, "device registry closed");
    }
}

impl Drop for DeviceRegistry {
    fn drop(&mut self) {
        self.close();
    }
}
