//! Scripted in-memory backend.
//!
//! [`VirtualDevice`] is a native handle whose raw samples are fed by the host
//! (tests, demos, replay tools). Clones share state, so one clone can be handed
//! to the device registry while another keeps scripting it.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use super::{NativeDeviceDescriptor, NativeInputBackend};
use crate::device::{NativeDeviceHandle, RumbleCommand};
use crate::error::{Error, Result};
use crate::synth::Platform;

#[derive(Debug, Default)]
struct VirtualState {
    queued: VecDeque<Vec<f32>>,
    current: Vec<f32>,
    failing_polls: usize,
    rumble: Vec<RumbleCommand>,
    releases: usize,
}

#[derive(Clone, Debug, Default)]
pub struct VirtualDevice {
    state: Arc<Mutex<VirtualState>>,
}

impl VirtualDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one raw frame. Queued frames are consumed one per poll; once the
    /// queue is empty the last frame keeps being reported.
    pub fn feed(&self, raw: Vec<f32>) {
        self.state.lock().queued.push_back(raw);
    }

    /// Replaces the reported raw vector immediately, dropping queued frames.
    pub fn set_raw(&self, raw: Vec<f32>) {
        let mut state = self.state.lock();
        state.queued.clear();
        state.current = raw;
    }

    /// Makes the next `count` polls fail.
    pub fn fail_polls(&self, count: usize) {
        self.state.lock().failing_polls = count;
    }

    /// Rumble commands received so far.
    pub fn rumble_log(&self) -> Vec<RumbleCommand> {
        self.state.lock().rumble.clone()
    }

    /// How many times the handle was released.
    pub fn release_count(&self) -> usize {
        self.state.lock().releases
    }
}

impl NativeDeviceHandle for VirtualDevice {
    fn poll_raw(&mut self) -> Result<Vec<f32>> {
        let mut state = self.state.lock();
        if state.failing_polls > 0 {
            state.failing_polls -= 1;
            return Err(Error::Native("scripted poll failure".into()));
        }
        if let Some(frame) = state.queued.pop_front() {
            state.current = frame;
        }
        Ok(state.current.clone())
    }

    fn send_rumble(&mut self, command: RumbleCommand) -> Result<()> {
        self.state.lock().rumble.push(command);
        Ok(())
    }

    fn release(&mut self) {
        self.state.lock().releases += 1;
    }
}

#[derive(Debug, Default)]
struct BackendState {
    devices: Vec<(NativeDeviceDescriptor, VirtualDevice)>,
    failing_opens: HashSet<Uuid>,
}

/// Backend serving [`VirtualDevice`]s. Clones share the device list.
#[derive(Clone, Debug)]
pub struct VirtualBackend {
    platform: Platform,
    state: Arc<Mutex<BackendState>>,
}

impl VirtualBackend {
    /// `platform` decides which synthesizer classifies the scripted components.
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            state: Arc::new(Mutex::new(BackendState::default())),
        }
    }

    /// Adds a device to the enumeration and returns its scripting handle.
    pub fn add_device(&self, descriptor: NativeDeviceDescriptor) -> VirtualDevice {
        let device = VirtualDevice::new();
        self.state.lock().devices.push((descriptor, device.clone()));
        device
    }

    /// Removes a device from the enumeration.
    pub fn remove_device(&self, instance_id: Uuid) {
        self.state
            .lock()
            .devices
            .retain(|(desc, _)| desc.info.instance_id != instance_id);
    }

    /// Makes every `open` of this device fail.
    pub fn fail_open(&self, instance_id: Uuid) {
        self.state.lock().failing_opens.insert(instance_id);
    }
}

impl NativeInputBackend for VirtualBackend {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn enumerate(&mut self) -> Result<Vec<NativeDeviceDescriptor>> {
        Ok(self
            .state
            .lock()
            .devices
            .iter()
            .map(|(desc, _)| desc.clone())
            .collect())
    }

    fn open(&mut self, descriptor: &NativeDeviceDescriptor) -> Result<Box<dyn NativeDeviceHandle>> {
        let id = descriptor.info.instance_id;
        let state = self.state.lock();
        if state.failing_opens.contains(&id) {
            return Err(Error::Native(format!("scripted open failure for {id}")));
        }
        state
            .devices
            .iter()
            .find(|(desc, _)| desc.info.instance_id == id)
            .map(|(_, device)| Box::new(device.clone()) as Box<dyn NativeDeviceHandle>)
            .ok_or(Error::DeviceNotFound(id))
    }
}
