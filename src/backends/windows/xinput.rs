//! Windows XInput backend.
//!
//! XInput exposes up to four controller slots with a fixed report, so
//! enumeration is a probe of every slot and each connected slot is described
//! with [`synth::xinput::native_layout`](crate::synth::xinput::native_layout).
//!
//! # Identity
//! Slots carry no hardware path or serial. Each slot is published with the
//! synthetic path `xinput:{slot}` (so its instance id survives reconnects to the
//! same slot) and Microsoft's conventional VID.

use windows_sys::Win32::Foundation::ERROR_SUCCESS;
use windows_sys::Win32::UI::Input::XboxController::{
    XInputGetState, XInputSetState, XINPUT_STATE, XINPUT_VIBRATION,
};

use crate::backends::{NativeDeviceDescriptor, NativeInputBackend};
use crate::device::{NativeDeviceHandle, RumbleCommand};
use crate::error::{Error, Result};
use crate::metadata::{DeviceCategory, DeviceInfo, DeviceMeta};
use crate::synth::xinput::{native_layout, raw_sample};
use crate::synth::Platform;

/// Number of XInput user slots.
pub const MAX_SLOTS: u32 = 4;

const MICROSOFT_VID: u16 = 0x045e;

fn read_state(slot: u32) -> std::result::Result<XINPUT_STATE, u32> {
    // FFI struct: must be manually zeroed
    let mut state: XINPUT_STATE = unsafe { std::mem::zeroed() };
    let res = unsafe { XInputGetState(slot, &mut state) };
    if res == ERROR_SUCCESS {
        Ok(state)
    } else {
        Err(res)
    }
}

fn slot_path(slot: u32) -> String {
    format!("xinput:{slot}")
}

fn parse_slot(path: &str) -> Option<u32> {
    path.strip_prefix("xinput:")?
        .parse()
        .ok()
        .filter(|slot| *slot < MAX_SLOTS)
}

#[derive(Debug, Default)]
pub struct XInputBackend;

impl XInputBackend {
    pub fn new() -> Self {
        XInputBackend
    }

    /// Descriptor for `slot`, whether or not a controller is connected.
    pub fn describe(slot: u32) -> NativeDeviceDescriptor {
        let meta = DeviceMeta {
            bus: Some("xinput".into()),
            vid: Some(MICROSOFT_VID),
            pid: None,
            product_string: Some("XInput Controller".into()),
            serial_number: None,
            path: Some(slot_path(slot)),
        };
        NativeDeviceDescriptor {
            info: DeviceInfo::from_meta(
                format!("XInput Controller {slot}"),
                "XInput Controller",
                DeviceCategory::Gamepad,
                meta,
            ),
            components: native_layout(),
        }
    }
}

impl NativeInputBackend for XInputBackend {
    fn platform(&self) -> Platform {
        Platform::XInput
    }

    fn enumerate(&mut self) -> Result<Vec<NativeDeviceDescriptor>> {
        let found: Vec<_> = (0..MAX_SLOTS)
            .filter(|&slot| read_state(slot).is_ok())
            .map(Self::describe)
            .collect();
        tracing::debug!(count = found.len(), "probed xinput slots");
        Ok(found)
    }

    fn open(&mut self, descriptor: &NativeDeviceDescriptor) -> Result<Box<dyn NativeDeviceHandle>> {
        let slot = descriptor
            .info
            .meta
            .path
            .as_deref()
            .and_then(parse_slot)
            .ok_or_else(|| Error::Native(format!("not an xinput device: {}", descriptor.info.instance_name)))?;
        read_state(slot).map_err(|code| Error::Native(format!("XInputGetState({slot}) = {code}")))?;
        Ok(Box::new(XInputHandle { slot }))
    }
}

/// Open XInput slot.
#[derive(Debug)]
pub struct XInputHandle {
    slot: u32,
}

impl XInputHandle {
    fn set_vibration(&self, left: u16, right: u16) -> Result<()> {
        let vibration = XINPUT_VIBRATION {
            wLeftMotorSpeed: left,
            wRightMotorSpeed: right,
        };
        let res = unsafe { XInputSetState(self.slot, &vibration) };
        if res == ERROR_SUCCESS {
            Ok(())
        } else {
            Err(Error::Native(format!("XInputSetState({}) = {res}", self.slot)))
        }
    }
}

impl NativeDeviceHandle for XInputHandle {
    fn poll_raw(&mut self) -> Result<Vec<f32>> {
        let state = read_state(self.slot)
            .map_err(|code| Error::Native(format!("XInputGetState({}) = {code}", self.slot)))?;
        let gp = state.Gamepad;
        Ok(raw_sample(
            gp.sThumbLX,
            gp.sThumbLY,
            gp.sThumbRX,
            gp.sThumbRY,
            gp.bLeftTrigger,
            gp.bRightTrigger,
            gp.wButtons,
        ))
    }

    fn send_rumble(&mut self, command: RumbleCommand) -> Result<()> {
        let scale = |v: f32| (v * u16::MAX as f32).round() as u16;
        self.set_vibration(scale(command.left), scale(command.right))
    }

    fn release(&mut self) {
        // Leave the motors off when the device goes away.
        if let Err(err) = self.set_vibration(0, 0) {
            tracing::debug!(slot = self.slot, error = %err, "could not stop vibration");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_paths() {
        assert_eq!(parse_slot(&slot_path(3)), Some(3));
        assert_eq!(parse_slot("xinput:4"), None);
        assert_eq!(parse_slot("/dev/input/event0"), None);
    }

    #[test]
    fn test_slot_identity_is_stable() {
        let a = XInputBackend::describe(1);
        let b = XInputBackend::describe(1);
        assert_eq!(a.info.instance_id, b.info.instance_id);
        assert_ne!(a.info.instance_id, XInputBackend::describe(2).info.instance_id);
        assert_eq!(a.components.len(), 21);
    }
}
