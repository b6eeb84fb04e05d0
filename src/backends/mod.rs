//! Native input backends for `unipad`.
//!
//! A backend enumerates devices and opens [`NativeDeviceHandle`]s for them.
//! It is the only place that talks to an OS API; everything it hands to the
//! core is a [`NativeDeviceDescriptor`] plus raw sample vectors.
//!
//! # Feature flags
//! - **`xinput`** enables the Windows XInput backend (default).
//!
//! [`virtual_input`] is always available and drives tests and demos.

use serde::{Deserialize, Serialize};

use crate::device::NativeDeviceHandle;
use crate::error::Result;
use crate::metadata::DeviceInfo;
use crate::synth::{NativeComponentDescriptor, Platform};

pub mod virtual_input;

#[cfg(all(feature = "xinput", target_os = "windows"))]
#[cfg_attr(docsrs, doc(cfg(all(feature = "xinput", target_os = "windows"))))]
pub mod windows;

/// Everything enumeration learned about one device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NativeDeviceDescriptor {
    pub info: DeviceInfo,
    /// Native objects in enumeration order.
    pub components: Vec<NativeComponentDescriptor>,
}

/// Per-platform device source.
pub trait NativeInputBackend: Send {
    /// Platform whose synthesizer classifies this backend's components.
    fn platform(&self) -> Platform;

    fn enumerate(&mut self) -> Result<Vec<NativeDeviceDescriptor>>;

    fn open(&mut self, descriptor: &NativeDeviceDescriptor) -> Result<Box<dyn NativeDeviceHandle>>;
}

/// Native backend for the build target, if one is compiled in.
///
/// Currently this is the XInput backend on Windows when `xinput` is enabled.
pub fn default_backend() -> Option<Box<dyn NativeInputBackend>> {
    #[cfg(all(feature = "xinput", target_os = "windows"))]
    {
        return Some(Box::new(windows::XInputBackend::new()));
    }

    #[allow(unreachable_code)]
    {
        tracing::debug!(platform = ?Platform::current(), "no native backend compiled in");
        None
    }
}
