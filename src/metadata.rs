//! Device metadata snapshot.
//!
//! [`DeviceMeta`] is a lightweight, cloneable description of a device suitable
//! for UI display, logging, and persistence. Backends populate what they know;
//! unknown fields remain `None`.
//!
//! # Conventions
//! - `bus` is a short, human-readable bus hint like `"usb"`, `"bluetooth"`, or `"xinput"`.
//! - `product_string` should be a friendly, user-facing name when available.
//! - `path` is an OS/topology path (opaque string). It doubles as the instance key
//!   from which [`DeviceInfo::instance_id`] is derived.
//!
//! ## Persistence notes
//! - `vid`/`pid` are generally stable and feed the derived `product_id`.
//! - `path` is platform-specific and may change across ports and reconnects.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::component::DeviceRef;

/// Coarse device class reported by the native layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    Gamepad,
    Joystick,
    Wheel,
    Keyboard,
    Mouse,
    Other,
}

/// Snapshot of metadata describing a single device.
///
/// All fields are optional; populate what is known on the current platform.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceMeta {
    /// High-level bus classification (e.g., `"usb"`, `"bluetooth"`, `"xinput"`).
    pub bus: Option<String>,

    /// USB Vendor ID (VID), if known.
    pub vid: Option<u16>,

    /// USB Product ID (PID), if known.
    pub pid: Option<u16>,

    /// Human-readable product name from the driver/firmware.
    pub product_string: Option<String>,

    /// Device serial number supplied by firmware/OS, if present.
    pub serial_number: Option<String>,

    /// OS/topological path to the device (`/dev/input/event7`, `xinput:0`, ...).
    pub path: Option<String>,
}

/// Identity and naming of a device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub instance_id: Uuid,
    pub product_id: Uuid,
    pub instance_name: String,
    pub product_name: String,
    pub category: DeviceCategory,
    pub meta: DeviceMeta,
}

impl DeviceInfo {
    /// Derives stable ids from native metadata.
    ///
    /// - `instance_id`: UUIDv5 of `path` (falls back to a random UUIDv4 without one).
    /// - `product_id`: UUIDv5 of `vid:pid`, or of the product name when ids are unknown.
    pub fn from_meta(
        instance_name: impl Into<String>,
        product_name: impl Into<String>,
        category: DeviceCategory,
        meta: DeviceMeta,
    ) -> Self {
        let instance_name = instance_name.into();
        let product_name = product_name.into();

        let instance_id = match meta.path.as_deref() {
            Some(path) => Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("instance:{path}").as_bytes()),
            None => Uuid::new_v4(),
        };
        let product_key = match (meta.vid, meta.pid) {
            (Some(vid), Some(pid)) => format!("product:{vid:04x}:{pid:04x}"),
            _ => format!("product:{product_name}"),
        };
        let product_id = Uuid::new_v5(&Uuid::NAMESPACE_OID, product_key.as_bytes());

        Self {
            instance_id,
            product_id,
            instance_name,
            product_name,
            category,
            meta,
        }
    }

    #[inline]
    pub fn device_ref(&self) -> DeviceRef {
        DeviceRef(self.instance_id)
    }
}
