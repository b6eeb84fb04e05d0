#![cfg(target_os = "windows")]

//! Windows input backends.
//!
//! - **XInput** controller slots `0..4` via `XInputGetState`/`XInputSetState`.
//!
//! Most users should not touch this module directly; hand the backend from
//! [`default_backend`](crate::backends::default_backend) to a
//! [`DeviceRegistry`](crate::manager::DeviceRegistry).

pub mod xinput;

pub use xinput::{XInputBackend, XInputHandle};
