//! unipad: one gamepad/joystick model for DirectInput, XInput, evdev and IOKit.
//!
//! Native backends enumerate devices as lists of native objects and poll them
//! as raw sample vectors. This crate turns both into a single canonical model:
//! well-known component identities, normalized values (`[-1, 1]` axes, `0/1`
//! buttons), hats expanded into four D-Pad buttons, and change events.
//!
//! # Layers
//! - [`component`]: identities and the process-wide id space.
//! - [`normalize`]: pure raw-value conversions.
//! - [`synth`]: per-platform classification and virtual component synthesis.
//! - [`device`]: the per-device poll/diff/event cycle.
//! - [`manager`]: the device registry, hot-plug and teardown.

pub mod backends;
pub mod component;
pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod eventbus;
pub mod filtered_listener;
pub mod logger;
pub mod manager;
pub mod metadata;
pub mod normalize;
pub mod snapshot;
pub mod synth;

pub use component::{ids, Component, ComponentId, ComponentRegistry, ComponentType, DeviceRef};
pub use config::Config;
pub use device::*;
pub use error::{Error, Result};
pub use event::*;
pub use eventbus::*;
pub use filtered_listener::FilteredListener;
pub use logger::Logger;
pub use manager::*;
pub use metadata::{DeviceCategory, DeviceInfo, DeviceMeta};
pub use snapshot::{DeviceState, Snapshot};
pub use synth::{NativeComponentDescriptor, NativeKind, Platform, Synthesizer, VirtualLayout};
