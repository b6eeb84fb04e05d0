//! Drives a scripted DirectInput-style pad through the registry and logs
//! every canonical change.
//!
//! Run with `cargo run --example virtual_poll`.

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use unipad::backends::virtual_input::VirtualBackend;
use unipad::backends::NativeDeviceDescriptor;
use unipad::synth::directinput::{dijofs_button, dijofs_pov, DIJOFS_X, DIJOFS_Y, DIJOFS_Z};
use unipad::{
    Config, DeviceCategory, DeviceInfo, DeviceMeta, DeviceRegistry, EventFilter, Logger,
    NativeComponentDescriptor, Platform,
};

fn main() -> unipad::Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("a tracing subscriber was already installed");
    }

    let backend = VirtualBackend::new(Platform::DirectInput);
    let script = backend.add_device(NativeDeviceDescriptor {
        info: DeviceInfo::from_meta(
            "Virtual Pad 0",
            "Virtual Pad",
            DeviceCategory::Gamepad,
            DeviceMeta {
                bus: Some("virtual".into()),
                path: Some("virtual:0".into()),
                ..DeviceMeta::default()
            },
        ),
        components: vec![
            NativeComponentDescriptor::axis(DIJOFS_X, 0, 65_535, "X Axis"),
            NativeComponentDescriptor::axis(DIJOFS_Y, 0, 65_535, "Y Axis"),
            NativeComponentDescriptor::axis(DIJOFS_Z, -32_768, 32_767, "Z Axis"),
            NativeComponentDescriptor::pov(dijofs_pov(0), 0, 35_900, "POV 0"),
            NativeComponentDescriptor::button(dijofs_button(0), "Button 0"),
            NativeComponentDescriptor::button(dijofs_button(1), "Button 1"),
        ],
    });

    let mut config = Config::default();
    config.accuracy = Some(3);
    let mut registry = DeviceRegistry::new(Box::new(backend), config);
    registry.add_listener(Logger::new(), EventFilter::All, None);
    registry.initialize()?;

    // Stick right, left trigger half, POV up-right, A pressed.
    script.feed(vec![65_535.0, 32_767.0, 16_384.0, 4_500.0, 128.0, 0.0]);
    // Right trigger via negative Z, POV centered, A released, B pressed.
    script.feed(vec![32_767.0, 32_767.0, -32_768.0, 65_535.0, 0.0, 128.0]);

    for tick in 0..3 {
        let events = registry.poll_all();
        println!("tick {tick}: {} change(s)", events.len());
    }

    for (id, state) in registry.snapshot().iter() {
        println!("{id}: axes={:?} buttons={:?}", state.axes, state.buttons);
    }

    registry.close();
    Ok(())
}
