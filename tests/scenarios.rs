//! End-to-end scenarios through the device registry and the scripted backend.

use std::sync::{Arc, Mutex};

use unipad::backends::virtual_input::{VirtualBackend, VirtualDevice};
use unipad::backends::NativeDeviceDescriptor;
use unipad::normalize::normalize_axis;
use unipad::synth::directinput::{dijofs_button, dijofs_pov, DIJOFS_X, DIJOFS_Z};
use unipad::synth::evdev::{ABS_HAT0X, ABS_HAT0Y, ABS_X};
use unipad::synth::iokit::{usage, GD_HAT_SWITCH, PAGE_BUTTON, PAGE_GENERIC_DESKTOP};
use unipad::synth::xinput;
use unipad::{
    ids, ComponentEvent, Config, DeviceCategory, DeviceInfo, DeviceListener, DeviceMeta,
    DeviceRegistry, EventFilter, InputDevice, Logger, NativeComponentDescriptor, Platform,
    SharedDevice,
};

fn descriptor(path: &str, components: Vec<NativeComponentDescriptor>) -> NativeDeviceDescriptor {
    let meta = DeviceMeta {
        bus: Some("usb".into()),
        path: Some(path.into()),
        ..DeviceMeta::default()
    };
    NativeDeviceDescriptor {
        info: DeviceInfo::from_meta(path, "Scenario Pad", DeviceCategory::Gamepad, meta),
        components,
    }
}

fn session(
    platform: Platform,
    config: Config,
    components: Vec<NativeComponentDescriptor>,
) -> (DeviceRegistry, SharedDevice, VirtualDevice) {
    let backend = VirtualBackend::new(platform);
    let desc = descriptor("scenario:0", components);
    let id = desc.info.instance_id;
    let script = backend.add_device(desc);

    let mut registry = DeviceRegistry::new(Box::new(backend), config);
    assert_eq!(registry.initialize().expect("initialize"), 1);
    let device = registry.device(id).expect("device tracked");
    (registry, device, script)
}

#[test]
fn linux_dpad_split() {
    let (mut registry, device, script) = session(
        Platform::Evdev,
        Config::default(),
        vec![
            NativeComponentDescriptor::axis(ABS_HAT0Y, -1, 1, "ABS_HAT0Y"),
            NativeComponentDescriptor::axis(ABS_HAT0X, -1, 1, "ABS_HAT0X"),
        ],
    );
    assert_eq!(device.lock().components().len(), 2 + 4);

    script.set_raw(vec![1.0, -1.0]);
    registry.poll_all();

    let dev = device.lock();
    assert_eq!(dev.value(&ids::DPAD_UP), Some(1.0));
    assert_eq!(dev.value(&ids::DPAD_DOWN), Some(0.0));
    assert_eq!(dev.value(&ids::DPAD_LEFT), Some(0.0));
    assert_eq!(dev.value(&ids::DPAD_RIGHT), Some(1.0));
    assert_eq!(&dev.values()[..2], &[0.0, 0.0]);
}

#[test]
fn directinput_trigger_split() {
    let (mut registry, device, script) = session(
        Platform::DirectInput,
        Config::default(),
        vec![
            NativeComponentDescriptor::axis(DIJOFS_X, -1_000, 1_000, "X Axis"),
            NativeComponentDescriptor::axis(DIJOFS_Z, -1_000, 1_000, "Z Axis"),
        ],
    );

    script.set_raw(vec![0.0, -600.0]);
    let events = registry.poll_all();

    let dev = device.lock();
    assert_eq!(dev.value(&ids::Z), Some(0.0));
    let rt = dev.value(&ids::RIGHT_TRIGGER).expect("synthesized trigger");
    assert!((rt - 0.6).abs() < 1e-6);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].component.id(), &ids::RIGHT_TRIGGER);
}

#[test]
fn directinput_pov_diagonal_and_center() {
    let (mut registry, device, script) = session(
        Platform::DirectInput,
        Config::default(),
        vec![
            NativeComponentDescriptor::pov(dijofs_pov(0), 0, 35_900, "POV 0"),
            NativeComponentDescriptor::button(dijofs_button(0), "Button 0"),
        ],
    );

    script.set_raw(vec![13_500.0, 128.0]);
    registry.poll_all();
    {
        let dev = device.lock();
        assert_eq!(dev.value(&ids::DPAD_DOWN), Some(1.0));
        assert_eq!(dev.value(&ids::DPAD_RIGHT), Some(1.0));
        assert_eq!(dev.value(&ids::A), Some(1.0));
        assert_eq!(dev.value(&ids::POV), Some(0.0));
    }

    script.set_raw(vec![0xFFFF as f32, 0.0]);
    let events = registry.poll_all();
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| e.is_release()));
    assert!(!device.lock().has_input_data());
}

#[test]
fn iokit_hat_and_buttons() {
    let (mut registry, device, script) = session(
        Platform::IoKit,
        Config::default(),
        vec![
            NativeComponentDescriptor::pov(usage(PAGE_GENERIC_DESKTOP, GD_HAT_SWITCH), 0, 7, "Hat"),
            NativeComponentDescriptor::button(usage(PAGE_BUTTON, 2), "Button 2"),
        ],
    );

    // Position 6 from a zero minimum is west.
    script.set_raw(vec![6.0, 1.0]);
    registry.poll_all();

    let dev = device.lock();
    assert_eq!(dev.value(&ids::DPAD_LEFT), Some(1.0));
    assert_eq!(dev.value(&ids::DPAD_UP), Some(0.0));
    assert_eq!(dev.value(&ids::B), Some(1.0));
}

#[test]
fn xinput_fixed_layout() {
    let (mut registry, device, script) =
        session(Platform::XInput, Config::default(), xinput::native_layout());

    script.set_raw(xinput::raw_sample(0, i16::MAX, 0, 0, 0, 255, xinput::GAMEPAD_START as u16));
    registry.poll_all();

    let dev = device.lock();
    assert_eq!(dev.value(&ids::Y), Some(1.0));
    assert_eq!(dev.value(&ids::RIGHT_TRIGGER), Some(1.0));
    assert_eq!(dev.value(&ids::START), Some(1.0));
    assert_eq!(dev.value(&ids::BACK), Some(0.0));
}

#[test]
fn degenerate_axis_never_fires() {
    assert_eq!(normalize_axis(50.0, 100, 100), 0.0);

    let (mut registry, device, script) = session(
        Platform::Evdev,
        Config::default(),
        vec![NativeComponentDescriptor::axis(ABS_X, 100, 100, "ABS_X")],
    );
    script.set_raw(vec![50.0]);
    assert!(registry.poll_all().is_empty());
    assert_eq!(device.lock().value(&ids::X), Some(0.0));
}

#[test]
fn rounded_polls_fire_once() {
    let mut config = Config::default();
    config.accuracy = Some(3);
    let (mut registry, _device, script) = session(
        Platform::Evdev,
        config,
        vec![NativeComponentDescriptor::axis(ABS_X, -1_000, 1_000, "ABS_X")],
    );

    script.set_raw(vec![123.4]);
    assert_eq!(registry.poll_all().len(), 1);
    script.set_raw(vec![123.4001]);
    assert!(registry.poll_all().is_empty());
    assert!(registry.poll_all().is_empty());
}

#[test]
fn registry_listeners_receive_tagged_events() {
    let (mut registry, device, script) = session(
        Platform::Evdev,
        Config::default(),
        vec![NativeComponentDescriptor::axis(ABS_X, -1, 1, "ABS_X")],
    );
    let device_ref = device.lock().info().device_ref();

    let seen = Arc::new(Mutex::new(0usize));
    let counter = seen.clone();
    registry.add_listener(
        move |_: &ComponentEvent| *counter.lock().unwrap() += 1,
        EventFilter::AxisOnly,
        Some(device_ref),
    );
    registry.add_listener(Logger::new(), EventFilter::All, None);

    script.feed(vec![1.0]);
    script.feed(vec![-1.0]);
    registry.poll_all();
    registry.poll_all();
    registry.poll_all();

    assert_eq!(*seen.lock().unwrap(), 2);
}

#[test]
fn transient_failure_keeps_last_values() {
    let (mut registry, device, script) = session(
        Platform::Evdev,
        Config::default(),
        vec![NativeComponentDescriptor::axis(ABS_X, -1, 1, "ABS_X")],
    );

    script.set_raw(vec![1.0]);
    registry.poll_all();
    script.fail_polls(2);
    assert!(registry.poll_all().is_empty());
    assert!(registry.poll_all().is_empty());
    assert_eq!(device.lock().value(&ids::X), Some(1.0));

    // Back with an empty vector: the axis drops to zero once.
    script.set_raw(Vec::new());
    let events = registry.poll_all();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].new_value, 0.0);
}

#[test]
fn close_releases_every_handle_once() {
    let backend = VirtualBackend::new(Platform::Evdev);
    let scripts: Vec<_> = (0..3)
        .map(|i| {
            backend.add_device(descriptor(
                &format!("scenario:{i}"),
                vec![NativeComponentDescriptor::axis(ABS_X, -1, 1, "ABS_X")],
            ))
        })
        .collect();

    let mut registry = DeviceRegistry::new(Box::new(backend), Config::default());
    assert_eq!(registry.initialize().expect("initialize"), 3);
    registry.close();
    registry.close();
    assert!(registry.is_empty());
    drop(registry);

    for script in scripts {
        assert_eq!(script.release_count(), 1);
    }
}

#[derive(Default)]
struct PlugLog(Arc<Mutex<Vec<String>>>);

impl DeviceListener for PlugLog {
    fn on_connected(&mut self, device: &InputDevice) {
        self.0.lock().unwrap().push(format!("+{}", device.info().instance_name));
    }

    fn on_disconnected(&mut self, device: &InputDevice) {
        self.0.lock().unwrap().push(format!("-{}", device.info().instance_name));
    }
}

#[test]
fn hot_plug_connect_and_disconnect() {
    let backend = VirtualBackend::new(Platform::Evdev);
    let mut registry = DeviceRegistry::new(Box::new(backend.clone()), Config::default());
    assert_eq!(registry.initialize().expect("initialize"), 0);

    let log = Arc::new(Mutex::new(Vec::new()));
    registry.add_device_listener(PlugLog(log.clone()));

    let desc = descriptor(
        "scenario:hot",
        vec![NativeComponentDescriptor::axis(ABS_X, -1, 1, "ABS_X")],
    );
    let id = desc.info.instance_id;
    let script = backend.add_device(desc.clone());

    let device = registry
        .device_connected(desc)
        .expect("connect")
        .expect("gamepad accepted");
    script.set_raw(vec![1.0]);
    assert_eq!(registry.poll_all().len(), 1);
    assert_eq!(device.lock().value(&ids::X), Some(1.0));

    registry.device_disconnected(id).expect("disconnect");
    assert!(registry.is_empty());
    assert!(device.lock().is_closed());
    assert_eq!(script.release_count(), 1);
    assert!(registry.device_disconnected(id).is_err());

    registry.close();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["+scenario:hot".to_owned(), "-scenario:hot".to_owned()]
    );
}
