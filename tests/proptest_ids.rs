//! Property-based tests for identity allocation and layout shape.

use std::collections::HashSet;
use std::thread;

use proptest::prelude::*;
use unipad::component::{allocate_id, ComponentRegistry, DeviceRef, MAX_DEFAULT_ID};
use unipad::synth::{prepare_virtual_components, NativeComponentDescriptor, Platform};
use unipad::Config;
use uuid::Uuid;

#[test]
fn concurrent_allocations_are_unique() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 1_000;

    let handles: Vec<_> = (0..THREADS)
        .map(|_| thread::spawn(|| (0..PER_THREAD).map(|_| allocate_id()).collect::<Vec<_>>()))
        .collect();

    let mut all = HashSet::new();
    for handle in handles {
        for id in handle.join().expect("allocator thread") {
            assert!(id > MAX_DEFAULT_ID);
            assert!(all.insert(id), "id {id} handed out twice");
        }
    }
    assert_eq!(all.len(), THREADS * PER_THREAD);
}

fn native_component() -> impl Strategy<Value = NativeComponentDescriptor> {
    prop_oneof![
        (0i32..0x40, -1_000i64..0, 1i64..1_000)
            .prop_map(|(code, min, max)| NativeComponentDescriptor::axis(code, min, max, format!("axis {code}"))),
        (0i32..0x300).prop_map(|code| NativeComponentDescriptor::button(code, format!("button {code}"))),
        (0i32..8).prop_map(|n| NativeComponentDescriptor::pov(32 + 4 * n, 0, 35_900, format!("pov {n}"))),
    ]
}

/// Descriptors straight from a misbehaving driver: any code, any range.
fn garbled_component() -> impl Strategy<Value = NativeComponentDescriptor> {
    prop_oneof![
        (any::<i32>(), any::<i64>(), any::<i64>(), any::<i64>()).prop_map(|(code, min, max, flat)| {
            NativeComponentDescriptor::axis(code, min, max, format!("axis {code}")).with_deadzone(flat)
        }),
        any::<i32>().prop_map(|code| NativeComponentDescriptor::button(code, format!("button {code}"))),
        any::<i32>().prop_map(|code| NativeComponentDescriptor::key(code, format!("key {code}"))),
        (any::<i32>(), any::<i64>(), any::<i64>())
            .prop_map(|(code, min, max)| NativeComponentDescriptor::pov(code, min, max, format!("pov {code}"))),
    ]
}

fn platform() -> impl Strategy<Value = Platform> {
    prop_oneof![
        Just(Platform::DirectInput),
        Just(Platform::XInput),
        Just(Platform::Evdev),
        Just(Platform::IoKit),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_redistribute_length_matches_components(
        platform in platform(),
        native in prop::collection::vec(native_component(), 0..24),
        raw in prop::collection::vec(-70_000.0f32..70_000.0, 0..40),
    ) {
        let registry = ComponentRegistry::new();
        let synth = platform.synthesizer(&Config::default());
        let layout = prepare_virtual_components(synth.as_ref(), DeviceRef(Uuid::nil()), &native, &registry);
        prop_assert!(layout.components().len() >= native.len());
        prop_assert_eq!(layout.redistribute_polled_values(&raw).len(), layout.components().len());
    }

    #[test]
    fn prop_layout_identities_are_unique(
        platform in platform(),
        native in prop::collection::vec(native_component(), 0..24),
    ) {
        let registry = ComponentRegistry::new();
        let synth = platform.synthesizer(&Config::default());
        let layout = prepare_virtual_components(synth.as_ref(), DeviceRef(Uuid::nil()), &native, &registry);
        let ids: HashSet<_> = layout.components().iter().map(|c| c.id().clone()).collect();
        prop_assert_eq!(ids.len(), layout.components().len());
    }

    #[test]
    fn prop_garbled_polls_stay_bounded(
        platform in platform(),
        native in prop::collection::vec(garbled_component(), 0..24),
        raw in prop::collection::vec(any::<f32>(), 0..40),
    ) {
        let registry = ComponentRegistry::new();
        let synth = platform.synthesizer(&Config::default());
        let layout = prepare_virtual_components(synth.as_ref(), DeviceRef(Uuid::nil()), &native, &registry);
        let values = layout.redistribute_polled_values(&raw);
        prop_assert_eq!(values.len(), layout.components().len());
        for v in values {
            prop_assert!((-1.0..=1.0).contains(&v), "canonical value {v} out of range");
        }
    }
}
