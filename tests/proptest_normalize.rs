//! Property-based tests for the raw-value normalizers.
//!
//! - rounding is idempotent
//! - linear axes stay in `[-1, 1]` and hit the endpoints exactly
//! - triggers are monotonic above the threshold
//! - every POV angle decodes to exactly one octant, sentinels to centered
//! - every normalizer is total over its full input domain

use proptest::prelude::*;
use unipad::normalize::{
    apply_deadzone, evdev_deadzone_ratio, noise_floor, normalize_axis, normalize_iokit_hat,
    normalize_pov, normalize_signed, normalize_trigger, round_to, PovToken,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_round_is_idempotent(v in -1.0e6f32..1.0e6f32, places in 0u32..=9) {
        let once = round_to(v, Some(places));
        prop_assert_eq!(round_to(once, Some(places)), once);
    }

    #[test]
    fn prop_axis_is_bounded(raw in any::<i32>(), min in -100_000i64..100_000, span in 1i64..200_000) {
        let max = min + span;
        let v = normalize_axis(raw as f64, min, max);
        prop_assert!((-1.0..=1.0).contains(&v), "normalize_axis({raw}, {min}, {max}) = {v}");
    }

    #[test]
    fn prop_axis_endpoints(min in -100_000i64..100_000, span in 1i64..200_000) {
        let max = min + span;
        prop_assert_eq!(normalize_axis(min as f64, min, max), -1.0);
        prop_assert_eq!(normalize_axis(max as f64, min, max), 1.0);
    }

    #[test]
    fn prop_degenerate_axis_is_zero(raw in any::<i32>(), at in any::<i32>()) {
        prop_assert_eq!(normalize_axis(raw as f64, at as i64, at as i64), 0.0);
    }

    #[test]
    fn prop_trigger_is_monotonic(threshold in any::<u8>(), a in any::<u8>(), b in any::<u8>()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assume!(lo >= threshold);
        prop_assert!(normalize_trigger(lo, threshold) <= normalize_trigger(hi, threshold));
    }

    #[test]
    fn prop_signed_is_bounded(raw in any::<i16>(), deadzone in 0i16..i16::MAX) {
        let v = normalize_signed(raw, deadzone);
        prop_assert!((-1.0..=1.0).contains(&v));
        if (raw as i32).abs() < deadzone as i32 {
            prop_assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn prop_pov_maps_to_one_octant(raw in 0i64..36_000) {
        let token = normalize_pov(raw);
        prop_assert_ne!(token, PovToken::Centered);
        let (up, down, left, right) = token.directions();
        prop_assert!(!(up && down) && !(left && right));
        prop_assert!(up || down || left || right);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_axis_is_total(raw in any::<f64>(), min in any::<i64>(), max in any::<i64>()) {
        let v = normalize_axis(raw, min, max);
        prop_assert!((-1.0..=1.0).contains(&v), "normalize_axis({raw}, {min}, {max}) = {v}");
    }

    #[test]
    fn prop_inverted_axis_mirrors(raw in -100_000i64..100_000, min in -100_000i64..100_000, span in 1i64..200_000) {
        let max = min + span;
        let inverted = normalize_axis(raw as f64, max, min);
        let upright = normalize_axis(raw as f64, min, max);
        prop_assert!((inverted + upright).abs() < 1e-6, "{inverted} vs {upright}");
    }

    #[test]
    fn prop_deadzone_ratio_is_total(flat in any::<i64>(), min in any::<i64>(), max in any::<i64>()) {
        let ratio = evdev_deadzone_ratio(flat, min, max);
        prop_assert!(ratio.is_finite() && ratio >= 0.0);
        let v = apply_deadzone(noise_floor(normalize_axis(0.0, min, max), 0.05), ratio);
        prop_assert!((-1.0..=1.0).contains(&v));
    }

    #[test]
    fn prop_hat_decoders_are_total(raw in any::<i64>(), min in any::<i64>()) {
        let token = normalize_iokit_hat(raw, min);
        let (up, down, left, right) = token.directions();
        prop_assert!(!(up && down) && !(left && right));
        let (up, down, left, right) = normalize_pov(raw).directions();
        prop_assert!(!(up && down) && !(left && right));
    }

    #[test]
    fn prop_signed_is_total(raw in any::<i16>(), deadzone in any::<i16>()) {
        prop_assert!((-1.0..=1.0).contains(&normalize_signed(raw, deadzone)));
    }

    #[test]
    fn prop_round_is_total(v in any::<f32>(), places in proptest::option::of(any::<u32>())) {
        let once = round_to(v, places);
        prop_assert_eq!(once.is_nan(), v.is_nan());
    }
}

#[test]
fn centered_pov_clears_every_direction() {
    for raw in [0xFFFF_i64, 0x0001_FFFF, -1, 36_000] {
        let token = normalize_pov(raw);
        assert_eq!(token, PovToken::Centered);
        assert_eq!(token.value(), 0.0);
        assert_eq!(token.directions(), (false, false, false, false));
    }
}
