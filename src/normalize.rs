//! Raw-value normalizers.
//!
//! Pure conversions from one native sample shape into the canonical value space:
//! - axes: `[-1.0, 1.0]` (relative axes are left in native units)
//! - buttons/keys: `0.0` or `1.0`
//!
//! Hat values are decoded into [`PovToken`]s, an intermediate signal the
//! synthesizer turns into four D-Pad buttons. Tokens never reach a device value.
//!
//! All functions are total: degenerate ranges, NaN and out-of-range samples map
//! to well-defined outputs instead of panicking.

use serde::{Deserialize, Serialize};

/// DirectInput sentinel for a centered POV (low word `0xFFFF`).
pub const POV_CENTERED_RAW: i64 = 0xFFFF;

/// One full POV revolution in hundredths of a degree.
pub const POV_FULL_CIRCLE: i64 = 36_000;

/// Maps `raw` from `[min, max]` onto `[-1, 1]`, clamping first.
///
/// A degenerate range (`min == max`) yields `0.0`. An inverted range
/// (`min > max`) stays inverted: `min` maps to `-1.0` and `max` to `1.0`.
pub fn normalize_axis(raw: f64, min: i64, max: i64) -> f32 {
    let (min, max) = (min as f64, max as f64);
    // Distinct extreme bounds can collapse to one float.
    if min == max || raw.is_nan() {
        return 0.0;
    }
    let clamped = raw.clamp(min.min(max), min.max(max));
    let n = 2.0 * (clamped - min) / (max - min) - 1.0;
    (n as f32).clamp(-1.0, 1.0)
}

/// evdev-style deadzone ratio: `flat / (2 * (max - min))`.
pub fn evdev_deadzone_ratio(flat: i64, min: i64, max: i64) -> f32 {
    let span = (max as f64 - min as f64).abs();
    if span == 0.0 || flat <= 0 {
        return 0.0;
    }
    (flat as f64 / (2.0 * span)) as f32
}

/// Snaps `value` to `0.0` when its magnitude is below `deadzone_ratio`.
pub fn apply_deadzone(value: f32, deadzone_ratio: f32) -> f32 {
    if value.abs() < deadzone_ratio {
        0.0
    } else {
        value
    }
}

/// Platform jitter filter. Same rule as [`apply_deadzone`], kept separate because
/// the floor is a per-platform constant while the deadzone comes from the device.
pub fn noise_floor(value: f32, floor: f32) -> f32 {
    apply_deadzone(value, floor)
}

/// DirectInput button byte: pressed iff the high bit is set.
pub fn normalize_button(raw: u8) -> f32 {
    if raw & 0x80 != 0 {
        1.0
    } else {
        0.0
    }
}

/// evdev/IOKit button or key: any non-zero sample is pressed.
pub fn normalize_binary(raw: f64) -> f32 {
    if raw != 0.0 && !raw.is_nan() {
        1.0
    } else {
        0.0
    }
}

/// Hat direction, encoded as the float tokens the synthesizer consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PovToken {
    Centered,
    UpLeft,
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
}

impl PovToken {
    /// Compass octants clockwise from north.
    const CLOCKWISE: [PovToken; 8] = [
        PovToken::Up,
        PovToken::UpRight,
        PovToken::Right,
        PovToken::DownRight,
        PovToken::Down,
        PovToken::DownLeft,
        PovToken::Left,
        PovToken::UpLeft,
    ];

    /// Float token: `0.0` centered, `0.125` up-left through `1.0` left.
    pub fn value(self) -> f32 {
        match self {
            PovToken::Centered => 0.0,
            PovToken::UpLeft => 0.125,
            PovToken::Up => 0.25,
            PovToken::UpRight => 0.375,
            PovToken::Right => 0.5,
            PovToken::DownRight => 0.625,
            PovToken::Down => 0.75,
            PovToken::DownLeft => 0.875,
            PovToken::Left => 1.0,
        }
    }

    /// Inverse of [`PovToken::value`]. Unknown values decode as centered.
    pub fn from_value(value: f32) -> PovToken {
        [
            PovToken::UpLeft,
            PovToken::Up,
            PovToken::UpRight,
            PovToken::Right,
            PovToken::DownRight,
            PovToken::Down,
            PovToken::DownLeft,
            PovToken::Left,
        ]
        .into_iter()
        .find(|t| t.value() == value)
        .unwrap_or(PovToken::Centered)
    }

    /// Octant index clockwise from north (`Up = 0`).
    pub fn from_octant(octant: usize) -> PovToken {
        Self::CLOCKWISE[octant % 8]
    }

    /// `(up, down, left, right)` button states for this direction.
    pub fn directions(self) -> (bool, bool, bool, bool) {
        match self {
            PovToken::Centered => (false, false, false, false),
            PovToken::UpLeft => (true, false, true, false),
            PovToken::Up => (true, false, false, false),
            PovToken::UpRight => (true, false, false, true),
            PovToken::Right => (false, false, false, true),
            PovToken::DownRight => (false, true, false, true),
            PovToken::Down => (false, true, false, false),
            PovToken::DownLeft => (false, true, true, false),
            PovToken::Left => (false, false, true, false),
        }
    }
}

/// DirectInput POV angle (hundredths of a degree clockwise from north) to an octant token.
///
/// The sentinel (`0xFFFF` in the low word), negative values and values past a full
/// turn are centered.
pub fn normalize_pov(raw_hundredths: i64) -> PovToken {
    if raw_hundredths < 0
        || raw_hundredths & 0xFFFF == POV_CENTERED_RAW
        || raw_hundredths >= POV_FULL_CIRCLE
    {
        return PovToken::Centered;
    }
    let octant = ((raw_hundredths + 2_250) / 4_500) as usize;
    PovToken::from_octant(octant)
}

/// IOKit hat-switch position to a token.
///
/// Position `raw - min` in `0..=7` runs clockwise from north; anything else
/// (including the usual null state `max + 1`) is centered.
pub fn normalize_iokit_hat(raw: i64, min: i64) -> PovToken {
    match raw.checked_sub(min) {
        Some(position @ 0..=7) => PovToken::from_octant(position as usize),
        _ => PovToken::Centered,
    }
}

/// Signed 16-bit stick axis with a radial-free per-axis deadzone.
///
/// `i16::MIN`/`i16::MAX` snap to exactly `-1.0`/`1.0`.
pub fn normalize_signed(raw: i16, deadzone: i16) -> f32 {
    let magnitude = (raw as i32).abs();
    if magnitude < (deadzone as i32).abs() {
        return 0.0;
    }
    match raw {
        i16::MIN => -1.0,
        i16::MAX => 1.0,
        _ => (raw as f32 / i16::MAX as f32).clamp(-1.0, 1.0),
    }
}

/// Unsigned trigger byte: `0.0` below `threshold`, else `raw / 255`.
pub fn normalize_trigger(raw: u8, threshold: u8) -> f32 {
    if raw < threshold {
        0.0
    } else {
        raw as f32 / 255.0
    }
}

/// Rounds `value` to `places` decimal places. `None` keeps full precision.
///
/// Applied before both storage and comparison in the poll cycle, so the result
/// must be stable under repeated application.
pub fn round_to(value: f32, places: Option<u32>) -> f32 {
    let Some(places) = places else {
        return value;
    };
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(places.min(9) as i32);
    ((value as f64 * factor).round() / factor) as f32
}
