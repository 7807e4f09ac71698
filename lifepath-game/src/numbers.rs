//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert a count to f64, allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Round a f64 and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// `part / whole` as a whole-number percentage, rounded half away from zero.
/// An empty `whole` yields 0.
#[must_use]
pub fn percent_of(part: usize, whole: usize) -> i32 {
    if whole == 0 {
        return 0;
    }
    round_f64_to_i32(usize_to_f64(part) * 100.0 / usize_to_f64(whole))
}

/// Map a unit draw in `[0, 1)` onto `0..len`, clamping stray values.
#[must_use]
pub fn unit_to_index(unit: f64, len: usize) -> usize {
    if len == 0 || !unit.is_finite() {
        return 0;
    }
    let scaled = (unit.clamp(0.0, 1.0) * usize_to_f64(len)).floor();
    cast::<f64, usize>(scaled).unwrap_or(0).min(len - 1)
}
