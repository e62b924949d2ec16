//! Clamping and linear interpolation

/// Lowest command percentage.
pub const PERCENT_MIN: i32 = -100;
/// Highest command percentage.
pub const PERCENT_MAX: i32 = 100;

/// Clamp a command percentage to `[-100, 100]`.
pub fn clamp_percent(percent: i32) -> i32 {
    percent.clamp(PERCENT_MIN, PERCENT_MAX)
}

/// Map `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// Does not clamp. A degenerate input range maps everything to `out_min`.
pub fn lerp(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    let span = in_max - in_min;
    if span.abs() < f64::EPSILON {
        return out_min;
    }
    out_min + (value - in_min) * (out_max - out_min) / span
}

/// Round to the nearest integer, halves away from zero, saturating at the
/// `i32` bounds.
#[expect(
    clippy::cast_possible_truncation,
    reason = "float to int casts saturate and the value is rounded first"
)]
pub fn round_i32(value: f64) -> i32 {
    value.round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        assert!(close(lerp(955.0, 955.0, 2120.0, -100.0, 100.0), -100.0));
        assert!(close(lerp(2120.0, 955.0, 2120.0, -100.0, 100.0), 100.0));
        assert!(close(lerp(50.0, 0.0, 100.0, 400.0, 535.0), 467.5));
    }

    #[test]
    fn test_lerp_degenerate_range() {
        assert!(close(lerp(5.0, 3.0, 3.0, 10.0, 20.0), 10.0));
    }

    #[test]
    fn test_clamp_percent() {
        assert_eq!(clamp_percent(150), 100);
        assert_eq!(clamp_percent(-101), -100);
        assert_eq!(clamp_percent(42), 42);
    }

    #[test]
    fn test_round_i32() {
        assert_eq!(round_i32(467.5), 468);
        assert_eq!(round_i32(-0.5), -1);
        assert_eq!(round_i32(99.4), 99);
        assert_eq!(round_i32(f64::MAX), i32::MAX);
    }
}
