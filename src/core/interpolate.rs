//! Crossing interpolation.
//!
//! A crossing lies somewhere between two consecutive samples. The marker's
//! coordinate fixes the fraction of the way along, and every continuous
//! telemetry field is linearly interpolated at that fraction.

/// Fraction of the way from `from` to `to` at which `value` lies.
///
/// Callers only ask when `from != to`; within a single walk the result is in
/// `[0, 1]`.
#[inline]
pub fn crossing_factor(value: f64, from: f64, to: f64) -> f64 {
    (value - from) / (to - from)
}

/// Linear interpolation: `a + factor * (b - a)`.
#[inline]
pub fn lerp(a: f64, b: f64, factor: f64) -> f64 {
    a + (b - a) * factor
}

/// Linear interpolation for 64-bit clocks.
///
/// The difference is taken in `i128` so it cannot overflow, and only then
/// narrowed to `f64` for the multiply.
#[inline]
pub fn lerp_wide(a: i64, b: i64, factor: f64) -> f64 {
    let delta = b as i128 - a as i128;
    a as f64 + delta as f64 * factor
}

/// Interpolate and round to the nearest integer (half away from zero).
#[inline]
pub fn lerp_rounded(a: u32, b: u32, factor: f64) -> u32 {
    lerp(a as f64, b as f64, factor).round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_midpoint() {
        assert_eq!(crossing_factor(105_000.0, 55_000.0, 155_000.0), 0.5);
        assert_eq!(crossing_factor(1_000.0, 1_000.0, 1_010.0), 0.0);
        assert_eq!(crossing_factor(1_010.0, 1_000.0, 1_010.0), 1.0);
    }

    #[test]
    fn test_factor_backward() {
        // Moving backward, the factor is still measured from the old sample
        assert_eq!(crossing_factor(300.0, 400.0, 200.0), 0.5);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(44_000_000.0, 44_000_002.0, 0.5), 44_000_001.0);
        assert_eq!(lerp(10.0, 0.0, 0.25), 7.5);
    }

    #[test]
    fn test_lerp_wide_keeps_precision() {
        let base = 1_700_000_000_000_i64;
        assert_eq!(lerp_wide(base, base + 2_000, 0.5), (base + 1_000) as f64);
        // Extreme spread does not overflow
        let v = lerp_wide(i64::MIN, i64::MAX, 0.5);
        assert!(v.abs() < 1e4);
    }

    #[test]
    fn test_lerp_rounded() {
        assert_eq!(lerp_rounded(140, 142, 0.5), 141);
        assert_eq!(lerp_rounded(140, 141, 0.5), 141);
        assert_eq!(lerp_rounded(90, 92, 0.2), 90);
    }
}
