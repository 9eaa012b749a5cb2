//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Floor a f64 and clamp it to the i64 range, returning 0 for non-finite values.
#[must_use]
pub fn floor_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let min = cast::<i64, f64>(i64::MIN).unwrap_or(f64::MIN);
    let max = cast::<i64, f64>(i64::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).floor();
    cast::<f64, i64>(clamped).unwrap_or(0)
}

/// Round a f64 and clamp it to the i64 range, returning 0 for non-finite values.
#[must_use]
pub fn round_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let min = cast::<i64, f64>(i64::MIN).unwrap_or(f64::MIN);
    let max = cast::<i64, f64>(i64::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i64>(clamped).unwrap_or(0)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Convert a collection size to a u32 counter, saturating on overflow.
#[must_use]
pub fn usize_to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_handles_non_finite() {
        assert_eq!(floor_f64_to_i64(2.9), 2);
        assert_eq!(floor_f64_to_i64(-0.5), -1);
        assert_eq!(floor_f64_to_i64(f64::NAN), 0);
        assert_eq!(floor_f64_to_i64(f64::INFINITY), 0);
        assert_eq!(floor_f64_to_i64(1e15 + 0.5), 1_000_000_000_000_000);
    }

    #[test]
    fn rounders_cover_ranges() {
        assert_eq!(round_f64_to_i64(1.6), 2);
        assert_eq!(round_f64_to_i64(-1.6), -2);
        assert_eq!(round_f64_to_i64(f64::NEG_INFINITY), 0);
    }

    #[test]
    fn widening_helpers() {
        assert!((i64_to_f64(1_000) - 1_000.0).abs() < f64::EPSILON);
        assert_eq!(usize_to_u32(7), 7);
    }
}
