//! Easing curves for camera choreography

/// Cubic ease-in-out: `4t³` below the midpoint, `1 - (-2t + 2)³ / 2` above it.
///
/// `t` is expected in `[0, 1]`; callers clamp progress before easing.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_points() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(0.5), 0.5);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
    }

    #[test]
    fn test_matches_polynomial() {
        assert!((ease_in_out_cubic(0.25) - 0.0625).abs() < 1e-7);
        assert!((ease_in_out_cubic(0.75) - 0.9375).abs() < 1e-7);
    }

    #[test]
    fn test_monotonic_non_decreasing() {
        let mut previous = ease_in_out_cubic(0.0);
        for step in 1..=1000 {
            let value = ease_in_out_cubic(step as f32 / 1000.0);
            assert!(value >= previous, "eased value dropped at step {}", step);
            previous = value;
        }
    }

    #[test]
    fn test_symmetric_about_midpoint() {
        for step in 0..=100 {
            let t = step as f32 / 100.0;
            let sum = ease_in_out_cubic(t) + ease_in_out_cubic(1.0 - t);
            assert!((sum - 1.0).abs() < 1e-5);
        }
    }
}
