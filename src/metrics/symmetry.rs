//! Bilateral symmetry scores.
//!
//! A score is the plain absolute difference between a left-side and a
//! right-side measurement; values near 0 indicate symmetric movement,
//! larger values indicate compensation. Deliberately unnormalized for
//! camera distance or body scale, so pixel scores are camera-relative.

/// |left - right| of two angles (degrees). `None` if either side is missing.
pub fn angle_symmetry(left: Option<f64>, right: Option<f64>) -> Option<f64> {
    match (left, right) {
        (Some(l), Some(r)) => Some((l - r).abs()),
        _ => None,
    }
}

/// |left - right| of two y-coordinates (pixels). Unbounded, always >= 0.
pub fn y_symmetry(left_y: f64, right_y: f64) -> f64 {
    (left_y - right_y).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_symmetry_abs_diff() {
        assert_eq!(angle_symmetry(Some(170.0), Some(150.0)), Some(20.0));
        assert_eq!(angle_symmetry(Some(150.0), Some(170.0)), Some(20.0));
    }

    #[test]
    fn test_angle_symmetry_identical_zero() {
        assert_eq!(angle_symmetry(Some(42.5), Some(42.5)), Some(0.0));
    }

    #[test]
    fn test_angle_symmetry_missing_side_none() {
        assert_eq!(angle_symmetry(None, Some(90.0)), None);
        assert_eq!(angle_symmetry(Some(90.0), None), None);
        assert_eq!(angle_symmetry(None, None), None);
    }

    #[test]
    fn test_y_symmetry_non_negative() {
        assert_eq!(y_symmetry(240.0, 260.0), 20.0);
        assert_eq!(y_symmetry(260.0, 240.0), 20.0);
        assert_eq!(y_symmetry(100.0, 100.0), 0.0);
    }
}
