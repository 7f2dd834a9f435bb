//! Interior-angle computation at a joint vertex.

use super::joints::Pt;

/// Decimal places kept on every reported angle.
const ANGLE_DECIMALS: i32 = 2;

/// Interior angle in degrees at vertex `b`, formed by segments BA and BC.
///
/// Returns `None` when any coordinate is NaN or either segment has zero
/// length. The cosine is clamped to [-1, 1] before `acos` to absorb
/// floating-point drift, so the result is always within [0, 180].
pub fn interior_angle(a: Pt, b: Pt, c: Pt) -> Option<f64> {
    if [a, b, c].iter().any(|p| p.x.is_nan() || p.y.is_nan()) {
        return None;
    }

    let ba = (a.x - b.x, a.y - b.y);
    let bc = (c.x - b.x, c.y - b.y);

    let norm_ba = (ba.0 * ba.0 + ba.1 * ba.1).sqrt();
    let norm_bc = (bc.0 * bc.0 + bc.1 * bc.1).sqrt();
    if norm_ba == 0.0 || norm_bc == 0.0 {
        return None;
    }

    let cosine = ((ba.0 * bc.0 + ba.1 * bc.1) / (norm_ba * norm_bc)).clamp(-1.0, 1.0);
    let degrees = cosine.acos().to_degrees().abs();

    Some(round_to(degrees, ANGLE_DECIMALS))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
