//! Small angle helpers used by steering and recovery.

use std::f32::consts::PI;

/// Wrap a yaw angle into [-π, π] so heading differences stay signed
/// and minimal.
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle;
    while a > PI {
        a -= 2.0 * PI;
    }
    while a < -PI {
        a += 2.0 * PI;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_stays_in_range() {
        for raw in [-10.0f32, -PI, -0.5, 0.0, 0.5, PI, 10.0, 100.0] {
            let wrapped = normalize_angle(raw);
            assert!(wrapped >= -PI && wrapped <= PI, "{} -> {}", raw, wrapped);
        }
    }

    #[test]
    fn test_wrap_preserves_direction() {
        // A small left error past a full turn is still a small left error.
        let wrapped = normalize_angle(0.3 + 2.0 * PI);
        assert!((wrapped - 0.3).abs() < 1e-5);

        let wrapped = normalize_angle(-0.3 - 4.0 * PI);
        assert!((wrapped + 0.3).abs() < 1e-5);
    }
}
