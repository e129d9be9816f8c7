//! Uniform Catmull-Rom interpolation.

use glam::Vec2;

/// Point on the Catmull-Rom span from `p1` to `p2` at `t ∈ [0, 1]`.
///
/// `p0` and `p3` are the neighbouring control points that shape the
/// tangents at either end.
#[must_use]
pub fn catmull_rom_point(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

/// Sample the span `p[1] -> p[2]` at `count` evenly spaced parameters,
/// including both end points.
///
/// # Panics
///
/// Panics if `count < 2`.
#[must_use]
pub fn sample_span(p: [Vec2; 4], count: usize) -> Vec<Vec2> {
    assert!(count >= 2, "spline span needs at least 2 samples: count={count}");
    let step = 1.0 / (count - 1) as f32;
    (0..count)
        .map(|i| catmull_rom_point(p[0], p[1], p[2], p[3], i as f32 * step))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_inner_control_points() {
        let p = [
            Vec2::new(-1.0, 0.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(2.0, 1.0),
        ];
        assert!(catmull_rom_point(p[0], p[1], p[2], p[3], 0.0).abs_diff_eq(p[1], 1e-6));
        assert!(catmull_rom_point(p[0], p[1], p[2], p[3], 1.0).abs_diff_eq(p[2], 1e-6));
    }

    #[test]
    fn collinear_points_stay_on_line() {
        let p = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(3.0, 3.0),
        ];
        let samples = sample_span(p, 5);
        assert_eq!(samples.len(), 5);
        for (i, s) in samples.iter().enumerate() {
            let expected = 1.0 + i as f32 * 0.25;
            assert!((s.x - expected).abs() < 1e-5 && (s.y - expected).abs() < 1e-5);
        }
    }
}
