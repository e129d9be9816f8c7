//! Angle normalization and yaw/pitch/roll helpers.
//!
//! All angles are radians. Orientation triples follow the engine convention:
//! yaw about +Y, pitch about +X, roll about +Z, applied in that order.

use std::f32::consts::{PI, TAU};

use glam::{EulerRot, Quat, Vec3};

/// Wrap an angle into `[0, 2π)`.
#[must_use]
pub fn normalize(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid may round up to TAU for tiny negative inputs.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Clamp an angle into `[min + margin, max - margin]`.
///
/// Used to keep latitudes and camera tilt at least `margin` away from the
/// poles, where the spheric projection and `look_at` degenerate.
#[must_use]
pub fn clamp_inside(angle: f32, min: f32, max: f32, margin: f32) -> f32 {
    angle.clamp(min + margin, max - margin)
}

/// Normalize both angles and shift `to` so that `to - from` is the shortest
/// signed rotation (within `[-π, π]`).
#[must_use]
pub fn normalize_diff(from: f32, to: f32) -> (f32, f32) {
    let from = normalize(from);
    let to = normalize(to);
    let diff = to - from;
    if diff > PI {
        (from, to - TAU)
    } else if diff < -PI {
        (from, to + TAU)
    } else {
        (from, to)
    }
}

/// Return `to` shifted by whole turns so it lies within `π` of `from`.
///
/// Unlike [`normalize_diff`], `from` is left untouched.
#[must_use]
pub fn shortest_target(from: f32, to: f32) -> f32 {
    let diff = (to - from).rem_euclid(TAU);
    if diff > PI { from + diff - TAU } else { from + diff }
}

/// Yaw, pitch and roll of an orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ypr {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Ypr {
    #[must_use]
    pub const fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    /// Yaw and pitch that turn +Z onto the unit vector `dir`. Roll is zero.
    #[must_use]
    pub fn from_direction(dir: Vec3) -> Self {
        Self {
            yaw: PI / 2.0 - dir.z.atan2(dir.x),
            pitch: -dir.y.clamp(-1.0, 1.0).asin(),
            roll: 0.0,
        }
    }

    /// Move every component of `to` onto the shortest path from `self`.
    #[must_use]
    pub fn shortest_towards(self, to: Self) -> Self {
        Self {
            yaw: shortest_target(self.yaw, to.yaw),
            pitch: shortest_target(self.pitch, to.pitch),
            roll: shortest_target(self.roll, to.roll),
        }
    }

    /// Linear interpolation along the shortest angular path.
    #[must_use]
    pub fn lerp_shortest(self, to: Self, t: f32) -> Self {
        let to = self.shortest_towards(to);
        Self {
            yaw: self.yaw + (to.yaw - self.yaw) * t,
            pitch: self.pitch + (to.pitch - self.pitch) * t,
            roll: self.roll + (to.roll - self.roll) * t,
        }
    }

    /// Rotation `Ry(yaw) * Rx(pitch) * Rz(roll)`.
    #[must_use]
    pub fn to_quat(self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, self.roll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn normalize_wraps_into_one_turn() {
        assert!((normalize(-PI / 2.0) - 1.5 * PI).abs() < EPS);
        assert!((normalize(5.0 * PI) - PI).abs() < EPS);
        assert_eq!(normalize(0.0), 0.0);
        assert_eq!(normalize(-1e-9), 0.0);
    }

    #[test]
    fn normalize_diff_picks_shortest_way() {
        let (from, to) = normalize_diff(0.1, TAU - 0.1);
        assert!((from - 0.1).abs() < EPS);
        assert!((to + 0.1).abs() < EPS);

        let (from, to) = normalize_diff(TAU - 0.1, 0.1);
        assert!((from - (TAU - 0.1)).abs() < EPS);
        assert!((to - (TAU + 0.1)).abs() < EPS);
    }

    #[test]
    fn clamp_keeps_margin_from_limits() {
        let margin = 1.0_f32.to_radians();
        let lat = clamp_inside(PI / 2.0, -PI / 2.0, PI / 2.0, margin);
        assert!((lat - (PI / 2.0 - margin)).abs() < EPS);
        assert_eq!(clamp_inside(0.3, -PI / 2.0, PI / 2.0, margin), 0.3);
    }

    #[test]
    fn forward_direction_has_zero_angles() {
        let ypr = Ypr::from_direction(Vec3::Z);
        assert!(ypr.yaw.abs() < EPS);
        assert!(ypr.pitch.abs() < EPS);
        let forward = ypr.to_quat() * Vec3::Z;
        assert!(forward.abs_diff_eq(Vec3::Z, EPS));
    }

    #[test]
    fn quaternion_maps_forward_onto_direction() {
        for dir in [
            Vec3::X,
            Vec3::NEG_X,
            Vec3::new(0.3, 0.4, -0.5).normalize(),
            Vec3::new(-0.7, -0.2, 0.1).normalize(),
        ] {
            let q = Ypr::from_direction(dir).to_quat();
            assert!((q * Vec3::Z).abs_diff_eq(dir, 1e-4), "dir={dir}");
        }
    }

    proptest! {
        #[test]
        fn normalize_is_in_range(angle in -100.0_f32..100.0) {
            let n = normalize(angle);
            prop_assert!((0.0..TAU).contains(&n));
        }

        #[test]
        fn shortest_target_is_within_half_turn(from in -20.0_f32..20.0, to in -20.0_f32..20.0) {
            let t = shortest_target(from, to);
            prop_assert!((t - from).abs() <= PI + 1e-3);
            let turns = (t - to) / TAU;
            prop_assert!((turns - turns.round()).abs() < 1e-3);
        }
    }
}
