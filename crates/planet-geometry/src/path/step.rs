//! The finest sampled piece of a path: a straight span with an orientation.

use glam::{Quat, Vec3};

use super::search::Span;
use crate::angle::Ypr;

/// A straight span between two consecutive path samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStep {
    /// Arc length from the start of the path.
    pub(crate) offset: f32,
    pub(crate) len: f32,
    pub(crate) start: Vec3,
    pub(crate) dir: Vec3,
    pub(crate) ypr: Ypr,
    pub(crate) normal: Vec3,
    pub(crate) rot: Quat,
}

impl PathStep {
    /// Step from `start` to `end` beginning at arc length `offset`.
    pub(crate) fn new(offset: f32, start: Vec3, end: Vec3) -> Self {
        let delta = end - start;
        let dir = delta.normalize_or_zero();
        let ypr = Ypr::from_direction(dir);
        let normal = start.normalize_or_zero();
        let mut step = Self {
            offset,
            len: delta.length(),
            start,
            dir,
            ypr,
            normal,
            rot: Quat::IDENTITY,
        };
        step.finalize_roll();
        step
    }

    /// Bank the step so its local up matches the outward sphere normal.
    ///
    /// World up is projected onto the plane perpendicular to `dir`; the roll
    /// is the angle between that projection and `normal`, signed by which
    /// side of `dir` the normal lies on.
    fn finalize_roll(&mut self) {
        let d = self.dir;
        let y_proj = Vec3::new(-(d.y * d.x), 1.0 - d.y * d.y, -(d.y * d.z)).normalize_or_zero();
        let angle = self.normal.dot(y_proj).clamp(-1.0, 1.0).acos();
        let cross = self.normal.cross(y_proj);
        self.ypr.roll = if d.dot(cross) < 0.0 { angle } else { -angle };
        self.rot = self.ypr.to_quat();
    }

    /// Arc length from the start of the path.
    #[must_use]
    pub const fn offset_from_start(&self) -> f32 {
        self.offset
    }

    #[must_use]
    pub const fn length(&self) -> f32 {
        self.len
    }

    #[must_use]
    pub const fn start(&self) -> Vec3 {
        self.start
    }

    #[must_use]
    pub const fn dir(&self) -> Vec3 {
        self.dir
    }

    #[must_use]
    pub const fn ypr(&self) -> Ypr {
        self.ypr
    }

    /// Outward sphere normal at the start point.
    #[must_use]
    pub const fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Orientation: forward is `dir`, up follows `normal`.
    #[must_use]
    pub const fn rot(&self) -> Quat {
        self.rot
    }

    /// Point `local` units along the step.
    #[must_use]
    pub fn position_at(&self, local: f32) -> Vec3 {
        self.start + self.dir * local
    }
}

impl Span for PathStep {
    fn offset(&self) -> f32 {
        self.offset
    }

    fn end(&self) -> f32 {
        self.offset + self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_and_direction() {
        let step = PathStep::new(2.0, Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.5));
        assert!((step.length() - 0.5).abs() < 1e-6);
        assert!(step.dir().abs_diff_eq(Vec3::Z, 1e-6));
        assert_eq!(step.end(), 2.5);
        assert!(step.position_at(0.25).abs_diff_eq(Vec3::new(1.0, 0.0, 0.25), 1e-6));
    }

    #[test]
    fn orientation_points_forward_with_outward_up() {
        // Moving along +Z on the equator at +X: up should be +X.
        let step = PathStep::new(0.0, Vec3::X, Vec3::new(1.0, 0.0, 0.1));
        let forward = step.rot() * Vec3::Z;
        let up = step.rot() * Vec3::Y;
        assert!(forward.abs_diff_eq(step.dir(), 1e-4), "forward={forward}");
        assert!(up.abs_diff_eq(Vec3::X, 1e-3), "up={up}");
    }

    #[test]
    fn banking_over_the_north_side() {
        // Heading +Z over a point above the XZ plane banks toward the normal.
        let start = Vec3::new(1.0, 1.0, 0.0);
        let step = PathStep::new(0.0, start, start + Vec3::Z * 0.1);
        let up = step.rot() * Vec3::Y;
        assert!(up.abs_diff_eq(start.normalize(), 1e-3), "up={up}");
    }
}
