//! Ship controller: moves along the path, snaps between tube sectors and
//! banks into turns.

use glam::{Quat, Vec3};
use planet_geometry::{DirectionEx, DirectionFlags, Path, angle, geo};

use crate::config::{ShipConfig, TubeConfig};
use crate::tween::{Ease, Tween};

/// Distance along the flight direction used to measure the compass heading.
const HEADING_PROBE: f32 = 0.1;

/// Direction of a sector snap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
}

/// World placement of the ship.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for ShipPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Place the ship on the tube wall around the path pose `at`.
///
/// The ship is rotated `sector_angle` around the path axis, lifted by
/// `radius`, then rolled by the yaw change between `at` and `ahead`.
#[must_use]
pub fn ship_pose(at: &DirectionEx, ahead: &DirectionEx, sector_angle: f32, radius: f32) -> ShipPose {
    let yaw_diff = angle::shortest_target(at.ypr.yaw, ahead.ypr.yaw) - at.ypr.yaw;
    let around = at.rot * Quat::from_rotation_z(sector_angle);
    ShipPose {
        position: at.pos + around * (Vec3::Y * radius),
        rotation: around * Quat::from_rotation_z(yaw_diff),
    }
}

/// Drives the ship along a looped path.
#[derive(Debug, Clone)]
pub struct ShipController {
    speed: f32,
    look_ahead: f32,
    rotate_duration: f32,
    radius: f32,
    snap_angles: Vec<f32>,
    snap_index: usize,
    rotation: Tween,
    elapsed: f32,
    offset: f32,
    direx: DirectionEx,
    pose: ShipPose,
    heading: f32,
}

impl ShipController {
    /// # Panics
    ///
    /// Panics if the tube has no sectors to snap to.
    #[must_use]
    pub fn new(ship: &ShipConfig, tube: &TubeConfig) -> Self {
        let snap_angles = tube.sector_angles();
        assert!(!snap_angles.is_empty(), "ship controller needs at least one snap angle");
        Self {
            speed: ship.speed,
            look_ahead: ship.look_ahead(),
            rotate_duration: ship.rotate_duration,
            radius: tube.radius,
            rotation: Tween::new(snap_angles[0]),
            snap_angles,
            snap_index: 0,
            elapsed: 0.0,
            offset: 0.0,
            direx: DirectionEx::default(),
            pose: ShipPose::default(),
            heading: 0.0,
        }
    }

    /// Back to the path start at the first sector.
    pub fn reset(&mut self) {
        self.snap_index = 0;
        self.rotation.set(self.snap_angles[0]);
        self.elapsed = 0.0;
        self.offset = 0.0;
        self.direx = DirectionEx::default();
        self.pose = ShipPose::default();
        self.heading = 0.0;
    }

    /// Sample the path at the current offset, place the ship, then move on.
    ///
    /// Returns `false`, after logging, if the path has no pose there.
    pub fn update(&mut self, path: &Path, dt: f32) -> bool {
        self.rotation.update(dt);

        let Some(direx) = self.direction_ex(path, 0.0, DirectionFlags::ALL) else {
            tracing::error!(offset = self.offset, "Failed to update direx from ship controller");
            return false;
        };
        // Only the yaw of the look-ahead pose is used, and it is always set.
        let ahead = self
            .direction_ex(path, self.look_ahead, DirectionFlags::NONE)
            .unwrap_or(direx);

        self.direx = direx;
        self.heading =
            geo::bearing_between_points(direx.pos, direx.pos + direx.dir * HEADING_PROBE);
        self.pose = ship_pose(&direx, &ahead, self.rotation.value(), self.radius);

        self.move_forward(path, dt);
        true
    }

    /// Path pose `ahead` past the ship, wrapping around looped paths.
    #[must_use]
    pub fn direction_ex(&self, path: &Path, ahead: f32, flags: DirectionFlags) -> Option<DirectionEx> {
        path.direction_ex(path.wrap_offset(self.offset + ahead), flags)
    }

    fn move_forward(&mut self, path: &Path, dt: f32) {
        self.elapsed += dt;
        let length = path.length();
        self.offset = if length > 0.0 {
            (self.elapsed * self.speed).rem_euclid(length)
        } else {
            0.0
        };
    }

    /// Start snapping to the neighbouring sector and return the target
    /// angle, unwrapped onto the shortest path from the current one.
    pub fn rotate(&mut self, turn: Turn) -> f32 {
        let count = self.snap_angles.len();
        let old = self.snap_index;
        self.snap_index = match turn {
            Turn::Left => (old + count - 1) % count,
            Turn::Right => (old + 1) % count,
        };

        let (from, to) =
            angle::normalize_diff(self.rotation.value(), self.snap_angles[self.snap_index]);
        self.rotation.set(from);
        self.rotation.start(to, self.rotate_duration, Ease::BackInOut);

        tracing::debug!(
            ?turn,
            from = old,
            to = self.snap_index,
            "Rotating ship :: angle={:.2}->{:.2}",
            from.to_degrees(),
            to.to_degrees()
        );
        to
    }

    /// Arc length travelled along the path, wrapped to its length.
    #[must_use]
    pub const fn offset(&self) -> f32 {
        self.offset
    }

    /// Current (eased) rotation around the path axis.
    #[must_use]
    pub const fn rotate_angle(&self) -> f32 {
        self.rotation.value()
    }

    #[must_use]
    pub const fn snap_index(&self) -> usize {
        self.snap_index
    }

    /// Path pose at the ship's offset as of the last update.
    #[must_use]
    pub const fn direx(&self) -> &DirectionEx {
        &self.direx
    }

    /// Ship pose as of the last update.
    #[must_use]
    pub const fn pose(&self) -> &ShipPose {
        &self.pose
    }

    /// Compass bearing of the flight direction, radians clockwise from
    /// north.
    #[must_use]
    pub const fn heading(&self) -> f32 {
        self.heading
    }
}
