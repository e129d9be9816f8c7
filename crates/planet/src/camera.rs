//! Chase camera orbiting a target pose in polar coordinates.
//!
//! Polar triples are `(horizontal, vertical, radius)` in a `Vec3`. The eye
//! sits `radius` behind the target, turned by the vertical angle about +X
//! and then the horizontal angle about +Y; the look-at point is pushed
//! forward by the offset triple the same way.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Quat, Vec2, Vec3};
use planet_geometry::angle;

use crate::config::CameraConfig;
use crate::tween::{Ease, Tween};

const MIN_RADIUS: f32 = 0.1;
const VERTICAL_MARGIN: f32 = PI / 180.0;
/// Past this distance from the upside-down position the ship rotation is
/// pinned to the tilt limit.
const TILT_PIN_THRESHOLD: f32 = FRAC_PI_2 - 10.0 * PI / 180.0;

/// Eye, look-at point and up vector for a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

/// Which polar triple a mouse drag edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Swing the eye around the target.
    Orbit,
    /// Tilt and extend the look-at offset.
    Offset,
}

fn rotate_polar(v: Vec3, polar: Vec3) -> Vec3 {
    Quat::from_rotation_y(polar.x) * (Quat::from_rotation_x(polar.y) * v)
}

#[derive(Debug, Clone)]
pub struct ShipCamera {
    position: Vec3,
    offset: Vec3,
    ship_rotation: Tween,
    /// Follow the target's rotation instead of world axes.
    pub locked: bool,
    /// Also follow the ship's rotation around the path.
    pub relative_rotation: bool,
    scroll_factor: f32,
    rotate_h_factor: f32,
    rotate_v_factor: f32,
    move_factor: f32,
    rotate_duration: f32,
    tilt_max: Option<f32>,
}

impl ShipCamera {
    #[must_use]
    pub fn new(config: &CameraConfig) -> Self {
        let polar = |[h, v, r]: [f32; 3]| Vec3::new(h.to_radians(), v.to_radians(), r);
        let mut camera = Self {
            position: Vec3::ZERO,
            offset: Vec3::ZERO,
            ship_rotation: Tween::new(0.0),
            locked: true,
            relative_rotation: true,
            scroll_factor: config.scroll_factor,
            rotate_h_factor: config.rotate_h_factor,
            rotate_v_factor: config.rotate_v_factor,
            move_factor: config.move_factor,
            rotate_duration: config.rotate_duration,
            tilt_max: config.tilt_limit.then(|| config.tilt_max_deg.to_radians()),
        };
        camera.set_polar(polar(config.position), polar(config.offset));
        camera
    }

    /// Replace both polar triples.
    pub fn set_polar(&mut self, position: Vec3, offset: Vec3) {
        self.position = position;
        self.offset = offset;
        self.finalize_angles();
    }

    fn finalize_angles(&mut self) {
        self.position.x = angle::normalize(self.position.x);
        self.position.y =
            angle::clamp_inside(self.position.y, -FRAC_PI_2, FRAC_PI_2, VERTICAL_MARGIN);
    }

    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub const fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Current (eased) ship rotation the camera follows.
    #[must_use]
    pub const fn ship_rotation(&self) -> f32 {
        self.ship_rotation.value()
    }

    /// Apply a mouse drag of `delta` pixels.
    pub fn drag(&mut self, mode: DragMode, delta: Vec2) {
        match mode {
            DragMode::Orbit => {
                self.position.x += delta.x * self.rotate_h_factor;
                self.position.y += delta.y * self.rotate_v_factor;
            }
            DragMode::Offset => {
                self.offset.y += delta.x * self.rotate_v_factor;
                self.offset.z += self.position.z * delta.y * self.move_factor;
            }
        }
        self.finalize_angles();
    }

    /// Zoom by `amount` wheel notches, proportionally to the distance.
    pub fn scroll(&mut self, amount: f32) {
        self.position.z += self.position.z * amount * self.scroll_factor;
        if self.position.z < MIN_RADIUS {
            self.position.z = MIN_RADIUS;
        }
    }

    /// Shift the offset triple directly.
    pub fn nudge_offset(&mut self, delta: Vec3) {
        self.offset += delta;
    }

    /// Start following a ship rotation toward `dest` radians.
    pub fn on_ship_rotate(&mut self, dest: f32) {
        let dest = self.tilt_target(dest);
        let (from, to) = angle::normalize_diff(self.ship_rotation.value(), dest);
        self.ship_rotation.set(from);
        self.ship_rotation.start(to, self.rotate_duration, Ease::SineOut);
    }

    /// Keep the camera from following the ship upside down.
    ///
    /// Angles within the tilt limit of upright pass through. Near the
    /// limit they pin to it; nearer to upside down they fold back toward
    /// upright along a sine.
    fn tilt_target(&self, dest: f32) -> f32 {
        let dest = angle::normalize(dest);
        let Some(tilt_max) = self.tilt_max else {
            return dest;
        };
        let tilt_min = TAU - tilt_max;
        if dest >= tilt_min || dest <= tilt_max {
            return dest;
        }

        let diff = PI - dest;
        let is_right = diff > 0.0;
        let diff = diff.abs();
        let sign = if is_right { 1.0 } else { -1.0 };
        if diff >= TILT_PIN_THRESHOLD {
            if is_right { tilt_max } else { tilt_min }
        } else {
            diff.sin() * tilt_max * sign
        }
    }

    /// Advance the rotation tween.
    pub fn update(&mut self, dt: f32) {
        self.ship_rotation.update(dt);
    }

    /// Drop any running rotation.
    pub fn reset(&mut self) {
        self.ship_rotation.set(0.0);
    }

    /// Camera placement around a target at `target_pos` facing `target_rot`.
    #[must_use]
    pub fn view(&self, target_pos: Vec3, target_rot: Quat) -> CameraView {
        let local_rot = if self.relative_rotation {
            target_rot * Quat::from_rotation_z(self.ship_rotation.value())
        } else {
            Quat::IDENTITY
        };

        let mut up = Vec3::Y;
        let mut target = Vec3::ZERO;
        let mut eye = rotate_polar(Vec3::NEG_Z * self.position.z, self.position);
        if self.locked {
            up = local_rot * up;
            target = local_rot * rotate_polar(Vec3::Z * self.offset.z, self.offset);
            eye = local_rot * eye;
        }
        target += target_pos;

        CameraView {
            eye: eye + target,
            target,
            up,
        }
    }
}
