//! Flight path built from Catmull-Rom segments over geographic control
//! points, with arc-length queries for position and orientation.

mod search;
mod segment;
mod step;

use std::f32::consts::PI;
use std::ops::{BitOr, BitOrAssign};

use glam::{Quat, Vec3};

pub use search::{Span, search};
pub use segment::PathSegment;
pub use step::PathStep;

use crate::angle::Ypr;
use crate::geo::{self, GeoPoint};

/// Default sampling interval along a segment, radians of arc.
pub const STEP_SIZE: f32 = 5.0 * PI / 180.0;

/// Length of the debug normal lines.
pub const NORMAL_SIZE: f32 = 0.2;

const ARRAY_GROWTH_FACTOR: f32 = 1.6;
const ARRAY_SIZE: usize = 64;

/// Which parts of a [`DirectionEx`] to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectionFlags(u8);

impl DirectionFlags {
    pub const NONE: Self = Self(0);
    pub const VECT: Self = Self(1 << 0);
    pub const YPR: Self = Self(1 << 1);
    pub const POS: Self = Self(1 << 2);
    pub const ROT: Self = Self(1 << 3);
    pub const ALL: Self = Self(Self::VECT.0 | Self::YPR.0 | Self::POS.0 | Self::ROT.0);

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for DirectionFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DirectionFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Pose on the path at some arc length.
///
/// `ypr` is always filled; the other fields only when requested and are
/// left at their defaults otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionEx {
    pub pos: Vec3,
    pub dir: Vec3,
    pub ypr: Ypr,
    pub rot: Quat,
}

impl Default for DirectionEx {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            dir: Vec3::ZERO,
            ypr: Ypr::default(),
            rot: Quat::IDENTITY,
        }
    }
}

/// Segment and step indices containing an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathLocation {
    pub segment: usize,
    pub step: usize,
}

/// A path growing from geographic vertices into spline segments.
#[derive(Debug, Clone)]
pub struct Path {
    vertices: Vec<GeoPoint>,
    segments: Vec<PathSegment>,
    is_loop: bool,
    interpolate_ypr: bool,
    step_size: f32,
    normal_size: f32,
}

impl Default for Path {
    fn default() -> Self {
        Self::new()
    }
}

impl Path {
    #[must_use]
    pub fn new() -> Self {
        Self::with_step_size(STEP_SIZE)
    }

    /// A path sampled every `step_size` radians of arc.
    #[must_use]
    pub fn with_step_size(step_size: f32) -> Self {
        assert!(step_size > 0.0, "path step size must be positive: {step_size}");
        Self {
            vertices: Vec::new(),
            segments: Vec::with_capacity(ARRAY_SIZE),
            is_loop: false,
            interpolate_ypr: false,
            step_size,
            normal_size: NORMAL_SIZE,
        }
    }

    /// Blend orientation between steps in [`Path::direction_ex`].
    pub fn set_interpolate_ypr(&mut self, enabled: bool) {
        self.interpolate_ypr = enabled;
    }

    #[must_use]
    pub const fn interpolate_ypr(&self) -> bool {
        self.interpolate_ypr
    }

    /// Append a vertex in degrees.
    pub fn add_vertex_deg(&mut self, lon: f32, lat: f32, height: f32) {
        self.add_vertex(lon.to_radians(), lat.to_radians(), height);
    }

    /// Append a vertex. From the third vertex on, each vertex completes a
    /// segment ending at the previous one.
    pub fn add_vertex(&mut self, lon: f32, lat: f32, height: f32) {
        self.vertices.push(GeoPoint::new(lon, lat, height));

        let n = self.vertices.len();
        if n < 3 {
            return;
        }

        let post_end = self.vertices[n - 1];
        let end = self.vertices[n - 2];
        let start = self.vertices[n - 3];
        let pre_start = if n > 3 {
            self.vertices[n - 4]
        } else {
            end.mirrored_around(start)
        };
        self.create_segment([pre_start, start, end, post_end]);
    }

    /// Append a vertex `length` away from the last one, turning `bearing`
    /// radians off the heading of the last two vertices.
    ///
    /// # Panics
    ///
    /// Panics with fewer than two vertices.
    pub fn grow(&mut self, bearing: f32, length: f32, height: f32) {
        let n = self.vertices.len();
        assert!(
            n > 1,
            "failed to grow path, not enough initial vertices: num={n}"
        );

        let end = self.vertices[n - 1];
        let pre_end = self.vertices[n - 2];
        let heading = geo::bearing(pre_end, end);
        let dest = geo::destination(end, length, heading + bearing, height);
        self.add_vertex(dest.lon, dest.lat, height);
    }

    /// Close the path with two segments joining the last vertex to the first.
    ///
    /// # Panics
    ///
    /// Panics with fewer than three vertices or if already looped.
    pub fn make_loop(&mut self) {
        let n = self.vertices.len();
        assert!(
            n >= 3,
            "failed to create loop path, not enough vertices: num={n}"
        );

        let v = &self.vertices;
        let (last, pre_last, pre_pre_last) = (v[n - 1], v[n - 2], v[n - 3]);
        let (start, post_start) = (v[0], v[1]);

        self.create_segment([pre_pre_last, pre_last, last, start]);
        self.create_segment([pre_last, last, start, post_start]);
        self.is_loop = true;
    }

    fn create_segment(&mut self, controls: [GeoPoint; 4]) {
        assert!(!self.is_loop, "failed to create segment for looped path");

        let segment = PathSegment::build(controls, self.length(), self.step_size, self.normal_size);

        if self.segments.len() == self.segments.capacity() {
            let old = self.segments.capacity();
            let new = ((old.max(1) as f32) * ARRAY_GROWTH_FACTOR).ceil() as usize;
            self.segments.reserve_exact(new - self.segments.len());
            tracing::debug!(old, new, "Resizing path segment array");
        }
        self.segments.push(segment);
    }

    /// Drop every vertex and segment.
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.segments = Vec::with_capacity(ARRAY_SIZE);
        self.is_loop = false;
    }

    /// Total arc length.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.segments.last().map_or(0.0, Span::end)
    }

    #[must_use]
    pub const fn is_loop(&self) -> bool {
        self.is_loop
    }

    #[must_use]
    pub fn vertices(&self) -> &[GeoPoint] {
        &self.vertices
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Wrap `offset` into `[0, length)` on looped paths; other paths return
    /// it unchanged.
    #[must_use]
    pub fn wrap_offset(&self, offset: f32) -> f32 {
        let length = self.length();
        if self.is_loop && length > 0.0 {
            offset.rem_euclid(length)
        } else {
            offset
        }
    }

    /// Segment and step containing `offset`.
    #[must_use]
    pub fn locate(&self, offset: f32) -> Option<PathLocation> {
        let segment = search(&self.segments, offset)?;
        let step = search(self.segments[segment].steps(), offset)?;
        Some(PathLocation { segment, step })
    }

    /// Step following `at`, crossing into the next segment (and from the
    /// last segment back to the first on looped paths).
    fn next_step(&self, at: PathLocation) -> Option<&PathStep> {
        let steps = self.segments[at.segment].steps();
        if at.step + 1 < steps.len() {
            return Some(&steps[at.step + 1]);
        }
        if at.segment + 1 < self.segments.len() {
            return self.segments[at.segment + 1].steps().first();
        }
        if self.is_loop {
            return self.segments[0].steps().first();
        }
        None
    }

    /// Pose at arc length `offset`.
    ///
    /// Returns `None`, after logging, when no step covers `offset`.
    #[must_use]
    pub fn direction_ex(&self, offset: f32, flags: DirectionFlags) -> Option<DirectionEx> {
        let at = self.locate(offset)?;
        let cur = &self.segments[at.segment].steps()[at.step];

        let local = offset - cur.offset;
        if !(0.0..cur.len).contains(&local) {
            tracing::error!(
                offset = local,
                len = cur.len,
                "Failed to find path offset position, wrong offset"
            );
            return None;
        }

        let mut dest = DirectionEx {
            ypr: cur.ypr,
            ..DirectionEx::default()
        };

        if self.interpolate_ypr {
            if let Some(next) = self.next_step(at) {
                dest.ypr = cur.ypr.lerp_shortest(next.ypr, local / cur.len);
            }
        }

        if flags.contains(DirectionFlags::POS) {
            dest.pos = cur.position_at(local);
        }
        if flags.contains(DirectionFlags::VECT) {
            dest.dir = cur.dir;
        }
        if flags.contains(DirectionFlags::ROT) {
            dest.rot = dest.ypr.to_quat();
        }
        if flags.contains(DirectionFlags::ALL) {
            tracing::trace!(
                offset,
                length = self.length(),
                segment = at.segment,
                segments = self.segments.len(),
                step = at.step,
                steps = self.segments[at.segment].steps().len(),
                "Path progress"
            );
        }
        Some(dest)
    }

    /// Indices of the segments covering `length` beyond the end of the
    /// segment containing `offset`, starting with that segment.
    ///
    /// Looped paths wrap around, listing each segment at most once.
    #[must_use]
    pub fn get_segments(&self, offset: f32, length: f32) -> Option<Vec<usize>> {
        let mut idx = search(&self.segments, offset)?;
        let mut remaining = length + self.segments[idx].length();

        let mut out = Vec::new();
        while remaining > 0.0 && out.len() < self.segments.len() {
            out.push(idx);
            remaining -= self.segments[idx].length();

            idx += 1;
            if idx == self.segments.len() {
                if !self.is_loop {
                    break;
                }
                idx = 0;
            }
        }
        Some(out)
    }

    /// Log every segment at debug level and every step at trace level.
    pub fn log(&self) {
        tracing::debug!(
            segments = self.segments.len(),
            length = self.length(),
            is_loop = self.is_loop,
            "Path"
        );
        for (i, segment) in self.segments.iter().enumerate() {
            segment.log(i);
        }
    }
}
