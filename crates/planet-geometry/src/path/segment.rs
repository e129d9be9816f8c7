//! Spline segments of a path.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec3;

use super::search::Span;
use super::step::PathStep;
use crate::angle;
use crate::geo::{self, GeoPoint};
use crate::mesh::{DynamicMesh, VertexLayout};
use crate::spline;

/// Closest a control point may get to a pole.
const POLE_MARGIN: f32 = PI / 180.0;

/// The stretch of path between the two inner points of a control quadruple.
#[derive(Debug, Clone)]
pub struct PathSegment {
    offset: f32,
    end: f32,
    controls: [GeoPoint; 4],
    points: DynamicMesh,
    normal_lines: DynamicMesh,
    steps: Vec<PathStep>,
}

impl PathSegment {
    /// Build the span `controls[1] -> controls[2]` starting at arc length
    /// `offset`, sampled roughly every `step_size` radians of arc.
    ///
    /// `normal_size` is the length of the debug normal lines.
    #[must_use]
    pub fn build(controls: [GeoPoint; 4], offset: f32, step_size: f32, normal_size: f32) -> Self {
        let [_, start, end, _] = controls;
        let distance = geo::distance(start, end);
        let vertex_count = (distance / step_size) as usize + 2;

        tracing::debug!(
            vertex_count,
            start_lon = start.lon.to_degrees(),
            start_lat = start.lat.to_degrees(),
            end_lon = end.lon.to_degrees(),
            end_lat = end.lat.to_degrees(),
            distance,
            "Creating path segment"
        );

        let points = sample_points(controls, vertex_count);

        let mut steps = Vec::with_capacity(vertex_count - 1);
        let mut running = offset;
        for pair in points.windows(2) {
            let step = PathStep::new(running, pair[0], pair[1]);
            running = step.end();
            steps.push(step);
        }

        let mut normal_vertices = Vec::with_capacity(steps.len() * 6);
        for step in &steps {
            normal_vertices.extend_from_slice(&step.start.to_array());
            normal_vertices.extend_from_slice(&(step.start + step.normal * normal_size).to_array());
        }

        let point_vertices = points.iter().flat_map(|p| p.to_array()).collect();

        Self {
            offset,
            end: running,
            controls,
            points: DynamicMesh::from_arrays(VertexLayout::Position, point_vertices, Vec::new()),
            normal_lines: DynamicMesh::from_arrays(
                VertexLayout::Position,
                normal_vertices,
                Vec::new(),
            ),
            steps,
        }
    }

    #[must_use]
    pub const fn length(&self) -> f32 {
        self.end - self.offset
    }

    #[must_use]
    pub const fn controls(&self) -> [GeoPoint; 4] {
        self.controls
    }

    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Sampled points as a line strip.
    #[must_use]
    pub const fn points(&self) -> &DynamicMesh {
        &self.points
    }

    /// Step start to start + normal, two vertices per step, as a line list.
    #[must_use]
    pub const fn normal_lines(&self) -> &DynamicMesh {
        &self.normal_lines
    }

    pub(crate) fn log(&self, index: usize) {
        tracing::debug!(
            index,
            offset = self.offset,
            len = self.length(),
            steps = self.steps.len(),
            "Path segment"
        );
        for step in &self.steps {
            tracing::trace!(
                offset = step.offset,
                len = step.len,
                pos = ?step.start,
                dir = ?step.dir,
                "  step"
            );
        }
    }
}

impl Span for PathSegment {
    fn offset(&self) -> f32 {
        self.offset
    }

    fn end(&self) -> f32 {
        self.end
    }
}

/// Interpolate the control quadruple on the polar disc of the hemisphere the
/// span belongs to and lift the samples back onto the sphere, blending the
/// height linearly from start to end.
fn sample_points(controls: [GeoPoint; 4], count: usize) -> Vec<Vec3> {
    let [_, start, end, _] = controls;
    let target_north = start.lat >= 0.0 || end.lat >= 0.0;

    let projected = controls.map(|c| {
        let lon = angle::normalize(c.lon);
        let lat = angle::clamp_inside(c.lat, -FRAC_PI_2, FRAC_PI_2, POLE_MARGIN);
        geo::geo_to_spheric(lon, lat, target_north)
    });

    let height_diff = end.height - start.height;
    let step = 1.0 / (count - 1) as f32;
    spline::sample_span(projected, count)
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            let (lon, lat) = geo::spheric_to_geo(s, target_north);
            geo::geo_to_cartesian(lon, lat, start.height + height_diff * i as f32 * step)
        })
        .collect()
}
