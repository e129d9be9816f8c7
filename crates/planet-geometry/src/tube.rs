//! Ring geometry around the flight path, kept for a sliding window of path
//! segments ahead of the ship.

use std::collections::HashMap;
use std::mem;

use glam::Vec3;

use crate::mesh::{DynamicMesh, FlushStats, MeshSink, VertexLayout};
use crate::path::{Path, PathSegment};

/// Ring vertices around the origin in the XY plane.
#[must_use]
pub fn ring_template(sector_angles: &[f32], radius: f32) -> Vec<Vec3> {
    sector_angles
        .iter()
        .map(|a| Vec3::new(radius * a.cos(), radius * a.sin(), 0.0))
        .collect()
}

/// Line-list rings for one path segment, one ring per step.
#[derive(Debug, Clone)]
pub struct TubeSegment {
    path_segment: usize,
    mesh: DynamicMesh,
}

impl TubeSegment {
    /// Orient the ring template by every step of `segment` and connect
    /// consecutive ring vertices, closing each ring.
    ///
    /// # Panics
    ///
    /// Panics if the rings need more vertices than 16-bit indices reach.
    #[must_use]
    pub fn build(path_segment: usize, segment: &PathSegment, template: &[Vec3]) -> Self {
        let sectors = template.len();
        let vertex_count = sectors * segment.steps().len();
        assert!(
            vertex_count <= usize::from(u16::MAX) + 1,
            "tube segment exceeds 16-bit indices: segment={path_segment} vertices={vertex_count}"
        );

        let mut vertices = Vec::with_capacity(vertex_count * 3);
        for step in segment.steps() {
            for corner in template {
                let p = step.rot() * *corner + step.start();
                vertices.extend_from_slice(&p.to_array());
            }
        }

        let mut indices = Vec::with_capacity(vertex_count * 2);
        for ring in (0..vertex_count).step_by(sectors.max(1)) {
            for j in 0..sectors.saturating_sub(1) {
                indices.push((ring + j) as u16);
                indices.push((ring + j + 1) as u16);
            }
            indices.push((ring + sectors - 1) as u16);
            indices.push(ring as u16);
        }

        Self {
            path_segment,
            mesh: DynamicMesh::from_arrays(VertexLayout::Position, vertices, indices),
        }
    }

    /// Index of the path segment this tube follows.
    #[must_use]
    pub const fn path_segment(&self) -> usize {
        self.path_segment
    }

    #[must_use]
    pub const fn mesh(&self) -> &DynamicMesh {
        &self.mesh
    }

    pub fn flush(&mut self, sink: &mut impl MeshSink) -> Option<FlushStats> {
        self.mesh.flush(sink, &[])
    }
}

/// Path segments that entered and left the window during an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TubeUpdate {
    pub entered: Vec<usize>,
    pub left: Vec<usize>,
}

/// Tube segments covering `length` of path ahead of an offset.
#[derive(Debug, Clone)]
pub struct TubeWindow {
    active: HashMap<usize, TubeSegment>,
    previous: HashMap<usize, TubeSegment>,
    template: Vec<Vec3>,
    length: f32,
}

impl TubeWindow {
    #[must_use]
    pub fn new(length: f32, radius: f32, sector_angles: &[f32]) -> Self {
        Self {
            active: HashMap::new(),
            previous: HashMap::new(),
            template: ring_template(sector_angles, radius),
            length,
        }
    }

    /// Move the window to `offset`. Segments still in range are kept,
    /// new ones built, the rest dropped.
    ///
    /// Returns `None` and keeps the current window when `offset` is not on
    /// the path.
    pub fn update(&mut self, path: &Path, offset: f32) -> Option<TubeUpdate> {
        let wanted = path.get_segments(offset, self.length)?;

        mem::swap(&mut self.active, &mut self.previous);

        let mut update = TubeUpdate::default();
        for index in wanted {
            let segment = self.previous.remove(&index).unwrap_or_else(|| {
                update.entered.push(index);
                TubeSegment::build(index, &path.segments()[index], &self.template)
            });
            self.active.insert(index, segment);
        }

        update.left = self.previous.drain().map(|(index, _)| index).collect();
        update.left.sort_unstable();

        if !update.entered.is_empty() || !update.left.is_empty() {
            tracing::debug!(
                entered = ?update.entered,
                left = ?update.left,
                active = self.active.len(),
                "Tube window moved"
            );
        }
        Some(update)
    }

    /// Active tube segments, unordered.
    pub fn segments(&self) -> impl Iterator<Item = &TubeSegment> {
        self.active.values()
    }

    #[must_use]
    pub fn segment(&self, path_segment: usize) -> Option<&TubeSegment> {
        self.active.get(&path_segment)
    }

    pub fn segment_mut(&mut self, path_segment: usize) -> Option<&mut TubeSegment> {
        self.active.get_mut(&path_segment)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Drop every tube segment.
    pub fn clear(&mut self) {
        self.active.clear();
        self.previous.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_4;

    use super::*;
    use crate::path::Span;

    fn sectors() -> Vec<f32> {
        (0..8).map(|i| i as f32 * FRAC_PI_4).collect()
    }

    fn looped_path() -> Path {
        let mut path = Path::new();
        path.add_vertex_deg(0.0, 15.0, 1.2);
        path.add_vertex_deg(45.0, 15.0, 1.2);
        path.add_vertex_deg(90.0, 15.0, 1.2);
        for bearing in [30.0_f32, 40.0, 25.0, 35.0] {
            path.grow(bearing.to_radians(), 45.0_f32.to_radians(), 1.2);
        }
        path.make_loop();
        path
    }

    #[test]
    fn rings_surround_the_path() {
        let path = looped_path();
        let segment = &path.segments()[1];
        let template = ring_template(&sectors(), 0.08);
        let tube = TubeSegment::build(1, segment, &template);

        let mesh = tube.mesh();
        assert_eq!(mesh.vertex_count(), 8 * segment.steps().len());
        assert_eq!(mesh.indices().len(), 2 * mesh.vertex_count());

        for (s, step) in segment.steps().iter().enumerate() {
            for j in 0..8 {
                let p = mesh.position(s * 8 + j);
                let offset = p - step.start();
                assert!((offset.length() - 0.08).abs() < 1e-4);
                // Rings are perpendicular to the direction of travel.
                assert!(offset.dot(step.dir()).abs() < 1e-4);
            }
        }

        // Every ring closes on itself.
        assert_eq!(&mesh.indices()[14..16], &[7, 0]);
        assert_eq!(&mesh.indices()[16..18], &[8, 9]);
    }

    #[test]
    fn window_reports_entering_and_leaving_segments() {
        let path = looped_path();
        let len1 = path.segments()[1].length();
        let mut window = TubeWindow::new(len1 * 0.5, 0.08, &sectors());

        let first = window.update(&path, 0.0).unwrap();
        assert_eq!(first.entered, vec![0, 1]);
        assert!(first.left.is_empty());
        assert_eq!(window.len(), 2);

        // Same position: nothing changes.
        let same = window.update(&path, 0.0).unwrap();
        assert_eq!(same, TubeUpdate::default());

        let second = window.update(&path, path.segments()[1].offset()).unwrap();
        assert_eq!(second.left, vec![0]);
        assert!(window.segment(1).is_some());
        assert!(window.segment(0).is_none());
        assert!(second.entered.iter().all(|&i| i == 2));
    }

    #[test]
    fn window_wraps_on_looped_path() {
        let path = looped_path();
        let last = path.segment_count() - 1;
        let mut window = TubeWindow::new(path.segments()[0].length() * 0.5, 0.08, &sectors());
        let update = window.update(&path, path.segments()[last].offset()).unwrap();
        assert_eq!(update.entered, vec![last, 0]);
    }

    #[test]
    fn off_path_offset_keeps_window() {
        let path = looped_path();
        let mut window = TubeWindow::new(0.1, 0.08, &sectors());
        window.update(&path, 0.0).unwrap();
        let before = window.len();
        assert!(window.update(&path, -1.0).is_none());
        assert_eq!(window.len(), before);
        assert!(window.segment(0).is_some());
    }
}
