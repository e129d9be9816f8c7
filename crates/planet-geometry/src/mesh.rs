//! Engine-neutral mesh buffers and the seams used to hand them to a renderer.
//!
//! Geometry producers own a [`DynamicMesh`]: a flat interleaved vertex array,
//! an optional 16-bit index array and a pair of dirty flags. Rendering code
//! implements [`MeshSink`] and receives the arrays only when they changed.

use glam::Vec3;

/// Backface threshold used when culling sphere segments.
pub const SPHERE_BACKFACE_THRESHOLD: f32 = -0.3;

/// Attribute layout of an interleaved vertex array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexLayout {
    /// `x y z`
    Position,
    /// `x y z nx ny nz`
    PositionNormal,
}

impl VertexLayout {
    /// Number of floats making up one vertex.
    #[must_use]
    pub const fn floats_per_vertex(self) -> usize {
        match self {
            Self::Position => 3,
            Self::PositionNormal => 6,
        }
    }
}

/// A contiguous sub-range of an index array, in indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexRange {
    pub offset: usize,
    pub count: usize,
}

impl IndexRange {
    #[must_use]
    pub const fn end(self) -> usize {
        self.offset + self.count
    }
}

/// Receiver of GPU-bound mesh data.
pub trait MeshSink {
    /// Replace the vertex data. `vertices.len()` is a multiple of
    /// `layout.floats_per_vertex()`.
    fn write_vertices(&mut self, layout: VertexLayout, vertices: &[f32]);

    /// Replace the index data. `ranges` partitions `indices` into the parts
    /// drawn with separate materials; a single range covers everything.
    fn write_indices(&mut self, indices: &[u16], ranges: &[IndexRange]);
}

/// Counts reported by [`DynamicMesh::flush`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub vertices: usize,
    pub indices: usize,
}

/// Vertex and index arrays with dirty tracking.
#[derive(Debug, Clone)]
pub struct DynamicMesh {
    layout: VertexLayout,
    vertices: Vec<f32>,
    indices: Vec<u16>,
    dirty_vertices: bool,
    dirty_indices: bool,
}

impl DynamicMesh {
    /// An empty mesh. Both arrays start dirty so the first flush uploads them.
    #[must_use]
    pub fn new(layout: VertexLayout) -> Self {
        Self {
            layout,
            vertices: Vec::new(),
            indices: Vec::new(),
            dirty_vertices: true,
            dirty_indices: true,
        }
    }

    /// A mesh that takes ownership of already-filled arrays.
    #[must_use]
    pub fn from_arrays(layout: VertexLayout, vertices: Vec<f32>, indices: Vec<u16>) -> Self {
        assert_eq!(
            vertices.len() % layout.floats_per_vertex(),
            0,
            "vertex array size does not match layout"
        );
        Self {
            layout,
            vertices,
            indices,
            dirty_vertices: true,
            dirty_indices: true,
        }
    }

    /// Allocate zeroed arrays of the given sizes.
    ///
    /// # Panics
    ///
    /// Panics if the arrays were already allocated.
    pub fn allocate(&mut self, vertex_count: usize, index_count: usize) {
        assert!(
            self.vertices.is_empty() && self.indices.is_empty(),
            "mesh arrays already allocated"
        );
        self.vertices = vec![0.0; vertex_count * self.layout.floats_per_vertex()];
        self.indices = vec![0; index_count];
        self.dirty_vertices = true;
        self.dirty_indices = true;
    }

    #[must_use]
    pub const fn layout(&self) -> VertexLayout {
        self.layout
    }

    #[must_use]
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    #[must_use]
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Mutable vertex data. Marks the vertex array dirty.
    pub fn vertices_mut(&mut self) -> &mut [f32] {
        self.dirty_vertices = true;
        &mut self.vertices
    }

    /// Mutable index data. Marks the index array dirty.
    pub fn indices_mut(&mut self) -> &mut [u16] {
        self.dirty_indices = true;
        &mut self.indices
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.layout.floats_per_vertex()
    }

    /// Position of vertex `index`.
    #[must_use]
    pub fn position(&self, index: usize) -> Vec3 {
        let offset = index * self.layout.floats_per_vertex();
        Vec3::from_slice(&self.vertices[offset..offset + 3])
    }

    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty_vertices || self.dirty_indices
    }

    /// Upload dirty arrays to `sink` and clear the flags.
    ///
    /// Returns `None` when nothing was dirty.
    pub fn flush(&mut self, sink: &mut impl MeshSink, ranges: &[IndexRange]) -> Option<FlushStats> {
        if !self.is_dirty() {
            return None;
        }

        let mut stats = FlushStats::default();
        if self.dirty_vertices {
            sink.write_vertices(self.layout, &self.vertices);
            stats.vertices = self.vertex_count();
        }
        if self.dirty_indices && !self.indices.is_empty() {
            if ranges.is_empty() {
                let all = IndexRange {
                    offset: 0,
                    count: self.indices.len(),
                };
                sink.write_indices(&self.indices, &[all]);
            } else {
                sink.write_indices(&self.indices, ranges);
            }
            stats.indices = self.indices.len();
        }

        self.dirty_vertices = false;
        self.dirty_indices = false;
        Some(stats)
    }
}

/// Whether a surface at `point` with outward `normal` faces `camera`.
///
/// A threshold below zero keeps surfaces that are slightly turned away,
/// which hides popping at the horizon.
#[must_use]
pub fn faces_camera(normal: Vec3, point: Vec3, camera: Vec3, threshold: f32) -> bool {
    normal.dot(camera - point) >= threshold
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Sink that keeps the last uploaded arrays.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSink {
        pub vertices: Vec<f32>,
        pub indices: Vec<u16>,
        pub ranges: Vec<IndexRange>,
        pub vertex_writes: usize,
        pub index_writes: usize,
    }

    impl MeshSink for RecordingSink {
        fn write_vertices(&mut self, _layout: VertexLayout, vertices: &[f32]) {
            self.vertices = vertices.to_vec();
            self.vertex_writes += 1;
        }

        fn write_indices(&mut self, indices: &[u16], ranges: &[IndexRange]) {
            self.indices = indices.to_vec();
            self.ranges = ranges.to_vec();
            self.index_writes += 1;
        }
    }

    #[test]
    fn flush_only_when_dirty() {
        let mut mesh = DynamicMesh::new(VertexLayout::Position);
        mesh.allocate(2, 2);
        mesh.vertices_mut()[3] = 1.0;
        mesh.indices_mut().copy_from_slice(&[0, 1]);

        let mut sink = RecordingSink::default();
        let stats = mesh.flush(&mut sink, &[]).expect("first flush uploads");
        assert_eq!(stats, FlushStats { vertices: 2, indices: 2 });
        assert_eq!(sink.ranges, vec![IndexRange { offset: 0, count: 2 }]);
        assert!(mesh.flush(&mut sink, &[]).is_none());

        mesh.vertices_mut()[0] = 2.0;
        let stats = mesh.flush(&mut sink, &[]).expect("vertex change uploads");
        assert_eq!(stats.indices, 0);
        assert_eq!(sink.vertex_writes, 2);
        assert_eq!(sink.index_writes, 1);
        assert_eq!(mesh.position(0), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    #[should_panic(expected = "already allocated")]
    fn allocate_twice_panics() {
        let mut mesh = DynamicMesh::new(VertexLayout::PositionNormal);
        mesh.allocate(1, 3);
        mesh.allocate(1, 3);
    }

    #[test]
    fn backface_threshold() {
        let normal = Vec3::Y;
        let point = Vec3::Y;
        assert!(faces_camera(normal, point, Vec3::Y * 3.0, SPHERE_BACKFACE_THRESHOLD));
        // Slightly below the horizon still passes with a negative threshold.
        assert!(faces_camera(normal, point, Vec3::new(5.0, 0.9, 0.0), SPHERE_BACKFACE_THRESHOLD));
        assert!(!faces_camera(normal, point, Vec3::NEG_Y * 3.0, SPHERE_BACKFACE_THRESHOLD));
    }
}
