//! Icosphere subdivision with per-segment flat-shaded meshes.
//!
//! The sphere starts as the 20-face icosahedron; every face becomes a
//! permanent [`SphereSegment`]. Each refinement level splits every triangle
//! into four, sharing edge midpoints between neighbouring triangles.
//! [`Sphere::finalize`] then produces GPU-ready arrays where every triangle
//! owns its own vertex instances so it can carry a flat normal.

mod cache;
mod segment;
mod triangle;
mod vertex;

use glam::Vec3;

pub use cache::{MidpointCache, edge_key};
pub use segment::SphereSegment;
pub use triangle::SphereTriangle;
pub use vertex::{
    ATTRIB_COUNT, INSTANCE_COUNT, InstanceId, SphereVertex, VERTEX_STRIDE, VertexId,
};

use crate::mesh::{FlushStats, MeshSink};
use crate::surface::Surface;

const GOLDEN_RATIO: f32 = 1.618_034;

/// Base icosahedron vertices (three orthogonal golden rectangles).
const ICOSPHERE_VERTICES: [[f32; 3]; 12] = [
    [-1.0, GOLDEN_RATIO, 0.0],
    [1.0, GOLDEN_RATIO, 0.0],
    [-1.0, -GOLDEN_RATIO, 0.0],
    [1.0, -GOLDEN_RATIO, 0.0],
    [0.0, -1.0, GOLDEN_RATIO],
    [0.0, 1.0, GOLDEN_RATIO],
    [0.0, -1.0, -GOLDEN_RATIO],
    [0.0, 1.0, -GOLDEN_RATIO],
    [GOLDEN_RATIO, 0.0, -1.0],
    [GOLDEN_RATIO, 0.0, 1.0],
    [-GOLDEN_RATIO, 0.0, -1.0],
    [-GOLDEN_RATIO, 0.0, 1.0],
];

/// Base icosahedron faces, counter-clockwise seen from outside.
const ICOSPHERE_TRIANGLES: [[VertexId; 3]; 20] = [
    // Around vertex 0.
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    // Adjacent.
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    // Around vertex 3.
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    // Adjacent.
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Number of permanent segments.
pub const SEGMENT_COUNT: usize = ICOSPHERE_TRIANGLES.len();

/// Build stage of a [`Sphere`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SphereState {
    Unbuilt,
    Built { level: u32 },
    Finalized { level: u32 },
}

/// The subdivided planet surface.
#[derive(Debug, Clone)]
pub struct Sphere {
    pub(crate) vertices: Vec<SphereVertex>,
    pub(crate) segments: Vec<SphereSegment>,
    state: SphereState,
}

impl Default for Sphere {
    fn default() -> Self {
        Self::new()
    }
}

impl Sphere {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            segments: Vec::new(),
            state: SphereState::Unbuilt,
        }
    }

    /// Build the base icosahedron and refine it `level` times.
    ///
    /// # Panics
    ///
    /// Panics unless the sphere is unbuilt.
    pub fn create(&mut self, level: u32) {
        self.create_icosphere();
        self.refine(level);
    }

    fn create_icosphere(&mut self) {
        assert_eq!(
            self.state,
            SphereState::Unbuilt,
            "failed to create sphere, already built"
        );
        tracing::info!("Creating base sphere");

        self.vertices = ICOSPHERE_VERTICES
            .iter()
            .enumerate()
            .map(|(id, v)| SphereVertex::new(id as VertexId, Vec3::from_array(*v)))
            .collect();

        self.segments = ICOSPHERE_TRIANGLES
            .iter()
            .enumerate()
            .map(|(id, ids)| {
                let mut segment = SphereSegment::new(id);
                for &v in ids {
                    segment.link(v, &mut self.vertices);
                }
                segment.add_triangle(*ids, Surface::Water, &mut self.vertices);
                segment
            })
            .collect();

        self.state = SphereState::Built { level: 0 };
    }

    /// Split every triangle into four, `levels` times.
    ///
    /// # Panics
    ///
    /// Panics unless the sphere is built and not yet finalized.
    pub fn refine(&mut self, levels: u32) {
        let SphereState::Built { level } = self.state else {
            panic!("failed to refine sphere, wrong state: {:?}", self.state);
        };

        tracing::info!(levels, "Refining sphere");
        for i in 0..levels {
            let mut cache = MidpointCache::with_capacity(self.vertices.len() * 3);
            let mut triangles = 0;
            for segment in &mut self.segments {
                triangles += segment.refine(&mut cache, &mut self.vertices);
            }
            tracing::info!(
                level = level + i + 1,
                vertices = self.vertices.len(),
                triangles,
                midpoints = cache.len(),
                "Refined sphere"
            );
        }
        self.state = SphereState::Built {
            level: level + levels,
        };
    }

    /// Allocate the segment meshes and fill positions, normals and indices.
    ///
    /// # Panics
    ///
    /// Panics unless the sphere is built and not yet finalized.
    pub fn finalize(&mut self) {
        let SphereState::Built { level } = self.state else {
            panic!("failed to finalize sphere, wrong state: {:?}", self.state);
        };

        for segment in &mut self.segments {
            segment.allocate_arrays();
        }
        for id in 0..self.vertices.len() {
            self.write_position(id as VertexId);
        }
        for segment in &mut self.segments {
            segment.write_normals(&self.vertices);
            segment.rebuild_surfaces(&self.vertices);
        }

        self.state = SphereState::Finalized { level };
        self.log(false);
    }

    /// Drop all geometry and return to the unbuilt state.
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.segments.clear();
        self.state = SphereState::Unbuilt;
    }

    #[must_use]
    pub const fn state(&self) -> SphereState {
        self.state
    }

    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        matches!(self.state, SphereState::Finalized { .. })
    }

    /// Vertex `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of bounds.
    #[must_use]
    pub fn vertex(&self, id: VertexId) -> &SphereVertex {
        let size = self.vertices.len();
        self.vertices.get(id as usize).unwrap_or_else(|| {
            panic!("failed to get sphere vertex, index out of bounds: idx={id} size={size}")
        })
    }

    #[must_use]
    pub fn vertices(&self) -> &[SphereVertex] {
        &self.vertices
    }

    #[must_use]
    pub fn segments(&self) -> &[SphereSegment] {
        &self.segments
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.segments.iter().map(SphereSegment::triangle_count).sum()
    }

    /// Copy a vertex's position into every instance of every block it owns.
    pub(crate) fn write_position(&mut self, id: VertexId) {
        let vertex = &self.vertices[id as usize];
        let pos = vertex.pos().to_array();
        for (segment, base) in vertex.blocks() {
            let va = self.segments[segment].mesh_mut().vertices_mut();
            for offset in (base..base + VERTEX_STRIDE).step_by(ATTRIB_COUNT) {
                va[offset..offset + 3].copy_from_slice(&pos);
            }
        }
    }

    /// Rewrite every triangle's flat normal from the current positions.
    pub(crate) fn write_normals(&mut self) {
        for segment in &mut self.segments {
            segment.write_normals(&self.vertices);
        }
    }

    /// Indices of segments facing a camera at `camera`.
    pub fn visible_segments(&self, camera: Vec3, threshold: f32) -> impl Iterator<Item = usize> {
        self.segments
            .iter()
            .filter(move |s| s.faces(camera, threshold))
            .map(SphereSegment::id)
    }

    /// Flush dirty segment meshes, `sinks[i]` receiving segment `i`.
    ///
    /// Returns the number of segments uploaded.
    ///
    /// # Panics
    ///
    /// Panics if `sinks` does not have one entry per segment.
    pub fn flush<S: MeshSink>(&mut self, sinks: &mut [S]) -> usize {
        assert_eq!(
            sinks.len(),
            self.segments.len(),
            "failed to flush sphere, sink count mismatch"
        );
        let mut flushed = 0;
        for (segment, sink) in self.segments.iter_mut().zip(sinks) {
            if let Some(FlushStats { vertices, indices }) = segment.flush(sink) {
                tracing::debug!(
                    segment = segment.id(),
                    vertices,
                    indices,
                    "Flushing sphere segment"
                );
                flushed += 1;
            }
        }
        flushed
    }

    /// Log vertex and segment statistics at debug level.
    pub fn log(&self, detailed: bool) {
        tracing::debug!(
            vertices = self.vertices.len(),
            segments = self.segments.len(),
            triangles = self.triangle_count(),
            "Sphere"
        );
        if detailed {
            for v in &self.vertices {
                tracing::trace!(
                    id = v.id(),
                    lon = v.geo().lon.to_degrees(),
                    lat = v.geo().lat.to_degrees(),
                    "  vertex"
                );
            }
        }
        for segment in &self.segments {
            segment.log(&self.vertices, detailed);
        }
    }
}
