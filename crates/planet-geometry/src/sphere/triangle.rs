//! Sphere triangles: three vertex references plus the instance each one uses.

use glam::Vec3;

use super::vertex::{InstanceId, SphereVertex, VertexId};
use crate::surface::Surface;

/// A triangle owned by one sphere segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SphereTriangle {
    vertices: [VertexId; 3],
    instances: [InstanceId; 3],
    surface: Surface,
}

impl SphereTriangle {
    /// Create a triangle in `segment`, allocating one instance per vertex.
    ///
    /// Every vertex must already be linked with `segment`.
    pub(crate) fn new(
        segment: usize,
        ids: [VertexId; 3],
        surface: Surface,
        vertices: &mut [SphereVertex],
    ) -> Self {
        let instances = ids.map(|id| vertices[id as usize].alloc(segment));
        Self {
            vertices: ids,
            instances,
            surface,
        }
    }

    #[must_use]
    pub const fn vertices(&self) -> [VertexId; 3] {
        self.vertices
    }

    #[must_use]
    pub const fn instances(&self) -> [InstanceId; 3] {
        self.instances
    }

    #[must_use]
    pub const fn surface(&self) -> Surface {
        self.surface
    }

    pub(crate) fn set_surface(&mut self, surface: Surface) {
        self.surface = surface;
    }

    /// Replace corner `corner` with vertex `id`, swapping instances.
    pub(crate) fn set_vertex(
        &mut self,
        corner: usize,
        id: VertexId,
        segment: usize,
        vertices: &mut [SphereVertex],
    ) {
        let old = self.vertices[corner] as usize;
        vertices[old].free(segment, self.instances[corner]);
        self.vertices[corner] = id;
        self.instances[corner] = vertices[id as usize].alloc(segment);
    }

    /// Current corner positions.
    #[must_use]
    pub fn positions(&self, vertices: &[SphereVertex]) -> [Vec3; 3] {
        self.vertices.map(|id| vertices[id as usize].pos())
    }

    /// Flat face normal from the current positions.
    #[must_use]
    pub fn normal(&self, vertices: &[SphereVertex]) -> Vec3 {
        let [p0, p1, p2] = self.positions(vertices);
        (p1 - p0).cross(p2 - p0).normalize()
    }

    /// Mesh indices of the three corners in `segment`.
    #[must_use]
    pub fn gpu_indices(&self, segment: usize, vertices: &[SphereVertex]) -> [u16; 3] {
        [0, 1, 2].map(|i| vertices[self.vertices[i] as usize].gpu_index(segment, self.instances[i]))
    }

    /// Whether the triangle has `{a, b}` as one of its edges.
    #[must_use]
    pub fn has_edge(&self, a: VertexId, b: VertexId) -> bool {
        (0..3).any(|i| {
            let (p, q) = (self.vertices[i], self.vertices[(i + 1) % 3]);
            (p == a && q == b) || (p == b && q == a)
        })
    }
}
