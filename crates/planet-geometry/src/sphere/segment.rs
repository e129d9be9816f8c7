//! Sphere segments: one per base icosphere face.

use glam::Vec3;

use super::cache::MidpointCache;
use super::triangle::SphereTriangle;
use super::vertex::{SphereVertex, VertexId, VERTEX_STRIDE};
use crate::mesh::{self, DynamicMesh, FlushStats, IndexRange, MeshSink, VertexLayout};
use crate::surface::Surface;

/// A permanent twentieth of the sphere with its own mesh.
///
/// Triangles are kept in one bucket per [`Surface`]; the index array stores
/// the buckets back to back so each can be drawn with its own material.
#[derive(Debug, Clone)]
pub struct SphereSegment {
    id: usize,
    surfaces: [Vec<SphereTriangle>; Surface::COUNT],
    ranges: [IndexRange; Surface::COUNT],
    vertex_slots: u32,
    center: Vec3,
    normal: Vec3,
    mesh: DynamicMesh,
}

impl SphereSegment {
    pub(crate) fn new(id: usize) -> Self {
        Self {
            id,
            surfaces: Default::default(),
            ranges: [IndexRange::default(); Surface::COUNT],
            vertex_slots: 0,
            center: Vec3::ZERO,
            normal: Vec3::ZERO,
            mesh: DynamicMesh::new(VertexLayout::PositionNormal),
        }
    }

    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Centroid of the first triangle, used for culling.
    #[must_use]
    pub const fn center(&self) -> Vec3 {
        self.center
    }

    /// Normal of the first triangle, used for culling.
    #[must_use]
    pub const fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Vertices linked with this segment.
    #[must_use]
    pub const fn vertex_slots(&self) -> u32 {
        self.vertex_slots
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.surfaces.iter().map(Vec::len).sum()
    }

    /// Triangles in the bucket of `surface`.
    #[must_use]
    pub fn triangles(&self, surface: Surface) -> &[SphereTriangle] {
        &self.surfaces[surface.index()]
    }

    /// All triangles, bucket by bucket.
    pub fn all_triangles(&self) -> impl Iterator<Item = &SphereTriangle> {
        self.surfaces.iter().flatten()
    }

    /// Index sub-range of `surface` after the last rebuild.
    #[must_use]
    pub const fn range(&self, surface: Surface) -> IndexRange {
        self.ranges[surface.index()]
    }

    #[must_use]
    pub const fn mesh(&self) -> &DynamicMesh {
        &self.mesh
    }

    pub(crate) fn mesh_mut(&mut self) -> &mut DynamicMesh {
        &mut self.mesh
    }

    /// Link `id` with this segment.
    pub(crate) fn link(&mut self, id: VertexId, vertices: &mut [SphereVertex]) {
        vertices[id as usize].link_segment(self.id, &mut self.vertex_slots);
    }

    /// Add a triangle over linked vertices to the bucket of `surface`.
    pub(crate) fn add_triangle(
        &mut self,
        ids: [VertexId; 3],
        surface: Surface,
        vertices: &mut [SphereVertex],
    ) {
        let triangle = SphereTriangle::new(self.id, ids, surface, vertices);
        if self.triangle_count() == 0 {
            let [p0, p1, p2] = triangle.positions(vertices);
            self.center = (p0 + p1 + p2) / 3.0;
            self.normal = triangle.normal(vertices);
        }
        self.surfaces[surface.index()].push(triangle);
    }

    /// Split every triangle into four. Returns the new triangle count.
    ///
    /// The triangle `(v0, v1, v2)` becomes `(v0, v01, v20)` and the children
    /// `(v1, v12, v01)`, `(v2, v20, v12)` and `(v01, v12, v20)` join the same
    /// bucket.
    pub(crate) fn refine(
        &mut self,
        cache: &mut MidpointCache,
        vertices: &mut Vec<SphereVertex>,
    ) -> usize {
        for bucket in 0..Surface::COUNT {
            let count = self.surfaces[bucket].len();
            for i in 0..count {
                let triangle = self.surfaces[bucket][i];
                let surface = triangle.surface();
                assert_eq!(
                    surface.index(),
                    bucket,
                    "failed to refine segment, triangle in wrong bucket: segment={} triangle={i}",
                    self.id
                );

                let [v0, v1, v2] = triangle.vertices();
                let v01 = cache.midpoint(v0, v1, vertices);
                let v12 = cache.midpoint(v1, v2, vertices);
                let v20 = cache.midpoint(v2, v0, vertices);
                for id in [v01, v12, v20] {
                    self.link(id, vertices);
                }

                let current = &mut self.surfaces[bucket][i];
                current.set_vertex(1, v01, self.id, vertices);
                current.set_vertex(2, v20, self.id, vertices);

                self.add_triangle([v1, v12, v01], surface, vertices);
                self.add_triangle([v2, v20, v12], surface, vertices);
                self.add_triangle([v01, v12, v20], surface, vertices);
            }
        }
        self.triangle_count()
    }

    /// Size the mesh arrays from the current vertex and triangle counts.
    pub(crate) fn allocate_arrays(&mut self) {
        let floats = self.vertex_slots as usize * VERTEX_STRIDE;
        let vertex_count = floats / VertexLayout::PositionNormal.floats_per_vertex();
        self.mesh.allocate(vertex_count, self.triangle_count() * 3);
    }

    /// Write each triangle's flat normal into the instances it owns.
    pub(crate) fn write_normals(&mut self, vertices: &[SphereVertex]) {
        let va = self.mesh.vertices_mut();
        for triangle in self.surfaces.iter().flatten() {
            let normal = triangle.normal(vertices);
            for (id, instance) in triangle.vertices().into_iter().zip(triangle.instances()) {
                let offset = vertices[id as usize].instance_offset(self.id, instance) + 3;
                va[offset..offset + 3].copy_from_slice(&normal.to_array());
            }
        }
    }

    /// Lay the buckets out back to back in the index array.
    pub fn rebuild_surfaces(&mut self, vertices: &[SphereVertex]) {
        let ia = self.mesh.indices_mut();
        let mut offset = 0;
        for (bucket, range) in self.surfaces.iter().zip(self.ranges.iter_mut()) {
            *range = IndexRange {
                offset,
                count: bucket.len() * 3,
            };
            for triangle in bucket {
                ia[offset..offset + 3].copy_from_slice(&triangle.gpu_indices(self.id, vertices));
                offset += 3;
            }
        }
    }

    /// Move triangles to the bucket chosen by `classify`.
    ///
    /// `classify` returns `None` to leave a triangle where it is. Returns
    /// whether any triangle moved.
    pub(crate) fn update_surfaces(
        &mut self,
        mut classify: impl FnMut(&SphereTriangle) -> Option<Surface>,
    ) -> bool {
        let mut moved = Vec::new();
        for bucket in &mut self.surfaces {
            bucket.retain_mut(|triangle| match classify(triangle) {
                Some(surface) if surface != triangle.surface() => {
                    triangle.set_surface(surface);
                    moved.push(*triangle);
                    false
                }
                _ => true,
            });
        }

        let changed = !moved.is_empty();
        for triangle in moved {
            self.surfaces[triangle.surface().index()].push(triangle);
        }
        changed
    }

    /// Whether the segment faces a camera at `camera`.
    #[must_use]
    pub fn faces(&self, camera: Vec3, threshold: f32) -> bool {
        mesh::faces_camera(self.normal, self.center, camera, threshold)
    }

    /// Upload dirty mesh arrays with one index range per surface.
    pub fn flush(&mut self, sink: &mut impl MeshSink) -> Option<FlushStats> {
        self.mesh.flush(sink, &self.ranges)
    }

    pub(crate) fn log(&self, vertices: &[SphereVertex], detailed: bool) {
        tracing::debug!(
            segment = self.id,
            water = self.surfaces[0].len(),
            sand = self.surfaces[1].len(),
            grass = self.surfaces[2].len(),
            rock = self.surfaces[3].len(),
            snow = self.surfaces[4].len(),
            "Sphere segment"
        );
        if detailed {
            for (i, triangle) in self.all_triangles().enumerate() {
                tracing::trace!(
                    triangle = i,
                    indices = ?triangle.gpu_indices(self.id, vertices),
                    vertices = ?triangle.vertices(),
                    "  triangle"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A hub vertex surrounded by `ring` vertices, all linked with segment 0.
    fn fan(ring: usize) -> (SphereSegment, Vec<SphereVertex>) {
        let mut vertices = vec![SphereVertex::new(0, Vec3::Y)];
        for i in 0..ring {
            let a = i as f32 / ring as f32 * std::f32::consts::TAU;
            vertices.push(SphereVertex::new(
                (i + 1) as VertexId,
                Vec3::new(a.cos(), 4.0, -a.sin()),
            ));
        }
        let mut segment = SphereSegment::new(0);
        for id in 0..vertices.len() {
            segment.link(id as VertexId, &mut vertices);
        }
        (segment, vertices)
    }

    fn add_fan_triangles(segment: &mut SphereSegment, vertices: &mut [SphereVertex], count: usize) {
        let ring = vertices.len() - 1;
        for i in 0..count {
            let a = (i % ring + 1) as VertexId;
            let b = ((i + 1) % ring + 1) as VertexId;
            segment.add_triangle([0, a, b], Surface::Water, vertices);
        }
    }

    #[test]
    fn six_triangles_share_a_vertex() {
        let (mut segment, mut vertices) = fan(6);
        add_fan_triangles(&mut segment, &mut vertices, 6);
        assert_eq!(vertices[0].allocated_instances(), 6);
        assert_eq!(segment.vertex_slots(), 7);
    }

    #[test]
    #[should_panic(expected = "vertex limit reached")]
    fn seventh_triangle_around_vertex_panics() {
        let (mut segment, mut vertices) = fan(7);
        add_fan_triangles(&mut segment, &mut vertices, 7);
    }

    #[test]
    fn first_triangle_defines_culling_frame() {
        let (mut segment, mut vertices) = fan(6);
        add_fan_triangles(&mut segment, &mut vertices, 2);
        assert!(segment.center().y > 0.0);
        assert!(segment.normal().y > 0.9);
        assert!(segment.faces(Vec3::Y * 3.0, mesh::SPHERE_BACKFACE_THRESHOLD));
        assert!(!segment.faces(Vec3::NEG_Y * 3.0, mesh::SPHERE_BACKFACE_THRESHOLD));
    }

    #[test]
    fn buckets_follow_classification() {
        let (mut segment, mut vertices) = fan(6);
        add_fan_triangles(&mut segment, &mut vertices, 6);
        segment.allocate_arrays();
        segment.rebuild_surfaces(&vertices);
        assert_eq!(segment.range(Surface::Water).count, 18);

        // Triangles whose second corner is odd become rock.
        let changed = segment.update_surfaces(|t| (t.vertices()[1] % 2 == 1).then_some(Surface::Rock));
        assert!(changed);
        assert_eq!(segment.triangles(Surface::Rock).len(), 3);
        assert_eq!(segment.triangles(Surface::Water).len(), 3);
        assert!(segment.triangles(Surface::Rock).iter().all(|t| t.surface() == Surface::Rock));

        segment.rebuild_surfaces(&vertices);
        let water = segment.range(Surface::Water);
        let rock = segment.range(Surface::Rock);
        assert_eq!(water, IndexRange { offset: 0, count: 9 });
        assert_eq!(rock, IndexRange { offset: 9, count: 9 });
        assert_eq!(segment.triangle_count(), 6);

        // Same classification again moves nothing.
        assert!(!segment.update_surfaces(|t| Some(t.surface())));
    }
}
