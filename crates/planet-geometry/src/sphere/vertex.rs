//! Shared sphere vertices and their per-segment instance pools.
//!
//! A vertex has one position but needs a distinct normal for every triangle
//! that uses it, so each segment the vertex belongs to reserves a block of
//! [`INSTANCE_COUNT`] attribute slots for it. Triangles allocate an instance
//! from that block and release it when they stop using the vertex.

use glam::Vec3;

use crate::angle;
use crate::geo::{self, GeoPoint};

/// Instances reserved per vertex per segment. Six is the largest valence
/// a subdivided icosphere vertex reaches inside one segment.
pub const INSTANCE_COUNT: usize = 6;

/// Floats per instance: position xyz followed by normal xyz.
pub const ATTRIB_COUNT: usize = 6;

/// Floats reserved per vertex in a segment's vertex array.
pub const VERTEX_STRIDE: usize = INSTANCE_COUNT * ATTRIB_COUNT;

const ALL_FREE: u8 = (1 << INSTANCE_COUNT) - 1;

/// Identifier of a sphere vertex (its index in the sphere's vertex list).
pub type VertexId = u32;

/// Instance index within a vertex's block, `0..INSTANCE_COUNT`.
pub type InstanceId = u8;

#[derive(Debug, Clone)]
struct SegmentEntry {
    segment: usize,
    /// Block index in the segment's vertex array.
    slot: u32,
    /// Bit `i` set means instance `i` is free.
    free: u8,
}

impl SegmentEntry {
    fn attribute_offset(&self) -> usize {
        self.slot as usize * VERTEX_STRIDE
    }

    fn allocated(&self) -> usize {
        INSTANCE_COUNT - self.free.count_ones() as usize
    }
}

/// A vertex of the subdivided sphere.
#[derive(Debug, Clone)]
pub struct SphereVertex {
    id: VertexId,
    norm: Vec3,
    pos: Vec3,
    height: f32,
    geo: GeoPoint,
    segments: Vec<SegmentEntry>,
}

impl SphereVertex {
    /// Create a vertex on the unit sphere in the direction of `v`.
    pub(crate) fn new(id: VertexId, v: Vec3) -> Self {
        let norm = v.normalize();
        let mut geo = geo::cartesian_to_geo(norm);
        geo.lon = angle::normalize(geo.lon);
        Self {
            id,
            norm,
            pos: norm,
            height: 1.0,
            geo,
            segments: Vec::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> VertexId {
        self.id
    }

    /// Unit-sphere direction, fixed at creation.
    #[must_use]
    pub const fn norm(&self) -> Vec3 {
        self.norm
    }

    /// Displaced position, `norm * height`.
    #[must_use]
    pub const fn pos(&self) -> Vec3 {
        self.pos
    }

    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Geographic coordinates of `norm`, longitude in `[0, 2π)`.
    #[must_use]
    pub const fn geo(&self) -> GeoPoint {
        self.geo
    }

    /// Move the vertex to distance `height` from the center.
    pub fn scale(&mut self, height: f32) {
        self.height = height;
        self.pos = self.norm * height;
    }

    /// Put the vertex back on the unit sphere.
    pub fn reset(&mut self) {
        self.scale(1.0);
    }

    /// Register the vertex with `segment`, taking the next block slot from
    /// `next_slot`. Linking an already linked segment does nothing.
    ///
    /// Returns whether a new link was created.
    pub fn link_segment(&mut self, segment: usize, next_slot: &mut u32) -> bool {
        if self.segments.iter().any(|e| e.segment == segment) {
            return false;
        }

        self.segments.push(SegmentEntry {
            segment,
            slot: *next_slot,
            free: ALL_FREE,
        });
        *next_slot += 1;
        true
    }

    fn entry(&self, segment: usize) -> &SegmentEntry {
        self.segments
            .iter()
            .find(|e| e.segment == segment)
            .unwrap_or_else(|| {
                panic!(
                    "unknown segment for vertex: vertex={} segment={segment}",
                    self.id
                )
            })
    }

    fn entry_mut(&mut self, segment: usize) -> &mut SegmentEntry {
        let id = self.id;
        self.segments
            .iter_mut()
            .find(|e| e.segment == segment)
            .unwrap_or_else(|| panic!("unknown segment for vertex: vertex={id} segment={segment}"))
    }

    /// Take the lowest free instance in `segment`.
    ///
    /// # Panics
    ///
    /// Panics if the vertex is not linked with `segment` or every instance
    /// is in use.
    pub fn alloc(&mut self, segment: usize) -> InstanceId {
        let id = self.id;
        let entry = self.entry_mut(segment);
        assert!(
            entry.free != 0,
            "failed to allocate vertex instance, vertex limit reached: vertex={id} segment={segment}"
        );
        let instance = entry.free.trailing_zeros() as InstanceId;
        entry.free &= !(1 << instance);
        instance
    }

    /// Return `instance` to the free pool of `segment`.
    ///
    /// # Panics
    ///
    /// Panics on an unknown segment, an out-of-range instance or a double free.
    pub fn free(&mut self, segment: usize, instance: InstanceId) {
        let id = self.id;
        assert!(
            usize::from(instance) < INSTANCE_COUNT,
            "failed to free vertex instance, wrong instance: vertex={id} inst={instance}"
        );
        let entry = self.entry_mut(segment);
        let bit = 1 << instance;
        assert!(
            entry.free & bit == 0,
            "failed to free vertex instance, instance already free: vertex={id} segment={segment} inst={instance}"
        );
        entry.free |= bit;
    }

    /// Block slot of this vertex in `segment`'s vertex array.
    #[must_use]
    pub fn slot(&self, segment: usize) -> u32 {
        self.entry(segment).slot
    }

    /// Float offset of `instance` in `segment`'s vertex array.
    #[must_use]
    pub fn instance_offset(&self, segment: usize, instance: InstanceId) -> usize {
        self.entry(segment).attribute_offset() + usize::from(instance) * ATTRIB_COUNT
    }

    /// Index of `instance` as a vertex in `segment`'s mesh.
    ///
    /// # Panics
    ///
    /// Panics if the index does not fit a 16-bit index buffer.
    #[must_use]
    pub fn gpu_index(&self, segment: usize, instance: InstanceId) -> u16 {
        let index = self.slot(segment) as usize * INSTANCE_COUNT + usize::from(instance);
        u16::try_from(index).unwrap_or_else(|_| {
            panic!(
                "vertex index exceeds 16-bit range: vertex={} segment={segment} index={index}",
                self.id
            )
        })
    }

    /// Segments this vertex is linked with, in link order.
    pub fn linked_segments(&self) -> impl Iterator<Item = usize> + '_ {
        self.segments.iter().map(|e| e.segment)
    }

    /// Float offsets of every block this vertex owns, per linked segment.
    pub(crate) fn blocks(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.segments
            .iter()
            .map(|e| (e.segment, e.attribute_offset()))
    }

    /// Instances currently allocated across all linked segments.
    #[must_use]
    pub fn allocated_instances(&self) -> usize {
        self.segments.iter().map(SegmentEntry::allocated).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linked_vertex() -> (SphereVertex, u32) {
        let mut v = SphereVertex::new(7, Vec3::new(0.0, 2.0, 0.0));
        let mut next_slot = 3;
        assert!(v.link_segment(1, &mut next_slot));
        (v, next_slot)
    }

    #[test]
    fn new_vertex_is_on_unit_sphere() {
        let v = SphereVertex::new(0, Vec3::new(3.0, 0.0, 4.0));
        assert!((v.norm().length() - 1.0).abs() < 1e-6);
        assert_eq!(v.pos(), v.norm());
        assert!((0.0..std::f32::consts::TAU).contains(&v.geo().lon));
    }

    #[test]
    fn link_is_idempotent() {
        let (mut v, mut next_slot) = linked_vertex();
        assert_eq!(next_slot, 4);
        assert!(!v.link_segment(1, &mut next_slot));
        assert_eq!(next_slot, 4);
        assert_eq!(v.slot(1), 3);
        assert_eq!(v.instance_offset(1, 2), 3 * VERTEX_STRIDE + 2 * ATTRIB_COUNT);
    }

    #[test]
    fn alloc_and_free_reuse_lowest_slot() {
        let (mut v, _) = linked_vertex();
        assert_eq!(v.alloc(1), 0);
        assert_eq!(v.alloc(1), 1);
        assert_eq!(v.alloc(1), 2);
        v.free(1, 1);
        assert_eq!(v.allocated_instances(), 2);
        assert_eq!(v.alloc(1), 1);
        assert_eq!(v.gpu_index(1, 2), 3 * 6 + 2);
    }

    #[test]
    #[should_panic(expected = "vertex limit reached")]
    fn seventh_instance_panics() {
        let (mut v, _) = linked_vertex();
        for _ in 0..=INSTANCE_COUNT {
            v.alloc(1);
        }
    }

    #[test]
    #[should_panic(expected = "already free")]
    fn double_free_panics() {
        let (mut v, _) = linked_vertex();
        let inst = v.alloc(1);
        v.free(1, inst);
        v.free(1, inst);
    }

    #[test]
    #[should_panic(expected = "wrong instance")]
    fn out_of_range_free_panics() {
        let (mut v, _) = linked_vertex();
        v.free(1, 6);
    }

    #[test]
    #[should_panic(expected = "unknown segment")]
    fn unknown_segment_panics() {
        let (mut v, _) = linked_vertex();
        v.alloc(2);
    }

    #[test]
    fn scale_moves_position_only() {
        let (mut v, _) = linked_vertex();
        v.scale(1.5);
        assert!((v.pos() - Vec3::Y * 1.5).length() < 1e-6);
        assert_eq!(v.norm(), Vec3::Y);
        v.reset();
        assert_eq!(v.height(), 1.0);
    }
}
