//! Midpoint deduplication for one refinement level.

use std::collections::HashMap;

use super::vertex::{SphereVertex, VertexId};

/// Key of the unordered edge `{a, b}`.
///
/// # Panics
///
/// Panics if `a == b`.
#[must_use]
pub fn edge_key(a: VertexId, b: VertexId) -> u64 {
    assert_ne!(a, b, "failed to build edge key, degenerate edge: vertex={a}");
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    (u64::from(lo) << 32) | u64::from(hi)
}

/// Edge midpoints created during the current refinement level.
///
/// Must be dropped when the level is done: the next level splits different
/// edges and ids of this level's midpoints become plain endpoints.
#[derive(Debug, Default)]
pub struct MidpointCache {
    midpoints: HashMap<u64, VertexId>,
}

impl MidpointCache {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            midpoints: HashMap::with_capacity(capacity),
        }
    }

    /// Midpoint vertex of edge `{a, b}`, created on first request.
    ///
    /// New vertices lie on the unit sphere halfway between the endpoints'
    /// unit directions and are appended to `vertices`.
    pub fn midpoint(
        &mut self,
        a: VertexId,
        b: VertexId,
        vertices: &mut Vec<SphereVertex>,
    ) -> VertexId {
        *self.midpoints.entry(edge_key(a, b)).or_insert_with(|| {
            let mid = (vertices[a as usize].norm() + vertices[b as usize].norm()) * 0.5;
            let id = VertexId::try_from(vertices.len())
                .unwrap_or_else(|_| panic!("sphere vertex count exceeds id range"));
            vertices.push(SphereVertex::new(id, mid));
            id
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.midpoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.midpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn key_ignores_order() {
        assert_eq!(edge_key(3, 9), edge_key(9, 3));
        assert_eq!(edge_key(1, 2), (1 << 32) | 2);
        assert_ne!(edge_key(1, 2), edge_key(2, 3));
    }

    #[test]
    #[should_panic(expected = "degenerate edge")]
    fn key_rejects_loop_edge() {
        let _ = edge_key(4, 4);
    }

    #[test]
    fn midpoint_is_shared_and_projected() {
        let mut vertices = vec![
            SphereVertex::new(0, Vec3::X),
            SphereVertex::new(1, Vec3::Y),
        ];
        let mut cache = MidpointCache::default();
        let m0 = cache.midpoint(0, 1, &mut vertices);
        let m1 = cache.midpoint(1, 0, &mut vertices);
        assert_eq!(m0, m1);
        assert_eq!(vertices.len(), 3);
        assert_eq!(cache.len(), 1);

        let mid = vertices[m0 as usize].pos();
        assert!((mid.length() - 1.0).abs() < 1e-6);
        assert!((mid - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-6);
    }
}
