//! Height and surface painting from equirectangular maps.
//!
//! Both maps are sampled at the texel under a vertex's geographic position:
//! longitude runs right to left across the image and latitude top (north)
//! to bottom (south).

use std::f32::consts::{PI, TAU};

use image::RgbaImage;

use crate::geo::GeoPoint;
use crate::palette::{Palette, rgba_key};
use crate::sphere::{Sphere, VertexId};
use crate::surface::Surface;

/// Read access to an RGBA image.
pub trait ImageSampler {
    /// Width and height in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Pixel at `(x, y)`; both are within [`ImageSampler::dimensions`].
    fn rgba(&self, x: u32, y: u32) -> [u8; 4];
}

impl ImageSampler for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        RgbaImage::dimensions(self)
    }

    fn rgba(&self, x: u32, y: u32) -> [u8; 4] {
        self.get_pixel(x, y).0
    }
}

/// Pixel under `geo`. Longitude must be in `[0, 2π)`.
#[must_use]
pub fn texel(geo: GeoPoint, width: u32, height: u32) -> (u32, u32) {
    let u = 1.0 - geo.lon / TAU;
    let v = 0.5 - geo.lat / PI;
    // Float to int casts saturate, so only the upper edge needs clamping.
    let x = ((u * width as f32) as u32).min(width.saturating_sub(1));
    let y = ((v * height as f32) as u32).min(height.saturating_sub(1));
    (x, y)
}

/// Colour of `image` under `geo`.
#[must_use]
pub fn sample(image: &impl ImageSampler, geo: GeoPoint) -> [u8; 4] {
    let (w, h) = image.dimensions();
    let (x, y) = texel(geo, w, h);
    image.rgba(x, y)
}

/// Radius for a heightmap sample: the red channel scaled into
/// `[1, 1 + max_height]`.
#[must_use]
pub fn height_from_rgba(rgba: [u8; 4], max_height: f32) -> f32 {
    1.0 + f32::from(rgba[0]) / f32::from(u8::MAX) * max_height
}

impl Sphere {
    /// Displace every vertex by the heightmap and refresh flat normals.
    ///
    /// # Panics
    ///
    /// Panics unless the sphere is finalized.
    pub fn read_heightmap(&mut self, map: &impl ImageSampler, max_height: f32) {
        assert!(self.is_finalized(), "failed to read heightmap, sphere is not finalized");

        for id in 0..self.vertices.len() {
            let vertex = &mut self.vertices[id];
            let height = height_from_rgba(sample(map, vertex.geo()), max_height);
            vertex.scale(height);
            self.write_position(id as VertexId);
        }
        self.write_normals();
        tracing::info!(
            vertices = self.vertices.len(),
            max_height,
            "Applied heightmap"
        );
    }

    /// Classify every triangle by the surface map colour under its first
    /// vertex and rebuild the index arrays of segments that changed.
    ///
    /// Colours missing from `palette`, or whose index names no surface, are
    /// logged and leave the triangle as it was.
    ///
    /// # Panics
    ///
    /// Panics unless the sphere is finalized.
    pub fn read_surface(&mut self, map: &impl ImageSampler, palette: &Palette) -> usize {
        assert!(self.is_finalized(), "failed to read surface, sphere is not finalized");

        let vertices = &self.vertices;
        let mut rebuilt = 0;
        for segment in &mut self.segments {
            let segment_id = segment.id();
            let changed = segment.update_surfaces(|triangle| {
                let vertex = &vertices[triangle.vertices()[0] as usize];
                let rgba = sample(map, vertex.geo());
                let surface = palette.index_of(rgba).and_then(Surface::from_index);
                if surface.is_none() {
                    tracing::error!(
                        segment = segment_id,
                        vertex = vertex.id(),
                        "Failed to update surface, unknown colour 0x{:08X}",
                        rgba_key(rgba)
                    );
                }
                surface
            });

            if changed {
                segment.rebuild_surfaces(vertices);
                rebuilt += 1;
            }
        }

        tracing::info!(segments = rebuilt, "Applied surface map");
        rebuilt
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;
    use crate::angle;

    const SURFACE_GPL: &str = "GIMP Palette\n#\n0 0 255 water\n255 255 0 sand\n0 255 0 grass\n128 128 128 rock\n255 255 255 snow\n";

    fn finalized(level: u32) -> Sphere {
        let mut sphere = Sphere::new();
        sphere.create(level);
        sphere.finalize();
        sphere
    }

    #[test]
    fn texel_mapping_matches_equirectangular_layout() {
        // Greenwich on the equator is the right edge, vertically centred.
        assert_eq!(texel(GeoPoint::new(0.0, 0.0, 1.0), 360, 180), (359, 90));
        // Half a turn east is the horizontal centre.
        assert_eq!(texel(GeoPoint::new(PI, 0.0, 1.0), 360, 180), (180, 90));
        // North pole is the top row, south pole clamps to the bottom one.
        assert_eq!(texel(GeoPoint::new(PI, PI / 2.0, 1.0), 360, 180).1, 0);
        assert_eq!(texel(GeoPoint::new(PI, -PI / 2.0, 1.0), 360, 180).1, 179);
    }

    #[test]
    fn heightmap_scales_vertices() {
        let mut sphere = finalized(1);
        let map = RgbaImage::from_pixel(8, 4, Rgba([255, 0, 0, 255]));
        sphere.read_heightmap(&map, 0.25);
        for v in sphere.vertices() {
            assert!((v.pos().length() - 1.25).abs() < 1e-5);
        }

        let segment = &sphere.segments()[0];
        let va = segment.mesh().vertices();
        assert!((glam::Vec3::from_slice(&va[0..3]).length() - 1.25).abs() < 1e-5);
        assert!(segment.mesh().is_dirty());
    }

    #[test]
    fn heightmap_keeps_normals_outward() {
        let mut sphere = finalized(2);
        let mut map = RgbaImage::new(64, 32);
        for (x, _, p) in map.enumerate_pixels_mut() {
            *p = Rgba([(x * 4) as u8, 0, 0, 255]);
        }
        sphere.read_heightmap(&map, 0.1);

        let segment = &sphere.segments()[3];
        let t = segment.all_triangles().next().unwrap();
        let [index, ..] = t.gpu_indices(segment.id(), sphere.vertices());
        let offset = usize::from(index) * crate::sphere::ATTRIB_COUNT + 3;
        let stored = glam::Vec3::from_slice(&segment.mesh().vertices()[offset..offset + 3]);
        assert!((stored - t.normal(sphere.vertices())).length() < 1e-5);
    }

    #[test]
    fn surface_follows_first_vertex() {
        let mut sphere = finalized(2);
        let palette = Palette::parse(SURFACE_GPL).unwrap();

        // Northern half grass, southern half rock.
        let mut map = RgbaImage::new(16, 16);
        for (_, y, p) in map.enumerate_pixels_mut() {
            *p = if y < 8 { Rgba([0, 255, 0, 255]) } else { Rgba([128, 128, 128, 255]) };
        }
        let rebuilt = sphere.read_surface(&map, &palette);
        assert_eq!(rebuilt, 20);

        for segment in sphere.segments() {
            let total: usize = Surface::ALL.iter().map(|&s| segment.triangles(s).len()).sum();
            assert_eq!(total, segment.triangle_count());
            assert_eq!(segment.triangles(Surface::Water).len(), 0);

            for surface in Surface::ALL {
                for t in segment.triangles(surface) {
                    let first = sphere.vertex(t.vertices()[0]);
                    let expected = palette
                        .index_of(sample(&map, first.geo()))
                        .and_then(Surface::from_index);
                    assert_eq!(Some(surface), expected);
                    assert_eq!(t.surface(), surface);
                }
                let range = segment.range(surface);
                assert_eq!(range.count, segment.triangles(surface).len() * 3);
            }
        }
    }

    #[test]
    fn unknown_colour_leaves_surface() {
        let mut sphere = finalized(1);
        let palette = Palette::parse(SURFACE_GPL).unwrap();
        let map = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        assert_eq!(sphere.read_surface(&map, &palette), 0);
        for segment in sphere.segments() {
            assert_eq!(segment.triangles(Surface::Water).len(), segment.triangle_count());
        }
    }

    #[test]
    fn vertex_longitudes_are_normalized() {
        let sphere = finalized(1);
        for v in sphere.vertices() {
            assert_eq!(angle::normalize(v.geo().lon), v.geo().lon);
        }
    }
}
