//! Level assembly: the painted sphere plus the looped flight path.

use image::RgbaImage;
use planet_geometry::{Palette, Path, Sphere};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{LevelConfig, PathConfig, SphereConfig};
use crate::error::LevelResult;

/// Heightmap, surface map and the palette that classifies it.
#[derive(Debug, Clone)]
pub struct LevelMaps {
    pub height: RgbaImage,
    pub surface: RgbaImage,
    pub palette: Palette,
}

impl LevelMaps {
    /// Load the maps named in `config`.
    ///
    /// Returns `Ok(None)` unless all three files are configured.
    pub fn load(config: &SphereConfig) -> LevelResult<Option<Self>> {
        let (Some(height), Some(surface), Some(palette)) =
            (&config.height_map, &config.surface_map, &config.palette)
        else {
            if config.height_map.is_some()
                || config.surface_map.is_some()
                || config.palette.is_some()
            {
                tracing::warn!("Sphere maps are only applied when all three files are set");
            }
            return Ok(None);
        };

        tracing::info!("Loading heightmap {}", height.display());
        let height = image::open(height)?.into_rgba8();
        tracing::info!("Loading surface map {}", surface.display());
        let surface = image::open(surface)?.into_rgba8();
        let palette = Palette::from_path(palette)?;

        Ok(Some(Self {
            height,
            surface,
            palette,
        }))
    }
}

/// Everything the game simulates against.
#[derive(Debug)]
pub struct Level {
    pub sphere: Sphere,
    pub path: Path,
}

impl Level {
    /// Load the configured maps from disk and build the level.
    pub fn load(config: &LevelConfig) -> LevelResult<Self> {
        config.validate()?;
        let maps = LevelMaps::load(&config.sphere)?;
        Ok(Self::build(config, maps.as_ref()))
    }

    /// Build the sphere, paint it with `maps` when given, and grow the path.
    ///
    /// # Panics
    ///
    /// Panics on a config that fails [`LevelConfig::validate`].
    #[must_use]
    pub fn build(config: &LevelConfig, maps: Option<&LevelMaps>) -> Self {
        let mut sphere = Sphere::new();
        sphere.create(config.sphere.detail);
        sphere.finalize();

        if let Some(maps) = maps {
            sphere.read_heightmap(&maps.height, config.sphere.max_height);
            sphere.read_surface(&maps.surface, &maps.palette);
        }
        sphere.log(false);

        let path = build_path(&config.path);
        path.log();

        tracing::info!(
            triangles = sphere.triangle_count(),
            segments = path.segment_count(),
            length = path.length(),
            "Level ready"
        );
        Self { sphere, path }
    }
}

/// Seed the path, grow it with random turns and close the loop.
///
/// The same config always yields the same path.
///
/// # Panics
///
/// Panics with fewer than three seed vertices.
#[must_use]
pub fn build_path(config: &PathConfig) -> Path {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut path = Path::with_step_size(config.step_size());
    path.set_interpolate_ypr(config.interpolate_ypr);

    for &[lon, lat] in &config.seeds_deg {
        path.add_vertex_deg(lon, lat, config.height);
    }

    for _ in 0..config.growth_steps {
        let bearing = rng
            .random_range(config.bearing_min_deg..=config.bearing_max_deg)
            .to_radians();
        let height = config.height + rng.random_range(0.0..=config.height_jitter);
        path.grow(bearing, config.segment_length(), height);
    }

    path.make_loop();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use planet_geometry::Span;

    fn small_config() -> LevelConfig {
        let mut config = LevelConfig::default();
        config.sphere.detail = 2;
        config.path.growth_steps = 4;
        config
    }

    #[test]
    fn path_is_reproducible_from_seed() {
        let config = PathConfig::default();
        let a = build_path(&config);
        let b = build_path(&config);
        assert_eq!(a.vertices(), b.vertices());
        assert_eq!(a.length(), b.length());
    }

    #[test]
    fn different_seeds_grow_differently() {
        let a = build_path(&PathConfig::default());
        let b = build_path(&PathConfig {
            seed: 1,
            ..PathConfig::default()
        });
        assert_ne!(a.vertices(), b.vertices());
    }

    #[test]
    fn path_has_one_segment_per_vertex_once_looped() {
        let config = PathConfig::default();
        let path = build_path(&config);
        let vertices = config.seeds_deg.len() + config.growth_steps as usize;
        assert_eq!(path.vertices().len(), vertices);
        // One per vertex from the third on, plus the two closing segments.
        assert_eq!(path.segment_count(), vertices);
        assert!(path.is_loop());
        assert!(path.interpolate_ypr());
    }

    #[test]
    fn grown_heights_stay_within_jitter() {
        let config = PathConfig::default();
        let path = build_path(&config);
        for v in path.vertices() {
            assert!(v.height >= config.height);
            assert!(v.height <= config.height + config.height_jitter);
        }
    }

    #[test]
    fn zero_jitter_keeps_constant_height() {
        let config = PathConfig {
            height_jitter: 0.0,
            ..PathConfig::default()
        };
        let path = build_path(&config);
        assert!(path.vertices().iter().all(|v| v.height == config.height));
    }

    #[test]
    fn build_without_maps() {
        let level = Level::build(&small_config(), None);
        assert!(level.sphere.is_finalized());
        assert_eq!(level.sphere.triangle_count(), 20 * 4usize.pow(2));
        assert!(level.path.length() > 0.0);
        assert_eq!(level.path.segments()[0].offset(), 0.0);
    }

    #[test]
    fn load_without_map_paths_skips_painting() {
        let level = Level::load(&small_config()).unwrap();
        assert!(level.sphere.vertices().iter().all(|v| (v.height() - 1.0).abs() < 1e-6));
    }

    #[test]
    fn missing_map_file_is_an_error() {
        let mut config = small_config();
        config.sphere.height_map = Some("does/not/exist.png".into());
        config.sphere.surface_map = Some("does/not/exist.png".into());
        config.sphere.palette = Some("does/not/exist.gpl".into());
        assert!(Level::load(&config).is_err());
    }

    #[test]
    fn maps_raise_and_classify_the_sphere() {
        let height = RgbaImage::from_pixel(8, 4, image::Rgba([255, 0, 0, 255]));
        let surface = RgbaImage::from_pixel(8, 4, image::Rgba([0, 200, 0, 255]));
        let palette = Palette::from_iter([[0, 0, 255], [255, 255, 0], [0, 200, 0]]);
        let maps = LevelMaps {
            height,
            surface,
            palette,
        };

        let config = small_config();
        let level = Level::build(&config, Some(&maps));
        let expected = 1.0 + config.sphere.max_height;
        for v in level.sphere.vertices() {
            assert!((v.pos().length() - expected).abs() < 1e-4);
        }
        for segment in level.sphere.segments() {
            assert_eq!(
                segment.triangles(planet_geometry::Surface::Grass).len(),
                segment.triangle_count()
            );
        }
    }
}
