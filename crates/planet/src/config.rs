//! Level configuration.
//!
//! Every group deserializes with `#[serde(default)]`, so a JSON file only
//! needs the values it changes. Angles are stored in degrees and converted
//! by the accessors.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LevelError, LevelResult};

/// Deepest refinement whose per-segment vertex instances still fit `u16`
/// indices.
pub const MAX_SPHERE_DETAIL: u32 = 7;

/// Complete description of a level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub sphere: SphereConfig,
    pub path: PathConfig,
    pub ship: ShipConfig,
    pub camera: CameraConfig,
    pub bullet: BulletConfig,
    pub tube: TubeConfig,
}

impl LevelConfig {
    /// Read and validate a JSON config.
    pub fn from_path(path: impl AsRef<Path>) -> LevelResult<Self> {
        let path = path.as_ref();
        tracing::debug!("Reading level config {}", path.display());
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse and validate a JSON config.
    pub fn from_json(text: &str) -> LevelResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the level builder cannot honour.
    pub fn validate(&self) -> LevelResult<()> {
        if self.sphere.detail > MAX_SPHERE_DETAIL {
            return Err(LevelError::Config(format!(
                "sphere detail {} exceeds {MAX_SPHERE_DETAIL}",
                self.sphere.detail
            )));
        }
        if self.path.seeds_deg.len() < 3 {
            return Err(LevelError::Config(format!(
                "path needs at least 3 seed vertices, got {}",
                self.path.seeds_deg.len()
            )));
        }
        if self.path.bearing_min_deg > self.path.bearing_max_deg {
            return Err(LevelError::Config(format!(
                "path bearing range is empty: {}..{}",
                self.path.bearing_min_deg, self.path.bearing_max_deg
            )));
        }
        if self.path.step_size_deg <= 0.0 {
            return Err(LevelError::Config(format!(
                "path step size must be positive, got {}",
                self.path.step_size_deg
            )));
        }
        if self.path.height_jitter < 0.0 {
            return Err(LevelError::Config(format!(
                "path height jitter must not be negative, got {}",
                self.path.height_jitter
            )));
        }
        if self.tube.sector_angles_deg.is_empty() {
            return Err(LevelError::Config("tube needs at least one sector".into()));
        }
        Ok(())
    }
}

/// Planet mesh and the maps painted onto it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereConfig {
    /// Refinement levels applied to the icosahedron.
    pub detail: u32,
    /// Radius added by a full-intensity heightmap texel.
    pub max_height: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_map: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface_map: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<PathBuf>,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            detail: 5,
            max_height: 255.0 * 0.0005,
            height_map: None,
            surface_map: None,
            palette: None,
        }
    }
}

/// Seed vertices and random growth of the flight path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// `[lon, lat]` of the first vertices.
    pub seeds_deg: Vec<[f32; 2]>,
    /// Radius of the seed vertices and base radius of grown ones.
    pub height: f32,
    /// Grown vertices sit up to this much above `height`.
    pub height_jitter: f32,
    pub growth_steps: u32,
    pub bearing_min_deg: f32,
    pub bearing_max_deg: f32,
    /// Arc between grown vertices.
    pub segment_length_deg: f32,
    /// Sampling interval along each segment.
    pub step_size_deg: f32,
    pub interpolate_ypr: bool,
    pub seed: u64,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            seeds_deg: vec![[0.0, 15.0], [45.0, 15.0], [90.0, 15.0]],
            height: 1.2,
            height_jitter: 0.1,
            growth_steps: 20,
            bearing_min_deg: 25.0,
            bearing_max_deg: 45.0,
            segment_length_deg: 45.0,
            step_size_deg: 5.0,
            interpolate_ypr: true,
            seed: 0,
        }
    }
}

impl PathConfig {
    #[must_use]
    pub fn segment_length(&self) -> f32 {
        self.segment_length_deg.to_radians()
    }

    #[must_use]
    pub fn step_size(&self) -> f32 {
        self.step_size_deg.to_radians()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    /// Path arc length travelled per second.
    pub speed: f32,
    /// How far ahead the path is sampled to bank the ship into turns.
    pub look_ahead_deg: f32,
    /// Seconds spent snapping to the next sector.
    pub rotate_duration: f32,
    /// Size of the ship mesh.
    pub size: f32,
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            speed: 0.3,
            look_ahead_deg: 10.0,
            rotate_duration: 0.7,
            size: 0.02,
        }
    }
}

impl ShipConfig {
    #[must_use]
    pub fn look_ahead(&self) -> f32 {
        self.look_ahead_deg.to_radians()
    }
}

/// Chase camera. Polar triples are `[horizontal°, vertical°, radius]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub offset: [f32; 3],
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub scroll_factor: f32,
    pub rotate_h_factor: f32,
    pub rotate_v_factor: f32,
    pub move_factor: f32,
    /// Seconds the camera takes to follow a ship rotation.
    pub rotate_duration: f32,
    pub tilt_limit: bool,
    pub tilt_max_deg: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [350.0, 50.0, 0.5],
            offset: [-10.0, 32.0, 0.31],
            fov_deg: 70.0,
            near: 0.1,
            far: 300.0,
            scroll_factor: 0.05,
            rotate_h_factor: -0.01,
            rotate_v_factor: 0.01,
            move_factor: 0.001,
            rotate_duration: 1.0,
            tilt_limit: true,
            tilt_max_deg: 80.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    /// Distance per second.
    pub speed_linear: f32,
    /// Pitch rate in radians per second.
    pub speed_angular: f32,
    pub altitude_min: f32,
    pub altitude_max: f32,
    /// Total travel before expiry; zero disables the limit.
    pub distance_limit: f32,
    /// Seconds between shots.
    pub cooldown: f32,
    /// Radius of the bullet mesh.
    pub size: f32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            speed_linear: 2.0,
            speed_angular: 2.0,
            altitude_min: 1.0,
            altitude_max: 2.0,
            distance_limit: 3.0,
            cooldown: 0.1,
            size: 0.003,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TubeConfig {
    /// Path arc length kept in the window ahead of the ship.
    pub length: f32,
    pub radius: f32,
    pub sector_angles_deg: Vec<f32>,
}

impl Default for TubeConfig {
    fn default() -> Self {
        Self {
            length: 3.0,
            radius: 0.08,
            sector_angles_deg: (0..8).map(|i| i as f32 * 45.0).collect(),
        }
    }
}

impl TubeConfig {
    #[must_use]
    pub fn sector_angles(&self) -> Vec<f32> {
        self.sector_angles_deg.iter().map(|a| a.to_radians()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config = LevelConfig::from_json("{}").unwrap();
        assert_eq!(config, LevelConfig::default());
        assert_eq!(config.sphere.detail, 5);
        assert_eq!(config.tube.sector_angles_deg.len(), 8);
        assert_eq!(config.tube.sector_angles_deg[7], 315.0);
    }

    #[test]
    fn partial_groups_keep_other_defaults() {
        let config =
            LevelConfig::from_json(r#"{ "path": { "seed": 7, "growth_steps": 3 } }"#).unwrap();
        assert_eq!(config.path.seed, 7);
        assert_eq!(config.path.growth_steps, 3);
        assert_eq!(config.path.height, 1.2);
        assert_eq!(config.ship, ShipConfig::default());
    }

    #[test]
    fn serialized_defaults_parse_back() {
        let text = serde_json::to_string(&LevelConfig::default()).unwrap();
        assert_eq!(LevelConfig::from_json(&text).unwrap(), LevelConfig::default());
    }

    #[test]
    fn rejects_unbuildable_values() {
        for json in [
            r#"{ "sphere": { "detail": 8 } }"#,
            r#"{ "path": { "seeds_deg": [[0, 0], [10, 0]] } }"#,
            r#"{ "path": { "bearing_min_deg": 50, "bearing_max_deg": 40 } }"#,
            r#"{ "path": { "step_size_deg": 0 } }"#,
            r#"{ "tube": { "sector_angles_deg": [] } }"#,
        ] {
            assert!(
                matches!(LevelConfig::from_json(json), Err(LevelError::Config(_))),
                "{json}"
            );
        }
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            LevelConfig::from_json("{ sphere: }"),
            Err(LevelError::Json(_))
        ));
    }

    #[test]
    fn angle_accessors_convert_to_radians() {
        let config = LevelConfig::default();
        assert!((config.path.segment_length() - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
        assert!((config.tube.sector_angles()[2] - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((config.ship.look_ahead() - 10.0_f32.to_radians()).abs() < 1e-6);
    }
}
