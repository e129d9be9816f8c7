//! Level loading and sphere rendering.
//!
//! Builds the level at startup and spawns one mesh entity per sphere
//! segment and surface bucket. Dirty segment arrays are flushed into the
//! mesh assets, and segments facing away from the camera are hidden.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;

use planet::{Level, LevelConfig};
use planet_geometry::mesh::SPHERE_BACKFACE_THRESHOLD;
use planet_geometry::{IndexRange, MeshSink, Surface, VertexLayout};

use crate::camera::FlightCamera;

/// Environment variable naming a JSON level config.
const CONFIG_ENV: &str = "PLANET_LEVEL_CONFIG";

/// Plugin for building the level and drawing the sphere.
pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(LevelState::load())
            .init_resource::<SphereStats>()
            .add_systems(Startup, (spawn_sphere, spawn_light))
            .add_systems(PostUpdate, (flush_sphere, cull_segments).chain());
    }
}

/// The level and the config it was built from.
#[derive(Resource)]
pub struct LevelState {
    pub config: LevelConfig,
    pub level: Level,
}

impl LevelState {
    fn load() -> Self {
        let config = read_config();
        let level = Level::load(&config).unwrap_or_else(|e| {
            tracing::error!("Failed to load level maps, using a plain sphere: {}", e);
            Level::build(&config, None)
        });
        Self { config, level }
    }
}

#[cfg(not(target_family = "wasm"))]
fn read_config() -> LevelConfig {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        return LevelConfig::default();
    };
    LevelConfig::from_path(&path).unwrap_or_else(|e| {
        tracing::error!("Failed to read level config {}: {}", path, e);
        LevelConfig::default()
    })
}

#[cfg(target_family = "wasm")]
fn read_config() -> LevelConfig {
    tracing::debug!("{} is ignored on the web", CONFIG_ENV);
    LevelConfig::default()
}

/// Sphere counters shown in the HUD.
#[derive(Resource, Default)]
pub struct SphereStats {
    pub visible_segments: usize,
    pub uploads: usize,
}

/// One surface bucket of one sphere segment.
#[derive(Component)]
pub struct SegmentBucket {
    pub segment: usize,
    pub surface: Surface,
    /// No triangles in this bucket as of the last upload.
    pub empty: bool,
}

/// Mesh data received from a geometry flush.
#[derive(Default)]
pub struct MeshUpload {
    pub positions: Option<Vec<[f32; 3]>>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub indices: Option<Vec<Vec<u16>>>,
}

impl MeshSink for MeshUpload {
    fn write_vertices(&mut self, layout: VertexLayout, vertices: &[f32]) {
        let stride = layout.floats_per_vertex();
        let chunks = vertices.chunks_exact(stride);
        self.positions = Some(chunks.clone().map(|v| [v[0], v[1], v[2]]).collect());
        self.normals = match layout {
            VertexLayout::Position => None,
            VertexLayout::PositionNormal => Some(chunks.map(|v| [v[3], v[4], v[5]]).collect()),
        };
    }

    fn write_indices(&mut self, indices: &[u16], ranges: &[IndexRange]) {
        self.indices = Some(
            ranges
                .iter()
                .map(|r| indices[r.offset..r.end()].to_vec())
                .collect(),
        );
    }
}

impl MeshUpload {
    /// Copy the received arrays into `mesh`, using index range `range`.
    pub fn apply(&self, mesh: &mut Mesh, range: usize) {
        if let Some(positions) = &self.positions {
            mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions.clone());
        }
        if let Some(normals) = &self.normals {
            mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals.clone());
        }
        if let Some(indices) = self.indices.as_ref().and_then(|i| i.get(range)) {
            mesh.insert_indices(Indices::U16(indices.clone()));
        }
    }
}

/// Spawn an empty mesh per segment and surface; the first flush fills them.
#[allow(clippy::needless_pass_by_value)]
fn spawn_sphere(
    mut commands: Commands,
    state: Res<LevelState>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let surface_materials: Vec<_> = Surface::ALL
        .iter()
        .map(|surface| {
            let [r, g, b] = surface.color();
            materials.add(StandardMaterial {
                base_color: Color::linear_rgb(r, g, b),
                perceptual_roughness: 0.9,
                ..default()
            })
        })
        .collect();

    for segment in state.level.sphere.segments() {
        for surface in Surface::ALL {
            let mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
            commands.spawn((
                Mesh3d(meshes.add(mesh)),
                MeshMaterial3d(surface_materials[surface.index()].clone()),
                Transform::default(),
                Visibility::Hidden,
                SegmentBucket {
                    segment: segment.id(),
                    surface,
                    empty: true,
                },
            ));
        }
    }

    tracing::info!(
        segments = state.level.sphere.segments().len(),
        "Spawned sphere segment meshes"
    );
}

fn spawn_light(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            ..default()
        },
        Transform::from_xyz(3.0, 2.0, 1.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Upload sphere segments whose arrays changed since the last frame.
fn flush_sphere(
    mut state: ResMut<LevelState>,
    mut stats: ResMut<SphereStats>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut buckets: Query<(&mut SegmentBucket, &Mesh3d)>,
) {
    let sphere = &mut state.level.sphere;
    let mut uploads: Vec<MeshUpload> = std::iter::repeat_with(MeshUpload::default)
        .take(sphere.segments().len())
        .collect();
    if sphere.flush(&mut uploads) == 0 {
        return;
    }

    for (mut bucket, mesh) in &mut buckets {
        let upload = &uploads[bucket.segment];
        if upload.positions.is_none() && upload.indices.is_none() {
            continue;
        }
        if let Some(indices) = upload.indices.as_ref().and_then(|i| i.get(bucket.surface.index())) {
            bucket.empty = indices.is_empty();
        }
        if let Some(mesh) = meshes.get_mut(&mesh.0) {
            upload.apply(mesh, bucket.surface.index());
        }
    }
    stats.uploads += 1;
}

/// Hide segments whose first triangle faces away from the camera, and
/// buckets with nothing to draw.
#[allow(clippy::needless_pass_by_value)]
fn cull_segments(
    state: Res<LevelState>,
    mut stats: ResMut<SphereStats>,
    camera: Single<&Transform, With<FlightCamera>>,
    mut buckets: Query<(&SegmentBucket, &mut Visibility)>,
) {
    let sphere = &state.level.sphere;
    let mut visible = vec![false; sphere.segments().len()];
    for id in sphere.visible_segments(camera.translation, SPHERE_BACKFACE_THRESHOLD) {
        visible[id] = true;
    }

    for (bucket, mut visibility) in &mut buckets {
        let wanted = if visible[bucket.segment] && !bucket.empty {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        visibility.set_if_neq(wanted);
    }
    stats.visible_segments = visible.iter().filter(|v| **v).count();
}
