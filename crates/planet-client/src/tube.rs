//! Tube rings around the path ahead of the ship.

use std::collections::HashMap;

use bevy::asset::RenderAssetUsages;
use bevy::ecs::message::{Message, MessageReader};
use bevy::mesh::PrimitiveTopology;
use bevy::prelude::*;
use planet_geometry::TubeUpdate;

use crate::level::MeshUpload;
use crate::ship::{FlightSet, FlightState};

/// Plugin that mirrors the tube window into line meshes.
pub struct TubePlugin;

impl Plugin for TubePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<TubeMoved>()
            .init_resource::<TubeEntities>()
            .add_systems(Startup, init_tube_material)
            .add_systems(Update, sync_tube.in_set(FlightSet::Present));
    }
}

/// The tube window gained or dropped path segments this frame.
#[derive(Message, Debug, Clone)]
pub struct TubeMoved(pub TubeUpdate);

#[derive(Resource, Default)]
struct TubeEntities {
    by_segment: HashMap<usize, Entity>,
    material: Handle<StandardMaterial>,
}

fn init_tube_material(
    mut tubes: ResMut<TubeEntities>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    tubes.material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.2, 0.8, 1.0),
        unlit: true,
        ..default()
    });
}

/// Spawn line meshes for entered segments and despawn the ones that left.
fn sync_tube(
    mut commands: Commands,
    mut moves: MessageReader<TubeMoved>,
    mut flight: ResMut<FlightState>,
    mut tubes: ResMut<TubeEntities>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    for TubeMoved(update) in moves.read() {
        for index in &update.left {
            if let Some(entity) = tubes.by_segment.remove(index) {
                commands.entity(entity).despawn();
            }
        }

        for &index in &update.entered {
            let Some(segment) = flight.0.tube.segment_mut(index) else {
                // Entered and left again within one frame.
                continue;
            };
            let mut upload = MeshUpload::default();
            if segment.flush(&mut upload).is_none() {
                continue;
            }

            let mut mesh = Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::default());
            upload.apply(&mut mesh, 0);
            let entity = commands
                .spawn((
                    Mesh3d(meshes.add(mesh)),
                    MeshMaterial3d(tubes.material.clone()),
                    Transform::default(),
                ))
                .id();
            if let Some(stale) = tubes.by_segment.insert(index, entity) {
                commands.entity(stale).despawn();
            }
        }
    }
}
