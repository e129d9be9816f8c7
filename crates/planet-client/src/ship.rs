//! Ship flight, input and bullets.

use std::collections::HashMap;

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use bevy_egui::input::egui_wants_any_keyboard_input;
use planet::{Flight, Turn};

use crate::level::LevelState;
use crate::tube::TubeMoved;

/// Per-frame ordering of flight systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FlightSet {
    /// Read input into the simulation.
    Input,
    /// Advance the simulation.
    Simulate,
    /// Copy simulation state onto entities.
    Present,
}

/// Plugin for the ship and its bullets.
pub struct ShipPlugin;

impl Plugin for ShipPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (FlightSet::Input, FlightSet::Simulate, FlightSet::Present).chain(),
        )
        .init_resource::<BulletEntities>()
        .add_systems(Startup, spawn_ship)
        .add_systems(
            Update,
            (
                ship_input
                    .run_if(not(egui_wants_any_keyboard_input))
                    .in_set(FlightSet::Input),
                advance_flight.in_set(FlightSet::Simulate),
                (sync_ship, sync_bullets).in_set(FlightSet::Present),
            ),
        );
    }
}

/// The running flight simulation.
#[derive(Resource)]
pub struct FlightState(pub Flight);

/// Marker for the ship entity.
#[derive(Component)]
pub struct ShipModel;

/// Bullet entities by bullet id, plus the shared mesh and material.
#[derive(Resource, Default)]
struct BulletEntities {
    entities: HashMap<u64, Entity>,
    mesh: Handle<Mesh>,
    material: Handle<StandardMaterial>,
}

#[allow(clippy::needless_pass_by_value)]
fn spawn_ship(
    mut commands: Commands,
    state: Res<LevelState>,
    mut bullets: ResMut<BulletEntities>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let config = &state.config;
    commands.insert_resource(FlightState(Flight::new(config)));

    let size = config.ship.size;
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(size, size * 0.3, size * 2.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.9, 0.4, 0.1),
            ..default()
        })),
        Transform::default(),
        ShipModel,
    ));

    bullets.mesh = meshes.add(Cuboid::from_length(config.bullet.size));
    bullets.material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.9, 0.2),
        unlit: true,
        ..default()
    });
}

/// Arrow keys snap the ship between sectors, space fires.
#[allow(clippy::needless_pass_by_value)]
fn ship_input(keyboard: Res<ButtonInput<KeyCode>>, mut flight: ResMut<FlightState>) {
    if keyboard.just_pressed(KeyCode::ArrowLeft) {
        flight.0.turn(Turn::Left);
    }
    if keyboard.just_pressed(KeyCode::ArrowRight) {
        flight.0.turn(Turn::Right);
    }
    if keyboard.pressed(KeyCode::Space) {
        flight.0.shoot();
    }
}

#[allow(clippy::needless_pass_by_value)]
fn advance_flight(
    time: Res<Time>,
    state: Res<LevelState>,
    mut flight: ResMut<FlightState>,
    mut tube_moved: MessageWriter<TubeMoved>,
) {
    let update = flight.0.update(&state.level.path, time.delta_secs());
    if let Some(tube) = update.tube
        && (!tube.entered.is_empty() || !tube.left.is_empty())
    {
        tube_moved.write(TubeMoved(tube));
    }
    if !update.expired.is_empty() {
        tracing::trace!(expired = ?update.expired, "Bullets expired");
    }
}

#[allow(clippy::needless_pass_by_value)]
fn sync_ship(flight: Res<FlightState>, mut ship: Single<&mut Transform, With<ShipModel>>) {
    let pose = flight.0.ship.pose();
    ship.translation = pose.position;
    ship.rotation = pose.rotation;
}

/// Spawn entities for new bullets and despawn expired ones.
#[allow(clippy::needless_pass_by_value)]
fn sync_bullets(
    mut commands: Commands,
    flight: Res<FlightState>,
    mut bullets: ResMut<BulletEntities>,
    mut transforms: Query<&mut Transform>,
) {
    let live = flight.0.shooter.bullets();

    bullets.entities.retain(|id, entity| {
        let alive = live.iter().any(|b| b.id() == *id);
        if !alive {
            commands.entity(*entity).despawn();
        }
        alive
    });

    for bullet in live {
        let transform = Transform::from_translation(bullet.position()).with_rotation(bullet.rotation());
        if let Some(entity) = bullets.entities.get(&bullet.id()) {
            if let Ok(mut current) = transforms.get_mut(*entity) {
                *current = transform;
            }
            continue;
        }
        let entity = commands
            .spawn((
                Mesh3d(bullets.mesh.clone()),
                MeshMaterial3d(bullets.material.clone()),
                transform,
            ))
            .id();
        bullets.entities.insert(bullet.id(), entity);
    }
}
