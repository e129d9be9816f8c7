//! Chase camera following the ship.
//!
//! Right-drag orbits the eye around the ship, left-drag tilts and extends
//! the look-at offset, the wheel zooms. Insert/Backspace, Home/End and
//! PageUp/PageDown nudge the offset triple directly.

use bevy::ecs::message::MessageReader;
use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy_egui::input::{egui_wants_any_keyboard_input, egui_wants_any_pointer_input};
use planet::DragMode;

use crate::level::LevelState;
use crate::ship::{FlightSet, FlightState};

/// Offset change per key press.
const NUDGE_STEP: f32 = 0.01;

/// Plugin for the ship chase camera.
pub struct ShipCameraPlugin;

impl Plugin for ShipCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera).add_systems(
            Update,
            (
                (
                    camera_drag.run_if(not(egui_wants_any_pointer_input)),
                    camera_scroll.run_if(not(egui_wants_any_pointer_input)),
                    camera_keys.run_if(not(egui_wants_any_keyboard_input)),
                )
                    .in_set(FlightSet::Input),
                apply_camera_view.in_set(FlightSet::Present),
            ),
        );
    }
}

/// Marker component for the camera entity that follows the ship.
#[derive(Component)]
pub struct FlightCamera;

#[allow(clippy::needless_pass_by_value)]
fn spawn_camera(mut commands: Commands, state: Res<LevelState>) {
    let config = &state.config.camera;
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: config.fov_deg.to_radians(),
            near: config.near,
            far: config.far,
            ..default()
        }),
        Transform::from_xyz(0.0, 0.0, 3.0).looking_at(Vec3::ZERO, Vec3::Y),
        FlightCamera,
    ));
}

/// Handle mouse drags.
#[allow(clippy::needless_pass_by_value)]
fn camera_drag(
    mut mouse_motion: MessageReader<MouseMotion>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut flight: ResMut<FlightState>,
) {
    let mut delta = Vec2::ZERO;
    for event in mouse_motion.read() {
        delta += event.delta;
    }

    if delta == Vec2::ZERO {
        return;
    }

    if mouse.pressed(MouseButton::Right) {
        flight.0.camera.drag(DragMode::Orbit, delta);
    } else if mouse.pressed(MouseButton::Left) {
        flight.0.camera.drag(DragMode::Offset, delta);
    }
}

/// Zoom with the mouse wheel.
fn camera_scroll(mut scroll_events: MessageReader<MouseWheel>, mut flight: ResMut<FlightState>) {
    for event in scroll_events.read() {
        if event.y != 0.0 {
            // Wheel up moves closer.
            flight.0.camera.scroll(-event.y);
        }
    }
}

/// Nudge the look-at offset from the keyboard.
#[allow(clippy::needless_pass_by_value)]
fn camera_keys(keyboard: Res<ButtonInput<KeyCode>>, mut flight: ResMut<FlightState>) {
    let bindings = [
        (KeyCode::Insert, Vec3::X),
        (KeyCode::Backspace, Vec3::NEG_X),
        (KeyCode::Home, Vec3::Y),
        (KeyCode::End, Vec3::NEG_Y),
        (KeyCode::PageUp, Vec3::Z),
        (KeyCode::PageDown, Vec3::NEG_Z),
    ];
    for (key, axis) in bindings {
        if keyboard.just_pressed(key) {
            flight.0.camera.nudge_offset(axis * NUDGE_STEP);
        }
    }
}

/// Place the camera around the ship's current pose.
#[allow(clippy::needless_pass_by_value)]
fn apply_camera_view(
    flight: Res<FlightState>,
    mut camera: Single<&mut Transform, With<FlightCamera>>,
) {
    let view = flight.0.view();
    **camera = Transform::from_translation(view.eye).looking_at(view.target, view.up);
}
