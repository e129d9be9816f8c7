//! Flight around a procedurally shaped planet.
//!
//! The level is built once at startup from an optional JSON config (path in
//! `PLANET_LEVEL_CONFIG`, native only). Everything else is driven per frame
//! from the `planet` simulation.

mod camera;
mod hud;
mod level;
mod ship;
mod tube;

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

fn main() {
    init_logging();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Planet".into(),
                canvas: Some("#planet-canvas".into()),
                fit_canvas_to_parent: true,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin::default())
        .insert_resource(ClearColor(Color::srgb(0.3, 0.3, 0.3)))
        .add_plugins((
            level::LevelPlugin,
            ship::ShipPlugin,
            camera::ShipCameraPlugin,
            tube::TubePlugin,
            hud::HudPlugin,
        ))
        .run();
}

#[cfg(not(target_family = "wasm"))]
fn init_logging() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();
}

#[cfg(target_family = "wasm")]
fn init_logging() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
}
