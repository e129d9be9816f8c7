//! Flight readout overlay.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};

use crate::level::{LevelState, SphereStats};
use crate::ship::FlightState;

/// Plugin for the egui flight readout.
pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(EguiPrimaryContextPass, draw_hud);
    }
}

#[allow(clippy::needless_pass_by_value)]
fn draw_hud(
    mut contexts: EguiContexts,
    state: Res<LevelState>,
    stats: Res<SphereStats>,
    flight: Option<Res<FlightState>>,
) -> Result {
    let Some(flight) = flight else {
        return Ok(());
    };
    let ctx = contexts.ctx_mut()?;

    let ship = &flight.0.ship;
    let length = state.level.path.length();
    egui::Window::new("Flight")
        .default_pos([10.0, 10.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!(
                "Path: {:.2} / {:.2} ({:.0}%)",
                ship.offset(),
                length,
                100.0 * ship.offset() / length.max(f32::EPSILON)
            ));
            ui.label(format!(
                "Rotation: {:.0}° (sector {})",
                ship.rotate_angle().to_degrees(),
                ship.snap_index()
            ));
            ui.label(format!("Heading: {:.0}°", ship.heading().to_degrees()));
            ui.label(format!("Bullets: {}", flight.0.shooter.len()));
            ui.label(format!("Tube segments: {}", flight.0.tube.len()));
            ui.separator();
            ui.label(format!(
                "Sphere segments: {} / {}",
                stats.visible_segments,
                state.level.sphere.segments().len()
            ));
            ui.label(format!("Sphere uploads: {}", stats.uploads));
            ui.small("←/→ rotate, space fires, drag and wheel move the camera");
        });
    Ok(())
}
