//! Per-frame flight state: ship, chase camera, bullets and the tube window
//! around the ship.

use planet_geometry::{Path, TubeUpdate, TubeWindow};

use crate::camera::{CameraView, ShipCamera};
use crate::config::LevelConfig;
use crate::shooter::Shooter;
use crate::ship::{ShipController, Turn};

/// What changed during one [`Flight::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlightUpdate {
    /// Tube segments built or released, if the window moved.
    pub tube: Option<TubeUpdate>,
    /// Ids of bullets that expired.
    pub expired: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct Flight {
    pub ship: ShipController,
    pub camera: ShipCamera,
    pub shooter: Shooter,
    pub tube: TubeWindow,
}

impl Flight {
    #[must_use]
    pub fn new(config: &LevelConfig) -> Self {
        Self {
            ship: ShipController::new(&config.ship, &config.tube),
            camera: ShipCamera::new(&config.camera),
            shooter: Shooter::new(&config.bullet),
            tube: TubeWindow::new(
                config.tube.length,
                config.tube.radius,
                &config.tube.sector_angles(),
            ),
        }
    }

    /// Advance everything by `dt` seconds.
    ///
    /// The tube window is placed at the ship's offset before it moves, so it
    /// always covers the pose the ship was drawn at.
    pub fn update(&mut self, path: &Path, dt: f32) -> FlightUpdate {
        let tube = self.tube.update(path, self.ship.offset());
        self.ship.update(path, dt);
        self.camera.update(dt);
        let expired = self.shooter.update(dt);
        FlightUpdate { tube, expired }
    }

    /// Snap the ship to the neighbouring sector; the camera follows.
    pub fn turn(&mut self, turn: Turn) {
        let to = self.ship.rotate(turn);
        self.camera.on_ship_rotate(to);
    }

    /// Fire from the ship's position along the path orientation.
    pub fn shoot(&mut self) -> bool {
        let position = self.ship.pose().position;
        let rotation = self.ship.direx().rot;
        self.shooter.shoot(position, rotation)
    }

    /// Camera placement around the ship's path pose.
    #[must_use]
    pub fn view(&self) -> CameraView {
        let direx = self.ship.direx();
        self.camera.view(direx.pos, direx.rot)
    }

    pub fn reset(&mut self) {
        self.ship.reset();
        self.camera.reset();
        self.shooter.reset();
        self.tube.clear();
    }
}
