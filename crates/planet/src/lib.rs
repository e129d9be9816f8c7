//! Level layer for the planet flight game.
//!
//! Builds a [`Level`] (painted sphere plus looped flight path) from a
//! [`LevelConfig`] and simulates a [`Flight`] over it: the ship riding the
//! tube around the path, the chase camera, and bullets. Everything here is
//! engine-free; the client only feeds input and time and draws the results.

mod error;

pub mod camera;
pub mod config;
pub mod flight;
pub mod level;
pub mod ship;
pub mod shooter;
pub mod tween;

pub use camera::{CameraView, DragMode, ShipCamera};
pub use config::LevelConfig;
pub use error::{LevelError, LevelResult};
pub use flight::{Flight, FlightUpdate};
pub use level::{Level, LevelMaps, build_path};
pub use ship::{ShipController, ShipPose, Turn};
pub use shooter::{Bullet, Shooter};
pub use tween::{Ease, Tween};
