//! Error types for level loading.

use planet_geometry::GeometryError;
use thiserror::Error;

/// Errors that can occur while loading a level configuration or its maps.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode map: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to parse level config: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("invalid level config: {0}")]
    Config(String),
}

/// Result type for level operations.
pub type LevelResult<T> = Result<T, LevelError>;
