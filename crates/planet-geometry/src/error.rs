//! Error types for recoverable geometry input failures.
//!
//! Topology violations are not represented here: they panic at the call
//! site with the offending ids in the message.

use thiserror::Error;

/// Errors that can occur while reading geometry inputs.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("failed to read palette: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed palette line {line}: expected `R G B comment`, got {text:?}")]
    PaletteFormat { line: usize, text: String },

    #[error("invalid colour component {value:?} on palette line {line}")]
    PaletteComponent { line: usize, value: String },
}

/// Result type for geometry input operations.
pub type GeometryResult<T> = Result<T, GeometryError>;
