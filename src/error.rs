//! Errors surfaced by the engine.
//!
//! Only construction and per-call precondition failures are reported here.
//! A column that misses every wall or samples an unknown texture is handled
//! inside the wall pass and never becomes an `Error`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("drawing surface has zero size ({width}x{height})")]
    ZeroSurface { width: usize, height: usize },

    #[error("surface buffer holds {actual} pixels, expected {expected}")]
    SurfaceMismatch { expected: usize, actual: usize },

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("tile size must be positive and finite, got {0}")]
    InvalidTileSize(f32),

    #[error("invalid texture atlas: {0}")]
    InvalidAtlas(String),

    #[error("invalid renderer config: {0}")]
    InvalidConfig(String),

    #[error("tried to render minimap without dimensions")]
    MissingMinimapDimensions,
}

pub type Result<T> = std::result::Result<T, Error>;
