//! Error types for world and zone generation.

use thiserror::Error;

use crate::biomes::Biome;
use crate::tiles::VariantHandle;
use crate::tilemap::GridPos;

/// Top-level error type for generation operations.
#[derive(Debug, Error)]
pub enum GenError {
    /// Malformed or missing static data. Fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Grid access outside `[0, width) x [0, height)`
    #[error("position ({x}, {y}) is outside a {width}x{height} grid")]
    Bounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },

    /// A handle that the registry never issued
    #[error("tile variant {0:?} not found")]
    VariantNotFound(VariantHandle),

    /// A builder could not meet a soft target
    #[error("generation shortfall: {0}")]
    GenerationShortfall(String),

    /// A route that had to connect stopped short of its goal
    #[error("no path from {from} to {to}")]
    PathNotFound { from: GridPos, to: GridPos },

    /// Biome whose zone generation does not exist yet
    #[error("zone generation for {0:?} is not implemented")]
    Unimplemented(Biome),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl GenError {
    /// Whether the zone/world boundary may degrade to a fallback instead of failing.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GenError::GenerationShortfall(_) | GenError::PathNotFound { .. }
        )
    }
}

/// Result alias used across the crate
pub type GenResult<T> = Result<T, GenError>;
