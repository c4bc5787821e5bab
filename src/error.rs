//! Error types for the simulation core
//!
//! Only construction-time invariant violations and decode failures surface
//! here. Nothing inside a tick is fallible.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// Scalar mass must be strictly positive (it divides the force)
    #[error("mass must be positive, got {0}")]
    NonPositiveMass(f32),

    #[error("radius must not be negative, got {0}")]
    NegativeRadius(f32),

    /// Damping factor outside `[0, 1]` makes velocity grow without bound
    #[error("damping factor must lie in [0, 1], got {0}")]
    DampingOutOfRange(f32),

    #[error("bounciness must lie in [0, 1], got {0}")]
    BouncinessOutOfRange(f32),

    /// Play area must have positive extent on both axes
    #[error("invalid bounds {width}x{height}")]
    InvalidBounds { width: f32, height: f32 },

    #[error("failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type SimResult<T> = Result<T, SimError>;
