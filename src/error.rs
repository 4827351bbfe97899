//! Error types for polygon construction and editing.

use thiserror::Error;

/// Contract violations caught at construction or editing time.
///
/// Numerical trouble inside a tick (near-zero spring length, zero summed
/// inverse mass, degenerate SAT axis) never surfaces here; those corrections
/// are skipped for the iteration instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolygonError {
    #[error("polygon needs at least 3 sides, got {sides}")]
    TooFewSides { sides: usize },

    #[error("polygon width and height must be positive, got {width} x {height}")]
    InvalidDimensions { width: f64, height: f64 },

    #[error("particle mass must be positive and finite, got {mass}")]
    InvalidMass { mass: f64 },

    #[error("{what} must be finite")]
    NonFinite { what: &'static str },

    #[error("particle index {index} out of bounds (count: {count})")]
    ParticleOutOfBounds { index: usize, count: usize },

    #[error("no scene registered under key {key}")]
    UnknownScene { key: u32 },
}
