//! Construction-time validation errors
//!
//! The propagation hot path never fails. Malformed inputs are rejected when
//! tables, snapshots and configurations are built.

use thiserror::Error;

/// Errors building an atmosphere table
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AtmosphereError {
    #[error("altitude and density tables differ in length ({altitudes} vs {densities})")]
    LengthMismatch { altitudes: usize, densities: usize },

    #[error("atmosphere table needs at least 2 samples, got {0}")]
    TooFewSamples(usize),

    #[error("non-finite sample at index {0}")]
    NonFinite(usize),

    #[error("altitudes must be strictly increasing (index {0})")]
    AltitudeNotIncreasing(usize),

    #[error("density must be positive (index {0})")]
    NonPositiveDensity(usize),

    #[error("density must not increase with altitude (index {0})")]
    DensityIncreasing(usize),
}

/// Errors building an attractor snapshot
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("{count} attractors exceeds the limit of {max}")]
    TooManyAttractors { count: usize, max: usize },

    #[error("atmosphere reference index {index} out of range for {count} attractors")]
    ReferenceOutOfRange { index: usize, count: usize },
}

/// Errors in propagator configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("max substep must be positive and finite, got {0}")]
    InvalidSubstep(f64),

    #[error("{name} must be non-negative and finite, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("spin axis must be a non-zero finite vector")]
    InvalidSpinAxis,

    #[error("low-altitude correction factor must be positive and finite, got {0}")]
    InvalidCorrection(f64),

    #[error(transparent)]
    Atmosphere(#[from] AtmosphereError),
}
