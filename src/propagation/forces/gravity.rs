//! Attractor gravity force model
//!
//! Newtonian point-mass gravity summed over the frame's attractors:
//!
//! a = Σ min(G·M / r², F_max) · d̂
//!
//! with two guards: attractors closer than `min_distance_sq` contribute
//! nothing, and each attractor's magnitude is capped at `max_force`.

use nalgebra::Vector3;

use super::ForceModel;
use crate::propagation::settings::GravityConfig;
use crate::propagation::state::{Attractor, GRAVITATIONAL_CONSTANT};

/// Gravity from a frozen list of attractors
#[derive(Debug, Clone, Copy)]
pub struct AttractorGravity<'a> {
    attractors: &'a [Attractor],

    /// Squared separation below which an attractor is ignored (units²)
    min_distance_sq: f64,

    /// Per-attractor acceleration cap (units/s²)
    max_force: f64,
}

impl<'a> AttractorGravity<'a> {
    pub fn new(attractors: &'a [Attractor], config: &GravityConfig) -> Self {
        Self {
            attractors,
            min_distance_sq: config.min_distance_sq,
            max_force: config.max_force,
        }
    }

    /// Contribution of a single attractor
    fn attractor_accel(&self, attractor: &Attractor, position: &Vector3<f64>) -> Vector3<f64> {
        let d = attractor.position - position;
        let r2 = d.norm_squared();

        // Avoid singularity at coincident points
        if r2 < self.min_distance_sq {
            return Vector3::zeros();
        }

        let force = (GRAVITATIONAL_CONSTANT * attractor.mass_kg / r2).min(self.max_force);
        let r = r2.sqrt();
        d * (force / r)
    }
}

impl ForceModel for AttractorGravity<'_> {
    fn acceleration(&self, position: &Vector3<f64>, _velocity: &Vector3<f64>) -> Vector3<f64> {
        // List order keeps the summation reproducible
        self.attractors
            .iter()
            .fold(Vector3::zeros(), |acc, attractor| {
                acc + self.attractor_accel(attractor, position)
            })
    }

    fn name(&self) -> &'static str {
        "Attractor Gravity"
    }
}
