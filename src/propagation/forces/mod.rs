//! Force models for orbital mechanics
//!
//! This module provides composable force models that together form the
//! acceleration function the integrator samples at every stage.
//!
//! # Architecture
//!
//! Each force model implements the `ForceModel` trait, which computes the
//! acceleration contribution at a given position and velocity. Models borrow
//! the frame's frozen attractor snapshot, so they hold no state of their own
//! and can be evaluated any number of times per substep.
//!
//! `CompositeForce` sums gravity, thrust and drag in that fixed order so the
//! floating-point result is reproducible.
//!
//! # Available Models
//!
//! - **AttractorGravity**: capped Newtonian gravity from every attractor
//! - **ConstantThrust**: constant acceleration for the whole frame
//! - **AtmosphericDrag**: drag against a co-rotating table atmosphere

mod drag;
mod gravity;
mod thrust;

pub use drag::AtmosphericDrag;
pub use gravity::AttractorGravity;
pub use thrust::ConstantThrust;

use nalgebra::Vector3;

use super::atmosphere::AtmosphereModel;
use super::settings::PropagatorConfig;
use super::state::{AttractorSnapshot, BodyParams};

/// Trait for force model contributions
pub trait ForceModel: Send + Sync {
    /// Compute acceleration contribution at a position and velocity
    ///
    /// # Arguments
    ///
    /// * `position` - Body position (simulation units)
    /// * `velocity` - Body velocity (units/s)
    ///
    /// # Returns
    ///
    /// Acceleration in units/s²
    fn acceleration(&self, position: &Vector3<f64>, velocity: &Vector3<f64>) -> Vector3<f64>;

    /// Force model name for debugging and logging
    fn name(&self) -> &'static str;

    /// Whether this force model is currently enabled
    ///
    /// Disabled models are skipped during acceleration computation.
    fn enabled(&self) -> bool {
        true
    }
}

/// Gravity, thrust and drag for one body over one frame
pub struct CompositeForce<'a> {
    gravity: AttractorGravity<'a>,
    thrust: ConstantThrust,
    drag: Option<AtmosphericDrag<'a>>,
}

impl<'a> CompositeForce<'a> {
    /// Assemble the forces acting on a body
    ///
    /// Drag is only included when the snapshot names an atmosphere-bearing
    /// attractor and drag is enabled in `config`.
    pub fn for_body(
        config: &PropagatorConfig,
        snapshot: &'a AttractorSnapshot,
        params: &BodyParams,
        thrust_acceleration: Vector3<f64>,
        atmosphere: &'a dyn AtmosphereModel,
    ) -> Self {
        let drag = match snapshot.atmosphere_reference() {
            Some(reference) if config.drag.enabled => Some(AtmosphericDrag::new(
                reference,
                atmosphere,
                &config.drag,
                params,
            )),
            _ => None,
        };

        Self {
            gravity: AttractorGravity::new(snapshot.attractors(), &config.gravity),
            thrust: ConstantThrust::new(thrust_acceleration),
            drag,
        }
    }

    /// List all active force model names
    pub fn model_names(&self) -> Vec<&'static str> {
        self.models()
            .filter(|f| f.enabled())
            .map(|f| f.name())
            .collect()
    }

    /// Compute acceleration with individual contributions for debugging
    pub fn acceleration_breakdown(
        &self,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
    ) -> Vec<(&'static str, Vector3<f64>)> {
        self.models()
            .filter(|f| f.enabled())
            .map(|f| (f.name(), f.acceleration(position, velocity)))
            .collect()
    }

    fn models(&self) -> impl Iterator<Item = &dyn ForceModel> {
        [
            Some(&self.gravity as &dyn ForceModel),
            Some(&self.thrust as &dyn ForceModel),
            self.drag.as_ref().map(|d| d as &dyn ForceModel),
        ]
        .into_iter()
        .flatten()
    }
}

impl ForceModel for CompositeForce<'_> {
    fn acceleration(&self, position: &Vector3<f64>, velocity: &Vector3<f64>) -> Vector3<f64> {
        let mut accel = self.gravity.acceleration(position, velocity);
        accel += self.thrust.acceleration(position, velocity);

        if let Some(drag) = &self.drag {
            accel += drag.acceleration(position, velocity);
        }

        accel
    }

    fn name(&self) -> &'static str {
        "Composite"
    }
}
