//! Substep-scheduled orbit propagator
//!
//! Splits each caller frame into uniform substeps no longer than
//! `max_substep_dt` and drives the integrator through them against one
//! frozen attractor snapshot.

use std::sync::Arc;

use nalgebra::Vector3;
use rayon::prelude::*;

use super::atmosphere::AtmosphereModel;
use super::error::{ConfigError, SnapshotError};
use super::forces::{CompositeForce, ForceModel};
use super::integrator::Integrator;
use super::settings::PropagatorConfig;
use super::state::{Attractor, AttractorSnapshot, BodyParams, BodyState};

/// Result of propagating one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameResult {
    /// State at the end of the frame
    pub state: BodyState,

    /// Number of integrator steps taken
    pub substeps: usize,

    /// Length of each substep in seconds
    pub substep_dt: f64,

    /// Largest embedded error estimate over the substeps (if requested)
    pub max_error: Option<f64>,
}

/// One body propagated by [`Propagator::propagate_bodies`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyInput {
    pub state: BodyState,
    pub params: BodyParams,

    /// Thrust impulse for this frame (force × dt)
    pub thrust_impulse: Vector3<f64>,
}

/// Fixed-step propagator
///
/// Holds no per-body state: identical inputs always produce identical
/// outputs.
pub struct Propagator {
    /// Numerical integrator
    integrator: Box<dyn Integrator>,

    /// Shared density model
    atmosphere: Arc<dyn AtmosphereModel>,

    config: PropagatorConfig,
}

impl Propagator {
    /// Create a propagator from configuration
    ///
    /// Builds the atmosphere model and integrator the configuration names.
    pub fn new(config: PropagatorConfig) -> Result<Self, ConfigError> {
        let atmosphere = Arc::new(config.drag.atmosphere.build()?);
        let integrator = config.integrator.create();
        Self::with_parts(integrator, atmosphere, config)
    }

    /// Create with an explicit integrator and atmosphere model
    pub fn with_parts(
        integrator: Box<dyn Integrator>,
        atmosphere: Arc<dyn AtmosphereModel>,
        config: PropagatorConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        log::debug!(
            "Propagator: {} with {} atmosphere ({}), max substep {} s",
            integrator.name(),
            atmosphere.name(),
            atmosphere.description(),
            config.max_substep_dt
        );

        Ok(Self {
            integrator,
            atmosphere,
            config,
        })
    }

    /// Get configuration reference
    pub fn config(&self) -> &PropagatorConfig {
        &self.config
    }

    pub fn integrator(&self) -> &dyn Integrator {
        self.integrator.as_ref()
    }

    pub fn atmosphere(&self) -> &dyn AtmosphereModel {
        self.atmosphere.as_ref()
    }

    /// Build a snapshot checked against this propagator's attractor limit
    pub fn snapshot(
        &self,
        attractors: Vec<Attractor>,
        atmosphere_reference: Option<usize>,
    ) -> Result<AttractorSnapshot, SnapshotError> {
        AttractorSnapshot::with_limit(
            attractors,
            atmosphere_reference,
            self.config.max_attractors,
        )
    }

    /// Substep count and length for a frame
    ///
    /// `N = ceil(frame_dt / max_substep_dt)` uniform substeps of
    /// `frame_dt / N`. Non-positive or non-finite frames take no steps.
    pub fn substep_plan(&self, frame_dt: f64) -> (usize, f64) {
        if !(frame_dt.is_finite() && frame_dt > 0.0) {
            return (0, 0.0);
        }
        let n = (frame_dt / self.config.max_substep_dt).ceil() as usize;
        (n, frame_dt / n as f64)
    }

    /// Advance a body by one frame
    pub fn propagate(
        &self,
        state: &BodyState,
        params: &BodyParams,
        snapshot: &AttractorSnapshot,
        thrust_impulse: Vector3<f64>,
        frame_dt: f64,
    ) -> BodyState {
        self.propagate_detailed(state, params, snapshot, thrust_impulse, frame_dt)
            .state
    }

    /// Advance a body by one frame, reporting substep details
    pub fn propagate_detailed(
        &self,
        state: &BodyState,
        params: &BodyParams,
        snapshot: &AttractorSnapshot,
        thrust_impulse: Vector3<f64>,
        frame_dt: f64,
    ) -> FrameResult {
        let (substeps, substep_dt) = self.substep_plan(frame_dt);

        if params.is_massless(self.config.min_mass) || substeps == 0 {
            return FrameResult {
                state: *state,
                substeps: 0,
                substep_dt: 0.0,
                max_error: None,
            };
        }

        let thrust = params.thrust_acceleration(&thrust_impulse, self.config.min_mass);
        let forces = CompositeForce::for_body(
            &self.config,
            snapshot,
            params,
            thrust,
            self.atmosphere.as_ref(),
        );
        let derivatives = |s: &BodyState| (s.velocity, forces.acceleration(&s.position, &s.velocity));

        let mut current = *state;
        let mut max_error: Option<f64> = None;

        for _ in 0..substeps {
            if self.config.estimate_error {
                let result = self
                    .integrator
                    .step_with_error(&current, substep_dt, &derivatives);
                current = result.state;

                if let Some(error) = result.error_estimate {
                    let magnitude = error.magnitude();
                    max_error = Some(max_error.map_or(magnitude, |m| m.max(magnitude)));
                }
            } else {
                current = self.integrator.step(&current, substep_dt, &derivatives);
            }
        }

        FrameResult {
            state: current,
            substeps,
            substep_dt,
            max_error,
        }
    }

    /// Propagate for `duration` seconds in frames of `frame_dt`
    ///
    /// Runs whole frames, then one shorter frame for any remainder. The
    /// snapshot and thrust are held fixed throughout.
    pub fn propagate_duration(
        &self,
        state: &BodyState,
        params: &BodyParams,
        snapshot: &AttractorSnapshot,
        thrust_impulse: Vector3<f64>,
        duration: f64,
        frame_dt: f64,
    ) -> BodyState {
        if !(duration > 0.0 && frame_dt > 0.0) {
            return *state;
        }

        let whole_frames = (duration / frame_dt).floor() as usize;
        let remainder = duration - whole_frames as f64 * frame_dt;

        let mut current = *state;
        for _ in 0..whole_frames {
            current = self.propagate(&current, params, snapshot, thrust_impulse, frame_dt);
        }
        if remainder > 0.0 {
            current = self.propagate(&current, params, snapshot, thrust_impulse, remainder);
        }

        current
    }

    /// Advance many independent bodies by one frame in parallel
    ///
    /// Every body sees the same snapshot, captured before any of them moves.
    pub fn propagate_bodies(
        &self,
        bodies: &mut [BodyInput],
        snapshot: &AttractorSnapshot,
        frame_dt: f64,
    ) {
        bodies.par_iter_mut().for_each(|body| {
            body.state = self.propagate(
                &body.state,
                &body.params,
                snapshot,
                body.thrust_impulse,
                frame_dt,
            );
        });
    }
}
