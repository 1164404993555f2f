//! JSON scenario files
//!
//! A scenario names one body, the attractors acting on it, and how many
//! frames to run. Everything except `body`, `attractors`, `frame_dt` and
//! `frames` has a default.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::propagation::{
    Attractor, AttractorSnapshot, BodyParams, BodyState, Propagator, PropagatorConfig,
};

fn default_drag_coefficient() -> f64 {
    2.2
}

fn default_sample_every() -> usize {
    1
}

fn zero_vector() -> Vector3<f64> {
    Vector3::zeros()
}

/// Propagated body as written in a scenario file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    /// Position (simulation units)
    pub position: Vector3<f64>,
    /// Velocity (units/s)
    pub velocity: Vector3<f64>,
    /// Mass in kg
    pub mass: f64,
    /// Radius (simulation units), used for the drag cross-section
    #[serde(default)]
    pub radius: f64,
    #[serde(default = "default_drag_coefficient")]
    pub drag_coefficient: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttractorSpec {
    pub position: Vector3<f64>,
    /// Mass in kg
    pub mass: f64,
}

/// A complete headless run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: PropagatorConfig,

    pub body: BodySpec,

    pub attractors: Vec<AttractorSpec>,

    /// Index into `attractors` of the atmosphere-bearing body
    #[serde(default)]
    pub atmosphere_reference: Option<usize>,

    /// Impulse applied every frame (force × dt)
    #[serde(default = "zero_vector")]
    pub thrust_impulse: Vector3<f64>,

    /// Frame length in seconds
    pub frame_dt: f64,

    /// Number of frames to run
    pub frames: usize,

    /// Record every n-th frame
    #[serde(default = "default_sample_every")]
    pub sample_every: usize,
}

impl Scenario {
    /// Load a scenario from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading scenario from {:?}", path);

        let file =
            File::open(path).with_context(|| format!("Failed to open scenario file: {:?}", path))?;
        let reader = BufReader::new(file);

        let scenario: Scenario = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse scenario JSON: {:?}", path))?;
        scenario.validate()?;

        log::info!(
            "Scenario: {} attractors, {} frames of {} s",
            scenario.attractors.len(),
            scenario.frames,
            scenario.frame_dt
        );
        Ok(scenario)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let scenario: Scenario =
            serde_json::from_str(json).with_context(|| "Failed to parse scenario JSON")?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Reject settings that would make the run meaningless
    pub fn validate(&self) -> Result<()> {
        if !(self.frame_dt.is_finite() && self.frame_dt > 0.0) {
            return Err(anyhow!("frame_dt must be > 0, got {}", self.frame_dt));
        }
        if self.sample_every == 0 {
            return Err(anyhow!("sample_every must be > 0"));
        }
        if !self.body.mass.is_finite() {
            return Err(anyhow!("body mass must be finite"));
        }
        self.config.validate().context("Invalid propagator config")?;
        Ok(())
    }

    pub fn propagator(&self) -> Result<Propagator> {
        Propagator::new(self.config.clone()).context("Failed to build propagator")
    }

    pub fn snapshot(&self, propagator: &Propagator) -> Result<AttractorSnapshot> {
        let attractors = self
            .attractors
            .iter()
            .map(|a| Attractor::new(a.position, a.mass))
            .collect();
        propagator
            .snapshot(attractors, self.atmosphere_reference)
            .context("Invalid attractor list")
    }

    pub fn initial_state(&self) -> BodyState {
        BodyState::new(self.body.position, self.body.velocity)
    }

    pub fn body_params(&self) -> BodyParams {
        BodyParams::from_radius(self.body.mass, self.body.radius, self.body.drag_coefficient)
    }

    /// Attractor used for orbit diagnostics
    ///
    /// The atmosphere reference if one is named, otherwise the most massive
    /// attractor.
    pub fn primary_attractor(&self) -> Option<Attractor> {
        let chosen = match self.atmosphere_reference {
            Some(index) => self.attractors.get(index),
            None => self
                .attractors
                .iter()
                .max_by(|a, b| a.mass.total_cmp(&b.mass)),
        };
        chosen.map(|a| Attractor::new(a.position, a.mass))
    }

    /// Run every frame with `propagator`, calling `observer` after each one
    ///
    /// Returns the final state.
    pub fn simulate<F>(&self, propagator: &Propagator, mut observer: F) -> Result<BodyState>
    where
        F: FnMut(usize, &BodyState),
    {
        let snapshot = self.snapshot(propagator)?;
        let params = self.body_params();

        let mut state = self.initial_state();
        for frame in 1..=self.frames {
            state = propagator.propagate(
                &state,
                &params,
                &snapshot,
                self.thrust_impulse,
                self.frame_dt,
            );
            observer(frame, &state);
        }

        Ok(state)
    }
}
