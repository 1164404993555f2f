//! Body, attractor and snapshot representations
//!
//! Provides the state vectors fed through the substep scheduler, plus
//! post-hoc orbit diagnostics used to validate propagated trajectories.
//!
//! All distances are in simulation units (1 unit = 10 km) and all
//! velocities in units per second.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::error::SnapshotError;

// Physical constants

/// Kilometers per simulation distance unit
pub const KM_PER_UNIT: f64 = 10.0;

/// Gravitational constant in simulation units (units³ / (kg s²))
///
/// Must stay consistent with [`KM_PER_UNIT`]: 6.67430e-11 m³/(kg s²) / (1e4 m)³.
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67430e-23;

/// Bodies at or below this mass (kg) are never propagated
pub const MIN_BODY_MASS: f64 = 1e-6;

/// Earth's mass in kilograms
pub const EARTH_MASS_KG: f64 = 5.972e24;

/// Earth's mean radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Earth's rotation rate in rad/s
pub const OMEGA_EARTH: f64 = 7.2921150e-5;

/// Default upper bound on the number of attractors in one snapshot
pub const DEFAULT_MAX_ATTRACTORS: usize = 256;

/// Position and velocity of the propagated body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    /// Position (simulation units)
    pub position: Vector3<f64>,

    /// Velocity (simulation units per second)
    pub velocity: Vector3<f64>,
}

impl BodyState {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        Self { position, velocity }
    }

    /// Get position in kilometers
    pub fn position_km(&self) -> Vector3<f64> {
        self.position * KM_PER_UNIT
    }

    /// Get velocity in km/s
    pub fn velocity_km_s(&self) -> Vector3<f64> {
        self.velocity * KM_PER_UNIT
    }

    /// Whether every component is finite.
    ///
    /// The propagator never checks its own output; hosts call this once per
    /// tick to catch degenerate inputs.
    pub fn is_finite(&self) -> bool {
        self.position.iter().chain(self.velocity.iter()).all(|c| c.is_finite())
    }
}

/// Physical properties of the propagated body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyParams {
    /// Mass in kilograms
    pub mass_kg: f64,

    /// Cross-sectional area (simulation units²)
    pub cross_section: f64,

    /// Drag coefficient (dimensionless)
    ///
    /// Cd ≈ 2.0-2.5 for most satellites.
    pub drag_coefficient: f64,
}

impl BodyParams {
    pub fn new(mass_kg: f64, cross_section: f64, drag_coefficient: f64) -> Self {
        Self {
            mass_kg,
            cross_section,
            drag_coefficient,
        }
    }

    /// Create from a body radius in simulation units, using A = πr²
    pub fn from_radius(mass_kg: f64, radius: f64, drag_coefficient: f64) -> Self {
        Self::new(
            mass_kg,
            std::f64::consts::PI * radius * radius,
            drag_coefficient,
        )
    }

    /// Whether the body is at or below the `min_mass` propagation threshold
    pub fn is_massless(&self, min_mass: f64) -> bool {
        self.mass_kg <= min_mass
    }

    /// Cross-sectional area in km²
    pub fn cross_section_km2(&self) -> f64 {
        self.cross_section * KM_PER_UNIT * KM_PER_UNIT
    }

    /// Convert a thrust impulse (force × dt) to a constant acceleration
    ///
    /// Bodies at or below `min_mass` get none.
    pub fn thrust_acceleration(&self, impulse: &Vector3<f64>, min_mass: f64) -> Vector3<f64> {
        if self.is_massless(min_mass) {
            return Vector3::zeros();
        }
        impulse / self.mass_kg
    }
}

/// A body whose gravity acts on the propagated body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attractor {
    /// Position (simulation units)
    pub position: Vector3<f64>,

    /// Mass in kilograms
    pub mass_kg: f64,
}

impl Attractor {
    pub fn new(position: Vector3<f64>, mass_kg: f64) -> Self {
        Self { position, mass_kg }
    }

    /// Gravitational parameter G·M in units³/s²
    pub fn mu(&self) -> f64 {
        GRAVITATIONAL_CONSTANT * self.mass_kg
    }
}

/// Attractor positions frozen for one frame
///
/// Every substep of a frame sees the same attractor positions. The
/// atmosphere-bearing body is named explicitly rather than implied by list
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct AttractorSnapshot {
    attractors: Vec<Attractor>,
    atmosphere_reference: Option<usize>,
}

impl AttractorSnapshot {
    /// Build a snapshot with at most [`DEFAULT_MAX_ATTRACTORS`] attractors
    pub fn new(
        attractors: Vec<Attractor>,
        atmosphere_reference: Option<usize>,
    ) -> Result<Self, SnapshotError> {
        Self::with_limit(attractors, atmosphere_reference, DEFAULT_MAX_ATTRACTORS)
    }

    /// Build a snapshot against an explicit attractor limit
    pub fn with_limit(
        attractors: Vec<Attractor>,
        atmosphere_reference: Option<usize>,
        max_attractors: usize,
    ) -> Result<Self, SnapshotError> {
        if attractors.len() > max_attractors {
            return Err(SnapshotError::TooManyAttractors {
                count: attractors.len(),
                max: max_attractors,
            });
        }

        if let Some(index) = atmosphere_reference {
            if index >= attractors.len() {
                return Err(SnapshotError::ReferenceOutOfRange {
                    index,
                    count: attractors.len(),
                });
            }
        }

        Ok(Self {
            attractors,
            atmosphere_reference,
        })
    }

    /// A single attractor that also carries the atmosphere
    pub fn central_body(attractor: Attractor) -> Self {
        Self {
            attractors: vec![attractor],
            atmosphere_reference: Some(0),
        }
    }

    /// Snapshot with no gravity sources
    pub fn empty() -> Self {
        Self {
            attractors: Vec::new(),
            atmosphere_reference: None,
        }
    }

    pub fn attractors(&self) -> &[Attractor] {
        &self.attractors
    }

    pub fn len(&self) -> usize {
        self.attractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attractors.is_empty()
    }

    /// Index of the atmosphere-bearing attractor, if any
    pub fn atmosphere_reference_index(&self) -> Option<usize> {
        self.atmosphere_reference
    }

    /// The atmosphere-bearing attractor, if any
    pub fn atmosphere_reference(&self) -> Option<&Attractor> {
        self.atmosphere_reference
            .and_then(|index| self.attractors.get(index))
    }
}

/// Osculating two-body quantities of a state relative to one attractor
///
/// These are derived after the fact for validation and reporting; the
/// propagator itself never uses them.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OrbitDiagnostics {
    /// Distance from the attractor (simulation units)
    pub radius: f64,

    /// Speed relative to the attractor (units/s)
    pub speed: f64,

    /// Specific orbital energy (units²/s²)
    pub specific_energy: f64,

    /// Specific angular momentum vector (units²/s)
    pub angular_momentum: Vector3<f64>,

    /// Eccentricity (dimensionless)
    pub eccentricity: f64,

    /// Semi-major axis (simulation units, negative for hyperbolic)
    pub semi_major_axis: f64,
}

impl OrbitDiagnostics {
    /// Compute diagnostics of `state` around a stationary `attractor`
    pub fn relative_to(state: &BodyState, attractor: &Attractor) -> Self {
        let mu = attractor.mu();
        let r = state.position - attractor.position;
        let v = state.velocity;
        let radius = r.norm();
        let speed = v.norm();

        let specific_energy = 0.5 * speed * speed - mu / radius;
        let angular_momentum = r.cross(&v);

        // e = (v × h)/μ - r̂
        let e_vec = v.cross(&angular_momentum) / mu - r / radius;

        Self {
            radius,
            speed,
            specific_energy,
            angular_momentum,
            eccentricity: e_vec.norm(),
            semi_major_axis: -mu / (2.0 * specific_energy),
        }
    }

    /// Periapsis radius a(1 - e)
    pub fn periapsis(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity)
    }

    /// Apoapsis radius a(1 + e)
    pub fn apoapsis(&self) -> f64 {
        self.semi_major_axis * (1.0 + self.eccentricity)
    }

    /// Orbital period in seconds (only valid for elliptical orbits)
    pub fn period(&self, attractor: &Attractor) -> Option<f64> {
        let a = self.semi_major_axis;
        if a > 0.0 {
            Some(2.0 * std::f64::consts::PI * (a.powi(3) / attractor.mu()).sqrt())
        } else {
            None // Hyperbolic or parabolic
        }
    }
}

/// Circular-orbit state around an attractor at `radius` in its XY plane
pub fn circular_orbit(attractor: &Attractor, radius: f64) -> BodyState {
    let v = (attractor.mu() / radius).sqrt();
    BodyState::new(
        attractor.position + Vector3::new(radius, 0.0, 0.0),
        Vector3::new(0.0, v, 0.0),
    )
}
