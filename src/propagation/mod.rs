//! Orbital propagation module
//!
//! Advances a single body through one rendering frame under gravity from a
//! frozen set of attractors, constant thrust, and drag against a co-rotating
//! table atmosphere. The frame is split into uniform substeps and each one is
//! taken with a fixed-step Dormand-Prince 5(4) integrator.
//!
//! # Example
//!
//! ```ignore
//! use orbitsim::propagation::*;
//!
//! let propagator = Propagator::new(PropagatorConfig::default())?;
//! let earth = Attractor::new(Vector3::zeros(), EARTH_MASS_KG);
//! let snapshot = AttractorSnapshot::central_body(earth);
//!
//! let state = circular_orbit(&earth, 677.8);
//! let params = BodyParams::from_radius(420_000.0, 0.005, 2.2);
//! let next = propagator.propagate(&state, &params, &snapshot, Vector3::zeros(), 1.0 / 60.0);
//! ```

pub mod atmosphere;
pub mod error;
pub mod forces;
pub mod integrator;
mod propagator;
pub mod settings;
pub mod state;

pub use atmosphere::{AtmosphereConfig, AtmosphereModel, LowAltitudeCorrection, TableAtmosphere};
pub use error::{AtmosphereError, ConfigError, SnapshotError};
pub use forces::{CompositeForce, ForceModel};
pub use integrator::{DormandPrince54, Integrator, NativeRK4};
pub use propagator::*;
pub use settings::{DragConfig, GravityConfig, IntegratorType, PropagatorConfig};
pub use state::*;
