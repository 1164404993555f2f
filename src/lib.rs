//! orbitsim - fixed-step orbit propagation for game-scale simulations
//!
//! The `propagation` module holds the numerical core. `scenario` and
//! `analysis` drive it from JSON files for headless runs.

pub mod analysis;
pub mod propagation;
pub mod scenario;
