//! Numerical integrators for orbit propagation
//!
//! This module provides a trait-based abstraction for fixed-step numerical
//! integration, so the substep scheduler can drive any stepper.
//!
//! # Available Integrators
//!
//! - **DormandPrince54**: 7-stage Dormand-Prince 5(4) with embedded error
//!   estimate (default)
//! - **NativeRK4**: classic 4-stage Runge-Kutta
//!
//! Step size is never adapted; the embedded estimate is reported only.

use nalgebra::Vector3;

use super::state::BodyState;

/// Derivative function: state -> (d position/dt, d velocity/dt)
pub type Derivatives<'a> = dyn Fn(&BodyState) -> (Vector3<f64>, Vector3<f64>) + 'a;

/// Local error estimate of one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepError {
    /// Position error (simulation units)
    pub position: Vector3<f64>,

    /// Velocity error (units/s)
    pub velocity: Vector3<f64>,
}

impl StepError {
    /// Largest of the position and velocity error norms
    pub fn magnitude(&self) -> f64 {
        self.position.norm().max(self.velocity.norm())
    }
}

/// Result of a single integration step
#[derive(Debug, Clone, Copy)]
pub struct StepResult {
    /// New state after the step
    pub state: BodyState,

    /// Estimated local truncation error (if available)
    pub error_estimate: Option<StepError>,
}

/// Trait for numerical integrators
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow parallel propagation
/// of multiple bodies.
pub trait Integrator: Send + Sync {
    /// Take a single fixed step
    fn step(&self, state: &BodyState, dt: f64, derivatives: &Derivatives<'_>) -> BodyState;

    /// Take a single fixed step and report the local error estimate
    ///
    /// Integrators without an embedded estimate return `None`.
    fn step_with_error(
        &self,
        state: &BodyState,
        dt: f64,
        derivatives: &Derivatives<'_>,
    ) -> StepResult {
        StepResult {
            state: self.step(state, dt, derivatives),
            error_estimate: None,
        }
    }

    /// Integrator name
    fn name(&self) -> &'static str;

    /// Integrator order
    fn order(&self) -> u8;

    /// Number of function evaluations per step
    fn stages(&self) -> usize;
}

/// Dormand-Prince 5(4) Butcher tableau
pub mod tableau {
    pub const STAGES: usize = 7;

    /// Stage nodes c[i]
    pub const C: [f64; STAGES] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];

    /// Stage coefficients a[i][j], j < i
    pub const A: [[f64; STAGES - 1]; STAGES] = [
        [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0],
        [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0],
        [
            19372.0 / 6561.0,
            -25360.0 / 2187.0,
            64448.0 / 6561.0,
            -212.0 / 729.0,
            0.0,
            0.0,
        ],
        [
            9017.0 / 3168.0,
            -355.0 / 33.0,
            46732.0 / 5247.0,
            49.0 / 176.0,
            -5103.0 / 18656.0,
            0.0,
        ],
        [
            35.0 / 384.0,
            0.0,
            500.0 / 1113.0,
            125.0 / 192.0,
            -2187.0 / 6784.0,
            11.0 / 84.0,
        ],
    ];

    /// 5th-order weights
    pub const B5: [f64; STAGES] = [
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
        0.0,
    ];

    /// Embedded 4th-order weights
    pub const B4: [f64; STAGES] = [
        5179.0 / 57600.0,
        0.0,
        7571.0 / 16695.0,
        393.0 / 640.0,
        -92097.0 / 339200.0,
        187.0 / 2100.0,
        1.0 / 40.0,
    ];
}

use tableau::{A, B4, B5, STAGES};

/// Stage derivatives of one Dormand-Prince step
struct Stages {
    /// Position derivatives
    kx: [Vector3<f64>; STAGES],
    /// Velocity derivatives
    kv: [Vector3<f64>; STAGES],
}

/// Fixed-step Dormand-Prince 5(4) integrator
#[derive(Debug, Clone, Copy, Default)]
pub struct DormandPrince54;

impl DormandPrince54 {
    pub fn new() -> Self {
        Self
    }

    fn evaluate_stages(
        &self,
        state: &BodyState,
        dt: f64,
        derivatives: &Derivatives<'_>,
    ) -> Stages {
        let mut kx = [Vector3::zeros(); STAGES];
        let mut kv = [Vector3::zeros(); STAGES];

        let (dx, dv) = derivatives(state);
        kx[0] = dx;
        kv[0] = dv;

        for i in 1..STAGES {
            let mut pos = state.position;
            let mut vel = state.velocity;
            for j in 0..i {
                let h = dt * A[i][j];
                pos += kx[j] * h;
                vel += kv[j] * h;
            }

            let (dx, dv) = derivatives(&BodyState::new(pos, vel));
            kx[i] = dx;
            kv[i] = dv;
        }

        Stages { kx, kv }
    }

    fn combine(state: &BodyState, dt: f64, stages: &Stages, weights: &[f64; STAGES]) -> BodyState {
        let mut pos = state.position;
        let mut vel = state.velocity;
        for i in 0..STAGES {
            let h = dt * weights[i];
            pos += stages.kx[i] * h;
            vel += stages.kv[i] * h;
        }
        BodyState::new(pos, vel)
    }

    fn error_estimate(dt: f64, stages: &Stages) -> StepError {
        let mut position = Vector3::zeros();
        let mut velocity = Vector3::zeros();
        for i in 0..STAGES {
            let h = dt * (B5[i] - B4[i]);
            position += stages.kx[i] * h;
            velocity += stages.kv[i] * h;
        }
        StepError { position, velocity }
    }
}

impl Integrator for DormandPrince54 {
    fn step(&self, state: &BodyState, dt: f64, derivatives: &Derivatives<'_>) -> BodyState {
        let stages = self.evaluate_stages(state, dt, derivatives);
        Self::combine(state, dt, &stages, &B5)
    }

    fn step_with_error(
        &self,
        state: &BodyState,
        dt: f64,
        derivatives: &Derivatives<'_>,
    ) -> StepResult {
        let stages = self.evaluate_stages(state, dt, derivatives);
        StepResult {
            state: Self::combine(state, dt, &stages, &B5),
            error_estimate: Some(Self::error_estimate(dt, &stages)),
        }
    }

    fn name(&self) -> &'static str {
        "Dormand-Prince 5(4)"
    }

    fn order(&self) -> u8 {
        5
    }

    fn stages(&self) -> usize {
        STAGES
    }
}

/// Classic fixed-step Runge-Kutta 4 integrator
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRK4;

impl NativeRK4 {
    pub fn new() -> Self {
        Self
    }
}

impl Integrator for NativeRK4 {
    fn step(&self, state: &BodyState, dt: f64, derivatives: &Derivatives<'_>) -> BodyState {
        let (v1, a1) = derivatives(state);

        let s2 = BodyState::new(
            state.position + v1 * (dt / 2.0),
            state.velocity + a1 * (dt / 2.0),
        );
        let (v2, a2) = derivatives(&s2);

        let s3 = BodyState::new(
            state.position + v2 * (dt / 2.0),
            state.velocity + a2 * (dt / 2.0),
        );
        let (v3, a3) = derivatives(&s3);

        let s4 = BodyState::new(state.position + v3 * dt, state.velocity + a3 * dt);
        let (v4, a4) = derivatives(&s4);

        let new_pos = state.position + (v1 + 2.0 * v2 + 2.0 * v3 + v4) * (dt / 6.0);
        let new_vel = state.velocity + (a1 + 2.0 * a2 + 2.0 * a3 + a4) * (dt / 6.0);

        BodyState::new(new_pos, new_vel)
    }

    fn name(&self) -> &'static str {
        "Native RK4"
    }

    fn order(&self) -> u8 {
        4
    }

    fn stages(&self) -> usize {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::tableau::C;
    use super::*;
    use crate::propagation::state::{circular_orbit, Attractor, EARTH_MASS_KG};
    use approx::assert_relative_eq;

    /// Unit harmonic oscillator along x: x'' = -x
    fn oscillator(s: &BodyState) -> (Vector3<f64>, Vector3<f64>) {
        (s.velocity, -s.position)
    }

    fn oscillator_error(integrator: &dyn Integrator, dt: f64) -> f64 {
        let mut state = BodyState::new(Vector3::new(1.0, 0.0, 0.0), Vector3::zeros());
        let steps = (1.0 / dt).round() as usize;
        for _ in 0..steps {
            state = integrator.step(&state, dt, &oscillator);
        }
        (state.position.x - 1.0_f64.cos()).abs()
    }

    #[test]
    fn test_tableau_row_sums_match_nodes() {
        for i in 0..STAGES {
            let sum: f64 = A[i].iter().sum();
            assert_relative_eq!(sum, C[i], epsilon = 1e-14);
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert_relative_eq!(B5.iter().sum::<f64>(), 1.0, epsilon = 1e-14);
        assert_relative_eq!(B4.iter().sum::<f64>(), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_last_stage_is_fifth_order_solution() {
        for j in 0..STAGES - 1 {
            assert_eq!(A[STAGES - 1][j], B5[j]);
        }
    }

    #[test]
    fn test_order_conditions() {
        // Σ b c^(k-1) = 1/k for k = 1..5
        for k in 1..=5 {
            let sum: f64 = (0..STAGES).map(|i| B5[i] * C[i].powi(k - 1)).sum();
            assert_relative_eq!(sum, 1.0 / k as f64, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_constant_acceleration_exact() {
        let g = Vector3::new(0.0, -0.5, 0.25);
        let derivatives = |s: &BodyState| (s.velocity, g);
        let state = BodyState::new(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.1, 0.0, -0.2));

        let dt = 2.0;
        let next = DormandPrince54::new().step(&state, dt, &derivatives);

        let expected_pos = state.position + state.velocity * dt + g * (0.5 * dt * dt);
        let expected_vel = state.velocity + g * dt;
        assert_relative_eq!(next.position, expected_pos, epsilon = 1e-13);
        assert_relative_eq!(next.velocity, expected_vel, epsilon = 1e-13);
    }

    #[test]
    fn test_dopri_fifth_order_convergence() {
        let dopri = DormandPrince54::new();
        let coarse = oscillator_error(&dopri, 0.1);
        let fine = oscillator_error(&dopri, 0.05);

        // Halving dt cuts global error by ~2^5
        let ratio = coarse / fine;
        assert!(ratio > 20.0 && ratio < 45.0, "ratio {}", ratio);
    }

    #[test]
    fn test_rk4_fourth_order_convergence() {
        let rk4 = NativeRK4::new();
        let coarse = oscillator_error(&rk4, 0.1);
        let fine = oscillator_error(&rk4, 0.05);

        // Halving dt cuts global error by ~2^4
        let ratio = coarse / fine;
        assert!(ratio > 12.0 && ratio < 20.0, "ratio {}", ratio);
    }

    #[test]
    fn test_error_estimate_tracks_step_size() {
        let dopri = DormandPrince54::new();
        let state = BodyState::new(Vector3::new(1.0, 0.0, 0.0), Vector3::zeros());

        let big = dopri.step_with_error(&state, 0.2, &oscillator);
        let small = dopri.step_with_error(&state, 0.1, &oscillator);

        let big_err = big.error_estimate.unwrap().magnitude();
        let small_err = small.error_estimate.unwrap().magnitude();
        assert!(big_err > 0.0);
        assert!(small_err < big_err / 10.0);

        // Estimate never changes the propagated state
        assert_eq!(big.state, dopri.step(&state, 0.2, &oscillator));
    }

    #[test]
    fn test_rk4_has_no_error_estimate() {
        let state = BodyState::new(Vector3::new(1.0, 0.0, 0.0), Vector3::zeros());
        let result = NativeRK4::new().step_with_error(&state, 0.1, &oscillator);
        assert!(result.error_estimate.is_none());
    }

    #[test]
    fn test_dopri_circular_orbit_step() {
        let earth = Attractor::new(Vector3::zeros(), EARTH_MASS_KG);
        let mu = earth.mu();
        let state = circular_orbit(&earth, 677.8);
        let r = state.position.norm();
        let v = state.velocity.norm();

        // Simple derivatives: point mass gravity
        let derivatives = |s: &BodyState| {
            let r = s.position.norm();
            (s.velocity, -mu / (r * r * r) * s.position)
        };

        let next = DormandPrince54::new().step(&state, 60.0, &derivatives);

        // Radius and speed should be approximately preserved
        assert!((next.position.norm() - r).abs() / r < 1e-9);
        assert!((next.velocity.norm() - v).abs() / v < 1e-9);
    }
}
