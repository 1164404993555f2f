//! Constant thrust over a frame
//!
//! The host converts a thrust impulse to an acceleration once per frame; the
//! same vector is applied at every stage of every substep.

use nalgebra::Vector3;

use super::ForceModel;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantThrust {
    acceleration: Vector3<f64>,
}

impl ConstantThrust {
    pub fn new(acceleration: Vector3<f64>) -> Self {
        Self { acceleration }
    }

    pub fn none() -> Self {
        Self::new(Vector3::zeros())
    }
}

impl ForceModel for ConstantThrust {
    fn acceleration(&self, _position: &Vector3<f64>, _velocity: &Vector3<f64>) -> Vector3<f64> {
        self.acceleration
    }

    fn name(&self) -> &'static str {
        "Thrust"
    }

    fn enabled(&self) -> bool {
        self.acceleration != Vector3::zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thrust_independent_of_state() {
        let thrust = ConstantThrust::new(Vector3::new(0.0, 0.0, 3e-6));
        let a1 = thrust.acceleration(&Vector3::new(1.0, 2.0, 3.0), &Vector3::zeros());
        let a2 = thrust.acceleration(&Vector3::new(-500.0, 0.0, 0.0), &Vector3::new(0.7, 0.0, 0.0));
        assert_eq!(a1, a2);
        assert!(thrust.enabled());
        assert!(!ConstantThrust::none().enabled());
    }
}
