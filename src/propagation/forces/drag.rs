//! Atmospheric drag force model
//!
//! Computes acceleration due to atmospheric drag using the formula:
//!
//! a = -½ ρ |v_rel| v_rel (Cd × A / m)
//!
//! where:
//! - ρ is atmospheric density from the configured atmosphere model
//! - v_rel is velocity relative to the co-rotating atmosphere
//! - Cd × A is the drag coefficient times cross-sectional area
//! - m is body mass
//!
//! The whole computation runs in kilometers and km/s, then converts back to
//! simulation units.

use nalgebra::Vector3;

use super::ForceModel;
use crate::propagation::atmosphere::AtmosphereModel;
use crate::propagation::settings::DragConfig;
use crate::propagation::state::{Attractor, BodyParams, KM_PER_UNIT};

/// Drag against the atmosphere of one reference attractor
pub struct AtmosphericDrag<'a> {
    /// Atmosphere-bearing body
    reference: &'a Attractor,

    /// Atmosphere density model
    atmosphere: &'a dyn AtmosphereModel,

    /// Reference surface radius (km)
    reference_radius_km: f64,

    /// Atmosphere angular velocity (rad/s)
    omega: Vector3<f64>,

    /// -½ Cd A / m in km²/kg
    ballistic_factor: f64,

    min_density: f64,

    /// Minimum relative wind speed (km/s)
    min_wind_speed_km_s: f64,
}

impl<'a> AtmosphericDrag<'a> {
    /// Create a drag model for a body with the given parameters
    pub fn new(
        reference: &'a Attractor,
        atmosphere: &'a dyn AtmosphereModel,
        config: &DragConfig,
        params: &BodyParams,
    ) -> Self {
        let ballistic_factor = if params.mass_kg > 0.0 {
            -0.5 * params.drag_coefficient * params.cross_section_km2() / params.mass_kg
        } else {
            0.0
        };

        Self {
            reference,
            atmosphere,
            reference_radius_km: config.reference_radius_km,
            omega: config.angular_velocity(),
            ballistic_factor,
            min_density: config.min_density,
            min_wind_speed_km_s: config.min_wind_speed * KM_PER_UNIT,
        }
    }

    /// Altitude above the reference surface (km), never negative
    pub fn altitude_km(&self, position: &Vector3<f64>) -> f64 {
        let distance_km = ((position - self.reference.position) * KM_PER_UNIT).norm();
        (distance_km - self.reference_radius_km).max(0.0)
    }

    /// Velocity relative to the rotating atmosphere (km/s)
    ///
    /// The atmosphere co-rotates with the reference body, so we subtract
    /// ω × r at the body's position.
    fn relative_velocity_km_s(&self, r_km: &Vector3<f64>, velocity: &Vector3<f64>) -> Vector3<f64> {
        let v_atm = self.omega.cross(r_km);
        velocity * KM_PER_UNIT - v_atm
    }
}

impl ForceModel for AtmosphericDrag<'_> {
    fn acceleration(&self, position: &Vector3<f64>, velocity: &Vector3<f64>) -> Vector3<f64> {
        let r_km = (position - self.reference.position) * KM_PER_UNIT;
        let altitude_km = (r_km.norm() - self.reference_radius_km).max(0.0);

        let rho = self.atmosphere.density(altitude_km);
        if rho < self.min_density {
            return Vector3::zeros();
        }

        let v_rel = self.relative_velocity_km_s(&r_km, velocity);
        let speed = v_rel.norm();
        if speed < self.min_wind_speed_km_s {
            return Vector3::zeros();
        }

        // km/s² -> units/s²
        let accel_km = v_rel * (self.ballistic_factor * rho * speed);
        accel_km / KM_PER_UNIT
    }

    fn name(&self) -> &'static str {
        "Atmospheric Drag"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::atmosphere::{AtmosphereTable, TableAtmosphere};
    use crate::propagation::state::{circular_orbit, EARTH_MASS_KG, EARTH_RADIUS_KM};

    fn earth() -> Attractor {
        Attractor::new(Vector3::zeros(), EARTH_MASS_KG)
    }

    fn params() -> BodyParams {
        // 1 m radius, 100 kg
        BodyParams::from_radius(100.0, 0.0001, 2.2)
    }

    #[test]
    fn test_drag_direction() {
        let atmosphere = TableAtmosphere::standard();
        let reference = earth();
        let drag = AtmosphericDrag::new(&reference, &atmosphere, &DragConfig::default(), &params());

        // Circular orbit in xy plane at 300 km
        let state = circular_orbit(&reference, (EARTH_RADIUS_KM + 300.0) / KM_PER_UNIT);
        let accel = drag.acceleration(&state.position, &state.velocity);

        // Drag should oppose velocity (negative y component)
        assert!(accel.y < 0.0);
        assert!(accel.norm() > 0.0);
        assert_eq!(accel.z, 0.0);
    }

    #[test]
    fn test_drag_above_atmosphere() {
        let atmosphere = TableAtmosphere::standard();
        let reference = earth();
        let drag = AtmosphericDrag::new(&reference, &atmosphere, &DragConfig::default(), &params());

        let state = circular_orbit(&reference, (EARTH_RADIUS_KM + 2000.0) / KM_PER_UNIT);
        let accel = drag.acceleration(&state.position, &state.velocity);
        assert_eq!(accel, Vector3::zeros());
    }

    #[test]
    fn test_drag_zero_below_density_floor() {
        // Densities far below the 1e-12 floor everywhere
        let table = AtmosphereTable::new(vec![0.0, 1000.0], vec![1e-13, 1e-14]).unwrap();
        let atmosphere = TableAtmosphere::new(table, None);
        let reference = earth();
        let drag = AtmosphericDrag::new(&reference, &atmosphere, &DragConfig::default(), &params());

        let state = circular_orbit(&reference, (EARTH_RADIUS_KM + 300.0) / KM_PER_UNIT);
        assert_eq!(
            drag.acceleration(&state.position, &state.velocity),
            Vector3::zeros()
        );
    }

    #[test]
    fn test_drag_zero_when_comoving_with_atmosphere() {
        let atmosphere = TableAtmosphere::standard();
        let reference = earth();
        let config = DragConfig::default();
        let drag = AtmosphericDrag::new(&reference, &atmosphere, &config, &params());

        // Body at 100 km riding along with the atmosphere: v = ω × r
        let position = Vector3::new((EARTH_RADIUS_KM + 100.0) / KM_PER_UNIT, 0.0, 0.0);
        let velocity = config.angular_velocity().cross(&position);

        assert_eq!(drag.acceleration(&position, &velocity), Vector3::zeros());
    }

    #[test]
    fn test_drag_zero_for_slow_wind() {
        let atmosphere = TableAtmosphere::standard();
        let reference = earth();
        let mut config = DragConfig::default();
        config.rotation_rate = 0.0;
        let drag = AtmosphericDrag::new(&reference, &atmosphere, &config, &params());

        // 5e-7 units/s is below the 1e-6 units/s wind floor
        let position = Vector3::new((EARTH_RADIUS_KM + 100.0) / KM_PER_UNIT, 0.0, 0.0);
        let velocity = Vector3::new(0.0, 5e-7, 0.0);

        assert_eq!(drag.acceleration(&position, &velocity), Vector3::zeros());
    }

    #[test]
    fn test_drag_scales_with_density() {
        let atmosphere = TableAtmosphere::standard();
        let reference = earth();
        let drag = AtmosphericDrag::new(&reference, &atmosphere, &DragConfig::default(), &params());

        let low = circular_orbit(&reference, (EARTH_RADIUS_KM + 200.0) / KM_PER_UNIT);
        let high = circular_orbit(&reference, (EARTH_RADIUS_KM + 400.0) / KM_PER_UNIT);

        let accel_low = drag.acceleration(&low.position, &low.velocity);
        let accel_high = drag.acceleration(&high.position, &high.velocity);

        // Denser air lower down produces more drag
        assert!(accel_low.norm() > accel_high.norm());
    }

    #[test]
    fn test_drag_magnitude() {
        let atmosphere = TableAtmosphere::standard();
        let reference = earth();
        let mut config = DragConfig::default();
        config.rotation_rate = 0.0;
        let p = params();
        let drag = AtmosphericDrag::new(&reference, &atmosphere, &config, &p);

        let position = Vector3::new((EARTH_RADIUS_KM + 300.0) / KM_PER_UNIT, 0.0, 0.0);
        let velocity = Vector3::new(0.0, 0.77, 0.0);
        let accel = drag.acceleration(&position, &velocity);

        let rho = atmosphere.density(drag.altitude_km(&position));
        let speed_km_s = 7.7;
        let expected_km =
            0.5 * p.drag_coefficient * p.cross_section_km2() * rho / p.mass_kg * speed_km_s * speed_km_s;

        assert!((accel.norm() * KM_PER_UNIT - expected_km).abs() / expected_km < 1e-12);
    }

    #[test]
    fn test_altitude_clamped_inside_body() {
        let atmosphere = TableAtmosphere::standard();
        let reference = earth();
        let drag = AtmosphericDrag::new(&reference, &atmosphere, &DragConfig::default(), &params());
        assert_eq!(drag.altitude_km(&Vector3::new(1.0, 0.0, 0.0)), 0.0);
    }
}
