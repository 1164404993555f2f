//! Configuration for propagation
//!
//! Every struct deserializes with `#[serde(default)]`, so a scenario file only
//! needs to name the values it changes.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::atmosphere::AtmosphereConfig;
use super::error::ConfigError;
use super::integrator::{DormandPrince54, Integrator, NativeRK4};
use super::state::{DEFAULT_MAX_ATTRACTORS, EARTH_RADIUS_KM, MIN_BODY_MASS, OMEGA_EARTH};

/// Stepper selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorType {
    /// Dormand-Prince 5(4), 7 stages (default)
    #[default]
    DormandPrince54,
    /// Classic RK4, 4 stages
    Rk4,
}

impl IntegratorType {
    /// Display name for the integrator
    pub fn name(&self) -> &'static str {
        match self {
            Self::DormandPrince54 => "Dormand-Prince 5(4)",
            Self::Rk4 => "Native RK4",
        }
    }

    /// Create a boxed integrator instance
    pub fn create(&self) -> Box<dyn Integrator> {
        match self {
            Self::DormandPrince54 => Box::new(DormandPrince54::new()),
            Self::Rk4 => Box::new(NativeRK4::new()),
        }
    }
}

/// Gravity guards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityConfig {
    /// Squared separation below which an attractor is ignored (units²)
    pub min_distance_sq: f64,

    /// Per-attractor acceleration cap (units/s²)
    pub max_force: f64,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            min_distance_sq: 1e-20,
            max_force: 1e8,
        }
    }
}

/// Drag model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Whether drag is computed at all
    pub enabled: bool,

    /// Radius of the atmosphere-bearing body's surface (km)
    pub reference_radius_km: f64,

    /// Atmosphere rotation rate (rad/s)
    pub rotation_rate: f64,

    /// Rotation axis of the atmosphere (normalized on use)
    pub spin_axis: Vector3<f64>,

    /// Densities below this are treated as vacuum (kg/km³)
    pub min_density: f64,

    /// Relative wind speeds below this produce no drag (units/s)
    pub min_wind_speed: f64,

    pub atmosphere: AtmosphereConfig,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reference_radius_km: EARTH_RADIUS_KM,
            rotation_rate: OMEGA_EARTH,
            spin_axis: Vector3::z(),
            min_density: 1e-12,
            min_wind_speed: 1e-6,
            atmosphere: AtmosphereConfig::default(),
        }
    }
}

impl DragConfig {
    /// Angular velocity vector of the atmosphere (rad/s)
    pub fn angular_velocity(&self) -> Vector3<f64> {
        let norm = self.spin_axis.norm();
        if norm > 0.0 {
            self.spin_axis * (self.rotation_rate / norm)
        } else {
            Vector3::zeros()
        }
    }
}

/// Propagator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagatorConfig {
    /// Largest allowed substep (seconds)
    pub max_substep_dt: f64,

    /// Bodies at or below this mass (kg) are left untouched
    pub min_mass: f64,

    /// Upper bound on attractors per snapshot
    pub max_attractors: usize,

    /// Whether to compute the embedded error estimate
    pub estimate_error: bool,

    pub integrator: IntegratorType,

    pub gravity: GravityConfig,

    pub drag: DragConfig,
}

impl Default for PropagatorConfig {
    fn default() -> Self {
        Self {
            max_substep_dt: 0.002,
            min_mass: MIN_BODY_MASS,
            max_attractors: DEFAULT_MAX_ATTRACTORS,
            estimate_error: false,
            integrator: IntegratorType::DormandPrince54,
            gravity: GravityConfig::default(),
            drag: DragConfig::default(),
        }
    }
}

impl PropagatorConfig {
    /// Quick propagation settings (coarser substeps)
    pub fn fast() -> Self {
        Self {
            max_substep_dt: 0.05,
            ..Default::default()
        }
    }

    /// Finer substeps for validation runs
    pub fn high_precision() -> Self {
        Self {
            max_substep_dt: 0.0005,
            ..Default::default()
        }
    }

    /// Gravity-only settings
    pub fn vacuum() -> Self {
        let mut config = Self::default();
        config.drag.enabled = false;
        config
    }

    /// With a different maximum substep
    pub fn with_max_substep(mut self, max_substep_dt: f64) -> Self {
        self.max_substep_dt = max_substep_dt;
        self
    }

    /// With the embedded error estimate enabled
    pub fn with_error_estimate(mut self) -> Self {
        self.estimate_error = true;
        self
    }

    /// Check that every setting is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_substep_dt.is_finite() && self.max_substep_dt > 0.0) {
            return Err(ConfigError::InvalidSubstep(self.max_substep_dt));
        }

        let thresholds = [
            ("min_mass", self.min_mass),
            ("gravity.min_distance_sq", self.gravity.min_distance_sq),
            ("gravity.max_force", self.gravity.max_force),
            ("drag.reference_radius_km", self.drag.reference_radius_km),
            ("drag.min_density", self.drag.min_density),
            ("drag.min_wind_speed", self.drag.min_wind_speed),
        ];
        for (name, value) in thresholds {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }

        if !self.drag.rotation_rate.is_finite() {
            return Err(ConfigError::InvalidThreshold {
                name: "drag.rotation_rate",
                value: self.drag.rotation_rate,
            });
        }

        let axis = self.drag.spin_axis;
        if !axis.iter().all(|c| c.is_finite()) || axis.norm_squared() == 0.0 {
            return Err(ConfigError::InvalidSpinAxis);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PropagatorConfig::default().validate().is_ok());
        assert!(PropagatorConfig::fast().validate().is_ok());
        assert!(PropagatorConfig::vacuum().validate().is_ok());
        assert!(PropagatorConfig::high_precision().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_substep() {
        let config = PropagatorConfig::default().with_max_substep(0.0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidSubstep(0.0)));

        let config = PropagatorConfig::default().with_max_substep(f64::INFINITY);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_threshold() {
        let mut config = PropagatorConfig::default();
        config.gravity.max_force = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThreshold {
                name: "gravity.max_force",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_zero_spin_axis() {
        let mut config = PropagatorConfig::default();
        config.drag.spin_axis = Vector3::zeros();
        assert_eq!(config.validate(), Err(ConfigError::InvalidSpinAxis));
    }

    #[test]
    fn test_angular_velocity_normalizes_axis() {
        let mut config = DragConfig::default();
        config.spin_axis = Vector3::new(0.0, 2.0, 0.0);
        let omega = config.angular_velocity();
        assert_eq!(omega, Vector3::new(0.0, OMEGA_EARTH, 0.0));
    }

    #[test]
    fn test_partial_config_from_json() {
        let config: PropagatorConfig = serde_json::from_str(
            r#"{ "max_substep_dt": 0.01, "integrator": "rk4", "drag": { "enabled": false } }"#,
        )
        .unwrap();

        assert_eq!(config.max_substep_dt, 0.01);
        assert_eq!(config.integrator, IntegratorType::Rk4);
        assert!(!config.drag.enabled);
        assert_eq!(config.drag.reference_radius_km, EARTH_RADIUS_KM);
        assert_eq!(config.gravity, GravityConfig::default());
    }
}
