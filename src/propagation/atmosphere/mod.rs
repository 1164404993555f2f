//! Atmospheric density models for drag calculations
//!
//! This module provides a trait-based abstraction for atmosphere models so the
//! drag force does not depend on a particular density source.
//!
//! # Implemented Models
//!
//! - **TableAtmosphere**: piecewise-exponential interpolation of an
//!   altitude/density table (0-500 km standard atmosphere by default)
//!
//! Densities are returned in simulation mass-density units (kg/km³) so the
//! drag equation can be evaluated directly in kilometers.

mod standard;
mod table;

pub use standard::{STANDARD_ALTITUDES_KM, STANDARD_DENSITIES_KG_M3};
pub use table::{AtmosphereTable, TableAtmosphere};

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// kg/km³ per kg/m³
pub const KG_M3_TO_KG_KM3: f64 = 1e9;

/// Trait for atmospheric density models
///
/// Implementations must be thread-safe (Send + Sync) so one model can be
/// shared by every body propagated in a tick.
pub trait AtmosphereModel: Send + Sync {
    /// Density in kg/km³ at `altitude_km` above the reference surface.
    ///
    /// Must be total: finite and non-negative for every input.
    fn density(&self, altitude_km: f64) -> f64;

    /// Model name for logging and display
    fn name(&self) -> &'static str;

    /// Brief description of the model
    fn description(&self) -> &'static str {
        "Atmospheric density model"
    }
}

/// Multiplicative density correction applied below a ceiling altitude
///
/// Low-altitude densities have been tuned by hand over time, so the factor is
/// configuration rather than a constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LowAltitudeCorrection {
    /// Correction applies strictly below this altitude (km)
    pub ceiling_km: f64,

    /// Density multiplier
    pub factor: f64,
}

impl LowAltitudeCorrection {
    /// Correction for a density queried at `altitude_km`
    pub fn factor_at(&self, altitude_km: f64) -> f64 {
        if altitude_km < self.ceiling_km {
            self.factor
        } else {
            1.0
        }
    }
}

/// Atmosphere configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmosphereConfig {
    /// Optional low-altitude density correction
    pub low_altitude_correction: Option<LowAltitudeCorrection>,

    /// Custom table altitudes (km); the standard table is used when absent
    pub altitudes_km: Option<Vec<f64>>,

    /// Custom table densities (kg/m³), paired with `altitudes_km`
    pub densities_kg_m3: Option<Vec<f64>>,
}

impl AtmosphereConfig {
    /// Build the table described by this configuration
    pub fn table(&self) -> Result<AtmosphereTable, ConfigError> {
        match (&self.altitudes_km, &self.densities_kg_m3) {
            (Some(altitudes), Some(densities)) => {
                let densities: Vec<f64> =
                    densities.iter().map(|rho| rho * KG_M3_TO_KG_KM3).collect();
                Ok(AtmosphereTable::new(altitudes.clone(), densities)?)
            }
            _ => Ok(AtmosphereTable::standard()),
        }
    }

    /// Build the density model described by this configuration
    pub fn build(&self) -> Result<TableAtmosphere, ConfigError> {
        if let Some(correction) = &self.low_altitude_correction {
            if !(correction.factor.is_finite() && correction.factor > 0.0) {
                return Err(ConfigError::InvalidCorrection(correction.factor));
            }
        }
        Ok(TableAtmosphere::new(self.table()?, self.low_altitude_correction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correction_applies_below_ceiling() {
        let correction = LowAltitudeCorrection {
            ceiling_km: 100.0,
            factor: 1.5,
        };
        assert_eq!(correction.factor_at(50.0), 1.5);
        assert_eq!(correction.factor_at(100.0), 1.0);
        assert_eq!(correction.factor_at(300.0), 1.0);
    }

    #[test]
    fn test_config_rejects_bad_correction() {
        let config = AtmosphereConfig {
            low_altitude_correction: Some(LowAltitudeCorrection {
                ceiling_km: 100.0,
                factor: -1.0,
            }),
            ..Default::default()
        };
        assert!(matches!(
            config.build(),
            Err(ConfigError::InvalidCorrection(_))
        ));
    }

    #[test]
    fn test_custom_table_converts_units() {
        let config = AtmosphereConfig {
            altitudes_km: Some(vec![0.0, 100.0]),
            densities_kg_m3: Some(vec![1.0, 1e-6]),
            ..Default::default()
        };
        let model = config.build().unwrap();
        assert_eq!(model.density(0.0), 1e9);
        assert_eq!(model.density(100.0), 0.0);
    }

    #[test]
    fn test_custom_table_validation_surfaces() {
        let config = AtmosphereConfig {
            altitudes_km: Some(vec![0.0, 100.0, 50.0]),
            densities_kg_m3: Some(vec![1.0, 0.5, 0.1]),
            ..Default::default()
        };
        assert!(matches!(config.build(), Err(ConfigError::Atmosphere(_))));
    }
}
