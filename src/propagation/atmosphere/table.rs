//! Piecewise-exponential table atmosphere
//!
//! Density between two samples decays exponentially with the segment's own
//! scale height, so every table node is reproduced exactly and the profile
//! stays monotonic between nodes.

use super::standard::{STANDARD_ALTITUDES_KM, STANDARD_DENSITIES_KG_M3};
use super::{AtmosphereModel, LowAltitudeCorrection, KG_M3_TO_KG_KM3};
use crate::propagation::error::AtmosphereError;

/// Validated altitude/density samples
///
/// Altitudes are strictly increasing (km); densities are positive and
/// non-increasing (kg/km³).
#[derive(Debug, Clone, PartialEq)]
pub struct AtmosphereTable {
    altitudes_km: Vec<f64>,
    densities: Vec<f64>,
}

impl AtmosphereTable {
    /// Validate and wrap a table
    pub fn new(altitudes_km: Vec<f64>, densities: Vec<f64>) -> Result<Self, AtmosphereError> {
        if altitudes_km.len() != densities.len() {
            return Err(AtmosphereError::LengthMismatch {
                altitudes: altitudes_km.len(),
                densities: densities.len(),
            });
        }
        if altitudes_km.len() < 2 {
            return Err(AtmosphereError::TooFewSamples(altitudes_km.len()));
        }

        for (i, (alt, rho)) in altitudes_km.iter().zip(&densities).enumerate() {
            if !alt.is_finite() || !rho.is_finite() {
                return Err(AtmosphereError::NonFinite(i));
            }
            if *rho <= 0.0 {
                return Err(AtmosphereError::NonPositiveDensity(i));
            }
        }

        for i in 1..altitudes_km.len() {
            if altitudes_km[i] <= altitudes_km[i - 1] {
                return Err(AtmosphereError::AltitudeNotIncreasing(i));
            }
            if densities[i] > densities[i - 1] {
                return Err(AtmosphereError::DensityIncreasing(i));
            }
        }

        Ok(Self {
            altitudes_km,
            densities,
        })
    }

    /// U.S. Standard Atmosphere 1976, 0-500 km, converted to kg/km³
    pub fn standard() -> Self {
        Self {
            altitudes_km: STANDARD_ALTITUDES_KM.to_vec(),
            densities: STANDARD_DENSITIES_KG_M3
                .iter()
                .map(|rho| rho * KG_M3_TO_KG_KM3)
                .collect(),
        }
    }

    pub fn altitudes_km(&self) -> &[f64] {
        &self.altitudes_km
    }

    pub fn densities(&self) -> &[f64] {
        &self.densities
    }

    pub fn len(&self) -> usize {
        self.altitudes_km.len()
    }

    pub fn is_empty(&self) -> bool {
        self.altitudes_km.is_empty()
    }

    /// Highest tabulated altitude; density is zero at and above it
    pub fn ceiling_km(&self) -> f64 {
        self.altitudes_km[self.altitudes_km.len() - 1]
    }
}

/// Table-interpolated density model
#[derive(Debug, Clone)]
pub struct TableAtmosphere {
    table: AtmosphereTable,

    /// Scale height of segment i, between samples i and i + 1 (km)
    scale_heights_km: Vec<f64>,

    correction: Option<LowAltitudeCorrection>,
}

impl Default for TableAtmosphere {
    fn default() -> Self {
        Self::standard()
    }
}

impl TableAtmosphere {
    /// Precompute segment scale heights for `table`
    pub fn new(table: AtmosphereTable, correction: Option<LowAltitudeCorrection>) -> Self {
        let scale_heights_km = table
            .altitudes_km
            .windows(2)
            .zip(table.densities.windows(2))
            .map(|(alt, rho)| -(alt[1] - alt[0]) / (rho[1] / rho[0]).ln())
            .collect();

        log::debug!(
            "Initialized table atmosphere: {} samples up to {} km",
            table.len(),
            table.ceiling_km()
        );

        Self {
            table,
            scale_heights_km,
            correction,
        }
    }

    /// Standard table with no correction
    pub fn standard() -> Self {
        Self::new(AtmosphereTable::standard(), None)
    }

    pub fn table(&self) -> &AtmosphereTable {
        &self.table
    }

    /// Scale height (km) of each table segment
    pub fn scale_heights_km(&self) -> &[f64] {
        &self.scale_heights_km
    }

    fn uncorrected_density(&self, altitude_km: f64) -> f64 {
        let altitudes = &self.table.altitudes_km;
        let densities = &self.table.densities;

        if altitude_km.is_nan() {
            return 0.0;
        }
        if altitude_km <= altitudes[0] {
            return densities[0];
        }
        if altitude_km >= self.table.ceiling_km() {
            return 0.0;
        }

        // Last sample at or below the query; >= 1 since altitude_km > altitudes[0]
        let i = altitudes.partition_point(|&alt| alt <= altitude_km) - 1;
        let h = self.scale_heights_km[i];

        // Flat segment: infinite scale height
        if !h.is_finite() {
            return densities[i];
        }

        densities[i] * (-(altitude_km - altitudes[i]) / h).exp()
    }
}

impl AtmosphereModel for TableAtmosphere {
    fn density(&self, altitude_km: f64) -> f64 {
        let rho = self.uncorrected_density(altitude_km);
        match &self.correction {
            Some(correction) => rho * correction.factor_at(altitude_km),
            None => rho,
        }
    }

    fn name(&self) -> &'static str {
        "Table"
    }

    fn description(&self) -> &'static str {
        "Piecewise-exponential altitude/density table"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodes_reproduced_exactly() {
        let model = TableAtmosphere::standard();
        let table = model.table().clone();

        for (alt, rho) in table
            .altitudes_km()
            .iter()
            .zip(table.densities())
            .take(table.len() - 1)
        {
            assert_eq!(model.density(*alt), *rho, "node at {} km", alt);
        }
    }

    #[test]
    fn test_density_monotonic() {
        let model = TableAtmosphere::standard();
        let mut previous = model.density(0.0);

        for step in 1..=5000 {
            let alt = step as f64 * 0.1;
            let rho = model.density(alt);
            assert!(rho <= previous, "density increased at {} km", alt);
            assert!(rho >= 0.0);
            previous = rho;
        }
    }

    #[test]
    fn test_vacuum_at_and_above_ceiling() {
        let model = TableAtmosphere::standard();
        assert_eq!(model.density(500.0), 0.0);
        assert_eq!(model.density(500.001), 0.0);
        assert_eq!(model.density(35_786.0), 0.0);
        assert_eq!(model.density(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_clamped_below_table() {
        let model = TableAtmosphere::standard();
        let sea_level = 1.225 * KG_M3_TO_KG_KM3;
        assert_eq!(model.density(-20.0), sea_level);
        assert_eq!(model.density(f64::NEG_INFINITY), sea_level);
    }

    #[test]
    fn test_nan_is_vacuum() {
        let model = TableAtmosphere::standard();
        assert_eq!(model.density(f64::NAN), 0.0);
    }

    #[test]
    fn test_segment_scale_height() {
        let table = AtmosphereTable::new(vec![0.0, 10.0], vec![1.0, (-1.0_f64).exp()]).unwrap();
        let model = TableAtmosphere::new(table, None);

        assert!((model.scale_heights_km()[0] - 10.0).abs() < 1e-12);

        // Halfway through the segment density has fallen by e^-0.5
        let expected = (-0.5_f64).exp();
        assert!((model.density(5.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_flat_segment() {
        let table = AtmosphereTable::new(vec![0.0, 10.0, 20.0], vec![2.0, 2.0, 1.0]).unwrap();
        let model = TableAtmosphere::new(table, None);
        assert_eq!(model.density(5.0), 2.0);
        assert!(model.density(15.0) < 2.0);
    }

    #[test]
    fn test_correction_scales_low_band_only() {
        let correction = LowAltitudeCorrection {
            ceiling_km: 150.0,
            factor: 2.0,
        };
        let plain = TableAtmosphere::standard();
        let corrected = TableAtmosphere::new(AtmosphereTable::standard(), Some(correction));

        assert_eq!(corrected.density(120.0), 2.0 * plain.density(120.0));
        assert_eq!(corrected.density(400.0), plain.density(400.0));
    }

    #[test]
    fn test_table_validation() {
        assert_eq!(
            AtmosphereTable::new(vec![0.0, 10.0], vec![1.0]),
            Err(AtmosphereError::LengthMismatch {
                altitudes: 2,
                densities: 1
            })
        );
        assert_eq!(
            AtmosphereTable::new(vec![0.0], vec![1.0]),
            Err(AtmosphereError::TooFewSamples(1))
        );
        assert_eq!(
            AtmosphereTable::new(vec![0.0, 0.0], vec![1.0, 0.5]),
            Err(AtmosphereError::AltitudeNotIncreasing(1))
        );
        assert_eq!(
            AtmosphereTable::new(vec![0.0, 10.0], vec![1.0, 2.0]),
            Err(AtmosphereError::DensityIncreasing(1))
        );
        assert_eq!(
            AtmosphereTable::new(vec![0.0, 10.0], vec![1.0, 0.0]),
            Err(AtmosphereError::NonPositiveDensity(1))
        );
        assert_eq!(
            AtmosphereTable::new(vec![0.0, f64::NAN], vec![1.0, 0.5]),
            Err(AtmosphereError::NonFinite(1))
        );
    }
}
