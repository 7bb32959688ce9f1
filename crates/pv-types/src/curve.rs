// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — Curve
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{PvError, PvResult};
use serde::{Deserialize, Serialize};

/// One (V, I) sample of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub voltage: f64, // V
    pub current: f64, // A
}

impl CurvePoint {
    pub fn new(voltage: f64, current: f64) -> Self {
        CurvePoint { voltage, current }
    }

    pub fn power(&self) -> f64 {
        self.voltage * self.current
    }

    pub fn is_finite(&self) -> bool {
        self.voltage.is_finite() && self.current.is_finite()
    }
}

/// Direction the electronic load swept the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepDirection {
    /// Isc → Voc (voltage rising).
    #[default]
    Forward,
    /// Voc → Isc (voltage falling).
    Reverse,
}

/// A measured I-V sweep with its ambient metadata.
///
/// Points are kept in acquisition order; sorting happens in the
/// preprocessor. Power is derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IVCurve {
    pub points: Vec<CurvePoint>,
    /// Plane-of-array irradiance (W/m²)
    pub irradiance: f64,
    /// Module temperature (°C)
    pub temperature_c: f64,
    #[serde(default)]
    pub sweep_direction: SweepDirection,
}

impl IVCurve {
    /// Build a curve, rejecting empty input and non-finite samples.
    pub fn new(points: Vec<CurvePoint>, irradiance: f64, temperature_c: f64) -> PvResult<Self> {
        if points.is_empty() {
            return Err(PvError::EmptyCurve);
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(PvError::NonFiniteData { index });
        }
        Ok(IVCurve {
            points,
            irradiance,
            temperature_c,
            sweep_direction: SweepDirection::Forward,
        })
    }

    /// Pair two equal-length arrays into a curve.
    pub fn from_arrays(
        voltage: &[f64],
        current: &[f64],
        irradiance: f64,
        temperature_c: f64,
    ) -> PvResult<Self> {
        if voltage.len() != current.len() {
            return Err(PvError::LengthMismatch {
                voltage: voltage.len(),
                current: current.len(),
            });
        }
        let points = voltage
            .iter()
            .zip(current.iter())
            .map(|(&v, &i)| CurvePoint::new(v, i))
            .collect();
        Self::new(points, irradiance, temperature_c)
    }

    pub fn with_sweep_direction(mut self, direction: SweepDirection) -> Self {
        self.sweep_direction = direction;
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn voltages(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.voltage).collect()
    }

    pub fn currents(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.current).collect()
    }

    /// V·I per point, acquisition order.
    pub fn power(&self) -> Vec<f64> {
        self.points.iter().map(CurvePoint::power).collect()
    }
}

/// Temperature coefficients, relative per °C (e.g. β = -0.003 for -0.3 %/°C).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectionCoefficients {
    pub alpha_isc: f64,
    pub beta_voc: f64,
    pub gamma_pmax: f64,
}

/// Per-measurement context supplied by the test protocol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementContext {
    /// Module aperture area (m²); efficiency is only computed when present.
    #[serde(default)]
    pub module_area_m2: Option<f64>,
    /// Temperature coefficients; STC correction is only run when present.
    #[serde(default)]
    pub coefficients: Option<CorrectionCoefficients>,
    #[serde(default = "default_mismatch")]
    pub spectral_mismatch_factor: f64,
}

fn default_mismatch() -> f64 {
    1.0
}

impl Default for MeasurementContext {
    fn default() -> Self {
        MeasurementContext {
            module_area_m2: None,
            coefficients: None,
            spectral_mismatch_factor: default_mismatch(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_arrays_pairs_points() {
        let curve = IVCurve::from_arrays(&[0.0, 0.5], &[8.0, 4.0], 1000.0, 25.0).unwrap();
        assert_eq!(curve.len(), 2);
        assert_eq!(curve.points[1], CurvePoint::new(0.5, 4.0));
        assert_eq!(curve.power(), vec![0.0, 2.0]);
    }

    #[test]
    fn test_from_arrays_length_mismatch() {
        let err = IVCurve::from_arrays(&[0.0, 0.5], &[8.0], 1000.0, 25.0).unwrap_err();
        match err {
            PvError::LengthMismatch { voltage, current } => {
                assert_eq!((voltage, current), (2, 1));
            }
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_empty_and_nan() {
        assert!(matches!(
            IVCurve::new(vec![], 1000.0, 25.0),
            Err(PvError::EmptyCurve)
        ));
        let err = IVCurve::from_arrays(&[0.0, f64::NAN], &[8.0, 1.0], 1000.0, 25.0).unwrap_err();
        assert!(matches!(err, PvError::NonFiniteData { index: 1 }));
    }

    #[test]
    fn test_context_defaults_from_json() {
        let ctx: MeasurementContext = serde_json::from_str("{}").unwrap();
        assert_eq!(ctx, MeasurementContext::default());
        assert!((ctx.spectral_mismatch_factor - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_sweep_direction_serde() {
        let json = serde_json::to_string(&SweepDirection::Reverse).unwrap();
        assert_eq!(json, "\"reverse\"");
    }
}
