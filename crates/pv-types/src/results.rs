// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — Results
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Value objects handed back to protocol handlers.
//!
//! All fields are plain numbers, flags or strings so every result
//! serializes to JSON without custom code.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Electrical parameters extracted from one curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractedParameters {
    pub voc: f64,
    pub isc: f64,
    pub pmax: f64,
    pub vmp: f64,
    pub imp: f64,
    /// Clipped into [0, 1].
    pub fill_factor: f64,
    pub series_resistance: f64,
    pub shunt_resistance: f64,
    /// Fraction, present only when module area was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<f64>,
}

/// How a Voc/Isc value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryMethod {
    /// A sample lies within tolerance of the zero crossing.
    Direct,
    /// Linear interpolation across a sign change.
    Interpolated,
    /// No crossing in the data; the dataset extreme was used.
    Extrapolated,
    /// No samples at all; value is the 0.0 sentinel.
    Empty,
}

/// Five parameters of the single-diode equivalent circuit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiodeParameters {
    /// Photocurrent I_L (A)
    pub i_l: f64,
    /// Saturation current I_0 (A)
    pub i_0: f64,
    /// Series resistance (Ω)
    pub rs: f64,
    /// Shunt resistance (Ω)
    pub rsh: f64,
    /// Ideality factor
    pub n: f64,
}

/// Outcome of a single-diode fit.
///
/// When `fit_successful` is false, `parameters` and the goodness-of-fit
/// fields are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiodeModelFit {
    #[serde(flatten)]
    pub parameters: Option<DiodeParameters>,
    pub r_squared: Option<f64>,
    pub rmse: Option<f64>,
    pub fit_successful: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub iterations: usize,
    pub evaluations: usize,
}

impl DiodeModelFit {
    pub fn success(
        parameters: DiodeParameters,
        r_squared: f64,
        rmse: f64,
        iterations: usize,
        evaluations: usize,
    ) -> Self {
        DiodeModelFit {
            parameters: Some(parameters),
            r_squared: Some(r_squared),
            rmse: Some(rmse),
            fit_successful: true,
            error: None,
            iterations,
            evaluations,
        }
    }

    pub fn failure(message: impl Into<String>, iterations: usize, evaluations: usize) -> Self {
        DiodeModelFit {
            parameters: None,
            r_squared: None,
            rmse: None,
            fit_successful: false,
            error: Some(message.into()),
            iterations,
            evaluations,
        }
    }
}

/// Intermediate factors of an STC correction, kept for audit trails.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectionFactors {
    /// G_meas · mmf (W/m²)
    pub corrected_irradiance: f64,
    /// 1000 / G_corr
    pub irradiance_ratio: f64,
    /// 25 − T_meas (°C)
    pub temperature_delta: f64,
    /// n·Ns·kT/q at the measured temperature (V)
    pub thermal_voltage: f64,
    /// (1000/G_corr)·(1 + α·ΔT), applied to Isc and Impp
    pub current_factor: f64,
    /// Vt·ln(1000/G_corr), added to Voc and Vmpp (V)
    pub voltage_log_shift: f64,
    /// Pmax·(1000/G_corr)·(1 + γ·ΔT), a cross-check on `pmax_stc`
    pub pmax_stc_gamma: f64,
}

/// Measured values translated to 1000 W/m², 25 °C.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StcResult {
    pub voc_stc: f64,
    pub isc_stc: f64,
    pub pmax_stc: f64,
    pub vmpp_stc: f64,
    pub impp_stc: f64,
    pub ff_stc: f64,
    pub correction_factors: CorrectionFactors,
}

/// Combined measurement uncertainty, reported as percentages of Pmax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyReport {
    pub components_percent: BTreeMap<String, f64>,
    pub combined_percent: f64,
    pub expanded_percent: f64,
    pub coverage_factor: f64,
    pub confidence_level: f64,
    /// Expanded uncertainty in watts, when a Pmax value was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expanded_absolute: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_fit_has_no_parameters() {
        let fit = DiodeModelFit::failure("degenerate", 0, 1);
        assert!(!fit.fit_successful);
        assert!(fit.parameters.is_none());
        assert!(fit.r_squared.is_none());
        assert_eq!(fit.error.as_deref(), Some("degenerate"));
    }

    #[test]
    fn test_fit_serializes_flat() {
        let fit = DiodeModelFit::success(
            DiodeParameters {
                i_l: 8.5,
                i_0: 1e-9,
                rs: 0.01,
                rsh: 500.0,
                n: 1.2,
            },
            0.999,
            0.01,
            12,
            40,
        );
        let value = serde_json::to_value(&fit).unwrap();
        assert!((value["i_l"].as_f64().unwrap() - 8.5).abs() < 1e-12);
        assert_eq!(value["fit_successful"], serde_json::Value::Bool(true));
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_boundary_method_serde() {
        let json = serde_json::to_string(&BoundaryMethod::Extrapolated).unwrap();
        assert_eq!(json, "\"extrapolated\"");
    }
}
