// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — Temperature Coefficients
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! α, β and γ from a temperature series at constant irradiance.
//!
//! Each quantity is regressed linearly on temperature and the slope is
//! normalised by the fitted value at 25 °C.
//!
//! Standalone utility for building a coefficient set from a bench series.
//! [`crate::analyzer::IvAnalyzer`] never calls it: the analyzer takes
//! [`CorrectionCoefficients`] as supplied input, and the output of
//! [`regress_temperature_coefficients`] is one way to produce them.

use pv_math::regression::{fit_line, LineFit};
use pv_types::constants::STC_TEMPERATURE_C;
use pv_types::curve::CorrectionCoefficients;
use pv_types::error::{PvError, PvResult};
use serde::{Deserialize, Serialize};

/// Extracted parameters of one curve in a temperature series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperaturePoint {
    pub temperature_c: f64,
    pub isc: f64,
    pub voc: f64,
    pub pmax: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoefficientFit {
    pub coefficients: CorrectionCoefficients,
    pub r_squared_isc: f64,
    pub r_squared_voc: f64,
    pub r_squared_pmax: f64,
    pub n_points: usize,
}

fn relative_slope(fit: &LineFit, name: &str) -> PvResult<f64> {
    let at_reference = fit.predict(STC_TEMPERATURE_C);
    if at_reference == 0.0 || !at_reference.is_finite() {
        return Err(PvError::InvalidConditions(format!(
            "{name} extrapolates to {at_reference} at 25 °C; cannot normalise"
        )));
    }
    Ok(fit.slope / at_reference)
}

fn regress(temps: &[f64], values: &[f64], name: &str) -> PvResult<(f64, f64)> {
    let fit = fit_line(temps, values).ok_or_else(|| {
        PvError::InvalidConditions(format!("{name} regression on temperature is degenerate"))
    })?;
    Ok((relative_slope(&fit, name)?, fit.r_squared))
}

/// Relative temperature coefficients (per °C) by least squares.
///
/// Needs at least two finite points at distinct temperatures.
pub fn regress_temperature_coefficients(points: &[TemperaturePoint]) -> PvResult<CoefficientFit> {
    if points.len() < 2 {
        return Err(PvError::InsufficientData {
            required: 2,
            actual: points.len(),
        });
    }
    if let Some(index) = points.iter().position(|p| {
        ![p.temperature_c, p.isc, p.voc, p.pmax]
            .iter()
            .all(|v| v.is_finite())
    }) {
        return Err(PvError::NonFiniteData { index });
    }

    let temps: Vec<f64> = points.iter().map(|p| p.temperature_c).collect();
    let t_min = temps.iter().copied().fold(f64::INFINITY, f64::min);
    let t_max = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if t_max <= t_min {
        return Err(PvError::InsufficientData {
            required: 2,
            actual: 1,
        });
    }

    let isc: Vec<f64> = points.iter().map(|p| p.isc).collect();
    let voc: Vec<f64> = points.iter().map(|p| p.voc).collect();
    let pmax: Vec<f64> = points.iter().map(|p| p.pmax).collect();

    let (alpha_isc, r_squared_isc) = regress(&temps, &isc, "Isc")?;
    let (beta_voc, r_squared_voc) = regress(&temps, &voc, "Voc")?;
    let (gamma_pmax, r_squared_pmax) = regress(&temps, &pmax, "Pmax")?;

    log::debug!(
        "temperature coefficients over {t_min:.1}..{t_max:.1} °C: \
         α={alpha_isc:.2e}, β={beta_voc:.2e}, γ={gamma_pmax:.2e}"
    );

    Ok(CoefficientFit {
        coefficients: CorrectionCoefficients {
            alpha_isc,
            beta_voc,
            gamma_pmax,
        },
        r_squared_isc,
        r_squared_voc,
        r_squared_pmax,
        n_points: points.len(),
    })
}
