// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — Curve Translation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Point-by-point curve translation, IEC 60891 procedure 1.
//!
//!   I₂ = I₁ + Isc₁·(G₂/G₁ − 1) + α·(T₂ − T₁)
//!   V₂ = V₁ − Rs·(I₂ − I₁) − κ·I₂·(T₂ − T₁) + β·(T₂ − T₁)
//!
//! α and β here are absolute (A/°C, V/°C); κ is the curve correction
//! factor (Ω/°C).

use pv_types::constants::{STC_IRRADIANCE, STC_TEMPERATURE_C};
use pv_types::curve::{CorrectionCoefficients, CurvePoint, IVCurve};
use pv_types::error::{PvError, PvResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TranslationParameters {
    /// Absolute current temperature coefficient (A/°C)
    pub alpha_abs: f64,
    /// Absolute voltage temperature coefficient (V/°C)
    pub beta_abs: f64,
    /// Internal series resistance (Ω)
    pub rs: f64,
    /// Curve correction factor (Ω/°C)
    #[serde(default)]
    pub kappa: f64,
}

impl TranslationParameters {
    /// Absolute coefficients from relative ones and the measured Isc/Voc.
    pub fn from_relative(
        coefficients: &CorrectionCoefficients,
        isc: f64,
        voc: f64,
        rs: f64,
        kappa: f64,
    ) -> Self {
        TranslationParameters {
            alpha_abs: coefficients.alpha_isc * isc,
            beta_abs: coefficients.beta_voc * voc,
            rs,
            kappa,
        }
    }
}

fn require_positive_irradiance(g: f64, label: &str) -> PvResult<()> {
    if !g.is_finite() || g <= 0.0 {
        return Err(PvError::InvalidConditions(format!(
            "{label} irradiance must be finite and > 0, got {g}"
        )));
    }
    Ok(())
}

/// Translate `curve` to (`target_irradiance`, `target_temperature_c`).
///
/// `isc` is the measured short-circuit current of `curve`. The result
/// keeps the sweep direction and carries the target conditions.
pub fn translate_curve(
    curve: &IVCurve,
    isc: f64,
    target_irradiance: f64,
    target_temperature_c: f64,
    params: &TranslationParameters,
) -> PvResult<IVCurve> {
    require_positive_irradiance(curve.irradiance, "measured")?;
    require_positive_irradiance(target_irradiance, "target")?;
    if !target_temperature_c.is_finite() || !isc.is_finite() {
        return Err(PvError::InvalidConditions(
            "target temperature and Isc must be finite".to_string(),
        ));
    }

    let dt = target_temperature_c - curve.temperature_c;
    let current_shift = isc * (target_irradiance / curve.irradiance - 1.0) + params.alpha_abs * dt;

    let points = curve
        .points
        .iter()
        .map(|p| {
            let i2 = p.current + current_shift;
            let v2 = p.voltage - params.rs * (i2 - p.current) - params.kappa * i2 * dt
                + params.beta_abs * dt;
            CurvePoint::new(v2, i2)
        })
        .collect();

    Ok(IVCurve::new(points, target_irradiance, target_temperature_c)?
        .with_sweep_direction(curve.sweep_direction))
}

/// Translate straight to 1000 W/m², 25 °C.
pub fn translate_to_stc(
    curve: &IVCurve,
    isc: f64,
    params: &TranslationParameters,
) -> PvResult<IVCurve> {
    translate_curve(curve, isc, STC_IRRADIANCE, STC_TEMPERATURE_C, params)
}
