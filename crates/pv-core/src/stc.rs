// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — STC Corrector
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Translation of extracted parameters to standard test conditions
//! (1000 W/m², 25 °C) after IEC 60891.
//!
//! Currents scale linearly with irradiance and by α with temperature.
//! Voltages gain a logarithmic irradiance term `Vt·ln(1000/G)` and shift
//! by β with temperature.

use crate::derived::fill_factor;
use pv_types::config::StcConfig;
use pv_types::constants::{thermal_voltage, STC_IRRADIANCE, STC_TEMPERATURE_C, ZERO_CELSIUS_K};
use pv_types::curve::CorrectionCoefficients;
use pv_types::error::{PvError, PvResult};
use pv_types::results::{CorrectionFactors, ExtractedParameters, StcResult};

/// Ambient conditions a curve was measured under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasuredConditions {
    /// Plane-of-array irradiance (W/m²)
    pub irradiance: f64,
    /// Cell temperature (°C)
    pub temperature_c: f64,
    pub spectral_mismatch_factor: f64,
}

impl MeasuredConditions {
    pub fn new(irradiance: f64, temperature_c: f64) -> Self {
        MeasuredConditions {
            irradiance,
            temperature_c,
            spectral_mismatch_factor: 1.0,
        }
    }

    pub fn with_mismatch(mut self, mmf: f64) -> Self {
        self.spectral_mismatch_factor = mmf;
        self
    }

    fn corrected_irradiance(&self) -> PvResult<f64> {
        if !self.irradiance.is_finite() || !self.spectral_mismatch_factor.is_finite() {
            return Err(PvError::InvalidConditions(format!(
                "irradiance and mismatch factor must be finite (G={}, mmf={})",
                self.irradiance, self.spectral_mismatch_factor
            )));
        }
        if !self.temperature_c.is_finite() || self.temperature_c + ZERO_CELSIUS_K <= 0.0 {
            return Err(PvError::InvalidConditions(format!(
                "cell temperature {} °C is not physical",
                self.temperature_c
            )));
        }
        let g_corr = self.irradiance * self.spectral_mismatch_factor;
        if g_corr <= 0.0 {
            return Err(PvError::InvalidConditions(format!(
                "corrected irradiance must be > 0 W/m², got {g_corr}"
            )));
        }
        Ok(g_corr)
    }
}

/// STC corrector holding the thermal-voltage settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StcCorrector {
    ideality: f64,
    cells_in_series: u32,
}

impl StcCorrector {
    pub fn new(cfg: &StcConfig) -> Self {
        StcCorrector {
            ideality: cfg.default_ideality,
            cells_in_series: cfg.cells_in_series.max(1),
        }
    }

    /// Replace the configured ideality, e.g. with a fitted n.
    pub fn with_ideality(mut self, n: f64) -> Self {
        if n.is_finite() && n > 0.0 {
            self.ideality = n;
        }
        self
    }

    pub fn ideality(&self) -> f64 {
        self.ideality
    }

    /// n·Ns·kT/q at the given cell temperature.
    pub fn module_thermal_voltage(&self, temperature_c: f64) -> f64 {
        self.ideality * f64::from(self.cells_in_series) * thermal_voltage(temperature_c)
    }

    /// Correct measured parameters to STC.
    ///
    /// Fails with [`PvError::InvalidConditions`] when G·mmf ≤ 0 or any
    /// condition is non-finite.
    pub fn correct(
        &self,
        measured: &ExtractedParameters,
        conditions: &MeasuredConditions,
        coefficients: &CorrectionCoefficients,
    ) -> PvResult<StcResult> {
        let g_corr = conditions.corrected_irradiance()?;
        let ratio = STC_IRRADIANCE / g_corr;
        let delta_t = STC_TEMPERATURE_C - conditions.temperature_c;
        let vt = self.module_thermal_voltage(conditions.temperature_c);

        let current_factor = ratio * (1.0 + coefficients.alpha_isc * delta_t);
        let voltage_log_shift = vt * ratio.ln();
        let correct_voltage =
            |v: f64| v + voltage_log_shift + coefficients.beta_voc * v * delta_t;

        let isc_stc = measured.isc * current_factor;
        let impp_stc = measured.imp * current_factor;
        let voc_stc = correct_voltage(measured.voc);
        let vmpp_stc = correct_voltage(measured.vmp);
        let pmax_stc = vmpp_stc * impp_stc;
        let ff_stc = fill_factor(voc_stc, isc_stc, pmax_stc);
        let pmax_stc_gamma = measured.pmax * ratio * (1.0 + coefficients.gamma_pmax * delta_t);

        log::trace!(
            "STC correction: G_corr={g_corr:.1} W/m², ΔT={delta_t:.2} °C, \
             Pmax {:.4} → {pmax_stc:.4} W",
            measured.pmax
        );

        Ok(StcResult {
            voc_stc,
            isc_stc,
            pmax_stc,
            vmpp_stc,
            impp_stc,
            ff_stc,
            correction_factors: CorrectionFactors {
                corrected_irradiance: g_corr,
                irradiance_ratio: ratio,
                temperature_delta: delta_t,
                thermal_voltage: vt,
                current_factor,
                voltage_log_shift,
                pmax_stc_gamma,
            },
        })
    }
}

impl Default for StcCorrector {
    fn default() -> Self {
        StcCorrector::new(&StcConfig::default())
    }
}

/// One-shot STC correction with the default ideality and a single cell.
pub fn correct_to_stc(
    measured: &ExtractedParameters,
    conditions: &MeasuredConditions,
    coefficients: &CorrectionCoefficients,
) -> PvResult<StcResult> {
    StcCorrector::default().correct(measured, conditions, coefficients)
}
