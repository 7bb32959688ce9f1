// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — Resistance Estimator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Local-slope estimates of series and shunt resistance.
//!
//! These feed QC thresholds only; rated values come from the diode fit.

use pv_math::regression::fit_line;
use pv_types::config::ResistanceConfig;
use pv_types::constants::{NO_SHUNT_LEAKAGE_OHMS, SERIES_RESISTANCE_UNKNOWN};

fn max_current(currents: &[f64]) -> f64 {
    currents
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max)
}

/// |dV/dI| over samples with I < fraction·max(I) (the near-Voc region).
///
/// Returns [`SERIES_RESISTANCE_UNKNOWN`] with fewer than two qualifying
/// samples or when their currents are all equal.
pub fn series_resistance(voltages: &[f64], currents: &[f64], cfg: &ResistanceConfig) -> f64 {
    let threshold = cfg.series_current_fraction * max_current(currents);
    let (i_sel, v_sel): (Vec<f64>, Vec<f64>) = currents
        .iter()
        .zip(voltages.iter())
        .filter(|&(&i, &v)| i < threshold && i.is_finite() && v.is_finite())
        .map(|(&i, &v)| (i, v))
        .unzip();

    // V = V0 + Rs·I
    match fit_line(&i_sel, &v_sel) {
        Some(fit) if fit.slope.is_finite() => fit.slope.abs(),
        _ => SERIES_RESISTANCE_UNKNOWN,
    }
}

/// |1 / (dI/dV)| over samples with |V| < window (the near-Isc region).
///
/// Returns [`NO_SHUNT_LEAKAGE_OHMS`] when fewer than two samples qualify
/// or the fitted slope is zero.
pub fn shunt_resistance(voltages: &[f64], currents: &[f64], cfg: &ResistanceConfig) -> f64 {
    let (v_sel, i_sel): (Vec<f64>, Vec<f64>) = voltages
        .iter()
        .zip(currents.iter())
        .filter(|&(&v, &i)| v.abs() < cfg.shunt_voltage_window && i.is_finite())
        .map(|(&v, &i)| (v, i))
        .unzip();

    // I = I0 + V/Rsh
    match fit_line(&v_sel, &i_sel) {
        Some(fit) if fit.slope != 0.0 && fit.slope.is_finite() => (1.0 / fit.slope).abs(),
        _ => NO_SHUNT_LEAKAGE_OHMS,
    }
}
