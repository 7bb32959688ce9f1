// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — Boundary Extractor
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Open-circuit voltage and short-circuit current from a sampled curve.
//!
//! Both searches are lenient: empty input yields the 0.0 sentinel with
//! [`BoundaryMethod::Empty`] rather than an error, since the quality
//! scorer calls them speculatively.

use pv_math::interp::{argmin_abs, first_crossing, zero_crossing};
use pv_types::config::BoundaryConfig;
use pv_types::constants::DEGENERATE_VALUE;
use pv_types::results::BoundaryMethod;
use serde::{Deserialize, Serialize};

/// A boundary value tagged with how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryEstimate {
    pub value: f64,
    pub method: BoundaryMethod,
}

impl BoundaryEstimate {
    fn empty() -> Self {
        BoundaryEstimate {
            value: DEGENERATE_VALUE,
            method: BoundaryMethod::Empty,
        }
    }

    /// True when no zero crossing supported the value.
    pub fn is_extrapolated(&self) -> bool {
        matches!(
            self.method,
            BoundaryMethod::Extrapolated | BoundaryMethod::Empty
        )
    }
}

fn finite_max(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Voltage at zero current.
///
/// Order of preference: a sample within `voc_current_tolerance` of zero,
/// interpolation across the first positive → non-positive current step,
/// then the maximum voltage (flagged extrapolated).
pub fn find_voc(voltages: &[f64], currents: &[f64], cfg: &BoundaryConfig) -> BoundaryEstimate {
    let n = voltages.len().min(currents.len());
    if n == 0 {
        return BoundaryEstimate::empty();
    }
    let (v, i) = (&voltages[..n], &currents[..n]);

    if let Some(idx) = argmin_abs(i) {
        if i[idx].abs() < cfg.voc_current_tolerance {
            return BoundaryEstimate {
                value: v[idx],
                method: BoundaryMethod::Direct,
            };
        }
    }

    if let Some(k) = first_crossing(i, |a, b| a > 0.0 && b <= 0.0) {
        return BoundaryEstimate {
            value: zero_crossing(v[k], i[k], v[k + 1], i[k + 1]),
            method: BoundaryMethod::Interpolated,
        };
    }

    BoundaryEstimate {
        value: finite_max(v),
        method: BoundaryMethod::Extrapolated,
    }
}

/// Current at zero voltage, mirroring [`find_voc`] with the axes swapped.
///
/// Falls back to the maximum current (flagged extrapolated) when the sweep
/// never crosses V = 0.
pub fn find_isc(voltages: &[f64], currents: &[f64], cfg: &BoundaryConfig) -> BoundaryEstimate {
    let n = voltages.len().min(currents.len());
    if n == 0 {
        return BoundaryEstimate::empty();
    }
    let (v, i) = (&voltages[..n], &currents[..n]);

    if let Some(idx) = argmin_abs(v) {
        if v[idx].abs() < cfg.isc_voltage_tolerance {
            return BoundaryEstimate {
                value: i[idx],
                method: BoundaryMethod::Direct,
            };
        }
    }

    if let Some(k) = first_crossing(v, |a, b| a < 0.0 && b >= 0.0) {
        // Roles swapped: current is the abscissa, voltage the ordinate.
        return BoundaryEstimate {
            value: zero_crossing(i[k], v[k], i[k + 1], v[k + 1]),
            method: BoundaryMethod::Interpolated,
        };
    }

    BoundaryEstimate {
        value: finite_max(i),
        method: BoundaryMethod::Extrapolated,
    }
}
