// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — Derived Parameters
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Fill factor and conversion efficiency.
//!
//! Neither function errors; degenerate input maps to the 0.0 sentinel and
//! validity is judged by the quality assessor.

use pv_types::constants::DEGENERATE_VALUE;

/// Pmax / (Voc·Isc), unclipped. 0.0 when Voc·Isc ≤ 0.
pub fn fill_factor(voc: f64, isc: f64, pmax: f64) -> f64 {
    let denom = voc * isc;
    if denom > 0.0 {
        pmax / denom
    } else {
        DEGENERATE_VALUE
    }
}

/// Clip into [0, 1]; NaN maps to 0.
pub fn clip_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Pmax / (G·A) as a fraction. 0.0 when irradiance or area is not positive.
pub fn efficiency(pmax: f64, irradiance: f64, area_m2: f64) -> f64 {
    if irradiance <= 0.0 || area_m2 <= 0.0 {
        return DEGENERATE_VALUE;
    }
    pmax / (irradiance * area_m2)
}
