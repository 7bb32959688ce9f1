// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — MPP Locator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Maximum power point on the sampled grid. No interpolation between
//! samples: the sweep is assumed fine enough that a sample sits on the MPP.

use crate::preprocess::PreparedCurve;
use pv_types::error::{PvError, PvResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaxPowerPoint {
    pub pmax: f64,
    pub vmp: f64,
    pub imp: f64,
    pub index: usize,
}

/// (Pmax, index) of the largest power sample, first occurrence on ties.
///
/// Non-finite samples are skipped. Errors on empty input or when no
/// sample is finite, since Pmax feeds fill factor and efficiency.
pub fn find_mpp(power: &[f64]) -> PvResult<(f64, usize)> {
    if power.is_empty() {
        return Err(PvError::EmptyCurve);
    }
    let mut best: Option<(f64, usize)> = None;
    for (idx, &p) in power.iter().enumerate() {
        if !p.is_finite() {
            continue;
        }
        match best {
            Some((b, _)) if p <= b => {}
            _ => best = Some((p, idx)),
        }
    }
    best.ok_or(PvError::NonFiniteData { index: 0 })
}

/// Read Vmp and Imp off the sample at the MPP index.
pub fn locate_mpp(curve: &PreparedCurve) -> PvResult<MaxPowerPoint> {
    let (pmax, index) = find_mpp(&curve.power)?;
    Ok(MaxPowerPoint {
        pmax,
        vmp: curve.voltage[index],
        imp: curve.current[index],
        index,
    })
}
