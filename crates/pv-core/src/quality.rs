// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — Curve Quality Assessor
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Advisory 0–100 score of a raw sweep.
//!
//! Scoring starts at 100 and subtracts penalties for point count,
//! voltage reversals, non-finite samples, a non-positive first current
//! and power-derivative noise. It never blocks extraction.

use pv_math::stats::{diff, mean, sample_std};
use pv_types::config::QualityConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityBand {
    Poor,
    Acceptable,
    Good,
    Excellent,
}

impl QualityBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            QualityBand::Excellent
        } else if score >= 75.0 {
            QualityBand::Good
        } else if score >= 60.0 {
            QualityBand::Acceptable
        } else {
            QualityBand::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub data_quality_score: f64,
    pub curve_quality: QualityBand,
    pub n_points: usize,
    pub monotonicity_reversals: usize,
    pub has_non_finite: bool,
    /// std(Δ²P) / mean|P|; `None` with fewer than three finite samples.
    /// Grows with coarse sampling, see [`relative_power_noise`].
    pub relative_noise: Option<f64>,
    /// Points deducted per rule.
    pub penalties: BTreeMap<String, f64>,
    pub warnings: Vec<String>,
}

/// Sign changes between consecutive non-zero voltage steps.
pub fn count_reversals(voltages: &[f64]) -> usize {
    let signs: Vec<f64> = diff(voltages)
        .into_iter()
        .filter(|d| *d != 0.0 && d.is_finite())
        .map(f64::signum)
        .collect();
    signs.windows(2).filter(|w| w[0] != w[1]).count()
}

/// Relative noise of the power-derivative signal over finite samples.
///
/// Computed as std(Δ²P) / mean|P| on the samples as given, so it depends
/// on resolution. A smooth curve contributes about P''·h² per voltage step
/// h, and P'' peaks at the knee. A clean sweep of a few dozen points can
/// read several percent from curvature alone. Around ten points it can
/// pass the 10 % threshold without any noise. From about a hundred points
/// up, the value is dominated by measurement noise.
pub fn relative_power_noise(voltages: &[f64], currents: &[f64]) -> Option<f64> {
    let power: Vec<f64> = voltages
        .iter()
        .zip(currents.iter())
        .map(|(v, i)| v * i)
        .filter(|p| p.is_finite())
        .collect();
    if power.len() < 3 {
        return None;
    }
    let abs_power: Vec<f64> = power.iter().map(|p| p.abs()).collect();
    let scale = mean(&abs_power)?;
    if scale <= 0.0 {
        return None;
    }
    let second = diff(&diff(&power));
    Some(sample_std(&second)? / scale)
}

struct Scorer {
    score: f64,
    penalties: BTreeMap<String, f64>,
    warnings: Vec<String>,
}

impl Scorer {
    fn deduct(&mut self, rule: &str, points: f64, warning: String) {
        if points <= 0.0 {
            return;
        }
        self.score -= points;
        *self.penalties.entry(rule.to_string()).or_insert(0.0) += points;
        self.warnings.push(warning);
    }
}

/// Score raw (V, I) arrays. Pass them in voltage-ascending order.
pub fn assess_curve_quality(
    voltages: &[f64],
    currents: &[f64],
    cfg: &QualityConfig,
) -> QualityAssessment {
    let n_points = voltages.len().min(currents.len());
    let (v, i) = (&voltages[..n_points], &currents[..n_points]);
    let mut scorer = Scorer {
        score: 100.0,
        penalties: BTreeMap::new(),
        warnings: Vec::new(),
    };

    if n_points < cfg.min_points {
        scorer.deduct(
            "insufficient_points",
            cfg.insufficient_points_penalty,
            format!("{n_points} points, at least {} required", cfg.min_points),
        );
    } else if n_points < cfg.recommended_points {
        scorer.deduct(
            "sparse_points",
            cfg.sparse_points_penalty,
            format!("{n_points} points, {} recommended", cfg.recommended_points),
        );
    }

    let monotonicity_reversals = count_reversals(v);
    scorer.deduct(
        "monotonicity",
        (cfg.reversal_penalty * monotonicity_reversals as f64).min(cfg.reversal_penalty_cap),
        format!("voltage reverses direction {monotonicity_reversals} time(s)"),
    );

    let has_non_finite = v.iter().chain(i.iter()).any(|x| !x.is_finite());
    if has_non_finite {
        scorer.deduct(
            "non_finite",
            cfg.non_finite_penalty,
            "curve contains NaN or infinite samples".to_string(),
        );
    }

    match i.first() {
        Some(&isc) if isc > 0.0 => {}
        first => scorer.deduct(
            "non_positive_isc",
            cfg.non_positive_isc_penalty,
            format!("first current sample is not positive ({first:?})"),
        ),
    }

    let relative_noise = relative_power_noise(v, i);
    if let Some(noise) = relative_noise {
        if noise > cfg.noise_threshold {
            scorer.deduct(
                "noise",
                (100.0 * (noise - cfg.noise_threshold)).min(cfg.noise_penalty_cap),
                format!("power-derivative noise {:.1}% of mean power", 100.0 * noise),
            );
        }
    }

    let score = scorer.score.clamp(0.0, 100.0);
    // Below the minimum point count the curve is never trusted.
    let curve_quality = if n_points < cfg.min_points {
        QualityBand::Poor
    } else {
        QualityBand::from_score(score)
    };

    QualityAssessment {
        data_quality_score: score,
        curve_quality,
        n_points,
        monotonicity_reversals,
        has_non_finite,
        relative_noise,
        penalties: scorer.penalties,
        warnings: scorer.warnings,
    }
}
