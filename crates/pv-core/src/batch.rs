// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — Batch Analysis
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Data-parallel analysis of independent curves.

use crate::analyzer::{Confidence, IvAnalysis, IvAnalyzer};
use pv_math::stats::{describe, Summary};
use pv_types::curve::{IVCurve, MeasurementContext};
use pv_types::error::PvResult;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One curve of a batch with its measurement context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    pub curve: IVCurve,
    #[serde(default)]
    pub context: MeasurementContext,
}

/// Aggregate statistics over the successful analyses of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub fits_successful: usize,
    pub low_confidence: usize,
    pub pmax: Option<Summary>,
    pub fill_factor: Option<Summary>,
    pub quality_score: Option<Summary>,
}

/// Analyze every item on the rayon pool. Output order matches input order;
/// a failure in one curve does not affect the others.
pub fn analyze_batch(analyzer: &IvAnalyzer, items: &[BatchItem]) -> Vec<PvResult<IvAnalysis>> {
    items
        .par_iter()
        .map(|item| analyzer.analyze(&item.curve, &item.context))
        .collect()
}

pub fn summarize(results: &[PvResult<IvAnalysis>]) -> BatchSummary {
    let ok: Vec<&IvAnalysis> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    let pick = |f: fn(&IvAnalysis) -> f64| -> Option<Summary> {
        describe(&ok.iter().map(|&a| f(a)).collect::<Vec<f64>>())
    };

    let summary = BatchSummary {
        total: results.len(),
        succeeded: ok.len(),
        failed: results.len() - ok.len(),
        fits_successful: ok
            .iter()
            .filter(|a| a.diode_fit.as_ref().is_some_and(|f| f.fit_successful))
            .count(),
        low_confidence: ok
            .iter()
            .filter(|a| a.confidence == Confidence::Low)
            .count(),
        pmax: pick(|a| a.parameters.pmax),
        fill_factor: pick(|a| a.parameters.fill_factor),
        quality_score: pick(|a| a.quality.data_quality_score),
    };
    log::debug!(
        "batch of {}: {} analyzed, {} failed",
        summary.total,
        summary.succeeded,
        summary.failed
    );
    summary
}
