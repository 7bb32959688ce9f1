// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — I-V Analyzer
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! End-to-end analysis of one I-V sweep.
//!
//! Data flow:
//!   raw samples → preprocess → {Voc/Isc, MPP} → FF, η, Rs, Rsh
//!               → diode fit → STC correction → uncertainty
//! with the quality assessor scoring the raw curve alongside.

use crate::boundary::{find_isc, find_voc, BoundaryEstimate};
use crate::derived::{clip_unit, efficiency, fill_factor};
use crate::fit::fit_single_diode;
use crate::mpp::locate_mpp;
use crate::preprocess::{preprocess_curve, PreparedCurve};
use crate::quality::{assess_curve_quality, QualityAssessment, QualityBand};
use crate::resistance::{series_resistance, shunt_resistance};
use crate::stc::{MeasuredConditions, StcCorrector};
use crate::uncertainty::UncertaintyBudget;
use pv_types::config::AnalysisConfig;
use pv_types::curve::{IVCurve, MeasurementContext, SweepDirection};
use pv_types::error::PvResult;
use pv_types::results::{
    BoundaryMethod, DiodeModelFit, ExtractedParameters, StcResult, UncertaintyReport,
};
use serde::{Deserialize, Serialize};

/// How far downstream QC should trust the extracted parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Reduced,
    Low,
}

impl Confidence {
    pub fn assess(quality: QualityBand, voc: &BoundaryEstimate, isc: &BoundaryEstimate) -> Self {
        match quality {
            QualityBand::Poor => Confidence::Low,
            QualityBand::Acceptable => Confidence::Reduced,
            _ if voc.is_extrapolated() || isc.is_extrapolated() => Confidence::Reduced,
            _ => Confidence::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IvAnalysis {
    pub parameters: ExtractedParameters,
    pub voc_method: BoundaryMethod,
    pub isc_method: BoundaryMethod,
    pub quality: QualityAssessment,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diode_fit: Option<DiodeModelFit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stc: Option<StcResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<UncertaintyReport>,
}

/// Extracted parameters plus the boundary estimates behind them.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub parameters: ExtractedParameters,
    pub voc: BoundaryEstimate,
    pub isc: BoundaryEstimate,
    pub prepared: PreparedCurve,
}

/// Stateless analyzer; holds only its configuration and is `Sync`.
#[derive(Debug, Clone, Default)]
pub struct IvAnalyzer {
    config: AnalysisConfig,
}

impl IvAnalyzer {
    pub fn new(config: AnalysisConfig) -> PvResult<Self> {
        config.validate()?;
        Ok(IvAnalyzer { config })
    }

    pub fn from_file(path: &str) -> PvResult<Self> {
        Ok(IvAnalyzer {
            config: AnalysisConfig::from_file(path)?,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Electrical parameters without fitting or correction.
    pub fn extract(&self, curve: &IVCurve, context: &MeasurementContext) -> PvResult<Extraction> {
        let prepared = preprocess_curve(curve)?;
        let (v, i) = (&prepared.voltage, &prepared.current);

        let voc = find_voc(v, i, &self.config.boundary);
        let isc = find_isc(v, i, &self.config.boundary);
        let mpp = locate_mpp(&prepared)?;

        let parameters = ExtractedParameters {
            voc: voc.value,
            isc: isc.value,
            pmax: mpp.pmax,
            vmp: mpp.vmp,
            imp: mpp.imp,
            fill_factor: clip_unit(fill_factor(voc.value, isc.value, mpp.pmax)),
            series_resistance: series_resistance(v, i, &self.config.resistance),
            shunt_resistance: shunt_resistance(v, i, &self.config.resistance),
            efficiency: context
                .module_area_m2
                .map(|area| efficiency(mpp.pmax, curve.irradiance, area)),
        };

        Ok(Extraction {
            parameters,
            voc,
            isc,
            prepared,
        })
    }

    /// Full analysis of one curve.
    ///
    /// Errors only on precondition violations (too few points, mismatched
    /// arrays) or when STC correction is requested under invalid
    /// conditions; a failed diode fit is reported inside the result.
    pub fn analyze(&self, curve: &IVCurve, context: &MeasurementContext) -> PvResult<IvAnalysis> {
        let (mut raw_v, mut raw_i) = (curve.voltages(), curve.currents());
        if curve.sweep_direction == SweepDirection::Reverse {
            raw_v.reverse();
            raw_i.reverse();
        }
        let quality = assess_curve_quality(&raw_v, &raw_i, &self.config.quality);

        let Extraction {
            parameters,
            voc,
            isc,
            prepared,
        } = self.extract(curve, context)?;

        let diode_fit = self.config.fit_diode_model.then(|| {
            fit_single_diode(
                &prepared.voltage,
                &prepared.current,
                curve.temperature_c,
                &self.config.fit,
            )
        });

        let (stc, uncertainty) = match context.coefficients {
            Some(coefficients) => {
                let mut corrector = StcCorrector::new(&self.config.stc);
                if self.config.stc.use_fitted_ideality {
                    if let Some(n) = diode_fit
                        .as_ref()
                        .and_then(|fit| fit.parameters)
                        .map(|p| p.n)
                    {
                        corrector = corrector.with_ideality(n);
                    }
                }
                let conditions = MeasuredConditions::new(curve.irradiance, curve.temperature_c)
                    .with_mismatch(context.spectral_mismatch_factor);
                let stc = corrector.correct(&parameters, &conditions, &coefficients)?;
                let report = UncertaintyBudget::from_config(&self.config.uncertainty)
                    .report(Some(stc.pmax_stc));
                (Some(stc), Some(report))
            }
            None => (None, None),
        };

        let confidence = Confidence::assess(quality.curve_quality, &voc, &isc);
        log::debug!(
            "analyzed {} points: Pmax={:.4} W, FF={:.3}, quality={:.0} ({:?}), confidence={:?}",
            prepared.len(),
            parameters.pmax,
            parameters.fill_factor,
            quality.data_quality_score,
            quality.curve_quality,
            confidence
        );

        Ok(IvAnalysis {
            parameters,
            voc_method: voc.method,
            isc_method: isc.method,
            quality,
            confidence,
            diode_fit,
            stc,
            uncertainty,
        })
    }
}
