// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — Uncertainty Budget
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! GUM-style combination of relative uncertainty components.

use pv_math::stats::root_sum_square;
use pv_types::config::UncertaintyConfig;
use pv_types::constants::{COVERAGE_CONFIDENCE, COVERAGE_FACTOR_K2};
use pv_types::error::{PvError, PvResult};
use pv_types::results::UncertaintyReport;
use std::collections::BTreeMap;

/// Named relative standard uncertainties (fractions of Pmax).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UncertaintyBudget {
    components: BTreeMap<String, f64>,
}

impl UncertaintyBudget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(cfg: &UncertaintyConfig) -> Self {
        let components = cfg
            .components()
            .iter()
            .map(|&(name, value)| (name.to_string(), value))
            .collect();
        UncertaintyBudget { components }
    }

    /// Add or replace a component. Rejects negative or non-finite fractions.
    pub fn with_component(mut self, name: impl Into<String>, fraction: f64) -> PvResult<Self> {
        let name = name.into();
        if !fraction.is_finite() || fraction < 0.0 {
            return Err(PvError::ConfigError(format!(
                "uncertainty component '{name}' must be finite and >= 0, got {fraction}"
            )));
        }
        self.components.insert(name, fraction);
        Ok(self)
    }

    pub fn components(&self) -> &BTreeMap<String, f64> {
        &self.components
    }

    /// u_c = sqrt(Σ uᵢ²)
    pub fn combined(&self) -> f64 {
        root_sum_square(self.components.values().copied())
    }

    /// U = k·u_c with k = 2
    pub fn expanded(&self) -> f64 {
        COVERAGE_FACTOR_K2 * self.combined()
    }

    /// Report in percent; `pmax` adds the expanded uncertainty in watts.
    pub fn report(&self, pmax: Option<f64>) -> UncertaintyReport {
        let expanded = self.expanded();
        UncertaintyReport {
            components_percent: self
                .components
                .iter()
                .map(|(name, &u)| (name.clone(), 100.0 * u))
                .collect(),
            combined_percent: 100.0 * self.combined(),
            expanded_percent: 100.0 * expanded,
            coverage_factor: COVERAGE_FACTOR_K2,
            confidence_level: COVERAGE_CONFIDENCE,
            expanded_absolute: pmax.filter(|p| p.is_finite()).map(|p| expanded * p.abs()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget() {
        let budget = UncertaintyBudget::from_config(&UncertaintyConfig::default());
        assert_eq!(budget.components().len(), 6);
        // 0.02² + 0.01² + 0.005² + 0.005² + 0.01² + 0.02² = 0.00105
        let expected = 0.00105f64.sqrt();
        assert!((budget.combined() - expected).abs() < 1e-12);
        assert!((budget.expanded() - 2.0 * expected).abs() < 1e-12);
    }

    #[test]
    fn test_report_in_percent() {
        let budget = UncertaintyBudget::new()
            .with_component("irradiance_sensor", 0.03)
            .unwrap()
            .with_component("temperature", 0.04)
            .unwrap();
        let report = budget.report(Some(300.0));
        assert!((report.combined_percent - 5.0).abs() < 1e-9);
        assert!((report.expanded_percent - 10.0).abs() < 1e-9);
        assert_eq!(report.coverage_factor, 2.0);
        assert_eq!(report.confidence_level, 0.95);
        assert!((report.components_percent["temperature"] - 4.0).abs() < 1e-12);
        assert!((report.expanded_absolute.unwrap() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_budget_is_zero() {
        let report = UncertaintyBudget::new().report(None);
        assert_eq!(report.combined_percent, 0.0);
        assert!(report.expanded_absolute.is_none());
    }

    #[test]
    fn test_rejects_negative_component() {
        assert!(UncertaintyBudget::new()
            .with_component("voltage_measurement", -0.01)
            .is_err());
        assert!(UncertaintyBudget::new()
            .with_component("voltage_measurement", f64::NAN)
            .is_err());
    }

    #[test]
    fn test_replacing_component() {
        let budget = UncertaintyBudget::from_config(&UncertaintyConfig::default())
            .with_component("non_uniformity", 0.0)
            .unwrap();
        assert_eq!(budget.components().len(), 6);
        assert_eq!(budget.components()["non_uniformity"], 0.0);
    }
}
