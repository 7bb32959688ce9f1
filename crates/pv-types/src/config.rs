// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::DEFAULT_STC_IDEALITY;
use crate::error::{PvError, PvResult};
use serde::{Deserialize, Serialize};

/// Top-level analysis configuration.
/// Every section is optional in JSON; missing keys take reference defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub boundary: BoundaryConfig,
    pub resistance: ResistanceConfig,
    pub fit: DiodeFitConfig,
    pub quality: QualityConfig,
    pub stc: StcConfig,
    pub uncertainty: UncertaintyConfig,
    /// Run the single-diode fitter as part of the analysis pipeline.
    pub fit_diode_model: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            boundary: BoundaryConfig::default(),
            resistance: ResistanceConfig::default(),
            fit: DiodeFitConfig::default(),
            quality: QualityConfig::default(),
            stc: StcConfig::default(),
            uncertainty: UncertaintyConfig::default(),
            fit_diode_model: true,
        }
    }
}

/// Zero-crossing tolerances. Tune to the sensor resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// |I| below which a sample is taken as Voc directly (A).
    pub voc_current_tolerance: f64,
    /// |V| below which a sample is taken as Isc directly (V).
    pub isc_voltage_tolerance: f64,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        BoundaryConfig {
            voc_current_tolerance: 0.001,
            isc_voltage_tolerance: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResistanceConfig {
    /// Rs region: samples with I below this fraction of max(I).
    pub series_current_fraction: f64,
    /// Rsh region: samples with |V| below this window (V).
    pub shunt_voltage_window: f64,
}

impl Default for ResistanceConfig {
    fn default() -> Self {
        ResistanceConfig {
            series_current_fraction: 0.10,
            shunt_voltage_window: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JacobianMode {
    #[default]
    Analytical,
    FiniteDifference,
}

/// Closed interval `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub const fn new(lower: f64, upper: f64) -> Self {
        Bounds { lower, upper }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.lower..=self.upper).contains(&value)
    }
}

/// Single-diode fitter settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiodeFitConfig {
    /// Initial photocurrent; `None` uses max(I).
    pub initial_i_l: Option<f64>,
    pub initial_i_0: f64,
    pub initial_rs: f64,
    pub initial_rsh: f64,
    pub initial_n: f64,
    /// I_L upper bound as a multiple of max(I); lower bound is 0.
    pub i_l_upper_factor: f64,
    pub i_0_bounds: Bounds,
    pub rs_bounds: Bounds,
    pub rsh_bounds: Bounds,
    pub n_bounds: Bounds,
    pub max_evaluations: usize,
    /// Relative cost reduction below which the fit has converged.
    pub ftol: f64,
    /// Relative step size below which the fit has converged.
    pub xtol: f64,
    /// Largest cosine between the residual and a free Jacobian column
    /// accepted when no further step reduces the cost.
    pub gtol: f64,
    pub jacobian_mode: JacobianMode,
    pub fd_step: f64,
}

impl Default for DiodeFitConfig {
    fn default() -> Self {
        DiodeFitConfig {
            initial_i_l: None,
            initial_i_0: 1e-9,
            initial_rs: 0.5,
            initial_rsh: 1000.0,
            initial_n: 1.5,
            i_l_upper_factor: 1.5,
            i_0_bounds: Bounds::new(1e-15, 1e-6),
            rs_bounds: Bounds::new(0.0, 10.0),
            rsh_bounds: Bounds::new(10.0, 1e6),
            n_bounds: Bounds::new(0.5, 5.0),
            max_evaluations: 5000,
            ftol: 1e-10,
            xtol: 1e-10,
            gtol: 1e-6,
            jacobian_mode: JacobianMode::Analytical,
            fd_step: 1e-7,
        }
    }
}

/// Quality scoring thresholds and penalty weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub min_points: usize,
    pub recommended_points: usize,
    pub insufficient_points_penalty: f64,
    pub sparse_points_penalty: f64,
    pub reversal_penalty: f64,
    pub reversal_penalty_cap: f64,
    pub non_finite_penalty: f64,
    pub non_positive_isc_penalty: f64,
    /// Relative power-derivative noise tolerated before penalising.
    pub noise_threshold: f64,
    pub noise_penalty_cap: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        QualityConfig {
            min_points: 10,
            recommended_points: 20,
            insufficient_points_penalty: 30.0,
            sparse_points_penalty: 10.0,
            reversal_penalty: 2.0,
            reversal_penalty_cap: 20.0,
            non_finite_penalty: 40.0,
            non_positive_isc_penalty: 15.0,
            noise_threshold: 0.10,
            noise_penalty_cap: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StcConfig {
    /// Ideality used in the thermal-voltage term when no fitted value is supplied.
    pub default_ideality: f64,
    /// Series-connected cells; scales the thermal voltage for module-level data.
    pub cells_in_series: u32,
    /// Use the fitted n instead of `default_ideality` when the diode fit succeeded.
    pub use_fitted_ideality: bool,
}

impl Default for StcConfig {
    fn default() -> Self {
        StcConfig {
            default_ideality: DEFAULT_STC_IDEALITY,
            cells_in_series: 1,
            use_fitted_ideality: false,
        }
    }
}

/// Relative standard uncertainties (fractions) of each measurement source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UncertaintyConfig {
    pub irradiance_sensor: f64,
    pub temperature: f64,
    pub voltage_measurement: f64,
    pub current_measurement: f64,
    pub spectral_mismatch: f64,
    pub non_uniformity: f64,
}

impl Default for UncertaintyConfig {
    fn default() -> Self {
        UncertaintyConfig {
            irradiance_sensor: 0.02,
            temperature: 0.01,
            voltage_measurement: 0.005,
            current_measurement: 0.005,
            spectral_mismatch: 0.01,
            non_uniformity: 0.02,
        }
    }
}

impl UncertaintyConfig {
    /// Named components in reporting order.
    pub fn components(&self) -> [(&'static str, f64); 6] {
        [
            ("irradiance_sensor", self.irradiance_sensor),
            ("temperature", self.temperature),
            ("voltage_measurement", self.voltage_measurement),
            ("current_measurement", self.current_measurement),
            ("spectral_mismatch", self.spectral_mismatch),
            ("non_uniformity", self.non_uniformity),
        ]
    }
}

fn require_positive(value: f64, key: &str) -> PvResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PvError::ConfigError(format!("{key} must be finite and > 0")));
    }
    Ok(())
}

fn require_bounds(bounds: &Bounds, key: &str) -> PvResult<()> {
    if !bounds.lower.is_finite() || !bounds.upper.is_finite() || bounds.lower >= bounds.upper {
        return Err(PvError::ConfigError(format!("{key} must be finite with lower < upper")));
    }
    Ok(())
}

impl DiodeFitConfig {
    pub fn validate(&self) -> PvResult<()> {
        if self.max_evaluations == 0 {
            return Err(PvError::ConfigError(
                "fit.max_evaluations must be >= 1".to_string(),
            ));
        }
        require_positive(self.ftol, "fit.ftol")?;
        require_positive(self.xtol, "fit.xtol")?;
        require_positive(self.gtol, "fit.gtol")?;
        require_positive(self.fd_step, "fit.fd_step")?;
        require_positive(self.i_l_upper_factor, "fit.i_l_upper_factor")?;
        require_bounds(&self.i_0_bounds, "fit.i_0_bounds")?;
        require_bounds(&self.rs_bounds, "fit.rs_bounds")?;
        require_bounds(&self.rsh_bounds, "fit.rsh_bounds")?;
        require_bounds(&self.n_bounds, "fit.n_bounds")?;
        if self.i_0_bounds.lower <= 0.0 || self.rsh_bounds.lower <= 0.0 {
            return Err(PvError::ConfigError(
                "fit.i_0_bounds and fit.rsh_bounds must be strictly positive".to_string(),
            ));
        }
        if self.n_bounds.lower <= 0.0 {
            return Err(PvError::ConfigError(
                "fit.n_bounds.lower must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl AnalysisConfig {
    /// Load from a JSON file and validate.
    pub fn from_file(path: &str) -> PvResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PvResult<()> {
        require_positive(
            self.boundary.voc_current_tolerance,
            "boundary.voc_current_tolerance",
        )?;
        require_positive(
            self.boundary.isc_voltage_tolerance,
            "boundary.isc_voltage_tolerance",
        )?;
        let fraction = self.resistance.series_current_fraction;
        if !fraction.is_finite() || fraction <= 0.0 || fraction >= 1.0 {
            return Err(PvError::ConfigError(
                "resistance.series_current_fraction must be in (0, 1)".to_string(),
            ));
        }
        require_positive(
            self.resistance.shunt_voltage_window,
            "resistance.shunt_voltage_window",
        )?;
        self.fit.validate()?;
        if self.quality.min_points > self.quality.recommended_points {
            return Err(PvError::ConfigError(
                "quality.min_points must not exceed quality.recommended_points".to_string(),
            ));
        }
        require_positive(self.stc.default_ideality, "stc.default_ideality")?;
        if self.stc.cells_in_series == 0 {
            return Err(PvError::ConfigError(
                "stc.cells_in_series must be >= 1".to_string(),
            ));
        }
        for (name, value) in self.uncertainty.components() {
            if !value.is_finite() || value < 0.0 {
                return Err(PvError::ConfigError(format!(
                    "uncertainty.{name} must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }
}
