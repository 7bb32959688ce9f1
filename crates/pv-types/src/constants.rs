// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Physical constants, reference conditions and sentinel values.
//!
//! Single source for every constant shared by the diode fitter and the
//! STC corrector.

/// Boltzmann constant (J/K)
pub const K_BOLTZMANN: f64 = 1.380649e-23;

/// Elementary charge (C)
pub const Q_ELECTRON: f64 = 1.602176634e-19;

/// Offset between degrees Celsius and kelvin.
pub const ZERO_CELSIUS_K: f64 = 273.15;

/// STC irradiance (W/m²).
pub const STC_IRRADIANCE: f64 = 1000.0;

/// STC cell temperature (°C).
pub const STC_TEMPERATURE_C: f64 = 25.0;

/// GUM coverage factor for ~95 % confidence.
pub const COVERAGE_FACTOR_K2: f64 = 2.0;

/// Confidence level paired with [`COVERAGE_FACTOR_K2`].
pub const COVERAGE_CONFIDENCE: f64 = 0.95;

/// Largest exponent argument passed to `exp` in the diode equation.
/// exp(700) ≈ 1e304, still finite in f64.
pub const EXP_ARG_LIMIT: f64 = 700.0;

/// Default diode ideality used by the STC thermal-voltage term.
pub const DEFAULT_STC_IDEALITY: f64 = 1.3;

/// Sentinel: shunt resistance when no leakage slope can be measured (Ω).
pub const NO_SHUNT_LEAKAGE_OHMS: f64 = 1e6;

/// Sentinel: series resistance when the near-Voc region is too sparse (Ω).
pub const SERIES_RESISTANCE_UNKNOWN: f64 = 0.0;

/// Sentinel: Voc/Isc on an empty curve, and FF/efficiency on degenerate input.
pub const DEGENERATE_VALUE: f64 = 0.0;

/// Thermal voltage kT/q at `temperature_c` (V).
pub fn thermal_voltage(temperature_c: f64) -> f64 {
    K_BOLTZMANN * (temperature_c + ZERO_CELSIUS_K) / Q_ELECTRON
}
