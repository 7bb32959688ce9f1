// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — Synthetic Sweeps
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Synthetic I-V sweeps from the implicit single-diode equation.
//!
//! Unlike the explicit fit model, the generator solves
//!   I = I_L − I_0·(exp((V + I·Rs)/(n·Ns·Vt)) − 1) − (V + I·Rs)/Rsh
//! for I by Newton iteration at every voltage.

use pv_types::constants::{thermal_voltage, EXP_ARG_LIMIT, STC_IRRADIANCE};
use pv_types::curve::{CurvePoint, IVCurve};
use pv_types::error::{PvError, PvResult};
use pv_types::results::DiodeParameters;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

const NEWTON_MAX_ITER: usize = 100;
const NEWTON_TOL: f64 = 1e-12;
const BISECTION_STEPS: usize = 200;

/// Cell (or string of identical cells) described by five parameters at
/// 1000 W/m².
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingleDiodeCell {
    pub params: DiodeParameters,
    pub temperature_c: f64,
    pub cells_in_series: u32,
}

impl SingleDiodeCell {
    pub fn new(params: DiodeParameters, temperature_c: f64) -> Self {
        SingleDiodeCell {
            params,
            temperature_c,
            cells_in_series: 1,
        }
    }

    pub fn with_cells_in_series(mut self, ns: u32) -> Self {
        self.cells_in_series = ns.max(1);
        self
    }

    /// Photocurrent scaled linearly with irradiance.
    pub fn photocurrent(&self, irradiance: f64) -> f64 {
        self.params.i_l * irradiance / STC_IRRADIANCE
    }

    fn modified_ideality(&self) -> f64 {
        self.params.n * f64::from(self.cells_in_series) * thermal_voltage(self.temperature_c)
    }

    /// Terminal current at `voltage`.
    pub fn current_at(&self, voltage: f64, irradiance: f64) -> f64 {
        let p = &self.params;
        let a = self.modified_ideality();
        let i_l = self.photocurrent(irradiance);
        let mut i = i_l;
        for _ in 0..NEWTON_MAX_ITER {
            let vd = voltage + i * p.rs;
            let e = (vd / a).min(EXP_ARG_LIMIT).exp();
            let f = i_l - i - p.i_0 * (e - 1.0) - vd / p.rsh;
            let df = -1.0 - p.i_0 * e * p.rs / a - p.rs / p.rsh;
            let step = f / df;
            i -= step;
            if step.abs() < NEWTON_TOL {
                break;
            }
        }
        i
    }

    /// Voltage where the terminal current crosses zero, by bisection.
    pub fn open_circuit_voltage(&self, irradiance: f64) -> f64 {
        let i_l = self.photocurrent(irradiance);
        if i_l <= 0.0 {
            return 0.0;
        }
        // Ideal-diode Voc bounds the shunted one from above.
        let mut hi = self.modified_ideality() * (i_l / self.params.i_0 + 1.0).ln();
        let mut lo = 0.0;
        for _ in 0..BISECTION_STEPS {
            let mid = 0.5 * (lo + hi);
            if self.current_at(mid, irradiance) > 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }

    /// Forward sweep of `n_points` equally spaced from 0 V to Voc.
    pub fn iv_curve(&self, n_points: usize, irradiance: f64) -> PvResult<IVCurve> {
        if n_points < 2 {
            return Err(PvError::InsufficientData {
                required: 2,
                actual: n_points,
            });
        }
        let voc = self.open_circuit_voltage(irradiance);
        let points = (0..n_points)
            .map(|k| {
                let v = voc * k as f64 / (n_points - 1) as f64;
                CurvePoint::new(v, self.current_at(v, irradiance))
            })
            .collect();
        IVCurve::new(points, irradiance, self.temperature_c)
    }
}

/// Gaussian measurement noise, reproducible from `seed`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseModel {
    /// Voltage standard deviation (V)
    pub voltage_sigma: f64,
    /// Current standard deviation (A)
    pub current_sigma: f64,
    pub seed: u64,
}

fn normal(sigma: f64, what: &str) -> PvResult<Normal<f64>> {
    // rand_distr only rejects a non-finite sigma
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(PvError::ConfigError(format!(
            "{what} noise sigma must be finite and >= 0, got {sigma}"
        )));
    }
    Normal::new(0.0, sigma)
        .map_err(|e| PvError::ConfigError(format!("{what} noise sigma {sigma}: {e}")))
}

/// Copy of `curve` with independent noise on every V and I sample.
pub fn add_noise(curve: &IVCurve, noise: &NoiseModel) -> PvResult<IVCurve> {
    let v_dist = normal(noise.voltage_sigma, "voltage")?;
    let i_dist = normal(noise.current_sigma, "current")?;
    let mut rng = StdRng::seed_from_u64(noise.seed);

    let points = curve
        .points
        .iter()
        .map(|p| {
            CurvePoint::new(
                p.voltage + v_dist.sample(&mut rng),
                p.current + i_dist.sample(&mut rng),
            )
        })
        .collect();
    Ok(IVCurve::new(points, curve.irradiance, curve.temperature_c)?
        .with_sweep_direction(curve.sweep_direction))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell() -> SingleDiodeCell {
        SingleDiodeCell::new(
            DiodeParameters {
                i_l: 8.5,
                i_0: 1e-9,
                rs: 0.005,
                rsh: 300.0,
                n: 1.3,
            },
            25.0,
        )
    }

    #[test]
    fn test_short_circuit_current() {
        let i_sc = cell().current_at(0.0, 1000.0);
        assert!((i_sc - 8.5).abs() < 1e-3, "Isc = {i_sc}");
    }

    #[test]
    fn test_current_decreases_with_voltage() {
        let c = cell();
        let curve = c.iv_curve(50, 1000.0).unwrap();
        for w in curve.points.windows(2) {
            assert!(w[1].current < w[0].current);
            assert!(w[1].voltage > w[0].voltage);
        }
    }

    #[test]
    fn test_open_circuit_current_is_zero() {
        let c = cell();
        let voc = c.open_circuit_voltage(1000.0);
        assert!(voc > 0.6 && voc < 0.8, "Voc = {voc}");
        assert!(c.current_at(voc, 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_series_string_scales_voltage() {
        let single = cell().open_circuit_voltage(1000.0);
        let module = cell().with_cells_in_series(60).open_circuit_voltage(1000.0);
        // Shunt leakage grows with string voltage, so slightly under 60×
        assert!((module / single - 60.0).abs() < 0.5);
    }

    #[test]
    fn test_photocurrent_scales_with_irradiance() {
        let c = cell();
        let ratio = c.current_at(0.0, 400.0) / c.current_at(0.0, 200.0);
        assert!((ratio - 2.0).abs() < 1e-3);
        assert_eq!(c.open_circuit_voltage(0.0), 0.0);
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let curve = cell().iv_curve(30, 1000.0).unwrap();
        let noise = NoiseModel {
            voltage_sigma: 0.001,
            current_sigma: 0.01,
            seed: 7,
        };
        let a = add_noise(&curve, &noise).unwrap();
        let b = add_noise(&curve, &noise).unwrap();
        assert_eq!(a, b);
        let c = add_noise(&curve, &NoiseModel { seed: 8, ..noise }).unwrap();
        assert_ne!(a, c);
        for (clean, noisy) in curve.points.iter().zip(a.points.iter()) {
            assert!((clean.current - noisy.current).abs() < 0.1);
        }
    }

    #[test]
    fn test_invalid_sigma_rejected() {
        let curve = cell().iv_curve(10, 1000.0).unwrap();
        let noise = NoiseModel {
            voltage_sigma: -1.0,
            current_sigma: 0.01,
            seed: 1,
        };
        assert!(add_noise(&curve, &noise).is_err());

        let nan_current = NoiseModel {
            voltage_sigma: 0.0,
            current_sigma: f64::NAN,
            seed: 1,
        };
        match add_noise(&curve, &nan_current).unwrap_err() {
            PvError::ConfigError(msg) => assert!(msg.contains("current"), "{msg}"),
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_zero_sigma_is_identity() {
        let curve = cell().iv_curve(10, 1000.0).unwrap();
        let quiet = NoiseModel {
            voltage_sigma: 0.0,
            current_sigma: 0.0,
            seed: 3,
        };
        assert_eq!(add_noise(&curve, &quiet).unwrap(), curve);
    }

    #[test]
    fn test_too_few_points() {
        assert!(cell().iv_curve(1, 1000.0).is_err());
    }
}
