// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — Single-Diode Fitter
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Bounded Levenberg-Marquardt fit of the single-diode model.
//!
//! The fitter never returns `Err`: every failure mode comes back as a
//! [`DiodeModelFit`] with `fit_successful == false` and a message, so a
//! bad fit never aborts the surrounding analysis.
//!
//! Two starts are tried: one read off the curve shape and the configured
//! one. The lowest-cost converged result that still describes a cell wins.

use crate::diode::{
    analytical_jacobian, fd_jacobian, model_currents, pack_params, unpack_params, N_PARAMS,
};
use ndarray::{Array1, Array2};
use pv_math::linalg::{damped_step, pinv_svd, SV_CUTOFF};
use pv_math::regression::fit_line;
use pv_types::config::{DiodeFitConfig, JacobianMode};
use pv_types::constants::thermal_voltage;
use pv_types::results::{DiodeModelFit, DiodeParameters};

/// Fewest samples for a five-parameter fit.
pub const MIN_FIT_POINTS: usize = 5;

const INITIAL_LAMBDA: f64 = 1e-3;
const LAMBDA_FLOOR: f64 = 1e-12;
const LAMBDA_CEILING: f64 = 1e15;
const LAMBDA_DOWN: f64 = 3.0;
const LAMBDA_UP: f64 = 4.0;

/// Low-voltage share of the sweep used for the I_L / Rsh line.
const SHUNT_WINDOW: f64 = 0.2;
/// Diode current, as a fraction of I_L, above which a point enters the
/// ln I_0 / n / Rs regression.
const DIODE_REGION_FRACTION: f64 = 0.02;
/// Largest Rs/Rsh that still describes a cell. With the measured current
/// in the shunt term, Rs/Rsh = c lets the model echo the data with
/// I_L scaled by (1 − c); at c → 1 it reproduces any curve.
const MAX_RS_TO_RSH: f64 = 0.1;
/// Smallest fitted I_L, as a fraction of max(I), that still describes a cell.
const MIN_I_L_FRACTION: f64 = 0.8;

/// Why the iteration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Termination {
    CostTolerance,
    StepTolerance,
    ExactFit,
    /// No step reduces the cost and the projected gradient is below gtol.
    Stationary,
    /// Every parameter is pinned at a bound.
    Bounded,
}

enum AttemptError {
    BudgetExceeded,
    NotConverged(String),
}

struct Attempt {
    x: [f64; N_PARAMS],
    r: Array1<f64>,
    cost: f64,
    termination: Termination,
}

#[derive(Default)]
struct Counters {
    iterations: usize,
    evaluations: usize,
}

struct Problem<'a> {
    voltages: &'a [f64],
    currents: &'a [f64],
    temperature_c: f64,
    ss_tot: f64,
    lower: [f64; N_PARAMS],
    upper: [f64; N_PARAMS],
}

impl Problem<'_> {
    fn residuals(&self, x: &[f64; N_PARAMS]) -> Array1<f64> {
        let model = model_currents(
            self.voltages,
            self.currents,
            &unpack_params(x),
            self.temperature_c,
        );
        Array1::from_iter(
            model
                .iter()
                .zip(self.currents.iter())
                .map(|(m, i)| m - i),
        )
    }

    fn project(&self, x: &mut [f64; N_PARAMS]) {
        for k in 0..N_PARAMS {
            x[k] = x[k].clamp(self.lower[k], self.upper[k]);
        }
    }

    fn jacobian(
        &self,
        x: &[f64; N_PARAMS],
        cfg: &DiodeFitConfig,
        counters: &mut Counters,
    ) -> Array2<f64> {
        match cfg.jacobian_mode {
            JacobianMode::Analytical => {
                analytical_jacobian(self.voltages, self.currents, x, self.temperature_c)
            }
            JacobianMode::FiniteDifference => {
                counters.evaluations += N_PARAMS;
                fd_jacobian(self.voltages, self.currents, x, self.temperature_c, cfg.fd_step)
            }
        }
    }

    /// One Levenberg-Marquardt run from `x`.
    fn minimize(
        &self,
        mut x: [f64; N_PARAMS],
        cfg: &DiodeFitConfig,
        counters: &mut Counters,
    ) -> Result<Attempt, AttemptError> {
        self.project(&mut x);
        counters.evaluations += 1;
        let mut r = self.residuals(&x);
        let mut f = cost(&r);
        if !f.is_finite() {
            return Err(AttemptError::NotConverged(
                "initial residual is not finite".to_string(),
            ));
        }

        let mut lambda = INITIAL_LAMBDA;
        let termination = 'outer: loop {
            if f == 0.0 {
                break Termination::ExactFit;
            }
            counters.iterations += 1;

            let jac = self.jacobian(&x, cfg, counters);
            let grad = jac.t().dot(&r);

            // Freeze parameters pinned at a bound with the descent direction outward.
            let active: Vec<bool> = (0..N_PARAMS)
                .map(|k| {
                    let at_lower = x[k] <= self.lower[k] && grad[k] > 0.0;
                    let at_upper = x[k] >= self.upper[k] && grad[k] < 0.0;
                    !(at_lower || at_upper)
                })
                .collect();
            if active.iter().all(|a| !a) {
                break Termination::Bounded;
            }

            loop {
                if counters.evaluations >= cfg.max_evaluations {
                    return Err(AttemptError::BudgetExceeded);
                }

                let delta = damped_step(&jac, &r, lambda, &active);
                let mut x_trial = x;
                for k in 0..N_PARAMS {
                    x_trial[k] += delta[k];
                }
                self.project(&mut x_trial);

                counters.evaluations += 1;
                let r_trial = self.residuals(&x_trial);
                let f_trial = cost(&r_trial);

                if f_trial.is_finite() && f_trial < f {
                    let step: Vec<f64> =
                        x_trial.iter().zip(x.iter()).map(|(a, b)| a - b).collect();
                    let reduction = f - f_trial;
                    let small_step = norm(&step) <= cfg.xtol * (norm(&x) + cfg.xtol);

                    x = x_trial;
                    r = r_trial;
                    f = f_trial;
                    lambda = (lambda / LAMBDA_DOWN).max(LAMBDA_FLOOR);

                    if reduction <= cfg.ftol * (f + reduction) {
                        break 'outer Termination::CostTolerance;
                    }
                    if small_step {
                        break 'outer Termination::StepTolerance;
                    }
                    break;
                }

                lambda *= LAMBDA_UP;
                if lambda > LAMBDA_CEILING {
                    let cosine = gradient_cosine(&jac, &r, &active);
                    // Residual at rounding level: the cosine is noise there.
                    if cosine <= cfg.gtol || 2.0 * f <= cfg.ftol * self.ss_tot {
                        break 'outer Termination::Stationary;
                    }
                    return Err(AttemptError::NotConverged(format!(
                        "no descent step at maximum damping (gradient cosine {cosine:.3e})"
                    )));
                }
            }
        };

        Ok(Attempt {
            x,
            r,
            cost: f,
            termination,
        })
    }
}

fn cost(r: &Array1<f64>) -> f64 {
    0.5 * r.dot(r)
}

fn norm(x: &[f64]) -> f64 {
    x.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Largest |cos| between the residual and a free Jacobian column.
fn gradient_cosine(jac: &Array2<f64>, r: &Array1<f64>, active: &[bool]) -> f64 {
    let r_norm = r.dot(r).sqrt();
    if r_norm == 0.0 {
        return 0.0;
    }
    jac.columns()
        .into_iter()
        .zip(active.iter())
        .filter(|(_, free)| **free)
        .map(|(col, _)| {
            let col_norm = col.dot(&col).sqrt();
            if col_norm == 0.0 {
                0.0
            } else {
                col.dot(r).abs() / (col_norm * r_norm)
            }
        })
        .fold(0.0, f64::max)
}

fn validate_samples(voltages: &[f64], currents: &[f64]) -> Result<f64, String> {
    if voltages.len() != currents.len() {
        return Err(format!(
            "voltage and current lengths differ ({} vs {})",
            voltages.len(),
            currents.len()
        ));
    }
    if voltages.len() < MIN_FIT_POINTS {
        return Err(format!(
            "need at least {MIN_FIT_POINTS} points for a diode fit, got {}",
            voltages.len()
        ));
    }
    if let Some(idx) = voltages
        .iter()
        .zip(currents.iter())
        .position(|(v, i)| !v.is_finite() || !i.is_finite())
    {
        return Err(format!("non-finite sample at index {idx}"));
    }
    let i_max = currents.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if i_max <= 0.0 {
        return Err(format!("photocurrent bounds are degenerate: max current is {i_max}"));
    }
    Ok(i_max)
}

/// Starting point read off the curve shape.
///
/// I_L and Rsh come from a line through the low-voltage end of the sweep;
/// ln I_0, n and Rs from regressing ln(I_L − I − V/Rsh) on V and I over the
/// diode-dominated points, since there
///   ln(I_L − I − V/Rsh) ≈ ln I_0 + V/(n·Vt) − I·Rs/(n·Vt).
/// `None` when either region is too thin to regress.
fn estimate_start(
    voltages: &[f64],
    currents: &[f64],
    temperature_c: f64,
) -> Option<DiodeParameters> {
    let v_min = voltages.iter().copied().fold(f64::INFINITY, f64::min);
    let v_max = voltages.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = v_max - v_min;
    if !span.is_finite() || span <= 0.0 {
        return None;
    }

    let (low_v, low_i): (Vec<f64>, Vec<f64>) = voltages
        .iter()
        .zip(currents.iter())
        .filter(|&(&v, _)| v <= v_min + SHUNT_WINDOW * span)
        .map(|(&v, &i)| (v, i))
        .unzip();
    if low_v.len() < 3 {
        return None;
    }
    let line = fit_line(&low_v, &low_i)?;
    let i_l = line.intercept;
    if !i_l.is_finite() || i_l <= 0.0 {
        return None;
    }
    let rsh = if line.slope < 0.0 {
        -1.0 / line.slope
    } else {
        f64::INFINITY
    };

    let floor = DIODE_REGION_FRACTION * i_l;
    let mut design = Vec::new();
    let mut target = Vec::new();
    for (&v, &i) in voltages.iter().zip(currents.iter()) {
        let diode = i_l - i - v / rsh;
        if diode > floor {
            design.extend_from_slice(&[1.0, v, i]);
            target.push(diode.ln());
        }
    }
    if target.len() < 4 {
        return None;
    }
    let a = Array2::from_shape_vec((target.len(), 3), design).ok()?;
    let coef = pinv_svd(&a, SV_CUTOFF).dot(&Array1::from(target));
    let (ln_i_0, inv_nvt, rs_term) = (coef[0], coef[1], coef[2]);
    if !(ln_i_0.is_finite() && rs_term.is_finite() && inv_nvt.is_finite()) || inv_nvt <= 0.0 {
        return None;
    }

    Some(DiodeParameters {
        i_l,
        i_0: ln_i_0.exp(),
        rs: -rs_term / inv_nvt,
        rsh,
        n: 1.0 / (inv_nvt * thermal_voltage(temperature_c)),
    })
}

/// Why fitted parameters do not describe a cell, if they do not.
fn uncharacterized(p: &DiodeParameters, i_max: f64) -> Option<String> {
    if p.rs > MAX_RS_TO_RSH * p.rsh {
        return Some(format!(
            "series resistance {:.4} Ω is comparable to shunt resistance {:.4} Ω",
            p.rs, p.rsh
        ));
    }
    if p.i_l < MIN_I_L_FRACTION * i_max {
        return Some(format!(
            "photocurrent {:.4} A is far below the measured maximum {i_max:.4} A",
            p.i_l
        ));
    }
    None
}

/// Fit [I_L, I_0, Rs, Rsh, n] to a sweep by bounded least squares.
///
/// Bounds come from `cfg`, except I_L ∈ [0, `i_l_upper_factor`·max(I)].
/// Reports R² against the measured currents and RMSE in amperes.
///
/// Failures: the evaluation budget runs out before any start converges;
/// every start stalls or ends on parameters that do not describe a cell;
/// the best fit has R² ≤ 0.
pub fn fit_single_diode(
    voltages: &[f64],
    currents: &[f64],
    temperature_c: f64,
    cfg: &DiodeFitConfig,
) -> DiodeModelFit {
    if let Err(e) = cfg.validate() {
        return DiodeModelFit::failure(e.to_string(), 0, 0);
    }
    let i_max = match validate_samples(voltages, currents) {
        Ok(i_max) => i_max,
        Err(msg) => return DiodeModelFit::failure(msg, 0, 0),
    };

    let n_points = currents.len() as f64;
    let mean = currents.iter().sum::<f64>() / n_points;
    let ss_tot: f64 = currents.iter().map(|i| (i - mean).powi(2)).sum();
    if ss_tot <= 0.0 {
        return DiodeModelFit::failure("current has zero variance; R² is undefined", 0, 0);
    }

    let problem = Problem {
        voltages,
        currents,
        temperature_c,
        ss_tot,
        lower: [
            0.0,
            cfg.i_0_bounds.lower.ln(),
            cfg.rs_bounds.lower,
            cfg.rsh_bounds.lower.ln(),
            cfg.n_bounds.lower,
        ],
        upper: [
            cfg.i_l_upper_factor * i_max,
            cfg.i_0_bounds.upper.ln(),
            cfg.rs_bounds.upper,
            cfg.rsh_bounds.upper.ln(),
            cfg.n_bounds.upper,
        ],
    };

    let configured = DiodeParameters {
        i_l: cfg.initial_i_l.unwrap_or(i_max),
        i_0: cfg.initial_i_0,
        rs: cfg.initial_rs,
        rsh: cfg.initial_rsh,
        n: cfg.initial_n,
    };
    let starts: Vec<DiodeParameters> = estimate_start(voltages, currents, temperature_c)
        .into_iter()
        .chain(std::iter::once(configured))
        .collect();

    let mut counters = Counters::default();
    let mut best: Option<Attempt> = None;
    let mut last_failure = String::from("no starting point");

    for start in &starts {
        match problem.minimize(pack_params(start), cfg, &mut counters) {
            Ok(attempt) => {
                let params = unpack_params(&attempt.x);
                if let Some(reason) = uncharacterized(&params, i_max) {
                    log::trace!("diode fit start {start:?} rejected: {reason}");
                    last_failure = format!("could not characterize the curve: {reason}");
                } else if best.as_ref().map_or(true, |b| attempt.cost < b.cost) {
                    best = Some(attempt);
                }
            }
            Err(AttemptError::BudgetExceeded) => {
                log::debug!(
                    "diode fit exhausted {} evaluations after {} iterations",
                    counters.evaluations,
                    counters.iterations
                );
                if best.is_some() {
                    break;
                }
                return DiodeModelFit::failure(
                    format!("maximum function evaluations ({}) exceeded", cfg.max_evaluations),
                    counters.iterations,
                    counters.evaluations,
                );
            }
            Err(AttemptError::NotConverged(reason)) => {
                log::trace!("diode fit start {start:?} did not converge: {reason}");
                last_failure = reason;
            }
        }
    }

    let Some(attempt) = best else {
        return DiodeModelFit::failure(last_failure, counters.iterations, counters.evaluations);
    };

    let params = unpack_params(&attempt.x);
    let ss_res = attempt.r.dot(&attempt.r);
    let r_squared = 1.0 - ss_res / ss_tot;
    let rmse = (ss_res / n_points).sqrt();
    if !r_squared.is_finite() || !rmse.is_finite() {
        return DiodeModelFit::failure(
            "goodness of fit is not finite",
            counters.iterations,
            counters.evaluations,
        );
    }
    if r_squared <= 0.0 {
        return DiodeModelFit::failure(
            format!("fit explains no more variance than the mean current (R² = {r_squared:.4})"),
            counters.iterations,
            counters.evaluations,
        );
    }

    log::debug!(
        "diode fit stopped ({:?}) after {} iterations, {} evaluations: \
         R²={r_squared:.6}, RMSE={rmse:.3e} A",
        attempt.termination,
        counters.iterations,
        counters.evaluations
    );
    DiodeModelFit::success(
        params,
        r_squared,
        rmse,
        counters.iterations,
        counters.evaluations,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pv_diagnostics::{add_noise, NoiseModel, SingleDiodeCell};
    use pv_types::config::Bounds;

    // Rs = 0 makes the explicit model exact for its own samples.
    fn synthetic_sweep(n_points: usize) -> (Vec<f64>, Vec<f64>) {
        let (i_l, i_0, n, rsh) = (8.5, 1e-9, 1.3, 500.0);
        let a = n * thermal_voltage(25.0);
        let v: Vec<f64> = (0..n_points)
            .map(|k| 0.74 * k as f64 / (n_points - 1) as f64)
            .collect();
        let i = v
            .iter()
            .map(|&vv| i_l - i_0 * ((vv / a).exp() - 1.0) - vv / rsh)
            .collect();
        (v, i)
    }

    #[test]
    fn test_fit_recovers_synthetic_curve_from_nearby_start() {
        let (v, i) = synthetic_sweep(40);
        let cfg = DiodeFitConfig {
            initial_i_0: 5e-9,
            initial_rs: 0.0,
            initial_rsh: 400.0,
            initial_n: 1.4,
            ..DiodeFitConfig::default()
        };
        let fit = fit_single_diode(&v, &i, 25.0, &cfg);
        assert!(fit.fit_successful, "{:?}", fit.error);
        let r2 = fit.r_squared.unwrap();
        assert!(r2 > 0.999, "R² = {r2}");
        let p = fit.parameters.unwrap();
        assert!((p.i_l - 8.5).abs() < 0.05, "I_L = {}", p.i_l);
    }

    #[test]
    fn test_fit_from_default_start() {
        let (v, i) = synthetic_sweep(40);
        let fit = fit_single_diode(&v, &i, 25.0, &DiodeFitConfig::default());
        assert!(fit.fit_successful, "{:?}", fit.error);
        assert!(fit.r_squared.unwrap() > 0.95);
        assert!(fit.iterations >= 1);
        assert!(fit.evaluations <= DiodeFitConfig::default().max_evaluations);
    }

    #[test]
    fn test_parameters_respect_bounds() {
        let (v, i) = synthetic_sweep(30);
        let cfg = DiodeFitConfig::default();
        let p = fit_single_diode(&v, &i, 25.0, &cfg).parameters.unwrap();
        let i_max = i.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!(p.i_l >= 0.0 && p.i_l <= cfg.i_l_upper_factor * i_max + 1e-12);
        assert!(p.i_0 >= cfg.i_0_bounds.lower * (1.0 - 1e-9));
        assert!(p.i_0 <= cfg.i_0_bounds.upper * (1.0 + 1e-9));
        assert!(cfg.rs_bounds.contains(p.rs));
        assert!(p.rsh >= cfg.rsh_bounds.lower * (1.0 - 1e-9));
        assert!(p.rsh <= cfg.rsh_bounds.upper * (1.0 + 1e-9));
        assert!(cfg.n_bounds.contains(p.n));
    }

    #[test]
    fn test_jacobian_modes_reach_same_quality() {
        let (v, i) = synthetic_sweep(30);
        let analytical = fit_single_diode(&v, &i, 25.0, &DiodeFitConfig::default());
        let fd = fit_single_diode(
            &v,
            &i,
            25.0,
            &DiodeFitConfig {
                jacobian_mode: JacobianMode::FiniteDifference,
                ..DiodeFitConfig::default()
            },
        );
        assert!(analytical.fit_successful && fd.fit_successful);
        assert!(analytical.r_squared.unwrap() > 0.999, "{analytical:?}");
        let diff = (analytical.r_squared.unwrap() - fd.r_squared.unwrap()).abs();
        assert!(diff < 1e-3, "R² differs by {diff}");
    }

    #[test]
    fn test_estimated_start_is_close() {
        let (v, i) = synthetic_sweep(40);
        let p = estimate_start(&v, &i, 25.0).unwrap();
        assert!((p.i_l - 8.5).abs() < 1e-3, "I_L = {}", p.i_l);
        assert!((p.n - 1.3).abs() < 0.02, "n = {}", p.n);
        assert!((p.rsh - 500.0).abs() < 5.0, "Rsh = {}", p.rsh);
        assert!(p.rs.abs() < 1e-3, "Rs = {}", p.rs);
    }

    #[test]
    fn test_no_estimate_for_sparse_sweep() {
        let v = [0.0, 0.3, 0.5, 0.6, 0.65];
        let i = [8.5, 8.3, 7.0, 4.0, 0.5];
        assert!(estimate_start(&v, &i, 25.0).is_none());
    }

    fn series_resistance_cell() -> SingleDiodeCell {
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

    fn assert_describes_cell(fit: &DiodeModelFit, i_max: f64) {
        let p = fit.parameters.unwrap();
        assert!(p.i_l >= MIN_I_L_FRACTION * i_max, "I_L = {}", p.i_l);
        assert!(p.rs <= MAX_RS_TO_RSH * p.rsh, "Rs = {}, Rsh = {}", p.rs, p.rsh);
    }

    #[test]
    fn test_series_resistance_curve_is_characterized() {
        let curve = series_resistance_cell().iv_curve(60, 1000.0).unwrap();
        let (v, i) = (curve.voltages(), curve.currents());
        let fit = fit_single_diode(&v, &i, 25.0, &DiodeFitConfig::default());
        assert!(fit.fit_successful, "{:?}", fit.error);
        assert!(fit.r_squared.unwrap() > 0.99, "R² = {:?}", fit.r_squared);
        assert_describes_cell(&fit, 8.5);
        let p = fit.parameters.unwrap();
        assert!((p.i_l - 8.5).abs() < 0.85, "I_L = {}", p.i_l);
    }

    #[test]
    fn test_noisy_series_resistance_curve_never_echoes() {
        let clean = series_resistance_cell().iv_curve(60, 1000.0).unwrap();
        for seed in 0..4 {
            let noisy = add_noise(
                &clean,
                &NoiseModel {
                    voltage_sigma: 0.001,
                    current_sigma: 0.01,
                    seed,
                },
            )
            .unwrap();
            let i = noisy.currents();
            let i_max = i.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let fit = fit_single_diode(&noisy.voltages(), &i, 25.0, &DiodeFitConfig::default());
            if fit.fit_successful {
                assert_describes_cell(&fit, i_max);
            } else {
                assert!(fit.parameters.is_none());
            }
        }
    }

    #[test]
    fn test_shunt_echo_parameters_rejected() {
        let echo = DiodeParameters {
            i_l: 0.108,
            i_0: 1e-9,
            rs: 10.0,
            rsh: 10.09,
            n: 1.3,
        };
        let reason = uncharacterized(&echo, 8.5).unwrap();
        assert!(reason.contains("shunt"), "{reason}");

        let weak = DiodeParameters {
            i_l: 2.0,
            rs: 0.01,
            rsh: 300.0,
            ..echo
        };
        assert!(uncharacterized(&weak, 8.5).unwrap().contains("photocurrent"));

        let cell = DiodeParameters {
            i_l: 8.5,
            rs: 0.005,
            rsh: 300.0,
            ..echo
        };
        assert!(uncharacterized(&cell, 8.5).is_none());
    }

    #[test]
    fn test_gradient_cosine() {
        let jac = Array2::from_shape_vec((3, 2), vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0]).unwrap();
        let r = Array1::from(vec![2.0, 0.0, 0.0]);
        assert!((gradient_cosine(&jac, &r, &[true, true]) - 1.0).abs() < 1e-15);
        assert_eq!(gradient_cosine(&jac, &r, &[false, true]), 0.0);
        assert_eq!(gradient_cosine(&jac, &Array1::zeros(3), &[true, true]), 0.0);
    }

    #[test]
    fn test_inverted_bounds_fail_without_panic() {
        let (v, i) = synthetic_sweep(30);
        let cfg = DiodeFitConfig {
            n_bounds: Bounds::new(5.0, 0.5),
            ..DiodeFitConfig::default()
        };
        let fit = fit_single_diode(&v, &i, 25.0, &cfg);
        assert!(!fit.fit_successful);
        assert_eq!(fit.evaluations, 0);
        assert!(fit.error.unwrap().contains("fit.n_bounds"));
    }

    #[test]
    fn test_zero_current_is_structured_failure() {
        let v = [0.0, 0.1, 0.2, 0.3, 0.4, 0.5];
        let i = [0.0; 6];
        let fit = fit_single_diode(&v, &i, 25.0, &DiodeFitConfig::default());
        assert!(!fit.fit_successful);
        assert!(fit.parameters.is_none());
        assert!(fit.r_squared.is_none());
        assert!(fit.error.unwrap().contains("degenerate"));
    }

    #[test]
    fn test_too_few_points() {
        let fit = fit_single_diode(
            &[0.0, 0.2, 0.4, 0.6],
            &[8.0, 7.5, 5.0, 0.0],
            25.0,
            &DiodeFitConfig::default(),
        );
        assert!(!fit.fit_successful);
        assert_eq!(fit.evaluations, 0);
    }

    #[test]
    fn test_bad_input_shapes() {
        let cfg = DiodeFitConfig::default();
        let mismatch = fit_single_diode(&[0.0; 6], &[1.0; 5], 25.0, &cfg);
        assert!(mismatch.error.unwrap().contains("lengths differ"));

        let mut i = vec![8.0, 7.9, 7.5, 6.0, 3.0, 0.0];
        i[2] = f64::NAN;
        let nan = fit_single_diode(&[0.0, 0.1, 0.2, 0.3, 0.4, 0.5], &i, 25.0, &cfg);
        assert!(nan.error.unwrap().contains("index 2"));
    }

    #[test]
    fn test_flat_current_has_undefined_r_squared() {
        let v = [0.0, 0.1, 0.2, 0.3, 0.4];
        let fit = fit_single_diode(&v, &[2.0; 5], 25.0, &DiodeFitConfig::default());
        assert!(!fit.fit_successful);
        assert!(fit.error.unwrap().contains("variance"));
    }

    #[test]
    fn test_evaluation_budget_exceeded() {
        let (v, i) = synthetic_sweep(20);
        let cfg = DiodeFitConfig {
            max_evaluations: 1,
            ..DiodeFitConfig::default()
        };
        let fit = fit_single_diode(&v, &i, 25.0, &cfg);
        assert!(!fit.fit_successful);
        assert!(fit.error.unwrap().contains("evaluations"));
        assert_eq!(fit.evaluations, 1);
    }
}
