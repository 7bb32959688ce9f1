// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — Single-Diode Model
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Explicit single-diode model and its Jacobians.
//!
//! The measured current is substituted on the right-hand side, so the
//! model is explicit in V:
//!   I = I_L − I_0·(exp((V − I·Rs)/(n·Vt)) − 1) − (V − I·Rs)/Rsh
//!
//! The fitter works on the transformed vector
//!   x = [I_L, ln I_0, Rs, ln Rsh, n]
//! which keeps I_0 and Rsh positive and brings their scales within a few
//! decades of the other columns.

use ndarray::Array2;
use pv_types::constants::{thermal_voltage, EXP_ARG_LIMIT};
use pv_types::results::DiodeParameters;

pub const N_PARAMS: usize = 5;

pub const IDX_I_L: usize = 0;
pub const IDX_LN_I_0: usize = 1;
pub const IDX_RS: usize = 2;
pub const IDX_LN_RSH: usize = 3;
pub const IDX_N: usize = 4;

pub fn pack_params(p: &DiodeParameters) -> [f64; N_PARAMS] {
    [p.i_l, p.i_0.ln(), p.rs, p.rsh.ln(), p.n]
}

pub fn unpack_params(x: &[f64; N_PARAMS]) -> DiodeParameters {
    DiodeParameters {
        i_l: x[IDX_I_L],
        i_0: x[IDX_LN_I_0].exp(),
        rs: x[IDX_RS],
        rsh: x[IDX_LN_RSH].exp(),
        n: x[IDX_N],
    }
}

/// Clipped exponent argument and whether the clip was active.
fn diode_exponent(v_diode: f64, n: f64, vt: f64) -> (f64, bool) {
    let raw = v_diode / (n * vt);
    if raw > EXP_ARG_LIMIT {
        (EXP_ARG_LIMIT, true)
    } else if raw < -EXP_ARG_LIMIT {
        (-EXP_ARG_LIMIT, true)
    } else {
        (raw, false)
    }
}

/// Model current at one sample, with `measured_current` driving the Rs drop.
pub fn single_diode_current(
    voltage: f64,
    measured_current: f64,
    params: &DiodeParameters,
    temperature_c: f64,
) -> f64 {
    let vt = thermal_voltage(temperature_c);
    let v_diode = voltage - measured_current * params.rs;
    let (arg, _) = diode_exponent(v_diode, params.n, vt);
    params.i_l - params.i_0 * (arg.exp() - 1.0) - v_diode / params.rsh
}

/// Model currents for a whole sweep.
pub fn model_currents(
    voltages: &[f64],
    currents: &[f64],
    params: &DiodeParameters,
    temperature_c: f64,
) -> Vec<f64> {
    voltages
        .iter()
        .zip(currents.iter())
        .map(|(&v, &i)| single_diode_current(v, i, params, temperature_c))
        .collect()
}

/// Analytical Jacobian of the model currents w.r.t. the transformed vector.
///
/// Rows follow the samples; columns are [I_L, ln I_0, Rs, ln Rsh, n].
/// Where the exponent is clipped its sensitivity to Rs and n is zero.
pub fn analytical_jacobian(
    voltages: &[f64],
    currents: &[f64],
    x: &[f64; N_PARAMS],
    temperature_c: f64,
) -> Array2<f64> {
    let p = unpack_params(x);
    let vt = thermal_voltage(temperature_c);
    let a = p.n * vt;
    let rows = voltages.len().min(currents.len());
    let mut jac = Array2::zeros((rows, N_PARAMS));

    for (row, (&v, &i)) in voltages.iter().zip(currents.iter()).enumerate() {
        let v_diode = v - i * p.rs;
        let (arg, clipped) = diode_exponent(v_diode, p.n, vt);
        let e = arg.exp();
        let slope = if clipped { 0.0 } else { p.i_0 * e };

        jac[[row, IDX_I_L]] = 1.0;
        jac[[row, IDX_LN_I_0]] = -p.i_0 * (e - 1.0);
        jac[[row, IDX_RS]] = slope * i / a + i / p.rsh;
        jac[[row, IDX_LN_RSH]] = v_diode / p.rsh;
        jac[[row, IDX_N]] = slope * arg / p.n;
    }
    jac
}

/// Forward-difference Jacobian, step `fd_step·max(1, |x_k|)` per column.
pub fn fd_jacobian(
    voltages: &[f64],
    currents: &[f64],
    x: &[f64; N_PARAMS],
    temperature_c: f64,
    fd_step: f64,
) -> Array2<f64> {
    let base = model_currents(voltages, currents, &unpack_params(x), temperature_c);
    let mut jac = Array2::zeros((base.len(), N_PARAMS));

    for k in 0..N_PARAMS {
        let h = fd_step * x[k].abs().max(1.0);
        let mut xp = *x;
        xp[k] += h;
        let perturbed = model_currents(voltages, currents, &unpack_params(&xp), temperature_c);
        for (row, (&b, &q)) in base.iter().zip(perturbed.iter()).enumerate() {
            jac[[row, k]] = (q - b) / h;
        }
    }
    jac
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell() -> DiodeParameters {
        DiodeParameters {
            i_l: 8.5,
            i_0: 1e-9,
            rs: 0.005,
            rsh: 300.0,
            n: 1.2,
        }
    }

    #[test]
    fn test_short_circuit_current_near_photocurrent() {
        let p = cell();
        // At V = 0 with I = I_L the diode term is negligible
        let i = single_diode_current(0.0, p.i_l, &p, 25.0);
        assert!((i - p.i_l).abs() < 1e-3, "i = {i}");
    }

    #[test]
    fn test_current_falls_with_voltage() {
        let p = cell();
        let i_low = single_diode_current(0.3, 8.0, &p, 25.0);
        let i_high = single_diode_current(0.6, 8.0, &p, 25.0);
        assert!(i_high < i_low);
    }

    #[test]
    fn test_exponent_clip_keeps_finite() {
        let p = DiodeParameters { n: 0.5, ..cell() };
        let i = single_diode_current(1e4, 0.0, &p, 25.0);
        assert!(i.is_finite());
        let jac = analytical_jacobian(&[1e4], &[0.0], &pack_params(&p), 25.0);
        assert!(jac.iter().all(|v| v.is_finite()));
        assert_eq!(jac[[0, IDX_N]], 0.0);
    }

    #[test]
    fn test_pack_unpack_inverse() {
        let p = cell();
        let back = unpack_params(&pack_params(&p));
        assert!((back.i_0 - p.i_0).abs() / p.i_0 < 1e-12);
        assert!((back.rsh - p.rsh).abs() / p.rsh < 1e-12);
        assert_eq!(back.i_l, p.i_l);
    }

    #[test]
    fn test_jacobian_modes_agree() {
        let p = cell();
        let v: Vec<f64> = (0..12).map(|k| 0.05 * k as f64).collect();
        let i: Vec<f64> = v.iter().map(|&vv| 8.5 - 8.0 * (vv / 0.6).powi(8)).collect();
        let x = pack_params(&p);

        let ja = analytical_jacobian(&v, &i, &x, 25.0);
        let jf = fd_jacobian(&v, &i, &x, 25.0, 1e-7);
        assert_eq!(ja.dim(), jf.dim());

        for ((r, c), &a) in ja.indexed_iter() {
            let f = jf[[r, c]];
            let tol = 1e-4 * a.abs().max(1.0);
            assert!((a - f).abs() < tol, "J[{r},{c}] analytical={a} fd={f}");
        }
    }
}
