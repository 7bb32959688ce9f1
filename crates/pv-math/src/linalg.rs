//! Linear algebra utilities.
//!
//! Small SVD and pseudoinverse, Householder least squares, and the damped
//! step used by the single-diode fitter.

use ndarray::{Array1, Array2};

/// Singular values below this are treated as zero.
pub const SV_CUTOFF: f64 = 1e-12;

/// SVD for tall, narrow matrices via Jacobi rotations on AᵀA.
///
/// Returns (U, sigma, Vt) with A ≈ U · diag(sigma) · Vt and sigma sorted
/// descending. Intended for the 2–8 column Jacobians of curve fits, where
/// forming AᵀA is cheap and accurate enough.
pub fn svd_small(a: &Array2<f64>) -> (Array2<f64>, Array1<f64>, Array2<f64>) {
    let (m, n) = a.dim();
    let k = m.min(n);

    let mut ata = a.t().dot(a);
    let mut v = Array2::eye(n);

    for _ in 0..100 {
        let off_diag: f64 = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .map(|(i, j)| ata[[i, j]].abs())
            .sum();
        if off_diag < 1e-14 {
            break;
        }

        for i in 0..n {
            for j in (i + 1)..n {
                let aij = ata[[i, j]];
                if aij.abs() < 1e-15 {
                    continue;
                }
                let tau = (ata[[j, j]] - ata[[i, i]]) / (2.0 * aij);
                let t = tau.signum() / (tau.abs() + (1.0 + tau * tau).sqrt());
                let t = if tau == 0.0 { 1.0 } else { t };
                let cos = 1.0 / (1.0 + t * t).sqrt();
                let sin = t * cos;

                let aii = ata[[i, i]];
                let ajj = ata[[j, j]];
                ata[[i, i]] = cos * cos * aii - 2.0 * sin * cos * aij + sin * sin * ajj;
                ata[[j, j]] = sin * sin * aii + 2.0 * sin * cos * aij + cos * cos * ajj;
                ata[[i, j]] = 0.0;
                ata[[j, i]] = 0.0;

                for r in 0..n {
                    if r == i || r == j {
                        continue;
                    }
                    let ri = ata[[r, i]];
                    let rj = ata[[r, j]];
                    ata[[r, i]] = cos * ri - sin * rj;
                    ata[[i, r]] = ata[[r, i]];
                    ata[[r, j]] = sin * ri + cos * rj;
                    ata[[j, r]] = ata[[r, j]];
                }

                for r in 0..n {
                    let vi = v[[r, i]];
                    let vj = v[[r, j]];
                    v[[r, i]] = cos * vi - sin * vj;
                    v[[r, j]] = sin * vi + cos * vj;
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| ata[[j, j]].total_cmp(&ata[[i, i]]));

    let mut sigma = Array1::zeros(k);
    let mut vt = Array2::zeros((k, n));
    for (idx, &col) in order.iter().take(k).enumerate() {
        sigma[idx] = ata[[col, col]].max(0.0).sqrt();
        for j in 0..n {
            vt[[idx, j]] = v[[j, col]];
        }
    }

    // U = A · V · diag(1/sigma)
    let av = a.dot(&vt.t());
    let mut u = Array2::zeros((m, k));
    for idx in 0..k {
        if sigma[idx] > 1e-14 {
            let inv_s = 1.0 / sigma[idx];
            for i in 0..m {
                u[[i, idx]] = av[[i, idx]] * inv_s;
            }
        }
    }

    (u, sigma, vt)
}

/// Moore-Penrose pseudoinverse with a singular value cutoff.
pub fn pinv_svd(a: &Array2<f64>, sv_cutoff: f64) -> Array2<f64> {
    let (u, sigma, vt) = svd_small(a);
    let (m, n) = a.dim();
    let mut result = Array2::zeros((n, m));

    for (idx, &s) in sigma.iter().enumerate() {
        if s <= sv_cutoff {
            continue;
        }
        let inv_s = 1.0 / s;
        for i in 0..n {
            for j in 0..m {
                result[[i, j]] += vt[[idx, i]] * inv_s * u[[j, idx]];
            }
        }
    }

    result
}

/// Euclidean norm of each column, floored at `floor`.
pub fn column_norms(a: &Array2<f64>, floor: f64) -> Array1<f64> {
    Array1::from_iter(
        a.columns()
            .into_iter()
            .map(|col| col.dot(&col).sqrt().max(floor)),
    )
}

/// Least-squares solution of min ‖A·x − b‖ by Householder QR.
///
/// Works on A itself, so the accuracy follows cond(A) rather than
/// cond(A)². Columns whose pivot falls below `SV_CUTOFF` relative to the
/// largest pivot are treated as rank-deficient and get x_k = 0.
pub fn lstsq_qr(a: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let (m, n) = a.dim();
    let steps = m.min(n);
    let mut r = a.clone();
    let mut qtb = b.clone();

    for k in 0..steps {
        let norm_x = (k..m).map(|i| r[[i, k]] * r[[i, k]]).sum::<f64>().sqrt();
        if norm_x == 0.0 {
            continue;
        }
        let alpha = if r[[k, k]] > 0.0 { -norm_x } else { norm_x };
        let mut v: Vec<f64> = (k..m).map(|i| r[[i, k]]).collect();
        v[0] -= alpha;
        let v_norm2: f64 = v.iter().map(|x| x * x).sum();
        if v_norm2 == 0.0 {
            continue;
        }

        for col in k..n {
            let dot: f64 = v.iter().enumerate().map(|(t, vt)| vt * r[[k + t, col]]).sum();
            let factor = 2.0 * dot / v_norm2;
            for (t, vt) in v.iter().enumerate() {
                r[[k + t, col]] -= factor * vt;
            }
        }
        let dot: f64 = v.iter().enumerate().map(|(t, vt)| vt * qtb[k + t]).sum();
        let factor = 2.0 * dot / v_norm2;
        for (t, vt) in v.iter().enumerate() {
            qtb[k + t] -= factor * vt;
        }
    }

    let pivot_max = (0..steps).map(|k| r[[k, k]].abs()).fold(0.0, f64::max);
    let mut x = Array1::zeros(n);
    for k in (0..steps).rev() {
        let pivot = r[[k, k]];
        if pivot.abs() <= SV_CUTOFF * pivot_max {
            continue;
        }
        let tail: f64 = ((k + 1)..n).map(|j| r[[k, j]] * x[j]).sum();
        x[k] = (qtb[k] - tail) / pivot;
    }
    x
}

/// Damped (Levenberg-Marquardt) step for min ‖J·δ + r‖².
///
/// Free columns are scaled to unit norm, stacked over `sqrt(lambda)·I`
/// (Tikhonov rows) and solved by QR without forming JᵀJ. Columns with
/// `active[j] == false` are frozen and get δ_j = 0.
pub fn damped_step(j: &Array2<f64>, r: &Array1<f64>, lambda: f64, active: &[bool]) -> Array1<f64> {
    let (rows, cols) = j.dim();
    let scale = column_norms(j, 1e-300);
    let sqrt_lambda = lambda.max(0.0).sqrt();
    let free: Vec<usize> = (0..cols)
        .filter(|&k| active.get(k).copied().unwrap_or(true))
        .collect();

    let mut delta = Array1::zeros(cols);
    if free.is_empty() {
        return delta;
    }

    let mut j_aug = Array2::zeros((rows + free.len(), free.len()));
    for (c, &k) in free.iter().enumerate() {
        for i in 0..rows {
            j_aug[[i, c]] = j[[i, k]] / scale[k];
        }
        j_aug[[rows + c, c]] = sqrt_lambda;
    }
    let mut rhs = Array1::zeros(rows + free.len());
    for i in 0..rows {
        rhs[i] = -r[i];
    }

    let scaled = lstsq_qr(&j_aug, &rhs);
    for (c, &k) in free.iter().enumerate() {
        delta[k] = scaled[c] / scale[k];
    }
    delta
}
