//! Variance inflation factors
//!
//! Each numeric feature is regressed on all the others via least squares;
//! VIF = 1 / (1 − R²). Features with VIF above the configured cutoff are
//! flagged as multicollinear.

use ndarray::{Array1, Array2};
use std::collections::BTreeMap;

/// Upper bound applied to VIF so perfectly collinear features stay finite
/// and JSON-serializable
const VIF_CAP: f64 = 1e9;

/// Compute the VIF of every feature in `data` (rows × features).
/// Feature order follows `names`. Features whose regression is degenerate
/// (zero variance) are omitted from the result.
pub fn variance_inflation_factors(
    data: &Array2<f64>,
    names: &[String],
) -> BTreeMap<String, f64> {
    let mut result = BTreeMap::new();
    let (n_rows, n_features) = data.dim();
    if n_features < 2 || n_rows <= n_features {
        return result;
    }

    for j in 0..n_features {
        let y: Array1<f64> = data.column(j).to_owned();

        // Design matrix: all other features plus an intercept column
        let mut x = Array2::ones((n_rows, n_features));
        let mut out_col = 0;
        for k in 0..n_features {
            if k == j {
                continue;
            }
            x.column_mut(out_col).assign(&data.column(k));
            out_col += 1;
        }
        // Last column stays all-ones as intercept

        let Some(r_squared) = regression_r_squared(&x, &y) else {
            continue;
        };

        let vif = if r_squared >= 1.0 {
            VIF_CAP
        } else {
            (1.0 / (1.0 - r_squared)).min(VIF_CAP)
        };
        result.insert(names[j].clone(), vif);
    }

    result
}

/// R² of the least-squares fit of `y` on `x`. `None` when the target has
/// zero variance or the system cannot be solved.
fn regression_r_squared(x: &Array2<f64>, y: &Array1<f64>) -> Option<f64> {
    let n = y.len() as f64;
    let y_mean = y.sum() / n;
    let ss_tot: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
    if ss_tot < 1e-12 {
        return None;
    }

    let w = solve_least_squares(x, y)?;
    let predictions = x.dot(&w);
    let ss_res: f64 = y
        .iter()
        .zip(predictions.iter())
        .map(|(yi, pi)| (yi - pi).powi(2))
        .sum();

    Some((1.0 - ss_res / ss_tot).clamp(0.0, 1.0))
}

/// Solve least squares via normal equations: (X^T X) w = X^T y.
/// Cholesky first, Gauss-Jordan inverse as fallback.
fn solve_least_squares(x: &Array2<f64>, y: &Array1<f64>) -> Option<Array1<f64>> {
    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);

    if let Some(result) = cholesky_solve(&xtx, &xty) {
        return Some(result);
    }

    matrix_inverse(&xtx).map(|inv| inv.dot(&xty))
}

/// Solve symmetric positive-definite Ax = b by Cholesky decomposition,
/// retrying once with ridge regularization when A is near-singular.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    match cholesky_factor(a) {
        Some(l) => Some(cholesky_substitute(&l, b)),
        None => {
            let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
            let mut a_reg = a.clone();
            for k in 0..n {
                a_reg[[k, k]] += ridge;
            }
            cholesky_factor(&a_reg).map(|l| cholesky_substitute(&l, b))
        }
    }
}

/// Lower-triangular factor L with A = L·Lᵀ, or `None` when A is not
/// positive definite
fn cholesky_factor(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }
    Some(l)
}

fn cholesky_substitute(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = l.nrows();

    // Forward: L·y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward: Lᵀ·x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }
    x
}

/// Gauss-Jordan matrix inverse for small systems (fallback path)
fn matrix_inverse(m: &Array2<f64>) -> Option<Array2<f64>> {
    let n = m.nrows();
    if n != m.ncols() {
        return None;
    }

    let mut aug = Array2::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = m[[i, j]];
        }
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        let mut max_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[max_row, col]].abs() {
                max_row = row;
            }
        }

        if max_row != col {
            for j in 0..2 * n {
                let tmp = aug[[col, j]];
                aug[[col, j]] = aug[[max_row, j]];
                aug[[max_row, j]] = tmp;
            }
        }

        if aug[[col, col]].abs() < 1e-10 {
            return None;
        }

        let pivot = aug[[col, col]];
        for j in 0..2 * n {
            aug[[col, j]] /= pivot;
        }

        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..2 * n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    let mut inv = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            inv[[i, j]] = aug[[i, n + j]];
        }
    }
    Some(inv)
}
