//! Linear algebra operations for factor loading estimation and risk checks.

use ndarray::{Array1, Array2};

use crate::MathError;

/// Result of an ordinary least squares fit.
#[derive(Debug, Clone)]
pub struct OlsResult {
    /// Estimated coefficients, one per design-matrix column.
    pub coefficients: Array1<f64>,
    /// In-sample residuals `y - X * beta`.
    pub residuals: Array1<f64>,
    /// Coefficient of determination.
    pub r_squared: f64,
}

/// Relative threshold below which a diagonal entry of R marks rank deficiency.
const RANK_TOLERANCE: f64 = 1e-12;

/// Ordinary least squares regression.
///
/// Solves `argmin_beta ||y - X * beta||²` by Householder QR of the design
/// matrix, which avoids squaring the condition number the way the normal
/// equations do.
///
/// # Arguments
/// * `y` - Response vector (n,)
/// * `x` - Design matrix (n x p), including any intercept column
///
/// # Errors
/// Returns `MathError::InsufficientObservations` unless `n > p`,
/// `MathError::DimensionMismatch` if `y` and `x` disagree, and
/// `MathError::LinearAlgebra` if `x` is rank deficient.
pub fn ordinary_least_squares(y: &Array1<f64>, x: &Array2<f64>) -> Result<OlsResult, MathError> {
    let (n, p) = x.dim();

    if y.len() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: y.len() });
    }
    if n == 0 || p == 0 {
        return Err(MathError::EmptyData);
    }
    if n <= p {
        return Err(MathError::InsufficientObservations { parameters: p, observations: n });
    }
    if y.iter().chain(x.iter()).any(|v| !v.is_finite()) {
        return Err(MathError::NumericalInstability("non-finite value in regression input".into()));
    }

    let mut r = x.to_owned();
    let mut qty = y.to_owned();

    for k in 0..p {
        let norm = (k..n).map(|i| r[[i, k]].powi(2)).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Err(MathError::LinearAlgebra(format!("design matrix column {k} is zero")));
        }
        let alpha = if r[[k, k]] > 0.0 { -norm } else { norm };

        // Householder vector v = x_k - alpha * e_1
        let mut v: Vec<f64> = (k..n).map(|i| r[[i, k]]).collect();
        v[0] -= alpha;
        let v_norm_sq: f64 = v.iter().map(|vi| vi * vi).sum();
        if v_norm_sq == 0.0 {
            continue;
        }

        for j in k..p {
            let dot: f64 = (k..n).map(|i| v[i - k] * r[[i, j]]).sum();
            let scale = 2.0 * dot / v_norm_sq;
            for i in k..n {
                r[[i, j]] -= scale * v[i - k];
            }
        }

        let dot: f64 = (k..n).map(|i| v[i - k] * qty[i]).sum();
        let scale = 2.0 * dot / v_norm_sq;
        for i in k..n {
            qty[i] -= scale * v[i - k];
        }
    }

    let max_diag = (0..p).map(|k| r[[k, k]].abs()).fold(0.0, f64::max);
    for k in 0..p {
        if r[[k, k]].abs() <= RANK_TOLERANCE * max_diag {
            return Err(MathError::LinearAlgebra(format!(
                "design matrix is rank deficient at column {k}"
            )));
        }
    }

    // Back substitution on the upper triangle
    let mut coefficients = Array1::zeros(p);
    for i in (0..p).rev() {
        let mut sum = qty[i];
        for j in (i + 1)..p {
            sum -= r[[i, j]] * coefficients[j];
        }
        coefficients[i] = sum / r[[i, i]];
    }

    let fitted = x.dot(&coefficients);
    let residuals = y - &fitted;

    let y_mean = y.mean().unwrap_or(0.0);
    let ss_tot: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();
    let ss_res: f64 = residuals.iter().map(|r| r.powi(2)).sum();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    Ok(OlsResult { coefficients, residuals, r_squared })
}

/// Whether a square matrix is symmetric within `tolerance`, scaled by its
/// largest absolute entry (floored at one).
#[must_use]
pub fn is_symmetric(matrix: &Array2<f64>, tolerance: f64) -> bool {
    let (n, m) = matrix.dim();
    if n != m {
        return false;
    }
    let scale = matrix.iter().fold(1.0_f64, |acc, v| acc.max(v.abs()));
    for i in 0..n {
        for j in (i + 1)..n {
            if (matrix[[i, j]] - matrix[[j, i]]).abs() > tolerance * scale {
                return false;
            }
        }
    }
    true
}

/// Eigenvalues of a symmetric matrix by cyclic Jacobi rotations, ascending.
///
/// # Errors
/// Returns `MathError::DimensionMismatch` if the matrix is not square and
/// `MathError::NumericalInstability` if it holds non-finite values.
pub fn symmetric_eigenvalues(matrix: &Array2<f64>) -> Result<Array1<f64>, MathError> {
    const MAX_SWEEPS: usize = 100;

    let (n, m) = matrix.dim();
    if n != m {
        return Err(MathError::DimensionMismatch { expected: n, actual: m });
    }
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(MathError::NumericalInstability("non-finite value in matrix".into()));
    }

    let mut a = matrix.to_owned();
    let scale = a.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));

    for _ in 0..MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .map(|(i, j)| a[[i, j]].powi(2))
            .sum();
        if off.sqrt() <= f64::EPSILON * scale {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq.abs() <= f64::MIN_POSITIVE {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[[k, p]];
                    let akq = a[[k, q]];
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[[p, k]];
                    let aqk = a[[q, k]];
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
            }
        }
    }

    let mut eigenvalues: Vec<f64> = (0..n).map(|i| a[[i, i]]).collect();
    eigenvalues.sort_by(f64::total_cmp);
    Ok(Array1::from_vec(eigenvalues))
}

/// Check that a symmetric matrix is positive semi-definite.
///
/// Eigenvalues down to `-tolerance * max(1, |largest eigenvalue|)` are
/// accepted as rounding noise. Returns the smallest eigenvalue on success.
///
/// # Errors
/// Returns `MathError::NumericalInstability` naming the offending eigenvalue
/// if the matrix is indefinite.
pub fn check_positive_semidefinite(matrix: &Array2<f64>, tolerance: f64) -> Result<f64, MathError> {
    let eigenvalues = symmetric_eigenvalues(matrix)?;
    let Some(&min) = eigenvalues.first() else {
        return Err(MathError::EmptyData);
    };
    let max_abs = eigenvalues.iter().fold(1.0_f64, |acc, v| acc.max(v.abs()));
    if min < -tolerance * max_abs {
        return Err(MathError::NumericalInstability(format!(
            "matrix is not positive semi-definite: smallest eigenvalue {min:e}"
        )));
    }
    Ok(min)
}
