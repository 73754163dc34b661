//! Ordinary least squares.
//!
//! Each respondent is one small regression:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! with an intercept plus at most five indicator columns.
//!
//! Implementation choices:
//! - We solve via SVD so tall design matrices (more profiles than parameters)
//!   are handled robustly. Nalgebra's `QR::solve` is intended for square systems.
//! - The same decomposition gives the numerical rank and condition number, which
//!   the estimator turns into fit warnings.
//! - Standard errors come from `σ² (XᵀX)⁻¹`; with six columns the explicit
//!   inverse is cheap.

use nalgebra::{DMatrix, DVector};

/// Relative singular-value cutoff for numerical rank.
const RANK_TOLERANCE: f64 = 1e-10;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Numerical rank and 2-norm condition number of `x`.
pub fn rank_and_condition(x: &DMatrix<f64>) -> (usize, f64) {
    let sv = x.singular_values();
    let max = sv.iter().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return (0, f64::INFINITY);
    }
    let cutoff = max * RANK_TOLERANCE * x.nrows().max(x.ncols()) as f64;
    let rank = sv.iter().filter(|&&s| s > cutoff).count();
    let min = sv.iter().copied().fold(f64::INFINITY, f64::min);
    let condition = if min > 0.0 { max / min } else { f64::INFINITY };
    (rank, condition)
}

/// Result of a full-rank OLS fit.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub beta: Vec<f64>,
    pub residuals: Vec<f64>,
    pub sse: f64,
    /// Total sum of squares around the mean of `y`.
    pub sst: f64,
    /// `n - p`.
    pub residual_df: usize,
    /// Per-coefficient standard errors; `None` when `residual_df == 0`.
    pub std_errors: Option<Vec<f64>>,
}

impl OlsFit {
    pub fn r_squared(&self) -> Option<f64> {
        (self.sst > 0.0).then(|| 1.0 - self.sse / self.sst)
    }

    pub fn adj_r_squared(&self) -> Option<f64> {
        let n = self.residuals.len();
        if self.residual_df == 0 || n < 2 {
            return None;
        }
        let r2 = self.r_squared()?;
        Some(1.0 - (1.0 - r2) * (n as f64 - 1.0) / self.residual_df as f64)
    }

    pub fn residual_std_error(&self) -> Option<f64> {
        (self.residual_df > 0).then(|| (self.sse / self.residual_df as f64).sqrt())
    }

    /// Overall F statistic against the intercept-only model.
    pub fn f_statistic(&self) -> Option<f64> {
        let p = self.beta.len();
        if p < 2 || self.residual_df == 0 || self.sse <= 0.0 {
            return None;
        }
        let explained = (self.sst - self.sse) / (p as f64 - 1.0);
        let unexplained = self.sse / self.residual_df as f64;
        Some(explained / unexplained)
    }
}

/// Fit `y ~ x` by OLS. `x` must already contain the intercept column.
///
/// Returns `None` if the solve fails or produces non-finite output.
pub fn fit_ols(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<OlsFit> {
    let n = x.nrows();
    let p = x.ncols();
    if n == 0 || p == 0 || y.len() != n {
        return None;
    }

    let beta = solve_least_squares(x, y)?;
    let fitted = x * &beta;
    let residuals: Vec<f64> = y.iter().zip(fitted.iter()).map(|(a, b)| a - b).collect();
    let sse: f64 = residuals.iter().map(|r| r * r).sum();
    let mean = y.mean();
    let sst: f64 = y.iter().map(|v| (v - mean) * (v - mean)).sum();
    if !(sse.is_finite() && sst.is_finite()) {
        return None;
    }

    let residual_df = n.saturating_sub(p);
    let std_errors = if residual_df > 0 {
        let sigma2 = sse / residual_df as f64;
        (x.transpose() * x).try_inverse().map(|inv| {
            (0..p)
                .map(|j| (sigma2 * inv[(j, j)]).max(0.0).sqrt())
                .collect::<Vec<f64>>()
        })
    } else {
        None
    };

    Some(OlsFit {
        beta: beta.iter().copied().collect(),
        residuals,
        sse,
        sst,
        residual_df,
        std_errors,
    })
}
