//! # Linear Algebra Kernel
//!
//! $$
//! \Sigma_{ij} = \operatorname{Cov}(r_i, r_j), \qquad
//! \sigma_p^2 = \mathbf{w}^\top\Sigma\mathbf{w}
//! $$
//!
//! Moment estimation and guarded matrix inversion shared by the
//! optimizers. Covariance uses pairwise complete observations, matching
//! the `use = "pairwise.complete.obs"` estimation policy.

use nalgebra::DMatrix;
use nalgebra::DVector;

use crate::error::Result;
use crate::error::RiskError;
use crate::returns::complete_pairs;
use crate::returns::nan_mean;
use crate::returns::ReturnMatrix;

/// Reciprocal condition number below which a matrix is treated as singular.
const RCOND_THRESHOLD: f64 = 1e-12;

/// Column means of a return matrix, ignoring missing values.
pub fn expected_returns(returns: &ReturnMatrix) -> Result<DVector<f64>> {
  let n = returns.n_assets();
  let mut mu = DVector::zeros(n);
  for i in 0..n {
    mu[i] = nan_mean(returns.column(i))?;
  }
  Ok(mu)
}

/// Sample covariance matrix over pairwise complete observations.
///
/// Each entry is estimated from the rows where both assets are observed;
/// fewer than two such rows for any pair is an error.
pub fn covariance(returns: &ReturnMatrix) -> Result<DMatrix<f64>> {
  let n = returns.n_assets();
  let mut cov = DMatrix::zeros(n, n);

  for i in 0..n {
    for j in i..n {
      let (x, y) = complete_pairs(returns.column(i), returns.column(j));
      if x.len() < 2 {
        return Err(RiskError::InsufficientData {
          required: 2,
          available: x.len(),
        });
      }

      let mx = x.iter().sum::<f64>() / x.len() as f64;
      let my = y.iter().sum::<f64>() / y.len() as f64;
      let mut acc = 0.0;
      for k in 0..x.len() {
        acc += (x[k] - mx) * (y[k] - my);
      }
      let c = acc / (x.len() - 1) as f64;

      cov[(i, j)] = c;
      cov[(j, i)] = c;
    }
  }

  Ok(cov)
}

/// Invert a symmetric positive-definite matrix, rejecting near-singular
/// inputs via a reciprocal-condition-number threshold on the singular
/// values rather than returning garbage.
pub fn invert_spd(matrix: &DMatrix<f64>, context: &str) -> Result<DMatrix<f64>> {
  let singular_values = matrix.clone().svd(false, false).singular_values;
  let max_sv = singular_values.iter().cloned().fold(0.0_f64, f64::max);
  let min_sv = singular_values
    .iter()
    .cloned()
    .fold(f64::INFINITY, f64::min);

  if max_sv <= 0.0 || min_sv < max_sv * RCOND_THRESHOLD {
    return Err(RiskError::singular(context));
  }

  matrix
    .clone()
    .try_inverse()
    .ok_or_else(|| RiskError::singular(context))
}

/// Evaluate the quadratic form `wᵀ M w`.
pub fn quadratic_form(matrix: &DMatrix<f64>, w: &DVector<f64>) -> f64 {
  (w.transpose() * matrix * w)[(0, 0)]
}
