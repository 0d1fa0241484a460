//! # Risk Budgeting
//!
//! $$
//! c_i = \frac{w_i\,(\Sigma\mathbf{w})_i}{\mathbf{w}^\top\Sigma\mathbf{w}}
//! \ \to\ \text{target}_i
//! $$
//!
//! Fixed-point iteration converging portfolio weights to prescribed
//! fractional risk-contribution shares. Hitting the iteration cap is not
//! an error: the best iterate is returned with `converged = false` so
//! the caller can judge the residual.

use nalgebra::DMatrix;
use nalgebra::DVector;
use tracing::debug;
use tracing::warn;

use crate::error::Result;
use crate::error::RiskError;
use crate::linalg::covariance;
use crate::returns::ReturnMatrix;

use super::types::RiskBudgetResult;

const MAX_ITERS: usize = 100;
const TOLERANCE: f64 = 1e-6;

/// Risk-budgeting portfolio for a return matrix and per-asset target
/// contribution shares (positive, summing to one).
pub fn risk_budgeting_portfolio(
  returns: &ReturnMatrix,
  targets: &[f64],
) -> Result<RiskBudgetResult> {
  let cov = covariance(returns)?;
  risk_budgeting_weights(&cov, targets)
}

/// Risk-budgeting weights from an explicit covariance matrix.
pub fn risk_budgeting_weights(cov: &DMatrix<f64>, targets: &[f64]) -> Result<RiskBudgetResult> {
  let n = cov.nrows();
  if targets.len() != n {
    return Err(RiskError::LengthMismatch {
      expected: n,
      actual: targets.len(),
    });
  }
  if targets.iter().any(|&t| t <= 0.0) {
    return Err(RiskError::invalid("risk-budget targets must be positive"));
  }
  let target_sum: f64 = targets.iter().sum();
  if (target_sum - 1.0).abs() > 1e-8 {
    return Err(RiskError::invalid(format!(
      "risk-budget targets must sum to 1, got {target_sum}"
    )));
  }

  let mut w = DVector::from_element(n, 1.0 / n as f64);

  for iter in 1..=MAX_ITERS {
    let sigma_w = cov * &w;
    let variance = w.dot(&sigma_w);
    if variance <= 0.0 {
      return Err(RiskError::singular("risk budgeting covariance"));
    }
    let volatility = variance.sqrt();

    // Marginal contributions m = Σw/σ, shares c = (w ⊙ m) / Σ(w ⊙ m).
    let mut contributions: Vec<f64> = (0..n).map(|i| w[i] * sigma_w[i] / volatility).collect();
    let total: f64 = contributions.iter().sum();
    for c in &mut contributions {
      *c /= total;
    }

    let residual = max_abs_gap(&contributions, targets);
    if residual < TOLERANCE {
      debug!(iterations = iter, residual, "risk budgeting converged");
      return Ok(RiskBudgetResult {
        weights: w.iter().copied().collect(),
        risk_contributions: contributions,
        converged: true,
        residual,
        iterations: iter,
      });
    }

    // Multiplicative update toward the target shares, then renormalize.
    for i in 0..n {
      w[i] *= targets[i] / contributions[i];
    }
    let w_sum: f64 = w.iter().sum();
    w /= w_sum;
  }

  // Cap reached: report the last iterate with the shares it realizes.
  let weights: Vec<f64> = w.iter().copied().collect();
  let contributions = risk_contributions(cov, &weights)?;
  let residual = max_abs_gap(&contributions, targets);

  warn!(
    iterations = MAX_ITERS,
    residual, "risk budgeting hit iteration cap without converging"
  );
  Ok(RiskBudgetResult {
    weights,
    risk_contributions: contributions,
    converged: false,
    residual,
    iterations: MAX_ITERS,
  })
}

fn max_abs_gap(contributions: &[f64], targets: &[f64]) -> f64 {
  contributions
    .iter()
    .zip(targets.iter())
    .map(|(c, t)| (c - t).abs())
    .fold(0.0_f64, f64::max)
}

/// Fractional risk contributions of an arbitrary weight vector.
pub fn risk_contributions(cov: &DMatrix<f64>, weights: &[f64]) -> Result<Vec<f64>> {
  let n = cov.nrows();
  if weights.len() != n {
    return Err(RiskError::LengthMismatch {
      expected: n,
      actual: weights.len(),
    });
  }

  let w = DVector::from_column_slice(weights);
  let sigma_w = cov * &w;
  let variance = w.dot(&sigma_w);
  if variance <= 0.0 {
    return Err(RiskError::singular("risk contribution covariance"));
  }

  Ok((0..n).map(|i| w[i] * sigma_w[i] / variance).collect())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn diag_cov(vars: &[f64]) -> DMatrix<f64> {
    let n = vars.len();
    let mut cov = DMatrix::zeros(n, n);
    for i in 0..n {
      cov[(i, i)] = vars[i];
    }
    cov
  }

  #[test]
  fn equal_targets_on_equal_vol_uncorrelated_assets_give_equal_weights() {
    let cov = diag_cov(&[0.04, 0.04, 0.04, 0.04]);
    let targets = vec![0.25; 4];
    let result = risk_budgeting_weights(&cov, &targets).unwrap();

    assert!(result.converged);
    for &w in &result.weights {
      assert!((w - 0.25).abs() < 1e-6);
    }
  }

  #[test]
  fn weights_sum_to_one_and_stay_positive() {
    let cov = DMatrix::from_row_slice(
      3,
      3,
      &[0.04, 0.01, 0.002, 0.01, 0.09, 0.005, 0.002, 0.005, 0.16],
    );
    let targets = vec![0.5, 0.3, 0.2];
    let result = risk_budgeting_weights(&cov, &targets).unwrap();

    let sum: f64 = result.weights.iter().sum();
    assert!((sum - 1.0).abs() < 1e-6);
    assert!(result.weights.iter().all(|&w| w > 0.0));
  }

  #[test]
  fn realized_contributions_match_targets_at_convergence() {
    let cov = diag_cov(&[0.01, 0.04, 0.09]);
    let targets = vec![0.2, 0.3, 0.5];
    let result = risk_budgeting_weights(&cov, &targets).unwrap();

    assert!(result.converged);
    for (c, t) in result.risk_contributions.iter().zip(targets.iter()) {
      assert!((c - t).abs() < 1e-5);
    }
  }

  #[test]
  fn rejects_targets_not_summing_to_one() {
    let cov = diag_cov(&[0.04, 0.04]);
    assert!(matches!(
      risk_budgeting_weights(&cov, &[0.7, 0.7]),
      Err(RiskError::InvalidParameter { .. })
    ));
  }

  #[test]
  fn contributions_of_known_weights() {
    let cov = diag_cov(&[0.04, 0.09]);
    let contributions = risk_contributions(&cov, &[0.6, 0.4]).unwrap();
    // w_i² var_i / Σ w_j² var_j for a diagonal covariance.
    let raw = [0.36 * 0.04, 0.16 * 0.09];
    let total = raw[0] + raw[1];
    assert!((contributions[0] - raw[0] / total).abs() < 1e-12);
    assert!((contributions[1] - raw[1] / total).abs() < 1e-12);
    assert!((contributions.iter().sum::<f64>() - 1.0).abs() < 1e-12);
  }
}
