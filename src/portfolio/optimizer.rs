//! # Mean-Variance Optimizer
//!
//! $$
//! \mathbf{w}^\* \propto \Sigma^{-1}(\mu - r_f\mathbf{1})
//! $$
//!
//! Minimum-variance and target-return portfolios via the QP solver, and
//! the closed-form maximum-Sharpe (tangency) portfolio. Short selling is
//! allowed: weights are sign-unconstrained apart from the budget
//! constraint `Σw = 1`.

use nalgebra::DMatrix;
use nalgebra::DVector;

use crate::error::Result;
use crate::error::RiskError;
use crate::linalg::covariance;
use crate::linalg::expected_returns;
use crate::linalg::invert_spd;
use crate::linalg::quadratic_form;
use crate::qp;
use crate::qp::QpProblem;
use crate::returns::ReturnMatrix;

use super::types::PortfolioResult;
use super::types::PortfolioStatistics;

/// Global minimum-variance portfolio: `min wᵀΣw` subject to `Σw = 1`.
pub fn minimum_variance(returns: &ReturnMatrix) -> Result<PortfolioResult> {
  let mu = expected_returns(returns)?;
  let cov = covariance(returns)?;
  let weights = solve_variance_qp(&cov, None, 0.0)?;
  Ok(build_result(&weights, &mu, &cov, 0.0))
}

/// Minimum-variance portfolio achieving a prescribed expected return.
///
/// Adds the equality constraint `wᵀμ = target_return` to the budget
/// constraint. Infeasible targets (only possible when all assets share
/// one expected return) surface as [`RiskError::Infeasible`].
pub fn target_return_portfolio(
  returns: &ReturnMatrix,
  target_return: f64,
) -> Result<PortfolioResult> {
  let mu = expected_returns(returns)?;
  let cov = covariance(returns)?;
  let weights = solve_variance_qp(&cov, Some(&mu), target_return)?;
  Ok(build_result(&weights, &mu, &cov, 0.0))
}

/// Maximum-Sharpe (tangency) portfolio `w ∝ Σ⁻¹(μ − r_f·1)`.
///
/// Closed form, not a QP call; requires an invertible covariance. The
/// raw solution is normalized by its sum, which may be negative when
/// every excess return is negative — the sign-divided weights are
/// propagated as-is, which is degenerate but mathematically consistent.
pub fn maximum_sharpe(returns: &ReturnMatrix, risk_free: f64) -> Result<PortfolioResult> {
  let mu = expected_returns(returns)?;
  let cov = covariance(returns)?;
  let inv = invert_spd(&cov, "maximum_sharpe covariance")?;

  let excess = &mu - DVector::from_element(mu.len(), risk_free);
  let raw = inv * excess;
  let total: f64 = raw.iter().sum();
  if total.abs() < 1e-12 {
    return Err(RiskError::infeasible(
      "tangency weights sum to zero; normalization undefined",
    ));
  }

  let weights = raw / total;
  Ok(build_result(&weights, &mu, &cov, risk_free))
}

/// Statistics of an arbitrary weight vector over a return matrix.
///
/// Weights are silently renormalized to sum to one before anything is
/// computed, so the result is invariant to positive rescaling of the
/// input.
pub fn portfolio_stats(
  weights: &[f64],
  returns: &ReturnMatrix,
  risk_free: f64,
) -> Result<PortfolioStatistics> {
  if weights.len() != returns.n_assets() {
    return Err(RiskError::LengthMismatch {
      expected: returns.n_assets(),
      actual: weights.len(),
    });
  }

  let total: f64 = weights.iter().sum();
  if total.abs() < 1e-12 {
    return Err(RiskError::invalid("weights sum to zero"));
  }
  let w = DVector::from_iterator(weights.len(), weights.iter().map(|&x| x / total));

  let mu = expected_returns(returns)?;
  let cov = covariance(returns)?;
  Ok(stats_from_moments(&w, &mu, &cov, risk_free))
}

fn solve_variance_qp(
  cov: &DMatrix<f64>,
  mu: Option<&DVector<f64>>,
  target_return: f64,
) -> Result<DVector<f64>> {
  let n = cov.nrows();
  let meq = if mu.is_some() { 2 } else { 1 };

  let mut a = DMatrix::zeros(meq, n);
  let mut b = DVector::zeros(meq);
  for col in 0..n {
    a[(0, col)] = 1.0;
  }
  b[0] = 1.0;
  if let Some(mu) = mu {
    for col in 0..n {
      a[(1, col)] = mu[col];
    }
    b[1] = target_return;
  }

  let problem = QpProblem {
    d: cov * 2.0,
    q: DVector::zeros(n),
    a,
    b,
    meq,
  };
  Ok(qp::solve(&problem)?.x)
}

pub(crate) fn stats_from_moments(
  w: &DVector<f64>,
  mu: &DVector<f64>,
  cov: &DMatrix<f64>,
  risk_free: f64,
) -> PortfolioStatistics {
  let expected_return = w.dot(mu);
  let variance = quadratic_form(cov, w);
  let volatility = variance.max(0.0).sqrt();
  let sharpe = if volatility > 1e-15 {
    (expected_return - risk_free) / volatility
  } else {
    0.0
  };

  PortfolioStatistics {
    expected_return,
    variance,
    volatility,
    sharpe,
  }
}

fn build_result(
  w: &DVector<f64>,
  mu: &DVector<f64>,
  cov: &DMatrix<f64>,
  risk_free: f64,
) -> PortfolioResult {
  PortfolioResult {
    weights: w.iter().copied().collect(),
    stats: stats_from_moments(w, mu, cov, risk_free),
  }
}
