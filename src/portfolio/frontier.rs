//! # Efficient Frontier
//!
//! $$
//! \sigma^\*(r) = \min_{\mathbf{w}:\ \mathbf{1}^\top\mathbf{w}=1,\
//! \mu^\top\mathbf{w}=r} \sqrt{\mathbf{w}^\top\Sigma\mathbf{w}}
//! $$
//!
//! Sweeps evenly spaced target returns between the lowest and highest
//! single-asset expected return and solves one target-return QP per
//! point. Targets whose subproblem is infeasible or singular are
//! dropped from the output, never fatal for the sweep.

use tracing::debug;

use crate::error::Result;
use crate::error::RiskError;
use crate::linalg::expected_returns;
use crate::returns::ReturnMatrix;

use super::optimizer::target_return_portfolio;
use super::types::FrontierPoint;

/// Compute up to `n_points` frontier points over a return matrix.
///
/// Targets span `[min μᵢ, max μᵢ]` inclusive. The result is ordered by
/// target return and its length is at most `n_points`.
pub fn efficient_frontier(returns: &ReturnMatrix, n_points: usize) -> Result<Vec<FrontierPoint>> {
  if n_points == 0 {
    return Err(RiskError::invalid("frontier needs at least one point"));
  }

  let mu = expected_returns(returns)?;
  let lo = mu.iter().cloned().fold(f64::INFINITY, f64::min);
  let hi = mu.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

  let mut points = Vec::with_capacity(n_points);
  for k in 0..n_points {
    let target = if n_points == 1 {
      lo
    } else {
      lo + (hi - lo) * k as f64 / (n_points - 1) as f64
    };

    match target_return_portfolio(returns, target) {
      Ok(result) => points.push(FrontierPoint {
        target_return: target,
        realized_return: result.stats.expected_return,
        risk: result.stats.volatility,
        sharpe: result.stats.sharpe,
        weights: result.weights,
      }),
      Err(RiskError::Infeasible { .. }) | Err(RiskError::SingularMatrix { .. }) => {
        debug!(target_return = target, "skipping unreachable frontier target");
      }
      Err(other) => return Err(other),
    }
  }

  Ok(points)
}
