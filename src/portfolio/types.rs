//! # Portfolio Types
//!
//! $$
//! S = \frac{\mathbb E[R_p] - r_f}{\sigma_p}
//! $$
//!
//! Result containers and weight post-processing policies shared by the
//! optimizers.

/// Derived statistics of a weight vector, computed on demand.
#[derive(Clone, Copy, Debug, Default)]
pub struct PortfolioStatistics {
  /// Expected portfolio return `wᵀμ`.
  pub expected_return: f64,
  /// Portfolio variance `wᵀΣw`.
  pub variance: f64,
  /// Portfolio volatility `√(wᵀΣw)`.
  pub volatility: f64,
  /// Sharpe ratio `(expected_return − risk_free) / volatility`.
  pub sharpe: f64,
}

/// Output of a portfolio optimization run.
#[derive(Clone, Debug)]
pub struct PortfolioResult {
  /// Final portfolio weights, summing to one.
  pub weights: Vec<f64>,
  /// Statistics of the final weights.
  pub stats: PortfolioStatistics,
}

/// One retained point of an efficient-frontier sweep.
#[derive(Clone, Debug)]
pub struct FrontierPoint {
  /// Target return requested for this point.
  pub target_return: f64,
  /// Return realized by the solved weights.
  pub realized_return: f64,
  /// Portfolio volatility at the solved weights.
  pub risk: f64,
  /// Sharpe ratio at the solved weights.
  pub sharpe: f64,
  /// Solved weights.
  pub weights: Vec<f64>,
}

/// Output of the risk-budgeting fixed-point iteration.
#[derive(Clone, Debug)]
pub struct RiskBudgetResult {
  /// Final weights, all positive, summing to one.
  pub weights: Vec<f64>,
  /// Realized fractional risk contributions of the final weights.
  pub risk_contributions: Vec<f64>,
  /// Whether the iteration met the tolerance before the cap.
  pub converged: bool,
  /// Max absolute gap between realized and target contributions.
  pub residual: f64,
  /// Iterations performed.
  pub iterations: usize,
}

/// Explicit weight post-processing selected by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeightPolicy {
  /// Divide by the sum so weights total one; signs are preserved.
  Normalize,
  /// Clamp negative weights to zero, then normalize the remainder.
  ClipNegative,
}

/// Apply a [`WeightPolicy`] to raw weights.
///
/// A zero (or numerically zero) sum after clipping falls back to equal
/// weights, since no direction information survives.
pub fn apply_weight_policy(weights: &[f64], policy: WeightPolicy) -> Vec<f64> {
  let n = weights.len();
  if n == 0 {
    return Vec::new();
  }

  let adjusted: Vec<f64> = match policy {
    WeightPolicy::Normalize => weights.to_vec(),
    WeightPolicy::ClipNegative => weights.iter().map(|&w| w.max(0.0)).collect(),
  };

  let total: f64 = adjusted.iter().sum();
  if total.abs() < 1e-12 {
    return vec![1.0 / n as f64; n];
  }
  adjusted.iter().map(|&w| w / total).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_preserves_signs() {
    let w = apply_weight_policy(&[2.0, -1.0, 1.0], WeightPolicy::Normalize);
    assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    assert!(w[1] < 0.0);
  }

  #[test]
  fn clip_negative_drops_shorts_before_normalizing() {
    let w = apply_weight_policy(&[2.0, -1.0, 2.0], WeightPolicy::ClipNegative);
    assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    assert_eq!(w[1], 0.0);
    assert!((w[0] - 0.5).abs() < 1e-12);
  }

  #[test]
  fn all_clipped_falls_back_to_equal_weights() {
    let w = apply_weight_policy(&[-1.0, -2.0], WeightPolicy::ClipNegative);
    assert!((w[0] - 0.5).abs() < 1e-12);
    assert!((w[1] - 0.5).abs() < 1e-12);
  }
}
