//! # Expected Shortfall
//!
//! $$
//! \operatorname{ES}_\alpha = -\mathbb E\left[r \mid r \le q_\alpha\right]
//! $$
//!
//! Mean loss conditional on exceeding the VaR threshold, with the same
//! three estimators as the VaR module.

use rand::Rng;
use rand_distr::Distribution;
use statrs::distribution::Continuous;
use statrs::distribution::ContinuousCDF;

use crate::error::Result;
use crate::error::RiskError;
use crate::returns::drop_missing;
use crate::returns::nan_mean;
use crate::returns::nan_variance;

use super::var::check_confidence;
use super::var::empirical_quantile;
use super::var::standard_normal;

fn tail_mean(sample: &[f64], alpha: f64) -> Result<f64> {
  let threshold = empirical_quantile(sample, alpha)?;
  let tail: Vec<f64> = sample.iter().copied().filter(|&r| r <= threshold).collect();
  if tail.is_empty() {
    return Err(RiskError::InsufficientData {
      required: 1,
      available: 0,
    });
  }
  Ok(-(tail.iter().sum::<f64>() / tail.len() as f64))
}

/// Historical expected shortfall: mean of the returns at or below the
/// empirical `1 − confidence` quantile, negated.
pub fn historical_shortfall(returns: &[f64], confidence: f64) -> Result<f64> {
  check_confidence(confidence)?;
  let valid = drop_missing(returns);
  tail_mean(&valid, 1.0 - confidence)
}

/// Parametric expected shortfall under a fitted normal:
/// `−(μ − σ·φ(z_α)/α)` with `z_α = Φ⁻¹(α)`.
pub fn parametric_shortfall(returns: &[f64], confidence: f64) -> Result<f64> {
  check_confidence(confidence)?;
  let mean = nan_mean(returns)?;
  let sd = nan_variance(returns)?.sqrt();

  let alpha = 1.0 - confidence;
  let standard = standard_normal()?;
  let z = standard.inverse_cdf(alpha);
  Ok(-(mean - sd * standard.pdf(z) / alpha))
}

/// Monte Carlo expected shortfall over `n_sims` normal draws from the
/// caller's generator.
pub fn monte_carlo_shortfall<R: Rng + ?Sized>(
  returns: &[f64],
  confidence: f64,
  n_sims: usize,
  rng: &mut R,
) -> Result<f64> {
  check_confidence(confidence)?;
  if n_sims == 0 {
    return Err(RiskError::invalid("n_sims must be positive"));
  }

  let mean = nan_mean(returns)?;
  let sd = nan_variance(returns)?.sqrt();
  let normal = rand_distr::Normal::new(mean, sd)
    .map_err(|e| RiskError::invalid(format!("normal fit failed: {e}")))?;

  let sims: Vec<f64> = (0..n_sims).map(|_| normal.sample(rng)).collect();
  tail_mean(&sims, 1.0 - confidence)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::risk::var::historical_var;
  use crate::risk::var::parametric_var;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn sample_returns() -> Vec<f64> {
    (1..=40).map(|i| i as f64 / 200.0 - 0.10).collect()
  }

  #[test]
  fn historical_shortfall_exceeds_historical_var() {
    let returns = sample_returns();
    let var = historical_var(&returns, 0.95).unwrap();
    let es = historical_shortfall(&returns, 0.95).unwrap();
    assert!(es >= var);
  }

  #[test]
  fn historical_shortfall_of_known_tail() {
    let returns = sample_returns();
    let es = historical_shortfall(&returns, 0.95).unwrap();
    // alpha = 0.05 over 40 points: the interpolated threshold keeps the
    // two worst returns in the tail.
    let threshold = empirical_quantile(&returns, 0.05).unwrap();
    let tail: Vec<f64> = returns.iter().copied().filter(|&r| r <= threshold).collect();
    let expected = -(tail.iter().sum::<f64>() / tail.len() as f64);
    assert!((es - expected).abs() < 1e-12);
  }

  #[test]
  fn parametric_shortfall_exceeds_parametric_var() {
    let returns = vec![0.01, -0.02, 0.005, 0.015, -0.01, 0.0, 0.02, -0.005];
    let var = parametric_var(&returns, 0.99).unwrap();
    let es = parametric_shortfall(&returns, 0.99).unwrap();
    assert!(es > var);
  }

  #[test]
  fn monte_carlo_shortfall_tracks_parametric() {
    let returns: Vec<f64> = (0..150)
      .map(|i| 0.015 * ((i * 13 % 11) as f64 / 5.0 - 1.0))
      .collect();
    let mut rng = StdRng::seed_from_u64(7);
    let mc = monte_carlo_shortfall(&returns, 0.95, 80_000, &mut rng).unwrap();
    let pv = parametric_shortfall(&returns, 0.95).unwrap();
    assert!((mc - pv).abs() < 0.15 * pv.abs().max(1e-3));
  }
}
