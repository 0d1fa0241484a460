//! # Value at Risk
//!
//! $$
//! \operatorname{VaR}_\alpha = -\inf\{x : F(x) \ge \alpha\}
//! $$
//!
//! Historical, parametric (normal) and Monte Carlo VaR over a single
//! return series. Losses are reported as positive numbers; `confidence`
//! is the one-sided level, e.g. `0.95`.

use rand::Rng;
use rand_distr::Distribution;
use statrs::distribution::ContinuousCDF;
use statrs::distribution::Normal;

use crate::error::Result;
use crate::error::RiskError;
use crate::returns::drop_missing;
use crate::returns::nan_mean;
use crate::returns::nan_variance;

pub(crate) fn standard_normal() -> Result<Normal> {
  Normal::new(0.0, 1.0)
    .map_err(|e| RiskError::invalid(format!("failed to construct standard normal: {e}")))
}

pub(crate) fn check_confidence(confidence: f64) -> Result<()> {
  if !(confidence > 0.0 && confidence < 1.0) {
    return Err(RiskError::invalid(format!(
      "confidence must lie in (0, 1), got {confidence}"
    )));
  }
  Ok(())
}

/// Linearly interpolated empirical quantile (type 7) of a sample.
pub(crate) fn empirical_quantile(xs: &[f64], p: f64) -> Result<f64> {
  if xs.is_empty() {
    return Err(RiskError::InsufficientData {
      required: 1,
      available: 0,
    });
  }

  let mut sorted = xs.to_vec();
  sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

  let h = (sorted.len() - 1) as f64 * p;
  let lo = h.floor() as usize;
  let hi = h.ceil() as usize;
  Ok(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

/// Historical VaR: negated empirical quantile of the returns at
/// `1 − confidence`, missing values dropped.
pub fn historical_var(returns: &[f64], confidence: f64) -> Result<f64> {
  check_confidence(confidence)?;
  let valid = drop_missing(returns);
  Ok(-empirical_quantile(&valid, 1.0 - confidence)?)
}

/// Parametric VaR under a fitted normal: `−(μ + σ·Φ⁻¹(1 − confidence))`.
pub fn parametric_var(returns: &[f64], confidence: f64) -> Result<f64> {
  check_confidence(confidence)?;
  let mean = nan_mean(returns)?;
  let sd = nan_variance(returns)?.sqrt();

  let z = standard_normal()?.inverse_cdf(1.0 - confidence);
  Ok(-(mean + sd * z))
}

/// Monte Carlo VaR: fit a normal to the sample, draw `n_sims` returns
/// from the caller's generator, take the historical VaR of the draws.
pub fn monte_carlo_var<R: Rng + ?Sized>(
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
  Ok(-empirical_quantile(&sims, 1.0 - confidence)?)
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  #[test]
  fn historical_var_of_known_sample() {
    // 20 returns, alpha = 0.05 lands exactly on the sorted values' tail.
    let returns: Vec<f64> = (1..=20).map(|i| i as f64 / 100.0 - 0.10).collect();
    let var = historical_var(&returns, 0.95).unwrap();
    // Quantile at p = 0.05 with n = 20: h = 0.95 between -0.09 and -0.08.
    assert!((var - 0.0805).abs() < 1e-10);
  }

  #[test]
  fn historical_var_ignores_missing_values() {
    let mut returns: Vec<f64> = (1..=20).map(|i| i as f64 / 100.0 - 0.10).collect();
    let expected = historical_var(&returns, 0.95).unwrap();
    returns.push(f64::NAN);
    assert!((historical_var(&returns, 0.95).unwrap() - expected).abs() < 1e-12);
  }

  #[test]
  fn parametric_var_matches_closed_form() {
    let returns = vec![0.01, -0.02, 0.005, 0.015, -0.01, 0.0];
    let mean = nan_mean(&returns).unwrap();
    let sd = nan_variance(&returns).unwrap().sqrt();
    let z = standard_normal().unwrap().inverse_cdf(0.05);

    let var = parametric_var(&returns, 0.95).unwrap();
    assert!((var + mean + sd * z).abs() < 1e-12);
    assert!(var > 0.0);
  }

  #[test]
  fn monte_carlo_var_is_reproducible_and_near_parametric() {
    let returns: Vec<f64> = (0..200)
      .map(|i| 0.02 * ((i * 31 % 17) as f64 / 8.0 - 1.0))
      .collect();

    let mut rng = StdRng::seed_from_u64(99);
    let mc1 = monte_carlo_var(&returns, 0.95, 50_000, &mut rng).unwrap();
    let mut rng = StdRng::seed_from_u64(99);
    let mc2 = monte_carlo_var(&returns, 0.95, 50_000, &mut rng).unwrap();
    assert_eq!(mc1, mc2);

    let pv = parametric_var(&returns, 0.95).unwrap();
    assert!((mc1 - pv).abs() < 0.15 * pv.abs().max(1e-3));
  }

  #[test]
  fn confidence_outside_unit_interval_is_rejected() {
    assert!(matches!(
      historical_var(&[0.01, 0.02], 1.0),
      Err(RiskError::InvalidParameter { .. })
    ));
  }
}
