//! # CAPM
//!
//! $$
//! r_i - r_f = \alpha + \beta\,(r_m - r_f) + \varepsilon
//! $$
//!
//! Single-factor regression of excess asset returns on excess market
//! returns.

use linreg::linear_regression;

use crate::error::Result;
use crate::error::RiskError;
use crate::returns::complete_pairs;

/// Fitted CAPM parameters.
#[derive(Clone, Copy, Debug)]
pub struct CapmEstimate {
  /// Regression intercept (excess return unexplained by the market).
  pub alpha: f64,
  /// Market loading.
  pub beta: f64,
  /// Coefficient of determination of the fit.
  pub r_squared: f64,
  /// Sample standard deviation of the residuals.
  pub residual_volatility: f64,
}

/// Regress an asset's excess returns on the market's excess returns.
///
/// Rows where either series is missing are removed listwise; at least
/// three paired observations are required.
pub fn capm(asset: &[f64], market: &[f64], risk_free: f64) -> Result<CapmEstimate> {
  if asset.len() != market.len() {
    return Err(RiskError::LengthMismatch {
      expected: asset.len(),
      actual: market.len(),
    });
  }

  let (asset_obs, market_obs) = complete_pairs(asset, market);
  if asset_obs.len() < 3 {
    return Err(RiskError::InsufficientData {
      required: 3,
      available: asset_obs.len(),
    });
  }

  let y: Vec<f64> = asset_obs.iter().map(|&r| r - risk_free).collect();
  let x: Vec<f64> = market_obs.iter().map(|&r| r - risk_free).collect();

  let (beta, alpha): (f64, f64) = linear_regression(&x, &y).map_err(|_| {
    RiskError::InsufficientData {
      required: 3,
      available: x.len(),
    }
  })?;

  let y_mean = y.iter().sum::<f64>() / y.len() as f64;
  let mut ss_tot = 0.0;
  let mut ss_res = 0.0;
  for (xi, yi) in x.iter().zip(y.iter()) {
    let fitted = alpha + beta * xi;
    ss_res += (yi - fitted).powi(2);
    ss_tot += (yi - y_mean).powi(2);
  }

  let r_squared = if ss_tot > 1e-30 {
    1.0 - ss_res / ss_tot
  } else {
    0.0
  };
  let residual_volatility = if y.len() > 2 {
    (ss_res / (y.len() - 2) as f64).sqrt()
  } else {
    0.0
  };

  Ok(CapmEstimate {
    alpha,
    beta,
    r_squared,
    residual_volatility,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn exact_linear_relation_is_recovered() {
    let market = vec![0.01, -0.02, 0.03, 0.005, -0.01, 0.02];
    let asset: Vec<f64> = market.iter().map(|&m| 0.001 + 1.5 * m).collect();

    let fit = capm(&asset, &market, 0.0).unwrap();
    assert!((fit.beta - 1.5).abs() < 1e-10);
    assert!((fit.alpha - 0.001).abs() < 1e-10);
    assert!((fit.r_squared - 1.0).abs() < 1e-10);
    assert!(fit.residual_volatility < 1e-10);
  }

  #[test]
  fn risk_free_shifts_the_intercept_not_the_beta() {
    let market = vec![0.02, -0.01, 0.03, 0.00, 0.015, -0.005];
    let asset: Vec<f64> = market.iter().map(|&m| 0.002 + 0.8 * m).collect();

    let flat = capm(&asset, &market, 0.0).unwrap();
    let shifted = capm(&asset, &market, 0.001).unwrap();
    assert!((flat.beta - shifted.beta).abs() < 1e-10);
  }

  #[test]
  fn missing_rows_are_removed_listwise() {
    let market = vec![0.01, f64::NAN, 0.03, 0.005, -0.01, 0.02];
    let asset: Vec<f64> = market.iter().map(|&m| 2.0 * m).collect();

    let fit = capm(&asset, &market, 0.0).unwrap();
    assert!((fit.beta - 2.0).abs() < 1e-10);
  }

  #[test]
  fn two_observations_are_not_enough() {
    assert!(matches!(
      capm(&[0.01, 0.02], &[0.01, 0.03], 0.0),
      Err(RiskError::InsufficientData { .. })
    ));
  }
}
