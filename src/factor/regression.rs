//! # Multi-Factor Regression
//!
//! $$
//! r = \alpha + B^\top f + \varepsilon
//! $$
//!
//! Ordinary least squares of one asset on several factor series via the
//! normal equations, with the guarded inverse rejecting collinear
//! factor sets.

use nalgebra::DMatrix;
use nalgebra::DVector;

use crate::error::Result;
use crate::error::RiskError;
use crate::linalg::invert_spd;

/// Fitted multi-factor model.
#[derive(Clone, Debug)]
pub struct FactorModelEstimate {
  /// Regression intercept.
  pub intercept: f64,
  /// One loading per factor, in input order.
  pub loadings: Vec<f64>,
  /// Coefficient of determination of the fit.
  pub r_squared: f64,
  /// Sample standard deviation of the residuals.
  pub residual_volatility: f64,
}

/// Regress `asset` on `factors` with an intercept.
///
/// Rows where the asset or any factor is missing are removed listwise.
/// Collinear factors surface as [`RiskError::SingularMatrix`].
pub fn factor_regression(asset: &[f64], factors: &[Vec<f64>]) -> Result<FactorModelEstimate> {
  if factors.is_empty() {
    return Err(RiskError::invalid("at least one factor series required"));
  }
  for f in factors {
    if f.len() != asset.len() {
      return Err(RiskError::LengthMismatch {
        expected: asset.len(),
        actual: f.len(),
      });
    }
  }

  // Listwise deletion across the asset and all factors.
  let rows: Vec<usize> = (0..asset.len())
    .filter(|&t| !asset[t].is_nan() && factors.iter().all(|f| !f[t].is_nan()))
    .collect();

  let k = factors.len();
  let required = k + 2;
  if rows.len() < required {
    return Err(RiskError::InsufficientData {
      required,
      available: rows.len(),
    });
  }

  let n = rows.len();
  let mut x = DMatrix::zeros(n, k + 1);
  let mut y = DVector::zeros(n);
  for (row, &t) in rows.iter().enumerate() {
    x[(row, 0)] = 1.0;
    for j in 0..k {
      x[(row, j + 1)] = factors[j][t];
    }
    y[row] = asset[t];
  }

  let xtx = x.transpose() * &x;
  let xtx_inv = invert_spd(&xtx, "factor regression normal equations")?;
  let beta = xtx_inv * x.transpose() * &y;

  let fitted = &x * &beta;
  let residuals = &y - &fitted;
  let y_mean = y.iter().sum::<f64>() / n as f64;
  let ss_tot: f64 = y.iter().map(|&v| (v - y_mean).powi(2)).sum();
  let ss_res: f64 = residuals.iter().map(|&v| v * v).sum();

  let r_squared = if ss_tot > 1e-30 {
    1.0 - ss_res / ss_tot
  } else {
    0.0
  };
  let dof = n - (k + 1);
  let residual_volatility = if dof > 0 {
    (ss_res / dof as f64).sqrt()
  } else {
    0.0
  };

  Ok(FactorModelEstimate {
    intercept: beta[0],
    loadings: beta.iter().skip(1).copied().collect(),
    r_squared,
    residual_volatility,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn two_factor_model_is_recovered_exactly() {
    let f1 = vec![0.01, -0.02, 0.03, 0.005, -0.01, 0.02, 0.00, 0.015];
    let f2 = vec![0.002, 0.004, -0.001, 0.003, 0.001, -0.002, 0.005, 0.000];
    let asset: Vec<f64> = f1
      .iter()
      .zip(f2.iter())
      .map(|(&a, &b)| 0.0005 + 1.2 * a - 0.7 * b)
      .collect();

    let fit = factor_regression(&asset, &[f1, f2]).unwrap();
    assert!((fit.intercept - 0.0005).abs() < 1e-10);
    assert!((fit.loadings[0] - 1.2).abs() < 1e-9);
    assert!((fit.loadings[1] + 0.7).abs() < 1e-9);
    assert!((fit.r_squared - 1.0).abs() < 1e-9);
  }

  #[test]
  fn duplicated_factor_is_singular() {
    let f = vec![0.01, -0.02, 0.03, 0.005, -0.01, 0.02];
    let asset: Vec<f64> = f.iter().map(|&a| 0.5 * a).collect();
    assert!(matches!(
      factor_regression(&asset, &[f.clone(), f]),
      Err(RiskError::SingularMatrix { .. })
    ));
  }

  #[test]
  fn too_few_rows_after_listwise_deletion() {
    let f = vec![0.01, f64::NAN, 0.03, f64::NAN];
    let asset = vec![0.02, 0.01, f64::NAN, 0.04];
    assert!(matches!(
      factor_regression(&asset, &[f]),
      Err(RiskError::InsufficientData { .. })
    ));
  }
}
