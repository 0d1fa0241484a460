//! # Returns
//!
//! $$
//! r_t = \frac{P_t}{P_{t-1}} - 1
//! $$
//!
//! Aligned multi-asset return data and missing-value aware series
//! statistics. Missing observations are encoded as `f64::NAN` and are
//! excluded before any statistic is computed.

use crate::error::Result;
use crate::error::RiskError;

/// Multi-asset return observations aligned on a common time index.
///
/// Columns are assets (order-significant), rows are observations.
/// Entries may be `NAN`, meaning the observation is missing for that
/// asset at that time.
#[derive(Clone, Debug)]
pub struct ReturnMatrix {
  assets: Vec<String>,
  columns: Vec<Vec<f64>>,
  n_obs: usize,
}

impl ReturnMatrix {
  /// Build from named per-asset return columns of equal length.
  pub fn from_columns(assets: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self> {
    if assets.len() != columns.len() {
      return Err(RiskError::LengthMismatch {
        expected: assets.len(),
        actual: columns.len(),
      });
    }
    if columns.is_empty() {
      return Err(RiskError::InsufficientData {
        required: 1,
        available: 0,
      });
    }

    let n_obs = columns[0].len();
    for col in &columns {
      if col.len() != n_obs {
        return Err(RiskError::LengthMismatch {
          expected: n_obs,
          actual: col.len(),
        });
      }
    }

    Ok(Self {
      assets,
      columns,
      n_obs,
    })
  }

  /// Number of assets (columns).
  pub fn n_assets(&self) -> usize {
    self.columns.len()
  }

  /// Number of observations (rows), including missing entries.
  pub fn n_obs(&self) -> usize {
    self.n_obs
  }

  /// Asset identifiers in column order.
  pub fn assets(&self) -> &[String] {
    &self.assets
  }

  /// Return series of asset `i`.
  pub fn column(&self, i: usize) -> &[f64] {
    &self.columns[i]
  }
}

/// Mean of the non-missing entries of a series.
pub fn nan_mean(xs: &[f64]) -> Result<f64> {
  let mut sum = 0.0;
  let mut count = 0usize;
  for &x in xs {
    if !x.is_nan() {
      sum += x;
      count += 1;
    }
  }

  if count == 0 {
    return Err(RiskError::InsufficientData {
      required: 1,
      available: 0,
    });
  }
  Ok(sum / count as f64)
}

/// Sample variance (n - 1) of the non-missing entries of a series.
pub fn nan_variance(xs: &[f64]) -> Result<f64> {
  let mean = nan_mean(xs)?;
  let mut acc = 0.0;
  let mut count = 0usize;
  for &x in xs {
    if !x.is_nan() {
      let d = x - mean;
      acc += d * d;
      count += 1;
    }
  }

  if count < 2 {
    return Err(RiskError::InsufficientData {
      required: 2,
      available: count,
    });
  }
  Ok(acc / (count - 1) as f64)
}

/// Drop missing entries, preserving order.
pub fn drop_missing(xs: &[f64]) -> Vec<f64> {
  xs.iter().copied().filter(|x| !x.is_nan()).collect()
}

/// Keep only rows where both series are observed (pairwise deletion).
pub fn complete_pairs(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
  let n = x.len().min(y.len());
  let mut cx = Vec::with_capacity(n);
  let mut cy = Vec::with_capacity(n);
  for i in 0..n {
    if !x[i].is_nan() && !y[i].is_nan() {
      cx.push(x[i]);
      cy.push(y[i]);
    }
  }
  (cx, cy)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_columns_rejects_ragged_input() {
    let result = ReturnMatrix::from_columns(
      vec!["A".to_string(), "B".to_string()],
      vec![vec![0.01, 0.02], vec![0.01]],
    );
    assert!(matches!(result, Err(RiskError::LengthMismatch { .. })));
  }

  #[test]
  fn nan_mean_skips_missing() {
    let xs = vec![1.0, f64::NAN, 3.0];
    assert!((nan_mean(&xs).unwrap() - 2.0).abs() < 1e-12);
  }

  #[test]
  fn nan_variance_needs_two_valid_points() {
    let xs = vec![1.0, f64::NAN, f64::NAN];
    assert!(matches!(
      nan_variance(&xs),
      Err(RiskError::InsufficientData { .. })
    ));
  }

  #[test]
  fn complete_pairs_uses_pairwise_deletion() {
    let x = vec![0.1, f64::NAN, 0.3, 0.4];
    let y = vec![0.2, 0.1, f64::NAN, 0.5];
    let (cx, cy) = complete_pairs(&x, &y);
    assert_eq!(cx, vec![0.1, 0.4]);
    assert_eq!(cy, vec![0.2, 0.5]);
  }
}
