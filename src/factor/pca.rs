//! # Principal Component Analysis
//!
//! $$
//! \Sigma = V \Lambda V^\top,\qquad \lambda_1 \ge \lambda_2 \ge \dots
//! $$
//!
//! Eigendecomposition of the return covariance with explained-variance
//! ratios, eigenvalues sorted descending.

use nalgebra::SymmetricEigen;

use crate::error::Result;
use crate::error::RiskError;
use crate::linalg::covariance;
use crate::returns::ReturnMatrix;

/// Output of [`principal_components`].
#[derive(Clone, Debug)]
pub struct PcaResult {
  /// Retained eigenvalues, descending.
  pub eigenvalues: Vec<f64>,
  /// Fraction of total variance captured by each retained component.
  pub explained_variance_ratio: Vec<f64>,
  /// One loading vector per retained component (asset order).
  pub loadings: Vec<Vec<f64>>,
}

/// Leading `k` principal components of the return covariance. `k` is
/// clamped to the asset count.
pub fn principal_components(returns: &ReturnMatrix, k: usize) -> Result<PcaResult> {
  if k == 0 {
    return Err(RiskError::invalid("k must be positive"));
  }

  let cov = covariance(returns)?;
  let n = cov.nrows();
  let keep = k.min(n);

  let eigen = SymmetricEigen::new(cov);
  let mut order: Vec<usize> = (0..n).collect();
  order.sort_by(|&a, &b| {
    eigen.eigenvalues[b]
      .partial_cmp(&eigen.eigenvalues[a])
      .unwrap_or(std::cmp::Ordering::Equal)
  });

  // Rounding can push PSD eigenvalues marginally below zero.
  let all_eigenvalues: Vec<f64> = order
    .iter()
    .map(|&i| eigen.eigenvalues[i].max(0.0))
    .collect();
  let total: f64 = all_eigenvalues.iter().sum();
  if total <= 0.0 {
    return Err(RiskError::singular("pca covariance"));
  }

  let mut eigenvalues = Vec::with_capacity(keep);
  let mut explained_variance_ratio = Vec::with_capacity(keep);
  let mut loadings = Vec::with_capacity(keep);
  for (rank, &idx) in order.iter().take(keep).enumerate() {
    eigenvalues.push(all_eigenvalues[rank]);
    explained_variance_ratio.push(all_eigenvalues[rank] / total);

    let column = eigen.eigenvectors.column(idx);
    let mut vector: Vec<f64> = column.iter().copied().collect();
    // Fix the sign so the dominant entry is positive.
    let dominant = vector
      .iter()
      .cloned()
      .max_by(|a, b| a.abs().partial_cmp(&b.abs()).unwrap())
      .unwrap_or(0.0);
    if dominant < 0.0 {
      for v in &mut vector {
        *v = -*v;
      }
    }
    loadings.push(vector);
  }

  Ok(PcaResult {
    eigenvalues,
    explained_variance_ratio,
    loadings,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn diagonal_returns() -> ReturnMatrix {
    // Orthogonal supports give an exactly diagonal sample covariance.
    let vols = [0.3, 0.2, 0.1];
    let n = vols.len();
    let mut columns = vec![vec![0.0; 2 * n]; n];
    for (i, &v) in vols.iter().enumerate() {
      columns[i][2 * i] = v;
      columns[i][2 * i + 1] = -v;
    }
    ReturnMatrix::from_columns(
      (0..n).map(|i| format!("A{i}")).collect(),
      columns,
    )
    .unwrap()
  }

  #[test]
  fn eigenvalues_are_sorted_descending() {
    let pca = principal_components(&diagonal_returns(), 3).unwrap();
    assert_eq!(pca.eigenvalues.len(), 3);
    for pair in pca.eigenvalues.windows(2) {
      assert!(pair[0] >= pair[1]);
    }
  }

  #[test]
  fn explained_ratios_sum_to_one_for_full_decomposition() {
    let pca = principal_components(&diagonal_returns(), 3).unwrap();
    let sum: f64 = pca.explained_variance_ratio.iter().sum();
    assert!((sum - 1.0).abs() < 1e-10);
  }

  #[test]
  fn leading_component_points_at_the_most_volatile_asset() {
    let pca = principal_components(&diagonal_returns(), 1).unwrap();
    let loading = &pca.loadings[0];
    assert!(loading[0].abs() > 0.99);
    assert!(loading[1].abs() < 1e-8);
    assert!(loading[2].abs() < 1e-8);
  }

  #[test]
  fn k_is_clamped_to_asset_count() {
    let pca = principal_components(&diagonal_returns(), 10).unwrap();
    assert_eq!(pca.eigenvalues.len(), 3);
  }
}
