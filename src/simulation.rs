//! # Monte Carlo Simulation
//!
//! $$
//! \mathbf{r}_t = \mu + L\mathbf{z}_t,\qquad LL^\top = \Sigma
//! $$
//!
//! Correlated multivariate-normal return paths and portfolio value
//! simulation. All randomness comes from a caller-supplied generator;
//! identical generator state reproduces identical output.

use nalgebra::Cholesky;
use nalgebra::DMatrix;
use nalgebra::DVector;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::Distribution;
use rand_distr::StandardNormal;
use rayon::prelude::*;

use crate::error::Result;
use crate::error::RiskError;
use crate::risk::var::empirical_quantile;

/// Distribution summary of simulated terminal portfolio values.
#[derive(Clone, Copy, Debug)]
pub struct SimulationSummary {
  /// Mean terminal value of a unit initial investment.
  pub mean_terminal: f64,
  /// Standard deviation of the terminal values.
  pub volatility_terminal: f64,
  /// 5th percentile of the terminal values.
  pub percentile_05: f64,
  /// 95th percentile of the terminal values.
  pub percentile_95: f64,
  /// Paths simulated.
  pub n_paths: usize,
}

/// Draw `horizon` correlated return vectors `μ + Lz` with `LLᵀ = Σ`.
///
/// Output is `horizon × n_assets`. Fails with
/// [`RiskError::SingularMatrix`] when Σ has no Cholesky factor.
pub fn correlated_returns<R: Rng + ?Sized>(
  mu: &[f64],
  cov: &DMatrix<f64>,
  horizon: usize,
  rng: &mut R,
) -> Result<Array2<f64>> {
  let n = mu.len();
  if cov.nrows() != n || cov.ncols() != n {
    return Err(RiskError::LengthMismatch {
      expected: n,
      actual: cov.nrows(),
    });
  }
  if horizon == 0 {
    return Err(RiskError::invalid("horizon must be positive"));
  }

  let factor = cholesky_factor(cov)?;
  let mu = DVector::from_column_slice(mu);

  let mut out = Array2::zeros((horizon, n));
  for t in 0..horizon {
    let z = DVector::from_iterator(n, (0..n).map(|_| StandardNormal.sample(rng)));
    let r = &mu + &factor * z;
    for (j, &value) in r.iter().enumerate() {
      out[(t, j)] = value;
    }
  }
  Ok(out)
}

/// Simulate compounded portfolio value paths from a unit start.
///
/// Output is `n_paths × (horizon + 1)` with column 0 equal to 1. Paths
/// are generated in parallel; the per-path seeds are drawn from the
/// caller's generator first, so the result is deterministic given the
/// generator state.
pub fn portfolio_paths<R: Rng + ?Sized>(
  weights: &[f64],
  mu: &[f64],
  cov: &DMatrix<f64>,
  horizon: usize,
  n_paths: usize,
  rng: &mut R,
) -> Result<Array2<f64>> {
  if n_paths == 0 {
    return Err(RiskError::invalid("n_paths must be positive"));
  }
  if horizon == 0 {
    return Err(RiskError::invalid("horizon must be positive"));
  }

  let w = normalized_weights(weights, mu.len())?;
  let factor = cholesky_factor(cov)?;
  let mu = DVector::from_column_slice(mu);
  let n = mu.len();

  let seeds: Vec<u64> = (0..n_paths).map(|_| rng.gen()).collect();

  let rows: Vec<Vec<f64>> = seeds
    .into_par_iter()
    .map(|seed| {
      let mut path_rng = StdRng::seed_from_u64(seed);
      let mut path = Vec::with_capacity(horizon + 1);
      let mut value = 1.0;
      path.push(value);
      for _ in 0..horizon {
        let z = DVector::from_iterator(n, (0..n).map(|_| StandardNormal.sample(&mut path_rng)));
        let r = &mu + &factor * z;
        let portfolio_return: f64 = (0..n).map(|i| w[i] * r[i]).sum();
        value *= 1.0 + portfolio_return;
        path.push(value);
      }
      path
    })
    .collect();

  let mut out = Array2::zeros((n_paths, horizon + 1));
  for (p, row) in rows.iter().enumerate() {
    for (t, &v) in row.iter().enumerate() {
      out[(p, t)] = v;
    }
  }
  Ok(out)
}

/// Simulate terminal portfolio values and summarize their distribution.
pub fn simulate_portfolio<R: Rng + ?Sized>(
  weights: &[f64],
  mu: &[f64],
  cov: &DMatrix<f64>,
  horizon: usize,
  n_paths: usize,
  rng: &mut R,
) -> Result<SimulationSummary> {
  let paths = portfolio_paths(weights, mu, cov, horizon, n_paths, rng)?;
  let terminal: Vec<f64> = (0..n_paths).map(|p| paths[(p, horizon)]).collect();

  let mean = terminal.iter().sum::<f64>() / n_paths as f64;
  let variance = if n_paths > 1 {
    terminal.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / (n_paths - 1) as f64
  } else {
    0.0
  };

  Ok(SimulationSummary {
    mean_terminal: mean,
    volatility_terminal: variance.sqrt(),
    percentile_05: empirical_quantile(&terminal, 0.05)?,
    percentile_95: empirical_quantile(&terminal, 0.95)?,
    n_paths,
  })
}

/// One-period portfolio return under a shocked return vector.
pub fn stress_portfolio(weights: &[f64], shocks: &[f64]) -> Result<f64> {
  let w = normalized_weights(weights, shocks.len())?;
  Ok(w.iter().zip(shocks.iter()).map(|(wi, si)| wi * si).sum())
}

fn cholesky_factor(cov: &DMatrix<f64>) -> Result<DMatrix<f64>> {
  Cholesky::new(cov.clone())
    .map(|c| c.l())
    .ok_or_else(|| RiskError::singular("simulation covariance"))
}

fn normalized_weights(weights: &[f64], expected: usize) -> Result<Vec<f64>> {
  if weights.len() != expected {
    return Err(RiskError::LengthMismatch {
      expected,
      actual: weights.len(),
    });
  }
  let total: f64 = weights.iter().sum();
  if total.abs() < 1e-12 {
    return Err(RiskError::invalid("weights sum to zero"));
  }
  Ok(weights.iter().map(|&w| w / total).collect())
}
