//! # Quadratic Programming
//!
//! $$
//! \min_{\mathbf{x}}\ \tfrac{1}{2}\mathbf{x}^\top D\mathbf{x}
//! - \mathbf{q}^\top\mathbf{x}
//! \quad\text{s.t.}\quad A_1\mathbf{x} = \mathbf{b}_1,\ A_2\mathbf{x}
//! \ge \mathbf{b}_2
//! $$
//!
//! Primal active-set solver for strictly convex quadratic programs. With
//! `D` positive-definite the stationary point of each working set is the
//! unique minimizer over that set, so the iteration terminates at the
//! global optimum in a bounded number of working-set changes.

use nalgebra::DMatrix;
use nalgebra::DVector;

use crate::error::Result;
use crate::error::RiskError;

/// Feasibility and multiplier tolerance.
const TOL: f64 = 1e-9;

/// A quadratic program `min ½xᵀDx − qᵀx` with linear constraints.
///
/// The first `meq` rows of `a`/`b` are equalities `aᵢᵀx = bᵢ`; the
/// remaining rows are inequalities `aⱼᵀx ≥ bⱼ`. `d` must be symmetric
/// positive-definite.
#[derive(Clone, Debug)]
pub struct QpProblem {
  pub d: DMatrix<f64>,
  pub q: DVector<f64>,
  pub a: DMatrix<f64>,
  pub b: DVector<f64>,
  pub meq: usize,
}

/// Solution of a [`QpProblem`].
#[derive(Clone, Debug)]
pub struct QpSolution {
  /// Optimal point.
  pub x: DVector<f64>,
  /// Lagrange multipliers, one per constraint row (zero when inactive).
  pub lagrange: Vec<f64>,
  /// Objective value at the optimum.
  pub objective: f64,
  /// Number of working-set solves performed.
  pub iterations: usize,
}

impl QpProblem {
  fn validate(&self) -> Result<()> {
    let n = self.d.nrows();
    if self.d.ncols() != n {
      return Err(RiskError::LengthMismatch {
        expected: n,
        actual: self.d.ncols(),
      });
    }
    if self.q.len() != n {
      return Err(RiskError::LengthMismatch {
        expected: n,
        actual: self.q.len(),
      });
    }
    if self.a.nrows() != self.b.len() {
      return Err(RiskError::LengthMismatch {
        expected: self.a.nrows(),
        actual: self.b.len(),
      });
    }
    if self.a.nrows() > 0 && self.a.ncols() != n {
      return Err(RiskError::LengthMismatch {
        expected: n,
        actual: self.a.ncols(),
      });
    }
    if self.meq > self.a.nrows() {
      return Err(RiskError::invalid(format!(
        "meq ({}) exceeds constraint count ({})",
        self.meq,
        self.a.nrows()
      )));
    }
    Ok(())
  }
}

/// Solve a strictly convex QP by the primal active-set method.
///
/// Starts from the equality-constrained stationary point and repeatedly
/// adds the most violated inequality to the working set, dropping
/// working inequalities whose multipliers turn negative. Fails with
/// [`RiskError::Infeasible`] when the constraint set is degenerate or
/// the working-set iteration bound is exhausted.
pub fn solve(problem: &QpProblem) -> Result<QpSolution> {
  problem.validate()?;

  let n = problem.d.nrows();
  let m = problem.a.nrows();
  let max_iters = 50 * (m + 1);

  let mut working: Vec<usize> = (0..problem.meq).collect();
  let mut iterations = 0usize;

  loop {
    iterations += 1;
    if iterations > max_iters {
      return Err(RiskError::infeasible(
        "active-set iteration limit exhausted",
      ));
    }

    let (x, lambda) = solve_working_set(problem, &working)?;

    // Most violated inequality outside the working set.
    let mut worst: Option<(usize, f64)> = None;
    for j in problem.meq..m {
      if working.contains(&j) {
        continue;
      }
      let mut ax = 0.0;
      for col in 0..n {
        ax += problem.a[(j, col)] * x[col];
      }
      let slack = ax - problem.b[j];
      if slack < -TOL {
        let violation = -slack;
        if worst.map(|(_, v)| violation > v).unwrap_or(true) {
          worst = Some((j, violation));
        }
      }
    }

    if let Some((j, _)) = worst {
      working.push(j);
      continue;
    }

    // Feasible: drop the working inequality with the most negative
    // multiplier, if any, otherwise we are optimal.
    let mut drop_at: Option<(usize, f64)> = None;
    for (k, &j) in working.iter().enumerate() {
      if j < problem.meq {
        continue;
      }
      if lambda[k] < -TOL && drop_at.map(|(_, l)| lambda[k] < l).unwrap_or(true) {
        drop_at = Some((k, lambda[k]));
      }
    }

    if let Some((k, _)) = drop_at {
      working.remove(k);
      continue;
    }

    let mut lagrange = vec![0.0; m];
    for (k, &j) in working.iter().enumerate() {
      lagrange[j] = lambda[k];
    }
    let objective = 0.5 * (x.transpose() * &problem.d * &x)[(0, 0)] - problem.q.dot(&x);

    return Ok(QpSolution {
      x,
      lagrange,
      objective,
      iterations,
    });
  }
}

/// Stationary point of the working-set equality problem via the KKT
/// system `[D −Aᵀ; A 0]·[x; λ] = [q; b]`.
fn solve_working_set(
  problem: &QpProblem,
  working: &[usize],
) -> Result<(DVector<f64>, DVector<f64>)> {
  let n = problem.d.nrows();
  let k = working.len();

  let mut kkt = DMatrix::zeros(n + k, n + k);
  kkt.view_mut((0, 0), (n, n)).copy_from(&problem.d);
  for (row, &j) in working.iter().enumerate() {
    for col in 0..n {
      kkt[(n + row, col)] = problem.a[(j, col)];
      kkt[(col, n + row)] = -problem.a[(j, col)];
    }
  }

  let mut rhs = DVector::zeros(n + k);
  rhs.rows_mut(0, n).copy_from(&problem.q);
  for (row, &j) in working.iter().enumerate() {
    rhs[n + row] = problem.b[j];
  }

  let solution = kkt
    .full_piv_lu()
    .solve(&rhs)
    .ok_or_else(|| RiskError::infeasible("degenerate constraint set"))?;

  let x = DVector::from_iterator(n, (0..n).map(|i| solution[i]));
  let lambda = DVector::from_iterator(k, (0..k).map(|i| solution[n + i]));
  Ok((x, lambda))
}
