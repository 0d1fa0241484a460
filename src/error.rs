//! # Errors
//!
//! $$
//! \text{Error taxonomy: data} \to \text{estimation} \to \text{optimization}
//! $$
//!
//! Crate-wide error type and result alias.

use thiserror::Error;

/// Result type alias for riskfolio operations.
pub type Result<T> = std::result::Result<T, RiskError>;

/// Error type shared by estimators, optimizers and simulators.
#[derive(Error, Debug)]
pub enum RiskError {
  /// Too few valid (non-missing) observations for a statistic.
  #[error("Insufficient data: need at least {required} observations, got {available}")]
  InsufficientData { required: usize, available: usize },

  /// A matrix that must be invertible is singular or numerically rank-deficient.
  #[error("Singular matrix in {context}")]
  SingularMatrix { context: String },

  /// No point satisfies all optimization constraints simultaneously.
  #[error("Infeasible problem: {detail}")]
  Infeasible { detail: String },

  /// Invalid parameter value.
  #[error("Invalid parameter: {message}")]
  InvalidParameter { message: String },

  /// Dimension mismatch between related inputs.
  #[error("Length mismatch: expected {expected}, got {actual}")]
  LengthMismatch { expected: usize, actual: usize },
}

impl RiskError {
  pub(crate) fn singular(context: impl Into<String>) -> Self {
    Self::SingularMatrix {
      context: context.into(),
    }
  }

  pub(crate) fn infeasible(detail: impl Into<String>) -> Self {
    Self::Infeasible {
      detail: detail.into(),
    }
  }

  pub(crate) fn invalid(message: impl Into<String>) -> Self {
    Self::InvalidParameter {
      message: message.into(),
    }
  }
}
