//! # Riskfolio
//!
//! $$
//! \min_{\mathbf{w}}\ \mathbf{w}^\top\Sigma\mathbf{w}
//! \quad\text{s.t.}\quad \mathbf{1}^\top\mathbf{w}=1
//! $$
//!
//! Portfolio optimization and financial risk analytics: mean-variance
//! optimizers, efficient frontier generation, risk budgeting, VaR and
//! expected shortfall estimators, factor models and Monte Carlo
//! portfolio simulation.

pub mod error;
pub mod factor;
pub mod linalg;
pub mod portfolio;
pub mod qp;
pub mod returns;
pub mod risk;
pub mod simulation;

pub use error::Result;
pub use error::RiskError;
pub use returns::ReturnMatrix;
