//! # Risk Metrics
//!
//! $$
//! \operatorname{ES}_\alpha \ge \operatorname{VaR}_\alpha
//! $$
//!
//! Value-at-Risk and Expected Shortfall estimators for single return
//! series.

pub mod shortfall;
pub mod var;

pub use shortfall::historical_shortfall;
pub use shortfall::monte_carlo_shortfall;
pub use shortfall::parametric_shortfall;
pub use var::historical_var;
pub use var::monte_carlo_var;
pub use var::parametric_var;
