//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Mean-variance optimization, efficient frontier generation and risk
//! budgeting.

pub mod frontier;
pub mod optimizer;
pub mod risk_budget;
pub mod types;

pub use frontier::efficient_frontier;
pub use optimizer::maximum_sharpe;
pub use optimizer::minimum_variance;
pub use optimizer::portfolio_stats;
pub use optimizer::target_return_portfolio;
pub use risk_budget::risk_budgeting_portfolio;
pub use risk_budget::risk_budgeting_weights;
pub use risk_budget::risk_contributions;
pub use types::apply_weight_policy;
pub use types::FrontierPoint;
pub use types::PortfolioResult;
pub use types::PortfolioStatistics;
pub use types::RiskBudgetResult;
pub use types::WeightPolicy;
