//! # Factor Models
//!
//! $$
//! r = \alpha + B^\top f + \varepsilon
//! $$
//!
//! CAPM, multi-factor OLS regression and principal component analysis.

pub mod capm;
pub mod pca;
pub mod regression;

pub use capm::capm;
pub use capm::CapmEstimate;
pub use pca::principal_components;
pub use pca::PcaResult;
pub use regression::factor_regression;
pub use regression::FactorModelEstimate;
