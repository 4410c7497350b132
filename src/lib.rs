//! # portfolio-risk-rs
//!
//! Long-only minimum-variance portfolio construction over a table of asset
//! log returns, followed by a risk report of the resulting portfolio:
//! variance, Sharpe ratio and historical, parametric and Monte-Carlo VaR.
//!
//! ```text
//! prices -> ReturnsMatrix -> optimize -> OptimizationResult -> evaluate -> RiskMetrics
//! ```
//!
//! [`analysis::analyze`] runs the whole pipeline and scales the results to a
//! capital amount.

pub mod analysis;
pub mod error;
pub mod optimizer;
pub mod report;
pub mod returns;
pub mod risk;
pub mod series;
pub mod stats;

pub use analysis::analyze;
pub use analysis::AnalysisConfig;
pub use analysis::PortfolioAnalysis;
pub use error::PortfolioError;
pub use optimizer::optimize;
pub use optimizer::OptimizationResult;
pub use optimizer::OptimizerConfig;
pub use returns::ReturnsMatrix;
pub use risk::evaluate;
pub use risk::EvaluationConfig;
pub use risk::RiskMetrics;
