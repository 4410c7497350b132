//! # Risk
//!
//! $$
//! \sigma_p^2=\mathbf w^\top\Sigma\mathbf w,\qquad
//! S=\frac{\overline{R_p-r_f}}{\sigma(R_p-r_f)},\qquad
//! \mathrm{VaR}_c=Q_{R_p}(1-c)
//! $$
//!
//! Performance and risk evaluation of a weight vector: portfolio variance,
//! Sharpe ratio and three Value-at-Risk estimators.

pub mod confidence;
pub mod metrics;
pub mod sharpe;
pub mod var;
pub mod variance;

pub use confidence::ConfidenceLevel;
pub use metrics::evaluate;
pub use metrics::evaluate_series;
pub use metrics::EvaluationConfig;
pub use metrics::RiskMetrics;
pub use sharpe::sharpe_ratio;
pub use sharpe::sharpe_ratio_of_series;
pub use var::var_historical;
pub use var::var_monte_carlo;
pub use var::var_parametric;
pub use var::VarMethod;
pub use var::DEFAULT_SIMULATIONS;
pub use variance::portfolio_variance;
