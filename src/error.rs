//! # Errors
//!
//! $$
//! \text{input}\to\text{Result}\langle T,\ \text{PortfolioError}\rangle
//! $$
//!
//! Every failure of the optimizer and the evaluator surfaces as a distinct
//! [`PortfolioError`] variant; nothing is swallowed or replaced by a fallback value.

use thiserror::Error;

/// Errors raised by the optimizer and the risk evaluator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PortfolioError {
  /// Fewer than two assets, or too few observations for a covariance estimate.
  #[error("insufficient data: {0}")]
  InsufficientData(String),

  /// The constrained solver did not reach a stationary feasible point.
  #[error("optimization failed: {0}")]
  OptimizationFailed(String),

  /// A zero-spread return series makes a ratio or quantile undefined.
  #[error("degenerate distribution: {0}")]
  DegenerateDistribution(String),

  /// Confidence level outside the open interval (0, 1).
  #[error("invalid confidence level {0}: must lie strictly between 0 and 1")]
  InvalidConfidenceLevel(f64),

  /// Malformed input (shape mismatch, non-finite value, unknown asset, ...).
  #[error("invalid input: {0}")]
  InvalidInput(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PortfolioError>;
