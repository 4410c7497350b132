use std::fmt::Display;

use crate::error::PortfolioError;
use crate::error::Result;

/// Confidence level of a Value-at-Risk estimate, strictly inside `(0, 1)`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct ConfidenceLevel(f64);

impl ConfidenceLevel {
  pub const NINETY: Self = Self(0.90);
  pub const NINETY_FIVE: Self = Self(0.95);
  pub const NINETY_NINE: Self = Self(0.99);

  /// Levels offered to interactive users.
  pub const PRESETS: [Self; 3] = [Self::NINETY, Self::NINETY_FIVE, Self::NINETY_NINE];

  pub fn new(level: f64) -> Result<Self> {
    if level.is_finite() && level > 0.0 && level < 1.0 {
      Ok(Self(level))
    } else {
      Err(PortfolioError::InvalidConfidenceLevel(level))
    }
  }

  pub fn value(self) -> f64 {
    self.0
  }

  /// Tail probability `1 - level`.
  pub fn tail(self) -> f64 {
    1.0 - self.0
  }
}

impl Default for ConfidenceLevel {
  fn default() -> Self {
    Self::NINETY_FIVE
  }
}

impl Display for ConfidenceLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:.0}%", self.0 * 100.0)
  }
}
