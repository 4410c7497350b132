//! # Weight Bounds
//!
//! $$
//! \mathcal W=\{\mathbf w:\ \mathbf 1^\top\mathbf w=1,\ \ell_i\le w_i\le u_i\},\qquad
//! P_{\mathcal W}(\mathbf v)_i=\operatorname{clip}(v_i-\tau,\ \ell_i,\ u_i)
//! $$
//!
//! Box constraints on portfolio weights and the Euclidean projection onto the
//! fully-invested slice of the box.

use ndarray::Array1;
use ndarray::ArrayView1;

use crate::error::PortfolioError;
use crate::error::Result;

const BISECTION_STEPS: usize = 200;

/// Per-asset lower and upper weight limits.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightBounds {
  lower: Array1<f64>,
  upper: Array1<f64>,
}

impl WeightBounds {
  /// Explicit per-asset limits; each pair must satisfy `0 <= lower <= upper <= 1`.
  pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
    if lower.len() != upper.len() {
      return Err(PortfolioError::InvalidInput(format!(
        "{} lower bounds but {} upper bounds",
        lower.len(),
        upper.len()
      )));
    }

    for (i, (&l, &u)) in lower.iter().zip(upper.iter()).enumerate() {
      if !(l.is_finite() && u.is_finite() && 0.0 <= l && l <= u && u <= 1.0) {
        return Err(PortfolioError::InvalidInput(format!(
          "bounds for asset {i} must satisfy 0 <= lower <= upper <= 1, got [{l}, {u}]"
        )));
      }
    }

    Ok(Self {
      lower: Array1::from(lower),
      upper: Array1::from(upper),
    })
  }

  /// Long-only, fully-invested limits `[0, 1]` for `n` assets.
  pub fn long_only(n: usize) -> Self {
    Self {
      lower: Array1::zeros(n),
      upper: Array1::ones(n),
    }
  }

  /// Same `[lower, upper]` limits for all `n` assets.
  pub fn uniform(n: usize, lower: f64, upper: f64) -> Result<Self> {
    Self::new(vec![lower; n], vec![upper; n])
  }

  pub fn len(&self) -> usize {
    self.lower.len()
  }

  pub fn is_empty(&self) -> bool {
    self.lower.is_empty()
  }

  /// Fails when no weight vector inside the box sums to one.
  pub fn check_feasible(&self) -> Result<()> {
    let lo = self.lower.sum();
    let hi = self.upper.sum();
    if lo > 1.0 + 1e-12 {
      return Err(PortfolioError::OptimizationFailed(format!(
        "constraints are incompatible: lower bounds sum to {lo:.6} > 1"
      )));
    }
    if hi < 1.0 - 1e-12 {
      return Err(PortfolioError::OptimizationFailed(format!(
        "constraints are incompatible: upper bounds sum to {hi:.6} < 1"
      )));
    }
    Ok(())
  }

  /// Whether `w` lies in the box and sums to one, both within `tol`.
  pub fn contains(&self, w: ArrayView1<f64>, tol: f64) -> bool {
    w.len() == self.len()
      && (w.sum() - 1.0).abs() <= tol
      && w
        .iter()
        .zip(self.lower.iter().zip(self.upper.iter()))
        .all(|(&x, (&l, &u))| x >= l - tol && x <= u + tol)
  }

  /// Euclidean projection of `v` onto `{w : sum(w) = 1, lower <= w <= upper}`.
  ///
  /// The shift `tau` is found by bisection on the monotone map
  /// `tau -> sum(clip(v - tau))`, then the residual is spread over the free coordinates.
  pub fn project(&self, v: ArrayView1<f64>) -> Result<Array1<f64>> {
    if v.len() != self.len() {
      return Err(PortfolioError::InvalidInput(format!(
        "cannot project {} weights onto bounds for {} assets",
        v.len(),
        self.len()
      )));
    }
    if v.iter().any(|x| !x.is_finite()) {
      return Err(PortfolioError::OptimizationFailed(
        "iterate became non-finite".to_string(),
      ));
    }
    self.check_feasible()?;

    let clipped = |tau: f64| -> Array1<f64> {
      let mut w = v.to_owned();
      w.iter_mut()
        .zip(self.lower.iter().zip(self.upper.iter()))
        .for_each(|(x, (&l, &u))| *x = (*x - tau).clamp(l, u));
      w
    };

    let mut a = v
      .iter()
      .zip(self.upper.iter())
      .map(|(&x, &u)| x - u)
      .fold(f64::INFINITY, f64::min);
    let mut b = v
      .iter()
      .zip(self.lower.iter())
      .map(|(&x, &l)| x - l)
      .fold(f64::NEG_INFINITY, f64::max);

    for _ in 0..BISECTION_STEPS {
      let mid = 0.5 * (a + b);
      if clipped(mid).sum() > 1.0 {
        a = mid;
      } else {
        b = mid;
      }
      if b - a <= f64::EPSILON * (1.0 + a.abs().max(b.abs())) {
        break;
      }
    }

    let mut w = clipped(0.5 * (a + b));
    let residual = w.sum() - 1.0;
    let free: Vec<usize> = (0..w.len())
      .filter(|&i| w[i] > self.lower[i] && w[i] < self.upper[i])
      .collect();
    if !free.is_empty() {
      let shift = residual / free.len() as f64;
      for &i in &free {
        w[i] = (w[i] - shift).clamp(self.lower[i], self.upper[i]);
      }
    }

    Ok(w)
  }
}
