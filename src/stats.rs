//! # Stats
//!
//! $$
//! \bar x=\frac1N\sum_{t=1}^N x_t,\qquad \sigma=\sqrt{\frac1N\sum_{t=1}^N (x_t-\bar x)^2}
//! $$
//!
//! Sample moments and empirical quantiles shared by the risk evaluator.
//! Standard deviations here divide by `N` (population convention); the
//! optimizer's covariance divides by `N - 1`.

/// Arithmetic mean, NaN for an empty slice.
pub fn mean(xs: &[f64]) -> f64 {
  if xs.is_empty() {
    return f64::NAN;
  }

  xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population standard deviation (divisor `N`), NaN for an empty slice.
pub fn population_std(xs: &[f64]) -> f64 {
  dispersion(xs, 0)
}

/// Sample standard deviation (divisor `N - 1`), NaN below two observations.
pub fn sample_std(xs: &[f64]) -> f64 {
  dispersion(xs, 1)
}

fn dispersion(xs: &[f64], ddof: usize) -> f64 {
  if xs.len() <= ddof {
    return f64::NAN;
  }

  let m = mean(xs);
  let acc: f64 = xs.iter().map(|&x| (x - m) * (x - m)).sum();
  (acc / (xs.len() - ddof) as f64).sqrt()
}

/// Ascending copy of `xs`, NaNs ordered last.
pub fn sorted(xs: &[f64]) -> Vec<f64> {
  let mut out = xs.to_vec();
  out.sort_by(|a, b| a.total_cmp(b));
  out
}

/// Quantile `q` in `[0, 1]` of an ascending sample.
///
/// Linear interpolation between the closest ranks at position `q (n - 1)`,
/// the default rule of the common numerical percentile routines.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
  match sorted.len() {
    0 => f64::NAN,
    1 => sorted[0],
    n => {
      let pos = q.clamp(0.0, 1.0) * (n as f64 - 1.0);
      let lo = pos.floor() as usize;
      let hi = pos.ceil() as usize;
      if lo == hi {
        sorted[lo]
      } else {
        let w = pos - lo as f64;
        sorted[lo] * (1.0 - w) + sorted[hi] * w
      }
    }
  }
}

/// Quantile `q` in `[0, 1]` of an unsorted sample.
pub fn quantile(xs: &[f64], q: f64) -> f64 {
  quantile_sorted(&sorted(xs), q)
}
