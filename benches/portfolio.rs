use std::hint::black_box;

use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BenchmarkId;
use criterion::Criterion;
use ndarray::Array2;
use portfolio_risk_rs::optimize;
use portfolio_risk_rs::risk::var_historical;
use portfolio_risk_rs::risk::var_monte_carlo;
use portfolio_risk_rs::risk::var_parametric;
use portfolio_risk_rs::OptimizerConfig;
use portfolio_risk_rs::ReturnsMatrix;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Distribution;
use rand_distr::Normal;

const PERIODS: usize = 1_000;

fn returns(n_assets: usize) -> ReturnsMatrix {
  let mut rng = StdRng::seed_from_u64(42);
  let z = Normal::new(0.0, 1.0).unwrap();
  let mut data = Array2::<f64>::zeros((PERIODS, n_assets));
  for mut row in data.rows_mut() {
    let market: f64 = z.sample(&mut rng);
    for (i, r) in row.iter_mut().enumerate() {
      *r = 0.0003 + (0.008 + 0.001 * i as f64) * (0.6 * market + z.sample(&mut rng));
    }
  }
  let assets = (0..n_assets).map(|i| format!("A{i}")).collect();
  ReturnsMatrix::new(assets, data).unwrap()
}

fn bench_optimize(c: &mut Criterion) {
  let mut group = c.benchmark_group("optimize");

  for &n in &[2, 5, 10, 25] {
    let r = returns(n);
    let config = OptimizerConfig::seeded(1);
    group.bench_with_input(BenchmarkId::new("min_variance", n), &r, |b, r| {
      b.iter(|| black_box(optimize(r, &config).unwrap()))
    });
  }

  group.finish();
}

fn bench_var(c: &mut Criterion) {
  let mut group = c.benchmark_group("var");
  let r = returns(5);
  let w = ndarray::Array1::from_elem(5, 0.2);
  let series = r.portfolio_returns(w.view()).unwrap();

  group.bench_function("historical", |b| {
    b.iter(|| black_box(var_historical(&series, 0.95).unwrap()))
  });
  group.bench_function("parametric", |b| {
    b.iter(|| black_box(var_parametric(&series, 0.95).unwrap()))
  });
  for &sims in &[1_000, 10_000, 100_000] {
    group.bench_with_input(BenchmarkId::new("monte_carlo", sims), &sims, |b, &sims| {
      let mut rng = StdRng::seed_from_u64(7);
      b.iter(|| black_box(var_monte_carlo(&series, 0.95, sims, &mut rng).unwrap()))
    });
  }

  group.finish();
}

criterion_group!(benches, bench_optimize, bench_var);
criterion_main!(benches);
