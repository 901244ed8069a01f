//! Monte Carlo simulation infrastructure.
//!
//! # Architecture
//!
//! ```text
//! simulate(config, sample)
//! ├── MonteCarloConfig  (paths, seed, antithetic flag, batch size)
//! ├── batches over rayon, one PricerRng stream per batch
//! └── ordered reduction → McResult { price, std_error, n_paths }
//! ```
//!
//! Each batch draws from its own stream derived from the master seed, and
//! the per-batch sums are reduced in batch order, so a run is reproducible
//! whatever the size of the thread pool.
//!
//! # Examples
//!
//! ```rust
//! use pricer_pricing::mc::{simulate, MonteCarloConfig};
//!
//! let config = MonteCarloConfig::builder().n_paths(20_000).seed(1).build().unwrap();
//! let result = simulate(&config, |rng| rng.gen_uniform()).unwrap();
//! assert!((result.price - 0.5).abs() < 4.0 * result.std_error);
//! ```

mod config;
mod paths;

pub use config::{
    MonteCarloConfig, MonteCarloConfigBuilder, DEFAULT_BATCH_SIZE, DEFAULT_PATHS, DEFAULT_SEED, MAX_PATHS, MAX_STEPS,
};
pub use paths::{
    cholesky, generate_antithetic_paths, generate_correlated_antithetic_paths, generate_gbm_path, GbmParams,
    PathPair, TimeGrid,
};

use rayon::prelude::*;
use tracing::debug;

use crate::error::ConfigError;
use crate::rng::PricerRng;

/// Outcome of a simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct McResult {
    /// Sample mean.
    pub price: f64,
    /// Standard error of the mean over independent samples.
    pub std_error: f64,
    /// Simulated paths, counting both legs of an antithetic pair.
    pub n_paths: usize,
}

impl McResult {
    /// Scales price and error, e.g. by a notional.
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            price: self.price * factor,
            std_error: self.std_error * factor.abs(),
            n_paths: self.n_paths,
        }
    }
}

#[derive(Clone, Copy, Default)]
struct Moments {
    sum: f64,
    sum_sq: f64,
    count: usize,
}

/// Runs `sample` once per independent sample and averages.
///
/// `sample` must return one independent draw; under antithetic sampling
/// that is the mean payoff of a path pair. The closure is called from
/// worker threads with a batch-local generator.
///
/// # Errors
/// The configuration's own validation errors.
pub fn simulate<F>(config: &MonteCarloConfig, sample: F) -> Result<McResult, ConfigError>
where
    F: Fn(&mut PricerRng) -> f64 + Sync,
{
    config.validate()?;
    let n = config.n_samples();
    let batch = config.batch_size();
    let n_batches = n.div_ceil(batch);
    debug!(
        n_paths = config.n_paths(),
        seed = config.seed(),
        antithetic = config.antithetic(),
        n_batches,
        "monte carlo run"
    );

    let partials: Vec<Moments> = (0..n_batches)
        .into_par_iter()
        .map(|b| {
            let mut rng = PricerRng::for_stream(config.seed(), b as u64);
            let size = batch.min(n - b * batch);
            let mut m = Moments::default();
            for _ in 0..size {
                let x = sample(&mut rng);
                m.sum += x;
                m.sum_sq += x * x;
                m.count += 1;
            }
            m
        })
        .collect();

    let total = partials.iter().fold(Moments::default(), |acc, m| Moments {
        sum: acc.sum + m.sum,
        sum_sq: acc.sum_sq + m.sum_sq,
        count: acc.count + m.count,
    });
    let count = total.count as f64;
    let mean = total.sum / count;
    let variance = if total.count > 1 {
        ((total.sum_sq - count * mean * mean) / (count - 1.0)).max(0.0)
    } else {
        0.0
    };
    Ok(McResult {
        price: mean,
        std_error: (variance / count).sqrt(),
        n_paths: config.n_paths(),
    })
}

/// Draws one sample of a single-asset payoff on `grid`.
///
/// Under antithetic sampling the payoff is evaluated on both legs of a
/// pair and averaged.
pub fn sample_path<P>(params: &GbmParams, grid: &TimeGrid, antithetic: bool, rng: &mut PricerRng, payoff: P) -> f64
where
    P: Fn(&[f64]) -> f64,
{
    if antithetic {
        let pair = generate_antithetic_paths(params, grid, rng);
        0.5 * (payoff(&pair.up) + payoff(&pair.down))
    } else {
        payoff(&generate_gbm_path(params, grid, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config(seed: u64) -> MonteCarloConfig {
        MonteCarloConfig::builder().n_paths(20_000).seed(seed).build().unwrap()
    }

    #[test]
    fn test_reproducible() {
        let f = |rng: &mut PricerRng| rng.gen_normal();
        let a = simulate(&config(9), f).unwrap();
        let b = simulate(&config(9), f).unwrap();
        assert_eq!(a, b);
        let c = simulate(&config(10), f).unwrap();
        assert_ne!(a.price, c.price);
    }

    #[test]
    fn test_batch_independent_of_threads() {
        let f = |rng: &mut PricerRng| rng.gen_uniform();
        let serial = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap()
            .install(|| simulate(&config(3), f).unwrap());
        let parallel = simulate(&config(3), f).unwrap();
        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_forward_expectation() {
        let params = GbmParams::new(100.0, 0.05, 0.0, 0.2);
        let grid = TimeGrid::uniform(1.0, 1).unwrap();
        let result = simulate(&config(4), |rng| sample_path(&params, &grid, true, rng, |p| p[0])).unwrap();
        assert_relative_eq!(result.price, 100.0 * 0.05f64.exp(), max_relative = 3e-3);
        assert_eq!(result.n_paths, 20_000);
    }

    #[test]
    fn test_std_error_shrinks() {
        let small = MonteCarloConfig::builder().n_paths(2_000).build().unwrap();
        let large = MonteCarloConfig::builder().n_paths(200_000).build().unwrap();
        let f = |rng: &mut PricerRng| rng.gen_normal();
        let e_small = simulate(&small, f).unwrap().std_error;
        let e_large = simulate(&large, f).unwrap().std_error;
        assert!(e_large < e_small / 5.0);
    }

    #[test]
    fn test_scaled() {
        let r = McResult {
            price: 2.0,
            std_error: 0.1,
            n_paths: 10,
        };
        let s = r.scaled(-3.0);
        assert_eq!(s.price, -6.0);
        assert_relative_eq!(s.std_error, 0.3);
    }
}
