//! Path generation for Monte Carlo simulation.
//!
//! Geometric Brownian motion is stepped exactly in log space, so the
//! simulated marginals carry no discretisation bias on any grid:
//!
//! ```text
//! S(t + Δt) = S(t) · exp((r − q − σ²/2)·Δt + σ·√Δt·Z)
//! ```
//!
//! Generators are pure functions of the parameters, the time grid and the
//! RNG state; they own no buffers between calls.

use pricer_core::types::{Date, DayCountConvention};

use super::config::MAX_STEPS;
use crate::error::ConfigError;
use crate::rng::PricerRng;

/// Risk-neutral GBM parameters.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::GbmParams;
///
/// let params = GbmParams::new(100.0, 0.05, 0.0, 0.2);
/// assert!(params.validate().is_ok());
/// assert!(GbmParams::new(-1.0, 0.05, 0.0, 0.2).validate().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GbmParams {
    /// Initial spot.
    pub spot: f64,
    /// Continuously compounded risk-free rate.
    pub rate: f64,
    /// Continuous dividend yield.
    pub dividend: f64,
    /// Volatility.
    pub volatility: f64,
}

impl GbmParams {
    /// Creates new GBM parameters.
    #[inline]
    pub fn new(spot: f64, rate: f64, dividend: f64, volatility: f64) -> Self {
        Self {
            spot,
            rate,
            dividend,
            volatility,
        }
    }

    /// Checks spot and volatility.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.spot > 0.0) || !self.spot.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "spot",
                value: self.spot.to_string(),
            });
        }
        if !(self.volatility >= 0.0) || !self.volatility.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "volatility",
                value: self.volatility.to_string(),
            });
        }
        if !self.rate.is_finite() || !self.dividend.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "rate",
                value: format!("r={} q={}", self.rate, self.dividend),
            });
        }
        Ok(())
    }

    #[inline]
    fn drift(&self) -> f64 {
        self.rate - self.dividend - 0.5 * self.volatility * self.volatility
    }
}

/// Simulation times in years after valuation, strictly increasing.
///
/// Valuation itself (t = 0) is implicit and not stored.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeGrid {
    times: Vec<f64>,
}

impl TimeGrid {
    /// Grid over explicit times.
    ///
    /// # Errors
    /// `InvalidStepCount` for an empty grid or one longer than `MAX_STEPS`;
    /// `InvalidParameter` for non-increasing or non-positive times.
    pub fn new(times: Vec<f64>) -> Result<Self, ConfigError> {
        if times.is_empty() || times.len() > MAX_STEPS {
            return Err(ConfigError::InvalidStepCount(times.len()));
        }
        let mut prev: f64 = 0.0;
        for &t in &times {
            if !(t > prev) || !t.is_finite() {
                return Err(ConfigError::InvalidParameter {
                    name: "time_grid",
                    value: format!("{t} after {prev}"),
                });
            }
            prev = t;
        }
        Ok(Self { times })
    }

    /// `n` equal steps to `maturity`.
    pub fn uniform(maturity: f64, n: usize) -> Result<Self, ConfigError> {
        if n == 0 {
            return Err(ConfigError::InvalidStepCount(0));
        }
        Self::new((1..=n).map(|i| maturity * i as f64 / n as f64).collect())
    }

    /// ACT/365F times of the dates after `valuation`; earlier dates are dropped.
    pub fn from_dates(valuation: Date, dates: &[Date]) -> Result<Self, ConfigError> {
        let dc = DayCountConvention::Actual365Fixed;
        Self::new(
            dates
                .iter()
                .filter(|d| **d > valuation)
                .map(|d| dc.year_frac(valuation, *d).fraction)
                .collect(),
        )
    }

    /// Grid times.
    #[inline]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Number of steps.
    #[inline]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always false; grids hold at least one step.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Last time.
    #[inline]
    pub fn maturity(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    /// Steps `(Δt, √Δt)`.
    fn increments(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        let mut prev: f64 = 0.0;
        self.times.iter().map(move |&t| {
            let dt = t - prev;
            prev = t;
            (dt, dt.sqrt())
        })
    }
}

/// A path and its antithetic mirror, sampled on the grid times.
#[derive(Clone, Debug, PartialEq)]
pub struct PathPair {
    /// Path driven by `Z`.
    pub up: Vec<f64>,
    /// Path driven by `−Z`.
    pub down: Vec<f64>,
}

/// One GBM path on `grid`.
pub fn generate_gbm_path(params: &GbmParams, grid: &TimeGrid, rng: &mut PricerRng) -> Vec<f64> {
    let mu = params.drift();
    let mut log_s = params.spot.ln();
    grid.increments()
        .map(|(dt, sqrt_dt)| {
            log_s += mu * dt + params.volatility * sqrt_dt * rng.gen_normal();
            log_s.exp()
        })
        .collect()
}

/// A GBM path and its antithetic mirror on `grid`.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::{generate_antithetic_paths, GbmParams, TimeGrid};
/// use pricer_pricing::rng::PricerRng;
///
/// let params = GbmParams::new(100.0, 0.0, 0.0, 0.2);
/// let grid = TimeGrid::uniform(1.0, 12).unwrap();
/// let pair = generate_antithetic_paths(&params, &grid, &mut PricerRng::from_seed(1));
/// // Zero drift: the log-returns mirror each other.
/// let sum = (pair.up[11] / 100.0).ln() + (pair.down[11] / 100.0).ln();
/// assert!((sum + 0.2f64.powi(2)).abs() < 1e-12);
/// ```
pub fn generate_antithetic_paths(params: &GbmParams, grid: &TimeGrid, rng: &mut PricerRng) -> PathPair {
    let mu = params.drift();
    let (mut up_log, mut down_log) = (params.spot.ln(), params.spot.ln());
    let mut up = Vec::with_capacity(grid.len());
    let mut down = Vec::with_capacity(grid.len());
    for (dt, sqrt_dt) in grid.increments() {
        let shock = params.volatility * sqrt_dt * rng.gen_normal();
        up_log += mu * dt + shock;
        down_log += mu * dt - shock;
        up.push(up_log.exp());
        down.push(down_log.exp());
    }
    PathPair { up, down }
}

/// Lower-triangular Cholesky factor of a correlation matrix.
///
/// # Errors
/// `InvalidParameter` if the matrix is not square or not positive definite.
pub fn cholesky(matrix: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ConfigError> {
    let n = matrix.len();
    if matrix.iter().any(|row| row.len() != n) {
        return Err(ConfigError::InvalidParameter {
            name: "correlation",
            value: "matrix is not square".to_string(),
        });
    }
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let s: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();
            if i == j {
                let d = matrix[i][i] - s;
                if !(d > 0.0) {
                    return Err(ConfigError::InvalidParameter {
                        name: "correlation",
                        value: format!("not positive definite at row {i}"),
                    });
                }
                l[i][j] = d.sqrt();
            } else {
                l[i][j] = (matrix[i][j] - s) / l[j][j];
            }
        }
    }
    Ok(l)
}

/// Correlated GBM paths for a basket, with their antithetic mirrors.
///
/// Returns `(up, down)`, each indexed `[asset][step]`. `factor` is the
/// Cholesky factor from [`cholesky`].
pub fn generate_correlated_antithetic_paths(
    params: &[GbmParams],
    factor: &[Vec<f64>],
    grid: &TimeGrid,
    rng: &mut PricerRng,
) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let n = params.len();
    let mut up_log: Vec<f64> = params.iter().map(|p| p.spot.ln()).collect();
    let mut down_log = up_log.clone();
    let mut up = vec![Vec::with_capacity(grid.len()); n];
    let mut down = vec![Vec::with_capacity(grid.len()); n];
    let mut z = vec![0.0; n];
    for (dt, sqrt_dt) in grid.increments() {
        rng.fill_normal(&mut z);
        for i in 0..n {
            let w: f64 = factor[i].iter().zip(&z).take(i + 1).map(|(a, b)| a * b).sum();
            let p = &params[i];
            let shock = p.volatility * sqrt_dt * w;
            up_log[i] += p.drift() * dt + shock;
            down_log[i] += p.drift() * dt - shock;
            up[i].push(up_log[i].exp());
            down[i].push(down_log[i].exp());
        }
    }
    (up, down)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_grid_validation() {
        assert!(TimeGrid::new(vec![]).is_err());
        assert!(TimeGrid::new(vec![0.5, 0.5]).is_err());
        assert!(TimeGrid::new(vec![0.0, 1.0]).is_err());
        let g = TimeGrid::uniform(1.0, 4).unwrap();
        assert_eq!(g.times(), &[0.25, 0.5, 0.75, 1.0]);
        assert_eq!(g.maturity(), 1.0);
    }

    #[test]
    fn test_grid_from_dates_drops_past() {
        let v = Date::from_ymd(2021, 8, 13).unwrap();
        let dates = [
            Date::from_ymd(2021, 7, 5).unwrap(),
            Date::from_ymd(2021, 8, 13).unwrap(),
            Date::from_ymd(2021, 9, 3).unwrap(),
        ];
        let g = TimeGrid::from_dates(v, &dates).unwrap();
        assert_eq!(g.len(), 1);
        assert_relative_eq!(g.times()[0], 21.0 / 365.0);
    }

    #[test]
    fn test_martingale_under_risk_neutral_drift() {
        let params = GbmParams::new(100.0, 0.03, 0.01, 0.25);
        let grid = TimeGrid::uniform(1.0, 4).unwrap();
        let mut rng = PricerRng::from_seed(11);
        let n = 20_000;
        let mut sum: f64 = 0.0;
        for _ in 0..n {
            let pair = generate_antithetic_paths(&params, &grid, &mut rng);
            sum += 0.5 * (pair.up[3] + pair.down[3]);
        }
        let expected = 100.0 * (0.02f64).exp();
        assert_relative_eq!(sum / n as f64, expected, max_relative = 5e-3);
    }

    #[test]
    fn test_zero_vol_is_deterministic() {
        let params = GbmParams::new(50.0, 0.05, 0.0, 0.0);
        let grid = TimeGrid::uniform(2.0, 8).unwrap();
        let path = generate_gbm_path(&params, &grid, &mut PricerRng::from_seed(3));
        assert_relative_eq!(path[7], 50.0 * 0.1f64.exp(), max_relative = 1e-12);
    }

    #[test]
    fn test_cholesky() {
        let corr = vec![vec![1.0, 0.6], vec![0.6, 1.0]];
        let l = cholesky(&corr).unwrap();
        assert_relative_eq!(l[1][0], 0.6);
        assert_relative_eq!(l[1][1], 0.8);
        assert!(cholesky(&[vec![1.0, 1.2], vec![1.2, 1.0]]).is_err());
        assert!(cholesky(&[vec![1.0, 0.0]]).is_err());
    }

    #[test]
    fn test_correlated_paths_sample_correlation() {
        let params = [GbmParams::new(1.0, 0.0, 0.0, 0.2); 2];
        let factor = cholesky(&[vec![1.0, 0.7], vec![0.7, 1.0]]).unwrap();
        let grid = TimeGrid::uniform(1.0, 1).unwrap();
        let mut rng = PricerRng::from_seed(5);
        let (mut sxy, mut sxx, mut syy) = (0.0f64, 0.0f64, 0.0f64);
        for _ in 0..20_000 {
            let (up, _) = generate_correlated_antithetic_paths(&params, &factor, &grid, &mut rng);
            let (x, y) = (up[0][0].ln() + 0.02, up[1][0].ln() + 0.02);
            sxy += x * y;
            sxx += x * x;
            syy += y * y;
        }
        assert_relative_eq!(sxy / (sxx * syy).sqrt(), 0.7, epsilon = 0.02);
    }
}
