//! Monte Carlo simulation configuration.

use crate::error::ConfigError;

/// Maximum number of simulation paths allowed.
pub const MAX_PATHS: usize = 10_000_000;

/// Maximum number of time steps allowed per path.
pub const MAX_STEPS: usize = 10_000;

/// Default number of paths.
pub const DEFAULT_PATHS: usize = 20_000;

/// Default seed.
pub const DEFAULT_SEED: u64 = 42;

/// Default number of samples per parallel batch.
pub const DEFAULT_BATCH_SIZE: usize = 512;

/// Monte Carlo simulation configuration.
///
/// Immutable; build through [`MonteCarloConfig::builder`]. The seed is part
/// of the configuration, so two runs with equal configurations give equal
/// prices whatever the thread count.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::MonteCarloConfig;
///
/// let config = MonteCarloConfig::builder()
///     .n_paths(10_000)
///     .seed(7)
///     .build()
///     .unwrap();
/// assert_eq!(config.n_paths(), 10_000);
/// assert!(config.antithetic());
///
/// let default = MonteCarloConfig::default();
/// assert_eq!((default.n_paths(), default.seed()), (20_000, 42));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonteCarloConfig {
    n_paths: usize,
    seed: u64,
    antithetic: bool,
    batch_size: usize,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            n_paths: DEFAULT_PATHS,
            seed: DEFAULT_SEED,
            antithetic: true,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl MonteCarloConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> MonteCarloConfigBuilder {
        MonteCarloConfigBuilder::default()
    }

    /// Number of simulated paths; antithetic runs round up to an even count.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Master seed.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether paths are drawn in antithetic pairs.
    #[inline]
    pub fn antithetic(&self) -> bool {
        self.antithetic
    }

    /// Samples per parallel batch.
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Independent samples: pairs under antithetic sampling, paths otherwise.
    #[inline]
    pub fn n_samples(&self) -> usize {
        if self.antithetic {
            self.n_paths.div_ceil(2)
        } else {
            self.n_paths
        }
    }

    /// Copy with another seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Checks the limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_paths < 2 || self.n_paths > MAX_PATHS {
            return Err(ConfigError::InvalidPathCount(self.n_paths));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "batch_size",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for [`MonteCarloConfig`].
#[derive(Clone, Debug, Default)]
pub struct MonteCarloConfigBuilder {
    n_paths: Option<usize>,
    seed: Option<u64>,
    antithetic: Option<bool>,
    batch_size: Option<usize>,
}

impl MonteCarloConfigBuilder {
    /// Sets the number of paths.
    pub fn n_paths(mut self, n_paths: usize) -> Self {
        self.n_paths = Some(n_paths);
        self
    }

    /// Sets the seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Turns antithetic sampling on or off.
    pub fn antithetic(mut self, antithetic: bool) -> Self {
        self.antithetic = Some(antithetic);
        self
    }

    /// Sets the samples per parallel batch.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// - `InvalidPathCount` outside `[2, MAX_PATHS]`
    /// - `InvalidParameter` for a zero batch size
    pub fn build(self) -> Result<MonteCarloConfig, ConfigError> {
        let defaults = MonteCarloConfig::default();
        let antithetic = self.antithetic.unwrap_or(defaults.antithetic);
        let mut n_paths = self.n_paths.unwrap_or(defaults.n_paths);
        if antithetic && n_paths % 2 == 1 {
            n_paths += 1;
        }
        let config = MonteCarloConfig {
            n_paths,
            seed: self.seed.unwrap_or(defaults.seed),
            antithetic,
            batch_size: self.batch_size.unwrap_or(defaults.batch_size),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = MonteCarloConfig::builder().build().unwrap();
        assert_eq!(c, MonteCarloConfig::default());
        assert_eq!(c.n_samples(), 10_000);
    }

    #[test]
    fn test_antithetic_rounds_up() {
        let c = MonteCarloConfig::builder().n_paths(1001).build().unwrap();
        assert_eq!(c.n_paths(), 1002);
        assert_eq!(c.n_samples(), 501);
        let plain = MonteCarloConfig::builder().n_paths(1001).antithetic(false).build().unwrap();
        assert_eq!(plain.n_samples(), 1001);
    }

    #[test]
    fn test_limits() {
        assert_eq!(
            MonteCarloConfig::builder().n_paths(0).antithetic(false).build(),
            Err(ConfigError::InvalidPathCount(0))
        );
        assert!(MonteCarloConfig::builder().n_paths(MAX_PATHS + 2).build().is_err());
        assert!(MonteCarloConfig::builder().batch_size(0).build().is_err());
    }
}
