//! Bump sizes for finite-difference greeks.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Bump sizes used by the greek engine.
///
/// # Default Values
///
/// | Parameter | Default | Bumped input |
/// |-----------|---------|--------------|
/// | `spot_relative` | 0.01 | spot, as a fraction of itself |
/// | `volatility` | 0.01 | volatility, absolute |
/// | `rate_bp` | 1.0 | discount curve, basis points |
/// | `dividend` | 0.0001 | dividend yield or foreign rate, absolute |
/// | `theta_days` | 1 | valuation date, business days |
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::greeks::BumpConfig;
///
/// let config = BumpConfig::default().with_rate_bp(0.5).with_theta_days(2);
/// assert!(config.validate().is_ok());
/// assert!((config.rate() - 5e-5).abs() < 1e-15);
/// assert!(BumpConfig::default().with_spot_relative(1.5).validate().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BumpConfig {
    /// Relative spot bump.
    pub spot_relative: f64,
    /// Absolute volatility bump.
    pub volatility: f64,
    /// Parallel curve bump in basis points.
    pub rate_bp: f64,
    /// Absolute dividend-yield bump.
    pub dividend: f64,
    /// Business days the valuation date moves for theta.
    pub theta_days: u32,
}

impl Default for BumpConfig {
    fn default() -> Self {
        Self {
            spot_relative: 0.01,
            volatility: 0.01,
            rate_bp: 1.0,
            dividend: 1e-4,
            theta_days: 1,
        }
    }
}

impl BumpConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the relative spot bump.
    pub fn with_spot_relative(mut self, bump: f64) -> Self {
        self.spot_relative = bump;
        self
    }

    /// Sets the volatility bump.
    pub fn with_volatility(mut self, bump: f64) -> Self {
        self.volatility = bump;
        self
    }

    /// Sets the curve bump in basis points.
    pub fn with_rate_bp(mut self, bp: f64) -> Self {
        self.rate_bp = bp;
        self
    }

    /// Sets the dividend bump.
    pub fn with_dividend(mut self, bump: f64) -> Self {
        self.dividend = bump;
        self
    }

    /// Sets the theta horizon.
    pub fn with_theta_days(mut self, days: u32) -> Self {
        self.theta_days = days;
        self
    }

    /// Curve bump as a decimal rate.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate_bp * 1e-4
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// `InvalidParameter` for a non-positive or non-finite bump, a spot bump
    /// of 100% or more, or a zero theta horizon.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidParameter {
                    name,
                    value: value.to_string(),
                })
            }
        };
        positive("spot_relative", self.spot_relative)?;
        positive("volatility", self.volatility)?;
        positive("rate_bp", self.rate_bp)?;
        positive("dividend", self.dividend)?;
        if self.spot_relative >= 1.0 {
            return Err(ConfigError::InvalidParameter {
                name: "spot_relative",
                value: self.spot_relative.to_string(),
            });
        }
        if self.theta_days == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "theta_days",
                value: "0".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(BumpConfig::new().validate().is_ok());
    }

    #[test]
    fn test_rejects_degenerate_bumps() {
        assert!(BumpConfig::default().with_volatility(0.0).validate().is_err());
        assert!(BumpConfig::default().with_rate_bp(f64::NAN).validate().is_err());
        assert!(BumpConfig::default().with_dividend(-1e-4).validate().is_err());
        assert_eq!(
            BumpConfig::default().with_theta_days(0).validate(),
            Err(ConfigError::InvalidParameter {
                name: "theta_days",
                value: "0".into()
            })
        );
    }

    #[test]
    fn test_partial_toml() {
        let config: BumpConfig = toml::from_str("rate_bp = 10.0").unwrap();
        assert_eq!(config.rate_bp, 10.0);
        assert_eq!(config.spot_relative, 0.01);
    }
}
