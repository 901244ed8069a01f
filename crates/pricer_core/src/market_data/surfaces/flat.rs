//! Flat volatility surface implementation.

use super::traits::check_query;
use super::VolatilitySurface;
use crate::market_data::error::MarketDataError;

/// Constant volatility across expiries and strikes.
///
/// ```
/// use pricer_core::market_data::{FlatVolSurface, VolatilitySurface};
///
/// let surface = FlatVolSurface::new(0.2).unwrap();
/// assert_eq!(surface.volatility(1.0, 100.0).unwrap(), 0.2);
/// assert!(FlatVolSurface::new(-0.1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlatVolSurface {
    sigma: f64,
}

impl FlatVolSurface {
    /// Create a surface; `sigma` must be finite and non-negative.
    pub fn new(sigma: f64) -> Result<Self, MarketDataError> {
        if !(sigma >= 0.0) || !sigma.is_finite() {
            return Err(MarketDataError::InvalidVolatility { vol: sigma });
        }
        Ok(Self { sigma })
    }

    /// The constant volatility.
    #[inline]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl VolatilitySurface for FlatVolSurface {
    fn volatility(&self, expiry: f64, strike: f64) -> Result<f64, MarketDataError> {
        check_query(expiry, strike)?;
        Ok(self.sigma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_queries() {
        let surface = FlatVolSurface::new(0.25).unwrap();
        assert!(surface.volatility(0.0, 1.0).is_err());
        assert!(surface.volatility(1.0, 0.0).is_err());
    }

    #[test]
    fn test_zero_vol_allowed() {
        assert_eq!(FlatVolSurface::new(0.0).unwrap().sigma(), 0.0);
        assert!(FlatVolSurface::new(f64::NAN).is_err());
    }
}
