//! Volatility surface trait definition.

use crate::market_data::error::MarketDataError;

/// Implied volatility lookup by expiry (years) and strike.
pub trait VolatilitySurface {
    /// Black volatility for `expiry > 0` and `strike > 0`.
    fn volatility(&self, expiry: f64, strike: f64) -> Result<f64, MarketDataError>;
}

impl<S: VolatilitySurface + ?Sized> VolatilitySurface for &S {
    fn volatility(&self, expiry: f64, strike: f64) -> Result<f64, MarketDataError> {
        (**self).volatility(expiry, strike)
    }
}

/// Shared argument validation for surface implementations.
pub(crate) fn check_query(expiry: f64, strike: f64) -> Result<(), MarketDataError> {
    if !(expiry > 0.0) || !expiry.is_finite() {
        return Err(MarketDataError::InvalidExpiry { expiry });
    }
    if !(strike > 0.0) || !strike.is_finite() {
        return Err(MarketDataError::InvalidStrike { strike });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_query() {
        assert!(check_query(1.0, 100.0).is_ok());
        assert_eq!(
            check_query(0.0, 100.0),
            Err(MarketDataError::InvalidExpiry { expiry: 0.0 })
        );
        assert_eq!(
            check_query(1.0, -5.0),
            Err(MarketDataError::InvalidStrike { strike: -5.0 })
        );
    }
}
