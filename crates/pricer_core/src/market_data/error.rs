//! Market data error types.

use crate::types::{DateError, InterpolationError, PricingError, SolverError};
use thiserror::Error;

/// Errors raised while building or querying curves and surfaces.
///
/// Every variant maps to [`PricingError::InvalidMarketData`].
///
/// # Examples
/// ```
/// use pricer_core::market_data::MarketDataError;
///
/// let err = MarketDataError::InvalidVolatility { vol: -0.1 };
/// assert_eq!(format!("{}", err), "Invalid volatility: -0.1");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// Maturity (year fraction) is not admissible.
    #[error("Invalid maturity: t = {t}")]
    InvalidMaturity {
        /// The offending time in years
        t: f64,
    },

    /// Strike is not positive.
    #[error("Invalid strike: K = {strike}")]
    InvalidStrike {
        /// The offending strike
        strike: f64,
    },

    /// Expiry is not positive.
    #[error("Invalid expiry: T = {expiry}")]
    InvalidExpiry {
        /// The offending expiry
        expiry: f64,
    },

    /// Volatility is negative or not finite.
    #[error("Invalid volatility: {vol}")]
    InvalidVolatility {
        /// The offending volatility
        vol: f64,
    },

    /// Spot (or FX rate) is not positive.
    #[error("Invalid spot: {spot}")]
    InvalidSpot {
        /// The offending spot
        spot: f64,
    },

    /// Query outside the domain of a curve that does not extrapolate.
    #[error("Out of bounds: {x} not in [{min}, {max}]")]
    OutOfBounds {
        /// Query point
        x: f64,
        /// Domain lower bound
        min: f64,
        /// Domain upper bound
        max: f64,
    },

    /// Wrapped interpolation failure.
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// Wrapped solver failure (bootstrap, delta inversion).
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    /// Too few quotes or knots.
    #[error("Insufficient data: got {got}, need {need}")]
    InsufficientData {
        /// Number supplied
        got: usize,
        /// Number required
        need: usize,
    },

    /// Inconsistent or malformed input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<DateError> for MarketDataError {
    fn from(err: DateError) -> Self {
        MarketDataError::InvalidInput(err.to_string())
    }
}

impl From<MarketDataError> for PricingError {
    fn from(err: MarketDataError) -> Self {
        PricingError::InvalidMarketData(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            MarketDataError::InvalidMaturity { t: -1.5 }.to_string(),
            "Invalid maturity: t = -1.5"
        );
        assert_eq!(
            MarketDataError::OutOfBounds {
                x: 5.0,
                min: 0.0,
                max: 3.0
            }
            .to_string(),
            "Out of bounds: 5 not in [0, 3]"
        );
    }

    #[test]
    fn test_from_interpolation_error() {
        let err: MarketDataError = InterpolationError::InsufficientData { got: 1, need: 2 }.into();
        assert!(matches!(err, MarketDataError::Interpolation(_)));
    }

    #[test]
    fn test_into_pricing_error() {
        let err: PricingError = MarketDataError::InvalidStrike { strike: -1.0 }.into();
        match err {
            PricingError::InvalidMarketData(msg) => assert!(msg.contains("-1")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
