//! Error types for analytical pricing operations.

use pricer_core::types::{PricingError, SolverError};
use thiserror::Error;

/// Analytical pricing errors.
///
/// # Examples
/// ```
/// use pricer_models::analytical::AnalyticalError;
///
/// let err = AnalyticalError::InvalidVolatility { volatility: -0.2 };
/// assert!(format!("{}", err).contains("volatility"));
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalyticalError {
    /// Negative (or non-finite) volatility.
    #[error("Invalid volatility: σ = {volatility}")]
    InvalidVolatility {
        /// The invalid volatility value
        volatility: f64,
    },

    /// Non-positive spot or forward.
    #[error("Invalid spot price: S = {spot}")]
    InvalidSpot {
        /// The invalid spot price value
        spot: f64,
    },

    /// Non-positive strike.
    #[error("Invalid strike: K = {strike}")]
    InvalidStrike {
        /// The invalid strike
        strike: f64,
    },

    /// Non-positive time to expiry.
    #[error("Option expired: time to expiry {expiry}")]
    Expired {
        /// Time to expiry in years
        expiry: f64,
    },

    /// Valuation inside the averaging window without a realised average.
    #[error("Accrued average required inside the averaging window")]
    MissingAccruedAverage,

    /// Input combination the formula does not cover.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Inputs outside the formula's domain.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Root finding failed.
    #[error("Solver failed: {0}")]
    Solver(#[from] SolverError),
}

impl From<AnalyticalError> for PricingError {
    fn from(err: AnalyticalError) -> Self {
        match err {
            AnalyticalError::InvalidVolatility { .. }
            | AnalyticalError::InvalidSpot { .. }
            | AnalyticalError::InvalidStrike { .. }
            | AnalyticalError::InvalidInput(_) => PricingError::InvalidMarketData(err.to_string()),
            AnalyticalError::Expired { .. } => PricingError::ExpiredInstrument(err.to_string()),
            AnalyticalError::MissingAccruedAverage => {
                PricingError::InsufficientInput(err.to_string())
            }
            AnalyticalError::Unsupported(_) => PricingError::UnsupportedOperation(err.to_string()),
            AnalyticalError::Solver(_) => PricingError::SolverFailed(err.to_string()),
        }
    }
}

/// Shared input checks for the Black-Scholes family.
pub(crate) fn check_inputs(
    spot: f64,
    strike: f64,
    volatility: f64,
    expiry: f64,
) -> Result<(), AnalyticalError> {
    if !(spot > 0.0) || !spot.is_finite() {
        return Err(AnalyticalError::InvalidSpot { spot });
    }
    if !(strike > 0.0) || !strike.is_finite() {
        return Err(AnalyticalError::InvalidStrike { strike });
    }
    if !(volatility >= 0.0) || !volatility.is_finite() {
        return Err(AnalyticalError::InvalidVolatility { volatility });
    }
    if !(expiry > 0.0) {
        return Err(AnalyticalError::Expired { expiry });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_volatility_display() {
        let err = AnalyticalError::InvalidVolatility { volatility: -0.2 };
        assert_eq!(format!("{}", err), "Invalid volatility: σ = -0.2");
    }

    #[test]
    fn test_conversions() {
        let cases: [(AnalyticalError, &str); 5] = [
            (AnalyticalError::InvalidStrike { strike: 0.0 }, "InvalidMarketData"),
            (AnalyticalError::Expired { expiry: -0.1 }, "ExpiredInstrument"),
            (AnalyticalError::MissingAccruedAverage, "InsufficientInput"),
            (AnalyticalError::Unsupported("x".into()), "UnsupportedOperation"),
            (
                AnalyticalError::Solver(SolverError::NoBracket { a: 0.0, b: 1.0 }),
                "SolverFailed",
            ),
        ];
        for (err, kind) in cases {
            let p: PricingError = err.into();
            assert_eq!(p.kind(), kind);
        }
    }

    #[test]
    fn test_check_inputs() {
        assert!(check_inputs(1.0, 1.0, 0.2, 1.0).is_ok());
        assert!(check_inputs(1.0, 1.0, 0.0, 1.0).is_ok());
        assert!(matches!(
            check_inputs(1.0, 1.0, -0.2, 1.0),
            Err(AnalyticalError::InvalidVolatility { .. })
        ));
        assert!(matches!(
            check_inputs(1.0, 1.0, f64::NAN, 1.0),
            Err(AnalyticalError::InvalidVolatility { .. })
        ));
        assert!(matches!(
            check_inputs(1.0, 1.0, 0.2, 0.0),
            Err(AnalyticalError::Expired { .. })
        ));
        assert!(matches!(
            check_inputs(-1.0, 1.0, 0.2, 1.0),
            Err(AnalyticalError::InvalidSpot { .. })
        ));
    }
}
