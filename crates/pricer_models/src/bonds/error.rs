//! Bond pricing errors.

use pricer_core::market_data::MarketDataError;
use pricer_core::types::{DateError, PricingError, SolverError};
use thiserror::Error;

use crate::analytical::AnalyticalError;
use crate::schedules::ScheduleError;

/// Errors from bond cash-flow generation and analytics.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BondError {
    /// Economic terms are inconsistent.
    #[error("Invalid bond terms: {0}")]
    InvalidTerms(String),

    /// Settlement on or after maturity (or after the exercise date).
    #[error("Bond expired: settlement {settlement} not before {limit}")]
    Expired {
        /// Settlement date (ISO)
        settlement: String,
        /// Maturity or exercise date (ISO)
        limit: String,
    },

    /// A market price or yield is not usable.
    #[error("Invalid price input: {0}")]
    InvalidPrice(String),

    /// Yield, margin or coupon solve failed.
    #[error("Solver failed: {0}")]
    Solver(#[from] SolverError),

    /// Schedule generation failed.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Curve lookup failed.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// Option formula failed.
    #[error(transparent)]
    Analytical(#[from] AnalyticalError),

    /// Date arithmetic failed.
    #[error(transparent)]
    Date(#[from] DateError),
}

impl From<BondError> for PricingError {
    fn from(err: BondError) -> Self {
        match err {
            BondError::InvalidTerms(_) => PricingError::InvalidConfiguration(err.to_string()),
            BondError::Expired { .. } => PricingError::ExpiredInstrument(err.to_string()),
            BondError::InvalidPrice(_) => PricingError::InvalidMarketData(err.to_string()),
            BondError::Solver(_) => PricingError::SolverFailed(err.to_string()),
            BondError::Schedule(e) => e.into(),
            BondError::MarketData(e) => e.into(),
            BondError::Analytical(e) => e.into(),
            BondError::Date(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_kinds() {
        let e: PricingError = BondError::Expired {
            settlement: "2051-01-01".into(),
            limit: "2050-03-16".into(),
        }
        .into();
        assert_eq!(e.kind(), "ExpiredInstrument");

        let e: PricingError = BondError::Solver(SolverError::MaxIterationsExceeded { iterations: 100 }).into();
        assert_eq!(e.kind(), "SolverFailed");

        let e: PricingError = BondError::InvalidTerms("coupon".into()).into();
        assert_eq!(e.kind(), "InvalidConfiguration");

        let e: PricingError = BondError::Schedule(ScheduleError::MissingField { field: "end" }).into();
        assert_eq!(e.kind(), "InsufficientInput");
    }
}
