//! Instrument error types.

use pricer_core::types::PricingError;
use thiserror::Error;

use crate::bonds::BondError;

/// Instrument construction and validation errors.
///
/// # Examples
/// ```
/// use pricer_models::instruments::InstrumentError;
///
/// let err = InstrumentError::InvalidStrike { strike: -100.0 };
/// assert!(format!("{}", err).contains("-100"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstrumentError {
    /// Strike is not positive.
    #[error("Invalid strike: K = {strike}")]
    InvalidStrike {
        /// Offending strike
        strike: f64,
    },

    /// Notional is not positive.
    #[error("Invalid notional: N = {notional}")]
    InvalidNotional {
        /// Offending notional
        notional: f64,
    },

    /// Start, observation or expiry dates are out of order.
    #[error("Invalid dates: {message}")]
    InvalidDates {
        /// Description
        message: String,
    },

    /// Any other inconsistent term.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Description
        message: String,
    },

    /// Bond terms failed to build.
    #[error(transparent)]
    Bond(#[from] BondError),
}

impl InstrumentError {
    /// Shorthand for `InvalidParameter`.
    pub fn parameter(message: impl Into<String>) -> Self {
        InstrumentError::InvalidParameter {
            message: message.into(),
        }
    }

    /// Shorthand for `InvalidDates`.
    pub fn dates(message: impl Into<String>) -> Self {
        InstrumentError::InvalidDates {
            message: message.into(),
        }
    }
}

impl From<InstrumentError> for PricingError {
    fn from(err: InstrumentError) -> Self {
        match err {
            InstrumentError::InvalidStrike { .. } => PricingError::InvalidMarketData(err.to_string()),
            InstrumentError::Bond(e) => e.into(),
            other => PricingError::InvalidConfiguration(other.to_string()),
        }
    }
}
