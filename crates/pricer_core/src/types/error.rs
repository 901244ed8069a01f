//! Error types for structured error handling.
//!
//! This module provides:
//! - `PricingError`: the caller-facing failure taxonomy of every pricer
//! - `DateError`: Errors from date construction, parsing and accrual periods
//! - `CurrencyError`: Errors from currency and currency-pair parsing
//! - `InterpolationError`: Errors from interpolation operations
//! - `SolverError`: Errors from root-finding solvers
//!
//! Lower-level errors convert into [`PricingError`] so that `?` can be used
//! across layers without losing the category the caller dispatches on.

use thiserror::Error;

/// Categorised pricing errors.
///
/// Every measure returned by a pricer is either a finite scalar or one of
/// these failures. The variants are deliberately coarse: callers (portfolio
/// aggregation, reporting) branch on the category and log the message.
///
/// # Examples
/// ```
/// use pricer_core::types::PricingError;
///
/// let err = PricingError::InvalidMarketData("negative volatility -0.1".to_string());
/// assert_eq!(format!("{}", err), "Invalid market data: negative volatility -0.1");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Settlement after maturity, or expiry before the value date.
    #[error("Expired instrument: {0}")]
    ExpiredInstrument(String),

    /// Negative volatility, non-positive strike or FX rate, inconsistent or missing curve.
    #[error("Invalid market data: {0}")]
    InvalidMarketData(String),

    /// Malformed currency pair, unknown day count, conflicting bond options.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A required input (accrued average, schedule field) was not supplied.
    #[error("Insufficient input: {0}")]
    InsufficientInput(String),

    /// A Newton (or bracketing) solve did not reach tolerance.
    #[error("Solver failed: {0}")]
    SolverFailed(String),

    /// The pricer has no implementation for the requested combination.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
}

impl PricingError {
    /// Short category name, stable across message changes.
    ///
    /// # Examples
    /// ```
    /// use pricer_core::types::PricingError;
    ///
    /// let err = PricingError::SolverFailed("ytm".into());
    /// assert_eq!(err.kind(), "SolverFailed");
    /// ```
    pub fn kind(&self) -> &'static str {
        match self {
            PricingError::ExpiredInstrument(_) => "ExpiredInstrument",
            PricingError::InvalidMarketData(_) => "InvalidMarketData",
            PricingError::InvalidConfiguration(_) => "InvalidConfiguration",
            PricingError::InsufficientInput(_) => "InsufficientInput",
            PricingError::SolverFailed(_) => "SolverFailed",
            PricingError::UnsupportedOperation(_) => "UnsupportedOperation",
        }
    }
}

/// Date-related errors.
///
/// # Examples
/// ```
/// use pricer_core::types::DateError;
///
/// let err = DateError::InvalidDate { year: 2024, month: 2, day: 30 };
/// assert_eq!(format!("{}", err), "Invalid date: 2024-2-30");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Invalid date components (e.g., February 30th).
    #[error("Invalid date: {year}-{month}-{day}")]
    InvalidDate {
        /// Year component
        year: i32,
        /// Month component (1-12)
        month: u32,
        /// Day component (1-31)
        day: u32,
    },

    /// Failed to parse date string.
    #[error("Date parse error: {0}")]
    ParseError(String),

    /// End date precedes start date where an accrual period is required.
    #[error("Negative period: {end} is before {start}")]
    NegativePeriod {
        /// Period start (ISO format)
        start: String,
        /// Period end (ISO format)
        end: String,
    },

    /// Date arithmetic left the representable range.
    #[error("Date arithmetic overflow")]
    Overflow,
}

/// Currency-related errors.
///
/// # Examples
/// ```
/// use pricer_core::types::CurrencyError;
///
/// let err = CurrencyError::UnknownCurrency("XYZ".to_string());
/// assert_eq!(format!("{}", err), "Unknown currency code: XYZ");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    /// Unknown currency code.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency pair is not of the form `XXX/YYY` (or `XXXYYY`).
    #[error("Malformed currency pair: {0}")]
    MalformedPair(String),

    /// Base and quote currencies are identical.
    #[error("Currency pair with identical legs: {0}")]
    SameCurrency(String),

    /// Spot rate is not positive.
    #[error("Spot rate must be positive")]
    InvalidSpotRate,
}

/// Interpolation errors.
///
/// # Examples
/// ```
/// use pricer_core::types::InterpolationError;
///
/// let err = InterpolationError::OutOfBounds { x: 5.0, min: 0.0, max: 3.0 };
/// assert!(format!("{}", err).contains("outside valid domain"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationError {
    /// Query point outside valid interpolation domain.
    #[error("Query point {x} outside valid domain [{min}, {max}]")]
    OutOfBounds {
        /// The query point that was out of bounds
        x: f64,
        /// Minimum valid value
        min: f64,
        /// Maximum valid value
        max: f64,
    },

    /// Insufficient data points for interpolation.
    #[error("Insufficient data points: got {got}, need at least {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },

    /// Abscissae are not strictly increasing.
    #[error("Data is not monotonic at index {index}")]
    NonMonotonicData {
        /// Index where monotonicity violation was detected
        index: usize,
    },

    /// Invalid input data or parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Root-finding solver errors.
///
/// # Examples
/// ```
/// use pricer_core::types::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded { iterations: 100 };
/// assert!(format!("{}", err).contains("100 iterations"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverError {
    /// Solver failed to converge within maximum iterations.
    #[error("Failed to converge after {iterations} iterations")]
    MaxIterationsExceeded {
        /// Number of iterations attempted
        iterations: usize,
    },

    /// Derivative near zero (division by zero risk in Newton-Raphson).
    #[error("Derivative near zero at x = {x}")]
    DerivativeNearZero {
        /// The x value where derivative was near zero
        x: f64,
    },

    /// No valid bracket (function values at endpoints have same sign).
    #[error("No bracket: f({a}) and f({b}) have same sign")]
    NoBracket {
        /// Left bracket endpoint
        a: f64,
        /// Right bracket endpoint
        b: f64,
    },

    /// Numerical instability during computation.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

impl From<DateError> for PricingError {
    fn from(err: DateError) -> Self {
        match err {
            DateError::NegativePeriod { .. } => PricingError::ExpiredInstrument(err.to_string()),
            _ => PricingError::InvalidConfiguration(err.to_string()),
        }
    }
}

impl From<CurrencyError> for PricingError {
    fn from(err: CurrencyError) -> Self {
        match err {
            CurrencyError::InvalidSpotRate => PricingError::InvalidMarketData(err.to_string()),
            _ => PricingError::InvalidConfiguration(err.to_string()),
        }
    }
}

impl From<InterpolationError> for PricingError {
    fn from(err: InterpolationError) -> Self {
        PricingError::InvalidMarketData(err.to_string())
    }
}

impl From<SolverError> for PricingError {
    fn from(err: SolverError) -> Self {
        PricingError::SolverFailed(err.to_string())
    }
}
