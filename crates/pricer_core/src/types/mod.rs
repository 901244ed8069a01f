//! Core time, calendar, currency and error types.
//!
//! This module provides:
//! - `time`: [`Date`], [`DayCountConvention`], [`YearFraction`], [`BusinessDayConvention`]
//! - `calendar`: [`Calendar`] holiday predicates and date rolling
//! - `currency`: [`Currency`] and [`CurrencyPair`]
//! - `error`: [`PricingError`] and the layer-local errors that convert into it

pub mod calendar;
pub mod currency;
pub mod error;
pub mod time;

pub use calendar::{next_business_day, Calendar};
pub use currency::{Currency, CurrencyPair};
pub use error::{CurrencyError, DateError, InterpolationError, PricingError, SolverError};
pub use time::{
    time_to_maturity_dates, BusinessDayConvention, Date, DayCountConvention, YearFraction,
};
