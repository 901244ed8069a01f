//! Coupon and observation schedule generation.
//!
//! This module provides:
//! - [`Schedule`]: adjusted dates plus the accrual periods between them
//! - [`Period`]: a single accrual period with start, end, and payment dates
//! - [`Frequency`]: payment frequency enumeration (Annual, SemiAnnual, etc.)
//! - [`ScheduleBuilder`]: builder for constructing schedules
//! - [`schedule`]: one-call date generation
//!
//! # Examples
//!
//! ```
//! use pricer_models::schedules::{Frequency, ScheduleBuilder};
//! use pricer_core::types::time::Date;
//!
//! let schedule = ScheduleBuilder::new()
//!     .start(Date::from_ymd(2024, 1, 15).unwrap())
//!     .end(Date::from_ymd(2026, 1, 15).unwrap())
//!     .frequency(Frequency::SemiAnnual)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schedule.periods().len(), 4);
//! ```

mod error;
mod frequency;
mod period;
mod schedule;

pub use error::ScheduleError;
pub use frequency::Frequency;
pub use period::Period;
pub use schedule::{schedule, DateGeneration, Schedule, ScheduleBuilder};
