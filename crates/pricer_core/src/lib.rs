//! # pricer_core: Foundation Layer of the Pricing Library
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core is the bottom layer of the 4-layer architecture, providing:
//! - Dates, calendars, day counts and business-day rules (`types::time`, `types::calendar`)
//! - Currencies and currency pairs (`types::currency`)
//! - The error taxonomy shared by every pricer (`types::error`)
//! - Normal distribution, interpolators and root finders (`math`)
//! - Discount curves, FX forward curves and volatility surfaces (`market_data`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other pricer_* crates:
//! - num-traits: generic interpolators and solvers
//! - chrono: date arithmetic
//! - thiserror: error enums
//! - tracing: solver diagnostics
//! - serde: serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::market_data::{Compounding, CurveInterpolation, YieldCurve, ZeroCurve};
//! use pricer_core::types::{Calendar, Date, DayCountConvention, BusinessDayConvention};
//!
//! let start = Date::from_ymd(2024, 1, 1).unwrap();
//! let end = Date::from_ymd(2024, 7, 1).unwrap();
//! let yf = DayCountConvention::Actual365Fixed.year_frac(start, end);
//! assert_eq!(yf.days, 182);
//!
//! let settle = Calendar::China.adjust(start, BusinessDayConvention::Following);
//! assert!(settle > start);
//!
//! let curve = ZeroCurve::new(
//!     start,
//!     &[1.0, 5.0],
//!     &[0.02, 0.03],
//!     Compounding::Periodic(1),
//!     CurveInterpolation::FlatForward,
//! )
//! .unwrap();
//! assert!(curve.df(end).unwrap() < 1.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): serialisation for dates, conventions, calendars, curve and surface inputs

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod market_data;
pub mod math;
pub mod types;
