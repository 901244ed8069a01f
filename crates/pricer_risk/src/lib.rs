//! # Pricer Risk (L4: Application)
//!
//! Portfolio aggregation and parallel dispatch over the pricing engine.
//!
//! This crate provides:
//! - [`Position`] and [`Portfolio`]: signed holdings of shared instruments
//! - quantity-weighted aggregation of any [`RiskMeasure`](pricer_pricing::measure::RiskMeasure),
//!   with failing positions reported as sentinels rather than aborting
//! - [`parallel_calc`]: independent pricing tasks on the rayon pool,
//!   gathered against a deadline
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            pricer_risk (L4)             │
//! ├─────────────────────────────────────────┤
//! │  portfolio/  - Position, Portfolio,     │
//! │               PortfolioValuation        │
//! │  parallel/   - rayon dispatch, timeout  │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │           pricer_pricing (L3)           │
//! │  Pricer, PricingContext, greek engine   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use pricer_core::types::Date;
//! use pricer_models::bonds::BondTerms;
//! use pricer_models::instruments::{CurveRef, FixedBond, Instrument};
//! use pricer_models::schedules::Frequency;
//! use pricer_pricing::context::PricingContext;
//! use pricer_pricing::market::InMemoryMarketData;
//! use pricer_pricing::measure::RiskMeasure;
//! use pricer_risk::{Portfolio, Position};
//!
//! let terms = BondTerms::new(
//!     Date::from_ymd(2020, 3, 16).unwrap(),
//!     Date::from_ymd(2030, 3, 16).unwrap(),
//!     0.03,
//!     Frequency::Annual,
//! );
//! let bond = Instrument::FixedBond(FixedBond::new("BOND", terms, CurveRef::Flat(0.025)));
//!
//! let mut book = Portfolio::new("rates");
//! book.add(Position::new("long", bond.clone(), 10.0)).unwrap();
//! book.add(Position::new("short", bond, -4.0)).unwrap();
//!
//! let market = InMemoryMarketData::new();
//! let ctx = PricingContext::at(Date::from_ymd(2021, 12, 27).unwrap());
//! let dv01 = book.calc(&market, &ctx, RiskMeasure::Dv01);
//! let single = book.calc(&market, &ctx, RiskMeasure::Dv01).positions[0].value.unwrap();
//! assert!((dv01.total - 6.0 * single).abs() < 1e-9);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod parallel;
pub mod portfolio;

// Re-export commonly used types
pub use parallel::{parallel_calc, CalcTask, ParallelConfig, TaskResult};
pub use portfolio::{
    Portfolio, PortfolioError, PortfolioGreeks, PortfolioValuation, Position, PositionId, PositionValue,
};
