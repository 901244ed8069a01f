//! # Pricing Engine (Layer 3)
//!
//! ## Layer 3 Role
//!
//! pricer_pricing binds the instruments and closed forms of Layer 2 to
//! market data:
//! - a [`MarketDataProvider`](market::MarketDataProvider) trait with an
//!   offline JSON-backed implementation
//! - a scoped [`PricingContext`](context::PricingContext) of overrides and
//!   persistent curve scenarios, loadable from TOML
//! - seeded, batch-parallel Monte Carlo kernels for the path-dependent
//!   payoffs and a binomial tree for American exercise
//! - the [`Pricer`](pricers::Pricer), which maps every
//!   [`RiskMeasure`](measure::RiskMeasure) onto an instrument, and the
//!   bump-and-revalue greek engine behind it
//!
//! ## Resolution order
//!
//! Each market input is taken from the first of: an override on the
//! instrument view, a value pinned on the instrument, the innermost context
//! layer, the provider as of the context's pricing date.
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_core::types::Date;
//! use pricer_models::instruments::{CurveRef, EuropeanOption, Instrument, MarketAttributes, OptionType};
//! use pricer_pricing::context::{ContextLayer, PricingContext};
//! use pricer_pricing::market::InMemoryMarketData;
//! use pricer_pricing::measure::RiskMeasure;
//! use pricer_pricing::pricers::Pricer;
//!
//! let call = Instrument::European(
//!     EuropeanOption::new("600000.SH", 100.0, Date::from_ymd(2022, 8, 13).unwrap(), OptionType::Call)
//!         .with_curve(CurveRef::Flat(0.05))
//!         .with_market(MarketAttributes::default().with_volatility(0.2)),
//! );
//! let market = InMemoryMarketData::new();
//! let mut ctx = PricingContext::at(Date::from_ymd(2021, 8, 13).unwrap());
//! ctx.enter(ContextLayer::new().spot("600000.SH", 100.0));
//!
//! let pricer = Pricer::new(&market, &ctx);
//! let values = pricer.calc_many(&call, &[RiskMeasure::Price, RiskMeasure::Delta]).unwrap();
//! assert!((values[0] - 10.4506).abs() < 1e-3);
//! assert!(values[1] > 0.5 && values[1] < 1.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
// Allow unknown lints for clippy compatibility across versions
#![allow(unknown_lints)]

mod error;

// Market data and scenario overrides
pub mod context;
pub mod market;

// Random number generation and Monte Carlo infrastructure
pub mod mc;
pub mod rng;

// Numerical kernels
pub mod lattice;
pub mod path_dependent;

// Dispatch and sensitivities
pub mod greeks;
pub mod measure;
pub mod pricers;

// Re-export commonly used items for convenience
pub use context::{ContextLayer, CurveScenario, PricingContext};
pub use error::ConfigError;
pub use greeks::{BumpConfig, GreeksResult};
pub use market::{AsOf, InMemoryMarketData, MarketDataProvider};
pub use mc::{McResult, MonteCarloConfig};
pub use measure::RiskMeasure;
pub use pricers::{InstrumentView, Override, Pricer};
