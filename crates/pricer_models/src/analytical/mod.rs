//! Closed-form pricing formulas.
//!
//! This module provides:
//! - Black-Scholes value, greeks, digital and implied volatility
//! - Black-76 on a forward
//! - Garman-Kohlhagen FX vanilla, forward and digital
//! - Knockout options with a discrete-monitoring correction
//! - Asian approximations (geometric, Turnbull-Wakeman, Curran)
//! - Floating-strike lookback
//! - FX quanto digital and range accrual
//!
//! All formulas work in `f64`. Inputs are validated and failures are
//! reported as [`AnalyticalError`], which converts into
//! [`PricingError`](pricer_core::types::PricingError).

pub mod asian;
pub mod barrier;
pub mod black76;
pub mod black_scholes;
pub mod error;
pub mod garman_kohlhagen;
pub mod lookback;
pub mod quanto;

pub use asian::{asian_price, AsianInputs, AsianMethod};
pub use barrier::{bgk_adjusted_barrier, knockout_price, knockout_vanilla_bound, BarrierMonitoring, KnockoutInputs};
pub use black76::{black76_price, black76_vega};
pub use black_scholes::{bs_value, implied_volatility, BlackScholes, Greeks, PremiumQuote};
pub use error::AnalyticalError;
pub use garman_kohlhagen::{fx_digital_value, fx_forward_value, fx_vanilla_value, GarmanKohlhagen};
pub use lookback::lookback_floating_price;
pub use quanto::{fx_quanto_digital, fx_quanto_range_accrual, quanto_adjusted_forward, QuantoDigitalInputs, RangeObservation};
