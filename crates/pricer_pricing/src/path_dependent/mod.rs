//! Path-dependent option kernels.
//!
//! Every kernel is a pure function of numeric inputs (times in years,
//! rates, discount factors) and a [`MonteCarloConfig`](crate::mc::MonteCarloConfig);
//! mapping instruments and market data to those inputs is the job of
//! [`crate::pricers`].
//!
//! # Key Components
//!
//! - [`PathObserver`]: streaming average and extremum statistics
//! - [`knockout_mc`]: simulation cross-check of the knockout closed form
//! - [`asian_mc`]: arithmetic Asian, including in-window valuation
//! - [`lookback_mc`]: floating-strike lookback
//! - [`snowball_mc`] and [`basket_snowball_mc`]: autocallables

mod asian;
mod knockout;
mod lookback;
mod observer;
mod snowball;

pub use asian::asian_mc;
pub use knockout::knockout_mc;
pub use lookback::{lookback_mc, LookbackInputs};
pub use observer::PathObserver;
pub use snowball::{
    basket_snowball_mc, snowball_mc, BasketSnowballInputs, KnockOutObservation, SnowballInputs, SnowballLegs,
};
