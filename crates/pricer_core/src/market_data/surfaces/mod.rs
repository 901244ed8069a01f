//! Volatility surfaces.
//!
//! - [`VolatilitySurface`]: lookup by expiry and strike
//! - [`FlatVolSurface`]: constant volatility
//! - [`FxVolSurface`]: delta-quoted FX smile with total-variance tenor interpolation

mod flat;
mod fx;
mod traits;

pub use flat::FlatVolSurface;
pub use fx::{delta_to_strike, DeltaConvention, FxVolQuote, FxVolSurface};
pub use traits::VolatilitySurface;
