//! Market data structures: discount curves and volatility surfaces.
//!
//! Curves and surfaces are immutable values built at pricing time.
//! Scenario adjustments return new objects rather than mutating in place,
//! so a base curve can be shared freely across threads.

pub mod curves;
pub mod error;
pub mod surfaces;

pub use curves::{
    bootstrap_curve, BootstrapConfig, Compounding, CurveAdjustment, CurveEnum, CurveInterpolation,
    CurveRotation, DepositQuote, FxForwardCurve, FxForwardInterpolation, FxImpliedCurve,
    SwapQuote, YieldCurve, ZeroCurve,
};
pub use error::MarketDataError;
pub use surfaces::{
    delta_to_strike, DeltaConvention, FlatVolSurface, FxVolQuote, FxVolSurface,
    VolatilitySurface,
};
