//! Discount curves.
//!
//! - [`YieldCurve`]: the curve contract (df, zero and forward rates)
//! - [`ZeroCurve`]: knot-based curve with four interpolation methods
//! - [`CurveAdjustment`]: parallel shift and pivot rotation
//! - [`bootstrap_curve`]: deposit and par-swap bootstrapping
//! - [`FxForwardCurve`] / [`FxImpliedCurve`]: swap-point curves and the implied foreign curve
//! - [`CurveEnum`]: static dispatch over the above

mod adjustment;
mod bootstrap;
mod curve_enum;
mod fx_forward;
mod traits;
mod zero;

pub use adjustment::{CurveAdjustment, CurveRotation};
pub use bootstrap::{bootstrap_curve, BootstrapConfig, DepositQuote, SwapQuote};
pub use curve_enum::CurveEnum;
pub use fx_forward::{FxForwardCurve, FxForwardInterpolation, FxImpliedCurve};
pub use traits::{Compounding, YieldCurve};
pub use zero::{CurveInterpolation, ZeroCurve};
