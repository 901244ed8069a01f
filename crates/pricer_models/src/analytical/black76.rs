//! Black-76 pricing of options on a forward.
//!
//! V = df · φ · (F·N(φd₁) − K·N(φd₂)), d₁ = (ln(F/K) + σ²T/2) / (σ√T).
//!
//! Used for bond options on the forward clean price and as the pricing
//! step of the moment-matched Asian approximations.

use pricer_core::math::distributions::{norm_cdf, norm_pdf};

use super::error::{check_inputs, AnalyticalError};
use crate::instruments::OptionType;

/// Undiscounted Black call/put on a forward, without input checks.
#[inline]
pub(crate) fn black_forward(forward: f64, strike: f64, std_dev: f64, option_type: OptionType) -> f64 {
    let phi = option_type.sign();
    if std_dev < 1e-12 {
        return (phi * (forward - strike)).max(0.0);
    }
    let d1 = ((forward / strike).ln() + 0.5 * std_dev * std_dev) / std_dev;
    let d2 = d1 - std_dev;
    phi * (forward * norm_cdf(phi * d1) - strike * norm_cdf(phi * d2))
}

/// Black-76 option value.
///
/// # Errors
/// - `InvalidSpot` if the forward is not positive
/// - `InvalidStrike`, `InvalidVolatility`, `Expired` as for Black-Scholes
///
/// # Examples
/// ```
/// use pricer_models::analytical::black76_price;
/// use pricer_models::instruments::OptionType;
///
/// let c = black76_price(100.0, 100.0, 1.0, 0.95, 0.2, OptionType::Call).unwrap();
/// let p = black76_price(100.0, 100.0, 1.0, 0.95, 0.2, OptionType::Put).unwrap();
/// assert!((c - p).abs() < 1e-12);
/// ```
pub fn black76_price(
    forward: f64,
    strike: f64,
    expiry: f64,
    discount_factor: f64,
    volatility: f64,
    option_type: OptionType,
) -> Result<f64, AnalyticalError> {
    check_inputs(forward, strike, volatility, expiry)?;
    Ok(discount_factor * black_forward(forward, strike, volatility * expiry.sqrt(), option_type))
}

/// Black-76 vega ∂V/∂σ.
pub fn black76_vega(
    forward: f64,
    strike: f64,
    expiry: f64,
    discount_factor: f64,
    volatility: f64,
) -> Result<f64, AnalyticalError> {
    check_inputs(forward, strike, volatility, expiry)?;
    let sd = volatility * expiry.sqrt();
    if sd < 1e-12 {
        return Ok(0.0);
    }
    let d1 = ((forward / strike).ln() + 0.5 * sd * sd) / sd;
    Ok(discount_factor * forward * expiry.sqrt() * norm_pdf(d1))
}
