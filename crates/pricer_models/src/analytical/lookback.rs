//! Continuously monitored floating-strike lookback (Goldman-Sosin-Gatto).
//!
//! The call pays `S_T − min(S)` and the put `max(S) − S_T`, where the
//! extremum includes the running value observed so far.

use pricer_core::math::distributions::norm_cdf;

use super::error::{check_inputs, AnalyticalError};
use crate::instruments::OptionType;

/// Carry below which the `b → 0` limit is approached with a nudge.
const MIN_CARRY: f64 = 1e-7;

/// Floating-strike lookback value.
///
/// `running_extreme` is the minimum observed so far for a call and the
/// maximum for a put; it must sit on the correct side of spot.
///
/// # Errors
/// - `Expired`, `InvalidSpot`, `InvalidVolatility` as for Black-Scholes
/// - `InvalidInput` if the running extreme is on the wrong side of spot
///
/// # Examples
/// ```
/// use pricer_models::analytical::lookback_floating_price;
/// use pricer_models::instruments::OptionType;
///
/// let c = lookback_floating_price(120.0, 100.0, 0.5, 0.1, 0.06, 0.3, OptionType::Call).unwrap();
/// assert!((c - 25.3533).abs() < 1e-3);
/// ```
pub fn lookback_floating_price(
    spot: f64,
    running_extreme: f64,
    expiry: f64,
    rate: f64,
    dividend: f64,
    volatility: f64,
    option_type: OptionType,
) -> Result<f64, AnalyticalError> {
    check_inputs(spot, running_extreme, volatility, expiry)?;
    if volatility <= 0.0 {
        return Err(AnalyticalError::InvalidVolatility { volatility });
    }
    let s = spot;
    let m = running_extreme;
    let wrong_side = match option_type {
        OptionType::Call => m > s,
        OptionType::Put => m < s,
    };
    if wrong_side {
        return Err(AnalyticalError::InvalidInput(format!(
            "running extreme {m} on the wrong side of spot {s}"
        )));
    }

    let mut b = rate - dividend;
    if b.abs() < MIN_CARRY {
        b = MIN_CARRY;
    }
    let sigma = volatility;
    let sd = sigma * expiry.sqrt();
    let df_r = (-rate * expiry).exp();
    let df_q = ((b - rate) * expiry).exp();
    let ratio = sigma * sigma / (2.0 * b);

    let a1 = ((s / m).ln() + (b + 0.5 * sigma * sigma) * expiry) / sd;
    let a2 = a1 - sd;
    let drift_term = 2.0 * b * expiry.sqrt() / sigma;
    let power = (s / m).powf(-2.0 * b / (sigma * sigma));

    let value = match option_type {
        OptionType::Call => {
            s * df_q * norm_cdf(a1) - m * df_r * norm_cdf(a2)
                + s * df_r * ratio * (power * norm_cdf(-a1 + drift_term) - (b * expiry).exp() * norm_cdf(-a1))
        }
        OptionType::Put => {
            m * df_r * norm_cdf(-a2) - s * df_q * norm_cdf(-a1)
                + s * df_r * ratio * (-power * norm_cdf(a1 - drift_term) + (b * expiry).exp() * norm_cdf(a1))
        }
    };
    Ok(value.max(0.0))
}
