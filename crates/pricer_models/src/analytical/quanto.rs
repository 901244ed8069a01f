//! FX quanto digital and quanto range-accrual closed forms.
//!
//! The quoted pair `f/d` pays out in a third currency `q`. Under the
//! payout measure its forward picks up the drift correction
//! `exp(−ρ·σ_fd·σ_dq·t)`, where `σ_dq` is the volatility of the
//! domestic/payout pair and `ρ` their correlation.

use pricer_core::math::distributions::norm_cdf;

use super::error::{check_inputs, AnalyticalError};
use crate::instruments::OptionType;

/// Forward of the quoted pair under the payout-currency measure.
///
/// # Examples
/// ```
/// use pricer_models::analytical::quanto_adjusted_forward;
///
/// assert_eq!(quanto_adjusted_forward(6.5, 0.0, 0.05, 0.08, 1.0), 6.5);
/// assert!(quanto_adjusted_forward(6.5, 0.5, 0.05, 0.08, 1.0) < 6.5);
/// ```
#[inline]
pub fn quanto_adjusted_forward(forward: f64, rho: f64, sigma_fd: f64, sigma_dq: f64, expiry: f64) -> f64 {
    forward * (-rho * sigma_fd * sigma_dq * expiry).exp()
}

/// Inputs of a quanto digital.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantoDigitalInputs {
    /// Unadjusted forward of the quoted pair to expiry.
    pub forward: f64,
    /// Strike on the quoted pair.
    pub strike: f64,
    /// Years to expiry.
    pub expiry: f64,
    /// Volatility of the quoted pair.
    pub volatility: f64,
    /// Volatility of the domestic/payout pair.
    pub quanto_volatility: f64,
    /// Correlation between the two pairs.
    pub correlation: f64,
    /// Payout-currency discount factor to the payment date.
    pub discount_factor: f64,
    /// Fixed amount paid in the payout currency.
    pub payout: f64,
}

fn in_the_money_probability(forward: f64, strike: f64, sd: f64, option_type: OptionType) -> f64 {
    let phi = option_type.sign();
    if sd < 1e-12 {
        return if phi * (forward - strike) > 0.0 { 1.0 } else { 0.0 };
    }
    let d2 = ((forward / strike).ln() - 0.5 * sd * sd) / sd;
    norm_cdf(phi * d2)
}

/// Quanto digital: pays `payout` in the payout currency if the quoted pair
/// finishes above (call) or below (put) the strike.
///
/// # Errors
/// Input validation as for Black-Scholes; `|ρ| > 1` is `InvalidInput`.
pub fn fx_quanto_digital(inputs: &QuantoDigitalInputs, option_type: OptionType) -> Result<f64, AnalyticalError> {
    check_inputs(inputs.forward, inputs.strike, inputs.volatility, inputs.expiry)?;
    check_quanto(inputs.quanto_volatility, inputs.correlation)?;
    let f_adj = quanto_adjusted_forward(
        inputs.forward,
        inputs.correlation,
        inputs.volatility,
        inputs.quanto_volatility,
        inputs.expiry,
    );
    let sd = inputs.volatility * inputs.expiry.sqrt();
    Ok(inputs.payout * inputs.discount_factor * in_the_money_probability(f_adj, inputs.strike, sd, option_type))
}

fn check_quanto(quanto_volatility: f64, correlation: f64) -> Result<(), AnalyticalError> {
    if !(quanto_volatility >= 0.0) {
        return Err(AnalyticalError::InvalidVolatility {
            volatility: quanto_volatility,
        });
    }
    if !(-1.0..=1.0).contains(&correlation) {
        return Err(AnalyticalError::InvalidInput(format!("correlation {correlation}")));
    }
    Ok(())
}

/// One fixing of a range accrual.
///
/// Fixings with `time <= 0` are already known and `forward` holds the
/// realised rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeObservation {
    /// Years from valuation to the fixing.
    pub time: f64,
    /// Forward (or realised fixing) of the quoted pair.
    pub forward: f64,
    /// Volatility to the fixing.
    pub volatility: f64,
}

/// Quanto range accrual: pays `coupon · (fixings in [lower, upper]) / n`
/// in the payout currency at the payment date.
///
/// # Errors
/// - `InvalidInput` for an empty or inverted range or no observations
/// - `InvalidSpot`/`InvalidVolatility` for bad forwards or volatilities
///
/// # Examples
/// ```
/// use pricer_models::analytical::{fx_quanto_range_accrual, RangeObservation};
///
/// let obs: Vec<_> = (1..=20)
///     .map(|i| RangeObservation { time: i as f64 / 52.0, forward: 6.5, volatility: 0.04 })
///     .collect();
/// let v = fx_quanto_range_accrual(&obs, 6.3, 6.7, 0.08, 0.3, 0.99, 0.05).unwrap();
/// assert!(v > 0.0 && v < 0.05 * 0.99);
/// ```
pub fn fx_quanto_range_accrual(
    observations: &[RangeObservation],
    lower: f64,
    upper: f64,
    quanto_volatility: f64,
    correlation: f64,
    discount_factor: f64,
    coupon: f64,
) -> Result<f64, AnalyticalError> {
    if observations.is_empty() {
        return Err(AnalyticalError::InvalidInput("no range observations".into()));
    }
    if !(lower > 0.0 && upper > lower) {
        return Err(AnalyticalError::InvalidInput(format!("range [{lower}, {upper}]")));
    }
    check_quanto(quanto_volatility, correlation)?;

    let mut expected_days: f64 = 0.0;
    for obs in observations {
        if !(obs.forward > 0.0) {
            return Err(AnalyticalError::InvalidSpot { spot: obs.forward });
        }
        if !(obs.volatility >= 0.0) {
            return Err(AnalyticalError::InvalidVolatility {
                volatility: obs.volatility,
            });
        }
        if obs.time <= 0.0 {
            if (lower..=upper).contains(&obs.forward) {
                expected_days += 1.0;
            }
            continue;
        }
        let f_adj = quanto_adjusted_forward(obs.forward, correlation, obs.volatility, quanto_volatility, obs.time);
        let sd = obs.volatility * obs.time.sqrt();
        let above_lower = in_the_money_probability(f_adj, lower, sd, OptionType::Call);
        let above_upper = in_the_money_probability(f_adj, upper, sd, OptionType::Call);
        expected_days += (above_lower - above_upper).max(0.0);
    }
    Ok(coupon * discount_factor * expected_days / observations.len() as f64)
}
