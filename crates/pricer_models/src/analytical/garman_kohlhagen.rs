//! Garman-Kohlhagen pricing of FX vanillas, forwards and digitals.
//!
//! Spot is quoted in domestic currency per unit of foreign currency.
//! The foreign rate plays the role of the dividend yield in Black-Scholes:
//!
//! C = S·e^(-r_f·T)·N(d₁) - K·e^(-r_d·T)·N(d₂)
//!
//! # Examples
//!
//! ```
//! use pricer_models::analytical::GarmanKohlhagen;
//! use pricer_models::instruments::OptionType;
//!
//! let gk = GarmanKohlhagen::new(1.10, 0.03, 0.01, 0.15).unwrap();
//! let call = gk.price(1.12, 1.0, OptionType::Call);
//! let put = gk.price(1.12, 1.0, OptionType::Put);
//!
//! let parity = call - put - (1.10 * (-0.01_f64).exp() - 1.12 * (-0.03_f64).exp());
//! assert!(parity.abs() < 1e-12);
//! ```

use super::black_scholes::{BlackScholes, Greeks};
use super::error::{check_inputs, AnalyticalError};
use crate::instruments::OptionType;

/// Garman-Kohlhagen model: Black-Scholes with a foreign-rate carry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GarmanKohlhagen {
    inner: BlackScholes,
}

impl GarmanKohlhagen {
    /// Creates a model from spot, domestic rate, foreign rate and volatility.
    ///
    /// # Errors
    /// - `InvalidSpot` if spot <= 0 (FX rates are strictly positive)
    /// - `InvalidVolatility` if volatility < 0
    pub fn new(
        spot: f64,
        domestic_rate: f64,
        foreign_rate: f64,
        volatility: f64,
    ) -> Result<Self, AnalyticalError> {
        Ok(Self {
            inner: BlackScholes::new(spot, domestic_rate, foreign_rate, volatility)?,
        })
    }

    /// Spot rate.
    #[inline]
    pub fn spot(&self) -> f64 {
        self.inner.spot()
    }

    /// Domestic continuously compounded rate.
    #[inline]
    pub fn domestic_rate(&self) -> f64 {
        self.inner.rate()
    }

    /// Foreign continuously compounded rate.
    #[inline]
    pub fn foreign_rate(&self) -> f64 {
        self.inner.dividend()
    }

    /// Outright forward `S·e^((r_d - r_f)T)`.
    #[inline]
    pub fn forward(&self, expiry: f64) -> f64 {
        self.inner.forward(expiry)
    }

    /// Option value per unit of foreign notional, in domestic currency.
    #[inline]
    pub fn price(&self, strike: f64, expiry: f64, option_type: OptionType) -> f64 {
        self.inner.price(strike, expiry, option_type)
    }

    /// Spot delta and the other analytical greeks (`psi` is the foreign rho).
    #[inline]
    pub fn greeks(&self, strike: f64, expiry: f64, option_type: OptionType) -> Greeks {
        self.inner.greeks(strike, expiry, option_type)
    }

    /// Cash-or-nothing digital paying one unit of domestic currency.
    #[inline]
    pub fn digital(&self, strike: f64, expiry: f64, option_type: OptionType) -> f64 {
        self.inner.digital(strike, expiry, option_type)
    }
}

/// FX vanilla value in domestic currency for `notional` units of foreign.
///
/// # Errors
/// Propagates the Black-Scholes input checks; `expiry <= 0` is `Expired`.
#[allow(clippy::too_many_arguments)]
pub fn fx_vanilla_value(
    spot: f64,
    strike: f64,
    expiry: f64,
    domestic_rate: f64,
    foreign_rate: f64,
    volatility: f64,
    option_type: OptionType,
    notional: f64,
) -> Result<f64, AnalyticalError> {
    check_inputs(spot, strike, volatility, expiry)?;
    let gk = GarmanKohlhagen::new(spot, domestic_rate, foreign_rate, volatility)?;
    Ok(notional * gk.price(strike, expiry, option_type))
}

/// Value of a long FX forward: `N·(S·e^(-r_f·T) − K·e^(-r_d·T))`.
///
/// # Errors
/// `InvalidSpot`/`InvalidStrike` for non-positive rates, `Expired` past delivery.
pub fn fx_forward_value(
    spot: f64,
    strike: f64,
    expiry: f64,
    domestic_rate: f64,
    foreign_rate: f64,
    notional: f64,
) -> Result<f64, AnalyticalError> {
    check_inputs(spot, strike, 0.0, expiry)?;
    Ok(notional * (spot * (-foreign_rate * expiry).exp() - strike * (-domestic_rate * expiry).exp()))
}

/// FX digital paying `payout` domestic units if in the money at expiry.
#[allow(clippy::too_many_arguments)]
pub fn fx_digital_value(
    spot: f64,
    strike: f64,
    expiry: f64,
    domestic_rate: f64,
    foreign_rate: f64,
    volatility: f64,
    option_type: OptionType,
    payout: f64,
) -> Result<f64, AnalyticalError> {
    check_inputs(spot, strike, volatility, expiry)?;
    let gk = GarmanKohlhagen::new(spot, domestic_rate, foreign_rate, volatility)?;
    Ok(payout * gk.digital(strike, expiry, option_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_value() {
        // Haug: S=1.56, K=1.60, T=0.5, rd=6%, rf=8%, σ=12% -> call 0.0291
        let v = fx_vanilla_value(1.56, 1.60, 0.5, 0.06, 0.08, 0.12, OptionType::Call, 1.0).unwrap();
        assert_relative_eq!(v, 0.0291, epsilon = 1e-4);
    }

    #[test]
    fn test_forward_is_call_minus_put() {
        let (s, k, t, rd, rf, v) = (6.5, 6.6, 0.0739726, 0.025, 0.002, 0.05);
        let c = fx_vanilla_value(s, k, t, rd, rf, v, OptionType::Call, 5e7).unwrap();
        let p = fx_vanilla_value(s, k, t, rd, rf, v, OptionType::Put, 5e7).unwrap();
        let f = fx_forward_value(s, k, t, rd, rf, 5e7).unwrap();
        assert_relative_eq!(c - p, f, max_relative = 1e-10);
    }

    #[test]
    fn test_rejects_bad_rates_and_expiry() {
        assert!(matches!(
            fx_forward_value(-1.0, 6.6, 1.0, 0.0, 0.0, 1.0),
            Err(AnalyticalError::InvalidSpot { .. })
        ));
        assert!(matches!(
            fx_digital_value(6.5, 6.6, -0.1, 0.0, 0.0, 0.1, OptionType::Call, 1.0),
            Err(AnalyticalError::Expired { .. })
        ));
    }

    #[test]
    fn test_digital_in_unit_interval() {
        let d = fx_digital_value(6.5, 6.6, 0.5, 0.02, 0.01, 0.05, OptionType::Call, 1.0).unwrap();
        assert!(d > 0.0 && d < (-0.01_f64).exp());
    }
}
