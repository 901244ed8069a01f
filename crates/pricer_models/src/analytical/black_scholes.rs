//! Black-Scholes pricing for European options with a continuous yield.
//!
//! ## Mathematical Formulas
//!
//! **Call Price**: C = S·e^(-qT)·N(d₁) - K·e^(-rT)·N(d₂)
//! **Put Price**: P = K·e^(-rT)·N(-d₂) - S·e^(-qT)·N(-d₁)
//!
//! Where:
//! - d₁ = (ln(S/K) + (r - q + σ²/2)T) / (σ√T)
//! - d₂ = d₁ - σ√T
//!
//! With `q` set to the foreign rate the same formulas are Garman-Kohlhagen.

use pricer_core::math::distributions::{norm_cdf, norm_pdf};
use pricer_core::math::solvers::{BrentSolver, SolverConfig};

use super::error::{check_inputs, AnalyticalError};
use crate::instruments::OptionType;

/// Below this total deviation σ√T the lognormal is treated as a point mass.
const MIN_STD_DEV: f64 = 1e-12;

/// How a premium is quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PremiumQuote {
    /// Premium in price units (domestic currency per unit of underlying).
    #[default]
    Price,
    /// Premium as a fraction of spot.
    SpotFraction,
}

/// Black-Scholes model for European option pricing.
///
/// # Examples
/// ```
/// use pricer_models::analytical::BlackScholes;
/// use pricer_models::instruments::OptionType;
///
/// let bs = BlackScholes::new(100.0, 0.05, 0.0, 0.2).unwrap();
/// let call = bs.price(100.0, 1.0, OptionType::Call);
/// let put = bs.price(100.0, 1.0, OptionType::Put);
///
/// // Put-call parity: C - P = S - K*exp(-rT)
/// let parity = call - put - (100.0 - 100.0 * (-0.05_f64).exp());
/// assert!(parity.abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholes {
    spot: f64,
    rate: f64,
    dividend: f64,
    volatility: f64,
}

/// Price and first-order sensitivities of a European option.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Greeks {
    /// Option value.
    pub price: f64,
    /// ∂V/∂S
    pub delta: f64,
    /// ∂²V/∂S²
    pub gamma: f64,
    /// ∂V/∂σ
    pub vega: f64,
    /// ∂V/∂t (calendar decay, per year)
    pub theta: f64,
    /// ∂V/∂r
    pub rho: f64,
    /// ∂V/∂q
    pub psi: f64,
}

impl BlackScholes {
    /// Creates a new Black-Scholes model.
    ///
    /// A zero volatility is accepted and prices the discounted forward
    /// payoff.
    ///
    /// # Errors
    /// - `AnalyticalError::InvalidSpot` if spot <= 0
    /// - `AnalyticalError::InvalidVolatility` if volatility < 0
    ///
    /// # Examples
    /// ```
    /// use pricer_models::analytical::BlackScholes;
    ///
    /// assert!(BlackScholes::new(-100.0, 0.05, 0.0, 0.2).is_err());
    /// assert!(BlackScholes::new(100.0, 0.05, 0.0, -0.2).is_err());
    /// ```
    pub fn new(spot: f64, rate: f64, dividend: f64, volatility: f64) -> Result<Self, AnalyticalError> {
        if !(spot > 0.0) || !spot.is_finite() {
            return Err(AnalyticalError::InvalidSpot { spot });
        }
        if !(volatility >= 0.0) || !volatility.is_finite() {
            return Err(AnalyticalError::InvalidVolatility { volatility });
        }
        Ok(Self {
            spot,
            rate,
            dividend,
            volatility,
        })
    }

    /// Returns the spot price.
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Returns the risk-free rate.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Returns the continuous dividend (or foreign) yield.
    #[inline]
    pub fn dividend(&self) -> f64 {
        self.dividend
    }

    /// Returns the volatility.
    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Forward `S·e^((r-q)T)`.
    #[inline]
    pub fn forward(&self, expiry: f64) -> f64 {
        self.spot * ((self.rate - self.dividend) * expiry).exp()
    }

    fn std_dev(&self, expiry: f64) -> f64 {
        self.volatility * expiry.max(0.0).sqrt()
    }

    /// d₁ = (ln(S/K) + (r - q + σ²/2)T) / (σ√T).
    ///
    /// Returns ±∞ when σ√T vanishes.
    #[inline]
    pub fn d1(&self, strike: f64, expiry: f64) -> f64 {
        let sd = self.std_dev(expiry);
        let log_fk = (self.forward(expiry) / strike).ln();
        if sd < MIN_STD_DEV {
            return if log_fk > 0.0 {
                f64::INFINITY
            } else if log_fk < 0.0 {
                f64::NEG_INFINITY
            } else {
                0.0
            };
        }
        (log_fk + 0.5 * sd * sd) / sd
    }

    /// d₂ = d₁ - σ√T.
    #[inline]
    pub fn d2(&self, strike: f64, expiry: f64) -> f64 {
        self.d1(strike, expiry) - self.std_dev(expiry)
    }

    /// Option value; intrinsic value for `expiry <= 0`.
    pub fn price(&self, strike: f64, expiry: f64, option_type: OptionType) -> f64 {
        if expiry <= 0.0 {
            return option_type.intrinsic(self.spot, strike);
        }
        let phi = option_type.sign();
        let d1 = self.d1(strike, expiry);
        let d2 = self.d2(strike, expiry);
        let df_r = (-self.rate * expiry).exp();
        let df_q = (-self.dividend * expiry).exp();
        phi * (self.spot * df_q * norm_cdf(phi * d1) - strike * df_r * norm_cdf(phi * d2))
    }

    /// Delta ∂V/∂S.
    pub fn delta(&self, strike: f64, expiry: f64, option_type: OptionType) -> f64 {
        if expiry <= 0.0 {
            return match option_type {
                OptionType::Call if self.spot > strike => 1.0,
                OptionType::Put if self.spot < strike => -1.0,
                _ => 0.0,
            };
        }
        let phi = option_type.sign();
        let df_q = (-self.dividend * expiry).exp();
        phi * df_q * norm_cdf(phi * self.d1(strike, expiry))
    }

    /// Gamma ∂²V/∂S², identical for calls and puts.
    pub fn gamma(&self, strike: f64, expiry: f64) -> f64 {
        let sd = self.std_dev(expiry);
        if expiry <= 0.0 || sd < MIN_STD_DEV {
            return 0.0;
        }
        let df_q = (-self.dividend * expiry).exp();
        df_q * norm_pdf(self.d1(strike, expiry)) / (self.spot * sd)
    }

    /// Vega ∂V/∂σ (per unit of volatility).
    pub fn vega(&self, strike: f64, expiry: f64) -> f64 {
        if expiry <= 0.0 || self.std_dev(expiry) < MIN_STD_DEV {
            return 0.0;
        }
        let df_q = (-self.dividend * expiry).exp();
        self.spot * df_q * expiry.sqrt() * norm_pdf(self.d1(strike, expiry))
    }

    /// Theta ∂V/∂t (value change per year of calendar time, usually negative).
    pub fn theta(&self, strike: f64, expiry: f64, option_type: OptionType) -> f64 {
        if expiry <= 0.0 {
            return 0.0;
        }
        let phi = option_type.sign();
        let d1 = self.d1(strike, expiry);
        let d2 = self.d2(strike, expiry);
        let df_r = (-self.rate * expiry).exp();
        let df_q = (-self.dividend * expiry).exp();
        let decay = if self.std_dev(expiry) < MIN_STD_DEV {
            0.0
        } else {
            -self.spot * df_q * norm_pdf(d1) * self.volatility / (2.0 * expiry.sqrt())
        };
        decay - phi * self.rate * strike * df_r * norm_cdf(phi * d2)
            + phi * self.dividend * self.spot * df_q * norm_cdf(phi * d1)
    }

    /// Rho ∂V/∂r.
    pub fn rho(&self, strike: f64, expiry: f64, option_type: OptionType) -> f64 {
        if expiry <= 0.0 {
            return 0.0;
        }
        let phi = option_type.sign();
        let df_r = (-self.rate * expiry).exp();
        phi * strike * expiry * df_r * norm_cdf(phi * self.d2(strike, expiry))
    }

    /// Psi ∂V/∂q (the dividend or foreign-rate rho).
    pub fn psi(&self, strike: f64, expiry: f64, option_type: OptionType) -> f64 {
        if expiry <= 0.0 {
            return 0.0;
        }
        let phi = option_type.sign();
        let df_q = (-self.dividend * expiry).exp();
        -phi * self.spot * expiry * df_q * norm_cdf(phi * self.d1(strike, expiry))
    }

    /// Cash-or-nothing digital paying one unit if the option finishes in the money.
    pub fn digital(&self, strike: f64, expiry: f64, option_type: OptionType) -> f64 {
        if expiry <= 0.0 {
            return if option_type.sign() * (self.spot - strike) > 0.0 {
                1.0
            } else {
                0.0
            };
        }
        let phi = option_type.sign();
        (-self.rate * expiry).exp() * norm_cdf(phi * self.d2(strike, expiry))
    }

    /// All analytical greeks in one pass.
    pub fn greeks(&self, strike: f64, expiry: f64, option_type: OptionType) -> Greeks {
        Greeks {
            price: self.price(strike, expiry, option_type),
            delta: self.delta(strike, expiry, option_type),
            gamma: self.gamma(strike, expiry),
            vega: self.vega(strike, expiry),
            theta: self.theta(strike, expiry, option_type),
            rho: self.rho(strike, expiry, option_type),
            psi: self.psi(strike, expiry, option_type),
        }
    }
}

/// Validated Black-Scholes value.
///
/// # Errors
/// - `Expired` if `expiry <= 0`
/// - `InvalidStrike`, `InvalidSpot`, `InvalidVolatility` for out-of-domain inputs
///
/// # Examples
/// ```
/// use pricer_models::analytical::{bs_value, PremiumQuote};
/// use pricer_models::instruments::OptionType;
///
/// let v = bs_value(100.0, 1.0, 100.0, 0.05, 0.0, 0.2, OptionType::Call, PremiumQuote::Price).unwrap();
/// assert!((v - 10.4506).abs() < 1e-4);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn bs_value(
    spot: f64,
    expiry: f64,
    strike: f64,
    rate: f64,
    dividend: f64,
    volatility: f64,
    option_type: OptionType,
    quote: PremiumQuote,
) -> Result<f64, AnalyticalError> {
    check_inputs(spot, strike, volatility, expiry)?;
    let value = BlackScholes::new(spot, rate, dividend, volatility)?.price(strike, expiry, option_type);
    Ok(match quote {
        PremiumQuote::Price => value,
        PremiumQuote::SpotFraction => value / spot,
    })
}

/// Implied volatility by Brent on `[1e-6, 5]`.
///
/// # Errors
/// - `InvalidInput` if `target` lies outside the no-arbitrage bounds
/// - `Solver` if the root is not bracketed
#[allow(clippy::too_many_arguments)]
pub fn implied_volatility(
    target: f64,
    spot: f64,
    strike: f64,
    expiry: f64,
    rate: f64,
    dividend: f64,
    option_type: OptionType,
) -> Result<f64, AnalyticalError> {
    check_inputs(spot, strike, 0.0, expiry)?;
    let df_r = (-rate * expiry).exp();
    let df_q = (-dividend * expiry).exp();
    let phi = option_type.sign();
    let lower = (phi * (spot * df_q - strike * df_r)).max(0.0);
    let upper = if option_type.is_call() {
        spot * df_q
    } else {
        strike * df_r
    };
    if !(target > lower && target < upper) {
        return Err(AnalyticalError::InvalidInput(format!(
            "price {target} outside ({lower}, {upper})"
        )));
    }

    let solver = BrentSolver::new(SolverConfig::new(1e-12, 200));
    let sigma = solver.find_root(
        |sigma| {
            BlackScholes {
                spot,
                rate,
                dividend,
                volatility: sigma,
            }
            .price(strike, expiry, option_type)
                - target
        },
        1e-6,
        5.0,
    )?;
    Ok(sigma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_reference_price() {
        // Hull: S=42, K=40, r=10%, σ=20%, T=0.5
        let bs = BlackScholes::new(42.0, 0.1, 0.0, 0.2).unwrap();
        assert_relative_eq!(bs.price(40.0, 0.5, OptionType::Call), 4.7594, epsilon = 1e-4);
        assert_relative_eq!(bs.price(40.0, 0.5, OptionType::Put), 0.8086, epsilon = 1e-4);
    }

    #[test]
    fn test_zero_volatility_is_discounted_forward() {
        let bs = BlackScholes::new(100.0, 0.05, 0.02, 0.0).unwrap();
        let t: f64 = 2.0;
        let expected = 100.0 * (-0.02 * t).exp() - 90.0 * (-0.05 * t).exp();
        assert_relative_eq!(bs.price(90.0, t, OptionType::Call), expected, epsilon = 1e-12);
        assert_eq!(bs.price(90.0, t, OptionType::Put), 0.0);
        assert_eq!(bs.gamma(90.0, t), 0.0);
    }

    #[test]
    fn test_expired_is_intrinsic() {
        let bs = BlackScholes::new(110.0, 0.05, 0.0, 0.2).unwrap();
        assert_eq!(bs.price(100.0, 0.0, OptionType::Call), 10.0);
        assert_eq!(bs.delta(100.0, 0.0, OptionType::Call), 1.0);
        assert!(bs_value(110.0, 0.0, 100.0, 0.05, 0.0, 0.2, OptionType::Call, PremiumQuote::Price).is_err());
    }

    #[test]
    fn test_greeks_against_bumps() {
        let bs = BlackScholes::new(100.0, 0.03, 0.01, 0.25).unwrap();
        let (k, t) = (105.0, 0.75);
        for ot in [OptionType::Call, OptionType::Put] {
            let g = bs.greeks(k, t, ot);
            let h = 1e-4;
            let with = |s: f64, r: f64, q: f64, v: f64, tt: f64| {
                BlackScholes::new(s, r, q, v).unwrap().price(k, tt, ot)
            };
            let delta = (with(100.0 + h, 0.03, 0.01, 0.25, t) - with(100.0 - h, 0.03, 0.01, 0.25, t)) / (2.0 * h);
            let vega = (with(100.0, 0.03, 0.01, 0.25 + h, t) - with(100.0, 0.03, 0.01, 0.25 - h, t)) / (2.0 * h);
            let rho = (with(100.0, 0.03 + h, 0.01, 0.25, t) - with(100.0, 0.03 - h, 0.01, 0.25, t)) / (2.0 * h);
            let psi = (with(100.0, 0.03, 0.01 + h, 0.25, t) - with(100.0, 0.03, 0.01 - h, 0.25, t)) / (2.0 * h);
            let theta = -(with(100.0, 0.03, 0.01, 0.25, t + h) - with(100.0, 0.03, 0.01, 0.25, t - h)) / (2.0 * h);
            let h2 = 1e-2;
            let gamma = (with(100.0 + h2, 0.03, 0.01, 0.25, t) - 2.0 * g.price
                + with(100.0 - h2, 0.03, 0.01, 0.25, t))
                / (h2 * h2);
            assert_relative_eq!(g.delta, delta, max_relative = 1e-6);
            assert_relative_eq!(g.vega, vega, max_relative = 1e-6);
            assert_relative_eq!(g.rho, rho, max_relative = 1e-6);
            assert_relative_eq!(g.psi, psi, max_relative = 1e-6);
            assert_relative_eq!(g.theta, theta, max_relative = 1e-5);
            assert_relative_eq!(g.gamma, gamma, max_relative = 1e-4);
        }
    }

    #[test]
    fn test_digital_sums_to_discount() {
        let bs = BlackScholes::new(100.0, 0.04, 0.0, 0.3).unwrap();
        let sum = bs.digital(95.0, 1.5, OptionType::Call) + bs.digital(95.0, 1.5, OptionType::Put);
        assert_relative_eq!(sum, (-0.04_f64 * 1.5).exp(), epsilon = 1e-14);
    }

    #[test]
    fn test_spot_fraction_quote() {
        let p = bs_value(50.0, 1.0, 50.0, 0.02, 0.0, 0.2, OptionType::Put, PremiumQuote::Price).unwrap();
        let f = bs_value(50.0, 1.0, 50.0, 0.02, 0.0, 0.2, OptionType::Put, PremiumQuote::SpotFraction).unwrap();
        assert_relative_eq!(p / 50.0, f, epsilon = 1e-15);
    }

    #[test]
    fn test_implied_volatility_recovers_input() {
        let bs = BlackScholes::new(6.5, 0.025, 0.002, 0.045).unwrap();
        let target = bs.price(6.6, 0.08, OptionType::Call);
        let iv = implied_volatility(target, 6.5, 6.6, 0.08, 0.025, 0.002, OptionType::Call).unwrap();
        assert_relative_eq!(iv, 0.045, epsilon = 1e-8);
        assert!(implied_volatility(7.0, 6.5, 6.6, 0.08, 0.025, 0.002, OptionType::Call).is_err());
    }

    proptest! {
        #[test]
        fn prop_put_call_parity(
            s in 1.0f64..200.0,
            k in 1.0f64..200.0,
            r in -0.02f64..0.1,
            q in 0.0f64..0.08,
            v in 0.01f64..1.0,
            t in 0.01f64..5.0,
        ) {
            let bs = BlackScholes::new(s, r, q, v).unwrap();
            let lhs = bs.price(k, t, OptionType::Call) - bs.price(k, t, OptionType::Put);
            let rhs = s * (-q * t).exp() - k * (-r * t).exp();
            prop_assert!((lhs - rhs).abs() < 1e-8);
        }

        #[test]
        fn prop_call_bounds(
            s in 1.0f64..200.0,
            k in 1.0f64..200.0,
            r in 0.0f64..0.1,
            q in 0.0f64..0.08,
            v in 0.01f64..1.0,
            t in 0.01f64..5.0,
        ) {
            let c = BlackScholes::new(s, r, q, v).unwrap().price(k, t, OptionType::Call);
            let lower = (s * (-q * t).exp() - k * (-r * t).exp()).max(0.0);
            prop_assert!(c >= lower - 1e-10);
            prop_assert!(c <= s * (-q * t).exp() + 1e-10);
        }

        #[test]
        fn prop_monotonicity(
            s in 10.0f64..200.0,
            k in 10.0f64..200.0,
            v in 0.05f64..0.8,
            t in 0.05f64..3.0,
        ) {
            let price = |s: f64, k: f64, v: f64, ot| BlackScholes::new(s, 0.03, 0.01, v).unwrap().price(k, t, ot);
            let c = price(s, k, v, OptionType::Call);
            let p = price(s, k, v, OptionType::Put);
            prop_assert!(price(s * 1.01, k, v, OptionType::Call) >= c - 1e-12);
            prop_assert!(price(s, k * 1.01, v, OptionType::Call) <= c + 1e-12);
            prop_assert!(price(s, k, v * 1.01, OptionType::Call) >= c - 1e-12);
            prop_assert!(price(s * 1.01, k, v, OptionType::Put) <= p + 1e-12);
            prop_assert!(price(s, k * 1.01, v, OptionType::Put) >= p - 1e-12);
        }
    }
}
