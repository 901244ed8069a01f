//! Closed-form knockout options under Black-Scholes.
//!
//! Covers the up-and-out call and the down-and-out put (Reiner-Rubinstein),
//! with the rebate paid at expiry when the barrier has been touched.
//! Discrete monitoring is handled with the Broadie-Glasserman-Kou shift
//! `H·exp(±β·σ·√Δt)`, β = −ζ(1/2)/√(2π) ≈ 0.5826, moving the barrier away
//! from spot.

use pricer_core::math::distributions::norm_cdf;

use super::black_scholes::BlackScholes;
use super::error::{check_inputs, AnalyticalError};
use crate::instruments::OptionType;

/// Broadie-Glasserman-Kou continuity correction constant.
pub const BGK_BETA: f64 = 0.5826;

/// Barrier monitoring frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BarrierMonitoring {
    /// Continuously monitored, no correction.
    Continuous,
    /// Daily closes (1/252 years).
    #[default]
    Daily,
    /// Weekly closes (1/52 years).
    Weekly,
    /// Monthly closes (1/12 years).
    Monthly,
}

impl BarrierMonitoring {
    /// Monitoring interval in years.
    pub fn interval(&self) -> f64 {
        match self {
            BarrierMonitoring::Continuous => 0.0,
            BarrierMonitoring::Daily => 1.0 / 252.0,
            BarrierMonitoring::Weekly => 1.0 / 52.0,
            BarrierMonitoring::Monthly => 1.0 / 12.0,
        }
    }
}

/// Barrier shifted for discrete monitoring.
///
/// Up barriers move up and down barriers move down.
///
/// # Examples
/// ```
/// use pricer_models::analytical::{bgk_adjusted_barrier, BarrierMonitoring};
///
/// let h = bgk_adjusted_barrier(5.5, 0.1, BarrierMonitoring::Daily, true);
/// assert!(h > 5.5);
/// assert_eq!(bgk_adjusted_barrier(5.5, 0.1, BarrierMonitoring::Continuous, true), 5.5);
/// ```
#[inline]
pub fn bgk_adjusted_barrier(
    barrier: f64,
    volatility: f64,
    monitoring: BarrierMonitoring,
    is_up: bool,
) -> f64 {
    let shift = BGK_BETA * volatility * monitoring.interval().sqrt();
    if is_up {
        barrier * shift.exp()
    } else {
        barrier * (-shift).exp()
    }
}

/// Inputs of a knockout option, per unit of underlying.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnockoutInputs {
    /// Spot.
    pub spot: f64,
    /// Strike.
    pub strike: f64,
    /// Knockout barrier (above spot for calls, below for puts).
    pub barrier: f64,
    /// Rebate paid at expiry if knocked out.
    pub rebate: f64,
    /// Continuously compounded risk-free rate.
    pub rate: f64,
    /// Continuous dividend or foreign yield.
    pub dividend: f64,
    /// Volatility.
    pub volatility: f64,
    /// Time to expiry in years.
    pub expiry: f64,
    /// Monitoring frequency for the barrier correction.
    pub monitoring: BarrierMonitoring,
}

/// Value of an up-and-out call (`Call`) or down-and-out put (`Put`).
///
/// If spot is already on or beyond the unadjusted barrier the option is
/// knocked out and the value is the rebate discounted from expiry.
///
/// # Errors
/// Input validation as for Black-Scholes; a barrier on the wrong side of
/// zero is `InvalidInput`.
///
/// # Examples
/// ```
/// use pricer_models::analytical::{knockout_price, BarrierMonitoring, KnockoutInputs};
/// use pricer_models::instruments::OptionType;
///
/// let inputs = KnockoutInputs {
///     spot: 5.5, strike: 5.3, barrier: 5.5, rebate: 0.2,
///     rate: 0.02, dividend: 0.0, volatility: 0.1, expiry: 0.25,
///     monitoring: BarrierMonitoring::Daily,
/// };
/// let v = knockout_price(&inputs, OptionType::Call).unwrap();
/// assert!((v - 0.2 * (-0.02_f64 * 0.25).exp()).abs() < 1e-14);
/// ```
pub fn knockout_price(inputs: &KnockoutInputs, option_type: OptionType) -> Result<f64, AnalyticalError> {
    let KnockoutInputs {
        spot: s,
        strike: k,
        barrier,
        rebate,
        rate: r,
        dividend: q,
        volatility: sigma,
        expiry: t,
        monitoring,
    } = *inputs;
    check_inputs(s, k, sigma, t)?;
    if !(barrier > 0.0) {
        return Err(AnalyticalError::InvalidInput(format!("barrier {barrier}")));
    }

    let df_r = (-r * t).exp();
    let is_up = option_type.is_call();
    let breached = if is_up { s >= barrier } else { s <= barrier };
    if breached {
        return Ok(rebate * df_r);
    }

    let h = bgk_adjusted_barrier(barrier, sigma, monitoring, is_up);
    let sd = sigma * t.sqrt();
    if sd < 1e-12 {
        // Deterministic path: forward either crosses the barrier or not.
        let f = s * ((r - q) * t).exp();
        let hit = if is_up { f >= h } else { f <= h };
        return Ok(if hit {
            rebate * df_r
        } else {
            df_r * option_type.intrinsic(f, k)
        });
    }

    let df_q = (-q * t).exp();
    let eta = if is_up { -1.0 } else { 1.0 };
    let phi = option_type.sign();
    let mu = (r - q - 0.5 * sigma * sigma) / (sigma * sigma);

    let x1 = (s / k).ln() / sd + (1.0 + mu) * sd;
    let x2 = (s / h).ln() / sd + (1.0 + mu) * sd;
    let y1 = (h * h / (s * k)).ln() / sd + (1.0 + mu) * sd;
    let y2 = (h / s).ln() / sd + (1.0 + mu) * sd;
    let hs = h / s;
    let hs_2mu = hs.powf(2.0 * mu);
    let hs_2mu1 = hs.powf(2.0 * (mu + 1.0));

    let a = phi * s * df_q * norm_cdf(phi * x1) - phi * k * df_r * norm_cdf(phi * (x1 - sd));
    let b = phi * s * df_q * norm_cdf(phi * x2) - phi * k * df_r * norm_cdf(phi * (x2 - sd));
    let c = phi * s * df_q * hs_2mu1 * norm_cdf(eta * y1)
        - phi * k * df_r * hs_2mu * norm_cdf(eta * (y1 - sd));
    let d = phi * s * df_q * hs_2mu1 * norm_cdf(eta * y2)
        - phi * k * df_r * hs_2mu * norm_cdf(eta * (y2 - sd));
    // Probability of never touching the barrier, discounted.
    let survival = df_r * (norm_cdf(eta * (x2 - sd)) - hs_2mu * norm_cdf(eta * (y2 - sd)));

    let strike_beyond_barrier = if is_up { k >= h } else { k <= h };
    let vanilla_part = if strike_beyond_barrier {
        0.0
    } else {
        a - b + c - d
    };
    let value = vanilla_part + rebate * (df_r - survival);
    Ok(value.max(0.0))
}

/// Knockout value with the barrier ignored; the knockout is bounded by it.
pub fn knockout_vanilla_bound(inputs: &KnockoutInputs, option_type: OptionType) -> Result<f64, AnalyticalError> {
    check_inputs(inputs.spot, inputs.strike, inputs.volatility, inputs.expiry)?;
    Ok(BlackScholes::new(inputs.spot, inputs.rate, inputs.dividend, inputs.volatility)?
        .price(inputs.strike, inputs.expiry, option_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn base() -> KnockoutInputs {
        KnockoutInputs {
            spot: 100.0,
            strike: 100.0,
            barrier: 130.0,
            rebate: 0.0,
            rate: 0.05,
            dividend: 0.0,
            volatility: 0.2,
            expiry: 1.0,
            monitoring: BarrierMonitoring::Continuous,
        }
    }

    #[test]
    fn test_far_barrier_approaches_vanilla() {
        let mut inputs = base();
        inputs.barrier = 1e4;
        let ko = knockout_price(&inputs, OptionType::Call).unwrap();
        let vanilla = knockout_vanilla_bound(&inputs, OptionType::Call).unwrap();
        assert_relative_eq!(ko, vanilla, max_relative = 1e-10);

        inputs.barrier = 1e-2;
        let ko = knockout_price(&inputs, OptionType::Put).unwrap();
        let vanilla = knockout_vanilla_bound(&inputs, OptionType::Put).unwrap();
        assert_relative_eq!(ko, vanilla, max_relative = 1e-8);
    }

    #[test]
    fn test_bounded_by_vanilla() {
        let inputs = base();
        let ko = knockout_price(&inputs, OptionType::Call).unwrap();
        let vanilla = knockout_vanilla_bound(&inputs, OptionType::Call).unwrap();
        assert!(ko > 0.0 && ko < vanilla);
    }

    #[test]
    fn test_expiry_rebate_below_hit_rebate_reference() {
        // Haug (2007): up-and-out call S=100, K=90, H=105, T=0.5, r=8%, b=4%,
        // σ=25%, rebate 3 paid at hit is worth 2.6789. Paying at expiry is worth less.
        let inputs = KnockoutInputs {
            spot: 100.0,
            strike: 90.0,
            barrier: 105.0,
            rebate: 3.0,
            rate: 0.08,
            dividend: 0.04,
            volatility: 0.25,
            expiry: 0.5,
            monitoring: BarrierMonitoring::Continuous,
        };
        let v = knockout_price(&inputs, OptionType::Call).unwrap();
        assert!(v > 0.0 && v < 2.6789);
    }

    #[test]
    fn test_breached_pays_discounted_rebate() {
        let mut inputs = base();
        inputs.spot = 130.0;
        inputs.rebate = 2.0;
        let v = knockout_price(&inputs, OptionType::Call).unwrap();
        assert_relative_eq!(v, 2.0 * (-0.05_f64).exp(), epsilon = 1e-14);

        let mut inputs = base();
        inputs.barrier = 80.0;
        inputs.spot = 79.0;
        inputs.rebate = 1.0;
        let v = knockout_price(&inputs, OptionType::Put).unwrap();
        assert_relative_eq!(v, (-0.05_f64).exp(), epsilon = 1e-14);
    }

    #[test]
    fn test_rebate_increases_value_by_hit_probability() {
        let mut inputs = base();
        let no_rebate = knockout_price(&inputs, OptionType::Call).unwrap();
        inputs.rebate = 1.0;
        let with_rebate = knockout_price(&inputs, OptionType::Call).unwrap();
        let diff = with_rebate - no_rebate;
        assert!(diff > 0.0 && diff < (-0.05_f64).exp());
    }

    #[test]
    fn test_discrete_monitoring_is_worth_more() {
        let mut inputs = base();
        let cont = knockout_price(&inputs, OptionType::Call).unwrap();
        inputs.monitoring = BarrierMonitoring::Monthly;
        let monthly = knockout_price(&inputs, OptionType::Call).unwrap();
        assert!(monthly > cont);
    }

    #[test]
    fn test_strike_beyond_barrier_is_rebate_only() {
        let mut inputs = base();
        inputs.strike = 140.0;
        inputs.rebate = 0.0;
        assert_eq!(knockout_price(&inputs, OptionType::Call).unwrap(), 0.0);
    }
}
