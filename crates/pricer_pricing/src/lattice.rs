//! Cox-Ross-Rubinstein binomial tree for American exercise.
//!
//! Backward induction over `N` steps with `u = e^{σ√Δt}`, `d = 1/u` and
//! risk-neutral probability `p = (e^{(r−q)Δt} − d)/(u − d)`. Prices from
//! `N` and `N + 1` steps are averaged to damp the odd/even oscillation.

use pricer_core::types::PricingError;
use pricer_models::instruments::OptionType;

/// Inputs of an American vanilla, per unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatticeInputs {
    /// Spot.
    pub spot: f64,
    /// Strike.
    pub strike: f64,
    /// Continuously compounded risk-free rate.
    pub rate: f64,
    /// Continuous dividend yield.
    pub dividend: f64,
    /// Volatility.
    pub volatility: f64,
    /// Years to expiry.
    pub expiry: f64,
}

fn crr(inputs: &LatticeInputs, steps: usize, option_type: OptionType, american: bool) -> Result<f64, PricingError> {
    let LatticeInputs {
        spot,
        strike,
        rate,
        dividend,
        volatility,
        expiry,
    } = *inputs;
    let dt = expiry / steps as f64;
    let u = (volatility * dt.sqrt()).exp();
    let d = 1.0 / u;
    let growth = ((rate - dividend) * dt).exp();
    let p = (growth - d) / (u - d);
    if !(0.0..=1.0).contains(&p) || !p.is_finite() {
        return Err(PricingError::InvalidMarketData(format!(
            "risk-neutral probability {p} outside [0, 1] with {steps} steps"
        )));
    }
    let disc = (-rate * dt).exp();
    let (disc_p, disc_q) = (disc * p, disc * (1.0 - p));
    let ratio = u / d;

    let mut values = Vec::with_capacity(steps + 1);
    let mut s = spot * d.powi(steps as i32);
    for _ in 0..=steps {
        values.push(option_type.intrinsic(s, strike));
        s *= ratio;
    }
    for n in (0..steps).rev() {
        let mut s = spot * d.powi(n as i32);
        for j in 0..=n {
            let continuation = disc_q * values[j] + disc_p * values[j + 1];
            values[j] = if american {
                continuation.max(option_type.intrinsic(s, strike))
            } else {
                continuation
            };
            s *= ratio;
        }
    }
    Ok(values[0])
}

/// American vanilla value from averaged `N` and `N + 1` step trees.
///
/// # Errors
/// - `InvalidMarketData` for non-positive spot, strike or volatility, or a
///   step size that pushes `p` outside `[0, 1]`
/// - `ExpiredInstrument` for a negative expiry
/// - `InvalidConfiguration` for zero steps
///
/// # Examples
///
/// ```rust
/// use pricer_models::instruments::OptionType;
/// use pricer_pricing::lattice::{american_price, LatticeInputs};
///
/// let inputs = LatticeInputs {
///     spot: 100.0, strike: 100.0, rate: 0.05, dividend: 0.0, volatility: 0.2, expiry: 1.0,
/// };
/// // No dividends: early exercise of a call is never optimal.
/// let american = american_price(&inputs, 500, OptionType::Call).unwrap();
/// assert!((american - 10.4506).abs() < 5e-3);
/// ```
pub fn american_price(inputs: &LatticeInputs, steps: usize, option_type: OptionType) -> Result<f64, PricingError> {
    if !(inputs.spot > 0.0) || !(inputs.strike > 0.0) || !(inputs.volatility > 0.0) {
        return Err(PricingError::InvalidMarketData(format!(
            "tree spot {}, strike {}, volatility {}",
            inputs.spot, inputs.strike, inputs.volatility
        )));
    }
    if inputs.expiry < 0.0 {
        return Err(PricingError::ExpiredInstrument(format!("tree expiry {}", inputs.expiry)));
    }
    if inputs.expiry == 0.0 {
        return Ok(option_type.intrinsic(inputs.spot, inputs.strike));
    }
    if steps == 0 {
        return Err(PricingError::InvalidConfiguration("binomial steps must be positive".into()));
    }
    let a = crr(inputs, steps, option_type, true)?;
    let b = crr(inputs, steps + 1, option_type, true)?;
    Ok(0.5 * (a + b))
}

/// European value on the same tree; used to measure the lattice error.
pub fn european_tree_price(
    inputs: &LatticeInputs,
    steps: usize,
    option_type: OptionType,
) -> Result<f64, PricingError> {
    if steps == 0 {
        return Err(PricingError::InvalidConfiguration("binomial steps must be positive".into()));
    }
    let a = crr(inputs, steps, option_type, false)?;
    let b = crr(inputs, steps + 1, option_type, false)?;
    Ok(0.5 * (a + b))
}
