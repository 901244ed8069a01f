//! Discretely monitored arithmetic-average Asian options.
//!
//! Three approximations are offered:
//! - **Geometric**: exact value of the geometric-average option, a lower
//!   bound for the arithmetic call
//! - **Turnbull-Wakeman**: lognormal matched to the first two moments of
//!   the arithmetic average, priced by Black
//! - **Curran**: conditioning on the geometric average
//!
//! Observations are equally spaced over the remaining part of the window.
//! When valuation falls inside the window the realised average `A` is
//! folded into the strike, `K* = (K − (1 − τ/T)·A) / (τ/T)`, and the value
//! is scaled by `τ/T`.

use pricer_core::math::distributions::norm_cdf;
use std::fmt;
use std::str::FromStr;

use super::black76::black_forward;
use super::error::AnalyticalError;
use crate::instruments::OptionType;

/// Asian valuation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AsianMethod {
    /// Geometric-average closed form.
    Geometric,
    /// Two-moment lognormal match.
    #[default]
    TurnbullWakeman,
    /// Conditioning on the geometric average.
    Curran,
}

impl AsianMethod {
    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            AsianMethod::Geometric => "Geometric",
            AsianMethod::TurnbullWakeman => "TurnbullWakeman",
            AsianMethod::Curran => "Curran",
        }
    }
}

impl fmt::Display for AsianMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AsianMethod {
    type Err = AnalyticalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "geometric" => Ok(AsianMethod::Geometric),
            "turnbullwakeman" | "tw" => Ok(AsianMethod::TurnbullWakeman),
            "curran" => Ok(AsianMethod::Curran),
            _ => Err(AnalyticalError::Unsupported(format!("Asian method {s}"))),
        }
    }
}

/// Inputs of an Asian option.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsianInputs {
    /// Spot.
    pub spot: f64,
    /// Strike on the average.
    pub strike: f64,
    /// Continuously compounded risk-free rate.
    pub rate: f64,
    /// Continuous dividend or foreign yield.
    pub dividend: f64,
    /// Volatility.
    pub volatility: f64,
    /// Years from valuation to the start of averaging; negative once started.
    pub averaging_start: f64,
    /// Years from valuation to expiry (the last observation).
    pub expiry: f64,
    /// Observations over the whole window.
    pub observations: usize,
    /// Realised average so far; required once averaging has started.
    pub accrued_average: Option<f64>,
}

/// Moments of the average over an observation grid.
struct GridMoments {
    times: Vec<f64>,
    m1: f64,
    m2: f64,
}

fn grid(start: f64, end: f64, n: usize) -> Vec<f64> {
    let step = (end - start) / n as f64;
    (1..=n).map(|i| start + step * i as f64).collect()
}

fn moments(spot: f64, carry: f64, sigma: f64, times: Vec<f64>) -> GridMoments {
    let n = times.len() as f64;
    let m1 = spot * times.iter().map(|t| (carry * t).exp()).sum::<f64>() / n;

    // ΣΣ e^{b(t_i+t_j) + σ² min(t_i,t_j)} with sorted times
    let mut suffix: f64 = 0.0;
    let mut cross: f64 = 0.0;
    let mut diag: f64 = 0.0;
    for &t in times.iter().rev() {
        diag += ((2.0 * carry + sigma * sigma) * t).exp();
        cross += ((carry + sigma * sigma) * t).exp() * suffix;
        suffix += (carry * t).exp();
    }
    let m2 = spot * spot * (diag + 2.0 * cross) / (n * n);
    GridMoments { times, m1, m2 }
}

/// Σ_j min(t_i, t_j) for each i, with sorted times.
fn min_sums(times: &[f64]) -> Vec<f64> {
    let n = times.len();
    let mut prefix: f64 = 0.0;
    times
        .iter()
        .enumerate()
        .map(|(i, &t)| {
            prefix += t;
            prefix + (n - 1 - i) as f64 * t
        })
        .collect()
}

fn geometric(inputs: &AsianInputs, strike: f64, g: &GridMoments, option_type: OptionType) -> f64 {
    let sigma = inputs.volatility;
    let carry = inputs.rate - inputs.dividend;
    let n = g.times.len() as f64;
    let mean_t = g.times.iter().sum::<f64>() / n;
    let mu = inputs.spot.ln() + (carry - 0.5 * sigma * sigma) * mean_t;
    let var = sigma * sigma * min_sums(&g.times).iter().sum::<f64>() / (n * n);
    let df = (-inputs.rate * inputs.expiry).exp();
    df * black_forward((mu + 0.5 * var).exp(), strike, var.sqrt(), option_type)
}

fn turnbull_wakeman(inputs: &AsianInputs, strike: f64, g: &GridMoments, option_type: OptionType) -> f64 {
    let total_var = (g.m2 / (g.m1 * g.m1)).ln().max(0.0);
    let df = (-inputs.rate * inputs.expiry).exp();
    df * black_forward(g.m1, strike, total_var.sqrt(), option_type)
}

fn curran(inputs: &AsianInputs, strike: f64, g: &GridMoments, option_type: OptionType) -> f64 {
    let sigma = inputs.volatility;
    let s2 = sigma * sigma;
    let carry = inputs.rate - inputs.dividend;
    let n = g.times.len() as f64;
    let df = (-inputs.rate * inputs.expiry).exp();

    let mus: Vec<f64> = g
        .times
        .iter()
        .map(|t| inputs.spot.ln() + (carry - 0.5 * s2) * t)
        .collect();
    let mu_g = mus.iter().sum::<f64>() / n;
    let covs: Vec<f64> = min_sums(&g.times).iter().map(|m| s2 * m / n).collect();
    let var_g = covs.iter().sum::<f64>() / n;
    if var_g < 1e-24 {
        return turnbull_wakeman(inputs, strike, g, option_type);
    }
    let sd_g = var_g.sqrt();

    let k_hat = 2.0 * strike
        - g.times
            .iter()
            .zip(mus.iter().zip(&covs))
            .map(|(t, (mu, cov))| {
                (mu + cov * (strike.ln() - mu_g) / var_g + 0.5 * (s2 * t - cov * cov / var_g)).exp()
            })
            .sum::<f64>()
            / n;
    if k_hat <= 0.0 {
        return turnbull_wakeman(inputs, strike, g, option_type);
    }

    let z = (mu_g - k_hat.ln()) / sd_g;
    let call = df
        * (g.times
            .iter()
            .zip(mus.iter().zip(&covs))
            .map(|(t, (mu, cov))| (mu + 0.5 * s2 * t).exp() * norm_cdf(z + cov / sd_g))
            .sum::<f64>()
            / n
            - strike * norm_cdf(z));
    match option_type {
        OptionType::Call => call.max(0.0),
        OptionType::Put => (call - df * (g.m1 - strike)).max(0.0),
    }
}

/// Value of an arithmetic-average Asian option.
///
/// # Errors
/// - `Expired` for negative time to expiry
/// - `MissingAccruedAverage` inside the window (or at expiry) without `A`
/// - `InvalidSpot`/`InvalidStrike`/`InvalidVolatility` for bad inputs
///
/// # Examples
/// ```
/// use pricer_models::analytical::{asian_price, AsianInputs, AsianMethod};
/// use pricer_models::instruments::OptionType;
///
/// let inputs = AsianInputs {
///     spot: 100.0, strike: 100.0, rate: 0.05, dividend: 0.0, volatility: 0.2,
///     averaging_start: 0.0, expiry: 1.0, observations: 12, accrued_average: None,
/// };
/// let tw = asian_price(&inputs, AsianMethod::TurnbullWakeman, OptionType::Call).unwrap();
/// let geo = asian_price(&inputs, AsianMethod::Geometric, OptionType::Call).unwrap();
/// assert!(geo < tw);
/// ```
pub fn asian_price(
    inputs: &AsianInputs,
    method: AsianMethod,
    option_type: OptionType,
) -> Result<f64, AnalyticalError> {
    let AsianInputs {
        spot,
        strike,
        volatility,
        averaging_start,
        expiry,
        observations,
        accrued_average,
        ..
    } = *inputs;
    if !(spot > 0.0) {
        return Err(AnalyticalError::InvalidSpot { spot });
    }
    if !(strike > 0.0) {
        return Err(AnalyticalError::InvalidStrike { strike });
    }
    if !(volatility >= 0.0) || !volatility.is_finite() {
        return Err(AnalyticalError::InvalidVolatility { volatility });
    }
    if expiry < 0.0 {
        return Err(AnalyticalError::Expired { expiry });
    }
    if observations == 0 {
        return Err(AnalyticalError::InvalidInput("no averaging observations".into()));
    }

    if expiry <= 1e-12 {
        let average = accrued_average.ok_or(AnalyticalError::MissingAccruedAverage)?;
        return Ok(option_type.intrinsic(average, strike));
    }

    let window = expiry - averaging_start;
    let carry = inputs.rate - inputs.dividend;
    if averaging_start >= 0.0 {
        let g = moments(spot, carry, volatility, grid(averaging_start, expiry, observations));
        return Ok(dispatch(inputs, strike, &g, method, option_type));
    }

    let average = accrued_average.ok_or(AnalyticalError::MissingAccruedAverage)?;
    let remaining = expiry / window;
    let n_rem = ((observations as f64 * remaining).round() as usize).max(1);
    let k_star = (strike - (1.0 - remaining) * average) / remaining;
    let g = moments(spot, carry, volatility, grid(0.0, expiry, n_rem));

    if k_star <= 0.0 {
        // Exercise certain for the call, worthless put.
        let df = (-inputs.rate * expiry).exp();
        return Ok(match option_type {
            OptionType::Call => remaining * df * (g.m1 - k_star),
            OptionType::Put => 0.0,
        });
    }
    Ok(remaining * dispatch(inputs, k_star, &g, method, option_type))
}

fn dispatch(
    inputs: &AsianInputs,
    strike: f64,
    g: &GridMoments,
    method: AsianMethod,
    option_type: OptionType,
) -> f64 {
    match method {
        AsianMethod::Geometric => geometric(inputs, strike, g, option_type),
        AsianMethod::TurnbullWakeman => turnbull_wakeman(inputs, strike, g, option_type),
        AsianMethod::Curran => curran(inputs, strike, g, option_type),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytical::BlackScholes;
    use approx::assert_relative_eq;

    fn base() -> AsianInputs {
        AsianInputs {
            spot: 100.0,
            strike: 100.0,
            rate: 0.05,
            dividend: 0.01,
            volatility: 0.25,
            averaging_start: 0.0,
            expiry: 1.0,
            observations: 52,
            accrued_average: None,
        }
    }

    const METHODS: [AsianMethod; 3] = [
        AsianMethod::Geometric,
        AsianMethod::TurnbullWakeman,
        AsianMethod::Curran,
    ];

    #[test]
    fn test_single_observation_is_european() {
        let mut inputs = base();
        inputs.observations = 1;
        let bs = BlackScholes::new(100.0, 0.05, 0.01, 0.25).unwrap();
        for method in METHODS {
            for ot in [OptionType::Call, OptionType::Put] {
                let v = asian_price(&inputs, method, ot).unwrap();
                assert_relative_eq!(v, bs.price(100.0, 1.0, ot), max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn test_ordering_and_agreement() {
        let inputs = base();
        let geo = asian_price(&inputs, AsianMethod::Geometric, OptionType::Call).unwrap();
        let tw = asian_price(&inputs, AsianMethod::TurnbullWakeman, OptionType::Call).unwrap();
        let cu = asian_price(&inputs, AsianMethod::Curran, OptionType::Call).unwrap();
        assert!(geo < tw && geo < cu);
        assert_relative_eq!(tw, cu, max_relative = 0.02);
    }

    #[test]
    fn test_put_call_parity_on_average() {
        let inputs = base();
        let g = moments(100.0, 0.04, 0.25, grid(0.0, 1.0, 52));
        let df = (-0.05_f64).exp();
        for method in [AsianMethod::TurnbullWakeman, AsianMethod::Curran] {
            let c = asian_price(&inputs, method, OptionType::Call).unwrap();
            let p = asian_price(&inputs, method, OptionType::Put).unwrap();
            assert_relative_eq!(c - p, df * (g.m1 - 100.0), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_expiry_with_accrued_average() {
        let mut inputs = base();
        inputs.averaging_start = -1.0;
        inputs.expiry = 0.0;
        assert!(matches!(
            asian_price(&inputs, AsianMethod::Curran, OptionType::Call),
            Err(AnalyticalError::MissingAccruedAverage)
        ));
        inputs.accrued_average = Some(104.0);
        for method in METHODS {
            assert_eq!(asian_price(&inputs, method, OptionType::Call).unwrap(), 4.0);
            assert_eq!(asian_price(&inputs, method, OptionType::Put).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_inside_window_requires_average() {
        let mut inputs = base();
        inputs.averaging_start = -0.5;
        inputs.expiry = 0.5;
        assert!(matches!(
            asian_price(&inputs, AsianMethod::TurnbullWakeman, OptionType::Call),
            Err(AnalyticalError::MissingAccruedAverage)
        ));
        inputs.accrued_average = Some(100.0);
        let v = asian_price(&inputs, AsianMethod::TurnbullWakeman, OptionType::Call).unwrap();
        assert!(v > 0.0);

        // Higher realised average makes the call dearer.
        inputs.accrued_average = Some(110.0);
        let higher = asian_price(&inputs, AsianMethod::TurnbullWakeman, OptionType::Call).unwrap();
        assert!(higher > v);
    }

    #[test]
    fn test_deep_accrued_average_is_certain_exercise() {
        let mut inputs = base();
        inputs.averaging_start = -0.9;
        inputs.expiry = 0.1;
        inputs.accrued_average = Some(300.0);
        let v = asian_price(&inputs, AsianMethod::Curran, OptionType::Call).unwrap();
        let p = asian_price(&inputs, AsianMethod::Curran, OptionType::Put).unwrap();
        assert!(v > 0.0);
        assert_eq!(p, 0.0);
    }

    #[test]
    fn test_forward_start_window() {
        let mut inputs = base();
        inputs.averaging_start = 0.5;
        inputs.expiry = 1.0;
        let v = asian_price(&inputs, AsianMethod::TurnbullWakeman, OptionType::Call).unwrap();
        assert!(v > 0.0);
    }

    #[test]
    fn test_errors() {
        let mut inputs = base();
        inputs.expiry = -0.1;
        assert!(matches!(
            asian_price(&inputs, AsianMethod::Geometric, OptionType::Call),
            Err(AnalyticalError::Expired { .. })
        ));
        let mut inputs = base();
        inputs.volatility = -0.1;
        assert!(asian_price(&inputs, AsianMethod::Geometric, OptionType::Call).is_err());
        assert!("bogus".parse::<AsianMethod>().is_err());
        assert_eq!("Curran".parse::<AsianMethod>().unwrap(), AsianMethod::Curran);
    }
}
