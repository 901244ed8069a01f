//! Floating-strike lookback options by simulation.
//!
//! The call pays `S_T − min S` and the put `max S − S_T`, with the extremum
//! taken over the running value and the monitored grid.

use pricer_core::types::PricingError;
use pricer_models::instruments::OptionType;

use super::PathObserver;
use crate::mc::{sample_path, simulate, GbmParams, McResult, MonteCarloConfig, TimeGrid};

/// Inputs of a floating-strike lookback, per unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LookbackInputs {
    /// Spot.
    pub spot: f64,
    /// Minimum (call) or maximum (put) observed so far; spot when absent.
    pub running_extreme: Option<f64>,
    /// Continuously compounded risk-free rate.
    pub rate: f64,
    /// Continuous dividend yield.
    pub dividend: f64,
    /// Volatility.
    pub volatility: f64,
    /// Years to expiry.
    pub expiry: f64,
    /// Monitoring steps per year.
    pub steps_per_year: u32,
}

/// Floating-strike lookback value.
///
/// # Errors
/// `InvalidMarketData` for a running extreme on the wrong side of spot;
/// `ExpiredInstrument` for a non-positive expiry.
pub fn lookback_mc(
    inputs: &LookbackInputs,
    option_type: OptionType,
    config: &MonteCarloConfig,
) -> Result<McResult, PricingError> {
    let s = inputs.spot;
    if !(s > 0.0) || !(inputs.volatility >= 0.0) {
        return Err(PricingError::InvalidMarketData(format!(
            "lookback spot {s}, volatility {}",
            inputs.volatility
        )));
    }
    if !(inputs.expiry > 0.0) {
        return Err(PricingError::ExpiredInstrument(format!("lookback expiry {}", inputs.expiry)));
    }
    let extreme = inputs.running_extreme.unwrap_or(s);
    let wrong_side = match option_type {
        OptionType::Call => extreme > s,
        OptionType::Put => extreme < s,
    };
    if wrong_side {
        return Err(PricingError::InvalidMarketData(format!(
            "running extreme {extreme} on the wrong side of spot {s}"
        )));
    }

    let steps = ((inputs.expiry * f64::from(inputs.steps_per_year.max(1))).round() as usize).max(1);
    let grid = TimeGrid::uniform(inputs.expiry, steps)?;
    let params = GbmParams::new(s, inputs.rate, inputs.dividend, inputs.volatility);
    let df = (-inputs.rate * inputs.expiry).exp();
    let payoff = |path: &[f64]| {
        let obs = PathObserver::from_path(path);
        df * match option_type {
            OptionType::Call => obs.terminal() - obs.minimum().min(extreme),
            OptionType::Put => obs.maximum().max(extreme) - obs.terminal(),
        }
    };
    Ok(simulate(config, |rng| {
        sample_path(&params, &grid, config.antithetic(), rng, payoff)
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_models::analytical::lookback_floating_price;

    fn inputs() -> LookbackInputs {
        LookbackInputs {
            spot: 100.0,
            running_extreme: None,
            rate: 0.05,
            dividend: 0.0,
            volatility: 0.3,
            expiry: 0.5,
            steps_per_year: 5000,
        }
    }

    #[test]
    fn test_approaches_continuous_from_below() {
        let config = MonteCarloConfig::builder().n_paths(10_000).seed(12).build().unwrap();
        for ot in [OptionType::Call, OptionType::Put] {
            let cf = lookback_floating_price(100.0, 100.0, 0.5, 0.05, 0.0, 0.3, ot).unwrap();
            let mc = lookback_mc(&inputs(), ot, &config).unwrap();
            assert!(mc.price < cf + 4.0 * mc.std_error, "{ot}: mc {} cf {cf}", mc.price);
            assert!(mc.price > 0.95 * cf, "{ot}: mc {} cf {cf}", mc.price);
        }
    }

    #[test]
    fn test_running_extreme_side() {
        let config = MonteCarloConfig::default();
        let bad = LookbackInputs {
            running_extreme: Some(110.0),
            ..inputs()
        };
        assert!(lookback_mc(&bad, OptionType::Call, &config).is_err());
        assert!(lookback_mc(&bad, OptionType::Put, &config).is_ok());
    }
}
