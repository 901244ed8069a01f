//! Arithmetic Asian options by simulation.
//!
//! Observations sit on the same uniform grid the closed forms assume. Once
//! averaging has started, the realised average `A` covers the elapsed
//! share of the window and the simulated observations the remainder.

use pricer_core::types::PricingError;
use pricer_models::analytical::AsianInputs;
use pricer_models::instruments::OptionType;

use super::PathObserver;
use crate::mc::{sample_path, simulate, GbmParams, McResult, MonteCarloConfig, TimeGrid};

/// Arithmetic-average fixed-strike Asian value.
///
/// # Errors
/// - `InsufficientInput` inside the window without an accrued average
/// - `ExpiredInstrument` for a negative expiry
/// - `InvalidMarketData` for non-positive spot or strike
pub fn asian_mc(
    inputs: &AsianInputs,
    option_type: OptionType,
    config: &MonteCarloConfig,
) -> Result<McResult, PricingError> {
    let AsianInputs {
        spot,
        strike,
        rate,
        dividend,
        volatility,
        averaging_start,
        expiry,
        observations,
        accrued_average,
    } = *inputs;
    if !(spot > 0.0) || !(strike > 0.0) || !(volatility >= 0.0) {
        return Err(PricingError::InvalidMarketData(format!(
            "asian spot {spot}, strike {strike}, volatility {volatility}"
        )));
    }
    if expiry < 0.0 {
        return Err(PricingError::ExpiredInstrument(format!("asian expiry {expiry}")));
    }
    if observations == 0 {
        return Err(PricingError::InsufficientInput("no averaging observations".into()));
    }
    let missing = || PricingError::InsufficientInput("averaging has started but no accrued average".into());

    if expiry <= 1e-12 {
        let average = accrued_average.ok_or_else(missing)?;
        return Ok(McResult {
            price: option_type.intrinsic(average, strike),
            std_error: 0.0,
            n_paths: 0,
        });
    }

    let (start, n, realised, weight) = if averaging_start >= 0.0 {
        (averaging_start, observations, 0.0, 1.0)
    } else {
        let average = accrued_average.ok_or_else(missing)?;
        let remaining = expiry / (expiry - averaging_start);
        let n_rem = ((observations as f64 * remaining).round() as usize).max(1);
        (0.0, n_rem, (1.0 - remaining) * average, remaining)
    };
    let step = (expiry - start) / n as f64;
    let grid = TimeGrid::new((1..=n).map(|i| start + step * i as f64).collect())?;
    let params = GbmParams::new(spot, rate, dividend, volatility);
    let df = (-rate * expiry).exp();
    let payoff = |path: &[f64]| {
        let average = realised + weight * PathObserver::from_path(path).arithmetic_average();
        df * option_type.intrinsic(average, strike)
    };
    Ok(simulate(config, |rng| {
        sample_path(&params, &grid, config.antithetic(), rng, payoff)
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_models::analytical::{asian_price, AsianMethod};

    fn inputs() -> AsianInputs {
        AsianInputs {
            spot: 100.0,
            strike: 100.0,
            rate: 0.05,
            dividend: 0.0,
            volatility: 0.2,
            averaging_start: 0.0,
            expiry: 1.0,
            observations: 12,
            accrued_average: None,
        }
    }

    fn config() -> MonteCarloConfig {
        MonteCarloConfig::builder().n_paths(40_000).seed(7).build().unwrap()
    }

    #[test]
    fn test_close_to_curran() {
        let cf = asian_price(&inputs(), AsianMethod::Curran, OptionType::Call).unwrap();
        let mc = asian_mc(&inputs(), OptionType::Call, &config()).unwrap();
        assert!((mc.price - cf).abs() < 4.0 * mc.std_error + 0.01 * cf, "mc {} cf {}", mc.price, cf);
    }

    #[test]
    fn test_in_window_uses_accrued_average() {
        let started = AsianInputs {
            averaging_start: -0.5,
            expiry: 0.5,
            accrued_average: Some(104.0),
            ..inputs()
        };
        let cf = asian_price(&started, AsianMethod::TurnbullWakeman, OptionType::Put).unwrap();
        let mc = asian_mc(&started, OptionType::Put, &config()).unwrap();
        assert!((mc.price - cf).abs() < 4.0 * mc.std_error + 0.05, "mc {} cf {}", mc.price, cf);

        let missing = AsianInputs {
            accrued_average: None,
            ..started
        };
        assert!(matches!(
            asian_mc(&missing, OptionType::Put, &config()),
            Err(PricingError::InsufficientInput(_))
        ));
    }

    #[test]
    fn test_at_expiry_is_intrinsic() {
        let done = AsianInputs {
            averaging_start: -1.0,
            expiry: 0.0,
            accrued_average: Some(107.0),
            ..inputs()
        };
        assert_eq!(asian_mc(&done, OptionType::Call, &config()).unwrap().price, 7.0);
    }
}
