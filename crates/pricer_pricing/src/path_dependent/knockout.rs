//! Knockout options by simulation.
//!
//! Cross-check for the closed form: the barrier is monitored on the grid
//! the contract monitors on, so no continuity correction is needed. A path
//! that touches the barrier pays the rebate at expiry; a surviving path
//! pays the vanilla intrinsic value.

use pricer_core::types::PricingError;
use pricer_models::analytical::{BarrierMonitoring, KnockoutInputs};
use pricer_models::instruments::OptionType;

use crate::mc::{sample_path, simulate, GbmParams, McResult, MonteCarloConfig, TimeGrid};

/// Monitoring steps for continuous barriers.
const CONTINUOUS_STEPS_PER_YEAR: f64 = 2520.0;

fn monitoring_grid(expiry: f64, monitoring: BarrierMonitoring) -> Result<TimeGrid, PricingError> {
    let per_year = match monitoring {
        BarrierMonitoring::Continuous => CONTINUOUS_STEPS_PER_YEAR,
        other => 1.0 / other.interval(),
    };
    let steps = ((expiry * per_year).round() as usize).max(1);
    Ok(TimeGrid::uniform(expiry, steps)?)
}

/// Up-and-out call (`Call`) or down-and-out put (`Put`), per unit.
///
/// # Errors
/// `InvalidMarketData` for non-positive spot, strike or barrier or a
/// negative volatility; `ExpiredInstrument` for a non-positive expiry.
///
/// # Examples
///
/// ```rust
/// use pricer_models::analytical::{BarrierMonitoring, KnockoutInputs};
/// use pricer_models::instruments::OptionType;
/// use pricer_pricing::mc::MonteCarloConfig;
/// use pricer_pricing::path_dependent::knockout_mc;
///
/// let inputs = KnockoutInputs {
///     spot: 5.5, strike: 5.3, barrier: 5.5, rebate: 0.2,
///     rate: 0.02, dividend: 0.0, volatility: 0.1, expiry: 0.25,
///     monitoring: BarrierMonitoring::Daily,
/// };
/// let r = knockout_mc(&inputs, OptionType::Call, &MonteCarloConfig::default()).unwrap();
/// assert!((r.price - 0.2 * (-0.005f64).exp()).abs() < 1e-12);
/// ```
pub fn knockout_mc(
    inputs: &KnockoutInputs,
    option_type: OptionType,
    config: &MonteCarloConfig,
) -> Result<McResult, PricingError> {
    let KnockoutInputs {
        spot,
        strike,
        barrier,
        rebate,
        rate,
        dividend,
        volatility,
        expiry,
        monitoring,
    } = *inputs;
    if !(spot > 0.0) || !(strike > 0.0) || !(barrier > 0.0) {
        return Err(PricingError::InvalidMarketData(format!(
            "knockout spot {spot}, strike {strike}, barrier {barrier}"
        )));
    }
    if !(volatility >= 0.0) {
        return Err(PricingError::InvalidMarketData(format!("volatility {volatility}")));
    }
    if !(expiry > 0.0) {
        return Err(PricingError::ExpiredInstrument(format!("knockout expiry {expiry}")));
    }

    let df = (-rate * expiry).exp();
    let is_up = option_type.is_call();
    let knocked = move |s: f64| if is_up { s >= barrier } else { s <= barrier };
    if knocked(spot) {
        return Ok(McResult {
            price: rebate * df,
            std_error: 0.0,
            n_paths: 0,
        });
    }

    let grid = monitoring_grid(expiry, monitoring)?;
    let params = GbmParams::new(spot, rate, dividend, volatility);
    let payoff = |path: &[f64]| {
        if path.iter().any(|&s| knocked(s)) {
            rebate * df
        } else {
            option_type.intrinsic(path[path.len() - 1], strike) * df
        }
    };
    Ok(simulate(config, |rng| {
        sample_path(&params, &grid, config.antithetic(), rng, payoff)
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pricer_models::analytical::knockout_price;

    fn inputs() -> KnockoutInputs {
        KnockoutInputs {
            spot: 100.0,
            strike: 100.0,
            barrier: 125.0,
            rebate: 0.0,
            rate: 0.03,
            dividend: 0.0,
            volatility: 0.2,
            expiry: 0.5,
            monitoring: BarrierMonitoring::Daily,
        }
    }

    fn config() -> MonteCarloConfig {
        MonteCarloConfig::builder().n_paths(40_000).seed(2021).build().unwrap()
    }

    #[test]
    fn test_matches_closed_form() {
        let cf = knockout_price(&inputs(), OptionType::Call).unwrap();
        let mc = knockout_mc(&inputs(), OptionType::Call, &config()).unwrap();
        assert!((mc.price - cf).abs() < 4.0 * mc.std_error + 0.02 * cf, "mc {} cf {}", mc.price, cf);
    }

    #[test]
    fn test_down_and_out_put_with_rebate() {
        let i = KnockoutInputs {
            barrier: 85.0,
            rebate: 2.0,
            ..inputs()
        };
        let cf = knockout_price(&i, OptionType::Put).unwrap();
        let mc = knockout_mc(&i, OptionType::Put, &config()).unwrap();
        assert!((mc.price - cf).abs() < 4.0 * mc.std_error + 0.02 * cf, "mc {} cf {}", mc.price, cf);
    }

    #[test]
    fn test_knocked_at_start_pays_rebate() {
        let i = KnockoutInputs {
            spot: 130.0,
            rebate: 1.5,
            ..inputs()
        };
        let mc = knockout_mc(&i, OptionType::Call, &config()).unwrap();
        assert_relative_eq!(mc.price, 1.5 * (-0.015f64).exp());
    }

    #[test]
    fn test_expired_rejected() {
        let i = KnockoutInputs {
            expiry: 0.0,
            ..inputs()
        };
        assert!(matches!(
            knockout_mc(&i, OptionType::Call, &config()),
            Err(PricingError::ExpiredInstrument(_))
        ));
    }
}
