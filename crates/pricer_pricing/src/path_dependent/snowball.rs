//! Snowball autocallables by simulation.
//!
//! Per path the underlying is stepped over a business-day grid. Knock-out
//! is checked on the observation steps only; knock-in on every step.
//!
//! | Path outcome | Payment (per unit notional) |
//! |---|---|
//! | knocked out at observation k | coupon_k at t_k |
//! | never knocked in | maturity coupon at T |
//! | knocked in, never out | knock-in loss on S_T at T |
//!
//! The worst-of basket variant replaces the price with the worst
//! performance `min_i S_i / S0_i` and the barriers with ratios.

use pricer_core::types::PricingError;
use pricer_models::instruments::KnockInPayoff;

use crate::mc::{
    cholesky, generate_antithetic_paths, generate_correlated_antithetic_paths, generate_gbm_path, simulate,
    GbmParams, McResult, MonteCarloConfig, TimeGrid,
};
use crate::rng::PricerRng;

/// A knock-out observation on the simulation grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KnockOutObservation {
    /// Grid index of the observation.
    pub step: usize,
    /// Coupon paid on knock-out, per unit notional.
    pub coupon: f64,
    /// Discount factor to the observation date.
    pub discount: f64,
}

/// Contract features shared by the single-name and basket kernels.
#[derive(Clone, Debug, PartialEq)]
pub struct SnowballLegs {
    /// Simulation grid.
    pub grid: TimeGrid,
    /// Remaining knock-out observations, ascending.
    pub observations: Vec<KnockOutObservation>,
    /// Coupon paid at maturity if never knocked in.
    pub maturity_coupon: f64,
    /// Discount factor to maturity.
    pub maturity_discount: f64,
    /// Loss profile once knocked in.
    pub knock_in: KnockInPayoff,
    /// Whether the knock-in has already happened.
    pub knocked_in: bool,
}

impl SnowballLegs {
    fn validate(&self) -> Result<(), PricingError> {
        let last = self.grid.len();
        if self.observations.iter().any(|o| o.step >= last) {
            return Err(PricingError::InvalidConfiguration(
                "knock-out observation beyond the simulation grid".into(),
            ));
        }
        Ok(())
    }

    /// Payoff on a path of levels (prices or worst performances).
    fn payoff(&self, levels: &[f64], knock_out: f64, knock_in: f64, reference: f64) -> f64 {
        for obs in &self.observations {
            if levels[obs.step] >= knock_out {
                return obs.coupon * obs.discount;
            }
        }
        let hit = self.knocked_in || levels.iter().any(|&s| s <= knock_in);
        let terminal = levels[levels.len() - 1];
        let amount = if hit {
            self.knock_in.loss(terminal, reference)
        } else {
            self.maturity_coupon
        };
        amount * self.maturity_discount
    }
}

/// Single-name snowball inputs.
#[derive(Clone, Debug, PartialEq)]
pub struct SnowballInputs {
    /// Underlying dynamics.
    pub params: GbmParams,
    /// Reference price for the knock-in loss.
    pub initial_price: f64,
    /// Knock-out barrier level.
    pub knock_out_barrier: f64,
    /// Knock-in barrier level.
    pub knock_in_barrier: f64,
    /// Schedule-dependent legs.
    pub legs: SnowballLegs,
}

/// Single-name snowball value per unit notional.
///
/// # Errors
/// `InvalidMarketData` for bad dynamics; `InvalidConfiguration` for
/// observations off the grid.
///
/// # Examples
///
/// ```rust
/// use pricer_models::instruments::KnockInPayoff;
/// use pricer_pricing::mc::{GbmParams, MonteCarloConfig, TimeGrid};
/// use pricer_pricing::path_dependent::{snowball_mc, KnockOutObservation, SnowballInputs, SnowballLegs};
///
/// let inputs = SnowballInputs {
///     params: GbmParams::new(1.0, 0.02, 0.0, 0.0),
///     initial_price: 1.0,
///     knock_out_barrier: 1.5,
///     knock_in_barrier: 0.5,
///     legs: SnowballLegs {
///         grid: TimeGrid::uniform(1.0, 12).unwrap(),
///         observations: vec![KnockOutObservation { step: 11, coupon: 0.2, discount: 0.98 }],
///         maturity_coupon: 0.2,
///         maturity_discount: 0.98,
///         knock_in: KnockInPayoff::Return,
///         knocked_in: false,
///     },
/// };
/// let r = snowball_mc(&inputs, &MonteCarloConfig::default()).unwrap();
/// assert!((r.price - 0.196).abs() < 1e-12);
/// ```
pub fn snowball_mc(inputs: &SnowballInputs, config: &MonteCarloConfig) -> Result<McResult, PricingError> {
    inputs
        .params
        .validate()
        .map_err(|e| PricingError::InvalidMarketData(e.to_string()))?;
    inputs.legs.validate()?;
    let legs = &inputs.legs;
    let payoff = |path: &[f64]| {
        legs.payoff(
            path,
            inputs.knock_out_barrier,
            inputs.knock_in_barrier,
            inputs.initial_price,
        )
    };
    Ok(simulate(config, |rng: &mut PricerRng| {
        if config.antithetic() {
            let pair = generate_antithetic_paths(&inputs.params, &legs.grid, rng);
            0.5 * (payoff(&pair.up) + payoff(&pair.down))
        } else {
            payoff(&generate_gbm_path(&inputs.params, &legs.grid, rng))
        }
    })?)
}

/// Worst-of basket snowball inputs.
#[derive(Clone, Debug, PartialEq)]
pub struct BasketSnowballInputs {
    /// Per-name dynamics.
    pub params: Vec<GbmParams>,
    /// Per-name reference prices.
    pub initial_prices: Vec<f64>,
    /// Correlation matrix of the log-returns.
    pub correlation: Vec<Vec<f64>>,
    /// Knock-out level on the worst performance.
    pub knock_out_ratio: f64,
    /// Knock-in level on the worst performance.
    pub knock_in_ratio: f64,
    /// Schedule-dependent legs.
    pub legs: SnowballLegs,
}

/// Worst-of basket snowball value per unit notional.
///
/// The knock-in loss is applied to the worst performance with reference 1,
/// so strikes in the payoff are ratios of the initial prices.
///
/// # Errors
/// `InvalidMarketData` for bad dynamics or a correlation matrix that is
/// not positive definite.
pub fn basket_snowball_mc(inputs: &BasketSnowballInputs, config: &MonteCarloConfig) -> Result<McResult, PricingError> {
    let n = inputs.params.len();
    if n == 0 || inputs.initial_prices.len() != n {
        return Err(PricingError::InvalidConfiguration(format!(
            "basket of {n} names with {} initial prices",
            inputs.initial_prices.len()
        )));
    }
    for p in &inputs.params {
        p.validate().map_err(|e| PricingError::InvalidMarketData(e.to_string()))?;
    }
    let factor = cholesky(&inputs.correlation).map_err(|e| PricingError::InvalidMarketData(e.to_string()))?;
    inputs.legs.validate()?;
    let legs = &inputs.legs;

    let worst = |paths: &[Vec<f64>]| -> Vec<f64> {
        (0..legs.grid.len())
            .map(|k| {
                paths
                    .iter()
                    .zip(&inputs.initial_prices)
                    .map(|(p, s0)| p[k] / s0)
                    .fold(f64::INFINITY, f64::min)
            })
            .collect()
    };
    let payoff = |paths: &[Vec<f64>]| legs.payoff(&worst(paths), inputs.knock_out_ratio, inputs.knock_in_ratio, 1.0);

    Ok(simulate(config, |rng: &mut PricerRng| {
        let (up, down) = generate_correlated_antithetic_paths(&inputs.params, &factor, &legs.grid, rng);
        if config.antithetic() {
            0.5 * (payoff(&up) + payoff(&down))
        } else {
            payoff(&up)
        }
    })?)
}
