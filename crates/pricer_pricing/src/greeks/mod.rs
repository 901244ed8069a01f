//! Bump-and-revalue greeks over instrument views.
//!
//! Every greek is a finite difference of [`Pricer::price`] over
//! [`InstrumentView`]s carrying one [`Override`]; the instrument itself is
//! never modified, so greeks of the same instrument can run on several
//! threads at once.
//!
//! | Greek | Equity / FX | Bonds |
//! |-------|-------------|-------|
//! | Delta, Gamma | relative spot bump | parallel curve bump |
//! | Vega | volatility shift | price volatility (bond options only) |
//! | Rho | parallel curve bump | parallel curve bump |
//! | RhoQ | dividend yield / foreign rate | n/a |
//! | Theta | valuation date, business days | valuation date, business days |
//!
//! First-order greeks use central differences,
//! `(P(x+h) − P(x−h)) / 2h`; gamma uses `(P(x+h) − 2P(x) + P(x−h)) / h²`.
//! Theta is one-sided: `(P(d') − P(d)) / ((d' − d) / 365)` where `d'` lies
//! `theta_days` business days after `d` on the instrument's calendar, or
//! before it when `d'` would fall on expiry.
//! A failed revaluation aborts the greek.

mod config;
mod result;

pub use config::BumpConfig;
pub use result::GreeksResult;

use pricer_core::types::{Calendar, PricingError};
use pricer_models::instruments::{AssetClass, Instrument};
use tracing::debug;

use crate::market::MarketDataProvider;
use crate::measure::RiskMeasure;
use crate::pricers::{InstrumentView, Override, Pricer};

/// Order of a finite difference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    /// Central first difference.
    First,
    /// Central second difference.
    Second,
}

/// Market input a greek bumps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BumpTarget {
    /// Every spot, multiplicatively; the step is a relative move.
    Spot,
    /// Volatility, additively.
    Volatility,
    /// Parallel shift of the discount curve.
    Rate,
    /// Dividend yield, or the foreign rate for FX.
    Dividend,
}

impl BumpTarget {
    fn shift(self, step: f64) -> Override {
        match self {
            BumpTarget::Spot => Override::SpotScale(1.0 + step),
            BumpTarget::Volatility => Override::VolatilityShift(step),
            BumpTarget::Rate => Override::RateShift(step),
            BumpTarget::Dividend => Override::DividendShift(step),
        }
    }
}

/// Finite difference of the price of `view` in `target`.
///
/// For [`BumpTarget::Spot`] the derivative is taken in the relative move,
/// so dividing by the spot (squared for [`Order::Second`]) gives dV/dS.
///
/// # Examples
/// ```
/// use pricer_core::types::Date;
/// use pricer_models::instruments::{CurveRef, EuropeanOption, Instrument, MarketAttributes, OptionType};
/// use pricer_pricing::context::PricingContext;
/// use pricer_pricing::greeks::{greek, BumpTarget, Order};
/// use pricer_pricing::market::InMemoryMarketData;
/// use pricer_pricing::pricers::{InstrumentView, Pricer};
///
/// let call = Instrument::European(
///     EuropeanOption::new("600000.SH", 100.0, Date::from_ymd(2022, 8, 13).unwrap(), OptionType::Call)
///         .with_curve(CurveRef::Flat(0.05))
///         .with_market(MarketAttributes::default().with_spot(100.0).with_volatility(0.2)),
/// );
/// let market = InMemoryMarketData::new();
/// let ctx = PricingContext::at(Date::from_ymd(2021, 8, 13).unwrap());
/// let pricer = Pricer::new(&market, &ctx);
/// let vega = greek(&pricer, &InstrumentView::new(&call), BumpTarget::Volatility, 1e-4, Order::First).unwrap();
/// assert!((vega - 37.524).abs() < 1e-2);
/// ```
pub fn greek<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    view: &InstrumentView<'_>,
    target: BumpTarget,
    bump: f64,
    order: Order,
) -> Result<f64, PricingError> {
    if !(bump.is_finite() && bump > 0.0) {
        return Err(PricingError::InvalidConfiguration(format!("bump must be positive, got {bump}")));
    }
    let up = pricer.price(&view.with(target.shift(bump)))?;
    let down = pricer.price(&view.with(target.shift(-bump)))?;
    match order {
        Order::First => Ok(central(up, down, bump)),
        Order::Second => Ok(convexity(up, pricer.price(view)?, down, bump)),
    }
}

/// Theta of `view`: price change per year as the valuation date moves
/// forward by the configured number of business days.
///
/// Market data stays as of the context's date. When the forward roll
/// reaches expiry the difference is taken backwards over the same number
/// of business days instead.
pub fn theta<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    view: &InstrumentView<'_>,
) -> Result<f64, PricingError> {
    let today = pricer.valuation_date(view);
    let days = i64::from(pricer.bump_config().theta_days);
    let cal = calendar(view.instrument());
    let now = pricer.price(view)?;
    let next = cal.add_business_days(today, days)?;
    match pricer.calc_view(&view.with(Override::PricingDate(next)), RiskMeasure::Price) {
        Ok(later) => {
            debug!(from = %today, to = %next, "theta revaluation");
            Ok((later - now) / ((next - today) as f64 / 365.0))
        }
        Err(PricingError::ExpiredInstrument(_)) => {
            let prev = cal.add_business_days(today, -days)?;
            let earlier = pricer.calc_view(&view.with(Override::PricingDate(prev)), RiskMeasure::Price)?;
            debug!(from = %prev, to = %today, "theta revaluation, backward at expiry");
            Ok((now - earlier) / ((today - prev) as f64 / 365.0))
        }
        Err(e) => Err(e),
    }
}

/// One greek of a view.
pub(crate) fn greek_measure<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    view: &InstrumentView<'_>,
    measure: RiskMeasure,
) -> Result<f64, PricingError> {
    let value = match measure {
        RiskMeasure::Theta => theta(pricer, view)?,
        RiskMeasure::Gamma => {
            let d = driver(pricer, view, RiskMeasure::Gamma)?;
            greek(pricer, view, d.target, d.bump, Order::Second)? / (d.scale * d.scale)
        }
        RiskMeasure::Delta | RiskMeasure::Vega | RiskMeasure::Rho | RiskMeasure::RhoQ => {
            let d = driver(pricer, view, measure)?;
            greek(pricer, view, d.target, d.bump, Order::First)? / d.scale
        }
        other => {
            return Err(PricingError::UnsupportedOperation(format!("{other} is not a greek")));
        }
    };
    Ok(value)
}

/// Price and every greek that applies to the instrument.
///
/// Delta and gamma share their two bumped revaluations.
pub(crate) fn all_greeks<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    view: &InstrumentView<'_>,
) -> Result<GreeksResult, PricingError> {
    let price = pricer.price(view)?;
    let mut result = GreeksResult::new(price);

    let d = driver(pricer, view, RiskMeasure::Delta)?;
    let up = pricer.price(&view.with(d.target.shift(d.bump)))?;
    let down = pricer.price(&view.with(d.target.shift(-d.bump)))?;
    result.delta = Some(central(up, down, d.bump) / d.scale);
    result.gamma = Some(convexity(up, price, down, d.bump) / (d.scale * d.scale));

    let first = |measure| -> Result<Option<f64>, PricingError> {
        match applicable(driver(pricer, view, measure))? {
            Some(d) => Ok(Some(greek(pricer, view, d.target, d.bump, Order::First)? / d.scale)),
            None => Ok(None),
        }
    };
    result.vega = first(RiskMeasure::Vega)?;
    result.rho = first(RiskMeasure::Rho)?;
    result.rho_q = first(RiskMeasure::RhoQ)?;
    result.theta = Some(theta(pricer, view)?);

    debug!(
        instrument = view.instrument().name(),
        price,
        delta = result.delta,
        vega = result.vega,
        "greeks"
    );
    Ok(result)
}

/// What a greek bumps, by how much, and the factor turning the raw
/// difference into the reported sensitivity.
struct Driver {
    target: BumpTarget,
    bump: f64,
    scale: f64,
}

fn driver<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    view: &InstrumentView<'_>,
    measure: RiskMeasure,
) -> Result<Driver, PricingError> {
    let instrument = view.instrument();
    let bumps = pricer.bump_config();
    let bond = instrument.asset_class() == AssetClass::Bond;
    let unsupported = || {
        Err(PricingError::UnsupportedOperation(format!(
            "{measure} of {}",
            instrument.name()
        )))
    };
    let rate = Driver {
        target: BumpTarget::Rate,
        bump: bumps.rate(),
        scale: 1.0,
    };
    match measure {
        RiskMeasure::Delta | RiskMeasure::Gamma if bond => Ok(rate),
        RiskMeasure::Delta | RiskMeasure::Gamma => {
            // A basket has no single spot; its delta is per unit relative move.
            let scale = match instrument {
                Instrument::BasketSnowball(_) => 1.0,
                _ => pricer.spot(view)?,
            };
            Ok(Driver {
                target: BumpTarget::Spot,
                bump: bumps.spot_relative,
                scale,
            })
        }
        RiskMeasure::Vega => match instrument {
            Instrument::FxForward(_) => unsupported(),
            Instrument::BondOption(_) => Ok(Driver {
                target: BumpTarget::Volatility,
                bump: bumps.volatility,
                scale: 1.0,
            }),
            _ if bond => unsupported(),
            _ => Ok(Driver {
                target: BumpTarget::Volatility,
                bump: bumps.volatility,
                scale: 1.0,
            }),
        },
        RiskMeasure::Rho => Ok(rate),
        RiskMeasure::RhoQ if bond => unsupported(),
        RiskMeasure::RhoQ => Ok(Driver {
            target: BumpTarget::Dividend,
            bump: bumps.dividend,
            scale: 1.0,
        }),
        _ => unsupported(),
    }
}

/// Turns `UnsupportedOperation` into `None`.
fn applicable<T>(result: Result<T, PricingError>) -> Result<Option<T>, PricingError> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(PricingError::UnsupportedOperation(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Business-day calendar theta rolls on.
fn calendar(instrument: &Instrument) -> Calendar {
    match instrument {
        Instrument::Snowball(s) => s.schedule.calendar.clone(),
        Instrument::BasketSnowball(b) => b.schedule.calendar.clone(),
        Instrument::FxVanilla(o) => o.pair.calendar(),
        Instrument::FxForward(f) => f.pair.calendar(),
        Instrument::FxDigital(d) => d.pair.calendar(),
        Instrument::FxQuantoDigital(q) => q.digital.pair.calendar(),
        Instrument::FxQuantoRangeAccrual(r) => r.pair.calendar(),
        Instrument::FixedBond(b) => b.terms.calendar.clone(),
        Instrument::FloatingBond(b) => b.terms.calendar.clone(),
        Instrument::AdvanceRedemption(b) => b.terms.calendar.clone(),
        Instrument::PutableBond(b) => b.terms.calendar.clone(),
        Instrument::BondOption(o) => o.bond.terms.calendar.clone(),
        Instrument::European(_)
        | Instrument::American(_)
        | Instrument::Asian(_)
        | Instrument::Knockout(_)
        | Instrument::Lookback(_) => Calendar::China,
    }
}

#[inline]
fn central(up: f64, down: f64, bump: f64) -> f64 {
    (up - down) / (2.0 * bump)
}

#[inline]
fn convexity(up: f64, mid: f64, down: f64, bump: f64) -> f64 {
    (up - 2.0 * mid + down) / (bump * bump)
}
