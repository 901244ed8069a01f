//! Equity option pricing: closed forms, the CRR tree and the path kernels.

use pricer_core::market_data::ZeroCurve;
use pricer_core::types::{Date, DayCountConvention, PricingError};
use pricer_models::analytical::{asian_price, bs_value, knockout_price, AsianInputs, KnockoutInputs, PremiumQuote};
use pricer_models::instruments::{
    BasketSnowball, EuropeanOption, Instrument, KnockInPayoff, MarketAttributes, Snowball, SnowballSchedule,
};
use tracing::debug;

use super::{forward_discount, implied_rate, non_negative_volatility, positive, InstrumentView, Pricer};
use crate::context::MarketObject;
use crate::lattice::{american_price, LatticeInputs};
use crate::market::{historical_volatility, MarketDataProvider};
use crate::mc::{GbmParams, TimeGrid};
use crate::path_dependent::{
    asian_mc, basket_snowball_mc, lookback_mc, snowball_mc, BasketSnowballInputs, KnockOutObservation,
    LookbackInputs, SnowballInputs, SnowballLegs,
};

/// Calendar days of history behind a fallback volatility.
const HISTORY_DAYS: i64 = 365;

/// Monitoring frequency of lookback extrema.
const LOOKBACK_STEPS_PER_YEAR: u32 = 252;

/// What the equity pricers need to know about an underlying.
struct Underlying<'s> {
    symbol: &'s str,
    expiry: Date,
    dividend_yield: f64,
    pinned: MarketAttributes,
}

/// Black-Scholes inputs from the valuation date to expiry.
struct BlackInputs {
    spot: f64,
    rate: f64,
    dividend: f64,
    volatility: f64,
    expiry: f64,
}

fn year_fraction(from: Date, to: Date) -> f64 {
    DayCountConvention::Actual365Fixed.year_frac(from, to).fraction
}

fn base_volatility<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    symbol: &str,
    pinned: Option<f64>,
) -> Result<f64, PricingError> {
    if let Some(v) = pinned.or_else(|| pricer.context().value(MarketObject::Volatility, symbol)) {
        return Ok(v);
    }
    let end = pricer.market_date();
    let start = end.add_days(-HISTORY_DAYS)?;
    let series = pricer.market().historical_stock_price(symbol, start, end)?;
    let v = historical_volatility(&series)?;
    debug!(symbol, volatility = v, observations = series.len(), "historical volatility");
    Ok(v)
}

fn volatility<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    view: &InstrumentView<'_>,
    symbol: &str,
    pinned: Option<f64>,
) -> Result<f64, PricingError> {
    let base = match view.volatility() {
        Some(v) => v,
        None => base_volatility(pricer, symbol, pinned)?,
    };
    non_negative_volatility(view.apply_volatility(base))
}

fn dividend<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    view: &InstrumentView<'_>,
    symbol: &str,
    terms: f64,
) -> f64 {
    pricer
        .context()
        .value(MarketObject::DividendYield, symbol)
        .unwrap_or(terms)
        + view.dividend_shift()
}

fn black_inputs<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    view: &InstrumentView<'_>,
    u: &Underlying<'_>,
) -> Result<BlackInputs, PricingError> {
    let valuation = pricer.valuation_date(view);
    let expiry = year_fraction(valuation, u.expiry);
    let curve = pricer.discount_curve(view)?;
    let rate = implied_rate(forward_discount(&curve, valuation, u.expiry)?, expiry);
    let spot = positive("spot", view.apply_spot(pricer.base_spot(u.symbol, u.pinned.spot, false)?))?;
    Ok(BlackInputs {
        spot,
        rate,
        dividend: dividend(pricer, view, u.symbol, u.dividend_yield),
        volatility: volatility(pricer, view, u.symbol, u.pinned.volatility)?,
        expiry,
    })
}

/// Value of an equity instrument.
pub(super) fn price<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    view: &InstrumentView<'_>,
) -> Result<f64, PricingError> {
    match view.instrument() {
        Instrument::European(o) => {
            let b = black_inputs(pricer, view, &underlying_of(o))?;
            let v = bs_value(
                b.spot,
                b.expiry,
                o.strike,
                b.rate,
                b.dividend,
                b.volatility,
                o.option_type,
                PremiumQuote::Price,
            )?;
            Ok(o.notional * v)
        }
        Instrument::American(a) => {
            let o = &a.terms;
            let b = black_inputs(pricer, view, &underlying_of(o))?;
            let steps = ((b.expiry * f64::from(a.steps_per_year)).round() as usize).max(1);
            let inputs = LatticeInputs {
                spot: b.spot,
                strike: o.strike,
                rate: b.rate,
                dividend: b.dividend,
                volatility: b.volatility,
                expiry: b.expiry,
            };
            Ok(o.notional * american_price(&inputs, steps, o.option_type)?)
        }
        Instrument::Asian(a) => {
            let o = &a.terms;
            let b = black_inputs(pricer, view, &underlying_of(o))?;
            let inputs = AsianInputs {
                spot: b.spot,
                strike: o.strike,
                rate: b.rate,
                dividend: b.dividend,
                volatility: b.volatility,
                averaging_start: year_fraction(pricer.valuation_date(view), a.averaging_start),
                expiry: b.expiry,
                observations: a.observations,
                accrued_average: a.accrued_average,
            };
            Ok(o.notional * asian_price(&inputs, a.method, o.option_type)?)
        }
        Instrument::Knockout(k) => {
            let o = &k.terms;
            let b = black_inputs(pricer, view, &underlying_of(o))?;
            let with_rebate = KnockoutInputs {
                spot: b.spot,
                strike: o.strike,
                barrier: k.barrier,
                rebate: k.rebate,
                rate: b.rate,
                dividend: b.dividend,
                volatility: b.volatility,
                expiry: b.expiry,
                monitoring: k.monitoring,
            };
            let without = KnockoutInputs { rebate: 0.0, ..with_rebate };
            let vanilla_part = knockout_price(&without, o.option_type)?;
            let rebate_part = knockout_price(&with_rebate, o.option_type)? - vanilla_part;
            Ok(o.notional * (k.participation * vanilla_part + rebate_part))
        }
        Instrument::Lookback(l) => {
            let u = Underlying {
                symbol: &l.underlying,
                expiry: l.expiry,
                dividend_yield: l.dividend_yield,
                pinned: l.market,
            };
            let b = black_inputs(pricer, view, &u)?;
            let inputs = LookbackInputs {
                spot: b.spot,
                running_extreme: l.running_extreme,
                rate: b.rate,
                dividend: b.dividend,
                volatility: b.volatility,
                expiry: b.expiry,
                steps_per_year: LOOKBACK_STEPS_PER_YEAR,
            };
            Ok(l.notional * lookback_mc(&inputs, l.option_type, pricer.mc_config())?.price)
        }
        Instrument::Snowball(s) => Ok(s.notional * snowball(pricer, view, s)?),
        Instrument::BasketSnowball(s) => Ok(s.notional * basket_snowball(pricer, view, s)?),
        other => Err(PricingError::UnsupportedOperation(format!(
            "{} is not an equity instrument",
            other.name()
        ))),
    }
}

/// Simulation estimate of an Asian option, for cross-checking the closed
/// form the `Price` measure uses.
pub fn asian_simulated<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    view: &InstrumentView<'_>,
) -> Result<f64, PricingError> {
    let Instrument::Asian(a) = view.instrument() else {
        return Err(PricingError::UnsupportedOperation("not an Asian option".into()));
    };
    let o = &a.terms;
    let b = black_inputs(pricer, view, &underlying_of(o))?;
    let inputs = AsianInputs {
        spot: b.spot,
        strike: o.strike,
        rate: b.rate,
        dividend: b.dividend,
        volatility: b.volatility,
        averaging_start: year_fraction(pricer.valuation_date(view), a.averaging_start),
        expiry: b.expiry,
        observations: a.observations,
        accrued_average: a.accrued_average,
    };
    Ok(o.notional * asian_mc(&inputs, o.option_type, pricer.mc_config())?.price)
}

fn underlying_of(o: &EuropeanOption) -> Underlying<'_> {
    Underlying {
        symbol: &o.underlying,
        expiry: o.expiry,
        dividend_yield: o.dividend_yield,
        pinned: o.market,
    }
}

/// Simulation grid and legs of a snowball seen from `valuation`.
///
/// The grid is every business day after valuation up to expiry, plus the
/// remaining observation dates and expiry itself.
fn snowball_legs(
    schedule: &SnowballSchedule,
    knock_in: KnockInPayoff,
    knocked_in: bool,
    curve: &ZeroCurve,
    valuation: Date,
) -> Result<SnowballLegs, PricingError> {
    if valuation >= schedule.expiry {
        return Err(PricingError::ExpiredInstrument(format!(
            "snowball expired {}, valuation {valuation}",
            schedule.expiry
        )));
    }
    let mut dates = schedule.calendar.business_days(valuation.add_days(1)?, schedule.expiry);
    dates.extend(schedule.observation_dates.iter().copied().filter(|d| *d > valuation));
    dates.push(schedule.expiry);
    dates.sort();
    dates.dedup();
    let grid = TimeGrid::from_dates(valuation, &dates)?;

    let coupon = |date: Date| {
        if schedule.annualised {
            schedule.rebate * year_fraction(schedule.start_date, date)
        } else {
            schedule.rebate
        }
    };
    let mut observations = Vec::new();
    for &date in schedule.observation_dates.iter().filter(|d| **d > valuation) {
        let step = dates
            .binary_search(&date)
            .map_err(|_| PricingError::InvalidConfiguration(format!("observation {date} off the grid")))?;
        observations.push(KnockOutObservation {
            step,
            coupon: coupon(date),
            discount: forward_discount(curve, valuation, date)?,
        });
    }
    Ok(SnowballLegs {
        grid,
        observations,
        maturity_coupon: coupon(schedule.expiry),
        maturity_discount: forward_discount(curve, valuation, schedule.expiry)?,
        knock_in,
        knocked_in,
    })
}

fn snowball<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    view: &InstrumentView<'_>,
    s: &Snowball,
) -> Result<f64, PricingError> {
    let valuation = pricer.valuation_date(view);
    let curve = pricer.discount_curve(view)?;
    let legs = snowball_legs(&s.schedule, s.knock_in, s.knocked_in, &curve, valuation)?;
    let spot = positive("spot", view.apply_spot(pricer.base_spot(&s.underlying, s.market.spot, false)?))?;
    let rate = implied_rate(legs.maturity_discount, legs.grid.maturity());
    let inputs = SnowballInputs {
        params: GbmParams::new(
            spot,
            rate,
            dividend(pricer, view, &s.underlying, s.dividend_yield),
            volatility(pricer, view, &s.underlying, s.market.volatility)?,
        ),
        initial_price: s.initial_price,
        knock_out_barrier: s.knock_out_barrier,
        knock_in_barrier: s.knock_in_barrier,
        legs,
    };
    let result = snowball_mc(&inputs, pricer.mc_config())?;
    debug!(symbol = %s.underlying, price = result.price, std_error = result.std_error, "snowball");
    Ok(result.price)
}

fn basket_snowball<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    view: &InstrumentView<'_>,
    s: &BasketSnowball,
) -> Result<f64, PricingError> {
    if view.spot().is_some() {
        return Err(PricingError::UnsupportedOperation(
            "absolute spot override on a basket; use a spot scale".into(),
        ));
    }
    let valuation = pricer.valuation_date(view);
    let curve = pricer.discount_curve(view)?;
    let legs = snowball_legs(&s.schedule, s.knock_in, s.knocked_in, &curve, valuation)?;
    let rate = implied_rate(legs.maturity_discount, legs.grid.maturity());
    let (spots, vols) = basket_market(pricer, s)?;
    let params = s
        .underlyings
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let vol = match view.volatility() {
                Some(v) => v,
                None => vols[i],
            };
            Ok(GbmParams::new(
                positive("spot", spots[i] * view.spot_scale())?,
                rate,
                dividend(pricer, view, name, s.dividend_yields[i]),
                non_negative_volatility(vol + view.volatility_shift())?,
            ))
        })
        .collect::<Result<Vec<_>, PricingError>>()?;
    let inputs = BasketSnowballInputs {
        params,
        initial_prices: s.initial_prices.clone(),
        correlation: s.correlation.clone(),
        knock_out_ratio: s.knock_out_ratio,
        knock_in_ratio: s.knock_in_ratio,
        legs,
    };
    let result = basket_snowball_mc(&inputs, pricer.mc_config())?;
    debug!(names = s.size(), price = result.price, std_error = result.std_error, "basket snowball");
    Ok(result.price)
}

/// Per-name spots and volatilities before view overrides.
fn basket_market<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    s: &BasketSnowball,
) -> Result<(Vec<f64>, Vec<f64>), PricingError> {
    let n = s.size();
    let spots = match &s.spots {
        Some(spots) => spots.clone(),
        None => s
            .underlyings
            .iter()
            .map(|name| pricer.base_spot(name, None, false))
            .collect::<Result<_, _>>()?,
    };
    let vols = match &s.volatilities {
        Some(vols) => vols.clone(),
        None => s
            .underlyings
            .iter()
            .map(|name| base_volatility(pricer, name, None))
            .collect::<Result<_, _>>()?,
    };
    if spots.len() != n || vols.len() != n {
        return Err(PricingError::InvalidMarketData(format!(
            "basket of {n} names with {} spots and {} volatilities",
            spots.len(),
            vols.len()
        )));
    }
    Ok((spots, vols))
}

/// Pins spot and volatility (or their per-name vectors) on the instrument.
pub(super) fn resolve<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    instrument: &mut Instrument,
) -> Result<(), PricingError> {
    if let Instrument::BasketSnowball(s) = instrument {
        let (spots, vols) = basket_market(pricer, s)?;
        s.spots = Some(spots);
        s.volatilities = Some(vols);
        return Ok(());
    }
    let symbol = instrument.symbol();
    if let Some(market) = instrument.market_mut() {
        if market.spot.is_none() {
            market.spot = Some(pricer.base_spot(&symbol, None, false)?);
        }
        if market.volatility.is_none() {
            market.volatility = Some(base_volatility(pricer, &symbol, None)?);
        }
    }
    Ok(())
}
