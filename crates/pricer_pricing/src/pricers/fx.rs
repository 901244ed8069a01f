//! FX pricing under Garman-Kohlhagen with a swap-point implied foreign curve.
//!
//! The foreign rate comes from the domestic curve and the forward curve
//! built on the reference spot, so a spot bump on the view moves the
//! underlying but not the carry. A view rate shift moves the domestic rate
//! only.

use std::sync::Arc;

use pricer_core::market_data::{
    DeltaConvention, FxForwardCurve, FxImpliedCurve, FxVolSurface, VolatilitySurface, ZeroCurve,
};
use pricer_core::types::{CurrencyPair, Date, DayCountConvention, PricingError};
use pricer_models::analytical::{
    fx_digital_value, fx_forward_value, fx_quanto_digital, fx_quanto_range_accrual, fx_vanilla_value,
    PremiumQuote, QuantoDigitalInputs, RangeObservation,
};
use pricer_models::instruments::{CurveRef, FxQuantoRangeAccrual, Instrument, MarketAttributes};
use tracing::debug;

use super::{forward_discount, implied_rate, non_negative_volatility, positive, InstrumentView, Pricer};
use crate::context::MarketObject;
use crate::market::{fx_forward_curve, fx_vol_surface, FxVolType, MarketDataProvider};

/// Shortest surface query, for valuation on the expiry date itself.
const MIN_SURFACE_EXPIRY: f64 = 1.0 / 365.0;

/// Curves of one pair as of the market date.
struct PairCurves {
    symbol: String,
    reference_spot: f64,
    domestic_base: ZeroCurve,
    domestic: ZeroCurve,
    forward: FxForwardCurve,
    foreign: FxImpliedCurve,
}

/// Where volatilities come from.
enum VolSource {
    Flat(f64),
    Surface(Box<FxVolSurface>),
}

impl VolSource {
    fn at(&self, date: Date, anchor: Date, strike: f64) -> Result<f64, PricingError> {
        match self {
            VolSource::Flat(v) => Ok(*v),
            VolSource::Surface(surface) => {
                let t = DayCountConvention::Actual365Fixed
                    .year_frac(anchor, date)
                    .fraction
                    .max(MIN_SURFACE_EXPIRY);
                Ok(surface.volatility(t, strike)?)
            }
        }
    }
}

fn pair_curves<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    view: &InstrumentView<'_>,
    pair: &CurrencyPair,
    domestic_curve: &CurveRef,
    pinned_spot: Option<f64>,
) -> Result<PairCurves, PricingError> {
    let symbol = pair.symbol();
    let reference_spot = pricer.base_spot(&symbol, pinned_spot, true)?;
    let anchor = pricer.market_date();
    let domestic_base = pricer.curve(domestic_curve, &symbol)?;
    let domestic = super::shifted(domestic_base.clone(), view.rate_shift())?;
    let forward = fx_forward_curve(anchor, reference_spot, &pricer.market().swap_curve(&symbol, pricer.as_of())?)?;
    let foreign = FxImpliedCurve::new(Arc::new(domestic_base.clone()), Arc::new(forward.clone()))?;
    Ok(PairCurves {
        symbol,
        reference_spot,
        domestic_base,
        domestic,
        forward,
        foreign,
    })
}

impl PairCurves {
    /// `(r_d, r_f)` over `[valuation, date]`; the foreign rate takes the
    /// context dividend override and the view shift.
    fn rates<P: MarketDataProvider + ?Sized>(
        &self,
        pricer: &Pricer<'_, P>,
        view: &InstrumentView<'_>,
        valuation: Date,
        date: Date,
        t: f64,
    ) -> Result<(f64, f64), PricingError> {
        let r_d = implied_rate(forward_discount(&self.domestic, valuation, date)?, t);
        let r_f = match pricer.context().value(MarketObject::DividendYield, &self.symbol) {
            Some(q) => q,
            None => implied_rate(forward_discount(&self.foreign, valuation, date)?, t),
        };
        Ok((r_d, r_f + view.dividend_shift()))
    }

    fn surface<P: MarketDataProvider + ?Sized>(&self, pricer: &Pricer<'_, P>) -> Result<FxVolSurface, PricingError> {
        let quotes = pricer
            .market()
            .fx_implied_volatility_curve(&self.symbol, &FxVolType::ALL, pricer.as_of())?;
        fx_vol_surface(&quotes, self.forward.clone(), &self.domestic_base, DeltaConvention::Spot)
    }

    /// Flat override (view, pinned, context) or the quoted smile.
    fn vol_source<P: MarketDataProvider + ?Sized>(
        &self,
        pricer: &Pricer<'_, P>,
        view: &InstrumentView<'_>,
        pinned: Option<f64>,
    ) -> Result<VolSource, PricingError> {
        let flat = view
            .volatility()
            .or(pinned)
            .or_else(|| pricer.context().value(MarketObject::Volatility, &self.symbol));
        match flat {
            Some(v) => Ok(VolSource::Flat(v)),
            None => Ok(VolSource::Surface(Box::new(self.surface(pricer)?))),
        }
    }
}

fn year_fraction(from: Date, to: Date) -> f64 {
    DayCountConvention::Actual365Fixed.year_frac(from, to).fraction
}

/// Market inputs of a single-expiry FX product.
struct Single {
    spot: f64,
    expiry: f64,
    r_d: f64,
    r_f: f64,
    volatility: Option<f64>,
}

#[allow(clippy::too_many_arguments)]
fn single<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    view: &InstrumentView<'_>,
    pair: &CurrencyPair,
    domestic_curve: &CurveRef,
    market: &MarketAttributes,
    expiry_date: Date,
    strike: f64,
    needs_vol: bool,
) -> Result<Single, PricingError> {
    let curves = pair_curves(pricer, view, pair, domestic_curve, market.spot)?;
    let valuation = pricer.valuation_date(view);
    let expiry = year_fraction(valuation, expiry_date);
    let (r_d, r_f) = curves.rates(pricer, view, valuation, expiry_date, expiry)?;
    let volatility = if needs_vol {
        let base = curves
            .vol_source(pricer, view, market.volatility)?
            .at(expiry_date, pricer.market_date(), strike)?;
        Some(non_negative_volatility(base + view.volatility_shift())?)
    } else {
        None
    };
    Ok(Single {
        spot: positive("spot", view.apply_spot(curves.reference_spot))?,
        expiry,
        r_d,
        r_f,
        volatility,
    })
}

impl Single {
    fn vol(&self) -> Result<f64, PricingError> {
        self.volatility
            .ok_or_else(|| PricingError::InsufficientInput("fx volatility not resolved".into()))
    }
}

/// Value of an FX instrument in the quote currency.
pub(super) fn price<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    view: &InstrumentView<'_>,
) -> Result<f64, PricingError> {
    match view.instrument() {
        Instrument::FxVanilla(o) => {
            let m = single(pricer, view, &o.pair, &o.domestic_curve, &o.market, o.expiry, o.strike, true)?;
            let v = fx_vanilla_value(m.spot, o.strike, m.expiry, m.r_d, m.r_f, m.vol()?, o.option_type, o.notional)?;
            Ok(match o.premium {
                PremiumQuote::Price => v,
                PremiumQuote::SpotFraction => v / m.spot,
            })
        }
        Instrument::FxForward(f) => {
            let m = single(pricer, view, &f.pair, &f.domestic_curve, &f.market, f.delivery, f.strike, false)?;
            Ok(fx_forward_value(m.spot, f.strike, m.expiry, m.r_d, m.r_f, f.notional)?)
        }
        Instrument::FxDigital(o) => {
            let m = single(pricer, view, &o.pair, &o.domestic_curve, &o.market, o.expiry, o.strike, true)?;
            Ok(fx_digital_value(m.spot, o.strike, m.expiry, m.r_d, m.r_f, m.vol()?, o.option_type, o.payout)?)
        }
        Instrument::FxQuantoDigital(q) => {
            let o = &q.digital;
            let m = single(pricer, view, &o.pair, &o.domestic_curve, &o.market, o.expiry, o.strike, true)?;
            let inputs = QuantoDigitalInputs {
                forward: m.spot * ((m.r_d - m.r_f) * m.expiry).exp(),
                strike: o.strike,
                expiry: m.expiry,
                volatility: m.vol()?,
                quanto_volatility: q.quanto_volatility,
                correlation: q.correlation,
                discount_factor: (-m.r_d * m.expiry).exp(),
                payout: o.payout,
            };
            Ok(fx_quanto_digital(&inputs, o.option_type)?)
        }
        Instrument::FxQuantoRangeAccrual(r) => range_accrual(pricer, view, r),
        other => Err(PricingError::UnsupportedOperation(format!(
            "{} is not an FX instrument",
            other.name()
        ))),
    }
}

fn range_accrual<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    view: &InstrumentView<'_>,
    r: &FxQuantoRangeAccrual,
) -> Result<f64, PricingError> {
    let curves = pair_curves(pricer, view, &r.pair, &r.domestic_curve, r.market.spot)?;
    let valuation = pricer.valuation_date(view);
    let anchor = pricer.market_date();
    let spot = positive("spot", view.apply_spot(curves.reference_spot))?;
    let has_future = r.observation_dates.iter().any(|d| *d > valuation);
    let vols = if has_future {
        Some(curves.vol_source(pricer, view, r.market.volatility)?)
    } else {
        None
    };

    let mut observations = Vec::with_capacity(r.observation_dates.len());
    for &date in &r.observation_dates {
        if date < valuation || (date == valuation && r.fixing(date).is_some()) {
            let fixing = r.fixing(date).ok_or_else(|| {
                PricingError::InsufficientInput(format!("range accrual fixing missing for {date}"))
            })?;
            observations.push(RangeObservation {
                time: 0.0,
                forward: fixing,
                volatility: 0.0,
            });
            continue;
        }
        if date == valuation {
            observations.push(RangeObservation {
                time: 0.0,
                forward: spot,
                volatility: 0.0,
            });
            continue;
        }
        let t = year_fraction(valuation, date);
        let (r_d, r_f) = curves.rates(pricer, view, valuation, date, t)?;
        let forward = spot * ((r_d - r_f) * t).exp();
        let base = match &vols {
            Some(source) => source.at(date, anchor, forward)?,
            None => 0.0,
        };
        observations.push(RangeObservation {
            time: t,
            forward,
            volatility: non_negative_volatility(base + view.volatility_shift())?,
        });
    }
    let discount = forward_discount(&curves.domestic, valuation, r.payment_date)?;
    let value = fx_quanto_range_accrual(
        &observations,
        r.lower,
        r.upper,
        r.quanto_volatility,
        r.correlation,
        discount,
        r.coupon,
    )?;
    debug!(pair = %curves.symbol, observations = observations.len(), value, "range accrual");
    Ok(r.notional * value)
}

/// Pins the reference spot, and the volatility of single-expiry options.
///
/// Range accruals keep reading the smile per observation, so only their
/// spot is pinned.
pub(super) fn resolve<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    instrument: &mut Instrument,
) -> Result<(), PricingError> {
    let plain = InstrumentView::new(&*instrument);
    let (pair, curve, expiry, strike, market) = match &*instrument {
        Instrument::FxVanilla(o) => (&o.pair, &o.domestic_curve, Some(o.expiry), o.strike, o.market),
        Instrument::FxDigital(o) => (&o.pair, &o.domestic_curve, Some(o.expiry), o.strike, o.market),
        Instrument::FxQuantoDigital(q) => (
            &q.digital.pair,
            &q.digital.domestic_curve,
            Some(q.digital.expiry),
            q.digital.strike,
            q.digital.market,
        ),
        Instrument::FxForward(f) => (&f.pair, &f.domestic_curve, None, f.strike, f.market),
        Instrument::FxQuantoRangeAccrual(r) => (&r.pair, &r.domestic_curve, None, r.lower, r.market),
        other => {
            return Err(PricingError::UnsupportedOperation(format!(
                "{} is not an FX instrument",
                other.name()
            )))
        }
    };
    let curves = pair_curves(pricer, &plain, pair, curve, market.spot)?;
    let volatility = match (expiry, market.volatility) {
        (Some(date), None) => Some(
            curves
                .vol_source(pricer, &plain, None)?
                .at(date, pricer.market_date(), strike)?,
        ),
        _ => None,
    };
    let spot = curves.reference_spot;
    if let Some(m) = instrument.market_mut() {
        if m.spot.is_none() {
            m.spot = Some(spot);
        }
        if let Some(v) = volatility {
            m.volatility = Some(v);
        }
    }
    Ok(())
}
