//! Bond pricing and the yield-based measures.
//!
//! Prices are per 100 face. The `Price` of a bond is its clean price off
//! the discount curve; the yield measures (YTM, DV01, durations, convexity)
//! are taken at the market clean price, which resolves as
//!
//! 1. a pinned or context clean price
//! 2. the price at a pinned or context yield
//! 3. the curve clean price

use pricer_core::market_data::ZeroCurve;
use pricer_core::types::{Date, PricingError};
use pricer_models::bonds::{
    AdvanceRedemptionBond, BondOption, BondTerms, FixedIncome, FixedRateBond, FloatingRateBond, PutableBond,
    YieldConvention,
};
use pricer_models::instruments::{AssetClass, Instrument};
use tracing::debug;

use super::{non_negative_volatility, InstrumentView, Pricer};
use crate::context::MarketObject;
use crate::market::MarketDataProvider;
use crate::measure::RiskMeasure;

/// A bond instrument with its cash-flow engine built.
enum Built {
    Fixed(FixedRateBond, YieldConvention),
    Redemption(AdvanceRedemptionBond, YieldConvention),
    Floating(FloatingRateBond),
    Putable(PutableBond, YieldConvention),
    Option(BondOption, f64),
}

impl Built {
    fn new(instrument: &Instrument) -> Result<Self, PricingError> {
        Ok(match instrument {
            Instrument::FixedBond(b) => Built::Fixed(b.build()?, b.yield_convention),
            Instrument::AdvanceRedemption(b) => Built::Redemption(b.build()?, b.yield_convention),
            Instrument::FloatingBond(b) => Built::Floating(b.build()?),
            Instrument::PutableBond(b) => Built::Putable(b.build()?, b.yield_convention),
            Instrument::BondOption(o) => Built::Option(o.build()?, o.notional),
            other => {
                return Err(PricingError::UnsupportedOperation(format!(
                    "{} is not a bond",
                    other.name()
                )))
            }
        })
    }

    fn terms(&self) -> &BondTerms {
        match self {
            Built::Fixed(b, _) => b.terms(),
            Built::Redemption(b, _) => b.terms(),
            Built::Floating(b) => b.terms(),
            Built::Putable(b, _) => b.terms(),
            Built::Option(o, _) => o.bond().terms(),
        }
    }

    fn clean_from_curve(&self, curve: &ZeroCurve, settlement: Date) -> Result<f64, PricingError> {
        Ok(match self {
            Built::Fixed(b, _) => b.clean_price_from_curve(curve, settlement)?,
            Built::Redemption(b, _) => b.clean_price_from_curve(curve, settlement)?,
            Built::Floating(b) => b.clean_price_from_curve(curve, settlement)?,
            Built::Putable(b, _) => b.clean_price_from_curve(curve, settlement)?,
            Built::Option(..) => return Err(option_measure("clean price")),
        })
    }

    fn full_from_curve(&self, curve: &ZeroCurve, settlement: Date) -> Result<f64, PricingError> {
        Ok(match self {
            Built::Fixed(b, _) => b.full_price_from_curve(curve, settlement)?,
            Built::Redemption(b, _) => b.full_price_from_curve(curve, settlement)?,
            Built::Floating(b) => b.full_price_from_curve(curve, settlement)?,
            Built::Putable(b, _) => b.full_price_from_curve(curve, settlement)?,
            Built::Option(..) => return Err(option_measure("full price")),
        })
    }

    fn accrued(&self, curve: &ZeroCurve, settlement: Date) -> Result<f64, PricingError> {
        Ok(match self {
            Built::Fixed(b, _) => b.accrued_interest(settlement)?,
            Built::Redemption(b, _) => b.accrued_interest(settlement)?,
            Built::Floating(b) => b.accrued_interest(settlement)?,
            Built::Putable(b, _) => b.branch_bond(curve, settlement)?.1.accrued_interest(settlement)?,
            Built::Option(..) => return Err(option_measure("accrued interest")),
        })
    }

    /// The bond whose fixed flows the yield measures run on; a putable
    /// bond contributes the branch its decision selects.
    fn into_fixed_income(
        self,
        curve: &ZeroCurve,
        settlement: Date,
    ) -> Result<(Box<dyn FixedIncome>, YieldConvention), PricingError> {
        match self {
            Built::Fixed(b, conv) => Ok((Box::new(b), conv)),
            Built::Redemption(b, conv) => Ok((Box::new(b), conv)),
            Built::Putable(b, conv) => Ok((Box::new(b.branch_bond(curve, settlement)?.1), conv)),
            Built::Floating(_) => Err(PricingError::UnsupportedOperation(
                "yield measures need fixed cash flows; use the discount margin".into(),
            )),
            Built::Option(..) => Err(option_measure("yield")),
        }
    }
}

fn option_measure(what: &str) -> PricingError {
    PricingError::UnsupportedOperation(format!("no {what} on a bond option"))
}

/// Pinned or context quotes of a bond.
#[derive(Clone, Copy, Debug, Default)]
struct Quote {
    clean_price: Option<f64>,
    ytm: Option<f64>,
}

impl Quote {
    fn of<P: MarketDataProvider + ?Sized>(pricer: &Pricer<'_, P>, instrument: &Instrument) -> Self {
        let symbol = instrument.symbol();
        let pinned = instrument.market();
        let ctx = pricer.context();
        Self {
            clean_price: pinned
                .clean_price
                .or_else(|| ctx.value(MarketObject::CleanPrice, &symbol)),
            ytm: pinned.ytm.or_else(|| ctx.value(MarketObject::Ytm, &symbol)),
        }
    }

    /// Market clean price given the bond's fixed flows, if any.
    fn clean_price(
        &self,
        fixed: Option<(&dyn FixedIncome, YieldConvention)>,
        settlement: Date,
        from_curve: impl FnOnce() -> Result<f64, PricingError>,
    ) -> Result<f64, PricingError> {
        if let Some(p) = self.clean_price {
            return Ok(p);
        }
        match (self.ytm, fixed) {
            (Some(y), Some((bond, conv))) => Ok(bond.clean_price_from_yield(y, settlement, conv)?),
            _ => from_curve(),
        }
    }
}

/// Fails once the bond settles after maturity, or an option on it has
/// expired.
pub(super) fn check_settlement(instrument: &Instrument, valuation: Date) -> Result<(), PricingError> {
    let built = Built::new(instrument)?;
    if let Instrument::BondOption(o) = instrument {
        if valuation >= o.expiry {
            return Err(PricingError::ExpiredInstrument(format!(
                "bond option expired {}, valuation {valuation}",
                o.expiry
            )));
        }
    }
    let terms = built.terms();
    let settlement = terms.settlement_date(valuation)?;
    if settlement > terms.maturity {
        return Err(PricingError::ExpiredInstrument(format!(
            "{} settles {settlement} after maturity {}",
            instrument.symbol(),
            terms.maturity
        )));
    }
    Ok(())
}

fn option_volatility<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    view: &InstrumentView<'_>,
) -> Result<f64, PricingError> {
    let instrument = view.instrument();
    let symbol = instrument.symbol();
    let base = view
        .volatility()
        .or(instrument.market().volatility)
        .or_else(|| pricer.context().value(MarketObject::Volatility, &symbol))
        .ok_or_else(|| PricingError::InsufficientInput(format!("no price volatility for the option on {symbol}")))?;
    non_negative_volatility(base + view.volatility_shift())
}

/// Clean price per 100 face off the discount curve; bond options are
/// worth `notional / 100` times the Black price per 100.
pub(super) fn price<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    view: &InstrumentView<'_>,
) -> Result<f64, PricingError> {
    let built = Built::new(view.instrument())?;
    let curve = pricer.discount_curve(view)?;
    let settlement = built.terms().settlement_date(pricer.valuation_date(view))?;
    match &built {
        Built::Option(option, notional) => {
            let vol = option_volatility(pricer, view)?;
            Ok(notional / 100.0 * option.price(&curve, settlement, vol)?)
        }
        _ => built.clean_from_curve(&curve, settlement),
    }
}

/// Bond-only measures.
///
/// # Errors
/// `UnsupportedOperation` for non-bonds, for yield measures on a floater,
/// for measures that do not apply to a bond option, and for the discount
/// margin or adjusted coupon on bonds without one.
pub(super) fn measure<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    view: &InstrumentView<'_>,
    measure: RiskMeasure,
) -> Result<f64, PricingError> {
    let instrument = view.instrument();
    if instrument.asset_class() != AssetClass::Bond {
        return Err(PricingError::UnsupportedOperation(format!(
            "{measure} applies to bonds only, not {}",
            instrument.name()
        )));
    }
    let built = Built::new(instrument)?;
    let curve = pricer.discount_curve(view)?;
    let settlement = built.terms().settlement_date(pricer.valuation_date(view))?;
    let quote = Quote::of(pricer, instrument);

    match measure {
        RiskMeasure::CleanPrice => built.clean_from_curve(&curve, settlement),
        RiskMeasure::FullPrice => built.full_from_curve(&curve, settlement),
        RiskMeasure::AccruedInterest => built.accrued(&curve, settlement),
        RiskMeasure::DiscountMargin => match &built {
            Built::Floating(note) => {
                let clean = quote.clean_price(None, settlement, || built.clean_from_curve(&curve, settlement))?;
                Ok(note.discount_margin(clean, &curve, settlement)?)
            }
            _ => Err(PricingError::UnsupportedOperation(format!(
                "discount margin applies to floating-rate bonds, not {}",
                instrument.name()
            ))),
        },
        RiskMeasure::AdjustedCoupon => match &built {
            Built::Putable(bond, _) => {
                let Some(decision) = bond.decision(&curve, settlement)? else {
                    // Every exercise date has passed.
                    return Ok(bond.coupon_in_force(settlement));
                };
                debug!(
                    symbol = %instrument.symbol(),
                    exercise = %decision.exercise_date,
                    direction = ?decision.direction,
                    adjusted = decision.adjusted_coupon,
                    breakeven = decision.breakeven_coupon,
                    "putable decision"
                );
                Ok(decision.adjusted_coupon)
            }
            _ => Err(PricingError::UnsupportedOperation(format!(
                "adjusted coupon applies to putable bonds, not {}",
                instrument.name()
            ))),
        },
        RiskMeasure::Ytm
        | RiskMeasure::Dv01
        | RiskMeasure::ModifiedDuration
        | RiskMeasure::ModifiedDurationAnalytic
        | RiskMeasure::MacaulayDuration
        | RiskMeasure::Convexity
        | RiskMeasure::DollarDuration
        | RiskMeasure::DollarConvexity => {
            let curve_clean = built.clean_from_curve(&curve, settlement);
            let (bond, conv) = built.into_fixed_income(&curve, settlement)?;
            if let (RiskMeasure::Ytm, Some(y)) = (measure, quote.ytm) {
                return Ok(y);
            }
            let clean = quote.clean_price(Some((&*bond, conv)), settlement, || curve_clean)?;
            let a = bond.analytics(clean, settlement, conv)?;
            Ok(match measure {
                RiskMeasure::Ytm => a.ytm,
                RiskMeasure::Dv01 => a.dv01,
                RiskMeasure::ModifiedDuration => a.modified_duration,
                RiskMeasure::ModifiedDurationAnalytic => a.modified_duration_analytic,
                RiskMeasure::MacaulayDuration => a.macaulay_duration,
                RiskMeasure::Convexity => a.convexity,
                RiskMeasure::DollarDuration => a.dollar_duration,
                _ => a.dollar_convexity,
            })
        }
        other => Err(PricingError::UnsupportedOperation(format!("{other} is not a bond measure"))),
    }
}

/// Pins the market clean price and, for fixed flows, the yield.
///
/// A bond option pins the quotes of its bond and a context volatility.
pub(super) fn resolve<P: MarketDataProvider + ?Sized>(
    pricer: &Pricer<'_, P>,
    instrument: &mut Instrument,
) -> Result<(), PricingError> {
    let plain = InstrumentView::new(&*instrument);
    let built = Built::new(instrument)?;
    let curve = pricer.discount_curve(&plain)?;
    let settlement = built.terms().settlement_date(pricer.valuation_date(&plain))?;
    let quote = Quote::of(pricer, instrument);
    let symbol = instrument.symbol();
    let context_vol = pricer.context().value(MarketObject::Volatility, &symbol);

    let (clean, ytm) = match built {
        Built::Option(option, _) => {
            let bond = option.bond();
            let conv = match &*instrument {
                Instrument::BondOption(o) => o.bond.yield_convention,
                _ => YieldConvention::default(),
            };
            let clean = quote.clean_price(Some((bond as &dyn FixedIncome, conv)), settlement, || {
                Ok(bond.clean_price_from_curve(&curve, settlement)?)
            })?;
            let ytm = match quote.ytm {
                Some(y) => y,
                None => bond.ytm(clean, settlement, conv)?,
            };
            (clean, Some(ytm))
        }
        Built::Floating(_) => {
            let clean = quote.clean_price(None, settlement, || built.clean_from_curve(&curve, settlement))?;
            (clean, None)
        }
        fixed => {
            let curve_clean = fixed.clean_from_curve(&curve, settlement);
            let (bond, conv) = fixed.into_fixed_income(&curve, settlement)?;
            let clean = quote.clean_price(Some((&*bond, conv)), settlement, || curve_clean)?;
            let ytm = match quote.ytm {
                Some(y) => y,
                None => bond.ytm(clean, settlement, conv)?,
            };
            (clean, Some(ytm))
        }
    };

    match instrument {
        Instrument::BondOption(o) => {
            o.bond.market.clean_price = Some(clean);
            o.bond.market.ytm = ytm;
            if o.market.volatility.is_none() {
                o.market.volatility = context_vol;
            }
        }
        other => {
            if let Some(m) = other.market_mut() {
                m.clean_price = Some(clean);
                m.ytm = ytm;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextLayer, PricingContext};
    use crate::market::InMemoryMarketData;
    use approx::assert_relative_eq;
    use pricer_core::market_data::Compounding;
    use pricer_models::instruments::{
        CurveRef, EuropeanBondOption, FixedBond, FloatingBond, MarketAttributes, OptionType,
    };
    use pricer_models::schedules::Frequency;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn today() -> Date {
        d(2021, 1, 1)
    }

    fn terms() -> BondTerms {
        BondTerms::new(d(2020, 1, 1), d(2030, 1, 1), 0.04, Frequency::Annual)
    }

    fn bond() -> FixedBond {
        FixedBond::new("200001.IB", terms(), CurveRef::Flat(0.03)).with_yield_convention(YieldConvention::UsStreet)
    }

    fn calc(instrument: &Instrument, measure: RiskMeasure) -> Result<f64, PricingError> {
        let market = InMemoryMarketData::new();
        let ctx = PricingContext::at(today());
        Pricer::new(&market, &ctx).calc(instrument, measure)
    }

    #[test]
    fn test_price_is_curve_clean_price() {
        let instrument = Instrument::FixedBond(bond());
        let curve = ZeroCurve::flat(today(), 0.03, Compounding::Continuous).unwrap();
        let expected = bond().build().unwrap().clean_price_from_curve(&curve, today()).unwrap();
        assert_relative_eq!(calc(&instrument, RiskMeasure::Price).unwrap(), expected, epsilon = 1e-10);
        assert_relative_eq!(calc(&instrument, RiskMeasure::CleanPrice).unwrap(), expected, epsilon = 1e-10);
        // Coupon above the curve: premium bond.
        assert!(expected > 100.0);
        let full = calc(&instrument, RiskMeasure::FullPrice).unwrap();
        let accrued = calc(&instrument, RiskMeasure::AccruedInterest).unwrap();
        assert_relative_eq!(full - accrued, expected, epsilon = 1e-10);
    }

    #[test]
    fn test_yield_from_pinned_clean_price() {
        let par = Instrument::FixedBond(bond().with_market(MarketAttributes::default().with_clean_price(100.0)));
        assert_relative_eq!(calc(&par, RiskMeasure::Ytm).unwrap(), 0.04, epsilon = 1e-9);

        let pinned = Instrument::FixedBond(bond().with_market(MarketAttributes::default().with_ytm(0.05)));
        assert_eq!(calc(&pinned, RiskMeasure::Ytm).unwrap(), 0.05);
    }

    #[test]
    fn test_context_clean_price_drives_yield() {
        let market = InMemoryMarketData::new();
        let mut ctx = PricingContext::at(today());
        ctx.enter(ContextLayer::new().clean_price("200001.IB", 100.0));
        let y = Pricer::new(&market, &ctx)
            .calc(&Instrument::FixedBond(bond()), RiskMeasure::Ytm)
            .unwrap();
        assert_relative_eq!(y, 0.04, epsilon = 1e-9);
    }

    #[test]
    fn test_duration_relations() {
        // Settles on a coupon date with nine annual coupons left, so par means y = 4%.
        let valuation = d(2021, 6, 1);
        let terms = BondTerms::new(d(2020, 6, 1), d(2030, 6, 1), 0.04, Frequency::Annual);
        let par = FixedBond::new("200002.IB", terms, CurveRef::Flat(0.03))
            .with_yield_convention(YieldConvention::UsStreet)
            .with_market(MarketAttributes::default().with_clean_price(100.0));
        let instrument = Instrument::FixedBond(par);
        let market = InMemoryMarketData::new();
        let ctx = PricingContext::at(valuation);
        let pricer = Pricer::new(&market, &ctx);
        let out = pricer
            .calc_many(
                &instrument,
                &[
                    RiskMeasure::Dv01,
                    RiskMeasure::ModifiedDuration,
                    RiskMeasure::ModifiedDurationAnalytic,
                    RiskMeasure::MacaulayDuration,
                    RiskMeasure::DollarDuration,
                    RiskMeasure::Ytm,
                ],
            )
            .unwrap();
        let (dv01, modified, analytic, macaulay, dollar, ytm) = (out[0], out[1], out[2], out[3], out[4], out[5]);
        assert_relative_eq!(ytm, 0.04, epsilon = 1e-9);
        assert!(dv01 > 0.0);
        assert_relative_eq!(modified, analytic, max_relative = 1e-4);
        assert_relative_eq!(macaulay, modified * (1.0 + ytm), max_relative = 1e-9);
        assert_relative_eq!(dollar, dv01 * 1e4, max_relative = 1e-12);

        let y: f64 = 0.04;
        let closed_form = (1.0 + y) / y * (1.0 - (1.0 + y).powi(-9));
        assert_relative_eq!(macaulay, closed_form, max_relative = 1e-6);
    }

    #[test]
    fn test_floater_measures() {
        let note = FloatingBond::new("FRN", BondTerms::new(d(2020, 1, 1), d(2025, 1, 1), 0.005, Frequency::Quarterly), 0.025, CurveRef::Flat(0.03));
        let curve = ZeroCurve::flat(today(), 0.03, Compounding::Continuous).unwrap();
        let built = note.build().unwrap();
        let clean = built.clean_price_from_dm(0.01, &curve, today()).unwrap();

        let mut quoted = note.clone();
        quoted.market = MarketAttributes::default().with_clean_price(clean);
        let instrument = Instrument::FloatingBond(quoted);
        assert_relative_eq!(calc(&instrument, RiskMeasure::DiscountMargin).unwrap(), 0.01, epsilon = 1e-8);
        assert_eq!(calc(&instrument, RiskMeasure::Ytm).unwrap_err().kind(), "UnsupportedOperation");
        assert_eq!(
            calc(&Instrument::FixedBond(bond()), RiskMeasure::DiscountMargin).unwrap_err().kind(),
            "UnsupportedOperation"
        );
    }

    #[test]
    fn test_matured_bond_is_expired() {
        let market = InMemoryMarketData::new();
        let ctx = PricingContext::at(d(2030, 6, 3));
        let err = Pricer::new(&market, &ctx)
            .calc(&Instrument::FixedBond(bond()), RiskMeasure::Price)
            .unwrap_err();
        assert_eq!(err.kind(), "ExpiredInstrument");
    }

    #[test]
    fn test_resolve_pins_quotes() {
        let market = InMemoryMarketData::new();
        let ctx = PricingContext::at(today());
        let pricer = Pricer::new(&market, &ctx);
        let resolved = pricer.resolve(&Instrument::FixedBond(bond())).unwrap();
        let pinned = resolved.market();
        let clean = pinned.clean_price.unwrap();
        assert_relative_eq!(clean, calc(&Instrument::FixedBond(bond()), RiskMeasure::Price).unwrap(), epsilon = 1e-10);
        assert_relative_eq!(
            pinned.ytm.unwrap(),
            pricer.calc(&resolved, RiskMeasure::Ytm).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_bond_option_needs_volatility() {
        let option = EuropeanBondOption::new(bond(), d(2022, 1, 1), 100.0, OptionType::Call);
        let err = calc(&Instrument::BondOption(option.clone()), RiskMeasure::Price).unwrap_err();
        assert_eq!(err.kind(), "InsufficientInput");

        let mut with_vol = option;
        with_vol.market = MarketAttributes::default().with_volatility(0.05);
        with_vol.notional = 1_000_000.0;
        let v = calc(&Instrument::BondOption(with_vol.clone()), RiskMeasure::Price).unwrap();
        assert!(v > 0.0);
        assert_eq!(
            calc(&Instrument::BondOption(with_vol), RiskMeasure::Ytm).unwrap_err().kind(),
            "UnsupportedOperation"
        );
    }
}
