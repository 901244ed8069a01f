//! Risk-measure dispatch over every instrument kind.
//!
//! A [`Pricer`] binds a market-data provider, a pricing context and the
//! numerical settings (Monte Carlo, bump sizes). Pricing an instrument
//! resolves each market input in a fixed order:
//!
//! 1. an [`Override`] on the [`InstrumentView`]
//! 2. a value pinned on the instrument's market attributes
//! 3. the innermost context override for the instrument's symbol
//! 4. a fetch from the provider as of the context's pricing date
//!
//! Curves are built from the provider, adjusted by the context's curve
//! scenario, then shifted by the view. The pricing functions per asset
//! class live in the private `equity`, `fx` and `bond` modules.
//!
//! # Examples
//!
//! ```
//! use pricer_core::types::Date;
//! use pricer_models::instruments::{CurveRef, EuropeanOption, Instrument, MarketAttributes, OptionType};
//! use pricer_pricing::context::PricingContext;
//! use pricer_pricing::market::InMemoryMarketData;
//! use pricer_pricing::measure::RiskMeasure;
//! use pricer_pricing::pricers::Pricer;
//!
//! let today = Date::from_ymd(2021, 8, 13).unwrap();
//! let call = Instrument::European(
//!     EuropeanOption::new("600000.SH", 100.0, Date::from_ymd(2022, 8, 13).unwrap(), OptionType::Call)
//!         .with_curve(CurveRef::Flat(0.05))
//!         .with_market(MarketAttributes::default().with_spot(100.0).with_volatility(0.2)),
//! );
//! let market = InMemoryMarketData::new();
//! let ctx = PricingContext::at(today);
//! let pricer = Pricer::new(&market, &ctx);
//! let price = pricer.calc(&call, RiskMeasure::Price).unwrap();
//! assert!((price - 10.4506).abs() < 1e-3);
//! ```

mod bond;
mod equity;
mod fx;
mod view;

pub use equity::asian_simulated;
pub use view::{InstrumentView, Override};

use pricer_core::market_data::{BootstrapConfig, Compounding, YieldCurve, ZeroCurve};
use pricer_core::types::{Date, PricingError};
use pricer_models::instruments::{AssetClass, CurveRef, Instrument};
use tracing::debug;

use crate::context::{MarketObject, PricingContext};
use crate::greeks::{self, BumpConfig, GreeksResult};
use crate::market::{
    bond_yield_zero_curve, irs_zero_curve, shibor_zero_curve, AsOf, MarketDataProvider,
};
use crate::mc::MonteCarloConfig;
use crate::measure::RiskMeasure;

/// Discount factor from `from` to `to` on `curve`.
pub(crate) fn forward_discount<C: YieldCurve + ?Sized>(curve: &C, from: Date, to: Date) -> Result<f64, PricingError> {
    Ok(curve.df(to)? / curve.df(from)?)
}

/// Continuously compounded rate implied by `discount` over `t` years.
pub(crate) fn implied_rate(discount: f64, t: f64) -> f64 {
    if t > 0.0 {
        -discount.ln() / t
    } else {
        0.0
    }
}

/// Prices instruments against a provider under a pricing context.
///
/// The pricer only borrows the provider and the context, so a context can
/// be re-entered between calls and a fresh pricer built for each scope.
#[derive(Debug)]
pub struct Pricer<'a, P: MarketDataProvider + ?Sized> {
    market: &'a P,
    context: &'a PricingContext,
    mc: MonteCarloConfig,
    bumps: BumpConfig,
}

impl<'a, P: MarketDataProvider + ?Sized> Pricer<'a, P> {
    /// Pricer with the default Monte Carlo and bump settings.
    pub fn new(market: &'a P, context: &'a PricingContext) -> Self {
        Self {
            market,
            context,
            mc: MonteCarloConfig::default(),
            bumps: BumpConfig::default(),
        }
    }

    /// Replaces the Monte Carlo settings.
    pub fn with_mc_config(mut self, mc: MonteCarloConfig) -> Self {
        self.mc = mc;
        self
    }

    /// Replaces the bump sizes of the greek engine.
    pub fn with_bump_config(mut self, bumps: BumpConfig) -> Self {
        self.bumps = bumps;
        self
    }

    /// Market-data provider.
    pub fn market(&self) -> &'a P {
        self.market
    }

    /// Pricing context.
    pub fn context(&self) -> &'a PricingContext {
        self.context
    }

    /// Monte Carlo settings.
    pub fn mc_config(&self) -> &MonteCarloConfig {
        &self.mc
    }

    /// Bump sizes.
    pub fn bump_config(&self) -> &BumpConfig {
        &self.bumps
    }

    /// Date market data is fetched as of.
    pub fn as_of(&self) -> AsOf {
        self.context.pricing_date()
    }

    /// Anchor date of every curve and surface.
    pub fn market_date(&self) -> Date {
        self.as_of().date()
    }

    /// Valuation date of `view`: its override, else the market date.
    ///
    /// Only the valuation date moves under a pricing-date override; curves
    /// and surfaces stay anchored on the market date.
    pub fn valuation_date(&self, view: &InstrumentView<'_>) -> Date {
        view.pricing_date().unwrap_or_else(|| self.market_date())
    }

    /// `measure` of `instrument` under the context.
    ///
    /// # Errors
    /// `ExpiredInstrument` when the instrument is not priceable on the
    /// valuation date; otherwise whatever the pricing path reports.
    pub fn calc(&self, instrument: &Instrument, measure: RiskMeasure) -> Result<f64, PricingError> {
        self.calc_view(&InstrumentView::new(instrument), measure)
    }

    /// `measure` of a view.
    pub fn calc_view(&self, view: &InstrumentView<'_>, measure: RiskMeasure) -> Result<f64, PricingError> {
        self.check_valid(view)?;
        let value = match measure {
            RiskMeasure::Price => self.price(view)?,
            m if m.is_greek() => greeks::greek_measure(self, view, m)?,
            m => bond::measure(self, view, m)?,
        };
        debug!(
            instrument = view.instrument().name(),
            symbol = %view.instrument().symbol(),
            measure = %measure,
            value,
            "calc"
        );
        Ok(value)
    }

    /// Every measure in `measures`, in order; the first failure aborts.
    pub fn calc_many(&self, instrument: &Instrument, measures: &[RiskMeasure]) -> Result<Vec<f64>, PricingError> {
        let view = InstrumentView::new(instrument);
        measures.iter().map(|&m| self.calc_view(&view, m)).collect()
    }

    /// Price plus every greek that applies to the instrument.
    pub fn greeks(&self, instrument: &Instrument) -> Result<GreeksResult, PricingError> {
        let view = InstrumentView::new(instrument);
        self.check_valid(&view)?;
        greeks::all_greeks(self, &view)
    }

    /// Present value of a view in the instrument's pricing currency.
    ///
    /// Options are scaled by their notional; bonds are clean prices per
    /// 100 face.
    pub fn price(&self, view: &InstrumentView<'_>) -> Result<f64, PricingError> {
        match view.instrument().asset_class() {
            AssetClass::Equity => equity::price(self, view),
            AssetClass::Fx => fx::price(self, view),
            AssetClass::Bond => bond::price(self, view),
        }
    }

    /// Whether the instrument is well formed and alive on the market date.
    pub fn is_valid(&self, instrument: &Instrument) -> bool {
        self.check_valid(&InstrumentView::new(instrument)).is_ok()
    }

    fn check_valid(&self, view: &InstrumentView<'_>) -> Result<(), PricingError> {
        let instrument = view.instrument();
        instrument.validate()?;
        let valuation = self.valuation_date(view);
        let last = match instrument.asset_class() {
            AssetClass::Bond => return bond::check_settlement(instrument, valuation),
            _ => instrument.maturity(),
        };
        if valuation > last {
            return Err(PricingError::ExpiredInstrument(format!(
                "{} {} matured {last}, valuation {valuation}",
                instrument.name(),
                instrument.symbol()
            )));
        }
        Ok(())
    }

    /// Copy of `instrument` with every missing market input fetched and
    /// pinned, so repeated pricing does not hit the provider.
    ///
    /// Context overrides in force now are pinned too; a later context no
    /// longer reaches the resolved copy.
    pub fn resolve(&self, instrument: &Instrument) -> Result<Instrument, PricingError> {
        let mut resolved = instrument.clone();
        match instrument.asset_class() {
            AssetClass::Equity => equity::resolve(self, &mut resolved)?,
            AssetClass::Fx => fx::resolve(self, &mut resolved)?,
            AssetClass::Bond => bond::resolve(self, &mut resolved)?,
        }
        debug!(instrument = instrument.name(), symbol = %instrument.symbol(), "resolved market inputs");
        Ok(resolved)
    }

    /// Effective spot of a single-underlying equity or FX instrument.
    ///
    /// # Errors
    /// `UnsupportedOperation` for bonds and baskets.
    pub fn spot(&self, view: &InstrumentView<'_>) -> Result<f64, PricingError> {
        let instrument = view.instrument();
        let symbol = instrument.symbol();
        let pinned = instrument.market().spot;
        let base = match instrument {
            Instrument::BasketSnowball(_) => {
                return Err(PricingError::UnsupportedOperation(
                    "a basket has no single spot".into(),
                ))
            }
            _ => match instrument.asset_class() {
                AssetClass::Equity => self.base_spot(&symbol, pinned, false)?,
                AssetClass::Fx => self.base_spot(&symbol, pinned, true)?,
                AssetClass::Bond => {
                    return Err(PricingError::UnsupportedOperation(format!(
                        "{} has no spot",
                        instrument.name()
                    )))
                }
            },
        };
        positive("spot", view.apply_spot(base))
    }

    /// Spot before view overrides: pinned, context, then provider.
    pub(crate) fn base_spot(&self, symbol: &str, pinned: Option<f64>, fx: bool) -> Result<f64, PricingError> {
        let spot = match pinned.or_else(|| self.context.value(MarketObject::Spot, symbol)) {
            Some(s) => s,
            None if fx => self.market.exchange_rate(symbol, self.as_of())?,
            None => self.market.stock_price(symbol, self.as_of())?,
        };
        positive("spot", spot)
    }

    /// Discount curve of a view: the instrument's curve under the context
    /// adjustments, shifted by the view.
    pub fn discount_curve(&self, view: &InstrumentView<'_>) -> Result<ZeroCurve, PricingError> {
        let instrument = view.instrument();
        let curve = self.curve(instrument.discount_curve(), &instrument.symbol())?;
        shifted(curve, view.rate_shift())
    }

    /// Curve behind `curve_ref` on the market date, with the context's
    /// adjustment for its code applied.
    ///
    /// A bond yield curve pinned in the context for `symbol` replaces the
    /// fetched one.
    pub fn curve(&self, curve_ref: &CurveRef, symbol: &str) -> Result<ZeroCurve, PricingError> {
        let anchor = self.market_date();
        let as_of = self.as_of();
        let raw = match curve_ref {
            CurveRef::BondYield(code) => match self.context.bond_yield_curve(symbol) {
                Some(data) => bond_yield_zero_curve(anchor, data)?,
                None => bond_yield_zero_curve(anchor, &self.market.bond_yield_curve(code, as_of)?)?,
            },
            CurveRef::Shibor => shibor_zero_curve(anchor, &self.market.shibor_curve(as_of)?)?,
            CurveRef::Irs(kind) => irs_zero_curve(anchor, &self.market.irs_curve(kind, as_of)?, &BootstrapConfig::default())?,
            CurveRef::Flat(rate) => ZeroCurve::flat(anchor, *rate, Compounding::Continuous)?,
        };
        let adjustment = self.context.curve_adjustment(&curve_ref.code());
        if adjustment.is_identity() {
            return Ok(raw);
        }
        debug!(curve = %curve_ref, "applying context curve adjustment");
        Ok(adjustment.apply(&raw)?)
    }
}

pub(crate) fn shifted(curve: ZeroCurve, shift: f64) -> Result<ZeroCurve, PricingError> {
    if shift == 0.0 {
        Ok(curve)
    } else {
        Ok(curve.bump(shift)?)
    }
}

pub(crate) fn positive(what: &str, value: f64) -> Result<f64, PricingError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(PricingError::InvalidMarketData(format!("{what} {value} must be positive")))
    }
}

pub(crate) fn non_negative_volatility(value: f64) -> Result<f64, PricingError> {
    if value >= 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(PricingError::InvalidMarketData(format!("volatility {value} is negative")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextLayer;
    use crate::market::InMemoryMarketData;
    use approx::assert_relative_eq;
    use pricer_models::instruments::{EuropeanOption, MarketAttributes, OptionType};

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn call(curve: CurveRef) -> Instrument {
        Instrument::European(
            EuropeanOption::new("600000.SH", 100.0, d(2022, 8, 13), OptionType::Call)
                .with_curve(curve)
                .with_market(MarketAttributes::default().with_volatility(0.2)),
        )
    }

    fn market() -> InMemoryMarketData {
        InMemoryMarketData::new().with_stock_price("600000.SH", d(2021, 8, 13), 100.0)
    }

    #[test]
    fn test_spot_resolution_order() {
        let market = market();
        let mut ctx = PricingContext::at(d(2021, 8, 13));
        let option = call(CurveRef::Flat(0.05));
        let pricer = Pricer::new(&market, &ctx);
        assert_eq!(pricer.spot(&InstrumentView::new(&option)).unwrap(), 100.0);

        ctx.enter(ContextLayer::new().spot("600000.SH", 101.0));
        let pricer = Pricer::new(&market, &ctx);
        assert_eq!(pricer.spot(&InstrumentView::new(&option)).unwrap(), 101.0);

        let mut pinned = option.clone();
        if let Some(m) = pinned.market_mut() {
            m.spot = Some(102.0);
        }
        assert_eq!(pricer.spot(&InstrumentView::new(&pinned)).unwrap(), 102.0);

        let view = InstrumentView::new(&pinned).with(Override::Spot(103.0));
        assert_eq!(pricer.spot(&view).unwrap(), 103.0);
    }

    #[test]
    fn test_missing_market_data_is_reported() {
        let market = InMemoryMarketData::new();
        let ctx = PricingContext::at(d(2021, 8, 13));
        let pricer = Pricer::new(&market, &ctx);
        let err = pricer.calc(&call(CurveRef::Flat(0.05)), RiskMeasure::Price).unwrap_err();
        assert_eq!(err.kind(), "InvalidMarketData");
    }

    #[test]
    fn test_expired_instrument() {
        let market = market();
        let ctx = PricingContext::at(d(2023, 1, 4));
        let pricer = Pricer::new(&market, &ctx);
        let option = call(CurveRef::Flat(0.05));
        assert!(!pricer.is_valid(&option));
        assert!(matches!(
            pricer.calc(&option, RiskMeasure::Price),
            Err(PricingError::ExpiredInstrument(_))
        ));
    }

    #[test]
    fn test_context_parallel_shift_reaches_the_curve() {
        let market = market();
        let mut ctx = PricingContext::at(d(2021, 8, 13));
        let option = call(CurveRef::Flat(0.05));
        let base = Pricer::new(&market, &ctx)
            .discount_curve(&InstrumentView::new(&option))
            .unwrap();
        ctx.enter(ContextLayer::new().parallel_shift("FLAT", 100.0));
        let up = Pricer::new(&market, &ctx)
            .discount_curve(&InstrumentView::new(&option))
            .unwrap();
        let z0 = base.zero_rate(1.0, Compounding::Continuous).unwrap();
        let z1 = up.zero_rate(1.0, Compounding::Continuous).unwrap();
        assert_relative_eq!(z1 - z0, 0.01, epsilon = 1e-9);
    }

    #[test]
    fn test_calc_many_and_resolve() {
        let market = market();
        let ctx = PricingContext::at(d(2021, 8, 13));
        let pricer = Pricer::new(&market, &ctx);
        let option = call(CurveRef::Flat(0.05));
        let values = pricer
            .calc_many(&option, &[RiskMeasure::Price, RiskMeasure::Delta])
            .unwrap();
        assert_eq!(values.len(), 2);
        assert!(values[1] > 0.5 && values[1] < 0.8);

        let resolved = pricer.resolve(&option).unwrap();
        assert_eq!(resolved.market().spot, Some(100.0));
        let empty = InMemoryMarketData::new();
        let offline = Pricer::new(&empty, &ctx);
        assert_relative_eq!(
            offline.calc(&resolved, RiskMeasure::Price).unwrap(),
            values[0],
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_bond_measure_on_option_is_unsupported() {
        let market = market();
        let ctx = PricingContext::at(d(2021, 8, 13));
        let pricer = Pricer::new(&market, &ctx);
        assert!(matches!(
            pricer.calc(&call(CurveRef::Flat(0.05)), RiskMeasure::Ytm),
            Err(PricingError::UnsupportedOperation(_))
        ));
    }
}
