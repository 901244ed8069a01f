//! Positions and their aggregation.
//!
//! A [`Portfolio`] holds signed quantities of shared instruments. Its
//! [`calc`](Portfolio::calc) sums a risk measure over positions weighted
//! by quantity. A position that fails to price is logged and reported as a
//! sentinel in the [`PortfolioValuation`]; the remaining positions still
//! contribute to the total.

mod error;
mod ids;

pub use error::PortfolioError;
pub use ids::PositionId;

use std::sync::Arc;

use pricer_core::types::PricingError;
use pricer_models::instruments::Instrument;
use pricer_pricing::context::{ContextLayer, PricingContext};
use pricer_pricing::greeks::GreeksResult;
use pricer_pricing::market::{AsOf, MarketDataProvider};
use pricer_pricing::measure::RiskMeasure;
use pricer_pricing::pricers::Pricer;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::parallel::ParallelConfig;

/// A signed holding of an instrument.
#[derive(Clone, Debug)]
pub struct Position {
    id: PositionId,
    instrument: Arc<Instrument>,
    quantity: f64,
}

impl Position {
    /// Creates a position.
    pub fn new(id: impl Into<PositionId>, instrument: impl Into<Arc<Instrument>>, quantity: f64) -> Self {
        Self {
            id: id.into(),
            instrument: instrument.into(),
            quantity,
        }
    }

    /// Position ID.
    #[inline]
    pub fn id(&self) -> &PositionId {
        &self.id
    }

    /// Held instrument.
    #[inline]
    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    /// Shared handle to the instrument.
    #[inline]
    pub fn instrument_handle(&self) -> Arc<Instrument> {
        Arc::clone(&self.instrument)
    }

    /// Signed quantity; negative is short.
    #[inline]
    pub fn quantity(&self) -> f64 {
        self.quantity
    }
}

/// Result of one position within a valuation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionValue {
    /// Position ID.
    pub id: PositionId,
    /// Quantity the value is weighted by.
    pub quantity: f64,
    /// Unit value of the measure; `None` when pricing failed.
    pub value: Option<f64>,
    /// Failure message when pricing failed.
    pub error: Option<String>,
}

impl PositionValue {
    /// Quantity-weighted value.
    pub fn weighted(&self) -> Option<f64> {
        self.value.map(|v| v * self.quantity)
    }
}

/// A measure aggregated over a portfolio.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortfolioValuation {
    /// Aggregated measure.
    pub measure: RiskMeasure,
    /// Sum of the quantity-weighted values that priced.
    pub total: f64,
    /// Per-position results in portfolio order.
    pub positions: Vec<PositionValue>,
}

impl PortfolioValuation {
    /// Number of positions that priced.
    pub fn successful_count(&self) -> usize {
        self.positions.iter().filter(|p| p.value.is_some()).count()
    }

    /// Number of positions that failed.
    pub fn failed_count(&self) -> usize {
        self.positions.len() - self.successful_count()
    }

    /// Whether every position priced.
    pub fn is_complete(&self) -> bool {
        self.positions.iter().all(|p| p.value.is_some())
    }

    /// Result of one position.
    pub fn get(&self, id: &PositionId) -> Option<&PositionValue> {
        self.positions.iter().find(|p| &p.id == id)
    }
}

/// Price and greeks aggregated over a portfolio.
#[derive(Clone, Debug, PartialEq)]
pub struct PortfolioGreeks {
    /// Quantity-weighted sum of the positions that priced.
    pub total: GreeksResult,
    /// Unit greeks per position in portfolio order; `None` when pricing failed.
    pub positions: Vec<(PositionId, Option<GreeksResult>)>,
}

/// A named set of positions.
///
/// # Examples
///
/// ```
/// use pricer_core::types::Date;
/// use pricer_models::instruments::{CurveRef, EuropeanOption, Instrument, MarketAttributes, OptionType};
/// use pricer_pricing::context::PricingContext;
/// use pricer_pricing::market::InMemoryMarketData;
/// use pricer_pricing::measure::RiskMeasure;
/// use pricer_risk::portfolio::{Portfolio, Position};
///
/// let option = |t| {
///     Instrument::European(
///         EuropeanOption::new("600000.SH", 100.0, Date::from_ymd(2022, 8, 13).unwrap(), t)
///             .with_curve(CurveRef::Flat(0.05))
///             .with_market(MarketAttributes::default().with_spot(100.0).with_volatility(0.2)),
///     )
/// };
/// let mut book = Portfolio::new("straddle");
/// book.add(Position::new("call", option(OptionType::Call), 2.0)).unwrap();
/// book.add(Position::new("put", option(OptionType::Put), -1.0)).unwrap();
///
/// let market = InMemoryMarketData::new();
/// let ctx = PricingContext::at(Date::from_ymd(2021, 8, 13).unwrap());
/// let valuation = book.calc(&market, &ctx, RiskMeasure::Price);
/// assert!(valuation.is_complete());
/// assert!(valuation.total > 0.0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Portfolio {
    name: String,
    pricing_date: Option<AsOf>,
    positions: Vec<Position>,
    parallel: ParallelConfig,
}

impl Portfolio {
    /// Empty portfolio priced at the context's date.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Prices the portfolio as of `date` whatever the caller's context date.
    pub fn with_pricing_date(mut self, date: impl Into<AsOf>) -> Self {
        self.pricing_date = Some(date.into());
        self
    }

    /// Sets the parallel configuration.
    pub fn with_parallel_config(mut self, config: ParallelConfig) -> Self {
        self.parallel = config;
        self
    }

    /// Portfolio name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Own pricing date, if any.
    pub fn pricing_date(&self) -> Option<AsOf> {
        self.pricing_date
    }

    /// Positions in insertion order.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the portfolio holds no positions.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position by ID.
    pub fn get(&self, id: &PositionId) -> Option<&Position> {
        self.positions.iter().find(|p| &p.id == id)
    }

    /// Adds a position.
    ///
    /// # Errors
    /// `DuplicatePosition` when the ID is taken; `InvalidQuantity` for a
    /// NaN or infinite quantity.
    pub fn add(&mut self, position: Position) -> Result<(), PortfolioError> {
        if !position.quantity.is_finite() {
            return Err(PortfolioError::InvalidQuantity {
                id: position.id.to_string(),
                quantity: position.quantity,
            });
        }
        if self.get(&position.id).is_some() {
            return Err(PortfolioError::DuplicatePosition(position.id.to_string()));
        }
        self.positions.push(position);
        Ok(())
    }

    /// Removes and returns a position.
    pub fn remove(&mut self, id: &PositionId) -> Result<Position, PortfolioError> {
        let index = self
            .positions
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| PortfolioError::PositionNotFound(id.to_string()))?;
        Ok(self.positions.remove(index))
    }

    /// Context the portfolio prices under: `context` with the portfolio's
    /// own pricing date layered on top.
    pub fn valuation_context(&self, context: &PricingContext) -> PricingContext {
        let mut ctx = context.clone();
        if let Some(date) = self.pricing_date {
            ctx.enter(ContextLayer::new().pricing_date(date));
        }
        ctx
    }

    /// `measure` summed over positions, priced against `market` under
    /// `context` and the portfolio's pricing date.
    pub fn calc<P>(&self, market: &P, context: &PricingContext, measure: RiskMeasure) -> PortfolioValuation
    where
        P: MarketDataProvider + Sync + ?Sized,
    {
        let ctx = self.valuation_context(context);
        let pricer = Pricer::new(market, &ctx).with_mc_config(self.parallel.mc);
        self.calc_with(&pricer, measure)
    }

    /// `measure` summed over positions with a caller-built pricer.
    ///
    /// The portfolio's pricing date does not apply; the pricer's context
    /// is used as is.
    pub fn calc_with<P>(&self, pricer: &Pricer<'_, P>, measure: RiskMeasure) -> PortfolioValuation
    where
        P: MarketDataProvider + Sync + ?Sized,
    {
        let results = self.each(|p| pricer.calc(p.instrument(), measure));
        let mut total: f64 = 0.0;
        let positions = self
            .positions
            .iter()
            .zip(results)
            .map(|(p, result)| {
                let (value, error) = match result {
                    Ok(v) => {
                        total += v * p.quantity;
                        (Some(v), None)
                    }
                    Err(e) => {
                        warn!(
                            portfolio = %self.name,
                            position = %p.id,
                            measure = %measure,
                            error = %e,
                            "position failed, excluded from total"
                        );
                        (None, Some(e.to_string()))
                    }
                };
                PositionValue {
                    id: p.id.clone(),
                    quantity: p.quantity,
                    value,
                    error,
                }
            })
            .collect();
        debug!(portfolio = %self.name, measure = %measure, total, "portfolio calc");
        PortfolioValuation {
            measure,
            total,
            positions,
        }
    }

    /// Price and greeks summed over positions.
    pub fn greeks<P>(&self, market: &P, context: &PricingContext) -> PortfolioGreeks
    where
        P: MarketDataProvider + Sync + ?Sized,
    {
        let ctx = self.valuation_context(context);
        let pricer = Pricer::new(market, &ctx).with_mc_config(self.parallel.mc);
        let results = self.each(|p| pricer.greeks(p.instrument()));
        let mut total = GreeksResult::default();
        let positions = self
            .positions
            .iter()
            .zip(results)
            .map(|(p, result)| match result {
                Ok(g) => {
                    total += g.scaled(p.quantity);
                    (p.id.clone(), Some(g))
                }
                Err(e) => {
                    warn!(portfolio = %self.name, position = %p.id, error = %e, "position greeks failed");
                    (p.id.clone(), None)
                }
            })
            .collect();
        PortfolioGreeks { total, positions }
    }

    fn each<T, F>(&self, f: F) -> Vec<Result<T, PricingError>>
    where
        T: Send,
        F: Fn(&Position) -> Result<T, PricingError> + Sync + Send,
    {
        if self.parallel.should_parallelise(self.positions.len()) {
            self.positions.par_iter().map(f).collect()
        } else {
            self.positions.iter().map(f).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pricer_core::types::Date;
    use pricer_models::instruments::{CurveRef, EuropeanOption, MarketAttributes, OptionType};
    use pricer_pricing::market::InMemoryMarketData;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn option(strike: f64, option_type: OptionType) -> Instrument {
        Instrument::European(
            EuropeanOption::new("600000.SH", strike, d(2022, 8, 13), option_type)
                .with_curve(CurveRef::Flat(0.05))
                .with_market(MarketAttributes::default().with_volatility(0.2)),
        )
    }

    fn market() -> InMemoryMarketData {
        InMemoryMarketData::new()
            .with_stock_price("600000.SH", d(2021, 8, 13), 100.0)
            .with_stock_price("600000.SH", d(2021, 9, 13), 110.0)
    }

    fn book() -> Portfolio {
        let mut book = Portfolio::new("book");
        book.add(Position::new("C100", option(100.0, OptionType::Call), 3.0)).unwrap();
        book.add(Position::new("P95", option(95.0, OptionType::Put), -2.0)).unwrap();
        book
    }

    #[test]
    fn test_add_and_remove() {
        let mut book = book();
        assert_eq!(book.len(), 2);
        assert_eq!(
            book.add(Position::new("C100", option(90.0, OptionType::Call), 1.0)),
            Err(PortfolioError::DuplicatePosition("C100".into()))
        );
        assert!(matches!(
            book.add(Position::new("X", option(90.0, OptionType::Call), f64::INFINITY)),
            Err(PortfolioError::InvalidQuantity { .. })
        ));
        let removed = book.remove(&PositionId::new("P95")).unwrap();
        assert_eq!(removed.quantity(), -2.0);
        assert!(book.remove(&PositionId::new("P95")).is_err());
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_total_is_quantity_weighted_sum() {
        let market = market();
        let ctx = PricingContext::at(d(2021, 8, 13));
        let book = book();
        let valuation = book.calc(&market, &ctx, RiskMeasure::Price);

        let pricer = Pricer::new(&market, &ctx);
        let expected: f64 = book
            .positions()
            .iter()
            .map(|p| p.quantity() * pricer.calc(p.instrument(), RiskMeasure::Price).unwrap())
            .sum();
        assert_relative_eq!(valuation.total, expected, epsilon = 1e-12);
        assert!(valuation.is_complete());
        assert_relative_eq!(
            valuation.get(&PositionId::new("P95")).unwrap().weighted().unwrap(),
            -2.0 * pricer.calc(&option(95.0, OptionType::Put), RiskMeasure::Price).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_failed_position_is_a_sentinel() {
        let market = market();
        let ctx = PricingContext::at(d(2021, 8, 13));
        let mut book = book();
        let unpriced = Instrument::European(EuropeanOption::new("000001.SZ", 10.0, d(2022, 1, 4), OptionType::Call));
        book.add(Position::new("missing", unpriced, 5.0)).unwrap();

        let valuation = book.calc(&market, &ctx, RiskMeasure::Price);
        assert_eq!(valuation.failed_count(), 1);
        assert_eq!(valuation.successful_count(), 2);
        let failed = valuation.get(&PositionId::new("missing")).unwrap();
        assert!(failed.value.is_none());
        assert!(failed.error.as_deref().unwrap().contains("market data"));

        let complete = self::book().calc(&market, &ctx, RiskMeasure::Price);
        assert_relative_eq!(valuation.total, complete.total, epsilon = 1e-12);
    }

    #[test]
    fn test_own_pricing_date_moves_the_market() {
        let market = market();
        let ctx = PricingContext::at(d(2021, 8, 13));
        let book = book();
        let base = book.calc(&market, &ctx, RiskMeasure::Price);
        let later = book.clone().with_pricing_date(d(2021, 9, 13)).calc(&market, &ctx, RiskMeasure::Price);
        let entered = {
            let mut ctx = ctx.clone();
            ctx.enter(ContextLayer::new().pricing_date(d(2021, 9, 13)));
            book.calc(&market, &ctx, RiskMeasure::Price)
        };
        assert!(later.total > base.total);
        assert_relative_eq!(later.total, entered.total, epsilon = 1e-12);
        assert_eq!(ctx.depth(), 1);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let market = market();
        let ctx = PricingContext::at(d(2021, 8, 13));
        let mut serial = Portfolio::new("serial").with_parallel_config(ParallelConfig::new().with_parallel_threshold(usize::MAX));
        let mut parallel = Portfolio::new("parallel").with_parallel_config(ParallelConfig::new().with_parallel_threshold(0));
        for i in 0..24 {
            let strike = 80.0 + 2.0 * i as f64;
            let kind = if i % 2 == 0 { OptionType::Call } else { OptionType::Put };
            let instrument = Arc::new(option(strike, kind));
            serial.add(Position::new(format!("P{i}"), Arc::clone(&instrument), i as f64 - 10.0)).unwrap();
            parallel.add(Position::new(format!("P{i}"), instrument, i as f64 - 10.0)).unwrap();
        }
        let a = serial.calc(&market, &ctx, RiskMeasure::Delta);
        let b = parallel.calc(&market, &ctx, RiskMeasure::Delta);
        assert_eq!(a.positions, b.positions);
        assert_relative_eq!(a.total, b.total, epsilon = 1e-9);
    }

    #[test]
    fn test_greeks_aggregate() {
        let market = market();
        let ctx = PricingContext::at(d(2021, 8, 13));
        let book = book();
        let greeks = book.greeks(&market, &ctx);
        let price = book.calc(&market, &ctx, RiskMeasure::Price).total;
        let delta = book.calc(&market, &ctx, RiskMeasure::Delta).total;
        assert_relative_eq!(greeks.total.price, price, epsilon = 1e-10);
        assert_relative_eq!(greeks.total.delta.unwrap(), delta, epsilon = 1e-8);
        assert!(greeks.positions.iter().all(|(_, g)| g.is_some()));
    }
}
