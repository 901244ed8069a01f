//! Thin, immutable what-if views over an instrument.
//!
//! A view borrows the instrument and carries the overrides a greek or a
//! scenario applies on top of it. Overrides win over everything the
//! instrument pins and everything the context provides. Applying an
//! override returns a new view; the instrument is never touched.

use pricer_core::types::Date;
use pricer_models::instruments::Instrument;

/// One what-if adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Override {
    /// Absolute spot (or FX rate) of a single-underlying instrument.
    Spot(f64),
    /// Multiplier on every resolved spot; composes multiplicatively.
    SpotScale(f64),
    /// Flat volatility replacing any pinned, context or surface value.
    Volatility(f64),
    /// Additive volatility shift; composes additively.
    VolatilityShift(f64),
    /// Additive shift of the dividend yield (foreign rate for FX).
    DividendShift(f64),
    /// Additive parallel shift of the discount curve, decimal.
    RateShift(f64),
    /// Valuation date; market data stays as of the context date.
    PricingDate(Date),
}

/// An instrument seen through a set of overrides.
///
/// # Examples
/// ```
/// use pricer_core::types::Date;
/// use pricer_models::instruments::{EuropeanOption, Instrument, OptionType};
/// use pricer_pricing::pricers::{InstrumentView, Override};
///
/// let call = Instrument::European(EuropeanOption::new(
///     "600000.SH", 10.0, Date::from_ymd(2022, 6, 30).unwrap(), OptionType::Call,
/// ));
/// let view = InstrumentView::new(&call)
///     .with(Override::SpotScale(1.01))
///     .with(Override::SpotScale(1.01))
///     .with(Override::VolatilityShift(0.01));
/// assert!((view.spot_scale() - 1.0201).abs() < 1e-12);
/// assert_eq!(view.volatility_shift(), 0.01);
/// assert!(view.spot().is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentView<'i> {
    instrument: &'i Instrument,
    spot: Option<f64>,
    spot_scale: f64,
    volatility: Option<f64>,
    volatility_shift: f64,
    dividend_shift: f64,
    rate_shift: f64,
    pricing_date: Option<Date>,
}

impl<'i> InstrumentView<'i> {
    /// View with no overrides.
    pub fn new(instrument: &'i Instrument) -> Self {
        Self {
            instrument,
            spot: None,
            spot_scale: 1.0,
            volatility: None,
            volatility_shift: 0.0,
            dividend_shift: 0.0,
            rate_shift: 0.0,
            pricing_date: None,
        }
    }

    /// New view with `adjustment` applied on top of this one.
    #[must_use]
    pub fn with(mut self, adjustment: Override) -> Self {
        match adjustment {
            Override::Spot(s) => self.spot = Some(s),
            Override::SpotScale(k) => self.spot_scale *= k,
            Override::Volatility(v) => self.volatility = Some(v),
            Override::VolatilityShift(dv) => self.volatility_shift += dv,
            Override::DividendShift(dq) => self.dividend_shift += dq,
            Override::RateShift(dr) => self.rate_shift += dr,
            Override::PricingDate(d) => self.pricing_date = Some(d),
        }
        self
    }

    /// New view with every adjustment applied in order.
    #[must_use]
    pub fn with_all(self, adjustments: impl IntoIterator<Item = Override>) -> Self {
        adjustments.into_iter().fold(self, Self::with)
    }

    /// The underlying instrument.
    pub fn instrument(&self) -> &'i Instrument {
        self.instrument
    }

    /// Absolute spot override.
    pub fn spot(&self) -> Option<f64> {
        self.spot
    }

    /// Spot multiplier.
    pub fn spot_scale(&self) -> f64 {
        self.spot_scale
    }

    /// Flat volatility override.
    pub fn volatility(&self) -> Option<f64> {
        self.volatility
    }

    /// Additive volatility shift.
    pub fn volatility_shift(&self) -> f64 {
        self.volatility_shift
    }

    /// Additive dividend (foreign rate) shift.
    pub fn dividend_shift(&self) -> f64 {
        self.dividend_shift
    }

    /// Parallel discount-curve shift.
    pub fn rate_shift(&self) -> f64 {
        self.rate_shift
    }

    /// Valuation-date override.
    pub fn pricing_date(&self) -> Option<Date> {
        self.pricing_date
    }

    /// Whether no override is in force.
    pub fn is_plain(&self) -> bool {
        *self == Self::new(self.instrument)
    }

    /// Effective spot given the resolved base spot.
    pub(crate) fn apply_spot(&self, resolved: f64) -> f64 {
        self.spot.unwrap_or(resolved) * self.spot_scale
    }

    /// Effective volatility given the resolved base volatility.
    pub(crate) fn apply_volatility(&self, resolved: f64) -> f64 {
        self.volatility.unwrap_or(resolved) + self.volatility_shift
    }
}

impl<'i> From<&'i Instrument> for InstrumentView<'i> {
    fn from(instrument: &'i Instrument) -> Self {
        Self::new(instrument)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_models::instruments::{EuropeanOption, OptionType};

    fn call() -> Instrument {
        Instrument::European(EuropeanOption::new(
            "600000.SH",
            10.0,
            Date::from_ymd(2022, 6, 30).unwrap(),
            OptionType::Call,
        ))
    }

    #[test]
    fn test_plain_view() {
        let c = call();
        let view = InstrumentView::from(&c);
        assert!(view.is_plain());
        assert_eq!(view.apply_spot(5.0), 5.0);
        assert_eq!(view.apply_volatility(0.2), 0.2);
    }

    #[test]
    fn test_absolute_overrides_win_then_shift() {
        let c = call();
        let view = InstrumentView::new(&c).with_all([
            Override::Spot(5.5),
            Override::SpotScale(1.1),
            Override::Volatility(0.3),
            Override::VolatilityShift(-0.01),
            Override::RateShift(1e-4),
            Override::RateShift(1e-4),
        ]);
        assert!(!view.is_plain());
        assert!((view.apply_spot(5.0) - 6.05).abs() < 1e-12);
        assert!((view.apply_volatility(0.2) - 0.29).abs() < 1e-12);
        assert!((view.rate_shift() - 2e-4).abs() < 1e-18);
    }

    #[test]
    fn test_views_are_independent() {
        let c = call();
        let base = InstrumentView::new(&c);
        let bumped = base.with(Override::DividendShift(0.01));
        assert_eq!(base.dividend_shift(), 0.0);
        assert_eq!(bumped.dividend_shift(), 0.01);
        assert!(std::ptr::eq(base.instrument(), bumped.instrument()));
    }
}
