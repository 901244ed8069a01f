//! Single-underlying option terms.
//!
//! Values are reported per `notional` units of the underlying. Spot and
//! volatility resolve through [`MarketAttributes`] when not pinned.

use pricer_core::types::Date;

use super::error::InstrumentError;
use super::market::{CurveRef, MarketAttributes};
use super::payoff::OptionType;
use crate::analytical::{AsianMethod, BarrierMonitoring};

fn check_strike(strike: f64) -> Result<(), InstrumentError> {
    if !(strike > 0.0) || !strike.is_finite() {
        return Err(InstrumentError::InvalidStrike { strike });
    }
    Ok(())
}

pub(crate) fn check_notional(notional: f64) -> Result<(), InstrumentError> {
    if !(notional > 0.0) || !notional.is_finite() {
        return Err(InstrumentError::InvalidNotional { notional });
    }
    Ok(())
}

fn check_order(start: Date, end: Date, what: &str) -> Result<(), InstrumentError> {
    if start >= end {
        return Err(InstrumentError::dates(format!("{what}: {start} not before {end}")));
    }
    Ok(())
}

/// European call or put.
///
/// # Examples
/// ```
/// use pricer_core::types::Date;
/// use pricer_models::instruments::{CurveRef, EuropeanOption, OptionType};
///
/// let option = EuropeanOption::new("600000.SH", 10.0, Date::from_ymd(2022, 6, 30).unwrap(), OptionType::Call)
///     .with_notional(10_000.0)
///     .with_curve(CurveRef::Flat(0.02));
/// assert!(option.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EuropeanOption {
    /// Underlying symbol.
    pub underlying: String,
    /// Strike.
    pub strike: f64,
    /// Expiry date.
    pub expiry: Date,
    /// Call or put.
    pub option_type: OptionType,
    /// Units of underlying.
    pub notional: f64,
    /// Continuous dividend yield.
    pub dividend_yield: f64,
    /// Discount curve.
    pub discount_curve: CurveRef,
    /// Pinned market inputs.
    pub market: MarketAttributes,
}

impl EuropeanOption {
    /// One-unit option discounted on SHIBOR with no dividend.
    pub fn new(underlying: impl Into<String>, strike: f64, expiry: Date, option_type: OptionType) -> Self {
        Self {
            underlying: underlying.into(),
            strike,
            expiry,
            option_type,
            notional: 1.0,
            dividend_yield: 0.0,
            discount_curve: CurveRef::default(),
            market: MarketAttributes::default(),
        }
    }

    /// Sets the notional.
    pub fn with_notional(mut self, notional: f64) -> Self {
        self.notional = notional;
        self
    }

    /// Sets the discount curve.
    pub fn with_curve(mut self, curve: CurveRef) -> Self {
        self.discount_curve = curve;
        self
    }

    /// Sets the dividend yield.
    pub fn with_dividend_yield(mut self, q: f64) -> Self {
        self.dividend_yield = q;
        self
    }

    /// Pins market inputs.
    pub fn with_market(mut self, market: MarketAttributes) -> Self {
        self.market = market;
        self
    }

    /// Checks strike and notional.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        check_strike(self.strike)?;
        check_notional(self.notional)
    }
}

/// American option priced on a binomial tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AmericanOption {
    /// Contract terms shared with the European.
    pub terms: EuropeanOption,
    /// Tree steps per year.
    pub steps_per_year: u32,
}

impl AmericanOption {
    /// American version of `terms` with 252 steps per year.
    pub fn new(terms: EuropeanOption) -> Self {
        Self {
            terms,
            steps_per_year: 252,
        }
    }

    /// Sets the tree density.
    pub fn with_steps_per_year(mut self, steps: u32) -> Self {
        self.steps_per_year = steps;
        self
    }

    /// Checks the terms and the tree density.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        self.terms.validate()?;
        if self.steps_per_year == 0 {
            return Err(InstrumentError::parameter("steps_per_year must be positive"));
        }
        Ok(())
    }
}

/// Arithmetic-average-price option.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AsianOption {
    /// Contract terms; `expiry` is the last averaging date.
    pub terms: EuropeanOption,
    /// First averaging date.
    pub averaging_start: Date,
    /// Number of equally spaced fixings.
    pub observations: usize,
    /// Approximation used by the closed-form pricer.
    pub method: AsianMethod,
    /// Average of the fixings already observed.
    pub accrued_average: Option<f64>,
}

impl AsianOption {
    /// Asian on `terms` averaging from `averaging_start`.
    pub fn new(terms: EuropeanOption, averaging_start: Date, observations: usize) -> Self {
        Self {
            terms,
            averaging_start,
            observations,
            method: AsianMethod::default(),
            accrued_average: None,
        }
    }

    /// Sets the pricing method.
    pub fn with_method(mut self, method: AsianMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the realised average.
    pub fn with_accrued_average(mut self, average: f64) -> Self {
        self.accrued_average = Some(average);
        self
    }

    /// Checks terms, window and fixing count.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        self.terms.validate()?;
        if self.averaging_start > self.terms.expiry {
            return Err(InstrumentError::dates(format!(
                "averaging start {} after expiry {}",
                self.averaging_start, self.terms.expiry
            )));
        }
        if self.observations == 0 {
            return Err(InstrumentError::parameter("observations must be positive"));
        }
        if let Some(a) = self.accrued_average {
            if !(a > 0.0) {
                return Err(InstrumentError::parameter(format!("accrued average {a}")));
            }
        }
        Ok(())
    }
}

/// Up-and-out call or down-and-out put with a rebate paid at expiry.
///
/// The value is `notional · (participation · option + rebate leg)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KnockoutOption {
    /// Contract terms.
    pub terms: EuropeanOption,
    /// Trade start; barrier monitoring runs from here.
    pub start_date: Date,
    /// Knockout level.
    pub barrier: f64,
    /// Rebate per unit paid if knocked out.
    pub rebate: f64,
    /// Participation in the option payoff.
    pub participation: f64,
    /// Barrier monitoring frequency.
    pub monitoring: BarrierMonitoring,
}

impl KnockoutOption {
    /// Knockout on `terms` with full participation and daily monitoring.
    pub fn new(terms: EuropeanOption, start_date: Date, barrier: f64, rebate: f64) -> Self {
        Self {
            terms,
            start_date,
            barrier,
            rebate,
            participation: 1.0,
            monitoring: BarrierMonitoring::default(),
        }
    }

    /// Sets the participation rate.
    pub fn with_participation(mut self, participation: f64) -> Self {
        self.participation = participation;
        self
    }

    /// Sets the monitoring frequency.
    pub fn with_monitoring(mut self, monitoring: BarrierMonitoring) -> Self {
        self.monitoring = monitoring;
        self
    }

    /// Checks terms, barrier, rebate and dates.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        self.terms.validate()?;
        check_order(self.start_date, self.terms.expiry, "start/expiry")?;
        if !(self.barrier > 0.0) {
            return Err(InstrumentError::parameter(format!("barrier {}", self.barrier)));
        }
        if !(self.rebate >= 0.0) || !(self.participation >= 0.0) {
            return Err(InstrumentError::parameter(format!(
                "rebate {} and participation {} must be non-negative",
                self.rebate, self.participation
            )));
        }
        Ok(())
    }
}

/// Floating-strike lookback.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LookbackOption {
    /// Underlying symbol.
    pub underlying: String,
    /// Observation start.
    pub start_date: Date,
    /// Expiry.
    pub expiry: Date,
    /// Call pays `S_T − min`, put pays `max − S_T`.
    pub option_type: OptionType,
    /// Units of underlying.
    pub notional: f64,
    /// Minimum (call) or maximum (put) observed so far; spot if unset.
    pub running_extreme: Option<f64>,
    /// Continuous dividend yield.
    pub dividend_yield: f64,
    /// Discount curve.
    pub discount_curve: CurveRef,
    /// Pinned market inputs.
    pub market: MarketAttributes,
}

impl LookbackOption {
    /// One-unit lookback discounted on SHIBOR.
    pub fn new(underlying: impl Into<String>, start_date: Date, expiry: Date, option_type: OptionType) -> Self {
        Self {
            underlying: underlying.into(),
            start_date,
            expiry,
            option_type,
            notional: 1.0,
            running_extreme: None,
            dividend_yield: 0.0,
            discount_curve: CurveRef::default(),
            market: MarketAttributes::default(),
        }
    }

    /// Checks dates, notional and the running extreme.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        check_order(self.start_date, self.expiry, "start/expiry")?;
        check_notional(self.notional)?;
        if let Some(m) = self.running_extreme {
            if !(m > 0.0) {
                return Err(InstrumentError::parameter(format!("running extreme {m}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn euro() -> EuropeanOption {
        EuropeanOption::new("SPOT", 5.3, d(2021, 9, 3), OptionType::Call)
    }

    #[test]
    fn test_european_validation() {
        assert!(euro().validate().is_ok());
        let mut bad = euro();
        bad.strike = 0.0;
        assert!(matches!(bad.validate(), Err(InstrumentError::InvalidStrike { .. })));
        assert!(euro().with_notional(-1.0).validate().is_err());
    }

    #[test]
    fn test_knockout_validation() {
        let ko = KnockoutOption::new(euro(), d(2021, 6, 3), 5.5, 0.2);
        assert!(ko.validate().is_ok());
        assert_eq!(ko.participation, 1.0);
        let late = KnockoutOption::new(euro(), d(2021, 9, 3), 5.5, 0.2);
        assert!(matches!(late.validate(), Err(InstrumentError::InvalidDates { .. })));
        assert!(KnockoutOption::new(euro(), d(2021, 6, 3), 5.5, -0.1).validate().is_err());
    }

    #[test]
    fn test_asian_validation() {
        let asian = AsianOption::new(euro(), d(2021, 6, 3), 60);
        assert!(asian.validate().is_ok());
        assert!(AsianOption::new(euro(), d(2021, 10, 1), 60).validate().is_err());
        assert!(AsianOption::new(euro(), d(2021, 6, 3), 0).validate().is_err());
        assert!(asian.with_accrued_average(0.0).validate().is_err());
    }

    #[test]
    fn test_american_steps() {
        assert!(AmericanOption::new(euro()).validate().is_ok());
        assert!(AmericanOption::new(euro()).with_steps_per_year(0).validate().is_err());
    }

    #[test]
    fn test_lookback_validation() {
        let lb = LookbackOption::new("SPOT", d(2021, 1, 4), d(2021, 12, 31), OptionType::Put);
        assert!(lb.validate().is_ok());
        let mut bad = lb.clone();
        bad.running_extreme = Some(-1.0);
        assert!(bad.validate().is_err());
    }
}
