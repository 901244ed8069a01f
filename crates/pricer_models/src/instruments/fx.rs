//! FX instruments on a currency pair.
//!
//! Notionals are in units of the base (foreign) currency and values in the
//! quote (domestic) currency, except for the quanto products, which pay a
//! fixed amount in the domestic currency whatever the quoted pair.

use pricer_core::types::{CurrencyPair, Date};

use super::equity::check_notional;
use super::error::InstrumentError;
use super::market::{CurveRef, MarketAttributes};
use super::payoff::OptionType;
use crate::analytical::PremiumQuote;

fn check_positive(value: f64, what: &str) -> Result<(), InstrumentError> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(InstrumentError::parameter(format!("{what} must be positive, got {value}")));
    }
    Ok(())
}

fn check_quanto(quanto_volatility: f64, correlation: f64) -> Result<(), InstrumentError> {
    if !(quanto_volatility >= 0.0) {
        return Err(InstrumentError::parameter(format!("quanto volatility {quanto_volatility}")));
    }
    if !(-1.0..=1.0).contains(&correlation) {
        return Err(InstrumentError::parameter(format!("correlation {correlation}")));
    }
    Ok(())
}

/// European FX option priced with Garman-Kohlhagen.
///
/// # Examples
/// ```
/// use pricer_core::types::{CurrencyPair, Date};
/// use pricer_models::instruments::{FxVanilla, OptionType};
///
/// let pair: CurrencyPair = "USD/CNY".parse().unwrap();
/// let call = FxVanilla::new(pair, 6.6, Date::from_ymd(2021, 9, 16).unwrap(), OptionType::Call)
///     .with_notional(50_000_000.0);
/// assert!(call.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FxVanilla {
    /// Currency pair; the quote currency is domestic.
    pub pair: CurrencyPair,
    /// Strike in quote currency per base unit.
    pub strike: f64,
    /// Expiry.
    pub expiry: Date,
    /// Call or put on the base currency.
    pub option_type: OptionType,
    /// Base-currency notional.
    pub notional: f64,
    /// Premium quotation.
    pub premium: PremiumQuote,
    /// Domestic discount curve.
    pub domestic_curve: CurveRef,
    /// Pinned spot and volatility.
    pub market: MarketAttributes,
}

impl FxVanilla {
    /// One-unit option discounted on SHIBOR.
    pub fn new(pair: CurrencyPair, strike: f64, expiry: Date, option_type: OptionType) -> Self {
        Self {
            pair,
            strike,
            expiry,
            option_type,
            notional: 1.0,
            premium: PremiumQuote::Price,
            domestic_curve: CurveRef::default(),
            market: MarketAttributes::default(),
        }
    }

    /// Sets the notional.
    pub fn with_notional(mut self, notional: f64) -> Self {
        self.notional = notional;
        self
    }

    /// Pins market inputs.
    pub fn with_market(mut self, market: MarketAttributes) -> Self {
        self.market = market;
        self
    }

    /// Checks strike and notional.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        if !(self.strike > 0.0) {
            return Err(InstrumentError::InvalidStrike { strike: self.strike });
        }
        check_notional(self.notional)
    }
}

/// Outright FX forward: buy `notional` base units at `strike` on delivery.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FxForward {
    /// Currency pair.
    pub pair: CurrencyPair,
    /// Contract rate.
    pub strike: f64,
    /// Delivery date.
    pub delivery: Date,
    /// Base-currency notional; negative sells.
    pub notional: f64,
    /// Domestic discount curve.
    pub domestic_curve: CurveRef,
    /// Pinned spot.
    pub market: MarketAttributes,
}

impl FxForward {
    /// Unit forward discounted on SHIBOR.
    pub fn new(pair: CurrencyPair, strike: f64, delivery: Date) -> Self {
        Self {
            pair,
            strike,
            delivery,
            notional: 1.0,
            domestic_curve: CurveRef::default(),
            market: MarketAttributes::default(),
        }
    }

    /// Checks the contract rate and notional.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        if !(self.strike > 0.0) {
            return Err(InstrumentError::InvalidStrike { strike: self.strike });
        }
        if self.notional == 0.0 || !self.notional.is_finite() {
            return Err(InstrumentError::InvalidNotional { notional: self.notional });
        }
        Ok(())
    }
}

/// Cash-or-nothing FX digital paying `payout` domestic units.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FxDigital {
    /// Currency pair.
    pub pair: CurrencyPair,
    /// Strike.
    pub strike: f64,
    /// Expiry.
    pub expiry: Date,
    /// Pays above (call) or below (put) the strike.
    pub option_type: OptionType,
    /// Domestic amount paid when in the money.
    pub payout: f64,
    /// Domestic discount curve.
    pub domestic_curve: CurveRef,
    /// Pinned spot and volatility.
    pub market: MarketAttributes,
}

impl FxDigital {
    /// Digital discounted on SHIBOR.
    pub fn new(pair: CurrencyPair, strike: f64, expiry: Date, option_type: OptionType, payout: f64) -> Self {
        Self {
            pair,
            strike,
            expiry,
            option_type,
            payout,
            domestic_curve: CurveRef::default(),
            market: MarketAttributes::default(),
        }
    }

    /// Checks strike and payout.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        if !(self.strike > 0.0) {
            return Err(InstrumentError::InvalidStrike { strike: self.strike });
        }
        check_positive(self.payout, "payout")
    }
}

/// Digital on a quoted pair paying a fixed domestic amount.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FxQuantoDigital {
    /// Terms on the quoted pair.
    pub digital: FxDigital,
    /// Volatility of the domestic/payout pair.
    pub quanto_volatility: f64,
    /// Correlation between the quoted and payout pairs.
    pub correlation: f64,
}

impl FxQuantoDigital {
    /// Quanto version of `digital`.
    pub fn new(digital: FxDigital, quanto_volatility: f64, correlation: f64) -> Self {
        Self {
            digital,
            quanto_volatility,
            correlation,
        }
    }

    /// Checks the digital and the quanto inputs.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        self.digital.validate()?;
        check_quanto(self.quanto_volatility, self.correlation)
    }
}

/// Range accrual on a quoted pair paying in the domestic currency.
///
/// Pays `notional · coupon · (fixings inside [lower, upper]) / n` on the
/// payment date.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FxQuantoRangeAccrual {
    /// Quoted pair.
    pub pair: CurrencyPair,
    /// Lower bound of the range.
    pub lower: f64,
    /// Upper bound of the range.
    pub upper: f64,
    /// Fixing dates, ascending.
    pub observation_dates: Vec<Date>,
    /// Fixings already observed, keyed by date.
    pub fixings: Vec<(Date, f64)>,
    /// Payment date.
    pub payment_date: Date,
    /// Coupon paid for a full accrual.
    pub coupon: f64,
    /// Domestic notional.
    pub notional: f64,
    /// Volatility of the domestic/payout pair.
    pub quanto_volatility: f64,
    /// Correlation between the quoted and payout pairs.
    pub correlation: f64,
    /// Domestic discount curve.
    pub domestic_curve: CurveRef,
    /// Pinned spot and volatility.
    pub market: MarketAttributes,
}

impl FxQuantoRangeAccrual {
    /// Range accrual with no past fixings, discounted on SHIBOR.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pair: CurrencyPair,
        lower: f64,
        upper: f64,
        observation_dates: Vec<Date>,
        payment_date: Date,
        coupon: f64,
        quanto_volatility: f64,
        correlation: f64,
    ) -> Self {
        Self {
            pair,
            lower,
            upper,
            observation_dates,
            fixings: Vec::new(),
            payment_date,
            coupon,
            notional: 1.0,
            quanto_volatility,
            correlation,
            domestic_curve: CurveRef::default(),
            market: MarketAttributes::default(),
        }
    }

    /// Recorded fixing on `date`, if any.
    pub fn fixing(&self, date: Date) -> Option<f64> {
        self.fixings.iter().find(|(d, _)| *d == date).map(|(_, v)| *v)
    }

    /// Last observation date.
    pub fn last_observation(&self) -> Option<Date> {
        self.observation_dates.last().copied()
    }

    /// Checks range, dates and quanto inputs.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        if !(self.lower > 0.0 && self.upper > self.lower) {
            return Err(InstrumentError::parameter(format!("range [{}, {}]", self.lower, self.upper)));
        }
        if self.observation_dates.is_empty() || !self.observation_dates.windows(2).all(|w| w[0] < w[1]) {
            return Err(InstrumentError::dates("observation dates must be non-empty and ascending"));
        }
        if let Some(last) = self.last_observation() {
            if last > self.payment_date {
                return Err(InstrumentError::dates(format!(
                    "last observation {last} after payment {}",
                    self.payment_date
                )));
            }
        }
        check_notional(self.notional)?;
        check_quanto(self.quanto_volatility, self.correlation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn usdcny() -> CurrencyPair {
        "USD/CNY".parse().unwrap()
    }

    #[test]
    fn test_vanilla_validation() {
        let call = FxVanilla::new(usdcny(), 6.6, d(2021, 9, 16), OptionType::Call);
        assert!(call.validate().is_ok());
        let bad = FxVanilla::new(usdcny(), -6.6, d(2021, 9, 16), OptionType::Call);
        assert!(matches!(bad.validate(), Err(InstrumentError::InvalidStrike { .. })));
    }

    #[test]
    fn test_forward_allows_short() {
        let mut fwd = FxForward::new(usdcny(), 6.5, d(2021, 11, 22));
        fwd.notional = -1_000_000.0;
        assert!(fwd.validate().is_ok());
        fwd.notional = 0.0;
        assert!(fwd.validate().is_err());
    }

    #[test]
    fn test_quanto_correlation_bounds() {
        let digital = FxDigital::new(usdcny(), 6.5, d(2021, 11, 22), OptionType::Call, 100.0);
        assert!(FxQuantoDigital::new(digital.clone(), 0.08, 0.3).validate().is_ok());
        assert!(FxQuantoDigital::new(digital, 0.08, 1.3).validate().is_err());
    }

    #[test]
    fn test_range_accrual_checks() {
        let dates = vec![d(2021, 9, 1), d(2021, 10, 1), d(2021, 11, 1)];
        let mut ra = FxQuantoRangeAccrual::new(usdcny(), 6.3, 6.7, dates, d(2021, 11, 3), 0.05, 0.08, 0.2);
        assert!(ra.validate().is_ok());
        ra.fixings.push((d(2021, 9, 1), 6.45));
        assert_eq!(ra.fixing(d(2021, 9, 1)), Some(6.45));
        assert_eq!(ra.fixing(d(2021, 10, 1)), None);
        ra.payment_date = d(2021, 10, 15);
        assert!(ra.validate().is_err());
    }
}
