//! Snowball autocallables on a single underlying or a worst-of basket.

use pricer_core::types::{Calendar, Date};

use super::equity::check_notional;
use super::error::InstrumentError;
use super::market::{CurveRef, MarketAttributes};

/// Loss profile once the knock-in barrier has been touched.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum KnockInPayoff {
    /// Linear participation in the fall below the reference.
    Return,
    /// Short put struck at `strike`.
    Vanilla {
        /// Put strike.
        strike: f64,
    },
    /// Short put spread between two strikes.
    Spreads {
        /// Lower strike, where the loss stops growing.
        lower: f64,
        /// Upper strike, where the loss starts.
        upper: f64,
    },
}

impl KnockInPayoff {
    /// Loss per unit notional (non-positive) for a terminal level measured
    /// against `reference`.
    ///
    /// # Examples
    /// ```
    /// use pricer_models::instruments::KnockInPayoff;
    ///
    /// assert!((KnockInPayoff::Return.loss(4.5, 5.0) + 0.1).abs() < 1e-12);
    /// assert_eq!(KnockInPayoff::Return.loss(5.5, 5.0), 0.0);
    /// let spread = KnockInPayoff::Spreads { lower: 4.0, upper: 5.0 };
    /// assert!((spread.loss(3.0, 5.0) + 0.2).abs() < 1e-12);
    /// ```
    pub fn loss(&self, terminal: f64, reference: f64) -> f64 {
        match *self {
            KnockInPayoff::Return => (terminal / reference - 1.0).min(0.0),
            KnockInPayoff::Vanilla { strike } => -(strike - terminal).max(0.0) / reference,
            KnockInPayoff::Spreads { lower, upper } => {
                -((upper - terminal).max(0.0) - (lower - terminal).max(0.0)) / reference
            }
        }
    }

    fn validate(&self) -> Result<(), InstrumentError> {
        match *self {
            KnockInPayoff::Return => Ok(()),
            KnockInPayoff::Vanilla { strike } if strike > 0.0 => Ok(()),
            KnockInPayoff::Spreads { lower, upper } if lower > 0.0 && lower < upper => Ok(()),
            other => Err(InstrumentError::parameter(format!("knock-in payoff {other:?}"))),
        }
    }
}

/// Observation schedule and coupon terms shared by single and basket
/// snowballs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnowballSchedule {
    /// Trade start; coupon accrual runs from here.
    pub start_date: Date,
    /// Final observation and payment date.
    pub expiry: Date,
    /// Knock-out observation dates, ascending, the last on or before expiry.
    pub observation_dates: Vec<Date>,
    /// Annualised coupon paid on knock-out or at expiry if never knocked in.
    pub rebate: f64,
    /// Whether the coupon accrues with elapsed time (`(t/T)^flag`).
    pub annualised: bool,
    /// Calendar for the simulation grid.
    pub calendar: Calendar,
}

impl SnowballSchedule {
    /// Accruing schedule on the China calendar.
    pub fn new(start_date: Date, expiry: Date, observation_dates: Vec<Date>, rebate: f64) -> Self {
        Self {
            start_date,
            expiry,
            observation_dates,
            rebate,
            annualised: true,
            calendar: Calendar::China,
        }
    }

    /// Monthly observations on the start day-of-month, from one month after
    /// start through expiry.
    pub fn monthly(start_date: Date, expiry: Date, rebate: f64) -> Result<Self, InstrumentError> {
        let mut dates = Vec::new();
        let mut k = 1;
        loop {
            let d = start_date
                .add_months(k)
                .map_err(|e| InstrumentError::dates(e.to_string()))?;
            if d >= expiry {
                break;
            }
            dates.push(d);
            k += 1;
        }
        dates.push(expiry);
        Ok(Self::new(start_date, expiry, dates, rebate))
    }

    fn validate(&self) -> Result<(), InstrumentError> {
        if self.start_date >= self.expiry {
            return Err(InstrumentError::dates(format!(
                "start {} not before expiry {}",
                self.start_date, self.expiry
            )));
        }
        if self.observation_dates.is_empty() {
            return Err(InstrumentError::parameter("no knock-out observation dates"));
        }
        let ascending = self.observation_dates.windows(2).all(|w| w[0] < w[1]);
        let inside = self
            .observation_dates
            .iter()
            .all(|d| *d > self.start_date && *d <= self.expiry);
        if !ascending || !inside {
            return Err(InstrumentError::dates(
                "observation dates must be ascending within (start, expiry]",
            ));
        }
        if !(self.rebate >= 0.0) {
            return Err(InstrumentError::parameter(format!("rebate {}", self.rebate)));
        }
        Ok(())
    }
}

/// Single-underlying snowball.
///
/// Barriers are absolute price levels. The knock-in loss is measured
/// against `initial_price`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snowball {
    /// Underlying symbol.
    pub underlying: String,
    /// Fixing at trade start.
    pub initial_price: f64,
    /// Knock-out level checked on observation dates.
    pub knock_out_barrier: f64,
    /// Knock-in level checked on every simulated day.
    pub knock_in_barrier: f64,
    /// Loss profile after knock-in.
    pub knock_in: KnockInPayoff,
    /// Whether the knock-in has already happened.
    pub knocked_in: bool,
    /// Dates and coupon.
    pub schedule: SnowballSchedule,
    /// Notional in currency.
    pub notional: f64,
    /// Continuous dividend yield.
    pub dividend_yield: f64,
    /// Discount curve.
    pub discount_curve: CurveRef,
    /// Pinned market inputs.
    pub market: MarketAttributes,
}

impl Snowball {
    /// Snowball with a linear knock-in loss and unit notional.
    pub fn new(
        underlying: impl Into<String>,
        initial_price: f64,
        knock_out_barrier: f64,
        knock_in_barrier: f64,
        schedule: SnowballSchedule,
    ) -> Self {
        Self {
            underlying: underlying.into(),
            initial_price,
            knock_out_barrier,
            knock_in_barrier,
            knock_in: KnockInPayoff::Return,
            knocked_in: false,
            schedule,
            notional: 1.0,
            dividend_yield: 0.0,
            discount_curve: CurveRef::default(),
            market: MarketAttributes::default(),
        }
    }

    /// Sets the knock-in loss profile.
    pub fn with_knock_in(mut self, payoff: KnockInPayoff) -> Self {
        self.knock_in = payoff;
        self
    }

    /// Sets the notional.
    pub fn with_notional(mut self, notional: f64) -> Self {
        self.notional = notional;
        self
    }

    /// Checks levels, payoff and schedule.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        check_notional(self.notional)?;
        if !(self.initial_price > 0.0) {
            return Err(InstrumentError::parameter(format!("initial price {}", self.initial_price)));
        }
        if !(self.knock_in_barrier > 0.0 && self.knock_in_barrier < self.knock_out_barrier) {
            return Err(InstrumentError::parameter(format!(
                "knock-in {} must be positive and below knock-out {}",
                self.knock_in_barrier, self.knock_out_barrier
            )));
        }
        self.knock_in.validate()?;
        self.schedule.validate()
    }
}

/// Worst-of snowball on a correlated basket.
///
/// Barriers and knock-in strikes are ratios of each underlying's initial
/// fixing; the worst performer drives every test.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BasketSnowball {
    /// Underlying symbols.
    pub underlyings: Vec<String>,
    /// Fixings at trade start.
    pub initial_prices: Vec<f64>,
    /// Pinned spots, one per underlying.
    pub spots: Option<Vec<f64>>,
    /// Pinned volatilities, one per underlying.
    pub volatilities: Option<Vec<f64>>,
    /// Continuous dividend yields.
    pub dividend_yields: Vec<f64>,
    /// Row-major correlation matrix.
    pub correlation: Vec<Vec<f64>>,
    /// Knock-out performance level.
    pub knock_out_ratio: f64,
    /// Knock-in performance level.
    pub knock_in_ratio: f64,
    /// Loss profile in performance terms.
    pub knock_in: KnockInPayoff,
    /// Whether the knock-in has already happened.
    pub knocked_in: bool,
    /// Dates and coupon.
    pub schedule: SnowballSchedule,
    /// Notional in currency.
    pub notional: f64,
    /// Discount curve.
    pub discount_curve: CurveRef,
}

impl BasketSnowball {
    /// Basket snowball with no dividends and a linear knock-in loss.
    pub fn new(
        underlyings: Vec<String>,
        initial_prices: Vec<f64>,
        correlation: Vec<Vec<f64>>,
        knock_out_ratio: f64,
        knock_in_ratio: f64,
        schedule: SnowballSchedule,
    ) -> Self {
        let n = underlyings.len();
        Self {
            underlyings,
            initial_prices,
            spots: None,
            volatilities: None,
            dividend_yields: vec![0.0; n],
            correlation,
            knock_out_ratio,
            knock_in_ratio,
            knock_in: KnockInPayoff::Return,
            knocked_in: false,
            schedule,
            notional: 1.0,
            discount_curve: CurveRef::default(),
        }
    }

    /// Number of underlyings.
    pub fn size(&self) -> usize {
        self.underlyings.len()
    }

    /// Checks dimensions, correlation and levels.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        let n = self.size();
        if n == 0 {
            return Err(InstrumentError::parameter("empty basket"));
        }
        let sized = |len: usize| len == n;
        if !sized(self.initial_prices.len())
            || !sized(self.dividend_yields.len())
            || !sized(self.correlation.len())
            || self.correlation.iter().any(|row| !sized(row.len()))
            || self.spots.as_ref().is_some_and(|s| !sized(s.len()))
            || self.volatilities.as_ref().is_some_and(|v| !sized(v.len()))
        {
            return Err(InstrumentError::parameter(format!("basket inputs must all have {n} entries")));
        }
        if self.initial_prices.iter().any(|p| !(*p > 0.0)) {
            return Err(InstrumentError::parameter("initial prices must be positive"));
        }
        for i in 0..n {
            if (self.correlation[i][i] - 1.0).abs() > 1e-12 {
                return Err(InstrumentError::parameter("correlation diagonal must be 1"));
            }
            for j in 0..i {
                let rho = self.correlation[i][j];
                if (rho - self.correlation[j][i]).abs() > 1e-12 || !(-1.0..=1.0).contains(&rho) {
                    return Err(InstrumentError::parameter(format!("correlation ({i}, {j}) = {rho}")));
                }
            }
        }
        if !(self.knock_in_ratio > 0.0 && self.knock_in_ratio < self.knock_out_ratio) {
            return Err(InstrumentError::parameter(format!(
                "knock-in ratio {} must be positive and below knock-out ratio {}",
                self.knock_in_ratio, self.knock_out_ratio
            )));
        }
        check_notional(self.notional)?;
        self.knock_in.validate()?;
        self.schedule.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn schedule() -> SnowballSchedule {
        SnowballSchedule::monthly(d(2021, 6, 3), d(2022, 6, 3), 0.2).unwrap()
    }

    #[test]
    fn test_monthly_dates() {
        let s = schedule();
        assert_eq!(s.observation_dates.len(), 12);
        assert_eq!(s.observation_dates[0], d(2021, 7, 3));
        assert_eq!(*s.observation_dates.last().unwrap(), d(2022, 6, 3));
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_knock_in_losses() {
        assert_relative_eq!(KnockInPayoff::Return.loss(4.0, 5.0), -0.2, epsilon = 1e-12);
        let put = KnockInPayoff::Vanilla { strike: 5.3 };
        assert_relative_eq!(put.loss(5.0, 5.0), -0.06, epsilon = 1e-12);
        assert_eq!(put.loss(5.4, 5.0), 0.0);
        let spread = KnockInPayoff::Spreads { lower: 5.3, upper: 5.4 };
        assert_relative_eq!(spread.loss(5.0, 5.262), -0.1 / 5.262, epsilon = 1e-12);
        assert_relative_eq!(spread.loss(5.35, 5.262), -0.05 / 5.262, epsilon = 1e-12);
    }

    #[test]
    fn test_snowball_validation() {
        let sb = Snowball::new("SPOT", 5.262, 5.5, 5.2, schedule());
        assert!(sb.validate().is_ok());
        let inverted = Snowball::new("SPOT", 5.262, 5.2, 5.5, schedule());
        assert!(inverted.validate().is_err());
        let bad_spread = sb.with_knock_in(KnockInPayoff::Spreads { lower: 5.4, upper: 5.3 });
        assert!(bad_spread.validate().is_err());
    }

    #[test]
    fn test_unordered_observations_rejected() {
        let mut s = schedule();
        s.observation_dates.swap(0, 1);
        assert!(matches!(s.validate(), Err(InstrumentError::InvalidDates { .. })));
    }

    #[test]
    fn test_basket_validation() {
        let basket = BasketSnowball::new(
            vec!["A".into(), "B".into()],
            vec![10.0, 20.0],
            vec![vec![1.0, 0.5], vec![0.5, 1.0]],
            1.03,
            0.75,
            schedule(),
        );
        assert!(basket.validate().is_ok());
        let mut asym = basket.clone();
        asym.correlation[0][1] = 0.4;
        assert!(asym.validate().is_err());
        let mut short = basket;
        short.initial_prices.pop();
        assert!(short.validate().is_err());
    }
}
