//! Time types and Day Count Conventions for financial calculations.
//!
//! This module provides:
//! - `Date`: Type-safe date wrapper around chrono::NaiveDate with the
//!   calendar arithmetic used by schedules and curve tenors
//! - `DayCountConvention`: ACT/360, ACT/365F, 30/360 and ACT/ACT-ISDA
//! - `YearFraction`: fraction together with its day-count numerator and denominator
//! - `BusinessDayConvention`: date rolling rules applied through a [`Calendar`]
//!
//! # Examples
//!
//! ```
//! use pricer_core::types::time::{Date, DayCountConvention};
//!
//! let start = Date::from_ymd(2024, 1, 1).unwrap();
//! let end = Date::from_ymd(2024, 7, 1).unwrap();
//!
//! let yf = DayCountConvention::Actual365Fixed.year_frac(start, end);
//! assert_eq!(yf.days, 182);
//! assert!((yf.fraction - 182.0 / 365.0).abs() < 1e-15);
//! ```
//!
//! [`Calendar`]: super::calendar::Calendar

use chrono::{Datelike, Days, Local, Months, NaiveDate, Weekday};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use super::error::DateError;

/// Type-safe date wrapper around chrono::NaiveDate.
///
/// Provides ISO 8601 serialisation and the date arithmetic needed by
/// schedules (`add_months`), curve tenors (`add_years` with fractional
/// years) and settlement (`add_days`).
///
/// # Examples
///
/// ```
/// use pricer_core::types::time::Date;
///
/// let date = Date::from_ymd(2024, 6, 15).unwrap();
/// assert_eq!(date.year(), 2024);
///
/// let parsed: Date = "2024-06-15".parse().unwrap();
/// assert_eq!(date, parsed);
///
/// let start = Date::from_ymd(2024, 1, 1).unwrap();
/// let end = Date::from_ymd(2024, 1, 11).unwrap();
/// assert_eq!(end - start, 10);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a Date from year, month, and day components.
    ///
    /// # Returns
    /// `Ok(Date)` if the date is valid, `Err(DateError::InvalidDate)` otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_core::types::time::Date;
    ///
    /// assert!(Date::from_ymd(2024, 2, 29).is_ok());
    /// assert!(Date::from_ymd(2024, 2, 30).is_err());
    /// ```
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or(DateError::InvalidDate { year, month, day })
    }

    /// Returns today's date based on local system time.
    pub fn today() -> Self {
        Date(Local::now().date_naive())
    }

    /// Parses a date from ISO 8601 format string (YYYY-MM-DD).
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_core::types::time::Date;
    ///
    /// assert_eq!(Date::parse("2021-12-27").unwrap().day(), 27);
    /// assert!(Date::parse("27/12/2021").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, DateError> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Date)
            .map_err(|e| DateError::ParseError(format!("{}: {}", s, e)))
    }

    /// Returns the underlying NaiveDate.
    pub fn into_inner(self) -> NaiveDate {
        self.0
    }

    /// Wraps a chrono date.
    pub fn from_naive(date: NaiveDate) -> Self {
        Date(date)
    }

    /// Returns the year component.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Day of the week.
    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// True on Saturday and Sunday.
    pub fn is_weekend(&self) -> bool {
        matches!(self.0.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// True if the date is the last day of its month.
    pub fn is_end_of_month(&self) -> bool {
        self.0.succ_opt().map_or(true, |next| next.month() != self.0.month())
    }

    /// Days elapsed since 1970-01-01 (negative before the epoch).
    pub fn days_since_epoch(&self) -> i64 {
        self.0.signed_duration_since(NaiveDate::default()).num_days()
    }

    /// Adds a signed number of calendar days.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_core::types::time::Date;
    ///
    /// let d = Date::from_ymd(2021, 12, 27).unwrap();
    /// assert_eq!(d.add_days(5).unwrap(), Date::from_ymd(2022, 1, 1).unwrap());
    /// assert_eq!(d.add_days(-27).unwrap(), Date::from_ymd(2021, 11, 30).unwrap());
    /// ```
    pub fn add_days(self, n: i64) -> Result<Self, DateError> {
        let shifted = if n >= 0 {
            self.0.checked_add_days(Days::new(n as u64))
        } else {
            self.0.checked_sub_days(Days::new(n.unsigned_abs()))
        };
        shifted.map(Date).ok_or(DateError::Overflow)
    }

    /// Adds a signed number of months, clamping to the end of the target month.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_core::types::time::Date;
    ///
    /// let d = Date::from_ymd(2024, 1, 31).unwrap();
    /// assert_eq!(d.add_months(1).unwrap(), Date::from_ymd(2024, 2, 29).unwrap());
    /// assert_eq!(d.add_months(-2).unwrap(), Date::from_ymd(2023, 11, 30).unwrap());
    /// ```
    pub fn add_months(self, n: i32) -> Result<Self, DateError> {
        let shifted = if n >= 0 {
            self.0.checked_add_months(Months::new(n as u32))
        } else {
            self.0.checked_sub_months(Months::new(n.unsigned_abs()))
        };
        shifted.map(Date).ok_or(DateError::Overflow)
    }

    /// Adds a (possibly fractional) number of years.
    ///
    /// Whole years move the calendar year (with end-of-February clamping).
    /// Fractional years are interpreted as 365-day units, which is how
    /// rate-curve tenors such as `0.25` or `1.5` map onto dates.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_core::types::time::Date;
    ///
    /// let d = Date::from_ymd(2021, 12, 27).unwrap();
    /// assert_eq!(d.add_years(2.0).unwrap(), Date::from_ymd(2023, 12, 27).unwrap());
    /// assert_eq!(d.add_years(0.5).unwrap(), d.add_days(183).unwrap());
    /// ```
    pub fn add_years(self, years: f64) -> Result<Self, DateError> {
        if !years.is_finite() {
            return Err(DateError::Overflow);
        }
        if years.fract() == 0.0 {
            let months = years * 12.0;
            if months.abs() > i32::MAX as f64 {
                return Err(DateError::Overflow);
            }
            self.add_months(months as i32)
        } else {
            self.add_days((years * 365.0).round() as i64)
        }
    }
}

impl Sub for Date {
    type Output = i64;

    /// Returns the signed number of days between two dates.
    fn sub(self, other: Self) -> i64 {
        (self.0 - other.0).num_days()
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, DateError> {
        Date::parse(s)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

/// A year fraction together with the day counts that produced it.
///
/// `fraction == days / denominator` for the single-basis conventions.
/// For ACT/ACT-ISDA spanning several calendar years the denominator is the
/// effective one (`days / fraction`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearFraction {
    /// Year fraction.
    pub fraction: f64,
    /// Day-count numerator (calendar days or 30/360 days).
    pub days: i64,
    /// Day-count denominator.
    pub denominator: f64,
}

/// Day count conventions for year fraction calculation.
///
/// # Variants
/// - `Actual360`: actual days / 360 (money market)
/// - `Actual365Fixed`: actual days / 365 (curves, CNY money market)
/// - `Thirty360`: 30/360 US bond basis
/// - `ActualActualIsda`: days in each calendar year over that year's length
///
/// # Examples
///
/// ```
/// use pricer_core::types::time::{Date, DayCountConvention};
///
/// let start = Date::from_ymd(2023, 7, 1).unwrap();
/// let end = Date::from_ymd(2024, 7, 1).unwrap();
/// let yf = DayCountConvention::ActualActualIsda.year_frac(start, end);
/// assert!((yf.fraction - (184.0 / 365.0 + 182.0 / 366.0)).abs() < 1e-14);
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DayCountConvention {
    /// Actual/360.
    Actual360,
    /// Actual/365 Fixed.
    #[default]
    Actual365Fixed,
    /// 30/360 US bond basis.
    Thirty360,
    /// Actual/Actual ISDA.
    ActualActualIsda,
}

impl DayCountConvention {
    /// Returns the market name of the convention.
    pub fn name(&self) -> &'static str {
        match self {
            DayCountConvention::Actual360 => "ACT/360",
            DayCountConvention::Actual365Fixed => "ACT/365F",
            DayCountConvention::Thirty360 => "30/360",
            DayCountConvention::ActualActualIsda => "ACT/ACT",
        }
    }

    /// True for the ACT/ACT family, whose coupon accrual is measured as a
    /// share of the coupon period rather than a fixed basis.
    pub fn is_actual_actual(&self) -> bool {
        matches!(self, DayCountConvention::ActualActualIsda)
    }

    /// Signed year fraction between two dates.
    ///
    /// If `end < start` the fraction and day count are negated.
    pub fn year_frac(&self, start: Date, end: Date) -> YearFraction {
        if end < start {
            let yf = self.forward_frac(end.0, start.0);
            return YearFraction {
                fraction: -yf.fraction,
                days: -yf.days,
                denominator: yf.denominator,
            };
        }
        self.forward_frac(start.0, end.0)
    }

    /// Year fraction of an accrual period, rejecting `end < start`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_core::types::time::{Date, DayCountConvention};
    ///
    /// let a = Date::from_ymd(2024, 1, 2).unwrap();
    /// let b = Date::from_ymd(2024, 1, 1).unwrap();
    /// assert!(DayCountConvention::Actual360.accrual_frac(a, b).is_err());
    /// ```
    pub fn accrual_frac(&self, start: Date, end: Date) -> Result<YearFraction, DateError> {
        if end < start {
            return Err(DateError::NegativePeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(self.forward_frac(start.0, end.0))
    }

    /// Shorthand for `year_frac(start, end).fraction`.
    pub fn year_fraction_dates(&self, start: Date, end: Date) -> f64 {
        self.year_frac(start, end).fraction
    }

    fn forward_frac(&self, start: NaiveDate, end: NaiveDate) -> YearFraction {
        let actual = (end - start).num_days();
        match self {
            DayCountConvention::Actual360 => YearFraction {
                fraction: actual as f64 / 360.0,
                days: actual,
                denominator: 360.0,
            },
            DayCountConvention::Actual365Fixed => YearFraction {
                fraction: actual as f64 / 365.0,
                days: actual,
                denominator: 365.0,
            },
            DayCountConvention::Thirty360 => {
                let d1 = if start.day() == 31 { 30 } else { start.day() };
                let d2 = if end.day() == 31 && d1 == 30 {
                    30
                } else {
                    end.day()
                };
                let days = 360 * (end.year() - start.year()) as i64
                    + 30 * (end.month() as i64 - start.month() as i64)
                    + (d2 as i64 - d1 as i64);
                YearFraction {
                    fraction: days as f64 / 360.0,
                    days,
                    denominator: 360.0,
                }
            }
            DayCountConvention::ActualActualIsda => {
                if actual == 0 {
                    return YearFraction {
                        fraction: 0.0,
                        days: 0,
                        denominator: days_in_year(start.year()),
                    };
                }
                let mut fraction: f64 = 0.0;
                let mut cursor = start;
                while cursor.year() < end.year() {
                    let next_year = NaiveDate::from_ymd_opt(cursor.year() + 1, 1, 1)
                        .unwrap_or(end);
                    fraction +=
                        (next_year - cursor).num_days() as f64 / days_in_year(cursor.year());
                    cursor = next_year;
                }
                fraction += (end - cursor).num_days() as f64 / days_in_year(end.year());
                YearFraction {
                    fraction,
                    days: actual,
                    denominator: actual as f64 / fraction,
                }
            }
        }
    }
}

fn days_in_year(year: i32) -> f64 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366.0
    } else {
        365.0
    }
}

impl FromStr for DayCountConvention {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace(['/', ' ', '_', '-'], "").as_str() {
            "ACT360" | "ACTUAL360" | "A360" => Ok(DayCountConvention::Actual360),
            "ACT365" | "ACT365F" | "ACT365FIXED" | "ACTUAL365FIXED" | "A365" => {
                Ok(DayCountConvention::Actual365Fixed)
            }
            "30360" | "THIRTY360" | "30360US" | "BONDBASIS" => Ok(DayCountConvention::Thirty360),
            "ACTACT" | "ACTACTISDA" | "ACTUALACTUAL" | "AA" => {
                Ok(DayCountConvention::ActualActualIsda)
            }
            _ => Err(DateError::ParseError(format!(
                "Unknown day count convention: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::{BusinessDayConvention, DayCountConvention};
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;

    impl Serialize for DayCountConvention {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(self.name())
        }
    }

    impl<'de> Deserialize<'de> for DayCountConvention {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            DayCountConvention::from_str(&s).map_err(de::Error::custom)
        }
    }

    impl Serialize for BusinessDayConvention {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(self.code())
        }
    }

    impl<'de> Deserialize<'de> for BusinessDayConvention {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            BusinessDayConvention::from_str(&s).map_err(de::Error::custom)
        }
    }
}

/// Business day adjustment rules.
///
/// Applied through [`Calendar::adjust`](super::calendar::Calendar::adjust).
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BusinessDayConvention {
    /// Roll forward to the next business day.
    Following,
    /// Roll forward unless that changes the month, then roll back.
    #[default]
    ModifiedFollowing,
    /// Roll back to the previous business day.
    Preceding,
    /// Roll back unless that changes the month, then roll forward.
    ModifiedPreceding,
    /// No adjustment (`NONE`).
    Unadjusted,
}

impl BusinessDayConvention {
    /// Human-readable name.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            BusinessDayConvention::Following => "Following",
            BusinessDayConvention::ModifiedFollowing => "Modified Following",
            BusinessDayConvention::Preceding => "Preceding",
            BusinessDayConvention::ModifiedPreceding => "Modified Preceding",
            BusinessDayConvention::Unadjusted => "Unadjusted",
        }
    }

    /// Short market code.
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            BusinessDayConvention::Following => "F",
            BusinessDayConvention::ModifiedFollowing => "MF",
            BusinessDayConvention::Preceding => "P",
            BusinessDayConvention::ModifiedPreceding => "MP",
            BusinessDayConvention::Unadjusted => "U",
        }
    }
}

impl fmt::Display for BusinessDayConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BusinessDayConvention {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '_', '-'], "").as_str() {
            "following" | "f" => Ok(BusinessDayConvention::Following),
            "modifiedfollowing" | "mf" => Ok(BusinessDayConvention::ModifiedFollowing),
            "preceding" | "p" => Ok(BusinessDayConvention::Preceding),
            "modifiedpreceding" | "mp" => Ok(BusinessDayConvention::ModifiedPreceding),
            "unadjusted" | "u" | "none" => Ok(BusinessDayConvention::Unadjusted),
            _ => Err(DateError::ParseError(format!(
                "Unknown business day convention: {}",
                s
            ))),
        }
    }
}

/// Year fraction from `valuation` to `maturity` on ACT/365F, floored at zero.
pub fn time_to_maturity_dates(valuation: Date, maturity: Date) -> f64 {
    DayCountConvention::Actual365Fixed
        .year_frac(valuation, maturity)
        .fraction
        .max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_add_months_end_of_month() {
        assert_eq!(d(2023, 1, 31).add_months(1).unwrap(), d(2023, 2, 28));
        assert_eq!(d(2020, 3, 16).add_months(360).unwrap(), d(2050, 3, 16));
    }

    #[test]
    fn test_add_years_whole_and_fractional() {
        assert_eq!(d(2024, 2, 29).add_years(1.0).unwrap(), d(2025, 2, 28));
        assert_eq!(d(2021, 1, 1).add_years(0.25).unwrap(), d(2021, 4, 2));
        assert_eq!(d(2021, 1, 1).add_years(-1.0).unwrap(), d(2020, 1, 1));
        assert!(d(2021, 1, 1).add_years(f64::NAN).is_err());
    }

    #[test]
    fn test_act_360_and_365() {
        let yf = DayCountConvention::Actual360.year_frac(d(2024, 1, 1), d(2024, 7, 1));
        assert_eq!(yf.days, 182);
        assert_eq!(yf.denominator, 360.0);
        assert_relative_eq!(yf.fraction, 182.0 / 360.0);
    }

    #[test]
    fn test_thirty_360_end_of_month() {
        let yf = DayCountConvention::Thirty360.year_frac(d(2024, 1, 31), d(2024, 3, 31));
        assert_eq!(yf.days, 60);
        assert_relative_eq!(yf.fraction, 60.0 / 360.0);
    }

    #[test]
    fn test_act_act_isda_whole_years() {
        let yf = DayCountConvention::ActualActualIsda.year_frac(d(2020, 1, 1), d(2022, 1, 1));
        assert_relative_eq!(yf.fraction, 2.0, epsilon = 1e-14);
        assert_eq!(yf.days, 731);
    }

    #[test]
    fn test_negative_year_frac_is_signed() {
        let yf = DayCountConvention::Actual365Fixed.year_frac(d(2024, 1, 11), d(2024, 1, 1));
        assert_eq!(yf.days, -10);
        assert_relative_eq!(yf.fraction, -10.0 / 365.0);
    }

    #[test]
    fn test_accrual_frac_rejects_reversed_dates() {
        let err = DayCountConvention::Thirty360
            .accrual_frac(d(2024, 5, 1), d(2024, 4, 1))
            .unwrap_err();
        assert!(matches!(err, DateError::NegativePeriod { .. }));
    }

    #[test]
    fn test_day_count_from_str() {
        assert_eq!(
            "ACT/ACT".parse::<DayCountConvention>().unwrap(),
            DayCountConvention::ActualActualIsda
        );
        assert_eq!(
            "act/365f".parse::<DayCountConvention>().unwrap(),
            DayCountConvention::Actual365Fixed
        );
        assert!("ACT/999".parse::<DayCountConvention>().is_err());
    }

    #[test]
    fn test_business_day_convention_from_str() {
        assert_eq!(
            "NONE".parse::<BusinessDayConvention>().unwrap(),
            BusinessDayConvention::Unadjusted
        );
        assert_eq!(
            "modified_following".parse::<BusinessDayConvention>().unwrap(),
            BusinessDayConvention::ModifiedFollowing
        );
    }

    #[test]
    fn test_end_of_month_and_epoch() {
        assert!(d(2024, 2, 29).is_end_of_month());
        assert!(!d(2024, 2, 28).is_end_of_month());
        assert_eq!(d(1970, 1, 11).days_since_epoch(), 10);
    }

    proptest! {
        #[test]
        fn prop_year_frac_antisymmetric(a in 0i64..20_000, b in 0i64..20_000) {
            let base = d(1990, 1, 1);
            let x = base.add_days(a).unwrap();
            let y = base.add_days(b).unwrap();
            for dc in [
                DayCountConvention::Actual360,
                DayCountConvention::Actual365Fixed,
                DayCountConvention::ActualActualIsda,
            ] {
                let fwd = dc.year_frac(x, y).fraction;
                let bwd = dc.year_frac(y, x).fraction;
                prop_assert!((fwd + bwd).abs() < 1e-12);
            }
        }

        #[test]
        fn prop_add_days_roundtrip(a in -10_000i64..10_000) {
            let base = d(2021, 12, 27);
            let shifted = base.add_days(a).unwrap();
            prop_assert_eq!(shifted - base, a);
        }
    }
}
