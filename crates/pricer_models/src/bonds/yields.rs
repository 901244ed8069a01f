//! Price-yield relationship of a bond.
//!
//! Each remaining cash flow is discounted at `(1 + y/f)^(-e)`. Conventions
//! differ only in the exponent `e` and in the final period:
//!
//! | Convention   | Exponent of the i-th remaining flow                       |
//! |--------------|-----------------------------------------------------------|
//! | `Compounded` | `f · day_count(settle, t_i)`                              |
//! | `UsStreet`   | `w + i`, `w` from the bond's day-count day numbers         |
//! | `UkDmo`      | `w + i`, `w` from actual days in the quasi-coupon period   |
//! | `UsTreasury` | as `UsStreet`, simple interest `1/(1 + w·y/f)` when one coupon is left |
//!
//! where `w` is the share of the current coupon period still to run.

use std::fmt;
use std::str::FromStr;

use pricer_core::types::{Date, DayCountConvention};

use super::cashflows::BondCashflows;
use super::error::BondError;

/// Yield-to-price convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum YieldConvention {
    /// Periodic compounding over day-count time.
    #[default]
    Compounded,
    /// US street convention.
    UsStreet,
    /// UK Debt Management Office convention.
    UkDmo,
    /// US Treasury convention.
    UsTreasury,
}

impl YieldConvention {
    /// Short name.
    pub fn name(&self) -> &'static str {
        match self {
            YieldConvention::Compounded => "Compounded",
            YieldConvention::UsStreet => "UsStreet",
            YieldConvention::UkDmo => "UkDmo",
            YieldConvention::UsTreasury => "UsTreasury",
        }
    }
}

impl fmt::Display for YieldConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for YieldConvention {
    type Err = BondError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "compounded" | "compound" => Ok(YieldConvention::Compounded),
            "usstreet" | "street" => Ok(YieldConvention::UsStreet),
            "ukdmo" | "dmo" => Ok(YieldConvention::UkDmo),
            "ustreasury" | "treasury" => Ok(YieldConvention::UsTreasury),
            _ => Err(BondError::InvalidTerms(format!("unknown yield convention: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Discount {
    Compound(f64),
    Simple(f64),
}

/// Remaining cash flows paired with their discounting under one convention.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct YieldDiscounting {
    legs: Vec<(f64, Discount)>,
    f: f64,
}

impl YieldDiscounting {
    pub(crate) fn new(
        cashflows: &BondCashflows,
        settlement: Date,
        periods_per_year: f64,
        convention: YieldConvention,
    ) -> Result<Self, BondError> {
        let flows = cashflows.remaining(settlement)?;
        let f = periods_per_year;
        let legs = match convention {
            YieldConvention::Compounded => {
                let dc = cashflows.day_count();
                flows
                    .iter()
                    .map(|cf| {
                        let e = f * dc.year_frac(settlement, cf.date).fraction;
                        (cf.amount(), Discount::Compound(e))
                    })
                    .collect()
            }
            YieldConvention::UsStreet | YieldConvention::UkDmo | YieldConvention::UsTreasury => {
                let ends: Vec<Date> = cashflows
                    .periods()
                    .iter()
                    .filter(|p| p.end > settlement)
                    .map(|p| p.end)
                    .collect();
                let first = cashflows
                    .periods()
                    .iter()
                    .find(|p| p.end > settlement)
                    .ok_or_else(|| BondError::Expired {
                        settlement: settlement.to_string(),
                        limit: cashflows.maturity().to_string(),
                    })?;
                let w = match convention {
                    YieldConvention::UkDmo => {
                        (first.end - settlement) as f64 / (first.end - first.start) as f64
                    }
                    _ => street_fraction(cashflows.day_count(), first.start, first.end, settlement),
                };
                let simple_final = convention == YieldConvention::UsTreasury && ends.len() == 1;
                flows
                    .iter()
                    .map(|cf| {
                        let i = ends.iter().position(|d| *d == cf.date).unwrap_or(0) as f64;
                        let discount = if simple_final {
                            Discount::Simple(w)
                        } else {
                            Discount::Compound(w + i)
                        };
                        (cf.amount(), discount)
                    })
                    .collect()
            }
        };
        Ok(Self { legs, f })
    }

    /// Full price at yield `y`.
    pub(crate) fn price(&self, y: f64) -> f64 {
        let base = 1.0 + y / self.f;
        self.legs
            .iter()
            .map(|(amount, d)| match d {
                Discount::Compound(e) => amount * base.powf(-e),
                Discount::Simple(w) => amount / (1.0 + w * y / self.f),
            })
            .sum()
    }

    /// `dP/dy` at yield `y`.
    pub(crate) fn derivative(&self, y: f64) -> f64 {
        let base = 1.0 + y / self.f;
        self.legs
            .iter()
            .map(|(amount, d)| match d {
                Discount::Compound(e) => -amount * (e / self.f) * base.powf(-e - 1.0),
                Discount::Simple(w) => {
                    let denom = 1.0 + w * y / self.f;
                    -amount * (w / self.f) / (denom * denom)
                }
            })
            .sum()
    }

    /// Cash-flow-weighted time in years at yield `y`.
    pub(crate) fn macaulay(&self, y: f64) -> f64 {
        let base = 1.0 + y / self.f;
        let (weighted, total) = self.legs.iter().fold((0.0, 0.0), |(wsum, psum), (amount, d)| {
            let (pv, e) = match d {
                Discount::Compound(e) => (amount * base.powf(-e), *e),
                Discount::Simple(w) => (amount / (1.0 + w * y / self.f), *w),
            };
            (wsum + pv * e / self.f, psum + pv)
        });
        weighted / total
    }

    /// Lowest admissible yield (`1 + y/f > 0`).
    pub(crate) fn lower_bound(&self) -> f64 {
        -self.f + 1e-10
    }
}

/// Share of `[start, end]` still to run at `settlement`, in day-count day numbers.
fn street_fraction(dc: DayCountConvention, start: Date, end: Date, settlement: Date) -> f64 {
    let remaining = dc.year_frac(settlement, end).days as f64;
    let length = dc.year_frac(start, end).days as f64;
    if length > 0.0 {
        remaining / length
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonds::terms::BondTerms;
    use crate::schedules::Frequency;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn annual() -> BondCashflows {
        let terms = BondTerms::new(d(2020, 1, 1), d(2025, 1, 1), 0.05, Frequency::Annual);
        BondCashflows::generate(&terms).unwrap()
    }

    #[test]
    fn test_par_on_coupon_date() {
        let cfs = annual();
        for conv in [
            YieldConvention::UsStreet,
            YieldConvention::UkDmo,
            YieldConvention::UsTreasury,
        ] {
            let disc = YieldDiscounting::new(&cfs, d(2021, 1, 1), 1.0, conv).unwrap();
            assert_relative_eq!(disc.price(0.05), 100.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let cfs = annual();
        for conv in [YieldConvention::Compounded, YieldConvention::UsStreet] {
            let disc = YieldDiscounting::new(&cfs, d(2021, 7, 15), 1.0, conv).unwrap();
            let h = 1e-6;
            let fd = (disc.price(0.04 + h) - disc.price(0.04 - h)) / (2.0 * h);
            assert_relative_eq!(disc.derivative(0.04), fd, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_treasury_simple_in_final_period() {
        let cfs = annual();
        let settle = d(2024, 7, 2);
        let street = YieldDiscounting::new(&cfs, settle, 1.0, YieldConvention::UsStreet).unwrap();
        let tsy = YieldDiscounting::new(&cfs, settle, 1.0, YieldConvention::UsTreasury).unwrap();
        let w: f64 = 183.0 / 366.0;
        assert_relative_eq!(tsy.price(0.05), 105.0 / (1.0 + 0.05 * w), epsilon = 1e-10);
        assert_relative_eq!(street.price(0.05), 105.0 / 1.05_f64.powf(w), epsilon = 1e-10);
    }

    #[test]
    fn test_macaulay_of_zero_is_maturity() {
        let terms = BondTerms::new(d(2020, 1, 1), d(2025, 1, 1), 0.0, Frequency::Annual);
        let cfs = BondCashflows::generate(&terms).unwrap();
        let disc = YieldDiscounting::new(&cfs, d(2020, 1, 1), 1.0, YieldConvention::UsStreet).unwrap();
        assert_relative_eq!(disc.macaulay(0.03), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_convention_parse() {
        assert_eq!("us_street".parse::<YieldConvention>().unwrap(), YieldConvention::UsStreet);
        assert_eq!("UK-DMO".parse::<YieldConvention>().unwrap(), YieldConvention::UkDmo);
        assert_eq!(
            YieldConvention::UsTreasury.name().parse::<YieldConvention>().unwrap(),
            YieldConvention::UsTreasury
        );
        assert!("bogus".parse::<YieldConvention>().is_err());
    }
}
