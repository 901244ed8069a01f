//! Payment frequency enumeration.

use super::ScheduleError;
use std::fmt;
use std::str::FromStr;

/// Payment frequency.
///
/// # Examples
///
/// ```
/// use pricer_models::schedules::Frequency;
///
/// assert_eq!(Frequency::SemiAnnual.periods_per_year(), 2);
/// assert_eq!(Frequency::Quarterly.tenor_months(), Some(3));
/// assert_eq!("6M".parse::<Frequency>().unwrap(), Frequency::SemiAnnual);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Frequency {
    /// Once per year.
    Annual,
    /// Twice per year.
    SemiAnnual,
    /// Four times per year.
    Quarterly,
    /// Twelve times per year.
    Monthly,
    /// Every seven days.
    Weekly,
    /// Every calendar day.
    Daily,
    /// Single payment at maturity (zero-coupon, bullet).
    Once,
}

impl Frequency {
    /// Payments per year; zero for [`Frequency::Once`].
    #[inline]
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Annual => 1,
            Frequency::SemiAnnual => 2,
            Frequency::Quarterly => 4,
            Frequency::Monthly => 12,
            Frequency::Weekly => 52,
            Frequency::Daily => 365,
            Frequency::Once => 0,
        }
    }

    /// Months per period for month-based frequencies.
    #[inline]
    pub fn tenor_months(&self) -> Option<u32> {
        match self {
            Frequency::Annual => Some(12),
            Frequency::SemiAnnual => Some(6),
            Frequency::Quarterly => Some(3),
            Frequency::Monthly => Some(1),
            Frequency::Weekly | Frequency::Daily | Frequency::Once => None,
        }
    }

    /// Days per period for day-based frequencies.
    #[inline]
    pub fn tenor_days(&self) -> Option<i64> {
        match self {
            Frequency::Weekly => Some(7),
            Frequency::Daily => Some(1),
            _ => None,
        }
    }

    /// Frequency paying `n` times per year, if standard.
    pub fn from_periods_per_year(n: u32) -> Option<Self> {
        match n {
            0 => Some(Frequency::Once),
            1 => Some(Frequency::Annual),
            2 => Some(Frequency::SemiAnnual),
            4 => Some(Frequency::Quarterly),
            12 => Some(Frequency::Monthly),
            52 => Some(Frequency::Weekly),
            365 => Some(Frequency::Daily),
            _ => None,
        }
    }

    /// Display name.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Frequency::Annual => "Annual",
            Frequency::SemiAnnual => "Semi-Annual",
            Frequency::Quarterly => "Quarterly",
            Frequency::Monthly => "Monthly",
            Frequency::Weekly => "Weekly",
            Frequency::Daily => "Daily",
            Frequency::Once => "Once",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Frequency {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "annual" | "1y" | "yearly" | "12m" => Ok(Frequency::Annual),
            "semiannual" | "6m" => Ok(Frequency::SemiAnnual),
            "quarterly" | "3m" => Ok(Frequency::Quarterly),
            "monthly" | "1m" => Ok(Frequency::Monthly),
            "weekly" | "1w" => Ok(Frequency::Weekly),
            "daily" | "1d" => Ok(Frequency::Daily),
            "once" | "bullet" | "zero" => Ok(Frequency::Once),
            _ => Err(ScheduleError::UnknownFrequency(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periods_per_year_roundtrip() {
        for f in [
            Frequency::Annual,
            Frequency::SemiAnnual,
            Frequency::Quarterly,
            Frequency::Monthly,
            Frequency::Weekly,
            Frequency::Daily,
            Frequency::Once,
        ] {
            assert_eq!(Frequency::from_periods_per_year(f.periods_per_year()), Some(f));
        }
        assert_eq!(Frequency::from_periods_per_year(3), None);
    }

    #[test]
    fn test_tenors() {
        assert_eq!(Frequency::Annual.tenor_months(), Some(12));
        assert_eq!(Frequency::Weekly.tenor_months(), None);
        assert_eq!(Frequency::Weekly.tenor_days(), Some(7));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("semi-annual".parse::<Frequency>().unwrap(), Frequency::SemiAnnual);
        assert_eq!("1Y".parse::<Frequency>().unwrap(), Frequency::Annual);
        assert!(matches!(
            "fortnightly".parse::<Frequency>(),
            Err(ScheduleError::UnknownFrequency(_))
        ));
    }
}
