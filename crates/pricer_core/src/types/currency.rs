//! Currencies and FX currency pairs.
//!
//! # Examples
//!
//! ```
//! use pricer_core::types::{Currency, CurrencyPair};
//!
//! let pair: CurrencyPair = "USD/CNY".parse().unwrap();
//! assert_eq!(pair.base(), Currency::USD);
//! assert_eq!(pair.quote(), Currency::CNY);
//! assert_eq!(pair.symbol(), "USDCNY");
//!
//! assert!("USD-CNY".parse::<CurrencyPair>().is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use super::calendar::Calendar;
use super::error::CurrencyError;

/// ISO 4217 currency codes with decimal precision metadata.
#[non_exhaustive]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Currency {
    /// United States Dollar
    USD,
    /// Chinese Yuan Renminbi
    CNY,
    /// Euro
    EUR,
    /// British Pound Sterling
    GBP,
    /// Japanese Yen
    JPY,
    /// Hong Kong Dollar
    HKD,
    /// Swiss Franc
    CHF,
    /// Australian Dollar
    AUD,
}

impl Currency {
    /// Returns the ISO 4217 three-letter currency code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::CNY => "CNY",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::HKD => "HKD",
            Currency::CHF => "CHF",
            Currency::AUD => "AUD",
        }
    }

    /// Returns the standard number of decimal places for this currency.
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Settlement calendar of the currency's home market.
    pub fn calendar(&self) -> Calendar {
        match self {
            Currency::CNY => Calendar::China,
            Currency::USD => Calendar::UnitedStates,
            _ => Calendar::WeekendsOnly,
        }
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, CurrencyError> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(Currency::USD),
            "CNY" | "CNH" => Ok(Currency::CNY),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "JPY" => Ok(Currency::JPY),
            "HKD" => Ok(Currency::HKD),
            "CHF" => Ok(Currency::CHF),
            "AUD" => Ok(Currency::AUD),
            _ => Err(CurrencyError::UnknownCurrency(s.to_string())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// An FX currency pair quoted BASE/QUOTE: one unit of base costs `spot`
/// units of quote. The quote currency is the domestic (pricing) currency.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CurrencyPair {
    base: Currency,
    quote: Currency,
}

impl CurrencyPair {
    /// Creates a pair, rejecting identical legs.
    pub fn new(base: Currency, quote: Currency) -> Result<Self, CurrencyError> {
        if base == quote {
            return Err(CurrencyError::SameCurrency(base.code().to_string()));
        }
        Ok(Self { base, quote })
    }

    /// Base (foreign) currency.
    #[inline]
    pub fn base(&self) -> Currency {
        self.base
    }

    /// Quote (domestic) currency.
    #[inline]
    pub fn quote(&self) -> Currency {
        self.quote
    }

    /// Market-data symbol without separator, e.g. `USDCNY`.
    pub fn symbol(&self) -> String {
        format!("{}{}", self.base.code(), self.quote.code())
    }

    /// The pair with base and quote swapped.
    pub fn invert(&self) -> Self {
        Self {
            base: self.quote,
            quote: self.base,
        }
    }

    /// Joint settlement calendar of both legs.
    pub fn calendar(&self) -> Calendar {
        Calendar::Joint(vec![self.base.calendar(), self.quote.calendar()])
    }
}

impl FromStr for CurrencyPair {
    type Err = CurrencyError;

    /// Parses `XXX/YYY` or the six-letter form `XXXYYY`.
    fn from_str(s: &str) -> Result<Self, CurrencyError> {
        let trimmed = s.trim();
        let (base, quote) = match trimmed.split_once('/') {
            Some((b, q)) if b.len() == 3 && q.len() == 3 => (b, q),
            Some(_) => return Err(CurrencyError::MalformedPair(s.to_string())),
            None if trimmed.len() == 6 && trimmed.is_ascii() => trimmed.split_at(3),
            None => return Err(CurrencyError::MalformedPair(s.to_string())),
        };
        let base: Currency = base
            .parse()
            .map_err(|_| CurrencyError::MalformedPair(s.to_string()))?;
        let quote: Currency = quote
            .parse()
            .map_err(|_| CurrencyError::MalformedPair(s.to_string()))?;
        CurrencyPair::new(base, quote)
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::CurrencyPair;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for CurrencyPair {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for CurrencyPair {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(de::Error::custom)
        }
    }
}
