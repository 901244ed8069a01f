//! Instrument trait definitions.
//!
//! [`InstrumentTrait`] is the metadata interface every term struct
//! implements: what it is, what it depends on, and when it stops being
//! priceable. Valuation lives in L3 (`pricer_pricing`) as free functions
//! over the [`Instrument`](super::Instrument) enum, so the trait stays free
//! of market-data dependencies.

use pricer_core::types::Date;

use super::bond::{AdvanceRedemption, EuropeanBondOption, FixedBond, FloatingBond, PutableAdjustableBond};
use super::equity::{AmericanOption, AsianOption, EuropeanOption, KnockoutOption, LookbackOption};
use super::error::InstrumentError;
use super::fx::{FxDigital, FxForward, FxQuantoDigital, FxQuantoRangeAccrual, FxVanilla};
use super::market::{AssetClass, CurveRef, MarketAttributes};
use super::snowball::{BasketSnowball, Snowball};

/// Core trait for all instruments.
///
/// # Required Methods
///
/// - [`symbol`](InstrumentTrait::symbol): underlying or bond code used for
///   market-data lookups and context overrides
/// - [`maturity`](InstrumentTrait::maturity): last date the instrument can
///   be valued on
/// - [`asset_class`](InstrumentTrait::asset_class)
/// - [`discount_curve`](InstrumentTrait::discount_curve)
/// - [`validate`](InstrumentTrait::validate): term consistency
///
/// # Examples
///
/// ```
/// use pricer_core::types::Date;
/// use pricer_models::instruments::{AssetClass, EuropeanOption, InstrumentTrait, OptionType};
///
/// let option = EuropeanOption::new("600000.SH", 10.0, Date::from_ymd(2022, 6, 30).unwrap(), OptionType::Put);
/// assert_eq!(option.asset_class(), AssetClass::Equity);
/// assert_eq!(option.symbol(), "600000.SH");
/// assert!(!option.is_path_dependent());
/// ```
pub trait InstrumentTrait {
    /// Market-data key.
    fn symbol(&self) -> String;

    /// Final valuation date.
    fn maturity(&self) -> Date;

    /// Asset class.
    fn asset_class(&self) -> AssetClass;

    /// Curve the instrument discounts on.
    fn discount_curve(&self) -> &CurveRef;

    /// Checks the terms.
    fn validate(&self) -> Result<(), InstrumentError>;

    /// Market inputs pinned on the instrument.
    fn market(&self) -> MarketAttributes {
        MarketAttributes::default()
    }

    /// Whether valuation needs simulation.
    #[inline]
    fn is_path_dependent(&self) -> bool {
        false
    }

    /// Type name for logs and errors.
    fn type_name(&self) -> &'static str;
}

macro_rules! option_like {
    ($ty:ty, $name:literal, $class:expr, |$s:ident| $terms:expr, path = $path:literal) => {
        impl InstrumentTrait for $ty {
            fn symbol(&self) -> String {
                let $s = self;
                $terms.underlying.clone()
            }

            fn maturity(&self) -> Date {
                let $s = self;
                $terms.expiry
            }

            fn asset_class(&self) -> AssetClass {
                $class
            }

            fn discount_curve(&self) -> &CurveRef {
                let $s = self;
                &$terms.discount_curve
            }

            fn validate(&self) -> Result<(), InstrumentError> {
                <$ty>::validate(self)
            }

            fn market(&self) -> MarketAttributes {
                let $s = self;
                $terms.market
            }

            fn is_path_dependent(&self) -> bool {
                $path
            }

            fn type_name(&self) -> &'static str {
                $name
            }
        }
    };
}

option_like!(EuropeanOption, "EuropeanOption", AssetClass::Equity, |s| s, path = false);
option_like!(AmericanOption, "AmericanOption", AssetClass::Equity, |s| s.terms, path = false);
option_like!(AsianOption, "AsianOption", AssetClass::Equity, |s| s.terms, path = true);
option_like!(KnockoutOption, "KnockoutOption", AssetClass::Equity, |s| s.terms, path = true);
option_like!(LookbackOption, "LookbackOption", AssetClass::Equity, |s| s, path = true);

impl InstrumentTrait for Snowball {
    fn symbol(&self) -> String {
        self.underlying.clone()
    }

    fn maturity(&self) -> Date {
        self.schedule.expiry
    }

    fn asset_class(&self) -> AssetClass {
        AssetClass::Equity
    }

    fn discount_curve(&self) -> &CurveRef {
        &self.discount_curve
    }

    fn validate(&self) -> Result<(), InstrumentError> {
        Snowball::validate(self)
    }

    fn market(&self) -> MarketAttributes {
        self.market
    }

    fn is_path_dependent(&self) -> bool {
        true
    }

    fn type_name(&self) -> &'static str {
        "Snowball"
    }
}

impl InstrumentTrait for BasketSnowball {
    /// The first underlying; per-name overrides use each symbol.
    fn symbol(&self) -> String {
        self.underlyings.first().cloned().unwrap_or_default()
    }

    fn maturity(&self) -> Date {
        self.schedule.expiry
    }

    fn asset_class(&self) -> AssetClass {
        AssetClass::Equity
    }

    fn discount_curve(&self) -> &CurveRef {
        &self.discount_curve
    }

    fn validate(&self) -> Result<(), InstrumentError> {
        BasketSnowball::validate(self)
    }

    fn is_path_dependent(&self) -> bool {
        true
    }

    fn type_name(&self) -> &'static str {
        "BasketSnowball"
    }
}

macro_rules! fx_like {
    ($ty:ty, $name:literal, |$s:ident| $terms:expr, $date:ident) => {
        impl InstrumentTrait for $ty {
            fn symbol(&self) -> String {
                let $s = self;
                $terms.pair.symbol()
            }

            fn maturity(&self) -> Date {
                let $s = self;
                $terms.$date
            }

            fn asset_class(&self) -> AssetClass {
                AssetClass::Fx
            }

            fn discount_curve(&self) -> &CurveRef {
                let $s = self;
                &$terms.domestic_curve
            }

            fn validate(&self) -> Result<(), InstrumentError> {
                <$ty>::validate(self)
            }

            fn market(&self) -> MarketAttributes {
                let $s = self;
                $terms.market
            }

            fn type_name(&self) -> &'static str {
                $name
            }
        }
    };
}

fx_like!(FxVanilla, "FxVanilla", |s| s, expiry);
fx_like!(FxForward, "FxForward", |s| s, delivery);
fx_like!(FxDigital, "FxDigital", |s| s, expiry);
fx_like!(FxQuantoDigital, "FxQuantoDigital", |s| s.digital, expiry);
fx_like!(FxQuantoRangeAccrual, "FxQuantoRangeAccrual", |s| s, payment_date);

macro_rules! bond_like {
    ($ty:ty, $name:literal) => {
        impl InstrumentTrait for $ty {
            fn symbol(&self) -> String {
                self.symbol.clone()
            }

            fn maturity(&self) -> Date {
                self.terms.maturity
            }

            fn asset_class(&self) -> AssetClass {
                AssetClass::Bond
            }

            fn discount_curve(&self) -> &CurveRef {
                &self.curve
            }

            fn validate(&self) -> Result<(), InstrumentError> {
                self.build().map(|_| ())
            }

            fn market(&self) -> MarketAttributes {
                self.market
            }

            fn type_name(&self) -> &'static str {
                $name
            }
        }
    };
}

bond_like!(FixedBond, "FixedBond");
bond_like!(FloatingBond, "FloatingBond");
bond_like!(AdvanceRedemption, "AdvanceRedemption");
bond_like!(PutableAdjustableBond, "PutableAdjustableBond");

impl InstrumentTrait for EuropeanBondOption {
    fn symbol(&self) -> String {
        self.bond.symbol.clone()
    }

    fn maturity(&self) -> Date {
        self.expiry
    }

    fn asset_class(&self) -> AssetClass {
        AssetClass::Bond
    }

    fn discount_curve(&self) -> &CurveRef {
        &self.bond.curve
    }

    fn validate(&self) -> Result<(), InstrumentError> {
        self.build().map(|_| ())
    }

    /// Pinned volatility from the option; price and yield from the bond.
    fn market(&self) -> MarketAttributes {
        MarketAttributes {
            volatility: self.market.volatility,
            ..self.bond.market
        }
    }

    fn type_name(&self) -> &'static str {
        "EuropeanBondOption"
    }
}
