//! Instrument definitions.
//!
//! Term structs are plain data: contract terms, the market objects they
//! depend on, and any market inputs pinned on the instrument. They carry
//! no pricing logic; L3 (`pricer_pricing`) prices the [`Instrument`] enum
//! with free functions per variant.
//!
//! # Asset Class Modules
//!
//! - [`equity`]: European, American, Asian, knockout and lookback options
//! - [`snowball`]: single-name and worst-of basket snowballs
//! - [`fx`]: FX vanilla, forward, digital and the quanto pair
//! - [`bond`]: fixed, floating, amortising and putable bonds, bond options
//!
//! # Examples
//!
//! ```
//! use pricer_core::types::Date;
//! use pricer_models::instruments::{AssetClass, EuropeanOption, Instrument, OptionType};
//!
//! let call = EuropeanOption::new("600000.SH", 10.0, Date::from_ymd(2022, 6, 30).unwrap(), OptionType::Call);
//! let instrument = Instrument::European(call);
//! assert_eq!(instrument.asset_class(), AssetClass::Equity);
//! assert_eq!(instrument.name(), "EuropeanOption");
//! ```

pub mod bond;
pub mod equity;
mod error;
pub mod fx;
mod market;
mod payoff;
pub mod snowball;
mod traits;

pub use bond::{AdvanceRedemption, EuropeanBondOption, FixedBond, FloatingBond, PutableAdjustableBond};
pub use equity::{AmericanOption, AsianOption, EuropeanOption, KnockoutOption, LookbackOption};
pub use error::InstrumentError;
pub use fx::{FxDigital, FxForward, FxQuantoDigital, FxQuantoRangeAccrual, FxVanilla};
pub use market::{AssetClass, CurveRef, MarketAttributes};
pub use payoff::OptionType;
pub use snowball::{BasketSnowball, KnockInPayoff, Snowball, SnowballSchedule};
pub use traits::InstrumentTrait;

use pricer_core::types::Date;

/// Every priceable instrument, tagged by kind.
///
/// Static dispatch over the variants; no trait objects. Serialised with a
/// `type` tag so positions can be stored as JSON.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum Instrument {
    /// European equity option.
    European(EuropeanOption),
    /// American equity option.
    American(AmericanOption),
    /// Arithmetic Asian option.
    Asian(AsianOption),
    /// Knockout with rebate.
    Knockout(KnockoutOption),
    /// Floating-strike lookback.
    Lookback(LookbackOption),
    /// Single-name snowball.
    Snowball(Snowball),
    /// Worst-of basket snowball.
    BasketSnowball(BasketSnowball),
    /// FX vanilla option.
    FxVanilla(FxVanilla),
    /// FX forward.
    FxForward(FxForward),
    /// FX digital.
    FxDigital(FxDigital),
    /// FX quanto digital.
    FxQuantoDigital(FxQuantoDigital),
    /// FX quanto range accrual.
    FxQuantoRangeAccrual(FxQuantoRangeAccrual),
    /// Fixed-rate bond.
    FixedBond(FixedBond),
    /// Floating-rate bond.
    FloatingBond(FloatingBond),
    /// Amortising bond.
    AdvanceRedemption(AdvanceRedemption),
    /// Putable bond with coupon reset.
    PutableBond(PutableAdjustableBond),
    /// European bond option.
    BondOption(EuropeanBondOption),
}

macro_rules! dispatch {
    ($self:ident, $inner:ident => $body:expr) => {
        match $self {
            Instrument::European($inner) => $body,
            Instrument::American($inner) => $body,
            Instrument::Asian($inner) => $body,
            Instrument::Knockout($inner) => $body,
            Instrument::Lookback($inner) => $body,
            Instrument::Snowball($inner) => $body,
            Instrument::BasketSnowball($inner) => $body,
            Instrument::FxVanilla($inner) => $body,
            Instrument::FxForward($inner) => $body,
            Instrument::FxDigital($inner) => $body,
            Instrument::FxQuantoDigital($inner) => $body,
            Instrument::FxQuantoRangeAccrual($inner) => $body,
            Instrument::FixedBond($inner) => $body,
            Instrument::FloatingBond($inner) => $body,
            Instrument::AdvanceRedemption($inner) => $body,
            Instrument::PutableBond($inner) => $body,
            Instrument::BondOption($inner) => $body,
        }
    };
}

impl Instrument {
    /// Type name of the wrapped instrument.
    pub fn name(&self) -> &'static str {
        dispatch!(self, i => i.type_name())
    }

    /// Market-data key.
    pub fn symbol(&self) -> String {
        dispatch!(self, i => i.symbol())
    }

    /// Asset class.
    pub fn asset_class(&self) -> AssetClass {
        dispatch!(self, i => i.asset_class())
    }

    /// Final valuation date.
    pub fn maturity(&self) -> Date {
        dispatch!(self, i => i.maturity())
    }

    /// Pinned market inputs.
    pub fn market(&self) -> MarketAttributes {
        dispatch!(self, i => i.market())
    }

    /// Discount curve handle.
    pub fn discount_curve(&self) -> &CurveRef {
        dispatch!(self, i => i.discount_curve())
    }

    /// Whether valuation needs simulation.
    pub fn is_path_dependent(&self) -> bool {
        dispatch!(self, i => i.is_path_dependent())
    }

    /// Checks the terms of the wrapped instrument.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        dispatch!(self, i => InstrumentTrait::validate(i))
    }

    /// Mutable access to the pinned market inputs, where the instrument
    /// carries them.
    ///
    /// Basket snowballs pin per-name vectors instead and return `None`.
    pub fn market_mut(&mut self) -> Option<&mut MarketAttributes> {
        match self {
            Instrument::European(i) => Some(&mut i.market),
            Instrument::American(i) => Some(&mut i.terms.market),
            Instrument::Asian(i) => Some(&mut i.terms.market),
            Instrument::Knockout(i) => Some(&mut i.terms.market),
            Instrument::Lookback(i) => Some(&mut i.market),
            Instrument::Snowball(i) => Some(&mut i.market),
            Instrument::BasketSnowball(_) => None,
            Instrument::FxVanilla(i) => Some(&mut i.market),
            Instrument::FxForward(i) => Some(&mut i.market),
            Instrument::FxDigital(i) => Some(&mut i.market),
            Instrument::FxQuantoDigital(i) => Some(&mut i.digital.market),
            Instrument::FxQuantoRangeAccrual(i) => Some(&mut i.market),
            Instrument::FixedBond(i) => Some(&mut i.market),
            Instrument::FloatingBond(i) => Some(&mut i.market),
            Instrument::AdvanceRedemption(i) => Some(&mut i.market),
            Instrument::PutableBond(i) => Some(&mut i.market),
            Instrument::BondOption(i) => Some(&mut i.market),
        }
    }

    /// Mutable access to the discount curve handle.
    pub fn discount_curve_mut(&mut self) -> &mut CurveRef {
        match self {
            Instrument::European(i) => &mut i.discount_curve,
            Instrument::American(i) => &mut i.terms.discount_curve,
            Instrument::Asian(i) => &mut i.terms.discount_curve,
            Instrument::Knockout(i) => &mut i.terms.discount_curve,
            Instrument::Lookback(i) => &mut i.discount_curve,
            Instrument::Snowball(i) => &mut i.discount_curve,
            Instrument::BasketSnowball(i) => &mut i.discount_curve,
            Instrument::FxVanilla(i) => &mut i.domestic_curve,
            Instrument::FxForward(i) => &mut i.domestic_curve,
            Instrument::FxDigital(i) => &mut i.domestic_curve,
            Instrument::FxQuantoDigital(i) => &mut i.digital.domestic_curve,
            Instrument::FxQuantoRangeAccrual(i) => &mut i.domestic_curve,
            Instrument::FixedBond(i) => &mut i.curve,
            Instrument::FloatingBond(i) => &mut i.curve,
            Instrument::AdvanceRedemption(i) => &mut i.curve,
            Instrument::PutableBond(i) => &mut i.curve,
            Instrument::BondOption(i) => &mut i.bond.curve,
        }
    }
}

macro_rules! impl_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Instrument {
                fn from(value: $ty) -> Self {
                    Instrument::$variant(value)
                }
            }
        )*
    };
}

impl_from!(
    European(EuropeanOption),
    American(AmericanOption),
    Asian(AsianOption),
    Knockout(KnockoutOption),
    Lookback(LookbackOption),
    Snowball(Snowball),
    BasketSnowball(BasketSnowball),
    FxVanilla(FxVanilla),
    FxForward(FxForward),
    FxDigital(FxDigital),
    FxQuantoDigital(FxQuantoDigital),
    FxQuantoRangeAccrual(FxQuantoRangeAccrual),
    FixedBond(FixedBond),
    FloatingBond(FloatingBond),
    AdvanceRedemption(AdvanceRedemption),
    PutableBond(PutableAdjustableBond),
    BondOption(EuropeanBondOption),
);
