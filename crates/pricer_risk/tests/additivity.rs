//! Portfolio totals are the quantity-weighted sum of position values.

use approx::assert_relative_eq;
use pricer_core::types::Date;
use pricer_models::bonds::BondTerms;
use pricer_models::instruments::{CurveRef, EuropeanOption, FixedBond, Instrument, MarketAttributes, OptionType};
use pricer_models::schedules::Frequency;
use pricer_pricing::context::{ContextLayer, PricingContext};
use pricer_pricing::market::InMemoryMarketData;
use pricer_pricing::measure::RiskMeasure;
use pricer_pricing::pricers::Pricer;
use pricer_risk::parallel::ParallelConfig;
use pricer_risk::portfolio::{Portfolio, Position};
use proptest::prelude::*;

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd(y, m, day).unwrap()
}

fn instrument(kind: u8, level: f64) -> Instrument {
    match kind % 3 {
        0 => Instrument::European(
            EuropeanOption::new("600000.SH", level, d(2022, 8, 13), OptionType::Call)
                .with_curve(CurveRef::Flat(0.03))
                .with_market(MarketAttributes::default().with_volatility(0.25)),
        ),
        1 => Instrument::European(
            EuropeanOption::new("600000.SH", level, d(2022, 2, 14), OptionType::Put)
                .with_curve(CurveRef::Flat(0.03))
                .with_market(MarketAttributes::default().with_volatility(0.25)),
        ),
        _ => {
            let terms = BondTerms::new(d(2020, 6, 1), d(2030, 6, 1), level / 4000.0, Frequency::SemiAnnual);
            Instrument::FixedBond(FixedBond::new("BOND", terms, CurveRef::Flat(0.028)))
        }
    }
}

fn market() -> InMemoryMarketData {
    InMemoryMarketData::new().with_stock_price("600000.SH", d(2021, 8, 13), 100.0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_price_is_additive(
        legs in prop::collection::vec((0u8..3, 60.0f64..140.0, -50.0f64..50.0), 1..12),
        parallel in any::<bool>(),
    ) {
        let threshold = if parallel { 0 } else { usize::MAX };
        let mut book = Portfolio::new("prop")
            .with_parallel_config(ParallelConfig::new().with_parallel_threshold(threshold));
        for (i, (kind, level, quantity)) in legs.iter().enumerate() {
            book.add(Position::new(format!("P{i}"), instrument(*kind, *level), *quantity)).unwrap();
        }

        let market = market();
        let ctx = PricingContext::at(d(2021, 8, 13));
        let valuation = book.calc(&market, &ctx, RiskMeasure::Price);
        prop_assert!(valuation.is_complete());

        let pricer = Pricer::new(&market, &ctx);
        let expected: f64 = legs
            .iter()
            .map(|(kind, level, quantity)| quantity * pricer.calc(&instrument(*kind, *level), RiskMeasure::Price).unwrap())
            .sum();
        prop_assert!((valuation.total - expected).abs() <= 1e-9 * (1.0 + expected.abs()));
    }

    #[test]
    fn prop_scaling_quantities_scales_total(
        legs in prop::collection::vec((0u8..3, 60.0f64..140.0, -20.0f64..20.0), 1..8),
        factor in -5.0f64..5.0,
    ) {
        let mut book = Portfolio::new("base");
        let mut scaled = Portfolio::new("scaled");
        for (i, (kind, level, quantity)) in legs.iter().enumerate() {
            book.add(Position::new(format!("P{i}"), instrument(*kind, *level), *quantity)).unwrap();
            scaled.add(Position::new(format!("P{i}"), instrument(*kind, *level), quantity * factor)).unwrap();
        }
        let market = market();
        let ctx = PricingContext::at(d(2021, 8, 13));
        let a = book.calc(&market, &ctx, RiskMeasure::Price).total;
        let b = scaled.calc(&market, &ctx, RiskMeasure::Price).total;
        prop_assert!((b - factor * a).abs() <= 1e-9 * (1.0 + b.abs()));
    }
}

#[test]
fn test_dv01_additive_under_curve_shift() {
    let market = market();
    let mut ctx = PricingContext::at(d(2021, 8, 13));
    ctx.enter(ContextLayer::new().parallel_shift("FLAT", 50.0));
    let mut book = Portfolio::new("bonds");
    book.add(Position::new("A", instrument(2, 120.0), 3.0)).unwrap();
    book.add(Position::new("B", instrument(2, 80.0), -1.5)).unwrap();

    let valuation = book.calc(&market, &ctx, RiskMeasure::Dv01);
    let pricer = Pricer::new(&market, &ctx);
    let expected = 3.0 * pricer.calc(&instrument(2, 120.0), RiskMeasure::Dv01).unwrap()
        - 1.5 * pricer.calc(&instrument(2, 80.0), RiskMeasure::Dv01).unwrap();
    assert_relative_eq!(valuation.total, expected, epsilon = 1e-10);
    assert_eq!(ctx.depth(), 2);
}
