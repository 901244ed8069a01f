//! End-to-end pricing against the offline market snapshot in `fixtures/`.
//!
//! Each test builds an instrument the way a desk would book it, prices it
//! under a pricing context and checks the figures against closed forms or
//! market conventions.

use approx::assert_relative_eq;
use pricer_core::types::{CurrencyPair, Date, PricingError};
use pricer_models::bonds::{equal_instalments, BondTerms, FixedIncome, PutConvention, PutDirection};
use pricer_models::instruments::{
    AdvanceRedemption, CurveRef, EuropeanOption, FixedBond, FxForward, FxVanilla, Instrument, KnockInPayoff,
    KnockoutOption, MarketAttributes, OptionType, PutableAdjustableBond, Snowball, SnowballSchedule,
};
use pricer_models::schedules::Frequency;
use pricer_pricing::context::{ContextLayer, PricingContext};
use pricer_pricing::market::{AsOf, InMemoryMarketData, MarketDataProvider};
use pricer_pricing::measure::RiskMeasure;
use pricer_pricing::mc::MonteCarloConfig;
use pricer_pricing::pricers::{InstrumentView, Override, Pricer};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn market() -> InMemoryMarketData {
    init_tracing();
    InMemoryMarketData::from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/market_data.json"))
        .expect("fixture loads")
}

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd(y, m, day).unwrap()
}

fn usdcny() -> CurrencyPair {
    "USD/CNY".parse().unwrap()
}

// Bonds

fn long_bond() -> Instrument {
    let terms = BondTerms::new(d(2020, 3, 16), d(2050, 3, 16), 0.0339, Frequency::SemiAnnual);
    Instrument::FixedBond(FixedBond::new(
        "200007.IB",
        terms,
        CurveRef::BondYield("CBD100311".into()),
    ))
}

#[test]
fn test_fixed_bond_yield_and_duration_at_quoted_price() {
    let market = market();
    let mut ctx = PricingContext::at(d(2021, 12, 27));
    ctx.enter(ContextLayer::new().clean_price("200007.IB", 99.1455));
    let pricer = Pricer::new(&market, &ctx);
    let bond = long_bond();

    let ytm = pricer.calc(&bond, RiskMeasure::Ytm).unwrap();
    assert!((ytm - 0.0343).abs() < 5e-4, "ytm {ytm}");
    let dv01 = pricer.calc(&bond, RiskMeasure::Dv01).unwrap();
    assert!(dv01 > 0.0);
    let modified = pricer.calc(&bond, RiskMeasure::ModifiedDuration).unwrap();
    assert!(modified > 17.2 && modified < 18.3, "modified duration {modified}");
    let price = pricer.calc(&bond, RiskMeasure::Price).unwrap();
    assert!(price.is_finite() && price > 0.0);

    let full = pricer.calc(&bond, RiskMeasure::FullPrice).unwrap();
    let accrued = pricer.calc(&bond, RiskMeasure::AccruedInterest).unwrap();
    assert_relative_eq!(full - accrued, price, epsilon = 1e-9);
}

#[test]
fn test_quoted_price_only_reaches_yield_measures() {
    let market = market();
    let mut ctx = PricingContext::at(d(2021, 12, 27));
    let bond = long_bond();
    let curve_price = Pricer::new(&market, &ctx).calc(&bond, RiskMeasure::Price).unwrap();
    let curve_ytm = Pricer::new(&market, &ctx).calc(&bond, RiskMeasure::Ytm).unwrap();

    ctx.enter(ContextLayer::new().clean_price("200007.IB", 99.1455));
    let pricer = Pricer::new(&market, &ctx);
    assert_relative_eq!(pricer.calc(&bond, RiskMeasure::Price).unwrap(), curve_price, epsilon = 1e-12);
    assert!((pricer.calc(&bond, RiskMeasure::Ytm).unwrap() - curve_ytm).abs() > 1e-6);

    ctx.exit();
    let pricer = Pricer::new(&market, &ctx);
    assert_relative_eq!(pricer.calc(&bond, RiskMeasure::Ytm).unwrap(), curve_ytm, epsilon = 1e-12);
}

#[test]
fn test_advance_redemption_measures_and_curve_shift() {
    let market = market();
    let terms = BondTerms::new(d(2021, 10, 29), d(2028, 10, 29), 0.0477, Frequency::Annual);
    let redemptions = equal_instalments(d(2024, 10, 29), 5, Frequency::Annual).unwrap();
    let bond = Instrument::AdvanceRedemption(AdvanceRedemption::new(
        "2180430.IB",
        terms,
        redemptions,
        CurveRef::BondYield("CBD100461".into()),
    ));

    let mut ctx = PricingContext::at(d(2021, 12, 27));
    ctx.enter(ContextLayer::new().clean_price("2180430.IB", 101.0978));
    let pricer = Pricer::new(&market, &ctx);
    let values = pricer
        .calc_many(
            &bond,
            &[
                RiskMeasure::Price,
                RiskMeasure::Ytm,
                RiskMeasure::Dv01,
                RiskMeasure::ModifiedDuration,
                RiskMeasure::Convexity,
            ],
        )
        .unwrap();
    assert!(values.iter().all(|v| v.is_finite()), "{values:?}");
    // Amortisation pulls the duration well inside the seven-year maturity.
    assert!(values[3] > 2.0 && values[3] < 5.5, "modified duration {}", values[3]);

    ctx.enter(ContextLayer::new().parallel_shift("CBD100461", 100.0));
    let shifted = Pricer::new(&market, &ctx).calc(&bond, RiskMeasure::Price).unwrap();
    assert!(shifted < values[0]);
}

fn putable(convention: PutConvention) -> PutableAdjustableBond {
    let terms = BondTerms::new(d(2020, 4, 28), d(2025, 4, 28), 0.0508, Frequency::Annual);
    PutableAdjustableBond::new(
        "2080101.IB",
        terms,
        d(2023, 4, 28),
        0.03,
        CurveRef::BondYield("CBD100541".into()),
    )
    .with_convention(convention)
}

#[test]
fn test_putable_bond_prices_the_decided_branch() {
    let market = market();
    let ctx = PricingContext::at(d(2021, 12, 27));
    let pricer = Pricer::new(&market, &ctx);

    for convention in [PutConvention::ChinaBond, PutConvention::ChinaSecurities] {
        let bond = putable(convention);
        let engine = bond.build().unwrap();
        let curve = pricer.curve(&bond.curve, &bond.symbol).unwrap();
        let settlement = bond.terms.settlement_date(d(2021, 12, 27)).unwrap();
        let (decision, branch) = engine.branch_bond(&curve, settlement).unwrap();
        let decision = decision.unwrap();

        let instrument = Instrument::PutableBond(bond.clone());
        assert_relative_eq!(
            pricer.calc(&instrument, RiskMeasure::Price).unwrap(),
            branch.clean_price_from_curve(&curve, settlement).unwrap(),
            epsilon = 1e-10
        );
        let adjusted = pricer.calc(&instrument, RiskMeasure::AdjustedCoupon).unwrap();
        assert_relative_eq!(adjusted, decision.adjusted_coupon, epsilon = 1e-14);

        let (lo, hi) = (0.0508 - 0.03, 0.0508 + 0.03);
        assert!(adjusted >= lo - 1e-12 && adjusted <= hi + 1e-12);
        match (convention, decision.direction) {
            (PutConvention::ChinaBond, PutDirection::Put) => assert_eq!(adjusted, hi),
            (PutConvention::ChinaSecurities, PutDirection::Hold) => {
                assert_relative_eq!(adjusted, decision.breakeven_coupon, epsilon = 1e-14)
            }
            _ => {}
        }
    }
}

#[test]
fn test_putable_bond_after_exercise_prices_residual_bond() {
    let market = market();
    let ctx = PricingContext::at(d(2023, 6, 1));
    let pricer = Pricer::new(&market, &ctx);
    let terms = BondTerms::new(d(2020, 4, 28), d(2025, 4, 28), 0.0508, Frequency::Annual);
    let curve = CurveRef::Flat(0.03);

    let putable = PutableAdjustableBond::new("2080101.IB", terms.clone(), d(2023, 4, 28), 0.03, curve.clone())
        .with_announced_coupon(d(2023, 4, 28), 0.035);
    let stepped = FixedBond::new("2080101.IB", terms.with_coupon_step(d(2023, 4, 28), 0.035), curve);

    let putable = Instrument::PutableBond(putable);
    let stepped = Instrument::FixedBond(stepped);
    assert_relative_eq!(
        pricer.calc(&putable, RiskMeasure::Price).unwrap(),
        pricer.calc(&stepped, RiskMeasure::Price).unwrap(),
        epsilon = 1e-10
    );
    assert_relative_eq!(
        pricer.calc(&putable, RiskMeasure::Ytm).unwrap(),
        pricer.calc(&stepped, RiskMeasure::Ytm).unwrap(),
        epsilon = 1e-10
    );
    assert_eq!(pricer.calc(&putable, RiskMeasure::AdjustedCoupon).unwrap(), 0.035);
}

// FX

#[test]
fn test_fx_vanilla_parity_against_forward() {
    let market = market();
    let ctx = PricingContext::at(d(2021, 8, 20));
    let pricer = Pricer::new(&market, &ctx);
    let expiry = d(2021, 9, 16);
    let notional: f64 = 50_000_000.0;

    let call = Instrument::FxVanilla(FxVanilla::new(usdcny(), 6.6, expiry, OptionType::Call).with_notional(notional));
    let put = Instrument::FxVanilla(FxVanilla::new(usdcny(), 6.6, expiry, OptionType::Put).with_notional(notional));
    let mut forward = FxForward::new(usdcny(), 6.6, expiry);
    forward.notional = notional;
    let forward = Instrument::FxForward(forward);

    let c = pricer.calc(&call, RiskMeasure::Price).unwrap();
    let p = pricer.calc(&put, RiskMeasure::Price).unwrap();
    let f = pricer.calc(&forward, RiskMeasure::Price).unwrap();
    assert!(c > 0.0 && p > 0.0);
    assert_relative_eq!(c - p, f, epsilon = 1e-4);

    let resolved = pricer.resolve(&call).unwrap();
    let vol = resolved.market().volatility.unwrap();
    assert!(vol > 0.02 && vol < 0.08, "surface vol {vol}");
    assert_relative_eq!(resolved.market().spot.unwrap(), 6.5);
    assert_relative_eq!(pricer.calc(&resolved, RiskMeasure::Price).unwrap(), c, max_relative = 1e-12);
}

#[test]
fn test_fx_forward_has_no_vega() {
    let market = market();
    let ctx = PricingContext::at(d(2021, 8, 20));
    let pricer = Pricer::new(&market, &ctx);
    let forward = Instrument::FxForward(FxForward::new(usdcny(), 6.6, d(2021, 11, 22)));

    let greeks = pricer.greeks(&forward).unwrap();
    assert!(greeks.vega.is_none());
    assert!(greeks.delta.unwrap() > 0.9 && greeks.delta.unwrap() < 1.0);
    assert!(matches!(
        pricer.calc(&forward, RiskMeasure::Vega),
        Err(PricingError::UnsupportedOperation(_))
    ));
}

// Equity

fn knockout() -> Instrument {
    let terms = EuropeanOption::new("600000.SH", 5.3, d(2021, 9, 3), OptionType::Call)
        .with_notional(1_000_000.0)
        .with_curve(CurveRef::Flat(0.02))
        .with_market(MarketAttributes::default().with_volatility(0.1));
    Instrument::Knockout(KnockoutOption::new(terms, d(2021, 6, 3), 5.5, 0.2))
}

#[test]
fn test_knockout_on_provider_spot() {
    let market = market();
    let ctx = PricingContext::at(d(2021, 8, 13));
    let pricer = Pricer::new(&market, &ctx);
    let option = knockout();

    assert_relative_eq!(pricer.spot(&InstrumentView::new(&option)).unwrap(), 5.262);
    let alive = pricer.calc(&option, RiskMeasure::Price).unwrap();
    assert!(alive.is_finite() && alive > 0.0);

    let knocked = InstrumentView::new(&option).with(Override::Spot(5.5));
    let rebate = 0.2 * 1_000_000.0 * (-0.02 * 21.0 / 365.0_f64).exp();
    assert_relative_eq!(
        pricer.calc_view(&knocked, RiskMeasure::Price).unwrap(),
        rebate,
        max_relative = 1e-10
    );
}

fn snowball() -> Instrument {
    let schedule = SnowballSchedule::monthly(d(2021, 6, 3), d(2022, 6, 3), 0.2).unwrap();
    let mut snowball = Snowball::new("600000.SH", 5.262, 5.5, 5.2, schedule)
        .with_knock_in(KnockInPayoff::Spreads { lower: 5.3, upper: 5.4 })
        .with_notional(1_000_000.0);
    snowball.discount_curve = CurveRef::Flat(0.02);
    snowball.market = MarketAttributes::default().with_volatility(0.2);
    Instrument::Snowball(snowball)
}

#[test]
fn test_snowball_is_reproducible_per_seed() {
    let market = market();
    let ctx = PricingContext::at(d(2021, 8, 13));
    let config = |seed| {
        MonteCarloConfig::builder()
            .n_paths(20_000)
            .seed(seed)
            .build()
            .unwrap()
    };
    let snowball = snowball();

    let a = Pricer::new(&market, &ctx)
        .with_mc_config(config(7))
        .calc(&snowball, RiskMeasure::Price)
        .unwrap();
    let b = Pricer::new(&market, &ctx)
        .with_mc_config(config(7))
        .calc(&snowball, RiskMeasure::Price)
        .unwrap();
    let c = Pricer::new(&market, &ctx)
        .with_mc_config(config(8))
        .calc(&snowball, RiskMeasure::Price)
        .unwrap();
    assert_eq!(a, b);
    assert!(a.is_finite());
    assert!((a - c).abs() < 0.01 * 1_000_000.0, "seed 7 {a}, seed 8 {c}");
}

#[test]
fn test_historical_volatility_from_snapshot() {
    let market = market();
    let ctx = PricingContext::at(d(2021, 8, 13));
    let pricer = Pricer::new(&market, &ctx);
    let call = Instrument::European(
        EuropeanOption::new("600000.SH", 5.3, d(2021, 11, 12), OptionType::Call).with_curve(CurveRef::Flat(0.02)),
    );

    let history = market
        .historical_stock_price("600000.SH", d(2020, 8, 13), d(2021, 8, 13))
        .unwrap();
    let expected = pricer_pricing::market::historical_volatility(&history).unwrap();
    let resolved = pricer.resolve(&call).unwrap();
    assert_relative_eq!(resolved.market().volatility.unwrap(), expected, epsilon = 1e-14);

    let pinned = InstrumentView::new(&call).with(Override::Volatility(expected));
    assert_relative_eq!(
        pricer.calc(&call, RiskMeasure::Price).unwrap(),
        pricer.calc_view(&pinned, RiskMeasure::Price).unwrap(),
        epsilon = 1e-12
    );
}

#[test]
fn test_option_discounted_on_swap_curve() {
    let market = market();
    let ctx = PricingContext::at(d(2021, 12, 27));
    let pricer = Pricer::new(&market, &ctx);
    let option = |curve| {
        Instrument::European(
            EuropeanOption::new("600000.SH", 5.0, d(2022, 12, 27), OptionType::Call)
                .with_curve(curve)
                .with_market(MarketAttributes::default().with_volatility(0.25)),
        )
    };

    let swap = pricer.calc(&option(CurveRef::Irs("FR007".into())), RiskMeasure::Price).unwrap();
    let flat_low = pricer.calc(&option(CurveRef::Flat(0.01)), RiskMeasure::Price).unwrap();
    let flat_high = pricer.calc(&option(CurveRef::Flat(0.04)), RiskMeasure::Price).unwrap();
    // One-year FR007 swaps quote at 2.32%, so the call sits between the flat bounds.
    assert!(flat_low < swap && swap < flat_high, "{flat_low} < {swap} < {flat_high}");
}

#[test]
fn test_latest_lookup_and_missing_symbol() {
    let market = market();
    assert_relative_eq!(market.stock_price("600000.SH", AsOf::Latest).unwrap(), 5.01);
    assert_relative_eq!(market.exchange_rate("USDCNY", AsOf::Date(d(2021, 8, 22))).unwrap(), 6.5);
    assert!(market.stock_price("000001.SZ", AsOf::Latest).is_err());

    let ctx = PricingContext::at(d(2021, 8, 13));
    let pricer = Pricer::new(&market, &ctx);
    let unknown = Instrument::European(EuropeanOption::new("000001.SZ", 10.0, d(2021, 12, 13), OptionType::Put));
    let err = pricer.calc(&unknown, RiskMeasure::Price).unwrap_err();
    assert_eq!(err.kind(), "InvalidMarketData");
}
