mod test_utils;

use chain_lib::{
    build_strategy, single_option_strategy, Action, Bound, CustomStrategy, OptionType,
    StrategyKind,
};
use test_utils::{assert_close, sample_chain, slice_of, traded, SAMPLE_NEAR_EXPIRY, SAMPLE_SPOT};

fn assert_bound(bound: Bound, expected: f64) {
    match bound {
        Bound::Limited(v) => assert_close(v, expected, 1e-6),
        Bound::Unlimited => panic!("expected a limited bound of {}, got Unlimited", expected),
    }
}

fn assert_break_evens(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "break-evens {:?}", actual);
    for (a, e) in actual.iter().zip(expected) {
        assert_close(*a, *e, 1e-6);
    }
}

fn near_slice() -> chain_lib::ExpirationSlice {
    sample_chain()
        .slice(SAMPLE_NEAR_EXPIRY)
        .cloned()
        .expect("near expiration")
}

// ================================================================================================
// PREDEFINED STRATEGIES
// ================================================================================================

/// Long call at the strike nearest 105% of spot.
#[test]
fn test_long_call() {
    let strategy = build_strategy(StrategyKind::LongCall, &near_slice(), SAMPLE_SPOT).unwrap();

    assert_eq!(strategy.legs.len(), 1);
    assert_eq!(strategy.legs[0].strike, 105.0);
    assert_eq!(strategy.legs[0].action, Action::Buy);
    assert_close(strategy.net_debit, 36.0, 1e-6);

    let profile = strategy.payoff_profile();
    assert!(profile.max_profit.is_unlimited());
    assert_bound(profile.max_loss, -36.0);
    assert_break_evens(&profile.break_evens, &[105.36]);
}

#[test]
fn test_long_put() {
    let strategy = build_strategy(StrategyKind::LongPut, &near_slice(), SAMPLE_SPOT).unwrap();
    assert_eq!(strategy.legs[0].option_type, OptionType::Put);
    assert_eq!(strategy.legs[0].strike, 95.0);

    let profile = strategy.payoff_profile();
    // Best case is the underlying going to zero
    assert_bound(profile.max_profit, 9_500.0 - 53.0);
    assert_bound(profile.max_loss, -53.0);
    assert_break_evens(&profile.break_evens, &[94.47]);
}

#[test]
fn test_bull_call_spread() {
    let strategy = build_strategy(StrategyKind::BullCallSpread, &near_slice(), SAMPLE_SPOT).unwrap();
    let strikes: Vec<(f64, Action)> = strategy.legs.iter().map(|l| (l.strike, l.action)).collect();
    assert_eq!(strikes, vec![(100.0, Action::Buy), (110.0, Action::Sell)]);
    assert_close(strategy.net_debit, 198.0, 1e-6);

    let profile = strategy.payoff_profile();
    assert_bound(profile.max_profit, 802.0);
    assert_bound(profile.max_loss, -198.0);
    assert_break_evens(&profile.break_evens, &[101.98]);
}

#[test]
fn test_bear_put_spread() {
    let strategy = build_strategy(StrategyKind::BearPutSpread, &near_slice(), SAMPLE_SPOT).unwrap();
    let strikes: Vec<f64> = strategy.legs.iter().map(|l| l.strike).collect();
    assert_eq!(strikes, vec![100.0, 90.0]);

    let profile = strategy.payoff_profile();
    assert_bound(profile.max_profit, 806.0);
    assert_bound(profile.max_loss, -194.0);
    assert_break_evens(&profile.break_evens, &[98.06]);
}

/// Credit condor: max loss is the wing width less the credit, with two break-evens.
#[test]
fn test_iron_condor() {
    let strategy = build_strategy(StrategyKind::IronCondor, &near_slice(), SAMPLE_SPOT).unwrap();
    let legs: Vec<(OptionType, f64, Action)> = strategy
        .legs
        .iter()
        .map(|l| (l.option_type, l.strike, l.action))
        .collect();
    assert_eq!(
        legs,
        vec![
            (OptionType::Put, 90.0, Action::Sell),
            (OptionType::Put, 80.0, Action::Buy),
            (OptionType::Call, 110.0, Action::Sell),
            (OptionType::Call, 120.0, Action::Buy),
        ]
    );
    assert!(strategy.is_credit());
    assert_close(strategy.net_debit, -10.0, 1e-6);

    let profile = strategy.payoff_profile();
    assert_bound(profile.max_profit, 10.0);
    assert_bound(profile.max_loss, -990.0);
    assert_break_evens(&profile.break_evens, &[89.9, 110.1]);
}

#[test]
fn test_butterfly() {
    let strategy = build_strategy(StrategyKind::Butterfly, &near_slice(), SAMPLE_SPOT).unwrap();
    assert_eq!(strategy.legs[1].quantity, 2);
    assert_eq!(strategy.legs[1].action, Action::Sell);
    assert_close(strategy.net_debit, 554.0 - 400.0 + 36.0, 1e-6);

    let profile = strategy.payoff_profile();
    assert_bound(profile.max_profit, 310.0);
    assert_bound(profile.max_loss, -190.0);
    assert_break_evens(&profile.break_evens, &[96.9, 103.1]);

    let curve = strategy.payoff_curve(&[90.0, 100.0, 110.0]);
    assert_close(curve[0].1, -190.0, 1e-6);
    assert_close(curve[1].1, 310.0, 1e-6);
    assert_close(curve[2].1, -190.0, 1e-6);
}

#[test]
fn test_every_predefined_kind_builds_on_sample() {
    let slice = near_slice();
    for kind in StrategyKind::predefined() {
        let strategy = build_strategy(kind, &slice, SAMPLE_SPOT).unwrap();
        assert_eq!(strategy.kind, kind);
        assert_eq!(strategy.expiration_date, SAMPLE_NEAR_EXPIRY);
    }
}

#[test]
fn test_build_strategy_errors() {
    let calls_only = slice_of(vec![
        traded(OptionType::Call, 95.0, 6.0),
        traded(OptionType::Call, 100.0, 3.0),
    ]);

    let err = build_strategy(StrategyKind::LongPut, &calls_only, 100.0).unwrap_err();
    assert!(err
        .to_string()
        .starts_with("Could not find appropriate options for this strategy"));

    assert!(build_strategy(StrategyKind::Custom, &calls_only, 100.0).is_err());
    assert!(build_strategy(StrategyKind::LongCall, &calls_only, 0.0).is_err());
    assert!(build_strategy(StrategyKind::LongCall, &calls_only, f64::NAN).is_err());
    assert!(build_strategy(StrategyKind::LongCall, &slice_of(vec![]), 100.0).is_err());
}

// ================================================================================================
// CUSTOM STRATEGIES
// ================================================================================================

#[test]
fn test_custom_strategy_editing() {
    let call = traded(OptionType::Call, 100.0, 3.0);
    let put = traded(OptionType::Put, 100.0, 2.5);

    let mut custom = CustomStrategy::new();
    assert!(custom.is_empty());
    assert!(custom.build().is_err());

    custom.add(&call).add_leg(&put, Action::Buy, 0);
    assert_eq!(custom.legs().len(), 2);
    // A zero quantity is raised to one contract
    assert_eq!(custom.legs()[1].quantity, 1);

    let straddle = custom.build().unwrap();
    assert_eq!(straddle.kind, StrategyKind::Custom);
    assert_eq!(straddle.expiration_date, test_utils::EXPIRY);
    assert_close(straddle.net_debit, 550.0, 1e-9);

    let profile = straddle.payoff_profile();
    assert!(profile.max_profit.is_unlimited());
    assert_bound(profile.max_loss, -550.0);
    assert_break_evens(&profile.break_evens, &[94.5, 105.5]);

    assert!(custom.remove(5).is_none());
    let removed = custom.remove(0).unwrap();
    assert_eq!(removed.option_type, OptionType::Call);
    custom.clear();
    assert!(custom.is_empty());
}

/// A naked short call has capped profit and unlimited risk.
#[test]
fn test_short_call_unlimited_loss() {
    let call = traded(OptionType::Call, 105.0, 2.0);
    let mut custom = CustomStrategy::new();
    custom.add_leg(&call, Action::Sell, 1);

    let strategy = custom.build().unwrap();
    assert!(strategy.is_credit());
    let profile = strategy.payoff_profile();
    assert_bound(profile.max_profit, 200.0);
    assert!(profile.max_loss.is_unlimited());
    assert_break_evens(&profile.break_evens, &[107.0]);
}

#[test]
fn test_single_option_strategy() {
    let put = traded(OptionType::Put, 95.0, 1.25);
    let strategy = single_option_strategy(&put);
    assert_eq!(strategy.kind, StrategyKind::LongPut);
    assert_close(strategy.net_debit, 125.0, 1e-9);
    assert_close(strategy.payoff_at(90.0), 500.0 - 125.0, 1e-9);
}

// ================================================================================================
// NAMES AND DISPLAY
// ================================================================================================

#[test]
fn test_strategy_kind_names() {
    assert_eq!("bull_spread".parse::<StrategyKind>().unwrap(), StrategyKind::BullCallSpread);
    assert_eq!("Iron-Condor".parse::<StrategyKind>().unwrap(), StrategyKind::IronCondor);
    assert_eq!("bear-put-spread".parse::<StrategyKind>().unwrap(), StrategyKind::BearPutSpread);
    assert_eq!("custom-strategy".parse::<StrategyKind>().unwrap(), StrategyKind::Custom);
    assert!("strangle".parse::<StrategyKind>().is_err());

    for kind in StrategyKind::predefined() {
        assert_eq!(kind.as_str().parse::<StrategyKind>().unwrap(), kind);
    }

    assert_eq!(StrategyKind::BullCallSpread.to_string(), "Bull Call Spread");
    assert_eq!(
        serde_json::to_string(&StrategyKind::BullCallSpread).unwrap(),
        "\"bull-spread\""
    );
    assert_eq!(
        serde_json::from_str::<StrategyKind>("\"custom-strategy\"").unwrap(),
        StrategyKind::Custom
    );
}

#[test]
fn test_display_formats() {
    assert_eq!(Action::Buy.to_string(), "BUY");
    assert_eq!(Action::Sell.to_string(), "SELL");
    assert_eq!(Bound::Limited(-190.0).to_string(), "-$190.00");
    assert_eq!(Bound::Limited(310.0).to_string(), "$310.00");
    assert_eq!(Bound::Unlimited.to_string(), "Unlimited");
    assert_eq!(Bound::Unlimited.value(), None);
}
