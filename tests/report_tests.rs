mod test_utils;

use chain_lib::report::format_count;
use chain_lib::{
    analyze_expiration, build_report, default_configs, render_prompt_text, CalculationResult,
    ExpirationSlice, OptionType, ResultItem,
};
use chrono::NaiveDate;
use test_utils::{quote, sample_chain, slice_of, SAMPLE_NEAR_EXPIRY, SAMPLE_SPOT};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
}

fn sample_report() -> Vec<CalculationResult> {
    let chain = sample_chain();
    let slice = chain.slice(SAMPLE_NEAR_EXPIRY).unwrap();
    let analysis = analyze_expiration(slice, SAMPLE_SPOT, as_of(), &default_configs::standard())
        .expect("analysis of sample expiration");
    build_report(&analysis)
}

fn card<'a>(cards: &'a [CalculationResult], kind: &str) -> &'a CalculationResult {
    cards
        .iter()
        .find(|c| c.kind == kind)
        .unwrap_or_else(|| panic!("missing card {}", kind))
}

fn value<'a>(card: &'a CalculationResult, label: &str) -> &'a str {
    card.items
        .iter()
        .find(|i| i.label == label)
        .map(|i| i.value.as_str())
        .unwrap_or_else(|| panic!("missing item {} on {}", label, card.kind))
}

/// A full two-sided expiration produces every card, in display order.
#[test]
fn test_sample_report_card_order() {
    let cards = sample_report();
    let kinds: Vec<&str> = cards.iter().map(|c| c.kind.as_str()).collect();
    assert_eq!(
        kinds,
        vec![
            "basicInfo",
            "volatilitySkew",
            "coveredCalls",
            "cashSecuredPuts",
            "maxPain",
            "putCallParity",
            "arbitrage",
            "putCallRatio",
            "highVolume",
            "summaryStats",
        ]
    );
}

#[test]
fn test_sample_report_values() {
    let cards = sample_report();

    let info = card(&cards, "basicInfo");
    assert_eq!(info.title, "Expiration Information");
    assert_eq!(value(info, "Days to Expiration"), "15");
    assert_eq!(value(info, "Annual Factor"), "24.33");

    let max_pain = card(&cards, "maxPain");
    assert_eq!(value(max_pain, "Max Pain Point"), "$100.00");
    assert_eq!(value(max_pain, "Reliability"), "High");

    let arbitrage = card(&cards, "arbitrage");
    assert_eq!(arbitrage.items.len(), 1);
    assert_eq!(arbitrage.items[0].label, "No significant arbitrage detected");

    let ratio = card(&cards, "putCallRatio");
    assert_eq!(value(ratio, "Volume P/C Ratio"), "0.75");
    assert_eq!(value(ratio, "Open Interest P/C Ratio"), "0.86");
    assert_eq!(value(ratio, "Volume Interpretation"), "Neutral to slightly bearish");

    let skew = card(&cards, "volatilitySkew");
    assert!(value(skew, "IV Interpretation").contains("bearish"));

    let parity = card(&cards, "putCallParity");
    assert_eq!(value(parity, "Strike Price"), "100.00");
    assert_eq!(value(parity, "Analysis Coverage"), "9 strikes analyzed");

    let covered = card(&cards, "coveredCalls");
    assert!(value(covered, "Best Overall Opportunity").starts_with("$105 strike - 15 DTE"));

    let activity = card(&cards, "highVolume");
    assert_eq!(value(activity, "#1 Highest Volume"), "Call $100.00: 2,200 contracts");
}

fn skew_tooltip(cards: &[CalculationResult], label: &str) -> String {
    card(cards, "volatilitySkew")
        .items
        .iter()
        .find(|i| i.label == label)
        .and_then(|i| i.tooltip.clone())
        .unwrap_or_default()
}

/// The OTM tooltips state the configured skew window.
#[test]
fn test_skew_card_tooltips_follow_window() {
    let standard = sample_report();
    assert!(skew_tooltip(&standard, "OTM Calls Average IV").contains("up to 20% above"));

    let chain = sample_chain();
    let slice = chain.slice(SAMPLE_NEAR_EXPIRY).unwrap();
    let config = chain_lib::AnalyticsConfig {
        skew_otm_window: 0.1,
        ..default_configs::standard()
    };
    let analysis = analyze_expiration(slice, SAMPLE_SPOT, as_of(), &config).unwrap();
    let cards = build_report(&analysis);
    assert!(skew_tooltip(&cards, "OTM Calls Average IV").contains("up to 10% above"));
    assert!(skew_tooltip(&cards, "OTM Puts Average IV").contains("up to 10% below"));
}

#[test]
fn test_render_prompt_text() {
    let cards = vec![
        CalculationResult {
            kind: "basicInfo".to_string(),
            title: "Expiration Information".to_string(),
            items: vec![
                ResultItem::new("Days to Expiration", "15"),
                ResultItem::new("Annual Factor", "24.33").tooltip("ignored in text"),
            ],
        },
        CalculationResult {
            kind: "maxPain".to_string(),
            title: "Maximum Pain Analysis".to_string(),
            items: vec![ResultItem::new("Max Pain Point", "$100.00")],
        },
    ];

    assert_eq!(
        render_prompt_text(&cards),
        "### Expiration Information:\n\
         - Days to Expiration: 15\n\
         - Annual Factor: 24.33\n\
         \n\
         ### Maximum Pain Analysis:\n\
         - Max Pain Point: $100.00\n\
         \n"
    );
    assert_eq!(render_prompt_text(&[]), "");
}

/// Cards serialize as `{type, title, data}` and omit empty tooltip and special flags.
#[test]
fn test_card_json_shape() {
    let cards = sample_report();

    let info = serde_json::to_value(card(&cards, "basicInfo")).unwrap();
    assert_eq!(info["type"], "basicInfo");
    assert_eq!(info["data"][0]["label"], "Days to Expiration");
    assert!(info["data"][0].get("tooltip").is_none());
    assert!(info["data"][0].get("special").is_none());

    let skew = serde_json::to_value(card(&cards, "volatilitySkew")).unwrap();
    let interpretation = skew["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["label"] == "IV Interpretation")
        .unwrap();
    assert_eq!(interpretation["special"], true);

    let parsed: CalculationResult =
        serde_json::from_str(r#"{"type":"x","title":"X","data":[{"label":"a","value":"1"}]}"#).unwrap();
    assert_eq!(parsed.items[0], ResultItem::new("a", "1"));
}

/// One-sided data skips every analytic that needs both calls and puts.
#[test]
fn test_report_for_one_sided_slice() {
    let slice = slice_of(vec![
        quote(OptionType::Call, 100.0, 2.0, 2.2),
        quote(OptionType::Call, 105.0, 0.8, 0.9),
    ]);
    let analysis = analyze_expiration(&slice, 100.0, as_of(), &default_configs::standard()).unwrap();

    assert!(analysis.skew.is_none());
    assert!(analysis.max_pain.is_none());
    assert!(analysis.parity.is_none());
    assert!(analysis.arbitrage.is_none());
    assert!(analysis.put_call_ratio.is_none());
    assert!(analysis.activity.is_none());

    let kinds: Vec<String> = build_report(&analysis).into_iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec!["basicInfo", "summaryStats"]);
}

#[test]
fn test_analyze_expiration_errors() {
    let config = default_configs::standard();
    assert!(analyze_expiration(&ExpirationSlice::default(), 100.0, as_of(), &config).is_err());

    let slice = slice_of(vec![quote(OptionType::Call, 100.0, 2.0, 2.2)]);
    assert!(analyze_expiration(&slice, 0.0, as_of(), &config).is_err());
    assert!(analyze_expiration(&slice, f64::NAN, as_of(), &config).is_err());

    let mut bad = default_configs::standard();
    bad.parity_strike_band = 0.0;
    assert!(analyze_expiration(&slice, 100.0, as_of(), &bad).is_err());
}

/// Past the expiration date the analysis still counts one day.
#[test]
fn test_analyze_expired_slice() {
    let slice = slice_of(vec![quote(OptionType::Call, 100.0, 2.0, 2.2)]);
    let late = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let analysis = analyze_expiration(&slice, 100.0, late, &default_configs::standard()).unwrap();
    assert_eq!(analysis.days_to_expiration, 1);
}

#[test]
fn test_format_count() {
    assert_eq!(format_count(0), "0");
    assert_eq!(format_count(999), "999");
    assert_eq!(format_count(1_000), "1,000");
    assert_eq!(format_count(1_234_567), "1,234,567");
}
