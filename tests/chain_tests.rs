mod test_utils;

use chain_lib::chain::io::read_contracts_csv;
use chain_lib::chain::types::parse_expiration;
use chain_lib::settings::Settings;
use chain_lib::{
    load_contracts, parse_contracts_json, AnalyticsConfig, OptionContract, OptionType,
    OptionsChain,
};
use chrono::NaiveDate;
use std::io::Write;
use test_utils::{data_path, quote, sample_chain, slice_of, EXPIRY, SAMPLE_NEAR_EXPIRY};

fn dated(option_type: OptionType, expiration: &str, strike: f64) -> OptionContract {
    OptionContract::new(option_type, expiration, strike)
}

/// Contracts are grouped per expiration in date order, each side sorted by strike.
#[test]
fn test_chain_groups_by_expiration() {
    let chain = OptionsChain::from_contracts(
        "XYZ",
        vec![
            dated(OptionType::Call, "2025-02-21", 105.0),
            dated(OptionType::Put, "2025-01-17", 100.0),
            dated(OptionType::Call, "2025-01-17", 110.0),
            dated(OptionType::Call, "2025-01-17", 95.0),
        ],
    );

    assert_eq!(chain.expiration_dates(), vec!["2025-01-17", "2025-02-21"]);

    let near = chain.nearest_slice().expect("nearest expiration");
    assert_eq!(near.expiration_date, "2025-01-17");
    let call_strikes: Vec<f64> = near.calls.iter().map(|c| c.strike_price).collect();
    assert_eq!(call_strikes, vec![95.0, 110.0]);
    assert_eq!(near.puts.len(), 1);
    assert_eq!(chain.contracts().count(), 4);
}

/// Contracts without an expiration or with a non-finite strike never reach a slice.
#[test]
fn test_chain_skips_unusable_contracts() {
    let chain = OptionsChain::from_contracts(
        "XYZ",
        vec![
            dated(OptionType::Call, "", 100.0),
            dated(OptionType::Put, "2025-01-17", f64::NAN),
            dated(OptionType::Put, "2025-01-17", 100.0),
        ],
    );
    assert_eq!(chain.contracts().count(), 1);
}

/// Strikes within a cent are one listing; the nearest strike prefers the lower one on a tie.
#[test]
fn test_strike_lookup() {
    let slice = slice_of(vec![
        quote(OptionType::Call, 95.0, 6.0, 6.2),
        quote(OptionType::Call, 105.0, 1.0, 1.2),
        quote(OptionType::Put, 95.0, 0.8, 1.0),
        quote(OptionType::Put, 100.004, 2.0, 2.2),
    ]);

    assert_eq!(slice.strikes(), vec![95.0, 100.004, 105.0]);
    assert_eq!(slice.common_strikes(), vec![95.0]);
    assert!(slice.put_at(100.0).is_some());
    assert!(slice.call_at(100.0).is_none());

    let calls_only = slice_of(vec![
        quote(OptionType::Call, 95.0, 6.0, 6.2),
        quote(OptionType::Call, 105.0, 1.0, 1.2),
    ]);
    assert_eq!(calls_only.closest_strike(100.0), Some(95.0));
    assert_eq!(calls_only.closest_strike(101.0), Some(105.0));
    assert_eq!(slice_of(vec![]).closest_strike(100.0), None);
}

#[test]
fn test_parse_expiration_accepts_timestamps() {
    let expected = NaiveDate::from_ymd_opt(2025, 1, 17).unwrap();
    assert_eq!(parse_expiration("2025-01-17").unwrap(), expected);
    assert_eq!(parse_expiration("2025-01-17T16:00:00Z").unwrap(), expected);
    assert!(parse_expiration("01/17/2025").is_err());
}

#[test]
fn test_volume_by_expiration() {
    let mut call = dated(OptionType::Call, EXPIRY, 100.0);
    call.volume = 200;
    let mut put = dated(OptionType::Put, EXPIRY, 100.0);
    put.volume = 300;
    let mut later_put = dated(OptionType::Put, "2025-02-21", 100.0);
    later_put.volume = 50;

    let chain = OptionsChain::from_contracts("XYZ", vec![call, put, later_put]);
    let volumes = chain.volume_by_expiration();

    let near = &volumes[EXPIRY];
    assert_eq!((near.calls, near.puts, near.total), (200, 300, 500));
    assert!((near.ratio - 1.5).abs() < 1e-12);
    // No call volume: ratio reported as zero
    assert_eq!(volumes["2025-02-21"].ratio, 0.0);
}

/// Both payload shapes of the options endpoint decode to the same contracts.
#[test]
fn test_parse_contracts_json_shapes() {
    let item = r#"{"contract_type":"call","expiration_date":"2025-01-17","strike_price":100.0,
                   "bid":1.5,"ask":1.7,"volume":10,"open_interest":20,"implied_volatility":0.25}"#;

    let bare = parse_contracts_json(&format!("[{}]", item)).unwrap();
    let wrapped = parse_contracts_json(&format!(r#"{{"data":[{}]}}"#, item)).unwrap();

    assert_eq!(bare, wrapped);
    assert_eq!(bare.len(), 1);
    let contract = &bare[0];
    assert_eq!(contract.contract_type, OptionType::Call);
    assert_eq!(contract.iv(), Some(0.25));
    assert_eq!(contract.delta, None);
    assert_eq!(contract.last_price, 0.0);
    assert!((contract.mid() - 1.6).abs() < 1e-12);
}

#[test]
fn test_parse_contracts_json_rejects_bad_shapes() {
    let err = parse_contracts_json(r#"{"contracts": []}"#).unwrap_err();
    assert!(err.to_string().contains("Invalid options data format"));

    assert!(parse_contracts_json("42").is_err());
    assert!(parse_contracts_json("not json").is_err());
}

/// Malformed entries are dropped while the rest of the payload is kept.
#[test]
fn test_parse_contracts_json_skips_malformed_entries() {
    let payload = r#"[
        {"contract_type":"put","expiration_date":"2025-01-17","strike_price":95.0},
        {"contract_type":"straddle","expiration_date":"2025-01-17","strike_price":95.0},
        {"contract_type":"CALL","expiration_date":"2025-01-17"}
    ]"#;
    let contracts = parse_contracts_json(payload).unwrap();
    assert_eq!(contracts.len(), 1);
    assert_eq!(contracts[0].contract_type, OptionType::Put);
}

/// The CSV fixture carries the near expiration of the JSON fixture, minus some IVs.
#[test]
fn test_load_contracts_csv_matches_json_fixture() {
    let from_csv = load_contracts(data_path("sample_chain.csv")).expect("csv fixture");
    let chain = sample_chain();
    let near = chain.slice(SAMPLE_NEAR_EXPIRY).expect("near slice");

    assert_eq!(from_csv.len(), near.len());

    let csv_chain = OptionsChain::from_contracts("XYZ", from_csv);
    let csv_near = csv_chain.slice(SAMPLE_NEAR_EXPIRY).expect("csv near slice");
    assert_eq!(csv_near.strikes(), near.strikes());

    let wing = csv_near.call_at(80.0).expect("80 call");
    assert_eq!(wing.implied_volatility, None);
    assert_eq!(wing.bid, near.call_at(80.0).unwrap().bid);
    assert!(csv_near.call_at(100.0).unwrap().iv().is_some());
}

/// Rows that do not decode are dropped, the rest of the file still loads.
#[test]
fn test_read_contracts_csv_skips_malformed_rows() {
    let csv = "contract_type,expiration_date,strike_price,volume\n\
               call,2025-01-17,100,5\n\
               weekly,2025-01-17,105,7\n\
               put,2025-01-17,abc,5\n\
               put,2025-01-17,95,3\n";
    let contracts = read_contracts_csv(csv.as_bytes()).expect("good rows load");

    let loaded: Vec<(OptionType, f64, u64)> = contracts
        .iter()
        .map(|c| (c.contract_type, c.strike_price, c.volume))
        .collect();
    assert_eq!(loaded, vec![(OptionType::Call, 100.0, 5), (OptionType::Put, 95.0, 3)]);

    // Same entries as a JSON payload load the same way
    let json = r#"[
        {"contract_type":"call","expiration_date":"2025-01-17","strike_price":100,"volume":5},
        {"contract_type":"weekly","expiration_date":"2025-01-17","strike_price":105,"volume":7},
        {"contract_type":"put","expiration_date":"2025-01-17","strike_price":95,"volume":3}
    ]"#;
    assert_eq!(parse_contracts_json(json).unwrap(), contracts);
}

#[test]
fn test_read_contracts_csv_reports_short_row() {
    let csv = "contract_type,expiration_date,strike_price,volume\n\
               call,2025-01-17,100,5\n\
               call,2025-01-17,105\n";
    let err = read_contracts_csv(csv.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("row 3"), "got: {}", err);
}

#[test]
fn test_load_contracts_unsupported_extension() {
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    writeln!(file, "[]").unwrap();
    let err = load_contracts(file.path()).unwrap_err();
    assert!(err.to_string().contains("Unsupported"));
}

#[test]
fn test_sample_chain_fixture() {
    let chain = sample_chain();
    assert_eq!(chain.symbol, "XYZ");
    assert_eq!(chain.expiration_dates(), vec!["2025-01-17", "2025-02-21"]);
    assert_eq!(chain.contracts().count(), 32);
}

/// Only the keys present in the TOML document override the defaults.
#[test]
fn test_config_partial_toml() {
    let config = AnalyticsConfig::from_toml_str(
        r#"
        parity_strike_band = 25.0
        min_open_interest = 500

        [market]
        r = 0.04
        "#,
    )
    .unwrap();

    assert_eq!(config.parity_strike_band, 25.0);
    assert_eq!(config.min_open_interest, 500);
    assert_eq!(config.market.r, 0.04);
    assert_eq!(config.market.q, 0.02);
    assert_eq!(config.skew_otm_window, AnalyticsConfig::default().skew_otm_window);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_presets_and_validation() {
    assert_eq!(AnalyticsConfig::no_dividend().market.q, 0.0);
    assert!(AnalyticsConfig::strict().arbitrage_threshold > AnalyticsConfig::standard().arbitrage_threshold);
    assert!(AnalyticsConfig::sensitive().min_open_interest < AnalyticsConfig::standard().min_open_interest);

    for config in [
        AnalyticsConfig::standard(),
        AnalyticsConfig::no_dividend(),
        AnalyticsConfig::strict(),
        AnalyticsConfig::sensitive(),
    ] {
        assert!(config.validate().is_ok());
    }

    let bad = AnalyticsConfig {
        skew_otm_window: 1.5,
        ..AnalyticsConfig::default()
    };
    assert!(bad.validate().is_err());

    let bad = AnalyticsConfig {
        fallback_iv: 0.0,
        ..AnalyticsConfig::default()
    };
    assert!(bad.validate().is_err());
}

#[test]
fn test_settings_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[analytics]
arbitrage_threshold = 0.25

[client]
base_url = "http://options.internal:9000"
timeout_secs = 5
"#
    )
    .unwrap();

    let settings = Settings::from_file(file.path()).unwrap();
    assert_eq!(settings.analytics.arbitrage_threshold, 0.25);
    assert_eq!(settings.client.base_url, "http://options.internal:9000");
    assert_eq!(settings.client.timeout_secs, 5);
    assert!(settings.client.user_agent.starts_with("chain-lib/"));

    let empty = Settings::from_toml_str("").unwrap();
    assert_eq!(empty, Settings::default());

    assert!(Settings::from_toml_str("[analytics]\nparity_strike_band = -1.0\n").is_err());
}
