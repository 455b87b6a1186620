use chain_lib::{load_chain, ExpirationSlice, OptionContract, OptionType, OptionsChain};

/// Expiration used by the hand-built slices
pub const EXPIRY: &str = "2025-01-17";

/// Nearest expiration in `tests/data/sample_chain.json`
#[allow(dead_code)]
pub const SAMPLE_NEAR_EXPIRY: &str = "2025-01-17";

/// Spot price the sample chain was generated around
#[allow(dead_code)]
pub const SAMPLE_SPOT: f64 = 100.0;

/// Absolute path of a file under `tests/data`
#[allow(dead_code)]
pub fn data_path(name: &str) -> String {
    format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), name)
}

/// Load the two-expiration sample chain (symbol XYZ)
#[allow(dead_code)]
pub fn sample_chain() -> OptionsChain {
    load_chain("XYZ", data_path("sample_chain.json")).expect("sample chain should load")
}

/// Quoted contract; last price is the mid
#[allow(dead_code)]
pub fn quote(option_type: OptionType, strike: f64, bid: f64, ask: f64) -> OptionContract {
    let mut contract = OptionContract::new(option_type, EXPIRY, strike);
    contract.bid = bid;
    contract.ask = ask;
    contract.last_price = (bid + ask) / 2.0;
    contract
}

/// Contract with only a last trade price
#[allow(dead_code)]
pub fn traded(option_type: OptionType, strike: f64, last_price: f64) -> OptionContract {
    let mut contract = OptionContract::new(option_type, EXPIRY, strike);
    contract.last_price = last_price;
    contract
}

/// Contract with volume and open interest and no prices
#[allow(dead_code)]
pub fn with_activity(option_type: OptionType, strike: f64, volume: u64, open_interest: u64) -> OptionContract {
    let mut contract = OptionContract::new(option_type, EXPIRY, strike);
    contract.volume = volume;
    contract.open_interest = open_interest;
    contract
}

/// Contract carrying a reported implied volatility
#[allow(dead_code)]
pub fn with_iv(option_type: OptionType, strike: f64, iv: f64) -> OptionContract {
    let mut contract = OptionContract::new(option_type, EXPIRY, strike);
    contract.implied_volatility = Some(iv);
    contract
}

#[allow(dead_code)]
pub fn slice_of(contracts: Vec<OptionContract>) -> ExpirationSlice {
    ExpirationSlice::from_contracts(EXPIRY, contracts)
}

#[allow(dead_code)]
pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() < tol,
        "expected {} (±{}), got {}",
        expected,
        tol,
        actual
    );
}
