//! # Chain-Lib: Options Chain Analytics
//!
//! `chain-lib` turns a flat list of option contracts for one underlying into the
//! numbers a trader looks at before picking a position: implied move, volatility
//! skew, max pain, put-call parity gaps, simple conversion/reversal screens,
//! premium-selling candidates and the expiration payoff of common strategies.
//!
//! ## Core Features
//!
//! - **Chain model**: contracts grouped by expiration, calls and puts sorted by strike
//! - **Analytics**: pure functions over one expiration plus the spot price
//! - **Strategies**: predefined and custom multi-leg positions with exact payoff bounds
//! - **Report**: labelled result cards and their prompt-text rendering
//! - **Client** (feature `client`): async access to the options and analysis endpoints
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chain_lib::{analyze_expiration, build_report, build_strategy, default_configs};
//! use chain_lib::{OptionsChain, StrategyKind};
//! use chrono::NaiveDate;
//!
//! # fn load_contracts() -> Vec<chain_lib::OptionContract> { vec![] }
//! let chain = OptionsChain::from_contracts("AAPL", load_contracts());
//! let slice = chain.nearest_slice().expect("at least one expiration");
//! let today = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
//!
//! let analysis = analyze_expiration(slice, 150.0, today, &default_configs::standard())?;
//! for card in build_report(&analysis) {
//!     println!("{}: {} items", card.title, card.items.len());
//! }
//!
//! let condor = build_strategy(StrategyKind::IronCondor, slice, 150.0)?;
//! println!("{:?}", condor.payoff_profile());
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Configuration Presets
//!
//! - `standard()`: 5% rate, 2% dividend yield, default thresholds
//! - `no_dividend()`: as standard with no dividend yield
//! - `strict()`: only large dislocations and liquid strikes
//! - `sensitive()`: low thresholds for thinly traded names

// ================================================================================================
// MODULES
// ================================================================================================

pub mod analytics;
pub mod chain;
pub mod models;
pub mod report;
pub mod strategies;

#[cfg(feature = "client")]
pub mod client;
#[cfg(feature = "client")]
pub mod settings;

#[cfg(feature = "cli")]
pub mod logger;

// ================================================================================================
// IMPORTS
// ================================================================================================

use anyhow::Result;
use chrono::NaiveDate;

use analytics::expiry::days_to_expiration;
use chain::types::parse_expiration;

// ================================================================================================
// PUBLIC RE-EXPORTS
// ================================================================================================

// Chain data model and configuration
pub use chain::{
    config::{AnalyticsConfig, MarketAssumptions},
    types::{ExpirationSlice, OptionContract, OptionType, OptionsChain},
};

#[cfg(feature = "serde")]
pub use chain::io::{load_contracts, parse_contracts_json};

// Per-expiration analytics
pub use analytics::{
    arbitrage::{find_arbitrage, ArbitrageOpportunity},
    greeks::fill_missing_greeks,
    historical::historical_volatility,
    implied_move::{
        atm_options, delta_weighted_implied_move, straddle_implied_move, ImpliedMove, MoveMethod,
        PriceSource,
    },
    max_pain::{max_pain, MaxPain},
    metrics::{chain_metrics, ChainMetrics},
    parity::{put_call_parity, ParityAnalysis, ParityRow, ParityTrade},
    ratio::{put_call_ratio, PutCallRatio, Sentiment},
    skew::{classify_skew, skew_curve, volatility_skew, SkewClass, VolatilitySkew},
};

// Pricing
pub use models::bs::{bs_call_price, bs_delta, bs_price, bs_put_price, implied_volatility};

// Strategies
pub use strategies::{
    build_strategy, single_option_strategy, Action, Bound, CustomStrategy, PayoffProfile,
    Strategy, StrategyKind, StrategyLeg,
};

// Report cards
pub use report::{build_report, render_prompt_text, CalculationResult, ExpirationAnalysis, ResultItem};

#[cfg(feature = "client")]
pub use client::{AnalysisRequest, AnalysisResponse, ChainClient, ClientConfig, ClientError};

// ================================================================================================
// DEFAULT CONFIGURATIONS
// ================================================================================================

/// Pre-configured analytics settings for common use cases.
///
/// # Available Configurations
///
/// - [`standard()`]: Default thresholds with dividend-adjusted parity
/// - [`no_dividend()`]: Same thresholds for non-dividend payers
/// - [`strict()`]: Only large, liquid signals
/// - [`sensitive()`]: Low thresholds for thin chains
pub mod default_configs {
    use crate::chain::config::AnalyticsConfig;

    /// Default configuration.
    ///
    /// **Characteristics:**
    /// - Risk-free rate 5%, dividend yield 2%
    /// - Parity band ±$100 around spot, 0.5% significance
    /// - $0.50 per-share arbitrage threshold
    /// - Open interest above 10 for income candidates
    ///
    /// # Example
    ///
    /// ```rust
    /// use chain_lib::default_configs;
    ///
    /// let config = default_configs::standard();
    /// assert_eq!(config.market.r, 0.05);
    /// ```
    pub fn standard() -> AnalyticsConfig {
        AnalyticsConfig::standard()
    }

    /// Standard thresholds with a zero dividend yield.
    ///
    /// **Use Cases:**
    /// - Growth stocks and ETFs without a meaningful yield
    pub fn no_dividend() -> AnalyticsConfig {
        AnalyticsConfig::no_dividend()
    }

    /// Strict configuration for liquid underlyings.
    ///
    /// **Characteristics:**
    /// - 1% parity significance, $1.00 arbitrage threshold
    /// - Open interest above 100 for candidates
    /// - Max pain needs 1,000 contracts of open interest to count as reliable
    pub fn strict() -> AnalyticsConfig {
        AnalyticsConfig::strict()
    }

    /// Sensitive configuration for thinly traded chains.
    ///
    /// **Characteristics:**
    /// - 0.25% parity significance, $0.25 arbitrage threshold
    /// - Any open interest qualifies
    pub fn sensitive() -> AnalyticsConfig {
        AnalyticsConfig::sensitive()
    }
}

/// Run every per-expiration analytic for `slice`.
///
/// Days to expiration are counted from `as_of` (minimum one day). Analytics the
/// data cannot support (no IV, one-sided chain, no qualifying candidates) come
/// back as `None` rather than failing the whole analysis.
///
/// # Errors
///
/// * `anyhow::Error` if the slice's expiration date cannot be parsed
/// * `anyhow::Error` if `spot` is not positive or the configuration is invalid
///
/// # Example
///
/// ```rust,no_run
/// use chain_lib::{analyze_expiration, default_configs, ExpirationSlice};
/// use chrono::NaiveDate;
///
/// # fn slice() -> ExpirationSlice { ExpirationSlice::default() }
/// let as_of = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
/// let analysis = analyze_expiration(&slice(), 100.0, as_of, &default_configs::standard())?;
/// if let Some(mp) = &analysis.max_pain {
///     println!("max pain {:.2}", mp.strike);
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn analyze_expiration(
    slice: &ExpirationSlice,
    spot: f64,
    as_of: NaiveDate,
    config: &AnalyticsConfig,
) -> Result<ExpirationAnalysis> {
    anyhow::ensure!(
        spot > 0.0 && spot.is_finite(),
        "Spot price must be positive, got: {}",
        spot
    );
    config.validate()?;

    let expiration = parse_expiration(&slice.expiration_date)?;
    let days = days_to_expiration(expiration, as_of);

    tracing::debug!(
        expiration = %slice.expiration_date,
        days,
        calls = slice.calls.len(),
        puts = slice.puts.len(),
        "analyzing expiration"
    );

    Ok(ExpirationAnalysis::compute(slice, spot, days, config))
}

/// Group contracts loaded from a `.json` or `.csv` file into a chain
#[cfg(feature = "serde")]
pub fn load_chain(symbol: &str, path: impl AsRef<std::path::Path>) -> Result<OptionsChain> {
    let contracts = load_contracts(path)?;
    Ok(OptionsChain::from_contracts(symbol, contracts))
}
