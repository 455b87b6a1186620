use anyhow::Result;
#[cfg(feature = "serde")]
use anyhow::Context;
#[cfg(feature = "serde")]
use std::path::Path;

/// Market parameters that are assumed rather than observed
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MarketAssumptions {
    /// Annual risk-free rate (continuous compounding)
    pub r: f64,
    /// Annual dividend yield (continuous)
    pub q: f64,
}

impl Default for MarketAssumptions {
    fn default() -> Self {
        Self { r: 0.05, q: 0.02 }
    }
}

/// Thresholds and windows used by the chain analytics
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalyticsConfig {
    #[cfg_attr(feature = "serde", serde(default))]
    pub market: MarketAssumptions,

    /// How far OTM (as a fraction of spot) a strike may be and still count toward skew
    #[cfg_attr(feature = "serde", serde(default = "default_skew_window"))]
    pub skew_otm_window: f64,

    /// Only strikes within spot ± this dollar band enter the parity table
    #[cfg_attr(feature = "serde", serde(default = "default_parity_band"))]
    pub parity_strike_band: f64,

    /// Parity gap (percent of the put side) beyond which a strike is flagged
    #[cfg_attr(feature = "serde", serde(default = "default_parity_significance"))]
    pub parity_significance_pct: f64,

    /// Fallback IV for theoretical prices when neither leg reports one
    #[cfg_attr(feature = "serde", serde(default = "default_fallback_iv"))]
    pub fallback_iv: f64,

    /// Per-share pricing error (dollars) needed to flag a conversion/reversal
    #[cfg_attr(feature = "serde", serde(default = "default_arbitrage_threshold"))]
    pub arbitrage_threshold: f64,

    /// Minimum open interest for covered call / cash-secured put candidates
    /// and for the unusual-activity scan
    #[cfg_attr(feature = "serde", serde(default = "default_min_open_interest"))]
    pub min_open_interest: u64,

    /// Aggregate open interest needed before max pain is considered reliable
    #[cfg_attr(feature = "serde", serde(default = "default_max_pain_min_oi"))]
    pub max_pain_min_total_oi: u64,

    /// Volume / open interest ratio that marks unusual activity
    #[cfg_attr(feature = "serde", serde(default = "default_unusual_ratio"))]
    pub unusual_volume_oi_ratio: f64,

    /// Entries kept in each ranked list (income candidates)
    #[cfg_attr(feature = "serde", serde(default = "default_top_candidates"))]
    pub top_candidates: usize,

    /// Entries kept in each notable-activity list
    #[cfg_attr(feature = "serde", serde(default = "default_top_activity"))]
    pub top_activity: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            market: MarketAssumptions::default(),
            skew_otm_window: default_skew_window(),
            parity_strike_band: default_parity_band(),
            parity_significance_pct: default_parity_significance(),
            fallback_iv: default_fallback_iv(),
            arbitrage_threshold: default_arbitrage_threshold(),
            min_open_interest: default_min_open_interest(),
            max_pain_min_total_oi: default_max_pain_min_oi(),
            unusual_volume_oi_ratio: default_unusual_ratio(),
            top_candidates: default_top_candidates(),
            top_activity: default_top_activity(),
        }
    }
}

impl AnalyticsConfig {
    /// Default thresholds with a 5% rate and 2% dividend yield
    pub fn standard() -> Self {
        Self::default()
    }

    /// Non-dividend payer (q = 0)
    pub fn no_dividend() -> Self {
        Self {
            market: MarketAssumptions { r: 0.05, q: 0.0 },
            ..Self::default()
        }
    }

    /// Wider thresholds: only large dislocations and liquid strikes are reported
    pub fn strict() -> Self {
        Self {
            parity_significance_pct: 1.0,
            arbitrage_threshold: 1.0,
            min_open_interest: 100,
            max_pain_min_total_oi: 1_000,
            unusual_volume_oi_ratio: 1.0,
            ..Self::default()
        }
    }

    /// Tighter thresholds for thinly traded names
    pub fn sensitive() -> Self {
        Self {
            parity_significance_pct: 0.25,
            arbitrage_threshold: 0.25,
            min_open_interest: 1,
            max_pain_min_total_oi: 50,
            unusual_volume_oi_ratio: 0.25,
            ..Self::default()
        }
    }

    /// Parse a TOML document; every key is optional
    #[cfg(feature = "serde")]
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("Failed to parse analytics configuration")
    }

    #[cfg(feature = "serde")]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text)
    }

    /// Validate that thresholds are usable
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.market.r.is_finite() && self.market.q.is_finite(),
            "Rates must be finite: r={}, q={}",
            self.market.r,
            self.market.q
        );
        anyhow::ensure!(
            self.skew_otm_window > 0.0 && self.skew_otm_window < 1.0,
            "skew_otm_window must be in (0, 1), got {}",
            self.skew_otm_window
        );
        anyhow::ensure!(
            self.parity_strike_band > 0.0,
            "parity_strike_band must be positive, got {}",
            self.parity_strike_band
        );
        anyhow::ensure!(
            self.fallback_iv > 0.0,
            "fallback_iv must be positive, got {}",
            self.fallback_iv
        );
        Ok(())
    }
}

fn default_skew_window() -> f64 {
    0.20
}

fn default_parity_band() -> f64 {
    100.0
}

fn default_parity_significance() -> f64 {
    0.5
}

fn default_fallback_iv() -> f64 {
    0.30
}

fn default_arbitrage_threshold() -> f64 {
    0.50
}

fn default_min_open_interest() -> u64 {
    10
}

fn default_max_pain_min_oi() -> u64 {
    100
}

fn default_unusual_ratio() -> f64 {
    0.5
}

fn default_top_candidates() -> usize {
    5
}

fn default_top_activity() -> usize {
    3
}
