use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;

/// Strikes closer than this are treated as the same listing
pub const STRIKE_TOLERANCE: f64 = 0.01;

/// Standard equity option contract multiplier (shares per contract)
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

/// Call or put
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OptionType {
    #[cfg_attr(feature = "serde", serde(alias = "Call", alias = "CALL"))]
    Call,
    #[cfg_attr(feature = "serde", serde(alias = "Put", alias = "PUT"))]
    Put,
}

impl OptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

impl FromStr for OptionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            other => Err(anyhow!("Invalid option type: {}", other)),
        }
    }
}

/// One option contract as returned by `GET /api/options/:symbol`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionContract {
    /// Exchange contract identifier (e.g. "AAPL250117C00150000")
    #[cfg_attr(feature = "serde", serde(default))]
    pub contract_name: String,
    /// "call" or "put"
    pub contract_type: OptionType,
    /// Expiration as `YYYY-MM-DD`
    pub expiration_date: String,
    pub strike_price: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub last_price: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bid: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ask: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub change: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub change_percentage: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub volume: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub open_interest: u64,
    /// Implied volatility as a decimal (0.25 = 25%)
    #[cfg_attr(feature = "serde", serde(default))]
    pub implied_volatility: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub delta: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub gamma: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub theta: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub vega: Option<f64>,
}

impl OptionContract {
    /// Bare contract with only the fields every analytic needs
    pub fn new(
        contract_type: OptionType,
        expiration_date: impl Into<String>,
        strike_price: f64,
    ) -> Self {
        Self {
            contract_name: String::new(),
            contract_type,
            expiration_date: expiration_date.into(),
            strike_price,
            last_price: 0.0,
            bid: 0.0,
            ask: 0.0,
            change: None,
            change_percentage: None,
            volume: 0,
            open_interest: 0,
            implied_volatility: None,
            delta: None,
            gamma: None,
            theta: None,
            vega: None,
        }
    }

    pub fn is_call(&self) -> bool {
        self.contract_type == OptionType::Call
    }

    pub fn is_put(&self) -> bool {
        self.contract_type == OptionType::Put
    }

    /// Midpoint of the bid/ask quote
    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    /// Implied volatility, only when reported and positive
    pub fn iv(&self) -> Option<f64> {
        self.implied_volatility.filter(|iv| *iv > 0.0 && iv.is_finite())
    }

    pub fn expiration(&self) -> Result<NaiveDate> {
        parse_expiration(&self.expiration_date)
    }

    pub fn strike_matches(&self, strike: f64) -> bool {
        (self.strike_price - strike).abs() < STRIKE_TOLERANCE
    }
}

/// Parse an expiration date, accepting `YYYY-MM-DD` with an optional time suffix
pub fn parse_expiration(value: &str) -> Result<NaiveDate> {
    let date_part = value.trim().get(..10).unwrap_or(value.trim());
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| anyhow!("Invalid expiration date '{}': {}", value, e))
}

fn by_strike(a: &OptionContract, b: &OptionContract) -> Ordering {
    a.strike_price
        .partial_cmp(&b.strike_price)
        .unwrap_or(Ordering::Equal)
}

/// Calls and puts sharing one expiration, each sorted by ascending strike
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpirationSlice {
    pub expiration_date: String,
    pub calls: Vec<OptionContract>,
    pub puts: Vec<OptionContract>,
}

impl ExpirationSlice {
    /// Split a list of contracts into calls and puts. Contracts are not filtered by
    /// expiration here; callers pass a single expiration's contracts.
    pub fn from_contracts(
        expiration_date: impl Into<String>,
        contracts: impl IntoIterator<Item = OptionContract>,
    ) -> Self {
        let mut slice = Self {
            expiration_date: expiration_date.into(),
            ..Default::default()
        };
        for contract in contracts {
            slice.push(contract);
        }
        slice.sort();
        slice
    }

    fn push(&mut self, contract: OptionContract) {
        match contract.contract_type {
            OptionType::Call => self.calls.push(contract),
            OptionType::Put => self.puts.push(contract),
        }
    }

    fn sort(&mut self) {
        self.calls.sort_by(by_strike);
        self.puts.sort_by(by_strike);
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.puts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.calls.len() + self.puts.len()
    }

    pub fn side(&self, option_type: OptionType) -> &[OptionContract] {
        match option_type {
            OptionType::Call => &self.calls,
            OptionType::Put => &self.puts,
        }
    }

    /// Calls followed by puts
    pub fn all_contracts(&self) -> impl Iterator<Item = &OptionContract> {
        self.calls.iter().chain(self.puts.iter())
    }

    /// Sorted, de-duplicated union of call and put strikes
    pub fn strikes(&self) -> Vec<f64> {
        unique_strikes(self.all_contracts())
    }

    /// Strikes listed on both the call and the put side
    pub fn common_strikes(&self) -> Vec<f64> {
        unique_strikes(self.calls.iter())
            .into_iter()
            .filter(|&strike| self.put_at(strike).is_some())
            .collect()
    }

    pub fn call_at(&self, strike: f64) -> Option<&OptionContract> {
        self.calls.iter().find(|c| c.strike_matches(strike))
    }

    pub fn put_at(&self, strike: f64) -> Option<&OptionContract> {
        self.puts.iter().find(|p| p.strike_matches(strike))
    }

    pub fn contract_at(&self, option_type: OptionType, strike: f64) -> Option<&OptionContract> {
        match option_type {
            OptionType::Call => self.call_at(strike),
            OptionType::Put => self.put_at(strike),
        }
    }

    /// Listed strike nearest to `target` across both sides
    pub fn closest_strike(&self, target: f64) -> Option<f64> {
        closest_strike(&self.strikes(), target)
    }
}

/// Sorted, de-duplicated strikes of the given contracts
pub fn unique_strikes<'a>(contracts: impl Iterator<Item = &'a OptionContract>) -> Vec<f64> {
    let mut strikes: Vec<f64> = contracts
        .map(|c| c.strike_price)
        .filter(|s| s.is_finite())
        .collect();
    strikes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    strikes.dedup_by(|a, b| (*a - *b).abs() < STRIKE_TOLERANCE);
    strikes
}

/// Nearest strike to `target`; on an exact tie the lower strike wins
pub fn closest_strike(sorted_strikes: &[f64], target: f64) -> Option<f64> {
    let mut best: Option<f64> = None;
    for &strike in sorted_strikes {
        match best {
            Some(b) if (strike - target).abs() >= (b - target).abs() => {}
            _ => best = Some(strike),
        }
    }
    best
}

/// Volume split for one expiration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpirationVolume {
    pub calls: u64,
    pub puts: u64,
    pub total: u64,
    /// puts / calls, 0 when there is no call volume
    pub ratio: f64,
}

/// A symbol's contracts organised by expiration
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionsChain {
    pub symbol: String,
    /// Keyed by `YYYY-MM-DD`, so iteration order is chronological
    pub slices: BTreeMap<String, ExpirationSlice>,
}

impl OptionsChain {
    pub fn from_contracts(
        symbol: impl Into<String>,
        contracts: impl IntoIterator<Item = OptionContract>,
    ) -> Self {
        let mut slices: BTreeMap<String, ExpirationSlice> = BTreeMap::new();
        let mut skipped = 0usize;

        for contract in contracts {
            if !contract.strike_price.is_finite() || contract.expiration_date.is_empty() {
                skipped += 1;
                continue;
            }
            slices
                .entry(contract.expiration_date.clone())
                .or_insert_with(|| ExpirationSlice {
                    expiration_date: contract.expiration_date.clone(),
                    ..Default::default()
                })
                .push(contract);
        }

        if skipped > 0 {
            tracing::warn!(skipped, "skipped contracts without strike or expiration");
        }

        for slice in slices.values_mut() {
            slice.sort();
        }

        Self {
            symbol: symbol.into(),
            slices,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Expiration dates in ascending order
    pub fn expiration_dates(&self) -> Vec<&str> {
        self.slices.keys().map(String::as_str).collect()
    }

    pub fn slice(&self, expiration_date: &str) -> Option<&ExpirationSlice> {
        self.slices.get(expiration_date)
    }

    /// Earliest expiration, the usual default view
    pub fn nearest_slice(&self) -> Option<&ExpirationSlice> {
        self.slices.values().next()
    }

    pub fn contracts(&self) -> impl Iterator<Item = &OptionContract> {
        self.slices.values().flat_map(|s| s.all_contracts())
    }

    pub fn volume_by_expiration(&self) -> BTreeMap<String, ExpirationVolume> {
        self.slices
            .iter()
            .map(|(date, slice)| {
                let calls: u64 = slice.calls.iter().map(|c| c.volume).sum();
                let puts: u64 = slice.puts.iter().map(|p| p.volume).sum();
                let ratio = if calls > 0 {
                    puts as f64 / calls as f64
                } else {
                    0.0
                };
                (
                    date.clone(),
                    ExpirationVolume {
                        calls,
                        puts,
                        total: calls + puts,
                        ratio,
                    },
                )
            })
            .collect()
    }
}
