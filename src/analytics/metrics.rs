use std::collections::BTreeSet;

use crate::chain::types::{OptionContract, OptionType};

use super::ratio::Sentiment;
use super::skew::{classify_skew, SkewClass};

/// Headline numbers over every contract of a chain
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainMetrics {
    pub total_call_oi: u64,
    pub total_put_oi: u64,
    pub total_call_volume: u64,
    pub total_put_volume: u64,
    /// put OI / call OI, `None` without call open interest
    pub put_call_oi_ratio: Option<f64>,
    pub put_call_volume_ratio: Option<f64>,
    pub avg_call_iv: f64,
    pub avg_put_iv: f64,
    pub avg_iv: f64,
    /// avg put IV - avg call IV
    pub skew: f64,
    pub skew_class: SkewClass,
    pub expiration_count: usize,
    pub sentiment: Sentiment,
}

#[derive(Default)]
struct IvAccumulator {
    sum: f64,
    count: usize,
}

impl IvAccumulator {
    fn add(&mut self, iv: f64) {
        self.sum += iv;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Aggregate open interest, volume and IV across all expirations.
///
/// Contracts with a non-finite reported IV are left out of the averages. A zero
/// IV still counts, as a reported value.
pub fn chain_metrics<'a>(contracts: impl IntoIterator<Item = &'a OptionContract>) -> ChainMetrics {
    let mut total_call_oi = 0u64;
    let mut total_put_oi = 0u64;
    let mut total_call_volume = 0u64;
    let mut total_put_volume = 0u64;
    let mut call_iv = IvAccumulator::default();
    let mut put_iv = IvAccumulator::default();
    let mut expirations = BTreeSet::new();

    for contract in contracts {
        let iv = contract.implied_volatility.filter(|v| v.is_finite());
        match contract.contract_type {
            OptionType::Call => {
                total_call_oi += contract.open_interest;
                total_call_volume += contract.volume;
                if let Some(v) = iv {
                    call_iv.add(v);
                }
            }
            OptionType::Put => {
                total_put_oi += contract.open_interest;
                total_put_volume += contract.volume;
                if let Some(v) = iv {
                    put_iv.add(v);
                }
            }
        }
        if !contract.expiration_date.is_empty() {
            expirations.insert(contract.expiration_date.as_str());
        }
    }

    let ratio = |puts: u64, calls: u64| {
        if calls > 0 {
            Some(puts as f64 / calls as f64)
        } else {
            None
        }
    };

    let put_call_volume_ratio = ratio(total_put_volume, total_call_volume);
    let avg_call_iv = call_iv.mean();
    let avg_put_iv = put_iv.mean();
    let iv_count = call_iv.count + put_iv.count;
    let avg_iv = if iv_count > 0 {
        (call_iv.sum + put_iv.sum) / iv_count as f64
    } else {
        0.0
    };
    let skew = avg_put_iv - avg_call_iv;

    tracing::debug!(
        total_call_oi,
        total_put_oi,
        total_call_volume,
        total_put_volume,
        expirations = expirations.len(),
        "computed chain metrics"
    );

    ChainMetrics {
        total_call_oi,
        total_put_oi,
        total_call_volume,
        total_put_volume,
        put_call_oi_ratio: ratio(total_put_oi, total_call_oi),
        put_call_volume_ratio,
        avg_call_iv,
        avg_put_iv,
        avg_iv,
        skew,
        skew_class: classify_skew(skew),
        expiration_count: expirations.len(),
        sentiment: Sentiment::from_ratio(put_call_volume_ratio.unwrap_or(1.0)),
    }
}
