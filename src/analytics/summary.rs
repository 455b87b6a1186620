use crate::chain::types::{
    closest_strike, unique_strikes, ExpirationSlice, OptionContract, CONTRACT_MULTIPLIER,
};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SummaryStats {
    /// Σ bid · open interest · 100 over calls
    pub total_call_premium: f64,
    pub total_put_premium: f64,
    pub avg_call_bid: f64,
    pub avg_put_bid: f64,
    /// Bid straddle at the nearest strikes over spot, as a fraction
    pub implied_move: f64,
}

fn avg_bid(side: &[OptionContract]) -> f64 {
    if side.is_empty() {
        0.0
    } else {
        side.iter().map(|c| c.bid).sum::<f64>() / side.len() as f64
    }
}

pub fn summary_stats(slice: &ExpirationSlice, spot: f64) -> SummaryStats {
    let premium = |side: &[OptionContract]| -> f64 {
        side.iter()
            .map(|c| c.bid * c.open_interest as f64 * CONTRACT_MULTIPLIER)
            .sum()
    };

    // Each side uses its own nearest strike
    let call_strike = closest_strike(&unique_strikes(slice.calls.iter()), spot);
    let put_strike = closest_strike(&unique_strikes(slice.puts.iter()), spot);
    let atm_call = call_strike.and_then(|k| slice.call_at(k));
    let atm_put = put_strike.and_then(|k| slice.put_at(k));

    let implied_move = match (atm_call, atm_put) {
        (Some(c), Some(p)) if spot > 0.0 => (c.bid + p.bid) / spot,
        _ => 0.0,
    };

    SummaryStats {
        total_call_premium: premium(&slice.calls),
        total_put_premium: premium(&slice.puts),
        avg_call_bid: avg_bid(&slice.calls),
        avg_put_bid: avg_bid(&slice.puts),
        implied_move,
    }
}

/// Compact dollar amounts: `1.50K`, `2.35M`, `1.00B`
pub fn format_large_number(value: f64) -> String {
    if value >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if value >= 1e3 {
        format!("{:.2}K", value / 1e3)
    } else {
        format!("{:.2}", value)
    }
}
