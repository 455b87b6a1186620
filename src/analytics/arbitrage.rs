use std::cmp::Ordering;

use crate::chain::types::{ExpirationSlice, OptionContract, CONTRACT_MULTIPLIER};

use super::parity::ParityTrade;

/// A strike where call minus put strays from `S - K e^{-rT}`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArbitrageOpportunity {
    pub strike: f64,
    pub trade: ParityTrade,
    /// `(C - P) - (S - K e^{-rT})` per share
    pub pricing_error: f64,
    /// Per contract, before transaction costs
    pub expected_profit: f64,
    pub call: OptionContract,
    pub put: OptionContract,
}

impl ArbitrageOpportunity {
    pub fn legs_description(&self) -> &'static str {
        match self.trade {
            ParityTrade::Conversion => "Short call, long put, long stock",
            ParityTrade::Reversal => "Long call, short put, short stock",
            ParityTrade::None => "No trade",
        }
    }
}

/// Scan strikes listed on both sides for conversion/reversal mispricings.
///
/// Mid prices are used for both legs. Results are ordered by expected profit,
/// largest first. The dividend yield is ignored here, matching the simple
/// non-dividend parity screen.
pub fn find_arbitrage(
    slice: &ExpirationSlice,
    spot: f64,
    years_to_exp: f64,
    r: f64,
    threshold: f64,
) -> Vec<ArbitrageOpportunity> {
    let discount = (-r * years_to_exp).exp();
    let mut found = Vec::new();

    for strike in slice.common_strikes() {
        let (call, put) = match (slice.call_at(strike), slice.put_at(strike)) {
            (Some(c), Some(p)) => (c, p),
            _ => continue,
        };

        let lhs = call.mid() - put.mid();
        let rhs = spot - strike * discount;
        let pricing_error = lhs - rhs;

        if pricing_error.abs() <= threshold {
            continue;
        }

        let trade = if pricing_error > 0.0 {
            ParityTrade::Conversion
        } else {
            ParityTrade::Reversal
        };

        found.push(ArbitrageOpportunity {
            strike,
            trade,
            pricing_error,
            expected_profit: pricing_error.abs() * CONTRACT_MULTIPLIER,
            call: call.clone(),
            put: put.clone(),
        });
    }

    found.sort_by(|a, b| {
        b.expected_profit
            .partial_cmp(&a.expected_profit)
            .unwrap_or(Ordering::Equal)
    });

    tracing::debug!(
        expiration = %slice.expiration_date,
        count = found.len(),
        "arbitrage scan complete"
    );

    found
}
