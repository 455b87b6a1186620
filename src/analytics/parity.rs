//! Put-call parity with continuous dividends
//!
//! For European options on the same strike and expiry:
//!
//! ```text
//! C + K e^{-rT} = P + S e^{-qT}
//! ```
//!
//! Each strike near the money gets the gap between the two sides (from bid/ask
//! mid prices) plus the market-minus-model difference of each leg against a
//! dividend-adjusted Black-Scholes price.

use crate::chain::config::AnalyticsConfig;
use crate::chain::types::ExpirationSlice;
use crate::models::bs::{bs_call_price, bs_put_price};

/// Trade suggested by a parity gap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParityTrade {
    /// Call side rich: buy stock, buy put, sell call
    Conversion,
    /// Put side rich: sell stock, sell put, buy call
    Reversal,
    None,
}

impl ParityTrade {
    pub fn label(&self) -> &'static str {
        match self {
            ParityTrade::Conversion => "Conversion",
            ParityTrade::Reversal => "Reversal",
            ParityTrade::None => "None",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            ParityTrade::Conversion => "Consider conversion: Buy stock, buy put, sell call",
            ParityTrade::Reversal => "Consider reversal: Sell stock, sell put, buy call",
            ParityTrade::None => "None - prices align with put-call parity",
        }
    }
}

/// Parity and model comparison at one strike
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParityRow {
    pub strike: f64,
    pub call_price: f64,
    pub put_price: f64,
    pub theoretical_call: f64,
    pub theoretical_put: f64,
    /// market - theoretical
    pub call_diff: f64,
    pub put_diff: f64,
    /// `(C + K e^{-rT}) - (P + S e^{-qT})`
    pub parity_difference: f64,
    /// Difference as a percentage of the put side
    pub parity_diff_pct: f64,
    pub significant: bool,
    pub trade: ParityTrade,
    pub is_atm: bool,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParityAnalysis {
    pub rows: Vec<ParityRow>,
    /// ATM row, or the analysed row nearest spot when the ATM strike has no pair
    pub summary: Option<ParityRow>,
    pub band_low: f64,
    pub band_high: f64,
}

/// Build the parity table for strikes within `spot ± cfg.parity_strike_band`.
///
/// Strikes missing either leg are skipped. When neither leg reports an IV the
/// configured fallback volatility is used for the theoretical prices.
#[allow(non_snake_case)]
pub fn put_call_parity(
    slice: &ExpirationSlice,
    spot: f64,
    years_to_exp: f64,
    cfg: &AnalyticsConfig,
) -> ParityAnalysis {
    let r = cfg.market.r;
    let q = cfg.market.q;
    let T = years_to_exp;
    let S = spot;

    let band_low = spot - cfg.parity_strike_band;
    let band_high = spot + cfg.parity_strike_band;
    let atm_strike = slice.closest_strike(spot);

    let mut rows = Vec::new();

    for K in slice
        .strikes()
        .into_iter()
        .filter(|k| *k >= band_low && *k <= band_high)
    {
        let (call, put) = match (slice.call_at(K), slice.put_at(K)) {
            (Some(c), Some(p)) => (c, p),
            _ => continue,
        };

        let call_price = call.mid();
        let put_price = put.mid();

        let lhs = call_price + K * (-r * T).exp();
        let rhs = put_price + S * (-q * T).exp();
        let parity_difference = lhs - rhs;
        let parity_diff_pct = if rhs != 0.0 {
            parity_difference / rhs * 100.0
        } else {
            0.0
        };

        let significant = parity_diff_pct.abs() > cfg.parity_significance_pct;
        let trade = if significant && parity_difference > 0.0 {
            ParityTrade::Conversion
        } else if significant && parity_difference < 0.0 {
            ParityTrade::Reversal
        } else {
            ParityTrade::None
        };

        let sigma = call.iv().or_else(|| put.iv()).unwrap_or(cfg.fallback_iv);
        let theoretical_call = bs_call_price(S, K, r, q, T, sigma);
        let theoretical_put = bs_put_price(S, K, r, q, T, sigma);

        rows.push(ParityRow {
            strike: K,
            call_price,
            put_price,
            theoretical_call,
            theoretical_put,
            call_diff: call_price - theoretical_call,
            put_diff: put_price - theoretical_put,
            parity_difference,
            parity_diff_pct,
            significant,
            trade,
            is_atm: atm_strike.is_some_and(|a| (a - K).abs() < 0.01),
        });
    }

    let summary = rows.iter().find(|r| r.is_atm).cloned().or_else(|| {
        rows.iter()
            .min_by(|a, b| {
                (a.strike - spot)
                    .abs()
                    .partial_cmp(&(b.strike - spot).abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .cloned()
    });

    if rows.is_empty() {
        tracing::debug!(
            expiration = %slice.expiration_date,
            band_low,
            band_high,
            "no paired strikes inside the parity band"
        );
    }

    ParityAnalysis {
        rows,
        summary,
        band_low,
        band_high,
    }
}
