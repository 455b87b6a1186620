//! Volatility skew for a single expiration and for a whole chain
//!
//! Skew here is the difference between the average implied volatility of
//! out-of-the-money puts and out-of-the-money calls. A positive skew means
//! downside protection trades richer than upside calls.

use anyhow::{anyhow, Result};

use crate::chain::types::{closest_strike, unique_strikes, ExpirationSlice, OptionContract};

/// Skew summary for one expiration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VolatilitySkew {
    pub atm_iv: f64,
    pub avg_otm_call_iv: f64,
    pub avg_otm_put_iv: f64,
    /// `avg_otm_put_iv - avg_otm_call_iv`
    pub skew: f64,
    pub otm_call_count: usize,
    pub otm_put_count: usize,
    /// OTM window as a fraction of spot
    pub window: f64,
}

impl VolatilitySkew {
    pub fn interpretation(&self) -> &'static str {
        interpret_skew(self.skew)
    }
}

/// Chain-wide skew label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkewClass {
    SteepBearish,
    Normal,
    Flat,
    InvertedBullish,
}

impl SkewClass {
    pub fn label(&self) -> &'static str {
        match self {
            SkewClass::SteepBearish => "Steep (Bearish)",
            SkewClass::Normal => "Normal",
            SkewClass::Flat => "Flat",
            SkewClass::InvertedBullish => "Inverted (Bullish)",
        }
    }
}

/// One point of the IV smile
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkewPoint {
    pub strike: f64,
    pub iv: f64,
}

/// IV by strike for each side, ascending strike
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkewCurve {
    pub calls: Vec<SkewPoint>,
    pub puts: Vec<SkewPoint>,
}

fn average(values: impl Iterator<Item = f64>) -> (f64, usize) {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        (0.0, 0)
    } else {
        (sum / count as f64, count)
    }
}

fn iv_at_closest(contracts: &[&OptionContract], spot: f64) -> Option<f64> {
    let strikes = unique_strikes(contracts.iter().copied());
    let atm = closest_strike(&strikes, spot)?;
    contracts
        .iter()
        .find(|c| c.strike_matches(atm))
        .and_then(|c| c.iv())
}

/// Compute ATM IV, average OTM call/put IV and their difference.
///
/// Only contracts reporting a positive IV are used. OTM calls are strikes in
/// `(spot, spot * (1 + window)]`, OTM puts are strikes in `[spot * (1 - window), spot)`.
/// An empty OTM side averages to zero.
pub fn volatility_skew(slice: &ExpirationSlice, spot: f64, window: f64) -> Result<VolatilitySkew> {
    if !spot.is_finite() || spot <= 0.0 {
        return Err(anyhow!("Spot price must be positive, got: {}", spot));
    }

    let calls: Vec<&OptionContract> = slice.calls.iter().filter(|c| c.iv().is_some()).collect();
    let puts: Vec<&OptionContract> = slice.puts.iter().filter(|p| p.iv().is_some()).collect();

    if calls.is_empty() || puts.is_empty() {
        return Err(anyhow!(
            "Not enough IV data to calculate skew ({} calls, {} puts with IV)",
            calls.len(),
            puts.len()
        ));
    }

    let atm_iv = match (iv_at_closest(&calls, spot), iv_at_closest(&puts, spot)) {
        (Some(c), Some(p)) => (c + p) / 2.0,
        (Some(c), None) => c,
        (None, Some(p)) => p,
        (None, None) => 0.0,
    };

    let upper = spot * (1.0 + window);
    let lower = spot * (1.0 - window);

    let (avg_otm_call_iv, otm_call_count) = average(
        calls
            .iter()
            .filter(|c| c.strike_price > spot && c.strike_price <= upper)
            .filter_map(|c| c.iv()),
    );
    let (avg_otm_put_iv, otm_put_count) = average(
        puts.iter()
            .filter(|p| p.strike_price < spot && p.strike_price >= lower)
            .filter_map(|p| p.iv()),
    );

    Ok(VolatilitySkew {
        atm_iv,
        avg_otm_call_iv,
        avg_otm_put_iv,
        skew: avg_otm_put_iv - avg_otm_call_iv,
        otm_call_count,
        otm_put_count,
        window,
    })
}

/// Sentiment reading of an OTM put-minus-call skew
pub fn interpret_skew(skew: f64) -> &'static str {
    if skew > 0.1 {
        "Strong bearish sentiment - significantly more expensive downside protection"
    } else if skew > 0.05 {
        "Moderate bearish sentiment - more expensive downside protection"
    } else if skew > 0.02 {
        "Slight bearish sentiment - somewhat more expensive downside protection"
    } else if skew < -0.1 {
        "Strong bullish sentiment - upside calls relatively expensive"
    } else if skew < -0.05 {
        "Moderate bullish sentiment - upside calls more expensive"
    } else if skew < -0.02 {
        "Slight bullish sentiment - upside calls somewhat more expensive"
    } else {
        "Neutral sentiment - similar pricing for upside and downside options"
    }
}

/// Classify an average put-minus-call IV spread across a chain
pub fn classify_skew(skew: f64) -> SkewClass {
    if skew > 0.03 {
        SkewClass::SteepBearish
    } else if skew > 0.01 {
        SkewClass::Normal
    } else if skew > -0.01 {
        SkewClass::Flat
    } else {
        SkewClass::InvertedBullish
    }
}

/// IV smile points for both sides, skipping contracts without IV
pub fn skew_curve(slice: &ExpirationSlice) -> SkewCurve {
    let points = |side: &[OptionContract]| -> Vec<SkewPoint> {
        side.iter()
            .filter_map(|c| {
                c.iv().map(|iv| SkewPoint {
                    strike: c.strike_price,
                    iv,
                })
            })
            .collect()
    };

    // Slice sides are already strike-sorted
    SkewCurve {
        calls: points(&slice.calls),
        puts: points(&slice.puts),
    }
}
