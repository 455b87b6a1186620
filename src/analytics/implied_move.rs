//! Expected move implied by at-the-money straddle prices
//!
//! The plain estimate prices the straddle at the listed strike closest to spot.
//! The delta-weighted estimate blends the straddles at the two strikes bracketing
//! spot so that the result corresponds to a 0.5-delta call, which is where the
//! straddle is closest to delta neutral.

use anyhow::{anyhow, Result};

use crate::chain::types::{ExpirationSlice, OptionContract, STRIKE_TOLERANCE};

/// Which quote to read as the option price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PriceSource {
    #[default]
    Last,
    Bid,
    Mid,
}

impl PriceSource {
    pub fn price(&self, contract: &OptionContract) -> f64 {
        match self {
            PriceSource::Last => contract.last_price,
            PriceSource::Bid => contract.bid,
            PriceSource::Mid => contract.mid(),
        }
    }
}

/// How the straddle price was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveMethod {
    /// Single straddle at the nearest strike
    AtmStraddle,
    /// Interpolated to the 0.5 call delta between two strikes
    DeltaWeighted,
    /// Interpolated by distance of spot between two strikes
    StrikeWeighted,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImpliedMove {
    /// Strike the straddle refers to; interpolated for weighted methods
    pub strike: f64,
    pub call_price: f64,
    pub put_price: f64,
    pub straddle: f64,
    /// straddle / spot
    pub implied_move: f64,
    pub low: f64,
    pub high: f64,
    pub days_to_expiration: u32,
    pub method: MoveMethod,
}

impl ImpliedMove {
    fn new(
        spot: f64,
        days: u32,
        strike: f64,
        call_price: f64,
        put_price: f64,
        method: MoveMethod,
    ) -> Self {
        let straddle = call_price + put_price;
        let implied_move = straddle / spot;
        ImpliedMove {
            strike,
            call_price,
            put_price,
            straddle,
            implied_move,
            low: spot * (1.0 - implied_move),
            high: spot * (1.0 + implied_move),
            days_to_expiration: days,
            method,
        }
    }

    pub fn implied_move_pct(&self) -> f64 {
        self.implied_move * 100.0
    }
}

/// Nearest strike to spot over both sides, with the call and put listed there
pub fn atm_options(
    slice: &ExpirationSlice,
    spot: f64,
) -> Option<(f64, Option<&OptionContract>, Option<&OptionContract>)> {
    let strike = slice.closest_strike(spot)?;
    Some((strike, slice.call_at(strike), slice.put_at(strike)))
}

pub fn straddle_implied_move(
    slice: &ExpirationSlice,
    spot: f64,
    days: u32,
    source: PriceSource,
) -> Result<ImpliedMove> {
    if !spot.is_finite() || spot <= 0.0 {
        return Err(anyhow!("Spot price must be positive, got: {}", spot));
    }

    let (strike, call, put) =
        atm_options(slice, spot).ok_or_else(|| anyhow!("No valid strike prices found"))?;

    match (call, put) {
        (Some(c), Some(p)) => Ok(ImpliedMove::new(
            spot,
            days,
            strike,
            source.price(c),
            source.price(p),
            MoveMethod::AtmStraddle,
        )),
        _ => Err(anyhow!(
            "Could not find both ATM call and put options at strike {:.2}",
            strike
        )),
    }
}

/// Straddle interpolated between the strikes bracketing spot.
///
/// With call deltas on both bracketing strikes, the weight on the upper strike
/// is `(Δ_lo - 0.5) / (Δ_lo - Δ_hi)`, clamped to `[0, 1]`. Without usable deltas
/// the weight is the distance of spot between the two strikes. When spot sits
/// on a listed strike or outside the paired strikes this is the plain ATM
/// straddle.
pub fn delta_weighted_implied_move(
    slice: &ExpirationSlice,
    spot: f64,
    days: u32,
    source: PriceSource,
) -> Result<ImpliedMove> {
    if !spot.is_finite() || spot <= 0.0 {
        return Err(anyhow!("Spot price must be positive, got: {}", spot));
    }

    let paired = slice.common_strikes();
    let lower = paired.iter().rev().copied().find(|k| *k <= spot);
    let upper = paired.iter().copied().find(|k| *k >= spot);

    let (lo, hi) = match (lower, upper) {
        (Some(lo), Some(hi)) if hi - lo >= STRIKE_TOLERANCE => (lo, hi),
        _ => return straddle_implied_move(slice, spot, days, source),
    };

    // common_strikes guarantees both legs exist
    let (call_lo, put_lo, call_hi, put_hi) = match (
        slice.call_at(lo),
        slice.put_at(lo),
        slice.call_at(hi),
        slice.put_at(hi),
    ) {
        (Some(a), Some(b), Some(c), Some(d)) => (a, b, c, d),
        _ => return straddle_implied_move(slice, spot, days, source),
    };

    let (w_hi, method) = match (call_lo.delta, call_hi.delta) {
        (Some(d_lo), Some(d_hi)) if d_lo - d_hi > 1e-6 => (
            ((d_lo - 0.5) / (d_lo - d_hi)).clamp(0.0, 1.0),
            MoveMethod::DeltaWeighted,
        ),
        _ => {
            tracing::debug!(lo, hi, "call deltas unusable, weighting by strike distance");
            ((spot - lo) / (hi - lo), MoveMethod::StrikeWeighted)
        }
    };
    let w_lo = 1.0 - w_hi;

    let call_price = w_lo * source.price(call_lo) + w_hi * source.price(call_hi);
    let put_price = w_lo * source.price(put_lo) + w_hi * source.price(put_hi);
    let strike = w_lo * lo + w_hi * hi;

    Ok(ImpliedMove::new(spot, days, strike, call_price, put_price, method))
}
