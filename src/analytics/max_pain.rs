use anyhow::{anyhow, Result};

use crate::chain::types::{ExpirationSlice, CONTRACT_MULTIPLIER};

/// Aggregate holder payoff if the underlying settles at `strike`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PainPoint {
    pub strike: f64,
    pub pain: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaxPain {
    /// Settlement price (a listed strike) that minimises holder payoff
    pub strike: f64,
    pub pain: f64,
    /// Pain at every listed strike, ascending strike
    pub curve: Vec<PainPoint>,
    pub total_call_oi: u64,
    pub total_put_oi: u64,
    /// Enough aggregate open interest for the reading to mean something
    pub reliable: bool,
    /// `(strike - spot) / spot * 100`
    pub distance_pct: f64,
    /// call OI / put OI, `None` without put open interest
    pub call_put_oi_ratio: Option<f64>,
}

/// Total payoff owed to holders of every open contract at settlement price `price`
pub fn holder_payoff(slice: &ExpirationSlice, price: f64) -> f64 {
    let calls: f64 = slice
        .calls
        .iter()
        .map(|c| (price - c.strike_price).max(0.0) * c.open_interest as f64)
        .sum();
    let puts: f64 = slice
        .puts
        .iter()
        .map(|p| (p.strike_price - price).max(0.0) * p.open_interest as f64)
        .sum();
    (calls + puts) * CONTRACT_MULTIPLIER
}

/// Find the max-pain strike for one expiration.
///
/// Candidates are the listed strikes. On equal pain the lowest strike wins.
pub fn max_pain(slice: &ExpirationSlice, spot: f64, min_total_oi: u64) -> Result<MaxPain> {
    if slice.calls.is_empty() || slice.puts.is_empty() {
        return Err(anyhow!(
            "Max pain needs both calls and puts ({} calls, {} puts)",
            slice.calls.len(),
            slice.puts.len()
        ));
    }
    if !spot.is_finite() || spot <= 0.0 {
        return Err(anyhow!("Spot price must be positive, got: {}", spot));
    }

    let curve: Vec<PainPoint> = slice
        .strikes()
        .into_iter()
        .map(|strike| PainPoint {
            strike,
            pain: holder_payoff(slice, strike),
        })
        .collect();

    let best = curve
        .iter()
        .fold(None::<PainPoint>, |best, p| match best {
            Some(b) if p.pain >= b.pain => Some(b),
            _ => Some(*p),
        })
        .ok_or_else(|| anyhow!("No strikes available for max pain"))?;

    let total_call_oi: u64 = slice.calls.iter().map(|c| c.open_interest).sum();
    let total_put_oi: u64 = slice.puts.iter().map(|p| p.open_interest).sum();

    Ok(MaxPain {
        strike: best.strike,
        pain: best.pain,
        curve,
        total_call_oi,
        total_put_oi,
        reliable: total_call_oi + total_put_oi >= min_total_oi,
        distance_pct: (best.strike - spot) / spot * 100.0,
        call_put_oi_ratio: if total_put_oi > 0 {
            Some(total_call_oi as f64 / total_put_oi as f64)
        } else {
            None
        },
    })
}
