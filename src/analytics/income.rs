//! Premium-selling screens: covered calls and cash-secured puts
//!
//! Both screens only consider out-of-the-money contracts with a positive bid and
//! some open interest, price them at the bid (what a seller receives), and
//! annualise returns with `365 / days`.

use std::cmp::Ordering;

use crate::chain::types::{ExpirationSlice, OptionContract};

use super::expiry::annual_factor;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoveredCallCandidate {
    pub strike: f64,
    pub premium: f64,
    /// premium / spot
    pub static_return: f64,
    /// (strike - spot + premium) / spot
    pub assigned_return: f64,
    pub annualized_static_return: f64,
    pub annualized_assigned_return: f64,
    pub weighted_score: f64,
    pub days_to_expiration: u32,
    pub contract: OptionContract,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoveredCallScreen {
    pub by_static_return: Vec<CoveredCallCandidate>,
    pub by_assigned_return: Vec<CoveredCallCandidate>,
    pub best: CoveredCallCandidate,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CashSecuredPutCandidate {
    pub strike: f64,
    pub premium: f64,
    /// premium / strike
    pub return_on_capital: f64,
    pub annualized_return_on_capital: f64,
    /// (spot - (strike - premium)) / spot
    pub discount_if_assigned: f64,
    pub weighted_score: f64,
    pub days_to_expiration: u32,
    pub contract: OptionContract,
}

impl CashSecuredPutCandidate {
    /// Net purchase price if the put is assigned
    pub fn effective_price(&self) -> f64 {
        self.strike - self.premium
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CashSecuredPutScreen {
    pub by_return: Vec<CashSecuredPutCandidate>,
    pub by_discount: Vec<CashSecuredPutCandidate>,
    pub best: CashSecuredPutCandidate,
}

fn top_by<T: Clone>(items: &[T], top: usize, key: impl Fn(&T) -> f64) -> Vec<T> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
    sorted.truncate(top);
    sorted
}

fn best_by<T: Clone>(items: &[T], key: impl Fn(&T) -> f64) -> Option<T> {
    items
        .iter()
        .fold(None::<&T>, |best, item| match best {
            Some(b) if key(item) <= key(b) => Some(b),
            _ => Some(item),
        })
        .cloned()
}

/// Rank OTM calls for selling against a long stock position.
///
/// The overall score blends the two annualised returns with weight
/// `min(1, days / 30)` on the assigned return, so short-dated expirations lean
/// on premium yield. Returns `None` when no call qualifies.
pub fn covered_calls(
    slice: &ExpirationSlice,
    spot: f64,
    days: u32,
    min_open_interest: u64,
    top: usize,
) -> Option<CoveredCallScreen> {
    let factor = annual_factor(days);
    let weight = (days as f64 / 30.0).min(1.0);

    let candidates: Vec<CoveredCallCandidate> = slice
        .calls
        .iter()
        .filter(|c| c.strike_price > spot && c.bid > 0.0 && c.open_interest > min_open_interest)
        .map(|c| {
            let premium = c.bid;
            let static_return = premium / spot;
            let assigned_return = (c.strike_price - spot + premium) / spot;
            let annualized_static_return = static_return * factor;
            let annualized_assigned_return = assigned_return * factor;
            CoveredCallCandidate {
                strike: c.strike_price,
                premium,
                static_return,
                assigned_return,
                annualized_static_return,
                annualized_assigned_return,
                weighted_score: annualized_static_return * (1.0 - weight)
                    + annualized_assigned_return * weight,
                days_to_expiration: days,
                contract: c.clone(),
            }
        })
        .collect();

    if candidates.is_empty() {
        tracing::debug!(expiration = %slice.expiration_date, "no suitable calls for covered call screen");
        return None;
    }

    Some(CoveredCallScreen {
        by_static_return: top_by(&candidates, top, |c| c.annualized_static_return),
        by_assigned_return: top_by(&candidates, top, |c| c.annualized_assigned_return),
        best: best_by(&candidates, |c| c.weighted_score)?,
    })
}

/// Rank OTM puts for selling with cash set aside for assignment.
///
/// The discount weight `clamp(2 - 2K/S, 0, 1)` grows as the strike falls below
/// spot; the discount term is scaled by 5 against the annualised return.
pub fn cash_secured_puts(
    slice: &ExpirationSlice,
    spot: f64,
    days: u32,
    min_open_interest: u64,
    top: usize,
) -> Option<CashSecuredPutScreen> {
    let factor = annual_factor(days);

    let candidates: Vec<CashSecuredPutCandidate> = slice
        .puts
        .iter()
        .filter(|p| p.strike_price < spot && p.bid > 0.0 && p.open_interest > min_open_interest)
        .map(|p| {
            let strike = p.strike_price;
            let premium = p.bid;
            let return_on_capital = premium / strike;
            let annualized_return_on_capital = return_on_capital * factor;
            let discount_if_assigned = (spot - (strike - premium)) / spot;
            let discount_weight = (2.0 - 2.0 * strike / spot).clamp(0.0, 1.0);
            CashSecuredPutCandidate {
                strike,
                premium,
                return_on_capital,
                annualized_return_on_capital,
                discount_if_assigned,
                weighted_score: annualized_return_on_capital * (1.0 - discount_weight)
                    + discount_if_assigned * discount_weight * 5.0,
                days_to_expiration: days,
                contract: p.clone(),
            }
        })
        .collect();

    if candidates.is_empty() {
        tracing::debug!(expiration = %slice.expiration_date, "no suitable puts for cash secured put screen");
        return None;
    }

    Some(CashSecuredPutScreen {
        by_return: top_by(&candidates, top, |c| c.annualized_return_on_capital),
        by_discount: top_by(&candidates, top, |c| c.discount_if_assigned),
        best: best_by(&candidates, |c| c.weighted_score)?,
    })
}
