use std::cmp::Ordering;

use crate::chain::types::{ExpirationSlice, OptionContract, OptionType};

/// A contract singled out for its trading activity
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActivityEntry {
    pub option_type: OptionType,
    pub strike: f64,
    pub volume: u64,
    pub open_interest: u64,
    /// volume / open interest
    pub volume_oi_ratio: f64,
    /// `(strike - spot) / spot * 100`
    pub distance_pct: f64,
}

impl ActivityEntry {
    fn new(contract: &OptionContract, spot: f64) -> Self {
        let volume_oi_ratio = if contract.open_interest > 0 {
            contract.volume as f64 / contract.open_interest as f64
        } else {
            0.0
        };
        let distance_pct = if spot > 0.0 {
            (contract.strike_price - spot) / spot * 100.0
        } else {
            0.0
        };
        ActivityEntry {
            option_type: contract.contract_type,
            strike: contract.strike_price,
            volume: contract.volume,
            open_interest: contract.open_interest,
            volume_oi_ratio,
            distance_pct,
        }
    }

    /// "above" or "below" the current price
    pub fn side_of_spot(&self) -> &'static str {
        if self.distance_pct > 0.0 {
            "above"
        } else {
            "below"
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NotableActivity {
    pub highest_volume: Vec<ActivityEntry>,
    pub highest_open_interest: Vec<ActivityEntry>,
    /// Volume large relative to existing open interest
    pub unusual: Vec<ActivityEntry>,
}

impl NotableActivity {
    pub fn is_empty(&self) -> bool {
        self.highest_volume.is_empty() && self.highest_open_interest.is_empty()
    }
}

/// Rank contracts of both sides by volume, open interest and volume/OI.
///
/// Unusual activity requires open interest above `min_open_interest` and a
/// volume/OI ratio above `min_ratio`. Each list holds at most `top` entries.
pub fn notable_activity(
    slice: &ExpirationSlice,
    spot: f64,
    top: usize,
    min_open_interest: u64,
    min_ratio: f64,
) -> NotableActivity {
    let entries: Vec<ActivityEntry> = slice
        .all_contracts()
        .map(|c| ActivityEntry::new(c, spot))
        .collect();

    let mut highest_volume: Vec<ActivityEntry> =
        entries.iter().filter(|e| e.volume > 0).cloned().collect();
    // Stable sort keeps calls ahead of puts on equal volume
    highest_volume.sort_by(|a, b| b.volume.cmp(&a.volume));
    highest_volume.truncate(top);

    let mut highest_open_interest: Vec<ActivityEntry> = entries
        .iter()
        .filter(|e| e.open_interest > 0)
        .cloned()
        .collect();
    highest_open_interest.sort_by(|a, b| b.open_interest.cmp(&a.open_interest));
    highest_open_interest.truncate(top);

    let mut unusual: Vec<ActivityEntry> = entries
        .into_iter()
        .filter(|e| e.open_interest > min_open_interest && e.volume_oi_ratio > min_ratio)
        .collect();
    unusual.sort_by(|a, b| {
        b.volume_oi_ratio
            .partial_cmp(&a.volume_oi_ratio)
            .unwrap_or(Ordering::Equal)
    });
    unusual.truncate(top);

    NotableActivity {
        highest_volume,
        highest_open_interest,
        unusual,
    }
}
