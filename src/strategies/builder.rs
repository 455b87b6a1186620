use anyhow::{anyhow, Result};

use super::types::{Action, Strategy, StrategyKind, StrategyLeg};
use crate::chain::types::{ExpirationSlice, OptionContract, OptionType};

/// Listed contract nearest to `spot * factor`, searching strikes of both sides
fn pick<'a>(
    slice: &'a ExpirationSlice,
    option_type: OptionType,
    spot: f64,
    factor: f64,
) -> Result<&'a OptionContract> {
    let target = spot * factor;
    let strike = slice
        .closest_strike(target)
        .ok_or_else(|| anyhow!("No strikes listed for {}", slice.expiration_date))?;
    slice.contract_at(option_type, strike).ok_or_else(|| {
        anyhow!(
            "Could not find appropriate options for this strategy: no {} at strike {:.2} (target {:.2})",
            option_type.as_str(),
            strike,
            target
        )
    })
}

fn leg(contract: &OptionContract, action: Action) -> StrategyLeg {
    StrategyLeg::from_contract(contract, action, 1)
}

/// Build one of the predefined strategies around `spot`.
///
/// Each leg is placed at the listed strike closest to a fixed multiple of spot
/// and priced at its last trade. Fails when a required contract is not listed
/// at the chosen strike.
pub fn build_strategy(kind: StrategyKind, slice: &ExpirationSlice, spot: f64) -> Result<Strategy> {
    if !spot.is_finite() || spot <= 0.0 {
        return Err(anyhow!("Spot price must be positive, got: {}", spot));
    }

    let legs = match kind {
        StrategyKind::LongCall => {
            vec![leg(pick(slice, OptionType::Call, spot, 1.05)?, Action::Buy)]
        }
        StrategyKind::LongPut => {
            vec![leg(pick(slice, OptionType::Put, spot, 0.95)?, Action::Buy)]
        }
        StrategyKind::BullCallSpread => vec![
            leg(pick(slice, OptionType::Call, spot, 1.00)?, Action::Buy),
            leg(pick(slice, OptionType::Call, spot, 1.10)?, Action::Sell),
        ],
        StrategyKind::BearPutSpread => vec![
            leg(pick(slice, OptionType::Put, spot, 1.00)?, Action::Buy),
            leg(pick(slice, OptionType::Put, spot, 0.90)?, Action::Sell),
        ],
        StrategyKind::IronCondor => vec![
            leg(pick(slice, OptionType::Put, spot, 0.90)?, Action::Sell),
            leg(pick(slice, OptionType::Put, spot, 0.80)?, Action::Buy),
            leg(pick(slice, OptionType::Call, spot, 1.10)?, Action::Sell),
            leg(pick(slice, OptionType::Call, spot, 1.20)?, Action::Buy),
        ],
        StrategyKind::Butterfly => vec![
            leg(pick(slice, OptionType::Call, spot, 0.95)?, Action::Buy),
            StrategyLeg::from_contract(pick(slice, OptionType::Call, spot, 1.00)?, Action::Sell, 2),
            leg(pick(slice, OptionType::Call, spot, 1.05)?, Action::Buy),
        ],
        StrategyKind::Custom => {
            return Err(anyhow!("Custom strategies are assembled with CustomStrategy"));
        }
    };

    let strategy = Strategy::new(kind, slice.expiration_date.clone(), legs);
    tracing::debug!(
        kind = kind.as_str(),
        expiration = %strategy.expiration_date,
        net_debit = strategy.net_debit,
        "strategy built"
    );
    Ok(strategy)
}

/// One long contract, for a per-contract P/L view
pub fn single_option_strategy(contract: &OptionContract) -> Strategy {
    let kind = match contract.contract_type {
        OptionType::Call => StrategyKind::LongCall,
        OptionType::Put => StrategyKind::LongPut,
    };
    Strategy::new(
        kind,
        contract.expiration_date.clone(),
        vec![leg(contract, Action::Buy)],
    )
}

/// Free-form position assembled leg by leg
#[derive(Debug, Clone, Default)]
pub struct CustomStrategy {
    legs: Vec<StrategyLeg>,
}

impl CustomStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one long contract
    pub fn add(&mut self, contract: &OptionContract) -> &mut Self {
        self.add_leg(contract, Action::Buy, 1)
    }

    /// Add `quantity` contracts on the given side.
    ///
    /// A leg always holds at least one contract: a quantity of 0 is raised to 1.
    pub fn add_leg(
        &mut self,
        contract: &OptionContract,
        action: Action,
        quantity: u32,
    ) -> &mut Self {
        if quantity == 0 {
            tracing::debug!(strike = contract.strike_price, "zero quantity leg raised to one contract");
        }
        self.legs
            .push(StrategyLeg::from_contract(contract, action, quantity.max(1)));
        self
    }

    pub fn remove(&mut self, index: usize) -> Option<StrategyLeg> {
        (index < self.legs.len()).then(|| self.legs.remove(index))
    }

    pub fn clear(&mut self) {
        self.legs.clear();
    }

    pub fn legs(&self) -> &[StrategyLeg] {
        &self.legs
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Snapshot as a [`Strategy`]; the expiration is taken from the first leg.
    pub fn build(&self) -> Result<Strategy> {
        let first = self
            .legs
            .first()
            .ok_or_else(|| anyhow!("Custom strategy has no legs"))?;
        Ok(Strategy::new(
            StrategyKind::Custom,
            first.expiration_date.clone(),
            self.legs.clone(),
        ))
    }
}
