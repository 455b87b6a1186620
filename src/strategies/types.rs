use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};

use crate::chain::types::{OptionContract, OptionType, CONTRACT_MULTIPLIER};

/// Predefined multi-leg strategies plus free-form custom positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum StrategyKind {
    LongCall,
    LongPut,
    #[cfg_attr(feature = "serde", serde(rename = "bull-spread"))]
    BullCallSpread,
    #[cfg_attr(feature = "serde", serde(rename = "bear-spread"))]
    BearPutSpread,
    IronCondor,
    Butterfly,
    #[cfg_attr(feature = "serde", serde(alias = "custom-strategy"))]
    Custom,
}

impl StrategyKind {
    /// Identifier accepted by [`FromStr`], e.g. `bull-spread`
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::LongCall => "long-call",
            StrategyKind::LongPut => "long-put",
            StrategyKind::BullCallSpread => "bull-spread",
            StrategyKind::BearPutSpread => "bear-spread",
            StrategyKind::IronCondor => "iron-condor",
            StrategyKind::Butterfly => "butterfly",
            StrategyKind::Custom => "custom",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StrategyKind::LongCall => "Long Call",
            StrategyKind::LongPut => "Long Put",
            StrategyKind::BullCallSpread => "Bull Call Spread",
            StrategyKind::BearPutSpread => "Bear Put Spread",
            StrategyKind::IronCondor => "Iron Condor",
            StrategyKind::Butterfly => "Butterfly",
            StrategyKind::Custom => "Custom Strategy",
        }
    }

    /// The predefined kinds a builder exists for
    pub fn predefined() -> [StrategyKind; 6] {
        [
            StrategyKind::LongCall,
            StrategyKind::LongPut,
            StrategyKind::BullCallSpread,
            StrategyKind::BearPutSpread,
            StrategyKind::IronCondor,
            StrategyKind::Butterfly,
        ]
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StrategyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "long-call" => Ok(StrategyKind::LongCall),
            "long-put" => Ok(StrategyKind::LongPut),
            "bull-spread" | "bull-call-spread" => Ok(StrategyKind::BullCallSpread),
            "bear-spread" | "bear-put-spread" => Ok(StrategyKind::BearPutSpread),
            "iron-condor" => Ok(StrategyKind::IronCondor),
            "butterfly" => Ok(StrategyKind::Butterfly),
            "custom" | "custom-strategy" => Ok(StrategyKind::Custom),
            other => Err(anyhow!("Unknown strategy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Action {
    #[default]
    Buy,
    Sell,
}

impl Action {
    /// +1 for long legs, -1 for short legs
    pub fn sign(&self) -> f64 {
        match self {
            Action::Buy => 1.0,
            Action::Sell => -1.0,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
        }
    }
}

/// One option position within a strategy
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrategyLeg {
    pub option_type: OptionType,
    pub action: Action,
    pub strike: f64,
    /// Premium per share
    pub price: f64,
    pub expiration_date: String,
    pub quantity: u32,
}

impl StrategyLeg {
    pub fn from_contract(contract: &OptionContract, action: Action, quantity: u32) -> Self {
        Self {
            option_type: contract.contract_type,
            action,
            strike: contract.strike_price,
            price: contract.last_price,
            expiration_date: contract.expiration_date.clone(),
            quantity,
        }
    }

    /// Premium paid (positive) or received (negative) for this leg
    pub fn cost(&self) -> f64 {
        self.action.sign() * self.price * CONTRACT_MULTIPLIER * self.quantity as f64
    }

    /// Intrinsic value of the position at expiration, signed by direction
    pub fn value_at(&self, underlying: f64) -> f64 {
        let intrinsic = match self.option_type {
            OptionType::Call => (underlying - self.strike).max(0.0),
            OptionType::Put => (self.strike - underlying).max(0.0),
        };
        self.action.sign() * intrinsic * CONTRACT_MULTIPLIER * self.quantity as f64
    }
}

/// Upper or lower limit of a payoff
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bound {
    Limited(f64),
    Unlimited,
}

impl Bound {
    pub fn value(&self) -> Option<f64> {
        match self {
            Bound::Limited(v) => Some(*v),
            Bound::Unlimited => None,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Bound::Unlimited)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Limited(v) if *v < 0.0 => write!(f, "-${:.2}", v.abs()),
            Bound::Limited(v) => write!(f, "${:.2}", v),
            Bound::Unlimited => write!(f, "Unlimited"),
        }
    }
}

/// Expiration payoff summary
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PayoffProfile {
    /// Highest P/L over all underlying prices
    pub max_profit: Bound,
    /// Lowest P/L over all underlying prices, negative for a loss
    pub max_loss: Bound,
    /// Underlying prices where P/L crosses zero, ascending
    pub break_evens: Vec<f64>,
}

/// A set of legs sharing one expiration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Strategy {
    pub kind: StrategyKind,
    pub expiration_date: String,
    pub legs: Vec<StrategyLeg>,
    /// Net premium: positive is a debit, negative a credit
    pub net_debit: f64,
}

impl Strategy {
    pub fn new(
        kind: StrategyKind,
        expiration_date: impl Into<String>,
        legs: Vec<StrategyLeg>,
    ) -> Self {
        let net_debit = legs.iter().map(StrategyLeg::cost).sum();
        Self {
            kind,
            expiration_date: expiration_date.into(),
            legs,
            net_debit,
        }
    }

    pub fn is_credit(&self) -> bool {
        self.net_debit < 0.0
    }
}
