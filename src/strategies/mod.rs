//! Option strategy construction and expiration payoff analysis

pub mod builder;
pub mod payoff;
pub mod types;

pub use builder::{build_strategy, single_option_strategy, CustomStrategy};
pub use types::{Action, Bound, PayoffProfile, Strategy, StrategyKind, StrategyLeg};
