//! Per-expiration and whole-chain analytics
//!
//! Functions here compute over an [`ExpirationSlice`] (or a set of contracts)
//! plus the spot price. Only [`greeks::fill_missing_greeks`] modifies its input.
//!
//! [`ExpirationSlice`]: crate::chain::types::ExpirationSlice

pub mod activity;
pub mod arbitrage;
pub mod expiry;
pub mod greeks;
pub mod historical;
pub mod implied_move;
pub mod income;
pub mod max_pain;
pub mod metrics;
pub mod parity;
pub mod ratio;
pub mod skew;
pub mod summary;
