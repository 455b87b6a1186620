use crate::chain::config::MarketAssumptions;
use crate::chain::types::ExpirationSlice;
use crate::models::bs::{bs_delta, implied_volatility};

/// Backfill implied volatility and delta for contracts quoted without them.
///
/// IV is solved from the bid/ask mid (last price when there is no quote);
/// delta then follows from that IV. Contracts whose price lies outside the
/// no-arbitrage range are left untouched. Returns the number of contracts
/// that received an IV.
pub fn fill_missing_greeks(
    slice: &mut ExpirationSlice,
    spot: f64,
    years_to_exp: f64,
    market: MarketAssumptions,
) -> usize {
    if !(spot > 0.0 && spot.is_finite() && years_to_exp > 0.0) {
        return 0;
    }

    let mut filled = 0usize;
    let mut failed = 0usize;

    for contract in slice.calls.iter_mut().chain(slice.puts.iter_mut()) {
        let sigma = match contract.iv() {
            Some(iv) => iv,
            None => {
                let price = if contract.bid > 0.0 && contract.ask > 0.0 {
                    contract.mid()
                } else {
                    contract.last_price
                };
                match implied_volatility(
                    contract.contract_type,
                    price,
                    spot,
                    contract.strike_price,
                    market.r,
                    market.q,
                    years_to_exp,
                ) {
                    Ok(iv) => {
                        contract.implied_volatility = Some(iv);
                        filled += 1;
                        iv
                    }
                    Err(e) => {
                        failed += 1;
                        tracing::debug!(strike = contract.strike_price, "no implied volatility: {e}");
                        continue;
                    }
                }
            }
        };

        if contract.delta.is_none() {
            contract.delta = Some(bs_delta(
                contract.contract_type,
                spot,
                contract.strike_price,
                market.r,
                market.q,
                years_to_exp,
                sigma,
            ));
        }
    }

    if failed > 0 {
        tracing::warn!(
            expiration = %slice.expiration_date,
            filled,
            failed,
            "could not solve implied volatility for some contracts"
        );
    }

    filled
}
