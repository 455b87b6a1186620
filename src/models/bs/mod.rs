// Black-Scholes-Merton helpers with a continuous dividend yield. These back the
// theoretical prices in the parity table, strategy leg deltas, and implied
// volatility recovery for contracts quoted without IV.

use anyhow::{anyhow, Result};
use roots::{find_root_brent, SimpleConvergency};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::chain::types::OptionType;

/// Lower and upper volatility bracket for the implied volatility search
const IV_BRACKET: (f64, f64) = (1e-4, 5.0);

pub fn norm_cdf(x: f64) -> f64 {
    // 0.5 * [1 + erf(x / sqrt(2))]
    0.5 * (1.0 + libm::erf(x / (2.0_f64).sqrt()))
}

/// d1 and d2 of the dividend-adjusted Black-Scholes formula
#[allow(non_snake_case)]
pub fn d1_d2(S: f64, K: f64, r: f64, q: f64, T: f64, sigma: f64) -> (f64, f64) {
    let sqrt_t = T.sqrt();
    let d1 = ((S / K).ln() + (r - q + 0.5 * sigma.powi(2)) * T) / (sigma * sqrt_t);
    (d1, d1 - sigma * sqrt_t)
}

/// Price of a European call option under Black-Scholes assumptions.
#[allow(non_snake_case)]
pub fn bs_call_price(S: f64, K: f64, r: f64, q: f64, T: f64, sigma: f64) -> f64 {
    if T <= 0.0 || sigma <= 0.0 {
        return (S * (-q * T).exp() - K * (-r * T).exp()).max(0.0);
    }
    let (d1, d2) = d1_d2(S, K, r, q, T, sigma);
    S * (-q * T).exp() * norm_cdf(d1) - K * (-r * T).exp() * norm_cdf(d2)
}

/// Price of a European put option under Black-Scholes assumptions.
#[allow(non_snake_case)]
pub fn bs_put_price(S: f64, K: f64, r: f64, q: f64, T: f64, sigma: f64) -> f64 {
    if T <= 0.0 || sigma <= 0.0 {
        return (K * (-r * T).exp() - S * (-q * T).exp()).max(0.0);
    }
    let (d1, d2) = d1_d2(S, K, r, q, T, sigma);
    K * (-r * T).exp() * norm_cdf(-d2) - S * (-q * T).exp() * norm_cdf(-d1)
}

#[allow(non_snake_case)]
pub fn bs_price(option_type: OptionType, S: f64, K: f64, r: f64, q: f64, T: f64, sigma: f64) -> f64 {
    match option_type {
        OptionType::Call => bs_call_price(S, K, r, q, T, sigma),
        OptionType::Put => bs_put_price(S, K, r, q, T, sigma),
    }
}

/// Spot delta, `e^{-qT} N(d1)` for calls and `e^{-qT} (N(d1) - 1)` for puts
#[allow(non_snake_case)]
pub fn bs_delta(option_type: OptionType, S: f64, K: f64, r: f64, q: f64, T: f64, sigma: f64) -> f64 {
    let carry = (-q * T).exp();
    if T <= 0.0 || sigma <= 0.0 {
        let itm = match option_type {
            OptionType::Call => S > K,
            OptionType::Put => S < K,
        };
        return match (option_type, itm) {
            (OptionType::Call, true) => carry,
            (OptionType::Put, true) => -carry,
            _ => 0.0,
        };
    }

    let (d1, _) = d1_d2(S, K, r, q, T, sigma);
    let normal = Normal::new(0.0, 1.0).expect("standard normal parameters are valid");
    match option_type {
        OptionType::Call => carry * normal.cdf(d1),
        OptionType::Put => carry * (normal.cdf(d1) - 1.0),
    }
}

/// Recover the volatility that reproduces `price`, using Brent's method.
///
/// Fails when the price lies outside the no-arbitrage range
/// `[intrinsic, upper bound]` or the solver does not converge.
#[allow(non_snake_case)]
pub fn implied_volatility(
    option_type: OptionType,
    price: f64,
    S: f64,
    K: f64,
    r: f64,
    q: f64,
    T: f64,
) -> Result<f64> {
    if !(price.is_finite() && S > 0.0 && K > 0.0 && T > 0.0) {
        return Err(anyhow!(
            "Invalid inputs for implied volatility: price={}, S={}, K={}, T={}",
            price,
            S,
            K,
            T
        ));
    }

    let lower = bs_price(option_type, S, K, r, q, T, 0.0);
    let upper = match option_type {
        OptionType::Call => S * (-q * T).exp(),
        OptionType::Put => K * (-r * T).exp(),
    };
    if price <= lower || price >= upper {
        return Err(anyhow!(
            "Price {:.4} outside no-arbitrage bounds ({:.4}, {:.4}) for {} K={}",
            price,
            lower,
            upper,
            option_type,
            K
        ));
    }

    let objective = |sigma: f64| bs_price(option_type, S, K, r, q, T, sigma) - price;
    let mut convergency = SimpleConvergency {
        eps: 1e-10,
        max_iter: 200,
    };

    find_root_brent(IV_BRACKET.0, IV_BRACKET.1, &objective, &mut convergency)
        .map_err(|e| anyhow!("Implied volatility solve failed for K={}: {:?}", K, e))
}
