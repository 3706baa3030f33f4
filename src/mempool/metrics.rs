//! Swap Watcher — Price and Profit Metrics
//!
//! Purpose:
//!     Given the per-hop amount ledger from the simulator, fetch current
//!     reserves, derive post-swap reserves by conservation, and compute
//!     decimal-normalized prices and the percentage price move per hop.
//!
//! Author: AI-Generated
//! Created: 2026-02-03
//!
//! Notes:
//!     - All amount/reserve arithmetic stays in U256.
//!     - Prices and profit are 10^18 fixed point; every division truncates.
//!     - A pool with reserve0 == 0 has no defined price; it is reported as
//!       zero and its profit as zero.

use alloy::primitives::{Address, I256, U256};
use std::sync::Arc;
use tracing::debug;

use crate::oracle::ReserveOracle;

use super::types::{Hop, HopFill};

/// Fixed-point scale for prices and profit percentages: 10^18.
pub const PRICE_SCALE: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Metrics Engine entry point. For every ledger entry whose pool still
/// answers a reserve query, derive the full `Hop` record. Hops whose
/// reserves cannot be fetched (or whose ledger contradicts them) are
/// dropped, not fabricated.
pub async fn build_hops(
    path: &[Address],
    token_decimals: &[u8],
    fills: &[HopFill],
    reserves: &Arc<dyn ReserveOracle>,
) -> Vec<Hop> {
    let mut hops = Vec::with_capacity(fills.len());

    for fill in fills {
        let Some((reserve0, reserve1)) = reserves.reserves_of(fill.pool).await else {
            debug!(pool = %fill.pool, hop = fill.index, "reserves unavailable, dropping hop");
            continue;
        };

        let (dec0, dec1) = hop_decimals(path, token_decimals, fill.index);
        match derive_hop(fill, reserve0, reserve1, dec0, dec1) {
            Some(hop) => hops.push(hop),
            None => {
                debug!(
                    pool = %fill.pool,
                    hop = fill.index,
                    "ledger inconsistent with fetched reserves, dropping hop"
                );
            }
        }
    }

    hops
}

/// Decimals of the hop's two tokens in canonical (token0, token1) order.
/// The path is not guaranteed to alternate consistently with canonical
/// ordering, so this is recomputed per hop from the pair's addresses.
pub fn hop_decimals(path: &[Address], token_decimals: &[u8], index: usize) -> (u8, u8) {
    let input = path[index];
    let output = path[index + 1];
    let dec_in = token_decimals.get(index).copied().unwrap_or(18);
    let dec_out = token_decimals.get(index + 1).copied().unwrap_or(18);
    if input < output {
        (dec_in, dec_out)
    } else {
        (dec_out, dec_in)
    }
}

/// Conservation: reserves after the swap equal reserves before, plus what
/// flowed in, minus what flowed out. Returns None when the ledger claims
/// more outflow than the pool holds (stale reserves).
pub fn derive_hop(
    fill: &HopFill,
    reserve0: U256,
    reserve1: U256,
    dec0: u8,
    dec1: u8,
) -> Option<Hop> {
    let reserve0_post = reserve0
        .checked_add(fill.amount0_in)?
        .checked_sub(fill.amount0_out)?;
    let reserve1_post = reserve1
        .checked_add(fill.amount1_in)?
        .checked_sub(fill.amount1_out)?;

    let price = pool_price(reserve0, reserve1, dec0, dec1);
    let price_post = pool_price(reserve0_post, reserve1_post, dec0, dec1);
    let profit_percent = profit_percent(price, price_post);

    Some(Hop {
        index: fill.index,
        pool: fill.pool,
        reserve0,
        reserve1,
        amount0_in: fill.amount0_in,
        amount1_in: fill.amount1_in,
        amount0_out: fill.amount0_out,
        amount1_out: fill.amount1_out,
        reserve0_post,
        reserve1_post,
        price,
        price_post,
        profit_percent,
    })
}

/// Decimal-normalized pool price, token1 per token0:
///
/// ```text
/// price = reserve1 · 10^dec0 · SCALE / (reserve0 · 10^dec1)
/// ```
///
/// Zero reserves make the price undefined; reported as zero by convention.
pub fn pool_price(reserve0: U256, reserve1: U256, dec0: u8, dec1: u8) -> U256 {
    if reserve0.is_zero() {
        return U256::ZERO;
    }
    let (Some(numerator), Some(denominator)) = (
        reserve1.checked_mul(pow10(dec0)),
        reserve0.checked_mul(pow10(dec1)),
    ) else {
        return U256::ZERO;
    };
    if denominator.is_zero() {
        return U256::ZERO;
    }
    mul_div(numerator, PRICE_SCALE, denominator)
}

/// Percentage change between two scaled prices, itself 10^18 scaled:
///
/// ```text
/// profit = (price_post − price) · 100 / price
/// ```
///
/// Exactly zero whenever the pre-swap price is zero — explicit policy, not
/// an incidental guard.
pub fn profit_percent(price: U256, price_post: U256) -> I256 {
    if price.is_zero() {
        return I256::ZERO;
    }

    let (diff, negative) = if price_post >= price {
        (price_post - price, false)
    } else {
        (price - price_post, true)
    };

    let numerator = U256::from(100u64) * PRICE_SCALE;
    let magnitude = mul_div(diff, numerator, price);
    let signed = I256::try_from(magnitude).unwrap_or(I256::MAX);
    if negative {
        -signed
    } else {
        signed
    }
}

fn pow10(decimals: u8) -> U256 {
    U256::from(10u64).pow(U256::from(decimals))
}

/// a · b / d, truncating. Falls back to two-term long division when the
/// product would overflow 256 bits.
fn mul_div(a: U256, b: U256, d: U256) -> U256 {
    if let Some(product) = a.checked_mul(b) {
        return product / d;
    }
    let quotient = a / d;
    let remainder = a % d;
    quotient
        .saturating_mul(b)
        .saturating_add(remainder.saturating_mul(b) / d)
}
