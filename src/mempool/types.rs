//! Swap Watcher — Type Definitions
//!
//! Purpose:
//!     Data structures for the pending-swap pipeline: the transaction
//!     snapshot taken off the wire, the decoded swap, the per-hop amount
//!     ledger produced by simulation, and the final report record.
//!
//! Author: AI-Generated
//! Created: 2026-02-03
//!
//! Dependencies:
//!     - alloy (Address, Bytes, TxHash, U256, I256)
//!     - chrono (timestamps)

use alloy::primitives::{
    utils::format_ether, Address, Bytes, TxHash, I256, U256,
};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::decoder::{SwapArgs, SwapFunction};
use super::metrics::PRICE_SCALE;

/// Snapshot of a pending transaction, taken once when it is pulled off the
/// subscription stream. The rpc `Transaction` object is not carried through
/// the pipeline — only the fields the pipeline actually reads.
#[derive(Debug, Clone)]
pub struct PendingTx {
    pub hash: TxHash,
    pub from: Address,
    /// Destination (the router — anything else is filtered before this
    /// struct is built).
    pub to: Address,
    /// Native value attached to the transaction.
    pub value: U256,
    /// Full calldata, selector included.
    pub input: Bytes,
}

/// A fully decoded pending swap — output of the decoder plus the token
/// metadata fetched per path element. Built once per matched transaction;
/// later stages only read from it.
#[derive(Debug, Clone)]
pub struct DecodedSwap {
    pub function: SwapFunction,
    pub args: SwapArgs,
    /// Ordered token path, length >= 2.
    pub path: Vec<Address>,
    /// One symbol per path element; "UNKNOWN" where the token contract
    /// did not answer.
    pub token_symbols: Vec<String>,
    /// One decimals value per path element; 18 where the token contract
    /// did not answer.
    pub token_decimals: Vec<u8>,
    /// The swap's `to` argument (where output tokens are sent).
    pub recipient: Address,
    /// Transaction `to` (the router).
    pub router: Address,
    /// Transaction `from`.
    pub sender: Address,
    pub tx_hash: TxHash,
    /// Native value attached to the transaction.
    pub value: U256,
}

impl DecodedSwap {
    /// Named amount arguments as decimal strings, for the report record.
    pub fn argument_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        if let Some(v) = self.args.amount_in {
            map.insert("amountIn".to_string(), v.to_string());
        }
        if let Some(v) = self.args.amount_out_min {
            map.insert("amountOutMin".to_string(), v.to_string());
        }
        if let Some(v) = self.args.amount_out {
            map.insert("amountOut".to_string(), v.to_string());
        }
        if let Some(v) = self.args.amount_in_max {
            map.insert("amountInMax".to_string(), v.to_string());
        }
        map
    }
}

/// Per-hop amount ledger — output of the simulator, input to the metrics
/// engine. Amounts are oriented by the hop's canonical token ordering
/// (token0 = lexicographically smaller address), recomputed per hop.
/// Exactly one input side and one output side are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopFill {
    /// Position of this hop in the path: tokens `path[index]` → `path[index + 1]`.
    pub index: usize,
    pub pool: Address,
    pub amount0_in: U256,
    pub amount1_in: U256,
    pub amount0_out: U256,
    pub amount1_out: U256,
}

/// One pairwise exchange step, fully derived: pre-swap reserves, the amount
/// ledger, post-swap reserves by conservation, and decimal-normalized
/// fixed-point prices (scale 10^18).
#[derive(Debug, Clone, Serialize)]
pub struct Hop {
    pub index: usize,
    pub pool: Address,
    pub reserve0: U256,
    pub reserve1: U256,
    pub amount0_in: U256,
    pub amount1_in: U256,
    pub amount0_out: U256,
    pub amount1_out: U256,
    pub reserve0_post: U256,
    pub reserve1_post: U256,
    /// token1-per-token0 price before the swap, scaled by 10^18.
    pub price: U256,
    /// Same price after the simulated swap.
    pub price_post: U256,
    /// Percentage change of the price, scaled by 10^18 (so 10^18 == 1%).
    pub profit_percent: I256,
}

/// Final report record handed to the presentation layer. Plain data — the
/// watcher logs it through `Display`, and it serializes to JSON for any
/// downstream consumer.
#[derive(Debug, Clone, Serialize)]
pub struct SwapReport {
    pub timestamp_utc: String,
    pub function_name: String,
    pub arguments: BTreeMap<String, String>,
    pub path: Vec<Address>,
    pub token_symbols: Vec<String>,
    pub token_decimals: Vec<u8>,
    /// Pools resolved along the path, in hop order (unresolvable hops absent).
    pub pool_addresses: Vec<Address>,
    /// The subset of `pool_addresses` present in the watch-list.
    pub watched_pools: Vec<Address>,
    pub hops: Vec<Hop>,
    pub recipient: Address,
    pub router: Address,
    pub sender: Address,
    pub tx_hash: TxHash,
    pub value: U256,
}

impl SwapReport {
    pub fn new(
        swap: DecodedSwap,
        pool_addresses: Vec<Address>,
        watched_pools: Vec<Address>,
        hops: Vec<Hop>,
    ) -> Self {
        let arguments = swap.argument_map();
        Self {
            timestamp_utc: Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            function_name: swap.function.name().to_string(),
            arguments,
            path: swap.path,
            token_symbols: swap.token_symbols,
            token_decimals: swap.token_decimals,
            pool_addresses,
            watched_pools,
            hops,
            recipient: swap.recipient,
            router: swap.router,
            sender: swap.sender,
            tx_hash: swap.tx_hash,
            value: swap.value,
        }
    }
}

impl fmt::Display for SwapReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Function: {}", self.function_name)?;
        writeln!(f, "Arguments:")?;
        for (name, value) in &self.arguments {
            writeln!(f, "  {}: {}", name, value)?;
        }
        writeln!(f, "Path: [{}]", join_addresses(&self.path))?;
        writeln!(f, "Tokens: {:?}", self.token_symbols)?;
        writeln!(f, "Decimals: {:?}", self.token_decimals)?;
        writeln!(f, "To: {:#x}", self.recipient)?;
        writeln!(f, "Pool Addresses: [{}]", join_addresses(&self.pool_addresses))?;
        for pool in &self.watched_pools {
            writeln!(f, "Found Matching LP: {:#x}", pool)?;
        }
        for hop in &self.hops {
            writeln!(f, "Hop {} pool={:#x}", hop.index, hop.pool)?;
            writeln!(f, "  reserve0: {} -> {}", hop.reserve0, hop.reserve0_post)?;
            writeln!(f, "  reserve1: {} -> {}", hop.reserve1, hop.reserve1_post)?;
            writeln!(
                f,
                "  ledger: 0in={} 1in={} 0out={} 1out={}",
                hop.amount0_in, hop.amount1_in, hop.amount0_out, hop.amount1_out
            )?;
            writeln!(
                f,
                "  price: {} -> {}",
                format_fixed(hop.price),
                format_fixed(hop.price_post)
            )?;
            writeln!(f, "  profit: {}%", format_fixed_signed(hop.profit_percent))?;
        }
        writeln!(f, "Transaction to: {:#x}", self.router)?;
        writeln!(f, "Transaction from: {:#x}", self.sender)?;
        writeln!(f, "Transaction hash: {:#x}", self.tx_hash)?;
        write!(f, "Value: {} ETH", format_ether(self.value))
    }
}

fn join_addresses(addresses: &[Address]) -> String {
    addresses
        .iter()
        .map(|a| format!("{a:#x}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a 10^18-scaled value with six decimal places (truncated).
fn format_fixed(value: U256) -> String {
    let int = value / PRICE_SCALE;
    let frac = (value % PRICE_SCALE) / U256::from(1_000_000_000_000u64);
    format!("{}.{:06}", int, frac.to::<u64>())
}

fn format_fixed_signed(value: I256) -> String {
    let rendered = format_fixed(value.unsigned_abs());
    if value.is_negative() {
        format!("-{rendered}")
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_fixed() {
        // 2.5 at 10^18 scale
        let v = U256::from(25u64) * PRICE_SCALE / U256::from(10u64);
        assert_eq!(format_fixed(v), "2.500000");
        assert_eq!(format_fixed(U256::ZERO), "0.000000");
    }

    #[test]
    fn test_format_fixed_signed_negative() {
        let v = I256::try_from(U256::from(3u64) * PRICE_SCALE / U256::from(2u64)).unwrap();
        assert_eq!(format_fixed_signed(-v), "-1.500000");
        assert_eq!(format_fixed_signed(v), "1.500000");
    }
}
