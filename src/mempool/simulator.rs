//! Swap Watcher — Per-Hop Swap Simulation
//!
//! Purpose:
//!
//! ```text
//!     Turn a decoded pending swap into the per-hop amount ledger
//!     (amount0In/Out, amount1In/Out against canonical token ordering).
//!     Two mutually exclusive strategies, selected by the matched operation:
//!
//!     A. Router-quoted amounts — ask the quoting oracle for the full
//!        per-hop vector (forward from a fixed input, or backward from a
//!        fixed output), validate it against the transaction's own slippage
//!        bound, then distribute it across the hops.
//!     B. Fee-on-transfer tokens — amounts cannot be pre-quoted because the
//!        token deducts an unknown transfer fee; per hop, difference the
//!        pool's observed input-token balance against its last-known
//!        reserve to recover what actually arrived, then quote that single
//!        hop.
//! ```
//!
//! Author: AI-Generated
//! Created: 2026-02-03
//!
//! Notes:
//!     - Both strategies emit the same ledger shape; the metrics engine is
//!       strategy-agnostic.
//!     - A slippage violation aborts the whole transaction's simulation; a
//!       per-hop quoting failure under strategy B only skips that hop.

use alloy::primitives::{Address, U256};
use thiserror::Error;
use tracing::debug;

use crate::oracle::OracleSet;

use super::types::{DecodedSwap, HopFill};

/// Symbol the wrapped native token must report for native-in/native-out
/// operations (the original router pairs everything against WETH).
pub const WRAPPED_NATIVE_SYMBOL: &str = "WETH";

/// Simulation aborted for this transaction. Malformed input or the
/// transaction's own bounds — never a system fault, never fatal.
#[derive(Debug, Error)]
pub enum SimAbort {
    #[error("path does not {0} with the wrapped native token")]
    NotWrappedNative(&'static str),
    #[error("router could not quote amounts: {0}")]
    QuoteUnavailable(String),
    #[error("quoted input {quoted} exceeds bound {bound}")]
    InputExceedsBound { quoted: U256, bound: U256 },
    #[error("quoted output {quoted} below minimum {minimum}")]
    OutputBelowMinimum { quoted: U256, minimum: U256 },
}

/// Simulate one decoded swap against the pools resolved for its path.
/// `resolved` holds (hop index, pool) for every hop the registry could
/// name; hops without a pool are omitted from the ledger.
pub async fn simulate(
    swap: &DecodedSwap,
    resolved: &[(usize, Address)],
    oracles: &OracleSet,
) -> Result<Vec<HopFill>, SimAbort> {
    if swap.function.native_in()
        && swap.token_symbols.first().map(String::as_str) != Some(WRAPPED_NATIVE_SYMBOL)
    {
        return Err(SimAbort::NotWrappedNative("begin"));
    }
    if swap.function.native_out()
        && swap.token_symbols.last().map(String::as_str) != Some(WRAPPED_NATIVE_SYMBOL)
    {
        return Err(SimAbort::NotWrappedNative("end"));
    }

    if swap.function.is_fee_on_transfer() {
        return Ok(fill_fee_on_transfer(&swap.path, resolved, oracles).await);
    }

    let amounts = quote_amounts(swap, oracles).await?;
    Ok(distribute_amounts(&swap.path, resolved, &amounts))
}

/// Strategy A quoting: fixed-output operations quote backward and bound the
/// input; fixed-input operations quote forward and bound the output.
async fn quote_amounts(swap: &DecodedSwap, oracles: &OracleSet) -> Result<Vec<U256>, SimAbort> {
    let amounts = if swap.function.fixes_output() {
        let amount_out = swap.args.amount_out.unwrap_or_default();
        let amounts = oracles
            .quotes
            .amounts_in(amount_out, &swap.path)
            .await
            .map_err(|e| SimAbort::QuoteUnavailable(format!("{e:#}")))?;

        // The bound on the quoted input: the declared maximum, or for
        // native-in swaps the value actually attached to the transaction.
        let bound = if swap.function.native_in() {
            swap.value
        } else {
            swap.args.amount_in_max.unwrap_or_default()
        };
        let quoted = amounts.first().copied().unwrap_or_default();
        if quoted > bound {
            return Err(SimAbort::InputExceedsBound { quoted, bound });
        }
        amounts
    } else {
        let amount_in = if swap.function.native_in() {
            swap.value
        } else {
            swap.args.amount_in.unwrap_or_default()
        };
        let amounts = oracles
            .quotes
            .amounts_out(amount_in, &swap.path)
            .await
            .map_err(|e| SimAbort::QuoteUnavailable(format!("{e:#}")))?;

        let minimum = swap.args.amount_out_min.unwrap_or_default();
        let quoted = amounts.last().copied().unwrap_or_default();
        if quoted < minimum {
            return Err(SimAbort::OutputBelowMinimum { quoted, minimum });
        }
        amounts
    };

    if amounts.len() != swap.path.len() {
        return Err(SimAbort::QuoteUnavailable(format!(
            "router returned {} amounts for {} path elements",
            amounts.len(),
            swap.path.len()
        )));
    }

    Ok(amounts)
}

/// Distribute a validated per-hop amount vector into ledgers. For hop `i`
/// the input token carries `amounts[i]` in and the output token carries
/// `amounts[i + 1]` out; which side of the ledger each lands on is decided
/// by the hop's canonical token ordering.
pub fn distribute_amounts(
    path: &[Address],
    resolved: &[(usize, Address)],
    amounts: &[U256],
) -> Vec<HopFill> {
    let mut fills = Vec::with_capacity(path.len().saturating_sub(1));

    for i in 0..path.len().saturating_sub(1) {
        let Some(pool) = pool_for(resolved, i) else {
            debug!(hop = i, "no resolved pool for quoted hop, omitting ledger entry");
            continue;
        };

        let input = path[i];
        let (token0, _) = sort_tokens(input, path[i + 1]);
        let amount_in = amounts[i];
        let amount_out = amounts[i + 1];

        fills.push(oriented_fill(i, pool, input == token0, amount_in, amount_out));
    }

    fills
}

/// Strategy B: per hop, recover the fee-adjusted input by differencing the
/// pool's observed balance against its last-known reserve, then quote the
/// single hop. Any failure skips the hop; later hops are still attempted
/// against their own pools.
async fn fill_fee_on_transfer(
    path: &[Address],
    resolved: &[(usize, Address)],
    oracles: &OracleSet,
) -> Vec<HopFill> {
    let mut fills = Vec::with_capacity(path.len().saturating_sub(1));

    for i in 0..path.len().saturating_sub(1) {
        let input = path[i];
        let output = path[i + 1];

        if input == output && input == Address::ZERO {
            continue;
        }

        let Some(pool) = pool_for(resolved, i) else {
            debug!(hop = i, "no resolved pool, skipping hop");
            continue;
        };
        let Some((reserve0, reserve1)) = oracles.reserves.reserves_of(pool).await else {
            debug!(hop = i, pool = %pool, "reserves unavailable, skipping hop");
            continue;
        };

        let (token0, _) = sort_tokens(input, output);
        let (reserve_in, reserve_out) = if input == token0 {
            (reserve0, reserve1)
        } else {
            (reserve1, reserve0)
        };

        let Some(balance) = oracles.reserves.balance_of(input, pool).await else {
            debug!(hop = i, pool = %pool, "input-token balance unavailable, skipping hop");
            continue;
        };

        // What actually arrived at the pool after the token took its cut —
        // the nominal transfer amount is not trustworthy here.
        let amount_in = balance.saturating_sub(reserve_in);

        let amount_out = match oracles
            .quotes
            .amount_out_single(amount_in, reserve_in, reserve_out)
            .await
        {
            Ok(amount) => amount,
            Err(e) => {
                debug!(hop = i, pool = %pool, "hop quote failed: {e:#}");
                continue;
            }
        };

        fills.push(oriented_fill(i, pool, input == token0, amount_in, amount_out));
    }

    fills
}

/// Canonical token ordering within a pool: the lexicographically smaller
/// address is token0. Address comparison is over the raw bytes, which is
/// exactly case-insensitive hex order.
pub fn sort_tokens(token_a: Address, token_b: Address) -> (Address, Address) {
    if token_a < token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    }
}

fn pool_for(resolved: &[(usize, Address)], index: usize) -> Option<Address> {
    resolved
        .iter()
        .find(|(i, _)| *i == index)
        .map(|(_, pool)| *pool)
}

fn oriented_fill(
    index: usize,
    pool: Address,
    input_is_token0: bool,
    amount_in: U256,
    amount_out: U256,
) -> HopFill {
    if input_is_token0 {
        HopFill {
            index,
            pool,
            amount0_in: amount_in,
            amount1_in: U256::ZERO,
            amount0_out: U256::ZERO,
            amount1_out: amount_out,
        }
    } else {
        HopFill {
            index,
            pool,
            amount0_in: U256::ZERO,
            amount1_in: amount_in,
            amount0_out: amount_out,
            amount1_out: U256::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mempool::decoder::{SwapArgs, SwapFunction};
    use crate::oracle::mock::MockOracles;
    use alloy::primitives::TxHash;

    const WETH: Address = Address::repeat_byte(0xEE);
    const USDC: Address = Address::repeat_byte(0x11); // sorts before WETH
    const DAI: Address = Address::repeat_byte(0x22);
    const POOL_WU: Address = Address::repeat_byte(0xA1);
    const POOL_UD: Address = Address::repeat_byte(0xA2);

    fn swap(
        function: SwapFunction,
        args: SwapArgs,
        path: Vec<Address>,
        symbols: &[&str],
        value: U256,
    ) -> DecodedSwap {
        DecodedSwap {
            function,
            path: path.clone(),
            token_symbols: symbols.iter().map(|s| s.to_string()).collect(),
            token_decimals: vec![18; path.len()],
            recipient: Address::ZERO,
            router: Address::ZERO,
            sender: Address::ZERO,
            tx_hash: TxHash::ZERO,
            value,
            args,
        }
    }

    #[test]
    fn test_sort_tokens() {
        assert_eq!(sort_tokens(USDC, WETH), (USDC, WETH));
        assert_eq!(sort_tokens(WETH, USDC), (USDC, WETH));
    }

    #[test]
    fn test_distribute_orientation_input_is_token0() {
        // Path USDC -> WETH: input sorts first, so token0 takes the inflow.
        let resolved = vec![(0usize, POOL_WU)];
        let amounts = vec![U256::from(100u64), U256::from(200u64)];
        let fills = distribute_amounts(&[USDC, WETH], &resolved, &amounts);

        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].amount0_in, U256::from(100u64));
        assert_eq!(fills[0].amount1_in, U256::ZERO);
        assert_eq!(fills[0].amount0_out, U256::ZERO);
        assert_eq!(fills[0].amount1_out, U256::from(200u64));
    }

    #[test]
    fn test_distribute_orientation_input_is_token1() {
        // Path WETH -> USDC: input sorts second, ledger flips sides.
        let resolved = vec![(0usize, POOL_WU)];
        let amounts = vec![U256::from(100u64), U256::from(200u64)];
        let fills = distribute_amounts(&[WETH, USDC], &resolved, &amounts);

        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].amount0_in, U256::ZERO);
        assert_eq!(fills[0].amount1_in, U256::from(100u64));
        assert_eq!(fills[0].amount0_out, U256::from(200u64));
        assert_eq!(fills[0].amount1_out, U256::ZERO);
    }

    #[test]
    fn test_distribute_single_sided_invariant() {
        let resolved = vec![(0usize, POOL_WU), (1usize, POOL_UD)];
        let amounts = vec![
            U256::from(10u64),
            U256::from(20u64),
            U256::from(30u64),
        ];
        for fill in distribute_amounts(&[WETH, USDC, DAI], &resolved, &amounts) {
            let input_sides =
                (!fill.amount0_in.is_zero()) as u8 + (!fill.amount1_in.is_zero()) as u8;
            assert_eq!(input_sides, 1, "exactly one non-zero input side");
        }
    }

    #[test]
    fn test_distribute_skips_unresolved_hop() {
        // Second hop has no pool: its ledger entry is absent, first survives.
        let resolved = vec![(0usize, POOL_WU)];
        let amounts = vec![U256::from(1u64), U256::from(2u64), U256::from(3u64)];
        let fills = distribute_amounts(&[WETH, USDC, DAI], &resolved, &amounts);
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].index, 0);
    }

    #[tokio::test]
    async fn test_output_below_minimum_aborts_with_empty_ledger() {
        let mut mock = MockOracles::default();
        mock.add_pool(WETH, USDC, POOL_WU);
        // Router quotes 900 out, caller demanded at least 1000.
        mock.amounts_out = Some(vec![U256::from(100u64), U256::from(900u64)]);
        let oracles = mock.into_set();

        let swap = swap(
            SwapFunction::ExactTokensForTokens,
            SwapArgs {
                amount_in: Some(U256::from(100u64)),
                amount_out_min: Some(U256::from(1000u64)),
                path: vec![WETH, USDC],
                ..Default::default()
            },
            vec![WETH, USDC],
            &["WETH", "USDC"],
            U256::ZERO,
        );

        let err = simulate(&swap, &[(0, POOL_WU)], &oracles)
            .await
            .expect_err("below-minimum quote must abort");
        assert!(matches!(err, SimAbort::OutputBelowMinimum { .. }));
    }

    #[tokio::test]
    async fn test_quoted_input_above_max_aborts() {
        let mut mock = MockOracles::default();
        mock.add_pool(WETH, USDC, POOL_WU);
        // Router needs 150 in; caller capped at 100.
        mock.amounts_in = Some(vec![U256::from(150u64), U256::from(50u64)]);
        let oracles = mock.into_set();

        let swap = swap(
            SwapFunction::TokensForExactTokens,
            SwapArgs {
                amount_out: Some(U256::from(50u64)),
                amount_in_max: Some(U256::from(100u64)),
                path: vec![WETH, USDC],
                ..Default::default()
            },
            vec![WETH, USDC],
            &["WETH", "USDC"],
            U256::ZERO,
        );

        let err = simulate(&swap, &[(0, POOL_WU)], &oracles)
            .await
            .expect_err("over-bound quote must abort");
        assert!(matches!(err, SimAbort::InputExceedsBound { .. }));
    }

    #[tokio::test]
    async fn test_native_in_bound_is_attached_value() {
        let mut mock = MockOracles::default();
        mock.add_pool(WETH, USDC, POOL_WU);
        // Quoted required input 150 exceeds the 100 wei attached.
        mock.amounts_in = Some(vec![U256::from(150u64), U256::from(50u64)]);
        let oracles = mock.into_set();

        let swap = swap(
            SwapFunction::EthForExactTokens,
            SwapArgs {
                amount_out: Some(U256::from(50u64)),
                path: vec![WETH, USDC],
                ..Default::default()
            },
            vec![WETH, USDC],
            &["WETH", "USDC"],
            U256::from(100u64),
        );

        let err = simulate(&swap, &[(0, POOL_WU)], &oracles)
            .await
            .expect_err("quoted input above msg.value must abort");
        assert!(matches!(err, SimAbort::InputExceedsBound { .. }));
    }

    #[tokio::test]
    async fn test_native_in_requires_weth_first() {
        let mock = MockOracles::default();
        let oracles = mock.into_set();

        // Path claims to start with USDC on a native-in operation.
        let swap = swap(
            SwapFunction::ExactEthForTokens,
            SwapArgs {
                amount_out_min: Some(U256::ZERO),
                path: vec![USDC, WETH],
                ..Default::default()
            },
            vec![USDC, WETH],
            &["USDC", "WETH"],
            U256::from(100u64),
        );

        let err = simulate(&swap, &[], &oracles)
            .await
            .expect_err("non-WETH first element must abort");
        assert!(matches!(err, SimAbort::NotWrappedNative("begin")));
    }

    #[tokio::test]
    async fn test_fee_on_transfer_balance_differencing() {
        let mut mock = MockOracles::default();
        mock.add_pool(WETH, USDC, POOL_WU);
        mock.reserves
            .insert(POOL_WU, (U256::from(1_000u64), U256::from(2_000u64)));
        // Pool's WETH balance is 2100 against a reserve of 2000 (WETH is
        // token1 here): 100 actually arrived after the transfer fee.
        mock.balances
            .insert((WETH, POOL_WU), U256::from(2_100u64));
        let oracles = mock.into_set();

        let swap = swap(
            SwapFunction::ExactTokensForTokensFeeOnTransfer,
            SwapArgs {
                amount_in: Some(U256::from(120u64)), // nominal, ignored
                amount_out_min: Some(U256::ZERO),
                path: vec![WETH, USDC],
                ..Default::default()
            },
            vec![WETH, USDC],
            &["WETH", "USDC"],
            U256::ZERO,
        );

        let fills = simulate(&swap, &[(0, POOL_WU)], &oracles)
            .await
            .expect("fee-on-transfer simulation should produce a ledger");
        assert_eq!(fills.len(), 1);
        // WETH sorts after USDC, so the inflow lands on the token1 side.
        assert_eq!(fills[0].amount1_in, U256::from(100u64));
        assert_eq!(fills[0].amount1_out, U256::ZERO);
        assert!(fills[0].amount0_out > U256::ZERO);
        assert_eq!(fills[0].amount0_in, U256::ZERO);
    }

    #[tokio::test]
    async fn test_fee_on_transfer_skips_failed_hop_continues_rest() {
        let mut mock = MockOracles::default();
        mock.add_pool(WETH, USDC, POOL_WU);
        mock.add_pool(USDC, DAI, POOL_UD);
        // First pool has no reserves entry -> hop 0 skipped.
        mock.reserves
            .insert(POOL_UD, (U256::from(5_000u64), U256::from(5_000u64)));
        // USDC is token0 of USDC/DAI; 50 arrived.
        mock.balances
            .insert((USDC, POOL_UD), U256::from(5_050u64));
        let oracles = mock.into_set();

        let swap = swap(
            SwapFunction::ExactTokensForTokensFeeOnTransfer,
            SwapArgs {
                amount_in: Some(U256::from(100u64)),
                amount_out_min: Some(U256::ZERO),
                path: vec![WETH, USDC, DAI],
                ..Default::default()
            },
            vec![WETH, USDC, DAI],
            &["WETH", "USDC", "DAI"],
            U256::ZERO,
        );

        let fills = simulate(&swap, &[(0, POOL_WU), (1, POOL_UD)], &oracles)
            .await
            .expect("later hops still attempted");
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].index, 1);
        assert_eq!(fills[0].pool, POOL_UD);
        assert_eq!(fills[0].amount0_in, U256::from(50u64));
    }
}
