//! Swap Watcher — Observation Loop
//!
//! Purpose:
//!     Subscribe to pending transactions over WebSocket, filter down to
//!     calls addressed to the watched router, and run each candidate
//!     through the full pipeline: selector match → calldata decode →
//!     token metadata → pool resolution → watch-list gate → simulation →
//!     metrics → report.
//!
//! Author: AI-Generated
//! Created: 2026-02-03
//!
//! Dependencies:
//!     - alloy (WS provider, pending-tx subscription)
//!     - tokio (async runtime, select!, interval, per-tx spawn)
//!
//! Notes:
//!     - Standard newPendingTransactions yields hashes only; each hash
//!       costs one get_transaction_by_hash. Dropped or not-yet-propagated
//!       hashes come back as None and are skipped without comment —
//!       expected behavior under load, not an error.
//!     - Every matched transaction is processed in its own task. A slow or
//!       failing oracle call stalls that task only; the subscription loop
//!       keeps draining.

use alloy::consensus::Transaction as _;
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{Context, Result};
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::filters::WatchList;
use crate::oracle::{OracleSet, RpcOracle};

use super::types::{DecodedSwap, PendingTx, SwapReport};
use super::{decoder, metrics, simulator};

/// Everything a per-transaction task needs, shared read-only.
pub struct WatchContext {
    pub oracles: OracleSet,
    pub watchlist: Arc<WatchList>,
    pub router: Address,
}

/// Run the watcher. This is the main entry point, called from main.rs.
/// Reconnects with a cap when the WS session or subscription drops.
pub async fn run_observation(config: Config, watchlist: WatchList) -> Result<()> {
    let watchlist = Arc::new(watchlist);

    let mut reconnects = 0u32;
    const MAX_RECONNECTS: u32 = 50;

    loop {
        match run_observation_inner(&config, Arc::clone(&watchlist)).await {
            Ok(()) => {
                info!("Watcher exited cleanly");
                return Ok(());
            }
            Err(e) => {
                reconnects += 1;
                if reconnects > MAX_RECONNECTS {
                    warn!("Watcher: {} reconnects exhausted — giving up", MAX_RECONNECTS);
                    return Err(e);
                }
                warn!(
                    "Watcher error (reconnect {}/{}): {:#} — retrying in 5s...",
                    reconnects, MAX_RECONNECTS, e
                );
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
    }
}

/// Inner observation loop — one WS session.
/// Returns Err on connection failure (caller retries).
async fn run_observation_inner(config: &Config, watchlist: Arc<WatchList>) -> Result<()> {
    let provider = ProviderBuilder::new()
        .connect(&config.ws_endpoint)
        .await
        .context("WS connect failed")?;

    let oracle = RpcOracle::new(provider.clone(), config.factory, config.router);
    let ctx = Arc::new(WatchContext {
        oracles: OracleSet::from_rpc(oracle),
        watchlist,
        router: config.router,
    });

    let subscription = provider
        .subscribe_pending_transactions()
        .await
        .context("newPendingTransactions subscription failed")?;
    let mut pending_stream = subscription.into_stream();

    info!(
        "Mempool: pending-transaction subscription active | router={:#x} | watch-list={} pool(s)",
        config.router,
        ctx.watchlist.len()
    );

    // Stats
    let mut total_seen = 0u64;
    let mut total_matched = 0u64;
    let total_reported = Arc::new(AtomicU64::new(0));

    let mut stats_interval = interval(Duration::from_secs(60));
    // Skip the first immediate tick
    stats_interval.tick().await;

    loop {
        tokio::select! {
            maybe_hash = pending_stream.next() => {
                let Some(hash) = maybe_hash else {
                    warn!("Pending stream ended");
                    return Err(anyhow::anyhow!("pending stream ended"));
                };
                total_seen += 1;

                // Fetch the full transaction. Hashes for dropped or
                // not-yet-propagated transactions are expected, especially
                // under load; skip without noise.
                let tx = match provider.get_transaction_by_hash(hash).await {
                    Ok(Some(tx)) => tx,
                    Ok(None) => continue,
                    Err(e) => {
                        trace!("get_transaction_by_hash({hash:#x}) failed: {e}");
                        continue;
                    }
                };

                // Early filter: still pending, addressed to the router,
                // calldata beyond the bare selector.
                if tx.block_hash.is_some() || tx.block_number.is_some() {
                    continue;
                }
                if tx.inner.to() != Some(ctx.router) {
                    continue;
                }
                let input = tx.inner.input().clone();
                if input.len() <= 4 {
                    continue;
                }

                let pending = PendingTx {
                    hash,
                    from: tx.inner.signer(),
                    to: ctx.router,
                    value: tx.inner.value(),
                    input,
                };

                total_matched += 1;
                let ctx = Arc::clone(&ctx);
                let reported = Arc::clone(&total_reported);
                tokio::spawn(async move {
                    if let Some(report) = process_pending(pending, &ctx).await {
                        reported.fetch_add(1, Ordering::Relaxed);
                        info!("Pending swap detected:\n{report}");
                        match serde_json::to_string(&report) {
                            Ok(json) => debug!("report json: {json}"),
                            Err(e) => warn!("report serialization failed: {e}"),
                        }
                    }
                });
            }

            _ = stats_interval.tick() => {
                info!(
                    "WATCHER STATS | seen={} router_calls={} reported={}",
                    total_seen,
                    total_matched,
                    total_reported.load(Ordering::Relaxed),
                );
            }
        }
    }
}

/// The per-transaction pipeline. Returns None whenever the transaction is
/// filtered out or its simulation aborts — the calling task just moves on.
pub async fn process_pending(tx: PendingTx, ctx: &WatchContext) -> Option<SwapReport> {
    // 1. Selector match — the common exit for non-swap router traffic.
    let Some(function) = decoder::match_selector(&tx.input) else {
        trace!(
            "{:#x}: selector {} is not a recognized swap",
            tx.hash,
            decoder::selector_hex(&tx.input)
        );
        return None;
    };

    // 2. Calldata decode.
    let args = match decoder::decode_swap(function, &tx.input) {
        Ok(args) => args,
        Err(e) => {
            debug!("{:#x}: {} — skipping", tx.hash, e);
            return None;
        }
    };

    // 3. Token metadata, one entry per path element. A token that will not
    // answer gets placeholders rather than sinking the transaction.
    let mut token_symbols = Vec::with_capacity(args.path.len());
    let mut token_decimals = Vec::with_capacity(args.path.len());
    for token in &args.path {
        let symbol = match ctx.oracles.metadata.symbol_of(*token).await {
            Some(symbol) => symbol,
            None => {
                warn!("{:#x}: no symbol for token {:#x}", tx.hash, token);
                "UNKNOWN".to_string()
            }
        };
        token_symbols.push(symbol);
        token_decimals.push(ctx.oracles.metadata.decimals_of(*token).await.unwrap_or(18));
    }

    let swap = DecodedSwap {
        function,
        path: args.path.clone(),
        token_symbols,
        token_decimals,
        recipient: args.to,
        router: tx.to,
        sender: tx.from,
        tx_hash: tx.hash,
        value: tx.value,
        args,
    };

    // 4. Path resolution. A missing pool omits that hop; the rest continue.
    let mut resolved: Vec<(usize, Address)> = Vec::with_capacity(swap.path.len() - 1);
    for i in 0..swap.path.len() - 1 {
        match ctx
            .oracles
            .registry
            .resolve_pool(swap.path[i], swap.path[i + 1])
            .await
        {
            Some(pool) => resolved.push((i, pool)),
            None => debug!("{:#x}: no pool for hop {}", tx.hash, i),
        }
    }

    // 5. Watch-list gate.
    let pool_addresses: Vec<Address> = resolved.iter().map(|(_, pool)| *pool).collect();
    let watched_pools = ctx.watchlist.matches(&pool_addresses);
    if watched_pools.is_empty() {
        trace!("{:#x}: no watch-list pool on path", tx.hash);
        return None;
    }

    // 6. Simulation.
    let fills = match simulator::simulate(&swap, &resolved, &ctx.oracles).await {
        Ok(fills) => fills,
        Err(abort) => {
            debug!("{:#x}: simulation aborted: {}", tx.hash, abort);
            return None;
        }
    };

    // 7. Metrics + report.
    let hops = metrics::build_hops(
        &swap.path,
        &swap.token_decimals,
        &fills,
        &ctx.oracles.reserves,
    )
    .await;

    Some(SwapReport::new(swap, pool_addresses, watched_pools, hops))
}
