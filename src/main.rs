//! Mempool Swap Watcher
//!
//! Main entry point. Loads the env configuration and the pool watch-list,
//! then runs the observation loop: every pending transaction addressed to
//! the router is decoded, simulated, and — when it touches a watch-listed
//! pool — reported with per-hop reserves, prices, and profit.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use anyhow::Result;
use clap::Parser;
use swapwatch::config::load_config;
use swapwatch::filters::WatchList;
use swapwatch::mempool::monitor;
use tracing::{info, warn, Level};

/// Mempool Swap Watcher — pending Uniswap V2 router swaps
#[derive(Parser)]
#[command(name = "swapwatch")]
struct Args {
    /// Watch-list file of pool addresses (one per line)
    #[arg(short, long, env = "WATCHLIST", default_value = "resources/contracts.txt")]
    watchlist: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let args = Args::parse();

    let config = load_config()?;
    info!("Swap Watcher starting...");
    info!(
        "WS endpoint: {}",
        &config.ws_endpoint[..40.min(config.ws_endpoint.len())]
    );
    info!("Router: {:#x}", config.router);
    info!("Factory: {:#x}", config.factory);

    let watchlist = WatchList::load(&args.watchlist)?;
    if watchlist.is_empty() {
        warn!(
            "Watch-list {} has no addresses — the watcher will never report",
            args.watchlist
        );
    }

    monitor::run_observation(config, watchlist).await
}
