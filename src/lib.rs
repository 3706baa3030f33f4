//! Mempool Swap Watcher Library
//!
//! Watches pending transactions addressed to a Uniswap V2 router, decodes
//! the nine recognized swap functions, simulates per-hop pool impact, and
//! reports price movement for watch-listed pools.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

pub mod config;
pub mod contracts;
pub mod filters;
pub mod mempool;
pub mod oracle;

// Re-export commonly used types
pub use config::{load_config, Config};
pub use filters::WatchList;
pub use mempool::{run_observation, SwapFunction, SwapReport};
pub use oracle::{OracleSet, PoolRegistry, QuoteOracle, ReserveOracle, RpcOracle, TokenMetadata};
