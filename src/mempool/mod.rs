//! Mempool Swap Pipeline
//!
//! Purpose:
//!     Observe pending router transactions, decode the nine recognized
//!     swap functions, simulate each hop's effect on pool reserves, and
//!     report price impact for watch-listed pools.
//!
//! Author: AI-Generated
//! Created: 2026-02-03
//!
//! Architecture:
//!     types.rs      — PendingTx, DecodedSwap, HopFill, Hop, SwapReport
//!     decoder.rs    — selector matching + calldata → SwapArgs
//!     simulator.rs  — per-hop amount ledger (router-quoted / fee-on-transfer)
//!     metrics.rs    — post-swap reserves, fixed-point price, profit percent
//!     monitor.rs    — WS subscription loop + per-transaction pipeline
//!
//! Usage:
//!     main.rs calls monitor::run_observation with the loaded config and
//!     watch-list; everything else is internal plumbing.

pub mod decoder;
pub mod metrics;
pub mod monitor;
pub mod simulator;
pub mod types;

pub use decoder::{DecodeError, SwapFunction};
pub use monitor::{process_pending, run_observation, WatchContext};
pub use types::{DecodedSwap, Hop, HopFill, PendingTx, SwapReport};
