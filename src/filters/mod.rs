//! Pool filtering
//!
//! The watch-list of pool addresses the watcher reports on.
//! Loaded from resources/contracts.txt at startup.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

pub mod watchlist;

pub use watchlist::WatchList;
