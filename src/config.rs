//! Configuration management
//! Load settings from .env file

use alloy::primitives::Address;
use anyhow::{Context, Result};
use std::str::FromStr;

/// Uniswap V2 Router02 on Ethereum mainnet.
pub const MAINNET_ROUTER: &str = "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D";
/// Uniswap V2 factory on Ethereum mainnet.
pub const MAINNET_FACTORY: &str = "0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f";

/// Watcher configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// WebSocket RPC endpoint (pending-tx subscription + all oracle calls).
    pub ws_endpoint: String,
    /// The router whose pending traffic is watched.
    pub router: Address,
    /// The factory used to resolve pair addresses.
    pub factory: Address,
}

pub fn load_config() -> Result<Config> {
    dotenv::dotenv().ok();

    let ws_endpoint =
        std::env::var("WS_ENDPOINT").context("WS_ENDPOINT not set — check your .env file")?;
    let router = address_var("ROUTER_ADDRESS", MAINNET_ROUTER)?;
    let factory = address_var("FACTORY_ADDRESS", MAINNET_FACTORY)?;

    Ok(Config {
        ws_endpoint,
        router,
        factory,
    })
}

fn address_var(name: &str, default: &str) -> Result<Address> {
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    Address::from_str(raw.trim())
        .with_context(|| format!("{} is not a valid address: {}", name, raw))
}
