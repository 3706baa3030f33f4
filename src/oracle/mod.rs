//! Read-Only Chain Oracles
//!
//! Purpose:
//!     Everything the pipeline needs from live blockchain state — pool
//!     resolution, reserves, token balances, router quotes, token metadata —
//!     behind four small async traits. The pipeline never assumes it can
//!     compute these values itself; it asks, and degrades gracefully when
//!     the answer is "no".
//!
//! Author: AI-Generated
//! Created: 2026-02-03
//!
//! Notes:
//!     - `None` covers both "does not exist" (zero-address pair sentinel)
//!       and "the RPC call failed" — the pipeline treats them identically.
//!     - Quote calls return Result because a revert carries meaning
//!       (insufficient liquidity) that the caller logs.
//!     - `RpcOracle` is the live implementation; tests inject in-memory
//!       doubles through the same `OracleSet` bundle.

use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::contracts::{IERC20, IUniswapV2Factory, IUniswapV2Pair, IUniswapV2Router02};

/// Pool registry: which pool (if any) backs a token pair.
#[async_trait]
pub trait PoolRegistry: Send + Sync {
    async fn resolve_pool(&self, token_a: Address, token_b: Address) -> Option<Address>;
}

/// Reserve and balance reads against current chain state.
#[async_trait]
pub trait ReserveOracle: Send + Sync {
    async fn reserves_of(&self, pool: Address) -> Option<(U256, U256)>;
    async fn balance_of(&self, token: Address, owner: Address) -> Option<U256>;
}

/// Router-computed swap quotes.
#[async_trait]
pub trait QuoteOracle: Send + Sync {
    /// Per-hop amount vector forward from a fixed input.
    async fn amounts_out(&self, amount_in: U256, path: &[Address]) -> Result<Vec<U256>>;
    /// Per-hop amount vector backward from a fixed output.
    async fn amounts_in(&self, amount_out: U256, path: &[Address]) -> Result<Vec<U256>>;
    /// Constant-product quote for a single hop with known reserves.
    async fn amount_out_single(
        &self,
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
    ) -> Result<U256>;
}

/// ERC20 metadata reads.
#[async_trait]
pub trait TokenMetadata: Send + Sync {
    async fn symbol_of(&self, token: Address) -> Option<String>;
    async fn decimals_of(&self, token: Address) -> Option<u8>;
}

/// The four oracle seams bundled for injection into the pipeline. Cloning
/// is cheap (Arc handles); a live process points all four at one
/// `RpcOracle`, tests mix and match doubles.
#[derive(Clone)]
pub struct OracleSet {
    pub registry: Arc<dyn PoolRegistry>,
    pub reserves: Arc<dyn ReserveOracle>,
    pub quotes: Arc<dyn QuoteOracle>,
    pub metadata: Arc<dyn TokenMetadata>,
}

impl OracleSet {
    pub fn from_rpc<P: Provider + Clone + 'static>(oracle: RpcOracle<P>) -> Self {
        let oracle = Arc::new(oracle);
        Self {
            registry: oracle.clone(),
            reserves: oracle.clone(),
            quotes: oracle.clone(),
            metadata: oracle,
        }
    }
}

/// Live implementation over an alloy provider: factory for pool resolution,
/// pair/ERC20 contracts for reads, router for quotes.
pub struct RpcOracle<P> {
    provider: P,
    factory: Address,
    router: Address,
}

impl<P: Provider + Clone + 'static> RpcOracle<P> {
    pub fn new(provider: P, factory: Address, router: Address) -> Self {
        Self {
            provider,
            factory,
            router,
        }
    }
}

#[async_trait]
impl<P: Provider + Clone + 'static> PoolRegistry for RpcOracle<P> {
    async fn resolve_pool(&self, token_a: Address, token_b: Address) -> Option<Address> {
        let factory = IUniswapV2Factory::new(self.factory, self.provider.clone());
        match factory.getPair(token_a, token_b).call().await {
            Ok(pair) if pair == Address::ZERO => None, // pair does not exist
            Ok(pair) => Some(pair),
            Err(e) => {
                debug!("getPair({token_a:#x}, {token_b:#x}) failed: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl<P: Provider + Clone + 'static> ReserveOracle for RpcOracle<P> {
    async fn reserves_of(&self, pool: Address) -> Option<(U256, U256)> {
        let pair = IUniswapV2Pair::new(pool, self.provider.clone());
        match pair.getReserves().call().await {
            Ok(r) => Some((U256::from(r.reserve0), U256::from(r.reserve1))),
            Err(e) => {
                debug!("getReserves({pool:#x}) failed: {e}");
                None
            }
        }
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Option<U256> {
        let erc20 = IERC20::new(token, self.provider.clone());
        match erc20.balanceOf(owner).call().await {
            Ok(balance) => Some(balance),
            Err(e) => {
                debug!("balanceOf({owner:#x}) on {token:#x} failed: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl<P: Provider + Clone + 'static> QuoteOracle for RpcOracle<P> {
    async fn amounts_out(&self, amount_in: U256, path: &[Address]) -> Result<Vec<U256>> {
        let router = IUniswapV2Router02::new(self.router, self.provider.clone());
        router
            .getAmountsOut(amount_in, path.to_vec())
            .call()
            .await
            .context("router getAmountsOut reverted")
    }

    async fn amounts_in(&self, amount_out: U256, path: &[Address]) -> Result<Vec<U256>> {
        let router = IUniswapV2Router02::new(self.router, self.provider.clone());
        router
            .getAmountsIn(amount_out, path.to_vec())
            .call()
            .await
            .context("router getAmountsIn reverted")
    }

    async fn amount_out_single(
        &self,
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
    ) -> Result<U256> {
        let router = IUniswapV2Router02::new(self.router, self.provider.clone());
        router
            .getAmountOut(amount_in, reserve_in, reserve_out)
            .call()
            .await
            .context("router getAmountOut reverted")
    }
}

#[async_trait]
impl<P: Provider + Clone + 'static> TokenMetadata for RpcOracle<P> {
    async fn symbol_of(&self, token: Address) -> Option<String> {
        let erc20 = IERC20::new(token, self.provider.clone());
        match erc20.symbol().call().await {
            Ok(symbol) => Some(symbol),
            Err(e) => {
                debug!("symbol() on {token:#x} failed: {e}");
                None
            }
        }
    }

    async fn decimals_of(&self, token: Address) -> Option<u8> {
        let erc20 = IERC20::new(token, self.provider.clone());
        match erc20.decimals().call().await {
            Ok(decimals) => Some(decimals),
            Err(e) => {
                debug!("decimals() on {token:#x} failed: {e}");
                None
            }
        }
    }
}


/// In-memory oracle doubles for deterministic pipeline tests.
#[cfg(test)]
pub mod mock {
    use super::*;
    use anyhow::bail;
    use std::collections::HashMap;

    /// One struct backing all four traits. Pools are keyed by the sorted
    /// token pair; quotes either replay a canned vector or run the
    /// constant-product formula over the stored reserves.
    #[derive(Default)]
    pub struct MockOracles {
        pub pools: HashMap<(Address, Address), Address>,
        pub reserves: HashMap<Address, (U256, U256)>,
        pub balances: HashMap<(Address, Address), U256>,
        pub symbols: HashMap<Address, String>,
        pub decimals: HashMap<Address, u8>,
        pub amounts_out: Option<Vec<U256>>,
        pub amounts_in: Option<Vec<U256>>,
    }

    fn pair_key(a: Address, b: Address) -> (Address, Address) {
        if a < b {
            (a, b)
        } else {
            (b, a)
        }
    }

    impl MockOracles {
        pub fn add_pool(&mut self, token_a: Address, token_b: Address, pool: Address) {
            self.pools.insert(pair_key(token_a, token_b), pool);
        }

        pub fn add_token(&mut self, token: Address, symbol: &str, decimals: u8) {
            self.symbols.insert(token, symbol.to_string());
            self.decimals.insert(token, decimals);
        }

        pub fn into_set(self) -> OracleSet {
            let shared = Arc::new(self);
            OracleSet {
                registry: shared.clone(),
                reserves: shared.clone(),
                quotes: shared.clone(),
                metadata: shared,
            }
        }
    }

    #[async_trait]
    impl PoolRegistry for MockOracles {
        async fn resolve_pool(&self, token_a: Address, token_b: Address) -> Option<Address> {
            self.pools.get(&pair_key(token_a, token_b)).copied()
        }
    }

    #[async_trait]
    impl ReserveOracle for MockOracles {
        async fn reserves_of(&self, pool: Address) -> Option<(U256, U256)> {
            self.reserves.get(&pool).copied()
        }

        async fn balance_of(&self, token: Address, owner: Address) -> Option<U256> {
            self.balances.get(&(token, owner)).copied()
        }
    }

    #[async_trait]
    impl QuoteOracle for MockOracles {
        async fn amounts_out(&self, _amount_in: U256, path: &[Address]) -> Result<Vec<U256>> {
            match &self.amounts_out {
                Some(amounts) if amounts.len() == path.len() => Ok(amounts.clone()),
                Some(_) => bail!("canned amountsOut does not match path length"),
                None => bail!("no amountsOut configured"),
            }
        }

        async fn amounts_in(&self, _amount_out: U256, path: &[Address]) -> Result<Vec<U256>> {
            match &self.amounts_in {
                Some(amounts) if amounts.len() == path.len() => Ok(amounts.clone()),
                Some(_) => bail!("canned amountsIn does not match path length"),
                None => bail!("no amountsIn configured"),
            }
        }

        async fn amount_out_single(
            &self,
            amount_in: U256,
            reserve_in: U256,
            reserve_out: U256,
        ) -> Result<U256> {
            // Same formula the router uses: 0.30% fee constant product.
            if amount_in.is_zero() {
                bail!("INSUFFICIENT_INPUT_AMOUNT");
            }
            if reserve_in.is_zero() || reserve_out.is_zero() {
                bail!("INSUFFICIENT_LIQUIDITY");
            }
            let amount_in_with_fee = amount_in * U256::from(997u64);
            let numerator = amount_in_with_fee * reserve_out;
            let denominator = reserve_in * U256::from(1000u64) + amount_in_with_fee;
            Ok(numerator / denominator)
        }
    }

    #[async_trait]
    impl TokenMetadata for MockOracles {
        async fn symbol_of(&self, token: Address) -> Option<String> {
            self.symbols.get(&token).cloned()
        }

        async fn decimals_of(&self, token: Address) -> Option<u8> {
            self.decimals.get(&token).copied()
        }
    }
}
