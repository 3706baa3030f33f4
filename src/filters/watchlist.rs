//! Static Pool Watch-List
//!
//! One pool address per line, `#` starts a comment, case does not matter.
//! Loaded once per process; read-only afterwards. A transaction whose
//! resolved pools never touch this set produces no report.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use alloy::primitives::Address;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

/// The set of pool addresses of interest.
#[derive(Debug, Clone, Default)]
pub struct WatchList {
    pools: HashSet<Address>,
}

impl WatchList {
    /// Load from a plain-text file. A missing or unreadable file is fatal —
    /// a watcher with no watch-list has nothing to do — but individual bad
    /// lines are warned about and skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read watch-list file: {}", path.display()))?;
        let list = Self::parse(&text);
        info!("Watch-list: {} pool(s) loaded from {}", list.len(), path.display());
        Ok(list)
    }

    pub fn parse(text: &str) -> Self {
        let mut pools = HashSet::new();

        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            match Address::from_str(line) {
                Ok(address) => {
                    pools.insert(address);
                }
                Err(e) => {
                    warn!("Watch-list line {}: '{}' is not an address ({})", lineno + 1, line, e);
                }
            }
        }

        Self { pools }
    }

    pub fn contains(&self, pool: &Address) -> bool {
        self.pools.contains(pool)
    }

    /// Intersect a resolved pool list with the watch-list, preserving the
    /// input order.
    pub fn matches(&self, pools: &[Address]) -> Vec<Address> {
        pools
            .iter()
            .copied()
            .filter(|pool| self.pools.contains(pool))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let text = "\
# mainnet pools
0xB4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc  # USDC/WETH

0xA478c2975Ab1Ea89e8196811F51A7B7Ade33eB11
";
        let list = WatchList::parse(text);
        assert_eq!(list.len(), 2);
        assert!(list.contains(&address!("B4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc")));
        assert!(list.contains(&address!("A478c2975Ab1Ea89e8196811F51A7B7Ade33eB11")));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let list = WatchList::parse("0xb4e16d0168e52d35cacd2c6185b44281ec28c9dc\n");
        assert!(list.contains(&address!("B4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc")));
    }

    #[test]
    fn test_parse_skips_bad_lines() {
        let list = WatchList::parse("not-an-address\n0xB4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc\n");
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_matches_preserves_order_and_filters() {
        let watched = address!("B4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc");
        let other = address!("A478c2975Ab1Ea89e8196811F51A7B7Ade33eB11");
        let stranger = Address::repeat_byte(0x99);

        let list = WatchList::parse(&format!("{watched:#x}\n{other:#x}\n"));
        let hits = list.matches(&[stranger, other, watched]);
        assert_eq!(hits, vec![other, watched]);
    }

    #[test]
    fn test_empty_watchlist() {
        let list = WatchList::parse("");
        assert!(list.is_empty());
        assert!(list.matches(&[Address::repeat_byte(0x01)]).is_empty());
    }
}
