//! Swap Watcher — Selector Matching and Calldata Decoding
//!
//! Purpose:
//!     Identify which of the nine recognized Uniswap V2 router swap
//!     functions a pending transaction invokes, and decode its calldata
//!     into a typed argument set.
//!
//! Author: AI-Generated
//! Created: 2026-02-03
//!
//! Dependencies:
//!     - alloy (sol-types: compile-time selectors, ABI decoding)
//!
//! Supported Function Selectors (V2 Router02):
//!     0xfb3bdb41 — swapETHForExactTokens
//!     0x7ff36ab5 — swapExactETHForTokens
//!     0xb6f9de95 — swapExactETHForTokensSupportingFeeOnTransferTokens
//!     0x18cbafe5 — swapExactTokensForETH
//!     0x791ac947 — swapExactTokensForETHSupportingFeeOnTransferTokens
//!     0x38ed1739 — swapExactTokensForTokens
//!     0x5c11d795 — swapExactTokensForTokensSupportingFeeOnTransferTokens
//!     0x4a25d94a — swapTokensForExactETH
//!     0x8803dbee — swapTokensForExactTokens

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use thiserror::Error;

use crate::contracts::IUniswapV2Router02 as router;

/// The nine recognized router swap operations. A fieldless enum so the rest
/// of the pipeline matches exhaustively — adding or removing a supported
/// operation is a compile-time-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapFunction {
    EthForExactTokens,
    ExactEthForTokens,
    ExactEthForTokensFeeOnTransfer,
    ExactTokensForEth,
    ExactTokensForEthFeeOnTransfer,
    ExactTokensForTokens,
    ExactTokensForTokensFeeOnTransfer,
    TokensForExactEth,
    TokensForExactTokens,
}

impl SwapFunction {
    /// Declared scan order (alphabetical by ABI name). Selector matching
    /// walks this list and takes the first exact byte match; signatures are
    /// selector-unique by construction, so order only pins determinism.
    pub const ALL: [SwapFunction; 9] = [
        SwapFunction::EthForExactTokens,
        SwapFunction::ExactEthForTokens,
        SwapFunction::ExactEthForTokensFeeOnTransfer,
        SwapFunction::ExactTokensForEth,
        SwapFunction::ExactTokensForEthFeeOnTransfer,
        SwapFunction::ExactTokensForTokens,
        SwapFunction::ExactTokensForTokensFeeOnTransfer,
        SwapFunction::TokensForExactEth,
        SwapFunction::TokensForExactTokens,
    ];

    /// ABI function name, exactly as it appears in the router interface.
    pub fn name(&self) -> &'static str {
        match self {
            Self::EthForExactTokens => "swapETHForExactTokens",
            Self::ExactEthForTokens => "swapExactETHForTokens",
            Self::ExactEthForTokensFeeOnTransfer => {
                "swapExactETHForTokensSupportingFeeOnTransferTokens"
            }
            Self::ExactTokensForEth => "swapExactTokensForETH",
            Self::ExactTokensForEthFeeOnTransfer => {
                "swapExactTokensForETHSupportingFeeOnTransferTokens"
            }
            Self::ExactTokensForTokens => "swapExactTokensForTokens",
            Self::ExactTokensForTokensFeeOnTransfer => {
                "swapExactTokensForTokensSupportingFeeOnTransferTokens"
            }
            Self::TokensForExactEth => "swapTokensForExactETH",
            Self::TokensForExactTokens => "swapTokensForExactTokens",
        }
    }

    /// 4-byte function selector, from the sol!-generated call type.
    pub fn selector(&self) -> [u8; 4] {
        match self {
            Self::EthForExactTokens => router::swapETHForExactTokensCall::SELECTOR,
            Self::ExactEthForTokens => router::swapExactETHForTokensCall::SELECTOR,
            Self::ExactEthForTokensFeeOnTransfer => {
                router::swapExactETHForTokensSupportingFeeOnTransferTokensCall::SELECTOR
            }
            Self::ExactTokensForEth => router::swapExactTokensForETHCall::SELECTOR,
            Self::ExactTokensForEthFeeOnTransfer => {
                router::swapExactTokensForETHSupportingFeeOnTransferTokensCall::SELECTOR
            }
            Self::ExactTokensForTokens => router::swapExactTokensForTokensCall::SELECTOR,
            Self::ExactTokensForTokensFeeOnTransfer => {
                router::swapExactTokensForTokensSupportingFeeOnTransferTokensCall::SELECTOR
            }
            Self::TokensForExactEth => router::swapTokensForExactETHCall::SELECTOR,
            Self::TokensForExactTokens => router::swapTokensForExactTokensCall::SELECTOR,
        }
    }

    /// Operations whose token transfers deduct a fee in the token contract
    /// itself — amounts cannot be pre-quoted and are discovered by balance
    /// differencing instead.
    pub fn is_fee_on_transfer(&self) -> bool {
        matches!(
            self,
            Self::ExactEthForTokensFeeOnTransfer
                | Self::ExactTokensForEthFeeOnTransfer
                | Self::ExactTokensForTokensFeeOnTransfer
        )
    }

    /// Operations that fix the output amount and bound the input
    /// (quoted backward via getAmountsIn).
    pub fn fixes_output(&self) -> bool {
        matches!(
            self,
            Self::EthForExactTokens | Self::TokensForExactEth | Self::TokensForExactTokens
        )
    }

    /// Operations paid in the native asset — the first path element must be
    /// the wrapped native token, and msg.value carries the input amount.
    pub fn native_in(&self) -> bool {
        matches!(
            self,
            Self::EthForExactTokens
                | Self::ExactEthForTokens
                | Self::ExactEthForTokensFeeOnTransfer
        )
    }

    /// Operations paying out the native asset — the last path element must
    /// be the wrapped native token.
    pub fn native_out(&self) -> bool {
        matches!(
            self,
            Self::ExactTokensForEth
                | Self::ExactTokensForEthFeeOnTransfer
                | Self::TokensForExactEth
        )
    }
}

/// Typed argument set shared by all nine operations. Fields absent from an
/// operation's signature stay `None`.
#[derive(Debug, Clone, Default)]
pub struct SwapArgs {
    pub amount_in: Option<U256>,
    pub amount_out_min: Option<U256>,
    pub amount_out: Option<U256>,
    pub amount_in_max: Option<U256>,
    pub path: Vec<Address>,
    pub to: Address,
    pub deadline: U256,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{function} calldata does not decode: {source}")]
    Malformed {
        function: &'static str,
        #[source]
        source: alloy::sol_types::Error,
    },
    #[error("decoded path has {0} element(s), need at least 2")]
    PathTooShort(usize),
}

/// Selector Matcher: scan the known operations in declared order and return
/// the first exact byte match. No match is the common case (most router
/// traffic is not one of the nine swaps) and costs nothing beyond the scan —
/// no allocation, no I/O.
pub fn match_selector(input: &[u8]) -> Option<SwapFunction> {
    let selector: [u8; 4] = input.get(..4)?.try_into().ok()?;
    SwapFunction::ALL.iter().copied().find(|f| f.selector() == selector)
}

/// Calldata Decoder: deserialize the full calldata (selector included)
/// through the matched operation's ABI schema.
pub fn decode_swap(function: SwapFunction, input: &[u8]) -> Result<SwapArgs, DecodeError> {
    let malformed = |source| DecodeError::Malformed {
        function: function.name(),
        source,
    };

    let args = match function {
        SwapFunction::EthForExactTokens => {
            let c = router::swapETHForExactTokensCall::abi_decode(input).map_err(malformed)?;
            SwapArgs {
                amount_out: Some(c.amountOut),
                path: c.path,
                to: c.to,
                deadline: c.deadline,
                ..Default::default()
            }
        }
        SwapFunction::ExactEthForTokens => {
            let c = router::swapExactETHForTokensCall::abi_decode(input).map_err(malformed)?;
            SwapArgs {
                amount_out_min: Some(c.amountOutMin),
                path: c.path,
                to: c.to,
                deadline: c.deadline,
                ..Default::default()
            }
        }
        SwapFunction::ExactEthForTokensFeeOnTransfer => {
            let c = router::swapExactETHForTokensSupportingFeeOnTransferTokensCall::abi_decode(
                input,
            )
            .map_err(malformed)?;
            SwapArgs {
                amount_out_min: Some(c.amountOutMin),
                path: c.path,
                to: c.to,
                deadline: c.deadline,
                ..Default::default()
            }
        }
        SwapFunction::ExactTokensForEth => {
            let c = router::swapExactTokensForETHCall::abi_decode(input).map_err(malformed)?;
            SwapArgs {
                amount_in: Some(c.amountIn),
                amount_out_min: Some(c.amountOutMin),
                path: c.path,
                to: c.to,
                deadline: c.deadline,
                ..Default::default()
            }
        }
        SwapFunction::ExactTokensForEthFeeOnTransfer => {
            let c = router::swapExactTokensForETHSupportingFeeOnTransferTokensCall::abi_decode(
                input,
            )
            .map_err(malformed)?;
            SwapArgs {
                amount_in: Some(c.amountIn),
                amount_out_min: Some(c.amountOutMin),
                path: c.path,
                to: c.to,
                deadline: c.deadline,
                ..Default::default()
            }
        }
        SwapFunction::ExactTokensForTokens => {
            let c = router::swapExactTokensForTokensCall::abi_decode(input).map_err(malformed)?;
            SwapArgs {
                amount_in: Some(c.amountIn),
                amount_out_min: Some(c.amountOutMin),
                path: c.path,
                to: c.to,
                deadline: c.deadline,
                ..Default::default()
            }
        }
        SwapFunction::ExactTokensForTokensFeeOnTransfer => {
            let c =
                router::swapExactTokensForTokensSupportingFeeOnTransferTokensCall::abi_decode(
                    input,
                )
                .map_err(malformed)?;
            SwapArgs {
                amount_in: Some(c.amountIn),
                amount_out_min: Some(c.amountOutMin),
                path: c.path,
                to: c.to,
                deadline: c.deadline,
                ..Default::default()
            }
        }
        SwapFunction::TokensForExactEth => {
            let c = router::swapTokensForExactETHCall::abi_decode(input).map_err(malformed)?;
            SwapArgs {
                amount_out: Some(c.amountOut),
                amount_in_max: Some(c.amountInMax),
                path: c.path,
                to: c.to,
                deadline: c.deadline,
                ..Default::default()
            }
        }
        SwapFunction::TokensForExactTokens => {
            let c = router::swapTokensForExactTokensCall::abi_decode(input).map_err(malformed)?;
            SwapArgs {
                amount_out: Some(c.amountOut),
                amount_in_max: Some(c.amountInMax),
                path: c.path,
                to: c.to,
                deadline: c.deadline,
                ..Default::default()
            }
        }
    };

    if args.path.len() < 2 {
        return Err(DecodeError::PathTooShort(args.path.len()));
    }

    Ok(args)
}

/// Return the 4-byte selector as a hex string for logging
pub fn selector_hex(input: &[u8]) -> String {
    if input.len() < 4 {
        return "0x????".to_string();
    }
    format!(
        "0x{:02x}{:02x}{:02x}{:02x}",
        input[0], input[1], input[2], input[3]
    )
}
