// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM chain integration.
//!
//! The command router consumes the [`ChainGateway`] capability trait;
//! [`EvmGateway`] is its alloy-backed implementation. Everything the core
//! knows about the chain (balances, nonces, gas, signing, broadcast,
//! address validity) goes through the trait, so tests swap in a mock.

mod amount;
mod evm;
mod gateway;
mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use amount::{format_amount, parse_amount, parse_positive_amount, AmountError, NATIVE_DECIMALS};
pub use evm::EvmGateway;
pub use gateway::{is_valid_address, ChainGateway, KeyHandle};
pub use types::{ChainError, NetworkConfig, BASE_SEPOLIA, SEPOLIA};
