// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The chain capability consumed by the command router.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use super::ChainError;

/// Opaque reference to custodial signing key material.
///
/// Wraps the hex-encoded secret for a user's account. The secret is
/// reachable only inside this crate for signing; `Debug` redacts it so a
/// handle can never leak through logs or error chains.
#[derive(Clone)]
pub struct KeyHandle(String);

impl KeyHandle {
    pub fn new(secret_hex: impl Into<String>) -> Self {
        Self(secret_hex.into())
    }

    /// The raw hex secret, for signing only.
    pub(crate) fn secret_hex(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyHandle(<redacted>)")
    }
}

/// Abstraction over the blockchain RPC: balances, nonces, gas, signing,
/// broadcast and account generation.
///
/// The chain id is implementation configuration; callers never pass it.
/// Implementations must bound every network call with a timeout: a stalled
/// provider surfaces as [`ChainError::Timeout`], never as a hung future.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Native balance of `address`, in wei.
    async fn get_balance(&self, address: &str) -> Result<U256, ChainError>;

    /// Next transaction nonce for `address`.
    async fn get_nonce(&self, address: &str) -> Result<u64, ChainError>;

    /// Current gas price, in wei.
    async fn estimate_gas_price(&self) -> Result<u128, ChainError>;

    /// Sign a native transfer with `key` and broadcast it.
    ///
    /// Returns the transaction hash on acceptance by the RPC node.
    async fn sign_and_broadcast(
        &self,
        to: &str,
        amount_wei: U256,
        key: &KeyHandle,
        nonce: u64,
        gas_price: u128,
    ) -> Result<String, ChainError>;

    /// Look up the receipt status of a broadcast transaction.
    ///
    /// `Ok(None)` means no receipt yet (still pending); `Ok(Some(success))`
    /// reports inclusion with success or revert.
    async fn transaction_status(&self, tx_hash: &str) -> Result<Option<bool>, ChainError>;

    /// Generate a fresh account: checksummed address plus key handle.
    fn create_account(&self) -> Result<(String, KeyHandle), ChainError>;

    /// Whether `address` is a well-formed, checksum-correct address.
    fn is_valid_address(&self, address: &str) -> bool {
        is_valid_address(address)
    }
}

/// EIP-55 address validation.
///
/// Accepts `0x` + 40 hex characters when the hex is uniform-case (carrying
/// no checksum information) or when the mixed-case form matches the
/// checksum exactly.
pub fn is_valid_address(address: &str) -> bool {
    let Some(hex) = address.strip_prefix("0x") else {
        return false;
    };
    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }

    let has_lower = hex.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(address, None).is_ok()
    } else {
        true
    }
}
