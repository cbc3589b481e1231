// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory wallet directory: at most one custodial wallet per user.
//!
//! ## Security
//!
//! - Key material lives behind [`KeyHandle`]; `Debug` output is redacted
//! - Handles are read only by the gateway's signing path
//! - Creating over an existing wallet is rejected, never overwritten

use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use super::StoreError;
use crate::chain::{ChainGateway, KeyHandle};
use crate::models::UserId;

/// A user's custodial wallet.
#[derive(Debug, Clone)]
pub struct Wallet {
    /// Unique wallet identifier (UUID)
    pub wallet_id: String,
    /// Chat user who owns this wallet
    pub owner: UserId,
    /// Checksummed public address
    pub address: String,
    /// Opaque signing key reference (never serialized, never logged)
    pub key: KeyHandle,
    /// When the wallet was created
    pub created_at: DateTime<Utc>,
}

/// Directory of wallets keyed by owning user.
#[derive(Default)]
pub struct WalletStore {
    wallets: DashMap<UserId, Wallet>,
}

impl WalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a user has a wallet.
    pub fn exists(&self, user: UserId) -> bool {
        self.wallets.contains_key(&user)
    }

    /// Get a user's wallet.
    pub fn get(&self, user: UserId) -> Option<Wallet> {
        self.wallets.get(&user).map(|w| w.value().clone())
    }

    /// Create a wallet for `user`, generating the account via the gateway.
    ///
    /// # Returns
    /// - `Ok(Wallet)` on success
    /// - `Err(StoreError::AlreadyExists)` if the user already has one
    pub fn create(&self, user: UserId, chain: &dyn ChainGateway) -> Result<Wallet, StoreError> {
        match self.wallets.entry(user) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(format!(
                "wallet for user {user}"
            ))),
            Entry::Vacant(slot) => {
                let (address, key) = chain.create_account()?;
                let wallet = Wallet {
                    wallet_id: Uuid::new_v4().to_string(),
                    owner: user,
                    address,
                    key,
                    created_at: Utc::now(),
                };
                slot.insert(wallet.clone());
                Ok(wallet)
            }
        }
    }

    /// Native balance of the user's wallet, via the gateway.
    ///
    /// # Returns
    /// - `Err(StoreError::NotFound)` if the user has no wallet
    /// - `Err(StoreError::Chain)` if the balance query fails
    pub async fn balance_of(
        &self,
        user: UserId,
        chain: &dyn ChainGateway,
    ) -> Result<U256, StoreError> {
        let wallet = self
            .get(user)
            .ok_or_else(|| StoreError::NotFound(format!("wallet for user {user}")))?;
        Ok(chain.get_balance(&wallet.address).await?)
    }
}
