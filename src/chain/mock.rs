// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Deterministic [`ChainGateway`] for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use alloy::primitives::U256;
use async_trait::async_trait;

use super::{ChainError, ChainGateway, KeyHandle};

/// Checksummed EIP-55 addresses handed out by `create_account`.
const TEST_ADDRESSES: &[&str] = &[
    "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
    "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
    "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
    "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
];

/// In-memory gateway with counters for broadcast assertions.
pub(crate) struct MockGateway {
    /// Balance returned for every address.
    pub balance: U256,
    /// Number of successful broadcasts.
    pub broadcasts: AtomicUsize,
    /// Number of accounts created.
    pub accounts: AtomicUsize,
    /// When set, broadcasts fail with a broadcast error.
    pub fail_broadcast: AtomicBool,
    /// When set, nonce lookups fail with a timeout.
    pub fail_nonce: AtomicBool,
    /// Artificial latency applied to each broadcast.
    pub broadcast_delay: Duration,
    /// Receipt status served to `transaction_status` (`None` = pending).
    pub tx_status: std::sync::Mutex<Option<bool>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            balance: U256::from(1_000_000_000_000_000_000u64),
            broadcasts: AtomicUsize::new(0),
            accounts: AtomicUsize::new(0),
            fail_broadcast: AtomicBool::new(false),
            fail_nonce: AtomicBool::new(false),
            broadcast_delay: Duration::ZERO,
            tx_status: std::sync::Mutex::new(None),
        }
    }
}

impl MockGateway {
    pub fn broadcast_count(&self) -> usize {
        self.broadcasts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainGateway for MockGateway {
    async fn get_balance(&self, _address: &str) -> Result<U256, ChainError> {
        Ok(self.balance)
    }

    async fn get_nonce(&self, _address: &str) -> Result<u64, ChainError> {
        if self.fail_nonce.load(Ordering::SeqCst) {
            return Err(ChainError::Timeout(Duration::from_secs(15)));
        }
        Ok(7)
    }

    async fn estimate_gas_price(&self) -> Result<u128, ChainError> {
        Ok(1_000_000_000)
    }

    async fn sign_and_broadcast(
        &self,
        _to: &str,
        _amount_wei: U256,
        _key: &KeyHandle,
        _nonce: u64,
        _gas_price: u128,
    ) -> Result<String, ChainError> {
        if !self.broadcast_delay.is_zero() {
            tokio::time::sleep(self.broadcast_delay).await;
        }
        if self.fail_broadcast.load(Ordering::SeqCst) {
            return Err(ChainError::Broadcast("mock: node rejected".to_string()));
        }
        let n = self.broadcasts.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("0x{n:064x}"))
    }

    async fn transaction_status(&self, _tx_hash: &str) -> Result<Option<bool>, ChainError> {
        Ok(*self.tx_status.lock().expect("mock tx_status poisoned"))
    }

    fn create_account(&self) -> Result<(String, KeyHandle), ChainError> {
        let n = self.accounts.fetch_add(1, Ordering::SeqCst);
        let address = TEST_ADDRESSES[n % TEST_ADDRESSES.len()].to_string();
        let key = KeyHandle::new(format!("{:064x}", n + 1));
        Ok((address, key))
    }
}
