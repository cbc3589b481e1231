// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Alloy-backed [`ChainGateway`] over an EVM JSON-RPC endpoint.
//!
//! Every RPC future is wrapped in a bounded timeout so a stalled provider
//! surfaces as [`ChainError::Timeout`] instead of holding a user's transfer
//! flow open indefinitely.

use std::str::FromStr;
use std::time::Duration;

use alloy::{
    network::{Ethereum, EthereumWallet, TransactionBuilder},
    primitives::{Address, TxHash, U256},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use tokio::time::timeout;

use super::{ChainError, ChainGateway, KeyHandle, NetworkConfig};

/// Gas limit of a plain native transfer.
const NATIVE_TRANSFER_GAS: u64 = 21_000;

/// HTTP provider type for chain reads (with all fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// EVM gateway backed by an alloy HTTP provider.
///
/// Reads share one provider handle, immutable after construction; each
/// broadcast builds a short-lived wallet provider around the caller's key.
pub struct EvmGateway {
    /// Network configuration
    network: NetworkConfig,
    /// RPC endpoint, kept for per-send wallet providers
    rpc_url: url::Url,
    /// Alloy HTTP provider for reads
    provider: HttpProvider,
    /// Bound applied to every RPC call
    rpc_timeout: Duration,
}

impl EvmGateway {
    /// Create a gateway for the given endpoint and network profile.
    pub fn new(
        rpc_http_url: &str,
        network: NetworkConfig,
        rpc_timeout: Duration,
    ) -> Result<Self, ChainError> {
        let rpc_url: url::Url = rpc_http_url
            .parse()
            .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(rpc_url.clone());

        Ok(Self {
            network,
            rpc_url,
            provider,
            rpc_timeout,
        })
    }

    /// The configured network profile.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    fn parse_address(address: &str) -> Result<Address, ChainError> {
        Address::from_str(address).map_err(|e| ChainError::InvalidAddress(e.to_string()))
    }
}

#[async_trait]
impl ChainGateway for EvmGateway {
    async fn get_balance(&self, address: &str) -> Result<U256, ChainError> {
        let addr = Self::parse_address(address)?;
        match timeout(self.rpc_timeout, self.provider.get_balance(addr)).await {
            Ok(Ok(balance)) => Ok(balance),
            Ok(Err(e)) => Err(ChainError::Rpc(e.to_string())),
            Err(_) => Err(ChainError::Timeout(self.rpc_timeout)),
        }
    }

    async fn get_nonce(&self, address: &str) -> Result<u64, ChainError> {
        let addr = Self::parse_address(address)?;
        match timeout(self.rpc_timeout, self.provider.get_transaction_count(addr)).await {
            Ok(Ok(nonce)) => Ok(nonce),
            Ok(Err(e)) => Err(ChainError::Rpc(e.to_string())),
            Err(_) => Err(ChainError::Timeout(self.rpc_timeout)),
        }
    }

    async fn estimate_gas_price(&self) -> Result<u128, ChainError> {
        match timeout(self.rpc_timeout, self.provider.get_gas_price()).await {
            Ok(Ok(price)) => Ok(price),
            Ok(Err(e)) => Err(ChainError::Rpc(e.to_string())),
            Err(_) => Err(ChainError::Timeout(self.rpc_timeout)),
        }
    }

    async fn sign_and_broadcast(
        &self,
        to: &str,
        amount_wei: U256,
        key: &KeyHandle,
        nonce: u64,
        gas_price: u128,
    ) -> Result<String, ChainError> {
        let to_addr = Self::parse_address(to)?;

        let key_bytes =
            alloy::hex::decode(key.secret_hex()).map_err(|_| ChainError::InvalidKey)?;
        let signer =
            PrivateKeySigner::from_slice(&key_bytes).map_err(|_| ChainError::InvalidKey)?;
        let wallet = EthereumWallet::from(signer);

        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(self.rpc_url.clone());

        let tx = TransactionRequest::default()
            .with_to(to_addr)
            .with_value(amount_wei)
            .with_nonce(nonce)
            .with_gas_price(gas_price)
            .with_gas_limit(NATIVE_TRANSFER_GAS)
            .with_chain_id(self.network.chain_id);

        match timeout(self.rpc_timeout, provider.send_transaction(tx)).await {
            Ok(Ok(pending)) => Ok(format!("{:?}", pending.tx_hash())),
            Ok(Err(e)) => Err(ChainError::Broadcast(e.to_string())),
            Err(_) => Err(ChainError::Timeout(self.rpc_timeout)),
        }
    }

    async fn transaction_status(&self, tx_hash: &str) -> Result<Option<bool>, ChainError> {
        let hash: TxHash = tx_hash
            .parse()
            .map_err(|e| ChainError::Rpc(format!("invalid tx hash: {e}")))?;

        match timeout(self.rpc_timeout, self.provider.get_transaction_receipt(hash)).await {
            Ok(Ok(receipt)) => Ok(receipt.map(|r| r.status())),
            Ok(Err(e)) => Err(ChainError::Rpc(e.to_string())),
            Err(_) => Err(ChainError::Timeout(self.rpc_timeout)),
        }
    }

    fn create_account(&self) -> Result<(String, KeyHandle), ChainError> {
        let signer = PrivateKeySigner::random();
        let address = signer.address().to_checksum(None);
        let key = KeyHandle::new(alloy::hex::encode(signer.to_bytes()));
        Ok((address, key))
    }
}
