// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Transaction Status Poller
//!
//! Background task that periodically refreshes the status of pending ledger
//! records from chain receipts. Broadcast replies always report `pending`;
//! this poller is what later flips records to `confirmed` or `failed` so
//! `/history` reflects reality without any user-triggered refresh.
//!
//! ## Strategy
//!
//! Every `poll_interval` (default 30 s) the poller:
//! 1. Lists all pending records across users.
//! 2. Queries the gateway for each receipt.
//! 3. Updates the record status when a receipt exists; records without a
//!    receipt stay pending for the next sweep.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::chain::ChainGateway;
use crate::wallet::{TransactionLedger, TxStatus};

/// Default interval between polling sweeps.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Background poller refreshing pending transaction statuses.
pub struct TxStatusPoller {
    ledger: Arc<TransactionLedger>,
    chain: Arc<dyn ChainGateway>,
    poll_interval: Duration,
}

impl TxStatusPoller {
    /// Create a new poller over the shared ledger and gateway.
    pub fn new(ledger: Arc<TransactionLedger>, chain: Arc<dyn ChainGateway>) -> Self {
        Self {
            ledger,
            chain,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Run the poller loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(poller.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "Transaction status poller starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Transaction status poller shutting down");
                return;
            }

            self.poll_step().await;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Transaction status poller shutting down");
                    return;
                }
            }
        }
    }

    /// Execute one polling sweep over all pending records.
    async fn poll_step(&self) {
        let pending = self.ledger.pending();
        if pending.is_empty() {
            return;
        }

        for (user, tx_hash) in pending {
            match self.chain.transaction_status(&tx_hash).await {
                Ok(Some(success)) => {
                    let status = if success {
                        TxStatus::Confirmed
                    } else {
                        TxStatus::Failed
                    };
                    match self.ledger.update_status(user, &tx_hash, status) {
                        Ok(record) => info!(
                            user = %user,
                            tx_hash = %record.tx_hash,
                            status = %record.status,
                            "Refreshed transaction status"
                        ),
                        Err(e) => warn!(
                            user = %user,
                            tx_hash = %tx_hash,
                            error = %e,
                            "Failed to update ledger record"
                        ),
                    }
                }
                // No receipt yet; check again next sweep.
                Ok(None) => {}
                Err(e) => warn!(
                    user = %user,
                    tx_hash = %tx_hash,
                    error = %e,
                    "Receipt lookup failed"
                ),
            }
        }
    }
}
