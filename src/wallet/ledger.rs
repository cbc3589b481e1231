// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Append-only per-user transfer ledger.
//!
//! Records are never deleted. Only the status field of a record may change,
//! when a pending transaction is later confirmed or fails on chain.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::StoreError;
use crate::models::UserId;

/// Transaction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Submitted but not yet confirmed
    Pending,
    /// Confirmed in a block
    Confirmed,
    /// Failed or reverted
    Failed,
}

impl Default for TxStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxStatus::Pending => write!(f, "pending"),
            TxStatus::Confirmed => write!(f, "confirmed"),
            TxStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One submitted transfer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionRecord {
    /// Transaction hash (0x prefixed)
    pub tx_hash: String,
    /// Sender address
    pub from: String,
    /// Recipient address
    pub to: String,
    /// Amount in human-readable format
    pub amount: String,
    /// Last-known status
    pub status: TxStatus,
    /// When the transfer was submitted
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Create a new pending record.
    pub fn new_pending(
        tx_hash: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            from: from.into(),
            to: to.into(),
            amount: amount.into(),
            status: TxStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// Append-only ledger keyed by user.
#[derive(Default)]
pub struct TransactionLedger {
    entries: DashMap<UserId, Vec<TransactionRecord>>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record for `user`; returns the stored record.
    pub fn record(&self, user: UserId, record: TransactionRecord) -> TransactionRecord {
        self.entries.entry(user).or_default().push(record.clone());
        record
    }

    /// The most recent `limit` records, newest first.
    pub fn history(&self, user: UserId, limit: usize) -> Vec<TransactionRecord> {
        self.entries
            .get(&user)
            .map(|records| records.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// All pending transactions across users, for status refresh.
    pub fn pending(&self) -> Vec<(UserId, String)> {
        self.entries
            .iter()
            .flat_map(|entry| {
                let user = *entry.key();
                entry
                    .value()
                    .iter()
                    .filter(|r| r.status == TxStatus::Pending)
                    .map(move |r| (user, r.tx_hash.clone()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Update only the status of an existing record.
    pub fn update_status(
        &self,
        user: UserId,
        tx_hash: &str,
        status: TxStatus,
    ) -> Result<TransactionRecord, StoreError> {
        let mut records = self
            .entries
            .get_mut(&user)
            .ok_or_else(|| StoreError::NotFound(format!("ledger for user {user}")))?;

        let record = records
            .iter_mut()
            .rev()
            .find(|r| r.tx_hash == tx_hash)
            .ok_or_else(|| StoreError::NotFound(format!("transaction {tx_hash}")))?;

        record.status = status;
        Ok(record.clone())
    }
}
