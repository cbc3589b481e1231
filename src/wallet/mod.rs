// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-user wallet directory and transfer ledger.
//!
//! Both stores are in-memory and keyed by chat user. Persistence across
//! restarts is deliberately out of scope; a restart clears wallets and
//! history.

mod ledger;
mod store;

pub use ledger::{TransactionLedger, TransactionRecord, TxStatus};
pub use store::{Wallet, WalletStore};

use crate::chain::ChainError;

/// Errors from the wallet directory and ledger.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error(transparent)]
    Chain(#[from] ChainError),
}
