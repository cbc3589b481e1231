// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transfer draft data and state.

use std::time::{Duration, Instant};

/// The step an in-flight draft is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    /// Waiting for the user to enter an amount
    AwaitingAmount,
    /// Waiting for the recipient address
    AwaitingAddress,
    /// Waiting for the confirm/cancel decision
    AwaitingConfirmation,
}

/// Total per-user session state. `Idle` covers every terminal outcome
/// (done, failed, cancelled, expired): the draft is simply gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingAmount,
    AwaitingAddress,
    AwaitingConfirmation,
}

impl From<DraftState> for SessionState {
    fn from(state: DraftState) -> Self {
        match state {
            DraftState::AwaitingAmount => SessionState::AwaitingAmount,
            DraftState::AwaitingAddress => SessionState::AwaitingAddress,
            DraftState::AwaitingConfirmation => SessionState::AwaitingConfirmation,
        }
    }
}

/// A not-yet-broadcast transfer being assembled step by step.
#[derive(Debug, Clone)]
pub struct TransferDraft {
    /// Validated amount, set once the amount step passes.
    pub amount: Option<String>,
    /// Validated recipient, set once the address step passes.
    pub to_address: Option<String>,
    /// Current step.
    pub state: DraftState,
    /// Last user activity, for idle expiry.
    last_activity: Instant,
}

impl TransferDraft {
    pub fn new() -> Self {
        Self {
            amount: None,
            to_address: None,
            state: DraftState::AwaitingAmount,
            last_activity: Instant::now(),
        }
    }

    /// Record user activity on this draft.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// How long the draft has sat without user input.
    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }
}

impl Default for TransferDraft {
    fn default() -> Self {
        Self::new()
    }
}

/// A fully-specified transfer taken out of its slot for broadcast.
///
/// Existence of this value implies the draft passed both validation steps
/// and was confirmed; the draft itself is already gone.
#[derive(Debug, Clone)]
pub struct ConfirmedTransfer {
    pub amount: String,
    pub to_address: String,
}
