// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Guided transfer sessions.
//!
//! One user has at most one in-flight [`TransferDraft`]. Every draft
//! transition runs under that user's slot lock with no I/O held across it;
//! the confirm transition removes the draft from the slot *before* the
//! broadcast RPC starts. Two racing confirms therefore resolve to a single
//! broadcast, and a cancel arriving mid-broadcast is answered immediately
//! instead of queueing behind the network call.
//!
//! "No draft" is the terminal/idle condition, but it is never expressed as
//! a missing key: [`SessionStore::state_of`] is total and reports
//! [`SessionState::Idle`].

mod draft;
mod step;

pub use draft::{ConfirmedTransfer, DraftState, SessionState, TransferDraft};
pub use step::StepOutcome;

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::chain::ChainGateway;
use crate::models::UserId;

/// Reply text for any cancellation, including cancels with nothing to do.
pub const MSG_CANCELLED: &str = "Transfer cancelled.";

/// One user's session slot. Holds the draft, if any.
#[derive(Debug, Default)]
pub struct SessionSlot {
    pub(crate) draft: Option<TransferDraft>,
}

/// Per-user transfer sessions with per-user locking.
pub struct SessionStore {
    slots: DashMap<UserId, Arc<Mutex<SessionSlot>>>,
    ttl: Duration,
}

impl SessionStore {
    /// Create a store whose drafts expire after `ttl` of inactivity.
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            ttl,
        }
    }

    fn slot(&self, user: UserId) -> Arc<Mutex<SessionSlot>> {
        self.slots.entry(user).or_default().clone()
    }

    /// Drop the draft if it has sat idle past the TTL. Returns whether an
    /// expired draft was discarded.
    fn expire(&self, slot: &mut SessionSlot) -> bool {
        match &slot.draft {
            Some(draft) if draft.idle_for() > self.ttl => {
                slot.draft = None;
                true
            }
            _ => false,
        }
    }

    /// Total session state view. Expired drafts read as `Idle`.
    pub async fn state_of(&self, user: UserId) -> SessionState {
        let slot = self.slot(user);
        let mut guard = slot.lock().await;
        self.expire(&mut guard);
        match &guard.draft {
            None => SessionState::Idle,
            Some(draft) => draft.state.into(),
        }
    }

    /// Start a fresh draft awaiting an amount. Returns the draft it
    /// replaced, if one was in flight.
    pub async fn begin(&self, user: UserId) -> Option<TransferDraft> {
        let slot = self.slot(user);
        let mut guard = slot.lock().await;
        self.expire(&mut guard);
        guard.draft.replace(TransferDraft::new())
    }

    /// Destroy any draft. Idempotent; returns whether a live draft existed.
    pub async fn clear(&self, user: UserId) -> bool {
        let slot = self.slot(user);
        let mut guard = slot.lock().await;
        if self.expire(&mut guard) {
            return false;
        }
        guard.draft.take().is_some()
    }

    /// Run one free-text step for `user` under their slot lock.
    ///
    /// Validation uses the gateway's address rules but performs no network
    /// I/O; a [`StepOutcome::Broadcast`] hands the confirmed transfer back
    /// to the caller, which broadcasts after the lock is released.
    pub async fn apply_step(
        &self,
        user: UserId,
        text: &str,
        chain: &dyn ChainGateway,
    ) -> StepOutcome {
        let slot = self.slot(user);
        let mut guard = slot.lock().await;
        if self.expire(&mut guard) {
            return StepOutcome::Expired;
        }
        if guard.draft.is_none() {
            return StepOutcome::NotInFlow;
        }
        step::transition(&mut guard, text, chain)
    }
}
