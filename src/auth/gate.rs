// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-user security-level directory and policy check.

use dashmap::DashMap;

use super::SecurityLevel;
use crate::models::UserId;

/// Looks up a user's security level and checks it against a requirement.
///
/// First contact registers the user at [`SecurityLevel::Low`]. Level
/// assignment is an administrative action ([`set_level`](Self::set_level),
/// wired to the admin HTTP surface); no chat command can change a level.
#[derive(Debug, Default)]
pub struct AuthorizationGate {
    levels: DashMap<UserId, SecurityLevel>,
}

impl AuthorizationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the user's level, registering first contact at `Low`.
    pub fn level_of(&self, user: UserId) -> SecurityLevel {
        *self.levels.entry(user).or_default()
    }

    /// Whether `user` may run something gated at `required`.
    pub fn authorize(&self, user: UserId, required: SecurityLevel) -> bool {
        self.level_of(user).satisfies(required)
    }

    /// Assign a level. This is the explicit elevation interface; it is
    /// reachable only from the admin surface, never from chat.
    pub fn set_level(&self, user: UserId, level: SecurityLevel) {
        self.levels.insert(user, level);
    }
}
