// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-user security levels.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Coarse per-user permission tier gating command access.
///
/// ## Level Policy
///
/// - `Low` - default tier; every user lands here on first contact
/// - `Medium` - may run transfer commands
/// - `High` - may run everything Medium can (reserved for operators)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    /// Default tier for newly-seen users.
    Low,
    /// Trusted tier; unlocks transfers.
    Medium,
    /// Operator tier.
    High,
}

impl SecurityLevel {
    /// Check if this level meets the required level.
    pub fn satisfies(&self, required: SecurityLevel) -> bool {
        match (self, required) {
            // Low-gated commands are open to everyone
            (_, SecurityLevel::Low) => true,
            // Medium requires Medium or High
            (SecurityLevel::Medium, SecurityLevel::Medium) => true,
            (SecurityLevel::High, SecurityLevel::Medium) => true,
            // High requires High
            (SecurityLevel::High, SecurityLevel::High) => true,
            // Everything else is denied
            _ => false,
        }
    }

    /// Parse a level from string (case-insensitive).
    /// Used by the admin surface when setting a user's level.
    pub fn from_str(s: &str) -> Option<SecurityLevel> {
        match s.to_lowercase().as_str() {
            "low" => Some(SecurityLevel::Low),
            "medium" => Some(SecurityLevel::Medium),
            "high" => Some(SecurityLevel::High),
            _ => None,
        }
    }
}

impl Default for SecurityLevel {
    /// Default level is Low (least privilege on first contact).
    fn default() -> Self {
        SecurityLevel::Low
    }
}

impl std::fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityLevel::Low => write!(f, "low"),
            SecurityLevel::Medium => write!(f, "medium"),
            SecurityLevel::High => write!(f, "high"),
        }
    }
}
