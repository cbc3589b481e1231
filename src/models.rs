// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Chat-Facing Data Models
//!
//! Types exchanged between the chat transport and the command router.
//! The transport delivers `(user id, text)` pairs as [`IncomingMessage`];
//! the router answers with a [`Reply`]: plain text plus an optional set of
//! labeled [`Choice`]s the transport may render as buttons. How choices are
//! rendered (inline keyboard, quick replies, ...) is the transport's concern.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Platform-assigned chat user identifier.
///
/// Users are created lazily on first contact; there is no registration
/// endpoint. The id is whatever integer the chat platform hands us.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        UserId(value)
    }
}

/// One inbound chat event: a command or free text from a single user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IncomingMessage {
    /// The sending user.
    pub user_id: UserId,
    /// Raw message text ("/send", "0.05", "hello", ...).
    pub text: String,
}

/// A labeled choice the transport may present as a button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Choice {
    /// Text shown to the user.
    pub label: String,
    /// Text delivered back as a message when the choice is picked.
    pub data: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// Outbound reply: plain text plus optional interactive choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Reply {
    /// Message text.
    pub text: String,
    /// Labeled choices (empty for a plain text reply).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
}

impl Reply {
    /// Plain text reply without choices.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            choices: Vec::new(),
        }
    }

    /// Reply with labeled choices.
    pub fn with_choices(text: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            text: text.into(),
            choices,
        }
    }
}
