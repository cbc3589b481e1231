// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Keyword responder for free text outside a transfer flow.
//!
//! Canned replies only; anything the responder doesn't recognize gets a
//! pointer at `/help`.

use crate::models::Reply;
use crate::session::MSG_CANCELLED;

pub fn respond(text: &str) -> Reply {
    let lower = text.trim().to_lowercase();

    // Stale confirm/cancel taps arrive here once a draft is gone.
    if lower == "confirm" {
        return Reply::text("There is no transfer awaiting confirmation.");
    }
    if lower == "cancel" {
        return Reply::text(MSG_CANCELLED);
    }

    if lower.contains("hello") {
        Reply::text("Hello! How can I help you?")
    } else if lower.contains("bye") {
        Reply::text("Goodbye! Have a great day!")
    } else {
        Reply::text("I'm not sure how to respond to that. Try /help.")
    }
}
