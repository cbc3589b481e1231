// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chat webhook endpoint.
//!
//! The chat transport (whatever platform fronts this service) delivers one
//! `(user id, text)` event per request and relays the reply. Rendering of
//! choices as buttons is the transport's concern.

use axum::{extract::State, Json};

use crate::models::{IncomingMessage, Reply};
use crate::state::AppState;

/// Webhook handler: one inbound message, one reply.
///
/// This endpoint never fails for conversational reasons; denials,
/// validation problems and transfer failures all come back as ordinary
/// replies addressed to the user.
#[utoipa::path(
    post,
    path = "/v1/messages",
    tag = "Messages",
    request_body = IncomingMessage,
    responses(
        (status = 200, description = "Reply to relay to the user", body = Reply)
    )
)]
pub async fn post_message(
    State(state): State<AppState>,
    Json(message): Json<IncomingMessage>,
) -> Json<Reply> {
    tracing::debug!(user = %message.user_id, "inbound message");
    let reply = state.router.dispatch(&message).await;
    Json(reply)
}
