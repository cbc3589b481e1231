// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin surface: explicit security-level elevation.
//!
//! Chat exposes no privilege escalation; the only way a user's level
//! changes is an operator calling this endpoint. The surface is enabled by
//! configuring `ADMIN_TOKEN` and authenticated with that bearer token.

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::SecurityLevel;
use crate::error::ApiError;
use crate::models::UserId;
use crate::state::AppState;

/// Request to assign a user's security level.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetLevelRequest {
    /// The level to assign.
    pub level: SecurityLevel,
}

/// A user's assigned security level.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserLevelResponse {
    /// The user whose level was set.
    pub user_id: UserId,
    /// The level now in effect.
    pub level: SecurityLevel,
}

/// Assign a security level to a user.
#[utoipa::path(
    put,
    path = "/v1/admin/users/{user_id}/level",
    tag = "Admin",
    params(("user_id" = i64, Path, description = "Chat user id")),
    request_body = SetLevelRequest,
    responses(
        (status = 200, description = "Level assigned", body = UserLevelResponse),
        (status = 401, description = "Missing or invalid admin token"),
        (status = 403, description = "Admin surface disabled")
    )
)]
pub async fn set_user_level(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    headers: HeaderMap,
    Json(request): Json<SetLevelRequest>,
) -> Result<Json<UserLevelResponse>, ApiError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Err(ApiError::forbidden(
            "Admin surface is disabled (no ADMIN_TOKEN configured)",
        ));
    };

    let token =
        bearer_token(&headers).ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;
    if token != expected {
        return Err(ApiError::unauthorized("Invalid admin token"));
    }

    let user = UserId(user_id);
    state.router.gate().set_level(user, request.level);
    tracing::info!(user = %user, level = %request.level, "security level assigned");

    Ok(Json(UserLevelResponse {
        user_id: user,
        level: request.level,
    }))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}
