// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::SecurityLevel,
    models::{Choice, IncomingMessage, Reply, UserId},
    state::AppState,
    wallet::{TransactionRecord, TxStatus},
};

pub mod admin;
pub mod health;
pub mod messages;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/messages", post(messages::post_message))
        .route("/admin/users/{user_id}/level", put(admin::set_user_level))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state)
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        messages::post_message,
        admin::set_user_level,
        health::health,
        health::liveness
    ),
    components(
        schemas(
            IncomingMessage,
            Reply,
            Choice,
            UserId,
            SecurityLevel,
            TransactionRecord,
            TxStatus,
            admin::SetLevelRequest,
            admin::UserLevelResponse,
            health::HealthResponse,
            health::LivenessResponse
        )
    ),
    tags(
        (name = "Messages", description = "Chat webhook"),
        (name = "Admin", description = "Security level administration"),
        (name = "Health", description = "Service probes")
    )
)]
struct ApiDoc;
