// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::chain::NetworkConfig;
use crate::router::CommandRouter;

/// Shared application state for the HTTP glue.
#[derive(Clone)]
pub struct AppState {
    /// The chat command router; all conversational logic lives behind it.
    pub router: Arc<CommandRouter>,
    /// Bearer token for the admin surface. `None` disables it.
    pub admin_token: Option<String>,
    /// Active network profile, for health reporting.
    pub network: NetworkConfig,
}

impl AppState {
    pub fn new(
        router: Arc<CommandRouter>,
        admin_token: Option<String>,
        network: NetworkConfig,
    ) -> Self {
        Self {
            router,
            admin_token,
            network,
        }
    }
}
