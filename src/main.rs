// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use transferbot::{
    api,
    chain::{ChainGateway, EvmGateway},
    config::{Config, LOG_FORMAT_ENV},
    poller::TxStatusPoller,
    router::CommandRouter,
    state::AppState,
    wallet::TransactionLedger,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let gateway = EvmGateway::new(&config.rpc_http_url, config.network, config.rpc_timeout)
        .expect("Failed to construct chain gateway");
    let chain: Arc<dyn ChainGateway> = Arc::new(gateway);

    let ledger = Arc::new(TransactionLedger::new());
    let router = Arc::new(CommandRouter::new(
        chain.clone(),
        ledger.clone(),
        config.network,
        config.draft_ttl,
    ));

    // Background refresh of pending ledger records.
    let shutdown = CancellationToken::new();
    let poller = TxStatusPoller::new(ledger, chain);
    let poller_handle = tokio::spawn(poller.run(shutdown.clone()));

    let state = AppState::new(router, config.admin_token.clone(), config.network);
    let app = api::router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!(
        %addr,
        network = config.network.name,
        chain_id = config.network.chain_id,
        bot = %config.bot_username,
        "transferbot listening (docs at /docs)"
    );

    let listener = TcpListener::bind(addr).await.expect("Failed to bind");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");

    shutdown.cancel();
    let _ = poller_handle.await;
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install ctrl-c handler");
    tracing::info!("shutdown signal received");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
