// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup. Missing
//! required variables are reported in aggregate and are startup-fatal;
//! nothing inside the core re-reads the environment afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `RPC_HTTP_URL` | EVM JSON-RPC endpoint | Required |
//! | `CHAIN` | Chain profile (`base-sepolia` or `sepolia`) | `base-sepolia` |
//! | `BOT_TOKEN` | Chat-platform bot token (held for the transport) | Required |
//! | `BOT_USERNAME` | Bot mention name (held for the transport) | Required |
//! | `ADMIN_TOKEN` | Bearer token enabling the admin surface | Unset (disabled) |
//! | `RPC_TIMEOUT_SECS` | Bound on every chain RPC call | `15` |
//! | `DRAFT_TTL_SECS` | Idle transfer-session expiry | `300` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::time::Duration;

use crate::chain::NetworkConfig;

/// Environment variable name for the EVM JSON-RPC endpoint.
pub const RPC_HTTP_URL_ENV: &str = "RPC_HTTP_URL";
/// Environment variable name for the chain profile.
pub const CHAIN_ENV: &str = "CHAIN";
/// Environment variable name for the chat-platform bot token.
pub const BOT_TOKEN_ENV: &str = "BOT_TOKEN";
/// Environment variable name for the bot mention name.
pub const BOT_USERNAME_ENV: &str = "BOT_USERNAME";
/// Environment variable name for the admin bearer token.
pub const ADMIN_TOKEN_ENV: &str = "ADMIN_TOKEN";
/// Environment variable name for the chain RPC timeout (seconds).
pub const RPC_TIMEOUT_SECS_ENV: &str = "RPC_TIMEOUT_SECS";
/// Environment variable name for the transfer-session idle expiry (seconds).
pub const DRAFT_TTL_SECS_ENV: &str = "DRAFT_TTL_SECS";
/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";
/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";
/// Environment variable name for the logging format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default bound on every chain RPC call.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(15);
/// Default idle expiry for an in-flight transfer draft.
pub const DEFAULT_DRAFT_TTL: Duration = Duration::from_secs(300);

/// Validated startup configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// EVM JSON-RPC endpoint.
    pub rpc_http_url: String,
    /// Selected chain profile.
    pub network: NetworkConfig,
    /// Chat-platform bot token. The core never reads it; the transport does.
    pub bot_token: String,
    /// Bot mention name, for the transport's group-mention filtering.
    pub bot_username: String,
    /// Bearer token for the admin surface. `None` disables it.
    pub admin_token: Option<String>,
    /// Bound applied to every chain RPC call.
    pub rpc_timeout: Duration,
    /// Idle expiry for in-flight transfer drafts.
    pub draft_ttl: Duration,
    /// Server bind address.
    pub host: String,
    /// Server bind port.
    pub port: u16,
}

/// Errors raised while loading configuration. All are startup-fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variables: {0}")]
    MissingVars(String),

    #[error("unsupported chain `{0}` (expected `base-sepolia` or `sepolia`)")]
    UnknownChain(String),

    #[error("invalid value `{value}` for {var}")]
    InvalidValue { var: &'static str, value: String },
}

impl Config {
    /// Load and validate configuration from the environment.
    ///
    /// Required variables are checked together so a broken deployment
    /// reports every missing name at once instead of one per restart.
    pub fn from_env() -> Result<Self, ConfigError> {
        let rpc_http_url = env::var(RPC_HTTP_URL_ENV).ok();
        let bot_token = env::var(BOT_TOKEN_ENV).ok();
        let bot_username = env::var(BOT_USERNAME_ENV).ok();

        let mut missing = Vec::new();
        if rpc_http_url.is_none() {
            missing.push(RPC_HTTP_URL_ENV);
        }
        if bot_token.is_none() {
            missing.push(BOT_TOKEN_ENV);
        }
        if bot_username.is_none() {
            missing.push(BOT_USERNAME_ENV);
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingVars(missing.join(", ")));
        }

        let chain_name = env::var(CHAIN_ENV).unwrap_or_else(|_| "base-sepolia".to_string());
        let network = NetworkConfig::from_name(&chain_name)
            .ok_or(ConfigError::UnknownChain(chain_name))?;

        let rpc_timeout = duration_var(RPC_TIMEOUT_SECS_ENV, DEFAULT_RPC_TIMEOUT)?;
        let draft_ttl = duration_var(DRAFT_TTL_SECS_ENV, DEFAULT_DRAFT_TTL)?;

        let host = env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match env::var(PORT_ENV) {
            Ok(raw) => parse_var(PORT_ENV, &raw)?,
            Err(_) => 8080,
        };

        Ok(Self {
            rpc_http_url: rpc_http_url.unwrap_or_default(),
            network,
            bot_token: bot_token.unwrap_or_default(),
            bot_username: bot_username.unwrap_or_default(),
            admin_token: env::var(ADMIN_TOKEN_ENV).ok().filter(|t| !t.is_empty()),
            rpc_timeout,
            draft_ttl,
            host,
            port,
        })
    }
}

/// Read an optional duration variable given in whole seconds.
fn duration_var(var: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match env::var(var) {
        Ok(raw) => {
            let secs: u64 = parse_var(var, &raw)?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(default),
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: raw.to_string(),
    })
}
