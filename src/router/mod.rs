// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Command routing with authorization and rate-limit guards.
//!
//! ## Dispatch Order
//!
//! 1. Parse the leading token as a registered [`Command`].
//! 2. For commands: AuthorizationGate, then RateLimiter. Each denial
//!    short-circuits with its own reply and no handler runs. A denied
//!    attempt still counts against the rate window.
//! 3. For free text: the user's open transfer draft pre-empts the keyword
//!    responder. This priority is the core routing rule: while a
//!    draft is open, plain text is flow input, not chit-chat.
//!
//! Handler failures never escape [`CommandRouter::dispatch`]; they are
//! logged and converted to a generic reply, so one user's error cannot
//! disturb another user's dialogue.

mod commands;
mod responder;

pub use commands::Command;

use std::sync::Arc;
use std::time::Duration;

use crate::auth::AuthorizationGate;
use crate::chain::{
    format_amount, parse_positive_amount, ChainError, ChainGateway, NetworkConfig,
    NATIVE_DECIMALS,
};
use crate::models::{Choice, IncomingMessage, Reply, UserId};
use crate::ratelimit::RateLimiter;
use crate::session::{ConfirmedTransfer, SessionStore, StepOutcome, MSG_CANCELLED};
use crate::wallet::{StoreError, TransactionLedger, TransactionRecord, Wallet, WalletStore};

/// Denial reply when the caller's security level is too low.
pub const MSG_NOT_PERMITTED: &str = "You are not permitted to use this command.";

/// Denial reply when the caller is over their command window.
pub const MSG_RATE_LIMITED: &str = "You are sending commands too quickly. Try again in a minute.";

/// Reply when a handler failed unexpectedly.
pub const MSG_INTERNAL: &str = "Something went wrong on our side. Please try again.";

/// Reply when a transfer draft expired between messages.
pub const MSG_SESSION_EXPIRED: &str =
    "Your transfer session expired. Start again with /send.";

/// Records shown by `/history`.
const HISTORY_LIMIT: usize = 5;

/// Maps one inbound chat message to one reply, applying the guards and
/// driving the per-user transfer state machine.
pub struct CommandRouter {
    gate: AuthorizationGate,
    limiter: RateLimiter,
    sessions: SessionStore,
    wallets: WalletStore,
    ledger: Arc<TransactionLedger>,
    chain: Arc<dyn ChainGateway>,
    network: NetworkConfig,
}

impl CommandRouter {
    pub fn new(
        chain: Arc<dyn ChainGateway>,
        ledger: Arc<TransactionLedger>,
        network: NetworkConfig,
        draft_ttl: Duration,
    ) -> Self {
        Self {
            gate: AuthorizationGate::new(),
            limiter: RateLimiter::default(),
            sessions: SessionStore::new(draft_ttl),
            wallets: WalletStore::new(),
            ledger,
            chain,
            network,
        }
    }

    /// The authorization gate, for the admin surface.
    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    /// Handle one inbound message. Always produces a reply.
    pub async fn dispatch(&self, msg: &IncomingMessage) -> Reply {
        let user = msg.user_id;
        let text = msg.text.trim();

        let Some(command) = Command::parse(text) else {
            // First contact registers the user even when they only chat.
            self.gate.level_of(user);
            return self.dispatch_text(user, text).await;
        };

        if !self.gate.authorize(user, command.required_level()) {
            tracing::warn!(user = %user, command = command.name(), "command not permitted");
            return Reply::text(MSG_NOT_PERMITTED);
        }
        if !self.limiter.allow(user) {
            tracing::warn!(user = %user, command = command.name(), "rate limited");
            return Reply::text(MSG_RATE_LIMITED);
        }

        match self.handle_command(user, command).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::error!(
                    user = %user,
                    command = command.name(),
                    error = %err,
                    "command handler failed"
                );
                Reply::text(MSG_INTERNAL)
            }
        }
    }

    /// Free-text path: an open draft pre-empts the keyword responder.
    async fn dispatch_text(&self, user: UserId, text: &str) -> Reply {
        match self.sessions.apply_step(user, text, self.chain.as_ref()).await {
            StepOutcome::NotInFlow => responder::respond(text),
            StepOutcome::Expired => Reply::text(MSG_SESSION_EXPIRED),
            StepOutcome::Reply(reply) => reply,
            StepOutcome::Broadcast(transfer) => self.broadcast(user, transfer).await,
        }
    }

    async fn handle_command(&self, user: UserId, command: Command) -> Result<Reply, StoreError> {
        match command {
            Command::Start => Ok(Reply::text(
                "Hello! I'm your transfer bot. I can hold a wallet for you and \
                 send funds through a guided flow. Try /help to see what I can do.",
            )),

            Command::Help => Ok(Reply::text(
                "Here are the commands you can use:\n\
                 /start - Start the bot\n\
                 /help - This overview\n\
                 /menu - Interactive menu\n\
                 /wallet - Show or create your wallet\n\
                 /balance - Check your balance\n\
                 /history - Your recent transfers\n\
                 /send - Send funds (guided flow)\n\
                 /cancel - Abort an in-flight transfer",
            )),

            Command::Menu => Ok(Reply::with_choices(
                "What would you like to do?",
                vec![
                    Choice::new("My wallet", "/wallet"),
                    Choice::new("Balance", "/balance"),
                    Choice::new("Send funds", "/send"),
                    Choice::new("History", "/history"),
                ],
            )),

            Command::Wallet => self.handle_wallet(user),

            Command::Balance => self.handle_balance(user).await,

            Command::History => Ok(self.handle_history(user)),

            Command::Send => Ok(self.handle_send(user).await),

            Command::Cancel => {
                self.sessions.clear(user).await;
                Ok(Reply::text(MSG_CANCELLED))
            }
        }
    }

    fn handle_wallet(&self, user: UserId) -> Result<Reply, StoreError> {
        if let Some(wallet) = self.wallets.get(user) {
            return Ok(Reply::text(format!(
                "Your wallet address on {}:\n{}",
                self.network.name, wallet.address
            )));
        }

        match self.wallets.create(user, self.chain.as_ref()) {
            Ok(wallet) => {
                tracing::info!(user = %user, address = %wallet.address, "wallet created");
                Ok(Reply::text(format!(
                    "Wallet created on {}.\nAddress: {}\n\
                     Fund it before sending; I only hold the key.",
                    self.network.name, wallet.address
                )))
            }
            // Lost a creation race; the wallet exists now.
            Err(StoreError::AlreadyExists(_)) => match self.wallets.get(user) {
                Some(wallet) => Ok(Reply::text(format!(
                    "You already have a wallet:\n{}",
                    wallet.address
                ))),
                None => Err(StoreError::NotFound(format!("wallet for user {user}"))),
            },
            Err(err) => Err(err),
        }
    }

    async fn handle_balance(&self, user: UserId) -> Result<Reply, StoreError> {
        match self.wallets.balance_of(user, self.chain.as_ref()).await {
            Ok(balance) => Ok(Reply::text(format!(
                "Balance: {} {}",
                format_amount(balance, NATIVE_DECIMALS),
                self.network.symbol
            ))),
            Err(StoreError::NotFound(_)) => Ok(Reply::text(
                "You don't have a wallet yet. Use /wallet to create one.",
            )),
            Err(StoreError::Chain(err)) => {
                tracing::warn!(user = %user, error = %err, "balance query failed");
                Ok(Reply::text(format!(
                    "Couldn't fetch your balance: {}.",
                    err.user_message()
                )))
            }
            Err(err) => Err(err),
        }
    }

    fn handle_history(&self, user: UserId) -> Reply {
        let records = self.ledger.history(user, HISTORY_LIMIT);
        if records.is_empty() {
            return Reply::text("No transfers yet. Start one with /send.");
        }

        let lines: Vec<String> = records
            .iter()
            .map(|r| {
                format!(
                    "[{}] {} {} -> {}\n    {}",
                    r.status, r.amount, self.network.symbol, r.to, r.tx_hash
                )
            })
            .collect();
        Reply::text(format!("Your recent transfers:\n{}", lines.join("\n")))
    }

    async fn handle_send(&self, user: UserId) -> Reply {
        if !self.wallets.exists(user) {
            return Reply::text(
                "You need a wallet before sending. Use /wallet to create one.",
            );
        }

        let replaced = self.sessions.begin(user).await;
        let mut text = String::new();
        if replaced.is_some() {
            text.push_str("Discarded your previous transfer draft.\n");
        }
        text.push_str("How much would you like to send? Enter an amount like 0.05.");
        Reply::text(text)
    }

    /// Broadcast a confirmed transfer. The draft is already destroyed;
    /// every failure path below reports and stops. No retry.
    async fn broadcast(&self, user: UserId, transfer: ConfirmedTransfer) -> Reply {
        let Some(wallet) = self.wallets.get(user) else {
            // Wallets are never deleted, so a confirmed transfer without a
            // wallet indicates a logic error rather than user error.
            tracing::error!(user = %user, "confirmed transfer with no wallet");
            return Reply::text(MSG_INTERNAL);
        };

        let amount_wei = match parse_positive_amount(&transfer.amount, NATIVE_DECIMALS) {
            Ok(wei) => wei,
            Err(err) => {
                tracing::error!(user = %user, error = %err, "confirmed draft failed re-validation");
                return Reply::text(MSG_INTERNAL);
            }
        };

        match self.submit(&wallet, &transfer, amount_wei).await {
            Ok(tx_hash) => {
                let record = TransactionRecord::new_pending(
                    tx_hash.clone(),
                    wallet.address.clone(),
                    transfer.to_address.clone(),
                    transfer.amount.clone(),
                );
                self.ledger.record(user, record);
                tracing::info!(user = %user, tx_hash = %tx_hash, "transfer broadcast");
                Reply::text(format!(
                    "Transfer submitted.\nHash: {}\n{}",
                    tx_hash,
                    self.network.explorer_tx_url(&tx_hash)
                ))
            }
            Err(err) => {
                tracing::error!(user = %user, error = %err, "transfer failed");
                Reply::text(format!(
                    "Transfer failed: {}. The draft was discarded; start again with /send.",
                    err.user_message()
                ))
            }
        }
    }

    async fn submit(
        &self,
        wallet: &Wallet,
        transfer: &ConfirmedTransfer,
        amount_wei: alloy::primitives::U256,
    ) -> Result<String, ChainError> {
        let nonce = self.chain.get_nonce(&wallet.address).await?;
        let gas_price = self.chain.estimate_gas_price().await?;
        self.chain
            .sign_and_broadcast(
                &transfer.to_address,
                amount_wei,
                &wallet.key,
                nonce,
                gas_price,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SecurityLevel;
    use crate::chain::mock::MockGateway;
    use crate::chain::BASE_SEPOLIA;
    use crate::session::SessionState;

    const GOOD_ADDRESS: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";

    fn router() -> (Arc<CommandRouter>, Arc<MockGateway>) {
        router_with_ttl(Duration::from_secs(300))
    }

    fn router_with_ttl(ttl: Duration) -> (Arc<CommandRouter>, Arc<MockGateway>) {
        let chain = Arc::new(MockGateway::default());
        let ledger = Arc::new(TransactionLedger::new());
        let router = CommandRouter::new(chain.clone(), ledger, BASE_SEPOLIA, ttl);
        (Arc::new(router), chain)
    }

    fn msg(user: i64, text: &str) -> IncomingMessage {
        IncomingMessage {
            user_id: UserId(user),
            text: text.to_string(),
        }
    }

    /// Create a wallet and elevate the user so /send is permitted.
    async fn onboard(router: &CommandRouter, user: i64) {
        router.gate().set_level(UserId(user), SecurityLevel::Medium);
        let reply = router.dispatch(&msg(user, "/wallet")).await;
        assert!(reply.text.contains("Wallet created"), "{}", reply.text);
    }

    #[tokio::test]
    async fn full_round_trip_broadcasts_once_and_records_pending() {
        let (router, chain) = router();
        onboard(&router, 1).await;

        let reply = router.dispatch(&msg(1, "/send")).await;
        assert!(reply.text.contains("How much"));

        let reply = router.dispatch(&msg(1, "abc")).await;
        assert!(reply.text.contains("Invalid amount"));

        let reply = router.dispatch(&msg(1, "0.01")).await;
        assert!(reply.text.contains("recipient address"));

        let reply = router.dispatch(&msg(1, "not-an-address")).await;
        assert!(reply.text.contains("Invalid address"));

        let reply = router.dispatch(&msg(1, GOOD_ADDRESS)).await;
        assert!(reply.text.contains("0.01"));
        assert!(reply.text.contains(GOOD_ADDRESS));
        assert_eq!(reply.choices.len(), 2);

        let reply = router.dispatch(&msg(1, "confirm")).await;
        assert!(reply.text.contains("Transfer submitted"), "{}", reply.text);
        assert_eq!(chain.broadcast_count(), 1);

        // Exactly one pending ledger record, visible via /history.
        let history = router.ledger.history(UserId(1), 5);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, crate::wallet::TxStatus::Pending);
        assert_eq!(history[0].amount, "0.01");
        assert_eq!(history[0].to, GOOD_ADDRESS);

        assert_eq!(
            router.sessions.state_of(UserId(1)).await,
            SessionState::Idle
        );
    }

    #[tokio::test]
    async fn send_without_wallet_prompts_creation_and_makes_no_draft() {
        let (router, chain) = router();
        router.gate().set_level(UserId(2), SecurityLevel::Medium);

        let reply = router.dispatch(&msg(2, "/send")).await;
        assert!(reply.text.contains("/wallet"));
        assert_eq!(
            router.sessions.state_of(UserId(2)).await,
            SessionState::Idle
        );
        assert_eq!(chain.broadcast_count(), 0);
    }

    #[tokio::test]
    async fn send_is_denied_below_medium() {
        let (router, _) = router();

        let reply = router.dispatch(&msg(3, "/send")).await;
        assert_eq!(reply.text, MSG_NOT_PERMITTED);
    }

    #[tokio::test]
    async fn sixth_command_in_a_minute_is_rate_limited() {
        let (router, _) = router();

        for _ in 0..5 {
            let reply = router.dispatch(&msg(4, "/help")).await;
            assert_ne!(reply.text, MSG_RATE_LIMITED);
        }
        let reply = router.dispatch(&msg(4, "/help")).await;
        assert_eq!(reply.text, MSG_RATE_LIMITED);
    }

    #[tokio::test]
    async fn cancel_works_from_every_flow_state() {
        for inputs in [vec![], vec!["0.01"], vec!["0.01", GOOD_ADDRESS]] {
            let (router, chain) = router();
            onboard(&router, 5).await;
            router.dispatch(&msg(5, "/send")).await;
            for input in &inputs {
                router.dispatch(&msg(5, input)).await;
            }

            let reply = router.dispatch(&msg(5, "/cancel")).await;
            assert_eq!(reply.text, MSG_CANCELLED);
            assert_eq!(
                router.sessions.state_of(UserId(5)).await,
                SessionState::Idle
            );
            assert_eq!(chain.broadcast_count(), 0);
        }
    }

    #[tokio::test]
    async fn cancel_without_a_draft_is_idempotent() {
        let (router, chain) = router();

        let reply = router.dispatch(&msg(6, "/cancel")).await;
        assert_eq!(reply.text, MSG_CANCELLED);
        assert_eq!(
            router.sessions.state_of(UserId(6)).await,
            SessionState::Idle
        );
        assert_eq!(chain.broadcast_count(), 0);
    }

    #[tokio::test]
    async fn open_draft_preempts_the_keyword_responder() {
        let (router, _) = router();
        onboard(&router, 7).await;
        router.dispatch(&msg(7, "/send")).await;

        // "hello" is flow input now, not chit-chat.
        let reply = router.dispatch(&msg(7, "hello")).await;
        assert!(reply.text.contains("Invalid amount"));
    }

    #[tokio::test]
    async fn free_text_outside_a_flow_hits_the_responder() {
        let (router, _) = router();

        let reply = router.dispatch(&msg(8, "hello")).await;
        assert_eq!(reply.text, "Hello! How can I help you?");

        let reply = router.dispatch(&msg(8, "/frobnicate")).await;
        assert!(reply.text.contains("/help"));
    }

    #[tokio::test]
    async fn flow_steps_are_not_rate_limited() {
        let (router, _) = router();
        onboard(&router, 9).await;
        router.dispatch(&msg(9, "/send")).await;

        // Ten bad amounts in a row; every one gets a validation reply.
        for _ in 0..10 {
            let reply = router.dispatch(&msg(9, "abc")).await;
            assert!(reply.text.contains("Invalid amount"));
        }
    }

    #[tokio::test]
    async fn double_confirm_broadcasts_exactly_once() {
        let (router, chain) = router();
        onboard(&router, 10).await;
        router.dispatch(&msg(10, "/send")).await;
        router.dispatch(&msg(10, "0.02")).await;
        router.dispatch(&msg(10, GOOD_ADDRESS)).await;

        let a = {
            let router = router.clone();
            tokio::spawn(async move { router.dispatch(&msg(10, "confirm")).await })
        };
        let b = {
            let router = router.clone();
            tokio::spawn(async move { router.dispatch(&msg(10, "confirm")).await })
        };
        let (a, b) = (a.await.unwrap(), b.await.unwrap());

        assert_eq!(chain.broadcast_count(), 1);
        assert_eq!(router.ledger.history(UserId(10), 5).len(), 1);

        let submitted = [&a, &b]
            .iter()
            .filter(|r| r.text.contains("Transfer submitted"))
            .count();
        assert_eq!(submitted, 1);
    }

    #[tokio::test]
    async fn restarting_send_replaces_the_draft() {
        let (router, _) = router();
        onboard(&router, 11).await;

        router.dispatch(&msg(11, "/send")).await;
        router.dispatch(&msg(11, "0.5")).await;

        let reply = router.dispatch(&msg(11, "/send")).await;
        assert!(reply.text.contains("Discarded"));
        assert_eq!(
            router.sessions.state_of(UserId(11)).await,
            SessionState::AwaitingAmount
        );
    }

    #[tokio::test]
    async fn broadcast_failure_destroys_the_draft_without_retry() {
        let (router, chain) = router();
        onboard(&router, 12).await;
        chain
            .fail_broadcast
            .store(true, std::sync::atomic::Ordering::SeqCst);

        router.dispatch(&msg(12, "/send")).await;
        router.dispatch(&msg(12, "0.01")).await;
        router.dispatch(&msg(12, GOOD_ADDRESS)).await;
        let reply = router.dispatch(&msg(12, "confirm")).await;

        assert!(reply.text.contains("Transfer failed"), "{}", reply.text);
        // Raw node error detail is not echoed.
        assert!(!reply.text.contains("mock: node rejected"));
        assert_eq!(chain.broadcast_count(), 0);
        assert!(router.ledger.history(UserId(12), 5).is_empty());
        assert_eq!(
            router.sessions.state_of(UserId(12)).await,
            SessionState::Idle
        );
    }

    #[tokio::test]
    async fn nonce_timeout_surfaces_as_transfer_failure() {
        let (router, chain) = router();
        onboard(&router, 13).await;
        chain
            .fail_nonce
            .store(true, std::sync::atomic::Ordering::SeqCst);

        router.dispatch(&msg(13, "/send")).await;
        router.dispatch(&msg(13, "0.01")).await;
        router.dispatch(&msg(13, GOOD_ADDRESS)).await;
        let reply = router.dispatch(&msg(13, "confirm")).await;

        assert!(reply.text.contains("timed out"), "{}", reply.text);
        assert_eq!(chain.broadcast_count(), 0);
    }

    #[tokio::test]
    async fn wallet_is_created_once_then_shown() {
        let (router, chain) = router();

        let created = router.dispatch(&msg(14, "/wallet")).await;
        assert!(created.text.contains("Wallet created"));

        let shown = router.dispatch(&msg(14, "/wallet")).await;
        assert!(shown.text.contains("already have a wallet"));
        assert_eq!(chain.accounts.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn balance_without_wallet_gives_guided_prompt() {
        let (router, _) = router();
        let reply = router.dispatch(&msg(15, "/balance")).await;
        assert!(reply.text.contains("/wallet"));
    }

    #[tokio::test]
    async fn balance_reports_formatted_amount() {
        let (router, _) = router();
        router.dispatch(&msg(16, "/wallet")).await;

        let reply = router.dispatch(&msg(16, "/balance")).await;
        assert_eq!(reply.text, "Balance: 1 ETH");
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let (router, _) = router();
        let user = UserId(17);
        for i in 1..=3 {
            router.ledger.record(
                user,
                TransactionRecord::new_pending(format!("0x{i}"), "0xfrom", "0xto", "0.1"),
            );
        }

        let reply = router.dispatch(&msg(17, "/history")).await;
        let pos_3 = reply.text.find("0x3").unwrap();
        let pos_2 = reply.text.find("0x2").unwrap();
        let pos_1 = reply.text.find("0x1").unwrap();
        assert!(pos_3 < pos_2 && pos_2 < pos_1, "{}", reply.text);
    }

    #[tokio::test]
    async fn expired_draft_tells_the_user_to_restart() {
        let (router, _) = router_with_ttl(Duration::ZERO);
        onboard(&router, 18).await;
        router.dispatch(&msg(18, "/send")).await;

        let reply = router.dispatch(&msg(18, "0.01")).await;
        assert_eq!(reply.text, MSG_SESSION_EXPIRED);
        assert_eq!(
            router.sessions.state_of(UserId(18)).await,
            SessionState::Idle
        );
    }
}
