// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The step transition of the transfer state machine.
//!
//! Pure with respect to I/O: transitions run synchronously under the
//! owner's slot lock and only validate, mutate the draft, or take it out
//! for broadcast. The caller performs the actual chain calls afterwards.

use super::draft::{ConfirmedTransfer, DraftState};
use super::{SessionSlot, MSG_CANCELLED};
use crate::chain::{parse_positive_amount, ChainGateway, NATIVE_DECIMALS};
use crate::models::{Choice, Reply};

/// Result of feeding one free-text input to a user's session.
#[derive(Debug)]
pub enum StepOutcome {
    /// The user has no draft; input belongs to the generic responder.
    NotInFlow,
    /// The draft sat idle past its TTL and was discarded.
    Expired,
    /// The flow consumed the input and produced a reply.
    Reply(Reply),
    /// The user confirmed; broadcast this transfer (the draft is gone).
    Broadcast(ConfirmedTransfer),
}

/// Confirmation summary presented with confirm/cancel choices.
fn confirmation_reply(amount: &str, to_address: &str) -> Reply {
    Reply::with_choices(
        format!("Send {amount} ETH to {to_address}?"),
        vec![
            Choice::new("Confirm", "confirm"),
            Choice::new("Cancel", "cancel"),
        ],
    )
}

/// Advance the draft in `slot` by one user input.
///
/// The caller has verified a draft exists. `chain` is used only for its
/// synchronous address validation rule.
pub(super) fn transition(slot: &mut SessionSlot, text: &str, chain: &dyn ChainGateway) -> StepOutcome {
    let input = text.trim();

    // A bare "cancel" ends the flow from any step, same as /cancel.
    if input.eq_ignore_ascii_case("cancel") {
        slot.draft = None;
        return StepOutcome::Reply(Reply::text(MSG_CANCELLED));
    }

    let Some(draft) = slot.draft.as_mut() else {
        return StepOutcome::NotInFlow;
    };
    draft.touch();

    match draft.state {
        DraftState::AwaitingAmount => match parse_positive_amount(input, NATIVE_DECIMALS) {
            Ok(_) => {
                draft.amount = Some(input.to_string());
                draft.state = DraftState::AwaitingAddress;
                StepOutcome::Reply(Reply::text(
                    "Got it. Now enter the recipient address (0x...).",
                ))
            }
            Err(err) => StepOutcome::Reply(Reply::text(format!(
                "Invalid amount: {err}. Enter a positive number like 0.05."
            ))),
        },

        DraftState::AwaitingAddress => {
            if chain.is_valid_address(input) {
                draft.to_address = Some(input.to_string());
                draft.state = DraftState::AwaitingConfirmation;
                let amount = draft.amount.clone().unwrap_or_default();
                StepOutcome::Reply(confirmation_reply(&amount, input))
            } else {
                StepOutcome::Reply(Reply::text(
                    "Invalid address. Enter a checksummed address like 0x1a2B... (42 characters).",
                ))
            }
        }

        DraftState::AwaitingConfirmation => {
            if input.eq_ignore_ascii_case("confirm") {
                match (draft.amount.clone(), draft.to_address.clone()) {
                    (Some(amount), Some(to_address)) => {
                        slot.draft = None;
                        StepOutcome::Broadcast(ConfirmedTransfer { amount, to_address })
                    }
                    // A confirmation-stage draft always carries both fields;
                    // drop it rather than broadcast a partial transfer.
                    _ => {
                        slot.draft = None;
                        StepOutcome::Reply(Reply::text(MSG_CANCELLED))
                    }
                }
            } else {
                let amount = draft.amount.clone().unwrap_or_default();
                let to_address = draft.to_address.clone().unwrap_or_default();
                StepOutcome::Reply(confirmation_reply(&amount, &to_address))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::MockGateway;
    use crate::session::TransferDraft;

    const GOOD_ADDRESS: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

    fn slot_with_draft() -> SessionSlot {
        SessionSlot {
            draft: Some(TransferDraft::new()),
        }
    }

    #[test]
    fn amount_step_validates_and_advances() {
        let chain = MockGateway::default();
        let mut slot = slot_with_draft();

        let outcome = transition(&mut slot, "abc", &chain);
        let StepOutcome::Reply(reply) = outcome else {
            panic!("expected reply");
        };
        assert!(reply.text.contains("Invalid amount"));
        assert_eq!(
            slot.draft.as_ref().unwrap().state,
            DraftState::AwaitingAmount
        );

        transition(&mut slot, " 0.01 ", &chain);
        let draft = slot.draft.as_ref().unwrap();
        assert_eq!(draft.state, DraftState::AwaitingAddress);
        assert_eq!(draft.amount.as_deref(), Some("0.01"));
    }

    #[test]
    fn zero_amount_is_rejected() {
        let chain = MockGateway::default();
        let mut slot = slot_with_draft();

        let StepOutcome::Reply(reply) = transition(&mut slot, "0", &chain) else {
            panic!("expected reply");
        };
        assert!(reply.text.contains("Invalid amount"));
    }

    #[test]
    fn address_step_validates_and_presents_summary() {
        let chain = MockGateway::default();
        let mut slot = slot_with_draft();
        transition(&mut slot, "0.01", &chain);

        let StepOutcome::Reply(reply) = transition(&mut slot, "not-an-address", &chain) else {
            panic!("expected reply");
        };
        assert!(reply.text.contains("Invalid address"));

        let StepOutcome::Reply(reply) = transition(&mut slot, GOOD_ADDRESS, &chain) else {
            panic!("expected reply");
        };
        assert!(reply.text.contains("0.01"));
        assert!(reply.text.contains(GOOD_ADDRESS));
        let labels: Vec<&str> = reply.choices.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Confirm", "Cancel"]);
    }

    #[test]
    fn confirm_takes_the_draft() {
        let chain = MockGateway::default();
        let mut slot = slot_with_draft();
        transition(&mut slot, "0.01", &chain);
        transition(&mut slot, GOOD_ADDRESS, &chain);

        let outcome = transition(&mut slot, "CONFIRM", &chain);
        let StepOutcome::Broadcast(transfer) = outcome else {
            panic!("expected broadcast");
        };
        assert_eq!(transfer.amount, "0.01");
        assert_eq!(transfer.to_address, GOOD_ADDRESS);
        assert!(slot.draft.is_none());
    }

    #[test]
    fn unexpected_text_at_confirmation_reprompts() {
        let chain = MockGateway::default();
        let mut slot = slot_with_draft();
        transition(&mut slot, "0.01", &chain);
        transition(&mut slot, GOOD_ADDRESS, &chain);

        let StepOutcome::Reply(reply) = transition(&mut slot, "maybe", &chain) else {
            panic!("expected reply");
        };
        assert!(!reply.choices.is_empty());
        assert!(slot.draft.is_some());
    }

    #[test]
    fn cancel_clears_from_every_step() {
        let chain = MockGateway::default();

        for inputs in [vec![], vec!["0.01"], vec!["0.01", GOOD_ADDRESS]] {
            let mut slot = slot_with_draft();
            for input in inputs {
                transition(&mut slot, input, &chain);
            }
            let StepOutcome::Reply(reply) = transition(&mut slot, "Cancel", &chain) else {
                panic!("expected reply");
            };
            assert_eq!(reply.text, MSG_CANCELLED);
            assert!(slot.draft.is_none());
        }
    }
}
