// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization: per-user security levels and the command gate.
//!
//! Every registered command names a required [`SecurityLevel`]; the
//! [`AuthorizationGate`] checks the caller against it before any handler
//! runs. There is no privilege escalation reachable from chat; levels
//! change only through the admin surface.

mod gate;
mod level;

pub use gate::AuthorizationGate;
pub use level::SecurityLevel;
