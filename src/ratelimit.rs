// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sliding-window rate limiting for chat commands.
//!
//! Every check appends the attempt to the caller's window, including
//! checks that come back denied. A user hammering commands keeps their own
//! window full and stays limited until they back off for the whole window;
//! the window drains only with time. Free-text step input inside an open
//! transfer flow is not a command and is never counted here.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::models::UserId;

/// Maximum commands per trailing window.
pub const DEFAULT_LIMIT: usize = 5;

/// Trailing window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Per-user sliding-window command counter.
#[derive(Debug)]
pub struct RateLimiter {
    windows: DashMap<UserId, VecDeque<Instant>>,
    limit: usize,
    window: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_WINDOW)
    }
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            limit,
            window,
        }
    }

    /// Record one command attempt for `user` and report whether it is
    /// allowed. The attempt counts against the window either way.
    pub fn allow(&self, user: UserId) -> bool {
        self.allow_at(user, Instant::now())
    }

    fn allow_at(&self, user: UserId, now: Instant) -> bool {
        let mut window = self.windows.entry(user).or_default();

        while window
            .front()
            .is_some_and(|t| now.duration_since(*t) >= self.window)
        {
            window.pop_front();
        }

        window.push_back(now);
        window.len() <= self.limit
    }
}
