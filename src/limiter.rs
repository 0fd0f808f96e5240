// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sliding window rate limiter for form submissions.
//!
//! Each identifier (normally the caller's IP) keeps the instants of its
//! recently admitted submissions. A submission is admitted while fewer than
//! `max_requests` of those instants fall inside the trailing window.
//! Rejected attempts are not recorded, so hammering the endpoint does not
//! extend the wait.

use crate::clock::{Clock, SystemClock};
use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Submission is admitted
    Allowed {
        /// Submissions still available in the current window
        remaining: u32,
    },
    /// Submission is rejected
    Limited {
        /// Time until the oldest admitted submission leaves the window
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Thread-safe sliding window rate limiter.
pub struct SlidingWindowLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    /// Admitted instants per identifier, ascending
    windows: RwLock<HashMap<String, Vec<Instant>>>,
}

impl SlidingWindowLimiter {
    /// Create a limiter on the system clock.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a limiter on the given clock.
    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            windows: RwLock::new(HashMap::new()),
        }
    }

    /// Check an identifier against the configured limit and window.
    pub async fn check(&self, identifier: &str) -> RateLimitResult {
        self.admit(identifier, self.config.max_requests, self.config.window())
            .await
    }

    /// Check an identifier against an explicit limit and window.
    ///
    /// The prune, count and append happen under one write lock, so two
    /// concurrent calls for the same identifier never both see the count
    /// from before the other's append.
    pub async fn admit(
        &self,
        identifier: &str,
        max_requests: u32,
        window: Duration,
    ) -> RateLimitResult {
        let mut windows = self.windows.write().await;
        let now = self.clock.now();

        let admitted = windows.entry(identifier.to_string()).or_default();
        admitted.retain(|t| now.saturating_duration_since(*t) < window);

        let count = admitted.len() as u32;
        if count >= max_requests {
            let retry_after = admitted
                .first()
                .map(|oldest| window.saturating_sub(now.saturating_duration_since(*oldest)))
                .unwrap_or(window);
            debug!(identifier, count, ?retry_after, "Rate limit exceeded");
            return RateLimitResult::Limited { retry_after };
        }

        admitted.push(now);
        RateLimitResult::Allowed {
            remaining: max_requests - count - 1,
        }
    }

    /// Drop identifiers with nothing left inside the configured window.
    ///
    /// Returns the number of identifiers removed.
    pub async fn cleanup(&self) -> usize {
        let window = self.config.window();
        let mut windows = self.windows.write().await;
        let now = self.clock.now();
        let before = windows.len();

        windows.retain(|_, admitted| {
            admitted.retain(|t| now.saturating_duration_since(*t) < window);
            !admitted.is_empty()
        });

        let removed = before - windows.len();
        if removed > 0 {
            debug!(removed, remaining = windows.len(), "Evicted idle rate limit windows");
        }
        removed
    }

    /// Number of identifiers currently tracked.
    pub async fn tracked_identifiers(&self) -> usize {
        self.windows.read().await.len()
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}
