// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Abuse patterns for security testing.

/// Abuse pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of submissions to send
    pub total_requests: usize,
    /// Number of unique client identifiers to rotate through
    pub unique_identifiers: usize,
    /// Fraction of submissions that fail validation (0.0-1.0)
    pub invalid_ratio: f64,
    /// Milliseconds the clock moves forward after each submission
    pub step_ms: u64,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            unique_identifiers: 1,
            invalid_ratio: 0.0,
            step_ms: 0,
        }
    }
}

/// Expected results for an abuse pattern.
#[derive(Debug, Clone)]
pub struct AttackExpectations {
    /// Upper bound on dispatched notifications
    pub max_dispatched: usize,
    /// Minimum fraction of submissions refused
    pub min_block_rate: f64,
}

/// Predefined abuse patterns.
impl AttackConfig {
    /// One client submitting as fast as it can.
    pub fn single_client_flood() -> Self {
        Self {
            total_requests: 200,
            unique_identifiers: 1,
            ..Default::default()
        }
    }

    /// Many clients, a handful of submissions each.
    pub fn distributed_spray() -> Self {
        Self {
            total_requests: 500,
            unique_identifiers: 100,
            ..Default::default()
        }
    }

    /// One client sending junk to probe the validator.
    pub fn invalid_payload_flood() -> Self {
        Self {
            total_requests: 50,
            unique_identifiers: 1,
            invalid_ratio: 1.0,
            ..Default::default()
        }
    }

    /// One client pacing itself at one submission every 20 seconds.
    pub fn slow_drip() -> Self {
        Self {
            total_requests: 30,
            unique_identifiers: 1,
            step_ms: 20_000,
            ..Default::default()
        }
    }

    /// What a limiter admitting `max_requests` per minute should allow.
    pub fn expectations(&self, max_requests: usize) -> AttackExpectations {
        let per_identifier = self.total_requests.div_ceil(self.unique_identifiers);
        let windows = if self.step_ms == 0 {
            1
        } else {
            let span_ms = self.step_ms * self.total_requests as u64;
            (span_ms / 60_000) as usize + 1
        };
        let max_dispatched =
            (max_requests * windows).min(per_identifier) * self.unique_identifiers;

        AttackExpectations {
            max_dispatched,
            min_block_rate: 1.0 - max_dispatched as f64 / self.total_requests as f64,
        }
    }
}
