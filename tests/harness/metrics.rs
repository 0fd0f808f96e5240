// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Tallies for abuse simulation results.

use form_relay::error::SubmitError;
use std::collections::HashMap;
use std::fmt;

/// How a simulated submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Dispatched,
    RateLimited,
    Invalid,
    Misconfigured,
    DispatchFailed,
}

impl Outcome {
    pub fn of<T>(result: &Result<T, SubmitError>) -> Self {
        match result {
            Ok(_) => Self::Dispatched,
            Err(SubmitError::RateLimited { .. }) => Self::RateLimited,
            Err(SubmitError::Invalid(_)) => Self::Invalid,
            Err(SubmitError::Configuration(_)) => Self::Misconfigured,
            Err(SubmitError::Dispatch(_)) => Self::DispatchFailed,
        }
    }
}

/// Collects outcomes during a simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    outcomes: HashMap<Outcome, usize>,
    per_identifier: HashMap<String, usize>,
}

impl AttackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: Outcome, identifier: &str) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        *self.per_identifier.entry(identifier.to_string()).or_insert(0) += 1;
    }

    pub fn total(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn report(&self) -> AttackReport {
        let total = self.total();
        let dispatched = self.count(Outcome::Dispatched);
        AttackReport {
            total,
            dispatched,
            rate_limited: self.count(Outcome::RateLimited),
            invalid: self.count(Outcome::Invalid),
            unique_identifiers: self.per_identifier.len(),
            block_rate: if total == 0 {
                0.0
            } else {
                1.0 - dispatched as f64 / total as f64
            },
        }
    }
}

/// Summary of a simulation run.
#[derive(Debug, Clone)]
pub struct AttackReport {
    pub total: usize,
    pub dispatched: usize,
    pub rate_limited: usize,
    pub invalid: usize,
    pub unique_identifiers: usize,
    pub block_rate: f64,
}

impl fmt::Display for AttackReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Attack Report ===")?;
        writeln!(f, "Total submissions:  {}", self.total)?;
        writeln!(f, "Dispatched:         {}", self.dispatched)?;
        writeln!(f, "Rate limited:       {}", self.rate_limited)?;
        writeln!(f, "Invalid:            {}", self.invalid)?;
        writeln!(f, "Unique identifiers: {}", self.unique_identifiers)?;
        write!(f, "Block rate:         {:.1}%", self.block_rate * 100.0)
    }
}
