// SPDX-FileCopyrightText: 2026 Fortivault
// SPDX-License-Identifier: Apache-2.0

//! Metrics collection for abuse simulation results.

use std::collections::HashMap;

/// Possible outcomes for a simulated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Allowed,
    RateLimited,
}

/// Collects outcomes during an abuse simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    outcomes: HashMap<Outcome, usize>,
    requests_per_identifier: HashMap<String, usize>,
}

/// Aggregated view of a finished simulation.
#[derive(Debug)]
pub struct Report {
    pub total_requests: usize,
    pub allowed: usize,
    pub rate_limited: usize,
    pub block_rate: f64,
    pub unique_identifiers: usize,
}

impl AttackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request outcome.
    pub fn record(&mut self, outcome: Outcome, identifier: &str) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        *self
            .requests_per_identifier
            .entry(identifier.to_string())
            .or_insert(0) += 1;
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn report(&self) -> Report {
        let allowed = self.count(Outcome::Allowed);
        let rate_limited = self.count(Outcome::RateLimited);
        let total_requests = allowed + rate_limited;
        let block_rate = if total_requests == 0 {
            0.0
        } else {
            rate_limited as f64 / total_requests as f64
        };
        Report {
            total_requests,
            allowed,
            rate_limited,
            block_rate,
            unique_identifiers: self.requests_per_identifier.len(),
        }
    }
}
