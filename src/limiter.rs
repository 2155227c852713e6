// SPDX-FileCopyrightText: 2026 Fortivault
// SPDX-License-Identifier: Apache-2.0

//! Fixed-window rate limiter for the intake endpoints.
//!
//! Counts requests per string identifier (a client IP, or a composite such
//! as `ip:email`) within non-overlapping windows. The quota travels with
//! each call, so distinct endpoints apply distinct budgets against one
//! shared limiter.
//!
//! Fixed windows admit a burst of up to twice the budget across a window
//! boundary.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Time source. Injectable so tests can cross window boundaries.
pub type Clock = Arc<dyn Fn() -> Instant + Send + Sync>;

/// Per-endpoint request budget.
#[derive(Debug, Clone, Copy)]
pub struct Quota {
    /// Window length
    pub window: Duration,
    /// Requests allowed within one window
    pub max_requests: u32,
}

impl Quota {
    pub const fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
        }
    }

    /// Hourly budget, the shape used by the submission endpoints.
    pub const fn per_hour(max_requests: u32) -> Self {
        Self::new(Duration::from_secs(3600), max_requests)
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub enum RateLimitDecision {
    /// Request is allowed
    Allowed {
        /// Remaining requests in the current window
        remaining: u32,
    },
    /// Request is rate limited
    Limited {
        /// Time until the current window rolls over
        retry_after: Duration,
    },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

#[derive(Debug)]
struct WindowEntry {
    count: u32,
    window_start: Instant,
}

/// Thread-safe fixed-window rate limiter.
pub struct RateLimiter {
    entries: Arc<RwLock<HashMap<String, WindowEntry>>>,
    clock: Clock,
}

impl RateLimiter {
    /// Create a limiter on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Instant::now))
    }

    /// Create a limiter with an explicit time source.
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Check and consume one request from `identifier`'s budget.
    ///
    /// The write lock spans the read-check-increment, so two concurrent
    /// requests for the same identifier cannot both pass a nearly-spent
    /// budget.
    pub async fn check(&self, identifier: &str, quota: Quota) -> RateLimitDecision {
        // max_requests = 0 means the endpoint is unthrottled
        if quota.max_requests == 0 {
            return RateLimitDecision::Allowed { remaining: 0 };
        }

        let now = (self.clock)();
        let mut entries = self.entries.write().await;
        let entry = entries
            .entry(identifier.to_string())
            .or_insert(WindowEntry {
                count: 0,
                window_start: now,
            });

        let elapsed = now.saturating_duration_since(entry.window_start);
        if elapsed >= quota.window {
            // Window rolled over, start fresh
            entry.count = 1;
            entry.window_start = now;
            return RateLimitDecision::Allowed {
                remaining: quota.max_requests.saturating_sub(1),
            };
        }

        if entry.count < quota.max_requests {
            entry.count += 1;
            RateLimitDecision::Allowed {
                remaining: quota.max_requests - entry.count,
            }
        } else {
            let retry_after = quota.window - elapsed;
            debug!(
                identifier,
                retry_after_secs = retry_after.as_secs(),
                "rate limit exceeded"
            );
            RateLimitDecision::Limited { retry_after }
        }
    }

    /// Boolean form of [`check`](Self::check): `true` when the request may
    /// proceed.
    pub async fn is_allowed(&self, identifier: &str, quota: Quota) -> bool {
        self.check(identifier, quota).await.is_allowed()
    }

    /// Drop entries whose window start lies further back than `max_window`.
    ///
    /// Quotas vary per identifier and the map does not record which quota
    /// created an entry, so pruning keys off the longest configured window
    /// is the safe bound; anything younger resets itself on next check.
    pub async fn cleanup(&self, max_window: Duration) {
        let now = (self.clock)();
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| now.saturating_duration_since(e.window_start) < max_window);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
