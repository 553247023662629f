// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Token bucket rate limiter keyed by client identifier.
//!
//! Buckets are created lazily on first sight of an identifier and refilled
//! lazily on each check; there is no background timer. Refill happens in
//! whole intervals: every full `interval_ms` that elapsed since the last
//! check tops the bucket up by `max_tokens`, capped at `max_tokens`.
//!
//! The refill clock is reset on every check, successful or not. Under
//! steady traffic faster than one request per interval a drained bucket
//! therefore stays drained until the client pauses for a full interval.
//!
//! The number of tracked identifiers is bounded; past the cap the
//! earliest-inserted identifier is dropped.

use crate::config::RateLimitConfig;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

/// Successful check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Tokens left in the bucket after this check
    pub remaining: u32,
}

/// The identifier has spent its allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("rate limit exceeded")]
pub struct RateLimitExceeded {
    /// Time after which a new check will see a refilled bucket, assuming
    /// no other check resets the clock in between
    pub retry_after: Duration,
}

/// Token bucket state for one identifier.
#[derive(Debug)]
struct TokenBucket {
    /// Available tokens
    tokens: u32,
    /// Last time the bucket was looked at
    last_refill: Instant,
}

impl TokenBucket {
    fn new(max_tokens: u32, now: Instant) -> Self {
        Self {
            tokens: max_tokens,
            last_refill: now,
        }
    }

    /// Add whole intervals' worth of tokens and reset the refill clock.
    fn refill(&mut self, now: Instant, interval_ms: u64, max_tokens: u32) {
        let elapsed_ms = now.saturating_duration_since(self.last_refill).as_millis();
        let intervals = if interval_ms == 0 {
            u128::from(max_tokens > 0)
        } else {
            elapsed_ms / u128::from(interval_ms)
        };
        let added = intervals.saturating_mul(u128::from(max_tokens));
        let total = (u128::from(self.tokens) + added).min(u128::from(max_tokens));

        // `total` is capped at `max_tokens`, so it fits in a u32.
        self.tokens = total as u32;
        self.last_refill = now;
    }

    /// Spend `cost` tokens if available.
    fn try_consume(&mut self, cost: u32) -> bool {
        if self.tokens < cost {
            false
        } else {
            self.tokens -= cost;
            true
        }
    }
}

/// Buckets plus their insertion order, for eviction.
#[derive(Debug, Default)]
struct BucketTable {
    buckets: HashMap<String, TokenBucket>,
    insertion_order: VecDeque<String>,
}

impl BucketTable {
    fn evict_over(&mut self, cap: usize) {
        while self.buckets.len() > cap {
            match self.insertion_order.pop_front() {
                Some(oldest) => {
                    self.buckets.remove(&oldest);
                    debug!(identifier = %oldest, "Evicted rate limit bucket");
                }
                None => break,
            }
        }
    }
}

/// Thread-safe rate limiter.
///
/// One instance is built per process and shared by handle; every check
/// holds the table lock for its whole read-modify-write.
#[derive(Debug)]
pub struct RateLimiter {
    /// Configuration
    config: RateLimitConfig,
    /// Per-identifier buckets
    table: Mutex<BucketTable>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            table: Mutex::new(BucketTable::default()),
        }
    }

    /// The configuration this limiter was built with.
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Spend `cost` tokens from `identifier`'s bucket.
    pub async fn check(
        &self,
        identifier: &str,
        cost: u32,
    ) -> Result<RateLimitStatus, RateLimitExceeded> {
        self.check_at(identifier, cost, Instant::now()).await
    }

    /// Same as [`RateLimiter::check`] with an explicit clock reading.
    pub async fn check_at(
        &self,
        identifier: &str,
        cost: u32,
        now: Instant,
    ) -> Result<RateLimitStatus, RateLimitExceeded> {
        let max_tokens = self.config.max_tokens;
        let mut table = self.table.lock().await;

        if !table.buckets.contains_key(identifier) {
            table
                .buckets
                .insert(identifier.to_string(), TokenBucket::new(max_tokens, now));
            table.insertion_order.push_back(identifier.to_string());
        }

        let outcome = match table.buckets.get_mut(identifier) {
            Some(bucket) => {
                bucket.refill(now, self.config.interval_ms, max_tokens);
                if bucket.try_consume(cost) {
                    Ok(RateLimitStatus {
                        remaining: bucket.tokens,
                    })
                } else {
                    debug!(%identifier, cost, tokens = bucket.tokens, "Rate limit exceeded");
                    Err(RateLimitExceeded {
                        retry_after: self.config.interval(),
                    })
                }
            }
            None => Ok(RateLimitStatus {
                remaining: max_tokens,
            }),
        };

        table.evict_over(self.config.max_tracked_identifiers.max(1));
        outcome
    }

    /// Number of identifiers currently tracked.
    pub async fn tracked_identifiers(&self) -> usize {
        self.table.lock().await.buckets.len()
    }
}
