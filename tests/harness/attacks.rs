// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Flood patterns for security testing.

/// Flood pattern configuration.
#[derive(Debug, Clone)]
pub struct FloodConfig {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Number of distinct client addresses, used round-robin
    pub unique_clients: usize,
    /// Whether requests carry a well-formed CSRF token
    pub with_csrf_token: bool,
    /// Whether the client address header is sent at all
    pub send_client_header: bool,
}

impl Default for FloodConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            unique_clients: 1,
            with_csrf_token: true,
            send_client_header: true,
        }
    }
}

/// Predefined flood patterns.
impl FloodConfig {
    /// Single client flood.
    pub fn single_client_flood() -> Self {
        Self {
            total_requests: 200,
            unique_clients: 1,
            ..Default::default()
        }
    }

    /// Many clients, a few requests each.
    pub fn distributed_flood() -> Self {
        Self {
            total_requests: 700,
            unique_clients: 100,
            ..Default::default()
        }
    }

    /// A fresh spoofed client address on every request.
    pub fn rotating_header_flood() -> Self {
        Self {
            total_requests: 1200,
            unique_clients: 1200,
            ..Default::default()
        }
    }

    /// Requests without the address header share one bucket.
    pub fn headerless_flood() -> Self {
        Self {
            total_requests: 50,
            unique_clients: 10,
            send_client_header: false,
            ..Default::default()
        }
    }

    /// Scripted requests that skip the CSRF token.
    pub fn tokenless_flood() -> Self {
        Self {
            total_requests: 50,
            unique_clients: 5,
            with_csrf_token: false,
            ..Default::default()
        }
    }

    /// Requests expected to be accepted with `max_tokens` per client and no
    /// refill during the run.
    pub fn expected_created(&self, max_tokens: usize) -> usize {
        if !self.with_csrf_token {
            return 0;
        }
        let buckets = if self.send_client_header {
            self.unique_clients
        } else {
            1
        };
        (0..buckets)
            .map(|b| {
                let sent = self.total_requests / buckets
                    + usize::from(b < self.total_requests % buckets);
                sent.min(max_tokens)
            })
            .sum()
    }
}
