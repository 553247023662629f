// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome collection for attack simulation results.

use axum::http::StatusCode;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Collects outcomes during an attack simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    start_time: Option<Instant>,
    end_time: Option<Instant>,
    outcomes: HashMap<Outcome, usize>,
    requests_per_client: HashMap<String, usize>,
    /// Latency samples (microseconds)
    latencies: Vec<u64>,
}

/// Possible outcomes for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Created,
    RateLimited,
    CsrfRejected,
    Invalid,
    TooLarge,
    ServerError,
    Other,
}

impl Outcome {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::CREATED => Self::Created,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            StatusCode::FORBIDDEN => Self::CsrfRejected,
            StatusCode::BAD_REQUEST => Self::Invalid,
            StatusCode::PAYLOAD_TOO_LARGE => Self::TooLarge,
            s if s.is_server_error() => Self::ServerError,
            _ => Self::Other,
        }
    }
}

impl AttackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Record a request outcome.
    pub fn record(&mut self, status: StatusCode, client: &str, latency: Duration) {
        *self.outcomes.entry(Outcome::from_status(status)).or_insert(0) += 1;
        *self.requests_per_client.entry(client.to_string()).or_insert(0) += 1;
        self.latencies.push(latency.as_micros() as u64);
    }

    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn duration(&self) -> Duration {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    /// Ratio of rejected to total requests.
    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        (total - self.count(Outcome::Created)) as f64 / total as f64
    }

    pub fn p99_latency_us(&self) -> u64 {
        if self.latencies.is_empty() {
            return 0;
        }
        let mut sorted = self.latencies.clone();
        sorted.sort_unstable();
        let idx = (sorted.len() as f64 * 0.99) as usize;
        sorted[idx.min(sorted.len() - 1)]
    }

    pub fn unique_clients(&self) -> usize {
        self.requests_per_client.len()
    }

    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            total_requests: self.total_requests(),
            created: self.count(Outcome::Created),
            rate_limited: self.count(Outcome::RateLimited),
            csrf_rejected: self.count(Outcome::CsrfRejected),
            invalid: self.count(Outcome::Invalid) + self.count(Outcome::TooLarge),
            server_errors: self.count(Outcome::ServerError),
            duration_ms: self.duration().as_millis() as u64,
            block_rate: self.block_rate(),
            p99_latency_us: self.p99_latency_us(),
            unique_clients: self.unique_clients(),
        }
    }
}

/// Summary report of attack metrics.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub total_requests: usize,
    pub created: usize,
    pub rate_limited: usize,
    pub csrf_rejected: usize,
    pub invalid: usize,
    pub server_errors: usize,
    pub duration_ms: u64,
    pub block_rate: f64,
    pub p99_latency_us: u64,
    pub unique_clients: usize,
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Attack Metrics Report ===")?;
        writeln!(f, "Duration:          {} ms", self.duration_ms)?;
        writeln!(f, "Total Requests:    {}", self.total_requests)?;
        writeln!(f)?;
        writeln!(f, "--- Outcomes ---")?;
        writeln!(f, "Created:           {}", self.created)?;
        writeln!(f, "Rate Limited:      {}", self.rate_limited)?;
        writeln!(f, "CSRF Rejected:     {}", self.csrf_rejected)?;
        writeln!(f, "Invalid:           {}", self.invalid)?;
        writeln!(f, "Server Errors:     {}", self.server_errors)?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate * 100.0)?;
        writeln!(f)?;
        writeln!(f, "P99 Latency:       {} us", self.p99_latency_us)?;
        writeln!(f, "Unique Clients:    {}", self.unique_clients)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        let mut metrics = AttackMetrics::new();
        metrics.start();
        metrics.record(StatusCode::CREATED, "10.0.0.1", Duration::from_micros(100));
        metrics.record(StatusCode::CREATED, "10.0.0.2", Duration::from_micros(150));
        metrics.record(StatusCode::TOO_MANY_REQUESTS, "10.0.0.1", Duration::from_micros(50));
        metrics.finish();

        assert_eq!(metrics.total_requests(), 3);
        assert_eq!(metrics.count(Outcome::Created), 2);
        assert_eq!(metrics.count(Outcome::RateLimited), 1);
        assert_eq!(metrics.unique_clients(), 2);
        assert!((metrics.block_rate() - 1.0 / 3.0).abs() < 0.01);
    }
}
