// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for the intake service.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Counters and gauges exported on the metrics endpoint.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    contact_requests: IntCounterVec,
    admin_requests: IntCounterVec,
    tracked_identifiers: IntGauge,
}

impl Metrics {
    /// Create the metric set on a fresh registry.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let contact_requests = IntCounterVec::new(
            Opts::new("contact_requests_total", "Contact form requests by outcome"),
            &["outcome"],
        )?;
        let admin_requests = IntCounterVec::new(
            Opts::new("admin_requests_total", "Admin inbox requests by outcome"),
            &["outcome"],
        )?;
        let tracked_identifiers = IntGauge::new(
            "rate_limiter_tracked_identifiers",
            "Client identifiers currently held by the rate limiter",
        )?;

        registry.register(Box::new(contact_requests.clone()))?;
        registry.register(Box::new(admin_requests.clone()))?;
        registry.register(Box::new(tracked_identifiers.clone()))?;

        Ok(Self {
            registry,
            contact_requests,
            admin_requests,
            tracked_identifiers,
        })
    }

    pub fn record_contact(&self, outcome: &str) {
        self.contact_requests.with_label_values(&[outcome]).inc();
    }

    pub fn record_admin(&self, outcome: &str) {
        self.admin_requests.with_label_values(&[outcome]).inc();
    }

    pub fn set_tracked_identifiers(&self, count: usize) {
        self.tracked_identifiers
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    pub fn contact_count(&self, outcome: &str) -> u64 {
        self.contact_requests.with_label_values(&[outcome]).get()
    }

    pub fn admin_count(&self, outcome: &str) -> u64 {
        self.admin_requests.with_label_values(&[outcome]).get()
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
