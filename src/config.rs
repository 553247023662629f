// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact intake service.
//!
//! Defaults match the limits the contact form has always shipped with:
//! five submissions per minute per client, messages up to 5000 characters.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the contact intake service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Contact endpoint configuration
    #[serde(default)]
    pub contact: ContactConfig,

    /// Submission store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Admin inbox configuration
    #[serde(default)]
    pub admin: AdminConfig,

    /// Cross-origin configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Token bucket parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Refill interval in milliseconds (default: 60000)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Bucket capacity, also the amount added per elapsed interval (default: 5)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Number of client identifiers tracked before the oldest is evicted (default: 500)
    #[serde(default = "default_max_tracked")]
    pub max_tracked_identifiers: usize,
}

/// Limits and policies applied by the contact endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
    /// Maximum message length in characters (default: 5000)
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,

    /// Maximum name length in characters (default: 100)
    #[serde(default = "default_max_name_chars")]
    pub max_name_chars: usize,

    /// Maximum subject length in characters (default: 200)
    #[serde(default = "default_max_subject_chars")]
    pub max_subject_chars: usize,

    /// Require an `x-csrf-token` header (default: true)
    #[serde(default = "default_true")]
    pub csrf_required: bool,

    /// Header carrying the client address used as rate limit key
    #[serde(default = "default_client_ip_header")]
    pub client_ip_header: String,

    /// Maximum accepted request body in bytes (default: 65536)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Where submissions are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// `memory` or a path to a JSON file (default: memory)
    #[serde(default = "default_store_location")]
    pub location: String,
}

/// Admin inbox configuration.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Bearer token for admin routes; admin routes reject everything when unset
    #[serde(default)]
    pub token: Option<String>,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Cross-origin configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to call the API; no CORS layer is installed when empty
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_interval_ms() -> u64 {
    60_000
}

fn default_max_tokens() -> u32 {
    5
}

fn default_max_tracked() -> usize {
    500
}

fn default_max_message_chars() -> usize {
    5000
}

fn default_max_name_chars() -> usize {
    100
}

fn default_max_subject_chars() -> usize {
    200
}

fn default_client_ip_header() -> String {
    "x-forwarded-for".to_string()
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_store_location() -> String {
    "memory".to_string()
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            contact: ContactConfig::default(),
            store: StoreConfig::default(),
            admin: AdminConfig::default(),
            cors: CorsConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_tokens: default_max_tokens(),
            max_tracked_identifiers: default_max_tracked(),
        }
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            max_message_chars: default_max_message_chars(),
            max_name_chars: default_max_name_chars(),
            max_subject_chars: default_max_subject_chars(),
            csrf_required: default_true(),
            client_ip_header: default_client_ip_header(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            location: default_store_location(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the refill interval
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Config {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        Config {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            rate_limit: RateLimitConfig {
                interval_ms: parse_var(&lookup, "RATE_LIMIT_INTERVAL_MS")
                    .unwrap_or(defaults.rate_limit.interval_ms),
                max_tokens: parse_var(&lookup, "RATE_LIMIT_MAX_TOKENS")
                    .unwrap_or(defaults.rate_limit.max_tokens),
                max_tracked_identifiers: parse_var(&lookup, "RATE_LIMIT_MAX_TRACKED")
                    .unwrap_or(defaults.rate_limit.max_tracked_identifiers),
            },
            contact: ContactConfig {
                max_message_chars: parse_var(&lookup, "MAX_MESSAGE_CHARS")
                    .unwrap_or(defaults.contact.max_message_chars),
                csrf_required: parse_var(&lookup, "CSRF_REQUIRED")
                    .unwrap_or(defaults.contact.csrf_required),
                client_ip_header: lookup("CLIENT_IP_HEADER")
                    .map(|h| h.trim().to_ascii_lowercase())
                    .filter(|h| !h.is_empty())
                    .unwrap_or(defaults.contact.client_ip_header),
                max_body_bytes: parse_var(&lookup, "MAX_BODY_BYTES")
                    .unwrap_or(defaults.contact.max_body_bytes),
                ..defaults.contact
            },
            store: StoreConfig {
                location: lookup("STORE_LOCATION").unwrap_or(defaults.store.location),
            },
            admin: AdminConfig {
                token: lookup("ADMIN_TOKEN").filter(|t| !t.trim().is_empty()),
            },
            cors: CorsConfig {
                allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                    .map(|v| {
                        v.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            metrics: MetricsConfig {
                enabled: parse_var(&lookup, "METRICS_ENABLED")
                    .unwrap_or(defaults.metrics.enabled),
                ..defaults.metrics
            },
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}
