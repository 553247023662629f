// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Intake
//!
//! Backend for the contact form of a freelance portfolio site and the
//! admin inbox behind it:
//!
//! - JSON contact submissions with field, email and size validation
//! - Optional CSRF token check
//! - Per-client token bucket rate limiting (5 per minute default)
//! - Markup and injection stripping before storage
//! - Bearer-token admin listing and status triage
//! - Store errors redacted before they reach the logs

pub mod admin;
pub mod api;
pub mod config;
pub mod contact;
pub mod csrf;
pub mod email;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod models;
pub mod redact;
pub mod sanitizer;
pub mod security;
pub mod store;

pub use api::{ApiRequest, ApiResponse};
pub use config::Config;
pub use contact::{ContactError, ContactService};
pub use limiter::{RateLimitExceeded, RateLimitStatus, RateLimiter};
pub use models::{ContactSubmission, SubmissionStatus};
pub use store::{open_store, SubmissionStore};
