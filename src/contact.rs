// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact form submission handling.
//!
//! A submission goes through, in order: JSON parsing, required-field
//! checks, email format, size limits, the CSRF token policy, the per-client
//! rate limit, sanitization and finally the store. The first failing step
//! decides the response. Every request that reaches the rate limit spends a
//! token, even if it later fails to persist.

use crate::api::{ApiRequest, ApiResponse};
use crate::config::ContactConfig;
use crate::csrf::{self, CsrfError};
use crate::email::is_valid_email;
use crate::limiter::{RateLimitExceeded, RateLimiter};
use crate::metrics::Metrics;
use crate::models::NewSubmission;
use crate::redact::redact;
use crate::sanitizer::sanitize_value;
use crate::store::{StoreError, SubmissionStore};
use axum::http::{header, HeaderValue, Method, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

/// Public message for any failure the caller must not see details of.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// Rate limit key used when the client address header is absent.
pub const UNKNOWN_CLIENT: &str = "unknown";

const REQUIRED_FIELDS: [&str; 4] = ["name", "email", "subject", "message"];

/// Why a submission was turned away.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid JSON payload")]
    MalformedInput,

    #[error("All fields are required")]
    MissingFields,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("{field} is too long (maximum {max} characters)")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("Message is too large (maximum {max} characters)")]
    MessageTooLarge { max: usize },

    #[error(transparent)]
    Csrf(#[from] CsrfError),

    #[error("Rate limit exceeded: too many requests, please try again later")]
    RateLimited { retry_after: Duration },

    #[error("{field} has no content left after removing markup")]
    EmptyAfterSanitization { field: &'static str },

    #[error("An internal error occurred")]
    Persistence(#[source] StoreError),
}

impl ContactError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MalformedInput
            | Self::MissingFields
            | Self::InvalidEmail
            | Self::FieldTooLong { .. }
            | Self::EmptyAfterSanitization { .. } => StatusCode::BAD_REQUEST,
            Self::MessageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Csrf(_) => StatusCode::FORBIDDEN,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metric label for this outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "method_not_allowed",
            Self::MalformedInput => "malformed",
            Self::MissingFields
            | Self::InvalidEmail
            | Self::FieldTooLong { .. }
            | Self::MessageTooLarge { .. }
            | Self::EmptyAfterSanitization { .. } => "invalid",
            Self::Csrf(_) => "csrf_rejected",
            Self::RateLimited { .. } => "rate_limited",
            Self::Persistence(_) => "store_error",
        }
    }

    /// Caller-facing response. The `Display` text never includes store
    /// error details.
    pub fn into_api_response(self) -> ApiResponse {
        let response = ApiResponse::error(self.status(), self.to_string());
        match self {
            Self::MethodNotAllowed => {
                response.with_header(header::ALLOW, HeaderValue::from_static("POST"))
            }
            Self::RateLimited { retry_after } => response.with_header(
                header::RETRY_AFTER,
                HeaderValue::from(retry_after.as_secs().max(1)),
            ),
            _ => response,
        }
    }
}

impl From<RateLimitExceeded> for ContactError {
    fn from(err: RateLimitExceeded) -> Self {
        Self::RateLimited {
            retry_after: err.retry_after,
        }
    }
}

/// Successful submission body.
#[derive(Debug, Serialize)]
pub struct ContactCreated {
    pub message: &'static str,
    pub id: u64,
}

/// Contact endpoint service.
pub struct ContactService {
    config: ContactConfig,
    limiter: Arc<RateLimiter>,
    store: Arc<dyn SubmissionStore>,
    metrics: Option<Metrics>,
}

impl ContactService {
    pub fn new(
        config: ContactConfig,
        limiter: Arc<RateLimiter>,
        store: Arc<dyn SubmissionStore>,
    ) -> Self {
        Self {
            config,
            limiter,
            store,
            metrics: None,
        }
    }

    /// Record outcomes on `metrics`.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Handle one contact form request.
    pub async fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let result = self.submit(request).await;

        if let Some(metrics) = &self.metrics {
            let outcome = match &result {
                Ok(_) => "created",
                Err(err) => err.outcome(),
            };
            metrics.record_contact(outcome);
            metrics.set_tracked_identifiers(self.limiter.tracked_identifiers().await);
        }

        match result {
            Ok(created) => ApiResponse::json(StatusCode::CREATED, &created),
            Err(err) => err.into_api_response(),
        }
    }

    /// Answer a request that was turned away before its body could be read.
    pub fn reject(&self, err: ContactError) -> ApiResponse {
        if let Some(metrics) = &self.metrics {
            metrics.record_contact(err.outcome());
        }
        err.into_api_response()
    }

    /// Run the submission pipeline, returning the typed outcome.
    pub async fn submit(&self, request: &ApiRequest) -> Result<ContactCreated, ContactError> {
        if request.method != Method::POST {
            return Err(ContactError::MethodNotAllowed);
        }

        let payload: Value =
            serde_json::from_slice(&request.body).map_err(|_| ContactError::MalformedInput)?;
        let fields = required_fields(&payload)?;

        let email = match fields.get("email") {
            Some(Value::String(email)) if is_valid_email(email) => email.clone(),
            _ => {
                info!("Rejected submission with invalid email");
                return Err(ContactError::InvalidEmail);
            }
        };

        self.check_sizes(fields)?;

        if self.config.csrf_required {
            csrf::validate_token(request.header(csrf::CSRF_HEADER)).map_err(|err| {
                info!(reason = %err, "Rejected submission failing CSRF check");
                err
            })?;
        }

        let client = client_identifier(request, &self.config.client_ip_header);
        self.limiter.check(&client, 1).await.map_err(|err| {
            info!(client = %client, "Contact submission rate limited");
            ContactError::from(err)
        })?;

        let new = NewSubmission {
            name: sanitized(fields, "name")?,
            email,
            subject: sanitized(fields, "subject")?,
            message: sanitized(fields, "message")?,
        };

        let submission = self.store.create(new).await.map_err(|err| {
            error!(message = %redact(&err.to_string()), "Contact submission error");
            ContactError::Persistence(err)
        })?;

        debug!(id = submission.id, client = %client, "Contact submission stored");
        Ok(ContactCreated {
            message: "Message sent successfully",
            id: submission.id,
        })
    }

    fn check_sizes(&self, fields: &Map<String, Value>) -> Result<(), ContactError> {
        let max = self.config.max_message_chars;
        if char_len(fields.get("message")) > max {
            return Err(ContactError::MessageTooLarge { max });
        }

        for (field, label, max) in [
            ("name", "Name", self.config.max_name_chars),
            ("subject", "Subject", self.config.max_subject_chars),
        ] {
            if char_len(fields.get(field)) > max {
                return Err(ContactError::FieldTooLong { field: label, max });
            }
        }
        Ok(())
    }
}

/// The body as an object with every required field present and non-blank.
fn required_fields(payload: &Value) -> Result<&Map<String, Value>, ContactError> {
    let fields = payload.as_object().ok_or(ContactError::MissingFields)?;
    let complete = REQUIRED_FIELDS.iter().all(|name| match fields.get(*name) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    });

    if complete {
        Ok(fields)
    } else {
        debug!("Rejected submission with missing fields");
        Err(ContactError::MissingFields)
    }
}

fn sanitized(fields: &Map<String, Value>, field: &'static str) -> Result<String, ContactError> {
    let value = fields.get(field).map(sanitize_value).unwrap_or_default();
    if value.is_empty() {
        Err(ContactError::EmptyAfterSanitization { field })
    } else {
        Ok(value)
    }
}

/// Length in characters; non-string values count their JSON text.
fn char_len(value: Option<&Value>) -> usize {
    match value {
        None => 0,
        Some(Value::String(s)) => s.chars().count(),
        Some(other) => other.to_string().chars().count(),
    }
}

/// Rate limit key: the first entry of the client address header.
pub fn client_identifier(request: &ApiRequest, header_name: &str) -> String {
    request
        .header(header_name)
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}
