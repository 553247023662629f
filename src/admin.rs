// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Admin inbox: list submissions and update their triage status.

use crate::api::{ApiRequest, ApiResponse};
use crate::metrics::Metrics;
use crate::models::{ContactSubmission, SubmissionStatus};
use crate::redact::redact;
use crate::store::{StoreError, SubmissionStore};
use axum::http::{header, HeaderMap, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Decides whether a request may use the admin routes.
pub trait AdminAuth: Send + Sync {
    fn is_authenticated(&self, headers: &HeaderMap) -> bool;
}

/// `Authorization: Bearer <token>` against a configured secret.
///
/// With no secret configured nothing is authenticated.
#[derive(Clone)]
pub struct BearerTokenAuth {
    token: Option<String>,
}

impl BearerTokenAuth {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

impl std::fmt::Debug for BearerTokenAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerTokenAuth")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AdminAuth for BearerTokenAuth {
    fn is_authenticated(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.token.as_deref() else {
            return false;
        };
        let provided = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        match provided {
            Some(provided) => constant_time_token_eq(provided, expected),
            None => false,
        }
    }
}

/// Constant-time comparison. The work done depends only on the expected
/// length, never on the provided token's length or contents.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    let padded: Vec<u8> = (0..expected.len())
        .map(|i| provided.get(i).copied().unwrap_or(0))
        .collect();
    let same_len = (provided.len() as u64).ct_eq(&(expected.len() as u64));
    (padded.as_slice().ct_eq(expected) & same_len).into()
}

/// Admin request failures.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid ID")]
    InvalidId,

    #[error("Invalid JSON payload")]
    MalformedInput,

    #[error("Invalid status")]
    InvalidStatus,

    #[error("Submission not found")]
    NotFound,

    #[error("Request body is too large")]
    BodyTooLarge,

    #[error("An internal error occurred")]
    Store(#[source] StoreError),
}

impl AdminError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidId | Self::MalformedInput | Self::InvalidStatus => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn outcome(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::InvalidId
            | Self::MalformedInput
            | Self::InvalidStatus
            | Self::BodyTooLarge => "invalid",
            Self::NotFound => "not_found",
            Self::Store(_) => "store_error",
        }
    }

    pub fn into_api_response(self) -> ApiResponse {
        ApiResponse::error(self.status(), self.to_string())
    }
}

impl From<StoreError> for AdminError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::NotFound,
            other => {
                error!(message = %redact(&other.to_string()), "Admin inbox store error");
                Self::Store(other)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusUpdate {
    status: serde_json::Value,
}

/// Admin inbox service.
pub struct AdminService {
    store: Arc<dyn SubmissionStore>,
    auth: Arc<dyn AdminAuth>,
    metrics: Option<Metrics>,
}

impl AdminService {
    pub fn new(store: Arc<dyn SubmissionStore>, auth: Arc<dyn AdminAuth>) -> Self {
        Self {
            store,
            auth,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// `GET /admin/submissions`
    pub async fn handle_list(&self, request: &ApiRequest) -> ApiResponse {
        let result = self.list(request).await;
        self.respond(result, "listed")
    }

    /// `PATCH /admin/submissions/{id}`
    pub async fn handle_update(&self, request: &ApiRequest, id: &str) -> ApiResponse {
        let result = self.update_status(request, id).await;
        self.respond(result, "updated")
    }

    /// Answer a request that was turned away before its body could be read.
    pub fn reject(&self, err: AdminError) -> ApiResponse {
        self.respond(Err::<(), _>(err), "rejected")
    }

    /// All submissions, newest first.
    pub async fn list(&self, request: &ApiRequest) -> Result<Vec<ContactSubmission>, AdminError> {
        self.authorize(request)?;
        let submissions = self.store.list().await?;
        debug!(count = submissions.len(), "Listed submissions");
        Ok(submissions)
    }

    /// Set the status of submission `id` from a `{ "status": ... }` body.
    pub async fn update_status(
        &self,
        request: &ApiRequest,
        id: &str,
    ) -> Result<ContactSubmission, AdminError> {
        self.authorize(request)?;

        let id: u64 = id.trim().parse().map_err(|_| AdminError::InvalidId)?;
        if id == 0 {
            return Err(AdminError::InvalidId);
        }

        let update: StatusUpdate =
            serde_json::from_slice(&request.body).map_err(|_| AdminError::MalformedInput)?;
        let status: SubmissionStatus = update
            .status
            .as_str()
            .and_then(|s| s.parse().ok())
            .ok_or(AdminError::InvalidStatus)?;

        let updated = self.store.update_status(id, status).await?;
        info!(id, status = %status, "Submission status updated");
        Ok(updated)
    }

    fn authorize(&self, request: &ApiRequest) -> Result<(), AdminError> {
        if self.auth.is_authenticated(&request.headers) {
            Ok(())
        } else {
            warn!("Rejected unauthenticated admin request");
            Err(AdminError::Unauthorized)
        }
    }

    fn respond<T: serde::Serialize>(
        &self,
        result: Result<T, AdminError>,
        success: &'static str,
    ) -> ApiResponse {
        if let Some(metrics) = &self.metrics {
            metrics.record_admin(match &result {
                Ok(_) => success,
                Err(err) => err.outcome(),
            });
        }
        match result {
            Ok(body) => ApiResponse::json(StatusCode::OK, &body),
            Err(err) => err.into_api_response(),
        }
    }
}
