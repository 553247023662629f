// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers and router for the contact intake service.
//!
//! The handlers here only translate between axum and the
//! [`ApiRequest`]/[`ApiResponse`] values the services work on.

use crate::admin::{AdminError, AdminService, BearerTokenAuth};
use crate::api::{ApiRequest, ApiResponse};
use crate::config::{Config, CorsConfig};
use crate::contact::{ContactError, ContactService};
use crate::limiter::RateLimiter;
use crate::metrics::Metrics;
use crate::security::security_headers;
use crate::store::SubmissionStore;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get, patch},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// Shared application state.
pub struct AppState {
    pub contact: ContactService,
    pub admin: AdminService,
    pub metrics: Option<Metrics>,
    pub config: Config,
}

impl AppState {
    /// Wire the services for `config` on top of `store`.
    pub fn new(config: Config, store: Arc<dyn SubmissionStore>) -> prometheus::Result<Self> {
        let limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
        let auth = Arc::new(BearerTokenAuth::new(config.admin.token.clone()));

        let mut contact = ContactService::new(config.contact.clone(), limiter, store.clone());
        let mut admin = AdminService::new(store, auth);

        let metrics = if config.metrics.enabled {
            let metrics = Metrics::new()?;
            contact = contact.with_metrics(metrics.clone());
            admin = admin.with_metrics(metrics.clone());
            Some(metrics)
        } else {
            None
        };

        Ok(Self {
            contact,
            admin,
            metrics,
            config,
        })
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, Json(self.body)).into_response()
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let config = &state.config;

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/contact", any(contact))
        .route("/api/contact", any(contact))
        .route("/admin/submissions", get(list_submissions))
        .route("/api/admin/submissions", get(list_submissions))
        .route("/admin/submissions/:id", patch(update_submission))
        .route("/api/admin/submissions/:id", patch(update_submission));

    if state.metrics.is_some() {
        app = app.route(&config.metrics.path, get(metrics));
    }

    let mut app = app.layer(DefaultBodyLimit::max(config.contact.max_body_bytes));

    // Inside the header mapper so preflight answers carry the headers too.
    if let Some(cors) = cors_layer(&config.cors) {
        app = app.layer(cors);
    }

    app.layer(middleware::map_response(security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS layer for the configured origins, if any are usable.
fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PATCH])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                HeaderName::from_static(crate::csrf::CSRF_HEADER),
            ]),
    )
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contact-intake",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Contact form endpoint. Any method is routed here so the service can
/// answer non-POST requests itself.
pub async fn contact(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResponse {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            info!(status = %rejection.status(), "Rejected unreadable contact body");
            let err = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ContactError::MessageTooLarge {
                    max: state.config.contact.max_message_chars,
                }
            } else {
                ContactError::MalformedInput
            };
            return state.contact.reject(err);
        }
    };

    debug!(method = %method, bytes = body.len(), "Processing contact request");
    let request = ApiRequest::new(method, headers, body);
    state.contact.handle(&request).await
}

pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResponse {
    let request = ApiRequest::new(Method::GET, headers, Bytes::new());
    state.admin.handle_list(&request).await
}

pub async fn update_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResponse {
    let body = match body {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return state.admin.reject(AdminError::BodyTooLarge);
        }
        Err(_) => return state.admin.reject(AdminError::MalformedInput),
    };
    let request = ApiRequest::new(Method::PATCH, headers, body);
    state.admin.handle_update(&request, &id).await
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    let Some(metrics) = &state.metrics else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match metrics.render() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
