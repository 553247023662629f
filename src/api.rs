// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Framework-neutral request and response values.
//!
//! The contact and admin services consume an [`ApiRequest`] and produce an
//! [`ApiResponse`]; the axum layer in `handlers` only converts to and from
//! these, so the request logic can be exercised without a server.

use crate::contact::INTERNAL_ERROR_MESSAGE;
use crate::security::apply_security_headers;
use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

/// An incoming request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiRequest {
    pub fn new(method: Method, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            method,
            headers,
            body: body.into(),
        }
    }

    /// A POST with a JSON body and no headers.
    pub fn post_json(body: &Value) -> Self {
        Self::new(Method::POST, HeaderMap::new(), body.to_string())
    }

    /// Add a header, ignoring names or values that are not valid HTTP.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            header::HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Header value as text, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// An outgoing response with a JSON body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl ApiResponse {
    /// JSON response carrying the security headers.
    ///
    /// A body that cannot be serialized turns the response into a 500.
    pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Self {
        let (status, body) = match serde_json::to_value(body) {
            Ok(body) => (status, body),
            Err(err) => {
                error!(error = %err, "Failed to serialize response body");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": INTERNAL_ERROR_MESSAGE }),
                )
            }
        };
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        apply_security_headers(&mut headers);
        Self {
            status,
            headers,
            body,
        }
    }

    /// `{ "error": message }` response.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::json(status, &json!({ "error": message.into() }))
    }

    pub fn with_header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The `error` field of the body, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}
