// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Security response headers.

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;

/// Headers every response carries.
pub const SECURITY_HEADERS: [(header::HeaderName, &str); 3] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::CONTENT_SECURITY_POLICY, "default-src 'self'"),
];

/// Set the security headers, replacing any existing values.
pub fn apply_security_headers(headers: &mut HeaderMap) {
    for (name, value) in SECURITY_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
}

/// Response mapper for routes and rejections produced outside the handlers.
pub async fn security_headers(mut response: Response) -> Response {
    apply_security_headers(response.headers_mut());
    response
}
