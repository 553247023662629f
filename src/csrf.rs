// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! CSRF token format policy for the contact endpoint.

use thiserror::Error;

/// Header the contact form sends its token in.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Shortest accepted token.
pub const MIN_TOKEN_LEN: usize = 32;

/// CSRF rejection reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CsrfError {
    #[error("CSRF token is required")]
    Missing,

    #[error("CSRF validation failed: invalid token")]
    Malformed,
}

/// Check a token header value against the format policy: at least
/// [`MIN_TOKEN_LEN`] characters of `[A-Za-z0-9_-]`.
pub fn validate_token(token: Option<&str>) -> Result<(), CsrfError> {
    let token = match token {
        Some(t) if !t.is_empty() => t,
        _ => return Err(CsrfError::Missing),
    };

    let well_formed = token.len() >= MIN_TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');

    if well_formed {
        Ok(())
    } else {
        Err(CsrfError::Malformed)
    }
}
