// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Redaction of internal error text before it reaches the logs.
//!
//! Store errors can carry connection strings, credentials or the submitter's
//! address. Only the first line survives, personal and secret-looking
//! fragments are replaced, and the result is capped in length.

use regex::Regex;
use std::sync::LazyLock;

/// Maximum length of a redacted message, in characters.
pub const MAX_REDACTED_CHARS: usize = 200;

static URL_CREDENTIALS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([a-z][a-z0-9+.-]*://)[^/\s@]+@").expect("invalid URL credential pattern")
});

static EMAIL_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("invalid email pattern")
});

static CARD_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\d[ -]?){12,15}\d\b").expect("invalid card number pattern")
});

static SECRET_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)password|passwd|secret|credential|token|key").expect("invalid secret pattern")
});

/// Redact an internal error message for logging.
///
/// ```
/// use contact_intake::redact::redact;
///
/// let out = redact("connect postgres://app:hunter2@db/contact failed for ada@example.com");
/// assert!(!out.contains("hunter2"));
/// assert!(!out.contains("ada@example.com"));
/// ```
pub fn redact(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or("");

    let s = URL_CREDENTIALS.replace_all(first_line, "${1}[SENSITIVE]@");
    let s = EMAIL_ADDRESS.replace_all(&s, "[EMAIL]");
    let s = CARD_NUMBER.replace_all(&s, "[CARD]");
    let s = SECRET_WORDS.replace_all(&s, "[SENSITIVE]");

    s.chars().take(MAX_REDACTED_CHARS).collect()
}
