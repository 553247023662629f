// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Email address format check.

use regex::Regex;
use std::sync::LazyLock;

// local@label(.label)*.tld; local part and labels start and end alphanumeric.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9](?:[A-Za-z0-9._%+-]*[A-Za-z0-9])?@(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$",
    )
    .expect("invalid email pattern")
});

/// Check that `s` looks like a deliverable address.
///
/// The address is not normalized: surrounding whitespace is a rejection,
/// not something trimmed away.
pub fn is_valid_email(s: &str) -> bool {
    if s.is_empty() || s.trim() != s || s.contains("..") {
        return false;
    }
    EMAIL_PATTERN.is_match(s)
}
