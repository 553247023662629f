// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators for attack simulation.

use serde_json::{json, Value};

/// A well-formed CSRF token.
pub const CSRF_TOKEN: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

/// Generate a pool of client addresses for testing.
pub fn generate_client_ips(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            // 10.x.x.x private range
            let a = (i >> 16) & 0xFF;
            let b = (i >> 8) & 0xFF;
            let c = i & 0xFF;
            format!("10.{a}.{b}.{c}")
        })
        .collect()
}

/// A valid submission body, varied by `index`.
pub fn valid_submission(index: usize) -> Value {
    json!({
        "name": format!("Visitor {index}"),
        "email": format!("visitor{index}@example.com"),
        "subject": format!("Project enquiry #{index}"),
        "message": "I would like to discuss a website rebuild.",
    })
}

/// Submission body carrying `payload` in every free-text field.
pub fn hostile_submission(payload: &str) -> Value {
    json!({
        "name": format!("Mallory {payload}"),
        "email": "mallory@example.com",
        "subject": format!("Hi {payload}"),
        "message": format!("Hello {payload} bye"),
    })
}

/// Script injection payloads.
pub fn xss_payloads() -> Vec<&'static str> {
    vec![
        "<script>alert('xss')</script>",
        "<SCRIPT SRC=//evil.example/x.js></SCRIPT>",
        "<script\n type=\"text/javascript\">\ndocument.cookie\n</script >",
        "<scr<script>ipt>alert(1)</script>",
        "<img src=x onerror=alert(1)>",
        "<svg/onload=alert(1)>",
        "<a href=\"javascript:alert(1)\">click</a>",
        "javascript:alert(document.domain)",
        "JaVaScRiPt :alert(1)",
        "vbscript:msgbox(1)",
        "java\u{0}script:alert(1)",
        "<body onload=steal()>",
        "\" onmouseover=\"alert(1)",
        "<iframe src=\"https://evil.example\"></iframe>",
        "<!-- comment --><b>bold</b>",
        "<div style=\"background:url(javascript:alert(1))\">",
        "<<script>script>alert(1)<</script>/script>",
        "<scri",
    ]
}

/// SQL injection payloads.
pub fn sql_payloads() -> Vec<&'static str> {
    vec![
        "'; DROP TABLE submissions; --",
        "1 UNION SELECT password FROM users",
        "admin'/* comment */--",
        "x' OR '1'='1' --",
        "SeLeCt * from secrets",
        "UN/**/ION SEL/**/ECT 1",
        "DR--OP table",
    ]
}

/// Payloads with control characters.
pub fn control_char_payloads() -> Vec<&'static str> {
    vec![
        "null\u{0}byte",
        "bell\u{7}ring",
        "escape\u{1b}[31mred",
        "delete\u{7f}char",
        "c1\u{85}\u{9b}controls",
        "line\r\nbreak\ttab",
        "backspace\u{8}\u{8}\u{8}",
    ]
}

/// Addresses the email check must reject.
pub fn invalid_emails() -> Vec<&'static str> {
    vec![
        "plainaddress",
        "@example.com",
        "user@",
        "user@example",
        "user@@example.com",
        "a..b@example.com",
        "user@example..com",
        "user @example.com",
        " user@example.com",
        "user@example.com ",
        "user@-example.com",
        "user@example.c",
        "<script>@example.com",
        "user@example.com\nBcc: victim@example.com",
    ]
}
