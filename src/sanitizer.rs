// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Free-text sanitization for contact form fields.
//!
//! Strips markup and script fragments, control characters and a small set
//! of SQL keywords and comment markers, then normalizes whitespace and caps
//! the length. Persistence never relies on this for query safety; it keeps
//! stored text inert when an admin view renders it.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Maximum length of a sanitized value, in characters.
pub const MAX_SANITIZED_CHARS: usize = 5000;

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("invalid script block pattern")
});

// A `<` followed by a tag-ish character, up to the next `>` or end of input.
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[a-zA-Z/!][^>]*(?:>|$)").expect("invalid tag pattern"));

static SCRIPT_PROTOCOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:java|vb)script\s*:").expect("invalid protocol pattern")
});

static EVENT_HANDLER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bon\w+\s*=").expect("invalid event handler pattern"));

// Control characters other than the whitespace ones, which are collapsed instead.
static CONTROL_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x00-\x08\x0E-\x1F\x7F-\x9F]").expect("invalid control character pattern")
});

static SQL_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:select|drop|union)\b").expect("invalid SQL keyword pattern")
});

static SQL_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--|/\*|\*/").expect("invalid SQL comment pattern"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("invalid whitespace pattern"));

/// Sanitize a free-text value.
///
/// The cleaning pass is repeated until it no longer changes the text, so
/// fragments that only line up after an inner removal are caught too and
/// `sanitize(&sanitize(s)) == sanitize(s)` holds for every input.
///
/// ```
/// use contact_intake::sanitizer::sanitize;
///
/// assert_eq!(sanitize("<p>Hello</p>  <script>x()</script>world"), "Hello world");
/// ```
pub fn sanitize(input: &str) -> String {
    let mut current = clean_once(input);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Sanitize an arbitrary JSON value.
///
/// `null` becomes the empty string, strings are sanitized as-is and every
/// other value is sanitized through its compact JSON text.
pub fn sanitize_value(input: &Value) -> String {
    match input {
        Value::Null => String::new(),
        Value::String(s) => sanitize(s),
        other => sanitize(&other.to_string()),
    }
}

fn clean_once(input: &str) -> String {
    let s = SCRIPT_BLOCK.replace_all(input, "");
    let s = HTML_TAG.replace_all(&s, "");
    let s = SCRIPT_PROTOCOL.replace_all(&s, "");
    let s = EVENT_HANDLER.replace_all(&s, "");
    let s = CONTROL_CHARS.replace_all(&s, "");
    let s = SQL_KEYWORD.replace_all(&s, "");
    let s = SQL_COMMENT.replace_all(&s, "");
    let s = WHITESPACE.replace_all(&s, " ");

    let truncated: String = s.trim().chars().take(MAX_SANITIZED_CHARS).collect();
    truncated.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_and_non_string_values() {
        assert_eq!(sanitize_value(&Value::Null), "");
        assert_eq!(sanitize_value(&json!(123)), "123");
        assert_eq!(sanitize_value(&json!(true)), "true");
        assert_eq!(sanitize_value(&json!({})), "{}");
        assert_eq!(sanitize_value(&json!(" hi ")), "hi");
    }

    #[test]
    fn test_removes_html_tags() {
        assert_eq!(sanitize("<p>Hello</p>"), "Hello");
        assert_eq!(sanitize("<div class=\"test\">Content</div>"), "Content");
        assert_eq!(sanitize("Hello <b"), "Hello");
    }

    #[test]
    fn test_keeps_lone_angle_brackets() {
        assert_eq!(sanitize("2 < 3 and 5 > 4"), "2 < 3 and 5 > 4");
    }

    #[test]
    fn test_removes_script_blocks_with_content() {
        assert_eq!(sanitize("<script>alert(\"xss\")</script>Hello"), "Hello");
        assert_eq!(sanitize("Text<script>malicious()</script>More"), "TextMore");
        assert_eq!(
            sanitize("a<SCRIPT type=\"text/javascript\">\nsteal()\n</Script >b"),
            "ab"
        );
    }

    #[test]
    fn test_removes_script_protocols() {
        assert_eq!(sanitize("javascript:alert(1)"), "alert(1)");
        assert_eq!(sanitize("Click javascript:void(0)"), "Click void(0)");
        assert_eq!(sanitize("JavaScript :x"), "x");
    }

    #[test]
    fn test_removes_event_handlers() {
        assert_eq!(sanitize("onclick=alert(1)"), "alert(1)");
        assert_eq!(sanitize("onmouseover = go()"), "go()");
        assert_eq!(sanitize("condition=ok"), "condition=ok");
    }

    #[test]
    fn test_removes_control_characters() {
        assert_eq!(sanitize("Hello\x00World"), "HelloWorld");
        assert_eq!(sanitize("Test\x1FData"), "TestData");
        assert_eq!(sanitize("Text\x7FMore"), "TextMore");
        assert_eq!(sanitize("Data\u{9F}End"), "DataEnd");
    }

    #[test]
    fn test_removes_sql_keywords_and_comments() {
        assert_eq!(sanitize("SELECT * FROM users"), "* FROM users");
        assert_eq!(sanitize("DROP TABLE students"), "TABLE students");
        assert_eq!(sanitize("1 union 2"), "1 2");
        assert_eq!(sanitize("data -- comment"), "data comment");
        assert_eq!(sanitize("prefix /* comment */ suffix"), "prefix comment suffix");
        assert_eq!(sanitize("selected dropdown"), "selected dropdown");
    }

    #[test]
    fn test_normalizes_whitespace() {
        assert_eq!(sanitize("Hello    World"), "Hello World");
        assert_eq!(sanitize("  Hello World  "), "Hello World");
        assert_eq!(sanitize("Hello\n\t\rWorld"), "Hello World");
    }

    #[test]
    fn test_limits_length() {
        let long = "a".repeat(6000);
        assert_eq!(sanitize(&long).chars().count(), MAX_SANITIZED_CHARS);

        let wide = "é".repeat(6000);
        assert_eq!(sanitize(&wide).chars().count(), MAX_SANITIZED_CHARS);
    }

    #[test]
    fn test_truncation_does_not_leave_trailing_space() {
        let input = format!("{} tail", "a".repeat(MAX_SANITIZED_CHARS - 1));
        let out = sanitize(&input);
        assert!(!out.ends_with(' '));
        assert_eq!(sanitize(&out), out);
    }

    #[test]
    fn test_preserves_safe_text() {
        assert_eq!(sanitize("Hello, World! How are you?"), "Hello, World! How are you?");
        assert_eq!(sanitize("12345-67890"), "12345-67890");
        assert_eq!(sanitize("email@domain.com"), "email@domain.com");
        assert_eq!(sanitize("Hello 世界"), "Hello 世界");
        assert_eq!(sanitize("Café ☕"), "Café ☕");
    }

    #[test]
    fn test_nested_fragments_are_removed() {
        assert_eq!(sanitize("DR--OP 1"), "1");
        assert_eq!(sanitize("<scr<script>x</script>ipt>alert(1)"), "alert(1)");
        assert_eq!(sanitize("-/**/-"), "");
    }
}
