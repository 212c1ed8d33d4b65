//! Last-resort extraction of catalog records embedded in vendor HTML.
//!
//! Tries strategies in priority order and returns the first that yields a
//! non-empty record list:
//!
//! 1. a global state assignment (`window.__INITIAL_STATE__ = {...}`,
//!    `window.appState = {...}`), searched one object level deep
//! 2. a `data-*` attribute whose value is JSON
//! 3. an inline `<script type="application/json">` block
//! 4. a bare array assignment (`const products = [...]`)
//!
//! This is best-effort scraping of markup the vendor does not document; any
//! layout change can make it return nothing.

use regex::Regex;
use serde_json::Value;

use crate::envelope::{extract_records, extract_records_nested};

/// Records found in a page together with the strategy that found them.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedRecords {
    pub strategy: &'static str,
    pub records: Vec<Value>,
}

/// Scans `html` for an embedded catalog.
#[must_use]
pub fn extract_embedded_records(html: &str) -> Option<EmbeddedRecords> {
    let strategies: [(&'static str, fn(&str) -> Option<Vec<Value>>); 4] = [
        ("state_blob", extract_state_blob),
        ("data_attribute", extract_data_attribute),
        ("json_script", extract_json_script),
        ("array_assignment", extract_array_assignment),
    ];

    for (strategy, extract) in strategies {
        if let Some(records) = extract(html).filter(|r| !r.is_empty()) {
            tracing::debug!(strategy, count = records.len(), "found embedded records");
            return Some(EmbeddedRecords { strategy, records });
        }
    }
    None
}

fn extract_state_blob(html: &str) -> Option<Vec<Value>> {
    let assign_re = Regex::new(
        r"window\s*\.\s*(?:__[A-Za-z0-9_]+__|[A-Za-z_$][\w$]*[Ss]tate)\s*=\s*",
    )
    .expect("valid regex");

    let found = assign_re.find_iter(html).find_map(|m| {
        let blob = extract_balanced_json(html[m.end()..].trim_start())?;
        let value: Value = serde_json::from_str(blob).ok()?;
        extract_records_nested(value).filter(|r| !r.is_empty())
    });
    found
}

fn extract_data_attribute(html: &str) -> Option<Vec<Value>> {
    let attr_re = Regex::new(r#"(?i)\sdata-[\w-]+\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("valid regex");

    let found = attr_re.captures_iter(html).find_map(|cap| {
        let raw = cap.get(1).or_else(|| cap.get(2))?.as_str();
        let decoded = decode_entities(raw);
        let trimmed = decoded.trim();
        if !(trimmed.starts_with('[') || trimmed.starts_with('{')) {
            return None;
        }
        let value: Value = serde_json::from_str(trimmed).ok()?;
        extract_records(value).filter(|r| !r.is_empty())
    });
    found
}

fn extract_json_script(html: &str) -> Option<Vec<Value>> {
    let script_re = Regex::new(
        r#"(?is)<script[^>]+type\s*=\s*["']application/json["'][^>]*>(.*?)</script>"#,
    )
    .expect("valid regex");

    let found = script_re.captures_iter(html).find_map(|cap| {
        let body = cap.get(1)?.as_str().trim();
        let value: Value = serde_json::from_str(body).ok()?;
        extract_records(value).filter(|r| !r.is_empty())
    });
    found
}

fn extract_array_assignment(html: &str) -> Option<Vec<Value>> {
    let assign_re =
        Regex::new(r"\b(?:var|let|const)\s+[A-Za-z_$][\w$]*\s*=\s*\[").expect("valid regex");

    let found = assign_re.find_iter(html).find_map(|m| {
        // The match ends just past the opening `[`.
        let array = extract_balanced_json(&html[m.end() - 1..])?;
        match serde_json::from_str(array).ok()? {
            Value::Array(records) if !records.is_empty() => Some(records),
            _ => None,
        }
    });
    found
}

/// Returns the shortest prefix of `s` forming one balanced JSON array or
/// object.
///
/// Tracks nesting with a stack of expected closers, respecting string
/// literals and escapes. Mismatched closers (`[42}`) and unterminated input
/// yield `None`.
pub(crate) fn extract_balanced_json(s: &str) -> Option<&str> {
    if !(s.starts_with('[') || s.starts_with('{')) {
        return None;
    }
    let mut closers: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escape = false;
    for (i, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if in_string {
            match c {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' => closers.push(']'),
            '{' => closers.push('}'),
            ']' | '}' => {
                if closers.pop() != Some(c) {
                    return None;
                }
                if closers.is_empty() {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

fn decode_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_json_stops_at_matching_closer() {
        assert_eq!(
            extract_balanced_json(r#"[{"a":"]"}, 2]; more"#),
            Some(r#"[{"a":"]"}, 2]"#)
        );
        assert_eq!(extract_balanced_json(r#"{"a":[1]} x"#), Some(r#"{"a":[1]}"#));
    }

    #[test]
    fn balanced_json_rejects_mismatch_and_unterminated() {
        assert_eq!(extract_balanced_json("[42}"), None);
        assert_eq!(extract_balanced_json("[1, 2"), None);
        assert_eq!(extract_balanced_json("x[1]"), None);
    }

    #[test]
    fn state_blob_is_found_one_level_deep() {
        let html = r#"<script>window.__INITIAL_STATE__ = {"catalog":{"products":[{"id":"1010","name":"Tesla Model Y"}]}};</script>"#;
        let found = extract_embedded_records(html).expect("records");
        assert_eq!(found.strategy, "state_blob");
        assert_eq!(found.records[0]["id"], "1010");
    }

    #[test]
    fn data_attribute_json_is_entity_decoded() {
        let html = r#"<div id="app" data-products="[{&quot;id&quot;:7,&quot;name&quot;:&quot;BMW X5&quot;}]"></div>"#;
        let found = extract_embedded_records(html).expect("records");
        assert_eq!(found.strategy, "data_attribute");
        assert_eq!(found.records[0]["name"], "BMW X5");
    }

    #[test]
    fn json_script_block_with_envelope() {
        let html = r#"<script id="catalog" type="application/json">{"items":[{"id":"a"},{"id":"b"}]}</script>"#;
        let found = extract_embedded_records(html).expect("records");
        assert_eq!(found.strategy, "json_script");
        assert_eq!(found.records.len(), 2);
    }

    #[test]
    fn bare_array_assignment_is_last_resort() {
        let html = r#"<script>const products = [{"id":"s1","name":"Mercedes S-Class"}];</script>"#;
        let found = extract_embedded_records(html).expect("records");
        assert_eq!(found.strategy, "array_assignment");
        assert_eq!(found.records[0]["id"], "s1");
    }

    #[test]
    fn higher_priority_strategy_wins() {
        let html = r#"
            <script>const products = [{"id":"from-array"}];</script>
            <script>window.__APP__ = {"products":[{"id":"from-state"}]};</script>
        "#;
        let found = extract_embedded_records(html).expect("records");
        assert_eq!(found.records[0]["id"], "from-state");
    }

    #[test]
    fn empty_arrays_and_plain_pages_yield_nothing() {
        assert!(extract_embedded_records("<html><body>Sold out</body></html>").is_none());
        assert!(extract_embedded_records("<script>var products = [];</script>").is_none());
        assert!(extract_embedded_records(r#"<div data-config='{"theme":"dark"}'></div>"#).is_none());
    }
}
