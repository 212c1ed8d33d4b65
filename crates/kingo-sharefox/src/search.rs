//! Client-side product search.
//!
//! Used when the vendor's own search endpoint is unavailable. Matching is
//! case-insensitive substring matching; every query word must match.
//!
//! A record matches when any of these hold:
//!
//! - every word occurs in the record's searchable text (names, brand,
//!   description, category, model, year, slug, plus one level of variants)
//! - the whole normalized phrase occurs in that text
//! - every word, or the phrase, occurs in the record's full JSON text
//!
//! The searchable text includes every high-signal field (name, brand, model,
//! category, slug), so words split across those fields match in the first
//! check.
//!
//! The last check catches vendor fields this module does not know about.

use serde::Serialize;
use serde_json::Value;

/// Fields folded into the searchable text.
const TEXT_FIELDS: &[&str] = &[
    "name",
    "title",
    "product_name",
    "display_name",
    "displayName",
    "brand",
    "make",
    "manufacturer",
    "model",
    "model_name",
    "description",
    "short_description",
    "summary",
    "category",
    "category_name",
    "categoryName",
    "categories",
    "type",
    "vehicle_type",
    "tags",
    "year",
    "slug",
    "handle",
];

/// Nested lists whose entries are searched one level deep.
const VARIANT_FIELDS: &[&str] = &["variants", "variations", "options"];

/// A trimmed, lower-cased query with duplicate words removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedQuery {
    pub words: Vec<String>,
    pub phrase: String,
}

impl NormalizedQuery {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Normalizes a raw search string.
///
/// `"  Tesla  tesla MODEL "` becomes words `["tesla", "model"]` and phrase
/// `"tesla model"`.
#[must_use]
pub fn normalize_query(raw: &str) -> NormalizedQuery {
    let mut words: Vec<String> = Vec::new();
    for word in raw.to_lowercase().split_whitespace() {
        if !words.iter().any(|w| w == word) {
            words.push(word.to_string());
        }
    }
    let phrase = words.join(" ");
    NormalizedQuery { words, phrase }
}

/// Returns the records matching `raw_query`, in input order.
///
/// An empty or whitespace-only query returns every record unchanged. A
/// record that cannot be serialized to JSON cannot be inspected and is left
/// out; the filter itself never fails.
pub fn filter_records<T>(raw_query: &str, records: &[T]) -> Vec<T>
where
    T: Serialize + Clone,
{
    let query = normalize_query(raw_query);
    if query.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|record| match serde_json::to_value(record) {
            Ok(value) => matches_record(&query, &value),
            Err(e) => {
                tracing::warn!(error = %e, "skipping search record that cannot be serialized");
                false
            }
        })
        .cloned()
        .collect()
}

/// Whether one record matches an already-normalized query.
#[must_use]
pub fn matches_record(query: &NormalizedQuery, record: &Value) -> bool {
    if query.is_empty() {
        return true;
    }

    let text = searchable_text(record);
    if contains_all(&text, &query.words) || text.contains(&query.phrase) {
        return true;
    }

    // Serializing a `Value` with string keys cannot fail.
    let full = record.to_string().to_lowercase();
    contains_all(&full, &query.words) || full.contains(&query.phrase)
}

/// Lower-cased text of every searchable field, space-separated.
#[must_use]
pub fn searchable_text(record: &Value) -> String {
    let mut parts = Vec::new();
    collect_fields(record, &mut parts);

    for field in VARIANT_FIELDS {
        if let Some(Value::Array(variants)) = record.get(*field) {
            for variant in variants {
                collect_fields(variant, &mut parts);
                for key in ["value", "option", "sku"] {
                    if let Some(value) = variant.get(key) {
                        collect_text(value, &mut parts, 0);
                    }
                }
            }
        }
    }

    parts.join(" ").to_lowercase()
}

fn collect_fields(record: &Value, parts: &mut Vec<String>) {
    for field in TEXT_FIELDS {
        if let Some(value) = record.get(*field) {
            collect_text(value, parts, 1);
        }
    }
}

/// Pushes the text of strings and numbers, descending `depth` levels into
/// arrays and `{name|title|label}` objects.
fn collect_text(value: &Value, parts: &mut Vec<String>, depth: usize) {
    match value {
        Value::String(s) => parts.push(s.clone()),
        Value::Number(n) => parts.push(n.to_string()),
        Value::Array(items) if depth > 0 => {
            for item in items {
                collect_text(item, parts, depth - 1);
            }
        }
        Value::Object(_) if depth > 0 => {
            for key in ["name", "title", "label"] {
                if let Some(inner) = value.get(key) {
                    collect_text(inner, parts, depth - 1);
                }
            }
        }
        _ => {}
    }
}

fn contains_all(haystack: &str, words: &[String]) -> bool {
    words.iter().all(|word| haystack.contains(word.as_str()))
}
