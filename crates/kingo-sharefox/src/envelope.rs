//! Unwrapping record lists from the vendor's assorted response envelopes.

use serde_json::Value;

/// Keys under which the vendor has been seen to nest record arrays.
pub const RECORD_KEYS: [&str; 5] = ["products", "data", "items", "categories", "results"];

/// Extracts the record list from a bare array or a known envelope key.
///
/// Returns `None` when the payload holds no array in a recognised place.
/// An empty array is returned as `Some(vec![])`; callers decide whether that
/// counts as usable.
#[must_use]
pub fn extract_records(payload: Value) -> Option<Vec<Value>> {
    match payload {
        Value::Array(records) => Some(records),
        Value::Object(mut map) => RECORD_KEYS.iter().find_map(|key| match map.remove(*key) {
            Some(Value::Array(records)) => Some(records),
            _ => None,
        }),
        _ => None,
    }
}

/// Like [`extract_records`], but also looks one object level down.
///
/// State blobs embedded in HTML nest the catalog under a store slice, e.g.
/// `{"catalog": {"products": [...]}}`.
#[must_use]
pub fn extract_records_nested(payload: Value) -> Option<Vec<Value>> {
    match payload {
        Value::Array(records) => Some(records),
        Value::Object(map) => {
            if let Some(records) = extract_records(Value::Object(map.clone())) {
                return Some(records);
            }
            map.into_iter()
                .filter(|(_, v)| v.is_object())
                .find_map(|(_, v)| extract_records(v))
        }
        _ => None,
    }
}
