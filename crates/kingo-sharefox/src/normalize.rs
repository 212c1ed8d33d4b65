//! Normalization from raw vendor records to [`kingo_core::CatalogItem`] and
//! [`kingo_core::Category`].
//!
//! Vendor payloads are untyped and their field names drift between API
//! versions, so every canonical field is read from an ordered list of
//! aliases and falls back to a placeholder. Normalization never fails and is
//! idempotent: a serialized [`CatalogItem`] normalizes back to itself.

use kingo_core::{
    generate_slug, resolve_slug, CatalogItem, Category, SlugMap, PLACEHOLDER_CATEGORY_NAME,
    PLACEHOLDER_DISPLAY_NAME,
};
use serde_json::Value;
use sha2::{Digest, Sha256};

const ID_FIELDS: &[&str] = &["id", "product_id", "productId", "uuid", "item_id", "sku"];
const NAME_FIELDS: &[&str] = &[
    "name",
    "title",
    "product_name",
    "display_name",
    "displayName",
];
const IMAGE_FIELDS: &[&str] = &[
    "image_url",
    "imageUrl",
    "image",
    "thumbnail",
    "photo",
    "picture",
    "images",
    "photos",
];
/// Checked only when the record has no `vendor_product_id` key at all.
const VENDOR_ID_FIELDS: &[&str] = &[
    "vendorProductId",
    "sharefox_id",
    "sharefoxId",
    "product_id",
    "productId",
    "id",
];
const SLUG_FIELDS: &[&str] = &["slug", "handle", "url_slug"];
const CATEGORY_FIELDS: &[&str] = &[
    "category",
    "category_name",
    "categoryName",
    "type",
    "vehicle_type",
    "categories",
];
const BRAND_FIELDS: &[&str] = &["brand", "make", "manufacturer"];
const MODEL_FIELDS: &[&str] = &["model", "model_name"];
const PRICE_FIELDS: &[&str] = &["price", "daily_price", "price_per_day", "dailyPrice"];

const CATEGORY_ID_FIELDS: &[&str] = &["id", "category_id", "categoryId", "slug"];
const CATEGORY_NAME_FIELDS: &[&str] = &["name", "title", "display_name", "displayName", "label"];

/// Normalizes one vendor record into a [`CatalogItem`].
#[must_use]
pub fn normalize_item(record: &Value, slug_map: &SlugMap) -> CatalogItem {
    let id = first_text(record, ID_FIELDS).unwrap_or_else(|| synthesize_id("item", record));
    let name = first_text(record, NAME_FIELDS);

    let vendor_product_id = match record.get("vendor_product_id") {
        Some(value) => scalar_text(value),
        None => first_text(record, VENDOR_ID_FIELDS),
    };

    let slug = resolve_slug(
        first_text(record, SLUG_FIELDS).as_deref(),
        vendor_product_id.as_deref().unwrap_or(&id),
        name.as_deref(),
        slug_map,
    );

    CatalogItem {
        display_name: name.unwrap_or_else(|| PLACEHOLDER_DISPLAY_NAME.to_string()),
        image_url: first_image(record, IMAGE_FIELDS),
        vendor_product_id,
        slug: Some(slug),
        category: category_label(record),
        brand: first_label(record, BRAND_FIELDS),
        model: first_text(record, MODEL_FIELDS),
        price: first_text(record, PRICE_FIELDS),
        id,
    }
}

/// Normalizes a record from the categories endpoint into a [`Category`].
#[must_use]
pub fn normalize_category(record: &Value) -> Category {
    // Some shops return categories as a plain list of names.
    if let Some(name) = scalar_text(record) {
        return category_from_name(&name);
    }

    let name = first_text(record, CATEGORY_NAME_FIELDS);
    let id = first_text(record, CATEGORY_ID_FIELDS)
        .or_else(|| name.as_deref().map(generate_slug).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| synthesize_id("category", record));

    Category {
        id,
        display_name: name.unwrap_or_else(|| PLACEHOLDER_CATEGORY_NAME.to_string()),
        image_url: first_image(record, IMAGE_FIELDS),
    }
}

/// Builds a category whose id is derived from its name.
pub(crate) fn category_from_name(name: &str) -> Category {
    let slug = generate_slug(name);
    Category {
        id: if slug.is_empty() {
            synthesize_id("category", &Value::String(name.to_string()))
        } else {
            slug
        },
        display_name: name.to_string(),
        image_url: None,
    }
}

/// Raw category/type label of an item record.
///
/// Accepts a string, an object with a name, or a list whose first element
/// is either.
#[must_use]
pub fn category_label(record: &Value) -> Option<String> {
    first_label(record, CATEGORY_FIELDS)
}

/// Stable placeholder id derived from the record's canonical JSON text.
fn synthesize_id(prefix: &str, record: &Value) -> String {
    let digest = Sha256::digest(record.to_string().as_bytes());
    let hex: String = digest.iter().take(8).map(|b| format!("{b:02x}")).collect();
    format!("{prefix}-{hex}")
}

/// Renders a string or number as trimmed, non-empty text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_text(record: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|field| record.get(*field).and_then(scalar_text))
}

/// Like [`first_text`], but also unwraps `{name: ..}` objects and lists.
fn first_label(record: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|field| record.get(*field).and_then(label_text))
}

fn label_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items.first().and_then(label_text),
        Value::Object(_) => first_text(value, &["name", "title", "label"]),
        other => scalar_text(other),
    }
}

fn first_image(record: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|field| record.get(*field).and_then(image_text))
}

fn image_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Array(items) => items.iter().find_map(image_text),
        Value::Object(_) => ["src", "url", "original", "large"]
            .iter()
            .find_map(|key| value.get(*key).and_then(image_text)),
        _ => None,
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
