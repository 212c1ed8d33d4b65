//! Canonical catalog records shown by the host pages.
//!
//! Vendor payloads are schema-unstable; these are the shapes every page
//! component renders from. They are produced by the normalizer in
//! `kingo-sharefox` and are deliberately re-normalizable: serializing a
//! [`CatalogItem`] and normalizing the JSON again yields an equal item.

use serde::{Deserialize, Serialize};

/// Display name used when a record exposes no name-like field.
pub const PLACEHOLDER_DISPLAY_NAME: &str = "Unnamed vehicle";

/// Display name used for categories whose source carries no usable name.
pub const PLACEHOLDER_CATEGORY_NAME: &str = "Uncategorized";

/// Image the UI substitutes when `image_url` is absent or fails to load.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/400x250?text=Car+Image";

/// A rentable vehicle listing, normalized from a vendor record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Stable listing identifier. Never empty.
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Identifier used when deep-linking into the vendor's booking pages.
    /// Not guaranteed to equal [`CatalogItem::id`].
    ///
    /// Always serialized, `null` included: an explicit `null` tells the
    /// normalizer not to fall back to `id` when the record is re-normalized.
    #[serde(default)]
    pub vendor_product_id: Option<String>,
    /// Path segment of the vendor product detail page, e.g. `"tesla-y"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Raw category/type label, e.g. `"SUV"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Price as a decimal string, exactly as the vendor returned it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

impl CatalogItem {
    /// Returns the image to render, substituting the placeholder when absent.
    #[must_use]
    pub fn image_or_placeholder(&self) -> &str {
        self.image_url.as_deref().unwrap_or(PLACEHOLDER_IMAGE_URL)
    }
}

/// A browsable vehicle category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> CatalogItem {
        CatalogItem {
            id: "1010".to_string(),
            display_name: "Tesla Model Y".to_string(),
            image_url: None,
            vendor_product_id: Some("1010".to_string()),
            slug: Some("tesla-y".to_string()),
            category: None,
            brand: None,
            model: None,
            price: None,
        }
    }

    #[test]
    fn image_or_placeholder_substitutes_missing_image() {
        assert_eq!(item().image_or_placeholder(), PLACEHOLDER_IMAGE_URL);
    }

    #[test]
    fn image_or_placeholder_prefers_real_image() {
        let mut it = item();
        it.image_url = Some("https://cdn.example.com/y.png".to_string());
        assert_eq!(it.image_or_placeholder(), "https://cdn.example.com/y.png");
    }

    #[test]
    fn serialization_skips_absent_optionals() {
        let json = serde_json::to_value(item()).expect("serialize");
        assert!(json.get("image_url").is_none());
        assert_eq!(json["slug"], "tesla-y");
    }
}
