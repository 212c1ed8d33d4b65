//! Deep links into the vendor's hosted booking pages.

use chrono::NaiveDate;
use kingo_core::{resolve_slug, SlugMap};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::shop::ShopConfig;

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Characters escaped inside a query value.
const QUERY_VALUE: &AsciiSet = &SEGMENT.add(b'&').add(b'=').add(b'+');

/// What to link to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingRequest {
    pub vendor_product_id: String,
    /// Explicit slug; wins over the slug map and the name.
    pub slug: Option<String>,
    /// Display name used to derive a slug when nothing better exists.
    pub name: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl BookingRequest {
    #[must_use]
    pub fn new(vendor_product_id: impl Into<String>) -> Self {
        Self {
            vendor_product_id: vendor_product_id.into(),
            ..Self::default()
        }
    }
}

/// Builds `{booking_base}/products/{id}/{slug}`, adding
/// `?start=YYYY-MM-DD&end=YYYY-MM-DD` only when both dates are present.
#[must_use]
pub fn booking_url(shop: &ShopConfig, request: &BookingRequest, slug_map: &SlugMap) -> String {
    let slug = resolve_slug(
        request.slug.as_deref(),
        &request.vendor_product_id,
        request.name.as_deref(),
        slug_map,
    );

    let mut url = format!(
        "{}/products/{}/{}",
        shop.booking_base(),
        utf8_percent_encode(&request.vendor_product_id, SEGMENT),
        utf8_percent_encode(&slug, SEGMENT),
    );

    if let (Some(start), Some(end)) = (request.start, request.end) {
        url.push_str(&format!(
            "?start={}&end={}",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        ));
    }
    url
}

/// Vendor search results page, rendered inside the host search route.
#[must_use]
pub fn vendor_search_url(shop: &ShopConfig, term: &str) -> String {
    format!(
        "{}/products?search={}&desktop=true",
        shop.booking_base(),
        utf8_percent_encode(term.trim(), QUERY_VALUE)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
    }

    fn tesla_map() -> SlugMap {
        [("1010".to_string(), "tesla-y".to_string())]
            .into_iter()
            .collect()
    }

    #[test]
    fn slug_map_entry_is_used_for_deep_link() {
        let mut request = BookingRequest::new("1010");
        request.name = Some("MERCEDES S-CLASS".to_string());
        assert_eq!(
            booking_url(&ShopConfig::new("kingorides"), &request, &tesla_map()),
            "https://kingorides.mysharefox.com/en/products/1010/tesla-y"
        );
    }

    #[test]
    fn dates_are_added_only_when_both_present() {
        let shop = ShopConfig::new("kingorides");
        let mut request = BookingRequest::new("42");
        request.name = Some("Audi Q7".to_string());
        request.start = Some(date("2026-05-01"));
        assert_eq!(
            booking_url(&shop, &request, &SlugMap::default()),
            "https://kingorides.mysharefox.com/en/products/42/audi-q7"
        );

        request.end = Some(date("2026-05-04"));
        assert_eq!(
            booking_url(&shop, &request, &SlugMap::default()),
            "https://kingorides.mysharefox.com/en/products/42/audi-q7?start=2026-05-01&end=2026-05-04"
        );
    }

    #[test]
    fn raw_id_is_last_resort_slug() {
        let request = BookingRequest::new("42");
        assert!(booking_url(&ShopConfig::new("kingorides"), &request, &SlugMap::default())
            .ends_with("/products/42/42"));
    }

    #[test]
    fn custom_booking_base_trailing_slash_is_trimmed() {
        let shop = ShopConfig::new("kingorides").with_booking_base_url("https://book.example.com/en/");
        let mut request = BookingRequest::new("7");
        request.slug = Some("bmw-x5".to_string());
        assert_eq!(
            booking_url(&shop, &request, &SlugMap::default()),
            "https://book.example.com/en/products/7/bmw-x5"
        );
    }

    #[test]
    fn search_url_encodes_term() {
        assert_eq!(
            vendor_search_url(&ShopConfig::new("kingorides"), " s class & co "),
            "https://kingorides.mysharefox.com/en/products?search=s%20class%20%26%20co&desktop=true"
        );
    }
}
