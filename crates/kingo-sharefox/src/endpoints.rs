//! Candidate endpoints for each catalog resource, in the order they are tried.
//!
//! The vendor exposes the same resource under several layouts depending on
//! how a shop was provisioned, so a request walks a fixed list of URLs:
//!
//! 1. `shop-api`: `{shop_origin}/api/{resource}`
//! 2. `global-api`: `{api_base}/{resource}`
//! 3. `shop-path-api`: `{api_base}/shops/{shop_domain}/{resource}`
//!
//! Candidates that need a shop domain are still listed when none is
//! configured, but flagged as not applicable so the resolver skips them.

use chrono::NaiveDate;
use reqwest::Url;

use crate::error::VendorError;
use crate::shop::ShopConfig;

/// A catalog resource the resolver can fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Products,
    Categories,
    Search { query: String },
    Available { from: NaiveDate, to: NaiveDate },
}

impl Resource {
    /// Short name used in logs and error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Products => "products",
            Resource::Categories => "categories",
            Resource::Search { .. } => "search",
            Resource::Available { .. } => "available",
        }
    }

    fn path_segment(&self) -> &'static str {
        match self {
            Resource::Categories => "categories",
            _ => "products",
        }
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            Resource::Products | Resource::Categories => Vec::new(),
            Resource::Search { query } => vec![("search", query.clone())],
            Resource::Available { from, to } => vec![
                ("available_from", from.format("%Y-%m-%d").to_string()),
                ("available_to", to.format("%Y-%m-%d").to_string()),
            ],
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One URL to try for a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCandidate {
    pub name: &'static str,
    pub url: String,
    /// `false` when the shop configuration lacks what this layout needs.
    pub applicable: bool,
}

impl EndpointCandidate {
    fn skipped(name: &'static str) -> Self {
        Self {
            name,
            url: String::new(),
            applicable: false,
        }
    }
}

/// Builds the ordered candidate list for `resource`.
///
/// # Errors
///
/// Returns [`VendorError::InvalidShopUrl`] if a configured base URL cannot be
/// parsed.
pub fn candidates(
    shop: &ShopConfig,
    resource: &Resource,
) -> Result<Vec<EndpointCandidate>, VendorError> {
    let segment = resource.path_segment();
    let pairs = resource.query_pairs();
    let mut list = Vec::with_capacity(3);

    // Availability filtering only exists on the API host.
    let shop_origin = match resource {
        Resource::Available { .. } => None,
        _ => shop.shop_origin(),
    };
    match shop_origin {
        Some(origin) => list.push(EndpointCandidate {
            name: "shop-api",
            url: build_url(&origin, &["api", segment], &pairs)?,
            applicable: true,
        }),
        None => list.push(EndpointCandidate::skipped("shop-api")),
    }

    list.push(EndpointCandidate {
        name: "global-api",
        url: build_url(shop.api_base(), &[segment], &pairs)?,
        applicable: true,
    });

    if shop.has_domain() {
        list.push(EndpointCandidate {
            name: "shop-path-api",
            url: build_url(
                shop.api_base(),
                &["shops", &shop.shop_domain, segment],
                &pairs,
            )?,
            applicable: true,
        });
    } else {
        list.push(EndpointCandidate::skipped("shop-path-api"));
    }

    Ok(list)
}

/// Customer-facing listing page scraped when every endpoint fails.
///
/// Categories have no listing page of their own; they are derived from
/// products instead.
///
/// # Errors
///
/// Returns [`VendorError::InvalidShopUrl`] if the booking base is not a URL.
pub fn html_fallback_url(
    shop: &ShopConfig,
    resource: &Resource,
) -> Result<Option<String>, VendorError> {
    let pairs = match resource {
        Resource::Categories => return Ok(None),
        Resource::Products | Resource::Available { .. } => Vec::new(),
        Resource::Search { query } => vec![("search", query.clone())],
    };
    build_url(&shop.booking_base(), &["products"], &pairs).map(Some)
}

/// Product detail URL on the API host.
///
/// # Errors
///
/// Returns [`VendorError::InvalidShopUrl`] if the API base is not a URL.
pub fn product_url(shop: &ShopConfig, id: &str) -> Result<String, VendorError> {
    build_url(shop.api_base(), &["products", id], &[])
}

/// Admin login URL on the API host.
///
/// # Errors
///
/// Returns [`VendorError::InvalidShopUrl`] if the API base is not a URL.
pub fn login_url(shop: &ShopConfig) -> Result<String, VendorError> {
    build_url(shop.api_base(), &["admin", "login"], &[])
}

/// Appends path segments (percent-encoded) and query pairs to `base`.
pub(crate) fn build_url(
    base: &str,
    segments: &[&str],
    pairs: &[(&str, String)],
) -> Result<String, VendorError> {
    let invalid = |reason: String| VendorError::InvalidShopUrl {
        shop_url: base.to_string(),
        reason,
    };

    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| invalid("URL cannot be a base".to_string()))?;
        path.pop_if_empty();
        path.extend(segments);
    }
    if !pairs.is_empty() {
        let mut query = url.query_pairs_mut();
        for (key, value) in pairs {
            query.append_pair(key, value);
        }
    }
    Ok(url.to_string())
}
