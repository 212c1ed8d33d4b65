//! HTTP client for the ShareFox catalog API.
//!
//! All vendor state (shop domain, base URLs, bearer token, slug map) lives
//! in one [`SharefoxClient`]; there are no process globals.

mod auth;
mod catalog;
mod resolve;

use std::sync::Arc;
use std::time::Duration;

use kingo_core::{AppConfig, SlugMap};
use reqwest::{header, Client, Method, RequestBuilder};

use crate::error::VendorError;
use crate::shop::ShopConfig;

pub use catalog::{SearchResults, SearchSource};
pub use resolve::{RecordSource, Resolved};

/// Dead hosts should fail fast so the next candidate gets its turn.
const CONNECT_TIMEOUT_SECS: u64 = 10;

pub const SHOP_DOMAIN_HEADER: &str = "x-sharefox-shop-domain";
pub const ADMIN_DOMAIN_HEADER: &str = "x-sharefox-admin-domain";

/// Client for one vendor shop.
///
/// Cheap to clone; clones share the connection pool and slug map.
#[derive(Clone)]
pub struct SharefoxClient {
    pub(super) client: Client,
    pub(super) shop: ShopConfig,
    pub(super) slug_map: Arc<SlugMap>,
    pub(super) bearer_token: Option<String>,
}

impl std::fmt::Debug for SharefoxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharefoxClient")
            .field("shop", &self.shop)
            .field("slug_map_entries", &self.slug_map.len())
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish_non_exhaustive()
    }
}

impl SharefoxClient {
    /// Creates a client for `shop`.
    ///
    /// `timeout_secs` bounds each whole request; `None` leaves requests
    /// unbounded apart from the connect timeout.
    ///
    /// # Errors
    ///
    /// Returns [`VendorError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        shop: ShopConfig,
        timeout_secs: Option<u64>,
        user_agent: &str,
    ) -> Result<Self, VendorError> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(user_agent);
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            shop,
            slug_map: Arc::new(SlugMap::default()),
            bearer_token: None,
        })
    }

    /// Creates a client from application configuration, using the
    /// configured API token when present.
    ///
    /// # Errors
    ///
    /// Returns [`VendorError::Http`] if the HTTP client cannot be built.
    pub fn from_app_config(config: &AppConfig, slug_map: SlugMap) -> Result<Self, VendorError> {
        let client = Self::new(
            ShopConfig::from_app_config(config),
            config.vendor_timeout_secs,
            &config.user_agent,
        )?
        .with_slug_map(slug_map);
        Ok(match &config.api_token {
            Some(token) => client.with_bearer_token(token.clone()),
            None => client,
        })
    }

    #[must_use]
    pub fn with_slug_map(mut self, slug_map: SlugMap) -> Self {
        self.slug_map = Arc::new(slug_map);
        self
    }

    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into()).filter(|t: &String| !t.trim().is_empty());
        self
    }

    #[must_use]
    pub fn shop(&self) -> &ShopConfig {
        &self.shop
    }

    #[must_use]
    pub fn slug_map(&self) -> &SlugMap {
        &self.slug_map
    }

    #[must_use]
    pub fn has_bearer_token(&self) -> bool {
        self.bearer_token.is_some()
    }

    /// Request with the JSON and shop headers every vendor call carries.
    pub(super) fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");

        if self.shop.has_domain() {
            request = request
                .header(SHOP_DOMAIN_HEADER, &self.shop.shop_domain)
                .header(ADMIN_DOMAIN_HEADER, &self.shop.shop_domain);
        }
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        request
    }
}

/// Pulls a human-readable message out of an error response body.
///
/// Prefers a JSON `message` or `error` field; HTML error pages are reported
/// as such rather than echoed.
pub(crate) fn error_message(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = ["message", "error"]
            .iter()
            .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
        {
            return Some(message.to_string());
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.to_ascii_lowercase().starts_with("<!doctype html") || trimmed.starts_with("<html") {
        return Some("vendor returned an HTML error page".to_string());
    }
    Some(trimmed.chars().take(200).collect())
}
