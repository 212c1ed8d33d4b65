//! Shop-level configuration shared by every vendor request.

use kingo_core::{normalize_shop_domain, AppConfig};

/// Host suffix of vendor-hosted shops.
pub const VENDOR_HOST_SUFFIX: &str = ".mysharefox.com";

pub const DEFAULT_API_BASE_URL: &str = "https://api.mysharefox.com";

/// Identifies one vendor shop and the bases its URLs are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopConfig {
    /// Full shop domain, e.g. `kingorides.mysharefox.com`. May be empty, in
    /// which case shop-scoped endpoints are skipped.
    pub shop_domain: String,
    pub api_base_url: String,
    pub shop_base_url: Option<String>,
    pub booking_base_url: Option<String>,
}

impl ShopConfig {
    /// Builds a config for `domain` against the public API base.
    ///
    /// A bare subdomain such as `"kingorides"` is expanded to the vendor host.
    #[must_use]
    pub fn new(domain: &str) -> Self {
        Self {
            shop_domain: normalize_shop_domain(domain),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            shop_base_url: None,
            booking_base_url: None,
        }
    }

    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_shop_base_url(mut self, url: impl Into<String>) -> Self {
        self.shop_base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_booking_base_url(mut self, url: impl Into<String>) -> Self {
        self.booking_base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            shop_domain: normalize_shop_domain(&config.shop_domain),
            api_base_url: config.api_base_url.clone(),
            shop_base_url: config.shop_base_url.clone(),
            booking_base_url: config.booking_base_url.clone(),
        }
    }

    #[must_use]
    pub fn has_domain(&self) -> bool {
        !self.shop_domain.is_empty()
    }

    /// Origin that serves the shop's own `/api/...` paths.
    ///
    /// Returns `None` when neither an explicit shop base nor a domain is set.
    #[must_use]
    pub fn shop_origin(&self) -> Option<String> {
        match &self.shop_base_url {
            Some(base) => Some(extract_origin(base)),
            None if self.has_domain() => Some(format!("https://{}", self.shop_domain)),
            None => None,
        }
    }

    /// Base of customer-facing booking pages, without a trailing slash.
    #[must_use]
    pub fn booking_base(&self) -> String {
        let base = match &self.booking_base_url {
            Some(base) => base.clone(),
            None => format!("https://{}/en", self.shop_domain),
        };
        base.trim_end_matches('/').to_string()
    }

    /// API base without a trailing slash.
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    /// Short shop name used by the embed widget, e.g. `kingorides`.
    #[must_use]
    pub fn shop_name(&self) -> &str {
        self.shop_domain
            .strip_suffix(VENDOR_HOST_SUFFIX)
            .unwrap_or(&self.shop_domain)
    }

    /// Hosts whose navigation counts as vendor-originated.
    #[must_use]
    pub fn vendor_hosts(&self) -> Vec<String> {
        let mut hosts = vec![VENDOR_HOST_SUFFIX.trim_start_matches('.').to_string()];
        if self.has_domain() {
            hosts.push(self.shop_domain.to_ascii_lowercase());
        }
        if let Some(host) = extract_host(&self.booking_base()) {
            hosts.push(host);
        }
        hosts.sort();
        hosts.dedup();
        hosts
    }
}

/// Extracts the scheme+host origin from a URL.
///
/// Given `"https://kingorides.mysharefox.com/en/products"`, returns
/// `"https://kingorides.mysharefox.com"`.
#[must_use]
pub fn extract_origin(url: &str) -> String {
    reqwest::Url::parse(url).map_or_else(
        |e| {
            tracing::warn!(
                url,
                error = %e,
                "could not parse URL; falling back to string split for origin extraction"
            );
            url.trim_end_matches('/')
                .splitn(4, '/')
                .take(3)
                .collect::<Vec<_>>()
                .join("/")
        },
        |u| u.origin().ascii_serialization(),
    )
}

/// Lower-cased host of `url`, if it parses.
#[must_use]
pub fn extract_host(url: &str) -> Option<String> {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
}
