//! Markup for the vendor's embeddable widgets.
//!
//! The widget script scans the page for `.sharefox-embed` containers and
//! renders the configured view into each one. The script must be included
//! once per application lifetime; [`EmbedLoader`] enforces that.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::shop::ShopConfig;

/// Element id of the widget script tag.
pub const EMBED_SCRIPT_ID: &str = "sharefox-embed-script";

/// Class the widget script looks for.
pub const EMBED_CONTAINER_CLASS: &str = "sharefox-embed";

/// The widget `<script>` tag for one shop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedScript {
    pub shop_name: String,
}

impl EmbedScript {
    #[must_use]
    pub fn for_shop(shop: &ShopConfig) -> Self {
        Self {
            shop_name: shop.shop_name().to_string(),
        }
    }

    #[must_use]
    pub fn src(&self) -> String {
        format!("https://{}.mysharefox.com/embed.min.js", self.shop_name)
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        format!(
            r#"<script id="{EMBED_SCRIPT_ID}" src="{}" data-shop="{}" async></script>"#,
            escape_attr(&self.src()),
            escape_attr(&self.shop_name)
        )
    }
}

/// Views the widget can render into a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedPath {
    Search,
    ProductsPopular,
    Products,
    Categories,
    Other(String),
}

impl EmbedPath {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            EmbedPath::Search => "search",
            EmbedPath::ProductsPopular => "products-popular",
            EmbedPath::Products => "products",
            EmbedPath::Categories => "categories",
            EmbedPath::Other(path) => path,
        }
    }
}

impl fmt::Display for EmbedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `<div class="sharefox-embed">` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedContainer {
    pub path: EmbedPath,
    pub shop_name: String,
    /// Number of items to render, for list views.
    pub volume: Option<u32>,
}

impl EmbedContainer {
    #[must_use]
    pub fn new(shop: &ShopConfig, path: EmbedPath) -> Self {
        Self {
            path,
            shop_name: shop.shop_name().to_string(),
            volume: None,
        }
    }

    #[must_use]
    pub fn with_volume(mut self, volume: u32) -> Self {
        self.volume = Some(volume);
        self
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        let volume = self
            .volume
            .map(|v| format!(r#" data-volume="{v}""#))
            .unwrap_or_default();
        format!(
            r#"<div class="{EMBED_CONTAINER_CLASS}" data-path="{}" data-shop="{}"{volume}></div>"#,
            escape_attr(self.path.as_str()),
            escape_attr(&self.shop_name)
        )
    }
}

/// Hands out the widget script exactly once.
#[derive(Debug)]
pub struct EmbedLoader {
    script: EmbedScript,
    loaded: AtomicBool,
}

impl EmbedLoader {
    #[must_use]
    pub fn new(script: EmbedScript) -> Self {
        Self {
            script,
            loaded: AtomicBool::new(false),
        }
    }

    /// Returns the script tag on the first call and `None` afterwards.
    pub fn ensure_loaded(&self) -> Option<String> {
        if self.loaded.swap(true, Ordering::AcqRel) {
            return None;
        }
        tracing::debug!(src = %self.script.src(), "injecting embed script");
        Some(self.script.to_html())
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }
}

/// Escapes a value for a double-quoted HTML attribute.
#[must_use]
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
