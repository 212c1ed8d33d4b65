//! ShareFox vendor integration: endpoint discovery with ordered fallback,
//! record normalization, client-side search, and navigation interception
//! for embedded vendor widgets.

pub mod booking;
pub mod categories;
pub mod client;
pub mod embed;
pub mod endpoints;
pub mod envelope;
pub mod error;
pub mod fallback;
pub mod interceptor;
pub mod lifetime;
pub mod normalize;
pub mod search;
pub mod shop;

pub use booking::{booking_url, vendor_search_url, BookingRequest};
pub use categories::{group_categories, normalize_categories};
pub use client::{RecordSource, Resolved, SearchResults, SearchSource, SharefoxClient};
pub use embed::{EmbedContainer, EmbedLoader, EmbedPath, EmbedScript};
pub use endpoints::{EndpointCandidate, Resource};
pub use error::VendorError;
pub use interceptor::{
    BrowsingContext, InterceptPolicy, InterceptorGuard, MessageListener, Navigation, OpenHandler,
};
pub use lifetime::{PageHandle, PageLifetime};
pub use normalize::{normalize_category, normalize_item};
pub use search::{filter_records, normalize_query, NormalizedQuery};
pub use shop::ShopConfig;
