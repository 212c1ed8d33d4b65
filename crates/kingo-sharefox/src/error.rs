use thiserror::Error;

/// Shown to end users whenever the catalog cannot be loaded.
pub const EMPTY_STATE_MESSAGE: &str = "No data available right now. Please try again later.";

#[derive(Debug, Error)]
pub enum VendorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    UnexpectedStatus {
        status: u16,
        url: String,
        message: Option<String>,
    },

    #[error("invalid shop URL \"{shop_url}\": {reason}")]
    InvalidShopUrl { shop_url: String, reason: String },

    #[error("vendor authentication failed: {reason}")]
    Authentication { reason: String },

    #[error("invalid date range: {start} is after {end}")]
    InvalidDateRange { start: String, end: String },

    /// Every candidate answered, but none yielded usable records.
    #[error("no {resource} data available from the vendor after {attempts} attempts")]
    NoData { resource: String, attempts: usize },

    /// No candidate produced an HTTP response at all.
    #[error(
        "could not reach the vendor for {resource} after {attempts} attempts ({last_error}); \
         this is usually a network or cross-origin (CORS) failure"
    )]
    TransportFailure {
        resource: String,
        attempts: usize,
        last_error: String,
    },

    #[error("{resource} request abandoned because the page was unmounted")]
    Cancelled { resource: String },
}

impl VendorError {
    /// `true` when every data-source strategy was tried and none succeeded.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(
            self,
            VendorError::NoData { .. } | VendorError::TransportFailure { .. }
        )
    }

    /// `true` for failures that most likely happened below HTTP.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            VendorError::TransportFailure { .. } | VendorError::Http(_)
        )
    }
}
