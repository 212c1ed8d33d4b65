//! Ordered endpoint resolution with HTML fallback.
//!
//! Candidates are awaited one at a time and the first one yielding a
//! non-empty record list wins; later candidates are never requested. There
//! is no retry or backoff: a failing candidate simply hands over to the next.

use reqwest::{header, Method, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::endpoints::{self, Resource};
use crate::envelope::extract_records;
use crate::error::VendorError;
use crate::fallback::extract_embedded_records;
use crate::lifetime::PageHandle;

use super::{error_message, SharefoxClient};

/// Where a record list came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSource {
    Endpoint { name: &'static str, url: String },
    HtmlFallback { url: String, strategy: &'static str },
    /// Categories synthesized from a product list.
    DerivedFromProducts(Box<RecordSource>),
}

impl std::fmt::Display for RecordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordSource::Endpoint { name, url } => write!(f, "{name} ({url})"),
            RecordSource::HtmlFallback { url, strategy } => {
                write!(f, "html fallback via {strategy} ({url})")
            }
            RecordSource::DerivedFromProducts(inner) => write!(f, "grouped from products: {inner}"),
        }
    }
}

/// A resolved record list and its source.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub items: Vec<T>,
    pub source: RecordSource,
}

impl<T> Resolved<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Resolved<U> {
        Resolved {
            items: self.items.into_iter().map(f).collect(),
            source: self.source,
        }
    }
}

/// Why one candidate produced nothing.
#[derive(Debug, Error)]
enum CandidateFailure {
    #[error("resource absent (HTTP {0})")]
    Absent(u16),

    #[error("HTTP {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status { status: u16, message: Option<String> },

    #[error("unexpected content type {0:?}")]
    NotStructured(String),

    #[error("unparseable body: {0}")]
    Unparseable(String),

    #[error("no records in response")]
    NoRecords,

    #[error("{0}")]
    Transport(String),
}

impl SharefoxClient {
    /// Resolves raw vendor records for `resource`.
    ///
    /// Tries each applicable endpoint candidate in order, then the HTML
    /// listing page. `page` is checked before every attempt and before
    /// results are handed back.
    ///
    /// # Errors
    ///
    /// - [`VendorError::NoData`] when at least one source answered but none
    ///   yielded records.
    /// - [`VendorError::TransportFailure`] when no source answered at all.
    /// - [`VendorError::Cancelled`] when the page unmounted mid-resolution.
    /// - [`VendorError::InvalidShopUrl`] when a base URL is malformed.
    pub async fn resolve_records(
        &self,
        resource: &Resource,
        page: &PageHandle,
    ) -> Result<Resolved<Value>, VendorError> {
        let candidates = endpoints::candidates(&self.shop, resource)?;
        let mut attempts = 0usize;
        let mut responded = false;
        let mut last_transport_error: Option<String> = None;

        for candidate in candidates.iter().filter(|c| c.applicable) {
            ensure_mounted(page, resource)?;
            attempts += 1;
            tracing::debug!(
                resource = resource.name(),
                candidate = candidate.name,
                url = %candidate.url,
                "trying vendor endpoint"
            );

            match self.fetch_candidate(&candidate.url).await {
                Ok(records) => {
                    ensure_mounted(page, resource)?;
                    tracing::info!(
                        resource = resource.name(),
                        candidate = candidate.name,
                        count = records.len(),
                        "resolved vendor records"
                    );
                    return Ok(Resolved {
                        items: records,
                        source: RecordSource::Endpoint {
                            name: candidate.name,
                            url: candidate.url.clone(),
                        },
                    });
                }
                Err(CandidateFailure::Absent(status)) => {
                    responded = true;
                    tracing::debug!(candidate = candidate.name, status, "endpoint absent");
                }
                Err(CandidateFailure::Transport(e)) => {
                    tracing::warn!(candidate = candidate.name, url = %candidate.url, error = %e, "vendor endpoint unreachable");
                    last_transport_error = Some(e);
                }
                Err(failure) => {
                    responded = true;
                    tracing::warn!(candidate = candidate.name, url = %candidate.url, reason = %failure, "vendor endpoint unusable");
                }
            }
        }

        if let Some(url) = endpoints::html_fallback_url(&self.shop, resource)? {
            ensure_mounted(page, resource)?;
            attempts += 1;
            tracing::debug!(resource = resource.name(), url = %url, "trying HTML fallback");

            match self.fetch_html_records(&url).await {
                Ok((strategy, records)) => {
                    ensure_mounted(page, resource)?;
                    tracing::info!(
                        resource = resource.name(),
                        strategy,
                        count = records.len(),
                        "resolved vendor records from HTML"
                    );
                    return Ok(Resolved {
                        items: records,
                        source: RecordSource::HtmlFallback { url, strategy },
                    });
                }
                Err(CandidateFailure::Transport(e)) => {
                    tracing::warn!(url = %url, error = %e, "vendor listing page unreachable");
                    last_transport_error = Some(e);
                }
                Err(failure) => {
                    responded = true;
                    tracing::warn!(url = %url, reason = %failure, "HTML fallback found nothing");
                }
            }
        }

        if responded {
            Err(VendorError::NoData {
                resource: resource.name().to_string(),
                attempts,
            })
        } else {
            Err(VendorError::TransportFailure {
                resource: resource.name().to_string(),
                attempts,
                last_error: last_transport_error
                    .unwrap_or_else(|| "no endpoint attempted".to_string()),
            })
        }
    }

    async fn fetch_candidate(&self, url: &str) -> Result<Vec<Value>, CandidateFailure> {
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| CandidateFailure::Transport(e.to_string()))?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(CandidateFailure::Absent(status.as_u16()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CandidateFailure::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !content_type.contains("json") {
            return Err(CandidateFailure::NotStructured(content_type));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CandidateFailure::Unparseable(e.to_string()))?;
        let payload: Value = serde_json::from_str(&body)
            .map_err(|e| CandidateFailure::Unparseable(e.to_string()))?;

        match extract_records(payload) {
            Some(records) if !records.is_empty() => Ok(records),
            _ => Err(CandidateFailure::NoRecords),
        }
    }

    async fn fetch_html_records(
        &self,
        url: &str,
    ) -> Result<(&'static str, Vec<Value>), CandidateFailure> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "text/html")
            .send()
            .await
            .map_err(|e| CandidateFailure::Transport(e.to_string()))?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(CandidateFailure::Absent(status.as_u16()));
        }
        if !status.is_success() {
            return Err(CandidateFailure::Status {
                status: status.as_u16(),
                message: None,
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| CandidateFailure::Unparseable(e.to_string()))?;
        extract_embedded_records(&html)
            .map(|found| (found.strategy, found.records))
            .ok_or(CandidateFailure::NoRecords)
    }
}

fn ensure_mounted(page: &PageHandle, resource: &Resource) -> Result<(), VendorError> {
    if page.is_mounted() {
        Ok(())
    } else {
        tracing::debug!(resource = resource.name(), "page unmounted; abandoning resolution");
        Err(VendorError::Cancelled {
            resource: resource.name().to_string(),
        })
    }
}
