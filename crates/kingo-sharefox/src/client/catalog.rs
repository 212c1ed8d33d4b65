//! Catalog operations for `SharefoxClient`: products, categories, search,
//! and availability.

use chrono::NaiveDate;
use kingo_core::{CatalogItem, Category};

use crate::categories::{group_categories, normalize_categories};
use crate::endpoints::Resource;
use crate::error::VendorError;
use crate::lifetime::PageHandle;
use crate::normalize::normalize_item;
use crate::search::{filter_records, normalize_query};

use super::{RecordSource, Resolved, SharefoxClient};

/// How search results were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSource {
    /// The vendor's search endpoint answered; results were refined locally.
    Server,
    /// Search endpoints failed; the full product list was filtered locally.
    ClientFilter,
    /// Blank query; every product is returned.
    Unfiltered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    pub query: String,
    pub items: Vec<CatalogItem>,
    pub source: SearchSource,
    pub records_from: RecordSource,
}

impl SharefoxClient {
    /// Fetches and normalizes the product list.
    ///
    /// # Errors
    ///
    /// See [`SharefoxClient::resolve_records`].
    pub async fn products(&self) -> Result<Resolved<CatalogItem>, VendorError> {
        self.products_for_page(&PageHandle::detached()).await
    }

    /// [`SharefoxClient::products`] bound to a page lifetime.
    ///
    /// # Errors
    ///
    /// See [`SharefoxClient::resolve_records`].
    pub async fn products_for_page(
        &self,
        page: &PageHandle,
    ) -> Result<Resolved<CatalogItem>, VendorError> {
        let raw = self.resolve_records(&Resource::Products, page).await?;
        Ok(raw.map(|record| normalize_item(&record, &self.slug_map)))
    }

    /// Fetches categories, grouping products by category when no categories
    /// endpoint answers.
    ///
    /// # Errors
    ///
    /// Returns the categories error when neither categories nor categorized
    /// products are available.
    pub async fn categories(&self) -> Result<Resolved<Category>, VendorError> {
        self.categories_for_page(&PageHandle::detached()).await
    }

    /// [`SharefoxClient::categories`] bound to a page lifetime.
    ///
    /// # Errors
    ///
    /// See [`SharefoxClient::categories`].
    pub async fn categories_for_page(
        &self,
        page: &PageHandle,
    ) -> Result<Resolved<Category>, VendorError> {
        let err = match self.resolve_records(&Resource::Categories, page).await {
            Ok(raw) => {
                return Ok(Resolved {
                    items: normalize_categories(&raw.items),
                    source: raw.source,
                })
            }
            Err(e) if e.is_exhausted() => e,
            Err(e) => return Err(e),
        };

        tracing::info!(error = %err, "categories unavailable; grouping products instead");
        let products = match self.resolve_records(&Resource::Products, page).await {
            Ok(products) => products,
            Err(VendorError::Cancelled { resource }) => {
                return Err(VendorError::Cancelled { resource })
            }
            Err(products_err) => {
                tracing::warn!(error = %products_err, "products unavailable for category grouping");
                return Err(err);
            }
        };

        let items = group_categories(&products.items);
        if items.is_empty() {
            return Err(err);
        }
        Ok(Resolved {
            items,
            source: RecordSource::DerivedFromProducts(Box::new(products.source)),
        })
    }

    /// Searches the catalog.
    ///
    /// # Errors
    ///
    /// See [`SharefoxClient::resolve_records`].
    pub async fn search(&self, query: &str) -> Result<SearchResults, VendorError> {
        self.search_for_page(query, &PageHandle::detached()).await
    }

    /// Searches the catalog on behalf of a page.
    ///
    /// A blank query returns every product. Otherwise the vendor search
    /// endpoints are tried first and their raw records refined with
    /// the client-side matcher, since some endpoints ignore the search
    /// parameter and return the whole catalog. If no search endpoint
    /// answers, the raw product list is filtered locally instead. The two
    /// paths may disagree on edge cases.
    ///
    /// # Errors
    ///
    /// See [`SharefoxClient::resolve_records`].
    pub async fn search_for_page(
        &self,
        query: &str,
        page: &PageHandle,
    ) -> Result<SearchResults, VendorError> {
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            let products = self.products_for_page(page).await?;
            return Ok(SearchResults {
                query: String::new(),
                items: products.items,
                source: SearchSource::Unfiltered,
                records_from: products.source,
            });
        }

        let resource = Resource::Search {
            query: normalized.phrase.clone(),
        };
        match self.resolve_records(&resource, page).await {
            Ok(raw) => {
                // Refine on raw records: description, year and variants do
                // not survive normalization.
                let items: Vec<CatalogItem> = filter_records(&normalized.phrase, &raw.items)
                    .iter()
                    .map(|record| normalize_item(record, &self.slug_map))
                    .collect();
                return Ok(SearchResults {
                    items,
                    query: normalized.phrase,
                    source: SearchSource::Server,
                    records_from: raw.source,
                });
            }
            Err(e) if e.is_exhausted() => {
                tracing::info!(error = %e, "vendor search unavailable; filtering products locally");
            }
            Err(e) => return Err(e),
        }

        let products = self.resolve_records(&Resource::Products, page).await?;
        let matched = filter_records(&normalized.phrase, &products.items);
        Ok(SearchResults {
            items: matched
                .iter()
                .map(|record| normalize_item(record, &self.slug_map))
                .collect(),
            query: normalized.phrase,
            source: SearchSource::ClientFilter,
            records_from: products.source,
        })
    }

    /// Fetches products available between `start` and `end` inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`VendorError::InvalidDateRange`] without any request when
    /// `start` is after `end`; otherwise see
    /// [`SharefoxClient::resolve_records`].
    pub async fn available_products(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Resolved<CatalogItem>, VendorError> {
        self.available_products_for_page(start, end, &PageHandle::detached())
            .await
    }

    /// [`SharefoxClient::available_products`] bound to a page lifetime.
    ///
    /// # Errors
    ///
    /// See [`SharefoxClient::available_products`].
    pub async fn available_products_for_page(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        page: &PageHandle,
    ) -> Result<Resolved<CatalogItem>, VendorError> {
        if start > end {
            return Err(VendorError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        let raw = self
            .resolve_records(&Resource::Available { from: start, to: end }, page)
            .await?;
        Ok(raw.map(|record| normalize_item(&record, &self.slug_map)))
    }
}
