use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use kingo_core::{CatalogItem, Category};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{list_or_empty, map_vendor_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AvailableQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<CatalogItem>>>, ApiError> {
    let result = state
        .client
        .products()
        .await
        .map(|resolved| (resolved.items, resolved.source.to_string()));
    list_or_empty(req_id.0, result)
}

pub(super) async fn list_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Category>>>, ApiError> {
    let result = state
        .client
        .categories()
        .await
        .map(|resolved| (resolved.items, resolved.source.to_string()));
    list_or_empty(req_id.0, result)
}

pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<CatalogItem>>>, ApiError> {
    let raw = query.q.unwrap_or_default();
    let result = state.client.search(&raw).await.map(|results| {
        let source = format!("{:?} via {}", results.source, results.records_from);
        (results.items, source)
    });
    list_or_empty(req_id.0, result)
}

pub(super) async fn list_available(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<AvailableQuery>,
) -> Result<Json<ApiResponse<Vec<CatalogItem>>>, ApiError> {
    let from = parse_date(&req_id.0, "from", query.from.as_deref())?;
    let to = parse_date(&req_id.0, "to", query.to.as_deref())?;

    let result = state
        .client
        .available_products(from, to)
        .await
        .map(|resolved| (resolved.items, resolved.source.to_string()));
    list_or_empty(req_id.0, result)
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CatalogItem>>, ApiError> {
    let item = state
        .client
        .product_by_id(&id)
        .await
        .map_err(|e| map_vendor_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: item,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Parses a required `YYYY-MM-DD` query parameter.
pub(super) fn parse_date(
    request_id: &str,
    name: &str,
    raw: Option<&str>,
) -> Result<NaiveDate, ApiError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
        ApiError::new(
            request_id,
            "validation_error",
            format!("query parameter `{name}` is required (YYYY-MM-DD)"),
        )
    })?;
    parse_optional_date(request_id, name, Some(raw))?.ok_or_else(|| {
        ApiError::new(request_id, "validation_error", format!("`{name}` is empty"))
    })
}

/// Parses an optional `YYYY-MM-DD` query parameter; blank counts as absent.
pub(super) fn parse_optional_date(
    request_id: &str,
    name: &str,
    raw: Option<&str>,
) -> Result<Option<NaiveDate>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| {
                ApiError::new(
                    request_id,
                    "validation_error",
                    format!("`{name}` must be YYYY-MM-DD: {e}"),
                )
            }),
    }
}
