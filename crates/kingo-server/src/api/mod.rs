mod booking;
mod catalog;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use kingo_sharefox::error::EMPTY_STATE_MESSAGE;
use kingo_sharefox::{SharefoxClient, VendorError};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};
use crate::pages;

#[derive(Clone)]
pub struct AppState {
    pub client: SharefoxClient,
    /// Host route that renders vendor search results, e.g. `/search`.
    pub search_route: Arc<str>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    /// Where the data came from, e.g. `global-api (https://...)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Set when the vendor had nothing to give; `data` is then empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    shop_domain: String,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
            source: None,
            notice: None,
        }
    }

    pub(super) fn with_source(mut self, source: impl ToString) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub(super) fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Outcome of a list lookup: records, or an empty list with a notice when
/// the vendor is exhausted. Any other vendor error becomes an [`ApiError`].
pub(super) fn list_or_empty<T: Serialize>(
    request_id: String,
    result: Result<(Vec<T>, String), VendorError>,
) -> Result<Json<ApiResponse<Vec<T>>>, ApiError> {
    match result {
        Ok((data, source)) => Ok(Json(ApiResponse {
            data,
            meta: ResponseMeta::new(request_id).with_source(source),
        })),
        Err(e) if e.is_exhausted() => {
            tracing::warn!(error = %e, "vendor exhausted; serving empty state");
            Ok(Json(ApiResponse {
                data: Vec::new(),
                meta: ResponseMeta::new(request_id).with_notice(EMPTY_STATE_MESSAGE),
            }))
        }
        Err(e) => Err(map_vendor_error(request_id, &e)),
    }
}

pub(super) fn map_vendor_error(request_id: String, error: &VendorError) -> ApiError {
    match error {
        VendorError::NotFound { .. } => ApiError::new(request_id, "not_found", error.to_string()),
        VendorError::InvalidDateRange { .. } => {
            ApiError::new(request_id, "validation_error", error.to_string())
        }
        VendorError::Http(_)
        | VendorError::UnexpectedStatus { .. }
        | VendorError::Deserialize { .. }
        | VendorError::Authentication { .. } => {
            tracing::warn!(error = %error, "vendor request failed");
            ApiError::new(request_id, "upstream_error", "vendor request failed")
        }
        VendorError::InvalidShopUrl { .. }
        | VendorError::NoData { .. }
        | VendorError::TransportFailure { .. }
        | VendorError::Cancelled { .. } => {
            tracing::error!(error = %error, "vendor lookup failed");
            ApiError::new(request_id, "internal_error", "vendor lookup failed")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

pub fn build_app(state: AppState) -> Router {
    let search_route = state.search_route.to_string();

    let api_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/products", get(catalog::list_products))
        .route("/api/v1/products/{id}", get(catalog::get_product))
        .route("/api/v1/categories", get(catalog::list_categories))
        .route("/api/v1/search", get(catalog::search))
        .route("/api/v1/available", get(catalog::list_available))
        .route("/api/v1/booking-url", get(booking::booking_url));

    let page_routes = Router::new()
        .route("/", get(pages::landing))
        .route(&search_route, get(pages::search));

    Router::new()
        .merge(api_routes)
        .merge(page_routes)
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            shop_domain: state.client.shop().shop_domain.clone(),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
