use axum::{
    extract::{Query, State},
    Extension, Json,
};
use kingo_sharefox::BookingRequest;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::catalog::parse_optional_date;
use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct BookingQuery {
    pub vendor_product_id: Option<String>,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct BookingLink {
    url: String,
}

pub(super) async fn booking_url(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<BookingQuery>,
) -> Result<Json<ApiResponse<BookingLink>>, ApiError> {
    let vendor_product_id = query
        .vendor_product_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "validation_error",
                "query parameter `vendor_product_id` is required",
            )
        })?;

    let start = parse_optional_date(&req_id.0, "start", query.start.as_deref())?;
    let end = parse_optional_date(&req_id.0, "end", query.end.as_deref())?;
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                format!("start {start} is after end {end}"),
            ));
        }
    }

    let request = BookingRequest {
        vendor_product_id,
        slug: query.slug,
        name: query.name,
        start,
        end,
    };
    let url = kingo_sharefox::booking_url(state.client.shop(), &request, state.client.slug_map());

    Ok(Json(ApiResponse {
        data: BookingLink { url },
        meta: ResponseMeta::new(req_id.0),
    }))
}
