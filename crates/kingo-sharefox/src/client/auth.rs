//! Admin authentication and single-product lookup.

use kingo_core::CatalogItem;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::endpoints::{login_url, product_url};
use crate::error::VendorError;
use crate::normalize::normalize_item;

use super::{error_message, SharefoxClient};

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

impl SharefoxClient {
    /// Logs in as a shop admin and returns the bearer token.
    ///
    /// Pair with [`SharefoxClient::with_bearer_token`] to send it on later
    /// requests.
    ///
    /// # Errors
    ///
    /// - [`VendorError::Authentication`] on a non-success status or a
    ///   response without a token.
    /// - [`VendorError::Http`] on network failure.
    /// - [`VendorError::Deserialize`] if the body is not JSON.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<String, VendorError> {
        let url = login_url(&self.shop)?;
        let response = self
            .request(Method::POST, &url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = error_message(&body).unwrap_or_else(|| "no details".to_string());
            tracing::warn!(status = status.as_u16(), "vendor login rejected");
            return Err(VendorError::Authentication {
                reason: format!("HTTP {}: {detail}", status.as_u16()),
            });
        }

        let payload: Value =
            serde_json::from_str(&body).map_err(|e| VendorError::Deserialize {
                context: format!("login response from {url}"),
                source: e,
            })?;
        ["token", "access_token"]
            .iter()
            .find_map(|key| payload.get(*key).and_then(Value::as_str))
            .filter(|token| !token.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| VendorError::Authentication {
                reason: "login response carried no token".to_string(),
            })
    }

    /// Fetches and normalizes one product by vendor id.
    ///
    /// # Errors
    ///
    /// - [`VendorError::NotFound`] on HTTP 404.
    /// - [`VendorError::UnexpectedStatus`] on other non-success statuses,
    ///   carrying the vendor's error message when it sent one.
    /// - [`VendorError::Http`] on network failure.
    /// - [`VendorError::Deserialize`] if the body is not JSON.
    pub async fn product_by_id(&self, id: &str) -> Result<CatalogItem, VendorError> {
        let url = product_url(&self.shop, id)?;
        let response = self.request(Method::GET, &url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(VendorError::NotFound { url });
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(VendorError::UnexpectedStatus {
                status: status.as_u16(),
                url,
                message: error_message(&body),
            });
        }

        let payload: Value =
            serde_json::from_str(&body).map_err(|e| VendorError::Deserialize {
                context: format!("product {id} from {url}"),
                source: e,
            })?;
        let record = ["product", "data"]
            .iter()
            .find_map(|key| payload.get(*key).filter(|v| v.is_object()))
            .unwrap_or(&payload);
        Ok(normalize_item(record, &self.slug_map))
    }
}
