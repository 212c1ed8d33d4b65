//! Integration tests for categories, search, single-product lookup, and
//! admin login against a `wiremock` vendor.

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kingo_core::SlugMap;
use kingo_sharefox::{RecordSource, SearchSource, SharefoxClient, ShopConfig, VendorError};

fn test_client(server: &MockServer) -> SharefoxClient {
    let shop = ShopConfig::new("kingorides")
        .with_shop_base_url(server.uri())
        .with_api_base_url(server.uri())
        .with_booking_base_url(format!("{}/en", server.uri()));
    SharefoxClient::new(shop, Some(5), "kingo-test/0.1")
        .expect("failed to build test SharefoxClient")
}

fn fleet() -> serde_json::Value {
    json!([
        {"id": 1, "name": "Mercedes S-Class", "category": "Sedan"},
        {"id": 2, "name": "Mercedes GLE", "category": "SUV"},
        {"id": 3, "name": "Tesla Model Y", "category": "suv"}
    ])
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[tokio::test]
async fn categories_come_from_categories_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "categories": [{"id": 1, "name": "SUV"}, {"id": 2, "name": "Sedan"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fleet()))
        .expect(0)
        .mount(&server)
        .await;

    let categories = test_client(&server).categories().await.expect("categories");
    let names: Vec<_> = categories.items.iter().map(|c| c.display_name.as_str()).collect();
    assert_eq!(names, ["SUV", "Sedan"]);
}

#[tokio::test]
async fn categories_are_grouped_from_products_when_endpoints_fail() {
    let server = MockServer::start().await;
    for at in [
        "/api/categories",
        "/categories",
        "/shops/kingorides.mysharefox.com/categories",
    ] {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fleet()))
        .expect(1)
        .mount(&server)
        .await;

    let categories = test_client(&server).categories().await.expect("categories");

    let names: Vec<_> = categories.items.iter().map(|c| c.display_name.as_str()).collect();
    assert_eq!(names, ["Sedan", "SUV"]);
    assert!(matches!(
        categories.source,
        RecordSource::DerivedFromProducts(_)
    ));
}

#[tokio::test]
async fn categories_error_when_nothing_is_categorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .mount(&server)
        .await;

    let err = test_client(&server).categories().await.expect_err("should fail");
    assert!(err.is_exhausted(), "got: {err:?}");
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn server_search_results_are_refined_locally() {
    let server = MockServer::start().await;
    // This endpoint ignores the search term and returns everything.
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("search", "tesla"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fleet()))
        .expect(1)
        .mount(&server)
        .await;

    let results = test_client(&server).search("  Tesla tesla ").await.expect("search");

    assert_eq!(results.source, SearchSource::Server);
    assert_eq!(results.query, "tesla");
    assert_eq!(results.items.len(), 1);
    assert_eq!(results.items[0].display_name, "Tesla Model Y");
}

#[tokio::test]
async fn server_search_keeps_hits_matched_on_unnormalized_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("search", "hybrid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Audi Q7", "description": "Plug-in hybrid SUV"}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("search", "2024"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 2, "name": "Tesla Model Y", "year": 2024},
            {"id": 3, "name": "Mercedes GLE", "year": 2021}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);

    let hybrid = client.search("hybrid").await.expect("search");
    assert_eq!(hybrid.source, SearchSource::Server);
    let names: Vec<_> = hybrid.items.iter().map(|i| i.display_name.as_str()).collect();
    assert_eq!(names, ["Audi Q7"]);

    let by_year = client.search("2024").await.expect("search");
    assert_eq!(by_year.source, SearchSource::Server);
    let names: Vec<_> = by_year.items.iter().map(|i| i.display_name.as_str()).collect();
    assert_eq!(names, ["Tesla Model Y"]);
}

#[tokio::test]
async fn failed_server_search_filters_product_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("search", "mercedes sedan"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param_is_missing("search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fleet()))
        .expect(1)
        .mount(&server)
        .await;

    let results = test_client(&server)
        .search("Mercedes  SEDAN")
        .await
        .expect("search");

    assert_eq!(results.source, SearchSource::ClientFilter);
    let names: Vec<_> = results.items.iter().map(|i| i.display_name.as_str()).collect();
    assert_eq!(names, ["Mercedes S-Class"]);
}

#[tokio::test]
async fn blank_search_returns_all_products() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param_is_missing("search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fleet()))
        .expect(1)
        .mount(&server)
        .await;

    let results = test_client(&server).search("   ").await.expect("search");
    assert_eq!(results.source, SearchSource::Unfiltered);
    assert_eq!(results.items.len(), 3);
}

// ---------------------------------------------------------------------------
// Single product
// ---------------------------------------------------------------------------

#[tokio::test]
async fn product_by_id_unwraps_envelope_and_applies_slug_map() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/1010"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "product": {"id": 1010, "name": "MERCEDES S-CLASS"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let map: SlugMap = [("1010".to_string(), "tesla-y".to_string())]
        .into_iter()
        .collect();
    let item = test_client(&server)
        .with_slug_map(map)
        .product_by_id("1010")
        .await
        .expect("product");

    assert_eq!(item.display_name, "MERCEDES S-CLASS");
    assert_eq!(item.slug.as_deref(), Some("tesla-y"));
}

#[tokio::test]
async fn product_by_id_maps_404_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .product_by_id("999")
        .await
        .expect_err("should fail");
    assert!(matches!(err, VendorError::NotFound { .. }), "got: {err:?}");
}

#[tokio::test]
async fn product_by_id_surfaces_vendor_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/5"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"message": "shop not enabled"})),
        )
        .mount(&server)
        .await;

    let err = test_client(&server)
        .product_by_id("5")
        .await
        .expect_err("should fail");
    match err {
        VendorError::UnexpectedStatus {
            status, message, ..
        } => {
            assert_eq!(status, 403);
            assert_eq!(message.as_deref(), Some("shop not enabled"));
        }
        other => panic!("expected UnexpectedStatus, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn authenticate_returns_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/login"))
        .and(body_json(json!({"email": "ops@kingo.example", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "abc"})))
        .expect(1)
        .mount(&server)
        .await;

    let token = test_client(&server)
        .authenticate("ops@kingo.example", "pw")
        .await
        .expect("token");
    assert_eq!(token, "abc");
}

#[tokio::test]
async fn rejected_login_is_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "invalid credentials"})),
        )
        .mount(&server)
        .await;

    let err = test_client(&server)
        .authenticate("ops@kingo.example", "wrong")
        .await
        .expect_err("should fail");
    match err {
        VendorError::Authentication { reason } => {
            assert!(reason.contains("401"));
            assert!(reason.contains("invalid credentials"));
        }
        other => panic!("expected Authentication, got: {other:?}"),
    }
}
