//! Catalog command handlers for the CLI.
//!
//! Vendor exhaustion is not treated as a failure: the command prints the
//! empty-state message and exits successfully, matching what the host
//! pages show.

use chrono::NaiveDate;
use kingo_core::{AppConfig, CatalogItem, Category};
use kingo_sharefox::error::EMPTY_STATE_MESSAGE;
use kingo_sharefox::{BookingRequest, RecordSource, SharefoxClient, VendorError};
use serde::Serialize;

/// Client with the slug map loaded; never touches the network.
pub(crate) fn offline_client(config: &AppConfig) -> anyhow::Result<SharefoxClient> {
    let slug_map = kingo_core::load_slug_map(&config.slug_map_path)?;
    tracing::debug!(entries = slug_map.len(), "loaded slug map");
    SharefoxClient::from_app_config(config, slug_map)
        .map_err(|e| anyhow::anyhow!("failed to build ShareFox client: {e}"))
}

/// [`offline_client`], logged in with the admin credentials when no API
/// token is configured. A failed login is logged and the client is used
/// unauthenticated.
pub(crate) async fn build_client(config: &AppConfig) -> anyhow::Result<SharefoxClient> {
    let client = offline_client(config)?;
    if client.has_bearer_token() {
        return Ok(client);
    }
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(client);
    };
    match client.authenticate(email, password).await {
        Ok(token) => Ok(client.with_bearer_token(token)),
        Err(e) => {
            tracing::warn!(error = %e, "admin login failed; continuing unauthenticated");
            Ok(client)
        }
    }
}

pub(crate) async fn run_products(client: &SharefoxClient, json: bool) -> anyhow::Result<()> {
    match client.products().await {
        Ok(resolved) => print_items(&resolved.items, &resolved.source, json),
        Err(e) => empty_or_fail(e, json),
    }
}

pub(crate) async fn run_categories(client: &SharefoxClient, json: bool) -> anyhow::Result<()> {
    match client.categories().await {
        Ok(resolved) => print_categories(&resolved.items, &resolved.source, json),
        Err(e) => empty_or_fail(e, json),
    }
}

pub(crate) async fn run_search(
    client: &SharefoxClient,
    query: &str,
    json: bool,
) -> anyhow::Result<()> {
    match client.search(query).await {
        Ok(results) => {
            tracing::info!(
                query = %results.query,
                source = ?results.source,
                hits = results.items.len(),
                "search complete"
            );
            print_items(&results.items, &results.records_from, json)
        }
        Err(e) => empty_or_fail(e, json),
    }
}

pub(crate) async fn run_available(
    client: &SharefoxClient,
    from: NaiveDate,
    to: NaiveDate,
    json: bool,
) -> anyhow::Result<()> {
    match client.available_products(from, to).await {
        Ok(resolved) => print_items(&resolved.items, &resolved.source, json),
        Err(e) => empty_or_fail(e, json),
    }
}

pub(crate) async fn run_product(
    client: &SharefoxClient,
    id: &str,
    json: bool,
) -> anyhow::Result<()> {
    let item = client.product_by_id(id).await?;
    if json {
        print_json(&item)
    } else {
        println!("{}", item_line(&item));
        if let Some(price) = &item.price {
            println!("  price: {price}");
        }
        println!("  image: {}", item.image_or_placeholder());
        Ok(())
    }
}

pub(crate) fn run_booking_url(
    client: &SharefoxClient,
    request: &BookingRequest,
    json: bool,
) -> anyhow::Result<()> {
    if let (Some(start), Some(end)) = (request.start, request.end) {
        anyhow::ensure!(start <= end, "start {start} is after end {end}");
    }
    let url = kingo_sharefox::booking_url(client.shop(), request, client.slug_map());
    if json {
        print_json(&serde_json::json!({ "url": url }))
    } else {
        println!("{url}");
        Ok(())
    }
}

fn empty_or_fail(error: VendorError, json: bool) -> anyhow::Result<()> {
    if !error.is_exhausted() {
        return Err(error.into());
    }
    tracing::warn!(error = %error, "vendor exhausted");
    if json {
        println!("[]");
    } else {
        println!("{EMPTY_STATE_MESSAGE}");
    }
    Ok(())
}

fn print_items(items: &[CatalogItem], source: &RecordSource, json: bool) -> anyhow::Result<()> {
    tracing::info!(%source, count = items.len(), "records resolved");
    if json {
        return print_json(items);
    }
    if items.is_empty() {
        println!("no products found");
    }
    for item in items {
        println!("{}", item_line(item));
    }
    Ok(())
}

fn print_categories(categories: &[Category], source: &RecordSource, json: bool) -> anyhow::Result<()> {
    tracing::info!(%source, count = categories.len(), "categories resolved");
    if json {
        return print_json(categories);
    }
    for category in categories {
        println!("{:<24} {}", category.id, category.display_name);
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One-line summary: id, name, and whatever of category/slug is known.
pub(crate) fn item_line(item: &CatalogItem) -> String {
    let mut line = format!("{:<12} {}", item.id, item.display_name);
    if let Some(category) = &item.category {
        line.push_str(&format!(" [{category}]"));
    }
    if let Some(slug) = &item.slug {
        line.push_str(&format!(" ({slug})"));
    }
    line
}
