use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("SHAREFOX_SHOP_DOMAIN", "kingorides");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_is_error() {
    let result = parse_environment("staging");
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "KINGO_ENV"),
        "expected InvalidEnvVar(KINGO_ENV), got: {result:?}"
    );
}

#[test]
fn normalize_shop_domain_appends_vendor_suffix() {
    assert_eq!(
        normalize_shop_domain("kingorides"),
        "kingorides.mysharefox.com"
    );
}

#[test]
fn normalize_shop_domain_keeps_full_domain() {
    assert_eq!(
        normalize_shop_domain("kingorides.mysharefox.com"),
        "kingorides.mysharefox.com"
    );
    assert_eq!(normalize_shop_domain("rent.example.com"), "rent.example.com");
}

#[test]
fn normalize_shop_domain_strips_scheme_and_slash() {
    assert_eq!(
        normalize_shop_domain("https://kingorides.mysharefox.com/"),
        "kingorides.mysharefox.com"
    );
}

#[test]
fn normalize_shop_domain_empty_stays_empty() {
    assert_eq!(normalize_shop_domain("   "), "");
}

#[test]
fn build_app_config_fails_without_shop_domain() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "SHAREFOX_SHOP_DOMAIN"),
        "expected MissingEnvVar(SHAREFOX_SHOP_DOMAIN), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_shop_domain_as_missing() {
    let mut map = HashMap::new();
    map.insert("SHAREFOX_SHOP_DOMAIN", "  ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).expect("config");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.shop_domain, "kingorides.mysharefox.com");
    assert_eq!(cfg.api_base_url, "https://api.mysharefox.com");
    assert!(cfg.shop_base_url.is_none());
    assert!(cfg.booking_base_url.is_none());
    assert!(cfg.api_token.is_none());
    assert_eq!(cfg.search_route, "/search");
    assert!(cfg.vendor_timeout_secs.is_none());
    assert_eq!(cfg.user_agent, "kingo/0.1 (catalog)");
    assert_eq!(
        cfg.slug_map_path,
        std::path::PathBuf::from("./config/slugs.yaml")
    );
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = full_env();
    map.insert("SHAREFOX_BOOKING_URL", "https://kingorides.mysharefox.com/en");
    map.insert("SHAREFOX_API_TOKEN", "secret-token");
    map.insert("KINGO_VENDOR_TIMEOUT_SECS", "15");
    map.insert("KINGO_SEARCH_ROUTE", "/find");
    let cfg = build_app_config(lookup_from_map(&map)).expect("config");
    assert_eq!(
        cfg.booking_base_url.as_deref(),
        Some("https://kingorides.mysharefox.com/en")
    );
    assert_eq!(cfg.api_token.as_deref(), Some("secret-token"));
    assert_eq!(cfg.vendor_timeout_secs, Some(15));
    assert_eq!(cfg.search_route, "/find");
}

#[test]
fn build_app_config_rejects_invalid_timeout() {
    let mut map = full_env();
    map.insert("KINGO_VENDOR_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "KINGO_VENDOR_TIMEOUT_SECS"),
        "expected InvalidEnvVar(KINGO_VENDOR_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_relative_api_base() {
    let mut map = full_env();
    map.insert("SHAREFOX_API_BASE_URL", "/api/sharefox");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHAREFOX_API_BASE_URL"),
        "expected InvalidEnvVar(SHAREFOX_API_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_search_route_without_slash() {
    let mut map = full_env();
    map.insert("KINGO_SEARCH_ROUTE", "search");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "KINGO_SEARCH_ROUTE"
    ));
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = full_env();
    map.insert("KINGO_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "KINGO_BIND_ADDR"),
        "expected InvalidEnvVar(KINGO_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = full_env();
    map.insert("SHAREFOX_API_TOKEN", "secret-token");
    map.insert("SHAREFOX_ADMIN_PASSWORD", "hunter2");
    let cfg = build_app_config(lookup_from_map(&map)).expect("config");
    let debug = format!("{cfg:?}");
    assert!(!debug.contains("secret-token"));
    assert!(!debug.contains("hunter2"));
    assert!(debug.contains("[redacted]"));
}
