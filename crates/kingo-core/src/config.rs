use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Suffix appended to bare shop subdomains.
const VENDOR_DOMAIN_SUFFIX: &str = "mysharefox.com";

const DEFAULT_API_BASE_URL: &str = "https://api.mysharefox.com";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Expand a shop identifier to the full domain the vendor API expects.
///
/// `"kingorides"` becomes `"kingorides.mysharefox.com"`; anything already
/// containing a dot (including custom domains) is returned trimmed.
#[must_use]
pub fn normalize_shop_domain(domain: &str) -> String {
    let trimmed = domain.trim().trim_end_matches('/');
    let trimmed = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    if trimmed.is_empty() || trimmed.contains('.') {
        trimmed.to_string()
    } else {
        format!("{trimmed}.{VENDOR_DOMAIN_SUFFIX}")
    }
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_optional_u64 = |var: &str| -> Result<Option<u64>, ConfigError> {
        optional(var)
            .map(|raw| {
                raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    };

    let shop_domain = normalize_shop_domain(&require("SHAREFOX_SHOP_DOMAIN")?);

    let env = parse_environment(&or_default("KINGO_ENV", "development"))?;
    let bind_addr = parse_addr("KINGO_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("KINGO_LOG_LEVEL", "info");

    let shop_base_url = optional("SHAREFOX_SHOP_BASE_URL");
    let booking_base_url = optional("SHAREFOX_BOOKING_URL");
    let api_base_url = or_default("SHAREFOX_API_BASE_URL", DEFAULT_API_BASE_URL);
    for (var, value) in [
        ("SHAREFOX_API_BASE_URL", Some(&api_base_url)),
        ("SHAREFOX_SHOP_BASE_URL", shop_base_url.as_ref()),
        ("SHAREFOX_BOOKING_URL", booking_base_url.as_ref()),
    ] {
        if let Some(value) = value {
            validate_http_url(var, value)?;
        }
    }

    let api_token = optional("SHAREFOX_API_TOKEN");
    let admin_email = optional("SHAREFOX_ADMIN_EMAIL");
    let admin_password = optional("SHAREFOX_ADMIN_PASSWORD");

    let slug_map_path = PathBuf::from(or_default("KINGO_SLUG_MAP_PATH", "./config/slugs.yaml"));
    let session_path = PathBuf::from(or_default("KINGO_SESSION_PATH", "./.kingo/session.json"));

    let search_route = or_default("KINGO_SEARCH_ROUTE", "/search");
    if !search_route.starts_with('/') {
        return Err(ConfigError::InvalidEnvVar {
            var: "KINGO_SEARCH_ROUTE".to_string(),
            reason: format!("route '{search_route}' must start with '/'"),
        });
    }

    let vendor_timeout_secs = parse_optional_u64("KINGO_VENDOR_TIMEOUT_SECS")?;
    let user_agent = or_default("KINGO_USER_AGENT", "kingo/0.1 (catalog)");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        shop_domain,
        shop_base_url,
        booking_base_url,
        api_base_url,
        api_token,
        admin_email,
        admin_password,
        slug_map_path,
        session_path,
        search_route,
        vendor_timeout_secs,
        user_agent,
    })
}

fn validate_http_url(var: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("https://") || value.starts_with("http://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("'{value}' must be an absolute http(s) URL"),
        })
    }
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "KINGO_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
