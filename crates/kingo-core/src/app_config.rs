use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Full vendor shop domain, e.g. `kingorides.mysharefox.com`.
    pub shop_domain: String,
    /// Override for the shop origin used by shop-scoped API paths.
    /// Defaults to `https://{shop_domain}` when unset.
    pub shop_base_url: Option<String>,
    /// Base URL of customer-facing booking pages, e.g.
    /// `https://kingorides.mysharefox.com/en`.
    pub booking_base_url: Option<String>,
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub slug_map_path: PathBuf,
    pub session_path: PathBuf,
    /// Host route that receives search terms intercepted from vendor embeds.
    pub search_route: String,
    /// Whole-request timeout for vendor calls. `None` leaves requests unbounded.
    pub vendor_timeout_secs: Option<u64>,
    pub user_agent: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("shop_domain", &self.shop_domain)
            .field("shop_base_url", &self.shop_base_url)
            .field("booking_base_url", &self.booking_base_url)
            .field("api_base_url", &self.api_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[redacted]"))
            .field("admin_email", &self.admin_email)
            .field(
                "admin_password",
                &self.admin_password.as_ref().map(|_| "[redacted]"),
            )
            .field("slug_map_path", &self.slug_map_path)
            .field("session_path", &self.session_path)
            .field("search_route", &self.search_route)
            .field("vendor_timeout_secs", &self.vendor_timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
