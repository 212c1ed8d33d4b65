pub mod app_config;
pub mod catalog;
pub mod config;
pub mod session;
pub mod slug;

pub use app_config::{AppConfig, Environment};
pub use catalog::{
    CatalogItem, Category, PLACEHOLDER_CATEGORY_NAME, PLACEHOLDER_DISPLAY_NAME,
    PLACEHOLDER_IMAGE_URL,
};
pub use config::{load_app_config, load_app_config_from_env, normalize_shop_domain};
pub use session::{SessionError, SessionState, SessionStore};
pub use slug::{generate_slug, load_slug_map, resolve_slug, SlugMap};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read slug map at {path}: {source}")]
    SlugMapIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse slug map: {0}")]
    SlugMapParse(#[from] serde_yaml::Error),

    #[error("config validation failed: {0}")]
    Validation(String),
}
