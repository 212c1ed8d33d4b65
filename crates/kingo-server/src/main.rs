mod api;
mod middleware;
mod pages;

use std::sync::Arc;

use kingo_sharefox::SharefoxClient;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = kingo_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let slug_map = kingo_core::load_slug_map(&config.slug_map_path)?;
    tracing::info!(
        path = %config.slug_map_path.display(),
        entries = slug_map.len(),
        "loaded slug map"
    );

    let mut client = SharefoxClient::from_app_config(&config, slug_map)?;
    if !client.has_bearer_token() {
        if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
            match client.authenticate(email, password).await {
                Ok(token) => client = client.with_bearer_token(token),
                Err(e) => tracing::warn!(error = %e, "admin login failed; continuing unauthenticated"),
            }
        }
    }

    tracing::info!(
        shop_domain = %client.shop().shop_domain,
        env = %config.env,
        "starting kingo-server"
    );

    let app = build_app(AppState {
        client,
        search_route: Arc::from(config.search_route.as_str()),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
