//! RevalRelay standalone relay process
//!
//! Receives CMS change notifications over HTTP and fans out signed
//! revalidation webhooks to the configured front-end endpoints.
//!
//! Configuration is environment-based:
//! - `REVALRELAY_ENABLED`: master switch (default false)
//! - `REVALRELAY_WEBHOOK_URLS`: JSON array of endpoint URLs
//! - `REVALRELAY_WEBHOOK_SECRET`: HMAC key shared with the endpoints
//! - `REVALRELAY_API_PORT`: ingestion API port (default 8080)
//! - `REVALRELAY_REQUEST_TIMEOUT_SECS`: per-endpoint request timeout
//! - `REVALRELAY_CONTENT_PATHS_FILE`: optional JSON object of
//!   content id -> public path, for standalone path resolution

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rv_api::create_router;
use rv_revalidate::{
    DispatcherConfig, HttpWebhookDispatcher, RevalidateConfig, RevalidateEventHandler,
    RevalidateService, StaticPathResolver,
};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Starting RevalRelay");

    // 1. Load relay configuration (fails fast on malformed URL lists)
    let config = Arc::new(RevalidateConfig::from_env().context("invalid relay configuration")?);

    // 2. Build the dispatcher with one pooled client for the process lifetime
    let dispatcher_config = load_dispatcher_config();
    let dispatcher = Arc::new(
        HttpWebhookDispatcher::new(config.webhook_urls.clone(), dispatcher_config)
            .context("failed to build webhook dispatcher")?,
    );

    // 3. Wire service, resolver and classifier
    let service = Arc::new(RevalidateService::new(config.clone(), dispatcher));
    let resolver = Arc::new(load_path_resolver()?);
    let handler = Arc::new(RevalidateEventHandler::new(
        config.clone(),
        service,
        resolver.clone(),
    ));

    // 4. Serve the ingestion API
    let api_port: u16 = std::env::var("REVALRELAY_API_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);

    let app = create_router(handler)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    log_startup_summary(&config, resolver.len(), api_port);

    let addr = format!("0.0.0.0:{}", api_port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(port = api_port, "Ingestion API listening. Press Ctrl+C to shutdown.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("RevalRelay shutdown complete");
    Ok(())
}

/// Load dispatcher timeouts from environment variables
fn load_dispatcher_config() -> DispatcherConfig {
    let defaults = DispatcherConfig::default();

    let connect_timeout = std::env::var("REVALRELAY_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(defaults.connect_timeout);

    let request_timeout = std::env::var("REVALRELAY_REQUEST_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(defaults.request_timeout);

    DispatcherConfig {
        connect_timeout,
        request_timeout,
    }
}

/// Load the content path map, if one is configured
fn load_path_resolver() -> Result<StaticPathResolver> {
    match std::env::var("REVALRELAY_CONTENT_PATHS_FILE") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read content path map {}", path))?;
            let resolver = StaticPathResolver::from_json(&raw)
                .with_context(|| format!("invalid content path map {}", path))?;
            info!(file = %path, entries = resolver.len(), "Loaded content path map");
            Ok(resolver)
        }
        Err(_) => {
            warn!("No content path map configured - content-path revalidation will be skipped");
            Ok(StaticPathResolver::new())
        }
    }
}

/// Log startup summary
fn log_startup_summary(config: &RevalidateConfig, resolver_entries: usize, api_port: u16) {
    info!("=== RevalRelay Startup Summary ===");
    if config.enabled {
        info!("  Relay: ENABLED");
    } else {
        info!("  Relay: DISABLED (events are received and ignored)");
    }
    info!("  Webhook endpoints: {}", config.webhook_urls.len());
    for url in &config.webhook_urls {
        info!("    - {}", url);
    }
    info!("  Content path map entries: {}", resolver_entries);
    info!("  API port: {}", api_port);
    info!("==================================");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
