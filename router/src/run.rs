//! Server bootstrap: config, adapters, HTTP wiring, graceful shutdown.

use axum::Router;
use axum::http::Method;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use corridor_registry::NetworkRegistry;
use corridor_settlement::{
    AdapterRegistry, InMemoryOrderStore, InMemoryOutbox, SettlementRouter, handlers,
};

use crate::chain::build_chains;
use crate::config::Config;
use crate::shutdown;

/// Initializes the Corridor router server.
///
/// - Loads `.env` variables and the JSON config.
/// - Constructs one adapter per enabled network; any failure aborts startup.
/// - Starts an Axum HTTP server with graceful shutdown on SIGTERM/SIGINT.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;

    let built = build_chains(&config)?;
    tracing::info!(
        networks = built.networks.len(),
        adapters = built.adapters.len(),
        tokens = built.tokens.len(),
        "constructed settlement catalog"
    );

    let registry = Arc::new(NetworkRegistry::new(built.networks, built.tokens));
    let router = SettlementRouter::new(
        registry,
        AdapterRegistry::from_adapters(built.adapters),
        Arc::new(InMemoryOrderStore::new()),
        Arc::new(InMemoryOutbox::new()),
    );
    let axum_state = Arc::new(router);

    let http_endpoints = Router::new()
        .merge(handlers::routes().with_state(axum_state))
        .layer(TraceLayer::new_for_http())
        .layer(
            cors::CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(cors::Any),
        );

    let addr = SocketAddr::new(config.host(), config.port());
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .inspect_err(|e| tracing::error!("Failed to bind to {}: {}", addr, e))?;

    let termination = shutdown::termination_token()?;
    axum::serve(listener, http_endpoints)
        .with_graceful_shutdown(async move { termination.cancelled().await })
        .await?;

    Ok(())
}
