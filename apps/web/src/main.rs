use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use portfolio_web::config::Config;
use portfolio_web::routes::build_router;
use portfolio_web::service::HttpPortfolioService;
use portfolio_web::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting portfolio web v{}", env!("CARGO_PKG_VERSION"));

    // Initialize backend client
    let service = HttpPortfolioService::new(&config.backend_url)?;
    info!("Backend client initialized ({})", config.backend_url);

    // Build app state
    let state = AppState::new(config.clone(), Arc::new(service))?;

    // Warm the template catalog; a failure is logged and retried on next use
    let catalog = state.catalog.get().await;
    info!("{} templates available", catalog.len());

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
