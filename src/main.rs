//! Review Chunker Service - Main Entry Point
//!
//! Serves the review chunker over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use review_chunker::api::{self, AppState};
use review_chunker::output::{EmbeddingClient, KeywordClient};
use review_chunker::types::ServiceConfig;

/// Initialize tracing, using JSON output when `LOG_FORMAT=json`.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "review_chunker=info,tower_http=debug".into()),
    );
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServiceConfig::from_env()?;

    info!("Starting Review Chunker v{}", env!("CARGO_PKG_VERSION"));
    info!(
        max_len = config.max_len,
        low_watermark = config.low_watermark,
        high_watermark = config.high_watermark,
        "Chunk limits"
    );

    let embedding_client = EmbeddingClient::from_config(&config)?;
    match &embedding_client {
        Some(client) if client.health_check().await => info!("Embedding service reachable"),
        Some(_) => tracing::warn!("Embedding service not reachable yet"),
        None => info!("No embedding service configured; /index disabled"),
    }

    let keyword_client = KeywordClient::from_config(&config)?;
    if keyword_client.is_none() {
        info!("No chat service configured; /keywords disabled");
    }

    let port = config.port;
    let state = Arc::new(AppState::new(config, embedding_client).with_keyword_client(keyword_client));

    let app = api::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
