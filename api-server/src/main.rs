//! Medora Prediction API Server
//!
//! HTTP transport over the `medora_core` diagnostic engine.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                    MEDORA API                        │
//! ├──────────────────────────────────────────────────────┤
//! │  ┌───────────┐        ┌────────────────────────────┐ │
//! │  │  Router   │ ─────▶ │  EngineState               │ │
//! │  │  (Axum)   │        │  Ready(DiagnosticEngine)   │ │
//! │  └───────────┘        │  Unavailable(reason)       │ │
//! │                       └─────────────┬──────────────┘ │
//! │                                     ▼                │
//! │                        ┌────────────────────────┐    │
//! │                        │ Model store (ONNX/JSON)│    │
//! │                        └────────────────────────┘    │
//! └──────────────────────────────────────────────────────┘
//! ```

mod config;
mod models;
mod handlers;
mod error;

#[cfg(test)]
mod tests;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
    http::{header, HeaderValue, Method},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::net::SocketAddr;

use medora_core::EngineState;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    init_logging(&config);

    tracing::info!("Medora API Server starting...");
    tracing::info!("Model directory: {}", config.engine.model_dir.display());

    // Model loading reads and hashes files; keep it off the runtime threads
    let engine_config = config.engine.clone();
    let engine = tokio::task::spawn_blocking(move || EngineState::initialize(&engine_config))
        .await
        .context("Engine initialization task panicked")?;

    match engine.unavailable_reason() {
        None => tracing::info!("✅ ML model loaded"),
        Some(reason) => tracing::warn!("Serving without a model: {}", reason),
    }

    // Build application state
    let state = AppState {
        engine,
        config: config.clone(),
    };

    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_logging(config: &config::Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "medora_api=debug,medora_core=info,tower_http=debug".into());

    // JSON lines in production, human-readable otherwise
    let (json_layer, plain_layer) = if config.is_production() {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(plain_layer)
        .init();
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: EngineState,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/", get(handlers::health::home))
        .route("/api/health", get(handlers::health::check))
        .route("/api/predict", post(handlers::predict::predict))
        .route("/api/batch-predict", post(handlers::predict::batch_predict))
        .fallback(handlers::not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let patterns = allowed_origins.to_vec();
        AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .map(|o| config::origin_allowed(&patterns, o))
                .unwrap_or(false)
        })
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
