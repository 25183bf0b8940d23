//! HTTP server wiring: shared state, router, and startup.

pub mod handlers;

use crate::config::ServiceConfig;
use crate::llm::SqlGenerator;
use crate::types::error::Result;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
///
/// The generator slot starts empty and is filled exactly once when the
/// completion endpoint comes up; nothing else is shared across requests.
pub struct AppState {
    pub config: ServiceConfig,
    pub generator: RwLock<Option<SqlGenerator>>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            generator: RwLock::new(None),
        }
    }

    pub async fn model_loaded(&self) -> bool {
        self.generator.read().await.is_some()
    }
}

/// Create the service router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ask", post(handlers::ask))
        .route("/health", get(handlers::health))
        .route("/schema", get(handlers::schema))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server.
///
/// The generator initializes in the background so `/health` answers
/// immediately; `/ask` reports the model as unready until the endpoint
/// probe succeeds.
pub async fn serve(config: ServiceConfig) -> Result<()> {
    let state = Arc::new(AppState::new(config));

    let init_state = state.clone();
    tokio::spawn(async move {
        match SqlGenerator::connect(init_state.config.llm.clone()).await {
            Ok(generator) => {
                *init_state.generator.write().await = Some(generator);
            }
            Err(e) => {
                tracing::error!("generator initialization failed: {}", e);
            }
        }
    });

    let bind_addr = state.config.bind_addr.clone();
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", bind_addr);
    axum::serve(listener, router).await?;

    Ok(())
}
