//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::error::ApiError;
use crate::models::{AppConfig, RenderRequest};
use crate::services::{HttpFetcher, ImageFetcher, RenderService};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub renderer: Arc<RenderService>,
}

/// Create application state with the production HTTP fetcher.
pub fn create_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let fetcher = HttpFetcher::new(&config.fetch.user_agent, config.limits.max_download_bytes)
        .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {e}"))?;
    Ok(create_app_state_with_fetcher(config, Arc::new(fetcher)))
}

/// Create application state around any [`ImageFetcher`].
pub fn create_app_state_with_fetcher(
    config: AppConfig,
    fetcher: Arc<dyn ImageFetcher>,
) -> AppState {
    let config = Arc::new(config);
    let renderer = Arc::new(RenderService::new(config.clone(), fetcher));
    AppState { config, renderer }
}

/// Build the API router with all endpoints and middleware.
///
/// This is the core router used by both production and tests.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/render", post(handle_render))
        // Health check
        .route("/", get(|| async { "OK" }))
        .route("/health", get(|| async { "OK" }))
        // Add state and tracing
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// Wrapper handler to extract the state component for the API handler

async fn handle_render(
    State(state): State<AppState>,
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<axum::response::Response, ApiError> {
    api::handle_render(State(state.renderer), payload).await
}
