//! # vital_api
//!
//! HTTP API library for Vital.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use vital_core::{ChatRelay, TextGenerator};

use crate::config::ApiConfig;
use crate::handlers::{chat, health};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: ApiConfig,
    /// Relay bound to the configured provider.
    pub relay: Arc<ChatRelay>,
}

impl AppState {
    /// Wire the relay to `generator` using the provider settings in `config`.
    pub fn new(config: ApiConfig, generator: Arc<dyn TextGenerator>) -> Self {
        let relay = Arc::new(ChatRelay::new(config.provider.clone(), generator));
        Self { config, relay }
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            routes::API_CHAT,
            post(chat::chat_handler).fallback(chat::method_not_allowed),
        )
        .route(routes::API_HEALTH, get(health::health_handler))
        .layer(cors)
        .with_state(state)
}
