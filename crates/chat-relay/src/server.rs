use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::routing::{get, post};
use axum::{BoxError, Router};
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tracing::error;

use crate::config::ProviderConfig;
use crate::error::RelayError;
use crate::handlers;
use crate::llm::LLMProvider;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn LLMProvider>,
    pub config: Arc<ProviderConfig>,
}

impl AppState {
    pub fn new(provider: Arc<dyn LLMProvider>, config: ProviderConfig) -> Self {
        Self {
            provider,
            config: Arc::new(config),
        }
    }
}

/// Build the application router. Binding a listener is left to the caller.
///
/// Requests running longer than `request_timeout_secs` are answered with the
/// generic 500 error body.
pub fn build_app(state: AppState, request_timeout_secs: u64) -> Router {
    Router::new()
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz))
        .route("/chat", post(handlers::chat))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(Duration::from_secs(request_timeout_secs))),
        )
}

async fn handle_middleware_error(err: BoxError) -> RelayError {
    if err.is::<Elapsed>() {
        error!("request timed out waiting for the provider");
        RelayError::Timeout
    } else {
        error!(error = %err, "unhandled middleware error");
        RelayError::Middleware
    }
}
