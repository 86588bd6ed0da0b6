//! Relay error types and their HTTP mapping.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::llm::LLMError;
use crate::response;

pub const MESSAGE_REQUIRED: &str = "Message is required";
pub const API_KEY_NOT_CONFIGURED: &str =
    "OpenAI API key not configured. Please set OPENAI_API_KEY in your .env file.";
pub const INVALID_API_KEY: &str =
    "Invalid OpenAI API key. Please check your API key configuration.";
pub const RATE_LIMITED: &str = "OpenAI API rate limit exceeded. Please try again later.";
pub const INVALID_REQUEST: &str = "Invalid request to OpenAI API.";
pub const REQUEST_FAILED: &str = "Failed to process your request. Please try again later.";

/// Errors surfaced by the `/chat` route.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("message is required")]
    MissingMessage,

    #[error("provider api key not configured")]
    MissingApiKey,

    #[error("provider call failed: {0}")]
    Provider(#[from] LLMError),

    #[error("request timed out")]
    Timeout,

    #[error("middleware failure")]
    Middleware,
}

impl RelayError {
    /// Status and user-facing message. Never includes upstream detail.
    pub fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            RelayError::MissingMessage => (StatusCode::BAD_REQUEST, MESSAGE_REQUIRED),
            RelayError::MissingApiKey => {
                (StatusCode::INTERNAL_SERVER_ERROR, API_KEY_NOT_CONFIGURED)
            }
            RelayError::Provider(e) => classify(e),
            RelayError::Timeout | RelayError::Middleware => {
                (StatusCode::INTERNAL_SERVER_ERROR, REQUEST_FAILED)
            }
        }
    }
}

/// Map a provider failure to the status and message shown to the caller.
pub fn classify(err: &LLMError) -> (StatusCode, &'static str) {
    match err {
        LLMError::MissingApiKey => (StatusCode::INTERNAL_SERVER_ERROR, API_KEY_NOT_CONFIGURED),
        LLMError::RateLimit { .. } => (StatusCode::TOO_MANY_REQUESTS, RATE_LIMITED),
        LLMError::Api { status, .. } => match status {
            401 => (StatusCode::INTERNAL_SERVER_ERROR, INVALID_API_KEY),
            429 => (StatusCode::TOO_MANY_REQUESTS, RATE_LIMITED),
            400 => (StatusCode::BAD_REQUEST, INVALID_REQUEST),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, REQUEST_FAILED),
        },
        LLMError::Request(_) | LLMError::EmptyCompletion => {
            (StatusCode::INTERNAL_SERVER_ERROR, REQUEST_FAILED)
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let mut response = response::error(status, message);

        if let RelayError::Provider(LLMError::RateLimit {
            retry_after: Some(secs),
        }) = self
        {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }

        response
    }
}
