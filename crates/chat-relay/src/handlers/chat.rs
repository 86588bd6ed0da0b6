//! The `/chat` relay handler.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::error::RelayError;
use crate::llm::{self, Message};
use crate::server::AppState;

pub const MODEL: &str = "gpt-3.5-turbo";
pub const MAX_TOKENS: u32 = 150;
pub const TEMPERATURE: f32 = 0.7;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Inbound body. `message` is kept loosely typed so a wrong type is a 400,
/// not an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    message: Option<Value>,
}

impl ChatRequest {
    /// The message text, if present, a string, and non-empty.
    pub fn message(&self) -> Option<&str> {
        match &self.message {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /chat
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, RelayError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(error = %rejection, "rejected chat body");
            ChatRequest::default()
        }
    };

    let Some(message) = request.message() else {
        return Err(RelayError::MissingMessage);
    };

    if state.config.api_key().is_none() {
        return Err(RelayError::MissingApiKey);
    }

    let completion = state
        .provider
        .chat(completion_request(message))
        .await
        .and_then(|resp| resp.into_text())
        .inspect_err(|e| error!(error = %e, status = ?e.status(), "OpenAI API error"))?;

    Ok(Json(ChatResponse {
        response: completion,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn completion_request(message: &str) -> llm::ChatRequest {
    llm::ChatRequest {
        model: MODEL.to_string(),
        messages: vec![Message::user(message)],
        temperature: Some(TEMPERATURE),
        max_tokens: Some(MAX_TOKENS),
    }
}
