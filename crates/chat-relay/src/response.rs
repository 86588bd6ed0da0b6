//! JSON response bodies and helpers.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Error body returned by every failing route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatErrorResponse {
    pub error: String,
}

pub fn error(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ChatErrorResponse {
        error: message.into(),
    };
    (status, Json(body)).into_response()
}
