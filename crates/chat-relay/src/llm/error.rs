//! LLM error types.

use thiserror::Error;

/// Check an HTTP response for rate-limit errors, returning `RateLimit` for 429.
pub fn check_response_error(response: &reqwest::Response) -> Option<LLMError> {
    if response.status().is_success() {
        return None;
    }
    if response.status().as_u16() == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);
        return Some(LLMError::RateLimit { retry_after });
    }
    None
}

/// Parse a `Retry-After` value given in whole seconds. HTTP dates are ignored.
fn parse_retry_after(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

/// Errors that can occur when making LLM API calls.
#[derive(Debug, Error)]
pub enum LLMError {
    /// HTTP request failed
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned an error response
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Rate limited (429)
    #[error("rate limited (retry after {retry_after:?}s)")]
    RateLimit { retry_after: Option<u64> },

    /// No API key was available, so no request was sent
    #[error("api key not configured")]
    MissingApiKey,

    /// The provider answered without any completion choice
    #[error("completion contained no choices")]
    EmptyCompletion,
}

impl LLMError {
    /// The HTTP status reported by the provider, if it got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            LLMError::Api { status, .. } => Some(*status),
            LLMError::RateLimit { .. } => Some(429),
            LLMError::Request(e) => e.status().map(|s| s.as_u16()),
            LLMError::MissingApiKey | LLMError::EmptyCompletion => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_retry_after_seconds() {
        assert_eq!(parse_retry_after("20"), Some(20));
        assert_eq!(parse_retry_after(" 3 "), Some(3));
    }

    #[test]
    fn parse_retry_after_rejects_http_date() {
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
        assert_eq!(parse_retry_after(""), None);
    }

    #[test]
    fn status_of_api_error() {
        let err = LLMError::Api {
            status: 503,
            message: "overloaded".to_string(),
        };
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn status_of_rate_limit_is_429() {
        let err = LLMError::RateLimit { retry_after: None };
        assert_eq!(err.status(), Some(429));
    }

    #[test]
    fn local_errors_have_no_status() {
        assert_eq!(LLMError::MissingApiKey.status(), None);
        assert_eq!(LLMError::EmptyCompletion.status(), None);
    }

    #[test]
    fn display_includes_status_and_message() {
        let err = LLMError::Api {
            status: 400,
            message: "bad things".to_string(),
        };
        assert_eq!(err.to_string(), "api error (status 400): bad things");
    }
}
