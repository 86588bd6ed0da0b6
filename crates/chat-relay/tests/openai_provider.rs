//! Tests for the OpenAI-compatible provider against an in-process fake API.

use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde_json::{Value, json};

use chat_relay::llm::{ChatRequest, LLMError, LLMProvider, Message, OpenAICompatibleProvider};

#[derive(Clone)]
struct FakeApi {
    status: StatusCode,
    body: Value,
    retry_after: Option<&'static str>,
    seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

impl FakeApi {
    fn new(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body,
            retry_after: None,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn seen(&self) -> Vec<(Option<String>, Value)> {
        self.seen.lock().unwrap().clone()
    }
}

async fn completions(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    api.seen.lock().unwrap().push((auth, body));

    let mut response = (api.status, Json(api.body.clone())).into_response();
    if let Some(value) = api.retry_after {
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from_static(value));
    }
    response
}

/// Serve the fake API on an ephemeral port and return its base URL.
async fn serve(api: FakeApi) -> String {
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(api);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v1")
}

fn request(text: &str) -> ChatRequest {
    ChatRequest {
        model: "gpt-3.5-turbo".to_string(),
        messages: vec![Message::user(text)],
        temperature: Some(0.7),
        max_tokens: Some(150),
    }
}

fn provider(base_url: String, key: Option<&str>) -> OpenAICompatibleProvider {
    OpenAICompatibleProvider::new(reqwest::Client::new(), base_url, key.map(str::to_string))
}

fn completion(text: &str) -> Value {
    json!({
        "id": "chatcmpl-abc",
        "object": "chat.completion",
        "created": 1700000000,
        "model": "gpt-3.5-turbo-0125",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "logprobs": null,
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12 }
    })
}

#[tokio::test]
async fn sends_bearer_auth_and_body() {
    let api = FakeApi::new(StatusCode::OK, completion("Hello!"));
    let base_url = serve(api.clone()).await;

    let response = provider(base_url, Some("sk-test"))
        .chat(request("Hi"))
        .await
        .unwrap();
    assert_eq!(response.into_text().unwrap(), "Hello!");

    let seen = api.seen();
    assert_eq!(seen.len(), 1);
    let (auth, body) = &seen[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    assert_eq!(body["model"], "gpt-3.5-turbo");
    assert_eq!(body["max_tokens"], 150);
    assert_eq!(body["messages"], json!([{ "role": "user", "content": "Hi" }]));
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_tolerated() {
    let api = FakeApi::new(StatusCode::OK, completion("ok"));
    let base_url = serve(api.clone()).await;

    let result = provider(format!("{base_url}/"), Some("sk-test"))
        .chat(request("Hi"))
        .await;
    assert!(result.is_ok());
    assert_eq!(api.seen().len(), 1);
}

#[tokio::test]
async fn non_success_status_is_api_error() {
    for status in [
        StatusCode::BAD_REQUEST,
        StatusCode::UNAUTHORIZED,
        StatusCode::SERVICE_UNAVAILABLE,
    ] {
        let api = FakeApi::new(status, json!({ "error": { "message": "nope" } }));
        let base_url = serve(api).await;

        let err = provider(base_url, Some("sk-test"))
            .chat(request("Hi"))
            .await
            .unwrap_err();
        match err {
            LLMError::Api { status: got, message } => {
                assert_eq!(got, status.as_u16());
                assert!(message.contains("nope"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn too_many_requests_is_rate_limit_with_retry_after() {
    let mut api = FakeApi::new(StatusCode::TOO_MANY_REQUESTS, json!({ "error": {} }));
    api.retry_after = Some("17");
    let base_url = serve(api).await;

    let err = provider(base_url, Some("sk-test"))
        .chat(request("Hi"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LLMError::RateLimit {
            retry_after: Some(17)
        }
    ));
}

#[tokio::test]
async fn missing_or_empty_key_sends_nothing() {
    for key in [None, Some("")] {
        let api = FakeApi::new(StatusCode::OK, completion("unused"));
        let base_url = serve(api.clone()).await;

        let err = provider(base_url, key).chat(request("Hi")).await.unwrap_err();
        assert!(matches!(err, LLMError::MissingApiKey));
        assert!(api.seen().is_empty());
    }
}

#[tokio::test]
async fn malformed_success_body_is_request_error() {
    let api = FakeApi::new(StatusCode::OK, json!({ "unexpected": true }));
    let base_url = serve(api).await;

    let err = provider(base_url, Some("sk-test"))
        .chat(request("Hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, LLMError::Request(_)));
}
