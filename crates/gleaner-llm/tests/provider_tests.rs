//! Provider tests against in-process fake HTTP endpoints

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use gleaner_llm::{AzureOpenAiProvider, LlmError, LlmProvider, OllamaProvider, Prompt};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Serve `app` on an ephemeral port and return its base URL
async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn prompt() -> Prompt {
    Prompt::new("You are a test.", "Summarize: the weather is nice")
}

async fn chat_completions(
    Path(deployment): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    match deployment.as_str() {
        "ok" => {
            let echoed = json!({
                "deployment": deployment,
                "api_version": params.get("api-version"),
                "api_key": headers.get("api-key").and_then(|v| v.to_str().ok()),
                "format": body["response_format"]["type"],
                "system": body["messages"][0]["content"],
                "user": body["messages"][1]["content"],
            });
            (
                StatusCode::OK,
                Json(json!({
                    "choices": [{ "message": { "role": "assistant", "content": echoed.to_string() } }]
                })),
            )
                .into_response()
        }
        "empty" => (StatusCode::OK, Json(json!({ "choices": [] }))).into_response(),
        "garbage" => (StatusCode::OK, "not json at all").into_response(),
        "busy" => (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response(),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            (StatusCode::OK, Json(json!({ "choices": [] }))).into_response()
        }
        _ => (StatusCode::NOT_FOUND, "no such deployment").into_response(),
    }
}

async fn azure_server() -> String {
    let app = Router::new().route(
        "/openai/deployments/:deployment/chat/completions",
        post(chat_completions),
    );
    spawn_server(app).await
}

#[tokio::test]
async fn test_azure_sends_expected_request() {
    let base = azure_server().await;
    let provider = AzureOpenAiProvider::new(&base, "ok", "secret-key")
        .unwrap()
        .with_api_version("2024-02-01");

    let reply = provider.generate_structured(&prompt()).await.unwrap();
    let echoed: Value = serde_json::from_str(&reply).unwrap();

    assert_eq!(echoed["deployment"], "ok");
    assert_eq!(echoed["api_version"], "2024-02-01");
    assert_eq!(echoed["api_key"], "secret-key");
    assert_eq!(echoed["format"], "json_object");
    assert_eq!(echoed["system"], "You are a test.");
    assert_eq!(echoed["user"], "Summarize: the weather is nice");
}

#[tokio::test]
async fn test_azure_status_mapping() {
    let base = azure_server().await;

    let busy = AzureOpenAiProvider::new(&base, "busy", "k").unwrap();
    assert_eq!(
        busy.generate_structured(&prompt()).await.unwrap_err(),
        LlmError::RateLimitExceeded
    );

    let missing = AzureOpenAiProvider::new(&base, "missing", "k").unwrap();
    assert!(matches!(
        missing.generate_structured(&prompt()).await,
        Err(LlmError::ModelNotAvailable(_))
    ));

    let broken = AzureOpenAiProvider::new(&base, "broken", "k").unwrap();
    match broken.generate_structured(&prompt()).await {
        Err(LlmError::Communication(msg)) => {
            assert!(msg.contains("500"));
            assert!(msg.contains("boom"));
        }
        other => panic!("expected Communication error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_azure_invalid_envelopes() {
    let base = azure_server().await;

    let empty = AzureOpenAiProvider::new(&base, "empty", "k").unwrap();
    assert!(matches!(
        empty.generate_structured(&prompt()).await,
        Err(LlmError::InvalidResponse(_))
    ));

    let garbage = AzureOpenAiProvider::new(&base, "garbage", "k").unwrap();
    assert!(matches!(
        garbage.generate_structured(&prompt()).await,
        Err(LlmError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_azure_request_timeout() {
    let base = azure_server().await;
    let provider = AzureOpenAiProvider::new(&base, "slow", "k")
        .unwrap()
        .with_request_timeout(Duration::from_millis(200))
        .unwrap();

    assert!(matches!(
        provider.generate_structured(&prompt()).await,
        Err(LlmError::Timeout(_))
    ));
}

#[tokio::test]
async fn test_ollama_generate_roundtrip() {
    let app = Router::new().route(
        "/api/generate",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["stream"], false);
            assert_eq!(body["format"], "json");
            let reply = json!({ "model": body["model"], "system": body["system"] });
            Json(json!({ "response": reply.to_string(), "done": true }))
        }),
    );
    let base = spawn_server(app).await;

    let provider = OllamaProvider::new(&base, "llama3").unwrap();
    let reply = provider.generate_structured(&prompt()).await.unwrap();
    let value: Value = serde_json::from_str(&reply).unwrap();

    assert_eq!(value["model"], "llama3");
    assert_eq!(value["system"], "You are a test.");
}

#[tokio::test]
async fn test_ollama_missing_model() {
    let app = Router::new().route(
        "/api/generate",
        post(|| async { (StatusCode::NOT_FOUND, "model not found") }),
    );
    let base = spawn_server(app).await;

    let provider = OllamaProvider::new(&base, "nope").unwrap();
    assert_eq!(
        provider.generate_structured(&prompt()).await.unwrap_err(),
        LlmError::ModelNotAvailable("nope".to_string())
    );
}
