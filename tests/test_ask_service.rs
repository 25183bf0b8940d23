//! End-to-end tests for the ask service HTTP surface.

use askdb::config::{LlmConfig, ServiceConfig};
use askdb::db::seed::seed;
use askdb::llm::SqlGenerator;
use askdb::server::{create_router, AppState};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

/// Endpoint that refuses connections, so fallback generation fails fast.
fn unreachable_llm() -> LlmConfig {
    LlmConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        ..LlmConfig::default()
    }
}

/// Serve a canned completion on an ephemeral port, OpenAI-compatible shape.
async fn spawn_mock_llm(content: &'static str) -> LlmConfig {
    let router = Router::new()
        .route(
            "/v1/models",
            get(|| async { Json(serde_json::json!({"data": []})) }),
        )
        .route(
            "/v1/chat/completions",
            post(move || async move {
                Json(serde_json::json!({
                    "choices": [
                        {"message": {"role": "assistant", "content": content}}
                    ]
                }))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    LlmConfig {
        base_url: format!("http://{}/v1", addr),
        ..LlmConfig::default()
    }
}

/// Seed a scratch database and serve the router on an ephemeral port.
///
/// Returns the base URL, the shared state (for flipping model readiness),
/// and the tempdir guard keeping the database alive.
async fn spawn_app(llm: LlmConfig) -> (String, Arc<AppState>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("sales.db");
    seed(&db_path).unwrap();

    let config = ServiceConfig {
        database_path: db_path,
        bind_addr: "127.0.0.1:0".to_string(),
        llm,
    };

    let state = Arc::new(AppState::new(config));
    let router = create_router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}", addr), state, dir)
}

async fn mark_model_loaded(state: &AppState) {
    let generator = SqlGenerator::new(state.config.llm.clone()).unwrap();
    *state.generator.write().await = Some(generator);
}

#[tokio::test]
async fn test_health_reflects_model_load() {
    let (base, state, _dir) = spawn_app(unreachable_llm()).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model_loaded"], false);

    mark_model_loaded(&state).await;

    let body: Value = client
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["model_loaded"], true);
}

#[tokio::test]
async fn test_ask_rejected_until_model_loaded() {
    let (base, _state, _dir) = spawn_app(unreachable_llm()).await;
    let client = reqwest::Client::new();

    // Even a question a rule would answer is gated on readiness.
    let response = client
        .post(format!("{base}/ask"))
        .json(&serde_json::json!({"question": "How many products are there?"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 503);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("not loaded"));
}

#[tokio::test]
async fn test_ask_rule_based_count() {
    let (base, state, _dir) = spawn_app(unreachable_llm()).await;
    mark_model_loaded(&state).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/ask"))
        .json(&serde_json::json!({"question": "How many products are there?"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["method"], "rule-based");
    assert_eq!(
        body["generated_sql"],
        "SELECT COUNT(*) as product_count FROM products"
    );
    assert_eq!(body["results"][0]["product_count"], 20);
    assert_eq!(body["question"], "How many products are there?");
}

#[tokio::test]
async fn test_ask_rule_based_price_lookup() {
    let (base, state, _dir) = spawn_app(unreachable_llm()).await;
    mark_model_loaded(&state).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/ask"))
        .json(&serde_json::json!({"question": "What is the price of the Gaming Laptop?"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["method"], "rule-based");
    assert_eq!(body["results"][0]["name"], "Gaming Laptop");
    assert_eq!(body["results"][0]["price"], 1499.99);
}

#[tokio::test]
async fn test_ask_model_generated_path() {
    let llm = spawn_mock_llm(
        "```sql\nSELECT name FROM products ORDER BY name ASC LIMIT 1\n```\nThat query finds the first product.",
    )
    .await;
    let (base, state, _dir) = spawn_app(llm).await;
    mark_model_loaded(&state).await;
    let client = reqwest::Client::new();

    // No rule matches, so the mock completion answers.
    let response = client
        .post(format!("{base}/ask"))
        .json(&serde_json::json!({"question": "What item comes first alphabetically?"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["method"], "model-generated");
    assert_eq!(
        body["generated_sql"],
        "SELECT name FROM products ORDER BY name ASC LIMIT 1"
    );
    assert_eq!(body["results"][0]["name"], "27-inch 4K Monitor");
}

#[tokio::test]
async fn test_ask_unusable_model_output_is_rejected() {
    let llm = spawn_mock_llm("??").await;
    let (base, state, _dir) = spawn_app(llm).await;
    mark_model_loaded(&state).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/ask"))
        .json(&serde_json::json!({"question": "What item comes first alphabetically?"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Could not generate valid SQL"));
}

#[tokio::test]
async fn test_ask_model_execution_error_carries_sql() {
    let llm = spawn_mock_llm("SELECT * FROM customers").await;
    let (base, state, _dir) = spawn_app(llm).await;
    mark_model_loaded(&state).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/ask"))
        .json(&serde_json::json!({"question": "Who bought something yesterday?"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("SQL execution error"));
    assert!(error.contains("SELECT * FROM customers"));
}

#[tokio::test]
async fn test_ask_unmatched_question_reports_llm_failure() {
    let (base, state, _dir) = spawn_app(unreachable_llm()).await;
    mark_model_loaded(&state).await;
    let client = reqwest::Client::new();

    // No rule matches, and the completion endpoint refuses connections.
    let response = client
        .post(format!("{base}/ask"))
        .json(&serde_json::json!({"question": "Tell me a joke"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("LLM error"));
}

#[tokio::test]
async fn test_schema_endpoint() {
    let (base, _state, _dir) = spawn_app(unreachable_llm()).await;
    let client = reqwest::Client::new();

    let response = client.get(format!("{base}/schema")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let schema = body["schema"].as_str().unwrap();
    assert!(schema.contains("CREATE TABLE products"));
    assert!(schema.contains("CREATE TABLE sales"));
}
