//! Drives the real gateway adapter against a local stand-in for the AI
//! gateway.

use api_lib::adapters::GatewayAiAdapter;
use axum::{http::StatusCode, routing::post, Json, Router};
use rytu_mitra_core::domain::Language;
use rytu_mitra_core::ports::{FarmingAdviceService, PortError};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const MODEL: &str = "google/gemini-2.5-flash";

/// Serves `router` on an ephemeral port and returns the gateway base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/v1", addr)
}

#[tokio::test]
async fn server_error_fails_on_the_first_attempt() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/v1/chat/completions",
        post(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (StatusCode::INTERNAL_SERVER_ERROR, "gateway down")
            }
        }),
    );
    let adapter = GatewayAiAdapter::connect(&serve(router).await, "test-key", MODEL.to_string());

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        adapter.advise("best fertilizer for rice", Language::English),
    )
    .await
    .expect("gateway error should not be retried");

    assert_eq!(
        result,
        Err(PortError::Upstream {
            status: None,
            message: "gateway down".to_string(),
        })
    );
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn blank_completion_is_malformed() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            Json::<Value>(json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 1_700_000_000,
                "model": MODEL,
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": "" },
                    "finish_reason": "stop"
                }]
            }))
        }),
    );
    let adapter = GatewayAiAdapter::connect(&serve(router).await, "test-key", MODEL.to_string());

    let result = adapter.advise("cotton bollworm?", Language::Telugu).await;
    assert!(matches!(result, Err(PortError::MalformedResponse(_))));
}
