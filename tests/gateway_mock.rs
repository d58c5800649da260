//! Integration tests for the gateway against a mock provider server.
//!
//! Covers the retry loop (Retry-After hint, exhaustion), the failure
//! taxonomy, auth placement per provider, and the structured/raw-text
//! parsing path end to end.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use classify_gateway::{
    ClassificationRequest, Document, FailureKind, GatewayResult, MemorySink, ModelGateway,
    ProviderConfig,
};

const CHAT_PATH: &str = "/v1/chat/completions";
const GEMINI_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn request() -> ClassificationRequest {
    ClassificationRequest::with_default_prompt(
        vec![Document::new("notes.txt", "Ten usability heuristics.")],
        vec!["Usability".into(), "Accessibility".into()],
    )
}

fn openai_config(server: &MockServer) -> ProviderConfig {
    let endpoint = Url::parse(&format!("{}{}", server.uri(), CHAT_PATH)).unwrap();
    ProviderConfig::openai("sk-test").with_endpoint(endpoint)
}

fn gemini_config(server: &MockServer) -> ProviderConfig {
    let endpoint = Url::parse(&format!("{}{}", server.uri(), GEMINI_PATH)).unwrap();
    ProviderConfig::gemini("g-test").with_endpoint(endpoint)
}

fn openai_success(content: &str) -> serde_json::Value {
    json!({
        "choices": [{
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn gemini_success(content: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": content }], "role": "model" },
            "finishReason": "STOP"
        }]
    })
}

const RECORDS_JSON: &str = r#"[{"documentName": "notes.txt", "assignedTags": ["Usability"], "explanation": "heuristics", "keyTerms": ["Nielsen"]}]"#;

async fn requests_seen(server: &MockServer) -> usize {
    server.received_requests().await.unwrap_or_default().len()
}

#[tokio::test]
async fn retry_after_hint_is_honored_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "2"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_success(RECORDS_JSON)))
        .mount(&server)
        .await;

    let gateway = ModelGateway::new().unwrap();
    let start = Instant::now();
    let result = gateway.classify(&openai_config(&server), &request()).await;

    assert!(
        start.elapsed() >= Duration::from_secs(2),
        "retry fired before the server hint elapsed"
    );
    assert_eq!(requests_seen(&server).await, 2);

    let records = result.records().expect("expected structured result");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].assigned_tags, vec!["Usability"]);
}

#[tokio::test]
async fn rate_limit_exhaustion_after_initial_plus_three_retries() {
    let server = MockServer::start().await;

    // Retry-After 0 keeps the test fast while still exercising the loop.
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "0"))
        .mount(&server)
        .await;

    let gateway = ModelGateway::new().unwrap();
    let result = gateway.classify(&openai_config(&server), &request()).await;

    assert_eq!(requests_seen(&server).await, 4);
    match result {
        GatewayResult::Failure { kind, message } => {
            assert_eq!(kind, FailureKind::RateLimited);
            assert!(message.contains("max retries reached"));
        }
        other => panic!("expected rate-limited failure, got {other:?}"),
    }
}

#[tokio::test]
async fn provider_error_body_is_terminal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": { "message": "You exceeded your current quota", "type": "insufficient_quota" }
        })))
        .mount(&server)
        .await;

    let gateway = ModelGateway::new().unwrap();
    let result = gateway.classify(&openai_config(&server), &request()).await;

    assert_eq!(requests_seen(&server).await, 1);
    match result {
        GatewayResult::Failure { kind, message } => {
            assert_eq!(kind, FailureKind::Provider);
            assert!(message.contains("exceeded your current quota"));
        }
        other => panic!("expected provider failure, got {other:?}"),
    }
}

#[tokio::test]
async fn provider_error_without_message_reads_unknown() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": {} })))
        .mount(&server)
        .await;

    let gateway = ModelGateway::new().unwrap();
    let result = gateway.classify(&openai_config(&server), &request()).await;

    match result {
        GatewayResult::Failure { kind, message } => {
            assert_eq!(kind, FailureKind::Provider);
            assert!(message.contains("unknown"));
        }
        other => panic!("expected provider failure, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_success_envelope_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "chatcmpl-1" })))
        .mount(&server)
        .await;

    let gateway = ModelGateway::new().unwrap();
    let result = gateway.classify(&openai_config(&server), &request()).await;

    match result {
        GatewayResult::Failure { kind, .. } => assert_eq!(kind, FailureKind::MalformedResponse),
        other => panic!("expected malformed-response failure, got {other:?}"),
    }
}

#[tokio::test]
async fn openai_sends_bearer_header() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_success(RECORDS_JSON)))
        .mount(&server)
        .await;

    let gateway = ModelGateway::new().unwrap();
    let result = gateway.classify(&openai_config(&server), &request()).await;
    assert!(result.is_structured(), "bearer auth not placed: {result:?}");
}

#[tokio::test]
async fn gemini_sends_key_as_query_parameter() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .and(query_param("key", "g-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_success(RECORDS_JSON)))
        .mount(&server)
        .await;

    let gateway = ModelGateway::new().unwrap();
    let result = gateway.classify(&gemini_config(&server), &request()).await;
    assert!(result.is_structured(), "query-key auth not placed: {result:?}");

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    assert!(
        !requests[0].headers.contains_key("authorization"),
        "gemini request must not carry a bearer header"
    );
}

#[tokio::test]
async fn prose_only_output_falls_back_to_raw_text() {
    let server = MockServer::start().await;

    let prose = "The documents discuss usability heuristics.";
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_success(prose)))
        .mount(&server)
        .await;

    let gateway = ModelGateway::new().unwrap();
    let result = gateway.classify(&openai_config(&server), &request()).await;
    assert_eq!(result, GatewayResult::RawText(prose.to_string()));
}

#[tokio::test]
async fn transport_failure_is_terminal_and_not_retried() {
    // Nothing listens on port 1.
    let endpoint = Url::parse("http://127.0.0.1:1/v1/chat/completions").unwrap();
    let config = ProviderConfig::openai("sk-test").with_endpoint(endpoint);

    let gateway = ModelGateway::new().unwrap();
    let result = gateway.classify(&config, &request()).await;

    match result {
        GatewayResult::Failure { kind, .. } => assert_eq!(kind, FailureKind::Transport),
        other => panic!("expected transport failure, got {other:?}"),
    }
}

#[tokio::test]
async fn cancellation_interrupts_backoff() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "30"))
        .mount(&server)
        .await;

    let gateway = ModelGateway::new().unwrap();
    let config = openai_config(&server);
    let req = request();
    let token = CancellationToken::new();

    let start = Instant::now();
    let (result, ()) = tokio::join!(
        gateway.classify_with_cancel(&config, &req, &token),
        async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            token.cancel();
        }
    );

    assert!(
        start.elapsed() < Duration::from_secs(5),
        "cancellation did not interrupt the backoff sleep"
    );
    assert_eq!(requests_seen(&server).await, 1);
    match result {
        GatewayResult::Failure { kind, .. } => assert_eq!(kind, FailureKind::Cancelled),
        other => panic!("expected cancelled failure, got {other:?}"),
    }
}

#[tokio::test]
async fn notification_sink_sees_progress_and_retry_messages() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_success(RECORDS_JSON)))
        .mount(&server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let gateway = ModelGateway::with_sink(sink.clone()).unwrap();
    let result = gateway.classify(&openai_config(&server), &request()).await;
    assert!(result.is_structured());

    let messages = sink.messages();
    assert!(messages
        .iter()
        .any(|(m, is_error)| m.contains("Processing with openai") && !is_error));
    assert!(messages
        .iter()
        .any(|(m, is_error)| m.contains("Retrying in 0 seconds") && !is_error));
}

#[tokio::test]
async fn independent_calls_share_no_retry_state() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_success(RECORDS_JSON)))
        .mount(&server)
        .await;

    let gateway = ModelGateway::new().unwrap();
    let config = openai_config(&server);

    // First call consumes the single 429; a second call starts from attempt 0
    // and succeeds immediately.
    let first = gateway.classify(&config, &request()).await;
    let second = gateway.classify(&config, &request()).await;
    assert!(first.is_structured());
    assert!(second.is_structured());
    assert_eq!(requests_seen(&server).await, 3);
}
