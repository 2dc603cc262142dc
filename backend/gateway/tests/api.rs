use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use promptproxy_config::ProxyConfig;
use promptproxy_core::{
    CompletionProvider, ComposedPrompt, Temperature, UpstreamExchange, UpstreamOutcome,
    NO_CONTENT_SENTINEL,
};
use promptproxy_gateway::{build_router, GatewayState, RateLimiter, MAX_BODY_BYTES};
use promptproxy_prompt::{developer_rules, PersonaKey, PersonaRegistry};
use promptproxy_upstream::{MockProvider, RouterProvider};

fn test_config() -> ProxyConfig {
    let mut config = ProxyConfig::with_api_key("test-key");
    config.static_dir = "does-not-exist".into();
    config
}

fn app_with(provider: Arc<dyn CompletionProvider>) -> Router {
    let state = GatewayState::new(
        Arc::new(PersonaRegistry::builtin()),
        provider,
        RateLimiter::default(),
    );
    build_router(state, &test_config()).unwrap()
}

fn peer(ip: &str) -> ConnectInfo<SocketAddr> {
    ConnectInfo(format!("{ip}:40000").parse().unwrap())
}

fn post_chat_from(ip: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .extension(peer(ip))
        .body(body.into())
        .unwrap()
}

fn post_chat(body: Value) -> Request<Body> {
    post_chat_from("127.0.0.1", body.to_string())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .extension(peer("127.0.0.1"))
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn lists_personas_in_registration_order() {
    let app = app_with(Arc::new(MockProvider::new("mock")));

    let (status, body) = send_json(&app, get("/api/personas")).await;

    assert_eq!(status, StatusCode::OK);
    let personas = body["personas"].as_array().unwrap();
    assert_eq!(personas.len(), PersonaKey::ALL.len());
    assert_eq!(personas[0]["key"], "software_engineer");
    assert_eq!(personas[0]["label"], "Software Engineer");
    assert_eq!(personas[1]["key"], "cs_teacher");
    assert_eq!(personas[1]["label"], "Cs Teacher");
    assert_eq!(personas[1]["description"], PersonaKey::CsTeacher.description());
}

#[tokio::test]
async fn chat_success_relays_result_and_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header_matcher("authorization", "Bearer test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "choices": [{ "message": { "content": "Hi!" } }] })),
        )
        .expect(1)
        .mount(&server)
        .await;
    let provider = RouterProvider::new("test-key", "test-model").with_base_url(server.uri());
    let app = app_with(Arc::new(provider));

    let (status, body) = send_json(
        &app,
        post_chat(json!({ "userInput": "Say hi", "personaKey": "cs_teacher", "temperature": 0 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["temperature"], json!(0));
    assert_eq!(body["result"], "Hi!");
    let payload = &body["submittedPayload"];
    assert_eq!(payload["model"], "test-model");
    assert_eq!(payload["temperature"], json!(0));
    assert_eq!(payload["messages"][0]["role"], "system");
    assert_eq!(
        payload["messages"][0]["content"],
        format!("{}\n\n{}", PersonaKey::CsTeacher.description(), developer_rules())
    );
    assert_eq!(payload["messages"][1], json!({ "role": "user", "content": "Say hi" }));
}

#[tokio::test]
async fn unknown_persona_is_rejected_without_upstream_call() {
    let provider = Arc::new(MockProvider::new("mock"));
    let app = app_with(provider.clone());

    let (status, body) = send_json(
        &app,
        post_chat(json!({ "userInput": "Say hi", "personaKey": "ghost", "temperature": 0 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Unknown personaKey" }));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn upstream_rejection_is_mirrored_with_payload() {
    let server = MockServer::start().await;
    let upstream_body = json!({ "error": { "message": "quota exceeded" } });
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(upstream_body.clone()))
        .mount(&server)
        .await;
    let provider = RouterProvider::new("test-key", "test-model").with_base_url(server.uri());
    let app = app_with(Arc::new(provider));

    let (status, body) = send_json(
        &app,
        post_chat(json!({ "userInput": "Say hi", "personaKey": "cs_teacher", "temperature": 0.4 })),
    )
    .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "quota exceeded");
    assert_eq!(body["raw"], upstream_body);
    assert_eq!(body["submittedPayload"]["model"], "test-model");
    assert_eq!(body["submittedPayload"]["messages"][1]["content"], "Say hi");
}

#[tokio::test]
async fn oversized_input_names_user_input() {
    let provider = Arc::new(MockProvider::new("mock"));
    let app = app_with(provider.clone());

    let (status, body) = send_json(
        &app,
        post_chat(json!({
            "userInput": "a".repeat(4001),
            "personaKey": "cs_teacher",
            "temperature": 0
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request");
    assert!(body["details"]["fieldErrors"]["userInput"].is_array());
    assert!(body["details"]["fieldErrors"].get("temperature").is_none());
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn every_invalid_field_is_reported() {
    let app = app_with(Arc::new(MockProvider::new("mock")));

    let (status, body) = send_json(
        &app,
        post_chat(json!({ "userInput": "", "temperature": 3 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = body["details"]["fieldErrors"].as_object().unwrap();
    assert!(fields.contains_key("userInput"));
    assert!(fields.contains_key("personaKey"));
    assert!(fields.contains_key("temperature"));
}

#[tokio::test]
async fn malformed_json_is_an_invalid_request() {
    let app = app_with(Arc::new(MockProvider::new("mock")));

    let (status, body) = send_json(&app, post_chat_from("127.0.0.1", "{\"userInput\":")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request");
    assert_eq!(body["details"]["formErrors"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn body_over_limit_is_refused() {
    let app = app_with(Arc::new(MockProvider::new("mock")));
    let huge = format!(
        "{{\"userInput\":\"{}\",\"personaKey\":\"nurse\",\"temperature\":0}}",
        "a".repeat(MAX_BODY_BYTES)
    );

    let (status, _, _) = send(&app, post_chat_from("127.0.0.1", huge)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn twenty_first_request_is_rate_limited() {
    let provider = Arc::new(MockProvider::new("mock").with_response("ok"));
    let app = app_with(provider.clone());
    let body = json!({ "userInput": "hi", "personaKey": "nurse", "temperature": 0.5 }).to_string();

    for i in 0..20 {
        let (status, headers, _) = send(&app, post_chat_from("198.51.100.7", body.clone())).await;
        assert_eq!(status, StatusCode::OK, "request {}", i + 1);
        assert_eq!(headers["ratelimit-remaining"], (19 - i).to_string().as_str());
    }

    let (status, headers, text) = send(&app, post_chat_from("198.51.100.7", body.clone())).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(headers.contains_key(header::RETRY_AFTER));
    assert_eq!(headers["ratelimit-limit"], "20");
    assert_eq!(String::from_utf8(text).unwrap(), "Too many requests, please try again later.");
    assert_eq!(provider.calls(), 20);

    // Another client is unaffected.
    let (status, _, _) = send(&app, post_chat_from("198.51.100.8", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(provider.calls(), 21);
}

#[tokio::test]
async fn forwarded_for_identifies_clients_when_trusted() {
    let provider = Arc::new(MockProvider::new("mock"));
    let state = GatewayState::new(
        Arc::new(PersonaRegistry::builtin()),
        provider,
        RateLimiter::new(1, Duration::from_secs(60)),
    )
    .with_trust_proxy(true);
    let app = build_router(state, &test_config()).unwrap();

    let request = |client: &str| {
        Request::builder()
            .uri("/api/personas")
            .header("x-forwarded-for", client)
            .extension(peer("10.0.0.1"))
            .body(Body::empty())
            .unwrap()
    };

    assert_eq!(send(&app, request("203.0.113.1")).await.0, StatusCode::OK);
    assert_eq!(send(&app, request("203.0.113.2")).await.0, StatusCode::OK);
    assert_eq!(
        send(&app, request("203.0.113.1")).await.0,
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn upstream_timeout_maps_to_gateway_timeout() {
    let provider = MockProvider::new("mock").with_outcome(UpstreamOutcome::Unreachable {
        reason: "operation timed out".into(),
        timed_out: true,
    });
    let app = app_with(Arc::new(provider));

    let (status, body) = send_json(
        &app,
        post_chat(json!({ "userInput": "hi", "personaKey": "artist", "temperature": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"], "Upstream timed out");
    assert_eq!(body["submittedPayload"]["model"], "mock-model");
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let provider = RouterProvider::new("k", "m").with_base_url(format!("http://{addr}"));
    let app = app_with(Arc::new(provider));

    let (status, body) = send_json(
        &app,
        post_chat(json!({ "userInput": "hi", "personaKey": "artist", "temperature": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Upstream unreachable");
    assert_eq!(body["submittedPayload"]["messages"][1]["content"], "hi");
}

struct PanickingProvider;

#[async_trait]
impl CompletionProvider for PanickingProvider {
    fn name(&self) -> &str {
        "panicking"
    }

    fn model(&self) -> &str {
        "panicking-model"
    }

    async fn send(&self, _prompt: &ComposedPrompt, _temperature: &Temperature) -> UpstreamExchange {
        panic!("provider blew up")
    }
}

#[tokio::test]
async fn handler_panic_becomes_server_error() {
    let app = app_with(Arc::new(PanickingProvider));

    let (status, body) = send_json(
        &app,
        post_chat(json!({ "userInput": "hi", "personaKey": "nurse", "temperature": 0.2 })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Server error", "details": "provider blew up" }));
}

#[tokio::test]
async fn missing_content_returns_sentinel() {
    let provider = MockProvider::new("mock").with_response(NO_CONTENT_SENTINEL);
    let app = app_with(Arc::new(provider));

    let (status, body) = send_json(
        &app,
        post_chat(json!({ "userInput": "hi", "personaKey": "nurse", "temperature": 0.1 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], NO_CONTENT_SENTINEL);
}

#[tokio::test]
async fn responses_carry_security_and_cors_headers() {
    let app = app_with(Arc::new(MockProvider::new("mock")));
    let request = Request::builder()
        .uri("/api/personas")
        .header(header::ORIGIN, "http://localhost:3000")
        .extension(peer("127.0.0.1"))
        .body(Body::empty())
        .unwrap();

    let (status, headers, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(headers[header::X_FRAME_OPTIONS], "SAMEORIGIN");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:3000");
    assert_eq!(headers["ratelimit-limit"], "20");
}

#[tokio::test]
async fn health_reports_model() {
    let app = app_with(Arc::new(MockProvider::new("mock").with_model("llama")));

    let (status, body) = send_json(&app, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "llama");
    assert_eq!(body["provider"], "mock");
}

#[tokio::test]
async fn serves_static_ui_when_present() {
    let dir = std::env::temp_dir().join(format!("promptproxy-ui-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<h1>Prompt Proxy</h1>").unwrap();

    let mut config = test_config();
    config.static_dir = dir.to_string_lossy().into_owned();
    let state = GatewayState::new(
        Arc::new(PersonaRegistry::builtin()),
        Arc::new(MockProvider::new("mock")),
        RateLimiter::default(),
    );
    let app = build_router(state, &config).unwrap();

    let (status, _, body) = send(&app, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), "<h1>Prompt Proxy</h1>");
    std::fs::remove_dir_all(&dir).unwrap();
}
