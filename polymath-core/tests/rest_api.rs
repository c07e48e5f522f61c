//! Integration tests for the research REST API endpoints.

use axum::body::Body;
use polymath_core::api::{AppState, router};
use polymath_core::gateway::MockGateway;
use polymath_core::{GatewayError, ModelGateway};
use std::sync::Arc;
use tower::ServiceExt;

const RESEARCH_JSON: &str = r#"```json
{
    "research_output": {
        "title": "Connecting Coffee and Politics",
        "introduction": "Coffee has shaped political discourse for centuries.",
        "connections": [{
            "discipline": "History",
            "explanation": "Coffeehouses as sites of debate.",
            "subtopics": [{"name": "Penny universities", "details": "London, 17th century"}],
            "themes": ["Public sphere"]
        }],
        "research_questions": ["How did coffeehouses shape civic discourse?"],
        "cross_cutting_themes": ["Trade and power"],
        "mind_map": {"central_themes": "Coffee, Politics", "key_connections": []}
    },
    "related_topics": [
        {"topic": "Colonialism", "relevance": "Plantation economies"}
    ]
}
```"#;

const RELATED_JSON: &str =
    r#"{"related_topics": [{"topic": "Trade", "relevance": "Commodity flows"}]}"#;

const MIND_MAP_JSON: &str = r#"```json
{
    "nodes": [
        {"id": "coffee", "label": "Coffee", "group": "primary", "description": "The bean"},
        {"id": "politics", "label": "Politics", "group": "political science", "description": ""}
    ],
    "edges": [{"from": "coffee", "to": "politics", "label": "fuels", "description": ""}],
    "related_topics": []
}
```"#;

fn app_with(mock: MockGateway) -> axum::Router {
    let gateway: Arc<dyn ModelGateway> = Arc::new(mock);
    router(AppState { gateway })
}

fn make_request(uri: &str) -> axum::http::Request<Body> {
    axum::http::Request::builder()
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn make_post_request(uri: &str, body: serde_json::Value) -> axum::http::Request<Body> {
    axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn send(
    app: axum::Router,
    request: axum::http::Request<Body>,
) -> (axum::http::StatusCode, serde_json::Value) {
    let resp = ServiceExt::<axum::http::Request<Body>>::oneshot(app, request)
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 1_000_000)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

// --- GET / and /health/ ---

#[tokio::test]
async fn test_welcome_message() {
    let app = app_with(MockGateway::new());
    let (status, json) = send(app, make_request("/")).await;
    assert_eq!(status, 200);
    assert_eq!(json["message"], "Welcome to the Polymath research API");
}

#[tokio::test]
async fn test_health_reports_healthy_and_version() {
    let app = app_with(MockGateway::new());
    let (status, json) = send(app, make_request("/health/")).await;
    assert_eq!(status, 200);
    assert_eq!(json["status"], "healthy");
    assert!(json.get("api_version").is_some());
}

// --- POST /research/ ---

#[tokio::test]
async fn test_research_happy_path() {
    let app = app_with(MockGateway::with_response(RESEARCH_JSON));
    let body = serde_json::json!({
        "primary_topic": "Coffee",
        "intent_topic": "Politics",
    });
    let (status, json) = send(app, make_post_request("/research/", body)).await;
    assert_eq!(status, 200);
    assert_eq!(
        json["research_output"]["title"],
        "Connecting Coffee and Politics"
    );
    assert_eq!(json["related_topics"][0]["topic"], "Colonialism");
    assert_eq!(json["connection_path"], "Coffee → Politics");
}

#[tokio::test]
async fn test_research_carries_previous_topics_in_path() {
    let app = app_with(MockGateway::with_response(RESEARCH_JSON));
    let body = serde_json::json!({
        "primary_topic": "Coffee",
        "intent_topic": "Politics",
        "previous_topics": ["Gender", "Colonialism"],
    });
    let (status, json) = send(app, make_post_request("/research/", body)).await;
    assert_eq!(status, 200);
    assert_eq!(
        json["connection_path"],
        "Coffee → Politics → Gender → Colonialism"
    );
}

#[tokio::test]
async fn test_research_empty_topic_is_bad_request() {
    let app = app_with(MockGateway::with_response(RESEARCH_JSON));
    let body = serde_json::json!({
        "primary_topic": "  ",
        "intent_topic": "Politics",
    });
    let (status, json) = send(app, make_post_request("/research/", body)).await;
    assert_eq!(status, 400);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_research_gateway_failure_is_bad_gateway() {
    let mock = MockGateway::new();
    mock.queue_failure(GatewayError::ApiRequest {
        message: "upstream down".into(),
    });
    let app = app_with(mock);
    let body = serde_json::json!({
        "primary_topic": "Coffee",
        "intent_topic": "Politics",
    });
    let (status, json) = send(app, make_post_request("/research/", body)).await;
    assert_eq!(status, 502);
    assert!(json["error"].as_str().unwrap().contains("upstream down"));
}

#[tokio::test]
async fn test_research_malformed_model_output_is_server_error() {
    let app = app_with(MockGateway::with_response("not json at all"));
    let body = serde_json::json!({
        "primary_topic": "Coffee",
        "intent_topic": "Politics",
    });
    let (status, json) = send(app, make_post_request("/research/", body)).await;
    assert_eq!(status, 500);
    assert!(json.get("error").is_some());
}

// --- POST /continue-research/ ---

#[tokio::test]
async fn test_continue_research_extends_the_chain() {
    let app = app_with(MockGateway::with_response(RESEARCH_JSON));
    let body = serde_json::json!({
        "topics": ["Coffee", "Politics"],
        "next_topic": "Gender",
    });
    let (status, json) = send(app, make_post_request("/continue-research/", body)).await;
    assert_eq!(status, 200);
    assert_eq!(json["connection_path"], "Coffee → Politics → Gender");
}

#[tokio::test]
async fn test_continue_research_requires_two_topics() {
    let app = app_with(MockGateway::with_response(RESEARCH_JSON));
    let body = serde_json::json!({
        "topics": ["Coffee"],
        "next_topic": "Gender",
    });
    let (status, json) = send(app, make_post_request("/continue-research/", body)).await;
    assert_eq!(status, 400);
    assert!(json["error"].as_str().unwrap().contains("2"));
}

// --- POST /related-topics/ ---

#[tokio::test]
async fn test_related_topics_happy_path() {
    let app = app_with(MockGateway::with_response(RELATED_JSON));
    let body = serde_json::json!({"topics": ["Coffee", "Politics"]});
    let (status, json) = send(app, make_post_request("/related-topics/", body)).await;
    assert_eq!(status, 200);
    assert_eq!(json["related_topics"][0]["topic"], "Trade");
}

#[tokio::test]
async fn test_related_topics_accepts_single_topic() {
    let app = app_with(MockGateway::with_response(RELATED_JSON));
    let body = serde_json::json!({"topics": ["Coffee"]});
    let (status, _) = send(app, make_post_request("/related-topics/", body)).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_related_topics_rejects_empty_list() {
    let app = app_with(MockGateway::with_response(RELATED_JSON));
    let body = serde_json::json!({"topics": []});
    let (status, _) = send(app, make_post_request("/related-topics/", body)).await;
    assert_eq!(status, 400);
}

// --- POST /mind-map/ ---

#[tokio::test]
async fn test_mind_map_happy_path() {
    let app = app_with(MockGateway::with_response(MIND_MAP_JSON));
    let body = serde_json::json!({
        "primary_topic": "Coffee",
        "secondary_topics": ["Politics"],
    });
    let (status, json) = send(app, make_post_request("/mind-map/", body)).await;
    assert_eq!(status, 200);
    assert_eq!(json["nodes"][0]["id"], "coffee");
    assert_eq!(json["edges"][0]["from"], "coffee");
}

#[tokio::test]
async fn test_mind_map_requires_a_connected_topic() {
    let app = app_with(MockGateway::with_response(MIND_MAP_JSON));
    let body = serde_json::json!({"primary_topic": "Coffee"});
    let (status, _) = send(app, make_post_request("/mind-map/", body)).await;
    assert_eq!(status, 400);
}
