/// Integration tests for the HTTP API, driven through the router with `oneshot`
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use httpmock::prelude::*;
use livecost::{
    config::{Config, ModelKind, RemoteModelConfig, StorageBackend},
    server::{build_app_state, create_router, open_storage},
};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn create_app(config: Config) -> Router {
    let storage = open_storage(&config.database).await.unwrap();
    let state = build_app_state(&config, &storage).unwrap();
    create_router(&config, state, None)
}

fn memory_config() -> Config {
    let mut config = Config::default();
    config.database.backend = StorageBackend::Memory;
    config
}

fn sqlite_config() -> Config {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    config
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn austin_payload() -> Value {
    json!({
        "region": "Austin",
        "apartment_size": "1BR",
        "dining_frequency": 3,
        "car_type": "sedan",
        "commute_miles": 12.5,
        "grocery_habits": "budget"
    })
}

#[tokio::test]
async fn test_health_and_root() {
    let app = create_app(sqlite_config()).await;

    for uri in ["/", "/health"] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
        assert!(body["timestamp"].as_str().is_some());
    }
}

#[tokio::test]
async fn test_regions() {
    let app = create_app(memory_config()).await;

    let (status, body) = send(&app, get("/regions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 10);
}

#[tokio::test]
async fn test_predict_returns_itemized_breakdown() {
    let app = create_app(sqlite_config()).await;

    let (status, body) = send(&app, post_json("/predict", austin_payload())).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["region"], "Austin");
    assert_eq!(body["query_id"], 1);
    assert_eq!(body["confidence"], "Medium");
    assert_eq!(body["input_summary"]["dining_frequency"], "3x/week");
    assert_eq!(body["input_summary"]["commute_miles"], "12.5 miles/day");
    assert_eq!(body["input_summary"]["groceries"], "budget");
    assert_eq!(body["input_summary"]["entertainment"], "moderate");

    let breakdown = body["breakdown"].as_object().unwrap();
    assert_eq!(breakdown.len(), 8);
    let sum: f64 = breakdown.values().map(|v| v.as_f64().unwrap()).sum();
    let total = body["total_monthly_cost"].as_f64().unwrap();
    assert!((total - (sum * 100.0).round() / 100.0).abs() < 1e-9);

    assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_predict_validation_errors() {
    let app = create_app(memory_config()).await;

    let mut bad_size = austin_payload();
    bad_size["apartment_size"] = json!("penthouse");
    let mut bad_dining = austin_payload();
    bad_dining["dining_frequency"] = json!(16);
    let mut bad_commute = austin_payload();
    bad_commute["commute_miles"] = json!(-1.0);
    let mut missing_car = austin_payload();
    missing_car.as_object_mut().unwrap().remove("car_type");

    for payload in [bad_size, bad_dining, bad_commute, missing_car] {
        let (status, body) = send(&app, post_json("/predict", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "bad_request");
    }

    let (_, stats) = send(&app, get("/statistics")).await;
    assert_eq!(stats["total_queries"], 0);
}

#[tokio::test]
async fn test_statistics_and_recent_queries() {
    let app = create_app(sqlite_config()).await;

    for region in ["Austin", "NYC", "NYC"] {
        let mut payload = austin_payload();
        payload["region"] = json!(region);
        let (status, _) = send(&app, post_json("/predict", payload)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, stats) = send(&app, get("/statistics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_queries"], 3);
    assert_eq!(stats["queries_by_region"]["NYC"], 2);
    assert!(stats["average_cost"].as_f64().unwrap() > 0.0);

    let (status, recent) = send(&app, get("/recent-queries")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recent["count"], 3);
    assert_eq!(recent["queries"][0]["id"], 3);
    assert_eq!(recent["queries"][0]["region"], "NYC");

    let (_, limited) = send(&app, get("/recent-queries?limit=1")).await;
    assert_eq!(limited["count"], 1);
}

#[tokio::test]
async fn test_model_info() {
    let app = create_app(memory_config()).await;

    let (status, body) = send(&app, get("/model-info")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], "linear");
    assert_eq!(body["r_squared"], 0.8);
    assert_eq!(body["confidence"], "Medium");
    assert_eq!(body["features"][0], "region");
    assert_eq!(body["categories"].as_array().unwrap().len(), 4);
    assert_eq!(body["encoders"]["apartment_size"][3], "studio");
}

#[tokio::test]
async fn test_remote_model_failure_maps_to_503() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/predict");
            then.status(500).body("model crashed");
        })
        .await;

    let mut config = memory_config();
    config.model.kind = ModelKind::Remote;
    config.model.remote = Some(RemoteModelConfig {
        base_url: server.base_url(),
        timeout_seconds: 5,
    });
    let app = create_app(config).await;

    let (status, body) = send(&app, post_json("/predict", austin_payload())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["type"], "dependency_unavailable");
    mock.assert_async().await;

    // Nothing was recorded
    let (_, stats) = send(&app, get("/statistics")).await;
    assert_eq!(stats["total_queries"], 0);
}
