/// Integration tests for the HTTP regression model client
use httpmock::prelude::*;
use livecost::{
    error::component,
    model::{FeatureVector, RegressionModel, RemoteModel},
};
use serde_json::json;
use std::time::Duration;

fn features() -> FeatureVector {
    FeatureVector {
        region: 7,
        apartment_size: 3,
        dining_frequency: 4,
        car_type: 2,
        commute_miles: 12.5,
    }
}

fn create_model(server: &MockServer) -> RemoteModel {
    RemoteModel::new(&server.base_url(), Duration::from_secs(2), 0.72).unwrap()
}

#[tokio::test]
async fn test_predict_sends_features_in_training_order() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/predict")
                .json_body(json!({"features": [7.0, 3.0, 4.0, 2.0, 12.5]}));
            then.status(200).json_body(json!({
                "rent": 2100.5,
                "food": 420.0,
                "transportation": 160.25,
                "utilities": 130.0
            }));
        })
        .await;

    let estimates = create_model(&server).predict(&features()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(estimates.rent, 2100.5);
    assert_eq!(estimates.transportation, 160.25);
}

#[tokio::test]
async fn test_server_error_is_dependency_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/predict");
            then.status(503).body("warming up");
        })
        .await;

    let err = create_model(&server).predict(&features()).await.unwrap_err();
    assert_eq!(err.component(), component::MODEL);
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_malformed_body_is_dependency_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/predict");
            then.status(200).json_body(json!({"rent": 1500.0}));
        })
        .await;

    let err = create_model(&server).predict(&features()).await.unwrap_err();
    assert_eq!(err.component(), component::MODEL);
}

#[tokio::test]
async fn test_negative_estimate_is_rejected() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/predict");
            then.status(200).json_body(json!({
                "rent": 1500.0,
                "food": -20.0,
                "transportation": 150.0,
                "utilities": 120.0
            }));
        })
        .await;

    assert!(create_model(&server).predict(&features()).await.is_err());
}

#[tokio::test]
async fn test_unreachable_server() {
    // Nothing listens on the discard port
    let model = RemoteModel::new("http://127.0.0.1:9", Duration::from_millis(500), 0.72).unwrap();

    let err = model.predict(&features()).await.unwrap_err();
    assert_eq!(err.component(), component::MODEL);
    assert_eq!(model.r_squared(), 0.72);
}
