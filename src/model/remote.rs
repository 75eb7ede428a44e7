use super::{CategoryEstimates, FeatureVector, RegressionModel};
use crate::error::{component, CostError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

#[derive(Serialize)]
struct PredictRequest {
    features: [f64; 5],
}

/// Regression model served by another process
///
/// `POST {base_url}/predict` with `{"features": [..5]}` and expects
/// `{"rent", "food", "transportation", "utilities"}` back. No retries;
/// any failure surfaces as `DependencyUnavailable`.
pub struct RemoteModel {
    client: Client,
    endpoint: String,
    r_squared: f64,
}

impl RemoteModel {
    pub fn new(base_url: &str, timeout: Duration, r_squared: f64) -> Result<Self, CostError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(model_error)?;

        Ok(Self {
            client,
            endpoint: format!("{}/predict", base_url.trim_end_matches('/')),
            r_squared,
        })
    }
}

fn model_error(err: impl std::fmt::Display) -> CostError {
    CostError::unavailable(component::MODEL, err)
}

#[async_trait]
impl RegressionModel for RemoteModel {
    fn name(&self) -> &str {
        "remote"
    }

    fn r_squared(&self) -> f64 {
        self.r_squared
    }

    async fn predict(&self, features: &FeatureVector) -> Result<CategoryEstimates, CostError> {
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(&self.endpoint)
            .json(&PredictRequest {
                features: features.as_array(),
            })
            .send()
            .await
            .map_err(model_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                endpoint = %self.endpoint,
                "Model server returned an error"
            );
            return Err(model_error(format!("model server returned {}: {}", status, body)));
        }

        let estimates: CategoryEstimates = response.json().await.map_err(model_error)?;

        tracing::debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            "Remote model prediction completed"
        );

        estimates.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_cleanly() {
        let model = RemoteModel::new("http://localhost:9000/", Duration::from_secs(1), 0.8).unwrap();
        assert_eq!(model.endpoint, "http://localhost:9000/predict");
        assert_eq!(model.name(), "remote");
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(PredictRequest {
            features: [1.0, 2.0, 3.0, 4.0, 5.5],
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"features": [1.0, 2.0, 3.0, 4.0, 5.5]}));
    }
}
