use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Collaborator that failed during a composition
pub mod component {
    pub const CACHE: &str = "region_cache";
    pub const LEDGER: &str = "ledger";
    pub const MODEL: &str = "regression_model";
    pub const REGION: &str = "region_costs";
}

/// Errors raised by the composition core.
///
/// Every failure of a collaborator (cache, ledger, regression model) is
/// reported as `DependencyUnavailable`. Unrecognized category values are
/// not errors; they resolve through the lookup-table fallbacks.
#[derive(Debug, thiserror::Error)]
pub enum CostError {
    #[error("{component} unavailable: {message}")]
    DependencyUnavailable {
        component: &'static str,
        message: String,
    },
}

impl CostError {
    pub fn unavailable(component: &'static str, err: impl fmt::Display) -> Self {
        Self::DependencyUnavailable {
            component,
            message: err.to_string(),
        }
    }

    /// Name of the failing collaborator
    pub fn component(&self) -> &'static str {
        match self {
            Self::DependencyUnavailable { component, .. } => component,
        }
    }
}

/// HTTP boundary error types
#[derive(Debug)]
pub enum AppError {
    /// Request failed boundary validation
    BadRequest(String),
    /// A collaborator of the composition could not produce a value
    DependencyUnavailable(String),
    /// Internal server error
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::DependencyUnavailable(msg) => write!(f, "Dependency unavailable: {}", msg),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::DependencyUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            Self::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type_name(&self),
            }
        }));

        (status, body).into_response()
    }
}

fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::BadRequest(_) => "bad_request",
        AppError::DependencyUnavailable(_) => "dependency_unavailable",
        AppError::InternalError(_) => "internal_error",
    }
}

impl From<CostError> for AppError {
    fn from(err: CostError) -> Self {
        Self::DependencyUnavailable(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}
