//! Regression model collaborator
//!
//! The model is a black box: five encoded features in, four category
//! estimates out, plus a held-out R² fixed at load time. Two
//! implementations are provided:
//!
//! - [`LinearModel`]: coefficients supplied by configuration
//! - [`RemoteModel`]: JSON over HTTP to a model-serving process

pub mod encoder;
pub mod linear;
pub mod remote;

pub use encoder::FeatureEncoder;
pub use linear::{LinearCoefficients, LinearModel};
pub use remote::RemoteModel;

use crate::error::{component, CostError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Feature order the model was trained with
pub const FEATURE_NAMES: [&str; 5] = [
    "region",
    "apartment_size",
    "dining_frequency",
    "car_type",
    "commute_miles",
];

/// Categories the model predicts
pub const MODEL_CATEGORIES: [&str; 4] = ["rent", "food", "transportation", "utilities"];

/// Encoded model input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub region: i64,
    pub apartment_size: i64,
    pub dining_frequency: u32,
    pub car_type: i64,
    pub commute_miles: f64,
}

impl FeatureVector {
    /// Features in training order
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.region as f64,
            self.apartment_size as f64,
            self.dining_frequency as f64,
            self.car_type as f64,
            self.commute_miles,
        ]
    }
}

/// Raw per-category estimates before regional scaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryEstimates {
    pub rent: f64,
    pub food: f64,
    pub transportation: f64,
    pub utilities: f64,
}

impl CategoryEstimates {
    /// Reject output no sane model would produce
    pub fn validate(self) -> Result<Self, CostError> {
        let values = [self.rent, self.food, self.transportation, self.utilities];
        if values.iter().all(|v| v.is_finite() && *v >= 0.0) {
            Ok(self)
        } else {
            Err(CostError::unavailable(
                component::MODEL,
                format!("model produced invalid estimates: {:?}", values),
            ))
        }
    }
}

/// Regression model consumed by the composer
#[async_trait]
pub trait RegressionModel: Send + Sync {
    /// Model identifier for logs and `/model-info`
    fn name(&self) -> &str;

    /// Held-out coefficient of determination
    fn r_squared(&self) -> f64;

    async fn predict(&self, features: &FeatureVector) -> Result<CategoryEstimates, CostError>;
}
