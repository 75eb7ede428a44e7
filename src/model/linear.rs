use super::{CategoryEstimates, FeatureVector, RegressionModel};
use crate::error::CostError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// `intercept + Σ weight_i · feature_i` for one category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryCoefficients {
    pub intercept: f64,
    pub weights: [f64; 5],
}

impl CategoryCoefficients {
    fn apply(&self, features: &[f64; 5]) -> f64 {
        self.intercept
            + self
                .weights
                .iter()
                .zip(features.iter())
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }
}

/// Coefficient tables for the four model categories
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearCoefficients {
    pub rent: CategoryCoefficients,
    pub food: CategoryCoefficients,
    pub transportation: CategoryCoefficients,
    pub utilities: CategoryCoefficients,
}

impl Default for LinearCoefficients {
    fn default() -> Self {
        Self {
            rent: CategoryCoefficients {
                intercept: 1300.0,
                weights: [0.0, 250.0, 0.0, 0.0, 0.0],
            },
            food: CategoryCoefficients {
                intercept: 250.0,
                weights: [0.0, 0.0, 45.0, 0.0, 0.0],
            },
            transportation: CategoryCoefficients {
                intercept: 90.0,
                weights: [0.0, 0.0, 0.0, 15.0, 4.5],
            },
            utilities: CategoryCoefficients {
                intercept: 110.0,
                weights: [0.0, 20.0, 0.0, 0.0, 0.0],
            },
        }
    }
}

/// Regression model evaluated in-process from configured coefficients
#[derive(Debug, Clone)]
pub struct LinearModel {
    coefficients: LinearCoefficients,
    r_squared: f64,
}

impl LinearModel {
    pub fn new(coefficients: LinearCoefficients, r_squared: f64) -> Self {
        Self {
            coefficients,
            r_squared,
        }
    }
}

#[async_trait]
impl RegressionModel for LinearModel {
    fn name(&self) -> &str {
        "linear"
    }

    fn r_squared(&self) -> f64 {
        self.r_squared
    }

    async fn predict(&self, features: &FeatureVector) -> Result<CategoryEstimates, CostError> {
        let x = features.as_array();
        CategoryEstimates {
            rent: self.coefficients.rent.apply(&x),
            food: self.coefficients.food.apply(&x),
            transportation: self.coefficients.transportation.apply(&x),
            utilities: self.coefficients.utilities.apply(&x),
        }
        .validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> FeatureVector {
        FeatureVector {
            region: 0,
            apartment_size: 1,
            dining_frequency: 2,
            car_type: 2,
            commute_miles: 10.0,
        }
    }

    #[tokio::test]
    async fn test_default_coefficients() {
        let model = LinearModel::new(LinearCoefficients::default(), 0.72);
        let estimates = model.predict(&features()).await.unwrap();

        assert_eq!(estimates.rent, 1550.0);
        assert_eq!(estimates.food, 340.0);
        assert_eq!(estimates.transportation, 165.0);
        assert_eq!(estimates.utilities, 130.0);
        assert_eq!(model.r_squared(), 0.72);
    }

    #[tokio::test]
    async fn test_negative_estimate_is_rejected() {
        let mut coefficients = LinearCoefficients::default();
        coefficients.food = CategoryCoefficients {
            intercept: -500.0,
            weights: [0.0; 5],
        };
        let model = LinearModel::new(coefficients, 0.5);

        let err = model.predict(&features()).await.unwrap_err();
        assert_eq!(err.component(), crate::error::component::MODEL);
    }

    #[tokio::test]
    async fn test_non_finite_coefficients_fail() {
        let mut coefficients = LinearCoefficients::default();
        coefficients.rent.intercept = f64::NAN;
        let model = LinearModel::new(coefficients, 0.5);

        assert!(model.predict(&features()).await.is_err());
    }
}
