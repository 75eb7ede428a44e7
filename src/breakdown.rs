//! Itemized monthly cost breakdown

use serde::{Deserialize, Serialize};

/// Round to cents
///
/// Rounds the exact binary value, so `2.675` (stored just below the
/// midpoint) becomes `2.67`; exact ties go to the even cent.
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// The eight cost categories of a prediction, in summation order
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub rent: f64,
    pub food: f64,
    pub transportation: f64,
    pub utilities: f64,
    pub entertainment: f64,
    pub groceries: f64,
    pub fitness: f64,
    pub healthcare: f64,
}

impl CostBreakdown {
    pub const CATEGORIES: [&'static str; 8] = [
        "rent",
        "food",
        "transportation",
        "utilities",
        "entertainment",
        "groceries",
        "fitness",
        "healthcare",
    ];

    /// Category values in the fixed order of `CATEGORIES`
    pub fn values(&self) -> [f64; 8] {
        [
            self.rent,
            self.food,
            self.transportation,
            self.utilities,
            self.entertainment,
            self.groceries,
            self.fitness,
            self.healthcare,
        ]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        Self::CATEGORIES.into_iter().zip(self.values())
    }

    /// Sum of all categories in fixed order, rounded to cents
    pub fn total(&self) -> f64 {
        round2(self.values().iter().sum())
    }
}
