//! Lifestyle lookup tables
//!
//! Each lifestyle choice is a closed enum with a fixed monthly baseline.
//! Parsing never fails: an unrecognized value resolves to the table's
//! fallback variant (moderate / moderate / none / standard).

use serde::{Deserialize, Serialize};

/// Implements `parse_or_default`, `as_str` and `monthly_cost` for a
/// lifestyle enum from a single table of `Variant => "name", cost` rows.
macro_rules! lifestyle_table {
    ($name:ident, fallback = $fallback:ident, { $($variant:ident => $label:literal, $cost:expr;)+ }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Parse a selection, falling back to the default baseline
            pub fn parse_or_default(value: &str) -> Self {
                match value {
                    $($label => $name::$variant,)+
                    other => {
                        let category: &'static str = stringify!($name);
                        tracing::debug!(
                            category = category,
                            value = %other,
                            fallback = $name::$fallback.as_str(),
                            "Unrecognized lifestyle value"
                        );
                        $name::$fallback
                    }
                }
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Baseline monthly cost before regional scaling
            pub fn monthly_cost(&self) -> f64 {
                match self {
                    $($name::$variant => $cost,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$fallback
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entertainment {
    Low,
    Moderate,
    High,
}

lifestyle_table!(Entertainment, fallback = Moderate, {
    Low => "low", 75.0;
    Moderate => "moderate", 175.0;
    High => "high", 350.0;
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Groceries {
    Budget,
    Moderate,
    Premium,
}

lifestyle_table!(Groceries, fallback = Moderate, {
    Budget => "budget", 250.0;
    Moderate => "moderate", 400.0;
    Premium => "premium", 600.0;
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fitness {
    None,
    Home,
    Gym,
}

lifestyle_table!(Fitness, fallback = None, {
    None => "none", 0.0;
    Home => "home", 30.0;
    Gym => "gym", 75.0;
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Healthcare {
    Minimal,
    Standard,
    Comprehensive,
}

lifestyle_table!(Healthcare, fallback = Standard, {
    Minimal => "minimal", 50.0;
    Standard => "standard", 150.0;
    Comprehensive => "comprehensive", 300.0;
});

/// The four lifestyle selections of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LifestyleSelections {
    pub entertainment: Entertainment,
    pub groceries: Groceries,
    pub fitness: Fitness,
    pub healthcare: Healthcare,
}

impl LifestyleSelections {
    /// Build from raw strings; missing or unrecognized values use the fallbacks
    pub fn parse(
        entertainment: Option<&str>,
        groceries: Option<&str>,
        fitness: Option<&str>,
        healthcare: Option<&str>,
    ) -> Self {
        Self {
            entertainment: entertainment.map(Entertainment::parse_or_default).unwrap_or_default(),
            groceries: groceries.map(Groceries::parse_or_default).unwrap_or_default(),
            fitness: fitness.map(Fitness::parse_or_default).unwrap_or_default(),
            healthcare: healthcare.map(Healthcare::parse_or_default).unwrap_or_default(),
        }
    }
}
