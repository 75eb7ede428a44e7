use super::FeatureVector;
use crate::ledger::QueryInputs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category value → integer mappings the model was trained with
///
/// Configured as one ordered class list per feature; a class encodes as its
/// position. Values missing from a mapping encode as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EncoderClasses", into = "EncoderClasses")]
pub struct FeatureEncoder {
    pub region: BTreeMap<String, i64>,
    pub apartment_size: BTreeMap<String, i64>,
    pub car_type: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct EncoderClasses {
    region: Vec<String>,
    apartment_size: Vec<String>,
    car_type: Vec<String>,
}

fn owned(classes: &[&str]) -> Vec<String> {
    classes.iter().map(|class| class.to_string()).collect()
}

impl Default for EncoderClasses {
    /// Sorted-class label encoding
    fn default() -> Self {
        Self {
            region: owned(&[
                "Austin", "Boston", "Chicago", "Dallas", "Denver", "LA", "Miami", "NYC", "Phoenix",
                "Seattle",
            ]),
            apartment_size: owned(&["1BR", "2BR", "3BR", "studio"]),
            car_type: owned(&["compact", "electric", "sedan", "suv"]),
        }
    }
}

fn label_mapping(classes: Vec<String>) -> BTreeMap<String, i64> {
    classes
        .into_iter()
        .enumerate()
        .map(|(idx, class)| (class, idx as i64))
        .collect()
}

impl From<EncoderClasses> for FeatureEncoder {
    fn from(classes: EncoderClasses) -> Self {
        Self {
            region: label_mapping(classes.region),
            apartment_size: label_mapping(classes.apartment_size),
            car_type: label_mapping(classes.car_type),
        }
    }
}

impl From<FeatureEncoder> for EncoderClasses {
    fn from(encoder: FeatureEncoder) -> Self {
        Self {
            region: ordered_classes(&encoder.region),
            apartment_size: ordered_classes(&encoder.apartment_size),
            car_type: ordered_classes(&encoder.car_type),
        }
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        EncoderClasses::default().into()
    }
}

impl FeatureEncoder {
    pub fn encode(&self, inputs: &QueryInputs) -> FeatureVector {
        FeatureVector {
            region: encode_value(&self.region, "region", &inputs.region),
            apartment_size: encode_value(&self.apartment_size, "apartment_size", &inputs.apartment_size),
            dining_frequency: inputs.dining_frequency,
            car_type: encode_value(&self.car_type, "car_type", &inputs.car_type),
            commute_miles: inputs.commute_miles,
        }
    }

    /// Classes of each mapping ordered by their code
    pub fn classes(&self) -> BTreeMap<&'static str, Vec<String>> {
        let mut classes = BTreeMap::new();
        classes.insert("region", ordered_classes(&self.region));
        classes.insert("apartment_size", ordered_classes(&self.apartment_size));
        classes.insert("car_type", ordered_classes(&self.car_type));
        classes
    }
}

fn encode_value(mapping: &BTreeMap<String, i64>, feature: &str, value: &str) -> i64 {
    match mapping.get(value) {
        Some(code) => *code,
        None => {
            tracing::debug!(feature = feature, value = %value, "No encoding for value, using 0");
            0
        }
    }
}

fn ordered_classes(mapping: &BTreeMap<String, i64>) -> Vec<String> {
    let mut pairs: Vec<(&String, &i64)> = mapping.iter().collect();
    pairs.sort_by_key(|(_, code)| **code);
    pairs.into_iter().map(|(class, _)| class.clone()).collect()
}
