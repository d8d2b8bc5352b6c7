//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;
    use serde_json::Value;

    use crate::core::parts::{FeatureConfig, PartKey, Parts};

    /// Generate a part key (`subsystem:part`)
    pub fn part_key() -> impl Strategy<Value = PartKey> {
        ("[a-z]{1,6}", "[a-z][a-z_]{0,8}")
            .prop_map(|(subsystem, part)| format!("{subsystem}:{part}"))
    }

    /// Generate a feature value (boolean, integer, or string)
    pub fn feature_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            (0i64..1024).prop_map(Value::from),
            "[a-z]{0,6}".prop_map(Value::String),
        ]
    }

    /// Generate a feature config, sometimes carrying an exclude flag
    pub fn feature_config() -> impl Strategy<Value = FeatureConfig> {
        (
            prop::collection::btree_map("[a-z_]{1,10}", feature_value(), 0..4),
            prop_oneof![
                Just(None),
                Just(Some(Value::from("true"))),
                Just(Some(Value::from("false"))),
                Just(Some(Value::Bool(true))),
            ],
        )
            .prop_map(|(entries, exclude)| {
                let mut features: FeatureConfig = entries
                    .into_iter()
                    .filter(|(k, _)| k != "exclude")
                    .collect();
                if let Some(flag) = exclude {
                    features.insert("exclude".to_string(), flag);
                }
                features
            })
    }

    /// Generate a part mapping
    pub fn parts_map() -> impl Strategy<Value = Parts> {
        prop::collection::btree_map(part_key(), feature_config(), 0..12)
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_part_key_generator(key in part_key()) {
            let (subsystem, part) = key.split_once(':').unwrap();
            prop_assert!(!subsystem.is_empty());
            prop_assert!(!part.is_empty());
        }

        #[test]
        fn test_parts_map_keys_are_part_keys(parts in parts_map()) {
            for key in parts.keys() {
                prop_assert_eq!(key.matches(':').count(), 1);
            }
        }
    }
}
