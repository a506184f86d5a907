use crate::common::Value;
use crate::criteria::CriteriaDocument;
use crate::normalizer::{flatten_values, OptionValueNormalizer};

/// Normalizes a projection (`fields`) specification.
///
/// Accepts a delimited string (`"name, age"`), an array of names (flattened,
/// with `Null` entries discarded), a single-element array holding one
/// inclusion/exclusion map (unwrapped to that map), or a map (passed
/// through). Inputs that are empty after normalization become `Null`, which
/// the options document treats as *unset* rather than an empty container.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldsValueNormalizer;

impl OptionValueNormalizer for FieldsValueNormalizer {
    fn normalize(&self, value: Value) -> Value {
        match value {
            Value::String(spec) => {
                let names: Vec<Value> = spec
                    .split(',')
                    .map(|name| name.trim())
                    .filter(|name| !name.is_empty())
                    .map(Value::from)
                    .collect();
                if names.is_empty() {
                    Value::Null
                } else {
                    Value::Array(names)
                }
            }
            Value::Array(items) => {
                if items.len() == 1 && items[0].is_mapping() {
                    // a single wrapped projection map unwraps to the map itself
                    return match items.into_iter().next() {
                        Some(Value::Map(map)) => {
                            Value::Document(CriteriaDocument::from_normalized(map))
                        }
                        Some(mapping) => mapping,
                        None => Value::Null,
                    };
                }
                let flat: Vec<Value> = flatten_values(items)
                    .into_iter()
                    .filter(|item| !item.is_null())
                    .collect();
                if flat.is_empty() {
                    Value::Null
                } else {
                    Value::Array(flat)
                }
            }
            Value::Map(map) => Value::Document(CriteriaDocument::from_normalized(map)),
            other => other,
        }
    }
}
