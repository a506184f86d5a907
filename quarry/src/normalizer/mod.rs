//! Key and value normalizers.
//!
//! Normalizers are the strategy objects that turn loosely-typed input into
//! canonical form. Criteria and options documents hold them behind trait
//! objects, so callers can swap alias tables or value handling without
//! touching the document types; defaults matching the standard behavior are
//! supplied by the document constructors.

mod criteria_value;
mod fields_value;
mod integer;
mod key_normalizer;
mod options_value;
mod sort_value;

pub use criteria_value::*;
pub use fields_value::*;
pub use integer::*;
pub use key_normalizer::*;
pub use options_value::*;
pub use sort_value::*;

use crate::common::Value;

/// Flattens nested arrays depth-first, preserving element order.
pub(crate) fn flatten_values(items: Vec<Value>) -> Vec<Value> {
    let mut flat = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Array(inner) => flat.extend(flatten_values(inner)),
            other => flat.push(other),
        }
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_values() {
        let nested = vec![
            Value::I32(1),
            Value::Array(vec![Value::I32(2), Value::Array(vec![Value::I32(3)])]),
        ];
        assert_eq!(
            flatten_values(nested),
            vec![Value::I32(1), Value::I32(2), Value::I32(3)]
        );
    }
}
